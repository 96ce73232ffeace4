use crate::error::ParseError;
use crate::model::Model;
use std::path::Path;

/// Loads a model serialized as JSON (the shape of [`Model`]).
pub fn load_json_model<P: AsRef<Path>>(path: P) -> Result<Model, ParseError> {
    let content = std::fs::read_to_string(&path).map_err(|source| ParseError::FileRead {
        path: path.as_ref().to_path_buf(),
        source,
    })?;

    let model: Model = serde_json::from_str(&content)?;
    tracing::info!(
        path = %path.as_ref().display(),
        roots = model.roots.len(),
        "loaded JSON model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;
    use std::io::Write;

    #[test]
    fn test_load_json_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "name": "Demo",
                "roots": [{{
                    "name": "Wall-01",
                    "class_name": "Wall",
                    "stable_id": "00000000-0000-0000-0000-000000000000",
                    "bounds": {{ "min": [0, 0, 0], "max": [1, 1, 1] }},
                    "categories": [{{
                        "name": "Item",
                        "properties": [
                            {{ "name": "Name", "value": {{ "kind": "text", "value": "Wall-01" }} }},
                            {{ "name": "Layers", "value": {{ "kind": "integer", "value": 2 }} }},
                            {{ "name": "Empty" }}
                        ]
                    }}],
                    "children": [{{ "name": "Opening" }}]
                }}]
            }}"#
        )
        .unwrap();

        let model = load_json_model(file.path()).unwrap();
        assert_eq!(model.name, "Demo");
        assert_eq!(model.total_elements(), 2);

        let wall = &model.roots[0];
        let props = &wall.categories[0].properties;
        assert_eq!(props[0].value, PropertyValue::Text("Wall-01".to_string()));
        assert_eq!(props[1].value, PropertyValue::Integer(2));
        assert_eq!(props[2].value, PropertyValue::Empty);
    }

    #[test]
    fn test_invalid_json_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = load_json_model(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }
}
