use super::{Element, ElementSource};
use crate::error::ExportError;
use crate::extract::resolve_guid;
use crate::flatten::flatten;
use serde::{Deserialize, Serialize};

/// A loaded model: a name and its root elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub roots: Vec<Element>,
}

impl Model {
    #[must_use]
    pub fn new(name: String, schema: String) -> Self {
        Self {
            name,
            schema,
            roots: Vec::new(),
        }
    }

    #[must_use]
    pub fn total_elements(&self) -> usize {
        flatten(&self.roots).count()
    }

    /// Resolves selection patterns to root elements.
    ///
    /// A pattern matches an element by resolved GUID, stable identifier or
    /// display name (all case-insensitive). Matches are returned per pattern
    /// in traversal order. An empty pattern list selects the model roots.
    pub fn select(&self, patterns: &[String]) -> Result<Vec<&Element>, ExportError> {
        if patterns.is_empty() {
            return Ok(self.roots.iter().collect());
        }

        let mut selected = Vec::new();
        for pattern in patterns {
            let before = selected.len();
            selected.extend(flatten(&self.roots).filter(|e| matches_pattern(e, pattern)));
            if selected.len() == before {
                return Err(ExportError::UnmatchedSelection {
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(selected)
    }
}

/// Whether `pattern` names `element` by display name, stable identifier or
/// resolved GUID, ignoring ASCII case.
pub fn matches_pattern(element: &Element, pattern: &str) -> bool {
    let eq = |candidate: Option<&str>| candidate.is_some_and(|c| c.eq_ignore_ascii_case(pattern));
    eq(element.display_name())
        || eq(element.stable_id())
        || resolve_guid(element).eq_ignore_ascii_case(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Property, PropertyCategory, PropertyValue};

    fn model() -> Model {
        let mut wall = Element::named("Wall-01");
        wall.categories = vec![PropertyCategory::new(
            "Element",
            vec![Property::new(
                "GUID",
                PropertyValue::Text("2O2Fr$t4X7Zf8NOew3FLOH".to_string()),
            )],
        )];
        let storey = Element {
            children: vec![wall, Element::named("Door-01")],
            ..Element::named("Level 1")
        };
        Model {
            name: "Demo".to_string(),
            schema: String::new(),
            roots: vec![storey],
        }
    }

    #[test]
    fn test_total_elements() {
        assert_eq!(model().total_elements(), 3);
    }

    #[test]
    fn test_empty_selection_returns_roots() {
        let model = model();
        let selected = model.select(&[]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name.as_deref(), Some("Level 1"));
    }

    #[test]
    fn test_select_by_name_and_guid() {
        let model = model();
        let selected = model
            .select(&["door-01".to_string(), "2O2Fr$t4X7Zf8NOew3FLOH".to_string()])
            .unwrap();

        let names: Vec<_> = selected.iter().map(|e| e.name.as_deref()).collect();
        assert_eq!(names, vec![Some("Door-01"), Some("Wall-01")]);
    }

    #[test]
    fn test_unmatched_pattern_is_error() {
        let err = model().select(&["nothing".to_string()]).unwrap_err();
        assert!(matches!(err, ExportError::UnmatchedSelection { .. }));
    }
}
