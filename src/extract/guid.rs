use super::row::{GUID_ERROR, NO_GUID};
use crate::model::{ElementSource, Property};

/// True for identifiers made only of zeros and GUID punctuation, such as the
/// nil UUID or the nil IFC GlobalId `0000000000000000000000`.
#[must_use]
pub fn is_nil_identifier(id: &str) -> bool {
    let id = id.trim();
    id.contains('0') && id.chars().all(|c| matches!(c, '0' | '-' | '{' | '}'))
}

fn is_guid_property(property: &Property) -> bool {
    property.name.eq_ignore_ascii_case("GUID")
        || property
            .display_name
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case("GUID"))
}

/// Resolves the identifier written to the GUID column.
///
/// A `GUID` property anywhere in the element's property tree wins over the
/// element's intrinsic identifier, which hosts often report as all zeros.
pub fn resolve_guid<E: ElementSource>(element: &E) -> String {
    let categories = match element.categories() {
        Ok(categories) => categories,
        Err(err) => {
            tracing::debug!(error = %err, "cannot scan properties for GUID");
            return GUID_ERROR.to_string();
        }
    };

    let mut stack: Vec<&Property> = categories
        .iter()
        .rev()
        .flat_map(|c| c.properties.iter().rev())
        .collect();

    while let Some(property) = stack.pop() {
        if is_guid_property(property) {
            if let Ok(Some(value)) = property.value.display() {
                if !is_nil_identifier(&value) {
                    return value;
                }
            }
        }
        stack.extend(property.children.iter().rev());
    }

    match element.stable_id().map(str::trim) {
        Some(id) if !id.is_empty() && !is_nil_identifier(id) => id.to_string(),
        _ => NO_GUID.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, PropertyCategory, PropertyValue};

    const NIL: &str = "00000000-0000-0000-0000-000000000000";

    fn with_props(stable_id: Option<&str>, properties: Vec<Property>) -> Element {
        Element {
            stable_id: stable_id.map(String::from),
            categories: vec![PropertyCategory::new("Item", properties)],
            ..Element::default()
        }
    }

    fn text(name: &str, value: &str) -> Property {
        Property::new(name, PropertyValue::Text(value.to_string()))
    }

    #[test]
    fn test_property_beats_intrinsic_id() {
        let element = with_props(
            Some("3f2504e0-4f89-11d3-9a0c-0305e82c3301"),
            vec![text("guid", "1234")],
        );
        assert_eq!(resolve_guid(&element), "1234");
    }

    #[test]
    fn test_display_name_match() {
        let mut property = text("internal_id", "abcd");
        property.display_name = Some("Guid".to_string());
        let element = with_props(None, vec![property]);

        assert_eq!(resolve_guid(&element), "abcd");
    }

    #[test]
    fn test_nil_property_skipped_for_next_candidate() {
        let element = with_props(None, vec![text("GUID", NIL), text("GUID", "real")]);
        assert_eq!(resolve_guid(&element), "real");
    }

    #[test]
    fn test_nested_guid_property_found() {
        let nested = Property::new("Identity", PropertyValue::Empty)
            .with_children(vec![text("GUID", "nested-id")]);
        let element = with_props(None, vec![nested]);

        assert_eq!(resolve_guid(&element), "nested-id");
    }

    #[test]
    fn test_fallback_to_intrinsic_id() {
        let element = with_props(Some("abc-123"), vec![text("Name", "Wall")]);
        assert_eq!(resolve_guid(&element), "abc-123");
    }

    #[test]
    fn test_nil_intrinsic_id_without_property() {
        let element = with_props(Some(NIL), vec![]);
        assert_eq!(resolve_guid(&element), NO_GUID);

        let missing = with_props(None, vec![]);
        assert_eq!(resolve_guid(&missing), NO_GUID);
    }

    #[test]
    fn test_unreadable_properties_report_error() {
        let element = Element {
            properties_fault: Some("host threw".to_string()),
            stable_id: Some("abc".to_string()),
            ..Element::default()
        };
        assert_eq!(resolve_guid(&element), GUID_ERROR);
    }

    #[test]
    fn test_is_nil_identifier() {
        assert!(is_nil_identifier(NIL));
        assert!(is_nil_identifier("{00000000-0000-0000-0000-000000000000}"));
        assert!(is_nil_identifier("0000000000000000000000"));
        assert!(!is_nil_identifier("1234"));
        assert!(!is_nil_identifier(""));
        assert!(!is_nil_identifier("--"));
    }
}
