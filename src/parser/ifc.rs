use crate::error::ParseError;
use crate::model::{Element, Model, Property, PropertyCategory, PropertyValue};
use crate::parser::geometry::product_bounds;
use crate::parser::global_id::decode_global_id;
use crate::parser::step::{StepEntity, StepFile, StepValue};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// IFC classes with their schema spelling. Anything else is derived from the
/// upper-case STEP name.
const CLASS_NAMES: &[&str] = &[
    "IfcProject",
    "IfcSite",
    "IfcBuilding",
    "IfcBuildingStorey",
    "IfcSpace",
    "IfcWall",
    "IfcWallStandardCase",
    "IfcCurtainWall",
    "IfcDoor",
    "IfcWindow",
    "IfcSlab",
    "IfcRoof",
    "IfcColumn",
    "IfcBeam",
    "IfcMember",
    "IfcPlate",
    "IfcStair",
    "IfcStairFlight",
    "IfcRamp",
    "IfcRampFlight",
    "IfcRailing",
    "IfcCovering",
    "IfcFooting",
    "IfcPile",
    "IfcOpeningElement",
    "IfcFurnishingElement",
    "IfcFurniture",
    "IfcFlowTerminal",
    "IfcFlowSegment",
    "IfcFlowFitting",
    "IfcSanitaryTerminal",
    "IfcElementAssembly",
    "IfcBuildingElementProxy",
    "IfcDistributionElement",
];

/// Spatial structure entities carry `LongName` where elements carry `Tag`.
const SPATIAL_TYPES: &[&str] = &["IFCSITE", "IFCBUILDING", "IFCBUILDINGSTOREY", "IFCSPACE"];

/// Relationships forming the element tree: (entity, parent index, children index).
const TREE_RELATIONSHIPS: &[(&str, usize, usize)] = &[
    ("IFCRELAGGREGATES", 4, 5),
    ("IFCRELNESTS", 4, 5),
    ("IFCRELCONTAINEDINSPATIALSTRUCTURE", 5, 4),
];

/// Nesting limit for complex properties and the spatial tree.
const MAX_DEPTH: usize = 64;

/// Category holding the entity's own attributes.
pub const ELEMENT_CATEGORY: &str = "Element";

/// Loads an IFC file as an element tree.
///
/// Supports IFC2x3 and IFC4 STEP files. Builds:
/// - the spatial tree from aggregation, nesting and containment
/// - an `Element` category with the entity's own attributes
/// - property and quantity sets of the instance, then of its type
/// - bounding volumes from local placements
///
/// # Errors
///
/// Returns [`ParseError::FileRead`] if the file cannot be read.
/// Returns [`ParseError::InvalidStep`] if the STEP format is malformed.
///
/// # Example
///
/// ```no_run
/// use bim_tabulator::parser::load_ifc_model;
///
/// let model = load_ifc_model("model.ifc")?;
/// println!("{}: {} elements", model.name, model.total_elements());
/// # Ok::<(), bim_tabulator::error::ParseError>(())
/// ```
pub fn load_ifc_model<P: AsRef<Path>>(path: P) -> Result<Model, ParseError> {
    let content = std::fs::read_to_string(&path).map_err(|source| ParseError::FileRead {
        path: path.as_ref().to_path_buf(),
        source,
    })?;

    let step_file = StepFile::parse(&content)?;
    let model = build_model(&step_file);
    tracing::info!(
        path = %path.as_ref().display(),
        schema = %model.schema,
        entities = step_file.entities.len(),
        roots = model.roots.len(),
        "loaded IFC model"
    );
    Ok(model)
}

/// Builds the element tree of an already parsed STEP file.
#[must_use]
pub fn build_model(step_file: &StepFile) -> Model {
    let index = RelationIndex::new(step_file);
    let mut model = Model::new(extract_project_name(step_file), step_file.schema.clone());

    let mut builder = TreeBuilder {
        file: step_file,
        index: &index,
        ancestors: Vec::new(),
    };
    model.roots = index
        .root_ids(step_file)
        .into_iter()
        .filter_map(|id| builder.build(id))
        .collect();
    model
}

fn extract_project_name(step_file: &StepFile) -> String {
    step_file
        .get_entities_by_type("IFCPROJECT")
        .first()
        .and_then(|e| e.string_at(2))
        .unwrap_or_else(|| "Unknown Project".to_string())
}

/// Lookup tables built once from the relationship entities.
struct RelationIndex {
    children: HashMap<u64, Vec<u64>>,
    property_sets: HashMap<u64, Vec<u64>>,
    element_type: HashMap<u64, u64>,
}

impl RelationIndex {
    fn new(step_file: &StepFile) -> Self {
        let mut rels: Vec<(&StepEntity, usize, usize)> = TREE_RELATIONSHIPS
            .iter()
            .flat_map(|(entity_type, parent, children)| {
                step_file
                    .get_entities_by_type(entity_type)
                    .into_iter()
                    .map(move |rel| (rel, *parent, *children))
            })
            .collect();
        rels.sort_by_key(|(rel, _, _)| rel.id);

        let mut children: HashMap<u64, Vec<u64>> = HashMap::new();
        for (rel, parent_index, children_index) in rels {
            let related = match rel.get(children_index) {
                Some(StepValue::Reference(id)) => vec![*id],
                Some(value) => value.references(),
                None => Vec::new(),
            };
            if let Some(parent) = rel.reference_at(parent_index) {
                children.entry(parent).or_default().extend(related);
            }
        }

        let mut property_sets: HashMap<u64, Vec<u64>> = HashMap::new();
        for rel in step_file.get_entities_by_type("IFCRELDEFINESBYPROPERTIES") {
            if let Some(pset) = rel.reference_at(5) {
                for element in rel.references_at(4) {
                    property_sets.entry(element).or_default().push(pset);
                }
            }
        }

        let mut element_type = HashMap::new();
        for rel in step_file.get_entities_by_type("IFCRELDEFINESBYTYPE") {
            if let Some(type_id) = rel.reference_at(5) {
                for element in rel.references_at(4) {
                    element_type.insert(element, type_id);
                }
            }
        }

        Self {
            children,
            property_sets,
            element_type,
        }
    }

    /// Projects, or when the file has none, every parent that is nobody's child.
    fn root_ids(&self, step_file: &StepFile) -> Vec<u64> {
        let projects: Vec<u64> = step_file
            .get_entities_by_type("IFCPROJECT")
            .iter()
            .map(|e| e.id)
            .collect();
        if !projects.is_empty() {
            return projects;
        }

        let exists = |id: u64| step_file.get_entity(id).is_some();
        let nested: HashSet<u64> = self
            .children
            .iter()
            .filter(|(parent, _)| exists(**parent))
            .flat_map(|(_, children)| children.iter().copied())
            .collect();
        let mut roots: Vec<u64> = self
            .children
            .keys()
            .filter(|id| exists(**id) && !nested.contains(*id))
            .copied()
            .collect();
        roots.sort_unstable();
        roots
    }
}

struct TreeBuilder<'a> {
    file: &'a StepFile,
    index: &'a RelationIndex,
    ancestors: Vec<u64>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, id: u64) -> Option<Element> {
        let entity = self.file.get_entity(id)?;
        let mut element = self.describe(entity);

        let child_ids = self.index.children.get(&id).cloned().unwrap_or_default();
        if child_ids.is_empty() {
            return Some(element);
        }

        if self.ancestors.len() >= MAX_DEPTH || self.ancestors.contains(&id) {
            element.children_fault = Some(format!("cyclic or too deep hierarchy at #{id}"));
            return Some(element);
        }
        if let Some(missing) = child_ids.iter().find(|c| self.file.get_entity(**c).is_none()) {
            tracing::warn!(parent = id, child = missing, "dangling child reference");
            element.children_fault = Some(format!("dangling child reference #{missing}"));
            return Some(element);
        }

        self.ancestors.push(id);
        element.children = child_ids.into_iter().filter_map(|c| self.build(c)).collect();
        self.ancestors.pop();
        Some(element)
    }

    fn describe(&self, entity: &StepEntity) -> Element {
        let global_id = entity.string_at(0);
        let stable_id = global_id.as_deref().map(|g| {
            decode_global_id(g).map_or_else(|| g.to_string(), |uuid| uuid.hyphenated().to_string())
        });

        let mut categories = vec![Self::attribute_category(entity)];
        let instance_sets = self.index.property_sets.get(&entity.id);
        let type_sets = self
            .index
            .element_type
            .get(&entity.id)
            .and_then(|type_id| self.file.get_entity(*type_id))
            .map(|type_entity| type_entity.references_at(5));

        for pset_id in instance_sets
            .into_iter()
            .flatten()
            .copied()
            .chain(type_sets.into_iter().flatten())
        {
            if let Some(category) = self.property_set(pset_id) {
                categories.push(category);
            }
        }

        Element {
            name: entity.string_at(2),
            class_name: Some(class_name(&entity.entity_type)),
            stable_id,
            bounds: product_bounds(self.file, entity),
            categories,
            ..Element::default()
        }
    }

    fn attribute_category(entity: &StepEntity) -> PropertyCategory {
        let text = |index: usize| {
            entity
                .string_at(index)
                .map_or(PropertyValue::Empty, PropertyValue::Text)
        };

        let mut properties = vec![
            Property::new("GUID", text(0)),
            Property::new("Entity", PropertyValue::Text(class_name(&entity.entity_type))),
            Property::new("Name", text(2)),
            Property::new("Description", text(3)),
            Property::new("ObjectType", text(4)),
        ];
        if entity.entity_type == "IFCPROJECT" {
            properties.push(Property::new("LongName", text(5)));
        } else if SPATIAL_TYPES.contains(&entity.entity_type.as_str()) {
            properties.push(Property::new("LongName", text(7)));
        } else if entity.values.len() > 7 {
            properties.push(Property::new("Tag", text(7)));
        }

        PropertyCategory::new(ELEMENT_CATEGORY, properties)
    }

    fn property_set(&self, id: u64) -> Option<PropertyCategory> {
        let pset = self.file.get_entity(id)?;
        let members = match pset.entity_type.as_str() {
            "IFCPROPERTYSET" => pset.references_at(4),
            "IFCELEMENTQUANTITY" => pset.references_at(5),
            _ => return None,
        };
        let name = pset
            .string_at(2)
            .unwrap_or_else(|| format!("PropertySet #{id}"));

        let properties = members
            .into_iter()
            .map(|member| self.property(member, 0))
            .collect();
        Some(PropertyCategory::new(name, properties))
    }

    fn property(&self, id: u64, depth: usize) -> Property {
        let Some(entity) = self.file.get_entity(id) else {
            return Property::new(
                format!("#{id}"),
                PropertyValue::Unreadable(format!("dangling property reference #{id}")),
            );
        };
        let name = entity
            .string_at(0)
            .unwrap_or_else(|| format!("#{id}"));

        let value = |index: usize| entity.get(index).map_or(PropertyValue::Empty, property_value);
        let joined = |index: usize| {
            let items: Vec<String> = entity
                .get(index)
                .map(|v| v.items().iter().map(format_step_value).collect())
                .unwrap_or_default();
            if items.is_empty() {
                PropertyValue::Empty
            } else {
                PropertyValue::Text(items.join(", "))
            }
        };

        match entity.entity_type.as_str() {
            "IFCPROPERTYSINGLEVALUE" => Property::new(name, value(2)),
            "IFCPROPERTYENUMERATEDVALUE" | "IFCPROPERTYLISTVALUE" => Property::new(name, joined(2)),
            "IFCPROPERTYBOUNDEDVALUE" => {
                let bound = |index: usize| {
                    entity
                        .get(index)
                        .filter(|v| !matches!(v, StepValue::Null))
                        .map(format_step_value)
                };
                let range = match (bound(3), bound(2)) {
                    (Some(lower), Some(upper)) => PropertyValue::Text(format!("{lower} - {upper}")),
                    (Some(only), None) | (None, Some(only)) => PropertyValue::Text(only),
                    (None, None) => PropertyValue::Empty,
                };
                Property::new(name, range)
            }
            "IFCCOMPLEXPROPERTY" => {
                if depth >= MAX_DEPTH {
                    return Property::new(
                        name,
                        PropertyValue::Unreadable("complex property nested too deep".to_string()),
                    );
                }
                let children = entity
                    .references_at(3)
                    .into_iter()
                    .map(|child| self.property(child, depth + 1))
                    .collect();
                Property::new(name, PropertyValue::Empty).with_children(children)
            }
            quantity if quantity.starts_with("IFCQUANTITY") => Property::new(name, value(3)),
            other => Property::new(
                name,
                PropertyValue::Unreadable(format!("unsupported property type {other}")),
            ),
        }
    }
}

fn property_value(value: &StepValue) -> PropertyValue {
    match value {
        StepValue::String(s) => PropertyValue::Text(s.clone()),
        StepValue::Real(f) => PropertyValue::Number(*f),
        StepValue::Integer(i) => PropertyValue::Integer(*i),
        StepValue::Boolean(b) => PropertyValue::Boolean(*b),
        StepValue::Typed(_, inner) => property_value(inner),
        StepValue::Null | StepValue::Derived => PropertyValue::Empty,
        StepValue::Enum(_) | StepValue::Reference(_) | StepValue::List(_) => {
            PropertyValue::Text(format_step_value(value))
        }
    }
}

fn format_step_value(value: &StepValue) -> String {
    match value {
        StepValue::String(s) | StepValue::Enum(s) => s.clone(),
        StepValue::Real(f) => f.to_string(),
        StepValue::Integer(i) => i.to_string(),
        StepValue::Boolean(b) => if *b { "Yes" } else { "No" }.to_string(),
        StepValue::Reference(id) => format!("#{id}"),
        StepValue::Typed(_, inner) => format_step_value(inner),
        StepValue::List(list) => list
            .iter()
            .map(format_step_value)
            .collect::<Vec<_>>()
            .join(", "),
        StepValue::Null => "-".to_string(),
        StepValue::Derived => "*".to_string(),
    }
}

/// Schema spelling of an upper-case STEP entity name.
#[must_use]
pub fn class_name(entity_type: &str) -> String {
    if let Some(known) = CLASS_NAMES
        .iter()
        .find(|name| name.eq_ignore_ascii_case(entity_type))
    {
        return (*known).to_string();
    }

    match entity_type.strip_prefix("IFC") {
        Some(rest) if !rest.is_empty() => {
            let mut chars = rest.chars();
            let first = chars.next().map(|c| c.to_ascii_uppercase());
            format!(
                "Ifc{}{}",
                first.map(String::from).unwrap_or_default(),
                chars.as_str().to_ascii_lowercase()
            )
        }
        _ => entity_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::model::ElementSource;
    use pretty_assertions::assert_eq;

    const MODEL: &str = "ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'Demo Project',$,$,$,$,$,$);
#2=IFCSITE('1YvctVUKr0kugbFTf53O9L',$,'Site',$,$,$,$,$,.ELEMENT.,$,$,$,$,$);
#3=IFCBUILDINGSTOREY('2YvctVUKr0kugbFTf53O9L',$,'Level 1',$,$,#20,$,'Ground',.ELEMENT.,0.);
#4=IFCWALL('3YvctVUKr0kugbFTf53O9L',$,'Wall-01',$,'Basic Wall',#20,$,'W1');
#5=IFCDOOR('0000000000000000000000',$,'Door-01',$,$,$,$,'D1',2100.,900.);
#10=IFCRELAGGREGATES('a1',$,$,$,#1,(#2));
#11=IFCRELAGGREGATES('a2',$,$,$,#2,(#3));
#12=IFCRELCONTAINEDINSPATIALSTRUCTURE('c1',$,$,$,(#4,#5),#3);
#20=IFCLOCALPLACEMENT($,#21);
#21=IFCAXIS2PLACEMENT3D(#22,$,$);
#22=IFCCARTESIANPOINT((1.,2.,3.));
#30=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('EI60'),$);
#31=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#32=IFCPROPERTYSINGLEVALUE('Width',$,IFCLENGTHMEASURE(0.25),$);
#33=IFCCOMPLEXPROPERTY('Layer',$,'Layer',(#32,#34));
#34=IFCPROPERTYENUMERATEDVALUE('Finish',$,(IFCLABEL('Paint'),IFCLABEL('Plaster')),$);
#35=IFCPROPERTYSET('p1',$,'Pset_WallCommon',$,(#30,#31,#33,#99));
#36=IFCRELDEFINESBYPROPERTIES('r1',$,$,$,(#4),#35);
#40=IFCQUANTITYLENGTH('Length',$,$,5.5);
#41=IFCELEMENTQUANTITY('q1',$,'Qto_WallBaseQuantities',$,$,(#40));
#42=IFCRELDEFINESBYPROPERTIES('r2',$,$,$,(#4),#41);
#50=IFCPROPERTYSINGLEVALUE('Manufacturer',$,IFCLABEL('Acme'),$);
#51=IFCPROPERTYSET('p2',$,'Pset_DoorCommon',$,(#50));
#52=IFCDOORTYPE('t1',$,'Single Door',$,$,(#51),$,$,$,$);
#53=IFCRELDEFINESBYTYPE('dt',$,$,$,(#5),#52);
ENDSEC;
END-ISO-10303-21;";

    fn model() -> Model {
        build_model(&StepFile::parse(MODEL).unwrap())
    }

    fn category<'a>(element: &'a Element, name: &str) -> &'a PropertyCategory {
        element
            .categories
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("missing category {name}"))
    }

    #[test]
    fn test_spatial_tree() {
        let model = model();
        assert_eq!(model.name, "Demo Project");
        assert_eq!(model.schema, "IFC2X3");

        let names: Vec<_> = flatten(&model.roots)
            .map(|e| e.name.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            names,
            vec!["Demo Project", "Site", "Level 1", "Wall-01", "Door-01"]
        );
    }

    #[test]
    fn test_element_attributes() {
        let model = model();
        let wall = flatten(&model.roots).nth(3).unwrap();

        assert_eq!(wall.class_name.as_deref(), Some("IfcWall"));
        assert!(wall.stable_id.as_deref().is_some_and(|id| id.len() == 36));
        assert_eq!(wall.bounds.map(|b| b.center()), Some([1.0, 2.0, 3.0]));

        let attributes = category(wall, ELEMENT_CATEGORY);
        let tag = attributes.properties.iter().find(|p| p.name == "Tag").unwrap();
        assert_eq!(tag.value, PropertyValue::Text("W1".to_string()));
        let guid = attributes.properties.iter().find(|p| p.name == "GUID").unwrap();
        assert_eq!(
            guid.value,
            PropertyValue::Text("3YvctVUKr0kugbFTf53O9L".to_string())
        );
    }

    #[test]
    fn test_property_sets_and_quantities() {
        let model = model();
        let wall = flatten(&model.roots).nth(3).unwrap();

        let pset = category(wall, "Pset_WallCommon");
        assert_eq!(pset.properties.len(), 4);
        assert_eq!(pset.properties[0].value, PropertyValue::Text("EI60".to_string()));
        assert_eq!(pset.properties[1].value, PropertyValue::Boolean(true));

        let layer = &pset.properties[2];
        assert_eq!(layer.children.len(), 2);
        assert_eq!(layer.children[0].value, PropertyValue::Number(0.25));
        assert_eq!(
            layer.children[1].value,
            PropertyValue::Text("Paint, Plaster".to_string())
        );

        assert!(matches!(pset.properties[3].value, PropertyValue::Unreadable(_)));

        let qto = category(wall, "Qto_WallBaseQuantities");
        assert_eq!(qto.properties[0].value, PropertyValue::Number(5.5));
    }

    #[test]
    fn test_type_property_sets_and_missing_placement() {
        let model = model();
        let door = flatten(&model.roots).nth(4).unwrap();

        assert_eq!(category(door, "Pset_DoorCommon").properties[0].name, "Manufacturer");
        assert!(door.bounding_box().is_err());
        assert_eq!(
            door.stable_id.as_deref(),
            Some("00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn test_dangling_child_marks_fault() {
        let content = MODEL.replace("(#4,#5),#3", "(#4,#77),#3");
        let model = build_model(&StepFile::parse(&content).unwrap());

        let storey = flatten(&model.roots).nth(2).unwrap();
        assert!(storey.children().is_err());
        assert_eq!(flatten(&model.roots).count(), 3);
    }

    #[test]
    fn test_roots_without_project() {
        let content = MODEL.replace(
            "#1=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'Demo Project',$,$,$,$,$,$);",
            "",
        );
        let model = build_model(&StepFile::parse(&content).unwrap());

        assert_eq!(model.name, "Unknown Project");
        assert_eq!(model.roots.len(), 1);
        assert_eq!(model.roots[0].name.as_deref(), Some("Site"));
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("IFCBUILDINGSTOREY"), "IfcBuildingStorey");
        assert_eq!(class_name("IFCTENDON"), "IfcTendon");
        assert_eq!(class_name("CUSTOM"), "CUSTOM");
    }
}
