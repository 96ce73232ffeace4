//! Element placement and bounding volumes.
//!
//! Resolves the `IfcLocalPlacement` chain of a product into a world transform
//! and applies it to the product's `IfcBoundingBox` representation item. When
//! no bounding box is modelled, the placement origin gives a degenerate box.

use crate::model::BoundingBox;
use crate::parser::step::{StepEntity, StepFile, StepValue};
use nalgebra::{Matrix4, Point3, Vector3};

/// Placement chains longer than this are treated as cyclic and cut.
const MAX_PLACEMENT_DEPTH: usize = 100;

const OBJECT_PLACEMENT: usize = 5;
const REPRESENTATION: usize = 6;

/// Bounding volume of a product, or `None` when it has no resolvable placement.
#[must_use]
pub fn product_bounds(file: &StepFile, product: &StepEntity) -> Option<BoundingBox> {
    let placement = file.get_entity(product.reference_at(OBJECT_PLACEMENT)?)?;
    let transform = placement_transform(file, placement)?;

    let corners = product
        .reference_at(REPRESENTATION)
        .and_then(|id| bounding_box_corners(file, id));

    let points = corners.unwrap_or_else(|| vec![Point3::origin()]);
    let mut bounds: Option<BoundingBox> = None;
    for local in points {
        let world = transform.transform_point(&local);
        let point = [world.x, world.y, world.z];
        match bounds.as_mut() {
            Some(b) => b.expand(point),
            None => bounds = Some(BoundingBox::from_point(point)),
        }
    }
    bounds
}

/// World transform of an `IfcLocalPlacement`: parent placements composed
/// outermost first.
fn placement_transform(file: &StepFile, placement: &StepEntity) -> Option<Matrix4<f64>> {
    if placement.entity_type != "IFCLOCALPLACEMENT" {
        return None;
    }

    let mut chain = Vec::new();
    let mut current = Some(placement);
    while let Some(entity) = current {
        if chain.len() >= MAX_PLACEMENT_DEPTH {
            tracing::warn!(placement = placement.id, "placement chain too deep, truncating");
            break;
        }
        let local = entity
            .reference_at(1)
            .and_then(|id| file.get_entity(id))
            .map_or_else(Matrix4::identity, |axis| axis_placement(file, axis));
        chain.push(local);
        current = entity
            .reference_at(0)
            .and_then(|id| file.get_entity(id))
            .filter(|parent| parent.entity_type == "IFCLOCALPLACEMENT");
    }

    Some(
        chain
            .into_iter()
            .rev()
            .fold(Matrix4::identity(), |world, local| world * local),
    )
}

fn axis_placement(file: &StepFile, placement: &StepEntity) -> Matrix4<f64> {
    let (axis_index, ref_index) = match placement.entity_type.as_str() {
        "IFCAXIS2PLACEMENT3D" => (Some(1), 2),
        "IFCAXIS2PLACEMENT2D" => (None, 1),
        _ => return Matrix4::identity(),
    };

    let location = placement
        .reference_at(0)
        .and_then(|id| file.get_entity(id))
        .and_then(cartesian_point)
        .unwrap_or_else(Point3::origin);

    let z_axis = axis_index
        .and_then(|i| direction(file, placement, i))
        .unwrap_or_else(Vector3::z);
    let ref_dir = direction(file, placement, ref_index).unwrap_or_else(Vector3::x);

    // Orthonormalize the frame; fall back to the default frame on degenerate input.
    let y_axis = z_axis.cross(&ref_dir);
    if y_axis.norm() < 1e-12 {
        return Matrix4::new_translation(&location.coords);
    }
    let y_axis = y_axis.normalize();
    let x_axis = y_axis.cross(&z_axis).normalize();
    let z_axis = z_axis.normalize();

    let mut transform = Matrix4::identity();
    for row in 0..3 {
        transform[(row, 0)] = x_axis[row];
        transform[(row, 1)] = y_axis[row];
        transform[(row, 2)] = z_axis[row];
        transform[(row, 3)] = location[row];
    }
    transform
}

fn cartesian_point(entity: &StepEntity) -> Option<Point3<f64>> {
    if entity.entity_type != "IFCCARTESIANPOINT" {
        return None;
    }
    let coords = coordinates(entity.get(0)?);
    Some(Point3::new(coords[0], coords[1], coords[2]))
}

fn direction(file: &StepFile, parent: &StepEntity, index: usize) -> Option<Vector3<f64>> {
    let entity = file.get_entity(parent.reference_at(index)?)?;
    if entity.entity_type != "IFCDIRECTION" {
        return None;
    }
    let ratios = coordinates(entity.get(0)?);
    let v = Vector3::new(ratios[0], ratios[1], ratios[2]);
    (v.norm() > 1e-12).then_some(v)
}

fn coordinates(value: &StepValue) -> [f64; 3] {
    let items = value.items();
    let at = |i: usize| items.get(i).and_then(StepValue::as_float).unwrap_or(0.0);
    [at(0), at(1), at(2)]
}

/// Corners of the first `IfcBoundingBox` item in a product definition shape.
fn bounding_box_corners(file: &StepFile, shape_id: u64) -> Option<Vec<Point3<f64>>> {
    let shape = file.get_entity(shape_id)?;
    if shape.entity_type != "IFCPRODUCTDEFINITIONSHAPE" {
        return None;
    }

    let item = shape
        .references_at(2)
        .into_iter()
        .filter_map(|id| file.get_entity(id))
        .flat_map(|rep| rep.references_at(3))
        .filter_map(|id| file.get_entity(id))
        .find(|item| item.entity_type == "IFCBOUNDINGBOX")?;

    let corner = file
        .get_entity(item.reference_at(0)?)
        .and_then(cartesian_point)?;
    let dim = |i: usize| item.get(i).and_then(StepValue::as_float).unwrap_or(0.0);
    let (dx, dy, dz) = (dim(1), dim(2), dim(3));

    let mut corners = Vec::with_capacity(8);
    for x in [0.0, dx] {
        for y in [0.0, dy] {
            for z in [0.0, dz] {
                corners.push(corner + Vector3::new(x, y, z));
            }
        }
    }
    Some(corners)
}
