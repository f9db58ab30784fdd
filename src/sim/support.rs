//! Load-bearing analysis
//!
//! A block is load-bearing when the unbroken column of blocks stacked on it
//! ends under a house. Only the column itself is followed; alternative
//! support paths are not considered, so the answer errs on the safe side.

use std::collections::HashSet;

use super::footprint::{CellCoord, Grid, cells_overlap};
use super::scene::{ObjectId, PlacedObject, Scene};

/// Objects resting directly on `object` (bottom abuts its top, footprints overlap)
fn resting_on<'s: 'c, 'c>(
    scene: &'s Scene,
    grid: &'c Grid,
    object: &'c PlacedObject,
    cells: &'c [CellCoord],
    epsilon: f32,
) -> impl Iterator<Item = &'s PlacedObject> + 'c {
    let id = object.id;
    let top = object.top();
    scene.iter().filter(move |other| {
        other.id != id
            && (other.bottom() - top).abs() <= epsilon
            && cells_overlap(cells, &other.cells(grid))
    })
}

/// Whether removing `id` would leave a house without its column
///
/// Houses and unknown ids are never supporting.
pub fn is_supporting(scene: &Scene, grid: &Grid, id: ObjectId, epsilon: f32) -> bool {
    let Some(start) = scene.get(id) else {
        return false;
    };
    if !start.kind.supports_others() {
        return false;
    }

    let mut visited = HashSet::from([id]);
    let mut frontier = vec![start];
    while let Some(current) = frontier.pop() {
        let cells = current.cells(grid);
        for above in resting_on(scene, grid, current, &cells, epsilon) {
            if above.kind.is_objective() {
                return true;
            }
            if above.kind.supports_others() && visited.insert(above.id) {
                frontier.push(above);
            }
        }
    }
    false
}

/// Whether anything rests directly on `id`
pub fn has_load(scene: &Scene, grid: &Grid, id: ObjectId, epsilon: f32) -> bool {
    let Some(object) = scene.get(id) else {
        return false;
    };
    let cells = object.cells(grid);
    resting_on(scene, grid, object, &cells, epsilon).next().is_some()
}
