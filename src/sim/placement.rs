//! Placement validation against the height map

use super::footprint::{CellCoord, Grid};
use super::height_map::{HeightMap, SurfaceType};
use super::scene::Kind;

/// Why a placement (or a drag that would lead to one) was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("footprint leaves the build grid")]
    OutOfBounds,
    #[error("nothing can be built on a house")]
    OnHouse,
    #[error("support surface is not flat")]
    Uneven,
    #[error("a house must rest on a single kind of surface")]
    MixedSupport,
    #[error("not enough money")]
    InsufficientFunds,
    #[error("placement limit reached for this kind")]
    LimitReached,
    #[error("building is only possible during the building phase")]
    WrongPhase,
    #[error("another drag is already in progress")]
    DragInProgress,
    #[error("structure is still settling")]
    Busy,
    #[error("no drag in progress")]
    NoSession,
    #[error("pointer never reached the ground")]
    NoPosition,
}

/// Validate a footprint and return the height it would rest on
///
/// Pure: reads the height map only. Absent cells count as ground at 0.
///
/// # Arguments
/// * `cells` - Cells covered by the candidate footprint
/// * `kind` - Kind being placed (houses also need a uniform support surface)
/// * `epsilon` - Flatness tolerance
pub fn can_place(
    cells: &[CellCoord],
    kind: Kind,
    height_map: &HeightMap,
    grid: &Grid,
    epsilon: f32,
) -> Result<f32, PlaceError> {
    if cells.is_empty() || cells.iter().any(|&c| !grid.contains(c)) {
        return Err(PlaceError::OutOfBounds);
    }

    let entries: Vec<_> = cells.iter().map(|&c| height_map.get(c)).collect();
    if entries.iter().any(|e| e.surface == SurfaceType::House) {
        return Err(PlaceError::OnHouse);
    }

    let reference = entries[0];
    if entries
        .iter()
        .any(|e| (e.height - reference.height).abs() > epsilon)
    {
        return Err(PlaceError::Uneven);
    }

    if kind.is_objective() && entries.iter().any(|e| e.surface != reference.surface) {
        return Err(PlaceError::MixedSupport);
    }

    Ok(reference.height)
}

/// Vertical centre of an object resting on `support_height`
#[inline]
pub fn resting_y(support_height: f32, kind: Kind) -> f32 {
    support_height + kind.height() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::EPSILON;
    use crate::sim::footprint::Footprint;
    use crate::sim::scene::{HouseSize, Scene};
    use glam::Vec3;
    use proptest::prelude::*;

    fn unit_cells(grid: &Grid, x: f32, z: f32) -> Vec<CellCoord> {
        let center = grid.snap_point(Vec3::new(x, 0.0, z), Footprint::UNIT);
        grid.covered_cells(center, Footprint::UNIT)
    }

    #[test]
    fn test_wall_on_empty_ground() {
        let grid = Grid::default();
        let map = HeightMap::default();
        let cells = unit_cells(&grid, 0.5, 0.5);
        let height = can_place(&cells, Kind::Wall, &map, &grid, EPSILON).unwrap();
        assert_eq!(height, 0.0);
        assert_eq!(resting_y(height, Kind::Wall), 0.5);
    }

    #[test]
    fn test_strong_stacked_on_wall() {
        let grid = Grid::default();
        let mut scene = Scene::new();
        scene.spawn(Kind::Wall, Vec3::new(0.5, 0.5, 0.5), 0, 1);
        let map = HeightMap::build(&scene, &grid);

        let cells = unit_cells(&grid, 0.5, 0.5);
        let height = can_place(&cells, Kind::Strong, &map, &grid, EPSILON).unwrap();
        assert_eq!(height, 1.0);
        assert_eq!(resting_y(height, Kind::Strong), 1.5);
    }

    #[test]
    fn test_house_straddling_wall_and_ground_rejected() {
        let grid = Grid::default();
        let mut scene = Scene::new();
        scene.spawn(Kind::Wall, Vec3::new(0.5, 0.5, 0.5), 0, 1);
        let map = HeightMap::build(&scene, &grid);

        let kind = Kind::House(HouseSize::Two);
        let cells = grid.covered_cells(Vec3::ZERO, kind.footprint());
        assert_eq!(can_place(&cells, kind, &map, &grid, EPSILON), Err(PlaceError::Uneven));
    }

    #[test]
    fn test_house_on_mixed_surfaces_rejected() {
        let grid = Grid::default();
        let mut scene = Scene::new();
        for (x, z) in [(-0.5, -0.5), (-0.5, 0.5), (0.5, -0.5)] {
            scene.spawn(Kind::Wall, Vec3::new(x, 0.5, z), 0, 1);
        }
        scene.spawn(Kind::Strong, Vec3::new(0.5, 0.5, 0.5), 0, 3);
        let map = HeightMap::build(&scene, &grid);

        let kind = Kind::House(HouseSize::Four);
        let cells = grid.covered_cells(Vec3::ZERO, kind.footprint());
        assert_eq!(
            can_place(&cells, kind, &map, &grid, EPSILON),
            Err(PlaceError::MixedSupport)
        );
        // A wall does not care what it stands on
        assert_eq!(can_place(&cells[..1], Kind::Wall, &map, &grid, EPSILON), Ok(1.0));
    }

    #[test]
    fn test_house_on_uniform_walls() {
        let grid = Grid::default();
        let mut scene = Scene::new();
        for (x, z) in [(-0.5, -0.5), (-0.5, 0.5), (0.5, -0.5), (0.5, 0.5)] {
            scene.spawn(Kind::Wall, Vec3::new(x, 0.5, z), 0, 1);
        }
        let map = HeightMap::build(&scene, &grid);
        let kind = Kind::House(HouseSize::Six);
        let cells = grid.covered_cells(Vec3::ZERO, kind.footprint());
        let height = can_place(&cells, kind, &map, &grid, EPSILON).unwrap();
        assert_eq!(resting_y(height, kind), 4.0);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let grid = Grid::default();
        let map = HeightMap::default();
        let cells = unit_cells(&grid, 20.5, 0.5);
        assert_eq!(
            can_place(&cells, Kind::Wall, &map, &grid, EPSILON),
            Err(PlaceError::OutOfBounds)
        );
        assert_eq!(
            can_place(&[], Kind::Wall, &map, &grid, EPSILON),
            Err(PlaceError::OutOfBounds)
        );
    }

    proptest! {
        #[test]
        fn prop_nothing_stacks_on_a_house(
            size in prop::sample::select(HouseSize::ALL.to_vec()),
            dx in -2i32..2,
            dz in -2i32..2,
            wall in any::<bool>(),
        ) {
            let grid = Grid::default();
            let mut scene = Scene::new();
            scene.spawn(Kind::House(size), Vec3::new(0.0, size.height_units() as f32 / 2.0, 0.0), 0, 0);
            let map = HeightMap::build(&scene, &grid);

            let kind = if wall { Kind::Wall } else { Kind::Strong };
            let cells = vec![CellCoord::new(dx, dz)];
            let on_house = (-1..1).contains(&dx) && (-1..1).contains(&dz);
            let result = can_place(&cells, kind, &map, &grid, EPSILON);
            prop_assert_eq!(result == Err(PlaceError::OnHouse), on_house);
        }

        #[test]
        fn prop_flatness(heights in prop::collection::vec(0u32..3, 4)) {
            let grid = Grid::default();
            let mut scene = Scene::new();
            let corners = [(-0.5, -0.5), (-0.5, 0.5), (0.5, -0.5), (0.5, 0.5)];
            for (&(x, z), &h) in corners.iter().zip(&heights) {
                for level in 0..h {
                    scene.spawn(Kind::Wall, Vec3::new(x, level as f32 + 0.5, z), 0, 1);
                }
            }
            let map = HeightMap::build(&scene, &grid);
            let cells = grid.covered_cells(Vec3::ZERO, Footprint::new(2, 2));

            let flat = heights.iter().all(|&h| h == heights[0]);
            match can_place(&cells, Kind::Wall, &map, &grid, EPSILON) {
                Ok(height) => {
                    prop_assert!(flat);
                    prop_assert_eq!(height, heights[0] as f32);
                }
                Err(err) => {
                    prop_assert!(!flat);
                    prop_assert_eq!(err, PlaceError::Uneven);
                }
            }
        }
    }
}
