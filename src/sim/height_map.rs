//! Height map: highest support surface per cell
//!
//! Always rebuilt from the whole scene; never patched incrementally.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::footprint::{CellCoord, Grid};
use super::scene::Scene;

/// What the top surface of a cell is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    Ground,
    Wall,
    Strong,
    House,
}

/// Top surface of one cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightEntry {
    pub surface: SurfaceType,
    pub height: f32,
}

impl HeightEntry {
    pub const GROUND: Self = Self {
        surface: SurfaceType::Ground,
        height: 0.0,
    };
}

#[derive(Debug, Clone, Default)]
pub struct HeightMap {
    cells: HashMap<CellCoord, HeightEntry>,
}

impl HeightMap {
    pub fn build(scene: &Scene, grid: &Grid) -> Self {
        let mut map = Self::default();
        map.rebuild(scene, grid);
        map
    }

    /// Re-scan every object; the highest top wins each cell
    pub fn rebuild(&mut self, scene: &Scene, grid: &Grid) {
        self.cells.clear();
        for object in scene.iter() {
            let top = object.top();
            let entry = HeightEntry {
                surface: object.kind.surface(),
                height: top,
            };
            for cell in object.cells(grid) {
                self.cells
                    .entry(cell)
                    .and_modify(|e| {
                        if top > e.height {
                            *e = entry;
                        }
                    })
                    .or_insert(entry);
            }
        }
    }

    /// Entry for a cell; untouched cells are bare ground
    pub fn get(&self, cell: CellCoord) -> HeightEntry {
        self.cells.get(&cell).copied().unwrap_or(HeightEntry::GROUND)
    }

    /// Number of cells with something built on them
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::{HouseSize, Kind};
    use glam::Vec3;

    #[test]
    fn test_empty_cells_are_ground() {
        let map = HeightMap::default();
        assert_eq!(map.get(CellCoord::new(3, -4)), HeightEntry::GROUND);
    }

    #[test]
    fn test_highest_top_wins() {
        let grid = Grid::default();
        let mut scene = Scene::new();
        scene.spawn(Kind::Strong, Vec3::new(0.5, 1.5, 0.5), 0, 0);
        scene.spawn(Kind::Wall, Vec3::new(0.5, 0.5, 0.5), 0, 0);

        let map = HeightMap::build(&scene, &grid);
        let entry = map.get(CellCoord::new(0, 0));
        assert_eq!(entry.surface, SurfaceType::Strong);
        assert_eq!(entry.height, 2.0);
    }

    #[test]
    fn test_house_marks_all_cells() {
        let grid = Grid::default();
        let mut scene = Scene::new();
        scene.spawn(Kind::House(HouseSize::Two), Vec3::new(2.0, 1.0, 2.0), 0, 0);

        let map = HeightMap::build(&scene, &grid);
        assert_eq!(map.len(), 4);
        for cell in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            let entry = map.get(CellCoord::new(cell.0, cell.1));
            assert_eq!(entry.surface, SurfaceType::House);
            assert_eq!(entry.height, 2.0);
        }
    }

    #[test]
    fn test_rebuild_forgets_removed_objects() {
        let grid = Grid::default();
        let mut scene = Scene::new();
        let id = scene.spawn(Kind::Wall, Vec3::new(0.5, 0.5, 0.5), 0, 0);
        let mut map = HeightMap::build(&scene, &grid);
        assert_eq!(map.len(), 1);

        scene.remove(id);
        map.rebuild(&scene, &grid);
        assert!(map.is_empty());
    }
}
