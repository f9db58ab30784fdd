//! Grid geometry: cell coordinates, snapping and footprint coverage
//!
//! Odd spans centre on a cell, even spans centre on a grid line. Both rules
//! meet in [`Grid::covered_cells`], which always yields exactly `sx * sz`
//! distinct cells for a snapped centre.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::GridSettings;

/// Integer cell on the build grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub ix: i32,
    pub iz: i32,
}

impl CellCoord {
    pub const fn new(ix: i32, iz: i32) -> Self {
        Self { ix, iz }
    }
}

/// Cells an object occupies along x and z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub sx: u32,
    pub sz: u32,
}

impl Footprint {
    pub const UNIT: Self = Self { sx: 1, sz: 1 };

    pub const fn new(sx: u32, sz: u32) -> Self {
        Self { sx, sz }
    }

    /// Apply a rotation in quarter turns (odd turns swap the axes)
    pub fn rotated(self, quarter_turns: u8) -> Self {
        if quarter_turns % 2 == 1 {
            Self { sx: self.sz, sz: self.sx }
        } else {
            self
        }
    }

    pub fn area(self) -> u32 {
        self.sx.saturating_mul(self.sz)
    }
}

/// Build grid: cell size and bounded extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub cell_size: f32,
    pub half_cells: i32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            half_cells: HALF_CELLS,
        }
    }
}

impl From<&GridSettings> for Grid {
    fn from(settings: &GridSettings) -> Self {
        Self {
            cell_size: settings.cell_size,
            half_cells: settings.half_cells,
        }
    }
}

impl Grid {
    /// Cell containing a world-space point
    pub fn cell_of(&self, x: f32, z: f32) -> CellCoord {
        CellCoord {
            ix: (x / self.cell_size).floor() as i32,
            iz: (z / self.cell_size).floor() as i32,
        }
    }

    /// World-space centre of a cell (x, z)
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.ix as f32 + 0.5) * self.cell_size,
            (cell.iz as f32 + 0.5) * self.cell_size,
        )
    }

    /// Whether a cell lies inside `[-half_cells, half_cells)` on both axes
    pub fn contains(&self, cell: CellCoord) -> bool {
        let range = -self.half_cells..self.half_cells;
        range.contains(&cell.ix) && range.contains(&cell.iz)
    }

    /// Whether a footprint is small enough to lie on the grid at all
    pub fn fits(&self, footprint: Footprint) -> bool {
        let span = self.half_cells.max(0).unsigned_abs().saturating_mul(2);
        footprint.sx <= span && footprint.sz <= span
    }

    /// Snap one coordinate for an object spanning `span` cells on that axis
    ///
    /// Odd spans land on the centre of the cell containing `v`; even spans
    /// land on the nearest grid line. Snapping a snapped value is a no-op.
    pub fn snap(&self, v: f32, span: u32) -> f32 {
        let cs = self.cell_size;
        if span % 2 == 1 {
            ((v / cs).floor() + 0.5) * cs
        } else {
            (v / cs).round() * cs
        }
    }

    /// Snap a ground hit for the given footprint (y is preserved)
    pub fn snap_point(&self, point: Vec3, footprint: Footprint) -> Vec3 {
        Vec3::new(
            self.snap(point.x, footprint.sx),
            point.y,
            self.snap(point.z, footprint.sz),
        )
    }

    /// Cells covered by a footprint centred at `center` (x, z of a Vec3)
    ///
    /// Empty when the footprint is wider than the grid on either axis.
    pub fn covered_cells(&self, center: Vec3, footprint: Footprint) -> Vec<CellCoord> {
        if !self.fits(footprint) {
            return Vec::new();
        }
        let cs = self.cell_size;
        let start_x = (center.x / cs - footprint.sx as f32 / 2.0).round() as i32;
        let start_z = (center.z / cs - footprint.sz as f32 / 2.0).round() as i32;

        let mut cells = Vec::with_capacity(footprint.area() as usize);
        for dx in 0..footprint.sx as i32 {
            for dz in 0..footprint.sz as i32 {
                cells.push(CellCoord::new(start_x + dx, start_z + dz));
            }
        }
        cells
    }
}

/// Whether two cell sets share at least one cell
pub fn cells_overlap(a: &[CellCoord], b: &[CellCoord]) -> bool {
    a.iter().any(|cell| b.contains(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_odd_span_centres_on_cell() {
        let grid = Grid::default();
        assert_eq!(grid.snap(0.2, 1), 0.5);
        assert_eq!(grid.snap(-0.2, 1), -0.5);
        assert_eq!(grid.snap(3.99, 3), 3.5);
    }

    #[test]
    fn test_even_span_centres_on_line() {
        let grid = Grid::default();
        assert_eq!(grid.snap(0.4, 2), 0.0);
        assert_eq!(grid.snap(0.6, 2), 1.0);
        assert_eq!(grid.snap(-2.7, 4), -3.0);
    }

    #[test]
    fn test_unit_block_covers_its_cell() {
        let grid = Grid::default();
        let center = grid.snap_point(Vec3::new(0.3, 0.0, 0.7), Footprint::UNIT);
        assert_eq!(grid.covered_cells(center, Footprint::UNIT), vec![CellCoord::new(0, 0)]);
    }

    #[test]
    fn test_house_straddles_grid_line() {
        let grid = Grid::default();
        let center = grid.snap_point(Vec3::new(0.1, 0.0, -0.2), Footprint::new(2, 2));
        assert_eq!(center, Vec3::new(0.0, 0.0, 0.0));
        let cells = grid.covered_cells(center, Footprint::new(2, 2));
        assert_eq!(
            cells,
            vec![
                CellCoord::new(-1, -1),
                CellCoord::new(-1, 0),
                CellCoord::new(0, -1),
                CellCoord::new(0, 0),
            ]
        );
    }

    #[test]
    fn test_rotation_swaps_odd_turns() {
        let fp = Footprint::new(3, 1);
        assert_eq!(fp.rotated(1), Footprint::new(1, 3));
        assert_eq!(fp.rotated(2), fp);
        assert_eq!(fp.rotated(3), Footprint::new(1, 3));
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::default();
        assert!(grid.contains(CellCoord::new(-20, 19)));
        assert!(!grid.contains(CellCoord::new(20, 0)));
        assert!(!grid.contains(CellCoord::new(0, -21)));
    }

    #[test]
    fn test_oversized_footprint_covers_nothing() {
        let grid = Grid::default();
        assert!(grid.fits(Footprint::new(40, 1)));
        assert!(!grid.fits(Footprint::new(41, 1)));
        let huge = Footprint::new(70_000, 70_000);
        assert_eq!(huge.area(), u32::MAX);
        assert!(grid.covered_cells(Vec3::ZERO, huge).is_empty());
    }

    proptest! {
        #[test]
        fn prop_snap_idempotent(v in -25.0f32..25.0, span in 1u32..6) {
            let grid = Grid::default();
            let once = grid.snap(v, span);
            prop_assert_eq!(grid.snap(once, span), once);
        }

        #[test]
        fn prop_covered_cells_exact(
            x in -15.0f32..15.0,
            z in -15.0f32..15.0,
            sx in 1u32..6,
            sz in 1u32..6,
        ) {
            let grid = Grid::default();
            let fp = Footprint::new(sx, sz);
            let center = grid.snap_point(Vec3::new(x, 0.0, z), fp);
            let cells = grid.covered_cells(center, fp);
            prop_assert_eq!(cells.len(), (sx * sz) as usize);

            let mut unique = cells.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), cells.len());

            // Footprint is centred on the snapped point
            let min_x = cells.iter().map(|c| c.ix).min().unwrap_or_default();
            let mid_x = (min_x as f32 + sx as f32 / 2.0) * grid.cell_size;
            prop_assert!((mid_x - center.x).abs() < 1e-4);
        }
    }
}
