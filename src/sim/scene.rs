//! Placed objects and the scene that owns them

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::footprint::{CellCoord, Footprint, Grid};
use super::height_map::SurfaceType;

/// Stable identifier of a placed object
pub type ObjectId = u32;

/// House sizes (height in unit blocks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HouseSize {
    Two,
    Four,
    Six,
}

impl HouseSize {
    pub const ALL: [HouseSize; 3] = [HouseSize::Two, HouseSize::Four, HouseSize::Six];

    pub fn height_units(self) -> u32 {
        match self {
            HouseSize::Two => 2,
            HouseSize::Four => 4,
            HouseSize::Six => 6,
        }
    }
}

/// Every placeable object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    /// Plain block, destroyed by one hit
    Wall,
    /// Reinforced block, damaged by the first hit
    Strong,
    /// Objective; nothing may be built on it
    House(HouseSize),
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Wall => "wall",
            Kind::Strong => "strong",
            Kind::House(HouseSize::Two) => "house2",
            Kind::House(HouseSize::Four) => "house4",
            Kind::House(HouseSize::Six) => "house6",
        }
    }

    /// Vertical extent in world units
    pub fn height(&self) -> f32 {
        match self {
            Kind::Wall | Kind::Strong => 1.0,
            Kind::House(size) => size.height_units() as f32,
        }
    }

    /// Base footprint before rotation
    pub fn footprint(&self) -> Footprint {
        match self {
            Kind::Wall | Kind::Strong => Footprint::UNIT,
            Kind::House(_) => Footprint::new(2, 2),
        }
    }

    /// Whether other objects may rest on this one
    pub fn supports_others(&self) -> bool {
        matches!(self, Kind::Wall | Kind::Strong)
    }

    /// Houses are what the attacker must destroy
    pub fn is_objective(&self) -> bool {
        matches!(self, Kind::House(_))
    }

    /// Surface this kind exposes in the height map
    pub fn surface(&self) -> SurfaceType {
        match self {
            Kind::Wall => SurfaceType::Wall,
            Kind::Strong => SurfaceType::Strong,
            Kind::House(_) => SurfaceType::House,
        }
    }
}

/// An object standing in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub id: ObjectId,
    pub kind: Kind,
    /// x/z snapped to the grid, y is the vertical centre
    pub position: Vec3,
    /// Quarter turns about the vertical axis
    pub rotation: u8,
    /// Strong blocks only: already hit once
    pub damaged: bool,
    /// Money returned on voluntary removal
    pub refund: u32,
}

impl PlacedObject {
    pub fn height(&self) -> f32 {
        self.kind.height()
    }

    pub fn bottom(&self) -> f32 {
        self.position.y - self.height() / 2.0
    }

    pub fn top(&self) -> f32 {
        self.position.y + self.height() / 2.0
    }

    pub fn footprint(&self) -> Footprint {
        self.kind.footprint().rotated(self.rotation)
    }

    pub fn cells(&self, grid: &Grid) -> Vec<CellCoord> {
        grid.covered_cells(self.position, self.footprint())
    }

    /// Axis-aligned bounds (min, max)
    pub fn bounds(&self, grid: &Grid) -> (Vec3, Vec3) {
        let fp = self.footprint();
        let half = Vec3::new(
            fp.sx as f32 * grid.cell_size / 2.0,
            self.height() / 2.0,
            fp.sz as f32 * grid.cell_size / 2.0,
        );
        (self.position - half, self.position + half)
    }
}

/// Owned collection of placed objects (iterated in id order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    objects: BTreeMap<ObjectId, PlacedObject>,
    next_id: ObjectId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Add an object and return its id
    pub fn spawn(&mut self, kind: Kind, position: Vec3, rotation: u8, refund: u32) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(
            id,
            PlacedObject {
                id,
                kind,
                position,
                rotation: rotation % 4,
                damaged: false,
                refund,
            },
        );
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<PlacedObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PlacedObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of houses still standing
    pub fn houses_remaining(&self) -> usize {
        self.iter().filter(|o| o.kind.is_objective()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut scene = Scene::new();
        let a = scene.spawn(Kind::Wall, Vec3::new(0.5, 0.5, 0.5), 0, 1);
        let b = scene.spawn(Kind::Strong, Vec3::new(1.5, 0.5, 0.5), 0, 3);
        assert!(b > a);
        assert_eq!(scene.len(), 2);
        let ids: Vec<_> = scene.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_vertical_extent() {
        let mut scene = Scene::new();
        let id = scene.spawn(Kind::House(HouseSize::Four), Vec3::new(0.0, 3.0, 0.0), 0, 0);
        let house = scene.get(id).unwrap();
        assert_eq!(house.bottom(), 1.0);
        assert_eq!(house.top(), 5.0);
        assert_eq!(house.cells(&Grid::default()).len(), 4);
    }

    #[test]
    fn test_house_footprint_ignores_rotation() {
        let mut scene = Scene::new();
        let id = scene.spawn(Kind::House(HouseSize::Two), Vec3::new(0.0, 1.0, 0.0), 1, 0);
        assert_eq!(scene.get(id).unwrap().footprint(), Footprint::new(2, 2));
    }

    #[test]
    fn test_houses_remaining() {
        let mut scene = Scene::new();
        scene.spawn(Kind::Wall, Vec3::new(0.5, 0.5, 0.5), 0, 1);
        let house = scene.spawn(Kind::House(HouseSize::Six), Vec3::new(4.0, 3.0, 4.0), 0, 0);
        assert_eq!(scene.houses_remaining(), 1);
        scene.remove(house);
        assert_eq!(scene.houses_remaining(), 0);
    }
}
