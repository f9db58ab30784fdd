//! Drag-to-place
//!
//! A drag starts from a palette selection, follows the pointer across the
//! ground with a snapped and validated preview, and commits on release.
//! Nothing in the scene changes until release, and a failed release changes
//! nothing at all.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::footprint::{CellCoord, Footprint, Grid};
use super::height_map::HeightMap;
use super::placement::{PlaceError, can_place, resting_y};
use super::scene::{HouseSize, Kind, ObjectId};
use super::state::{GameEvent, GamePhase, GameState};

/// Blocks that can be painted with a brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Wall,
    Strong,
}

impl From<BlockKind> for Kind {
    fn from(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Wall => Kind::Wall,
            BlockKind::Strong => Kind::Strong,
        }
    }
}

/// Box of unit blocks placed in one drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brush {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Default for Brush {
    fn default() -> Self {
        Self::UNIT
    }
}

impl Brush {
    pub const UNIT: Self = Self {
        width: 1,
        height: 1,
        depth: 1,
    };

    /// Dimensions below one are raised to one
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            depth: depth.max(1),
        }
    }

    pub fn volume(&self) -> u32 {
        self.width.saturating_mul(self.height).saturating_mul(self.depth)
    }
}

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Candidate {
    Block { kind: BlockKind, brush: Brush },
    House(HouseSize),
}

impl Candidate {
    pub fn block(kind: BlockKind) -> Self {
        Candidate::Block {
            kind,
            brush: Brush::UNIT,
        }
    }

    pub fn kind(&self) -> Kind {
        match *self {
            Candidate::Block { kind, .. } => kind.into(),
            Candidate::House(size) => Kind::House(size),
        }
    }

    /// Footprint after rotation
    pub fn footprint(&self, rotation: u8) -> Footprint {
        match self {
            Candidate::Block { brush, .. } => Footprint::new(brush.width, brush.depth).rotated(rotation),
            Candidate::House(_) => self.kind().footprint().rotated(rotation),
        }
    }

    /// Objects the commit creates (and pays for)
    pub fn units(&self) -> u32 {
        match self {
            Candidate::Block { brush, .. } => brush.volume(),
            Candidate::House(_) => 1,
        }
    }
}

/// Drag controller state as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// Snapped and validated footprint under the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    /// Snapped centre; y is the resting centre of the bottom layer
    pub position: Vec3,
    pub cells: Vec<CellCoord>,
    /// Support height if placeable
    pub verdict: Result<f32, PlaceError>,
}

impl Preview {
    pub fn is_valid(&self) -> bool {
        self.verdict.is_ok()
    }
}

/// The single live drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub candidate: Candidate,
    /// Quarter turns
    pub rotation: u8,
    /// Last ground hit under the pointer
    pub cursor: Option<Vec3>,
    /// Latest evaluation, valid or not
    pub preview: Option<Preview>,
    /// Most recent preview that passed validation
    pub last_valid: Option<Preview>,
}

impl DragSession {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            candidate,
            rotation: 0,
            cursor: None,
            preview: None,
            last_valid: None,
        }
    }
}

/// Pointer collaborator: maps a normalized device coordinate to a ground hit
pub trait GroundRaycaster {
    fn ground_hit(&self, ndc: Vec2) -> Option<Vec3>;
}

impl<F> GroundRaycaster for F
where
    F: Fn(Vec2) -> Option<Vec3>,
{
    fn ground_hit(&self, ndc: Vec2) -> Option<Vec3> {
        self(ndc)
    }
}

/// Casts pointer rays from a camera onto the y = 0 plane
#[derive(Debug, Clone, Copy)]
pub struct GroundPlaneRaycaster {
    inverse_view_proj: Mat4,
}

impl GroundPlaneRaycaster {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            inverse_view_proj: view_proj.inverse(),
        }
    }
}

impl GroundRaycaster for GroundPlaneRaycaster {
    fn ground_hit(&self, ndc: Vec2) -> Option<Vec3> {
        let near = self.inverse_view_proj.project_point3(ndc.extend(0.0));
        let far = self.inverse_view_proj.project_point3(ndc.extend(1.0));
        let dir = far - near;
        if dir.y.abs() <= f32::EPSILON {
            return None;
        }
        let t = -near.y / dir.y;
        (t >= 0.0).then(|| near + dir * t)
    }
}

/// Snap and validate a candidate at a ground hit
pub fn evaluate(
    candidate: &Candidate,
    rotation: u8,
    cursor: Vec3,
    grid: &Grid,
    height_map: &HeightMap,
    epsilon: f32,
) -> Preview {
    let kind = candidate.kind();
    let footprint = candidate.footprint(rotation);
    let snapped = grid.snap_point(cursor, footprint);
    let cells = grid.covered_cells(snapped, footprint);
    let verdict = can_place(&cells, kind, height_map, grid, epsilon);

    // Invalid previews float on the highest cell so the host can still draw them
    let support = verdict.unwrap_or_else(|_| {
        cells
            .iter()
            .map(|&c| height_map.get(c).height)
            .fold(0.0, f32::max)
    });

    Preview {
        position: Vec3::new(snapped.x, resting_y(support, kind), snapped.z),
        cells,
        verdict,
    }
}

impl GameState {
    pub fn drag_state(&self) -> DragState {
        match self.drag {
            Some(_) => DragState::Dragging,
            None => DragState::Idle,
        }
    }

    /// Pick a candidate from the palette and start dragging it
    pub fn begin_drag(&mut self, candidate: Candidate) -> Result<(), PlaceError> {
        if self.phase != GamePhase::Building {
            return Err(PlaceError::WrongPhase);
        }
        if self.drag.is_some() {
            return Err(PlaceError::DragInProgress);
        }
        if self.is_settling() {
            return Err(PlaceError::Busy);
        }
        self.rebuild_height_map();
        self.drag = Some(DragSession::new(candidate));
        self.push_event(GameEvent::CameraLock(true));
        Ok(())
    }

    /// Follow the pointer; a miss keeps the previous preview
    pub fn drag_pointer_moved(&mut self, ndc: Vec2, raycaster: &impl GroundRaycaster) -> Option<&Preview> {
        let session = self.drag.as_mut()?;
        if let Some(hit) = raycaster.ground_hit(ndc) {
            session.cursor = Some(hit);
            self.refresh_preview();
        }
        self.drag.as_ref().and_then(|s| s.preview.as_ref())
    }

    /// Quarter-turn the candidate and re-validate in place
    pub fn rotate_drag(&mut self) -> Option<&Preview> {
        let session = self.drag.as_mut()?;
        session.rotation = (session.rotation + 1) % 4;
        self.refresh_preview();
        self.drag.as_ref().and_then(|s| s.preview.as_ref())
    }

    fn refresh_preview(&mut self) {
        let epsilon = self.settings.physics.epsilon;
        let Some(session) = self.drag.as_mut() else {
            return;
        };
        let Some(cursor) = session.cursor else {
            return;
        };
        let preview = evaluate(
            &session.candidate,
            session.rotation,
            cursor,
            &self.grid,
            &self.height_map,
            epsilon,
        );
        if preview.is_valid() {
            session.last_valid = Some(preview.clone());
        }
        session.preview = Some(preview);
    }

    /// Drop the candidate: commit if everything checks out, else cancel
    pub fn release_drag(&mut self) -> Result<Vec<ObjectId>, PlaceError> {
        let session = self.drag.take().ok_or(PlaceError::NoSession)?;
        self.push_event(GameEvent::CameraLock(false));

        let kind = session.candidate.kind();
        match self.commit(&session) {
            Ok(ids) => {
                log::info!("Placed {} x{} ({} money left)", kind.as_str(), ids.len(), self.economy.money);
                self.push_event(GameEvent::Placed { kind, ids: ids.clone() });
                Ok(ids)
            }
            Err(reason) => {
                log::debug!("Placement of {} cancelled: {}", kind.as_str(), reason);
                self.push_event(GameEvent::PlacementCancelled { reason });
                Err(reason)
            }
        }
    }

    /// Abandon the drag without placing anything
    pub fn cancel_drag(&mut self) {
        if self.drag.take().is_some() {
            self.push_event(GameEvent::CameraLock(false));
        }
    }

    fn commit(&mut self, session: &DragSession) -> Result<Vec<ObjectId>, PlaceError> {
        let cursor = session.cursor.ok_or(PlaceError::NoPosition)?;
        self.rebuild_height_map();
        let preview = evaluate(
            &session.candidate,
            session.rotation,
            cursor,
            &self.grid,
            &self.height_map,
            self.settings.physics.epsilon,
        );
        let support = preview.verdict?;

        let kind = session.candidate.kind();
        self.economy.purchase(kind, session.candidate.units())?;
        let refund = self.economy.unit_cost(kind);

        let ids = match session.candidate {
            Candidate::House(_) => {
                vec![self.scene.spawn(kind, preview.position, session.rotation, refund)]
            }
            Candidate::Block { brush, .. } => {
                let mut ids = Vec::with_capacity(brush.volume() as usize);
                for layer in 0..brush.height {
                    let y = resting_y(support + layer as f32 * kind.height(), kind);
                    for &cell in &preview.cells {
                        let center = self.grid.cell_center(cell);
                        ids.push(self.scene.spawn(kind, Vec3::new(center.x, y, center.y), 0, refund));
                    }
                }
                ids
            }
        };

        self.rebuild_height_map();
        self.notify_economy();
        Ok(ids)
    }
}
