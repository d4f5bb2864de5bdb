use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Index of an obstacle inside its [`CollisionSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub usize);

/// Shape tag. Only boxes are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleShape {
    Box,
}

/// A static obstacle described by its world-space corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    pub min: Vec3,
    pub max: Vec3,
}

impl Obstacle {
    /// Box spanning `center ± size / 2`. No validation.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            shape: ObstacleShape::Box,
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Push needed to move a circle of `radius` at `position` out of this
    /// obstacle's X/Z rectangle, or `None` if they do not overlap.
    pub fn penetration(&self, position: Vec3, radius: f32) -> Option<Vec3> {
        match self.shape {
            ObstacleShape::Box => self.box_penetration(position, radius),
        }
    }

    fn box_penetration(&self, position: Vec3, radius: f32) -> Option<Vec3> {
        let closest_x = self.min.x.max(position.x.min(self.max.x));
        let closest_z = self.min.z.max(position.z.min(self.max.z));

        let offset = Vec2::new(position.x - closest_x, position.z - closest_z);
        let distance_sq = offset.length_squared();
        if !(distance_sq < radius * radius) {
            return None;
        }

        let distance = distance_sq.sqrt();
        if distance > 0.0 {
            let push = offset / distance * (radius - distance);
            return Some(Vec3::new(push.x, 0.0, push.y));
        }

        // The probe sits on the rectangle: leave through the nearest edge.
        Some(self.eject_through_nearest_edge(position, radius))
    }

    fn eject_through_nearest_edge(&self, position: Vec3, radius: f32) -> Vec3 {
        let exits = [
            (position.x - self.min.x, Vec3::NEG_X),
            (self.max.x - position.x, Vec3::X),
            (position.z - self.min.z, Vec3::NEG_Z),
            (self.max.z - position.z, Vec3::Z),
        ];
        let (depth, normal) = exits
            .into_iter()
            .fold((f32::INFINITY, Vec3::NEG_X), |best, exit| {
                if exit.0 < best.0 { exit } else { best }
            });
        normal * (depth.max(0.0) + radius)
    }
}

/// How overlapping obstacles combine into one correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// The first penetrating obstacle in insertion order wins.
    #[default]
    FirstHit,
    /// Pushes from every penetrating obstacle are summed.
    Accumulate,
}

/// Errors from the validating obstacle constructor.
#[derive(Debug, thiserror::Error)]
pub enum CollisionError {
    #[error("obstacle size {0:?} has a negative component")]
    NegativeSize(Vec3),
    #[error("obstacle center {center:?} or size {size:?} is not finite")]
    NonFinite { center: Vec3, size: Vec3 },
}

/// Owns the static obstacles of a scene and answers push queries.
#[derive(Debug, Clone, Default)]
pub struct CollisionSystem {
    obstacles: Vec<Obstacle>,
    mode: ResolveMode,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: ResolveMode) -> Self {
        Self {
            obstacles: Vec::new(),
            mode,
        }
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ResolveMode) {
        self.mode = mode;
    }

    /// Append a box spanning `center ± size / 2`.
    ///
    /// Zero or negative sizes are accepted and produce degenerate or inverted
    /// boxes; use [`Self::try_add_box_collider`] to reject them.
    pub fn add_box_collider(&mut self, center: Vec3, size: Vec3) -> ObstacleId {
        let id = ObstacleId(self.obstacles.len());
        self.obstacles.push(Obstacle::from_center_size(center, size));
        id
    }

    /// Like [`Self::add_box_collider`] but refuses negative or non-finite input.
    pub fn try_add_box_collider(
        &mut self,
        center: Vec3,
        size: Vec3,
    ) -> Result<ObstacleId, CollisionError> {
        if !center.is_finite() || !size.is_finite() {
            tracing::warn!(?center, ?size, "rejected non-finite obstacle");
            return Err(CollisionError::NonFinite { center, size });
        }
        if size.min_element() < 0.0 {
            tracing::warn!(?size, "rejected obstacle with negative size");
            return Err(CollisionError::NegativeSize(size));
        }
        Ok(self.add_box_collider(center, size))
    }

    /// Push vector for a circle of `radius` at `position`, or `None` when no
    /// obstacle is penetrated. The Y component is always zero.
    pub fn check_collision(&self, position: Vec3, radius: f32) -> Option<Vec3> {
        match self.mode {
            ResolveMode::FirstHit => self
                .obstacles
                .iter()
                .find_map(|o| o.penetration(position, radius)),
            ResolveMode::Accumulate => self
                .obstacles
                .iter()
                .filter_map(|o| o.penetration(position, radius))
                .reduce(|a, b| a + b),
        }
    }

    /// Every obstacle the circle currently penetrates, with its own push.
    pub fn contacts(&self, position: Vec3, radius: f32) -> Vec<(ObstacleId, Vec3)> {
        self.obstacles
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.penetration(position, radius).map(|p| (ObstacleId(i), p)))
            .collect()
    }

    /// Remove every obstacle.
    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}
