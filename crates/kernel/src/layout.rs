//! Static layout of the laboratory entrance: building walls, street lamps,
//! and seeded trees. Each prop doubles as a collider and a draw hint.

use crate::config::LayoutConfig;
use glam::Vec3;
use labwalk_collision::{CollisionError, CollisionSystem};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Building footprint origin on the ground.
pub const BUILDING_ORIGIN: Vec3 = Vec3::new(0.0, 0.0, 25.0);
pub const BUILDING_WIDTH: f32 = 30.0;
pub const BUILDING_DEPTH: f32 = 25.0;
pub const BUILDING_HEIGHT: f32 = 10.0;
pub const WALL_THICKNESS: f32 = 0.8;
/// Width of each front wall segment beside the door gap.
pub const FRONT_SEGMENT_WIDTH: f32 = 10.0;

pub const LAMP_COLUMNS: [f32; 2] = [-4.5, 4.5];
pub const LAMP_FIRST_Z: f32 = -15.0;
pub const LAMP_LAST_Z: f32 = 20.0;
pub const LAMP_SPACING: f32 = 8.0;
pub const LAMP_COLLIDER: Vec3 = Vec3::new(0.3, 4.0, 0.3);

pub const TREE_MIN_RADIUS: f32 = 20.0;
pub const TREE_RADIUS_SPAN: f32 = 30.0;
pub const TREE_COLLIDER: Vec3 = Vec3::new(0.8, 2.0, 0.8);

/// Door leaf dimensions and placement relative to the door axis.
pub const DOOR_LEAF_SIZE: Vec3 = Vec3::new(3.8, 7.5, 0.3);
pub const DOOR_LEAF_CENTER_Y: f32 = 4.0;
pub const DOOR_LEAF_Z: f32 = BUILDING_ORIGIN.z - BUILDING_DEPTH / 2.0 - 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    Wall,
    Roof,
    Lamp,
    Tree,
    Path,
}

impl PropKind {
    /// Whether this prop registers a collider.
    pub fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::Lamp | Self::Tree)
    }
}

/// A placed box: collider extent for solid props, visual extent otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub kind: PropKind,
    pub center: Vec3,
    pub size: Vec3,
}

impl Prop {
    fn new(kind: PropKind, center: Vec3, size: Vec3) -> Self {
        Self { kind, center, size }
    }
}

/// The full entrance scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntranceLayout {
    pub props: Vec<Prop>,
}

impl EntranceLayout {
    pub fn build(config: &LayoutConfig) -> Self {
        let mut props = Vec::new();
        building(&mut props);
        lamps(&mut props);
        trees(&mut props, config);
        Self { props }
    }

    pub fn solid(&self) -> impl Iterator<Item = &Prop> {
        self.props.iter().filter(|p| p.kind.is_solid())
    }

    pub fn count(&self, kind: PropKind) -> usize {
        self.props.iter().filter(|p| p.kind == kind).count()
    }

    /// Register every solid prop with `collision`. Returns how many were added.
    pub fn populate(&self, collision: &mut CollisionSystem) -> Result<usize, CollisionError> {
        let mut added = 0;
        for prop in self.solid() {
            collision.try_add_box_collider(prop.center, prop.size)?;
            added += 1;
        }
        tracing::debug!(added, total = collision.len(), "registered layout colliders");
        Ok(added)
    }
}

fn building(props: &mut Vec<Prop>) {
    let o = BUILDING_ORIGIN;
    let half_h = BUILDING_HEIGHT / 2.0;
    let side = Vec3::new(WALL_THICKNESS, BUILDING_HEIGHT, BUILDING_DEPTH);
    let back = Vec3::new(BUILDING_WIDTH, BUILDING_HEIGHT, WALL_THICKNESS);
    let front = Vec3::new(FRONT_SEGMENT_WIDTH, BUILDING_HEIGHT, WALL_THICKNESS);
    let front_z = o.z - BUILDING_DEPTH / 2.0;

    props.push(Prop::new(PropKind::Wall, Vec3::new(o.x - BUILDING_WIDTH / 2.0, half_h, o.z), side));
    props.push(Prop::new(PropKind::Wall, Vec3::new(o.x + BUILDING_WIDTH / 2.0, half_h, o.z), side));
    props.push(Prop::new(
        PropKind::Wall,
        Vec3::new(o.x, half_h, o.z + BUILDING_DEPTH / 2.0),
        back,
    ));
    props.push(Prop::new(PropKind::Wall, Vec3::new(o.x - 10.0, half_h, front_z), front));
    props.push(Prop::new(PropKind::Wall, Vec3::new(o.x + 10.0, half_h, front_z), front));

    props.push(Prop::new(
        PropKind::Roof,
        Vec3::new(o.x, BUILDING_HEIGHT + 0.4, o.z),
        Vec3::new(BUILDING_WIDTH + 2.0, 0.8, BUILDING_DEPTH + 2.0),
    ));
    props.push(Prop::new(
        PropKind::Path,
        Vec3::new(0.0, 0.015, 0.0),
        Vec3::new(6.0, 0.03, 40.0),
    ));
}

fn lamps(props: &mut Vec<Prop>) {
    for x in LAMP_COLUMNS {
        let mut z = LAMP_FIRST_Z;
        while z < LAMP_LAST_Z {
            props.push(Prop::new(
                PropKind::Lamp,
                Vec3::new(x, LAMP_COLLIDER.y / 2.0, z),
                LAMP_COLLIDER,
            ));
            z += LAMP_SPACING;
        }
    }
}

fn trees(props: &mut Vec<Prop>, config: &LayoutConfig) {
    let mut rng = SplitMix::new(config.seed);
    for _ in 0..config.tree_attempts {
        let angle = rng.next_f32() * TAU;
        let radius = TREE_MIN_RADIUS + rng.next_f32() * TREE_RADIUS_SPAN;
        let x = angle.cos() * radius;
        let z = angle.sin() * radius;
        // Keep the approach path clear.
        if x.abs() > 8.0 || !(-15.0..=30.0).contains(&z) {
            props.push(Prop::new(
                PropKind::Tree,
                Vec3::new(x, TREE_COLLIDER.y / 2.0, z),
                TREE_COLLIDER,
            ));
        }
    }
}

/// Seeded stream of uniform floats built on [`splitmix64`].
struct SplitMix {
    state: u64,
}

impl SplitMix {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Uniform in `[0, 1)` from the top 24 bits.
    fn next_f32(&mut self) -> f32 {
        self.state = splitmix64(self.state);
        (self.state >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// Splitmix64 step: a fast, high-quality deterministic mixer.
pub(crate) fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
