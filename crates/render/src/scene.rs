//! Draw list: everything the scene shows, as coloured boxes.

use crate::pose::{BodyShape, StickmanPose, visual_origin};
use glam::{Quat, Vec3};
use labwalk_common::Transform;
use labwalk_kernel::layout::{DOOR_LEAF_CENTER_Y, DOOR_LEAF_SIZE, DOOR_LEAF_Z};
use labwalk_kernel::{Prop, PropKind, Simulation, TriggerState};

pub type Rgba = [f32; 4];

pub const SKY: Rgba = [0.04, 0.055, 0.15, 1.0];
pub const GROUND: Rgba = [0.1, 0.23, 0.1, 1.0];
pub const WALL: Rgba = [0.85, 0.85, 0.82, 1.0];
pub const ROOF: Rgba = [0.35, 0.35, 0.38, 1.0];
pub const PATH: Rgba = [0.29, 0.29, 0.29, 1.0];
pub const LAMP_POST: Rgba = [0.2, 0.2, 0.22, 1.0];
pub const LAMP_BULB: Rgba = [1.0, 0.95, 0.7, 1.0];
pub const TRUNK: Rgba = [0.4, 0.26, 0.13, 1.0];
pub const CANOPY: Rgba = [0.13, 0.45, 0.18, 1.0];
pub const DOOR: Rgba = [0.45, 0.6, 0.75, 1.0];
pub const STICKMAN: Rgba = [0.1, 0.1, 0.1, 1.0];
pub const STICKMAN_HEAD: Rgba = [0.95, 0.8, 0.65, 1.0];

/// Distance fog blends into the sky colour between these ranges.
pub const FOG_NEAR: f32 = 20.0;
pub const FOG_FAR: f32 = 60.0;
pub const GROUND_EXTENT: f32 = 150.0;

const BULB_SIZE: f32 = 0.5;
const CANOPY_SIZE: Vec3 = Vec3::new(2.4, 2.4, 2.4);

/// One box to draw. `transform.scale` is the full box size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxInstance {
    pub transform: Transform,
    pub color: Rgba,
}

impl BoxInstance {
    pub fn new(transform: Transform, color: Rgba) -> Self {
        Self { transform, color }
    }
}

/// A frame's worth of presentation state derived from the simulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub boxes: Vec<BoxInstance>,
    /// Full-screen black overlay opacity in `[0, 1]`.
    pub fade_alpha: f32,
    pub scene_switched: bool,
}

impl DrawList {
    pub fn build(sim: &Simulation) -> Self {
        Self::build_with(sim, BodyShape::default())
    }

    pub fn build_with(sim: &Simulation, body: BodyShape) -> Self {
        let mut boxes = Vec::with_capacity(sim.layout().props.len() * 2 + 9);
        boxes.push(BoxInstance::new(
            Transform::from_box(
                Vec3::new(0.0, -0.05, 0.0),
                Vec3::new(GROUND_EXTENT, 0.1, GROUND_EXTENT),
            ),
            GROUND,
        ));
        for prop in &sim.layout().props {
            push_prop(&mut boxes, prop);
        }

        let door = sim.door();
        let hinge = door.config().position;
        for x in [door.left_leaf_x(), door.right_leaf_x()] {
            let center = Vec3::new(hinge.x + x, DOOR_LEAF_CENTER_Y, DOOR_LEAF_Z);
            boxes.push(BoxInstance::new(
                Transform::from_box(center, DOOR_LEAF_SIZE),
                DOOR,
            ));
        }

        let avatar = sim.avatar();
        match body {
            BodyShape::Stickman => {
                let pose = StickmanPose::from_avatar(avatar);
                boxes.push(BoxInstance::new(pose.head, STICKMAN_HEAD));
                for part in &pose.parts()[1..] {
                    boxes.push(BoxInstance::new(*part, STICKMAN));
                }
            }
            BodyShape::Capsule => {
                let diameter = avatar.radius * 2.0;
                boxes.push(BoxInstance::new(
                    Transform {
                        position: visual_origin(avatar, BodyShape::Capsule),
                        rotation: Quat::from_rotation_y(avatar.facing),
                        scale: Vec3::new(diameter, avatar.height, diameter),
                    },
                    STICKMAN,
                ));
            }
        }

        tracing::trace!(boxes = boxes.len(), tick = sim.tick(), "draw list built");
        Self {
            boxes,
            fade_alpha: door.fade_alpha(),
            scene_switched: door.state() == TriggerState::SceneSwitched,
        }
    }
}

fn push_prop(boxes: &mut Vec<BoxInstance>, prop: &Prop) {
    let body = Transform::from_box(prop.center, prop.size);
    let top = prop.center.y + prop.size.y / 2.0;
    match prop.kind {
        PropKind::Wall => boxes.push(BoxInstance::new(body, WALL)),
        PropKind::Roof => boxes.push(BoxInstance::new(body, ROOF)),
        PropKind::Path => boxes.push(BoxInstance::new(body, PATH)),
        PropKind::Lamp => {
            boxes.push(BoxInstance::new(body, LAMP_POST));
            let bulb = Vec3::new(prop.center.x, top + BULB_SIZE / 2.0, prop.center.z);
            boxes.push(BoxInstance::new(
                Transform::from_box(bulb, Vec3::splat(BULB_SIZE)),
                LAMP_BULB,
            ));
        }
        PropKind::Tree => {
            boxes.push(BoxInstance::new(body, TRUNK));
            let crown = Vec3::new(prop.center.x, top + CANOPY_SIZE.y / 2.0, prop.center.z);
            boxes.push(BoxInstance::new(
                Transform::from_box(crown, CANOPY_SIZE),
                CANOPY,
            ));
        }
    }
}
