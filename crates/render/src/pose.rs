//! Stickman pose: turns the avatar and its gait into box transforms.

use glam::{Quat, Vec3};
use labwalk_common::Transform;
use labwalk_kernel::Avatar;

pub const HEAD_SIZE: f32 = 0.3;
pub const TORSO_SIZE: Vec3 = Vec3::new(0.12, 0.6, 0.12);
pub const LIMB_THICKNESS: f32 = 0.08;
pub const ARM_LENGTH: f32 = 0.5;
pub const LEG_LENGTH: f32 = 0.6;
/// Shoulder pivots relative to the foot anchor at rest.
pub const SHOULDER: Vec3 = Vec3::new(0.18, 1.15, 0.0);
/// Hip pivots relative to the foot anchor.
pub const HIP: Vec3 = Vec3::new(0.08, 0.7, 0.0);

/// How the avatar body is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyShape {
    #[default]
    Stickman,
    /// A single upright box standing in for a capsule.
    Capsule,
}

/// World-space origin of the avatar mesh. Stickman parts are modelled from
/// the feet; a capsule is modelled around its centre.
pub fn visual_origin(avatar: &Avatar, shape: BodyShape) -> Vec3 {
    match shape {
        BodyShape::Stickman => avatar.position,
        BodyShape::Capsule => avatar.body_center(),
    }
}

/// Per-part transforms in world space. Scale holds the full box size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickmanPose {
    pub head: Transform,
    pub torso: Transform,
    pub left_arm: Transform,
    pub right_arm: Transform,
    pub left_leg: Transform,
    pub right_leg: Transform,
}

impl StickmanPose {
    pub fn from_avatar(avatar: &Avatar) -> Self {
        let gait = avatar.gait();
        let origin = visual_origin(avatar, BodyShape::Stickman);
        let heading = Quat::from_rotation_y(avatar.facing);
        let bob = gait.body_height - labwalk_kernel::gait::BODY_REST_HEIGHT;

        let place = |local: Vec3, rotation: Quat, size: Vec3| Transform {
            position: origin + heading * local,
            rotation: heading * rotation,
            scale: size,
        };
        let limb = |pivot: Vec3, angle: f32, length: f32| {
            let swing = Quat::from_rotation_x(angle);
            let center = pivot + swing * Vec3::new(0.0, -length / 2.0, 0.0);
            place(
                center,
                swing,
                Vec3::new(LIMB_THICKNESS, length, LIMB_THICKNESS),
            )
        };

        let shoulder_y = SHOULDER.y + bob;
        Self {
            head: place(
                Vec3::new(0.0, gait.head_height, 0.0),
                Quat::IDENTITY,
                Vec3::splat(HEAD_SIZE),
            ),
            torso: place(
                Vec3::new(0.0, gait.body_height, 0.0),
                Quat::IDENTITY,
                TORSO_SIZE,
            ),
            left_arm: limb(
                Vec3::new(-SHOULDER.x, shoulder_y, 0.0),
                gait.left_arm,
                ARM_LENGTH,
            ),
            right_arm: limb(
                Vec3::new(SHOULDER.x, shoulder_y, 0.0),
                gait.right_arm,
                ARM_LENGTH,
            ),
            left_leg: limb(Vec3::new(-HIP.x, HIP.y, 0.0), gait.left_leg, LEG_LENGTH),
            right_leg: limb(Vec3::new(HIP.x, HIP.y, 0.0), gait.right_leg, LEG_LENGTH),
        }
    }

    pub fn parts(&self) -> [Transform; 6] {
        [
            self.head,
            self.torso,
            self.left_arm,
            self.right_arm,
            self.left_leg,
            self.right_leg,
        ]
    }
}
