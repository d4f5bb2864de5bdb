//! Procedural walk cycle for the stickman body.

use labwalk_common::damp;

/// Horizontal speed above which the avatar counts as walking.
pub const WALK_SPEED_THRESHOLD: f32 = 0.1;
/// Phase advance per second while walking.
pub const CYCLE_RATE: f32 = 10.0;
/// Peak leg rotation in radians.
pub const LEG_SWING: f32 = 0.6;
/// Arm swing relative to leg swing.
pub const ARM_RATIO: f32 = 0.7;
/// Peak vertical bob of torso and head.
pub const BOUNCE: f32 = 0.06;
pub const BODY_REST_HEIGHT: f32 = 1.0;
pub const HEAD_REST_HEIGHT: f32 = 1.5;
/// Per-frame multiplier pulling limbs back to rest.
pub const LIMB_DECAY: f32 = 0.9;
/// Rate at which the bob returns to neutral height.
pub const BOB_RETURN_RATE: f32 = 5.0;

/// Limb rotations (about the local X axis) and torso/head heights relative
/// to the foot anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gait {
    pub phase: f32,
    pub walking: bool,
    pub left_leg: f32,
    pub right_leg: f32,
    pub left_arm: f32,
    pub right_arm: f32,
    pub body_height: f32,
    pub head_height: f32,
}

impl Default for Gait {
    fn default() -> Self {
        Self {
            phase: 0.0,
            walking: false,
            left_leg: 0.0,
            right_leg: 0.0,
            left_arm: 0.0,
            right_arm: 0.0,
            body_height: BODY_REST_HEIGHT,
            head_height: HEAD_REST_HEIGHT,
        }
    }
}

impl Gait {
    pub fn update(&mut self, dt: f32, horizontal_speed: f32) {
        self.walking = horizontal_speed > WALK_SPEED_THRESHOLD;

        if self.walking {
            self.phase += dt * CYCLE_RATE;

            let swing = self.phase.sin() * LEG_SWING;
            self.left_leg = swing;
            self.right_leg = -swing;
            self.left_arm = -swing * ARM_RATIO;
            self.right_arm = swing * ARM_RATIO;

            let bounce = (self.phase * 2.0).sin().abs() * BOUNCE;
            self.body_height = BODY_REST_HEIGHT + bounce;
            self.head_height = HEAD_REST_HEIGHT + bounce;
        } else {
            self.left_leg *= LIMB_DECAY;
            self.right_leg *= LIMB_DECAY;
            self.left_arm *= LIMB_DECAY;
            self.right_arm *= LIMB_DECAY;

            let t = damp(BOB_RETURN_RATE, dt);
            self.body_height += (BODY_REST_HEIGHT - self.body_height) * t;
            self.head_height += (HEAD_REST_HEIGHT - self.head_height) * t;
        }
    }
}
