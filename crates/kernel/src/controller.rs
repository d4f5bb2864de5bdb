use crate::avatar::Avatar;
use crate::camera::CameraRig;
use crate::config::ControllerConfig;
use glam::Vec2;
use labwalk_common::{damp, safe_normalize_xz};
use labwalk_input::InputSnapshot;

/// Minimum squared speed before the facing follows the velocity heading.
const FACING_MIN_SPEED_SQ: f32 = 0.001;

/// Turns input snapshots into camera-relative avatar velocity and orbit
/// angles for the camera rig.
#[derive(Debug, Clone)]
pub struct PlayerController {
    pub yaw: f32,
    pub pitch: f32,
    config: ControllerConfig,
}

impl PlayerController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            yaw: config.initial_yaw,
            pitch: config.initial_pitch.clamp(-config.pitch_limit, config.pitch_limit),
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Accumulate pointer motion into yaw and pitch.
    pub fn look(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.config.mouse_sensitivity;
        self.pitch -= delta.y * self.config.mouse_sensitivity;
        self.pitch = self
            .pitch
            .clamp(-self.config.pitch_limit, self.config.pitch_limit);
    }

    /// World-space X/Z direction for a local (forward, right) intent at the
    /// current yaw. Forward at zero yaw is -Z.
    pub fn move_direction(&self, forward: f32, right: f32) -> Vec2 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec2::new(right * cos + forward * sin, right * sin - forward * cos)
    }

    /// Write this frame's horizontal velocity and facing into `avatar` and
    /// hand the orbit angles to `rig`. Does not integrate the avatar.
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        avatar: &mut Avatar,
        rig: &mut CameraRig,
    ) {
        self.look(input.look_delta);

        let direction = safe_normalize_xz(self.move_direction(input.forward, input.right));
        if direction != Vec2::ZERO {
            let target = direction * self.config.speed;
            let t = damp(self.config.acceleration, dt);
            avatar.velocity.x += (target.x - avatar.velocity.x) * t;
            avatar.velocity.z += (target.y - avatar.velocity.z) * t;

            let v = Vec2::new(avatar.velocity.x, avatar.velocity.z);
            if v.length_squared() > FACING_MIN_SPEED_SQ {
                avatar.facing = v.x.atan2(v.y);
            }
        } else {
            avatar.velocity.x *= self.config.idle_damping;
            avatar.velocity.z *= self.config.idle_damping;
        }

        rig.set_rotation(self.yaw, self.pitch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AvatarConfig, CameraConfig};
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const DT: f32 = 1.0 / 60.0;

    fn setup(yaw: f32) -> (PlayerController, Avatar, CameraRig) {
        let config = ControllerConfig {
            initial_yaw: yaw,
            initial_pitch: 0.0,
            ..ControllerConfig::default()
        };
        let avatar = Avatar::new(&AvatarConfig {
            spawn: glam::Vec3::ZERO,
            ..AvatarConfig::default()
        });
        (
            PlayerController::new(&config),
            avatar,
            CameraRig::new(&CameraConfig::default()),
        )
    }

    fn drive(yaw: f32, input: InputSnapshot, frames: usize) -> Avatar {
        let (mut pc, mut avatar, mut rig) = setup(yaw);
        for _ in 0..frames {
            pc.update(DT, &input, &mut avatar, &mut rig);
            avatar.update(DT, None);
        }
        avatar
    }

    #[test]
    fn forward_at_zero_yaw_moves_negative_z() {
        let a = drive(0.0, InputSnapshot::moving(1.0, 0.0), 60);
        assert!(a.position.z < -1.0);
        assert!(a.position.x.abs() < 1e-4);
        assert!((a.facing.abs() - PI).abs() < 1e-3);
    }

    #[test]
    fn forward_at_half_turn_moves_positive_z() {
        let a = drive(PI, InputSnapshot::moving(1.0, 0.0), 60);
        assert!(a.position.z > 1.0);
        assert!(a.position.x.abs() < 1e-3);
        assert!(a.facing.abs() < 1e-3);
    }

    #[test]
    fn direction_rotates_rigidly_with_yaw() {
        let (mut pc, _, _) = setup(0.0);
        for i in 0..16 {
            pc.yaw = i as f32 * FRAC_PI_4 * 0.5;
            let fwd = pc.move_direction(1.0, 0.0);
            let right = pc.move_direction(0.0, 1.0);
            assert!((fwd.length() - 1.0).abs() < 1e-5);
            assert!(fwd.dot(right).abs() < 1e-5);
        }
    }

    #[test]
    fn strafe_right_at_zero_yaw_moves_positive_x() {
        let a = drive(0.0, InputSnapshot::moving(0.0, 1.0), 30);
        assert!(a.position.x > 0.5);
        assert!((a.facing - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn diagonal_is_not_faster_than_straight() {
        let straight = drive(0.0, InputSnapshot::moving(1.0, 0.0), 120);
        let diagonal = drive(0.0, InputSnapshot::moving(1.0, 1.0), 120);
        assert!(diagonal.horizontal_speed() <= straight.horizontal_speed() + 1e-4);
        assert!((straight.horizontal_speed() - 5.0).abs() < 1e-2);
    }

    #[test]
    fn velocity_ramps_instead_of_jumping() {
        let (mut pc, mut avatar, mut rig) = setup(0.0);
        pc.update(DT, &InputSnapshot::moving(1.0, 0.0), &mut avatar, &mut rig);
        let speed = avatar.horizontal_speed();
        assert!(speed > 0.0 && speed < 5.0);
    }

    #[test]
    fn idle_damps_to_rest() {
        let (mut pc, mut avatar, mut rig) = setup(0.0);
        avatar.velocity = glam::Vec3::new(5.0, 0.0, -3.0);
        for _ in 0..120 {
            pc.update(DT, &InputSnapshot::default(), &mut avatar, &mut rig);
            avatar.update(DT, None);
        }
        assert!(avatar.horizontal_speed() < 1e-4);
    }

    #[test]
    fn opposite_intent_and_zero_dt_do_not_produce_nan() {
        let (mut pc, mut avatar, mut rig) = setup(0.3);
        pc.update(0.0, &InputSnapshot::moving(0.0, 0.0), &mut avatar, &mut rig);
        pc.update(0.0, &InputSnapshot::moving(1.0, 0.0), &mut avatar, &mut rig);
        assert!(avatar.velocity.is_finite());
        assert!(avatar.facing.is_finite());
    }

    #[test]
    fn facing_holds_when_nearly_stopped() {
        let (mut pc, mut avatar, mut rig) = setup(0.0);
        avatar.facing = 1.0;
        pc.update(1e-6, &InputSnapshot::moving(1.0, 0.0), &mut avatar, &mut rig);
        assert_eq!(avatar.facing, 1.0);
    }

    #[test]
    fn mouse_look_turns_and_clamps_pitch() {
        let (mut pc, mut avatar, mut rig) = setup(0.0);
        let input = InputSnapshot {
            look_delta: Vec2::new(100.0, 0.0),
            dragging: true,
            ..InputSnapshot::default()
        };
        pc.update(DT, &input, &mut avatar, &mut rig);
        assert!((pc.yaw + 0.2).abs() < 1e-6);
        assert_eq!(rig.yaw(), pc.yaw);

        pc.look(Vec2::new(0.0, 1.0e6));
        assert_eq!(pc.pitch, -FRAC_PI_4);
        pc.look(Vec2::new(0.0, -1.0e6));
        assert_eq!(pc.pitch, FRAC_PI_4);
    }
}
