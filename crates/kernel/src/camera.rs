use crate::avatar::Avatar;
use crate::config::CameraConfig;
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Third-person follow camera.
///
/// The rig position trails the avatar with exponential smoothing while the
/// aim always locks onto the avatar head. The rig starts at the world origin
/// and glides in on the first frames.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub offset: Vec3,
    pub smoothness: f32,
    pub head_ratio: f32,
    position: Vec3,
    look_target: Vec3,
    yaw: f32,
    pitch: f32,
}

impl CameraRig {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            offset: config.offset,
            smoothness: config.smoothness,
            head_ratio: config.head_ratio,
            position: Vec3::ZERO,
            look_target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn set_rotation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Smoothed camera position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point the camera aims at: the avatar head as of the last update.
    pub fn look_target(&self) -> Vec3 {
        self.look_target
    }

    /// Offset rotated by pitch about X, then yaw about Y, no roll.
    pub fn rotated_offset(&self) -> Vec3 {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0) * self.offset
    }

    /// Where the camera is heading for the given avatar.
    pub fn target_position(&self, avatar: &Avatar) -> Vec3 {
        avatar.head_position(self.head_ratio) + self.rotated_offset()
    }

    pub fn update(&mut self, dt: f32, avatar: &Avatar) {
        let head = avatar.head_position(self.head_ratio);
        let target = head + self.rotated_offset();
        self.position = self
            .position
            .lerp(target, labwalk_common::damp(self.smoothness, dt));
        self.look_target = head;
    }

    pub fn forward(&self) -> Vec3 {
        (self.look_target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_target, Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AvatarConfig;
    use std::f32::consts::PI;

    fn avatar_at(p: Vec3) -> Avatar {
        Avatar::new(&AvatarConfig {
            spawn: p,
            ..AvatarConfig::default()
        })
    }

    #[test]
    fn first_frame_lerps_from_origin() {
        let avatar = avatar_at(Vec3::new(0.0, 0.0, -10.0));
        let mut rig = CameraRig::new(&CameraConfig::default());
        rig.update(1.0 / 60.0, &avatar);
        let target = rig.target_position(&avatar);
        let p = rig.position();
        assert!(p.length() > 0.0);
        assert!(p.distance(target) < target.length());
        assert!(p.distance(target) > 1.0);
    }

    #[test]
    fn converges_to_target_at_rest() {
        let avatar = avatar_at(Vec3::new(3.0, 0.0, -4.0));
        let mut rig = CameraRig::new(&CameraConfig::default());
        for _ in 0..240 {
            rig.update(1.0 / 60.0, &avatar);
        }
        assert!(rig.position().distance(rig.target_position(&avatar)) < 1e-3);
    }

    #[test]
    fn aims_at_head_not_smoothed_target() {
        let avatar = avatar_at(Vec3::new(1.0, 0.0, 2.0));
        let mut rig = CameraRig::new(&CameraConfig::default());
        rig.update(0.01, &avatar);
        assert_eq!(rig.look_target(), avatar.head_position(0.9));
    }

    #[test]
    fn zero_rotation_keeps_offset() {
        let rig = CameraRig::new(&CameraConfig::default());
        assert!((rig.rotated_offset() - Vec3::new(0.0, 2.0, 5.0)).length() < 1e-6);
    }

    #[test]
    fn half_turn_yaw_mirrors_offset() {
        let mut rig = CameraRig::new(&CameraConfig::default());
        rig.set_rotation(PI, 0.0);
        assert!((rig.rotated_offset() - Vec3::new(0.0, 2.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn pitch_keeps_horizon_level() {
        let mut rig = CameraRig::new(&CameraConfig::default());
        rig.set_rotation(0.7, -0.3);
        let flat = {
            let mut r = rig.clone();
            r.set_rotation(0.7, 0.0);
            r.rotated_offset()
        };
        let pitched = rig.rotated_offset();
        // Yaw applied after pitch: both offsets share one vertical plane.
        let heading = |v: Vec3| v.x.atan2(v.z);
        assert!((heading(flat) - heading(pitched)).abs() < 1e-5);
        assert!(pitched.y > flat.y);
        assert!((pitched.length() - flat.length()).abs() < 1e-5);
    }

    #[test]
    fn view_matrix_is_finite_after_update() {
        let avatar = avatar_at(Vec3::ZERO);
        let mut rig = CameraRig::new(&CameraConfig::default());
        rig.update(0.1, &avatar);
        assert!(rig.view_matrix().is_finite());
        assert!((rig.forward().length() - 1.0).abs() < 1e-5);
    }
}
