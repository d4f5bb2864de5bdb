use crate::config::AvatarConfig;
use crate::gait::Gait;
use glam::Vec3;
use labwalk_collision::CollisionSystem;
use labwalk_common::horizontal_len;

/// The player body: a vertical capsule standing on its foot anchor.
///
/// `position` is the foot point; the collision circle is centred on it in
/// X/Z. Velocity is written by the controller and integrated here.
#[derive(Debug, Clone)]
pub struct Avatar {
    pub position: Vec3,
    pub velocity: Vec3,
    pub height: f32,
    pub radius: f32,
    pub gravity: f32,
    /// Heading in radians about +Y, zero facing +Z.
    pub facing: f32,
    gait: Gait,
}

impl Avatar {
    pub fn new(config: &AvatarConfig) -> Self {
        let mut avatar = Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            height: config.height,
            radius: config.radius,
            gravity: config.gravity,
            facing: 0.0,
            gait: Gait::default(),
        };
        avatar.set_position(config.spawn);
        avatar
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Centre of the body volume, half a height above the foot anchor.
    pub fn body_center(&self) -> Vec3 {
        self.position + Vec3::Y * (self.height * 0.5)
    }

    /// Point at `ratio` of the avatar height above the feet.
    pub fn head_position(&self, ratio: f32) -> Vec3 {
        self.position + Vec3::Y * (self.height * ratio)
    }

    pub fn horizontal_speed(&self) -> f32 {
        horizontal_len(self.velocity)
    }

    pub fn is_grounded(&self) -> bool {
        self.position.y <= 0.0
    }

    pub fn gait(&self) -> &Gait {
        &self.gait
    }

    /// Integrate one frame: gravity, velocity, ground clamp, obstacle push,
    /// then the walk cycle. Returns the push applied, if any.
    pub fn update(&mut self, dt: f32, collision: Option<&CollisionSystem>) -> Option<Vec3> {
        self.velocity.y -= self.gravity * dt;
        self.position += self.velocity * dt;

        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.velocity.y = 0.0;
        }

        let push = collision.and_then(|c| c.check_collision(self.position, self.radius));
        if let Some(push) = push {
            self.position += push;
            // Only the dominant axis is stopped.
            if push.x.abs() > push.z.abs() {
                self.velocity.x = 0.0;
            } else {
                self.velocity.z = 0.0;
            }
        }

        self.gait.update(dt, self.horizontal_speed());
        push
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn avatar_at(position: Vec3) -> Avatar {
        Avatar::new(&AvatarConfig {
            spawn: position,
            ..AvatarConfig::default()
        })
    }

    #[test]
    fn spawn_uses_config() {
        let a = Avatar::new(&AvatarConfig::default());
        assert_eq!(a.position, Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(a.body_center().y, 0.9);
        assert!((a.head_position(0.9).y - 1.62).abs() < 1e-6);
    }

    #[test]
    fn falls_and_clamps_to_ground() {
        let mut a = avatar_at(Vec3::new(0.0, 5.0, 0.0));
        a.velocity.y = -3.0;
        let mut landed = false;
        for _ in 0..600 {
            a.update(DT, None);
            assert!(a.position.y >= 0.0);
            if a.position.y == 0.0 {
                landed = true;
                assert_eq!(a.velocity.y, 0.0);
            }
        }
        assert!(landed);
        assert!(a.is_grounded());
        assert_eq!(a.velocity.y, 0.0);
    }

    #[test]
    fn huge_downward_velocity_never_goes_below_ground() {
        let mut a = avatar_at(Vec3::new(0.0, 0.5, 0.0));
        a.velocity.y = -1000.0;
        a.update(0.1, None);
        assert_eq!(a.position.y, 0.0);
        assert_eq!(a.velocity.y, 0.0);
    }

    #[test]
    fn integrates_horizontal_velocity() {
        let mut a = avatar_at(Vec3::ZERO);
        a.velocity = Vec3::new(2.0, 0.0, -1.0);
        a.update(0.5, None);
        assert!((a.position.x - 1.0).abs() < 1e-6);
        assert!((a.position.z + 0.5).abs() < 1e-6);
        assert!(a.gait().walking);
    }

    #[test]
    fn wall_push_zeroes_dominant_axis_only() {
        let mut cs = CollisionSystem::new();
        // Wall face at z = 12.5.
        cs.add_box_collider(Vec3::new(0.0, 1.0, 25.0), Vec3::new(10.0, 2.0, 25.0));
        let mut a = avatar_at(Vec3::new(0.0, 0.0, 12.0));
        a.velocity = Vec3::new(1.0, 0.0, 3.0);
        let push = a.update(0.1, Some(&cs)).expect("walked into wall");
        assert!(push.z < 0.0);
        assert_eq!(a.velocity.z, 0.0);
        assert_eq!(a.velocity.x, 1.0);
        assert!(a.position.z <= 12.5 - a.radius + 1e-5);
    }

    #[test]
    fn missing_collision_system_is_no_collision() {
        let mut a = avatar_at(Vec3::new(0.0, 0.0, 12.0));
        a.velocity = Vec3::new(0.0, 0.0, 3.0);
        assert!(a.update(0.1, None).is_none());
        assert!((a.position.z - 12.3).abs() < 1e-5);
    }
}
