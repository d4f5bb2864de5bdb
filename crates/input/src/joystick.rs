use glam::Vec2;

/// Default drag radius in pixels at which the stick saturates.
pub const DEFAULT_MAX_DISTANCE: f32 = 50.0;

/// Normalized deflections shorter than this read as centred.
pub const DEFAULT_DEAD_ZONE: f32 = 0.15;

/// Touch joystick: a drag offset from the touch origin, clamped to a disc and
/// normalized to `[-1, 1]` on both axes. Screen-down is positive `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joystick {
    pub max_distance: f32,
    pub dead_zone: f32,
    delta: Vec2,
    active: bool,
}

impl Default for Joystick {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            dead_zone: DEFAULT_DEAD_ZONE,
            delta: Vec2::ZERO,
            active: false,
        }
    }
}

impl Joystick {
    pub fn new(max_distance: f32) -> Self {
        Self {
            max_distance,
            ..Self::default()
        }
    }

    /// Feed the current drag offset in pixels.
    pub fn drag(&mut self, offset: Vec2) {
        self.active = true;
        if !offset.is_finite() || self.max_distance <= 0.0 {
            self.delta = Vec2::ZERO;
            return;
        }
        let delta = offset.clamp_length_max(self.max_distance) / self.max_distance;
        self.delta = if delta.length() < self.dead_zone {
            Vec2::ZERO
        } else {
            delta
        };
    }

    pub fn release(&mut self) {
        self.active = false;
        self.delta = Vec2::ZERO;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Normalized stick deflection.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_offset_scales_linearly() {
        let mut j = Joystick::default();
        j.drag(Vec2::new(25.0, 0.0));
        assert!(j.is_active());
        assert!((j.delta() - Vec2::new(0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn large_offset_is_clamped_to_unit_disc() {
        let mut j = Joystick::default();
        j.drag(Vec2::new(300.0, -400.0));
        assert!((j.delta().length() - 1.0).abs() < 1e-5);
        assert!((j.delta() - Vec2::new(0.6, -0.8)).length() < 1e-5);
    }

    #[test]
    fn drift_inside_dead_zone_reads_centred() {
        let mut j = Joystick::default();
        j.drag(Vec2::new(1.0, 0.0));
        assert!(j.is_active());
        assert_eq!(j.delta(), Vec2::ZERO);

        j.drag(Vec2::new(0.0, 10.0));
        assert!((j.delta() - Vec2::new(0.0, 0.2)).length() < 1e-6);
    }

    #[test]
    fn release_zeroes_delta() {
        let mut j = Joystick::default();
        j.drag(Vec2::new(10.0, 10.0));
        j.release();
        assert!(!j.is_active());
        assert_eq!(j.delta(), Vec2::ZERO);
    }

    #[test]
    fn degenerate_radius_yields_zero() {
        let mut j = Joystick::new(0.0);
        j.drag(Vec2::new(10.0, 0.0));
        assert_eq!(j.delta(), Vec2::ZERO);
    }
}
