//! Frame-rate independent smoothing and ground-plane helpers.

use glam::{Vec2, Vec3};

/// Interpolation factor for exponential smoothing: `1 - e^(-rate * dt)`.
///
/// Always in `[0, 1)` for finite non-negative input, so it can feed
/// `lerp` directly without overshooting on long frames.
pub fn damp(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt.max(0.0)).exp()
}

/// X/Z components of a world vector.
pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Length of the X/Z components of a world vector.
pub fn horizontal_len(v: Vec3) -> f32 {
    horizontal(v).length()
}

/// Normalize on the ground plane, returning zero for zero-length input
/// instead of NaN.
pub fn safe_normalize_xz(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damp_is_zero_for_zero_dt() {
        assert_eq!(damp(10.0, 0.0), 0.0);
        assert_eq!(damp(10.0, -1.0), 0.0);
    }

    #[test]
    fn damp_approaches_one() {
        let f = damp(10.0, 5.0);
        assert!(f > 0.999 && f < 1.0 + f32::EPSILON);
    }

    #[test]
    fn damp_composes_across_frames() {
        // Two half steps leave the same remainder as one full step.
        let full = 1.0 - damp(10.0, 0.1);
        let half = 1.0 - damp(10.0, 0.05);
        assert!((full - half * half).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_normalizes_to_zero() {
        assert_eq!(safe_normalize_xz(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn horizontal_drops_y() {
        assert_eq!(horizontal(Vec3::new(3.0, 9.0, 4.0)), Vec2::new(3.0, 4.0));
        assert_eq!(horizontal_len(Vec3::new(3.0, 9.0, 4.0)), 5.0);
    }
}
