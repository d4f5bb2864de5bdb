use glam::{Mat4, Vec3};
use labwalk_render::RenderView;

/// Perspective projection for the follow camera. The eye and aim come from
/// the simulation through [`RenderView`]; only lens parameters live here.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn matrix(&self, fov_degrees: f32) -> Mat4 {
        Mat4::perspective_rh(fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self, view: &RenderView) -> Mat4 {
        let look = if view.eye.distance_squared(view.target) > f32::EPSILON {
            view.view_matrix()
        } else {
            // Degenerate aim; look down -Z instead of producing NaNs.
            Mat4::look_at_rh(view.eye, view.eye - Vec3::Z, Vec3::Y)
        };
        self.matrix(view.fov_degrees) * look
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_projection_is_finite() {
        let vp = Projection::default().view_projection(&RenderView::default());
        assert!(vp.is_finite());
    }

    #[test]
    fn coincident_eye_and_target_stay_finite() {
        let view = RenderView {
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        };
        assert!(Projection::default().view_projection(&view).is_finite());
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let view = RenderView {
            eye: Vec3::new(0.0, 3.0, -5.0),
            target: Vec3::new(0.0, 1.6, -10.0),
            fov_degrees: 60.0,
        };
        let clip = Projection::default().view_projection(&view) * view.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut p = Projection::default();
        p.resize(800, 400);
        assert_eq!(p.aspect, 2.0);
        p.resize(0, 0);
        assert_eq!(p.aspect, 1.0);
    }
}
