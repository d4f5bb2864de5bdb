use glam::{Mat4, Vec3};
use labwalk_kernel::{CameraRig, Simulation};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }
}

impl RenderView {
    /// View through the follow camera.
    pub fn from_rig(rig: &CameraRig, fov_degrees: f32) -> Self {
        Self {
            eye: rig.position(),
            target: rig.look_target(),
            fov_degrees,
        }
    }

    /// View for the simulation's current camera and configured field of view.
    pub fn of(sim: &Simulation) -> Self {
        Self::from_rig(sim.camera(), sim.config().camera.fov_degrees)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads simulation state and a view configuration, then
/// produces output. It never mutates the simulation.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given simulation state and view.
    fn render(&self, sim: &Simulation, view: &RenderView) -> Self::Output;
}

/// Plain-text renderer for the CLI, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, sim: &Simulation, view: &RenderView) -> String {
        let avatar = sim.avatar();
        let p = avatar.position;
        let v = avatar.velocity;
        let mut out = String::new();
        out.push_str(&format!(
            "=== Simulation (tick={}, t={:.2}s) ===\n",
            sim.tick(),
            sim.elapsed()
        ));
        out.push_str(&format!(
            "Avatar: pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2}) facing={:.2} walking={}\n",
            p.x,
            p.y,
            p.z,
            v.x,
            v.y,
            v.z,
            avatar.facing,
            avatar.gait().walking
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));
        let door = sim.door();
        out.push_str(&format!(
            "Door: {:?} leaves=±{:.2} fade={:.2}\n",
            door.state(),
            door.right_leaf_x(),
            door.fade_alpha()
        ));
        out.push_str(&format!(
            "Obstacles: {} (collision {})\n",
            sim.collision().len(),
            if sim.collision_enabled() { "on" } else { "off" }
        ));
        out
    }
}
