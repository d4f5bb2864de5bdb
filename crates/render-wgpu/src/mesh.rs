//! CPU-side vertex data: the unit box every prop is instanced from, and the
//! ground grid.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use labwalk_render::BoxInstance;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Per-instance model matrix columns and colour.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl From<&BoxInstance> for InstanceData {
    fn from(b: &BoxInstance) -> Self {
        let t = &b.transform;
        Self {
            model: Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.position)
                .to_cols_array_2d(),
            color: b.color,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

const GRID_COLOR: [f32; 4] = [0.16, 0.32, 0.16, 1.0];
/// Lift above the ground slab top so the lines win the depth test.
const GRID_LIFT: f32 = 0.005;

/// Face normals with two in-plane axes ordered so `u × v = normal`, giving
/// counter-clockwise winding seen from outside.
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
];

/// Unit box centred on the origin, four vertices per face for flat normals.
pub(crate) fn unit_box() -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in FACES {
        let base = vertices.len() as u16;
        let center = normal * 0.5;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            vertices.push(Vertex {
                position: (center + u * su + v * sv).to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
    }
    (vertices, indices)
}

/// Line list of `2 * half_lines + 1` lines each way, `spacing` apart.
pub(crate) fn ground_grid(half_lines: i32, spacing: f32) -> Vec<LineVertex> {
    let reach = half_lines as f32 * spacing;
    let point = |x: f32, z: f32| LineVertex {
        position: [x, GRID_LIFT, z],
        color: GRID_COLOR,
    };
    (-half_lines..=half_lines)
        .flat_map(|i| {
            let at = i as f32 * spacing;
            [
                point(-reach, at),
                point(reach, at),
                point(at, -reach),
                point(at, reach),
            ]
        })
        .collect()
}
