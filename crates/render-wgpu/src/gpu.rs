use crate::camera::Projection;
use crate::mesh::{self, InstanceData, LineVertex, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use labwalk_render::scene::{FOG_FAR, FOG_NEAR, GROUND_EXTENT, SKY};
use labwalk_render::{DrawList, RenderView};
use std::mem::size_of;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MAX_INSTANCES: u32 = 4_096;
const GRID_SPACING: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4, view: &RenderView) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            eye: view.eye.extend(1.0).to_array(),
            fog_color: SKY,
            fog_range: [FOG_NEAR, FOG_FAR, 0.0, 0.0],
        }
    }
}

/// What differs between the box and grid pipelines.
struct PipelineSpec<'a> {
    label: &'a str,
    source: &'a str,
    vs_entry: &'a str,
    fs_entry: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    spec: PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(spec.label),
        source: wgpu::ShaderSource::Wgsl(spec.source.into()),
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(spec.vs_entry),
            compilation_options: Default::default(),
            buffers: spec.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(spec.fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            cull_mode: spec.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn static_buffer(
    device: &wgpu::Device,
    label: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage,
    })
}

fn depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&Default::default())
}

/// wgpu renderer for a [`DrawList`]: grid over the ground plus one
/// instanced unit box per entry.
pub struct WgpuRenderer {
    box_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    box_vertices: wgpu::Buffer,
    box_indices: wgpu::Buffer,
    box_index_count: u32,
    grid_vertices: wgpu::Buffer,
    grid_vertex_count: u32,
    instances: wgpu::Buffer,
    depth: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniforms = static_buffer(
            device,
            "uniforms",
            bytemuck::bytes_of(&Uniforms::new(Mat4::IDENTITY, &RenderView::default())),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        // Fog is applied per fragment, so both stages read the uniforms.
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniforms"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniforms"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let box_pipeline = create_pipeline(
            device,
            &layout,
            surface_format,
            PipelineSpec {
                label: "boxes",
                source: shaders::WORLD_SHADER,
                vs_entry: "vs_main",
                fs_entry: "fs_main",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
            },
        );
        let grid_pipeline = create_pipeline(
            device,
            &layout,
            surface_format,
            PipelineSpec {
                label: "grid",
                source: shaders::GRID_SHADER,
                vs_entry: "vs_grid",
                fs_entry: "fs_grid",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
                }],
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
            },
        );

        let (box_verts, box_idx) = mesh::unit_box();
        let grid = mesh::ground_grid((GROUND_EXTENT / (2.0 * GRID_SPACING)) as i32, GRID_SPACING);

        Self {
            box_pipeline,
            grid_pipeline,
            uniforms,
            bind_group,
            box_vertices: static_buffer(
                device,
                "box_vertices",
                bytemuck::cast_slice(&box_verts),
                wgpu::BufferUsages::VERTEX,
            ),
            box_indices: static_buffer(
                device,
                "box_indices",
                bytemuck::cast_slice(&box_idx),
                wgpu::BufferUsages::INDEX,
            ),
            box_index_count: box_idx.len() as u32,
            grid_vertices: static_buffer(
                device,
                "grid_vertices",
                bytemuck::cast_slice(&grid),
                wgpu::BufferUsages::VERTEX,
            ),
            grid_vertex_count: grid.len() as u32,
            instances: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("instances"),
                size: MAX_INSTANCES as u64 * size_of::<InstanceData>() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            depth: depth_view(device, width, height),
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth = depth_view(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Clear to the sky, draw the ground grid, then every box in the list.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        projection: &Projection,
        view: &RenderView,
        draw_list: &DrawList,
    ) {
        let uniforms = Uniforms::new(projection.view_projection(view), view);
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));

        let instances = instance_data(draw_list);
        if !instances.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame"),
        });
        {
            let [r, g, b, _] = SKY.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_bind_group(0, &self.bind_group, &[]);

            pass.set_pipeline(&self.grid_pipeline);
            pass.set_vertex_buffer(0, self.grid_vertices.slice(..));
            pass.draw(0..self.grid_vertex_count, 0..1);

            if !instances.is_empty() {
                pass.set_pipeline(&self.box_pipeline);
                pass.set_vertex_buffer(0, self.box_vertices.slice(..));
                pass.set_vertex_buffer(1, self.instances.slice(..));
                pass.set_index_buffer(self.box_indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.box_index_count, 0, 0..instances.len() as u32);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Instance data for the list, capped at the instance buffer size.
fn instance_data(draw_list: &DrawList) -> Vec<InstanceData> {
    let cap = MAX_INSTANCES as usize;
    if draw_list.boxes.len() > cap {
        tracing::warn!(
            boxes = draw_list.boxes.len(),
            max = MAX_INSTANCES,
            "draw list truncated"
        );
    }
    draw_list
        .boxes
        .iter()
        .take(cap)
        .map(InstanceData::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwalk_common::Transform;
    use labwalk_render::BoxInstance;

    #[test]
    fn oversized_draw_list_is_capped() {
        let unit = BoxInstance::new(Transform::default(), [1.0; 4]);
        let list = DrawList {
            boxes: vec![unit; MAX_INSTANCES as usize + 10],
            ..Default::default()
        };
        assert_eq!(instance_data(&list).len(), MAX_INSTANCES as usize);
        assert!(instance_data(&DrawList::default()).is_empty());
    }

    #[test]
    fn uniforms_carry_eye_and_fog() {
        let view = RenderView::default();
        let u = Uniforms::new(Mat4::IDENTITY, &view);
        assert_eq!(&u.eye[..3], &view.eye.to_array());
        assert_eq!(u.fog_color, SKY);
        assert_eq!(&u.fog_range[..2], &[FOG_NEAR, FOG_FAR]);
    }
}
