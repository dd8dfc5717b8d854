#![allow(clippy::cast_precision_loss)]
//! Planar mirror demonstration.
//!
//! This demo shows:
//! - A floor mirror reflecting a triangle for two viewer cameras
//! - A custom `SceneDrawer` with winding-aware pipelines
//! - Resizing the reflection texture between frames
//! - Releasing all reflection resources on disable
//!
//! Runs headless and reports how much of each reflection the triangle covers.
//!
//! Run with: cargo run --example `mirror_demo`

use mirror::*;
use wgpu::util::DeviceExt;

const SHADER: &str = r"
struct Camera {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    view_proj: mat4x4<f32>,
    camera_pos: vec3<f32>,
    _padding: f32,
};

@group(0) @binding(0) var<uniform> camera: Camera;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = camera.view_proj * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
";

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

/// Draws one triangle standing on the floor, culling back faces.
struct TriangleDrawer {
    ccw: wgpu::RenderPipeline,
    cw: wgpu::RenderPipeline,
    vertices: wgpu::Buffer,
}

impl TriangleDrawer {
    fn new(backend: &WgpuBackend) -> Self {
        let device = backend.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("triangle shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("triangle pipeline layout"),
            bind_group_layouts: &[backend.camera_bind_group_layout()],
            push_constant_ranges: &[],
        });

        let pipeline = |front_face: wgpu::FrontFace| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("triangle pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &VERTEX_ATTRIBUTES,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: REFLECTION_DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: REFLECTION_COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview: None,
                cache: None,
            })
        };

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("triangle vertices"),
            contents: bytemuck::cast_slice(&[
                Vertex {
                    position: [-1.0, 0.5, 0.0],
                    color: [0.9, 0.8, 0.1],
                },
                Vertex {
                    position: [1.0, 0.5, 0.0],
                    color: [0.9, 0.8, 0.1],
                },
                Vertex {
                    position: [0.0, 1.5, 0.0],
                    color: [0.9, 0.3, 0.1],
                },
            ]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            ccw: pipeline(wgpu::FrontFace::Ccw),
            cw: pipeline(wgpu::FrontFace::Cw),
            vertices,
        }
    }
}

impl SceneDrawer for TriangleDrawer {
    fn draw(&mut self, frame: &DrawFrame<'_>, pass: &mut wgpu::RenderPass<'_>) {
        // The triangle lives on the default layer.
        if !frame.culling_mask.contains(0) {
            return;
        }
        let pipeline = if frame.front_face == wgpu::FrontFace::Cw {
            &self.cw
        } else {
            &self.ccw
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, frame.camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..3, 0..1);
    }
}

fn coverage(pixels: &[u8], background: [u8; 4]) -> f32 {
    let covered = pixels.chunks(4).filter(|px| *px != background).count();
    covered as f32 / (pixels.len() / 4) as f32
}

fn main() -> RenderResult<()> {
    init_logging();

    let mut backend = headless_backend(Box::new(ClearOnlyDrawer))?;
    let drawer = TriangleDrawer::new(&backend);
    backend.set_drawer(Box::new(drawer));

    let ctx = ReflectionContext::new();
    let mut floor = MirrorSurface::new("floor", Pose::default(), MirrorConfig::default())?
        .with_renderer(SurfaceRenderer::new(vec![Material::mirror("floor")]));

    let viewers: Vec<ViewerCamera> = [Vec3::new(0.0, 2.0, 4.0), Vec3::new(2.5, 1.0, 3.5)]
        .into_iter()
        .enumerate()
        .map(|(i, eye)| {
            let mut camera = Camera::new(1.0).looking_at(eye, Vec3::new(0.0, 0.5, 0.0), Vec3::Y);
            camera.clear_flags = ClearFlags::SolidColor;
            camera.background_color = Vec4::new(0.0, 0.0, 0.0, 1.0);
            ViewerCamera::new(ViewerId(i as u64 + 1), camera)
        })
        .collect();

    for frame in 0..3 {
        if frame == 2 {
            floor.set_texture_size(512)?;
        }
        for viewer in &viewers {
            let outcome = floor.render_reflection(&ctx, &mut backend, Some(viewer))?;
            let Some(target) = outcome.target() else {
                println!("frame {frame}, {}: skipped ({outcome:?})", viewer.id);
                continue;
            };
            let pixels = backend.read_target(target)?;
            let size = backend.texture(target).map_or(0, |t| t.size);
            println!(
                "frame {frame}, {}: {target} {size}x{size}, triangle covers {:.1}%",
                viewer.id,
                coverage(&pixels, [0, 0, 0, 255]) * 100.0
            );
        }
    }

    floor.disable(&mut backend);
    println!(
        "disabled: {} targets, {} cameras left",
        backend.target_count(),
        backend.camera_count()
    );
    Ok(())
}
