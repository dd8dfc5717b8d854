//! A [`RenderBackend`] that renders reflections with wgpu.
//!
//! Targets are colour plus 16-bit depth textures. Scene content comes from a
//! host-supplied [`SceneDrawer`]; the backend owns the pass setup, the camera
//! uniforms and the two render settings mirror surfaces override.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use mirror_core::LayerMask;
use wgpu::util::DeviceExt;

use crate::backend::{CameraId, RenderBackend, TargetDescriptor, TargetId};
use crate::cache::ReflectionCamera;
use crate::camera::{Camera, ClearFlags, Pose};
use crate::context::ReflectionContext;
use crate::error::{RenderError, RenderResult};

/// Colour format of reflection targets.
pub const REFLECTION_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Depth format of reflection targets.
pub const REFLECTION_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth16Unorm;

/// Remaps OpenGL clip depth `[-1, 1]` to wgpu's `[0, 1]`.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

/// GPU representation of the reflection camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct MirrorCameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl Default for MirrorCameraUniforms {
    fn default() -> Self {
        Self::from_matrices(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO)
    }
}

impl MirrorCameraUniforms {
    /// Uniforms for `camera`, with its projection remapped to wgpu depth.
    #[must_use]
    pub fn from_camera(camera: &Camera) -> Self {
        Self::from_matrices(
            camera.view_matrix(),
            OPENGL_TO_WGPU_MATRIX * camera.projection_matrix(),
            camera.position(),
        )
    }

    fn from_matrices(view: Mat4, proj: Mat4, position: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            view_proj: (proj * view).to_cols_array_2d(),
            camera_pos: position.to_array(),
            _padding: 0.0,
        }
    }
}

/// State a [`SceneDrawer`] sees while drawing one reflection.
pub struct DrawFrame<'a> {
    /// Context of the reflection in flight.
    pub ctx: &'a ReflectionContext,
    /// Queue for uniform uploads.
    pub queue: &'a wgpu::Queue,
    /// Bind group holding [`MirrorCameraUniforms`] at binding 0.
    pub camera_bind_group: &'a wgpu::BindGroup,
    /// Uniforms already uploaded for this reflection.
    pub camera: MirrorCameraUniforms,
    /// Layers the reflection camera sees.
    pub culling_mask: LayerMask,
    /// Winding of front faces, flipped while culling is inverted.
    pub front_face: wgpu::FrontFace,
    /// Per-pixel light budget.
    pub pixel_light_count: u32,
}

/// Draws scene content into a reflection pass.
///
/// The drawer runs inside the backend's render pass, so it cannot dispatch
/// other [`MirrorSurface`](crate::MirrorSurface)s against this backend.
/// Mirrors seen inside a reflection are drawn with whatever texture they
/// last rendered; `frame.ctx` reports the reflection in flight, and any
/// dispatch issued under it is skipped. Nested re-entry is only exercised
/// through backends that render outside a pass, such as the recording one.
pub trait SceneDrawer {
    /// Records draw calls for the visible scene.
    fn draw(&mut self, frame: &DrawFrame<'_>, pass: &mut wgpu::RenderPass<'_>);
}

/// Draws nothing; reflections contain only the camera's clear colour.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClearOnlyDrawer;

impl SceneDrawer for ClearOnlyDrawer {
    fn draw(&mut self, _frame: &DrawFrame<'_>, _pass: &mut wgpu::RenderPass<'_>) {}
}

/// Colour and depth textures of one reflection target.
pub struct ReflectionTexture {
    /// Edge length in texels.
    pub size: u32,
    /// Colour texture, sampled by mirror materials.
    pub color: wgpu::Texture,
    /// View of the colour texture.
    pub color_view: wgpu::TextureView,
    /// 16-bit depth texture.
    pub depth: wgpu::Texture,
    /// View of the depth texture.
    pub depth_view: wgpu::TextureView,
}

impl ReflectionTexture {
    fn new(device: &wgpu::Device, desc: &TargetDescriptor) -> Self {
        let size = wgpu::Extent3d {
            width: desc.size,
            height: desc.size,
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&desc.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("mirror reflection depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            size: desc.size,
            color,
            color_view,
            depth,
            depth_view,
        }
    }
}

/// Front-face winding for the given inversion state.
#[must_use]
pub fn front_face(invert_culling: bool) -> wgpu::FrontFace {
    if invert_culling {
        wgpu::FrontFace::Cw
    } else {
        wgpu::FrontFace::Ccw
    }
}

fn aligned_bytes_per_row(width: u32) -> u32 {
    let unaligned = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// wgpu implementation of [`RenderBackend`].
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    drawer: Box<dyn SceneDrawer>,
    camera_buffer: wgpu::Buffer,
    camera_bind_group_layout: wgpu::BindGroupLayout,
    camera_bind_group: wgpu::BindGroup,
    targets: HashMap<TargetId, ReflectionTexture>,
    cameras: HashMap<CameraId, String>,
    next_id: u64,
    pixel_light_count: u32,
    invert_culling: bool,
}

impl WgpuBackend {
    /// Wraps an existing device.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, drawer: Box<dyn SceneDrawer>) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mirror camera uniforms"),
            contents: bytemuck::cast_slice(&[MirrorCameraUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mirror camera bind group layout"),
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

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mirror camera bind group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Self {
            device,
            queue,
            drawer,
            camera_buffer,
            camera_bind_group_layout,
            camera_bind_group,
            targets: HashMap::new(),
            cameras: HashMap::new(),
            next_id: 0,
            pixel_light_count: 4,
            invert_culling: false,
        }
    }

    /// Opens a device without a presentation surface.
    pub async fn new_headless(drawer: Box<dyn SceneDrawer>) -> RenderResult<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("mirror device (headless)"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        log::info!("mirror backend on {}", adapter.get_info().name);
        Ok(Self::new(device, queue, drawer))
    }

    /// The wgpu device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The wgpu queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Layout of the camera bind group handed to drawers, for building
    /// pipelines.
    pub fn camera_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_bind_group_layout
    }

    /// Replaces the scene drawer, typically once pipelines built against
    /// [`Self::camera_bind_group_layout`] exist.
    pub fn set_drawer(&mut self, drawer: Box<dyn SceneDrawer>) {
        self.drawer = drawer;
    }

    /// Textures of a live target.
    pub fn texture(&self, target: TargetId) -> Option<&ReflectionTexture> {
        self.targets.get(&target)
    }

    /// Number of live targets.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Number of live camera entities.
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Copies a target's colour texture back as tightly packed RGBA8 rows.
    pub fn read_target(&self, target: TargetId) -> RenderResult<Vec<u8>> {
        let texture = self
            .targets
            .get(&target)
            .ok_or(RenderError::UnknownTarget(target.0))?;
        let size = texture.size;
        let bytes_per_row = aligned_bytes_per_row(size);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mirror readback buffer"),
            size: u64::from(bytes_per_row) * u64::from(size),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mirror readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(size),
                },
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| RenderError::ReadbackFailed(e.to_string()))?
            .map_err(|e| RenderError::ReadbackFailed(e.to_string()))?;

        let data = slice.get_mapped_range();
        let row_bytes = size as usize * 4;
        let mut pixels = Vec::with_capacity(row_bytes * size as usize);
        for row in 0..size as usize {
            let start = row * bytes_per_row as usize;
            pixels.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        buffer.unmap();

        Ok(pixels)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn clear_ops(camera: &Camera) -> (wgpu::LoadOp<wgpu::Color>, wgpu::LoadOp<f32>) {
    let bg = camera.background_color;
    let color = wgpu::Color {
        r: f64::from(bg.x),
        g: f64::from(bg.y),
        b: f64::from(bg.z),
        a: f64::from(bg.w),
    };
    match camera.clear_flags {
        // No sky is drawn here; the skybox case clears to the background.
        ClearFlags::Skybox | ClearFlags::SolidColor => {
            (wgpu::LoadOp::Clear(color), wgpu::LoadOp::Clear(1.0))
        }
        ClearFlags::DepthOnly => (wgpu::LoadOp::Load, wgpu::LoadOp::Clear(1.0)),
        ClearFlags::Nothing => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
    }
}

impl RenderBackend for WgpuBackend {
    fn create_target(&mut self, desc: &TargetDescriptor) -> RenderResult<TargetId> {
        let max = self.device.limits().max_texture_dimension_2d;
        if desc.size == 0 || desc.size > max {
            return Err(RenderError::TextureCreationFailed(format!(
                "{}: size {} outside 1..={max}",
                desc.label, desc.size
            )));
        }
        let id = TargetId(self.next_id());
        self.targets.insert(id, ReflectionTexture::new(&self.device, desc));
        Ok(id)
    }

    fn destroy_target(&mut self, target: TargetId) {
        if let Some(texture) = self.targets.remove(&target) {
            texture.color.destroy();
            texture.depth.destroy();
        }
    }

    fn create_camera(&mut self, label: &str, _pose: Pose) -> RenderResult<CameraId> {
        let id = CameraId(self.next_id());
        self.cameras.insert(id, label.to_string());
        Ok(id)
    }

    fn destroy_camera(&mut self, camera: CameraId) {
        self.cameras.remove(&camera);
    }

    fn render(
        &mut self,
        ctx: &ReflectionContext,
        camera: &ReflectionCamera,
        target: TargetId,
    ) -> RenderResult<()> {
        let texture = self
            .targets
            .get(&target)
            .ok_or(RenderError::UnknownTarget(target.0))?;

        let uniforms = MirrorCameraUniforms::from_camera(&camera.camera);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let frame = DrawFrame {
            ctx,
            queue: &self.queue,
            camera_bind_group: &self.camera_bind_group,
            camera: uniforms,
            culling_mask: camera.camera.culling_mask,
            front_face: front_face(self.invert_culling),
            pixel_light_count: self.pixel_light_count,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mirror reflection encoder"),
            });
        {
            let (color_load, depth_load) = clear_ops(&camera.camera);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mirror reflection pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &texture.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &texture.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            self.drawer.draw(&frame, &mut pass);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        log::trace!("rendered {} into {target}", camera.id);
        Ok(())
    }

    fn pixel_light_count(&self) -> u32 {
        self.pixel_light_count
    }

    fn set_pixel_light_count(&mut self, count: u32) {
        self.pixel_light_count = count;
    }

    fn invert_culling(&self) -> bool {
        self.invert_culling
    }

    fn set_invert_culling(&mut self, invert: bool) {
        self.invert_culling = invert;
    }
}
