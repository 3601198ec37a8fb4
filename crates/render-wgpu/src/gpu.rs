use std::num::NonZeroU64;
use std::ops::Range;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use multiview_common::{Color, Rect, SurfaceSize};
use multiview_render::{CopyOut, RenderError, Renderer, copy_source_rect};
use multiview_scene::{PerspectiveCamera, Scene};
use wgpu::util::DeviceExt;

use crate::canvas::CanvasTexture;
use crate::shaders;

/// Color format of the offscreen frame and of every canvas.
pub const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const MAX_DRAWS: u64 = 4096;
const MAX_INSTANCES: u32 = 10_000;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    /// Face pair: 0 = X, 1 = Y, 2 = Z.
    face: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color_x: [f32; 4],
    color_y: [f32; 4],
    color_z: [f32; 4],
}

/// Generate unit cube vertices and indices.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], face: 2 },
        Vertex { position: [ p, -p,  p], face: 2 },
        Vertex { position: [ p,  p,  p], face: 2 },
        Vertex { position: [-p,  p,  p], face: 2 },
        // -Z face
        Vertex { position: [ p, -p, -p], face: 2 },
        Vertex { position: [-p, -p, -p], face: 2 },
        Vertex { position: [-p,  p, -p], face: 2 },
        Vertex { position: [ p,  p, -p], face: 2 },
        // +X face
        Vertex { position: [ p, -p,  p], face: 0 },
        Vertex { position: [ p, -p, -p], face: 0 },
        Vertex { position: [ p,  p, -p], face: 0 },
        Vertex { position: [ p,  p,  p], face: 0 },
        // -X face
        Vertex { position: [-p, -p, -p], face: 0 },
        Vertex { position: [-p, -p,  p], face: 0 },
        Vertex { position: [-p,  p,  p], face: 0 },
        Vertex { position: [-p,  p, -p], face: 0 },
        // +Y face
        Vertex { position: [-p,  p,  p], face: 1 },
        Vertex { position: [ p,  p,  p], face: 1 },
        Vertex { position: [ p,  p, -p], face: 1 },
        Vertex { position: [-p,  p, -p], face: 1 },
        // -Y face
        Vertex { position: [-p, -p, -p], face: 1 },
        Vertex { position: [ p, -p, -p], face: 1 },
        Vertex { position: [ p, -p,  p], face: 1 },
        Vertex { position: [-p, -p,  p], face: 1 },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Remap clip space so that geometry projected for `viewport` lands in the
/// same pixels when drawn through the smaller `visible` viewport.
///
/// Render targets reject viewports that leave the surface, so a band that is
/// only partly scrolled into view is drawn through its visible part.
pub(crate) fn crop_matrix(viewport: Rect, visible: Rect) -> Mat4 {
    if viewport == visible || visible.is_empty() {
        return Mat4::IDENTITY;
    }
    let (vw, vh) = (viewport.width as f32, viewport.height as f32);
    let (cw, ch) = (visible.width as f32, visible.height as f32);
    let v_center = (viewport.x as f32 + vw / 2.0, viewport.y as f32 + vh / 2.0);
    let c_center = (visible.x as f32 + cw / 2.0, visible.y as f32 + ch / 2.0);
    let translate = Vec3::new(
        2.0 * (v_center.0 - c_center.0) / cw,
        -2.0 * (v_center.1 - c_center.1) / ch,
        0.0,
    );
    Mat4::from_translation(translate) * Mat4::from_scale(Vec3::new(vw / cw, vh / ch, 1.0))
}

/// Recorded draw work, encoded into a render pass on flush.
#[derive(Debug, Clone)]
enum DrawOp {
    Clear {
        area: Rect,
        uniform: u32,
    },
    Cubes {
        viewport: Rect,
        scissor: Rect,
        uniform: u32,
        instances: Range<u32>,
    },
}

/// Offscreen color + depth attachments the frame is drawn into.
struct FrameTarget {
    size: SurfaceSize,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl FrameTarget {
    fn new(device: &wgpu::Device, size: SurfaceSize) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame_color"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame_depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            size,
            color_view: color.create_view(&Default::default()),
            color,
            depth_view: depth.create_view(&Default::default()),
        }
    }
}

/// Pipelines and static buffers shared by every frame.
struct Pipelines {
    cube: wgpu::RenderPipeline,
    clear: wgpu::RenderPipeline,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
}

/// wgpu implementation of the compositing renderer.
///
/// Calls are recorded and encoded lazily: a render pass is emitted whenever
/// the frame is resized, copied out or submitted, so resizing between
/// batches never loses work already issued.
pub struct WgpuRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipelines: Pipelines,
    uniform_buffer: wgpu::Buffer,
    uniform_stride: u64,
    instance_buffer: wgpu::Buffer,
    frame: FrameTarget,
    max_dimension: u32,

    viewport: Rect,
    scissor: Rect,
    scissor_test: bool,
    clear_color: Color,

    ops: Vec<DrawOp>,
    uniforms: Vec<Uniforms>,
    instances: Vec<InstanceData>,
    encoder: Option<wgpu::CommandEncoder>,
}

impl WgpuRenderer {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, size: SurfaceSize) -> Self {
        let limits = device.limits();
        let uniform_size = std::mem::size_of::<Uniforms>() as u64;
        let uniform_stride =
            uniform_size.next_multiple_of(limits.min_uniform_buffer_offset_alignment as u64);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: uniform_stride * MAX_DRAWS,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(uniform_size),
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(uniform_size),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Cube pipeline
        let cube_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CUBE_SHADER.into()),
        });

        let cube = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &cube_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Uint32,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                            8 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &cube_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: FRAME_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
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
        });

        // Clear pipeline: color + depth reset inside the scissor
        let clear_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("clear_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CLEAR_SHADER.into()),
        });

        let clear = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("clear_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &clear_shader,
                entry_point: Some("vs_clear"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &clear_shader,
                entry_point: Some("fs_clear"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: FRAME_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Cube mesh
        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let cube_index_count = cube_indices.len() as u32;

        // Instance buffer (pre-allocated)
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: MAX_INSTANCES as u64 * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame = FrameTarget::new(&device, size);

        Self {
            max_dimension: limits.max_texture_dimension_2d,
            pipelines: Pipelines {
                cube,
                clear,
                uniform_bind_group,
                cube_vertex_buffer,
                cube_index_buffer,
                cube_index_count,
            },
            uniform_buffer,
            uniform_stride,
            instance_buffer,
            frame,
            viewport: size.bounds(),
            scissor: size.bounds(),
            scissor_test: false,
            clear_color: Color::BLACK,
            ops: Vec::new(),
            uniforms: Vec::new(),
            instances: Vec::new(),
            encoder: None,
            device,
            queue,
        }
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    /// The offscreen frame, for presentation.
    pub fn frame_view(&self) -> &wgpu::TextureView {
        &self.frame.color_view
    }

    /// Encode everything recorded so far and submit it to the queue.
    pub fn submit(&mut self) {
        self.flush();
        if !self.uniforms.is_empty() {
            let stride = self.uniform_stride as usize;
            let mut bytes = vec![0u8; stride * self.uniforms.len()];
            for (slot, uniform) in self.uniforms.iter().enumerate() {
                let start = slot * stride;
                bytes[start..start + std::mem::size_of::<Uniforms>()]
                    .copy_from_slice(bytemuck::bytes_of(uniform));
            }
            self.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
        }
        if !self.instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        }
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
        tracing::trace!(
            draws = self.uniforms.len(),
            instances = self.instances.len(),
            "frame submitted"
        );
        self.uniforms.clear();
        self.instances.clear();
    }

    fn push_uniform(&mut self, uniform: Uniforms) -> Result<u32, RenderError> {
        if self.uniforms.len() as u64 >= MAX_DRAWS {
            return Err(RenderError::Backend(format!(
                "more than {MAX_DRAWS} draws in one submission"
            )));
        }
        self.uniforms.push(uniform);
        Ok(self.uniforms.len() as u32 - 1)
    }

    /// Encode recorded ops into a render pass on the current frame.
    fn flush(&mut self) {
        if self.ops.is_empty() {
            return;
        }
        let ops = std::mem::take(&mut self.ops);
        let stride = self.uniform_stride;
        let frame_size = self.frame.size;
        let device = &self.device;
        let encoder = self.encoder.get_or_insert_with(|| new_encoder(device));
        let pipelines = &self.pipelines;

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("region_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.frame.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.frame.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        for op in &ops {
            match op {
                DrawOp::Clear { area, uniform } => {
                    pass.set_viewport(
                        0.0,
                        0.0,
                        frame_size.width.max(1) as f32,
                        frame_size.height.max(1) as f32,
                        0.0,
                        1.0,
                    );
                    set_scissor(&mut pass, *area);
                    pass.set_pipeline(&pipelines.clear);
                    pass.set_bind_group(
                        0,
                        &pipelines.uniform_bind_group,
                        &[(*uniform as u64 * stride) as u32],
                    );
                    pass.draw(0..3, 0..1);
                }
                DrawOp::Cubes {
                    viewport,
                    scissor,
                    uniform,
                    instances,
                } => {
                    pass.set_viewport(
                        viewport.x as f32,
                        viewport.y as f32,
                        viewport.width as f32,
                        viewport.height as f32,
                        0.0,
                        1.0,
                    );
                    set_scissor(&mut pass, *scissor);
                    pass.set_pipeline(&pipelines.cube);
                    pass.set_bind_group(
                        0,
                        &pipelines.uniform_bind_group,
                        &[(*uniform as u64 * stride) as u32],
                    );
                    pass.set_vertex_buffer(0, pipelines.cube_vertex_buffer.slice(..));
                    pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                    pass.set_index_buffer(
                        pipelines.cube_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint16,
                    );
                    pass.draw_indexed(0..pipelines.cube_index_count, 0, instances.clone());
                }
            }
        }
    }
}

fn new_encoder(device: &wgpu::Device) -> wgpu::CommandEncoder {
    device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("multiview_encoder"),
    })
}

fn set_scissor(pass: &mut wgpu::RenderPass<'_>, rect: Rect) {
    pass.set_scissor_rect(rect.x as u32, rect.y as u32, rect.width, rect.height);
}

impl Renderer for WgpuRenderer {
    fn set_size(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        if size.width > self.max_dimension || size.height > self.max_dimension {
            return Err(RenderError::Backend(format!(
                "frame {}x{} exceeds the device texture limit {}",
                size.width, size.height, self.max_dimension
            )));
        }
        if size != self.frame.size {
            self.flush();
            self.frame = FrameTarget::new(&self.device, size);
            tracing::debug!(width = size.width, height = size.height, "frame resized");
        }
        Ok(())
    }

    fn size(&self) -> SurfaceSize {
        self.frame.size
    }

    fn max_surface_height(&self) -> u32 {
        self.max_dimension
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
    }

    fn set_scissor(&mut self, rect: Rect) {
        self.scissor = rect;
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.scissor_test = enabled;
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn clear(&mut self) {
        let bounds = self.frame.size.bounds();
        let area = if self.scissor_test {
            self.scissor.intersect(&bounds)
        } else {
            Some(bounds).filter(|b| !b.is_empty())
        };
        let Some(area) = area else {
            return;
        };
        let uniform = Uniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            color: self.clear_color.to_rgba(),
        };
        match self.push_uniform(uniform) {
            Ok(uniform) => self.ops.push(DrawOp::Clear { area, uniform }),
            Err(e) => tracing::warn!("clear dropped: {e}"),
        }
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let bounds = self.frame.size.bounds();
        let Some(visible) = self.viewport.intersect(&bounds) else {
            return Ok(());
        };
        let scissor = if self.scissor_test {
            match self.scissor.intersect(&visible) {
                Some(s) => s,
                None => return Ok(()),
            }
        } else {
            visible
        };
        if scene.is_empty() {
            return Ok(());
        }

        let start = self.instances.len() as u32;
        let end = start + scene.len() as u32;
        if end > MAX_INSTANCES {
            return Err(RenderError::Backend(format!(
                "more than {MAX_INSTANCES} cube instances in one submission"
            )));
        }

        let view_proj = crop_matrix(self.viewport, visible) * camera.view_projection();
        let uniform = self.push_uniform(Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            color: [0.0; 4],
        })?;

        for cube in scene.cubes() {
            let cols = cube.transform().matrix().to_cols_array_2d();
            let [x, y, z] = cube.face_colors;
            self.instances.push(InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color_x: x.to_rgba(),
                color_y: y.to_rgba(),
                color_z: z.to_rgba(),
            });
        }

        self.ops.push(DrawOp::Cubes {
            viewport: visible,
            scissor,
            uniform,
            instances: start..end,
        });
        Ok(())
    }
}

impl CopyOut for WgpuRenderer {
    type Canvas = CanvasTexture;

    fn create_canvas(&mut self, size: SurfaceSize) -> Result<CanvasTexture, RenderError> {
        Ok(CanvasTexture::new(self.device.clone(), size))
    }

    fn copy_frame_to(
        &mut self,
        canvas: &mut CanvasTexture,
        dx: i32,
        dy: i32,
    ) -> Result<(), RenderError> {
        use multiview_render::Canvas;

        let Some(src) = copy_source_rect(self.frame.size, canvas.size(), dx, dy) else {
            return Ok(());
        };
        self.flush();
        let device = &self.device;
        let frame_texture = &self.frame.color;
        let encoder = self.encoder.get_or_insert_with(|| new_encoder(device));
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: src.x as u32,
                    y: src.y as u32,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: canvas.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: (src.x + dx) as u32,
                    y: (src.y + dy) as u32,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: src.width,
                height: src.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn cube_mesh_has_two_faces_per_color() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        for face in 0..3u32 {
            assert_eq!(verts.iter().filter(|v| v.face == face).count(), 8);
        }
    }

    #[test]
    fn crop_is_identity_for_fully_visible_viewport() {
        let r = Rect::new(0, 100, 640, 300);
        assert_eq!(crop_matrix(r, r), Mat4::IDENTITY);
    }

    #[test]
    fn crop_keeps_pixels_in_place() {
        // Band 0..400 scrolled so only its lower half (rows 200..400) shows.
        let viewport = Rect::new(0, -200, 100, 400);
        let visible = Rect::new(0, 0, 100, 200);
        let crop = crop_matrix(viewport, visible);

        // NDC y = -0.5 in the full band is pixel row 300 of the band,
        // i.e. frame row 100, which is NDC y = 0 of the visible part.
        let p = crop * Vec4::new(0.0, -0.5, 0.3, 1.0);
        assert!((p.x / p.w).abs() < 1e-6);
        assert!((p.y / p.w).abs() < 1e-6);
        assert!((p.z / p.w - 0.3).abs() < 1e-6);

        // Bottom edge of the band stays the bottom edge of the frame.
        let p = crop * Vec4::new(1.0, -1.0, 0.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn uniforms_fit_one_slot() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 80);
        assert_eq!(std::mem::size_of::<InstanceData>(), 112);
    }
}
