use bytemuck::{Pod, Zeroable};
use multiview_common::{Color, Rect, SurfaceSize};
use multiview_render::Canvas;
use wgpu::util::DeviceExt;

use crate::canvas::CanvasTexture;
use crate::shaders;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct BlitVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

/// Two triangles covering `rect` (top-left pixel coordinates) in the clip
/// space of a `target`-sized surface.
fn quad_vertices(rect: Rect, target: SurfaceSize) -> [BlitVertex; 6] {
    let w = target.width.max(1) as f32;
    let h = target.height.max(1) as f32;
    let left = rect.x as f32 / w * 2.0 - 1.0;
    let right = rect.right() as f32 / w * 2.0 - 1.0;
    let top = 1.0 - rect.y as f32 / h * 2.0;
    let bottom = 1.0 - rect.bottom() as f32 / h * 2.0;

    let tl = BlitVertex { position: [left, top], uv: [0.0, 0.0] };
    let tr = BlitVertex { position: [right, top], uv: [1.0, 0.0] };
    let bl = BlitVertex { position: [left, bottom], uv: [0.0, 1.0] };
    let br = BlitVertex { position: [right, bottom], uv: [1.0, 1.0] };
    [tl, bl, br, br, tr, tl]
}

/// Slots for surfaces laid out one below the other, scrolled up by
/// `scroll_top` rows.
fn stacked_slots(sizes: impl IntoIterator<Item = SurfaceSize>, scroll_top: u32) -> Vec<Rect> {
    let mut y = -i64::from(scroll_top);
    sizes
        .into_iter()
        .map(|size| {
            let slot = Rect::new(0, y as i32, size.width, size.height);
            y += i64::from(size.height);
            slot
        })
        .collect()
}

/// Draws textures (the offscreen frame or dedicated canvases) onto the
/// window surface.
pub struct Presenter {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl Presenter {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLIT_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_blit"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<BlitVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x2,
                        1 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_blit"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Nearest filtering keeps copied pixels exact at 1:1 scale.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            bind_group_layout,
            sampler,
        }
    }

    /// Show an offscreen frame at the top-left corner of the target.
    #[allow(clippy::too_many_arguments)]
    pub fn present_frame(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        target_size: SurfaceSize,
        background: Color,
        frame: &wgpu::TextureView,
        frame_size: SurfaceSize,
    ) {
        self.present(
            device,
            queue,
            target,
            target_size,
            background,
            &[(frame, frame_size.bounds())],
        );
    }

    /// Stack canvases top to bottom, each in its own slot, scrolled up by
    /// `scroll_top` rows. Canvases entirely outside the target are skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn present_canvases(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        target_size: SurfaceSize,
        background: Color,
        canvases: &[CanvasTexture],
        scroll_top: u32,
    ) {
        let slots = stacked_slots(canvases.iter().map(|c| c.size()), scroll_top);
        let items: Vec<(&wgpu::TextureView, Rect)> = canvases
            .iter()
            .zip(slots)
            .filter(|(_, slot)| slot.overlaps(&target_size.bounds()))
            .map(|(canvas, slot)| (canvas.view(), slot))
            .collect();
        self.present(device, queue, target, target_size, background, &items);
    }

    /// Clear `target` to `background`, then draw each texture into its
    /// rectangle. Rectangles may run off the target; the excess is clipped.
    pub fn present(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        target_size: SurfaceSize,
        background: Color,
        items: &[(&wgpu::TextureView, Rect)],
    ) {
        let vertices: Vec<BlitVertex> = items
            .iter()
            .flat_map(|(_, rect)| quad_vertices(*rect, target_size))
            .collect();
        let bind_groups: Vec<wgpu::BindGroup> = items
            .iter()
            .map(|(view, _)| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("blit_bind_group"),
                    layout: &self.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                })
            })
            .collect();
        let vertex_buffer = (!vertices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("blit_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("present_encoder"),
        });
        {
            let [r, g, b, a] = background.to_rgba();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });

            if let Some(vertex_buffer) = &vertex_buffer {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                for (i, bind_group) in bind_groups.iter().enumerate() {
                    let first = i as u32 * 6;
                    pass.set_bind_group(0, bind_group, &[]);
                    pass.draw(first..first + 6, 0..1);
                }
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_target_quad_spans_clip_space() {
        let size = SurfaceSize::new(640, 480);
        let quad = quad_vertices(size.bounds(), size);
        assert_eq!(quad[0].position, [-1.0, 1.0]);
        assert_eq!(quad[2].position, [1.0, -1.0]);
        assert_eq!(quad[2].uv, [1.0, 1.0]);
    }

    #[test]
    fn quad_below_top_edge_moves_down() {
        let size = SurfaceSize::new(100, 200);
        let quad = quad_vertices(Rect::new(0, 100, 100, 100), size);
        assert_eq!(quad[0].position, [-1.0, 0.0]);
        assert_eq!(quad[1].position, [-1.0, -1.0]);
    }

    #[test]
    fn slots_follow_each_other_and_scroll() {
        let sizes = [SurfaceSize::new(100, 50), SurfaceSize::new(100, 80)];
        let slots = stacked_slots(sizes, 0);
        assert_eq!(slots, vec![Rect::new(0, 0, 100, 50), Rect::new(0, 50, 100, 80)]);
        let slots = stacked_slots(sizes, 60);
        assert_eq!(slots[0], Rect::new(0, -60, 100, 50));
        assert_eq!(slots[1], Rect::new(0, -10, 100, 80));
    }

    #[test]
    fn offscreen_quad_extends_past_clip_space() {
        let size = SurfaceSize::new(100, 100);
        let quad = quad_vertices(Rect::new(0, -50, 100, 100), size);
        assert_eq!(quad[0].position, [-1.0, 2.0]);
        assert_eq!(quad[1].position, [-1.0, 0.0]);
    }
}
