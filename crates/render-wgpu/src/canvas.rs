use std::sync::Arc;

use multiview_common::SurfaceSize;
use multiview_render::Canvas;

use crate::gpu::FRAME_FORMAT;

/// A dedicated GPU texture that receives one region copied out of the frame.
///
/// The texture is reallocated on resize and starts transparent black, so
/// rows the copy does not reach stay empty.
pub struct CanvasTexture {
    device: Arc<wgpu::Device>,
    size: SurfaceSize,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl CanvasTexture {
    pub fn new(device: Arc<wgpu::Device>, size: SurfaceSize) -> Self {
        let (texture, view) = allocate(&device, size);
        Self {
            device,
            size,
            texture,
            view,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

fn allocate(device: &wgpu::Device, size: SurfaceSize) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("canvas_texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FRAME_FORMAT,
        usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&Default::default());
    (texture, view)
}

impl Canvas for CanvasTexture {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        if size == self.size {
            return;
        }
        let (texture, view) = allocate(&self.device, size);
        self.texture = texture;
        self.view = view;
        self.size = size;
    }
}
