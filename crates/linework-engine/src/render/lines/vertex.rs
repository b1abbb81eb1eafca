use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

/// One end of a line segment: position (Z fixed to 0) plus color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4  // color
    ];

    #[inline]
    pub fn new(position: Vec2, color: Color) -> Self {
        Self {
            position: [position.x, position.y, 0.0],
            color: color.to_array(),
        }
    }

    #[inline]
    pub fn position_2d(&self) -> Vec2 {
        Vec2::new(self.position[0], self.position[1])
    }

    #[inline]
    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.color;
        Color::rgba(r, g, b, a)
    }

    /// Layout descriptor matching this type.
    pub fn layout() -> VertexLayout {
        VertexLayout {
            buffer: wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &Self::ATTRS,
            },
        }
    }
}

/// Vertex layout descriptor owned by a line batch and handed to the device.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    buffer: wgpu::VertexBufferLayout<'static>,
}

impl VertexLayout {
    #[inline]
    pub fn stride(&self) -> u64 {
        self.buffer.array_stride
    }

    #[inline]
    pub fn attributes(&self) -> &'static [wgpu::VertexAttribute] {
        self.buffer.attributes
    }

    #[inline]
    pub fn to_wgpu(&self) -> wgpu::VertexBufferLayout<'static> {
        self.buffer.clone()
    }
}
