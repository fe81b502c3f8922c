//! Vertex types for the 2D draw list

use bytemuck::{Pod, Zeroable};

/// Screen-space vertex with position (pixels) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for things that have no sprite id
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.04, 0.03, 0.08, 1.0];
    pub const WALL_OUTLINE: [f32; 4] = [0.85, 0.85, 0.95, 1.0];
    pub const PLAYER: [f32; 4] = [0.3, 0.85, 0.45, 1.0];
    pub const PLAYER_HURT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BULLET: [f32; 4] = [0.6, 0.95, 1.0, 1.0];
    pub const HEART_FULL: [f32; 4] = [0.9, 0.15, 0.2, 1.0];
    pub const HEART_EMPTY: [f32; 4] = [0.25, 0.1, 0.12, 1.0];
    pub const HEALTH_BAR: [f32; 4] = [0.9, 0.2, 0.2, 1.0];
    pub const HEALTH_BAR_BACK: [f32; 4] = [0.1, 0.1, 0.1, 0.8];
    pub const LIGHT_GLOW: [f32; 4] = [1.0, 0.9, 0.6, 0.12];
    pub const TRACK: [f32; 4] = [0.45, 0.45, 0.5, 1.0];
    pub const DEBUG_RECT: [f32; 4] = [1.0, 0.0, 1.0, 0.8];
    pub const MODAL_BACK: [f32; 4] = [0.0, 0.0, 0.0, 0.75];
    pub const TEXT: [f32; 4] = [0.95, 0.95, 0.95, 1.0];
    pub const TEXT_DIM: [f32; 4] = [0.6, 0.6, 0.65, 1.0];
    pub const BANNER_GOOD: [f32; 4] = [0.3, 0.95, 0.4, 1.0];
    pub const BANNER_BAD: [f32; 4] = [0.95, 0.25, 0.2, 1.0];
}
