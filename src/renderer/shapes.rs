//! Shape generation for 2D primitives, in screen pixels

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::geom::Rect;

/// Filled rectangle as two triangles
pub fn quad(rect: Rect, color: [f32; 4]) -> Vec<Vertex> {
    let (l, t) = (rect.left() as f32, rect.top() as f32);
    let (r, b) = (rect.right() as f32, rect.bottom() as f32);
    vec![
        Vertex::new(l, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, b, color),
    ]
}

/// Hollow rectangle made of four strips
pub fn outline(rect: Rect, thickness: i32, color: [f32; 4]) -> Vec<Vertex> {
    let t = thickness.min(rect.w / 2).min(rect.h / 2).max(1);
    let strips = [
        Rect::new(rect.x, rect.y, rect.w, t),
        Rect::new(rect.x, rect.bottom() - t, rect.w, t),
        Rect::new(rect.x, rect.y + t, t, rect.h - 2 * t),
        Rect::new(rect.right() - t, rect.y + t, t, rect.h - 2 * t),
    ];
    strips
        .into_iter()
        .filter(|s| !s.is_empty())
        .flat_map(|s| quad(s, color))
        .collect()
}

/// Thick line segment
pub fn line(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    let (a1, a2) = (a + perp, a - perp);
    let (b1, b2) = (b + perp, b - perp);
    vec![
        Vertex::new(a1.x, a1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b2.x, b2.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Cycling hue used for sprites with no palette entry
pub fn rainbow(tick: u64, phase: u32) -> [f32; 4] {
    let t = ((tick + u64::from(phase) * 7) % 60) as f32 / 60.0;
    let hue = t * 6.0;
    let x = 1.0 - (hue % 2.0 - 1.0).abs();
    let (r, g, b) = match hue as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    [r, g, b, 1.0]
}
