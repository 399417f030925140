//! Vertex layout and quad construction

use tessel_core::math::{quad_corners, Colour, Rect, Vec2};

/// One vertex as consumed by the graphics backend.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub texcoord: [f32; 2],
    pub colour: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec2, texcoord: Vec2, colour: Colour) -> Self {
        Self {
            position: position.to_array(),
            texcoord: texcoord.to_array(),
            colour: colour.to_array(),
        }
    }
}

/// Four vertices, top-left, top-right, bottom-right, bottom-left.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quad(pub [Vertex; 4]);

impl Quad {
    /// Textured, tinted sprite quad.
    ///
    /// `source` is the normalized texture region; `origin` is the pivot
    /// offset from the top-left of `dest` that `rotation` turns about.
    pub fn sprite(dest: Rect, source: Rect, origin: Vec2, rotation: f32, colour: Colour) -> Self {
        let corners = quad_corners(dest, origin, rotation);
        let uvs = [
            source.min(),
            Vec2::new(source.x + source.w, source.y),
            source.max(),
            Vec2::new(source.x, source.y + source.h),
        ];
        Self([0, 1, 2, 3].map(|i| Vertex::new(corners[i], uvs[i], colour)))
    }

    /// Untextured axis-aligned rectangle.
    pub fn rect(dest: Rect, colour: Colour) -> Self {
        Self::sprite(dest, Rect::new(0.0, 0.0, 1.0, 1.0), Vec2::ZERO, 0.0, colour)
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex; 4] {
        &self.0
    }
}

/// Largest quad count whose vertex indices fit in `u32`.
pub const MAX_INDEXED_QUADS: usize = (u32::MAX / 4) as usize + 1;

/// Index pattern drawing `quads` quads as two triangles each.
///
/// # Panics
///
/// If `quads` exceeds [`MAX_INDEXED_QUADS`].
pub fn quad_indices(quads: usize) -> Vec<u32> {
    assert!(
        quads <= MAX_INDEXED_QUADS,
        "{quads} quads exceed the u32 index range"
    );
    (0..quads)
        .flat_map(|q| {
            let base = (q * 4) as u32;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect()
}
