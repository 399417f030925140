//! Math and geometry utilities
//!
//! Re-exports glam for vectors and matrices, plus the 2D helpers the
//! renderer and game code share: axis-aligned rectangles, an orthographic
//! camera, sprite quad corners and RGBA colours.

mod camera;
mod colour;
mod quad;
mod rect;

pub use camera::Camera2D;
pub use colour::Colour;
pub use glam::*;
pub use quad::quad_corners;
pub use rect::Rect;
