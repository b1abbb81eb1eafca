//! Coordinate and geometry types shared by the line batcher and the runtime.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Vertices keep this space; the projection handed to a line batch converts
//! to clip space on the GPU.

mod projection;
mod rect;
mod vec2;
mod viewport;

pub use projection::{forward_view, ortho_top_left};
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
