//! GPU rendering subsystem.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - The projection from [`RenderCtx::projection`] converts to clip space in
//!   the vertex shader.

mod ctx;
pub mod lines;

pub use ctx::RenderCtx;
