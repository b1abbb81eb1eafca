//! Window + runtime loop.
//!
//! Owns the `winit` event loop and window and wires them to the GPU context.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
