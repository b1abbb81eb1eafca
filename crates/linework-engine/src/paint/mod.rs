//! Color model shared between callers and the line renderer.

mod color;

pub use color::Color;
