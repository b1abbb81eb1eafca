//! linework engine crate.
//!
//! A fixed-capacity line batcher ([`render::lines::LineBatch`]) plus the wgpu
//! device, window runtime and logging it runs on.

pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
