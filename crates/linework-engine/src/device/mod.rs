//! GPU device + window surface.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue, configures the surface and
//! hands out per-frame encoders and views.

mod error;
mod gpu;
mod init;

pub use error::SurfaceErrorAction;
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
