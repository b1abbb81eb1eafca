//! Fixed-capacity line batching.
//!
//! [`LineBatch`] buffers segments on the CPU and hands them to a
//! [`LineDevice`] in as few draw calls as possible. The device and the
//! [`LineEffect`] it creates are collaborators; [`WgpuLineDevice`] is the
//! wgpu implementation used by the runtime.

mod batch;
mod device;
mod effect;
mod error;
mod gpu;
mod polygon;
mod stats;
mod vertex;

#[cfg(test)]
mod testing;

pub use batch::{LineBatch, LineBatchConfig, DEFAULT_CAPACITY};
pub use device::{BlendFactor, BlendState, LineDevice, RenderState};
pub use effect::{EffectParams, LineEffect};
pub use error::{DeviceError, LineBatchError, LineBatchResult};
pub use gpu::{WgpuEffect, WgpuLineDevice};
pub use polygon::{OutlineStyle, Polygon, PolygonSource};
pub use stats::BatchStats;
pub use vertex::{LineVertex, VertexLayout};
