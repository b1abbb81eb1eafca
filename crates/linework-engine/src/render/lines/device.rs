use super::effect::LineEffect;
use super::error::DeviceError;
use super::vertex::{LineVertex, VertexLayout};

/// Blend factor applied to one side of the blend equation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// Additive blend configuration: `src * src_factor + dst * dst_factor`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendState {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

impl BlendState {
    /// Standard straight-alpha blending.
    pub const ALPHA_BLEND: BlendState = BlendState {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
    };
}

/// Everything the device needs to configure before a line draw.
///
/// Built by the batch at flush time instead of mutating device-global state.
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub layout: &'a VertexLayout,
    pub blend: BlendState,
}

/// Rendering device consumed by [`LineBatch`](super::LineBatch).
pub trait LineDevice {
    type Effect: LineEffect;

    /// Creates a color-only effect able to consume vertices of `layout`.
    fn create_effect(&mut self, layout: &VertexLayout) -> Result<Self::Effect, DeviceError>;

    /// Runs pass `pass` of `effect` and draws `primitive_count` lines from
    /// `vertices` (line-list topology, two vertices per primitive).
    ///
    /// The pass is entered and exited within this call.
    fn draw_line_list(
        &mut self,
        effect: &mut Self::Effect,
        pass: usize,
        state: &RenderState<'_>,
        vertices: &[LineVertex],
        primitive_count: usize,
    ) -> Result<(), DeviceError>;
}
