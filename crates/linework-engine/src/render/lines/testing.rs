//! Recording device/effect pair for exercising `LineBatch` without a GPU.

use nalgebra::Matrix4;

use super::device::{BlendState, LineDevice, RenderState};
use super::effect::{EffectParams, LineEffect};
use super::error::DeviceError;
use super::vertex::{LineVertex, VertexLayout};

/// One `draw_line_list` call as seen by the device.
#[derive(Debug, Clone)]
pub struct Submission {
    pub pass: usize,
    pub blend: BlendState,
    pub layout_stride: u64,
    pub projection: Matrix4<f32>,
    pub vertices: Vec<LineVertex>,
    pub primitive_count: usize,
}

pub struct RecordingDevice {
    /// Passes in the technique of effects created by this device.
    pub passes: usize,
    pub fail_create: bool,
    pub fail_draw: bool,

    pub created_layout_stride: Option<u64>,
    pub submissions: Vec<Submission>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self {
            passes: 1,
            fail_create: false,
            fail_draw: false,
            created_layout_stride: None,
            submissions: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingEffect {
    pub params: EffectParams,
    pub passes: usize,
    pub events: Vec<&'static str>,
}

impl LineEffect for RecordingEffect {
    fn params(&self) -> &EffectParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut EffectParams {
        &mut self.params
    }

    fn pass_count(&self) -> usize {
        self.passes
    }

    fn begin(&mut self) {
        self.events.push("begin");
    }

    fn end(&mut self) {
        self.events.push("end");
    }
}

impl LineDevice for RecordingDevice {
    type Effect = RecordingEffect;

    fn create_effect(&mut self, layout: &VertexLayout) -> Result<RecordingEffect, DeviceError> {
        if self.fail_create {
            return Err(DeviceError::Backend("effect creation refused".into()));
        }
        self.created_layout_stride = Some(layout.stride());
        Ok(RecordingEffect {
            passes: self.passes,
            ..Default::default()
        })
    }

    fn draw_line_list(
        &mut self,
        effect: &mut RecordingEffect,
        pass: usize,
        state: &RenderState<'_>,
        vertices: &[LineVertex],
        primitive_count: usize,
    ) -> Result<(), DeviceError> {
        if self.fail_draw {
            return Err(DeviceError::Backend("draw refused".into()));
        }
        effect.events.push(match pass {
            0 => "pass 0",
            1 => "pass 1",
            _ => "pass n",
        });
        self.submissions.push(Submission {
            pass,
            blend: state.blend,
            layout_stride: state.layout.stride(),
            projection: effect.params.projection,
            vertices: vertices.to_vec(),
            primitive_count,
        });
        Ok(())
    }
}
