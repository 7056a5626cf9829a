use std::sync::Arc;

use crate::error::PipelineError;
use crate::transfer::{ColorTransferCurve, OpacityTransferCurve};
use crate::volume::Volume;

/// A volume classified by an opacity curve and a colour curve.
///
/// Opacity comes only from the opacity curve; the per-slot slice opacity
/// never reaches the 3-D volume.
#[derive(Debug)]
pub struct VolumePipeline {
    volume: Arc<Volume>,
    opacity_curve: OpacityTransferCurve,
    color_curve: ColorTransferCurve,
}

impl VolumePipeline {
    /// Builds with the default opacity curve and a grayscale colour ramp.
    pub fn build(volume: Arc<Volume>) -> Result<Self, PipelineError> {
        if volume.is_empty() {
            return Err(PipelineError::EmptyVolume);
        }
        let color_curve = ColorTransferCurve::new([(0.0, [0.0, 0.0, 0.0]), (1.0, [1.0, 1.0, 1.0])])
            .rescaled(volume.scalar_range());
        Ok(Self {
            volume,
            opacity_curve: OpacityTransferCurve::default_opacity(),
            color_curve,
        })
    }

    pub fn volume(&self) -> &Arc<Volume> {
        &self.volume
    }

    pub fn color_curve(&self) -> &ColorTransferCurve {
        &self.color_curve
    }

    pub fn opacity_curve(&self) -> &OpacityTransferCurve {
        &self.opacity_curve
    }

    /// Swaps the colour curve. `curve` is given on `[0, 1]` and is stretched
    /// over the volume's scalar range.
    pub fn set_color_curve(&mut self, curve: &ColorTransferCurve) {
        self.color_curve = curve.rescaled(self.volume.scalar_range());
    }

    /// Replaces the opacity curve, in absolute intensities.
    pub fn set_opacity_curve(&mut self, curve: OpacityTransferCurve) {
        self.opacity_curve = curve;
    }

    /// RGBA of one sample, all components in `[0, 1]`.
    #[inline]
    pub fn classify(&self, intensity: f32) -> [f32; 4] {
        let [r, g, b] = self.color_curve.evaluate(intensity);
        [r, g, b, self.opacity_curve.opacity(intensity)]
    }
}
