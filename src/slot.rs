use std::path::PathBuf;
use std::sync::Arc;

use crate::compositor::Renderable;
use crate::enums::{ColorChoice, Orientation, SlotId, Surface};
use crate::error::PipelineError;
use crate::plane::plane_for;
use crate::slice_pipeline::SlicePipeline;
use crate::volume::Volume;
use crate::volume_pipeline::VolumePipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Loading,
    Loaded,
}

/// The four pipelines built from one loaded volume.
#[derive(Debug)]
pub struct SlotPipelines {
    volume: Arc<Volume>,
    slices: [SlicePipeline; 3],
    volume_pipeline: VolumePipeline,
}

impl SlotPipelines {
    /// Fans one volume out to the three slice pipelines and the volume pipeline.
    pub fn build(volume: Arc<Volume>) -> Result<Self, PipelineError> {
        let [axial, coronal, sagittal] = Orientation::ALL
            .map(|orientation| SlicePipeline::build(volume.clone(), plane_for(orientation)));
        let slices = [axial?, coronal?, sagittal?];
        let volume_pipeline = VolumePipeline::build(volume.clone())?;
        Ok(Self {
            volume,
            slices,
            volume_pipeline,
        })
    }

    pub fn volume(&self) -> &Arc<Volume> {
        &self.volume
    }

    pub fn slice(&self, orientation: Orientation) -> &SlicePipeline {
        &self.slices[orientation.index()]
    }

    pub fn slice_mut(&mut self, orientation: Orientation) -> &mut SlicePipeline {
        &mut self.slices[orientation.index()]
    }

    pub fn slices_mut(&mut self) -> impl Iterator<Item = &mut SlicePipeline> {
        self.slices.iter_mut()
    }

    pub fn volume_pipeline(&self) -> &VolumePipeline {
        &self.volume_pipeline
    }

    pub fn volume_pipeline_mut(&mut self) -> &mut VolumePipeline {
        &mut self.volume_pipeline
    }

    /// The output shown on `surface`.
    pub fn renderable(&self, surface: Surface) -> Renderable<'_> {
        match surface.orientation() {
            Some(orientation) => Renderable::Slice(self.slice(orientation)),
            None => Renderable::Volume(&self.volume_pipeline),
        }
    }
}

/// One of the two dataset identities and everything loaded into it.
#[derive(Debug)]
pub struct DatasetSlot {
    pub id: SlotId,
    pub(crate) state: SlotState,
    pub(crate) directory: Option<PathBuf>,
    pub(crate) display_name: String,
    pub(crate) opacity: f32,
    pub(crate) slice_color: ColorChoice,
    pub(crate) volume_color: ColorChoice,
    pub(crate) pipelines: Option<SlotPipelines>,
}

impl DatasetSlot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            state: SlotState::Empty,
            directory: None,
            display_name: String::new(),
            opacity: 1.0,
            slice_color: ColorChoice::Grayscale,
            volume_color: ColorChoice::Grayscale,
            pipelines: None,
        }
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == SlotState::Loaded
    }

    pub fn directory(&self) -> Option<&std::path::Path> {
        self.directory.as_deref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Opacity applied to this slot's slice actors, in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn slice_color(&self) -> ColorChoice {
        self.slice_color
    }

    pub fn volume_color(&self) -> ColorChoice {
        self.volume_color
    }

    pub fn pipelines(&self) -> Option<&SlotPipelines> {
        self.pipelines.as_ref()
    }

    /// Pipelines of a loaded slot; `None` while empty or loading.
    pub fn loaded_pipelines(&self) -> Option<&SlotPipelines> {
        match self.state {
            SlotState::Loaded => self.pipelines.as_ref(),
            SlotState::Empty | SlotState::Loading => None,
        }
    }

    pub(crate) fn loaded_pipelines_mut(&mut self) -> Option<&mut SlotPipelines> {
        match self.state {
            SlotState::Loaded => self.pipelines.as_mut(),
            SlotState::Empty | SlotState::Loading => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn pipelines_share_one_volume() {
        let volume = Arc::new(Volume::new(Array3::zeros((4, 3, 2)), (1.0, 1.0, 1.0)));
        let pipelines = SlotPipelines::build(volume.clone()).unwrap();
        for orientation in Orientation::ALL {
            assert!(Arc::ptr_eq(pipelines.slice(orientation).volume(), &volume));
            assert_eq!(pipelines.slice(orientation).orientation(), orientation);
        }
        assert!(Arc::ptr_eq(pipelines.volume_pipeline().volume(), &volume));
        // this handle, the aggregate, three slices and the volume pipeline
        assert_eq!(Arc::strong_count(&volume), 6);
    }

    #[test]
    fn renderable_matches_surface() {
        let volume = Arc::new(Volume::new(Array3::zeros((4, 3, 2)), (1.0, 1.0, 1.0)));
        let pipelines = SlotPipelines::build(volume).unwrap();
        assert!(matches!(pipelines.renderable(Surface::Volume), Renderable::Volume(_)));
        match pipelines.renderable(Surface::Coronal) {
            Renderable::Slice(slice) => assert_eq!(slice.orientation(), Orientation::Coronal),
            Renderable::Volume(_) => panic!("coronal surface shows a slice"),
        }
    }

    #[test]
    fn new_slot_is_empty() {
        let slot = DatasetSlot::new(SlotId::Slot2);
        assert_eq!(slot.state(), SlotState::Empty);
        assert!(slot.pipelines().is_none());
    }
}
