#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dicom_viewer::{
    ColorChoice, ColorTarget, Control, InteractionSurface, Label, Orientation, RenderError,
    Renderable, Renderer, SlotController, SlotId, Surface, Volume, VolumeLoaderError,
    VolumeSource, ViewerConfig,
};
use ndarray::Array3;
use tempfile::TempDir;

/// Serves synthetic volumes keyed by directory.
#[derive(Default)]
pub struct FakeSource {
    volumes: HashMap<PathBuf, ([usize; 3], String)>,
}

impl FakeSource {
    pub fn add(&mut self, directory: &Path, dimensions: [usize; 3], patient: &str) {
        self.volumes
            .insert(directory.to_path_buf(), (dimensions, patient.to_owned()));
    }
}

impl VolumeSource for FakeSource {
    fn load(&self, directory: &Path) -> Result<Volume, VolumeLoaderError> {
        let ([nx, ny, nz], patient) = self
            .volumes
            .get(directory)
            .ok_or(VolumeLoaderError::NoValidImages)?;
        let data = Array3::from_shape_fn((*nz, *ny, *nx), |(z, y, x)| (x + y + z) as f32);
        Ok(Volume::new(data, (1.0, 1.0, 1.0)).with_patient_identifier(patient.as_str()))
    }
}

/// What one actor looked like when a surface was drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Slice {
        plane: Orientation,
        offset: i32,
        opacity: f32,
    },
    /// Colour halfway through the scalar range.
    Volume {
        mid_color: [f32; 3],
    },
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub frames: Vec<(Surface, Vec<Actor>)>,
}

impl RecordingRenderer {
    pub fn count(&self, surface: Surface) -> usize {
        self.frames.iter().filter(|(s, _)| *s == surface).count()
    }

    pub fn last(&self, surface: Surface) -> Option<&[Actor]> {
        self.frames
            .iter()
            .rev()
            .find(|(s, _)| *s == surface)
            .map(|(_, actors)| actors.as_slice())
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, surface: Surface, scene: &[Renderable<'_>]) -> Result<(), RenderError> {
        let actors = scene
            .iter()
            .map(|renderable| match renderable {
                Renderable::Slice(pipeline) => Actor::Slice {
                    plane: pipeline.orientation(),
                    offset: pipeline.offset(),
                    opacity: pipeline.opacity(),
                },
                Renderable::Volume(pipeline) => {
                    let (min, max) = pipeline.volume().scalar_range();
                    let [r, g, b, _] = pipeline.classify((min + max) / 2.0);
                    Actor::Volume { mid_color: [r, g, b] }
                }
            })
            .collect();
        self.frames.push((surface, actors));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    SliderRange(Control, i32, i32),
    SliderValue(Control, i32),
    LabelText(Label, String),
    DisplayName(SlotId, String),
    ColorChoice(SlotId, ColorTarget, ColorChoice),
    Message(String),
}

#[derive(Default)]
pub struct RecordingUi {
    pub calls: Vec<UiCall>,
}

impl RecordingUi {
    pub fn slider_range(&self, control: Control) -> Option<(i32, i32)> {
        self.calls.iter().rev().find_map(|call| match call {
            UiCall::SliderRange(c, min, max) if *c == control => Some((*min, *max)),
            _ => None,
        })
    }

    pub fn slider_value(&self, control: Control) -> Option<i32> {
        self.calls.iter().rev().find_map(|call| match call {
            UiCall::SliderValue(c, value) if *c == control => Some(*value),
            _ => None,
        })
    }

    pub fn label(&self, label: Label) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            UiCall::LabelText(l, text) if *l == label => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn messages(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                UiCall::Message(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl InteractionSurface for RecordingUi {
    fn set_slider_range(&mut self, control: Control, min: i32, max: i32) {
        self.calls.push(UiCall::SliderRange(control, min, max));
    }

    fn set_slider_value(&mut self, control: Control, value: i32) {
        self.calls.push(UiCall::SliderValue(control, value));
    }

    fn set_label_text(&mut self, label: Label, text: &str) {
        self.calls.push(UiCall::LabelText(label, text.to_owned()));
    }

    fn set_display_name(&mut self, slot: SlotId, text: &str) {
        self.calls.push(UiCall::DisplayName(slot, text.to_owned()));
    }

    fn set_color_choice(&mut self, slot: SlotId, target: ColorTarget, choice: ColorChoice) {
        self.calls.push(UiCall::ColorChoice(slot, target, choice));
    }

    fn show_message(&mut self, text: &str) {
        self.calls.push(UiCall::Message(text.to_owned()));
    }
}

pub type TestViewer = SlotController<FakeSource, RecordingRenderer, RecordingUi>;

/// A non-empty directory on disk the fake source knows about.
pub fn series_dir(source: &mut FakeSource, dimensions: [usize; 3], patient: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("temporary directory");
    std::fs::write(dir.path().join("IM0001.dcm"), b"").expect("placeholder file");
    source.add(dir.path(), dimensions, patient);
    dir
}

/// A non-empty directory the fake source cannot decode.
pub fn undecodable_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("temporary directory");
    std::fs::write(dir.path().join("README"), b"no images here").expect("placeholder file");
    dir
}

pub fn viewer(source: FakeSource) -> TestViewer {
    SlotController::new(
        source,
        RecordingRenderer::default(),
        RecordingUi::default(),
        ViewerConfig::default(),
    )
}
