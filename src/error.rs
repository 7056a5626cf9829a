use std::path::PathBuf;

use thiserror::Error;

use crate::enums::{SlotId, Surface};
use crate::volume_loader::VolumeLoaderError;

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("Volume has no voxels")]
    EmptyVolume,

    #[error("Offset {value} outside of [{min}, {max}]")]
    OffsetOutOfRange { value: i32, min: i32, max: i32 },

    #[error("Reslice transform is not finite")]
    DegenerateTransform,

    #[error("Reslice produced an empty cross-section")]
    EmptyCrossSection,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown catalog entry `{0}`")]
    UnknownEntry(String),

    #[error("Catalog entry `{name}` is not a {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Surface {0:?} could not be rendered: {1}")]
    Surface(Surface, String),
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Invalid directory {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("Loading {slot} failed: {source}")]
    Load {
        slot: SlotId,
        #[source]
        source: VolumeLoaderError,
    },

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}
