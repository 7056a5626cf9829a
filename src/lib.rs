//! # DICOM-viewer library
//!
//! This crate drives an orthogonal slice and volume viewer for up to two
//! overlaid DICOM series.
//!
//! A series is read from a directory into a scalar volume, which is then
//! fanned out to four pipelines per dataset slot:
//! - Axial, Coronal and Sagittal slice pipelines, each cutting the volume
//!   with a fixed plane whose offset follows a slider
//! - A volume pipeline classifying the whole volume with an opacity curve
//!   and a colour curve
//!
//! Outputs of both slots are layered on the same four display surfaces:
//! slot 1 underneath, slot 2 on top with its own opacity and colour map.
//! The widget toolkit, the directory chooser and the rendering backend are
//! collaborators behind the [`InteractionSurface`], [`VolumeSource`] and
//! [`Renderer`] traits. The crate ships a DICOM directory source, a software
//! renderer and a line-oriented console surface.
//!
//! All events are handled on one thread, in order. Loading blocks until the
//! volume and all four pipelines are ready; until then the slot keeps
//! whatever it showed before and ignores its controls.
//!
//! # Examples
//!
//! ## Loading a series and scrubbing the axial plane
//!
//! ```no_run
//! # use dicom_viewer::{
//! #     ConsoleSurface, DicomDirectorySource, Orientation, SlotController, SlotId,
//! #     SoftwareRenderer, ViewerConfig, ViewerEvent,
//! # };
//! let config = ViewerConfig::default();
//! let (width, height) = config.surface_size;
//! let mut viewer = SlotController::new(
//!    DicomDirectorySource::new(config.sort_by),
//!    SoftwareRenderer::new(width, height),
//!    ConsoleSurface::new(),
//!    config,
//! );
//! viewer
//!    .handle(ViewerEvent::LoadRequested {
//!        slot: SlotId::Slot1,
//!        directory: "dicom".into(),
//!    })
//!    .expect("should have loaded the series");
//! viewer
//!    .handle(ViewerEvent::SliceChanged {
//!        plane: Orientation::Axial,
//!        value: 10,
//!    })
//!    .expect("should have resliced");
//! ```

pub mod catalog;
pub mod compositor;
pub mod config;
pub mod console;
pub mod controller;
pub mod enums;
pub mod error;
pub mod interaction;
mod interpolator;
pub mod plane;
pub mod render;
pub mod slice_pipeline;
pub mod slot;
pub mod transfer;
pub mod volume;
pub mod volume_loader;
pub mod volume_pipeline;

pub use catalog::{Catalog, LookupTable};
pub use compositor::{Renderable, Renderer, ViewCompositor};
pub use config::{SlotDefaults, ViewerConfig};
pub use console::{Command, ConsoleSurface};
pub use controller::{Ignored, Outcome, SlotController, ViewerEvent};
pub use enums::{ColorChoice, ColorTarget, Control, Label, Orientation, SlotId, SortBy, Surface};
pub use error::{CatalogError, PipelineError, RenderError, ViewerError};
pub use interaction::InteractionSurface;
pub use plane::{PlaneDefinition, ResliceAxes, plane_for};
pub use render::SoftwareRenderer;
pub use slice_pipeline::SlicePipeline;
pub use slot::{DatasetSlot, SlotPipelines, SlotState};
pub use transfer::{ColorTransferCurve, OpacityTransferCurve};
pub use volume::Volume;
pub use volume_loader::{DicomDirectorySource, VolumeLoader, VolumeLoaderError, VolumeSource};
pub use volume_pipeline::VolumePipeline;
