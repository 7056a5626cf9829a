//! Reading a DICOM series from disk into a [`Volume`].

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, Array3, Axis, s};
use thiserror::Error;
use tracing::{debug, warn};

use crate::enums::SortBy;
use crate::volume::Volume;

/// Display name used when a series carries no patient attributes.
pub const ANONYMOUS_PATIENT: &str = "Anonymous";

type DicomFile = FileDicomObject<InMemDicomObject>;

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("Missing spacing information")]
    MissingSpacing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),
}

/// Produces a scalar volume from a directory.
///
/// The DICOM implementation is [`DicomDirectorySource`]; the controller only
/// depends on this trait so other sources can stand in for it.
pub trait VolumeSource {
    fn load(&self, directory: &Path) -> Result<Volume, VolumeLoaderError>;
}

/// Reads a directory of `.dcm` files, ordered by `sort_by`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DicomDirectorySource {
    pub sort_by: SortBy,
}

impl DicomDirectorySource {
    pub fn new(sort_by: SortBy) -> Self {
        Self { sort_by }
    }
}

impl VolumeSource for DicomDirectorySource {
    fn load(&self, directory: &Path) -> Result<Volume, VolumeLoaderError> {
        VolumeLoader::load_from_directory(directory, self.sort_by)
    }
}

/// One decoded image and the key it is stacked by.
struct DecodedSlice {
    key: Option<f32>,
    pixels: Array2<f32>,
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from a directory containing `.dcm` files
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be read, holds no DICOM files, or if any
    /// file cannot be parsed.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_dicom_file(path))
            .collect();
        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }
        // stable input order for files that share a sort key
        paths.sort();
        debug!(directory = %path.as_ref().display(), files = paths.len(), "reading series");

        Self::load_from_file_paths(&paths, sort_by)
    }

    /// Load a volume from explicit file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let files = paths
            .iter()
            .map(|path| open_file(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::load_from_dicom_objects(&files, sort_by)
    }

    /// Stack already parsed DICOM objects into a volume.
    ///
    /// Objects whose pixel data cannot be decoded, or that lack the sort
    /// attribute, are skipped.
    ///
    /// # Errors
    ///
    /// Fails if nothing decodes, if image sizes differ, or if no object
    /// carries pixel spacing and slice thickness.
    pub fn load_from_dicom_objects(
        files: &[DicomFile],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let mut slices: Vec<DecodedSlice> = files
            .iter()
            .filter_map(|file| {
                let decoded = Self::decode_slice(file, sort_by);
                if decoded.is_none() {
                    warn!("skipping undecodable DICOM object");
                }
                decoded
            })
            .collect();
        if slices.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::order_slices(&mut slices, sort_by);
        let data = Self::stack_slices(&slices)?;
        let spacing = files
            .iter()
            .find_map(Self::spacing)
            .ok_or(VolumeLoaderError::MissingSpacing)?;
        let patient = files
            .iter()
            .find_map(Self::patient_identifier)
            .unwrap_or_else(|| ANONYMOUS_PATIENT.to_owned());

        Ok(Volume::new(data, spacing).with_patient_identifier(patient))
    }

    fn decode_slice(file: &DicomFile, sort_by: SortBy) -> Option<DecodedSlice> {
        let key = Self::sort_key(file, sort_by)?;
        let pixels = Self::decode_first_frame(file)?;
        Some(DecodedSlice { key, pixels })
    }

    /// `None` if the attribute `sort_by` needs is absent; `Some(None)` if it
    /// is present but unreadable.
    fn sort_key(file: &DicomFile, sort_by: SortBy) -> Option<Option<f32>> {
        let key = match sort_by {
            SortBy::ImagePositionPatient => file
                .element(tags::IMAGE_POSITION_PATIENT)
                .ok()?
                .to_multi_float32()
                .ok()
                .and_then(|position| position.get(2).copied()),
            SortBy::TablePosition => file.element(tags::TABLE_POSITION).ok()?.to_float32().ok(),
            SortBy::InstanceNumber => file
                .element(tags::INSTANCE_NUMBER)
                .ok()?
                .to_int::<i32>()
                .ok()
                .map(|number| number as f32),
            SortBy::None => Some(0.0),
        };
        Some(key)
    }

    /// First frame in modality units (rescale slope and intercept applied).
    fn decode_first_frame(file: &DicomFile) -> Option<Array2<f32>> {
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::Default)
            .with_voi_lut(VoiLutOption::Identity);
        let frames = file
            .decode_pixel_data()
            .ok()?
            .to_ndarray_with_options::<f32>(&options)
            .ok()?;
        Some(frames.slice_move(s![0, .., .., 0]))
    }

    /// Ascending by key, except image position which stacks from the
    /// highest position down. Keys that cannot be compared keep input order.
    fn order_slices(slices: &mut [DecodedSlice], sort_by: SortBy) {
        match sort_by {
            SortBy::None => {}
            SortBy::ImagePositionPatient => {
                slices.sort_by(|a, b| compare_keys(b.key, a.key));
            }
            SortBy::TablePosition | SortBy::InstanceNumber => {
                slices.sort_by(|a, b| compare_keys(a.key, b.key));
            }
        }
    }

    fn stack_slices(slices: &[DecodedSlice]) -> Result<Array3<f32>, VolumeLoaderError> {
        let Some(first) = slices.first() else {
            return Err(VolumeLoaderError::NoValidImages);
        };
        let (height, width) = first.pixels.dim();
        if slices.iter().any(|slice| slice.pixels.dim() != (height, width)) {
            return Err(VolumeLoaderError::InconsistentDimensions);
        }
        if height == 0 || width == 0 {
            return Err(VolumeLoaderError::NoValidImages);
        }

        let mut data = Array3::<f32>::zeros((slices.len(), height, width));
        for (mut plane, slice) in data.axis_iter_mut(Axis(0)).zip(slices) {
            plane.assign(&slice.pixels);
        }
        Ok(data)
    }

    /// Voxel size along `(x, y, z)` in millimetres. Pixel Spacing lists the
    /// row spacing (along y) before the column spacing (along x).
    fn spacing(file: &DicomFile) -> Option<(f32, f32, f32)> {
        let pixel_spacing = file
            .element(tags::PIXEL_SPACING)
            .ok()?
            .to_multi_float32()
            .ok()?;
        let thickness = file.element(tags::SLICE_THICKNESS).ok()?.to_float32().ok()?;
        match pixel_spacing.as_slice() {
            [row, column, ..] => Some((*column, *row, thickness)),
            _ => None,
        }
    }

    /// Patient name with `^` separators as spaces, falling back to patient ID.
    fn patient_identifier(file: &DicomFile) -> Option<String> {
        [tags::PATIENT_NAME, tags::PATIENT_ID]
            .into_iter()
            .find_map(|tag| {
                let raw = file.element(tag).ok()?.to_str().ok()?;
                let name = raw
                    .trim_end_matches('\0')
                    .split('^')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                (!name.is_empty()).then_some(name)
            })
    }
}

fn compare_keys(a: Option<f32>, b: Option<f32>) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn is_dicom_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
}
