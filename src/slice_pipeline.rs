use std::sync::Arc;

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

use crate::catalog::LookupTable;
use crate::enums::Orientation;
use crate::error::PipelineError;
use crate::interpolator::Interpolator;
use crate::plane::{PlaneDefinition, ResliceAxes};
use crate::transfer::ColorTransferCurve;
use crate::volume::Volume;

/// Cuts one 2-D cross-section out of a volume along a fixed plane.
///
/// The only mutable geometry is the offset along the plane normal. After
/// [`SlicePipeline::set_offset`] the cross-section is stale until
/// [`SlicePipeline::update`] recomputes it; a failed recompute keeps the
/// previous cross-section.
#[derive(Debug)]
pub struct SlicePipeline {
    volume: Arc<Volume>,
    plane: &'static PlaneDefinition,
    axes: ResliceAxes,
    max_offset: i32,
    cross_section: Array2<f32>,
    stale: bool,
    lookup: LookupTable,
    opacity: f32,
}

impl SlicePipeline {
    /// Builds the pipeline and its cross-section at offset 0.
    ///
    /// The lookup table starts as a grayscale ramp over the volume's scalar range.
    pub fn build(volume: Arc<Volume>, plane: &'static PlaneDefinition) -> Result<Self, PipelineError> {
        if volume.is_empty() {
            return Err(PipelineError::EmptyVolume);
        }
        let depth = volume.dimensions()[plane.depth_axis];
        let max_offset = i32::try_from(depth - 1).unwrap_or(i32::MAX);

        let mut axes = ResliceAxes::new(plane);
        axes.set_offset(0.0);
        let cross_section = reslice(&volume, &axes)?;

        let mut lookup = LookupTable::from_curve(&ColorTransferCurve::new([
            (0.0, [0.0, 0.0, 0.0]),
            (1.0, [1.0, 1.0, 1.0]),
        ]));
        lookup.set_range(volume.scalar_range());

        Ok(Self {
            volume,
            plane,
            axes,
            max_offset,
            cross_section,
            stale: false,
            lookup,
            opacity: 1.0,
        })
    }

    pub fn orientation(&self) -> Orientation {
        self.plane.orientation
    }

    pub fn volume(&self) -> &Arc<Volume> {
        &self.volume
    }

    pub fn reslice_axes(&self) -> &ResliceAxes {
        &self.axes
    }

    /// Valid offsets along the depth axis, inclusive.
    pub fn offset_range(&self) -> (i32, i32) {
        (0, self.max_offset)
    }

    pub fn offset(&self) -> i32 {
        self.axes.offset() as i32
    }

    /// Physical size of one cross-section pixel, `(column, row)` in millimetres.
    pub fn pixel_spacing(&self) -> (f64, f64) {
        (
            self.volume.step_length(self.axes.axis(0)),
            self.volume.step_length(self.axes.axis(1)),
        )
    }

    /// Moves the plane along its normal.
    ///
    /// Values outside [`Self::offset_range`] are rejected and leave the
    /// transform untouched.
    pub fn set_offset(&mut self, value: i32) -> Result<(), PipelineError> {
        let (min, max) = self.offset_range();
        if !(min..=max).contains(&value) {
            return Err(PipelineError::OffsetOutOfRange { value, min, max });
        }
        self.axes.set_offset(f64::from(value));
        self.stale = true;
        Ok(())
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Recomputes the cross-section if the offset changed.
    pub fn update(&mut self) -> Result<(), PipelineError> {
        if !self.stale {
            return Ok(());
        }
        let cross_section = reslice(&self.volume, &self.axes)?;
        debug!(
            plane = %self.orientation(),
            offset = self.offset(),
            "resliced {}x{}",
            cross_section.ncols(),
            cross_section.nrows()
        );
        self.cross_section = cross_section;
        self.stale = false;
        Ok(())
    }

    /// The current cross-section, indexed `[row, column]`.
    pub fn cross_section(&self) -> ArrayView2<'_, f32> {
        self.cross_section.view()
    }

    /// Rebinds the lookup table, re-ranged to this pipeline's volume.
    pub fn apply_color_map(&mut self, lookup: &LookupTable) {
        let mut lookup = lookup.clone();
        lookup.set_range(self.volume.scalar_range());
        self.lookup = lookup;
    }

    pub fn lookup_table(&self) -> &LookupTable {
        &self.lookup
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}

/// Samples `volume` on the plane described by `axes`.
///
/// The output covers the projection of the whole volume onto the plane's
/// in-plane axes; points that fall outside the grid take the minimum intensity.
fn reslice(volume: &Volume, axes: &ResliceAxes) -> Result<Array2<f32>, PipelineError> {
    if axes.matrix().iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::DegenerateTransform);
    }
    let [nx, ny, nz] = volume.dimensions();
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(PipelineError::EmptyVolume);
    }

    let origin = axes.origin();
    let (u_axis, v_axis) = (axes.axis(0), axes.axis(1));
    let (u_min, u_count) = extent(u_axis, origin, [nx, ny, nz]);
    let (v_min, v_count) = extent(v_axis, origin, [nx, ny, nz]);
    if u_count == 0 || v_count == 0 {
        return Err(PipelineError::EmptyCrossSection);
    }

    let background = volume.scalar_range().0;
    let data = volume.data();
    let pixels: Vec<f32> = (0..u_count * v_count)
        .into_par_iter()
        .map(|i| {
            let u = u_min + (i % u_count) as f64;
            let v = v_min + (i / u_count) as f64;
            let p: [f64; 3] =
                std::array::from_fn(|k| origin[k] + u * u_axis[k] + v * v_axis[k]);
            Interpolator::trilinear_interpolate(&data, p[2], p[1], p[0]).unwrap_or(background)
        })
        .collect();

    Array2::from_shape_vec((v_count, u_count), pixels)
        .map_err(|_| PipelineError::EmptyCrossSection)
}

/// First coordinate and sample count along `axis` covering every voxel corner.
fn extent(axis: [f64; 3], origin: [f64; 3], dims: [usize; 3]) -> (f64, usize) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for corner in 0..8 {
        let projection: f64 = (0..3)
            .map(|k| {
                let c = if corner & (1 << k) == 0 { 0.0 } else { (dims[k] - 1) as f64 };
                (c - origin[k]) * axis[k]
            })
            .sum();
        lo = lo.min(projection);
        hi = hi.max(projection);
    }
    let lo = lo.round();
    let count = (hi.round() - lo) as usize + 1;
    (lo, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::plane_for;
    use ndarray::Array3;
    use pretty_assertions::assert_eq;

    /// Voxel value encodes its own coordinates: `z * 10000 + y * 100 + x`.
    fn coded_volume(nx: usize, ny: usize, nz: usize) -> Arc<Volume> {
        let data = Array3::from_shape_fn((nz, ny, nx), |(z, y, x)| (z * 10000 + y * 100 + x) as f32);
        Arc::new(Volume::new(data, (1.0, 1.0, 1.0)))
    }

    #[test]
    fn empty_volume_is_rejected() {
        let volume = Arc::new(Volume::new(Array3::zeros((0, 2, 2)), (1.0, 1.0, 1.0)));
        let result = SlicePipeline::build(volume, plane_for(Orientation::Axial));
        assert_eq!(result.unwrap_err(), PipelineError::EmptyVolume);
    }

    #[test]
    fn offset_range_follows_depth_axis() {
        let volume = coded_volume(6, 5, 4);
        let range = |o| SlicePipeline::build(volume.clone(), plane_for(o)).unwrap().offset_range();
        assert_eq!(range(Orientation::Axial), (0, 3));
        assert_eq!(range(Orientation::Coronal), (0, 4));
        assert_eq!(range(Orientation::Sagittal), (0, 5));
    }

    #[test]
    fn axial_cross_section_is_a_z_plane() {
        let mut pipeline =
            SlicePipeline::build(coded_volume(6, 5, 4), plane_for(Orientation::Axial)).unwrap();
        assert_eq!(pipeline.cross_section().dim(), (5, 6));
        assert_eq!(pipeline.cross_section()[[0, 0]], 0.0);

        pipeline.set_offset(2).unwrap();
        assert!(pipeline.is_stale());
        pipeline.update().unwrap();
        assert!(!pipeline.is_stale());
        let section = pipeline.cross_section();
        assert_eq!(section[[0, 0]], 20000.0);
        assert_eq!(section[[4, 5]], 20405.0);
    }

    #[test]
    fn coronal_cross_section_is_a_y_plane() {
        let mut pipeline =
            SlicePipeline::build(coded_volume(6, 5, 4), plane_for(Orientation::Coronal)).unwrap();
        pipeline.set_offset(3).unwrap();
        pipeline.update().unwrap();
        let section = pipeline.cross_section();
        // columns run along x, rows from the top z slice down
        assert_eq!(section.dim(), (4, 6));
        assert_eq!(section[[0, 0]], 30300.0);
        assert_eq!(section[[3, 5]], 305.0);
    }

    #[test]
    fn sagittal_cross_section_is_an_x_plane() {
        let mut pipeline =
            SlicePipeline::build(coded_volume(6, 5, 4), plane_for(Orientation::Sagittal)).unwrap();
        pipeline.set_offset(5).unwrap();
        pipeline.update().unwrap();
        let section = pipeline.cross_section();
        assert_eq!(section.dim(), (4, 5));
        assert_eq!(section[[0, 0]], 30005.0);
        assert_eq!(section[[3, 4]], 405.0);
    }

    #[test]
    fn out_of_range_offset_leaves_everything_unchanged() {
        let mut pipeline =
            SlicePipeline::build(coded_volume(6, 5, 4), plane_for(Orientation::Axial)).unwrap();
        pipeline.set_offset(1).unwrap();
        pipeline.update().unwrap();
        let before = pipeline.cross_section().to_owned();
        let axes = pipeline.reslice_axes().clone();

        for value in [-1, 4, 200] {
            assert_eq!(
                pipeline.set_offset(value),
                Err(PipelineError::OffsetOutOfRange { value, min: 0, max: 3 })
            );
        }
        assert!(!pipeline.is_stale());
        assert_eq!(pipeline.reslice_axes(), &axes);
        assert_eq!(pipeline.cross_section(), before.view());
    }

    #[test]
    fn repeated_offset_gives_identical_cross_section() {
        let mut pipeline =
            SlicePipeline::build(coded_volume(6, 5, 4), plane_for(Orientation::Coronal)).unwrap();
        pipeline.set_offset(2).unwrap();
        pipeline.update().unwrap();
        let first = pipeline.cross_section().to_owned();
        pipeline.set_offset(2).unwrap();
        pipeline.update().unwrap();
        assert_eq!(pipeline.cross_section(), first.view());
        assert_eq!(pipeline.offset(), 2);
    }

    #[test]
    fn pixel_spacing_follows_in_plane_axes() {
        let data = Array3::zeros((4, 5, 6));
        let volume = Arc::new(Volume::new(data, (0.5, 0.75, 3.0)));
        let spacing = |o| SlicePipeline::build(volume.clone(), plane_for(o)).unwrap().pixel_spacing();
        assert_eq!(spacing(Orientation::Axial), (0.5, 0.75));
        assert_eq!(spacing(Orientation::Coronal), (0.5, 3.0));
        assert_eq!(spacing(Orientation::Sagittal), (0.75, 3.0));
    }
}
