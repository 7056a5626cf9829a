use ndarray::Array3;
use ndarray::ArrayView3;
use ndarray::Zip;

/// A 3-D grid of intensity values.
///
/// Voxels are stored as `(depth, height, width)`, that is `(z, y, x)`,
/// which is the order slices come out of the loader.
#[derive(Debug, Default)]
pub struct Volume {
    data: Array3<f32>,
    spacing: (f32, f32, f32),
    scalar_range: (f32, f32),
    patient_identifier: Option<String>,
}

impl Volume {
    pub fn new(data: Array3<f32>, spacing: (f32, f32, f32)) -> Self {
        let scalar_range = Self::compute_scalar_range(&data);
        Self {
            data,
            spacing,
            scalar_range,
            patient_identifier: None,
        }
    }

    pub fn with_patient_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.patient_identifier = Some(identifier.into());
        self
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get the dimensions in voxel-axis order `[nx, ny, nz]`.
    pub fn dimensions(&self) -> [usize; 3] {
        let (nz, ny, nx) = self.data.dim();
        [nx, ny, nz]
    }

    /// Minimum and maximum intensity over all voxels.
    pub fn scalar_range(&self) -> (f32, f32) {
        self.scalar_range
    }

    /// Voxel size along `(x, y, z)` in millimetres.
    pub fn spacing(&self) -> (f32, f32, f32) {
        self.spacing
    }

    /// Physical length of one step along `direction`, given in voxel units.
    ///
    /// Spacings that are zero, negative or not finite count as 1.
    pub fn step_length(&self, direction: [f64; 3]) -> f64 {
        let (sx, sy, sz) = self.spacing;
        direction
            .into_iter()
            .zip([sx, sy, sz])
            .map(|(d, s)| {
                let s = f64::from(s);
                let s = if s.is_finite() && s > 0.0 { s } else { 1.0 };
                (d * s).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }

    pub fn patient_identifier(&self) -> Option<&str> {
        self.patient_identifier.as_deref()
    }

    /// Get a view of the underlying data
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Voxel at `[x, y, z]`, `None` outside the grid.
    #[inline]
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.data.get([z, y, x]).copied()
    }

    fn compute_scalar_range(data: &Array3<f32>) -> (f32, f32) {
        if data.is_empty() {
            return (0.0, 0.0);
        }
        Zip::from(data).par_fold(
            || (f32::INFINITY, f32::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
            |(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)),
        )
    }
}
