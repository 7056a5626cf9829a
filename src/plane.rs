//! Fixed cutting planes used to reslice a volume into 2-D cross-sections.
//!
//! Each plane is a row-major 4x4 matrix. Columns 0 and 1 are the in-plane
//! axes of the resulting image, column 2 is the plane normal and column 3 the
//! origin, all in voxel coordinates. Moving a plane along its normal only
//! ever rewrites one origin cell, listed per orientation in [`PLANES`].

use crate::enums::Orientation;

/// Row-major 4x4 transform.
pub type Matrix4 = [f64; 16];

#[rustfmt::skip]
const AXIAL: Matrix4 = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

#[rustfmt::skip]
const CORONAL: Matrix4 = [
    1.0, 0.0,  0.0, 0.0,
    0.0, 0.0,  1.0, 0.0,
    0.0, -1.0, 0.0, 0.0,
    0.0, 0.0,  0.0, 1.0,
];

#[rustfmt::skip]
const SAGITTAL: Matrix4 = [
    0.0, 0.0,  -1.0, 0.0,
    1.0, 0.0,  0.0,  0.0,
    0.0, -1.0, 0.0,  0.0,
    0.0, 0.0,  0.0,  1.0,
];

/// An immutable cutting-plane template.
#[derive(Debug, PartialEq)]
pub struct PlaneDefinition {
    pub orientation: Orientation,
    /// Voxel axis scrubbed by the slider: 0 = x, 1 = y, 2 = z.
    pub depth_axis: usize,
    /// `(row, column)` of the transform cell holding the depth offset.
    pub offset_cell: (usize, usize),
    pub transform: Matrix4,
}

/// The registry, indexed by [`Orientation::index`].
pub static PLANES: [PlaneDefinition; 3] = [
    PlaneDefinition {
        orientation: Orientation::Axial,
        depth_axis: 2,
        offset_cell: (2, 3),
        transform: AXIAL,
    },
    PlaneDefinition {
        orientation: Orientation::Coronal,
        depth_axis: 1,
        offset_cell: (1, 3),
        transform: CORONAL,
    },
    PlaneDefinition {
        orientation: Orientation::Sagittal,
        depth_axis: 0,
        offset_cell: (0, 3),
        transform: SAGITTAL,
    },
];

pub fn plane_for(orientation: Orientation) -> &'static PlaneDefinition {
    &PLANES[orientation.index()]
}

impl PlaneDefinition {
    /// Flat index of [`Self::offset_cell`] in the row-major matrix.
    pub fn offset_index(&self) -> usize {
        let (row, col) = self.offset_cell;
        row * 4 + col
    }
}

/// Mutable copy of a plane's transform.
///
/// Only the depth-offset cell of the template can be changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResliceAxes {
    matrix: Matrix4,
    offset_index: usize,
}

impl ResliceAxes {
    pub fn new(plane: &PlaneDefinition) -> Self {
        Self {
            matrix: plane.transform,
            offset_index: plane.offset_index(),
        }
    }

    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    #[inline]
    pub fn element(&self, row: usize, col: usize) -> f64 {
        self.matrix[row * 4 + col]
    }

    pub fn offset(&self) -> f64 {
        self.matrix[self.offset_index]
    }

    pub fn set_offset(&mut self, value: f64) {
        self.matrix[self.offset_index] = value;
    }

    /// Column `col` of the rotation part.
    pub fn axis(&self, col: usize) -> [f64; 3] {
        [
            self.element(0, col),
            self.element(1, col),
            self.element(2, col),
        ]
    }

    pub fn origin(&self) -> [f64; 3] {
        self.axis(3)
    }
}
