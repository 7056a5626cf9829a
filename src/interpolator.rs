use ndarray::{ArrayView2, ArrayView3};

pub(crate) struct Interpolator;

impl Interpolator {
    #[inline]
    pub(crate) fn bilinear_interpolate(slice: &ArrayView2<f32>, y: f32, x: f32) -> f32 {
        let (height, width) = slice.dim();

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dy = y - y0 as f32;
        let dx = x - x0 as f32;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;

        let v00 = slice[[y0, x0]];
        let v01 = slice[[y0, x1]];
        let v10 = slice[[y1, x0]];
        let v11 = slice[[y1, x1]];

        let v0 = v00.mul_add(one_minus_dx, v01 * dx);
        let v1 = v10.mul_add(one_minus_dx, v11 * dx);

        v0.mul_add(one_minus_dy, v1 * dy)
    }

    /// Samples `data` (indexed `[z, y, x]`) at a continuous voxel position.
    ///
    /// Returns `None` when the point lies outside the grid.
    #[inline]
    pub(crate) fn trilinear_interpolate(
        data: &ArrayView3<f32>,
        z: f64,
        y: f64,
        x: f64,
    ) -> Option<f32> {
        let (depth, height, width) = data.dim();
        let inside = |v: f64, n: usize| v >= 0.0 && v <= (n as f64 - 1.0);
        if !(inside(z, depth) && inside(y, height) && inside(x, width)) {
            return None;
        }

        let z0 = z.floor() as usize;
        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let z1 = (z0 + 1).min(depth - 1);
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dz = (z - z0 as f64) as f32;
        let dy = (y - y0 as f64) as f32;
        let dx = (x - x0 as f64) as f32;

        let lerp = |a: f32, b: f32, t: f32| a.mul_add(1.0 - t, b * t);

        let c00 = lerp(data[[z0, y0, x0]], data[[z0, y0, x1]], dx);
        let c01 = lerp(data[[z0, y1, x0]], data[[z0, y1, x1]], dx);
        let c10 = lerp(data[[z1, y0, x0]], data[[z1, y0, x1]], dx);
        let c11 = lerp(data[[z1, y1, x0]], data[[z1, y1, x1]], dx);

        let c0 = lerp(c00, c01, dy);
        let c1 = lerp(c10, c11, dy);

        Some(lerp(c0, c1, dz))
    }
}
