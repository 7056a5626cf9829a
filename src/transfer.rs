//! Piecewise-linear transfer curves mapping intensity to colour or opacity.

/// One control point of a [`Curve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint<const N: usize> {
    pub intensity: f32,
    pub value: [f32; N],
}

/// Ordered control points, linearly interpolated and clamped at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve<const N: usize> {
    points: Vec<ControlPoint<N>>,
}

/// Intensity to RGB, components in `[0, 1]`.
pub type ColorTransferCurve = Curve<3>;

/// Intensity to opacity in `[0, 1]`.
pub type OpacityTransferCurve = Curve<1>;

impl<const N: usize> Curve<N> {
    /// Builds a curve from `(intensity, value)` pairs in any order.
    pub fn new(points: impl IntoIterator<Item = (f32, [f32; N])>) -> Self {
        let mut points: Vec<_> = points
            .into_iter()
            .map(|(intensity, value)| ControlPoint { intensity, value })
            .collect();
        points.sort_by(|a, b| a.intensity.total_cmp(&b.intensity));
        Self { points }
    }

    pub fn points(&self) -> &[ControlPoint<N>] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn evaluate(&self, intensity: f32) -> [f32; N] {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0.0; N],
        };
        // NaN fails every comparison below
        if intensity.is_nan() || intensity <= first.intensity {
            return first.value;
        }
        if intensity >= last.intensity {
            return last.value;
        }

        // first point with intensity above the sample; never 0 after the clamps
        let upper = self.points.partition_point(|p| p.intensity <= intensity);
        let (a, b) = (&self.points[upper - 1], &self.points[upper]);
        let t = (intensity - a.intensity) / (b.intensity - a.intensity);
        std::array::from_fn(|i| a.value[i] + (b.value[i] - a.value[i]) * t)
    }

    /// Maps control points given on `[0, 1]` onto `[min, max]`.
    pub fn rescaled(&self, (min, max): (f32, f32)) -> Self {
        let span = max - min;
        Self {
            points: self
                .points
                .iter()
                .map(|p| ControlPoint {
                    intensity: min + p.intensity * span,
                    value: p.value,
                })
                .collect(),
        }
    }
}

impl OpacityTransferCurve {
    pub fn opacity(&self, intensity: f32) -> f32 {
        self.evaluate(intensity)[0]
    }

    /// Air transparent, a faint knee for soft tissue and a denser plateau for bone.
    pub fn default_opacity() -> Self {
        Curve::new([(0.0, [0.0]), (500.0, [0.15]), (1150.0, [0.85])])
    }
}
