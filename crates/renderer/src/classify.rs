//! Discrete color classification shared across all panels of a figure.
//!
//! One `ColorClassification` is constructed per figure and read by every
//! panel, so that identical values map to identical colors regardless of
//! which panel they appear in. The table is immutable once built.

use atlas_common::{AtlasError, AtlasResult};

use crate::color::{self, Color};

/// A value-to-color table over strictly increasing boundaries.
///
/// `boundaries` has N+1 entries delimiting N intervals; interval `i` covers
/// `[boundaries[i], boundaries[i+1])` and maps to `colors[i]`. Values below
/// the first boundary map to `under`, values at or above the last boundary
/// map to `over`. NaN maps to fully transparent.
#[derive(Debug, Clone)]
pub struct ColorClassification {
    boundaries: Vec<f64>,
    colors: Vec<Color>,
    under: Color,
    over: Color,
}

impl ColorClassification {
    /// Build a classification, validating the boundary/color contract.
    pub fn new(
        boundaries: Vec<f64>,
        colors: Vec<Color>,
        under: Color,
        over: Color,
    ) -> AtlasResult<Self> {
        if boundaries.len() < 2 {
            return Err(AtlasError::Classification(format!(
                "need at least 2 boundaries, got {}",
                boundaries.len()
            )));
        }
        for pair in boundaries.windows(2) {
            if !(pair[0] < pair[1]) {
                return Err(AtlasError::Classification(format!(
                    "boundaries not strictly increasing: {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        if colors.len() != boundaries.len() - 1 {
            return Err(AtlasError::Classification(format!(
                "{} colors for {} intervals",
                colors.len(),
                boundaries.len() - 1
            )));
        }
        Ok(Self {
            boundaries,
            colors,
            under,
            over,
        })
    }

    /// Map a value to its display color. Pure: no panel-local state.
    pub fn classify(&self, value: f64) -> Color {
        if value.is_nan() {
            return Color::transparent();
        }
        if value < self.boundaries[0] {
            return self.under;
        }
        if value >= *self.boundaries.last().unwrap_or(&f64::INFINITY) {
            return self.over;
        }
        // Boundaries are sorted; partition_point finds the first boundary
        // greater than the value, i.e. the interval's upper edge.
        let idx = self.boundaries.partition_point(|&b| b <= value);
        self.colors[idx - 1]
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn under(&self) -> Color {
        self.under
    }

    pub fn over(&self) -> Color {
        self.over
    }

    /// Fixed domain breakpoints for flood depth in meters.
    ///
    /// Dry cells and depths below 0.25 m are transparent so the basemap
    /// shows through; the over-color also covers the >=999 "unbounded"
    /// sentinel when rendered spatially.
    pub fn flood_depth() -> AtlasResult<Self> {
        let boundaries = vec![0.25, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0];
        let n = boundaries.len() - 1;
        let colors: Vec<Color> = (0..n)
            .map(|i| color::sample_ramp(&color::FLOOD_DEPTH_RAMP, i as f64 / (n - 1) as f64))
            .collect();
        let over = Color::rgb(4, 30, 66);
        Self::new(boundaries, colors, Color::transparent(), over)
    }

    /// Population density classification quantized over `[0, max_density]`.
    ///
    /// Reversed-viridis ramp with the zero bucket forced fully transparent
    /// (an explicit table entry, not a mutated library colormap).
    pub fn population(max_density: f64, intervals: usize) -> AtlasResult<Self> {
        if !(max_density > 0.0) || intervals < 2 {
            return Err(AtlasError::Classification(format!(
                "population range [0, {}] with {} intervals is degenerate",
                max_density, intervals
            )));
        }
        let step = max_density / intervals as f64;
        let boundaries: Vec<f64> = (0..=intervals).map(|i| i as f64 * step).collect();
        let colors: Vec<Color> = (0..intervals)
            .map(|i| {
                if i == 0 {
                    Color::transparent()
                } else {
                    color::sample_viridis_reversed(i as f64 / (intervals - 1) as f64)
                }
            })
            .collect();
        let over = color::sample_viridis_reversed(1.0);
        Self::new(boundaries, colors, Color::transparent(), over)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_pure_and_deterministic() {
        let c = ColorClassification::flood_depth().unwrap();
        for v in [-1.0, 0.0, 0.3, 1.2, 4.9, 5.0, 999.0, 1e6] {
            assert_eq!(c.classify(v), c.classify(v));
        }
    }

    #[test]
    fn test_under_over_and_intervals() {
        let c = ColorClassification::new(
            vec![0.0, 1.0, 2.0],
            vec![Color::rgb(10, 10, 10), Color::rgb(20, 20, 20)],
            Color::transparent(),
            Color::rgb(30, 30, 30),
        )
        .unwrap();

        assert_eq!(c.classify(-0.5), Color::transparent());
        assert_eq!(c.classify(0.0), Color::rgb(10, 10, 10));
        assert_eq!(c.classify(0.99), Color::rgb(10, 10, 10));
        assert_eq!(c.classify(1.0), Color::rgb(20, 20, 20));
        assert_eq!(c.classify(2.0), Color::rgb(30, 30, 30));
        assert_eq!(c.classify(999.0), Color::rgb(30, 30, 30));
    }

    #[test]
    fn test_nan_is_transparent() {
        let c = ColorClassification::flood_depth().unwrap();
        assert_eq!(c.classify(f64::NAN), Color::transparent());
    }

    #[test]
    fn test_non_increasing_boundaries_rejected() {
        let err = ColorClassification::new(
            vec![0.0, 1.0, 1.0],
            vec![Color::rgb(1, 1, 1), Color::rgb(2, 2, 2)],
            Color::transparent(),
            Color::transparent(),
        )
        .unwrap_err();
        assert!(matches!(err, AtlasError::Classification(_)));
    }

    #[test]
    fn test_color_count_mismatch_rejected() {
        let err = ColorClassification::new(
            vec![0.0, 1.0, 2.0],
            vec![Color::rgb(1, 1, 1)],
            Color::transparent(),
            Color::transparent(),
        )
        .unwrap_err();
        assert!(matches!(err, AtlasError::Classification(_)));
    }

    #[test]
    fn test_flood_depth_intensity_is_monotonic() {
        // Deeper water must never render lighter.
        let c = ColorClassification::flood_depth().unwrap();
        let luminance = |col: Color| {
            0.299 * col.r as f64 + 0.587 * col.g as f64 + 0.114 * col.b as f64
        };
        let mut previous = f64::INFINITY;
        for color in c.colors() {
            let lum = luminance(*color);
            assert!(lum <= previous, "ramp brightened between buckets");
            previous = lum;
        }
        assert!(luminance(c.over()) <= previous);
    }

    #[test]
    fn test_population_zero_bucket_is_transparent() {
        let c = ColorClassification::population(1000.0, 10).unwrap();
        assert_eq!(c.classify(0.0).a, 0);
        assert!(c.classify(150.0).a == 255);
    }
}
