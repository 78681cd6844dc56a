//! Piecewise linear interpolation over the raw stations of a property table.
//!
//! The interpolator keeps a shared handle on the table instead of copying values onto the grid:
//! evaluation is a binary search for the bracketing stations followed by a linear blend, so
//! the fidelity of the raw table survives even when the grid is coarse.
use crate::blade::errors::{BladeGridError, Result};
use crate::blade::property_table::PropertyTable;
use nalgebra::DVector;
use std::sync::Arc;

/// Anything that can evaluate a named property channel at a radius.
pub trait RadialInterpolation {
    /// Value of `channel` at radius `r`.
    fn evaluate(&self, channel: &str, r: f64) -> Result<f64>;

    /// closed radius interval the interpolation is defined on
    fn domain(&self) -> (f64, f64);

    fn contains(&self, r: f64) -> bool {
        let (r_min, r_max) = self.domain();
        r >= r_min && r <= r_max
    }
}

#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    table: Arc<PropertyTable>,
}

impl LinearInterpolator {
    pub fn new(table: Arc<PropertyTable>) -> Self {
        LinearInterpolator { table }
    }

    pub fn table(&self) -> &Arc<PropertyTable> {
        &self.table
    }

    pub fn channels(&self) -> &[String] {
        self.table.channels()
    }

    fn check_range(&self, r: f64) -> Result<()> {
        let (r_min, r_max) = self.domain();
        // NaN fails both comparisons and lands here too
        if !(r >= r_min && r <= r_max) {
            return Err(BladeGridError::OutOfRange {
                radius: r,
                r_min,
                r_max,
            });
        }
        Ok(())
    }

    /// Value of the channel with table index `j` at `r`.
    pub fn evaluate_index(&self, j: usize, r: f64) -> Result<f64> {
        if j >= self.table.n_channels() {
            return Err(BladeGridError::UnknownChannel(format!("#{}", j)));
        }
        self.check_range(r)?;
        Ok(self.table.lerp(j, r))
    }

    /// All channels at `r`, in table channel order.
    pub fn evaluate_all(&self, r: f64) -> Result<DVector<f64>> {
        self.check_range(r)?;
        Ok(DVector::from_iterator(
            self.table.n_channels(),
            (0..self.table.n_channels()).map(|j| self.table.lerp(j, r)),
        ))
    }

    /// A single channel as its own interpolant.
    pub fn channel(&self, name: impl AsRef<str>) -> Result<ChannelInterpolator<'_>> {
        let index = self.table.channel_index(name)?;
        Ok(ChannelInterpolator {
            interpolator: self,
            index,
        })
    }
}

impl RadialInterpolation for LinearInterpolator {
    fn evaluate(&self, channel: &str, r: f64) -> Result<f64> {
        let j = self.table.channel_index(channel)?;
        self.evaluate_index(j, r)
    }

    fn domain(&self) -> (f64, f64) {
        (self.table.r_min(), self.table.r_max())
    }
}

/// One channel of a `LinearInterpolator`, resolved by name once.
#[derive(Debug, Clone, Copy)]
pub struct ChannelInterpolator<'a> {
    interpolator: &'a LinearInterpolator,
    index: usize,
}

impl ChannelInterpolator<'_> {
    pub fn name(&self) -> &str {
        &self.interpolator.channels()[self.index]
    }

    pub fn at(&self, r: f64) -> Result<f64> {
        self.interpolator.evaluate_index(self.index, r)
    }

    /// values at several radii; fails on the first radius out of range
    pub fn at_many(&self, radii: &[f64]) -> Result<Vec<f64>> {
        radii.iter().map(|&r| self.at(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn interpolator() -> LinearInterpolator {
        let table = PropertyTable::new(
            vec![0.5, 1.0, 2.0, 4.0],
            vec![
                ("EA", vec![10.0, 20.0, 40.0, 0.0]),
                ("Chord", vec![0.3, 0.3, 0.2, 0.1]),
            ],
        )
        .unwrap();
        LinearInterpolator::new(Arc::new(table))
    }

    #[test]
    fn test_exact_at_raw_samples() {
        let interp = interpolator();
        let table = interp.table().clone();
        for (i, r) in table.radius().iter().enumerate() {
            for (j, name) in table.channels().iter().enumerate() {
                let value = interp.evaluate(name, *r).unwrap();
                assert_eq!(value, table.values()[(j, i)]);
            }
        }
    }

    #[test]
    fn test_linear_blend_between_samples() {
        let interp = interpolator();
        assert_relative_eq!(interp.evaluate("EA", 0.75).unwrap(), 15.0, epsilon = 1e-12);
        assert_relative_eq!(interp.evaluate("EA", 3.0).unwrap(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(interp.evaluate("Chord", 1.5).unwrap(), 0.25, epsilon = 1e-12);
        let all = interp.evaluate_all(3.0).unwrap();
        assert_eq!(all.len(), 2);
        assert_relative_eq!(all[1], 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_queries() {
        let interp = interpolator();
        assert_eq!(
            interp.evaluate("EA", 0.49),
            Err(BladeGridError::OutOfRange {
                radius: 0.49,
                r_min: 0.5,
                r_max: 4.0
            })
        );
        assert!(matches!(
            interp.evaluate("EA", 4.0001),
            Err(BladeGridError::OutOfRange { .. })
        ));
        assert!(matches!(
            interp.evaluate_all(f64::NAN),
            Err(BladeGridError::OutOfRange { .. })
        ));
        assert!(!interp.contains(5.0));
        assert!(interp.contains(4.0));
        assert_eq!(interp.domain(), (0.5, 4.0));
    }

    #[test]
    fn test_unknown_channel() {
        let interp = interpolator();
        assert_eq!(
            interp.evaluate("GJ", 1.0),
            Err(BladeGridError::UnknownChannel("GJ".to_string()))
        );
        assert!(interp.evaluate_index(2, 1.0).is_err());
        assert!(interp.channel("GJ").is_err());
    }

    #[test]
    fn test_channel_view() {
        let interp = interpolator();
        let chord = interp.channel("Chord").unwrap();
        assert_eq!(chord.name(), "Chord");
        assert_eq!(chord.at(4.0).unwrap(), 0.1);
        let values = chord.at_many(&[0.5, 2.0, 3.0]).unwrap();
        assert_relative_eq!(values[2], 0.15, epsilon = 1e-12);
        assert!(chord.at_many(&[1.0, 10.0]).is_err());
    }
}
