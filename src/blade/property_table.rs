//! # Property tables
//!
//! Spanwise sampled blade properties: one strictly increasing radius vector and any number of
//! named channels sampled at those radii. Values are stored as a `DMatrix` with one row per
//! channel and one column per station, the same layout the solvers use for `y_DMatrix`
//! (variables × mesh points).
//!
//! Tables are produced by an upstream loader (file parsing and unit conversion happen there);
//! here they are validated once and then only read.
use crate::blade::errors::{BladeGridError, Result};
use nalgebra::{DMatrix, DVector};
use std::ops::Range;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Standard structural channels of a blade table, named after the beam local y/z axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
pub enum StructuralChannel {
    /// axial stiffness
    #[strum(serialize = "EA")]
    Ea,
    /// bending stiffness about y
    #[strum(serialize = "EJY")]
    Ejy,
    /// bending stiffness about z
    #[strum(serialize = "EJZ")]
    Ejz,
    /// torsional stiffness
    #[strum(serialize = "GJ")]
    Gj,
    /// neutral axis offsets
    #[strum(serialize = "YNA")]
    Yna,
    #[strum(serialize = "ZNA")]
    Zna,
    /// shear (elastic) centre offsets
    #[strum(serialize = "YCT")]
    Yct,
    #[strum(serialize = "ZCT")]
    Zct,
    /// centre of gravity offsets
    #[strum(serialize = "YCG")]
    Ycg,
    #[strum(serialize = "ZCG")]
    Zcg,
    /// principal axes rotation, degrees
    #[strum(serialize = "ROTAN_deg")]
    RotanDeg,
    /// inertia axes rotation, degrees
    #[strum(serialize = "ROTAPI_deg")]
    RotapiDeg,
    /// mass per unit length
    #[strum(serialize = "dM")]
    Dm,
    /// rotary inertias per unit length
    #[strum(serialize = "dJX")]
    Djx,
    #[strum(serialize = "dJY")]
    Djy,
    #[strum(serialize = "dJZ")]
    Djz,
}

impl StructuralChannel {
    /// channels used to find where the structural blade actually starts
    pub fn stiffness() -> [StructuralChannel; 4] {
        [
            StructuralChannel::Ea,
            StructuralChannel::Ejy,
            StructuralChannel::Ejz,
            StructuralChannel::Gj,
        ]
    }
}

/// Standard aerodynamic channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
pub enum AeroChannel {
    #[strum(serialize = "Chord")]
    Chord,
    #[strum(serialize = "Twist")]
    Twist,
    #[strum(serialize = "Sweep")]
    Sweep,
    #[strum(serialize = "Anhedral")]
    Anhedral,
    /// numeric reference to the airfoil coefficient table
    #[strum(serialize = "Airfoil")]
    Airfoil,
}

/// One station of a table: a radius and the channel values in table channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub radius: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTable {
    radius: DVector<f64>,
    /// channels × stations
    values: DMatrix<f64>,
    channels: Vec<String>,
}

impl PropertyTable {
    /// Builds a table from a radius vector and `(name, values)` channel columns.
    ///
    /// Fails with `InvalidInput` if the table is empty, radii are negative, non-finite or not
    /// strictly increasing, a channel length differs from the radius length, or two channels
    /// share a name.
    pub fn new<S: AsRef<str>>(radius: Vec<f64>, channels: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let n = radius.len();
        if n == 0 {
            return Err(BladeGridError::InvalidInput(
                "property table has no samples".to_string(),
            ));
        }
        check_radius(&radius)?;
        let mut names: Vec<String> = Vec::with_capacity(channels.len());
        let mut values = DMatrix::zeros(channels.len(), n);
        for (j, (name, column)) in channels.iter().enumerate() {
            let name = name.as_ref().to_string();
            if names.contains(&name) {
                return Err(BladeGridError::InvalidInput(format!(
                    "channel '{}' appears twice",
                    name
                )));
            }
            if column.len() != n {
                return Err(BladeGridError::InvalidInput(format!(
                    "channel '{}' has {} values but the table has {} radii",
                    name,
                    column.len(),
                    n
                )));
            }
            if let Some(i) = column.iter().position(|v| !v.is_finite()) {
                return Err(BladeGridError::InvalidInput(format!(
                    "channel '{}' has a non-finite value at r = {}",
                    name, radius[i]
                )));
            }
            for (i, v) in column.iter().enumerate() {
                values[(j, i)] = *v;
            }
            names.push(name);
        }
        Ok(PropertyTable {
            radius: DVector::from_vec(radius),
            values,
            channels: names,
        })
    }

    /// Builds a table from per-station samples; every sample must carry one value per channel.
    pub fn from_samples<S: AsRef<str>>(channel_names: &[S], samples: &[Sample]) -> Result<Self> {
        let mut columns: Vec<(&str, Vec<f64>)> = channel_names
            .iter()
            .map(|name| (name.as_ref(), Vec::with_capacity(samples.len())))
            .collect();
        for sample in samples {
            if sample.values.len() != channel_names.len() {
                return Err(BladeGridError::InvalidInput(format!(
                    "sample at r = {} has {} values, expected {}",
                    sample.radius,
                    sample.values.len(),
                    channel_names.len()
                )));
            }
            for (column, v) in columns.iter_mut().zip(sample.values.iter()) {
                column.1.push(*v);
            }
        }
        let radius = samples.iter().map(|s| s.radius).collect();
        PropertyTable::new(radius, columns)
    }

    pub fn len(&self) -> usize {
        self.radius.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radius.is_empty()
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn radius(&self) -> &DVector<f64> {
        &self.radius
    }

    /// raw values, channels × stations
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn r_min(&self) -> f64 {
        self.radius[0]
    }

    pub fn r_max(&self) -> f64 {
        self.radius[self.radius.len() - 1]
    }

    pub fn has_channel(&self, name: impl AsRef<str>) -> bool {
        self.channels.iter().any(|c| c == name.as_ref())
    }

    pub fn channel_index(&self, name: impl AsRef<str>) -> Result<usize> {
        let name = name.as_ref();
        self.channels
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| BladeGridError::UnknownChannel(name.to_string()))
    }

    /// raw samples of one channel, in station order
    pub fn channel(&self, name: impl AsRef<str>) -> Result<Vec<f64>> {
        let j = self.channel_index(name)?;
        Ok(self.values.row(j).iter().copied().collect())
    }

    pub fn samples(&self) -> Vec<Sample> {
        (0..self.len())
            .map(|i| Sample {
                radius: self.radius[i],
                values: self.values.column(i).iter().copied().collect(),
            })
            .collect()
    }

    /// Lower bracketing station and blend weight for `r`, clamped to the table range.
    /// A radius equal to a station returns that station with weight 0.
    pub(crate) fn locate(&self, r: f64) -> (usize, f64) {
        let n = self.len();
        if n == 1 || r <= self.radius[0] {
            return (0, 0.0);
        }
        if r >= self.radius[n - 1] {
            return (n - 2, 1.0);
        }
        // first station strictly above r; always in 1..n here
        let upper = self.radius.as_slice().partition_point(|&x| x <= r);
        let lower = upper - 1;
        let t = (r - self.radius[lower]) / (self.radius[upper] - self.radius[lower]);
        (lower, t)
    }

    /// Piecewise linear value of channel `j` at `r`, clamped to the end values outside the table.
    pub(crate) fn lerp(&self, j: usize, r: f64) -> f64 {
        let (lower, t) = self.locate(r);
        if t == 0.0 {
            return self.values[(j, lower)];
        }
        if t == 1.0 {
            return self.values[(j, lower + 1)];
        }
        let y0 = self.values[(j, lower)];
        let y1 = self.values[(j, lower + 1)];
        y0 + t * (y1 - y0)
    }

    /// Stations lying strictly inside `(a, b)`, keeping `eps` clear of both ends.
    pub(crate) fn interior(&self, a: f64, b: f64, eps: f64) -> Range<usize> {
        let r = self.radius.as_slice();
        let start = r.partition_point(|&x| x <= a + eps);
        let end = r.partition_point(|&x| x < b - eps);
        start..end.max(start)
    }
}

fn check_radius(radius: &[f64]) -> Result<()> {
    if let Some(r) = radius.iter().find(|r| !r.is_finite() || **r < 0.0) {
        return Err(BladeGridError::InvalidInput(format!(
            "radius {} must be finite and non-negative",
            r
        )));
    }
    for w in radius.windows(2) {
        if w[1] <= w[0] {
            return Err(BladeGridError::InvalidInput(format!(
                "radii must be strictly increasing, got {} after {}",
                w[1], w[0]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn table() -> PropertyTable {
        PropertyTable::new(
            vec![0.0, 1.0, 3.0],
            vec![("EA", vec![1.0, 2.0, 6.0]), ("dM", vec![5.0, 5.0, 5.0])],
        )
        .unwrap()
    }

    #[test]
    fn test_table_accessors() {
        let t = table();
        assert_eq!(t.len(), 3);
        assert_eq!(t.n_channels(), 2);
        assert_eq!(t.r_min(), 0.0);
        assert_eq!(t.r_max(), 3.0);
        assert_eq!(t.channel_index(StructuralChannel::Dm).unwrap(), 1);
        assert_eq!(t.channel("EA").unwrap(), vec![1.0, 2.0, 6.0]);
        assert!(t.has_channel(StructuralChannel::Ea));
        assert!(!t.has_channel(StructuralChannel::Gj));
        assert_eq!(
            t.channel_index("GJ"),
            Err(BladeGridError::UnknownChannel("GJ".to_string()))
        );
    }

    #[test]
    fn test_from_samples_matches_columns() {
        let samples = vec![
            Sample {
                radius: 0.0,
                values: vec![1.0, 5.0],
            },
            Sample {
                radius: 1.0,
                values: vec![2.0, 5.0],
            },
            Sample {
                radius: 3.0,
                values: vec![6.0, 5.0],
            },
        ];
        let t = PropertyTable::from_samples(&["EA", "dM"], &samples).unwrap();
        assert_eq!(t, table());
        assert_eq!(t.samples(), samples);
    }

    #[test]
    fn test_invalid_tables() {
        let empty: Vec<(&str, Vec<f64>)> = vec![];
        assert!(matches!(
            PropertyTable::new(vec![], empty),
            Err(BladeGridError::InvalidInput(_))
        ));
        assert!(matches!(
            PropertyTable::new(vec![0.0, 1.0, 1.0], vec![("EA", vec![1.0, 2.0, 3.0])]),
            Err(BladeGridError::InvalidInput(_))
        ));
        assert!(matches!(
            PropertyTable::new(vec![0.0, 2.0, 1.0], vec![("EA", vec![1.0, 2.0, 3.0])]),
            Err(BladeGridError::InvalidInput(_))
        ));
        assert!(matches!(
            PropertyTable::new(vec![0.0, 1.0], vec![("EA", vec![1.0])]),
            Err(BladeGridError::InvalidInput(_))
        ));
        assert!(matches!(
            PropertyTable::new(vec![-1.0, 1.0], vec![("EA", vec![1.0, 2.0])]),
            Err(BladeGridError::InvalidInput(_))
        ));
        assert!(matches!(
            PropertyTable::new(
                vec![0.0, 1.0],
                vec![("EA", vec![1.0, 2.0]), ("EA", vec![1.0, 2.0])]
            ),
            Err(BladeGridError::InvalidInput(_))
        ));
        assert!(matches!(
            PropertyTable::new(vec![0.0, 1.0], vec![("EA", vec![1.0, f64::NAN])]),
            Err(BladeGridError::InvalidInput(_))
        ));
        let bad_sample = vec![Sample {
            radius: 0.0,
            values: vec![1.0],
        }];
        assert!(matches!(
            PropertyTable::from_samples(&["EA", "dM"], &bad_sample),
            Err(BladeGridError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_lerp_and_locate() {
        let t = table();
        assert_eq!(t.locate(1.0), (1, 0.0));
        assert_eq!(t.locate(3.0), (1, 1.0));
        assert_eq!(t.locate(-1.0), (0, 0.0));
        assert_relative_eq!(t.lerp(0, 0.5), 1.5, epsilon = 1e-12);
        assert_relative_eq!(t.lerp(0, 2.0), 4.0, epsilon = 1e-12);
        assert_eq!(t.lerp(0, 3.0), 6.0);
        assert_eq!(t.lerp(0, 10.0), 6.0);
        assert_eq!(t.lerp(1, 2.2), 5.0);
    }

    #[test]
    fn test_interior_stations() {
        let t = PropertyTable::new(
            vec![0.0, 0.25, 0.5, 0.75, 1.0],
            vec![("EA", vec![0.0; 5])],
        )
        .unwrap();
        assert_eq!(t.interior(0.0, 1.0, 1e-9), 1..4);
        assert_eq!(t.interior(0.25, 0.75, 1e-9), 2..3);
        assert_eq!(t.interior(0.3, 0.4, 1e-9), 2..2);
        assert!(t.interior(0.5, 0.75, 1e-9).is_empty());
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(StructuralChannel::Ea.to_string(), "EA");
        assert_eq!(StructuralChannel::RotanDeg.as_ref(), "ROTAN_deg");
        assert_eq!(
            StructuralChannel::from_str("dJZ").unwrap(),
            StructuralChannel::Djz
        );
        assert_eq!(StructuralChannel::iter().count(), 16);
        assert_eq!(AeroChannel::from_str("Chord").unwrap(), AeroChannel::Chord);
        assert_eq!(AeroChannel::iter().count(), 5);
    }
}
