use std::fmt;

/// Errors raised by the section selector, the grid builder and the bound interpolators.
///
/// Degraded outcomes (tolerance not met, element budget exhausted, missing aerodynamic
/// data) are not errors: they are reported through `SectionReport::messages`.
#[derive(Debug, Clone, PartialEq)]
pub enum BladeGridError {
    /// malformed or insufficient property table or configuration
    InvalidInput(String),
    /// interpolator queried outside the radius range of its samples
    OutOfRange { radius: f64, r_min: f64, r_max: f64 },
    /// no channel with this name in the property table
    UnknownChannel(String),
}

impl fmt::Display for BladeGridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BladeGridError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            BladeGridError::OutOfRange {
                radius,
                r_min,
                r_max,
            } => write!(
                f,
                "Radius {} is outside of the sampled range [{}, {}]",
                radius, r_min, r_max
            ),
            BladeGridError::UnknownChannel(name) => write!(f, "Unknown channel '{}'", name),
        }
    }
}

impl std::error::Error for BladeGridError {}

pub type Result<T> = std::result::Result<T, BladeGridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BladeGridError::InvalidInput("need at least 2 samples".to_string());
        assert_eq!(err.to_string(), "Invalid input: need at least 2 samples");
        let err = BladeGridError::OutOfRange {
            radius: 2.5,
            r_min: 0.0,
            r_max: 2.0,
        };
        assert_eq!(
            err.to_string(),
            "Radius 2.5 is outside of the sampled range [0, 2]"
        );
        let err = BladeGridError::UnknownChannel("EA".to_string());
        assert_eq!(err.to_string(), "Unknown channel 'EA'");
    }
}
