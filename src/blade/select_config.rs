use crate::blade::errors::{BladeGridError, Result};
use std::collections::HashMap;

/// Thresholds controlling automatic section selection.
///
/// # Fields
/// - `r_start`: radius where selection begins; `None` detects the blade root from the chord
///   (aero table) or the stiffness channels (structural table)
/// - `err_tol`: max absolute linear-interpolation error accepted over a segment
/// - `jump_tol`: max absolute first difference between adjacent raw samples before a forced break
/// - `max_elems`: hard cap on the number of elements (sections - 1)
/// - `max_dr`, `min_dr`: element length bounds
/// - `c_eps`: radii closer than this are the same section
/// - `root_chord_eps`: chord above which the aerodynamic blade is considered started
/// - `chord_vertices`: add local chord extrema of the aero table as forced breaks
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSelectionConfig {
    pub r_start: Option<f64>,
    pub err_tol: f64,
    pub jump_tol: f64,
    pub max_elems: usize,
    pub max_dr: f64,
    pub min_dr: f64,
    pub c_eps: f64,
    pub root_chord_eps: f64,
    pub chord_vertices: bool,
}

impl Default for SectionSelectionConfig {
    fn default() -> Self {
        SectionSelectionConfig {
            r_start: None,
            err_tol: 0.05,
            jump_tol: 0.10,
            max_elems: 40,
            max_dr: 1.0,
            min_dr: 0.01,
            c_eps: 1e-6,
            root_chord_eps: 1e-3,
            chord_vertices: true,
        }
    }
}

impl SectionSelectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_r_start(mut self, r_start: f64) -> Self {
        self.r_start = Some(r_start);
        self
    }

    pub fn with_err_tol(mut self, err_tol: f64) -> Self {
        self.err_tol = err_tol;
        self
    }

    pub fn with_jump_tol(mut self, jump_tol: f64) -> Self {
        self.jump_tol = jump_tol;
        self
    }

    pub fn with_max_elems(mut self, max_elems: usize) -> Self {
        self.max_elems = max_elems;
        self
    }

    pub fn with_dr_bounds(mut self, min_dr: f64, max_dr: f64) -> Self {
        self.min_dr = min_dr;
        self.max_dr = max_dr;
        self
    }

    pub fn with_c_eps(mut self, c_eps: f64) -> Self {
        self.c_eps = c_eps;
        self
    }

    pub fn with_chord_vertices(mut self, chord_vertices: bool) -> Self {
        self.chord_vertices = chord_vertices;
        self
    }

    /// Checks `0 < min_dr <= max_dr`, positive tolerances and at least one element.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("err_tol", self.err_tol),
            ("jump_tol", self.jump_tol),
            ("max_dr", self.max_dr),
            ("min_dr", self.min_dr),
            ("c_eps", self.c_eps),
            ("root_chord_eps", self.root_chord_eps),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(BladeGridError::InvalidInput(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.min_dr > self.max_dr {
            return Err(BladeGridError::InvalidInput(format!(
                "min_dr {} exceeds max_dr {}",
                self.min_dr, self.max_dr
            )));
        }
        if self.max_elems == 0 {
            return Err(BladeGridError::InvalidInput(
                "max_elems must be at least 1".to_string(),
            ));
        }
        if let Some(r) = self.r_start {
            if !r.is_finite() {
                return Err(BladeGridError::InvalidInput(format!(
                    "r_start must be finite, got {}",
                    r
                )));
            }
        }
        Ok(())
    }

    /// Reads thresholds from a `key -> optional values` map, the shape solver strategy
    /// parameters come in. Keys left out or mapped to `None` keep their defaults; flags are
    /// read as `value != 0`.
    pub fn from_params(params: &HashMap<String, Option<Vec<f64>>>) -> Result<Self> {
        let mut config = SectionSelectionConfig::default();
        // sorted so that the first offending key is reported deterministically
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();
        for key in keys {
            let Some(values) = &params[key] else {
                continue;
            };
            let value = *values.first().ok_or_else(|| {
                BladeGridError::InvalidInput(format!("parameter '{}' has no value", key))
            })?;
            match key.as_str() {
                "r_start" => config.r_start = Some(value),
                "err_tol" => config.err_tol = value,
                "jump_tol" => config.jump_tol = value,
                "max_elems" => {
                    if value.fract() != 0.0 || value < 0.0 {
                        return Err(BladeGridError::InvalidInput(format!(
                            "max_elems must be a whole number, got {}",
                            value
                        )));
                    }
                    config.max_elems = value as usize;
                }
                "max_dr" => config.max_dr = value,
                "min_dr" => config.min_dr = value,
                "c_eps" => config.c_eps = value,
                "root_chord_eps" => config.root_chord_eps = value,
                "chord_vertices" => config.chord_vertices = value != 0.0,
                _ => {
                    return Err(BladeGridError::InvalidInput(format!(
                        "unknown section selection parameter '{}'",
                        key
                    )));
                }
            }
        }
        config.validate()?;
        Ok(config)
    }
}
