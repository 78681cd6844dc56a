//! # Blade discretization
//!
//! Turns spanwise property tables of a rotor blade into a beam grid for the solver deck writers.
//!
//! ## Pipeline
//! property tables + [`SectionSelectionConfig`] → [`select_sections`] → section list →
//! [`BladeGrid::build`] → raw grid → [`bind`] → grid with interpolators
//!
//! [`discretize`] runs the whole chain. Nothing here reads or writes files: tables come from an
//! upstream loader, and the [`SectionReport`] and the bound grid go to downstream writers.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use RustedBladeGrid::blade::{discretize, PropertyTable, SectionSelectionConfig};
//!
//! let structural = Arc::new(
//!     PropertyTable::new(vec![0.0, 0.5, 1.0], vec![("Chord", vec![0.1, 0.5, 0.1])]).unwrap(),
//! );
//! let config = SectionSelectionConfig::default()
//!     .with_err_tol(0.01)
//!     .with_jump_tol(1e6)
//!     .with_dr_bounds(0.1, 1.0)
//!     .with_max_elems(10);
//! let (grid, report) = discretize(structural, None, &config).unwrap();
//! assert_eq!(report.sections, vec![0.0, 0.5, 1.0]);
//! assert_eq!(grid.n_elements(), 2);
//! assert!((grid.structural_at("Chord", 0.25).unwrap() - 0.3).abs() < 1e-12);
//! ```
pub mod errors;
pub mod grid;
pub mod interpolation;
pub mod property_table;
pub mod section_report;
pub mod select_config;
pub mod select_sections;

pub use errors::{BladeGridError, Result};
pub use grid::{BladeGrid, Element, Node, bind};
pub use interpolation::{ChannelInterpolator, LinearInterpolator, RadialInterpolation};
pub use property_table::{AeroChannel, PropertyTable, Sample, StructuralChannel};
pub use section_report::{SectionMessage, SectionReason, SectionReport, SegmentMetric};
pub use select_config::SectionSelectionConfig;
pub use select_sections::select_sections;

use std::sync::Arc;

/// Selects the sections, builds the grid and binds the interpolators of one blade.
pub fn discretize(
    structural: Arc<PropertyTable>,
    aero: Option<Arc<PropertyTable>>,
    config: &SectionSelectionConfig,
) -> Result<(BladeGrid, SectionReport)> {
    let (sections, report) = select_sections(&structural, aero.as_deref(), config)?;
    let grid = BladeGrid::build(&sections)?;
    Ok((bind(grid, structural, aero), report))
}
