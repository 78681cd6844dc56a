//! # Blade grid
//!
//! Node/element topology built from a selected section list, later enriched with interpolators
//! bound to the raw property tables.
//!
//! - one node per section, ascending radius
//! - one element per pair of adjacent nodes
//! - span positions: the node radii, cached for O(1) lookup
//!
//! For three-node beam writers each element also exposes its midpoint and the two Gauss
//! evaluation radii `xm ± (x2 - x1) / (2√3)`; `beam3_nodes` gives the end–mid–end node list of
//! length `2K - 1`.
use crate::blade::errors::{BladeGridError, Result};
use crate::blade::interpolation::{LinearInterpolator, RadialInterpolation};
use crate::blade::property_table::PropertyTable;
use log::debug;
use nalgebra::DVector;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub index: usize,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub index: usize,
    /// indices of the inner and outer node
    pub nodes: [usize; 2],
}

#[derive(Debug, Clone)]
pub struct BladeGrid {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    span_positions: DVector<f64>,
    structural: Option<LinearInterpolator>,
    aero: Option<LinearInterpolator>,
}

impl BladeGrid {
    /// Builds the topology of a section list. No interpolators are attached.
    ///
    /// # Errors
    /// `InvalidInput` for fewer than 2 sections or radii that are not finite and strictly
    /// increasing.
    pub fn build(sections: &[f64]) -> Result<BladeGrid> {
        if sections.len() < 2 {
            return Err(BladeGridError::InvalidInput(format!(
                "need at least 2 control sections, got {}",
                sections.len()
            )));
        }
        if sections.iter().any(|r| !r.is_finite()) {
            return Err(BladeGridError::InvalidInput(
                "sections must be finite".to_string(),
            ));
        }
        if sections.windows(2).any(|w| w[1] <= w[0]) {
            return Err(BladeGridError::InvalidInput(
                "sections must be strictly increasing without duplicates".to_string(),
            ));
        }
        let nodes: Vec<Node> = sections
            .iter()
            .enumerate()
            .map(|(index, &radius)| Node { index, radius })
            .collect();
        let elements: Vec<Element> = (0..sections.len() - 1)
            .map(|index| Element {
                index,
                nodes: [index, index + 1],
            })
            .collect();
        debug!(
            "grid built: {} nodes, {} elements",
            nodes.len(),
            elements.len()
        );
        Ok(BladeGrid {
            nodes,
            elements,
            span_positions: DVector::from_column_slice(sections),
            structural: None,
            aero: None,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn span_positions(&self) -> &DVector<f64> {
        &self.span_positions
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn node_radius(&self, node: usize) -> Option<f64> {
        self.span_positions.get(node).copied()
    }

    /// radii of the inner and outer node of an element
    pub fn element_ends(&self, element: usize) -> Option<(f64, f64)> {
        let e = self.elements.get(element)?;
        Some((
            self.span_positions[e.nodes[0]],
            self.span_positions[e.nodes[1]],
        ))
    }

    pub fn element_length(&self, element: usize) -> Option<f64> {
        self.element_ends(element).map(|(x1, x2)| x2 - x1)
    }

    pub fn element_midpoint(&self, element: usize) -> Option<f64> {
        self.element_ends(element).map(|(x1, x2)| 0.5 * (x1 + x2))
    }

    /// two-point Gauss evaluation radii of an element
    pub fn gauss_points(&self, element: usize) -> Option<(f64, f64)> {
        let (x1, x2) = self.element_ends(element)?;
        let xm = 0.5 * (x1 + x2);
        let half_spread = 0.5 * (x2 - x1) / 3.0_f64.sqrt();
        Some((xm - half_spread, xm + half_spread))
    }

    /// end–mid–end node radii for three-node beam elements, `2K - 1` entries
    pub fn beam3_nodes(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(2 * self.nodes.len() - 1);
        out.push(self.span_positions[0]);
        for element in 0..self.elements.len() {
            let (x1, x2) = (
                self.span_positions[element],
                self.span_positions[element + 1],
            );
            out.push(0.5 * (x1 + x2));
            out.push(x2);
        }
        out
    }

    pub fn is_bound(&self) -> bool {
        self.structural.is_some()
    }

    pub fn structural(&self) -> Option<&LinearInterpolator> {
        self.structural.as_ref()
    }

    /// `None` when the blade was bound without aerodynamic data; aerodynamic output must be skipped
    pub fn aero(&self) -> Option<&LinearInterpolator> {
        self.aero.as_ref()
    }

    /// Structural `channel` at radius `r`.
    ///
    /// # Errors
    /// `InvalidInput` if the grid is not bound yet, otherwise the interpolator errors.
    pub fn structural_at(&self, channel: &str, r: f64) -> Result<f64> {
        let interp = self.structural.as_ref().ok_or_else(|| {
            BladeGridError::InvalidInput("grid has no structural interpolator bound".to_string())
        })?;
        interp.evaluate(channel, r)
    }

    /// Aerodynamic `channel` at radius `r`; `Ok(None)` when no aerodynamic data was bound.
    pub fn aero_at(&self, channel: &str, r: f64) -> Result<Option<f64>> {
        self.aero
            .as_ref()
            .map(|interp| interp.evaluate(channel, r))
            .transpose()
    }

    /// Structural `channel` at every node.
    pub fn structural_at_nodes(&self, channel: &str) -> Result<Vec<f64>> {
        self.span_positions
            .iter()
            .map(|&r| self.structural_at(channel, r))
            .collect()
    }
}

/// Attaches interpolators over the raw tables to a freshly built grid and hands it back.
///
/// The structural interpolator is always attached; the aerodynamic one only when `aero` is
/// given. Both share the tables, no sample data is copied.
pub fn bind(
    mut grid: BladeGrid,
    structural: Arc<PropertyTable>,
    aero: Option<Arc<PropertyTable>>,
) -> BladeGrid {
    debug!(
        "binding {} structural channel(s), aero data {}",
        structural.n_channels(),
        if aero.is_some() { "present" } else { "absent" }
    );
    grid.structural = Some(LinearInterpolator::new(structural));
    grid.aero = aero.map(LinearInterpolator::new);
    grid
}
