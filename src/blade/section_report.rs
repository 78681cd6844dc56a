//! Report produced by the section selector: the chosen sections, why each one exists, the
//! interpolation error achieved on every segment and the diagnostics of degraded results.
use std::fmt;
use tabled::{builder::Builder, settings::Style};

/// Why a section is in the list.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionReason {
    /// root of the selected span
    Start,
    /// tip, the largest structural radius
    End,
    /// raw first difference of the channel above `jump_tol`
    Jump(String),
    /// local extremum of the channel (planform vertex)
    Vertex(String),
    /// inserted where the channel deviated most from the linear interpolation
    Error(String),
    /// inserted to keep the element shorter than `max_dr`
    MaxDr,
}

impl SectionReason {
    /// Protected sections survive the `min_dr` merge.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            SectionReason::Start
                | SectionReason::End
                | SectionReason::Jump(_)
                | SectionReason::Vertex(_)
        )
    }
}

impl fmt::Display for SectionReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SectionReason::Start => write!(f, "START"),
            SectionReason::End => write!(f, "END"),
            SectionReason::Jump(channel) => write!(f, "JUMP:{}", channel),
            SectionReason::Vertex(channel) => write!(f, "VERTEX:{}", channel),
            SectionReason::Error(channel) => write!(f, "ERR:{}", channel),
            SectionReason::MaxDr => write!(f, "MAX_DR"),
        }
    }
}

/// Diagnostics of a successful but degraded selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionMessage {
    /// final segment whose error stays above `err_tol`
    ToleranceNotMet { r_a: f64, r_b: f64, error: f64 },
    /// refinement or spacing stopped at `max_elems`
    BudgetExhausted {
        max_elems: usize,
        unresolved: usize,
    },
    /// forced break removed to fit the element budget
    ForcedBreakDropped { radius: f64 },
    /// segment shorter than `min_dr` between two protected sections
    ShortSegmentKept { r_a: f64, r_b: f64 },
    /// inner segment longer than `max_dr` that no equal split keeps above `min_dr`
    SpacingUnresolved { r_a: f64, r_b: f64 },
    /// section removed by the `min_dr` merge
    SectionMerged { radius: f64 },
    AeroDataMissing,
    DegenerateInput(String),
}

impl fmt::Display for SectionMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SectionMessage::ToleranceNotMet { r_a, r_b, error } => write!(
                f,
                "tolerance not met on [{:.6}, {:.6}]: error {:.6e}",
                r_a, r_b, error
            ),
            SectionMessage::BudgetExhausted {
                max_elems,
                unresolved,
            } => write!(
                f,
                "element budget exhausted at max_elems = {}: {} segment(s) left unresolved",
                max_elems, unresolved
            ),
            SectionMessage::ForcedBreakDropped { radius } => write!(
                f,
                "forced break at r = {:.6} dropped to respect max_elems",
                radius
            ),
            SectionMessage::ShortSegmentKept { r_a, r_b } => write!(
                f,
                "segment [{:.6}, {:.6}] is shorter than min_dr but both ends are protected",
                r_a, r_b
            ),
            SectionMessage::SpacingUnresolved { r_a, r_b } => write!(
                f,
                "segment [{:.6}, {:.6}] was split below min_dr: no part count fits both min_dr and max_dr",
                r_a, r_b
            ),
            SectionMessage::SectionMerged { radius } => {
                write!(f, "min_dr merge: removed section at r = {:.6}", radius)
            }
            SectionMessage::AeroDataMissing => write!(
                f,
                "no aerodynamic data: sections follow the structural table only"
            ),
            SectionMessage::DegenerateInput(msg) => write!(f, "degenerate input: {}", msg),
        }
    }
}

/// Achieved interpolation error over one final segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMetric {
    pub r_a: f64,
    pub r_b: f64,
    /// max absolute deviation over channels and interior raw samples
    pub error: f64,
    /// channel that produced `error`, `None` when the segment has no interior sample
    pub channel: Option<String>,
}

impl SegmentMetric {
    pub fn length(&self) -> f64 {
        self.r_b - self.r_a
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub sections: Vec<f64>,
    /// reasons of each section, index aligned with `sections`
    pub reasons: Vec<Vec<SectionReason>>,
    pub r_start_used: f64,
    pub segments: Vec<SegmentMetric>,
    pub messages: Vec<SectionMessage>,
    pub notes: Vec<String>,
}

impl SectionReport {
    pub fn elems(&self) -> usize {
        self.sections.len().saturating_sub(1)
    }

    /// node count of an end–mid–end three-node beam discretization
    pub fn nodes(&self) -> usize {
        (2 * self.sections.len()).saturating_sub(1)
    }

    pub fn max_error(&self) -> f64 {
        self.segments.iter().map(|s| s.error).fold(0.0, f64::max)
    }

    pub fn reasons_at(&self, r: f64, eps: f64) -> Option<&[SectionReason]> {
        self.sections
            .iter()
            .position(|s| (s - r).abs() <= eps)
            .map(|i| self.reasons[i].as_slice())
    }

    pub fn messages_text(&self) -> Vec<String> {
        self.messages.iter().map(|m| m.to_string()).collect()
    }

    pub fn has_budget_exhausted(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m, SectionMessage::BudgetExhausted { .. }))
    }

    /// Sections with their reasons and the error of the segment that starts there.
    pub fn table(&self) -> String {
        let mut rows: Vec<Vec<String>> = vec![vec![
            "#".to_string(),
            "r".to_string(),
            "reasons".to_string(),
            "dr".to_string(),
            "segment error".to_string(),
        ]];
        for (i, r) in self.sections.iter().enumerate() {
            let reasons = self.reasons[i]
                .iter()
                .map(|reason| reason.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let (dr, error) = match self.segments.get(i) {
                Some(segment) => (
                    format!("{:.6}", segment.length()),
                    format!("{:.3e}", segment.error),
                ),
                None => ("-".to_string(), "-".to_string()),
            };
            rows.push(vec![i.to_string(), format!("{:.6}", r), reasons, dr, error]);
        }
        let mut table = Builder::from(rows).build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

impl fmt::Display for SectionReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "r_start = {:.6}, elements = {}, beam nodes = {}",
            self.r_start_used,
            self.elems(),
            self.nodes()
        )?;
        writeln!(f, "{}", self.table())?;
        for message in &self.messages {
            writeln!(f, "warning: {}", message)?;
        }
        for note in &self.notes {
            writeln!(f, "note: {}", note)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SectionReport {
        SectionReport {
            sections: vec![0.0, 0.5, 1.0],
            reasons: vec![
                vec![SectionReason::Start],
                vec![SectionReason::Error("Chord".to_string())],
                vec![SectionReason::End],
            ],
            r_start_used: 0.0,
            segments: vec![
                SegmentMetric {
                    r_a: 0.0,
                    r_b: 0.5,
                    error: 0.0,
                    channel: None,
                },
                SegmentMetric {
                    r_a: 0.5,
                    r_b: 1.0,
                    error: 2e-3,
                    channel: Some("Chord".to_string()),
                },
            ],
            messages: vec![SectionMessage::BudgetExhausted {
                max_elems: 2,
                unresolved: 1,
            }],
            notes: vec![],
        }
    }

    #[test]
    fn test_counts_and_lookup() {
        let r = report();
        assert_eq!(r.elems(), 2);
        assert_eq!(r.nodes(), 5);
        assert_eq!(r.max_error(), 2e-3);
        assert!(r.has_budget_exhausted());
        assert_eq!(
            r.reasons_at(0.5, 1e-9),
            Some(&[SectionReason::Error("Chord".to_string())][..])
        );
        assert_eq!(r.reasons_at(0.7, 1e-9), None);
    }

    #[test]
    fn test_reason_protection_and_names() {
        assert!(SectionReason::Start.is_protected());
        assert!(SectionReason::Jump("EA".to_string()).is_protected());
        assert!(!SectionReason::MaxDr.is_protected());
        assert!(!SectionReason::Error("EA".to_string()).is_protected());
        assert_eq!(SectionReason::Vertex("Chord".to_string()).to_string(), "VERTEX:Chord");
    }

    #[test]
    fn test_rendering() {
        let r = report();
        let table = r.table();
        assert!(table.contains("ERR:Chord"));
        assert!(table.contains("0.500000"));
        let text = r.to_string();
        assert!(text.contains("elements = 2"));
        assert!(text.contains("element budget exhausted"));
        assert_eq!(r.messages_text().len(), 1);
    }
}
