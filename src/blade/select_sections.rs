//! # Automatic control section selection
//!
//! Chooses the spanwise radii where structural beam sections are placed. Too few sections miss
//! property discontinuities and interpolate badly, too many inflate the model and break the
//! element length limits of the solver.
//!
//! ## Algorithm
//! 1. **Root**: `r_start` from the configuration, or detected from the aerodynamic chord or the
//!    structural stiffness channels; clamped into the structural range.
//! 2. **Forced breaks**: both radii of every pair of adjacent raw samples whose first
//!    difference exceeds `jump_tol` in any structural channel (and the aerodynamic chord).
//!    Local chord extrema are added as planform vertices. These sections are protected.
//! 3. **Error refinement**: the error of a segment `[a, b]` is the largest absolute deviation
//!    between the raw samples strictly inside it and the straight line through the (table
//!    interpolated) endpoint values, over all channels. Out-of-tolerance segments are kept in a
//!    work list; the worst one is split at its point of maximum deviation (clamped to keep both
//!    halves at least `min_dr` long) until every segment is within tolerance, too short to
//!    split (`<= 2*min_dr`) or the section budget `max_elems + 1` is used up.
//! 4. **Spacing**: segments shorter than `min_dr` are merged into their smaller neighbor by
//!    removing an unprotected shared section; segments longer than `max_dr` are split into
//!    equal parts, budget permitting. When equal parts would drop below `min_dr` the tip
//!    segment is cut in `max_dr` steps (only its last part may be short) and an inner segment
//!    is split anyway and reported. A second refinement pass then restores the tolerance on
//!    the split segments (refinement never produces segments outside `[min_dr, max_dr]`).
//! 5. **Report**: final per-segment errors, reasons of every section and diagnostics. Segments
//!    still above `err_tol` are reported from the final list.
//!
//! The selection is a pure function of its inputs. Ties of maximum deviation resolve to the
//! lowest radius, ties between equally bad segments to the one closest to the root.
use crate::blade::errors::{BladeGridError, Result};
use crate::blade::property_table::{AeroChannel, PropertyTable, StructuralChannel};
use crate::blade::section_report::{SectionMessage, SectionReason, SectionReport, SegmentMetric};
use crate::blade::select_config::SectionSelectionConfig;
use itertools::Itertools;
use log::{debug, info, warn};

/// stiffness above this fraction of the largest stiffness marks the structural root
const STIFFNESS_ONSET: f64 = 1e-6;
/// chord changes below this fraction of the largest chord are not vertices
const VERTEX_THRESHOLD: f64 = 1e-3;

#[derive(Debug, Clone)]
struct Section {
    r: f64,
    reasons: Vec<SectionReason>,
}

impl Section {
    fn is_protected(&self) -> bool {
        self.reasons.iter().any(|reason| reason.is_protected())
    }
}

/// Sorted working set of sections. Radii closer than `c_eps` are one section.
#[derive(Debug, Clone)]
struct SectionSet {
    sections: Vec<Section>,
    c_eps: f64,
}

impl SectionSet {
    fn new(c_eps: f64) -> Self {
        SectionSet {
            sections: Vec::new(),
            c_eps,
        }
    }

    fn len(&self) -> usize {
        self.sections.len()
    }

    fn radii(&self) -> Vec<f64> {
        self.sections.iter().map(|s| s.r).collect()
    }

    /// Adds `r` with `reason`; returns false when `r` collapsed into an existing section.
    fn insert(&mut self, r: f64, reason: SectionReason) -> bool {
        let pos = self.sections.partition_point(|s| s.r < r - self.c_eps);
        if let Some(existing) = self.sections.get_mut(pos) {
            if (existing.r - r).abs() <= self.c_eps {
                if !existing.reasons.contains(&reason) {
                    existing.reasons.push(reason);
                }
                return false;
            }
        }
        self.sections.insert(
            pos,
            Section {
                r,
                reasons: vec![reason],
            },
        );
        true
    }

    fn remove(&mut self, i: usize) -> Section {
        self.sections.remove(i)
    }
}

/// Worst deviation of the raw samples inside a segment from its chord line.
#[derive(Debug, Clone, PartialEq)]
struct SegmentProbe {
    error: f64,
    /// radius of the worst sample
    at: Option<f64>,
    /// channel index of the worst sample
    channel: Option<usize>,
}

fn segment_error(table: &PropertyTable, a: f64, b: f64, c_eps: f64) -> SegmentProbe {
    let mut probe = SegmentProbe {
        error: 0.0,
        at: None,
        channel: None,
    };
    let stations = table.interior(a, b, c_eps);
    if stations.is_empty() || b <= a {
        return probe;
    }
    let n_channels = table.n_channels();
    let ends: Vec<(f64, f64)> = (0..n_channels)
        .map(|j| (table.lerp(j, a), table.lerp(j, b)))
        .collect();
    let radius = table.radius();
    let values = table.values();
    // stations ascend, so a strict comparison leaves ties at the lowest radius
    for i in stations {
        let r = radius[i];
        let t = (r - a) / (b - a);
        for (j, (ya, yb)) in ends.iter().enumerate() {
            let linear = ya + (yb - ya) * t;
            let deviation = (values[(j, i)] - linear).abs();
            if deviation > probe.error {
                probe = SegmentProbe {
                    error: deviation,
                    at: Some(r),
                    channel: Some(j),
                };
            }
        }
    }
    probe
}

/// Radii of both samples of every adjacent pair whose first difference exceeds `jump_tol`,
/// limited to `[r_lo, r_hi]`.
fn jump_radii(
    table: &PropertyTable,
    j: usize,
    r_lo: f64,
    r_hi: f64,
    config: &SectionSelectionConfig,
) -> Vec<f64> {
    let radius = table.radius();
    let values = table.values();
    let in_range = |r: f64| r >= r_lo - config.c_eps && r <= r_hi + config.c_eps;
    let mut out = Vec::new();
    for i in 1..table.len() {
        let jump = (values[(j, i)] - values[(j, i - 1)]).abs();
        if jump > config.jump_tol {
            for r in [radius[i - 1], radius[i]] {
                if in_range(r) {
                    out.push(r);
                }
            }
        }
    }
    out
}

/// Local extrema of a chord channel (planform vertices) inside `[r_lo, r_hi]`.
fn chord_vertices(table: &PropertyTable, j: usize, r_lo: f64, r_hi: f64) -> Vec<f64> {
    let n = table.len();
    if n < 3 {
        return Vec::new();
    }
    let chord: Vec<f64> = table.values().row(j).iter().copied().collect();
    let c_max = chord.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if c_max <= 0.0 {
        return Vec::new();
    }
    let threshold = VERTEX_THRESHOLD * c_max;
    let radius = table.radius();
    (1..n - 1)
        .filter(|&i| radius[i] >= r_lo && radius[i] <= r_hi)
        .filter(|&i| {
            let d_left = chord[i] - chord[i - 1];
            let d_right = chord[i + 1] - chord[i];
            d_left * d_right <= 0.0 && d_left.abs().max(d_right.abs()) > threshold
        })
        .map(|i| radius[i])
        .collect()
}

/// Blade root when no `r_start` is configured: first radius with chord above
/// `root_chord_eps`, else first station with noticeable stiffness, else the table start.
fn detect_r_start(
    structural: &PropertyTable,
    aero: Option<&PropertyTable>,
    config: &SectionSelectionConfig,
) -> f64 {
    if let Some(aero) = aero {
        if let Ok(j) = aero.channel_index(AeroChannel::Chord) {
            let radius = aero.radius();
            if let Some(i) = aero
                .values()
                .row(j)
                .iter()
                .position(|c| *c > config.root_chord_eps)
            {
                debug!("root detected from chord at r = {}", radius[i]);
                return radius[i];
            }
        }
    }
    let stiffness: Vec<usize> = StructuralChannel::stiffness()
        .iter()
        .filter_map(|c| structural.channel_index(c).ok())
        .collect();
    if stiffness.is_empty() {
        return structural.r_min();
    }
    let values = structural.values();
    let k_max = stiffness
        .iter()
        .flat_map(|&j| values.row(j).iter().map(|v| v.abs()).collect::<Vec<_>>())
        .fold(0.0_f64, f64::max);
    let threshold = STIFFNESS_ONSET * k_max.max(1.0);
    for i in 0..structural.len() {
        if stiffness.iter().any(|&j| values[(j, i)] > threshold) {
            debug!("root detected from stiffness at r = {}", structural.radius()[i]);
            return structural.radius()[i];
        }
    }
    structural.r_min()
}

/// Drops forced breaks, closest to midspan first, until the set fits the budget.
fn fit_forced_breaks(set: &mut SectionSet, budget: usize, messages: &mut Vec<SectionMessage>) {
    while set.len() > budget && set.len() > 2 {
        let first = set.sections[0].r;
        let last = set.sections[set.len() - 1].r;
        let mid = 0.5 * (first + last);
        let mut drop = 1;
        for i in 2..set.len() - 1 {
            if (set.sections[i].r - mid).abs() < (set.sections[drop].r - mid).abs() {
                drop = i;
            }
        }
        let dropped = set.remove(drop);
        warn!("forced break at r = {} dropped, budget {} sections", dropped.r, budget);
        messages.push(SectionMessage::ForcedBreakDropped { radius: dropped.r });
    }
}

struct Candidate {
    a: f64,
    b: f64,
    probe: SegmentProbe,
}

/// worst error first, lowest radius on ties
fn worst_candidate(pending: &[Candidate]) -> usize {
    let mut worst = 0;
    for (k, c) in pending.iter().enumerate().skip(1) {
        let w = &pending[worst];
        if c.probe.error > w.probe.error || (c.probe.error == w.probe.error && c.a < w.a) {
            worst = k;
        }
    }
    worst
}

/// Error-driven refinement on a work list. Returns true if the budget stopped it.
fn refine(
    set: &mut SectionSet,
    structural: &PropertyTable,
    config: &SectionSelectionConfig,
    budget: usize,
) -> bool {
    let probe_of = |a: f64, b: f64| -> Option<Candidate> {
        let probe = segment_error(structural, a, b, config.c_eps);
        (probe.error > config.err_tol).then_some(Candidate { a, b, probe })
    };
    let mut pending: Vec<Candidate> = set
        .radii()
        .into_iter()
        .tuple_windows()
        .filter_map(|(a, b)| probe_of(a, b))
        .collect();
    while !pending.is_empty() {
        let Candidate { a, b, probe } = pending.remove(worst_candidate(&pending));
        let (Some(at), Some(j)) = (probe.at, probe.channel) else {
            continue;
        };
        if b - a <= 2.0 * config.min_dr {
            debug!("[{}, {}] too short to split, error {:.3e}", a, b, probe.error);
            continue;
        }
        if set.len() >= budget {
            info!(
                "section budget of {} reached with {} segment(s) out of tolerance",
                budget,
                pending.len() + 1
            );
            return true;
        }
        let split = at.clamp(a + config.min_dr, b - config.min_dr);
        let channel = structural.channels()[j].clone();
        debug!(
            "split [{}, {}] at {} ({} error {:.3e})",
            a, b, split, channel, probe.error
        );
        if !set.insert(split, SectionReason::Error(channel)) {
            continue;
        }
        pending.extend(probe_of(a, split));
        pending.extend(probe_of(split, b));
    }
    false
}

/// Removes unprotected sections bounding segments shorter than `min_dr`, preferring the
/// smaller neighbor segment.
fn merge_short_segments(
    set: &mut SectionSet,
    config: &SectionSelectionConfig,
    messages: &mut Vec<SectionMessage>,
) {
    let mut i = 0;
    while i + 1 < set.len() {
        let s = &set.sections;
        let n = s.len();
        let length = s[i + 1].r - s[i].r;
        if length >= config.min_dr - config.c_eps {
            i += 1;
            continue;
        }
        // (neighbor segment length, section to remove)
        let mut options: Vec<(f64, usize)> = Vec::new();
        if i > 0 && !s[i].is_protected() {
            options.push((s[i].r - s[i - 1].r, i));
        }
        if i + 2 < n && !s[i + 1].is_protected() {
            options.push((s[i + 2].r - s[i + 1].r, i + 1));
        }
        let choice = options
            .into_iter()
            .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
        match choice {
            Some((_, k)) => {
                let removed = set.remove(k);
                debug!("min_dr merge removed r = {}", removed.r);
                messages.push(SectionMessage::SectionMerged { radius: removed.r });
                i = i.saturating_sub(1);
            }
            None => {
                messages.push(SectionMessage::ShortSegmentKept {
                    r_a: s[i].r,
                    r_b: s[i + 1].r,
                });
                i += 1;
            }
        }
    }
}

/// Radii that cut `[a, b]` into parts no longer than `max_dr`.
///
/// Equal parts when they stay at least `min_dr` long. Otherwise the tip segment is cut in
/// `max_dr` steps from `a`, leaving the short remainder at the tip, and an inner segment gets
/// equal parts anyway; the flag is true in that last case.
fn long_segment_cuts(
    a: f64,
    b: f64,
    is_tip: bool,
    config: &SectionSelectionConfig,
) -> (Vec<f64>, bool) {
    let length = b - a;
    // fewest parts that respect max_dr, hence the longest ones
    let parts = (length / config.max_dr).ceil().max(1.0) as usize;
    let equal = length / parts as f64;
    if equal >= config.min_dr - config.c_eps {
        let cuts = (1..parts).map(|k| a + length * k as f64 / parts as f64).collect();
        return (cuts, false);
    }
    if is_tip {
        let cuts = (1..)
            .map(|k| a + k as f64 * config.max_dr)
            .take_while(|r| *r < b - config.c_eps)
            .collect();
        return (cuts, false);
    }
    let cuts = (1..parts).map(|k| a + length * k as f64 / parts as f64).collect();
    (cuts, true)
}

/// Splits segments longer than `max_dr`. Returns true if the budget cut it short.
fn split_long_segments(
    set: &mut SectionSet,
    config: &SectionSelectionConfig,
    budget: usize,
    messages: &mut Vec<SectionMessage>,
) -> bool {
    let mut exhausted = false;
    let radii = set.radii();
    let Some(&tip) = radii.last() else {
        return false;
    };
    for (a, b) in radii.into_iter().tuple_windows() {
        if b - a <= config.max_dr + config.c_eps {
            continue;
        }
        let (cuts, unresolved) = long_segment_cuts(a, b, (b - tip).abs() <= config.c_eps, config);
        if unresolved {
            warn!(
                "[{}, {}] cannot be split within [min_dr, max_dr] = [{}, {}]",
                a, b, config.min_dr, config.max_dr
            );
            messages.push(SectionMessage::SpacingUnresolved { r_a: a, r_b: b });
        }
        for r in cuts {
            if set.len() >= budget {
                exhausted = true;
                break;
            }
            set.insert(r, SectionReason::MaxDr);
        }
    }
    exhausted
}

/// Selects the control sections of a blade.
///
/// # Arguments
/// * `structural` - structural table, at least 2 stations
/// * `aero` - optional aerodynamic table; its chord adds jump and vertex breaks and the root
/// * `config` - selection thresholds
///
/// # Returns
/// The strictly increasing section radii and the report describing them.
///
/// # Errors
/// `InvalidInput` if the table has fewer than 2 stations or the configuration is invalid.
/// Degraded results (budget exhausted, tolerance not met) are successful and reported.
pub fn select_sections(
    structural: &PropertyTable,
    aero: Option<&PropertyTable>,
    config: &SectionSelectionConfig,
) -> Result<(Vec<f64>, SectionReport)> {
    config.validate()?;
    if structural.len() < 2 {
        return Err(BladeGridError::InvalidInput(format!(
            "need at least 2 structural samples, got {}",
            structural.len()
        )));
    }
    let mut messages: Vec<SectionMessage> = Vec::new();
    let (r_min, r_max) = (structural.r_min(), structural.r_max());

    let mut r0 = match config.r_start {
        Some(r) => r,
        None => detect_r_start(structural, aero, config),
    };
    if r0 < r_min {
        r0 = r_min;
    }
    if r0 >= r_max - config.c_eps {
        messages.push(SectionMessage::DegenerateInput(format!(
            "r_start {} is not below the tip radius {}, starting at {}",
            r0, r_max, r_min
        )));
        r0 = r_min;
    }
    if structural.n_channels() == 0 {
        messages.push(SectionMessage::DegenerateInput(
            "structural table has no channels".to_string(),
        ));
    }
    if aero.is_none() {
        messages.push(SectionMessage::AeroDataMissing);
    }

    let mut set = SectionSet::new(config.c_eps);
    set.insert(r0, SectionReason::Start);
    set.insert(r_max, SectionReason::End);

    for (j, name) in structural.channels().iter().enumerate() {
        for r in jump_radii(structural, j, r0, r_max, config) {
            set.insert(r, SectionReason::Jump(name.clone()));
        }
    }
    if let Some(aero) = aero {
        if let Ok(j) = aero.channel_index(AeroChannel::Chord) {
            let name = AeroChannel::Chord.to_string();
            for r in jump_radii(aero, j, r0, r_max, config) {
                set.insert(r, SectionReason::Jump(name.clone()));
            }
            if config.chord_vertices {
                for r in chord_vertices(aero, j, r0, r_max) {
                    set.insert(r, SectionReason::Vertex(name.clone()));
                }
            }
        }
    }
    debug!("{} sections after forced breaks", set.len());

    let budget = config.max_elems + 1;
    let mut exhausted = false;
    if set.len() > budget {
        fit_forced_breaks(&mut set, budget, &mut messages);
        exhausted = true;
    }
    exhausted |= refine(&mut set, structural, config, budget);
    merge_short_segments(&mut set, config, &mut messages);
    exhausted |= split_long_segments(&mut set, config, budget, &mut messages);
    // equal parts move segment ends off the refined stations
    exhausted |= refine(&mut set, structural, config, budget);

    let sections = set.radii();
    let segments: Vec<SegmentMetric> = sections
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| {
            let probe = segment_error(structural, a, b, config.c_eps);
            SegmentMetric {
                r_a: a,
                r_b: b,
                error: probe.error,
                channel: probe.channel.map(|j| structural.channels()[j].clone()),
            }
        })
        .collect();
    for segment in segments.iter().filter(|s| s.error > config.err_tol) {
        messages.push(SectionMessage::ToleranceNotMet {
            r_a: segment.r_a,
            r_b: segment.r_b,
            error: segment.error,
        });
    }
    if exhausted {
        let unresolved = segments
            .iter()
            .filter(|s| s.error > config.err_tol || s.length() > config.max_dr + config.c_eps)
            .count();
        warn!(
            "element budget exhausted at max_elems = {}, {} segment(s) unresolved",
            config.max_elems, unresolved
        );
        messages.push(SectionMessage::BudgetExhausted {
            max_elems: config.max_elems,
            unresolved,
        });
    }
    let mut unique: Vec<SectionMessage> = Vec::with_capacity(messages.len());
    for message in messages {
        if !unique.contains(&message) {
            unique.push(message);
        }
    }
    let mut signals: Vec<String> = structural.channels().to_vec();
    if aero.is_some_and(|a| a.has_channel(AeroChannel::Chord)) {
        signals.insert(0, format!("{}(aero)", AeroChannel::Chord));
    }
    let notes = vec![
        format!("signals = {}", signals.join(",")),
        format!(
            "err_tol = {}, jump_tol = {}, max_elems = {}, max_dr = {}, min_dr = {}, c_eps = {}",
            config.err_tol,
            config.jump_tol,
            config.max_elems,
            config.max_dr,
            config.min_dr,
            config.c_eps
        ),
    ];
    info!(
        "selected {} sections ({} elements) from r = {} to r = {}",
        sections.len(),
        sections.len() - 1,
        r0,
        r_max
    );
    let report = SectionReport {
        sections: sections.clone(),
        reasons: set.sections.into_iter().map(|s| s.reasons).collect(),
        r_start_used: r0,
        segments,
        messages: unique,
        notes,
    };
    Ok((sections, report))
}
