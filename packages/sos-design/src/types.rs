use serde::{Deserialize, Serialize};

/// Sample rate of the PPG front end the table is generated for.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 100.0;
pub const DEFAULT_HIGHPASS_ORDER: i32 = 4;
pub const DEFAULT_HIGHPASS_CUTOFF_HZ: f64 = 0.40;
pub const DEFAULT_LOWPASS_ORDER: i32 = 2;
pub const DEFAULT_LOWPASS_CUTOFF_HZ: f64 = 7.0;

/// Highest accepted filter order per stage.
pub const MAX_ORDER: i32 = 32;

/// Butterworth response type of one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Highpass,
    Lowpass,
}

impl FilterKind {
    /// Short stage label used in generated source comments.
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Highpass => "HP",
            FilterKind::Lowpass => "LP",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Highpass => "highpass",
            FilterKind::Lowpass => "lowpass",
        }
    }
}

/// One Butterworth stage of the cascade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    /// Signed so that non-positive orders reach validation instead of failing to parse
    pub order: i32,
    pub cutoff_hz: f64,
}

impl FilterSpec {
    pub fn highpass(order: i32, cutoff_hz: f64) -> Self {
        Self {
            kind: FilterKind::Highpass,
            order,
            cutoff_hz,
        }
    }

    pub fn lowpass(order: i32, cutoff_hz: f64) -> Self {
        Self {
            kind: FilterKind::Lowpass,
            order,
            cutoff_hz,
        }
    }

    /// Number of second-order sections this stage expands to: ceil(order / 2).
    pub fn section_count(&self) -> usize {
        (self.order.max(0) as usize).div_ceil(2)
    }
}

/// Complete set of design inputs for one coefficient table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignParameters {
    pub sample_rate_hz: f64,
    pub highpass: FilterSpec,
    pub lowpass: FilterSpec,
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            highpass: FilterSpec::highpass(DEFAULT_HIGHPASS_ORDER, DEFAULT_HIGHPASS_CUTOFF_HZ),
            lowpass: FilterSpec::lowpass(DEFAULT_LOWPASS_ORDER, DEFAULT_LOWPASS_CUTOFF_HZ),
        }
    }
}

impl DesignParameters {
    pub fn new(
        sample_rate_hz: f64,
        highpass_order: i32,
        highpass_cutoff_hz: f64,
        lowpass_order: i32,
        lowpass_cutoff_hz: f64,
    ) -> Self {
        Self {
            sample_rate_hz,
            highpass: FilterSpec::highpass(highpass_order, highpass_cutoff_hz),
            lowpass: FilterSpec::lowpass(lowpass_order, lowpass_cutoff_hz),
        }
    }

    pub fn nyquist_hz(&self) -> f64 {
        self.sample_rate_hz / 2.0
    }

    /// Stages in processing order: highpass first, then lowpass.
    pub fn stages(&self) -> [&FilterSpec; 2] {
        [&self.highpass, &self.lowpass]
    }
}

/// Raw biquad: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (a0 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSection {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl FilterSection {
    /// Build from a `[b0, b1, b2, a0, a1, a2]` row.
    pub fn from_row(row: [f64; 6]) -> Self {
        let [b0, b1, b2, a0, a1, a2] = row;
        Self {
            b0,
            b1,
            b2,
            a0,
            a1,
            a2,
        }
    }

    pub fn to_row(&self) -> [f64; 6] {
        [self.b0, self.b1, self.b2, self.a0, self.a1, self.a2]
    }

    /// True when the section carries a single pole and zero (b2 = a2 = 0).
    pub fn is_first_order(&self) -> bool {
        self.b2 == 0.0 && self.a2 == 0.0
    }
}

/// Ordered cascade of sections; processing order is index order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionCascade {
    sections: Vec<FilterSection>,
}

impl SectionCascade {
    pub fn new(sections: Vec<FilterSection>) -> Self {
        Self { sections }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[FilterSection] {
        &self.sections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterSection> {
        self.sections.iter()
    }

    /// Append another cascade after this one, preserving both orders.
    pub fn append(&mut self, other: SectionCascade) {
        self.sections.extend(other.sections);
    }
}

impl IntoIterator for SectionCascade {
    type Item = FilterSection;
    type IntoIter = std::vec::IntoIter<FilterSection>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.into_iter()
    }
}

/// Section divided through by its leading denominator coefficient.
///
/// Only constructed by [`crate::normalize::normalize_section`], so `a0` is
/// always exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSection(FilterSection);

impl NormalizedSection {
    pub(crate) fn from_normalized(section: FilterSection) -> Self {
        debug_assert!(section.a0 == 1.0);
        Self(section)
    }

    pub fn section(&self) -> &FilterSection {
        &self.0
    }

    pub fn a0(&self) -> f64 {
        self.0.a0
    }

    /// Multiply back by `a0`, recovering the pre-normalization section.
    pub fn rescale(&self, a0: f64) -> FilterSection {
        let s = &self.0;
        FilterSection {
            b0: s.b0 * a0,
            b1: s.b1 * a0,
            b2: s.b2 * a0,
            a0: s.a0 * a0,
            a1: s.a1 * a0,
            a2: s.a2 * a0,
        }
    }

    /// Drop the redundant `a0` column.
    pub fn into_row(self) -> OutputRow {
        let s = self.0;
        OutputRow([s.b0, s.b1, s.b2, s.a1, s.a2])
    }
}

/// `[b0, b1, b2, a1, a2]` with an implied a0 of 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputRow([f64; 5]);

impl OutputRow {
    pub fn new(values: [f64; 5]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; 5] {
        &self.0
    }

    pub fn b0(&self) -> f64 {
        self.0[0]
    }

    pub fn b1(&self) -> f64 {
        self.0[1]
    }

    pub fn b2(&self) -> f64 {
        self.0[2]
    }

    pub fn a1(&self) -> f64 {
        self.0[3]
    }

    pub fn a2(&self) -> f64 {
        self.0[4]
    }

    /// Reinsert a0 = 1.0, giving the full six-coefficient section.
    pub fn to_section(&self) -> FilterSection {
        let [b0, b1, b2, a1, a2] = self.0;
        FilterSection {
            b0,
            b1,
            b2,
            a0: 1.0,
            a1,
            a2,
        }
    }
}

/// Which rows of a table came from which stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub kind: FilterKind,
    pub order: i32,
    pub cutoff_hz: f64,
    pub first_row: usize,
    pub row_count: usize,
}

impl StageSummary {
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.first_row..self.first_row + self.row_count
    }
}

/// Generated coefficient table together with the parameters that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    pub parameters: DesignParameters,
    pub stages: Vec<StageSummary>,
    pub rows: Vec<OutputRow>,
}

impl CoefficientTable {
    /// Stage that produced row `index`, with the row's position inside that stage.
    pub fn stage_of(&self, index: usize) -> Option<(&StageSummary, usize)> {
        self.stages
            .iter()
            .find(|s| s.rows().contains(&index))
            .map(|s| (s, index - s.first_row))
    }
}
