//! Butterworth design in second-order-section form.
//!
//! [`FilterDesigner`] is the seam between the generator and the numerics.
//! [`BilinearButterworth`] is the built-in implementation: analog prototype,
//! pre-warped frequency transform, bilinear transform, then grouping of the
//! digital poles and zeros into biquads.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::Result;
use crate::types::{FilterKind, FilterSection, FilterSpec, SectionCascade};
use crate::validation::validate_stage;
use crate::zpk::Zpk;

/// Imaginary parts within this many ulps of the root's magnitude count as real.
const REAL_TOLERANCE_ULPS: f64 = 100.0;

/// Designs one filter stage as a cascade of second-order sections.
pub trait FilterDesigner {
    fn design(&self, spec: &FilterSpec, sample_rate_hz: f64) -> Result<SectionCascade>;
}

/// Digital Butterworth design via the bilinear transform
#[derive(Debug, Clone, Copy, Default)]
pub struct BilinearButterworth;

impl BilinearButterworth {
    pub fn new() -> Self {
        Self
    }

    /// Digital zero/pole/gain for `spec`.
    pub fn zpk(&self, spec: &FilterSpec, sample_rate_hz: f64) -> Result<Zpk> {
        validate_stage(spec, sample_rate_hz)?;

        // Work in normalized frequency with fs = 2 so Wn is a fraction of Nyquist
        let wn = 2.0 * spec.cutoff_hz / sample_rate_hz;
        let fs = 2.0;
        let warped = 2.0 * fs * (PI * wn / fs).tan();

        let prototype = Zpk::butterworth_prototype(spec.order as usize);
        let analog = match spec.kind {
            FilterKind::Lowpass => prototype.lowpass_to_lowpass(warped),
            FilterKind::Highpass => prototype.lowpass_to_highpass(warped),
        };

        Ok(analog.bilinear(fs))
    }
}

impl FilterDesigner for BilinearButterworth {
    fn design(&self, spec: &FilterSpec, sample_rate_hz: f64) -> Result<SectionCascade> {
        let zpk = self.zpk(spec, sample_rate_hz)?;
        let cascade = zpk_to_sos(&zpk);

        log::info!(
            "Designed {} order {} at {} Hz (fs = {} Hz): {} section(s), gain {:.6e}",
            spec.kind.name(),
            spec.order,
            spec.cutoff_hz,
            sample_rate_hz,
            cascade.len(),
            zpk.gain
        );
        for (i, section) in cascade.iter().enumerate() {
            log::debug!("  {} section {}: {:?}", spec.kind.label(), i, section.to_row());
        }

        Ok(cascade)
    }
}

/// A biquad's worth of roots; first-order groups carry an origin root.
struct RootPair {
    poles: [Complex64; 2],
    zeros: [Complex64; 2],
}

impl RootPair {
    fn pole_radius(&self) -> f64 {
        self.poles[0].norm().max(self.poles[1].norm())
    }

    fn section(&self) -> FilterSection {
        let [z1, z2] = self.zeros;
        let [p1, p2] = self.poles;
        FilterSection {
            b0: 1.0,
            b1: real(-(z1 + z2)),
            b2: real(z1 * z2),
            a0: 1.0,
            a1: real(-(p1 + p2)),
            a2: real(p1 * p2),
        }
    }
}

/// Real part with negative zero folded to zero, so origin roots print as `0.`
fn real(c: Complex64) -> f64 {
    c.re + 0.0
}

/// Group digital roots into biquads.
///
/// Conjugate pole pairs form one section each; leftover real poles are paired
/// among themselves, a single remaining one with a pole at the origin. Zeros
/// are handed out in the same conjugate-first order, padded with origin zeros.
/// Sections are ordered with the poles farthest from the unit circle first,
/// and the overall gain is folded into the first numerator.
pub fn zpk_to_sos(zpk: &Zpk) -> SectionCascade {
    let origin = Complex64::new(0.0, 0.0);

    let pole_groups = conjugate_groups(&zpk.poles);
    let mut zero_queue: std::collections::VecDeque<Complex64> =
        conjugate_groups(&zpk.zeros).into_iter().flatten().collect();

    let mut pairs: Vec<RootPair> = pole_groups
        .into_iter()
        .map(|poles| {
            let z1 = zero_queue.pop_front().unwrap_or(origin);
            // a first-order group only consumes one zero
            let z2 = if poles[1] == origin {
                origin
            } else {
                zero_queue.pop_front().unwrap_or(origin)
            };
            RootPair {
                poles,
                zeros: [z1, z2],
            }
        })
        .collect();

    pairs.sort_by(|a, b| a.pole_radius().total_cmp(&b.pole_radius()));

    let mut sections: Vec<FilterSection> = pairs.iter().map(RootPair::section).collect();
    if let Some(first) = sections.first_mut() {
        first.b0 *= zpk.gain;
        first.b1 *= zpk.gain;
        first.b2 *= zpk.gain;
    }

    SectionCascade::new(sections)
}

/// Relative test: roots hugging z = 1 at very low cutoffs have tiny but
/// genuine imaginary parts.
fn is_real(root: &Complex64) -> bool {
    root.im.abs() <= REAL_TOLERANCE_ULPS * f64::EPSILON * root.norm()
}

/// Split roots into pairs: conjugate pairs first (upper half-plane member
/// leading), then real roots in ascending order, the last one padded with the
/// origin when the count is odd.
fn conjugate_groups(roots: &[Complex64]) -> Vec<[Complex64; 2]> {
    let origin = Complex64::new(0.0, 0.0);

    let mut groups: Vec<[Complex64; 2]> = roots
        .iter()
        .filter(|r| !is_real(r) && r.im > 0.0)
        .map(|r| [*r, r.conj()])
        .collect();

    let mut reals: Vec<Complex64> = roots
        .iter()
        .filter(|r| is_real(r))
        .map(|r| Complex64::new(r.re, 0.0))
        .collect();
    reals.sort_by(|a, b| a.re.total_cmp(&b.re));

    for chunk in reals.chunks(2) {
        match chunk {
            [a, b] => groups.push([*a, *b]),
            [a] => groups.push([*a, origin]),
            _ => {}
        }
    }

    groups
}
