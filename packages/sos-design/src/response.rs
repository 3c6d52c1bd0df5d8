//! Closed-form frequency response of a coefficient table.
//!
//! Evaluates H(e^jw) = prod (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)
//! on the unit circle, which is how a generated table is sanity-checked before
//! it is pasted into firmware.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{DesignError, Result};
use crate::types::OutputRow;
use crate::validation::validate_sample_rate;

/// Lowest level reported, in dB. Exact zeros (e.g. a highpass at DC) clamp here.
pub const DB_FLOOR: f64 = -300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponsePoint {
    pub freq_hz: f64,
    pub magnitude: f64,
    pub magnitude_db: f64,
    pub phase_rad: f64,
}

/// Complex response of the cascade at `freq_hz`.
pub fn frequency_response(rows: &[OutputRow], freq_hz: f64, sample_rate_hz: f64) -> Complex64 {
    let w = 2.0 * PI * freq_hz / sample_rate_hz;
    let z1 = Complex64::from_polar(1.0, -w);
    let z2 = z1 * z1;

    rows.iter().fold(Complex64::new(1.0, 0.0), |acc, row| {
        let num = row.b0() + z1 * row.b1() + z2 * row.b2();
        let den = 1.0 + z1 * row.a1() + z2 * row.a2();
        acc * num / den
    })
}

pub fn to_db(magnitude: f64) -> f64 {
    if magnitude <= 0.0 {
        return DB_FLOOR;
    }
    (20.0 * magnitude.log10()).max(DB_FLOOR)
}

pub fn magnitude_db(rows: &[OutputRow], freq_hz: f64, sample_rate_hz: f64) -> f64 {
    to_db(frequency_response(rows, freq_hz, sample_rate_hz).norm())
}

/// Evaluate the cascade at each frequency in `freqs_hz`.
///
/// Frequencies must lie in `[0, fs/2]`.
pub fn response_at(
    rows: &[OutputRow],
    freqs_hz: &[f64],
    sample_rate_hz: f64,
) -> Result<Vec<ResponsePoint>> {
    validate_sample_rate(sample_rate_hz)?;
    let nyquist = sample_rate_hz / 2.0;

    freqs_hz
        .iter()
        .map(|&f| {
            if !f.is_finite() || f < 0.0 || f > nyquist {
                return Err(DesignError::InvalidDesignParameter(format!(
                    "response frequency ({} Hz) must be within 0..={} Hz",
                    f, nyquist
                )));
            }
            let h = frequency_response(rows, f, sample_rate_hz);
            Ok(ResponsePoint {
                freq_hz: f,
                magnitude: h.norm(),
                magnitude_db: to_db(h.norm()),
                phase_rad: h.arg(),
            })
        })
        .collect()
}
