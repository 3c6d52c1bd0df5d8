//! Zero/pole/gain representation and the analog-to-digital transforms used
//! by the Butterworth designer.
//!
//! The pipeline is the classical one: a unit-cutoff analog prototype is
//! frequency-transformed to the pre-warped cutoff, then mapped to the z-plane
//! with the bilinear transform `z = (2fs + s) / (2fs - s)`.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Transfer function in zero/pole/gain form
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Zpk {
    /// Analog Butterworth prototype with an angular cutoff of 1 rad/s.
    pub fn butterworth_prototype(order: usize) -> Self {
        let n = order as i64;
        let poles = (-n + 1..n)
            .step_by(2)
            .map(|m| {
                // m == 0 yields exp(0) so the odd-order pole is exactly real
                -(Complex64::i() * PI * m as f64 / (2.0 * n as f64)).exp()
            })
            .collect();

        Self {
            zeros: Vec::new(),
            poles,
            gain: 1.0,
        }
    }

    /// Poles minus zeros; the number of zeros sitting at infinity.
    pub fn relative_degree(&self) -> usize {
        self.poles.len().saturating_sub(self.zeros.len())
    }

    /// Shift the cutoff of a lowpass prototype to `wo` rad/s.
    pub fn lowpass_to_lowpass(&self, wo: f64) -> Self {
        let degree = self.relative_degree();

        Self {
            zeros: self.zeros.iter().map(|z| z * wo).collect(),
            poles: self.poles.iter().map(|p| p * wo).collect(),
            // each scaled pole lowers the gain by wo, each zero raises it
            gain: self.gain * wo.powi(degree as i32),
        }
    }

    /// Turn a lowpass prototype into a highpass with cutoff `wo` rad/s.
    pub fn lowpass_to_highpass(&self, wo: f64) -> Self {
        let degree = self.relative_degree();

        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|z| wo / z).collect();
        // zeros at infinity invert to the origin
        zeros.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), degree));

        let poles = self.poles.iter().map(|p| wo / p).collect();

        let gain = self.gain
            * (product(self.zeros.iter().map(|z| -z)) / product(self.poles.iter().map(|p| -p))).re;

        Self { zeros, poles, gain }
    }

    /// Bilinear transform at sample rate `fs`.
    pub fn bilinear(&self, fs: f64) -> Self {
        let degree = self.relative_degree();
        let fs2 = Complex64::new(2.0 * fs, 0.0);

        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|z| (fs2 + z) / (fs2 - z)).collect();
        // zeros at infinity land on Nyquist
        zeros.extend(std::iter::repeat_n(Complex64::new(-1.0, 0.0), degree));

        let poles = self.poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect();

        let gain = self.gain
            * (product(self.zeros.iter().map(|z| fs2 - z)) / product(self.poles.iter().map(|p| fs2 - p)))
                .re;

        Self { zeros, poles, gain }
    }
}

/// Product of all items; 1 for an empty iterator.
fn product(items: impl Iterator<Item = Complex64>) -> Complex64 {
    items.fold(Complex64::new(1.0, 0.0), |acc, x| acc * x)
}
