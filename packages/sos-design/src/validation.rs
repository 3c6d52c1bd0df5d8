use crate::error::{DesignError, Result};
use crate::types::{DesignParameters, FilterSpec, MAX_ORDER};

/// Cutoffs above this fraction of the sample rate are accepted but warped hard
/// by the bilinear transform.
const HIGH_CUTOFF_WARN_RATIO: f64 = 0.45;

pub fn validate_sample_rate(sample_rate_hz: f64) -> Result<()> {
    if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return Err(DesignError::invalid(format!(
            "sample rate must be a positive finite number, got {} Hz",
            sample_rate_hz
        )));
    }
    Ok(())
}

/// Check one stage against the sample rate: 0 < order <= MAX_ORDER and
/// 0 < cutoff < Nyquist.
pub fn validate_stage(spec: &FilterSpec, sample_rate_hz: f64) -> Result<()> {
    validate_sample_rate(sample_rate_hz)?;
    check_stage(spec, sample_rate_hz)
}

fn check_stage(spec: &FilterSpec, sample_rate_hz: f64) -> Result<()> {
    let name = spec.kind.name();

    if spec.order <= 0 {
        return Err(DesignError::invalid(format!(
            "{} order must be positive, got {}",
            name, spec.order
        )));
    }
    if spec.order > MAX_ORDER {
        return Err(DesignError::invalid(format!(
            "{} order {} exceeds the maximum of {}",
            name, spec.order, MAX_ORDER
        )));
    }

    let nyquist = sample_rate_hz / 2.0;
    if !spec.cutoff_hz.is_finite() || spec.cutoff_hz <= 0.0 || spec.cutoff_hz >= nyquist {
        return Err(DesignError::invalid(format!(
            "{} cutoff ({} Hz) must be between 0 and Nyquist ({} Hz), exclusive",
            name, spec.cutoff_hz, nyquist
        )));
    }

    Ok(())
}

pub fn is_near_nyquist(spec: &FilterSpec, sample_rate_hz: f64) -> bool {
    spec.cutoff_hz > HIGH_CUTOFF_WARN_RATIO * sample_rate_hz
}

/// Validate every stage before any design work starts.
pub fn validate_parameters(params: &DesignParameters) -> Result<()> {
    validate_sample_rate(params.sample_rate_hz)?;
    for stage in params.stages() {
        check_stage(stage, params.sample_rate_hz)?;
    }

    for stage in params.stages() {
        if is_near_nyquist(stage, params.sample_rate_hz) {
            log::warn!(
                "{} cutoff {} Hz is close to Nyquist ({} Hz); coefficients will be poorly conditioned",
                stage.kind.name(),
                stage.cutoff_hz,
                params.nyquist_hz()
            );
        }
    }

    Ok(())
}
