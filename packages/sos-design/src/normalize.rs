use crate::error::{DesignError, Result};
use crate::types::{FilterSection, NormalizedSection, SectionCascade};

/// Divide a section through by `a0` and pin `a0` to exactly 1.0.
///
/// `index` is the section's position in the cascade and only feeds the error.
pub fn normalize_section(section: &FilterSection, index: usize) -> Result<NormalizedSection> {
    let a0 = section.a0;
    if a0 == 0.0 {
        return Err(DesignError::DegenerateSection {
            index,
            reason: "leading denominator coefficient a0 is zero".to_string(),
        });
    }
    if !a0.is_finite() {
        return Err(DesignError::DegenerateSection {
            index,
            reason: format!("leading denominator coefficient a0 is {}", a0),
        });
    }

    let normalized = FilterSection {
        b0: section.b0 / a0,
        b1: section.b1 / a0,
        b2: section.b2 / a0,
        // forced rather than computed, a0 / a0 can drift
        a0: 1.0,
        a1: section.a1 / a0,
        a2: section.a2 / a0,
    };

    if let Some(bad) = normalized.to_row().iter().find(|v| !v.is_finite()) {
        return Err(DesignError::DegenerateSection {
            index,
            reason: format!("normalized coefficient is {}", bad),
        });
    }

    if a0 != 1.0 {
        log::debug!("Section {} rescaled by a0 = {}", index, a0);
    }

    Ok(NormalizedSection::from_normalized(normalized))
}

/// Normalize every section of a cascade, stopping at the first degenerate one.
pub fn normalize_cascade(cascade: &SectionCascade) -> Result<Vec<NormalizedSection>> {
    cascade
        .iter()
        .enumerate()
        .map(|(i, s)| normalize_section(s, i))
        .collect()
}
