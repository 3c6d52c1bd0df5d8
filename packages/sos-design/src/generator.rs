use crate::designer::{BilinearButterworth, FilterDesigner};
use crate::error::{DesignError, Result};
use crate::normalize::normalize_cascade;
use crate::types::{CoefficientTable, DesignParameters, OutputRow, SectionCascade, StageSummary};
use crate::validation::validate_parameters;

/// Design, normalize and flatten the highpass/lowpass cascade into output rows.
///
/// Rows `0..ceil(hp_order/2)` come from the highpass stage, the rest from the
/// lowpass stage.
pub fn generate(
    sample_rate_hz: f64,
    highpass_order: i32,
    highpass_cutoff_hz: f64,
    lowpass_order: i32,
    lowpass_cutoff_hz: f64,
) -> Result<Vec<OutputRow>> {
    let params = DesignParameters::new(
        sample_rate_hz,
        highpass_order,
        highpass_cutoff_hz,
        lowpass_order,
        lowpass_cutoff_hz,
    );
    generate_table(&params).map(|table| table.rows)
}

/// [`generate`] with stage provenance, using the built-in Butterworth designer.
pub fn generate_table(params: &DesignParameters) -> Result<CoefficientTable> {
    generate_table_with(&BilinearButterworth, params)
}

pub fn generate_table_with(
    designer: &dyn FilterDesigner,
    params: &DesignParameters,
) -> Result<CoefficientTable> {
    validate_parameters(params)?;

    let mut cascade = SectionCascade::default();
    let mut stages = Vec::with_capacity(2);

    for spec in params.stages() {
        let stage = designer.design(spec, params.sample_rate_hz)?;
        if stage.len() != spec.section_count() {
            return Err(DesignError::DegenerateSection {
                index: cascade.len(),
                reason: format!(
                    "{} designer returned {} section(s) for order {}, expected {}",
                    spec.kind.name(),
                    stage.len(),
                    spec.order,
                    spec.section_count()
                ),
            });
        }
        stages.push(StageSummary {
            kind: spec.kind,
            order: spec.order,
            cutoff_hz: spec.cutoff_hz,
            first_row: cascade.len(),
            row_count: stage.len(),
        });
        cascade.append(stage);
    }

    if cascade.is_empty() {
        return Err(DesignError::invalid("design produced no sections"));
    }

    let rows: Vec<OutputRow> = normalize_cascade(&cascade)?
        .into_iter()
        .map(|s| s.into_row())
        .collect();

    log::info!(
        "Generated {} row(s) at {} Hz ({})",
        rows.len(),
        params.sample_rate_hz,
        stages
            .iter()
            .map(|s| format!("{} x{}", s.kind.label(), s.row_count))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(CoefficientTable {
        parameters: *params,
        stages,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FilterKind, FilterSection, FilterSpec};

    const EXPECTED: [[f64; 5]; 3] = [
        [0.967694809, -1.935389618, 0.967694809, -1.954001962, 0.954619251],
        [1.0, -2.0, 1.0, -1.980323859, 0.980949464],
        [0.036574836, 0.073149672, 0.036574836, -1.390895281, 0.537194625],
    ];

    /// Returns fixed sections scaled by a chosen a0.
    struct ScaledDesigner {
        a0: f64,
    }

    impl FilterDesigner for ScaledDesigner {
        fn design(&self, spec: &FilterSpec, _sample_rate_hz: f64) -> Result<SectionCascade> {
            let a0 = self.a0;
            let section = FilterSection::from_row([0.5 * a0, a0, 0.5 * a0, a0, -0.4 * a0, 0.2 * a0]);
            Ok(SectionCascade::new(vec![section; spec.section_count()]))
        }
    }

    #[test]
    fn test_default_table_matches_reference() {
        let rows = generate(100.0, 4, 0.40, 2, 7.0).unwrap();
        assert_eq!(rows.len(), 3);
        for (row, expected) in rows.iter().zip(EXPECTED.iter()) {
            for (a, e) in row.values().iter().zip(expected.iter()) {
                assert!((a - e).abs() < 1e-9, "got {}, expected {}", a, e);
            }
        }
    }

    #[test]
    fn test_stage_provenance() {
        let table = generate_table(&DesignParameters::default()).unwrap();
        assert_eq!(table.stages.len(), 2);
        assert_eq!(table.stages[0].kind, FilterKind::Highpass);
        assert_eq!(table.stages[0].rows(), 0..2);
        assert_eq!(table.stages[1].kind, FilterKind::Lowpass);
        assert_eq!(table.stages[1].rows(), 2..3);
    }

    #[test]
    fn test_rows_per_stage_is_ceil_half_order() {
        for hp in 1..=6 {
            for lp in 1..=6 {
                let rows = generate(100.0, hp, 0.5, lp, 10.0).unwrap();
                let expected = (hp as usize).div_ceil(2) + (lp as usize).div_ceil(2);
                assert_eq!(rows.len(), expected, "hp {} lp {}", hp, lp);
            }
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let first = generate(100.0, 4, 0.40, 2, 7.0).unwrap();
        let second = generate(100.0, 4, 0.40, 2, 7.0).unwrap();
        for (a, b) in first.iter().zip(second.iter()) {
            for (x, y) in a.values().iter().zip(b.values().iter()) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }

    #[test]
    fn test_cutoff_at_nyquist_fails() {
        let err = generate(100.0, 4, 0.40, 2, 50.0).unwrap_err();
        assert!(matches!(err, DesignError::InvalidDesignParameter(_)));
        let err = generate(100.0, 4, 60.0, 2, 7.0).unwrap_err();
        assert!(matches!(err, DesignError::InvalidDesignParameter(_)));
    }

    #[test]
    fn test_non_positive_order_fails() {
        assert!(matches!(
            generate(100.0, 0, 0.40, 2, 7.0),
            Err(DesignError::InvalidDesignParameter(_))
        ));
        assert!(matches!(
            generate(100.0, 4, 0.40, -2, 7.0),
            Err(DesignError::InvalidDesignParameter(_))
        ));
    }

    #[test]
    fn test_designer_a0_is_normalized_away() {
        let params = DesignParameters::default();
        let table = generate_table_with(&ScaledDesigner { a0: 4.0 }, &params).unwrap();
        assert_eq!(table.rows.len(), 3);
        for row in &table.rows {
            assert_eq!(row.values(), &[0.5, 1.0, 0.5, -0.4, 0.2]);
        }
    }

    #[test]
    fn test_zero_a0_from_designer_is_degenerate() {
        let params = DesignParameters::default();
        let err = generate_table_with(&ScaledDesigner { a0: 0.0 }, &params).unwrap_err();
        assert!(matches!(err, DesignError::DegenerateSection { index: 0, .. }));
    }

    #[test]
    fn test_validation_runs_before_design() {
        // an invalid lowpass must fail even though the highpass designs fine
        let params = DesignParameters::new(100.0, 4, 0.40, 2, 75.0);
        let err = generate_table_with(&ScaledDesigner { a0: 0.0 }, &params).unwrap_err();
        assert!(matches!(err, DesignError::InvalidDesignParameter(_)));
    }

    /// Always returns a single section, whatever the order.
    struct SingleSectionDesigner;

    impl FilterDesigner for SingleSectionDesigner {
        fn design(&self, _spec: &FilterSpec, _sample_rate_hz: f64) -> Result<SectionCascade> {
            Ok(SectionCascade::new(vec![FilterSection::from_row([
                1.0, 2.0, 1.0, 1.0, -0.5, 0.1,
            ])]))
        }
    }

    #[test]
    fn test_wrong_section_count_is_rejected() {
        // highpass order 4 needs two sections
        let err = generate_table_with(&SingleSectionDesigner, &DesignParameters::default())
            .unwrap_err();
        match err {
            DesignError::DegenerateSection { index, reason } => {
                assert_eq!(index, 0);
                assert!(reason.contains("highpass"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // order 2 + order 1 need one section each
        let params = DesignParameters::new(100.0, 2, 0.4, 1, 7.0);
        assert_eq!(generate_table_with(&SingleSectionDesigner, &params).unwrap().rows.len(), 2);
    }

    #[test]
    fn test_near_nyquist_warning_logged_once() {
        capture::install();
        let params = DesignParameters::new(100.0, 4, 0.40, 2, 46.25);
        generate_table(&params).unwrap();

        let warnings = capture::messages()
            .into_iter()
            .filter(|m| m.contains("46.25 Hz is close to Nyquist"))
            .count();
        assert_eq!(warnings, 1);
    }

    mod capture {
        use std::sync::Mutex;

        static MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());
        static LOGGER: Capture = Capture;

        struct Capture;

        impl log::Log for Capture {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                metadata.level() <= log::Level::Warn
            }

            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    MESSAGES.lock().unwrap().push(record.args().to_string());
                }
            }

            fn flush(&self) {}
        }

        /// Installs the capturing logger on first use. Records logged before
        /// installation are lost, so call this before the code under test.
        pub fn install() {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Warn);
            }
        }

        pub fn messages() -> Vec<String> {
            MESSAGES.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_rows_reconstruct_normalized_sections() {
        let params = DesignParameters::default();
        let table = generate_table(&params).unwrap();
        for row in &table.rows {
            let section = row.to_section();
            assert_eq!(section.a0, 1.0);
            assert_eq!(section.b0, row.b0());
            assert_eq!(section.a2, row.a2());
        }
    }
}
