use crate::cli::ResponseArgs;
use crate::exit_codes;
use crate::output;
use serde::Serialize;
use sos_design::{generate_table, response_at, DesignParameters, ResponsePoint};
use std::fmt::Write;

#[derive(Serialize)]
struct ResponseOutput {
    parameters: DesignParameters,
    rows: usize,
    points: Vec<ResponsePoint>,
}

pub fn execute(args: ResponseArgs) -> i32 {
    let params = args.design.parameters();

    let table = match generate_table(&params) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    let points = match response_at(&table.rows, &args.freqs, params.sample_rate_hz) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    if args.json {
        let result = ResponseOutput {
            parameters: params,
            rows: table.rows.len(),
            points,
        };
        match output::to_json(&result, false) {
            Ok(json) => {
                if let Err(e) = output::write_output(&json) {
                    eprintln!("Error: {}", e);
                    return exit_codes::OUTPUT_ERROR;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::OUTPUT_ERROR;
            }
        }
    } else {
        let text = format_table(&points, table.rows.len(), params.sample_rate_hz);
        if let Err(e) = output::write_output(&text) {
            eprintln!("Error: {}", e);
            return exit_codes::OUTPUT_ERROR;
        }
    }

    exit_codes::SUCCESS
}

fn format_table(points: &[ResponsePoint], sections: usize, sample_rate_hz: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cascade response ({} sections, fs = {} Hz):\n",
        sections, sample_rate_hz
    );
    let _ = writeln!(
        out,
        "  {:>10} {:>14} {:>12} {:>12}",
        "Freq (Hz)", "|H|", "Gain (dB)", "Phase (rad)"
    );
    let _ = write!(out, "  {}", "-".repeat(51));
    for p in points {
        let _ = write!(
            out,
            "\n  {:>10.3} {:>14.6e} {:>12.3} {:>12.4}",
            p.freq_hz, p.magnitude, p.magnitude_db, p.phase_rad
        );
    }
    out
}
