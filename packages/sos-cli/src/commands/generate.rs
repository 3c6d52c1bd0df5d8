use crate::cli::GenerateArgs;
use crate::exit_codes;
use crate::output;
use sos_design::{generate_table, render, RenderOptions};

pub fn execute(args: GenerateArgs) -> i32 {
    let params = args.design.parameters();
    log::info!(
        "Designing HP order {} @ {} Hz + LP order {} @ {} Hz at fs = {} Hz",
        params.highpass.order,
        params.highpass.cutoff_hz,
        params.lowpass.order,
        params.lowpass.cutoff_hz,
        params.sample_rate_hz
    );

    let table = match generate_table(&params) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    let options = RenderOptions {
        format: args.format,
        precision: usize::from(args.precision),
        compact: args.compact,
    };

    let text = match render(&table, &options) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    if let Err(e) = output::write_output(&text) {
        eprintln!("Error: {}", e);
        return exit_codes::OUTPUT_ERROR;
    }

    exit_codes::SUCCESS
}
