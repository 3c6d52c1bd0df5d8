use clap::{Args, Parser, Subcommand};
use sos_design::render::{DEFAULT_PRECISION, MAX_PRECISION};
use sos_design::{
    DesignParameters, TableFormat, DEFAULT_HIGHPASS_CUTOFF_HZ, DEFAULT_HIGHPASS_ORDER,
    DEFAULT_LOWPASS_CUTOFF_HZ, DEFAULT_LOWPASS_ORDER, DEFAULT_SAMPLE_RATE_HZ,
};

#[derive(Parser)]
#[command(
    name = "sosgen",
    version,
    about = "Butterworth SOS coefficient table generator",
    long_about = "Design a highpass + lowpass Butterworth cascade in second-order-section form\n\
                  and print the normalized [b0, b1, b2, a1, a2] rows for embedding in firmware.\n\
                  With no arguments, prints the table for the 100 Hz heart-rate front end.",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Arguments for the implied `generate` command
    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the coefficient table (default)
    Generate(GenerateArgs),
    /// Evaluate the designed cascade's frequency response
    Response(ResponseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DesignArgs {
    /// Sampling rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE_HZ)]
    pub sample_rate: f64,

    /// Highpass Butterworth order
    #[arg(long, default_value_t = DEFAULT_HIGHPASS_ORDER, allow_negative_numbers = true)]
    pub hp_order: i32,

    /// Highpass cutoff in Hz
    #[arg(long, default_value_t = DEFAULT_HIGHPASS_CUTOFF_HZ, allow_negative_numbers = true)]
    pub hp_cutoff: f64,

    /// Lowpass Butterworth order
    #[arg(long, default_value_t = DEFAULT_LOWPASS_ORDER, allow_negative_numbers = true)]
    pub lp_order: i32,

    /// Lowpass cutoff in Hz
    #[arg(long, default_value_t = DEFAULT_LOWPASS_CUTOFF_HZ, allow_negative_numbers = true)]
    pub lp_cutoff: f64,
}

impl DesignArgs {
    pub fn parameters(&self) -> DesignParameters {
        DesignParameters::new(
            self.sample_rate,
            self.hp_order,
            self.hp_cutoff,
            self.lp_order,
            self.lp_cutoff,
        )
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    /// Output format: numpy, c, rust or json
    #[arg(long, default_value_t = TableFormat::Numpy)]
    pub format: TableFormat,

    /// Digits after the decimal point
    #[arg(
        long,
        default_value_t = DEFAULT_PRECISION as u8,
        value_parser = clap::value_parser!(u8).range(1..=MAX_PRECISION as i64)
    )]
    pub precision: u8,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ResponseArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    /// Frequencies in Hz to evaluate, each within 0..=fs/2
    #[arg(long, num_args = 1.., default_values_t = vec![0.0, 1.0, 10.0])]
    pub freqs: Vec<f64>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
