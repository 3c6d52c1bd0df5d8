//! Text renderers for coefficient tables.
//!
//! The default `numpy` layout reproduces `numpy.array2string(sos, precision=P,
//! separator=', ')`: values rounded to P decimals with trailing zeros trimmed,
//! decimal points aligned across the whole table, and a switch to scientific
//! notation when the magnitudes span too wide a range to print in fixed point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DesignError, Result};
use crate::types::CoefficientTable;

pub const DEFAULT_PRECISION: usize = 9;
pub const MAX_PRECISION: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    /// Bracketed array literal, as printed by numpy
    #[default]
    Numpy,
    /// `static const float SOS[R][5]` initializer
    C,
    /// `pub const SOS: [[f32; 5]; R]` item
    Rust,
    Json,
}

impl TableFormat {
    pub const ALL: [TableFormat; 4] = [
        TableFormat::Numpy,
        TableFormat::C,
        TableFormat::Rust,
        TableFormat::Json,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableFormat::Numpy => "numpy",
            TableFormat::C => "c",
            TableFormat::Rust => "rust",
            TableFormat::Json => "json",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TableFormat::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown format '{}'. Supported: {}",
                    s,
                    TableFormat::ALL.map(|f| f.name()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: TableFormat,
    /// Digits after the decimal point (of the mantissa in scientific mode)
    pub precision: usize,
    /// JSON only: no indentation
    pub compact: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: TableFormat::Numpy,
            precision: DEFAULT_PRECISION,
            compact: false,
        }
    }
}

/// Render `table` in the requested format. The result has no trailing newline.
pub fn render(table: &CoefficientTable, options: &RenderOptions) -> Result<String> {
    if options.precision == 0 || options.precision > MAX_PRECISION {
        return Err(DesignError::InvalidDesignParameter(format!(
            "precision must be within 1..={}, got {}",
            MAX_PRECISION, options.precision
        )));
    }

    match options.format {
        TableFormat::Numpy => Ok(render_numpy(table, options.precision)),
        TableFormat::C => Ok(render_c(table, options.precision)),
        TableFormat::Rust => Ok(render_rust(table, options.precision)),
        TableFormat::Json => render_json(table, options.compact),
    }
}

/// One value split so that columns can be aligned on the decimal point.
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    int: String,
    frac: String,
    exp: Option<(char, String)>,
}

/// Cells for every value plus the paddings that align them.
struct Grid {
    cells: Vec<Vec<Cell>>,
    pad_int: usize,
    pad_frac: usize,
    pad_exp: usize,
}

impl Grid {
    fn new(table: &CoefficientTable, precision: usize) -> Self {
        let scientific = needs_scientific(table);

        let cells: Vec<Vec<Cell>> = table
            .rows
            .iter()
            .map(|row| {
                row.values()
                    .iter()
                    .map(|&v| format_cell(v, precision, scientific))
                    .collect()
            })
            .collect();

        let all = || cells.iter().flatten();
        let pad_int = all().map(|c| c.int.len()).max().unwrap_or(0);
        let pad_frac = all().map(|c| c.frac.len()).max().unwrap_or(0);
        let pad_exp = all()
            .filter_map(|c| c.exp.as_ref().map(|(_, digits)| digits.len()))
            .max()
            .unwrap_or(0);

        Self {
            cells,
            pad_int,
            pad_frac,
            pad_exp,
        }
    }

    /// Aligned text of one cell. `min_frac` forces at least that many fraction
    /// digits (Rust literals cannot end in a bare `.`).
    fn text(&self, cell: &Cell, min_frac: usize, pad_right: bool) -> String {
        let mut out = format!("{:>width$}.", cell.int, width = self.pad_int);
        let frac_width = self.pad_frac.max(min_frac);

        match &cell.exp {
            Some((sign, digits)) => {
                // mantissas share one fraction length, zero-filled
                out.push_str(&format!("{:0<width$}", cell.frac, width = frac_width));
                out.push('e');
                out.push(*sign);
                out.push_str(&format!("{:0>width$}", digits, width = self.pad_exp));
            }
            None => {
                let mut frac = cell.frac.clone();
                while frac.len() < min_frac {
                    frac.push('0');
                }
                out.push_str(&frac);
                if pad_right {
                    out.push_str(&" ".repeat(frac_width - frac.len()));
                }
            }
        }
        out
    }
}

/// numpy switches to scientific notation when the smallest non-zero magnitude
/// is below 1e-4, the largest is 1e8 or more, or they span more than 1e3.
fn needs_scientific(table: &CoefficientTable) -> bool {
    let magnitudes: Vec<f64> = table
        .rows
        .iter()
        .flat_map(|r| r.values().iter())
        .map(|v| v.abs())
        .filter(|v| *v != 0.0 && v.is_finite())
        .collect();

    let Some(max) = magnitudes.iter().copied().reduce(f64::max) else {
        return false;
    };
    let min = magnitudes.iter().copied().fold(f64::INFINITY, f64::min);

    max >= 1e8 || min < 1e-4 || max / min > 1e3
}

fn format_cell(value: f64, precision: usize, scientific: bool) -> Cell {
    if scientific {
        let text = format!("{:.*e}", precision, value);
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
        let (int, frac) = split_trimmed(mantissa);
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits.to_string()),
            None => ('+', exponent.to_string()),
        };
        Cell {
            int,
            frac,
            exp: Some((sign, format!("{:0>2}", digits))),
        }
    } else {
        let text = format!("{:.*}", precision, value);
        let (int, frac) = split_trimmed(&text);
        Cell {
            int,
            frac,
            exp: None,
        }
    }
}

/// Split "1.2500" into ("1", "25"), dropping trailing zeros of the fraction.
fn split_trimmed(text: &str) -> (String, String) {
    match text.split_once('.') {
        Some((int, frac)) => (int.to_string(), frac.trim_end_matches('0').to_string()),
        None => (text.to_string(), String::new()),
    }
}

fn render_numpy(table: &CoefficientTable, precision: usize) -> String {
    let grid = Grid::new(table, precision);

    let rows: Vec<String> = grid
        .cells
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(|c| grid.text(c, 0, true)).collect();
            format!("[{}]", values.join(", "))
        })
        .collect();

    format!("[{}]", rows.join(",\n "))
}

/// Header lines shared by the source-code renderers.
fn describe(table: &CoefficientTable) -> Vec<String> {
    let stages: Vec<String> = table
        .stages
        .iter()
        .map(|s| format!("{} order {} @ {} Hz", s.kind.label(), s.order, s.cutoff_hz))
        .collect();

    vec![
        format!(
            "{}, fs = {} Hz",
            stages.join(", "),
            table.parameters.sample_rate_hz
        ),
        "Each row is one biquad: [b0, b1, b2, a1, a2] with a0 = 1".to_string(),
    ]
}

fn stage_label(table: &CoefficientTable, index: usize) -> String {
    match table.stage_of(index) {
        Some((stage, pos)) => format!("{} stage {}", stage.kind.label(), pos + 1),
        None => format!("stage {}", index + 1),
    }
}

fn render_c(table: &CoefficientTable, precision: usize) -> String {
    let grid = Grid::new(table, precision);
    let mut lines: Vec<String> = describe(table).into_iter().map(|l| format!("// {}", l)).collect();

    lines.push(format!("static const float SOS[{}][5] = {{", table.rows.len()));
    let rows: Vec<Vec<String>> = grid
        .cells
        .iter()
        .map(|row| row.iter().map(|c| grid.text(c, 0, true)).collect())
        .collect();
    // padding shared by the whole first column; `{ ` already separates it
    let shared_pad = rows
        .iter()
        .filter_map(|r| r.first())
        .map(|v| v.len() - v.trim_start().len())
        .min()
        .unwrap_or(0);

    let count = rows.len();
    for (i, mut values) in rows.into_iter().enumerate() {
        if let Some(first) = values.first_mut() {
            first.replace_range(..shared_pad, "");
        }
        lines.push(format!(
            "    /* {} */ {{ {} }}{}",
            stage_label(table, i),
            values.join(", "),
            if i + 1 < count { "," } else { "" }
        ));
    }
    lines.push("};".to_string());

    lines.join("\n")
}

fn render_rust(table: &CoefficientTable, precision: usize) -> String {
    let grid = Grid::new(table, precision);
    let mut lines: Vec<String> = describe(table).into_iter().map(|l| format!("/// {}", l)).collect();

    lines.push(format!("pub const SOS: [[f32; 5]; {}] = [", table.rows.len()));
    for (i, row) in grid.cells.iter().enumerate() {
        let values: Vec<String> = row
            .iter()
            .map(|c| grid.text(c, 1, false).trim_start().to_string())
            .collect();
        lines.push(format!(
            "    [{}], // {}",
            values.join(", "),
            stage_label(table, i)
        ));
    }
    lines.push("];".to_string());

    lines.join("\n")
}

fn render_json(table: &CoefficientTable, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(table)
    } else {
        serde_json::to_string_pretty(table)
    };
    json.map_err(|e| DesignError::RenderFailed(format!("JSON serialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_table;
    use crate::types::{DesignParameters, OutputRow};

    const NUMPY_DEFAULT: &str = "\
[[ 0.967694809, -1.935389618,  0.967694809, -1.954001962,  0.954619251],
 [ 1.         , -2.         ,  1.         , -1.980323859,  0.980949464],
 [ 0.036574836,  0.073149672,  0.036574836, -1.390895281,  0.537194625]]";

    fn default_table() -> CoefficientTable {
        generate_table(&DesignParameters::default()).unwrap()
    }

    fn table_of(rows: Vec<[f64; 5]>) -> CoefficientTable {
        CoefficientTable {
            parameters: DesignParameters::default(),
            stages: Vec::new(),
            rows: rows.into_iter().map(OutputRow::new).collect(),
        }
    }

    #[test]
    fn test_numpy_default_matches_reference_output() {
        let text = render(&default_table(), &RenderOptions::default()).unwrap();
        assert_eq!(text, NUMPY_DEFAULT);
    }

    #[test]
    fn test_numpy_lower_precision() {
        let table = table_of(vec![[0.5, -1.25, 0.126, 1.0, 0.0]]);
        let options = RenderOptions {
            precision: 2,
            ..RenderOptions::default()
        };
        assert_eq!(
            render(&table, &options).unwrap(),
            "[[ 0.5 , -1.25,  0.13,  1.  ,  0.  ]]"
        );
    }

    #[test]
    fn test_numpy_switches_to_scientific_for_tiny_values() {
        let table = table_of(vec![[2.5e-6, 5e-6, 2.5e-6, -1.5, 0.75]]);
        let text = render(&table, &RenderOptions::default()).unwrap();
        assert_eq!(
            text,
            "[[ 2.5e-06,  5.0e-06,  2.5e-06, -1.5e+00,  7.5e-01]]"
        );
    }

    #[test]
    fn test_scientific_detection() {
        assert!(!needs_scientific(&default_table()));
        assert!(needs_scientific(&table_of(vec![[1e-5, 0.0, 0.0, 1.0, 0.0]])));
        assert!(needs_scientific(&table_of(vec![[1e9, 0.0, 0.0, 1.0, 0.0]])));
        assert!(needs_scientific(&table_of(vec![[0.001, 0.0, 0.0, 2.0, 0.0]])));
        assert!(!needs_scientific(&table_of(vec![[0.0; 5]])));
    }

    #[test]
    fn test_c_output() {
        let text = render(
            &default_table(),
            &RenderOptions {
                format: TableFormat::C,
                ..RenderOptions::default()
            },
        )
        .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "// HP order 4 @ 0.4 Hz, LP order 2 @ 7 Hz, fs = 100 Hz");
        assert_eq!(lines[2], "static const float SOS[3][5] = {");
        assert_eq!(
            lines[4],
            "    /* HP stage 2 */ { 1.         , -2.         ,  1.         , -1.980323859,  0.980949464 },"
        );
        assert!(lines[5].starts_with("    /* LP stage 1 */ { 0.036574836,"));
        assert!(lines[5].ends_with(" }"));
        assert_eq!(lines[6], "};");
    }

    #[test]
    fn test_rust_output_uses_valid_literals() {
        let text = render(
            &default_table(),
            &RenderOptions {
                format: TableFormat::Rust,
                ..RenderOptions::default()
            },
        )
        .unwrap();
        assert!(text.contains("pub const SOS: [[f32; 5]; 3] = ["));
        assert!(text.contains(
            "    [1.0, -2.0, 1.0, -1.980323859, 0.980949464], // HP stage 2"
        ));
        assert!(text.ends_with("];"));
        assert!(!text.contains(". "));
    }

    #[test]
    fn test_json_round_trips_table() {
        let table = default_table();
        let text = render(
            &table,
            &RenderOptions {
                format: TableFormat::Json,
                compact: true,
                ..RenderOptions::default()
            },
        )
        .unwrap();
        assert!(!text.contains('\n'));
        let parsed: CoefficientTable = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.parameters, table.parameters);
        assert_eq!(parsed.stages, table.stages);
        assert_eq!(parsed.rows.len(), table.rows.len());
        // the parser may be one ulp off on the last digit
        for (got, want) in parsed.rows.iter().zip(table.rows.iter()) {
            for (g, w) in got.values().iter().zip(want.values().iter()) {
                assert!((g - w).abs() <= 4.0 * f64::EPSILON, "{} vs {}", g, w);
            }
        }
    }

    #[test]
    fn test_c_rows_open_with_single_space() {
        let c = RenderOptions {
            format: TableFormat::C,
            ..RenderOptions::default()
        };

        let text = render(&table_of(vec![[0.5, 0.25, 0.5, 0.75, 0.125]]), &c).unwrap();
        assert!(text.contains("/* stage 1 */ { 0.5  , 0.25 , 0.5  , 0.75 , 0.125 }"));

        let text = render(
            &table_of(vec![[-0.5, 1.0, 0.5, 1.5, 0.5], [0.25, 1.0, 0.5, 1.5, 0.5]]),
            &c,
        )
        .unwrap();
        assert!(text.contains("/* stage 1 */ { -0.5 , "));
        assert!(text.contains("/* stage 2 */ {  0.25, "));
    }

    #[test]
    fn test_precision_bounds() {
        let table = default_table();
        for precision in [0, MAX_PRECISION + 1] {
            let options = RenderOptions {
                precision,
                ..RenderOptions::default()
            };
            assert!(matches!(
                render(&table, &options),
                Err(DesignError::InvalidDesignParameter(_))
            ));
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("numpy".parse::<TableFormat>().unwrap(), TableFormat::Numpy);
        assert_eq!("C".parse::<TableFormat>().unwrap(), TableFormat::C);
        assert_eq!(" rust ".parse::<TableFormat>().unwrap(), TableFormat::Rust);
        let err = "yaml".parse::<TableFormat>().unwrap_err();
        assert!(err.contains("numpy, c, rust, json"));
    }
}
