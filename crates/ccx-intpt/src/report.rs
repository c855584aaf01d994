//! Text report writer (`<job>_IntPtOutput.txt`).
//!
//! Layout:
//! - one `#`-prefixed column title line
//! - one row per integration point: `%12i%9i%16.4e %16.4e %16.4e`
//! - a blank line, then `Minimum`, `Maximum` and `Mean (arith.)`
//! - a trailing blank line

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IntPtError, Result};
use crate::results::{IntegrationPointResult, ResultStatistics};

/// Accepted input suffix, case-sensitive.
pub const INPUT_SUFFIX: &str = ".dat";
/// Replaces [`INPUT_SUFFIX`] in the report file name.
pub const OUTPUT_SUFFIX: &str = "_IntPtOutput.txt";

pub const REPORT_HEADER: &str = concat!(
    "# ",
    "     ",
    "Elem.    Int.Pt.",
    "         ",
    "MISES",
    "              ",
    "EEQ",
    "             ",
    "PEEQ",
);

/// Report path for a `.dat` input: `job.dat` -> `job_IntPtOutput.txt`.
///
/// # Errors
/// `InvalidInputPath` unless the path ends in `.dat`.
pub fn output_path_for(input: &Path) -> Result<PathBuf> {
    let raw = input.to_string_lossy();
    match raw.strip_suffix(INPUT_SUFFIX) {
        Some(stem) => Ok(PathBuf::from(format!("{stem}{OUTPUT_SUFFIX}"))),
        None => Err(IntPtError::InvalidInputPath {
            path: raw.into_owned(),
        }),
    }
}

/// Scientific notation the way C `printf("%W.Pe")` prints it: at least two
/// exponent digits with explicit sign, `nan`/`inf` for non-finite values,
/// right-aligned in `width`.
pub fn format_sci(value: f64, width: usize, precision: usize) -> String {
    let body = if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        let raw = format!("{value:.precision$e}");
        match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
            }
            None => raw,
        }
    };
    format!("{body:>width$}")
}

fn summary_line(label: &str, first_width: usize, values: [f64; 3]) -> String {
    format!(
        "     {label}{}{}{}\n",
        format_sci(values[0], first_width, 4),
        format_sci(values[1], 17, 4),
        format_sci(values[2], 17, 4)
    )
}

/// Render the full report as a string.
pub fn render_report(results: &[IntegrationPointResult], stats: &ResultStatistics) -> String {
    let mut out = String::with_capacity(64 * (results.len() + 8));
    out.push_str(REPORT_HEADER);
    out.push('\n');

    for r in results {
        out.push_str(&format!(
            "{:12}{:9}{} {} {}\n",
            r.element_id,
            r.point_id,
            format_sci(r.mises, 16, 4),
            format_sci(r.eeq, 16, 4),
            format_sci(r.peeq, 16, 4)
        ));
    }

    out.push('\n');
    out.push_str(&summary_line(
        "Minimum",
        25,
        [stats.mises.min, stats.eeq.min, stats.peeq.min],
    ));
    out.push_str(&summary_line(
        "Maximum",
        25,
        [stats.mises.max, stats.eeq.max, stats.peeq.max],
    ));
    out.push_str(&summary_line(
        "Mean (arith.)",
        19,
        [stats.mises.mean, stats.eeq.mean, stats.peeq.mean],
    ));
    out.push('\n');
    out
}

/// Write the report to `path`.
pub fn write_report(
    path: &Path,
    results: &[IntegrationPointResult],
    stats: &ResultStatistics,
) -> Result<()> {
    fs::write(path, render_report(results, stats))?;
    tracing::info!(path = %path.display(), rows = results.len(), "report written");
    Ok(())
}
