//! Integration-point output reader for CalculiX `.dat` files.
//!
//! Reads the element variable output requested with
//!
//! ```text
//! *EL PRINT, ELSET=Eall
//! S, E, PEEQ
//! ```
//!
//! reduces stresses to the Mises equivalent stress and strains to the total
//! effective strain, and summarizes them together with the equivalent
//! plastic strain (minimum, maximum, arithmetic mean) in a
//! `<job>_IntPtOutput.txt` report.
//!
//! Output at the integration points avoids the smoothing of nodal
//! extrapolation, which matters most for non-linear material behaviour.
//!
//! ```
//! let raw = "
//!  stresses (elem, integ.pnt.,sxx,syy,szz,sxy,sxz,syz) for set EALL and time  0.1E+01
//!        1       1   0.0   0.0   0.0   5.0   0.0   0.0
//! ";
//! let processed = ccx_intpt::process_str(raw)?;
//! assert!((processed.statistics.mises.max - 75.0_f64.sqrt()).abs() < 1e-12);
//! assert!(processed.statistics.eeq.mean.is_nan());
//! # Ok::<(), ccx_intpt::IntPtError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

pub mod error;
pub mod lines;
pub mod locator;
pub mod reduce;
pub mod report;
pub mod results;

pub use error::{IntPtError, Result};
pub use lines::{Line, tokenize};
pub use locator::{BlockKind, LocatedBlocks, LocatorWarning, locate};
pub use reduce::{
    ColumnStatistics, TensorComponents, aggregate, compute_effective_strain, compute_mises_stress,
    reduce_strain, reduce_stress,
};
pub use report::{output_path_for, render_report, write_report};
pub use results::{IntegrationPointResult, ResultStatistics, assemble, compute_statistics};

/// Everything derived from one `.dat` file.
#[derive(Debug, Clone)]
pub struct Processed {
    pub results: Vec<IntegrationPointResult>,
    pub statistics: ResultStatistics,
    pub warnings: Vec<LocatorWarning>,
}

/// Run the whole reduction on file content.
pub fn process_str(raw: &str) -> Result<Processed> {
    let lines = tokenize(raw);
    let blocks = locate(&lines)?;

    let mises = reduce_stress(&blocks.stress);
    let eeq = blocks.strain.as_deref().map(reduce_strain);
    let results = assemble(&mises, eeq.as_deref(), blocks.plastic_strain.as_deref())?;
    let statistics = compute_statistics(&results);

    Ok(Processed {
        results,
        statistics,
        warnings: blocks.warnings,
    })
}

pub fn process_file(path: impl AsRef<Path>) -> Result<Processed> {
    let raw = fs::read_to_string(path.as_ref())?;
    process_str(&raw)
}

/// Validate `input`, process it and write the report.
///
/// The report goes to `output` when given, otherwise next to the input as
/// `<job>_IntPtOutput.txt`. Returns the report path.
pub fn postprocess(input: &Path, output: Option<&Path>) -> Result<(PathBuf, Processed)> {
    let derived = output_path_for(input)?;
    let target = output.map_or(derived, Path::to_path_buf);
    let processed = process_file(input)?;
    write_report(&target, &processed.results, &processed.statistics)?;
    Ok((target, processed))
}
