//! Per-integration-point result rows and their statistics.

use serde::Serialize;

use crate::error::{IntPtError, Result};
use crate::locator::BlockKind;
use crate::reduce::{ColumnStatistics, PlasticStrainRow, ReducedRow, aggregate};

/// Results for a single integration point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationPointResult {
    pub element_id: i32,
    pub point_id: i32,
    /// Mises equivalent stress
    pub mises: f64,
    /// Total effective strain
    pub eeq: f64,
    /// Equivalent plastic strain
    pub peeq: f64,
}

/// Stack the reduced columns side by side.
///
/// Rows correspond by position; ids are taken from the stress block. An
/// absent block contributes a NaN column of the stress block's length.
///
/// # Errors
/// `RowCountMismatch` if a present block has a different number of rows
/// than the stress block.
pub fn assemble(
    mises: &[ReducedRow],
    eeq: Option<&[ReducedRow]>,
    peeq: Option<&[PlasticStrainRow]>,
) -> Result<Vec<IntegrationPointResult>> {
    let expected = mises.len();
    let check = |kind: BlockKind, found: usize| {
        if found == expected {
            Ok(())
        } else {
            Err(IntPtError::RowCountMismatch {
                block: kind.label(),
                expected,
                found,
            })
        }
    };
    if let Some(rows) = eeq {
        check(BlockKind::Strain, rows.len())?;
    }
    if let Some(rows) = peeq {
        check(BlockKind::PlasticStrain, rows.len())?;
    }

    Ok(mises
        .iter()
        .enumerate()
        .map(|(i, s)| IntegrationPointResult {
            element_id: s.element_id,
            point_id: s.point_id,
            mises: s.value,
            eeq: eeq.map_or(f64::NAN, |rows| rows[i].value),
            peeq: peeq.map_or(f64::NAN, |rows| rows[i].value),
        })
        .collect())
}

/// Statistical summary of results
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultStatistics {
    pub mises: ColumnStatistics,
    pub eeq: ColumnStatistics,
    pub peeq: ColumnStatistics,
}

pub fn compute_statistics(results: &[IntegrationPointResult]) -> ResultStatistics {
    let column = |f: fn(&IntegrationPointResult) -> f64| {
        aggregate(&results.iter().map(f).collect::<Vec<_>>())
    };
    ResultStatistics {
        mises: column(|r| r.mises),
        eeq: column(|r| r.eeq),
        peeq: column(|r| r.peeq),
    }
}
