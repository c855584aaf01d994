//! Tensor-to-scalar reduction and column statistics.
//!
//! Stress and strain rows carry the six Voigt components in CalculiX
//! order (xx, yy, zz, xy, xz, yz). Each row is reduced to one scalar while
//! the element and integration point numbers pass through unchanged.
//!
//! ```
//! use ccx_intpt::reduce::{compute_mises_stress, TensorComponents};
//!
//! let stress = TensorComponents {
//!     xx: 100.0, yy: 50.0, zz: 30.0,
//!     xy: 10.0, xz: 5.0, yz: 3.0,
//! };
//! assert!((compute_mises_stress(&stress) - 4302.0_f64.sqrt()).abs() < 1e-10);
//! ```

use serde::Serialize;

/// Stress or strain tensor components (Voigt notation)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TensorComponents {
    pub xx: f64,
    pub yy: f64,
    pub zz: f64,
    pub xy: f64,
    pub xz: f64,
    pub yz: f64,
}

impl TensorComponents {
    /// Build from the six values in file column order.
    pub fn from_columns(c: [f64; 6]) -> Self {
        Self {
            xx: c[0],
            yy: c[1],
            zz: c[2],
            xy: c[3],
            xz: c[4],
            yz: c[5],
        }
    }
}

/// One stress or strain data row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorRow {
    pub element_id: i32,
    pub point_id: i32,
    pub tensor: TensorComponents,
}

/// One equivalent plastic strain data row; already a scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlasticStrainRow {
    pub element_id: i32,
    pub point_id: i32,
    pub value: f64,
}

/// A row after reduction to a single scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducedRow {
    pub element_id: i32,
    pub point_id: i32,
    pub value: f64,
}

/// Common part of both equivalent measures:
/// sqrt(0.5 * [(xx - yy)² + (yy - zz)² + (zz - xx)²] + 3 * [xy² + xz² + yz²])
fn deviatoric_norm(t: &TensorComponents) -> f64 {
    let normal = 0.5 * ((t.xx - t.yy).powi(2) + (t.yy - t.zz).powi(2) + (t.zz - t.xx).powi(2));
    let shear = 3.0 * (t.xy.powi(2) + t.xz.powi(2) + t.yz.powi(2));
    (normal + shear).sqrt()
}

/// Mises equivalent stress.
pub fn compute_mises_stress(stress: &TensorComponents) -> f64 {
    deviatoric_norm(stress)
}

/// Total effective strain, (2/3) times the deviatoric norm of the strain tensor.
pub fn compute_effective_strain(strain: &TensorComponents) -> f64 {
    (2.0 / 3.0) * deviatoric_norm(strain)
}

fn reduce_with(rows: &[TensorRow], f: fn(&TensorComponents) -> f64) -> Vec<ReducedRow> {
    rows.iter()
        .map(|row| ReducedRow {
            element_id: row.element_id,
            point_id: row.point_id,
            value: f(&row.tensor),
        })
        .collect()
}

pub fn reduce_stress(rows: &[TensorRow]) -> Vec<ReducedRow> {
    reduce_with(rows, compute_mises_stress)
}

pub fn reduce_strain(rows: &[TensorRow]) -> Vec<ReducedRow> {
    reduce_with(rows, compute_effective_strain)
}

/// Minimum, maximum and arithmetic mean of one result column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ColumnStatistics {
    pub const NAN: Self = Self {
        min: f64::NAN,
        max: f64::NAN,
        mean: f64::NAN,
    };

    pub fn is_nan(&self) -> bool {
        self.min.is_nan() && self.max.is_nan() && self.mean.is_nan()
    }
}

/// Column statistics with NaN propagation.
///
/// A single NaN entry makes all three statistics NaN, so a missing block
/// shows up as `nan` in the report instead of being skipped. An empty
/// column also yields NaN.
pub fn aggregate(values: &[f64]) -> ColumnStatistics {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return ColumnStatistics::NAN;
    }
    // f64::min/max ignore NaN, which is safe only after the check above
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    ColumnStatistics { min, max, mean }
}
