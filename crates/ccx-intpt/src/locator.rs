//! Locates the element output blocks in a `.dat` file.
//!
//! A `.dat` file carries no length fields or delimiters: each block is a
//! header line followed by numeric rows, and blocks follow each other in
//! whatever order the `*EL PRINT` request produced them, mixed with solver
//! banners (`S T E P`, `INCREMENT`, other output variables). A block runs
//! from its header to the nearest following header by file position, no
//! matter whether that header is one we recognize.
//!
//! ```
//! use ccx_intpt::lines::tokenize;
//! use ccx_intpt::locator::locate;
//!
//! let raw = "
//!  stresses (elem, integ.pnt.,sxx,syy,szz,sxy,sxz,syz) for set EALL
//!        1       1   1.0E+02   0.0   0.0   0.0   0.0   0.0
//!  displacements (vx,vy,vz) for set NALL
//!        4   1.0E-03   0.0   0.0
//! ";
//! let blocks = locate(&tokenize(raw))?;
//! assert_eq!(blocks.stress.len(), 1);
//! assert!(blocks.strain.is_none());
//! # Ok::<(), ccx_intpt::IntPtError>(())
//! ```

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::error::{IntPtError, Result};
use crate::lines::Line;
use crate::reduce::{PlasticStrainRow, TensorComponents, TensorRow};

/// Element output blocks the reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Stress,
    Strain,
    PlasticStrain,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::Stress, BlockKind::Strain, BlockKind::PlasticStrain];

    /// Joined first three tokens of the block header.
    pub fn key(self) -> &'static str {
        match self {
            BlockKind::Stress => "stresses (elem, integ.pnt.,sxx,syy,szz,sxy,sxz,syz)",
            BlockKind::Strain => "strains (elem, integ.pnt.,exx,eyy,ezz,exy,exz,eyz)",
            BlockKind::PlasticStrain => "equivalent plastic strain",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Output variable name as used on the `*EL PRINT` card.
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Stress => "S",
            BlockKind::Strain => "E",
            BlockKind::PlasticStrain => "PEEQ",
        }
    }

    /// Token count of one data row: element, integration point, values.
    pub fn columns(self) -> usize {
        match self {
            BlockKind::Stress | BlockKind::Strain => 8,
            BlockKind::PlasticStrain => 3,
        }
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockKind::Stress => "Stress",
            BlockKind::Strain => "Strain",
            BlockKind::PlasticStrain => "Equivalent plastic strain",
        };
        write!(f, "{name} output {}", self.label())
    }
}

/// A header line and where it sits in the line sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMark {
    /// Index into the tokenized line sequence
    pub position: usize,
    /// 1-based source line number
    pub line: usize,
    /// `None` for headers we do not read but which still end a block
    pub kind: Option<BlockKind>,
}

/// Non-fatal findings while locating blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum LocatorWarning {
    OptionalBlockAbsent {
        block: BlockKind,
    },
    DuplicateHeader {
        block: BlockKind,
        line: usize,
        first_line: usize,
    },
}

impl Display for LocatorWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LocatorWarning::OptionalBlockAbsent { block } => write!(f, "{block} not found."),
            LocatorWarning::DuplicateHeader {
                block,
                line,
                first_line,
            } => write!(
                f,
                "{block} repeated on line {line}; using the block on line {first_line}."
            ),
        }
    }
}

/// Raw rows of the recognized blocks.
#[derive(Debug, Clone, Default)]
pub struct LocatedBlocks {
    pub stress: Vec<TensorRow>,
    pub strain: Option<Vec<TensorRow>>,
    pub plastic_strain: Option<Vec<PlasticStrainRow>>,
    pub warnings: Vec<LocatorWarning>,
}

/// Every header line in file order, recognized or not.
pub fn header_marks(lines: &[Line]) -> Vec<HeaderMark> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.is_header())
        .map(|(position, line)| HeaderMark {
            position,
            line: line.number,
            kind: BlockKind::from_key(&line.header_key()),
        })
        .collect()
}

/// End position (exclusive) of the block whose header sits at `position`:
/// the smallest header position strictly greater than it, or `len`.
pub fn block_end(marks: &[HeaderMark], position: usize, len: usize) -> usize {
    marks
        .iter()
        .map(|mark| mark.position)
        .filter(|&p| p > position)
        .min()
        .unwrap_or(len)
}

/// Find the stress, strain and plastic strain blocks and parse their rows.
///
/// # Errors
/// `MissingRequiredBlock` without a stress header, `MalformedRow` for a data
/// row that does not parse.
pub fn locate(lines: &[Line]) -> Result<LocatedBlocks> {
    let marks = header_marks(lines);
    let mut warnings = Vec::new();

    let first = |kind: BlockKind| marks.iter().find(|mark| mark.kind == Some(kind));

    for kind in BlockKind::ALL {
        let Some(head) = first(kind) else { continue };
        for dup in marks
            .iter()
            .filter(|mark| mark.kind == Some(kind) && mark.position != head.position)
        {
            tracing::warn!(block = %kind, line = dup.line, "duplicate block header ignored");
            warnings.push(LocatorWarning::DuplicateHeader {
                block: kind,
                line: dup.line,
                first_line: head.line,
            });
        }
    }

    let stress_mark = first(BlockKind::Stress).ok_or(IntPtError::MissingRequiredBlock {
        header: BlockKind::Stress.key(),
    })?;
    let stress = parse_block(block_body(lines, &marks, stress_mark), parse_tensor_row)?;

    let mut optional = |kind: BlockKind| {
        let mark = first(kind);
        if mark.is_none() {
            tracing::warn!(block = %kind, "optional block absent");
            warnings.push(LocatorWarning::OptionalBlockAbsent { block: kind });
        }
        mark
    };
    let strain_mark = optional(BlockKind::Strain);
    let peeq_mark = optional(BlockKind::PlasticStrain);

    let strain = strain_mark
        .map(|mark| parse_block(block_body(lines, &marks, mark), parse_tensor_row))
        .transpose()?;
    let plastic_strain = peeq_mark
        .map(|mark| parse_block(block_body(lines, &marks, mark), parse_plastic_row))
        .transpose()?;

    Ok(LocatedBlocks {
        stress,
        strain,
        plastic_strain,
        warnings,
    })
}

fn block_body<'a>(lines: &'a [Line], marks: &[HeaderMark], mark: &HeaderMark) -> &'a [Line] {
    let end = block_end(marks, mark.position, lines.len());
    let body = &lines[mark.position + 1..end];
    tracing::debug!(
        header_line = mark.line,
        rows = body.len(),
        "located {:?} block",
        mark.kind
    );
    body
}

fn parse_block<T>(body: &[Line], parse: fn(&Line) -> Result<T>) -> Result<Vec<T>> {
    body.iter().filter(|line| line.is_data()).map(parse).collect()
}

fn check_width(line: &Line, expected: usize) -> Result<()> {
    if line.tokens.len() != expected {
        return Err(IntPtError::MalformedRow {
            line: line.number,
            message: format!("expected {expected} columns, found {}", line.tokens.len()),
        });
    }
    Ok(())
}

fn parse_id(line: &Line, idx: usize) -> Result<i32> {
    let token = &line.tokens[idx];
    token.parse::<i32>().map_err(|e| IntPtError::MalformedRow {
        line: line.number,
        message: format!("column {}: '{token}' is not an integer id: {e}", idx + 1),
    })
}

fn parse_value(line: &Line, idx: usize) -> Result<f64> {
    let token = &line.tokens[idx];
    token.parse::<f64>().map_err(|e| IntPtError::MalformedRow {
        line: line.number,
        message: format!("column {}: '{token}' is not a number: {e}", idx + 1),
    })
}

fn parse_tensor_row(line: &Line) -> Result<TensorRow> {
    check_width(line, BlockKind::Stress.columns())?;
    let mut c = [0.0; 6];
    for (i, slot) in c.iter_mut().enumerate() {
        *slot = parse_value(line, i + 2)?;
    }
    Ok(TensorRow {
        element_id: parse_id(line, 0)?,
        point_id: parse_id(line, 1)?,
        tensor: TensorComponents::from_columns(c),
    })
}

fn parse_plastic_row(line: &Line) -> Result<PlasticStrainRow> {
    check_width(line, BlockKind::PlasticStrain.columns())?;
    Ok(PlasticStrainRow {
        element_id: parse_id(line, 0)?,
        point_id: parse_id(line, 1)?,
        value: parse_value(line, 2)?,
    })
}
