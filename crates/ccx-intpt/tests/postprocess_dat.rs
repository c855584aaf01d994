use std::fs;

use ccx_intpt::{BlockKind, IntPtError, LocatorWarning, locate, postprocess, process_str, tokenize};
use proptest::prelude::*;

const STRESS_HEADER: &str =
    " stresses (elem, integ.pnt.,sxx,syy,szz,sxy,sxz,syz) for set EALL and time  0.1000000E+01";
const STRAIN_HEADER: &str =
    " strains (elem, integ.pnt.,exx,eyy,ezz,exy,exz,eyz) for set EALL and time  0.1000000E+01";
const PEEQ_HEADER: &str =
    " equivalent plastic strain (elem, integ.pnt.,pe)for set EALL and time  0.1000000E+01";

const FULL_DAT: &str = r#"

                        S T E P       1


                                INCREMENT     1


 stresses (elem, integ.pnt.,sxx,syy,szz,sxy,sxz,syz) for set EALL and time  0.1000000E+01

       1       1  1.0000E+02  5.0000E+01  3.0000E+01  1.0000E+01  5.0000E+00  3.0000E+00
       1       2  1.2000E+02  6.0000E+01  4.0000E+01  1.2000E+01  6.0000E+00  4.0000E+00
       2       1  8.0000E+01  4.0000E+01  2.0000E+01  8.0000E+00  4.0000E+00  2.0000E+00

 strains (elem, integ.pnt.,exx,eyy,ezz,exy,exz,eyz) for set EALL and time  0.1000000E+01

       1       1  1.0000E-03  5.0000E-04  3.0000E-04  1.0000E-04  5.0000E-05  3.0000E-05
       1       2  1.2000E-03  6.0000E-04  4.0000E-04  1.2000E-04  6.0000E-05  4.0000E-05
       2       1  8.0000E-04  4.0000E-04  2.0000E-04  8.0000E-05  4.0000E-05  2.0000E-05

 equivalent plastic strain (elem, integ.pnt.,pe)for set EALL and time  0.1000000E+01

       1       1  0.0000E+00
       1       2  1.0000E-04
       2       1  0.0000E+00
"#;

#[test]
fn reads_all_three_blocks() {
    let processed = process_str(FULL_DAT).expect("full .dat should process");
    assert_eq!(processed.results.len(), 3);
    assert!(processed.warnings.is_empty());

    let first = processed.results[0];
    assert_eq!((first.element_id, first.point_id), (1, 1));
    assert!((first.mises - 4302.0_f64.sqrt()).abs() < 1e-10);
    assert!(first.eeq > 0.0);
    assert_eq!(processed.results[1].peeq, 1.0e-4);

    let stats = processed.statistics;
    assert_eq!(stats.peeq.min, 0.0);
    assert_eq!(stats.peeq.max, 1.0e-4);
    assert!(stats.mises.min < stats.mises.mean && stats.mises.mean < stats.mises.max);
}

#[test]
fn stress_only_round_trip() {
    let raw = format!(
        "{STRESS_HEADER}\n\
         \x20      1       1  10.0  10.0  10.0  0.0  0.0  0.0\n\
         \x20      1       2  20.0   0.0   0.0  0.0  0.0  0.0\n\
         \x20      2       1   0.0   0.0   0.0  5.0  0.0  0.0\n"
    );
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("stress_only.dat");
    fs::write(&input, raw).expect("write input");

    let (output, processed) = postprocess(&input, None).expect("postprocess");
    assert_eq!(output, dir.path().join("stress_only_IntPtOutput.txt"));

    let mises: Vec<f64> = processed.results.iter().map(|r| r.mises).collect();
    assert_eq!(mises[0], 0.0);
    assert!((mises[1] - 20.0).abs() < 1e-12);
    assert!((mises[2] - 75.0_f64.sqrt()).abs() < 1e-12);
    assert!(processed.results.iter().all(|r| r.eeq.is_nan() && r.peeq.is_nan()));

    assert_eq!(
        processed.warnings,
        vec![
            LocatorWarning::OptionalBlockAbsent {
                block: BlockKind::Strain
            },
            LocatorWarning::OptionalBlockAbsent {
                block: BlockKind::PlasticStrain
            },
        ]
    );

    let text = fs::read_to_string(&output).expect("read report");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 9);
    assert!(lines[0].contains("MISES") && lines[0].contains("PEEQ"));
    assert_eq!(
        lines[3],
        "           2        1      8.6603e+00              nan              nan"
    );
    assert_eq!(
        lines[5],
        "     Minimum               0.0000e+00              nan              nan"
    );
    assert_eq!(
        lines[6],
        "     Maximum               2.0000e+01              nan              nan"
    );
    // (0 + 20 + 8.660254) / 3
    assert_eq!(
        lines[7],
        "     Mean (arith.)         9.5534e+00              nan              nan"
    );
}

#[test]
fn explicit_output_path_is_used() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("job.dat");
    fs::write(&input, FULL_DAT).expect("write input");
    let target = dir.path().join("custom.txt");

    let (output, _) = postprocess(&input, Some(&target)).expect("postprocess");
    assert_eq!(output, target);
    assert!(target.exists());
    assert!(!dir.path().join("job_IntPtOutput.txt").exists());
}

#[test]
fn invalid_suffix_is_rejected_before_reading() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("job.frd");
    let err = postprocess(&input, None).expect_err("must reject .frd");
    assert!(matches!(err, IntPtError::InvalidInputPath { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = postprocess(&dir.path().join("absent.dat"), None).expect_err("no such file");
    assert!(matches!(err, IntPtError::Io(_)));
}

#[test]
fn missing_stress_block_is_fatal() {
    let raw = format!("{STRAIN_HEADER}\n  1  1  0.001  0.0  0.0  0.0  0.0  0.0\n");
    let err = process_str(&raw).expect_err("stress is required");
    assert!(matches!(err, IntPtError::MissingRequiredBlock { .. }));
}

#[test]
fn malformed_data_row_is_fatal() {
    let raw = format!("{STRESS_HEADER}\n  1  1  1.0E+02  x  0.0  0.0  0.0  0.0\n");
    let err = process_str(&raw).expect_err("malformed row");
    assert!(matches!(err, IntPtError::MalformedRow { line: 2, .. }));
}

#[test]
fn unrecognized_header_between_blocks_terminates_stress() {
    let raw = format!(
        "{STRESS_HEADER}\n  1  1  1.0  0.0  0.0  0.0  0.0  0.0\n\
         \x20displacements (vx,vy,vz) for set NALL and time  0.1000000E+01\n\
         \x20 5  1.0E-02  0.0  0.0\n  6  2.0E-02  0.0  0.0\n  7  3.0E-02  0.0  0.0\n\
         {PEEQ_HEADER}\n  1  1  4.0E-03\n"
    );
    let processed = process_str(&raw).expect("should process");
    assert_eq!(processed.results.len(), 1);
    assert_eq!(processed.results[0].peeq, 4.0e-3);
}

#[test]
fn missing_strain_leaves_mises_and_peeq_untouched() {
    let raw = format!(
        "{STRESS_HEADER}\n\
         \x20 1  1  20.0  0.0  0.0  0.0  0.0  0.0\n\
         \x20 1  2   0.0  0.0  0.0  5.0  0.0  0.0\n\
         {PEEQ_HEADER}\n  1  1  2.0E-03\n  1  2  4.0E-03\n"
    );
    let processed = process_str(&raw).expect("should process");

    assert!(processed.results.iter().all(|r| r.eeq.is_nan()));
    assert!(processed.statistics.eeq.is_nan());

    let peeq: Vec<f64> = processed.results.iter().map(|r| r.peeq).collect();
    assert_eq!(peeq, vec![2.0e-3, 4.0e-3]);
    assert_eq!(processed.statistics.peeq.min, 2.0e-3);
    assert_eq!(processed.statistics.peeq.max, 4.0e-3);
    assert!((processed.statistics.peeq.mean - 3.0e-3).abs() < 1e-15);

    assert_eq!(processed.statistics.mises.max, 20.0);
    assert!((processed.statistics.mises.min - 75.0_f64.sqrt()).abs() < 1e-12);

    assert_eq!(
        processed.warnings,
        vec![LocatorWarning::OptionalBlockAbsent {
            block: BlockKind::Strain
        }]
    );
}

#[test]
fn plastic_strain_count_must_match_stress() {
    let raw = format!(
        "{STRESS_HEADER}\n  1  1  1.0  0.0  0.0  0.0  0.0  0.0\n  1  2  1.0  0.0  0.0  0.0  0.0  0.0\n\
         {PEEQ_HEADER}\n  1  1  4.0E-03\n"
    );
    let err = process_str(&raw).expect_err("row counts differ");
    assert!(matches!(
        err,
        IntPtError::RowCountMismatch {
            block: "PEEQ",
            expected: 2,
            found: 1
        }
    ));
}

fn tensor_block(header: &str, rows: usize, scale: f64) -> String {
    let mut out = format!("{header}\n\n");
    for i in 0..rows {
        out.push_str(&format!(
            "{:8}{:8}  {:.4E}  0.0  0.0  0.0  0.0  0.0\n",
            i / 4 + 1,
            i % 4 + 1,
            scale * (i + 1) as f64
        ));
    }
    out
}

fn peeq_block(rows: usize) -> String {
    let mut out = format!("{PEEQ_HEADER}\n\n");
    for i in 0..rows {
        out.push_str(&format!("{:8}{:8}  {:.4E}\n", i / 4 + 1, i % 4 + 1, 1.0e-3 * i as f64));
    }
    out
}

const ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

proptest! {
    /// Row counts and contents survive any block order, with or without
    /// foreign headers in between.
    #[test]
    fn block_order_does_not_matter(
        ns in 0usize..9,
        ne in 0usize..9,
        np in 0usize..9,
        order in 0usize..6,
        banners in any::<[bool; 3]>(),
    ) {
        let blocks = [
            tensor_block(STRESS_HEADER, ns, 100.0),
            tensor_block(STRAIN_HEADER, ne, 1.0e-3),
            peeq_block(np),
        ];
        let mut raw = String::from("\n S T E P       1\n\n");
        for (slot, &idx) in ORDERS[order].iter().enumerate() {
            raw.push_str(&blocks[idx]);
            if banners[slot] {
                raw.push_str(" element variables (elem, integ.pnt.,sdv1)\n  9  1  1.0\n  9  2  2.0\n");
            }
        }

        let located = locate(&tokenize(&raw)).expect("generated input is well formed");
        prop_assert_eq!(located.stress.len(), ns);
        let strain = located.strain.expect("strain present");
        prop_assert_eq!(strain.len(), ne);
        let peeq = located.plastic_strain.expect("peeq present");
        prop_assert_eq!(peeq.len(), np);

        for (i, row) in located.stress.iter().enumerate() {
            prop_assert!((row.tensor.xx - 100.0 * (i + 1) as f64).abs() < 1e-9);
        }
        for (i, row) in strain.iter().enumerate() {
            prop_assert!((row.tensor.xx - 1.0e-3 * (i + 1) as f64).abs() < 1e-12);
        }
        prop_assert!(located.warnings.is_empty());
    }
}
