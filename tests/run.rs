use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use molpredict::{io::ReaderOptions, run, Error, Outcome, RunOptions};

fn testfile(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testfiles").join(name)
}

fn options(
    model: &str,
    input: &str,
    output: &Path,
    reader: ReaderOptions,
) -> RunOptions {
    RunOptions {
        model_id: model.to_owned(),
        input: testfile(input),
        output: output.to_owned(),
        model_dir: testfile("models"),
        reader,
    }
}

fn id_column(col: &str) -> ReaderOptions {
    ReaderOptions {
        id_column: Some(col.to_owned()),
        ..Default::default()
    }
}

#[test]
fn smiles_regression() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.smi");
    let opts = options("solubility", "molecules.smi", &out, id_column("1"));
    let got = run(&opts).unwrap();
    assert_eq!(
        got,
        Outcome::Finished {
            written: 4,
            scanned: 5
        }
    );
    let want = "smiles\tid\tWater_Solubility_Prediction
CCO\tethanol\t1.5
c1ccccc1\tbenzene\t4
CC(=O)O\tacetic_acid\t1
CCN\tethylamine\t1.5
";
    assert_eq!(std::fs::read_to_string(&out).unwrap(), want);
}

#[test]
fn rerun_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.smi");
    let second = dir.path().join("second.smi");
    run(&options("solubility", "molecules.smi", &first, id_column("1")))
        .unwrap();
    run(&options("solubility", "molecules.smi", &second, id_column("1")))
        .unwrap();
    assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
}

#[test]
fn missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.smi");
    let opts = options("nonexistent", "molecules.smi", &out, Default::default());
    assert_eq!(run(&opts).unwrap(), Outcome::ModelNotFound);
    assert!(!out.exists());
}

#[test]
fn invalid_model() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.smi");
    let opts = options("broken", "molecules.smi", &out, Default::default());
    assert!(matches!(run(&opts), Err(Error::InvalidModel { .. })));
    assert!(!out.exists());
}

#[test]
fn missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.smi");
    let opts = options("solubility", "nope.smi", &out, Default::default());
    assert!(run(&opts).is_err_and(|e| e.is_not_found()));
}

#[test]
fn classifier_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let reader = ReaderOptions {
        delimiter: b',',
        read_header: true,
        id_column: Some("name".to_owned()),
        ..Default::default()
    };
    let opts = options("active", "header.csv", &out, reader);
    assert_eq!(
        run(&opts).unwrap(),
        Outcome::Finished {
            written: 2,
            scanned: 2
        }
    );

    let out = std::fs::read_to_string(out).unwrap();
    let rows: Vec<Vec<&str>> =
        out.lines().map(|l| l.split(',').collect()).collect();
    assert_eq!(
        rows[0],
        [
            "smiles",
            "id",
            "source",
            "Toy_Activity_Prediction",
            "Toy_Activity_Inactive",
            "Toy_Activity_Active",
            "Toy_Activity_DOA"
        ]
    );
    assert_eq!(rows[1][..4], ["CCO", "ethanol", "pubchem", "0"]);
    assert_eq!(rows[1][6], "True");
    assert_eq!(rows[2][..4], ["c1ccccc1", "benzene", "chembl", "1"]);
    assert_eq!(rows[2][6], "False");

    for row in &rows[1..] {
        let inactive: f64 = row[4].parse().unwrap();
        let active: f64 = row[5].parse().unwrap();
        assert_abs_diff_eq!(inactive + active, 1.0, epsilon = 1e-12);
    }
    let active: f64 = rows[1][5].parse().unwrap();
    assert_abs_diff_eq!(active, 1.0 / (1.0 + 1f64.exp()), epsilon = 1e-12);
}

#[test]
fn sdf_to_sdf() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.sdf");
    let opts = options("solubility", "molecules.sdf", &out, Default::default());
    assert_eq!(
        run(&opts).unwrap(),
        Outcome::Finished {
            written: 2,
            scanned: 3
        }
    );

    let out = std::fs::read_to_string(out).unwrap();
    let input = std::fs::read_to_string(testfile("molecules.sdf")).unwrap();
    let first_block = &input[..input.find("M  END\n").unwrap() + 7];
    assert!(out.starts_with(first_block));
    assert_eq!(out.matches("$$$$").count(), 2);
    assert!(out.contains(
        "> <MW>\n46.07\n\n> <Water_Solubility_Prediction>\n1.5\n\n$$$$\n"
    ));
    assert!(out.contains("acetate\n"));
    assert!(out.ends_with(
        "> <CHEMBL_ID>\nCHEMBL1\n\n> <Water_Solubility_Prediction>\n1\n\n$$$$\n"
    ));
}

#[test]
fn sdf_to_smiles() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.smi");
    let opts = options("solubility", "molecules.sdf", &out, Default::default());
    run(&opts).unwrap();
    let want = "smiles\tid\tCHEMBL_ID\tMW\tWater_Solubility_Prediction
CCO\tethanol\tCHEMBL545\t46.07\t1.5
CC(=O)[O-]\tacetate\tCHEMBL1\t\t1
";
    assert_eq!(std::fs::read_to_string(&out).unwrap(), want);
}

#[test]
fn smiles_to_sdf() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.sdf");
    let opts = options("solubility", "molecules.smi", &out, id_column("1"));
    run(&opts).unwrap();
    let out = std::fs::read_to_string(out).unwrap();
    assert_eq!(out.matches("$$$$").count(), 4);
    assert!(out.starts_with("ethanol\n"));
    assert!(out.contains("V2000"));
}
