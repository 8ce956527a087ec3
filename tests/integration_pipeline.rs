mod common;

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Local, Utc};
use fragment_tables::{
    CellValue, PipelineError, PipelineOptions, SummaryEntry, SummaryField, SummaryRecord,
    combined_summary_file_name, convert_fragments_file, write_combined_summary,
};
use serde_json::json;
use tempfile::tempdir;

fn find_combined_summary(dir: &Path) -> Option<PathBuf> {
    std::fs::read_dir(dir)
        .expect("output dir should be readable")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("combined_summary_"))
        })
}

#[test]
fn converts_single_table_to_csv() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("nanodrop.json");

    common::write_fragments_json(
        &input,
        &[(
            vec!["Sample Name", "ng/uL", "A260/A280"],
            vec![
                vec![json!("S1"), json!("4,141"), json!("1,98")],
                vec![json!("S2"), json!(12.5), json!(null)],
            ],
        )],
    )
    .expect("fragment fixture should be written");

    let report = convert_fragments_file(&input, dir.path(), &PipelineOptions::default())
        .expect("conversion should succeed");

    assert_eq!(report.table_count, 1);
    assert_eq!(report.row_count, 2);
    assert_eq!(report.outputs, vec![dir.path().join("nanodrop.csv")]);
    assert_eq!(report.message, "Successfully processed 1 table(s)");
    assert_eq!(report.summary.len(), 1);
    assert_eq!(report.summary[0].source, "nanodrop");

    let csv = std::fs::read_to_string(&report.outputs[0]).expect("CSV should be readable");
    assert_eq!(
        csv,
        "Sample Name,ng/uL,A260/A280\nS1,4.141,1.98\nS2,12.5,\n",
        "report: {report:?}"
    );
}

#[test]
fn writes_one_file_per_reconciled_table() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("plate.json");

    common::write_fragments_json(
        &input,
        &[
            (vec!["A", "B"], vec![vec![json!("1"), json!("2")]]),
            (vec!["A", "B"], vec![]),
            (vec!["A", "B"], vec![vec![json!("3"), json!("4")]]),
            (vec!["C", "D"], vec![vec![json!("5"), json!("6")]]),
        ],
    )
    .expect("fragment fixture should be written");

    let report = convert_fragments_file(&input, dir.path(), &PipelineOptions::default())
        .expect("conversion should succeed");

    assert_eq!(report.table_count, 2);
    assert_eq!(report.row_count, 3);
    assert_eq!(
        report.outputs,
        vec![
            dir.path().join("plate_Table_1.csv"),
            dir.path().join("plate_Table_2.csv"),
        ]
    );
    let first = std::fs::read_to_string(&report.outputs[0]).expect("CSV should be readable");
    assert_eq!(first, "A,B\n1,2\n3,4\n");
    assert!(report.summary.is_empty());
}

#[test]
fn reports_no_tables_for_empty_extraction() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("blank.json");
    common::write_fragments_json(&input, &[]).expect("fragment fixture should be written");

    let report = convert_fragments_file(&input, dir.path(), &PipelineOptions::default())
        .expect("conversion should succeed");

    assert!(!report.succeeded());
    assert_eq!(report.message, "No tables found in blank.json");
}

#[test]
fn rejects_malformed_fragment_file() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("broken.json");
    std::fs::write(&input, r#"[{"headers": ["A", "B"], "rows": [["only one"]]}]"#)
        .expect("fixture should be written");

    let err = convert_fragments_file(&input, dir.path(), &PipelineOptions::default())
        .expect_err("malformed fragments should fail");
    assert!(matches!(err, PipelineError::InvalidFragment { fragment: 0, .. }));
}

#[test]
fn cli_writes_tables_and_combined_summary() {
    let dir = tempdir().expect("tempdir should be created");
    let out = dir.path().join("out");
    let first = dir.path().join("run1.json");
    let second = dir.path().join("run2.json");

    common::write_fragments_json(
        &first,
        &[(vec!["Sample", "ng/ul"], vec![vec![json!("S1"), json!("4,141")]])],
    )
    .expect("fragment fixture should be written");
    common::write_fragments_json(
        &second,
        &[(vec!["Sample", "260/280"], vec![vec![json!("S2"), json!("173,0.71")]])],
    )
    .expect("fragment fixture should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_frag2csv"))
        .args([
            "convert",
            "-i",
            &first.to_string_lossy(),
            "-i",
            &second.to_string_lossy(),
            "-o",
            &out.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    assert!(out.join("run1.csv").exists());
    assert!(out.join("run2.csv").exists());

    let summary_path = find_combined_summary(&out).expect("combined summary should be written");
    let summary = std::fs::read_to_string(summary_path).expect("summary should be readable");
    assert_eq!(
        summary,
        "Source File,Sample,ng/ul,260/280\nrun1,S1,4.141,\nrun2,S2,,173.71\n"
    );
}

#[test]
fn cli_exits_with_code_2_when_no_tables() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("empty.json");
    common::write_fragments_json(&input, &[]).expect("fragment fixture should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_frag2csv"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &dir.path().join("out").to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_keeps_documents_that_share_a_file_stem() {
    let dir = tempdir().expect("tempdir should be created");
    let out = dir.path().join("out");
    let first = dir.path().join("a").join("run.json");
    let second = dir.path().join("b").join("run.json");
    std::fs::create_dir_all(first.parent().expect("has parent")).expect("dir a");
    std::fs::create_dir_all(second.parent().expect("has parent")).expect("dir b");

    common::write_fragments_json(&first, &[(vec!["Sample"], vec![vec![json!("FROM_A")]])])
        .expect("fragment fixture should be written");
    common::write_fragments_json(&second, &[(vec!["Sample"], vec![vec![json!("FROM_B")]])])
        .expect("fragment fixture should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_frag2csv"))
        .args([
            "convert",
            "-i",
            &first.to_string_lossy(),
            "-i",
            &second.to_string_lossy(),
            "-o",
            &out.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let first_csv = std::fs::read_to_string(out.join("run.csv")).expect("run.csv should exist");
    let second_csv =
        std::fs::read_to_string(out.join("run_2.csv")).expect("run_2.csv should exist");
    assert_eq!(first_csv, "Sample\nFROM_A\n");
    assert_eq!(second_csv, "Sample\nFROM_B\n");

    let summary_path = find_combined_summary(&out).expect("combined summary should be written");
    let summary = std::fs::read_to_string(summary_path).expect("summary should be readable");
    assert_eq!(summary, "Source File,Sample\nrun,FROM_A\nrun_2,FROM_B\n");
}

#[test]
fn cli_no_summary_skips_combined_summary() {
    let dir = tempdir().expect("tempdir should be created");
    let out = dir.path().join("out");
    let input = dir.path().join("run.json");
    common::write_fragments_json(
        &input,
        &[(vec!["Sample", "ng/ul"], vec![vec![json!("S1"), json!("4,141")]])],
    )
    .expect("fragment fixture should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_frag2csv"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &out.to_string_lossy(),
            "--no-summary",
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(0));
    assert!(out.join("run.csv").exists());
    assert_eq!(find_combined_summary(&out), None);
}

#[test]
fn cli_applies_delimiter_and_continuation_prefix() {
    let dir = tempdir().expect("tempdir should be created");
    let out = dir.path().join("out");
    let input = dir.path().join("run.json");
    common::write_fragments_json(
        &input,
        &[
            (vec!["Sample", "ng/ul"], vec![vec![json!("S1"), json!("4,141")]]),
            (vec!["cont_0", "cont_1"], vec![vec![json!("S2"), json!("5,5")]]),
        ],
    )
    .expect("fragment fixture should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_frag2csv"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &out.to_string_lossy(),
            "--delimiter",
            ";",
            "--continuation-prefix",
            "cont_",
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let table = std::fs::read_to_string(out.join("run.csv")).expect("run.csv should exist");
    assert_eq!(table, "Sample;ng/ul\nS1;4.141\nS2;5.5\n");

    let summary_path = find_combined_summary(&out).expect("combined summary should be written");
    let summary = std::fs::read_to_string(summary_path).expect("summary should be readable");
    assert_eq!(summary, "Source File;Sample;ng/ul\nrun;S1;4.141\nrun;S2;5.5\n");
}

#[test]
fn cli_rejects_empty_continuation_prefix() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("run.json");
    common::write_fragments_json(&input, &[(vec!["A"], vec![vec![json!("1")]])])
        .expect("fragment fixture should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_frag2csv"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &dir.path().join("out").to_string_lossy(),
            "--continuation-prefix",
            "",
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(1));
}

#[test]
fn combined_summary_is_named_after_the_options_stamp() {
    let dir = tempdir().expect("tempdir should be created");
    let stamp = "2026-03-09T14:05:07Z"
        .parse::<DateTime<Utc>>()
        .expect("valid datetime")
        .with_timezone(&Local);
    let options = PipelineOptions {
        summary_stamp: stamp,
        ..PipelineOptions::default()
    };
    let records = vec![SummaryRecord {
        source: "doc1".to_string(),
        fields: vec![SummaryField::Concentration],
        entries: vec![SummaryEntry {
            concentration: Some(CellValue::Number(4.141)),
            ..SummaryEntry::default()
        }],
    }];

    let path = write_combined_summary(dir.path(), &records, &options)
        .expect("summary should be written");

    assert_eq!(path, dir.path().join(combined_summary_file_name(&stamp)));
    let summary = std::fs::read_to_string(&path).expect("summary should be readable");
    assert_eq!(summary, "Source File,ng/ul\ndoc1,4.141\n");
}
