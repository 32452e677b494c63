//! Behavior-driven tests for the file sink
//!
//! These tests verify HOW tables land on disk: naming, encodings, empty-data
//! handling, and directory maintenance.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use akstock_core::{DataDir, DataDirs, FileFormat, FileSink, FileType, SinkError, Table};
use serde_json::{json, Value};

fn sample_table() -> Table {
    let mut table = Table::new(["股票代码", "股票名称", "毛利率", "备注"]);
    table.push_row(vec![json!("600519"), json!("贵州茅台"), json!(91.96), Value::Null]);
    table.push_row(vec![json!("000001"), json!("平安银行"), json!(30.5), json!("含,逗号")]);
    table
}

fn sink_in(root: &Path) -> FileSink {
    let dirs = DataDirs::new(root);
    dirs.ensure().expect("directories created");
    FileSink::new(dirs)
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

fn age(path: &Path, days: u64) {
    let file = fs::File::options().write(true).open(path).expect("open file");
    let past = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    file.set_modified(past).expect("set mtime");
}

// =============================================================================
// Sink: Naming
// =============================================================================

#[test]
fn when_no_output_path_is_given_file_lands_in_type_directory_with_generated_name() {
    // Given: A sink rooted in a temp directory
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());

    // When: A table is saved as an export for one symbol
    let file = sink
        .save_table(&sample_table(), FileType::Export, &["600519"], FileFormat::Csv, None)
        .expect("saved");

    // Then: The file follows export_{symbol}_{stamp}.csv in data/exports
    assert_eq!(file.path.parent(), Some(sink.dirs().exports()));
    let name = file.path.file_name().expect("name").to_string_lossy().into_owned();
    assert!(name.starts_with("export_600519_"), "unexpected name {name}");
    assert!(name.ends_with(".csv"));
    // export_ + 600519_ + yyyyMMdd_HHmmss + .csv
    assert_eq!(name.len(), "export_600519_".len() + 15 + ".csv".len());
    assert_eq!(file.record_count, 2);
}

#[test]
fn when_many_symbols_are_saved_name_summarises_them() {
    // Given: A sink
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());

    // When: A batch of five symbols is saved as json
    let symbols = ["000001", "000002", "600519", "600000", "600036"];
    let file = sink
        .save_table(&sample_table(), FileType::Batch, &symbols, FileFormat::Json, None)
        .expect("saved");

    // Then: The name collapses the list
    let name = file.path.file_name().expect("name").to_string_lossy().into_owned();
    assert!(name.starts_with("batch_000001_and_4_more_"), "unexpected name {name}");
    assert!(name.ends_with(".json"));
    assert_eq!(file.path.parent(), Some(sink.dirs().batch()));
}

#[test]
fn when_output_path_is_given_file_is_written_exactly_there() {
    // Given: An explicit path inside a directory that does not exist yet
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());
    let target = root.path().join("nested/out/report.xlsx");

    // When: The table is saved as excel
    let file = sink
        .save_table(
            &sample_table(),
            FileType::Export,
            &["600519"],
            FileFormat::Excel,
            Some(&target),
        )
        .expect("saved");

    // Then: The file exists at that path and is a zip-based workbook
    assert_eq!(file.path, target);
    let bytes = fs::read(&target).expect("readable");
    assert_eq!(&bytes[..2], b"PK");
    assert_eq!(file.size_bytes, bytes.len() as u64);
}

// =============================================================================
// Sink: Encodings
// =============================================================================

#[test]
fn when_saving_csv_file_starts_with_bom_and_keeps_native_script() {
    // Given: A sink
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());

    // When: The table is saved as csv
    let file = sink
        .save_table(&sample_table(), FileType::Cache, &["600519"], FileFormat::Csv, None)
        .expect("saved");

    // Then: BOM, header row, no index column, quoted comma, empty null
    let bytes = fs::read(&file.path).expect("readable");
    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
    let text = String::from_utf8(bytes[3..].to_vec()).expect("utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "股票代码,股票名称,毛利率,备注");
    assert_eq!(lines[1], "600519,贵州茅台,91.96,");
    assert_eq!(lines[2], "000001,平安银行,30.5,\"含,逗号\"");
}

#[test]
fn when_saving_json_records_are_pretty_and_unescaped() {
    // Given: A sink
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());

    // When: The table is saved as json
    let file = sink
        .save_table(&sample_table(), FileType::Export, &["600519"], FileFormat::Json, None)
        .expect("saved");

    // Then: It is an array of records with native script intact
    let text = fs::read_to_string(&file.path).expect("readable");
    assert!(text.contains("贵州茅台"));
    assert!(text.contains('\n'));
    let records: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(records[0]["股票代码"], json!("600519"));
    assert_eq!(records[0]["备注"], Value::Null);
    assert_eq!(records.as_array().map(Vec::len), Some(2));
}

#[test]
fn when_saving_a_json_document_it_uses_the_same_naming_rules() {
    // Given: A sink
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());

    // When: An arbitrary document is saved
    let file = sink
        .save_json(&json!({"总数": 3}), FileType::Cache, &[] as &[&str], None)
        .expect("saved");

    // Then: The name uses the data summary and the content round-trips
    let name = file.path.file_name().expect("name").to_string_lossy().into_owned();
    assert!(name.starts_with("cache_data_"));
    let text = fs::read_to_string(&file.path).expect("readable");
    assert!(text.contains("总数"));
}

// =============================================================================
// Sink: Rejections
// =============================================================================

#[test]
fn when_table_is_empty_nothing_is_written() {
    // Given: A sink and an empty table
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());

    // When: The empty table is saved
    let result = sink.save_table(
        &Table::new(["股票代码"]),
        FileType::Export,
        &["600519"],
        FileFormat::Csv,
        None,
    );

    // Then: EmptyData and the exports directory stays empty
    assert_eq!(result, Err(SinkError::EmptyData));
    assert!(files_in(sink.dirs().exports()).is_empty());
}

#[test]
fn when_format_is_unknown_nothing_is_written() {
    // Given: A sink and an explicit target
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());
    let target = root.path().join("out.parquet");

    // When: An unsupported format is requested by name
    let result = sink.save_table_as(
        &sample_table(),
        FileType::Export,
        &["600519"],
        "parquet",
        Some(&target),
    );

    // Then: UnsupportedFormat and no file
    assert!(matches!(result, Err(SinkError::UnsupportedFormat { .. })));
    assert!(!target.exists());
}

#[test]
fn when_the_target_parent_is_a_file_write_fails() {
    // Given: A regular file where the parent directory should be
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());
    let blocker = root.path().join("blocker");
    fs::write(&blocker, "x").expect("write");
    let target = blocker.join("report.csv");

    // When: The table is saved under it
    let result = sink.save_table(
        &sample_table(),
        FileType::Export,
        &["600519"],
        FileFormat::Csv,
        Some(&target),
    );

    // Then: WriteFailed names the path that could not be created
    match result {
        Err(SinkError::WriteFailed { path, .. }) => assert!(path.starts_with(&blocker)),
        other => panic!("expected WriteFailed, got {other:?}"),
    }
    assert!(!target.exists());
}

// =============================================================================
// Sink: Maintenance
// =============================================================================

#[test]
fn when_cleaning_up_only_files_older_than_the_window_are_removed() {
    // Given: One old and one fresh cache file
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());
    let old = sink.dirs().cache().join("old.csv");
    let fresh = sink.dirs().cache().join("fresh.csv");
    fs::write(&old, "a").expect("write");
    fs::write(&fresh, "b").expect("write");
    age(&old, 10);

    // When: Files older than seven days are cleaned up
    let removed = sink.cleanup_old(7, DataDir::Cache).expect("cleanup");

    // Then: Only the old file is gone
    assert_eq!(removed, 1);
    assert_eq!(files_in(sink.dirs().cache()), ["fresh.csv"]);
}

#[test]
fn when_cleaning_up_all_directories_are_covered() {
    // Given: Old files in exports and batch
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());
    for dir in [sink.dirs().exports(), sink.dirs().batch()] {
        let path = dir.join("stale.json");
        fs::write(&path, "{}").expect("write");
        age(&path, 30);
    }

    // When: All directories are cleaned
    let removed = sink.cleanup_old(7, DataDir::All).expect("cleanup");

    // Then: Both are removed
    assert_eq!(removed, 2);
}

#[test]
fn when_measuring_size_nested_files_are_counted() {
    // Given: Files at two depths
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());
    fs::write(sink.dirs().exports().join("a.csv"), vec![0_u8; 100]).expect("write");
    let nested = sink.dirs().exports().join("sub");
    fs::create_dir_all(&nested).expect("mkdir");
    fs::write(nested.join("b.csv"), vec![0_u8; 50]).expect("write");
    fs::write(sink.dirs().cache().join("c.csv"), vec![0_u8; 7]).expect("write");

    // Then: Sizes are summed recursively per selection
    assert_eq!(sink.directory_size(DataDir::Exports), 150);
    assert_eq!(sink.directory_size(DataDir::All), 157);
}

#[test]
fn when_listing_recent_files_newest_come_first_and_directories_are_skipped() {
    // Given: Three files of different ages and a subdirectory
    let root = tempfile::tempdir().expect("tempdir");
    let sink = sink_in(root.path());
    let exports = sink.dirs().exports();
    for (name, days) in [("oldest.csv", 3), ("newest.csv", 0), ("middle.csv", 1)] {
        let path = exports.join(name);
        fs::write(&path, name).expect("write");
        age(&path, days);
    }
    fs::create_dir_all(exports.join("folder")).expect("mkdir");

    // When: The two most recent files are listed
    let files = sink.list_recent(DataDir::Exports, 2).expect("listing");

    // Then: They come newest first
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["newest.csv", "middle.csv"]);
    assert_eq!(files[0].size_bytes, "newest.csv".len() as u64);
}
