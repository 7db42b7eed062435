use super::*;
use std::fs;
use tempfile::TempDir;

fn touch(dir: &Path, rel: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "").unwrap();
    path
}

#[test]
fn test_identify_rules() {
    let tmp = TempDir::new().unwrap();
    let d = tmp.path();

    assert_eq!(
        CheckKind::identify(&d.join("missing.sql"), false),
        Some(CheckKind::PathNotExists)
    );

    touch(d, "pipe/data_check_pipeline.yml");
    assert_eq!(CheckKind::identify(&d.join("pipe"), false), Some(CheckKind::Pipeline));

    let empty = touch(d, "e.sql");
    touch(d, "e.empty");
    touch(d, "e.csv");
    assert_eq!(CheckKind::identify(&empty, false), Some(CheckKind::EmptySet));

    let excel = touch(d, "x.sql");
    touch(d, "x.xlsx");
    touch(d, "x.csv");
    assert_eq!(CheckKind::identify(&excel, false), Some(CheckKind::Excel));

    let csv = touch(d, "c.sql");
    touch(d, "c.csv");
    assert_eq!(CheckKind::identify(&csv, false), Some(CheckKind::Csv));
    assert_eq!(CheckKind::identify(&csv, true), Some(CheckKind::Generator));

    let lone = touch(d, "lone.sql");
    assert_eq!(CheckKind::identify(&lone, false), Some(CheckKind::Csv));
    assert_eq!(CheckKind::identify(&lone, true), Some(CheckKind::Generator));

    let table = touch(d, "main.items.csv");
    assert_eq!(CheckKind::identify(&table, false), Some(CheckKind::Table));
    let table_xlsx = touch(d, "other.xlsx");
    assert_eq!(CheckKind::identify(&table_xlsx, false), Some(CheckKind::Table));

    assert_eq!(CheckKind::identify(&d.join("c.csv"), false), None);
    assert_eq!(CheckKind::identify(&touch(d, "notes.txt"), false), None);
    assert_eq!(CheckKind::identify(d, false), None);
}

#[test]
fn test_identify_is_disjoint() {
    let tmp = TempDir::new().unwrap();
    let d = tmp.path();
    let paths = vec![
        touch(d, "a.sql"),
        touch(d, "a.csv"),
        touch(d, "b.sql"),
        touch(d, "b.empty"),
        touch(d, "t.csv"),
        d.join("nope.sql"),
    ];
    for generate in [false, true] {
        for path in &paths {
            let claims = [
                PathNotExistsCheck::identify(path),
                PipelineCheck::identify(path, generate),
                EmptySetCheck::identify(path, generate),
                ExcelCheck::identify(path, generate),
                CsvCheck::identify(path, generate),
                GeneratorCheck::identify(path, generate),
                TableCheck::identify(path, generate),
            ];
            let count = claims.iter().filter(|c| **c).count();
            assert!(count <= 1, "{} claimed by {} kinds", path.display(), count);
        }
    }
}

#[test]
fn test_expand_suppresses_pipeline_contents() {
    let tmp = TempDir::new().unwrap();
    let d = tmp.path();
    touch(d, "checks/a.sql");
    touch(d, "checks/a.csv");
    touch(d, "checks/sub/b.sql");
    touch(d, "checks/sub/tbl.csv");
    touch(d, "checks/pipe/data_check_pipeline.yml");
    touch(d, "checks/pipe/checks/inner.sql");
    touch(d, "checks/pipe/checks/inner.csv");

    let expanded = expand_paths(&[d.join("checks")]);
    assert_eq!(
        expanded,
        vec![
            d.join("checks/a.sql"),
            d.join("checks/pipe"),
            d.join("checks/sub/b.sql"),
            d.join("checks/sub/tbl.csv"),
        ]
    );

    // A pipeline's own checks directory expands normally when named directly
    let inner = expand_paths(&[d.join("checks/pipe/checks")]);
    assert_eq!(inner, vec![d.join("checks/pipe/checks/inner.sql")]);
}

#[test]
fn test_collect_checks_kinds() {
    let tmp = TempDir::new().unwrap();
    let d = tmp.path();
    touch(d, "q.sql");
    touch(d, "q.empty");
    let checks = collect_checks(&[d.to_path_buf(), d.join("ghost.sql")], false);
    let kinds: Vec<CheckKind> = checks.iter().map(|c| c.kind()).collect();
    assert_eq!(kinds, vec![CheckKind::EmptySet, CheckKind::PathNotExists]);
}
