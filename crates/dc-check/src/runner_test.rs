use super::*;
use crate::dispatcher::{collect_checks, CheckKind};
use crate::output::Output;
use crate::result::ResultType;
use async_trait::async_trait;
use dc_core::PrintFormat;
use dc_db::DuckDbBackend;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

fn context(root: &Path) -> CheckContext {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    CheckContext::new(db, root.to_path_buf(), Arc::new(Output::capturing(PrintFormat::Pandas)))
}

/// Writes `n` passing check pairs and returns their SQL paths
fn passing_checks(dir: &Path, n: usize) -> Vec<PathBuf> {
    (0..n)
        .map(|i| {
            let sql = dir.join(format!("check_{}.sql", i));
            std::fs::write(&sql, format!("select {} as n", i)).unwrap();
            std::fs::write(sql.with_extension("csv"), format!("n\n{}\n", i)).unwrap();
            sql
        })
        .collect()
}

struct PanickingCheck(PathBuf);

#[async_trait]
impl Check for PanickingCheck {
    fn source(&self) -> &Path {
        &self.0
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Csv
    }

    async fn run_test(&self, _ctx: &CheckContext) -> CheckResult {
        panic!("boom")
    }
}

#[tokio::test]
async fn test_inline_runner_keeps_order() {
    let tmp = TempDir::new().unwrap();
    let paths = passing_checks(tmp.path(), 3);
    let checks = collect_checks(&paths, false);

    let runner = Runner::new(1);
    let results = runner.run_checks(checks, &context(tmp.path()), |_| {}).await;

    let sources: Vec<PathBuf> = results.iter().map(|r| r.source.clone()).collect();
    assert_eq!(sources, paths);
    assert!(results.iter().all(|r| r.passed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_runner_reports_every_check() {
    let tmp = TempDir::new().unwrap();
    let paths = passing_checks(tmp.path(), 8);
    let checks = collect_checks(&paths, false);

    let runner = Runner::new(4);
    let mut seen = 0;
    let results = runner
        .run_checks(checks, &context(tmp.path()), |_| seen += 1)
        .await;

    assert_eq!(results.len(), 8);
    assert_eq!(seen, 8);
    assert!(results.iter().all(|r| r.passed), "{:?}", results);
    let mut sources: Vec<PathBuf> = results.iter().map(|r| r.source.clone()).collect();
    sources.sort();
    let mut expected = paths.clone();
    expected.sort();
    assert_eq!(sources, expected);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let tmp = TempDir::new().unwrap();
    let checks = collect_checks(&passing_checks(tmp.path(), 3), false);

    for workers in [1, 3] {
        let runner = Runner::new(workers);
        runner.cancel_handle().cancel();
        let results = runner
            .run_checks(checks.clone(), &context(tmp.path()), |_| {})
            .await;
        assert!(results.is_empty());
        assert!(runner.was_cancelled());
    }
}

#[tokio::test]
async fn test_panicking_worker_becomes_exception_result() {
    let tmp = TempDir::new().unwrap();

    for workers in [1, 2] {
        let mut checks = collect_checks(&passing_checks(tmp.path(), 2), false);
        checks.insert(1, Arc::new(PanickingCheck(tmp.path().join("bad.sql"))));

        let runner = Runner::new(workers);
        let mut seen = 0;
        let results = runner
            .run_checks(checks, &context(tmp.path()), |_| seen += 1)
            .await;

        assert_eq!(results.len(), 3, "workers={workers}");
        assert_eq!(seen, 3);
        let bad = results
            .iter()
            .find(|r| r.source.ends_with("bad.sql"))
            .unwrap();
        assert_eq!(bad.result_type, ResultType::FailedWithException);
        assert_eq!(results.iter().filter(|r| r.passed).count(), 2);
    }
}

#[tokio::test]
async fn test_run_jobs_uses_worker_contexts() {
    let tmp = TempDir::new().unwrap();
    let ctx = context(tmp.path());
    ctx.db.execute("create table shared as select 5 as v").await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let runner = Runner::new(3);
    let mut done = runner
        .run_jobs(
            (0..6).collect::<Vec<i64>>(),
            &ctx,
            move |job, ctx: CheckContext| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let rows = ctx.db.query("select v from shared").await.unwrap();
                    (job, rows.rows.len())
                }
            },
            |_| {},
        )
        .await;

    done.sort_by_key(|(i, _)| *i);
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(
        done,
        (0..6).map(|i| (i as usize, (i, 1))).collect::<Vec<_>>()
    );
}

#[test]
fn test_workers_at_least_one() {
    assert_eq!(Runner::new(0).workers(), 1);
    let settings = RunSettings {
        workers: 6,
        ..RunSettings::default()
    };
    assert_eq!(Runner::from_settings(&settings).workers(), 6);
}
