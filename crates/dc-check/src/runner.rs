//! Bounded-parallel execution of checks and other jobs with cancellation

use crate::checks::Check;
use crate::context::{CheckContext, RunSettings};
use crate::result::CheckResult;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

/// Cancels a running [`Runner`] from another task
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Worker pool for independent jobs.
///
/// With one worker jobs run one at a time, in order, on the context's
/// shared connection. With more, each job is a task on its own connection from
/// [`dc_db::Database::worker_connection`], at most `workers` at a time,
/// and results arrive in completion order.
pub struct Runner {
    workers: usize,
    handle_interrupt: bool,
    cancel: Arc<watch::Sender<bool>>,
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|c| *c).await.is_err() {
        std::future::pending::<()>().await;
    }
}

impl Runner {
    pub fn new(workers: usize) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            workers: workers.max(1),
            handle_interrupt: false,
            cancel: Arc::new(tx),
        }
    }

    pub fn from_settings(settings: &RunSettings) -> Self {
        Self::new(settings.workers).with_interrupt_handling(settings.handle_interrupt)
    }

    /// Cancel on Ctrl-C while jobs are running
    pub fn with_interrupt_handling(mut self, enabled: bool) -> Self {
        self.handle_interrupt = enabled;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel),
        }
    }

    /// Stop scheduling; jobs already talking to the database finish first
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn was_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Run checks, calling `on_complete` for each result as it arrives.
    ///
    /// Without cancellation every check yields exactly one result.
    pub async fn run_checks<F>(
        &self,
        checks: Vec<Arc<dyn Check>>,
        ctx: &CheckContext,
        mut on_complete: F,
    ) -> Vec<CheckResult>
    where
        F: FnMut(&CheckResult) + Send,
    {
        let sources: Vec<PathBuf> = checks.iter().map(|c| c.source().to_path_buf()).collect();
        let completed = self
            .run_jobs(
                checks,
                ctx,
                |check: Arc<dyn Check>, ctx: CheckContext| async move { check.run_test(&ctx).await },
                |r| on_complete(r),
            )
            .await;

        let mut seen = vec![false; sources.len()];
        let mut results = Vec::with_capacity(completed.len());
        for (i, result) in completed {
            seen[i] = true;
            results.push(result);
        }
        if !self.was_cancelled() {
            for (source, _) in sources.iter().zip(&seen).filter(|(_, s)| !**s) {
                let result = CheckResult::exception_message(source, "check did not complete: worker task failed");
                on_complete(&result);
                results.push(result);
            }
        }
        results
    }

    /// Run `work` over every job; returns `(job index, output)` in completion order
    pub async fn run_jobs<J, T, W, Fut, F>(
        &self,
        jobs: Vec<J>,
        ctx: &CheckContext,
        work: W,
        mut on_complete: F,
    ) -> Vec<(usize, T)>
    where
        J: Send + 'static,
        T: Send + 'static,
        W: Fn(J, CheckContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        F: FnMut(&T) + Send,
    {
        let mut cancel_rx = self.cancel.subscribe();
        let interrupt = self.handle_interrupt;
        let ctrl_c = async move {
            if interrupt {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => return,
                    Err(e) => log::warn!("Cannot listen for Ctrl-C: {}", e),
                }
            }
            std::future::pending::<()>().await
        };
        tokio::pin!(ctrl_c);

        let mut done = Vec::with_capacity(jobs.len());

        if self.workers == 1 {
            // Each job is still a task so a panic ends only that job
            for (i, job) in jobs.into_iter().enumerate() {
                let mut handle = tokio::spawn(work(job, ctx.clone()));
                tokio::select! {
                    biased;
                    _ = cancelled(&mut cancel_rx) => {
                        handle.abort();
                        break;
                    }
                    _ = &mut ctrl_c => {
                        log::warn!("Interrupted; stopping remaining checks");
                        self.cancel();
                        handle.abort();
                        break;
                    }
                    joined = &mut handle => match joined {
                        Ok(output) => {
                            on_complete(&output);
                            done.push((i, output));
                        }
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => log::error!("Worker task failed: {}", e),
                    }
                }
            }
            return done;
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let work = Arc::new(work);
        let mut set = JoinSet::new();
        for (i, job) in jobs.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);
            let ctx = ctx.clone();
            let cancel_rx = self.cancel.subscribe();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                if *cancel_rx.borrow() {
                    return None;
                }
                let db = match ctx.db.worker_connection() {
                    Ok(db) => db,
                    Err(e) => {
                        log::warn!("No separate worker connection ({}); sharing the main one", e);
                        Arc::clone(&ctx.db)
                    }
                };
                let output = (*work)(job, ctx.with_db(db)).await;
                Some((i, output))
            });
        }

        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel_rx) => {
                    set.abort_all();
                    break;
                }
                _ = &mut ctrl_c => {
                    log::warn!("Interrupted; stopping remaining checks");
                    self.cancel();
                    set.abort_all();
                    break;
                }
                joined = set.join_next() => match joined {
                    None => return done,
                    Some(Ok(Some((i, output)))) => {
                        on_complete(&output);
                        done.push((i, output));
                    }
                    Some(Ok(None)) => {}
                    Some(Err(e)) if e.is_cancelled() => {}
                    Some(Err(e)) => log::error!("Worker task failed: {}", e),
                }
            }
        }

        // Aborted tasks stop at their next await; collect whatever finished.
        while let Some(joined) = set.join_next().await {
            if let Ok(Some((i, output))) = joined {
                on_complete(&output);
                done.push((i, output));
            }
        }
        done
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
