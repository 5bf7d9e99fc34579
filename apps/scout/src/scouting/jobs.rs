//! Background batch runs.
//!
//! A confirmed batch runs on its own task, so it is not tied to the request
//! that started it. The results sheet has a single writer: `BatchJobs` holds
//! the writer guard, and anything that appends to the sheet takes it first.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::scouting::batch::{run_batch, BatchContext, BatchPlan, BatchSummary};
use crate::scouting::generator::PropositionDrafter;
use crate::scouting::match_scoring::MatchScorer;
use crate::workbook::Workbook;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Running { planned_pairs: usize },
    Completed(BatchSummary),
    Failed { message: String },
}

/// Held for as long as something writes to the results sheet.
pub type WriterGuard = OwnedMutexGuard<()>;

#[derive(Clone, Default)]
pub struct BatchJobs {
    writer: Arc<Mutex<()>>,
    runs: Arc<Mutex<HashMap<Uuid, RunStatus>>>,
}

impl BatchJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the results sheet, or fails with `Conflict` while a run holds it.
    pub fn try_claim(&self) -> Result<WriterGuard, AppError> {
        self.writer.clone().try_lock_owned().map_err(|_| {
            AppError::Conflict("Una generazione batch è già in corso".to_string())
        })
    }

    pub async fn status(&self, run_id: Uuid) -> Option<RunStatus> {
        self.runs.lock().await.get(&run_id).cloned()
    }

    /// Starts `plan` on a background task. The guard is released when the run ends.
    pub async fn start(
        &self,
        guard: WriterGuard,
        workbook: Arc<dyn Workbook>,
        scorer: Arc<dyn MatchScorer>,
        drafter: Arc<dyn PropositionDrafter>,
        plan: BatchPlan,
    ) -> Uuid {
        let run_id = Uuid::new_v4();
        self.runs.lock().await.insert(
            run_id,
            RunStatus::Running {
                planned_pairs: plan.planned_pairs(),
            },
        );

        let runs = self.runs.clone();
        tokio::spawn(async move {
            let ctx = BatchContext {
                workbook: workbook.as_ref(),
                scorer: scorer.as_ref(),
                drafter: drafter.as_ref(),
            };

            let status = match run_batch(&ctx, &plan, run_id).await {
                Ok(summary) => RunStatus::Completed(summary),
                Err(e) => {
                    error!(%run_id, "Batch aborted: {e}");
                    RunStatus::Failed {
                        message: e.to_string(),
                    }
                }
            };

            runs.lock().await.insert(run_id, status);
            drop(guard);
        });

        info!(%run_id, "Batch run spawned");
        run_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::scouting::batch::plan_batch;
    use crate::scouting::fixtures::{self, SlowDrafter};
    use crate::scouting::match_scoring::HeuristicScorer;
    use crate::workbook::memory::MemoryWorkbook;
    use crate::workbook::RESULTS_SHEET;

    async fn wait_until_finished(jobs: &BatchJobs, run_id: Uuid) -> RunStatus {
        for _ in 0..500 {
            match jobs.status(run_id).await {
                Some(RunStatus::Running { .. }) | None => {
                    tokio::time::sleep(Duration::from_millis(10)).await
                }
                Some(done) => return done,
            }
        }
        panic!("batch {run_id} did not finish");
    }

    fn sequence_column(wb: &MemoryWorkbook) -> Vec<String> {
        wb.rows(RESULTS_SHEET).unwrap()[1..]
            .iter()
            .map(|r| r[0].clone())
            .collect()
    }

    #[tokio::test]
    async fn test_second_claim_conflicts_until_first_is_released() {
        let jobs = BatchJobs::new();

        let guard = jobs.try_claim().unwrap();
        assert!(matches!(jobs.try_claim(), Err(AppError::Conflict(_))));

        drop(guard);
        assert!(jobs.try_claim().is_ok());
    }

    #[tokio::test]
    async fn test_overlapping_runs_keep_sequence_contiguous() {
        let wb = Arc::new(fixtures::workbook("0.7", "0"));
        let jobs = BatchJobs::new();
        let drafter: Arc<dyn PropositionDrafter> = Arc::new(SlowDrafter::new(20));

        let plan = plan_batch(wb.as_ref()).await.unwrap();
        let guard = jobs.try_claim().unwrap();
        let run_id = jobs
            .start(guard, wb.clone(), Arc::new(HeuristicScorer), drafter, plan)
            .await;

        // A second run requested while the first is writing is turned away.
        assert!(matches!(jobs.try_claim(), Err(AppError::Conflict(_))));

        let status = wait_until_finished(&jobs, run_id).await;
        assert!(matches!(status, RunStatus::Completed(ref s) if s.generated == 3));
        assert_eq!(sequence_column(&wb), vec!["1", "2", "3"]);

        // Once released, the next run starts from a clean table.
        let plan = plan_batch(wb.as_ref()).await.unwrap();
        let guard = jobs.try_claim().unwrap();
        let run_id = jobs
            .start(
                guard,
                wb.clone(),
                Arc::new(HeuristicScorer),
                Arc::new(SlowDrafter::new(0)),
                plan,
            )
            .await;
        wait_until_finished(&jobs, run_id).await;
        assert_eq!(sequence_column(&wb), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_run_survives_caller_being_dropped() {
        let wb = Arc::new(fixtures::workbook("0.5", "0"));
        let jobs = BatchJobs::new();
        let plan = plan_batch(wb.as_ref()).await.unwrap();

        // Start the run from a task that is aborted right away, like a
        // request future dropped on client disconnect.
        let caller = {
            let jobs = jobs.clone();
            let wb = wb.clone();
            tokio::spawn(async move {
                let guard = jobs.try_claim().unwrap();
                let run_id = jobs
                    .start(
                        guard,
                        wb,
                        Arc::new(HeuristicScorer),
                        Arc::new(SlowDrafter::new(30)),
                        plan,
                    )
                    .await;
                tokio::time::sleep(Duration::from_secs(60)).await;
                run_id
            })
        };

        // Wait until the run is registered, then drop the caller.
        let run_id = loop {
            let runs = jobs.runs.lock().await;
            if let Some(id) = runs.keys().next() {
                break *id;
            }
            drop(runs);
            tokio::time::sleep(Duration::from_millis(5)).await;
        };
        caller.abort();

        let status = wait_until_finished(&jobs, run_id).await;
        assert!(matches!(status, RunStatus::Completed(ref s) if s.generated == 6));
        assert_eq!(wb.rows(RESULTS_SHEET).unwrap().len(), 7);
        assert!(jobs.try_claim().is_ok(), "guard released after the run");
    }

    #[tokio::test]
    async fn test_failed_run_reports_error_and_releases_guard() {
        let wb = Arc::new(fixtures::workbook("0.5", "0"));
        let jobs = BatchJobs::new();
        let plan = plan_batch(wb.as_ref()).await.unwrap();

        // Results sheet disappears between planning and running.
        let empty: Arc<dyn Workbook> = Arc::new(MemoryWorkbook::new());
        let guard = jobs.try_claim().unwrap();
        let run_id = jobs
            .start(
                guard,
                empty,
                Arc::new(HeuristicScorer),
                Arc::new(SlowDrafter::new(0)),
                plan,
            )
            .await;

        let status = wait_until_finished(&jobs, run_id).await;
        assert!(matches!(status, RunStatus::Failed { ref message } if message.contains(RESULTS_SHEET)));
        assert!(jobs.try_claim().is_ok());
    }
}
