//! Batch runs — draft a value proposition for every sufficiently matched pair.
//!
//! Flow: plan (load config, read startups/accelerators; no side effects) →
//!       run (clear results → for each pair, startup-major: score → throttle →
//!       draft → append row).
//!
//! Rows are appended as they are produced. A workbook failure mid-run aborts
//! the run and leaves the rows written so far in place. Callers must hold the
//! results-sheet writer guard (see `jobs`) for the whole run.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::records::{AcceleratorRecord, StartupRecord, ValuePropositionRecord};
use crate::scouting::generator::PropositionDrafter;
use crate::scouting::match_scoring::MatchScorer;
use crate::scouting::settings::{load_scouting_config, ScoutingConfig};
use crate::scouting::throttle::Throttle;
use crate::workbook::{Row, Workbook, WorkbookError, ACCELERATOR_SHEET, RESULTS_SHEET, STARTUP_SHEET};

/// Collaborators for one batch run.
pub struct BatchContext<'a> {
    pub workbook: &'a dyn Workbook,
    pub scorer: &'a dyn MatchScorer,
    pub drafter: &'a dyn PropositionDrafter,
}

/// Everything a run needs, read up front.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub config: ScoutingConfig,
    pub startups: Vec<StartupRecord>,
    pub accelerators: Vec<AcceleratorRecord>,
}

impl BatchPlan {
    pub fn planned_pairs(&self) -> usize {
        self.startups.len() * self.accelerators.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub planned_pairs: usize,
    pub evaluated_pairs: usize,
    /// Rows written, failed drafts included.
    pub generated: usize,
    pub failed: usize,
}

/// Parsed contents of the results sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsListing {
    pub records: Vec<ValuePropositionRecord>,
    /// Data rows that could not be parsed into a record.
    pub skipped: usize,
}

/// Reads all data rows (header skipped) of a sheet that must exist.
pub async fn read_data_rows(workbook: &dyn Workbook, sheet: &str) -> Result<Vec<Row>, AppError> {
    let rows = workbook
        .read_sheet(sheet)
        .await?
        .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))?;
    Ok(rows.into_iter().skip(1).collect())
}

/// Loads and validates the inputs of a batch run. Touches nothing.
pub async fn plan_batch(workbook: &dyn Workbook) -> Result<BatchPlan, AppError> {
    let config = load_scouting_config(workbook).await?;

    let startups: Vec<StartupRecord> = read_data_rows(workbook, STARTUP_SHEET)
        .await?
        .iter()
        .map(|r| StartupRecord::from_row(r))
        .collect();
    let accelerators: Vec<AcceleratorRecord> = read_data_rows(workbook, ACCELERATOR_SHEET)
        .await?
        .iter()
        .map(|r| AcceleratorRecord::from_row(r))
        .collect();

    if startups.is_empty() || accelerators.is_empty() {
        return Err(AppError::Validation(
            "Serve almeno 1 startup e 1 acceleratore!".to_string(),
        ));
    }

    // The results sheet must exist before anything is confirmed or cleared.
    if workbook.read_sheet(RESULTS_SHEET).await?.is_none() {
        return Err(WorkbookError::SheetNotFound(RESULTS_SHEET.to_string()).into());
    }

    Ok(BatchPlan {
        config,
        startups,
        accelerators,
    })
}

/// Clears the results sheet and regenerates every pair at or above the threshold.
pub async fn run_batch(
    ctx: &BatchContext<'_>,
    plan: &BatchPlan,
    run_id: Uuid,
) -> Result<BatchSummary, AppError> {
    run_pairs(ctx, plan, run_id)
        .instrument(info_span!("batch", %run_id))
        .await
}

async fn run_pairs(
    ctx: &BatchContext<'_>,
    plan: &BatchPlan,
    run_id: Uuid,
) -> Result<BatchSummary, AppError> {
    let config = &plan.config;

    let cleared = ctx.workbook.clear_data_rows(RESULTS_SHEET).await?;
    info!(
        "Batch started: {} startups × {} accelerators, threshold {}, cleared {cleared} old rows",
        plan.startups.len(),
        plan.accelerators.len(),
        config.match_threshold
    );

    let mut throttle = Throttle::from_millis(config.rate_limit_ms);
    let mut summary = BatchSummary {
        run_id,
        planned_pairs: plan.planned_pairs(),
        evaluated_pairs: 0,
        generated: 0,
        failed: 0,
    };

    for startup in &plan.startups {
        for accelerator in &plan.accelerators {
            summary.evaluated_pairs += 1;

            let match_score = ctx.scorer.score(startup, accelerator);
            if match_score < config.match_threshold {
                continue;
            }

            throttle.acquire().await;

            let sequence_number = summary.generated + 1;
            info!(
                "VP {sequence_number}: {} → {} (score {match_score:.2})",
                startup.name, accelerator.name
            );

            let text = match ctx
                .drafter
                .draft(&startup.description, &accelerator.info(), config)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(kind = e.kind(), "Draft failed for VP {sequence_number}: {e}");
                    summary.failed += 1;
                    e.to_string()
                }
            };

            let record = ValuePropositionRecord {
                sequence_number,
                startup_name: startup.name.clone(),
                accelerator_name: accelerator.name.clone(),
                match_score,
                text,
                generated_at: Utc::now(),
            };
            ctx.workbook.append_row(RESULTS_SHEET, record.to_row()).await?;
            summary.generated += 1;
        }
    }

    info!(
        "Batch completed: {} value propositions ({} failed) over {} pairs",
        summary.generated, summary.failed, summary.evaluated_pairs
    );

    Ok(summary)
}

/// Current contents of the results sheet. Rows that do not parse are counted
/// and logged, not returned.
pub async fn list_results(workbook: &dyn Workbook) -> Result<ResultsListing, AppError> {
    let rows = read_data_rows(workbook, RESULTS_SHEET).await?;

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for (idx, row) in rows.iter().enumerate() {
        match ValuePropositionRecord::from_row(row) {
            Some(record) => records.push(record),
            None => {
                // idx is 0-based below the header: sheet row = idx + 2
                warn!("Skipping unreadable row {} of '{RESULTS_SHEET}': {row:?}", idx + 2);
                skipped += 1;
            }
        }
    }

    Ok(ResultsListing { records, skipped })
}
