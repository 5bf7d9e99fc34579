//! Axum route handlers for the scouting API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::records::{AcceleratorRecord, StartupRecord, ValuePropositionRecord};
use crate::scouting::batch::{list_results, plan_batch};
use crate::scouting::generator::GenerationError;
use crate::scouting::jobs::RunStatus;
use crate::scouting::prompts::{SMOKE_TEST_ACCELERATOR, SMOKE_TEST_STARTUP};
use crate::scouting::settings::{load_scouting_config, ConfigError, ScoutingConfig};
use crate::state::AppState;
use crate::workbook::{Row, Workbook, ACCELERATOR_SHEET, RESULTS_SHEET, STARTUP_SHEET};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    /// "generated" | "failed"
    pub status: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    /// Status returned by the completions API when it rejected the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl From<Result<String, GenerationError>> for DraftResponse {
    fn from(result: Result<String, GenerationError>) -> Self {
        match result {
            Ok(text) => Self {
                status: "generated",
                text,
                error_kind: None,
                http_status: None,
            },
            Err(e) => Self {
                status: "failed",
                text: e.to_string(),
                error_kind: Some(e.kind()),
                http_status: e.http_status(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SheetTestResponse {
    pub startup: String,
    pub accelerator: String,
    pub match_score: f64,
    pub draft: DraftResponse,
    /// Sequence number of the appended row; `None` when there is no results sheet.
    pub sequence_number: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchResponse {
    /// Nothing was touched; resubmit with `"confirm": true` to proceed.
    AwaitingConfirmation { planned_pairs: usize },
    /// The run continues in the background; poll its status by `run_id`.
    Started { run_id: Uuid, planned_pairs: usize },
}

#[derive(Debug, Serialize)]
pub struct ValuePropositionsResponse {
    pub total: usize,
    /// Rows whose text is a persisted generation error.
    pub failed: usize,
    /// Rows of the sheet that could not be read as value propositions.
    pub skipped: usize,
    pub value_propositions: Vec<ValuePropositionRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/value-propositions/test
///
/// Drafts one value proposition from fixed sample inputs. Nothing is persisted.
pub async fn handle_smoke_test(
    State(state): State<AppState>,
) -> Result<Json<DraftResponse>, AppError> {
    let result = match draft_config(state.workbook.as_ref()).await? {
        Ok(config) => {
            info!("Smoke test with model {}", config.model);
            state
                .drafter
                .draft(SMOKE_TEST_STARTUP, SMOKE_TEST_ACCELERATOR, &config)
                .await
        }
        Err(e) => Err(e),
    };

    Ok(Json(result.into()))
}

/// POST /api/v1/value-propositions/test-sheet
///
/// Drafts a value proposition for the first startup and the first accelerator
/// in the workbook and appends it to the results sheet, if there is one.
pub async fn handle_sheet_test(
    State(state): State<AppState>,
) -> Result<Json<SheetTestResponse>, AppError> {
    let _writer = state.jobs.try_claim()?;
    let workbook = state.workbook.as_ref();

    let startup = first_record(workbook, STARTUP_SHEET)
        .await?
        .map(|r| StartupRecord::from_row(&r))
        .ok_or_else(|| empty_sheet(STARTUP_SHEET))?;
    let accelerator = first_record(workbook, ACCELERATOR_SHEET)
        .await?
        .map(|r| AcceleratorRecord::from_row(&r))
        .ok_or_else(|| empty_sheet(ACCELERATOR_SHEET))?;

    let match_score = state.scorer.score(&startup, &accelerator);
    info!(
        "Sheet test: {} → {} (score {match_score:.2})",
        startup.name, accelerator.name
    );

    let result = match draft_config(workbook).await? {
        Ok(config) => {
            state
                .drafter
                .draft(&startup.description, &accelerator.info(), &config)
                .await
        }
        Err(e) => Err(e),
    };
    let draft = DraftResponse::from(result);

    let sequence_number = match workbook.read_sheet(RESULTS_SHEET).await? {
        Some(rows) => {
            // Sequence follows the sheet's last row index, header included.
            let record = ValuePropositionRecord {
                sequence_number: rows.len(),
                startup_name: startup.name.clone(),
                accelerator_name: accelerator.name.clone(),
                match_score,
                text: draft.text.clone(),
                generated_at: Utc::now(),
            };
            workbook.append_row(RESULTS_SHEET, record.to_row()).await?;
            Some(record.sequence_number)
        }
        None => None,
    };

    Ok(Json(SheetTestResponse {
        startup: startup.name,
        accelerator: accelerator.name,
        match_score,
        draft,
        sequence_number,
    }))
}

/// POST /api/v1/value-propositions/batch
///
/// Without `"confirm": true` only reports how many pairs would be evaluated.
/// With it, starts a background run that clears the results sheet and
/// regenerates every matching pair; answers 202 with the run id, or 409 while
/// another run holds the results sheet.
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    let plan = plan_batch(state.workbook.as_ref()).await?;
    let planned_pairs = plan.planned_pairs();

    if !request.confirm {
        info!("Batch awaiting confirmation: up to {planned_pairs} value propositions");
        return Ok((
            StatusCode::OK,
            Json(BatchResponse::AwaitingConfirmation { planned_pairs }),
        ));
    }

    let writer = state.jobs.try_claim()?;
    let run_id = state
        .jobs
        .start(
            writer,
            state.workbook.clone(),
            state.scorer.clone(),
            state.drafter.clone(),
            plan,
        )
        .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(BatchResponse::Started {
            run_id,
            planned_pairs,
        }),
    ))
}

/// GET /api/v1/value-propositions/batch/:run_id
pub async fn handle_batch_status(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<RunStatus>, AppError> {
    state
        .jobs
        .status(run_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Batch run {run_id} not found")))
}

/// GET /api/v1/value-propositions
pub async fn handle_list_value_propositions(
    State(state): State<AppState>,
) -> Result<Json<ValuePropositionsResponse>, AppError> {
    let listing = list_results(state.workbook.as_ref()).await?;
    Ok(Json(ValuePropositionsResponse {
        total: listing.records.len(),
        failed: listing.records.iter().filter(|r| r.is_error()).count(),
        skipped: listing.skipped,
        value_propositions: listing.records,
    }))
}

/// Config for a single draft. An unusable Config sheet becomes a failed draft;
/// only workbook failures abort the request.
async fn draft_config(
    workbook: &dyn Workbook,
) -> Result<Result<ScoutingConfig, GenerationError>, AppError> {
    match load_scouting_config(workbook).await {
        Ok(config) => Ok(Ok(config)),
        Err(ConfigError::Workbook(e)) => Err(e.into()),
        Err(e) => {
            warn!("{e}");
            Ok(Err(GenerationError::ConfigUnavailable))
        }
    }
}

/// First data row of a sheet; a missing sheet reads as empty.
async fn first_record(workbook: &dyn Workbook, sheet: &str) -> Result<Option<Row>, AppError> {
    Ok(workbook
        .read_sheet(sheet)
        .await?
        .and_then(|rows| rows.into_iter().nth(1)))
}

fn empty_sheet(sheet: &str) -> AppError {
    AppError::Validation(format!("Scheda '{sheet}' vuota o mancante!"))
}
