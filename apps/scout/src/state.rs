use std::sync::Arc;

use crate::scouting::generator::PropositionDrafter;
use crate::scouting::jobs::BatchJobs;
use crate::scouting::match_scoring::MatchScorer;
use crate::workbook::Workbook;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The tabular store every operation reads from and writes to.
    pub workbook: Arc<dyn Workbook>,
    /// Pluggable match scorer. Default: HeuristicScorer.
    pub scorer: Arc<dyn MatchScorer>,
    /// Value-proposition drafter. Default: LlmDrafter over the chat completions API.
    pub drafter: Arc<dyn PropositionDrafter>,
    /// Background batch runs and the results-sheet writer guard.
    pub jobs: BatchJobs,
}
