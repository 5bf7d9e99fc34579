//! Shared test data for the scouting module.

use std::time::Duration;

use async_trait::async_trait;

use crate::scouting::generator::{GenerationError, PropositionDrafter};
use crate::scouting::settings::ScoutingConfig;
use crate::workbook::memory::MemoryWorkbook;
use crate::workbook::{ACCELERATOR_SHEET, CONFIG_SHEET, RESULTS_SHEET, STARTUP_SHEET};

pub const API_KEY: &str = "gsk_fixture_key_0123456789";

pub fn config_rows<'a>(threshold: &'a str, rate_limit_ms: &'a str) -> Vec<Vec<&'a str>> {
    vec![
        vec!["API Key", API_KEY],
        vec!["Max Tokens", "300"],
        vec!["Model", "llama-3.1-8b-instant"],
        vec!["Rate Limit", rate_limit_ms],
        vec!["Match Threshold", threshold],
    ]
}

/// Three startups × three accelerators, plus one stale result row.
///
/// Scores (startup-major):
/// - Recrutia (Italia, "SaaS, AI"):       Boost 0.85, FinLab 0.50, MedHub 0.50
/// - Paylio   (Italia, "fintech"):        Boost 0.35, FinLab 1.00, MedHub 0.50
/// - Curami   (Germania, "health/biotech"): Boost 0.35, FinLab 0.20, MedHub 0.70
pub fn workbook(threshold: &str, rate_limit_ms: &str) -> MemoryWorkbook {
    data_sheets().with_sheet(CONFIG_SHEET, config_rows(threshold, rate_limit_ms))
}

/// The data and results sheets of [`workbook`], without a Config sheet.
pub fn data_sheets() -> MemoryWorkbook {
    MemoryWorkbook::new()
        .with_sheet(
            STARTUP_SHEET,
            vec![
                vec!["ID", "Nome", "Paese", "Settore", "Anno", "Descrizione"],
                vec!["1", "Recrutia", "Italia", "SaaS, AI", "2022", "Recruiting automatizzato con AI per PMI"],
                vec!["2", "Paylio", "Italia", "fintech", "2021", "Pagamenti istantanei per freelance"],
                vec!["3", "Curami", "Germania", "health/biotech", "2020", "Diagnostica remota per cliniche"],
            ],
        )
        .with_sheet(
            ACCELERATOR_SHEET,
            vec![
                vec!["ID", "Nome", "Paese", "Focus", "Ticket", "Descrizione"],
                vec!["1", "Boost", "EU", "AI", "100k", "Programma di 3 mesi"],
                vec!["2", "FinLab", "Italia", "fintech", "50k", "Focus pagamenti"],
                vec!["3", "MedHub", "Italia", "biotech", "80k", "Health tech"],
            ],
        )
        .with_sheet(
            RESULTS_SHEET,
            vec![
                vec!["#", "Startup", "Acceleratore", "Match", "Value Proposition", "Data"],
                vec!["1", "Vecchia", "Riga", "0.90", "testo", "2025-01-01T00:00:00Z"],
            ],
        )
}

/// Drafter that takes a fixed time per call, like a real API round trip.
pub struct SlowDrafter {
    delay: Duration,
}

impl SlowDrafter {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

#[async_trait]
impl PropositionDrafter for SlowDrafter {
    async fn draft(
        &self,
        _startup_description: &str,
        accelerator_info: &str,
        _config: &ScoutingConfig,
    ) -> Result<String, GenerationError> {
        tokio::time::sleep(self.delay).await;
        Ok(format!("Proposta per {accelerator_info}"))
    }
}
