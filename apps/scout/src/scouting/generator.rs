//! Value-proposition drafting.
//!
//! Flow: validate config → validate input → build prompt → one chat completion.
//!
//! Failures are typed (`GenerationError`) so callers can branch on them, and
//! every variant renders as the `ERRORE ...` text stored in the result sheet.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::{ChatCompletion, LlmClient, LlmError};
use crate::scouting::prompts::value_proposition_prompt;
use crate::scouting::settings::ScoutingConfig;

pub const MIN_API_KEY_CHARS: usize = 20;
pub const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("ERRORE: Config non disponibile")]
    ConfigUnavailable,

    #[error("ERRORE: API Key non valida")]
    ConfigInvalid,

    #[error("ERRORE: Descrizione startup troppo breve")]
    InputInvalid,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::ConfigUnavailable => "config_unavailable",
            GenerationError::ConfigInvalid => "config_invalid",
            GenerationError::InputInvalid => "input_invalid",
            GenerationError::Llm(e) => e.kind(),
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            GenerationError::Llm(e) => e.status(),
            _ => None,
        }
    }
}

/// Drafts one value proposition. Implemented by `LlmDrafter`; tests swap in fakes.
#[async_trait]
pub trait PropositionDrafter: Send + Sync {
    async fn draft(
        &self,
        startup_description: &str,
        accelerator_info: &str,
        config: &ScoutingConfig,
    ) -> Result<String, GenerationError>;
}

pub struct LlmDrafter {
    llm: LlmClient,
}

impl LlmDrafter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PropositionDrafter for LlmDrafter {
    async fn draft(
        &self,
        startup_description: &str,
        accelerator_info: &str,
        config: &ScoutingConfig,
    ) -> Result<String, GenerationError> {
        generate(&self.llm, startup_description, accelerator_info, config).await
    }
}

/// Checks run in order; the first failing one wins.
pub fn validate_inputs(
    startup_description: &str,
    config: &ScoutingConfig,
) -> Result<(), GenerationError> {
    if config.api_key.chars().count() < MIN_API_KEY_CHARS {
        return Err(GenerationError::ConfigInvalid);
    }
    if startup_description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(GenerationError::InputInvalid);
    }
    Ok(())
}

pub async fn generate(
    llm: &LlmClient,
    startup_description: &str,
    accelerator_info: &str,
    config: &ScoutingConfig,
) -> Result<String, GenerationError> {
    validate_inputs(startup_description, config)?;

    let prompt = value_proposition_prompt(startup_description.trim(), accelerator_info.trim());
    debug!("Prompt length: {} chars", prompt.len());

    let text = llm
        .complete(ChatCompletion {
            api_key: &config.api_key,
            model: &config.model,
            max_tokens: config.max_tokens,
            prompt: &prompt,
        })
        .await?;

    info!("Value proposition drafted ({} chars)", text.chars().count());
    Ok(text)
}
