// Startup ↔ accelerator scouting.
// Implements: sheet config loading, match scoring, value-proposition drafting, batch runs.
// All LLM calls go through llm_client.

pub mod batch;
#[cfg(test)]
pub mod fixtures;
pub mod generator;
pub mod handlers;
pub mod jobs;
pub mod match_scoring;
pub mod prompts;
pub mod settings;
pub mod throttle;
