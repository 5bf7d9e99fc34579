// Prompt constants for value-proposition drafting.

/// Replace `{startup}` and `{accelerator}` before sending.
pub const VALUE_PROPOSITION_PROMPT_TEMPLATE: &str = "Crea una value proposition di 80 parole per questa startup da presentare all'acceleratore.

STARTUP: {startup}

ACCELERATORE: {accelerator}

Scrivi solo la value proposition, senza introduzioni.";

/// Fixed inputs for the connectivity smoke test.
pub const SMOKE_TEST_STARTUP: &str = "Piattaforma SaaS per automatizzare il recruiting con AI. \
    Aiuta le aziende a scremare migliaia di CV in pochi minuti usando machine learning.";
pub const SMOKE_TEST_ACCELERATOR: &str =
    "Focus su B2B SaaS e AI. Programma di 3 mesi con mentorship e €100k investimento.";

pub fn value_proposition_prompt(startup: &str, accelerator: &str) -> String {
    VALUE_PROPOSITION_PROMPT_TEMPLATE
        .replace("{startup}", startup)
        .replace("{accelerator}", accelerator)
}
