//! Provider bench - the same prompt to every configured provider at once

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::config::{Config, Secrets};
use crate::llm::provider::{create_provider, LlmProvider};

/// What a single provider produced: the response text or a displayable error
pub type PanelOutcome = std::result::Result<String, String>;

/// One column of the bench. A seat whose provider could not be built keeps
/// the reason so its panel can show it.
struct Seat {
    label: String,
    provider: std::result::Result<Arc<dyn LlmProvider>, String>,
}

/// Providers compared side by side, in display order
pub struct ProviderBench {
    seats: Vec<Seat>,
}

impl ProviderBench {
    pub fn new(config: &Config, secrets: &Secrets) -> Self {
        let seats = config
            .providers
            .iter()
            .map(|provider_config| {
                let provider = create_provider(provider_config, secrets).map_err(|e| {
                    tracing::warn!("Provider {} unavailable: {}", provider_config.label, e);
                    e.to_string()
                });
                Seat {
                    label: provider_config.label.clone(),
                    provider,
                }
            })
            .collect();

        Self { seats }
    }

    pub fn from_providers(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        let seats = providers
            .into_iter()
            .map(|provider| Seat {
                label: provider.name().to_string(),
                provider: Ok(provider),
            })
            .collect();

        Self { seats }
    }

    /// Add a seat that will only ever report `reason`
    #[cfg(test)]
    pub fn with_unavailable(mut self, label: &str, reason: &str) -> Self {
        self.seats.push(Seat {
            label: label.to_string(),
            provider: Err(reason.to_string()),
        });
        self
    }

    /// Ask every seat concurrently. `on_done` sees each outcome as soon as it
    /// arrives; the returned outcomes are in seat order.
    pub async fn ask<F>(&self, prompt: &str, mut on_done: F) -> Vec<Option<PanelOutcome>>
    where
        F: FnMut(usize, &PanelOutcome),
    {
        let prompt: Arc<str> = Arc::from(prompt);
        let mut outcomes: Vec<Option<PanelOutcome>> = vec![None; self.seats.len()];
        let mut tasks = JoinSet::new();

        for (slot, seat) in self.seats.iter().enumerate() {
            match &seat.provider {
                Ok(provider) => {
                    let provider = Arc::clone(provider);
                    let prompt = Arc::clone(&prompt);
                    tasks.spawn(async move {
                        let outcome = provider.generate(&prompt).await.map_err(|e| e.to_string());
                        (slot, outcome)
                    });
                }
                Err(reason) => {
                    let outcome = Err(reason.clone());
                    on_done(slot, &outcome);
                    outcomes[slot] = Some(outcome);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => {
                    match &outcome {
                        Ok(text) => tracing::info!(
                            "{} answered ({} chars)",
                            self.seats[slot].label,
                            text.chars().count()
                        ),
                        Err(e) => tracing::warn!("{} failed: {}", self.seats[slot].label, e),
                    }
                    on_done(slot, &outcome);
                    outcomes[slot] = Some(outcome);
                }
                Err(e) => tracing::error!("Provider task aborted: {}", e),
            }
        }

        outcomes
    }
}
