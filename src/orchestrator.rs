//! One submission: chart fetch, prompt assembly and the provider fan-out
//!
//! Runs off the UI thread and reports back through a channel so the UI can
//! render each step as soon as it happens.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::chart::ChartSource;
use crate::llm::{PanelOutcome, ProviderBench};
use crate::prompt::build_prompt;

/// Birth facts and template captured from the form at submit time
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// "YYYY-MM-DD HH:MM"
    pub birthday: String,
    /// (longitude, latitude)
    pub coordinate: (f64, f64),
    pub template: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    /// Natal summary lines, ready to display
    NatalReady(Vec<String>),
    /// The chart could not be fetched; nothing else will be asked
    ChartFailed(String),
    /// The prompt is going out to every provider
    Dispatching,
    PanelDone { slot: usize, outcome: PanelOutcome },
    Finished,
}

pub async fn run_submission(
    chart: Arc<dyn ChartSource>,
    bench: ProviderBench,
    submission: Submission,
    events: UnboundedSender<SubmissionEvent>,
) {
    // The receiver only goes away when the UI has quit
    let send = |event: SubmissionEvent| {
        let _ = events.send(event);
    };

    tracing::info!(
        "Submitting {} at ({}, {})",
        submission.birthday,
        submission.coordinate.0,
        submission.coordinate.1
    );

    let lines = match chart.natal(&submission.birthday, submission.coordinate).await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!("Chart request failed: {}", e);
            send(SubmissionEvent::ChartFailed(e.to_string()));
            send(SubmissionEvent::Finished);
            return;
        }
    };

    let natal = lines.join("\n");
    send(SubmissionEvent::NatalReady(lines));

    if natal.is_empty() {
        tracing::info!("Chart returned no planets; skipping providers");
        send(SubmissionEvent::Finished);
        return;
    }

    let prompt = build_prompt(&submission.template, &natal);
    tracing::debug!("Prompt:\n{}", prompt);
    send(SubmissionEvent::Dispatching);

    let outcomes = bench
        .ask(&prompt, |slot, outcome| {
            send(SubmissionEvent::PanelDone {
                slot,
                outcome: outcome.clone(),
            })
        })
        .await;

    let answered = outcomes.iter().filter(|o| matches!(o, Some(Ok(_)))).count();
    tracing::info!("{}/{} providers answered", answered, outcomes.len());

    send(SubmissionEvent::Finished);
}
