//! Per-session state the UI renders from

use crate::orchestrator::SubmissionEvent;

/// What a response panel currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Empty,
    Thinking,
    Response(String),
    Failed(String),
}

/// Coarse progress of the session, for the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    FetchingChart,
    Thinking,
    Complete,
    Error,
}

/// Last natal summary, last panel contents and whether a submission is in flight
#[derive(Debug, Clone)]
pub struct SessionState {
    natal: Option<String>,
    error: Option<String>,
    submitted: bool,
    panels: Vec<PanelState>,
}

impl SessionState {
    pub fn new(panel_count: usize) -> Self {
        Self {
            natal: None,
            error: None,
            submitted: false,
            panels: vec![PanelState::Empty; panel_count],
        }
    }

    /// Mark a submission as started; refused while one is still running
    pub fn begin_submission(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        self.submitted = true;
        self.error = None;
        true
    }

    /// Abort the current submission before anything was sent out
    pub fn fail_submission(&mut self, message: String) {
        self.error = Some(message);
        self.submitted = false;
    }

    pub fn apply(&mut self, event: SubmissionEvent) {
        match event {
            SubmissionEvent::NatalReady(lines) => {
                self.natal = Some(lines.join("\n"));
            }
            SubmissionEvent::ChartFailed(message) => {
                self.error = Some(message);
            }
            SubmissionEvent::Dispatching => {
                self.panels.fill(PanelState::Thinking);
            }
            SubmissionEvent::PanelDone { slot, outcome } => {
                if let Some(panel) = self.panels.get_mut(slot) {
                    *panel = match outcome {
                        Ok(text) => PanelState::Response(text),
                        Err(e) => PanelState::Failed(e),
                    };
                }
            }
            SubmissionEvent::Finished => {
                self.submitted = false;
            }
        }
    }

    pub fn natal(&self) -> Option<&str> {
        self.natal.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.submitted
    }

    pub fn panels(&self) -> &[PanelState] {
        &self.panels
    }

    pub fn status(&self) -> SessionStatus {
        if self.error.is_some() {
            SessionStatus::Error
        } else if self.submitted && self.panels.contains(&PanelState::Thinking) {
            SessionStatus::Thinking
        } else if self.submitted {
            SessionStatus::FetchingChart
        } else if self.natal.is_some() {
            SessionStatus::Complete
        } else {
            SessionStatus::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let session = SessionState::new(3);

        assert!(session.natal().is_none());
        assert!(!session.is_active());
        assert_eq!(session.panels(), &[PanelState::Empty, PanelState::Empty, PanelState::Empty]);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[test]
    fn test_one_submission_at_a_time() {
        let mut session = SessionState::new(3);

        assert!(session.begin_submission());
        assert!(!session.begin_submission());
        assert_eq!(session.status(), SessionStatus::FetchingChart);

        session.apply(SubmissionEvent::Finished);
        assert!(session.begin_submission());
    }

    #[test]
    fn test_panels_follow_events() {
        let mut session = SessionState::new(2);
        session.begin_submission();

        session.apply(SubmissionEvent::NatalReady(vec![
            "太阳落在摩羯座".to_string(),
            "月亮落在白羊座".to_string(),
        ]));
        assert_eq!(session.natal(), Some("太阳落在摩羯座\n月亮落在白羊座"));

        session.apply(SubmissionEvent::Dispatching);
        assert_eq!(session.status(), SessionStatus::Thinking);

        session.apply(SubmissionEvent::PanelDone {
            slot: 1,
            outcome: Err("timeout".to_string()),
        });
        session.apply(SubmissionEvent::PanelDone {
            slot: 0,
            outcome: Ok("answer".to_string()),
        });
        session.apply(SubmissionEvent::Finished);

        assert_eq!(
            session.panels(),
            &[
                PanelState::Response("answer".to_string()),
                PanelState::Failed("timeout".to_string())
            ]
        );
        assert!(!session.is_active());
        assert_eq!(session.status(), SessionStatus::Complete);
    }

    #[test]
    fn test_previous_results_survive_a_failed_chart() {
        let mut session = SessionState::new(1);
        session.begin_submission();
        session.apply(SubmissionEvent::NatalReady(vec!["太阳落在摩羯座".to_string()]));
        session.apply(SubmissionEvent::Dispatching);
        session.apply(SubmissionEvent::PanelDone {
            slot: 0,
            outcome: Ok("first".to_string()),
        });
        session.apply(SubmissionEvent::Finished);

        session.begin_submission();
        session.apply(SubmissionEvent::ChartFailed("HTTP 502".to_string()));
        session.apply(SubmissionEvent::Finished);

        assert_eq!(session.natal(), Some("太阳落在摩羯座"));
        assert_eq!(session.panels(), &[PanelState::Response("first".to_string())]);
        assert_eq!(session.error(), Some("HTTP 502"));
        assert_eq!(session.status(), SessionStatus::Error);
    }

    #[test]
    fn test_out_of_range_slot_is_ignored() {
        let mut session = SessionState::new(1);

        session.apply(SubmissionEvent::PanelDone {
            slot: 5,
            outcome: Ok("x".to_string()),
        });

        assert_eq!(session.panels(), &[PanelState::Empty]);
    }
}
