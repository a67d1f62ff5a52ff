//! Application state management

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::chart::{ChartSource, XingpanClient};
use crate::config::{Config, Secrets};
use crate::form::{BirthForm, Field};
use crate::llm::ProviderBench;
use crate::orchestrator::{run_submission, Submission, SubmissionEvent};
use crate::region::LocationIndex;
use crate::session::SessionState;

/// Application state
pub struct App {
    /// Configuration
    pub config: Config,

    /// Secrets store backing `$NAME` references, reloaded on every submit
    pub secrets: Secrets,

    /// Flattened region data behind the place selectors
    pub index: LocationIndex,

    /// Birth form
    pub form: BirthForm,

    /// Natal summary and panel contents
    pub session: SessionState,

    /// Response column titles
    pub labels: Vec<String>,

    /// Scroll offset shared by the response panels
    pub panel_scroll: u16,

    /// Animation tick counter
    pub tick: u64,

    events_tx: UnboundedSender<SubmissionEvent>,
    events_rx: UnboundedReceiver<SubmissionEvent>,
}

impl App {
    pub fn new(config: Config, regions_path: Option<PathBuf>) -> Result<Self> {
        let secrets = Secrets::load(&config.secrets_path)?;
        let regions_path = regions_path.unwrap_or_else(|| config.regions_path.clone());
        let index = LocationIndex::load(&regions_path)?;

        Ok(Self::with_parts(config, secrets, index))
    }

    pub fn with_parts(config: Config, secrets: Secrets, index: LocationIndex) -> Self {
        let labels: Vec<String> = config.providers.iter().map(|p| p.label.clone()).collect();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            session: SessionState::new(labels.len()),
            config,
            secrets,
            index,
            form: BirthForm::new(),
            labels,
            panel_scroll: 0,
            tick: 0,
            events_tx,
            events_rx,
        }
    }

    /// Capture the form as a submission
    pub fn submission(&self) -> std::result::Result<Submission, String> {
        let birthday = self
            .form
            .birthday()
            .ok_or_else(|| "Invalid birth date".to_string())?;
        let coordinate = self.form.coordinate(&self.index).ok_or_else(|| {
            format!(
                "No coordinate for '{}'",
                self.form.location_label(&self.index)
            )
        })?;

        Ok(Submission {
            birthday,
            coordinate,
            template: self.form.template.clone(),
        })
    }

    /// Submit the form against the configured chart API and providers
    pub fn submit(&mut self) {
        if self.session.is_active() {
            return;
        }

        match Secrets::load(&self.config.secrets_path) {
            Ok(secrets) => self.secrets = secrets,
            Err(e) => {
                tracing::warn!("Cannot read secrets store: {}", e);
                self.session.fail_submission(e.to_string());
                return;
            }
        }

        let chart = self
            .secrets
            .resolve(&self.config.chart.access_token)
            .and_then(|token| XingpanClient::new(&self.config.chart, token));
        let chart: Arc<dyn ChartSource> = match chart {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::warn!("Cannot reach chart API: {}", e);
                self.session.fail_submission(e.to_string());
                return;
            }
        };
        let bench = ProviderBench::new(&self.config, &self.secrets);

        self.launch(chart, bench);
    }

    /// Start a submission in the background with the given collaborators
    pub fn launch(&mut self, chart: Arc<dyn ChartSource>, bench: ProviderBench) {
        let submission = match self.submission() {
            Ok(submission) => submission,
            Err(message) => {
                self.session.fail_submission(message);
                return;
            }
        };

        if !self.session.begin_submission() {
            return;
        }

        self.panel_scroll = 0;
        tokio::spawn(run_submission(
            chart,
            bench,
            submission,
            self.events_tx.clone(),
        ));
    }

    /// Handle a key press; returns true when the app should quit.
    ///
    /// Enter submits except in the template editor, where it starts a new
    /// line. Ctrl+S submits from anywhere.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let editing = self.form.focus == Field::Template;
        let control = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if control => return true,
            KeyCode::Char('s') if control => self.submit(),
            KeyCode::Char('q') if !editing => return true,
            KeyCode::Enter if editing => self.form.input_char('\n'),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => self.next_field(),
            KeyCode::BackTab => self.prev_field(),
            KeyCode::Up => self.adjust(-1),
            KeyCode::Down => self.adjust(1),
            KeyCode::Left if editing => self.form.move_cursor_left(),
            KeyCode::Right if editing => self.form.move_cursor_right(),
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Char(c) => self.form.input_char(c),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::PageUp => self.scroll_up(),
            KeyCode::PageDown => self.scroll_down(),
            _ => {}
        }
        false
    }

    /// Apply whatever the background submission has reported so far
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.session.apply(event);
        }
    }

    /// Update animation tick
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.drain_events();
    }

    pub fn next_field(&mut self) {
        self.form.next_field(&self.index);
    }

    pub fn prev_field(&mut self) {
        self.form.prev_field(&self.index);
    }

    pub fn adjust(&mut self, delta: i32) {
        self.form.adjust(&self.index, delta);
    }

    /// Scroll panels up
    pub fn scroll_up(&mut self) {
        self.panel_scroll = self.panel_scroll.saturating_sub(5);
    }

    /// Scroll panels down
    pub fn scroll_down(&mut self) {
        self.panel_scroll = self.panel_scroll.saturating_add(5);
    }
}
