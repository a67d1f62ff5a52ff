//! UI module - Ratatui-based terminal interface

mod form;
mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::session::{PanelState, SessionStatus};

pub use form::draw_form;
pub use widgets::*;

/// Draw the main UI
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(10),   // Form + results
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title(frame, chunks[0]);

    // Form on the left, results on the right
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(30)])
        .split(chunks[1]);

    draw_form(frame, app, body[0]);

    let results = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(6)])
        .split(body[1]);

    draw_natal(frame, app, results[0]);
    draw_panels(frame, app, results[1]);
    draw_status_bar(frame, app, chunks[2]);
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = vec![Line::from(vec![
        Span::styled(
            "  natalprobe  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - 星座prompt调试"),
    ])];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(title).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_natal(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" 星盘 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(error) = app.session.error() {
        let paragraph = Paragraph::new(format!("Error: {}", error))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
        return;
    }

    if app.session.status() == SessionStatus::FetchingChart {
        frame.render_widget(
            ThinkingIndicator::new("Fetching chart...").tick(app.tick),
            inner,
        );
        return;
    }

    if let Some(natal) = app.session.natal() {
        let paragraph = Paragraph::new(natal)
            .style(Style::default().fg(Color::LightBlue))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
    }
}

fn draw_panels(frame: &mut Frame, app: &App, area: Rect) {
    let count = app.labels.len().max(1) as u32;
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (slot, (label, panel)) in app.labels.iter().zip(app.session.panels()).enumerate() {
        draw_panel(frame, app, label, panel, columns[slot]);
    }
}

fn draw_panel(frame: &mut Frame, app: &App, label: &str, panel: &PanelState, area: Rect) {
    let border = match panel {
        PanelState::Empty => Color::Gray,
        PanelState::Thinking => Color::Yellow,
        PanelState::Response(_) => Color::Green,
        PanelState::Failed(_) => Color::Red,
    };
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", label),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match panel {
        PanelState::Empty => {}
        PanelState::Thinking => {
            frame.render_widget(ThinkingIndicator::new("Thinking...").tick(app.tick), inner);
        }
        PanelState::Response(text) => {
            let paragraph = Paragraph::new(text.as_str())
                .wrap(Wrap { trim: false })
                .scroll((app.panel_scroll, 0));
            frame.render_widget(paragraph, inner);
        }
        PanelState::Failed(error) => {
            let paragraph = Paragraph::new(format!("Error: {}", error))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, inner);
        }
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (status_text, status_color) = match app.session.status() {
        SessionStatus::Idle => ("Ready - fill in the form and press Ctrl+S", Color::Gray),
        SessionStatus::FetchingChart => ("Fetching natal chart...", Color::Yellow),
        SessionStatus::Thinking => ("Waiting on providers...", Color::Magenta),
        SessionStatus::Complete => ("Done", Color::Green),
        SessionStatus::Error => ("Error occurred - see the chart panel", Color::Red),
    };

    let status = Line::from(vec![
        Span::raw(" Status: "),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw(" | "),
        Span::raw("[Tab] Next field | [↑↓] Change | [PgUp/PgDn] Scroll | [Ctrl+S] Submit | [Esc] Quit"),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}
