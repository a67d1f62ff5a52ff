//! Sidebar rendering: the birth form

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::form::Field;

/// Draw the input sidebar
pub fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" 输入 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(13), // Selectors
            Constraint::Min(4),     // Template
            Constraint::Length(1),  // Submit hint
        ])
        .split(inner);

    draw_selectors(frame, app, chunks[0]);
    draw_template(frame, app, chunks[1]);

    let hint = if app.session.is_active() {
        Span::styled(" 提交中...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" [Ctrl+S] 提交", Style::default().fg(Color::Green))
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), chunks[2]);
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn selector<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let (open, close) = if focused { ("◀ ", " ▶") } else { ("  ", "  ") };

    Line::from(vec![
        Span::styled(format!("  {} ", label), Style::default().fg(Color::Gray)),
        Span::styled(format!("{}{}{}", open, value, close), value_style),
    ])
}

fn draw_selectors(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.form;
    let index = &app.index;
    let focused = |field: Field| form.focus == field;
    let none = || "—".to_string();

    let lines = vec![
        heading("生日"),
        selector("年", form.year.to_string(), focused(Field::Year)),
        selector("月", format!("{:02}", form.month), focused(Field::Month)),
        selector("日", format!("{:02}", form.day), focused(Field::Day)),
        heading("出生时间"),
        selector("时", format!("{:02}", form.hour), focused(Field::Hour)),
        selector("分", format!("{:02}", form.minute), focused(Field::Minute)),
        heading("出生地点"),
        selector(
            "省",
            form.province_name(index).map_or_else(none, str::to_string),
            focused(Field::Province),
        ),
        selector(
            "市",
            form.city_name(index).map_or_else(none, str::to_string),
            focused(Field::City),
        ),
        selector(
            "区",
            form.district_name(index).map_or_else(none, str::to_string),
            focused(Field::District),
        ),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_template(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.form.focus == Field::Template;
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };

    let block = Block::default()
        .title(" 自定义Prompt模板 ")
        .borders(Borders::ALL)
        .border_style(style);
    let inner = block.inner(area);

    let template = Paragraph::new(app.form.template.as_str())
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(template, area);

    // Show cursor if focused
    if focused && inner.width > 0 {
        let (column, row) = app.form.cursor_position(inner.width as usize);
        let cursor_x = inner.x + column as u16;
        let cursor_y = inner.y + (row as u16).min(inner.height.saturating_sub(1));
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}
