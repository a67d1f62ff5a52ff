//! Custom Ratatui widgets for natalprobe

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

const FRAMES: [char; 4] = ['▓', '▒', '░', '▒'];

/// Animated "waiting on the network" indicator
pub struct ThinkingIndicator<'a> {
    pub label: &'a str,
    pub style: Style,
    pub tick: u64,
}

impl<'a> ThinkingIndicator<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            style: Style::default().fg(Color::Yellow),
            tick: 0,
        }
    }

    pub fn tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    fn bar(&self, width: usize) -> String {
        let offset = (self.tick / 3) as usize;
        (0..width)
            .map(|i| FRAMES[(i + offset) % FRAMES.len()])
            .collect()
    }
}

impl Widget for ThinkingIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        let bar_width = (area.width as usize).min(6);
        let line = format!("{} {}", self.bar(bar_width), self.label);
        buf.set_stringn(area.left(), area.top(), line, area.width as usize, self.style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_animates() {
        let first = ThinkingIndicator::new("Thinking...").tick(0).bar(4);
        let later = ThinkingIndicator::new("Thinking...").tick(3).bar(4);

        assert_eq!(first.chars().count(), 4);
        assert_ne!(first, later);
    }

    #[test]
    fn test_render_fits_area() {
        let area = Rect::new(0, 0, 8, 1);
        let mut buf = Buffer::empty(area);

        ThinkingIndicator::new("Thinking...").render(area, &mut buf);

        let rendered: String = (0..8u16)
            .map(|x| buf[(x, 0u16)].symbol().to_string())
            .collect();
        assert!(rendered.starts_with("▓▒░▒▓▒ T"));
    }
}
