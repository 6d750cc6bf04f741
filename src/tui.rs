use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::fmt::amount;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_IN_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_OUT_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const JUMP_STYLE: Style = Style::new()
    .bg(Color::Rgb(90, 70, 10))
    .add_modifier(Modifier::BOLD);

pub const WARN_STYLE: Style = Style::new().fg(Color::Rgb(230, 170, 60));

/// Format a flow column as a colored Span: green inflows, red outflows.
pub fn flow_span(raw_amount: &str, currency: &str, inflow: bool) -> Span<'static> {
    if raw_amount.trim().is_empty() && currency.trim().is_empty() {
        return Span::raw("");
    }
    let value = crate::fmt::parse_amount(raw_amount);
    let style = if inflow { AMOUNT_IN_STYLE } else { AMOUNT_OUT_STYLE };
    Span::styled(format!("{} {}", amount(value), currency), style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}
