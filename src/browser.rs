use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::editor::{EditScope, MergeMode, RowField};
use crate::extract::extract_signature;
use crate::fmt::shorten;
use crate::pipeline::{FilterField, Viewport};
use crate::session::ReviewSession;
use crate::tui::{self, FOOTER_STYLE, HEADER_STYLE, JUMP_STYLE, SELECTED_STYLE, WARN_STYLE};

/// Terminal rows render one line high until note wrapping proves otherwise.
const INITIAL_ROW_HEIGHT: f64 = 1.0;

/// Animation ticks a pending jump keeps refining its scroll position
/// before giving up silently.
const JUMP_RETRY_TICKS: u32 = 8;

enum BrowseMode {
    Normal,
    FindSignature(String),
    PickField { selection: usize },
    EditValue { input: String },
    PickScope { selection: usize },
    PickMerge { selection: usize },
    FilterType { selection: usize },
}

pub enum BrowseAction {
    Continue,
    Close,
}

pub struct ReviewBrowser {
    session: ReviewSession,
    viewport: Viewport,
    selected: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    pending_field: Option<RowField>,
    pending_value: String,
    pending_scope: Option<EditScope>,
    pending_scopes: Vec<EditScope>,
    filter_options: Vec<(String, usize)>,
    jump_target: Option<String>,
    jump_retries: u32,
    table_state: TableState,
}

impl ReviewBrowser {
    pub fn new(session: ReviewSession) -> Self {
        Self {
            session,
            viewport: Viewport::new(INITIAL_ROW_HEIGHT, 20.0),
            selected: 0,
            mode: BrowseMode::Normal,
            status_message: None,
            pending_field: None,
            pending_value: String::new(),
            pending_scope: None,
            pending_scopes: Vec::new(),
            filter_options: Vec::new(),
            jump_target: None,
            jump_retries: 0,
            table_state: TableState::default(),
        }
    }

    pub fn into_session(self) -> ReviewSession {
        self.session
    }

    pub fn run(&mut self) -> io::Result<()> {
        if self.session.is_empty() {
            println!("No transactions to review.");
            return Ok(());
        }

        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        loop {
            self.tick(Instant::now());
            terminal.draw(|frame| self.draw_frame(frame))?;

            // Poll instead of blocking so the highlight-clear deadline and
            // jump refinement fire without a keypress.
            if !event::poll(Duration::from_millis(120))? {
                continue;
            }
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }
                match self.handle_key_event(code) {
                    BrowseAction::Close => break,
                    BrowseAction::Continue => {}
                }
            }
        }
        Ok(())
    }

    /// One cooperative step: expire the highlight, refine a pending jump.
    fn tick(&mut self, now: Instant) {
        self.session.tick_highlight(now);
        if self.jump_retries == 0 {
            return;
        }
        let Some(target) = self.jump_target.clone() else {
            self.jump_retries = 0;
            return;
        };
        let visible = self.session.visible();
        let pos = crate::pipeline::locate_signature(self.session.rows(), &visible, &target);
        match pos {
            Some(pos) => {
                let in_window = self
                    .viewport
                    .window(visible.len())
                    .is_some_and(|w| w.contains(pos));
                self.viewport.scroll_offset = self.viewport.center_on(pos);
                self.viewport.clamp_scroll(visible.len());
                if in_window {
                    // mounted: settle on the exact row and stop retrying
                    self.selected = pos;
                    self.jump_retries = 0;
                    self.jump_target = None;
                } else {
                    self.jump_retries -= 1;
                }
            }
            None => {
                self.jump_retries -= 1;
            }
        }
        if self.jump_retries == 0 {
            self.jump_target = None;
        }
    }

    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let panel_height: u16 = match &self.mode {
            BrowseMode::PickField { .. } => 1 + RowField::ALL.len() as u16,
            BrowseMode::PickScope { .. } => 1 + self.pending_scopes.len() as u16,
            BrowseMode::PickMerge { .. } => 1 + MergeMode::ALL.len() as u16,
            BrowseMode::FilterType { .. } => 1 + self.filter_options.len().min(9) as u16,
            BrowseMode::EditValue { .. } => 1,
            _ => 0,
        };

        let areas = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Fill(1),   // table (with spacer markers)
            Constraint::Length(panel_height),
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(area);
        let title_area = areas[0];
        let table_area = areas[1];
        let panel_area = areas[2];
        let status_area = areas[3];
        let keys_area = areas[4];

        frame.render_widget(
            Paragraph::new("Wallet Transaction Review").style(HEADER_STYLE),
            title_area,
        );

        let visible = self.session.visible();
        let total = visible.len();
        if total > 0 {
            self.selected = self.selected.min(total - 1);
        } else {
            self.selected = 0;
        }

        // header + bottom margin + two spacer marker lines
        let header_overhead = 4u16;
        self.viewport.viewport_height =
            f64::from(table_area.height.saturating_sub(header_overhead)).max(1.0);
        self.viewport.clamp_scroll(total);

        let window = self.viewport.window(total);
        let highlight_sig = self.session.highlight().map(|h| h.signature.clone());

        let fixed_cols: u16 = 20 + 10 + 18 + 18 + 14;
        let note_width = (table_area.width.saturating_sub(fixed_cols + 5) as usize).max(10);

        let mut rendered_rows = Vec::new();
        let mut first_height: Option<u16> = None;
        if let Some(w) = window {
            for pos in w.start..=w.end {
                let idx = visible[pos];
                let eff = self.session.effective(idx).unwrap_or_default();
                let (wrapped_note, line_count) = tui::wrap_text(&eff.note, note_width);
                if first_height.is_none() {
                    first_height = Some(line_count);
                }

                let is_jump_row = highlight_sig.as_deref().is_some_and(|sig| {
                    self.session.row(idx).and_then(extract_signature) == Some(sig)
                });
                let market = if eff.market.len() > 14 {
                    shorten(&eff.market)
                } else {
                    eff.market.clone()
                };
                let cells = vec![
                    Cell::from(eff.timestamp.clone()),
                    Cell::from(eff.tx_type.clone()),
                    Cell::from(tui::flow_span(&eff.inflow_amount, &eff.inflow_currency, true)),
                    Cell::from(tui::flow_span(
                        &eff.outflow_amount,
                        &eff.outflow_currency,
                        false,
                    )),
                    Cell::from(market),
                    Cell::from(wrapped_note),
                ];
                let mut row = Row::new(cells).height(line_count);
                if is_jump_row {
                    row = row.style(JUMP_STYLE);
                }
                rendered_rows.push(row);
            }

            // The first rendered row is the height probe; a drift past the
            // tolerance re-measures the whole window next frame.
            if let Some(h) = first_height {
                self.viewport.observe_row_height(f64::from(h));
            }
        }

        let widths = vec![
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(18),
            Constraint::Length(14),
            Constraint::Fill(1),
        ];
        let header = vec!["Timestamp", "Type", "Inflow", "Outflow", "Market", "Note"];

        let (above, below) = match window {
            Some(w) => (w.start, total.saturating_sub(w.end + 1)),
            None => (0, 0),
        };
        let table_areas = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(table_area);
        frame.render_widget(
            Paragraph::new(if above > 0 {
                format!("\u{2191} {above} rows above")
            } else {
                String::new()
            })
            .style(FOOTER_STYLE),
            table_areas[0],
        );
        frame.render_widget(
            Paragraph::new(if below > 0 {
                format!("\u{2193} {below} rows below")
            } else {
                String::new()
            })
            .style(FOOTER_STYLE),
            table_areas[2],
        );

        if let Some(w) = window {
            self.table_state
                .select(Some(self.selected.saturating_sub(w.start).min(w.len() - 1)));
        }
        let table = Table::new(rendered_rows, widths)
            .header(Row::new(header).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        frame.render_stateful_widget(table, table_areas[1], &mut self.table_state);

        if panel_height > 0 {
            frame.render_widget(Paragraph::new(self.panel_lines()), panel_area);
        }

        // Status line
        let pending = self.session.pending_issue_count();
        let filters = self.session.filters.describe();
        let mut status = format!("{total} rows");
        if let Some(w) = window {
            status = format!("Rows {}-{} of {total}", w.start + 1, w.end + 1);
        }
        if pending > 0 {
            status.push_str(&format!(" | {pending} pending issues"));
        }
        if !filters.is_empty() {
            status.push_str(&format!(" | {filters}"));
        }
        if let Some(ref msg) = self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        let status_style = if pending > 0 { WARN_STYLE } else { FOOTER_STYLE };
        frame.render_widget(Paragraph::new(status).style(status_style), status_area);

        let keys = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "\u{2191}/\u{2193}:select  e:edit  u:undo  r:redo  t:type filter  c:clear filters  s:sort  /:find sig  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::FindSignature(input) => {
                Paragraph::new(format!("Find signature: {input}\u{2588}"))
            }
            BrowseMode::EditValue { input } => {
                let field = self.pending_field.map(|f| f.label()).unwrap_or("field");
                Paragraph::new(format!("New {field}: {input}\u{2588}"))
            }
            BrowseMode::PickField { .. }
            | BrowseMode::PickScope { .. }
            | BrowseMode::PickMerge { .. } => {
                Paragraph::new("\u{2191}/\u{2193}:select  Enter:confirm  Esc:cancel")
                    .style(FOOTER_STYLE)
            }
            BrowseMode::FilterType { .. } => {
                Paragraph::new("\u{2191}/\u{2193}:select  Enter/Space:toggle  Esc:done")
                    .style(FOOTER_STYLE)
            }
        };
        frame.render_widget(keys, keys_area);
    }

    fn panel_lines(&self) -> Vec<Line<'static>> {
        let picker = |title: &str, entries: Vec<(String, bool)>, selection: usize| {
            let mut lines = vec![Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(Color::DarkGray),
            ))];
            for (i, (label, checked)) in entries.iter().enumerate() {
                let marker = if i == selection { ">" } else { " " };
                let check = if *checked { "[x]" } else { "   " };
                lines.push(Line::from(format!("  {marker} {check} {label}")));
            }
            lines
        };
        match &self.mode {
            BrowseMode::PickField { selection } => picker(
                "Edit which field?",
                RowField::ALL
                    .iter()
                    .map(|f| (f.label().to_string(), false))
                    .collect(),
                *selection,
            ),
            BrowseMode::PickScope { selection } => picker(
                "Apply to:",
                self.pending_scopes
                    .iter()
                    .map(|s| (s.label().to_string(), false))
                    .collect(),
                *selection,
            ),
            BrowseMode::PickMerge { selection } => picker(
                "Merge mode:",
                MergeMode::ALL
                    .iter()
                    .map(|m| (m.label().to_string(), false))
                    .collect(),
                *selection,
            ),
            BrowseMode::FilterType { selection } => picker(
                "Show types:",
                self.filter_options
                    .iter()
                    .take(9)
                    .map(|(value, count)| {
                        (
                            format!("{value} ({count})"),
                            self.session.filters.is_accepted(FilterField::Type, value),
                        )
                    })
                    .collect(),
                *selection,
            ),
            BrowseMode::EditValue { input } => {
                let field = self.pending_field.map(|f| f.label()).unwrap_or("field");
                vec![Line::from(format!("  {field}: {input}\u{2588}"))]
            }
            _ => vec![],
        }
    }

    pub fn handle_key_event(&mut self, code: KeyCode) -> BrowseAction {
        self.status_message = None;

        match &self.mode {
            BrowseMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
                KeyCode::Down => self.move_selection(1),
                KeyCode::Up => self.move_selection(-1),
                KeyCode::PageDown => {
                    let step = (self.viewport.viewport_height / self.viewport.row_height) as isize;
                    self.move_selection(step.max(1));
                }
                KeyCode::PageUp => {
                    let step = (self.viewport.viewport_height / self.viewport.row_height) as isize;
                    self.move_selection(-step.max(1));
                }
                KeyCode::Home => {
                    self.selected = 0;
                    self.viewport.scroll_offset = 0.0;
                }
                KeyCode::End => {
                    let total = self.session.visible().len();
                    if total > 0 {
                        self.selected = total - 1;
                        self.viewport.ensure_visible(self.selected, total);
                    }
                }
                KeyCode::Char('e') | KeyCode::Enter => {
                    if !self.session.visible().is_empty() {
                        self.mode = BrowseMode::PickField { selection: 0 };
                    }
                }
                KeyCode::Char('u') => {
                    if self.session.undo() {
                        self.status_message = Some("Undone".to_string());
                    } else {
                        self.status_message = Some("Nothing to undo".to_string());
                    }
                }
                KeyCode::Char('r') => {
                    if self.session.redo() {
                        self.status_message = Some("Redone".to_string());
                    } else {
                        self.status_message = Some("Nothing to redo".to_string());
                    }
                }
                KeyCode::Char('s') => {
                    self.session.sort = self.session.sort.toggled();
                }
                KeyCode::Char('t') => {
                    self.filter_options = self.session.option_counts(FilterField::Type);
                    if !self.filter_options.is_empty() {
                        self.mode = BrowseMode::FilterType { selection: 0 };
                    }
                }
                KeyCode::Char('c') => {
                    self.session.filters.clear();
                    self.status_message = Some("Filters cleared".to_string());
                }
                KeyCode::Char('/') => {
                    self.mode = BrowseMode::FindSignature(String::new());
                }
                _ => {}
            },
            BrowseMode::FindSignature(_) => match code {
                KeyCode::Esc => self.mode = BrowseMode::Normal,
                KeyCode::Enter => self.submit_find(),
                KeyCode::Backspace => {
                    if let BrowseMode::FindSignature(s) = &mut self.mode {
                        s.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let BrowseMode::FindSignature(s) = &mut self.mode {
                        s.push(c);
                    }
                }
                _ => {}
            },
            BrowseMode::PickField { .. } => self.handle_pick_field(code),
            BrowseMode::EditValue { .. } => self.handle_edit_value(code),
            BrowseMode::PickScope { .. } => self.handle_pick_scope(code),
            BrowseMode::PickMerge { .. } => self.handle_pick_merge(code),
            BrowseMode::FilterType { .. } => self.handle_filter_type(code),
        }
        BrowseAction::Continue
    }

    fn move_selection(&mut self, delta: isize) {
        let total = self.session.visible().len();
        if total == 0 {
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, total as isize - 1) as usize;
        self.viewport.ensure_visible(self.selected, total);
    }

    fn selected_row_index(&self) -> Option<usize> {
        self.session.visible().get(self.selected).copied()
    }

    fn submit_find(&mut self) {
        let mode = std::mem::replace(&mut self.mode, BrowseMode::Normal);
        let BrowseMode::FindSignature(input) = mode else {
            return;
        };
        let sig = input.trim().to_string();
        match self.session.jump_to_signature(&sig, Instant::now()) {
            Some(pos) => {
                self.selected = pos;
                self.viewport.scroll_offset = self.viewport.center_on(pos);
                self.jump_target = Some(sig);
                self.jump_retries = JUMP_RETRY_TICKS;
            }
            None => {
                self.status_message = Some(format!("Signature {} not found", shorten(&sig)));
            }
        }
    }

    fn handle_pick_field(&mut self, code: KeyCode) {
        let count = RowField::ALL.len();
        match code {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Up => {
                if let BrowseMode::PickField { selection } = &mut self.mode {
                    *selection = selection.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if let BrowseMode::PickField { selection } = &mut self.mode {
                    if *selection + 1 < count {
                        *selection += 1;
                    }
                }
            }
            KeyCode::Enter => {
                let BrowseMode::PickField { selection } = &self.mode else {
                    return;
                };
                let field = RowField::ALL[*selection];
                self.pending_field = Some(field);
                let current = self
                    .selected_row_index()
                    .and_then(|i| self.session.row(i))
                    .map(|r| field.get(r).to_string())
                    .unwrap_or_default();
                self.mode = BrowseMode::EditValue { input: current };
            }
            _ => {}
        }
    }

    fn handle_edit_value(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Backspace => {
                if let BrowseMode::EditValue { input } = &mut self.mode {
                    input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let BrowseMode::EditValue { input } = &mut self.mode {
                    input.push(c);
                }
            }
            KeyCode::Enter => {
                let mode = std::mem::replace(&mut self.mode, BrowseMode::Normal);
                let BrowseMode::EditValue { input } = mode else {
                    return;
                };
                self.pending_value = input;
                let Some(idx) = self.selected_row_index() else {
                    self.cancel_edit();
                    return;
                };
                let row = self.session.row(idx).cloned().unwrap_or_default();
                self.pending_scopes = EditScope::ALL
                    .iter()
                    .copied()
                    .filter(|s| s.available(&row))
                    .collect();
                self.mode = BrowseMode::PickScope { selection: 0 };
            }
            _ => {}
        }
    }

    fn handle_pick_scope(&mut self, code: KeyCode) {
        let count = self.pending_scopes.len();
        match code {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Up => {
                if let BrowseMode::PickScope { selection } = &mut self.mode {
                    *selection = selection.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if let BrowseMode::PickScope { selection } = &mut self.mode {
                    if *selection + 1 < count {
                        *selection += 1;
                    }
                }
            }
            KeyCode::Enter => {
                let BrowseMode::PickScope { selection } = &self.mode else {
                    return;
                };
                let Some(&scope) = self.pending_scopes.get(*selection) else {
                    return;
                };
                // prefix/suffix only make sense for free text
                let offer_merge = self
                    .pending_field
                    .is_some_and(|f| f.is_free_text());
                if offer_merge {
                    self.pending_scopes.clear();
                    self.mode = BrowseMode::PickMerge { selection: 0 };
                    self.pending_scope = Some(scope);
                } else {
                    self.commit_edit(scope, MergeMode::Replace);
                }
            }
            _ => {}
        }
    }

    fn handle_pick_merge(&mut self, code: KeyCode) {
        let count = MergeMode::ALL.len();
        match code {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Up => {
                if let BrowseMode::PickMerge { selection } = &mut self.mode {
                    *selection = selection.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if let BrowseMode::PickMerge { selection } = &mut self.mode {
                    if *selection + 1 < count {
                        *selection += 1;
                    }
                }
            }
            KeyCode::Enter => {
                let BrowseMode::PickMerge { selection } = &self.mode else {
                    return;
                };
                let merge = MergeMode::ALL[*selection];
                if let Some(scope) = self.pending_scope.take() {
                    self.commit_edit(scope, merge);
                }
            }
            _ => {}
        }
    }

    fn handle_filter_type(&mut self, code: KeyCode) {
        let count = self.filter_options.len().min(9);
        match code {
            KeyCode::Esc => {
                self.mode = BrowseMode::Normal;
                self.filter_options.clear();
            }
            KeyCode::Up => {
                if let BrowseMode::FilterType { selection } = &mut self.mode {
                    *selection = selection.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if let BrowseMode::FilterType { selection } = &mut self.mode {
                    if *selection + 1 < count {
                        *selection += 1;
                    }
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let BrowseMode::FilterType { selection } = &self.mode else {
                    return;
                };
                if let Some((value, _)) = self.filter_options.get(*selection) {
                    let value = value.clone();
                    self.session.filters.toggle(FilterField::Type, &value);
                }
            }
            _ => {}
        }
    }

    fn commit_edit(&mut self, scope: EditScope, merge: MergeMode) {
        self.mode = BrowseMode::Normal;
        let Some(field) = self.pending_field.take() else {
            return;
        };
        let value = std::mem::take(&mut self.pending_value);
        self.pending_scopes.clear();

        let Some(idx) = self.selected_row_index() else {
            return;
        };
        let Some(target) = self.session.edit_target(idx, field) else {
            return;
        };
        let touched = self.session.apply_edit(&target, scope, &value, merge);
        self.status_message = if touched == 0 {
            Some(format!("{} unavailable here, nothing changed", scope.label()))
        } else {
            Some(format!("Updated {touched} row(s) ({})", target.label))
        };
    }

    fn cancel_edit(&mut self) {
        self.mode = BrowseMode::Normal;
        self.pending_field = None;
        self.pending_value.clear();
        self.pending_scope = None;
        self.pending_scopes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OverrideMap, TxRow};
    use std::collections::BTreeSet;

    const S1: &str = "4fYNw3dojWmQ4dXtSGE9epjRGy9pFSx62YypT7avPYvp";

    fn make_rows(n: usize) -> Vec<TxRow> {
        (0..n)
            .map(|i| {
                let mut r = TxRow {
                    timestamp: format!("2025-01-{:02} 10:00:00", (i % 28) + 1),
                    tx_type: if i % 2 == 0 { "Trade" } else { "Fee" }.to_string(),
                    inflow_amount: "1".to_string(),
                    inflow_currency: "SOL".to_string(),
                    market: "Jupiter".to_string(),
                    note: format!("txn {i}"),
                    ..TxRow::default()
                };
                r.extra.insert("signer".to_string(), S1.to_string());
                r
            })
            .collect()
    }

    fn browser(n: usize) -> ReviewBrowser {
        let session = ReviewSession::new(make_rows(n), OverrideMap::default(), BTreeSet::new());
        ReviewBrowser::new(session)
    }

    #[test]
    fn test_close_on_q() {
        let mut b = browser(5);
        assert!(matches!(b.handle_key_event(KeyCode::Char('q')), BrowseAction::Close));
    }

    #[test]
    fn test_selection_moves_and_clamps() {
        let mut b = browser(3);
        b.handle_key_event(KeyCode::Down);
        assert_eq!(b.selected, 1);
        b.handle_key_event(KeyCode::Down);
        b.handle_key_event(KeyCode::Down);
        assert_eq!(b.selected, 2); // clamped at last row
        b.handle_key_event(KeyCode::Up);
        assert_eq!(b.selected, 1);
    }

    #[test]
    fn test_selection_scrolls_viewport() {
        let mut b = browser(100);
        for _ in 0..50 {
            b.handle_key_event(KeyCode::Down);
        }
        assert_eq!(b.selected, 50);
        let w = b.viewport.window(100).unwrap();
        assert!(w.contains(50));
    }

    #[test]
    fn test_home_and_end() {
        let mut b = browser(100);
        b.handle_key_event(KeyCode::End);
        assert_eq!(b.selected, 99);
        assert!(b.viewport.scroll_offset > 0.0);
        b.handle_key_event(KeyCode::Home);
        assert_eq!(b.selected, 0);
        assert_eq!(b.viewport.scroll_offset, 0.0);
    }

    #[test]
    fn test_edit_flow_replaces_field() {
        let mut b = browser(4);
        b.handle_key_event(KeyCode::Char('e'));
        assert!(matches!(b.mode, BrowseMode::PickField { .. }));

        // second entry is the type field
        b.handle_key_event(KeyCode::Down);
        b.handle_key_event(KeyCode::Enter);
        assert!(matches!(b.mode, BrowseMode::EditValue { .. }));

        // clear the prefilled value, type the new one
        for _ in 0..10 {
            b.handle_key_event(KeyCode::Backspace);
        }
        for c in "Income".chars() {
            b.handle_key_event(KeyCode::Char(c));
        }
        b.handle_key_event(KeyCode::Enter);
        assert!(matches!(b.mode, BrowseMode::PickScope { .. }));

        // first scope is "this row only"
        b.handle_key_event(KeyCode::Enter);
        assert!(matches!(b.mode, BrowseMode::Normal));
        assert_eq!(b.session.row(0).unwrap().tx_type, "Income");
        assert_eq!(b.session.row(2).unwrap().tx_type, "Trade");
    }

    #[test]
    fn test_note_edit_offers_merge_modes() {
        let mut b = browser(2);
        b.pending_field = Some(RowField::Note);
        b.mode = BrowseMode::EditValue {
            input: "note:".to_string(),
        };
        b.handle_key_event(KeyCode::Enter); // -> PickScope
        b.handle_key_event(KeyCode::Enter); // scope One -> PickMerge
        assert!(matches!(b.mode, BrowseMode::PickMerge { .. }));
        b.handle_key_event(KeyCode::Down); // prefix
        b.handle_key_event(KeyCode::Enter);
        assert_eq!(b.session.row(0).unwrap().note, "note:txn 0");
    }

    #[test]
    fn test_esc_cancels_edit() {
        let mut b = browser(2);
        b.handle_key_event(KeyCode::Char('e'));
        b.handle_key_event(KeyCode::Esc);
        assert!(matches!(b.mode, BrowseMode::Normal));
        assert!(b.pending_field.is_none());
    }

    #[test]
    fn test_undo_redo_keys() {
        let mut b = browser(2);
        let target = b.session.edit_target(0, RowField::Note).unwrap();
        b.session
            .apply_edit(&target, EditScope::One, "edited", MergeMode::Replace);
        b.handle_key_event(KeyCode::Char('u'));
        assert_eq!(b.session.row(0).unwrap().note, "txn 0");
        b.handle_key_event(KeyCode::Char('r'));
        assert_eq!(b.session.row(0).unwrap().note, "edited");
    }

    #[test]
    fn test_type_filter_toggle() {
        let mut b = browser(10);
        b.handle_key_event(KeyCode::Char('t'));
        assert!(matches!(b.mode, BrowseMode::FilterType { .. }));
        // options sorted by count desc; 10 rows -> 5 Trade, 5 Fee, tie broken
        // alphabetically so "Fee" is first
        b.handle_key_event(KeyCode::Enter);
        assert!(b.session.filters.is_accepted(FilterField::Type, "Fee"));
        b.handle_key_event(KeyCode::Esc);
        assert_eq!(b.session.visible().len(), 5);
        b.handle_key_event(KeyCode::Char('c'));
        assert_eq!(b.session.visible().len(), 10);
    }

    #[test]
    fn test_find_signature_jumps_and_retries() {
        let mut b = browser(50);
        let sig = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
        {
            let target = b.session.edit_target(40, RowField::Note).unwrap();
            // plant a findable signature via a note marker edit
            b.session.apply_edit(
                &target,
                EditScope::One,
                &format!("txn 40 sig:{sig}"),
                MergeMode::Replace,
            );
        }
        b.mode = BrowseMode::FindSignature(sig.to_string());
        b.handle_key_event(KeyCode::Enter);
        assert!(b.jump_retries > 0 || b.jump_target.is_none());
        b.tick(Instant::now());
        // after the refinement tick the row is selected and highlighted
        let visible = b.session.visible();
        assert_eq!(visible[b.selected], 40);
        assert!(b.session.highlight().is_some());
        assert_eq!(b.jump_retries, 0);
    }

    #[test]
    fn test_find_unknown_signature_reports() {
        let mut b = browser(5);
        b.mode = BrowseMode::FindSignature("zzzz".to_string());
        b.handle_key_event(KeyCode::Enter);
        assert!(b.status_message.as_ref().unwrap().contains("not found"));
        assert_eq!(b.jump_retries, 0);
    }

    #[test]
    fn test_find_multibyte_input_reports_without_panicking() {
        let mut b = browser(3);
        b.mode = BrowseMode::FindSignature("取引署名がこれだけ長いと四文字境界".to_string());
        b.handle_key_event(KeyCode::Enter);
        assert!(b.status_message.as_ref().unwrap().contains("not found"));
    }

    #[test]
    fn test_jump_gives_up_after_bounded_ticks() {
        let mut b = browser(5);
        b.jump_target = Some("never found".to_string());
        b.jump_retries = JUMP_RETRY_TICKS;
        for _ in 0..JUMP_RETRY_TICKS {
            b.tick(Instant::now());
        }
        assert_eq!(b.jump_retries, 0);
        assert!(b.jump_target.is_none());
    }
}
