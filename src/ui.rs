//! Terminal UI rendering for the maestro TUI.
//!
//! Minimal chrome: no box drawing, dim uppercase labels, whitespace as
//! structure. The page is a single form: saved orchestrations and the name
//! field on the left; definition, result and log on the right.
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::render::RenderState;
use crate::tea::{Focus, Notification, NotificationLevel};

// Color tokens (selection uses REVERSED modifier to adapt to terminal theme)
const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;
const COLOR_KEY_PRESENT: Color = Color::Green;
const COLOR_KEY_MISSING: Color = Color::Red;

// Layout constants
const CATALOG_WIDTH: u16 = 32;
const NAME_HEIGHT: u16 = 3;

const NO_RESULT: &str = "No result yet. Execute an orchestration to see output.";
const NO_LOGS: &str = "No logs yet.";
const RUNNING: &str = "Executing orchestration... Please wait.";

// -----------------------------------------------------------------------------
// Context-sensitive keymap system
// -----------------------------------------------------------------------------

/// Context for determining which keybindings to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapContext {
    Catalog,
    Name,
    Editor,
    /// A run is in flight; only quit is accepted
    Running,
}

impl KeymapContext {
    pub fn from_render_state(state: &RenderState) -> Self {
        if state.running {
            return KeymapContext::Running;
        }
        match state.focus {
            Focus::Catalog => KeymapContext::Catalog,
            Focus::Name => KeymapContext::Name,
            Focus::Editor => KeymapContext::Editor,
        }
    }
}

/// A single keybinding entry for display.
struct Keybinding(&'static str, &'static str);

/// A group of related keybindings (separated by │).
struct KeybindingGroup(Vec<Keybinding>);

fn keybindings_for_context(ctx: KeymapContext) -> Vec<KeybindingGroup> {
    match ctx {
        KeymapContext::Catalog => vec![
            KeybindingGroup(vec![Keybinding("j/k", "move"), Keybinding("Enter", "open")]),
            KeybindingGroup(vec![
                Keybinding("s", "save"),
                Keybinding("d", "delete"),
                Keybinding("e", "example"),
                Keybinding("c", "clear"),
            ]),
            KeybindingGroup(vec![Keybinding("r", "run"), Keybinding("p", "provider")]),
            KeybindingGroup(vec![Keybinding("PgUp/PgDn", "result")]),
            KeybindingGroup(vec![Keybinding("Tab", "focus"), Keybinding("q", "quit")]),
        ],
        KeymapContext::Name => vec![
            KeybindingGroup(vec![Keybinding("Enter", "save"), Keybinding("Esc", "back")]),
            KeybindingGroup(vec![Keybinding("^R", "run"), Keybinding("^P", "provider")]),
            KeybindingGroup(vec![Keybinding("Tab", "focus"), Keybinding("^Q", "quit")]),
        ],
        KeymapContext::Editor => vec![
            KeybindingGroup(vec![Keybinding("Esc", "back"), Keybinding("PgUp/PgDn", "result")]),
            KeybindingGroup(vec![
                Keybinding("^S", "save"),
                Keybinding("^D", "delete"),
                Keybinding("^E", "example"),
                Keybinding("^K", "clear"),
            ]),
            KeybindingGroup(vec![Keybinding("^R", "run"), Keybinding("^P", "provider")]),
            KeybindingGroup(vec![Keybinding("Tab", "focus"), Keybinding("^Q", "quit")]),
        ],
        KeymapContext::Running => vec![KeybindingGroup(vec![Keybinding("^Q", "quit")])],
    }
}

/// Main render function - entry point for all UI drawing.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    render_main_layout(frame, state);

    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, frame.area());
    }
}

/// Header, body, separator, status bar.
fn render_main_layout(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();

    if area.height < 4 {
        render_statusbar(frame, state, area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_header(frame, state, chunks[0]);
    render_body(frame, state, chunks[1]);
    render_separator(frame, chunks[2]);
    render_statusbar(frame, state, chunks[3]);
}

fn render_header(frame: &mut Frame, state: &RenderState, area: Rect) {
    let var = state.provider.credential_var();
    let (key_label, key_color) = if state.credential_present {
        (format!("{} set", var), COLOR_KEY_PRESENT)
    } else {
        (format!("{} missing", var), COLOR_KEY_MISSING)
    };

    let mut spans = vec![
        Span::styled("maestro", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("  provider ", Style::default().fg(COLOR_TEXT_MUTED)),
        Span::styled(state.provider.label(), Style::default()),
        Span::styled("  ", Style::default()),
        Span::styled(key_label, Style::default().fg(key_color)),
    ];

    if state.running {
        let badge = " RUNNING ";
        let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let spacer_width = (area.width as usize)
            .saturating_sub(content_width)
            .saturating_sub(badge.len());
        if spacer_width > 0 {
            spans.push(Span::raw(" ".repeat(spacer_width)));
        }
        spans.push(Span::styled(
            badge,
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(frame: &mut Frame, state: &RenderState, area: Rect) {
    let catalog_width = CATALOG_WIDTH.min(area.width / 3);
    let columns =
        Layout::horizontal([Constraint::Length(catalog_width), Constraint::Fill(1)]).split(area);

    let left = Layout::vertical([Constraint::Fill(1), Constraint::Length(NAME_HEIGHT)])
        .split(columns[0]);
    render_catalog(frame, state, left[0]);
    render_name(frame, state, left[1]);

    let right = Layout::vertical([
        Constraint::Percentage(55),
        Constraint::Percentage(20),
        Constraint::Percentage(25),
    ])
    .split(inset_left(columns[1], 2));
    render_editor(frame, state, right[0]);
    render_result(frame, state, right[1]);
    render_log(frame, state, right[2]);
}

fn inset_left(area: Rect, by: u16) -> Rect {
    let by = by.min(area.width);
    Rect {
        x: area.x + by,
        width: area.width - by,
        ..area
    }
}

/// Section label; bright when the section has focus.
fn label_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(COLOR_TEXT_DIMMED)
            .add_modifier(Modifier::BOLD)
    };
    Line::from(Span::styled(label.to_uppercase(), style))
}

fn render_catalog(frame: &mut Frame, state: &RenderState, area: Rect) {
    let focused = state.focus == Focus::Catalog && !state.running;
    let content_height = area.height.saturating_sub(1) as usize;
    let (start, end) = scroll_window(state.catalog.len(), state.catalog_cursor, content_height);

    let mut lines = Vec::with_capacity(content_height + 1);
    lines.push(label_line(Focus::Catalog.label(), focused));

    for (idx, row) in state.catalog.iter().enumerate().take(end).skip(start) {
        let is_selected = idx > 0 && state.selected.as_deref() == Some(row.as_str());
        let marker = if is_selected { "› " } else { "  " };
        let text = truncate(&format!("{}{}", marker, row), area.width as usize);
        let style = if idx == state.catalog_cursor && focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else if idx == 0 {
            Style::default().fg(COLOR_TEXT_MUTED)
        } else if is_selected {
            Style::default()
        } else {
            Style::default().fg(COLOR_TEXT_DIMMED)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_name(frame: &mut Frame, state: &RenderState, area: Rect) {
    let focused = state.focus == Focus::Name && !state.running;
    let width = area.width as usize;
    let value = if state.editing_name.is_empty() && !focused {
        Span::styled("(unnamed)", Style::default().fg(COLOR_TEXT_MUTED))
    } else {
        let visible: String = tail_chars(&state.editing_name, width.saturating_sub(1));
        Span::styled(visible, Style::default().fg(Color::White))
    };

    let mut value_line = vec![value];
    if focused {
        value_line.push(Span::styled(
            "_",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    let lines = vec![
        Line::from(""),
        label_line(Focus::Name.label(), focused),
        Line::from(value_line),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_editor(frame: &mut Frame, state: &RenderState, area: Rect) {
    let focused = state.focus == Focus::Editor && !state.running;
    let content_height = area.height.saturating_sub(1) as usize;
    let width = area.width as usize;

    let text_lines: Vec<&str> = state.definition_text.split('\n').collect();
    let (start, end) = scroll_window(text_lines.len(), state.cursor_line, content_height);
    let h_offset = if focused {
        state.cursor_col.saturating_sub(width.saturating_sub(1))
    } else {
        0
    };

    let mut lines = Vec::with_capacity(content_height + 1);
    lines.push(label_line(Focus::Editor.label(), focused));
    lines.extend(text_lines[start..end].iter().map(|l| {
        let visible: String = l.chars().skip(h_offset).take(width).collect();
        Line::from(Span::raw(visible))
    }));
    frame.render_widget(Paragraph::new(lines), area);

    if focused && content_height > 0 {
        let x = area.x + (state.cursor_col - h_offset) as u16;
        let row = state
            .cursor_line
            .saturating_sub(start)
            .min(content_height - 1);
        let y = area.y + 1 + row as u16;
        frame.set_cursor_position((x, y));
    }
}

/// Result panel, wrapped. `result_scroll` is clamped so the last row stays reachable.
fn render_result(frame: &mut Frame, state: &RenderState, area: Rect) {
    let (label, body) = split_label(area);
    frame.render_widget(Paragraph::new(label_line("Result", false)), label);

    let lines: Vec<Line> = match state.result.as_deref() {
        Some(result) => result.lines().map(|l| Line::from(l.to_string())).collect(),
        None if state.running => vec![muted(RUNNING)],
        None => vec![muted(NO_RESULT)],
    };
    let rows: usize = state
        .result
        .as_deref()
        .map(|r| r.lines().map(|l| wrapped_rows(l, body.width)).sum())
        .unwrap_or(1);
    let max_scroll = rows.saturating_sub(body.height as usize);
    let scroll = (state.result_scroll as usize).min(max_scroll);

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((to_u16(scroll), 0)),
        body,
    );
}

/// Log tail, wrapped: newest lines stay visible.
fn render_log(frame: &mut Frame, state: &RenderState, area: Rect) {
    let (label, body) = split_label(area);
    frame.render_widget(Paragraph::new(label_line("Log", false)), label);

    if state.log_lines.is_empty() {
        frame.render_widget(Paragraph::new(muted(NO_LOGS)), body);
        return;
    }
    let rows: usize = state
        .log_lines
        .iter()
        .map(|l| wrapped_rows(l, body.width))
        .sum();
    let scroll = rows.saturating_sub(body.height as usize);
    let lines: Vec<Line> = state.log_lines.iter().map(|l| log_line(l)).collect();

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((to_u16(scroll), 0)),
        body,
    );
}

/// First row for the section label, the rest for its content.
fn split_label(area: Rect) -> (Rect, Rect) {
    let label_height = area.height.min(1);
    let label = Rect {
        height: label_height,
        ..area
    };
    let body = Rect {
        y: area.y + label_height,
        height: area.height - label_height,
        ..area
    };
    (label, body)
}

fn log_line(line: &str) -> Line<'static> {
    let style = if line.starts_with("[ERROR]") {
        Style::default().fg(Color::Red)
    } else if line.starts_with("[WARNING]") {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(COLOR_TEXT_DIMMED)
    };
    Line::from(Span::styled(line.to_string(), style))
}

fn muted(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(COLOR_TEXT_MUTED)))
}

fn render_separator(frame: &mut Frame, area: Rect) {
    let solid = "─".repeat(area.width as usize);
    let line = Line::from(Span::styled(solid, Style::default().fg(COLOR_SEPARATOR)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Bottom line: "?" when collapsed, "? │ <keymap>" when expanded.
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let line = render_keymap_line(state);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_keymap_line(state: &RenderState) -> Line<'static> {
    let ctx = KeymapContext::from_render_state(state);
    let groups = keybindings_for_context(ctx);

    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let help_style = if state.show_keymap {
        Style::default()
    } else {
        Style::default().fg(COLOR_TEXT_MUTED)
    };
    let mut spans: Vec<Span> = vec![Span::styled("?", help_style)];

    if state.show_keymap {
        for group in groups.iter() {
            spans.push(Span::styled(" │ ", sep_style));
            for (key_idx, keybinding) in group.0.iter().enumerate() {
                if key_idx > 0 {
                    spans.push(Span::styled(" • ", sep_style));
                }
                spans.push(Span::styled(keybinding.0, key_style));
                spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
            }
        }
    }

    Line::from(spans)
}

/// Render notification message on the bottom line of the screen.
///
/// - Error: Red text with "Error:" prefix and bold styling
/// - Warning: Yellow text
/// - Info: Green text without prefix
fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Warning => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Yellow),
        )),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    frame.render_widget(Paragraph::new(line), notification_area);
}

// Helper functions

/// Visible `[start, end)` of `len` rows that keeps `cursor` centered.
fn scroll_window(len: usize, cursor: usize, height: usize) -> (usize, usize) {
    let center = height / 2;
    let start = cursor.saturating_sub(center);
    let end = (start + height).min(len);
    let start = end.saturating_sub(height);
    (start, end)
}

/// Rows `line` takes when word-wrapped to `width`. Errs on the high side.
fn wrapped_rows(line: &str, width: u16) -> usize {
    let width = width as usize;
    if width == 0 {
        return 1;
    }
    let mut rows = 1;
    let mut used = 0;
    for (i, word) in line.split(' ').enumerate() {
        let mut len = word.chars().count();
        let gap = usize::from(i > 0);
        if used + gap + len <= width {
            used += gap + len;
            continue;
        }
        if used > 0 {
            rows += 1;
        }
        while len > width {
            rows += 1;
            len -= width;
        }
        used = len;
    }
    rows
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn tail_chars(s: &str, max: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(max)).collect()
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}~", truncated)
    }
}
