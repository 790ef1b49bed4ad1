use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::storage::Slot;
use crate::task::Filter;

use super::app::{AppState, StatusKind};
use super::model::{FieldView, ItemView, ViewModel};

const ENTRY_PLACEHOLDER: &str = "What needs to be done?";
const TOGGLE_ALL_LABEL: &str = "Mark all as complete";
const CLEAR_COMPLETED_LABEL: &str = "Clear completed";
const DELETE_GLYPH: &str = "\u{00d7}";
const CHECKBOX_WIDTH: u16 = 3;
const FILTER_GAP: u16 = 2;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);

/// Something on screen a mouse click can land on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Entry,
    ToggleAll,
    Checkbox(String),
    Text(String),
    Delete(String),
    Filter(Filter),
    ClearCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHitbox {
    pub id: String,
    pub checkbox: Rect,
    pub text: Rect,
    pub delete: Rect,
}

/// Screen rectangles of clickable controls from the last frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hitboxes {
    pub entry: Option<Rect>,
    pub toggle_all: Option<Rect>,
    pub rows: Vec<RowHitbox>,
    pub filters: Vec<(Filter, Rect)>,
    pub clear_completed: Option<Rect>,
}

impl Hitboxes {
    pub fn hit(&self, column: u16, row: u16) -> Option<Target> {
        if self.toggle_all.is_some_and(|rect| contains(rect, column, row)) {
            return Some(Target::ToggleAll);
        }
        for hitbox in &self.rows {
            if contains(hitbox.checkbox, column, row) {
                return Some(Target::Checkbox(hitbox.id.clone()));
            }
            if contains(hitbox.delete, column, row) {
                return Some(Target::Delete(hitbox.id.clone()));
            }
            if contains(hitbox.text, column, row) {
                return Some(Target::Text(hitbox.id.clone()));
            }
        }
        for (filter, rect) in &self.filters {
            if contains(*rect, column, row) {
                return Some(Target::Filter(*filter));
            }
        }
        if self.clear_completed.is_some_and(|rect| contains(rect, column, row)) {
            return Some(Target::ClearCompleted);
        }
        if self.entry.is_some_and(|rect| contains(rect, column, row)) {
            return Some(Target::Entry);
        }
        None
    }
}

pub fn render<S: Slot>(frame: &mut Frame, app: &mut AppState<S>) {
    let model = app.view_model();
    let status = app.status_line();
    let hint = app.footer_hint();
    let selected = app.selected_position(&model);
    let hitboxes = draw(frame, &model, selected, status, &hint);
    app.set_hitboxes(hitboxes);
}

/// Draw the whole screen from scratch and report where the controls landed
pub fn draw(
    frame: &mut Frame,
    model: &ViewModel,
    selected: Option<usize>,
    status: Option<(String, StatusKind)>,
    hint: &str,
) -> Hitboxes {
    let area = frame.size();
    let footer_height = if model.footer_visible { 2 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(footer_height),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let mut hitboxes = Hitboxes::default();

    render_title(frame, chunks[0]);
    hitboxes.entry = Some(render_entry(frame, model, chunks[1]));
    if model.main_visible {
        render_main(frame, model, selected, chunks[2], &mut hitboxes);
    } else {
        render_empty(frame, chunks[2]);
    }
    if model.footer_visible {
        render_footer(frame, model, chunks[3], &mut hitboxes);
    }
    render_hint(frame, status, hint, chunks[4]);

    hitboxes
}

fn render_title(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(Line::from(Span::styled(
        "todos",
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_entry(frame: &mut Frame, model: &ViewModel, area: Rect) -> Rect {
    let border = if model.entry_focused {
        COLOR_ACCENT
    } else {
        COLOR_BG_MUTED
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("New task")
        .border_style(Style::default().fg(border));
    let width = block.inner(area).width as usize;

    let line = if model.entry_focused {
        let mut spans = field_spans(&model.entry, width, Style::default().fg(COLOR_TEXT));
        if model.entry.value.is_empty() {
            spans.push(Span::styled(
                ENTRY_PLACEHOLDER,
                Style::default().fg(COLOR_MUTED_DARK),
            ));
        }
        Line::from(spans)
    } else if model.entry.value.is_empty() {
        Line::from(Span::styled(
            ENTRY_PLACEHOLDER,
            Style::default().fg(COLOR_MUTED_DARK),
        ))
    } else {
        Line::from(Span::styled(
            truncate_text(&model.entry.value, width),
            Style::default().fg(COLOR_TEXT),
        ))
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
    area
}

fn render_empty(frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let widget = Paragraph::new(Line::from(Span::styled(
        "Nothing to do. Type a task and press enter.",
        Style::default().fg(COLOR_MUTED_DARK),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(widget, Rect::new(area.x, area.y + area.height / 2, area.width, 1));
}

fn render_main(
    frame: &mut Frame,
    model: &ViewModel,
    selected: Option<usize>,
    area: Rect,
    hitboxes: &mut Hitboxes,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Tasks")
        .border_style(Style::default().fg(COLOR_BORDER_LIST));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let toggle_rect = Rect::new(inner.x, inner.y, inner.width, 1);
    frame.render_widget(Paragraph::new(toggle_all_line(model)), toggle_rect);
    hitboxes.toggle_all = Some(toggle_rect);

    let list_height = inner.height.saturating_sub(1) as usize;
    if model.items.is_empty() {
        if list_height > 0 {
            let rect = Rect::new(inner.x, inner.y + 1, inner.width, 1);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No matches",
                    Style::default().fg(COLOR_MUTED_DARK),
                )),
                rect,
            );
        }
        return;
    }

    let (start, end) = list_window(model.items.len(), selected, list_height);
    for (offset, item) in model.items[start..end].iter().enumerate() {
        let row = Rect::new(inner.x, inner.y + 1 + offset as u16, inner.width, 1);
        frame.render_widget(Paragraph::new(item_line(item, row.width as usize)), row);

        let checkbox_width = CHECKBOX_WIDTH.min(row.width);
        let delete_x = row.x + row.width.saturating_sub(1);
        hitboxes.rows.push(RowHitbox {
            id: item.id.clone(),
            checkbox: Rect::new(row.x, row.y, checkbox_width, 1),
            text: Rect::new(
                row.x + checkbox_width,
                row.y,
                row.width.saturating_sub(checkbox_width + 1),
                1,
            ),
            delete: Rect::new(delete_x, row.y, 1, 1),
        });
    }
}

fn toggle_all_line(model: &ViewModel) -> Line<'static> {
    let (mark, style) = if model.toggle_all_checked {
        ("[x]", Style::default().fg(COLOR_SUCCESS))
    } else {
        ("[ ]", Style::default().fg(COLOR_MUTED))
    };
    Line::from(vec![
        Span::styled(mark, style.add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(TOGGLE_ALL_LABEL, Style::default().fg(COLOR_MUTED)),
    ])
}

fn item_line(item: &ItemView, width: usize) -> Line<'static> {
    let checkbox_width = CHECKBOX_WIDTH as usize;
    // checkbox, space, text, space, delete glyph
    let text_width = width.saturating_sub(checkbox_width + 3);

    let (mark, mark_style) = if item.completed {
        ("[x]", Style::default().fg(COLOR_SUCCESS).add_modifier(Modifier::BOLD))
    } else {
        ("[ ]", Style::default().fg(COLOR_MUTED))
    };
    let mut spans = vec![Span::styled(mark, mark_style), Span::raw(" ")];

    if let Some(field) = item.editing.as_ref() {
        let style = Style::default().fg(COLOR_TEXT).bg(COLOR_BG_MUTED);
        let field_spans = field_spans(field, text_width, style);
        let used: usize = field_spans
            .iter()
            .map(|span| span.content.chars().count())
            .sum();
        spans.extend(field_spans);
        spans.push(Span::styled(
            " ".repeat(text_width.saturating_sub(used)),
            style,
        ));
    } else {
        let mut style = if item.completed {
            Style::default()
                .fg(COLOR_MUTED_DARK)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(COLOR_TEXT)
        };
        if item.selected {
            style = style.bg(COLOR_BG_MUTED).add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(pad_text(&item.text, text_width), style));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled(DELETE_GLYPH, Style::default().fg(COLOR_ERROR)));
    Line::from(spans)
}

fn render_footer(frame: &mut Frame, model: &ViewModel, area: Rect, hitboxes: &mut Hitboxes) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(COLOR_BORDER_LIST));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }
    let row = Rect::new(inner.x, inner.y, inner.width, 1);

    frame.render_widget(
        Paragraph::new(Span::styled(
            model.counter.clone(),
            Style::default().fg(COLOR_ACCENT),
        )),
        row,
    );

    let labels_width: u16 = model
        .filters
        .iter()
        .map(|view| view.filter.label().len() as u16)
        .sum::<u16>()
        + FILTER_GAP * (model.filters.len().saturating_sub(1) as u16);
    let mut x = row.x + row.width.saturating_sub(labels_width) / 2;
    for view in &model.filters {
        let label = view.filter.label();
        let style = if view.active {
            Style::default()
                .fg(COLOR_INFO)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        let rect = Rect::new(x, row.y, label.len() as u16, 1).intersection(row);
        frame.render_widget(Paragraph::new(Span::styled(label, style)), rect);
        hitboxes.filters.push((view.filter, rect));
        x = x.saturating_add(label.len() as u16 + FILTER_GAP);
    }

    if model.clear_completed_visible {
        let width = CLEAR_COMPLETED_LABEL.len() as u16;
        let rect = Rect::new(row.x + row.width.saturating_sub(width), row.y, width, 1)
            .intersection(row);
        frame.render_widget(
            Paragraph::new(Span::styled(
                CLEAR_COMPLETED_LABEL,
                Style::default().fg(COLOR_WARNING),
            )),
            rect,
        );
        hitboxes.clear_completed = Some(rect);
    }
}

fn render_hint(frame: &mut Frame, status: Option<(String, StatusKind)>, hint: &str, area: Rect) {
    let hint_span = Span::styled(hint.to_string(), Style::default().fg(COLOR_MUTED_DARK));
    let line = if let Some((status, kind)) = status {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            Span::styled(status, status_style),
            Span::raw("  |  "),
            hint_span,
        ])
    } else {
        Line::from(hint_span)
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn field_spans(field: &FieldView, width: usize, style: Style) -> Vec<Span<'static>> {
    value_with_caret_spans(&field.value, field.cursor, width, style)
}

fn value_with_caret_spans(
    value: &str,
    cursor: usize,
    width: usize,
    style: Style,
) -> Vec<Span<'static>> {
    if width == 0 {
        return vec![Span::raw("")];
    }
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    let cursor = cursor.min(len);
    let caret = style.add_modifier(Modifier::REVERSED);
    if len == 0 {
        return vec![Span::styled(" ".to_string(), caret)];
    }

    let caret_at_end = cursor == len;
    let available = if caret_at_end {
        width.saturating_sub(1)
    } else {
        width
    };
    let mut start = 0usize;
    if len > available {
        if cursor > available {
            start = cursor.saturating_sub(available);
        }
        if start + available > len {
            start = len.saturating_sub(available);
        }
    }
    let end = (start + available).min(len);
    let window = &chars[start..end];

    let mut spans = Vec::new();
    if caret_at_end {
        let text: String = window.iter().collect();
        if !text.is_empty() {
            spans.push(Span::styled(text, style));
        }
        spans.push(Span::styled(" ".to_string(), caret));
        return spans;
    }

    let caret_index = cursor.saturating_sub(start);
    let before: String = window[..caret_index].iter().collect();
    let caret_char = window.get(caret_index).copied().unwrap_or(' ');
    let after: String = window[(caret_index + 1).min(window.len())..].iter().collect();

    if !before.is_empty() {
        spans.push(Span::styled(before, style));
    }
    spans.push(Span::styled(caret_char.to_string(), caret));
    if !after.is_empty() {
        spans.push(Span::styled(after, style));
    }
    spans
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn pad_text(value: &str, width: usize) -> String {
    let text = truncate_text(value, width);
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}
