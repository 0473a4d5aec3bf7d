use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::FieldKey;
use crate::terminal::LineInput;

use super::worker::SaveTarget;

#[derive(Debug)]
pub(super) struct Modal {
    pub(super) title: String,
    pub(super) lines: Vec<Line<'static>>,
    pub(super) scroll: usize,
    pub(super) input: LineInput,
    pub(super) kind: ModalKind,
}

#[derive(Debug)]
pub(super) enum ModalKind {
    Viewer,
    ConfirmDelete { target: SaveTarget },
    TextInput { action: TextInputAction, prompt: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TextInputAction {
    EditCell { row: usize, key: FieldKey },
    RenameSchema,
}

impl Modal {
    pub(super) fn viewer(title: &str, lines: Vec<Line<'static>>) -> Self {
        Self {
            title: title.to_string(),
            lines,
            scroll: 0,
            input: LineInput::default(),
            kind: ModalKind::Viewer,
        }
    }

    pub(super) fn text_input(
        title: &str,
        prompt: &str,
        initial: &str,
        action: TextInputAction,
    ) -> Self {
        let mut input = LineInput::default();
        input.set(initial.to_string());
        Self {
            title: title.to_string(),
            lines: Vec::new(),
            scroll: 0,
            input,
            kind: ModalKind::TextInput {
                action,
                prompt: prompt.to_string(),
            },
        }
    }

    pub(super) fn confirm_delete(target: SaveTarget, schema_name: &str) -> Self {
        Self {
            title: "Delete schema".to_string(),
            lines: vec![
                Line::from(format!("Delete schema block `{}`?", schema_name)),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter deletes, Esc keeps the block.",
                    Style::default().fg(Color::Gray),
                )),
            ],
            scroll: 0,
            input: LineInput::default(),
            kind: ModalKind::ConfirmDelete { target },
        }
    }
}

pub(super) fn draw_modal(frame: &mut ratatui::Frame, modal: &Modal) {
    let area = frame.area();
    let w = area.width.saturating_sub(6).clamp(20, 90);
    let h = area.height.saturating_sub(6).clamp(8, 22);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let box_area = ratatui::layout::Rect {
        x,
        y,
        width: w,
        height: h,
    };

    frame.render_widget(ratatui::widgets::Clear, box_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(modal_title(modal));
    frame.render_widget(block.clone(), box_area);
    let inner = block.inner(box_area);

    let scroll = modal.scroll.min(modal.lines.len().saturating_sub(1)) as u16;
    match &modal.kind {
        ModalKind::Viewer | ModalKind::ConfirmDelete { .. } => {
            frame.render_widget(
                Paragraph::new(modal.lines.clone())
                    .wrap(Wrap { trim: false })
                    .scroll((scroll, 0)),
                inner,
            );
        }

        ModalKind::TextInput { prompt, .. } => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(inner);

            frame.render_widget(
                Paragraph::new(modal.lines.clone())
                    .wrap(Wrap { trim: false })
                    .scroll((scroll, 0)),
                parts[0],
            );

            let input_line = Line::from(vec![
                Span::styled(prompt.as_str(), Style::default().fg(Color::Yellow)),
                Span::raw(modal.input.buf.as_str()),
            ]);
            frame.render_widget(
                Paragraph::new(input_line)
                    .block(Block::default().borders(Borders::ALL).title("Edit")),
                parts[1],
            );

            let x = prompt.chars().count() as u16 + modal.input.cursor_col() as u16;
            let y = parts[1].y + 1;
            frame.set_cursor_position((parts[1].x + 1 + x, y));
        }
    }
}

/// What the app must do after a modal key.
pub(super) enum ModalOutcome {
    None,
    Close,
    Delete { target: SaveTarget, confirmed: bool },
    Submit { action: TextInputAction, value: String },
}

pub(super) fn handle_modal_key(modal: &mut Modal, key: KeyEvent) -> ModalOutcome {
    let scroll_max = modal.lines.len().saturating_sub(1);
    match &modal.kind {
        ModalKind::Viewer => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => ModalOutcome::Close,
            KeyCode::Up | KeyCode::Char('k') => {
                modal.scroll = modal.scroll.saturating_sub(1);
                ModalOutcome::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                modal.scroll = (modal.scroll + 1).min(scroll_max);
                ModalOutcome::None
            }
            KeyCode::PageUp => {
                modal.scroll = modal.scroll.saturating_sub(10);
                ModalOutcome::None
            }
            KeyCode::PageDown => {
                modal.scroll = (modal.scroll + 10).min(scroll_max);
                ModalOutcome::None
            }
            _ => ModalOutcome::None,
        },

        ModalKind::ConfirmDelete { target } => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => ModalOutcome::Delete {
                target: target.clone(),
                confirmed: true,
            },
            KeyCode::Esc | KeyCode::Char('n') => ModalOutcome::Delete {
                target: target.clone(),
                confirmed: false,
            },
            _ => ModalOutcome::None,
        },

        ModalKind::TextInput { action, .. } => match key.code {
            KeyCode::Esc => ModalOutcome::Close,
            KeyCode::Enter => ModalOutcome::Submit {
                action: *action,
                value: modal.input.buf.clone(),
            },
            KeyCode::Backspace => {
                modal.input.backspace();
                ModalOutcome::None
            }
            KeyCode::Delete => {
                modal.input.delete();
                ModalOutcome::None
            }
            KeyCode::Left => {
                modal.input.move_left();
                ModalOutcome::None
            }
            KeyCode::Right => {
                modal.input.move_right();
                ModalOutcome::None
            }
            KeyCode::Char(c) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    modal.input.insert_char(c);
                }
                ModalOutcome::None
            }
            _ => ModalOutcome::None,
        },
    }
}

fn modal_title(modal: &Modal) -> Line<'static> {
    let mut spans = vec![
        Span::styled(modal.title.clone(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled("Esc", Style::default().fg(Color::Gray)),
    ];
    if !matches!(modal.kind, ModalKind::Viewer) {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Enter", Style::default().fg(Color::Gray)));
    }
    Line::from(spans)
}
