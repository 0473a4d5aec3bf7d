use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::terminal::{EntryKind, Segment, TerminalSession};

use super::app::{Page, StatusKind};
use super::blocks::{BlockCtx, block_lines, ladder_lines, schema_lines, state_color};
use super::modal::draw_modal;
use super::time_utils::fmt_ts_ui;
use super::App;

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(app.terminal.height()),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    draw_body(frame, app, chunks[1]);
    draw_terminal(frame, &app.terminal, chunks[2]);
    draw_status(frame, app, chunks[3]);

    if let Some(m) = &app.modal {
        dim_frame(frame);
        draw_modal(frame, m);
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "Worksheets",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(app.page_title(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(app.route.path(), Style::default().fg(Color::Gray)),
    ];
    if let Some(ws) = &app.worksheet {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("rev {}", ws.revision()),
            Style::default().fg(Color::DarkGray),
        ));
        if !ws.edit_permission() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled("read-only", Style::default().fg(Color::Red)));
        }
    }
    if app.edit_mode {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("EDIT", Style::default().fg(Color::Black).bg(Color::Yellow)));
    }
    if !app.selected.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} selected", app.selected.len()),
            Style::default().fg(Color::Cyan),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn plain(lines: Vec<String>) -> Vec<Line<'static>> {
    lines.into_iter().map(Line::from).collect()
}

fn draw_body(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let (lines, focus_line) = match &app.page {
        Page::Home => (
            plain(vec![
                "No worksheet open.".to_string(),
                String::new(),
                "Start with --worksheet <name|uuid> or set default_worksheet in the config."
                    .to_string(),
            ]),
            0,
        ),
        Page::Loading(what) => (plain(vec![format!("Loading {}…", what)]), 0),
        Page::Worksheet => worksheet_lines(app),
        Page::Bundle(info) => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("uuid   ", Style::default().fg(Color::Gray)),
                    Span::raw(info.uuid.clone()),
                ]),
                Line::from(vec![
                    Span::styled("name   ", Style::default().fg(Color::Gray)),
                    Span::raw(info.name().to_string()),
                ]),
                Line::from(vec![
                    Span::styled("type   ", Style::default().fg(Color::Gray)),
                    Span::raw(info.bundle_type.clone()),
                ]),
                Line::from(vec![
                    Span::styled("state  ", Style::default().fg(Color::Gray)),
                    Span::styled(info.state.clone(), Style::default().fg(state_color(&info.state))),
                ]),
                Line::from(""),
            ];
            for (k, v) in &info.metadata {
                let v = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<20}", k), Style::default().fg(Color::Cyan)),
                    Span::raw(v),
                ]));
            }
            lines.push(Line::from(""));
            lines.extend(ladder_lines(info));
            (lines, 0)
        }
        Page::Info { lines, .. } => (plain(lines.clone()), 0),
        Page::Error => (
            vec![Line::from(Span::styled("Error.", Style::default().fg(Color::Red)))],
            0,
        ),
    };

    let height = area.height as usize;
    let scroll = if focus_line >= height {
        focus_line.saturating_sub(height / 3)
    } else {
        0
    };
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(body, area);
}

/// All block lines plus the first line of the focused block.
fn worksheet_lines(app: &App) -> (Vec<Line<'static>>, usize) {
    let Some(ws) = &app.worksheet else {
        return (Vec::new(), 0);
    };
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut focus_line = 0;
    let focus = ws.focus();
    let draft_anchor = app.draft.as_ref().map(|d| d.anchor);

    let push_draft = |lines: &mut Vec<Line<'static>>, focus_line: &mut usize| {
        let Some(draft) = &app.draft else {
            return;
        };
        *focus_line = lines.len();
        let ctx = BlockCtx {
            focused: true,
            sub: None,
            editor: Some(&draft.editor),
            selected: &app.selected,
            edit_mode: app.edit_mode,
        };
        lines.push(Line::from(Span::styled(
            "new schema block",
            Style::default().fg(Color::Green).add_modifier(Modifier::ITALIC),
        )));
        lines.extend(schema_lines(draft.editor.schema(), &ctx));
        lines.push(Line::from(""));
    };

    if draft_anchor == Some(None) {
        push_draft(&mut lines, &mut focus_line);
    }
    if ws.is_empty() && app.draft.is_none() {
        lines.push(Line::from(Span::styled(
            "(empty worksheet)",
            Style::default().fg(Color::Gray),
        )));
    }
    for (i, block) in ws.blocks().iter().enumerate() {
        let focused = focus.is_some_and(|f| f.index == i);
        if focused && app.draft.is_none() {
            focus_line = lines.len() + focus.and_then(|f| f.sub).unwrap_or(0);
        }
        let ctx = BlockCtx {
            focused: focused && app.draft.is_none(),
            sub: focus.filter(|f| f.index == i).and_then(|f| f.sub),
            editor: app.editors.get(&block.ids),
            selected: &app.selected,
            edit_mode: app.edit_mode,
        };
        lines.extend(block_lines(block, &ctx));
        lines.push(Line::from(""));
        if draft_anchor == Some(Some(i)) {
            push_draft(&mut lines, &mut focus_line);
        }
    }
    (lines, focus_line)
}

fn entry_line(ts: &str, kind: EntryKind, segments: &[Segment]) -> Line<'static> {
    let style = match kind {
        EntryKind::Command => Style::default().fg(Color::Cyan),
        EntryKind::Output => Style::default(),
        EntryKind::Error => Style::default().fg(Color::Red),
        EntryKind::Diagnostic => Style::default().fg(Color::DarkGray),
    };
    let mut spans = vec![Span::styled(
        format!("{} ", fmt_ts_ui(ts)),
        Style::default().fg(Color::Gray),
    )];
    if kind == EntryKind::Command {
        spans.push(Span::styled("> ", style));
    }
    for seg in segments {
        match seg {
            Segment::Text(t) => spans.push(Span::styled(t.clone(), style)),
            Segment::Link { text, .. } => spans.push(Span::styled(
                text.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            )),
        }
    }
    Line::from(spans)
}

fn draw_terminal(frame: &mut ratatui::Frame, term: &TerminalSession, area: Rect) {
    let border = if term.is_focused() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = match term.worksheet_uuid() {
        None => "terminal (no worksheet)".to_string(),
        Some(_) if term.in_flight().is_some() => "terminal (running…)".to_string(),
        Some(_) if term.is_focused() => "terminal".to_string(),
        Some(_) => "terminal (:)".to_string(),
    };
    let outer = Block::default()
        .borders(Borders::TOP)
        .border_style(border)
        .title(title);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);
    if inner.height == 0 {
        return;
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    for entry in term.entries() {
        // Multi-line output is split so each physical row gets its own line.
        let mut current: Vec<Segment> = Vec::new();
        let mut first = true;
        for seg in &entry.segments {
            match seg {
                Segment::Text(t) => {
                    let mut parts = t.split('\n').peekable();
                    while let Some(part) = parts.next() {
                        if !part.is_empty() {
                            current.push(Segment::Text(part.to_string()));
                        }
                        if parts.peek().is_some() {
                            let ts = if first { entry.ts.as_str() } else { "" };
                            lines.push(entry_line(ts, entry.kind, &current));
                            current.clear();
                            first = false;
                        }
                    }
                }
                link => current.push(link.clone()),
            }
        }
        let ts = if first { entry.ts.as_str() } else { "" };
        lines.push(entry_line(ts, entry.kind, &current));
    }
    if !term.completions().is_empty() {
        lines.push(Line::from(Span::styled(
            term.completions().join("  "),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )));
    }

    let input = term.input();
    let prompt_style = if term.is_enabled() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(vec![
        Span::styled("$ ", prompt_style),
        Span::raw(input.buf.clone()),
    ]));

    let visible = inner.height as usize;
    let skip = lines.len().saturating_sub(visible);
    let shown: Vec<Line<'static>> = lines.into_iter().skip(skip).collect();
    frame.render_widget(Paragraph::new(shown), inner);

    if term.is_focused() {
        let x = inner.x + 2 + input.cursor_col() as u16;
        let y = inner.y + inner.height - 1;
        frame.set_cursor_position((x.min(inner.x + inner.width.saturating_sub(1)), y));
    }
}

fn draw_status(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(s) => {
            let color = match s.kind {
                StatusKind::Info => Color::White,
                StatusKind::Error => Color::Red,
            };
            Line::from(vec![
                Span::styled(format!("{} ", fmt_ts_ui(&s.ts)), Style::default().fg(Color::Gray)),
                Span::styled(s.text.clone(), Style::default().fg(color)),
            ])
        }
        None => Line::from(Span::styled(
            "H help  : terminal  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn dim_frame(frame: &mut ratatui::Frame) {
    let area = frame.area();
    let buf = frame.buffer_mut();
    for y in area.y..area.y.saturating_add(area.height) {
        for x in area.x..area.x.saturating_add(area.width) {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.modifier |= Modifier::DIM;
            }
        }
    }
}
