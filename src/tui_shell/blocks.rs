//! Per-mode block renderers.

use std::collections::BTreeSet;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::bundle_states::{explain, highlight, states};
use crate::model::{Block, BlockBody, BundleInfo, BundleState, FieldKey, SchemaBlock};
use crate::schema::{EditorState, SchemaEditor};

pub(super) struct BlockCtx<'a> {
    pub(super) focused: bool,
    pub(super) sub: Option<usize>,
    pub(super) editor: Option<&'a SchemaEditor>,
    pub(super) selected: &'a BTreeSet<String>,
    pub(super) edit_mode: bool,
}

fn focus_style(on: bool) -> Style {
    if on {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    }
}

pub(super) fn state_color(state: &str) -> Color {
    match BundleState::parse(state) {
        Some(BundleState::Ready) => Color::Green,
        Some(BundleState::Failed | BundleState::Killed) => Color::Red,
        Some(BundleState::WorkerOffline) => Color::Magenta,
        Some(s) if !s.is_final() => Color::Yellow,
        _ => Color::Gray,
    }
}

fn cell(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn bundle_line(info: &BundleInfo, selected: &BTreeSet<String>, style: Style) -> Line<'static> {
    let mark = if selected.contains(&info.uuid) { "[x] " } else { "[ ] " };
    Line::from(vec![
        Span::styled(mark.to_string(), style.fg(Color::Gray)),
        Span::styled(info.short_uuid().to_string(), style.fg(Color::Cyan)),
        Span::styled(format!("  {}  ", info.name()), style),
        Span::styled(info.state.clone(), style.fg(state_color(&info.state))),
    ])
}

/// Lines for one block, without the edit-mode gutter.
pub(super) fn block_lines(block: &Block, ctx: &BlockCtx<'_>) -> Vec<Line<'static>> {
    let whole = focus_style(ctx.focused && ctx.sub.is_none());
    let row_style = |i: usize| focus_style(ctx.focused && ctx.sub == Some(i));

    let mut lines: Vec<Line<'static>> = match &block.body {
        BlockBody::Markdown(m) => m
            .text
            .lines()
            .map(|l| {
                if let Some(h) = l.strip_prefix('#') {
                    Line::from(Span::styled(
                        h.trim_start_matches('#').trim().to_string(),
                        whole.fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(l.to_string(), whole))
                }
            })
            .collect(),

        BlockBody::BundleRow(b) => vec![bundle_line(&b.bundle_info, ctx.selected, whole)],

        BlockBody::TableBlock(t) => {
            let widths: Vec<usize> = t
                .header
                .iter()
                .map(|h| {
                    t.rows
                        .iter()
                        .map(|r| r.get(h).map(cell).unwrap_or_default().chars().count())
                        .chain(std::iter::once(h.chars().count()))
                        .max()
                        .unwrap_or(0)
                        .min(40)
                })
                .collect();
            let fmt_row = |cells: Vec<String>| -> String {
                cells
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| format!("{:<w$}", c.chars().take(*w).collect::<String>(), w = *w))
                    .collect::<Vec<_>>()
                    .join("  ")
            };
            let mut out = vec![Line::from(Span::styled(
                format!("    {}", fmt_row(t.header.clone())),
                whole.add_modifier(Modifier::BOLD),
            ))];
            for (i, row) in t.rows.iter().enumerate() {
                let cells = t
                    .header
                    .iter()
                    .map(|h| row.get(h).map(cell).unwrap_or_default())
                    .collect();
                let mark = match t.bundle_infos.get(i) {
                    Some(b) if ctx.selected.contains(&b.uuid) => "[x] ",
                    Some(_) => "[ ] ",
                    None => "    ",
                };
                let mut spans = vec![
                    Span::styled(mark.to_string(), row_style(i).fg(Color::Gray)),
                    Span::styled(fmt_row(cells), row_style(i)),
                ];
                if let Some(b) = t.bundle_infos.get(i) {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(
                        b.state.clone(),
                        row_style(i).fg(state_color(&b.state)),
                    ));
                }
                out.push(Line::from(spans));
            }
            out
        }

        BlockBody::SchemaBlock(s) => schema_lines(s, ctx),

        BlockBody::SubworksheetsBlock(s) => s
            .subworksheet_infos
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let title = w.title.as_deref().unwrap_or("");
                Line::from(vec![
                    Span::styled("⇒ ".to_string(), row_style(i).fg(Color::Gray)),
                    Span::styled(w.name.clone(), row_style(i).fg(Color::Cyan)),
                    Span::styled(format!("  {}", title), row_style(i)),
                ])
            })
            .collect(),

        BlockBody::ImageBlock(img) => {
            let target = match (&img.bundle_info, &img.path) {
                (Some(b), Some(p)) => format!("{}/{}", b.short_uuid(), p),
                (Some(b), None) => b.short_uuid().to_string(),
                (None, Some(p)) => p.clone(),
                (None, None) => "?".to_string(),
            };
            vec![Line::from(Span::styled(
                format!("[image] {}", target),
                whole.fg(Color::Gray),
            ))]
        }

        BlockBody::RecordBlock(r) => {
            let width = r.rows.iter().map(|row| row.key.chars().count()).max().unwrap_or(0);
            r.rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{:<width$}  ", row.key, width = width),
                            row_style(i).fg(Color::Yellow),
                        ),
                        Span::styled(cell(&row.value), row_style(i)),
                    ])
                })
                .collect()
        }

        BlockBody::GraphBlock(g) => vec![Line::from(Span::styled(
            format!(
                "[graph] {} trajector{} over {} bundle(s)",
                g.trajectories.len(),
                if g.trajectories.len() == 1 { "y" } else { "ies" },
                g.bundle_infos.len()
            ),
            whole.fg(Color::Gray),
        ))],

        BlockBody::Placeholder(p) => vec![Line::from(Span::styled(
            format!("… {}", p.directive),
            whole.fg(Color::Gray).add_modifier(Modifier::DIM),
        ))],
    };

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(String::new(), whole)));
    }
    if ctx.edit_mode
        && let Some((lo, hi)) = block.min_max_keys()
    {
        let gutter = if lo == hi {
            format!("{:>9} ", lo)
        } else {
            format!("{:>4}-{:<4} ", lo, hi)
        };
        for (i, line) in lines.iter_mut().enumerate() {
            let g = if i == 0 { gutter.clone() } else { " ".repeat(gutter.len()) };
            line.spans.insert(0, Span::styled(g, Style::default().fg(Color::DarkGray)));
        }
    }
    lines
}

fn state_tag(state: EditorState) -> Option<(&'static str, Color)> {
    match state {
        EditorState::Collapsed | EditorState::Expanded => None,
        EditorState::Editing => Some(("editing", Color::Yellow)),
        EditorState::Saving => Some(("saving…", Color::Cyan)),
        EditorState::ConfirmDelete => Some(("delete?", Color::Red)),
    }
}

/// Schema block, drawn through its editor when one exists.
pub(super) fn schema_lines(stored: &SchemaBlock, ctx: &BlockCtx<'_>) -> Vec<Line<'static>> {
    let whole = focus_style(ctx.focused && ctx.sub.is_none());
    let (schema, state) = match ctx.editor {
        Some(ed) => (ed.schema(), ed.state()),
        None => (stored, EditorState::Collapsed),
    };
    let name = if schema.schema_name.is_empty() {
        "<unnamed>".to_string()
    } else {
        schema.schema_name.clone()
    };
    let arrow = if state == EditorState::Collapsed { "▸" } else { "▾" };
    let mut head = vec![Span::styled(
        format!("{} schema {} ({} fields)", arrow, name, schema.field_rows.len()),
        whole.fg(Color::Magenta),
    )];
    if let Some((tag, color)) = state_tag(state) {
        head.push(Span::styled(format!("  [{}]", tag), Style::default().fg(color)));
    }
    if ctx.editor.is_some_and(|e| e.is_dirty()) {
        head.push(Span::styled("  *", Style::default().fg(Color::Yellow)));
    }
    let mut out = vec![Line::from(head)];

    if let Some(ed) = ctx.editor {
        if ed.missing_schema_name() {
            out.push(Line::from(Span::styled(
                "  schema name is required (n to rename)",
                Style::default().fg(Color::Red),
            )));
        }
        if let Some(taken) = ed.name_conflict() {
            out.push(Line::from(Span::styled(
                format!("  `{}` is already pulled in by addschema (n to rename)", taken),
                Style::default().fg(Color::Red),
            )));
        }
        if let Some(err) = ed.error() {
            out.push(Line::from(Span::styled(
                format!("  save failed: {}", err),
                Style::default().fg(Color::Red),
            )));
        }
    }
    if state == EditorState::Collapsed {
        return out;
    }

    let cursor = ctx.editor.and_then(|e| e.cursor());
    out.push(Line::from(Span::styled(
        format!("    {:<20} {:<28} {}", "field", "generalized-path", "post-processor"),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (i, row) in schema.field_rows.iter().enumerate() {
        let inherited = row.is_inherited(&schema.schema_name);
        let base = if inherited {
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
        } else {
            focus_style(ctx.focused && ctx.sub == Some(i))
        };
        let cell_span = |key: FieldKey, width: usize| {
            let v = row.get(key).unwrap_or("");
            let style = match cursor {
                Some(c) if c.row == i && c.key == key && !inherited => {
                    base.add_modifier(Modifier::REVERSED)
                }
                _ => base,
            };
            Span::styled(format!("{:<width$}", v, width = width), style)
        };
        let mut spans = vec![
            Span::styled("    ".to_string(), base),
            cell_span(FieldKey::Field, 20),
            Span::raw(" "),
            cell_span(FieldKey::GeneralizedPath, 28),
            Span::raw(" "),
            cell_span(FieldKey::PostProcessor, 0),
        ];
        if inherited {
            spans.push(Span::styled(
                format!("  (from {})", row.from_schema_name),
                Style::default().fg(Color::DarkGray),
            ));
        }
        out.push(Line::from(spans));
    }
    out
}

/// Ladder for the bundle state popup, current state marked.
pub(super) fn ladder_lines(info: &BundleInfo) -> Vec<Line<'static>> {
    let kind = info.kind();
    let ladder = states(kind);
    let current = info.state().and_then(|s| highlight(&ladder, s));
    let mut out = vec![
        Line::from(vec![
            Span::styled(info.name().to_string(), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled(info.uuid.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(format!("type: {}", info.bundle_type)),
        Line::from(""),
    ];
    for (i, r) in ladder.iter().enumerate() {
        let on = current == Some(i);
        let style = if on {
            Style::default().fg(state_color(&info.state)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut spans = vec![Span::styled(
            format!("{} {}", if on { "▶" } else { " " }, r.rung.label()),
            style,
        )];
        if let Some(q) = r.qualifier {
            spans.push(Span::styled(format!("  ({})", q), Style::default().fg(Color::DarkGray)));
        }
        out.push(Line::from(spans));
    }
    if let Some(state) = info.state() {
        let text = explain(kind, state);
        if !text.is_empty() {
            out.push(Line::from(""));
            out.push(Line::from(text.to_string()));
        }
    }
    out
}
