use std::path::PathBuf;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::keys::{KeyDispatcher, ScopeToken};
use crate::routes::Route;
use crate::terminal::Navigator;
use crate::worksheet::MoveDirection;

use super::super::Modal;
use super::super::blocks::ladder_lines;
use super::super::worker;
use super::{App, Target};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum AppAction {
    ForceQuit,
    GrowTerminal,
    ShrinkTerminal,

    Quit,
    FocusDown,
    FocusUp,
    FocusTerminal,
    Reload,
    Back,
    NewSchema,
    ToggleEditMode,
    Help,
    Upload,

    Activate,
    OpenNewTab,
    Delete,
    InsertReference,
    Download,
    ToggleSelect,
    ShowStates,

    /// Schema editing on the focused schema block.
    Schema(SchemaAction),
    /// Schema editing on the unsaved draft.
    Draft(SchemaAction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum SchemaAction {
    Save,
    Revert,
    ToggleDisclosure,
    AddRow,
    RemoveRow,
    MoveRowUp,
    MoveRowDown,
    NextColumn,
    PrevColumn,
    EditCell,
    Rename,
    CursorDown,
    CursorUp,
}

const GLOBAL_KEYS: &[(&str, AppAction, &str)] = &[
    ("ctrl+q", AppAction::ForceQuit, "quit"),
    ("ctrl+up", AppAction::GrowTerminal, "grow terminal"),
    ("ctrl+down", AppAction::ShrinkTerminal, "shrink terminal"),
];

const PAGE_KEYS: &[(&str, AppAction, &str)] = &[
    ("q", AppAction::Quit, "quit"),
    ("j", AppAction::FocusDown, "next item"),
    ("down", AppAction::FocusDown, "next item"),
    ("k", AppAction::FocusUp, "previous item"),
    ("up", AppAction::FocusUp, "previous item"),
    (":", AppAction::FocusTerminal, "focus terminal"),
    ("r", AppAction::Reload, "reload"),
    ("b", AppAction::Back, "back"),
    ("s", AppAction::NewSchema, "new schema below focus"),
    ("shift+e", AppAction::ToggleEditMode, "toggle edit mode"),
    ("shift+h", AppAction::Help, "this help"),
    ("u", AppAction::Upload, "upload"),
];

const FOCUSED_KEYS: &[(&str, AppAction, &str)] = &[
    ("enter", AppAction::Activate, "open"),
    ("shift+enter", AppAction::OpenNewTab, "open in browser"),
    ("backspace", AppAction::Delete, "delete schema"),
    ("del", AppAction::Delete, "delete schema"),
    ("i", AppAction::InsertReference, "insert reference into terminal"),
    ("a s", AppAction::Download, "download bundle"),
    ("x", AppAction::ToggleSelect, "select bundle"),
    ("?", AppAction::ShowStates, "bundle state ladder"),
];

const SCHEMA_KEYS: &[(&str, SchemaAction, &str)] = &[
    ("ctrl+s", SchemaAction::Save, "save"),
    ("ctrl+enter", SchemaAction::Save, "save"),
    ("esc", SchemaAction::Revert, "revert"),
    ("c", SchemaAction::ToggleDisclosure, "expand/collapse"),
    ("o", SchemaAction::AddRow, "add row"),
    ("shift+d", SchemaAction::RemoveRow, "remove row"),
    ("shift+k", SchemaAction::MoveRowUp, "move row up"),
    ("shift+j", SchemaAction::MoveRowDown, "move row down"),
    ("l", SchemaAction::NextColumn, "next column"),
    ("tab", SchemaAction::NextColumn, "next column"),
    ("h", SchemaAction::PrevColumn, "previous column"),
    ("backtab", SchemaAction::PrevColumn, "previous column"),
    ("e", SchemaAction::EditCell, "edit cell"),
    ("n", SchemaAction::Rename, "rename schema"),
    ("j", SchemaAction::CursorDown, "next row"),
    ("down", SchemaAction::CursorDown, "next row"),
    ("k", SchemaAction::CursorUp, "previous row"),
    ("up", SchemaAction::CursorUp, "previous row"),
];

fn bind(keys: &mut KeyDispatcher<AppAction>, token: ScopeToken, seq: &str, action: AppAction) {
    if let Err(err) = keys.bind(token, seq, action) {
        tracing::warn!(keys = seq, error = %err, "bind failed");
    }
}

pub(super) fn bind_globals(keys: &mut KeyDispatcher<AppAction>) {
    for (seq, action, _) in GLOBAL_KEYS {
        if let Err(err) = keys.bind_global(seq, *action) {
            tracing::warn!(keys = seq, error = %err, "bind failed");
        }
    }
}

pub(super) fn bind_page(keys: &mut KeyDispatcher<AppAction>, token: ScopeToken) {
    for (seq, action, _) in PAGE_KEYS {
        bind(keys, token, seq, *action);
    }
}

pub(super) fn bind_block(keys: &mut KeyDispatcher<AppAction>, token: ScopeToken, schema: bool) {
    for (seq, action, _) in FOCUSED_KEYS {
        bind(keys, token, seq, *action);
    }
    if schema {
        for (seq, action, _) in SCHEMA_KEYS {
            bind(keys, token, seq, AppAction::Schema(*action));
        }
    }
}

pub(super) fn bind_draft(keys: &mut KeyDispatcher<AppAction>, token: ScopeToken) {
    bind(keys, token, "enter", AppAction::Draft(SchemaAction::Save));
    for (seq, action, _) in SCHEMA_KEYS {
        bind(keys, token, seq, AppAction::Draft(*action));
    }
}

fn help_lines() -> Vec<Line<'static>> {
    let section = |title: &str| {
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Yellow),
        ))
    };
    let row = |seq: &str, what: &str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", seq), Style::default().fg(Color::Cyan)),
            Span::raw(what.to_string()),
        ])
    };

    let mut lines = vec![section("Anywhere")];
    lines.extend(GLOBAL_KEYS.iter().map(|(k, _, w)| row(k, w)));
    lines.push(Line::from(""));
    lines.push(section("Worksheet"));
    lines.extend(PAGE_KEYS.iter().map(|(k, _, w)| row(k, w)));
    lines.push(Line::from(""));
    lines.push(section("Focused block"));
    lines.extend(FOCUSED_KEYS.iter().map(|(k, _, w)| row(k, w)));
    lines.push(Line::from(""));
    lines.push(section("Schema block"));
    lines.extend(SCHEMA_KEYS.iter().map(|(k, _, w)| row(k, w)));
    lines.push(Line::from(""));
    lines.push(section("Terminal"));
    for (k, w) in [
        ("enter", "run command"),
        ("tab", "complete"),
        ("ctrl+c", "clear line"),
        ("up/down", "history"),
        ("esc", "leave terminal"),
    ] {
        lines.push(row(k, w));
    }
    lines
}

impl App {
    /// Runs a bound action. Returns whether the key was consumed.
    pub(super) fn perform(&mut self, action: AppAction) -> bool {
        match action {
            AppAction::ForceQuit | AppAction::Quit => {
                self.quit = true;
                true
            }
            AppAction::GrowTerminal | AppAction::ShrinkTerminal
                if !self.terminal.is_focused() =>
            {
                false
            }
            AppAction::GrowTerminal => {
                let rows = self.terminal.height().saturating_add(1);
                self.terminal.resize(rows, self.screen_rows);
                true
            }
            AppAction::ShrinkTerminal => {
                let rows = self.terminal.height().saturating_sub(1);
                self.terminal.resize(rows, self.screen_rows);
                true
            }

            AppAction::FocusDown => self.move_focus(MoveDirection::Down),
            AppAction::FocusUp => self.move_focus(MoveDirection::Up),
            AppAction::FocusTerminal => {
                if self.terminal.worksheet_uuid().is_none() {
                    return false;
                }
                self.terminal.focus();
                true
            }
            AppAction::Reload => {
                self.reload();
                true
            }
            AppAction::Back => self.back(),
            AppAction::NewSchema => self.start_draft(),
            AppAction::ToggleEditMode => {
                self.edit_mode = !self.edit_mode;
                true
            }
            AppAction::Help => {
                self.modal = Some(Modal::viewer("Keys", help_lines()));
                true
            }
            AppAction::Upload => {
                self.open_upload();
                true
            }

            AppAction::Activate => self.activate(),
            AppAction::OpenNewTab => match self.focused_route() {
                Some(route) => {
                    self.open_new_tab(route);
                    true
                }
                None => false,
            },
            AppAction::Delete => match self.focused_target() {
                Target::Schema(index) => self.schema_delete(index),
                _ => false,
            },
            AppAction::InsertReference => {
                let reference = match self.focused_target() {
                    Target::Bundle(info) => info.uuid,
                    Target::Worksheet(uuid) => uuid,
                    _ => return false,
                };
                self.terminal.insert_reference(&reference);
                true
            }
            AppAction::Download => match self.focused_target() {
                Target::Bundle(info) => {
                    let dest = PathBuf::from(format!("{}-{}", info.name(), info.short_uuid()));
                    self.set_status(format!("downloading {}", info.uuid));
                    worker::download(&self.tx, &self.client, &info.uuid, dest);
                    true
                }
                _ => false,
            },
            AppAction::ToggleSelect => match self.focused_target() {
                Target::Bundle(info) => {
                    if !self.selected.remove(&info.uuid) {
                        self.selected.insert(info.uuid);
                    }
                    true
                }
                _ => false,
            },
            AppAction::ShowStates => match self.focused_target() {
                Target::Bundle(info) => {
                    let title = format!("{} ({})", info.name(), info.state);
                    self.modal = Some(Modal::viewer(&title, ladder_lines(&info)));
                    true
                }
                _ => false,
            },

            AppAction::Schema(action) => match self.focused_target() {
                Target::Schema(index) => self.schema_action(Some(index), action),
                _ => false,
            },
            AppAction::Draft(action) => self.schema_action(None, action),
        }
    }

    /// `Enter` on a focused block: open what it points at, or expand/save a
    /// schema block.
    fn activate(&mut self) -> bool {
        if let Target::Schema(index) = self.focused_target() {
            let Some(target) = self.block_target(index) else {
                return false;
            };
            let Some(update) = self.editor_at(index).and_then(|editor| editor.on_enter()) else {
                return true;
            };
            self.send_save(target, update);
            return true;
        }
        match self.focused_route() {
            Some(route) => {
                self.go_to(route);
                true
            }
            None => false,
        }
    }

    fn focused_route(&self) -> Option<Route> {
        match self.focused_target() {
            Target::Bundle(info) => Some(Route::Bundle(info.uuid)),
            Target::Worksheet(uuid) => Some(Route::Worksheet(uuid)),
            Target::Schema(_) | Target::Other => None,
        }
    }
}
