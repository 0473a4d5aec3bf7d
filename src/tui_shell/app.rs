use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::Result;
use ratatui::text::Line;

use crate::config::ClientConfig;
use crate::gateway::RestClient;
use crate::keys::{KeyDispatcher, ScopeToken};
use crate::model::{BlockBody, BundleInfo};
use crate::routes::{Resolved, Route};
use crate::schema::{EditorRegistry, SchemaEditor, SchemaUpdate};
use crate::terminal::{Navigator, TerminalSession};
use crate::worksheet::{FocusChange, MoveDirection, Update, WorksheetModel};

use super::Modal;
use super::time_utils::now_ts;
use super::worker::{self, SaveTarget, WorkerEvent};

mod actions;
mod event_loop;
mod schema_edit;

use self::actions::AppAction;

pub(super) enum Page {
    Home,
    Loading(String),
    Worksheet,
    Bundle(BundleInfo),
    Info { title: String, lines: Vec<String> },
    /// Neutral placeholder for anything that failed to load.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum StatusKind {
    Info,
    Error,
}

pub(super) struct Status {
    pub(super) ts: String,
    pub(super) kind: StatusKind,
    pub(super) text: String,
}

/// A schema block being created; not on the server yet.
pub(super) struct Draft {
    /// Block the draft is drawn under; `None` draws it first.
    pub(super) anchor: Option<usize>,
    pub(super) editor: SchemaEditor,
}

/// Thing under the focus pointer that actions apply to.
enum Target {
    Schema(usize),
    Bundle(BundleInfo),
    Worksheet(String),
    Other,
}

pub(super) struct App {
    client: RestClient,
    config: ClientConfig,

    pub(super) route: Route,
    history: Vec<Route>,
    pub(super) page: Page,

    pub(super) worksheet: Option<WorksheetModel>,
    pub(super) editors: EditorRegistry,
    pub(super) draft: Option<Draft>,

    pub(super) terminal: TerminalSession,

    keys: KeyDispatcher<AppAction>,
    page_scope: Option<ScopeToken>,
    block_scope: Option<ScopeToken>,
    draft_scope: Option<ScopeToken>,

    pub(super) selected: BTreeSet<String>,
    pub(super) edit_mode: bool,
    pub(super) modal: Option<Modal>,
    pub(super) status: Option<Status>,

    tx: Sender<WorkerEvent>,
    rx: Receiver<WorkerEvent>,

    pub(super) screen_rows: u16,
    quit: bool,
}

impl App {
    pub(super) fn load(opts: crate::tui::TuiRunOptions) -> Result<Self> {
        let config = opts.config;
        let client = RestClient::new(&config.base_url, config.request_timeout())?;
        let (tx, rx) = mpsc::channel();
        let mut app = App {
            client,
            terminal: TerminalSession::new(
                config.terminal.min_height,
                config.terminal.default_height,
            ),
            config,
            route: Route::Home,
            history: Vec::new(),
            page: Page::Home,
            worksheet: None,
            editors: EditorRegistry::new(),
            draft: None,
            keys: KeyDispatcher::new(),
            page_scope: None,
            block_scope: None,
            draft_scope: None,
            selected: BTreeSet::new(),
            edit_mode: false,
            modal: None,
            status: None,
            tx,
            rx,
            screen_rows: 24,
            quit: false,
        };
        actions::bind_globals(&mut app.keys);
        let page = app.keys.push_scope();
        actions::bind_page(&mut app.keys, page);
        app.page_scope = Some(page);

        app.open(opts.start);
        Ok(app)
    }

    /// Drops every key scope this app registered.
    fn teardown(&mut self) {
        for token in [
            self.draft_scope.take(),
            self.block_scope.take(),
            self.page_scope.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.keys.pop_scope(token);
        }
        self.terminal.detach();
    }

    pub(super) fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            ts: now_ts(),
            kind: StatusKind::Info,
            text: text.into(),
        });
    }

    pub(super) fn set_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!("{}", text);
        self.status = Some(Status {
            ts: now_ts(),
            kind: StatusKind::Error,
            text,
        });
    }

    pub(super) fn page_title(&self) -> String {
        match &self.page {
            Page::Home => "home".to_string(),
            Page::Loading(what) => format!("loading {}", what),
            Page::Worksheet => self
                .worksheet
                .as_ref()
                .map(|w| w.title().unwrap_or(w.name()).to_string())
                .unwrap_or_default(),
            Page::Bundle(info) => info.name().to_string(),
            Page::Info { title, .. } => title.clone(),
            Page::Error => "error".to_string(),
        }
    }

    // Navigation.

    /// Shows `route` without touching history.
    fn open(&mut self, route: Route) {
        tracing::info!(route = %route, "open");
        self.route = route.clone();
        self.discard_draft();
        let keep = matches!(&route, Route::Worksheet(uuid)
            if self.worksheet.as_ref().is_some_and(|w| w.uuid() == uuid));
        if !keep {
            self.set_worksheet(None);
            self.selected.clear();
            self.terminal.detach();
        }
        match route {
            Route::Home => match self.config.default_worksheet.clone() {
                Some(spec) => self.open(Route::for_worksheet(&spec)),
                None => self.page = Page::Home,
            },
            Route::WorksheetByName(name) => {
                self.page = Page::Loading(name);
                worker::resolve(&self.tx, &self.client, self.route.clone());
            }
            Route::Worksheet(uuid) => {
                if !keep {
                    self.page = Page::Loading(uuid.clone());
                }
                self.terminal.attach(&uuid);
                worker::load_worksheet(&self.tx, &self.client, &uuid);
            }
            Route::Bundle(uuid) => {
                self.page = Page::Loading(uuid.clone());
                worker::load_bundle(&self.tx, &self.client, &uuid);
            }
            Route::Login | Route::Signup | Route::SignupSuccess => {
                let path = self.route.path();
                self.page = Page::Info {
                    lines: vec![
                        "Accounts are managed in the web interface:".to_string(),
                        format!("{}{}", self.client.base_url(), path),
                    ],
                    title: path,
                };
            }
        }
    }

    pub(super) fn go_to(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        self.history.push(self.route.clone());
        self.open(route);
    }

    fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(route) => {
                self.open(route);
                true
            }
            None => false,
        }
    }

    fn reload(&mut self) {
        match &self.route {
            Route::Worksheet(uuid) => worker::load_worksheet(&self.tx, &self.client, uuid),
            Route::Bundle(uuid) => worker::load_bundle(&self.tx, &self.client, uuid),
            _ => {}
        }
    }

    // Worksheet model and focus.

    fn set_worksheet(&mut self, model: Option<WorksheetModel>) {
        if model.is_none() {
            self.editors.clear();
            self.release_block_scope();
        }
        self.worksheet = model;
    }

    /// Swaps in a new model. An editor whose block loses the focus drops its
    /// unsaved edits.
    fn apply_update(&mut self, update: Update) {
        let before = self.focused_ids();
        self.worksheet = Some(update.model);
        if let Some(ids) = before
            && self.focused_ids().as_ref() != Some(&ids)
        {
            self.editors.blur(&ids);
        }
        if let Some(change) = update.change {
            self.on_focus_change(change);
        }
    }

    fn on_focus_change(&mut self, change: FocusChange) {
        if change.block_changed() {
            self.refresh_block_scope();
        }
    }

    /// Re-binds keys for whatever block holds the focus now. A reload can put
    /// a different block under an unchanged focus index.
    fn refresh_block_scope(&mut self) {
        self.release_block_scope();
        if let Some(focus) = self.worksheet.as_ref().and_then(|w| w.focus()) {
            self.bind_block_scope(focus.index);
        }
        if self.draft.is_some() {
            self.bind_draft_scope();
        }
    }

    fn release_block_scope(&mut self) {
        if let Some(token) = self.block_scope.take() {
            self.keys.pop_scope(token);
        }
    }

    fn bind_block_scope(&mut self, index: usize) {
        let is_schema = self
            .worksheet
            .as_ref()
            .and_then(|w| w.blocks().get(index))
            .is_some_and(|b| b.schema().is_some());
        let token = self.keys.push_scope();
        actions::bind_block(&mut self.keys, token, is_schema);
        self.block_scope = Some(token);
    }

    fn bind_draft_scope(&mut self) {
        if let Some(token) = self.draft_scope.take() {
            self.keys.pop_scope(token);
        }
        let token = self.keys.push_scope();
        actions::bind_draft(&mut self.keys, token);
        self.draft_scope = Some(token);
    }

    fn move_focus(&mut self, direction: MoveDirection) -> bool {
        let Some(ws) = &self.worksheet else {
            return false;
        };
        let update = ws.move_focus(direction);
        let moved = update.change.is_some();
        self.apply_update(update);
        moved
    }

    /// Moves to the neighbouring block, skipping its rows.
    fn step_block(&mut self, direction: MoveDirection) -> bool {
        let Some(ws) = &self.worksheet else {
            return false;
        };
        let Some(focus) = ws.focus() else {
            return self.move_focus(direction);
        };
        let next = match direction {
            MoveDirection::Up => focus.index.checked_sub(1),
            MoveDirection::Down => (focus.index + 1 < ws.len()).then_some(focus.index + 1),
        };
        let Some(next) = next else {
            return false;
        };
        let update = ws.set_focus(Some((next, None)));
        self.apply_update(update);
        true
    }

    fn focused_target(&self) -> Target {
        let Some(ws) = &self.worksheet else {
            return Target::Other;
        };
        let Some(block) = ws.focused_block() else {
            return Target::Other;
        };
        let Some(focus) = ws.focus() else {
            return Target::Other;
        };
        match &block.body {
            BlockBody::SchemaBlock(_) => Target::Schema(focus.index),
            BlockBody::SubworksheetsBlock(_) => block
                .worksheet_at(focus.sub)
                .map(|w| Target::Worksheet(w.uuid.clone()))
                .unwrap_or(Target::Other),
            _ => block
                .bundle_at(focus.sub)
                .map(|b| Target::Bundle(b.clone()))
                .unwrap_or(Target::Other),
        }
    }

    /// Editor for the schema block at `index`, created on first use.
    pub(super) fn editor_at(&mut self, index: usize) -> Option<&mut SchemaEditor> {
        let ws = self.worksheet.as_ref()?;
        self.editors.editor_at(ws, index)
    }

    fn focused_ids(&self) -> Option<Vec<i64>> {
        self.worksheet
            .as_ref()
            .and_then(|w| w.focused_block())
            .map(|b| b.ids.clone())
    }

    fn sync_editors(&mut self) {
        match &self.worksheet {
            Some(ws) => self.editors.sync(ws),
            None => self.editors.clear(),
        }
    }

    pub(super) fn send_save(&mut self, target: SaveTarget, update: SchemaUpdate) {
        let Some(uuid) = self.worksheet.as_ref().map(|w| w.uuid().to_string()) else {
            return;
        };
        worker::save_schema(&self.tx, &self.client, &uuid, target, update);
    }

    // Worker events.

    fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Resolved { route, resolved } => {
                if route != self.route {
                    return;
                }
                match resolved {
                    Resolved::Redirect(next) => self.open(next),
                    Resolved::Error => self.page = Page::Error,
                }
            }

            WorkerEvent::WorksheetLoaded { uuid, result } => {
                if self.route != Route::Worksheet(uuid.clone()) {
                    return;
                }
                let ws = match result {
                    Ok(ws) => ws,
                    Err(err) => {
                        self.set_error(format!("load worksheet: {}", err));
                        if self.worksheet.is_none() {
                            self.page = Page::Error;
                        }
                        return;
                    }
                };
                if self.worksheet.as_ref().is_none_or(|w| w.uuid() != uuid) {
                    self.editors.clear();
                }
                let loaded = match &self.worksheet {
                    Some(current) if current.uuid() == uuid => current.reload(ws),
                    _ => WorksheetModel::from_worksheet(ws).map(|model| {
                        let first = (!model.is_empty()).then_some((0, None));
                        model.set_focus(first)
                    }),
                };
                match loaded {
                    Ok(update) => {
                        self.apply_update(update);
                        self.refresh_block_scope();
                        self.sync_editors();
                        self.page = Page::Worksheet;
                    }
                    Err(err) => {
                        self.set_error(format!("worksheet {}: {}", uuid, err));
                        self.set_worksheet(None);
                        self.page = Page::Error;
                    }
                }
            }

            WorkerEvent::BundleLoaded { uuid, result } => {
                if self.route != Route::Bundle(uuid.clone()) {
                    return;
                }
                match result {
                    Ok(info) => self.page = Page::Bundle(info),
                    Err(err) => {
                        self.set_error(format!("load bundle {}: {}", uuid, err));
                        self.page = Page::Error;
                    }
                }
            }

            WorkerEvent::SchemaSaved {
                worksheet_uuid,
                target,
                result,
            } => {
                let outcome = result.map_err(|e| e.message);
                let ok = outcome.is_ok();
                if let Err(msg) = &outcome {
                    self.set_error(format!("save schema: {}", msg));
                }
                match target {
                    SaveTarget::Draft => {
                        if let Some(draft) = self.draft.as_mut() {
                            draft.editor.finish_save(outcome);
                        }
                        if ok {
                            self.discard_draft();
                        }
                    }
                    SaveTarget::Block(ids) => {
                        if let Some(editor) = self.editors.by_ids_mut(&ids) {
                            editor.finish_save(outcome);
                        }
                    }
                }
                if ok && self.worksheet.as_ref().is_some_and(|w| w.uuid() == worksheet_uuid) {
                    self.set_status("schema saved");
                    self.reload();
                }
            }

            WorkerEvent::Executed { request_id, result } => {
                let actions = self.terminal.execute_resolved(request_id, result);
                crate::terminal::dispatch(&actions, self);
                self.reload();
            }

            WorkerEvent::Completed {
                request_id,
                prefix,
                result,
            } => {
                self.terminal.completion_resolved(request_id, &prefix, result);
            }

            WorkerEvent::Downloaded { uuid, result } => match result {
                Ok(path) => self.set_status(format!("downloaded {} to {}", uuid, path.display())),
                Err(err) => self.set_error(format!("download {}: {}", uuid, err)),
            },
        }
    }

    fn url_for(&self, route: &Route) -> String {
        format!("{}{}", self.client.base_url(), route.path())
    }
}

impl Navigator for App {
    fn navigate(&mut self, route: Route) {
        self.go_to(route);
    }

    fn open_new_tab(&mut self, route: Route) {
        let url = self.url_for(&route);
        match open::that(&url) {
            Ok(()) => self.set_status(format!("opened {}", url)),
            Err(err) => self.set_error(format!("open {}: {}", url, err)),
        }
    }

    fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
    }

    fn open_upload(&mut self) {
        self.modal = Some(Modal::viewer(
            "Upload",
            vec![
                Line::from("Uploading files needs a local file picker."),
                Line::from("Use `cl upload <path>` in the terminal instead."),
            ],
        ));
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
