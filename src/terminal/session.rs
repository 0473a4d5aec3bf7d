use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::actions::{UiAction, parse_ui_actions};
use super::input::LineInput;
use super::output::{Segment, rewrite_refs, trim_output};
use crate::gateway::{CliResponse, GatewayError};

/// Collapsed height in rows.
pub const MIN_HEIGHT: u16 = 3;
/// Largest share of the screen, in percent, the terminal may take.
pub const MAX_HEIGHT_PERCENT: u16 = 90;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Command,
    Output,
    Error,
    Diagnostic,
}

#[derive(Clone, Debug)]
pub struct TerminalEntry {
    pub ts: String,
    pub kind: EntryKind,
    pub segments: Vec<Segment>,
}

/// Work the owner must run and report back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Execute {
        request_id: u64,
        worksheet_uuid: String,
        command: String,
    },
    Complete {
        request_id: u64,
        worksheet_uuid: String,
        prefix: String,
    },
}

#[derive(Debug)]
pub struct TerminalSession {
    worksheet_uuid: Option<String>,
    input: LineInput,
    entries: Vec<TerminalEntry>,
    focused: bool,
    enabled: bool,
    in_flight: Option<u64>,
    next_request_id: u64,
    latest_completion: Option<(u64, String)>,
    completions: Vec<String>,
    min_height: u16,
    chosen_height: u16,
}

fn now_ts() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "<time>".to_string())
}

impl TerminalSession {
    pub fn new(min_height: u16, default_height: u16) -> Self {
        let min_height = min_height.max(1);
        Self {
            worksheet_uuid: None,
            input: LineInput::default(),
            entries: Vec::new(),
            focused: false,
            enabled: true,
            in_flight: None,
            next_request_id: 1,
            latest_completion: None,
            completions: Vec::new(),
            min_height,
            chosen_height: default_height.max(min_height),
        }
    }

    /// Binds the session to a worksheet. Responses for requests issued
    /// against a previous worksheet are dropped.
    pub fn attach(&mut self, worksheet_uuid: &str) {
        if self.worksheet_uuid.as_deref() != Some(worksheet_uuid) {
            self.in_flight = None;
            self.latest_completion = None;
            self.completions.clear();
        }
        self.worksheet_uuid = Some(worksheet_uuid.to_string());
    }

    pub fn detach(&mut self) {
        self.worksheet_uuid = None;
        self.in_flight = None;
        self.latest_completion = None;
        self.completions.clear();
        self.focused = false;
    }

    pub fn worksheet_uuid(&self) -> Option<&str> {
        self.worksheet_uuid.as_deref()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Accepts input: enabled and no command in flight.
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.in_flight.is_none()
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn input(&self) -> &LineInput {
        &self.input
    }

    /// Mutable input, or `None` while paused.
    pub fn input_mut(&mut self) -> Option<&mut LineInput> {
        if self.is_enabled() {
            Some(&mut self.input)
        } else {
            None
        }
    }

    pub fn entries(&self) -> &[TerminalEntry] {
        &self.entries
    }

    pub fn completions(&self) -> &[String] {
        &self.completions
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// `Escape`: collapse to the minimum height and give focus back.
    pub fn blur(&mut self) {
        self.focused = false;
        self.completions.clear();
    }

    /// `Ctrl+C`: drop the current line.
    pub fn clear_line(&mut self) {
        self.input.clear();
        self.completions.clear();
    }

    /// Appends `text` to the line, focusing the terminal.
    pub fn insert_reference(&mut self, text: &str) {
        self.focus();
        if let Some(input) = self.input_mut() {
            if !input.buf.is_empty() && !input.buf.ends_with(' ') {
                input.insert_char(' ');
            }
            input.insert_str(text);
        }
    }

    pub fn height(&self) -> u16 {
        if self.focused {
            self.chosen_height
        } else {
            self.min_height
        }
    }

    pub fn max_height(&self, screen_rows: u16) -> u16 {
        let max = u32::from(screen_rows) * u32::from(MAX_HEIGHT_PERCENT) / 100;
        (max as u16).max(self.min_height)
    }

    /// Sets the focused height, clamped to `[min, 90% of screen]`.
    pub fn resize(&mut self, rows: u16, screen_rows: u16) {
        self.chosen_height = rows.clamp(self.min_height, self.max_height(screen_rows));
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    fn push(&mut self, kind: EntryKind, segments: Vec<Segment>) {
        self.entries.push(TerminalEntry {
            ts: now_ts(),
            kind,
            segments,
        });
    }

    fn push_text(&mut self, kind: EntryKind, text: &str) {
        self.push(kind, vec![Segment::Text(text.to_string())]);
    }

    /// `Enter`: sends the line and pauses input until the response arrives.
    pub fn submit(&mut self) -> Option<Effect> {
        if !self.is_enabled() {
            return None;
        }
        let worksheet_uuid = self.worksheet_uuid.clone()?;
        let command = self.input.buf.trim().to_string();
        if command.is_empty() {
            return None;
        }
        self.input.push_history(&command);
        self.input.clear();
        self.completions.clear();
        self.latest_completion = None;
        self.push_text(EntryKind::Command, &command);

        let request_id = self.next_id();
        self.in_flight = Some(request_id);
        tracing::debug!(request_id, command = %command, "execute");
        Some(Effect::Execute {
            request_id,
            worksheet_uuid,
            command,
        })
    }

    /// Records an execute response and resumes input. Returns the UI actions
    /// to dispatch; responses for other requests are ignored.
    pub fn execute_resolved(
        &mut self,
        request_id: u64,
        result: Result<CliResponse, GatewayError>,
    ) -> Vec<UiAction> {
        if self.in_flight != Some(request_id) {
            tracing::debug!(request_id, "dropping stale execute response");
            return Vec::new();
        }
        self.in_flight = None;

        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                self.push_text(EntryKind::Error, &err.message);
                return Vec::new();
            }
        };

        let output = trim_output(&resp.output);
        let structured = resp.structured_result.unwrap_or_default();
        if !output.is_empty() {
            let rendered = rewrite_refs(output, &structured.refs);
            self.push(EntryKind::Output, rendered.segments);
            for diag in rendered.diagnostics {
                self.push_text(EntryKind::Diagnostic, &diag);
            }
        }
        if let Some(exception) = resp.exception.as_deref().filter(|e| !e.is_empty()) {
            self.push_text(EntryKind::Error, trim_output(exception));
        }
        parse_ui_actions(&structured.ui_actions)
    }

    /// Requests completions for the current line. Only the latest request's
    /// answer is ever applied.
    pub fn request_completion(&mut self) -> Option<Effect> {
        if !self.is_enabled() || self.input.buf.is_empty() {
            return None;
        }
        let worksheet_uuid = self.worksheet_uuid.clone()?;
        let prefix = self.input.buf.clone();
        let request_id = self.next_id();
        self.latest_completion = Some((request_id, prefix.clone()));
        Some(Effect::Complete {
            request_id,
            worksheet_uuid,
            prefix,
        })
    }

    /// Applies completions when they answer the latest request and the line
    /// has not changed since. Returns whether they were applied.
    pub fn completion_resolved(
        &mut self,
        request_id: u64,
        prefix: &str,
        result: Result<Vec<String>, GatewayError>,
    ) -> bool {
        let current = matches!(
            &self.latest_completion,
            Some((id, p)) if *id == request_id && p == prefix
        );
        if !current || self.input.buf != prefix {
            tracing::debug!(request_id, "dropping stale completions");
            return false;
        }
        self.latest_completion = None;
        match result {
            Ok(list) => {
                self.completions = list;
                true
            }
            Err(err) => {
                tracing::debug!(request_id, error = %err, "completion failed");
                false
            }
        }
    }

    /// Replaces the last word of the line with `completion`, or the whole
    /// line when the completion extends it.
    pub fn accept_completion(&mut self, index: usize) -> bool {
        let Some(completion) = self.completions.get(index).cloned() else {
            return false;
        };
        let line = if completion.starts_with(&self.input.buf) {
            completion
        } else {
            let end = self
                .input
                .buf
                .char_indices()
                .rev()
                .find(|(_, c)| c.is_whitespace())
                .map_or(0, |(i, c)| i + c.len_utf8());
            format!("{}{}", &self.input.buf[..end], completion)
        };
        self.input.set(line);
        self.completions.clear();
        true
    }
}

#[cfg(test)]
#[path = "../tests/terminal/session_tests.rs"]
mod tests;
