use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::keys::{Dispatch, KeyChord};

use super::super::modal::handle_modal_key;
use super::super::render;
use super::super::worker;
use super::App;

impl App {
    pub(in crate::tui_shell) fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            while let Ok(ev) = self.rx.try_recv() {
                self.handle_worker_event(ev);
            }

            self.screen_rows = terminal.size().context("terminal size")?.height;
            terminal
                .draw(|f| render::draw(f, self))
                .context("draw")?;
            if let Some(ws) = &self.worksheet
                && (0..ws.len()).any(|i| ws.is_dirty(i))
            {
                self.worksheet = Some(ws.mark_clean());
            }
            if self.quit {
                tracing::info!("quit");
                self.teardown();
                return Ok(());
            }

            if event::poll(Duration::from_millis(50)).context("poll")? {
                match event::read().context("read event")? {
                    Event::Key(k) if k.kind == KeyEventKind::Press => self.handle_key(k),
                    Event::Resize(_, rows) => {
                        self.screen_rows = rows;
                        let height = self.terminal.height();
                        self.terminal.resize(height, rows);
                    }
                    _ => {}
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(modal) = self.modal.as_mut() {
            let outcome = handle_modal_key(modal, key);
            self.apply_modal_outcome(outcome);
            return;
        }

        self.keys.set_input_focused(self.terminal.is_focused());
        if let Some(chord) = KeyChord::from_event(key) {
            match self.keys.dispatch(chord) {
                Dispatch::Matched(action) => {
                    if self.perform(action) {
                        return;
                    }
                }
                Dispatch::Pending => return,
                Dispatch::Unmatched => {}
            }
        }

        if self.terminal.is_focused() {
            self.terminal_key(key);
        }
    }

    /// Keys the dispatcher left for the terminal input line.
    fn terminal_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.terminal.blur();
                self.keys.set_input_focused(false);
            }
            KeyCode::Char('c') if ctrl => self.terminal.clear_line(),
            KeyCode::Enter => {
                if let Some(effect) = self.terminal.submit() {
                    worker::run_effect(&self.tx, &self.client, effect);
                }
            }
            KeyCode::Tab => {
                if !self.terminal.completions().is_empty() {
                    self.terminal.accept_completion(0);
                } else if let Some(effect) = self.terminal.request_completion() {
                    worker::run_effect(&self.tx, &self.client, effect);
                }
            }
            _ => {
                let Some(input) = self.terminal.input_mut() else {
                    return;
                };
                match key.code {
                    KeyCode::Backspace => input.backspace(),
                    KeyCode::Delete => input.delete(),
                    KeyCode::Left => input.move_left(),
                    KeyCode::Right => input.move_right(),
                    KeyCode::Home => input.cursor = 0,
                    KeyCode::End => input.cursor = input.buf.len(),
                    KeyCode::Up => input.history_up(),
                    KeyCode::Down => input.history_down(),
                    KeyCode::Char(c) if !ctrl => input.insert_char(c),
                    _ => {}
                }
            }
        }
    }
}
