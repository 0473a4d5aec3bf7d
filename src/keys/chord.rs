use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const MOD_SHIFT: u8 = 0b001;
const MOD_CONTROL: u8 = 0b010;
const MOD_ALT: u8 = 0b100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyChord {
    key: Key,
    modifiers: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Esc,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Letters carry shift explicitly; other printable chars already encode it.
fn normalize_char(mut ch: char, mut modifiers: u8) -> (char, u8) {
    if ch.is_ascii_uppercase() {
        ch = ch.to_ascii_lowercase();
        modifiers |= MOD_SHIFT;
    } else if !ch.is_ascii_alphabetic() {
        modifiers &= !MOD_SHIFT;
    }
    (ch, modifiers)
}

impl KeyChord {
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        let mut modifiers = 0;
        if event.modifiers.contains(KeyModifiers::SHIFT) {
            modifiers |= MOD_SHIFT;
        }
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            modifiers |= MOD_CONTROL;
        }
        if event.modifiers.contains(KeyModifiers::ALT) {
            modifiers |= MOD_ALT;
        }
        let key = match event.code {
            KeyCode::Char(ch) => {
                let (ch, m) = normalize_char(ch, modifiers);
                modifiers = m;
                Key::Char(ch)
            }
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Esc => Key::Esc,
            KeyCode::Tab if modifiers & MOD_SHIFT != 0 => {
                modifiers &= !MOD_SHIFT;
                Key::BackTab
            }
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => {
                modifiers &= !MOD_SHIFT;
                Key::BackTab
            }
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            _ => return None,
        };
        Some(Self { key, modifiers })
    }

    /// Parses one chord such as `ctrl+enter`, `shift+del` or `K`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("key is empty".to_string());
        }
        // `+` on its own, or as the final key of a chord.
        let (mods, key_part) = match trimmed.strip_suffix("++") {
            Some(head) => (head, "+"),
            None if trimmed == "+" => ("", "+"),
            None => match trimmed.rsplit_once('+') {
                Some((head, key)) => (head, key),
                None => ("", trimmed),
            },
        };

        let mut modifiers = 0u8;
        for modifier in mods.split('+').filter(|m| !m.is_empty()) {
            match modifier.trim().to_ascii_lowercase().as_str() {
                "shift" => modifiers |= MOD_SHIFT,
                "ctrl" | "control" => modifiers |= MOD_CONTROL,
                "alt" => modifiers |= MOD_ALT,
                _ => return Err(format!("unknown modifier '{}'", modifier)),
            }
        }

        let key_part = key_part.trim();
        if key_part.is_empty() {
            return Err("missing key after modifier".to_string());
        }
        let key = match key_part.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            "del" | "delete" => Key::Delete,
            "esc" | "escape" => Key::Esc,
            "tab" => Key::Tab,
            "backtab" => Key::BackTab,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            "space" => Key::Char(' '),
            _ => {
                let mut chars = key_part.chars();
                let (Some(ch), None) = (chars.next(), chars.next()) else {
                    return Err(format!("unknown key '{}'", key_part));
                };
                let (ch, m) = normalize_char(ch, modifiers);
                modifiers = m;
                Key::Char(ch)
            }
        };
        Ok(Self { key, modifiers })
    }

    pub fn is_plain_char(&self) -> bool {
        matches!(self.key, Key::Char(_)) && self.modifiers & (MOD_CONTROL | MOD_ALT) == 0
    }
}

/// Parses a whitespace separated chord sequence such as `a s`.
pub fn parse_sequence(raw: &str) -> Result<Vec<KeyChord>, String> {
    let seq = raw
        .split_whitespace()
        .map(KeyChord::parse)
        .collect::<Result<Vec<_>, _>>()?;
    if seq.is_empty() {
        return Err("empty key sequence".to_string());
    }
    Ok(seq)
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers & MOD_CONTROL != 0 {
            f.write_str("ctrl+")?;
        }
        if self.modifiers & MOD_ALT != 0 {
            f.write_str("alt+")?;
        }
        if self.modifiers & MOD_SHIFT != 0 {
            f.write_str("shift+")?;
        }
        match self.key {
            Key::Char(' ') => f.write_str("space"),
            Key::Char(ch) => write!(f, "{}", ch),
            Key::Enter => f.write_str("enter"),
            Key::Backspace => f.write_str("backspace"),
            Key::Delete => f.write_str("del"),
            Key::Esc => f.write_str("esc"),
            Key::Tab => f.write_str("tab"),
            Key::BackTab => f.write_str("backtab"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::Home => f.write_str("home"),
            Key::End => f.write_str("end"),
            Key::PageUp => f.write_str("pageup"),
            Key::PageDown => f.write_str("pagedown"),
        }
    }
}
