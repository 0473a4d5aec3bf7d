use thiserror::Error;

use super::chord::{KeyChord, parse_sequence};

/// Sequences only the focused (topmost) scope may bind.
pub const BLOCK_KEYS: &[&str] = &[
    "enter",
    "shift+enter",
    "backspace",
    "shift+backspace",
    "del",
    "shift+del",
    "i",
    "shift+i",
    "a s",
    "x",
    "shift+x",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeToken(u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key sequence '{keys}': {message}")]
    Invalid { keys: String, message: String },

    #[error("'{0}' is reserved for the focused block")]
    Reserved(String),

    #[error("'{0}' is already bound in this scope")]
    Duplicate(String),

    #[error("scope is no longer active")]
    InactiveScope,
}

/// Result of feeding one chord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<A> {
    Matched(A),
    /// The chord started a longer binding; the next chord continues it.
    Pending,
    Unmatched,
}

type Bindings<A> = Vec<(Vec<KeyChord>, A)>;

struct Scope<A> {
    token: ScopeToken,
    bindings: Bindings<A>,
}

pub struct KeyDispatcher<A> {
    scopes: Vec<Scope<A>>,
    globals: Bindings<A>,
    reserved: Vec<Vec<KeyChord>>,
    pending: Vec<KeyChord>,
    next_token: u64,
    input_focused: bool,
}

impl<A: Clone> Default for KeyDispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(keys: &str) -> Result<Vec<KeyChord>, KeyError> {
    parse_sequence(keys).map_err(|message| KeyError::Invalid {
        keys: keys.to_string(),
        message,
    })
}

fn insert<A>(bindings: &mut Bindings<A>, seq: Vec<KeyChord>, keys: &str, action: A) -> Result<(), KeyError> {
    if bindings.iter().any(|(s, _)| *s == seq) {
        return Err(KeyError::Duplicate(keys.to_string()));
    }
    bindings.push((seq, action));
    Ok(())
}

enum LayerHit<A> {
    Exact(A),
    Prefix,
}

fn probe<A: Clone>(bindings: &Bindings<A>, seq: &[KeyChord]) -> Option<LayerHit<A>> {
    if let Some((_, action)) = bindings.iter().find(|(s, _)| s.as_slice() == seq) {
        return Some(LayerHit::Exact(action.clone()));
    }
    bindings
        .iter()
        .any(|(s, _)| s.len() > seq.len() && s.starts_with(seq))
        .then_some(LayerHit::Prefix)
}

impl<A: Clone> KeyDispatcher<A> {
    pub fn new() -> Self {
        let reserved = BLOCK_KEYS
            .iter()
            .filter_map(|k| parse_sequence(k).ok())
            .collect();
        Self {
            scopes: Vec::new(),
            globals: Vec::new(),
            reserved,
            pending: Vec::new(),
            next_token: 1,
            input_focused: false,
        }
    }

    pub fn push_scope(&mut self) -> ScopeToken {
        let token = ScopeToken(self.next_token);
        self.next_token += 1;
        self.scopes.push(Scope {
            token,
            bindings: Vec::new(),
        });
        self.pending.clear();
        token
    }

    /// Drops the scope and all its bindings. Returns false when it was
    /// already gone.
    pub fn pop_scope(&mut self, token: ScopeToken) -> bool {
        let before = self.scopes.len();
        self.scopes.retain(|s| s.token != token);
        self.pending.clear();
        self.scopes.len() != before
    }

    pub fn is_active(&self, token: ScopeToken) -> bool {
        self.scopes.iter().any(|s| s.token == token)
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn bind(&mut self, token: ScopeToken, keys: &str, action: A) -> Result<(), KeyError> {
        let seq = parse(keys)?;
        let scope = self
            .scopes
            .iter_mut()
            .find(|s| s.token == token)
            .ok_or(KeyError::InactiveScope)?;
        insert(&mut scope.bindings, seq, keys, action)
    }

    pub fn bind_global(&mut self, keys: &str, action: A) -> Result<(), KeyError> {
        let seq = parse(keys)?;
        if self.reserved.contains(&seq) {
            return Err(KeyError::Reserved(keys.to_string()));
        }
        insert(&mut self.globals, seq, keys, action)
    }

    pub fn unbind_global(&mut self, keys: &str) -> Result<bool, KeyError> {
        let seq = parse(keys)?;
        let before = self.globals.len();
        self.globals.retain(|(s, _)| *s != seq);
        Ok(self.globals.len() != before)
    }

    /// While a text input has focus only global bindings fire.
    pub fn set_input_focused(&mut self, focused: bool) {
        self.input_focused = focused;
        self.pending.clear();
    }

    pub fn pending(&self) -> &[KeyChord] {
        &self.pending
    }

    fn resolve(&self, seq: &[KeyChord]) -> Option<LayerHit<A>> {
        if !self.input_focused {
            let reserved = self.reserved.iter().any(|r| r.starts_with(seq));
            for (depth, scope) in self.scopes.iter().rev().enumerate() {
                if reserved && depth > 0 {
                    // Reserved keys never fall through the focused scope.
                    return None;
                }
                if let Some(hit) = probe(&scope.bindings, seq) {
                    return Some(hit);
                }
            }
        }
        probe(&self.globals, seq)
    }

    pub fn dispatch(&mut self, chord: KeyChord) -> Dispatch<A> {
        let had_pending = !self.pending.is_empty();
        let mut seq = std::mem::take(&mut self.pending);
        seq.push(chord);

        match self.resolve(&seq) {
            Some(LayerHit::Exact(action)) => return Dispatch::Matched(action),
            Some(LayerHit::Prefix) => {
                self.pending = seq;
                return Dispatch::Pending;
            }
            None => {}
        }
        if had_pending {
            return self.dispatch(chord);
        }
        Dispatch::Unmatched
    }

    /// Runs the bound action through `run`. The key counts as consumed only
    /// when `run` reports success, or when it started a pending sequence.
    pub fn handle(&mut self, chord: KeyChord, mut run: impl FnMut(&A) -> bool) -> bool {
        match self.dispatch(chord) {
            Dispatch::Matched(action) => run(&action),
            Dispatch::Pending => true,
            Dispatch::Unmatched => false,
        }
    }
}

#[cfg(test)]
#[path = "../tests/keys/dispatcher_tests.rs"]
mod tests;
