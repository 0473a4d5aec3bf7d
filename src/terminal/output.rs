use std::collections::BTreeMap;

use crate::gateway::RefTarget;

/// Piece of rendered terminal output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link {
        text: String,
        href: String,
        new_tab: bool,
    },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Text(t) => t,
            Segment::Link { text, .. } => text,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedOutput {
    pub segments: Vec<Segment>,
    /// One line per ref that could not become a link.
    pub diagnostics: Vec<String>,
}

pub fn trim_output(output: &str) -> &str {
    output.strip_suffix('\n').unwrap_or(output)
}

/// `0x` followed by 32 hex digits, or the 32 hex digits alone.
pub fn is_full_uuid(s: &str) -> bool {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    hex.len() == 32 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

fn ref_href(token: &str, target: &RefTarget) -> Result<String, String> {
    let Some(uuid) = target.uuid.as_deref().filter(|u| is_full_uuid(u)) else {
        return Err(format!("ref `{}` has no full uuid", token));
    };
    match target.kind.as_deref() {
        Some(kind @ ("bundle" | "worksheet")) => Ok(format!("/{}s/{}", kind, uuid)),
        Some(other) => Err(format!("ref `{}` has unknown type `{}`", token, other)),
        None => Err(format!("ref `{}` has no type", token)),
    }
}

/// Splits `output` into text and link segments.
///
/// Longer tokens win where tokens overlap; matches never overlap. Refs that
/// cannot be linked stay plain text and yield a diagnostic.
pub fn rewrite_refs(output: &str, refs: &BTreeMap<String, RefTarget>) -> RenderedOutput {
    let mut diagnostics = Vec::new();
    let mut links: Vec<(&str, String)> = Vec::new();
    for (token, target) in refs {
        if token.is_empty() {
            continue;
        }
        match ref_href(token, target) {
            Ok(href) => links.push((token.as_str(), href)),
            Err(diag) => {
                tracing::warn!(token = %token, "{}", diag);
                diagnostics.push(diag);
            }
        }
    }
    links.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = output;
    'scan: while let Some(c) = rest.chars().next() {
        for (token, href) in &links {
            if rest.starts_with(token) {
                if !plain.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut plain)));
                }
                segments.push(Segment::Link {
                    text: token.to_string(),
                    href: href.clone(),
                    new_tab: true,
                });
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }
        plain.push(c);
        rest = &rest[c.len_utf8()..];
    }
    if !plain.is_empty() {
        segments.push(Segment::Text(plain));
    }

    RenderedOutput {
        segments,
        diagnostics,
    }
}

#[cfg(test)]
#[path = "../tests/terminal/output_tests.rs"]
mod tests;
