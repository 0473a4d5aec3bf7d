use std::fmt;

use crate::model::{SchemaBlock, SchemaRow};

use super::SchemaError;

/// One source line of a schema block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    Schema(String),
    AddSchema(String),
    Add {
        field: String,
        path: Option<String>,
        post_processor: Option<String>,
    },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Schema(name) => write!(f, "schema {}", name),
            Directive::AddSchema(name) => write!(f, "addschema {}", name),
            Directive::Add {
                field,
                path,
                post_processor,
            } => {
                write!(f, "add '{}'", field)?;
                match (path, post_processor) {
                    (Some(p), Some(pp)) => write!(f, " '{}' '{}'", p, pp),
                    (None, Some(pp)) => write!(f, " '' '{}'", pp),
                    (Some(p), None) => write!(f, " '{}'", p),
                    (None, None) => Ok(()),
                }
            }
        }
    }
}

/// Splits a directive into whitespace separated tokens; `'...'` groups a
/// token and `''` yields an empty one.
pub fn tokenize(line: &str) -> Result<Vec<String>, SchemaError> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '\'' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !cur.is_empty() || quoted {
                    out.push(std::mem::take(&mut cur));
                    quoted = false;
                }
            }
            c => cur.push(c),
        }
    }

    if in_quotes {
        return Err(SchemaError::UnterminatedQuote(line.to_string()));
    }
    if !cur.is_empty() || quoted {
        out.push(cur);
    }
    Ok(out)
}

pub fn parse_directive(line: &str) -> Result<Directive, SchemaError> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Err(SchemaError::Empty);
    };
    let non_empty = |s: &String| (!s.is_empty()).then(|| s.clone());
    match head.as_str() {
        "schema" | "addschema" => {
            let directive = if head == "schema" {
                "schema"
            } else {
                "addschema"
            };
            if args.len() != 1 {
                return Err(SchemaError::Arity {
                    directive,
                    expected: "1",
                    got: args.len(),
                });
            }
            let name = args[0].clone();
            Ok(if head == "schema" {
                Directive::Schema(name)
            } else {
                Directive::AddSchema(name)
            })
        }
        "add" => {
            if args.is_empty() || args.len() > 3 {
                return Err(SchemaError::Arity {
                    directive: "add",
                    expected: "1 to 3",
                    got: args.len(),
                });
            }
            Ok(Directive::Add {
                field: args[0].clone(),
                path: args.get(1).and_then(non_empty),
                post_processor: args.get(2).and_then(non_empty),
            })
        }
        other => Err(SchemaError::UnknownDirective(other.to_string())),
    }
}

fn present(v: &Option<String>) -> Option<String> {
    v.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Directives reconstructing `schema`.
///
/// Every contiguous run of inherited rows becomes one `addschema` of its
/// origin. Local rows with an empty field are dropped.
pub fn serialize(schema: &SchemaBlock) -> Vec<Directive> {
    let mut out = vec![Directive::Schema(schema.schema_name.clone())];
    let mut inherited_run: Option<&str> = None;

    for row in &schema.field_rows {
        if row.is_inherited(&schema.schema_name) {
            if inherited_run != Some(row.from_schema_name.as_str()) {
                out.push(Directive::AddSchema(row.from_schema_name.clone()));
                inherited_run = Some(row.from_schema_name.as_str());
            }
            continue;
        }
        inherited_run = None;

        let Some(field) = present(&row.field) else {
            continue;
        };
        out.push(Directive::Add {
            field,
            path: present(&row.generalized_path),
            post_processor: present(&row.post_processor),
        });
    }
    out
}

/// Rebuilds a schema block from its directives. `resolve` supplies the rows of
/// schemas named by `addschema`.
pub fn deserialize<'a, I, F>(lines: I, resolve: F) -> Result<SchemaBlock, SchemaError>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str) -> Option<Vec<SchemaRow>>,
{
    let mut lines = lines.into_iter().filter(|l| !l.trim().is_empty());
    let name = match lines.next().map(parse_directive).transpose()? {
        Some(Directive::Schema(name)) => name,
        _ => return Err(SchemaError::MissingSchemaHeader),
    };

    let mut rows = Vec::new();
    for line in lines {
        match parse_directive(line)? {
            Directive::Schema(_) => return Err(SchemaError::MissingSchemaHeader),
            Directive::AddSchema(other) => {
                let inherited =
                    resolve(&other).ok_or_else(|| SchemaError::UnknownSchema(other.clone()))?;
                rows.extend(inherited.into_iter().map(|mut r| {
                    r.from_schema_name = other.clone();
                    r
                }));
            }
            Directive::Add {
                field,
                path,
                post_processor,
            } => rows.push(SchemaRow {
                field: Some(field),
                generalized_path: path,
                post_processor,
                from_schema_name: name.clone(),
            }),
        }
    }
    Ok(SchemaBlock::new(&name, rows))
}

#[cfg(test)]
#[path = "../tests/schema/directive_tests.rs"]
mod tests;
