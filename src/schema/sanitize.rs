/// Collapses newline runs to a single space and drops single quotes, which
/// delimit directive arguments.
pub fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_break = false;
    for ch in value.chars() {
        match ch {
            '\n' | '\r' => {
                if !in_break {
                    out.push(' ');
                    in_break = true;
                }
            }
            '\'' => {}
            c => {
                out.push(c);
                in_break = false;
            }
        }
    }
    out
}

pub fn sanitize_schema_name(name: &str) -> String {
    sanitize_value(name)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[cfg(test)]
#[path = "../tests/schema/sanitize_tests.rs"]
mod tests;
