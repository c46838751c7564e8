//! Statement splitting

/// Split `;`-separated input into statements
///
/// A `;` inside a single-quoted or back-quoted span is not a boundary.
/// Whitespace-only statements are discarded and a trailing statement
/// without a final `;` is kept. An unterminated quote keeps the rest of the
/// input, semicolons included, in the last statement; any resulting syntax
/// error is left for the engine to report.
///
/// ```rust
/// use sheetql::query::split_statements;
///
/// let parts = split_statements("SELECT * FROM t WHERE x = 'a;b'; SELECT 2");
/// assert_eq!(parts, vec!["SELECT * FROM t WHERE x = 'a;b'", "SELECT 2"]);
/// ```
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_back = false;

    for c in sql.chars() {
        match c {
            '\'' if !in_back => in_single = !in_single,
            '`' if !in_single => in_back = !in_back,
            ';' if !in_single && !in_back => {
                push_statement(&mut statements, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}
