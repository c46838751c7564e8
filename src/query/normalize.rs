//! Identifier normalization
//!
//! Rewrites schema-domain constructs into forms the engine accepts:
//! double-quoted identifiers become back-quoted, `#`-prefixed identifiers
//! are back-quoted, and bare `AS` aliases outside the engine's identifier
//! character set are dropped. The alias drop is lossy; callers get an
//! engine-named output column instead of a parse failure.

use super::scan::{SpanKind, spans};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Marker that starts identifiers the engine would read as an operator
pub const IDENTIFIER_MARKER: char = '#';

static MARKED_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\w#$])(#[\w$]+)").expect("valid marker regex"));

static BARE_ALIAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+AS\s+([^\s,;()'"`\[\]]+)"#).expect("valid alias regex")
});

static ENGINE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("valid identifier regex"));

/// Normalize identifiers in `sql`
///
/// String literals pass through untouched, as does anything the rewrite
/// cannot improve. Applying it twice yields the same text as applying it
/// once.
///
/// ```rust
/// use sheetql::query::normalize_identifiers;
///
/// let sql = r#"SELECT "Name", #id FROM "Character""#;
/// assert_eq!(
///     normalize_identifiers(sql),
///     "SELECT `Name`, `#id` FROM `Character`"
/// );
/// ```
pub fn normalize_identifiers(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    for span in spans(sql) {
        match span.kind {
            SpanKind::Double if span.closed => {
                out.push('`');
                out.push_str(&span.inner().replace('`', "``"));
                out.push('`');
            }
            SpanKind::Code => out.push_str(&normalize_code(span.text)),
            _ => out.push_str(span.text),
        }
    }
    out
}

fn normalize_code(code: &str) -> String {
    let marked = MARKED_IDENTIFIER.replace_all(code, "${1}`${2}`");
    BARE_ALIAS
        .replace_all(&marked, |caps: &Captures<'_>| {
            if ENGINE_IDENTIFIER.is_match(&caps[1]) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}
