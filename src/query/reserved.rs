//! Reserved-name registry and remapping
//!
//! Tables named after engine keywords (`Index`, `User`, `Type`, …) are
//! registered under an internal alias: [`RESERVED_ALIAS_PREFIX`] followed by
//! the lower-cased name. Query text is rewritten to the alias only where a
//! table reference can appear, so string literals and unrelated values are
//! never touched.

use super::scan::{SpanKind, spans};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Prefix of the internal alias for reserved table names
pub const RESERVED_ALIAS_PREFIX: &str = "_tbl_";

/// Keywords the engine parses as syntax but that commonly name real tables
const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "between", "both", "by", "case", "cast", "check", "collate", "column", "constraint",
    "create", "cross", "current", "default", "deferrable", "delete", "desc", "describe",
    "distinct", "do", "drop", "else", "end", "enum", "except", "exists", "false", "fetch",
    "for", "foreign", "from", "full", "grant", "group", "having", "in", "index",
    "initially", "inner", "insert", "intersect", "into", "is", "join", "key", "lateral",
    "leading", "left", "like", "limit", "natural", "not", "null", "offset", "on", "only",
    "or", "order", "outer", "pivot", "pivot_longer", "pivot_wider", "placing", "primary",
    "qualify", "references", "returning", "right", "row", "select", "set", "show", "some",
    "summarize", "symmetric", "table", "then", "to", "trailing", "true", "type", "union",
    "unique", "unpivot", "update", "user", "using", "value", "values", "variadic", "when",
    "where", "window", "with",
];

static RESERVED_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(syntax error|parser error|parse error|unexpected|reserved|expected|catalog error|does not exist|not found)",
    )
    .expect("valid error pattern")
});

/// Whether `name` collides with an engine keyword, ignoring case
pub fn is_reserved(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    RESERVED_WORDS.binary_search(&lower.as_str()).is_ok()
}

/// Internal alias a reserved table name is registered under
///
/// ```rust
/// use sheetql::query::internal_alias;
///
/// assert_eq!(internal_alias("Index"), "_tbl_index");
/// ```
pub fn internal_alias(name: &str) -> String {
    format!("{RESERVED_ALIAS_PREFIX}{}", name.trim().to_lowercase())
}

struct Rule {
    original: String,
    internal: String,
    after_keyword: Regex,
    bracketed: Regex,
}

/// Original → internal mapping for the reserved names of one execution
#[derive(Default)]
pub struct ReservedNameMap {
    rules: Vec<Rule>,
}

impl std::fmt::Debug for ReservedNameMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.rules.iter().map(|r| (&r.original, &r.internal)))
            .finish()
    }
}

impl ReservedNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` if it is reserved, returning its internal alias
    pub fn register(&mut self, name: &str) -> Option<String> {
        if !is_reserved(name) {
            return None;
        }
        let internal = internal_alias(name);
        if self.rules.iter().any(|r| r.internal == internal) {
            return Some(internal);
        }

        let escaped = regex::escape(name.trim());
        let after_keyword = Regex::new(&format!(
            r"(?i)\b(FROM|JOIN|UPDATE|INTO|TABLE)(\s+){escaped}\b"
        ))
        .ok()?;
        let bracketed = Regex::new(&format!(r"(?i)\[{escaped}\]")).ok()?;
        self.rules.push(Rule {
            original: name.trim().to_string(),
            internal: internal.clone(),
            after_keyword,
            bracketed,
        });
        Some(internal)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Original → internal pairs, ordered by original name
    pub fn entries(&self) -> BTreeMap<&str, &str> {
        self.rules
            .iter()
            .map(|r| (r.original.as_str(), r.internal.as_str()))
            .collect()
    }

    /// Original name for an internal alias, if it is one of ours
    pub fn original_of(&self, internal: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.internal.eq_ignore_ascii_case(internal))
            .map(|r| r.original.as_str())
    }

    /// Rewrite references to reserved names into their internal aliases
    ///
    /// Quoted occurrences (double quotes, back-quotes, brackets) and bare
    /// occurrences right after `FROM`, `JOIN`, `UPDATE`, `INTO` or `TABLE`
    /// are rewritten; single-quoted literals never are.
    pub fn remap(&self, sql: &str) -> String {
        if self.rules.is_empty() {
            return sql.to_string();
        }
        let mut out = String::with_capacity(sql.len());
        for span in spans(sql) {
            match span.kind {
                SpanKind::Double | SpanKind::Back if span.closed => {
                    let inner = span.inner();
                    match self.rule_for(&inner) {
                        Some(rule) => out.push_str(&rule.internal),
                        None => out.push_str(span.text),
                    }
                }
                SpanKind::Code => {
                    let mut code = span.text.to_string();
                    for rule in &self.rules {
                        code = rule
                            .after_keyword
                            .replace_all(&code, format!("${{1}}${{2}}{}", rule.internal))
                            .into_owned();
                        code = rule
                            .bracketed
                            .replace_all(&code, rule.internal.as_str())
                            .into_owned();
                    }
                    out.push_str(&code);
                }
                _ => out.push_str(span.text),
            }
        }
        out
    }

    /// Corrective hint for an engine error, when it looks like a reserved-word clash
    ///
    /// Names the internal alias of every registered table mentioned in the
    /// statement or the error text. Returns `None` when the error does not
    /// match or no registered name is involved.
    pub fn hint_for(&self, error: &str, statement: &str) -> Option<String> {
        if self.rules.is_empty() || !RESERVED_ERROR.is_match(error) {
            return None;
        }
        let haystack = format!("{error}\n{statement}").to_lowercase();
        let hints: Vec<String> = self
            .rules
            .iter()
            .filter(|r| {
                haystack.contains(&r.original.to_lowercase()) || haystack.contains(&r.internal)
            })
            .map(|r| {
                format!(
                    "table \"{}\" is a reserved word; query it as {} (e.g. SELECT * FROM {})",
                    r.original, r.internal, r.internal
                )
            })
            .collect();
        if hints.is_empty() {
            None
        } else {
            Some(format!("Hint: {}", hints.join("; ")))
        }
    }

    fn rule_for(&self, name: &str) -> Option<&Rule> {
        let lower = name.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.original.to_lowercase() == lower || r.internal == lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_map() -> ReservedNameMap {
        let mut map = ReservedNameMap::new();
        assert_eq!(map.register("Index").as_deref(), Some("_tbl_index"));
        map
    }

    #[test]
    fn test_reserved_words_sorted_for_lookup() {
        let mut sorted = RESERVED_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED_WORDS);
    }

    #[test]
    fn test_is_reserved_ignores_case() {
        assert!(is_reserved("Index"));
        assert!(is_reserved("USER"));
        assert!(is_reserved("enum"));
        assert!(is_reserved("Type"));
        assert!(is_reserved("Pivot"));
        assert!(is_reserved("SHOW"));
        assert!(is_reserved("qualify"));
        assert!(is_reserved("Pivot_Longer"));
        assert!(!is_reserved("Character"));
        assert!(!is_reserved("pivots"));
        assert!(!is_reserved("indexes"));
    }

    #[test]
    fn test_register_ignores_plain_names() {
        let mut map = ReservedNameMap::new();
        assert_eq!(map.register("Character"), None);
        assert!(map.is_empty());
        map.register("Index");
        map.register("INDEX");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remap_quoted_forms() {
        let map = index_map();
        for sql in [
            r#"SELECT * FROM "Index""#,
            "SELECT * FROM `Index`",
            "SELECT * FROM [Index]",
            "SELECT * FROM Index",
            "select * from index",
        ] {
            assert_eq!(map.remap(sql).to_lowercase(), "select * from _tbl_index", "{sql}");
        }
    }

    #[test]
    fn test_remap_after_join_keywords() {
        let map = index_map();
        assert_eq!(
            map.remap("SELECT * FROM a LEFT JOIN Index ON a.id = Index.a_id"),
            "SELECT * FROM a LEFT JOIN _tbl_index ON a.id = Index.a_id"
        );
        assert_eq!(
            map.remap("SELECT `Index`.id FROM Index"),
            "SELECT _tbl_index.id FROM _tbl_index"
        );
    }

    #[test]
    fn test_remap_leaves_literals_and_other_positions() {
        let map = index_map();
        let sql = "SELECT * FROM _tbl_index WHERE note = 'Index'";
        assert_eq!(map.remap(sql), sql);
        assert_eq!(
            map.remap("SELECT * FROM indexes WHERE kind = 'FROM Index'"),
            "SELECT * FROM indexes WHERE kind = 'FROM Index'"
        );
    }

    #[test]
    fn test_hint_names_internal_alias() {
        let map = index_map();
        let hint = map
            .hint_for("Parser Error: syntax error at or near \"Index\"", "SELECT Index.id")
            .unwrap();
        assert!(hint.contains("_tbl_index"));
        assert!(map.hint_for("Division by zero", "SELECT Index.id").is_none());
        assert!(ReservedNameMap::new().hint_for("syntax error", "SELECT 1").is_none());
    }

    #[test]
    fn test_original_of() {
        let map = index_map();
        assert_eq!(map.original_of("_tbl_index"), Some("Index"));
        assert_eq!(map.original_of("character"), None);
    }
}
