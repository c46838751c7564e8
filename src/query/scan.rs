//! Quote-aware segmentation of query text
//!
//! The rewrites in this module tree only ever touch code outside string
//! literals, so they all start from the same segmentation.

/// Kind of a segment of query text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpanKind {
    /// Unquoted SQL text
    Code,
    /// `'string literal'`
    Single,
    /// `"identifier"`
    Double,
    /// `` `identifier` ``
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span<'a> {
    pub kind: SpanKind,
    /// Segment text, delimiters included
    pub text: &'a str,
    /// Whether a quoted segment reached its closing delimiter
    pub closed: bool,
}

impl<'a> Span<'a> {
    /// Text between the delimiters of a quoted span, doubled delimiters unescaped
    pub fn inner(&self) -> String {
        let quote = match self.kind {
            SpanKind::Code => return self.text.to_string(),
            SpanKind::Single => '\'',
            SpanKind::Double => '"',
            SpanKind::Back => '`',
        };
        let body = &self.text[1..];
        let body = if self.closed {
            &body[..body.len() - 1]
        } else {
            body
        };
        let doubled: String = [quote, quote].iter().collect();
        body.replace(&doubled, &quote.to_string())
    }
}

/// Split `sql` into code and quoted spans
///
/// A doubled delimiter inside a quoted span is an escaped delimiter. An
/// unterminated quote runs to the end of the input.
pub(crate) fn spans(sql: &str) -> Vec<Span<'_>> {
    let mut out = Vec::new();
    let mut chars = sql.char_indices().peekable();
    let mut code_start = 0;

    while let Some((start, c)) = chars.next() {
        let kind = match c {
            '\'' => SpanKind::Single,
            '"' => SpanKind::Double,
            '`' => SpanKind::Back,
            _ => continue,
        };
        if start > code_start {
            out.push(Span {
                kind: SpanKind::Code,
                text: &sql[code_start..start],
                closed: true,
            });
        }

        let mut end = sql.len();
        let mut closed = false;
        while let Some((i, q)) = chars.next() {
            if q != c {
                continue;
            }
            if chars.peek().is_some_and(|&(_, next)| next == c) {
                chars.next();
                continue;
            }
            end = i + q.len_utf8();
            closed = true;
            break;
        }
        out.push(Span {
            kind,
            text: &sql[start..end],
            closed,
        });
        code_start = end;
    }

    if code_start < sql.len() {
        out.push(Span {
            kind: SpanKind::Code,
            text: &sql[code_start..],
            closed: true,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<(SpanKind, &str)> {
        spans(sql).into_iter().map(|s| (s.kind, s.text)).collect()
    }

    #[test]
    fn test_spans_cover_input() {
        let sql = r#"SELECT "a b", `c` FROM t WHERE x = 'it''s'"#;
        let joined: String = spans(sql).iter().map(|s| s.text).collect();
        assert_eq!(joined, sql);
        assert_eq!(
            kinds(sql),
            vec![
                (SpanKind::Code, "SELECT "),
                (SpanKind::Double, "\"a b\""),
                (SpanKind::Code, ", "),
                (SpanKind::Back, "`c`"),
                (SpanKind::Code, " FROM t WHERE x = "),
                (SpanKind::Single, "'it''s'"),
            ]
        );
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let all = spans("SELECT 'abc; SELECT 2");
        assert_eq!(all.len(), 2);
        assert!(!all[1].closed);
        assert_eq!(all[1].inner(), "abc; SELECT 2");
    }

    #[test]
    fn test_inner_unescapes_doubled_quotes() {
        let all = spans(r#""say ""hi""""#);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].inner(), r#"say "hi""#);
    }
}
