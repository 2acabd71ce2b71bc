//! Page content sanitizer
//!
//! Removes the page elements that corrupt native text extraction:
//! annotations, transparency groups/alpha constants, and watermark form
//! declarations. Content streams are rewritten at the byte level with
//! regexes, then normalized structurally through `lopdf`'s content parser.
//! The structural pass only applies when a byte-level lexer confirms the
//! parser saw every operator; otherwise the regex output is kept.
//!
//! Everything regex-based stays behind [`ContentSanitizer`] so a structural
//! object-model edit can replace it without touching callers.

use lopdf::content::{Content, Operation};
use regex::bytes::Regex;

use crate::document::{DocumentHandle, DocumentResult};

/// Per-page sanitization summary
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SanitizeReport {
    pub annotations_removed: usize,
    pub streams_rewritten: usize,
    /// Sub-steps that failed and were skipped
    pub failures: usize,
}

/// Compiled content-stream rewriting rules
#[derive(Debug, Clone)]
pub struct ContentSanitizer {
    transparency: Regex,
    stroke_alpha: Regex,
    fill_alpha: Regex,
    watermark: Regex,
    /// Content-stream tokens; see [`ContentSanitizer::operators`]
    lexer: Regex,
}

impl Default for ContentSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSanitizer {
    pub fn new() -> Self {
        // (?-u): `.` matches any byte but `\n`, so binary stream data survives
        Self {
            transparency: Regex::new(r"(?-u)/Transparency\s*<<.*?>>").expect("valid regex"),
            stroke_alpha: Regex::new(r"(?-u)/CA\s+[0-9.]+").expect("valid regex"),
            fill_alpha: Regex::new(r"(?-u)/ca\s+[0-9.]+").expect("valid regex"),
            watermark: Regex::new(r"(?-u)/Watermark\s*<<.*?>>").expect("valid regex"),
            lexer: Regex::new(CONTENT_TOKEN).expect("valid regex"),
        }
    }

    /// Sanitize one page of an open document in place.
    ///
    /// Best effort: a failing sub-step is logged and skipped, and the page
    /// keeps whatever the earlier steps produced.
    pub fn sanitize_page<H>(&self, doc: &mut H, page: usize) -> SanitizeReport
    where
        H: DocumentHandle + ?Sized,
    {
        let mut report = SanitizeReport::default();

        match doc.annotations(page) {
            Ok(annotations) => {
                // Highest index first so earlier positions stay valid
                for annotation in annotations.iter().rev() {
                    match doc.delete_annotation(page, annotation) {
                        Ok(()) => report.annotations_removed += 1,
                        Err(e) => {
                            tracing::warn!(page, subtype = ?annotation.subtype, "Failed to delete annotation: {}", e);
                            report.failures += 1;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(page, "Failed to list annotations: {}", e);
                report.failures += 1;
            }
        }

        let streams = match doc.content_streams(page) {
            Ok(streams) => streams,
            Err(e) => {
                tracing::warn!(page, "Failed to list content streams: {}", e);
                report.failures += 1;
                return report;
            }
        };

        for stream in streams {
            match self.rewrite_stream(doc, stream) {
                Ok(true) => report.streams_rewritten += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(page, stream = ?stream, "Failed to sanitize content stream: {}", e);
                    report.failures += 1;
                }
            }
        }

        tracing::debug!(
            page,
            annotations_removed = report.annotations_removed,
            streams_rewritten = report.streams_rewritten,
            failures = report.failures,
            "Sanitized page"
        );
        report
    }

    fn rewrite_stream<H>(&self, doc: &mut H, stream: crate::document::ObjectRef) -> DocumentResult<bool>
    where
        H: DocumentHandle + ?Sized,
    {
        let raw = doc.read_stream(stream)?;
        let cleaned = self.sanitize(&raw);
        if cleaned == raw {
            return Ok(false);
        }
        doc.update_stream(stream, cleaned)?;
        Ok(true)
    }

    /// Pure content rewrite: transparency, then watermarks, then the
    /// structural pass.
    pub fn sanitize(&self, raw: &[u8]) -> Vec<u8> {
        let content = self.strip_transparency(raw);
        let content = self.strip_watermarks(&content);
        match self.normalize_structure(&content) {
            Some(normalized) => normalized,
            None => content,
        }
    }

    /// Drop `/Transparency << ... >>` groups and force `/CA` and `/ca` alpha
    /// constants to fully opaque.
    pub fn strip_transparency(&self, content: &[u8]) -> Vec<u8> {
        let content = self.transparency.replace_all(content, &b""[..]);
        let content = self.stroke_alpha.replace_all(&content, &b"/CA 1.0"[..]);
        let content = self.fill_alpha.replace_all(&content, &b"/ca 1.0"[..]);
        content.into_owned()
    }

    /// Drop `/Watermark << ... >>` form declarations
    pub fn strip_watermarks(&self, content: &[u8]) -> Vec<u8> {
        self.watermark.replace_all(content, &b""[..]).into_owned()
    }
}

/// One content-stream token, PDF whitespace included. Strings allow one
/// level of nested parentheses; deeper nesting fails the coverage check.
const CONTENT_TOKEN: &str = concat!(
    r"(?-u)(?P<ws>[\x00\t\n\x0c\r ]+)",
    r"|(?P<comment>%[^\r\n]*)",
    r"|(?P<string>\((?:[^()\\]|\\(?s:.)|\((?:[^()\\]|\\(?s:.))*\))*\))",
    r"|(?P<hex><[0-9A-Fa-f\x00\t\n\x0c\r ]*>)",
    r"|(?P<delim><<|>>|\[|\])",
    r"|(?P<name>/[^\x00\t\n\x0c\r ()<>\[\]{}/%]*)",
    r"|(?P<word>[^\x00\t\n\x0c\r ()<>\[\]{}/%]+)",
);

impl ContentSanitizer {
    /// Structural pass over a content stream.
    ///
    /// Removes `q Q` pairs with nothing between them and `BT ET` text objects
    /// with no operators, repeating until stable. A stream left with no
    /// operations comes back empty.
    ///
    /// Returns `None` unless the decoded operations account for every
    /// operator in the stream: `Content::decode` stops at the first byte it
    /// cannot parse and returns the prefix, and inline images are never
    /// re-encoded.
    pub fn normalize_structure(&self, content: &[u8]) -> Option<Vec<u8>> {
        if content.iter().all(|b| b.is_ascii_whitespace()) {
            return Some(Vec::new());
        }

        let expected = self.operators(content)?;
        let decoded = Content::decode(content).ok()?;
        let covered = decoded.operations.len() == expected.len()
            && decoded
                .operations
                .iter()
                .zip(&expected)
                .all(|(op, keyword)| op.operator.as_bytes() == keyword.as_slice());
        if !covered {
            tracing::trace!(
                decoded = decoded.operations.len(),
                lexed = expected.len(),
                "Content stream only partly decoded, skipping structural pass"
            );
            return None;
        }

        let mut operations = decoded.operations;
        loop {
            let before = operations.len();
            operations = drop_empty_pairs(operations);
            if operations.len() == before {
                break;
            }
        }

        if operations.is_empty() {
            return Some(Vec::new());
        }

        Content { operations }.encode().ok()
    }

    /// Operator keywords in stream order.
    ///
    /// `None` when any byte falls outside a recognized token, a bare word is
    /// neither operand nor operator, or the stream holds an inline image.
    fn operators(&self, content: &[u8]) -> Option<Vec<Vec<u8>>> {
        let mut operators = Vec::new();
        let mut end = 0;

        for caps in self.lexer.captures_iter(content) {
            let token = caps.get(0)?;
            if token.start() != end {
                return None;
            }
            end = token.end();

            let Some(word) = caps.name("word") else {
                continue;
            };
            let word = word.as_bytes();
            if is_operand_word(word) {
                continue;
            }
            if word == b"BI" || !is_operator_word(word) {
                return None;
            }
            operators.push(word.to_vec());
        }

        (end == content.len()).then_some(operators)
    }
}

/// Numbers and the `true`/`false`/`null` keywords
fn is_operand_word(word: &[u8]) -> bool {
    matches!(word, b"true" | b"false" | b"null")
        || std::str::from_utf8(word)
            .is_ok_and(|w| w.parse::<f64>().is_ok() && !w.bytes().any(|b| b.is_ascii_alphabetic()))
}

/// Operator keywords: `BT`, `Tj`, `T*`, `'`, `"`, `d0`, ...
fn is_operator_word(word: &[u8]) -> bool {
    match word.split_first() {
        Some((first, rest)) => {
            (first.is_ascii_alphabetic() || *first == b'\'' || *first == b'"')
                && rest
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'*' | b'\'' | b'"'))
        }
        None => false,
    }
}

fn drop_empty_pairs(operations: Vec<Operation>) -> Vec<Operation> {
    let mut out: Vec<Operation> = Vec::with_capacity(operations.len());
    for op in operations {
        let closes_empty = match (out.last(), op.operator.as_str()) {
            (Some(prev), "Q") => prev.operator == "q" && prev.operands.is_empty(),
            (Some(prev), "ET") => prev.operator == "BT" && prev.operands.is_empty(),
            _ => false,
        };
        if closes_empty && op.operands.is_empty() {
            out.pop();
        } else {
            out.push(op);
        }
    }
    out
}
