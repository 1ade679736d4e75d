//! Renders an answer with citation links for Telegram's HTML parse mode.

use std::fmt::Write;

use crate::backend::{AnswerResponse, Document};

/// Formats `response` into the text sent back to the chat.
///
/// Every marker `[n]` in the answer with `1 <= n <= documents.len()` becomes a
/// link to `documents[n - 1].url` that still reads `[n]`. Out-of-range markers
/// stay as they are. When there are documents, a blank line, `label` and one
/// numbered link per document follow, in response order, cited or not.
///
/// Without documents the answer is returned verbatim.
///
/// # Examples
///
/// ```
/// use askrelay::answerer::format_answer;
/// use askrelay::backend::{AnswerResponse, Document};
///
/// let response = AnswerResponse::new("See [1].", vec![Document::new("http://a", "A")]);
/// assert_eq!(
///     format_answer(&response, "Related:"),
///     "See <a href=\"http://a\">[1]</a>.\n\nRelated:\n<a href=\"http://a\">[1] A</a>"
/// );
/// ```
pub fn format_answer(response: &AnswerResponse, label: &str) -> String {
    let documents = &response.documents;
    if documents.is_empty() {
        return response.answer.clone();
    }

    let mut text = link_markers(&response.answer, documents);
    text.push_str("\n\n");
    text.push_str(label);
    for (i, doc) in documents.iter().enumerate() {
        let _ = write!(
            text,
            "\n<a href=\"{}\">[{}] {}</a>",
            escape_html(&doc.url),
            i + 1,
            escape_html(&doc.title)
        );
    }
    text
}

/// Rewrites in-range `[n]` markers as links in a single left-to-right pass.
///
/// Only the canonical spelling of a number matches, so `[01]` is left alone.
fn link_markers(answer: &str, documents: &[Document]) -> String {
    let mut out = String::with_capacity(answer.len());
    let mut rest = answer;

    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        match marker_at(candidate, documents.len()) {
            Some((no, len)) => {
                let _ = write!(
                    out,
                    "<a href=\"{}\">[{}]</a>",
                    escape_html(&documents[no - 1].url),
                    no
                );
                rest = &candidate[len..];
            }
            None => {
                out.push('[');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parses a marker at the start of `s`, returning its number and byte length.
fn marker_at(s: &str, count: usize) -> Option<(usize, usize)> {
    let close = s.find(']')?;
    let digits = &s[1..close];

    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let no: usize = digits.parse().ok()?;
    (no <= count).then_some((no, close + 1))
}

/// Escapes text for Telegram's HTML parse mode.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
