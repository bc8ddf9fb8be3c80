//! `tagsoup` is a WHATWG-inspired HTML tokenizer and tree builder.
//!
//! It follows the spirit of the tokenization phase of the WHATWG HTML
//! parsing algorithm along with a simplified tree-construction phase
//! adequate for downstream transformation/templating use. It does not
//! implement full WHATWG conformance: no scripting, no adoption-agency
//! algorithm, no template/foreign-content insertion modes, no fragment
//! parsing, and no encoding sniffing (input is assumed to already be
//! decoded UTF-8).
//!
//! ```
//! let document = tagsoup::parse("<p>Hello, <b>world</b>!</p>");
//! let root = document.root();
//! let p = document.children(root).next().unwrap();
//! assert!(matches!(document.get(p), Some(tagsoup::NodeData::Element { tag, .. }) if tag == "p"));
//! ```

mod chars;
mod error;
mod node;
mod tokenizer;
mod tree_builder;
mod vecpointer;

pub use error::HtmlParseError;
pub use node::{Document, NodeData, NodeId};

/// Parses `body` into a [`Document`]. Every `\r\n` and lone `\r` in `body`
/// is normalized to `\n` before tokenization, per the WHATWG preprocessing
/// step, so the returned tree is identical to what an already-normalized
/// input would have produced.
///
/// `parse` never fails: malformed markup is absorbed by the tokenizer's
/// recovery rules (see the crate-level docs and SPEC_FULL.md §7) rather
/// than surfaced as an error. The only way this can panic is an internal
/// bookkeeping defect in the state machine itself, which would indicate a
/// bug in this crate rather than anything a caller's input could trigger.
pub fn parse(body: &str) -> Document {
    let normalized = normalize_newlines(body);
    tree_builder::TreeBuilder::new()
        .finish(&normalized)
        .expect("tokenizer/tree-builder internal invariant violated")
}

fn normalize_newlines(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_crlf_and_lone_cr_to_lf() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn parse_is_infallible_on_empty_input() {
        let document = parse("");
        assert_eq!(document.children(document.root()).count(), 0);
    }
}
