//! The tree-construction phase: consumes the tokenizer's token stream and
//! assembles an arena of [`NodeData`] ([`crate::node`]), maintaining a stack
//! of currently-open elements.
//!
//! Deliberately simplified relative to WHATWG tree construction (see
//! SPEC_FULL.md §4.4): there is a single insertion mode, no "in scope"
//! checks, and end tags close whatever element is innermost regardless of
//! whether its name matches. This is adequate for the downstream
//! transformation use case this crate targets and keeps the builder itself
//! small.

use indextree::Arena;

use crate::error::HtmlParseError;
use crate::node::{Document, NodeData, NodeId};
use crate::tokenizer::{Acknowledgement, Parser, TagTokenType, Token, TokenizerState};

/// Elements whose HTML syntax forbids an end tag, and which therefore can
/// never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements promoted into the tokenizer's RCData sub-state once opened (see
/// SPEC_FULL.md §4.4 and §6's extensibility hook). Only `style` today.
const RCDATA_ELEMENTS: &[&str] = &["style"];

pub(crate) struct TreeBuilder {
    arena: Arena<NodeData>,
    root: NodeId,
    /// Stack of open elements; `open[0]` is always `root`.
    open: Vec<NodeId>,
    /// Characters accumulated since the last non-Character token, flushed
    /// into a single coalesced Text node (per SPEC_FULL.md §3's "a Text
    /// node's string is never empty when inserted").
    pending_text: String,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData::Root);
        TreeBuilder {
            arena,
            root,
            open: vec![root],
            pending_text: String::new(),
        }
    }

    fn current_parent(&self) -> NodeId {
        *self
            .open
            .last()
            .expect("open-elements stack always contains at least root")
    }

    fn flush_pending_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        let parent = self.current_parent();
        let node = self.arena.new_node(NodeData::Text(text));
        parent.append(node, &mut self.arena);
    }

    fn append_child(&mut self, data: NodeData) -> NodeId {
        let parent = self.current_parent();
        let node = self.arena.new_node(data);
        parent.append(node, &mut self.arena);
        node
    }

    /// Runs the tokenizer to completion over `input`, feeding this builder,
    /// then collapses the remaining open-elements stack and returns the
    /// finished [`Document`]. `\r\n` and lone `\r` must already have been
    /// normalized to `\n` by the caller (see [`crate::parse`]).
    pub(crate) fn finish(mut self, input: &str) -> Result<Document, HtmlParseError> {
        let codepoints: Vec<char> = input.chars().collect();
        let input_stream = crate::vecpointer::VecPointerRef::new(&codepoints);
        {
            let mut tokenizer = crate::tokenizer::Tokenizer::new(input_stream, &mut self);
            tokenizer.run()?;
        }

        Ok(self.into_document())
    }

    /// Finalizes the builder without driving a tokenizer over it: flushes
    /// pending text and collapses the open-elements stack down to the root.
    /// Used directly by tree-builder tests that feed synthetic tokens
    /// through [`Parser::token_emitted`] rather than real source text.
    fn into_document(mut self) -> Document {
        self.flush_pending_text();
        while self.open.len() > 1 {
            self.open.pop();
        }
        Document {
            arena: self.arena,
            root: self.root,
        }
    }
}

impl Parser for TreeBuilder {
    fn token_emitted(&mut self, token: Token) -> Result<Acknowledgement, HtmlParseError> {
        match token {
            Token::Character(c) => {
                self.pending_text.push(c);
                Ok(Acknowledgement::none())
            }
            Token::Tag(TagTokenType::StartTag(tag)) => {
                self.flush_pending_text();
                let tag_name = tag.tag_name;
                let is_void = VOID_ELEMENTS.contains(&tag_name.as_str());
                let self_closing = tag.self_closing;
                let attrs = tag
                    .attributes
                    .into_iter()
                    .map(|attr| (attr.name, attr.value))
                    .collect();
                let node = self.append_child(NodeData::Element {
                    tag: tag_name.clone(),
                    attrs,
                    self_closing,
                });
                if !self_closing && !is_void {
                    self.open.push(node);
                }
                if RCDATA_ELEMENTS.contains(&tag_name.as_str()) {
                    return Ok(Acknowledgement::switch_to(TokenizerState::RcData));
                }
                Ok(Acknowledgement::none())
            }
            Token::Tag(TagTokenType::EndTag(_)) => {
                self.flush_pending_text();
                if self.open.len() > 1 {
                    self.open.pop();
                }
                Ok(Acknowledgement::none())
            }
            Token::Comment(data) => {
                self.flush_pending_text();
                self.append_child(NodeData::Comment(data));
                Ok(Acknowledgement::none())
            }
            Token::Doctype(doctype) => {
                self.flush_pending_text();
                self.append_child(NodeData::Doctype {
                    name: doctype.name,
                    data: doctype.data,
                });
                Ok(Acknowledgement::none())
            }
            Token::EndOfFile => {
                self.flush_pending_text();
                Ok(Acknowledgement::none())
            }
        }
    }

    fn current_open_element_name(&self) -> Option<&str> {
        let id = *self.open.last()?;
        if id == self.root {
            return None;
        }
        match self.arena.get(id)?.get() {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{Attribute, TagToken};

    fn start_tag(name: &str) -> Token {
        Token::Tag(TagTokenType::StartTag(TagToken {
            tag_name: name.to_string(),
            self_closing: false,
            attributes: Vec::new(),
        }))
    }

    fn end_tag(name: &str) -> Token {
        Token::Tag(TagTokenType::EndTag(TagToken {
            tag_name: name.to_string(),
            self_closing: false,
            attributes: Vec::new(),
        }))
    }

    #[test]
    fn void_element_is_not_pushed_and_gets_no_children() {
        let mut builder = TreeBuilder::new();
        builder.token_emitted(start_tag("img")).unwrap();
        builder.token_emitted(Token::Character('x')).unwrap();
        builder.token_emitted(Token::EndOfFile).unwrap();
        let document = builder.into_document();

        let root_children: Vec<_> = document.children(document.root()).collect();
        assert_eq!(root_children.len(), 2);
        assert!(matches!(
            document.get(root_children[0]),
            Some(NodeData::Element { tag, .. }) if tag == "img"
        ));
        assert_eq!(document.children(root_children[0]).count(), 0);
        assert_eq!(document.get(root_children[1]), Some(&NodeData::Text("x".into())));
    }

    #[test]
    fn adjacent_characters_coalesce_into_one_text_node() {
        let mut builder = TreeBuilder::new();
        for c in "ab".chars() {
            builder.token_emitted(Token::Character(c)).unwrap();
        }
        builder.token_emitted(Token::Comment("c".into())).unwrap();
        builder.token_emitted(Token::EndOfFile).unwrap();
        let document = builder.into_document();

        let root_children: Vec<_> = document.children(document.root()).collect();
        assert_eq!(
            document.get(root_children[0]),
            Some(&NodeData::Text("ab".into()))
        );
        assert_eq!(
            document.get(root_children[1]),
            Some(&NodeData::Comment("c".into()))
        );
    }

    #[test]
    fn empty_text_buffer_produces_no_node() {
        let mut builder = TreeBuilder::new();
        builder.token_emitted(Token::Comment("a".into())).unwrap();
        builder.token_emitted(Token::Comment("b".into())).unwrap();
        builder.token_emitted(Token::EndOfFile).unwrap();
        let document = builder.into_document();

        assert_eq!(document.children(document.root()).count(), 2);
    }

    #[test]
    fn style_start_tag_requests_rcdata_switch() {
        let mut builder = TreeBuilder::new();
        let ack = builder.token_emitted(start_tag("style")).unwrap();
        assert_eq!(ack.tokenizer_state, Some(TokenizerState::RcData));
    }

    #[test]
    fn non_style_start_tag_requests_no_switch() {
        let mut builder = TreeBuilder::new();
        let ack = builder.token_emitted(start_tag("div")).unwrap();
        assert_eq!(ack.tokenizer_state, None);
    }

    #[test]
    fn end_tag_pops_innermost_element_regardless_of_name() {
        // Documented simplification (SPEC_FULL.md §4.4): there is no "in
        // scope" matching, so a mismatched end tag still closes whatever is
        // innermost rather than being ignored.
        let mut builder = TreeBuilder::new();
        builder.token_emitted(start_tag("p")).unwrap();
        builder.token_emitted(start_tag("span")).unwrap();
        builder.token_emitted(end_tag("p")).unwrap();
        assert_eq!(builder.current_open_element_name(), Some("p"));
        builder.token_emitted(Token::EndOfFile).unwrap();
    }

    #[test]
    fn end_tag_with_only_root_open_is_ignored() {
        let mut builder = TreeBuilder::new();
        builder.token_emitted(end_tag("p")).unwrap();
        assert_eq!(builder.open.len(), 1);
    }

    #[test]
    fn self_closing_start_tag_is_not_pushed() {
        let mut builder = TreeBuilder::new();
        builder
            .token_emitted(Token::Tag(TagTokenType::StartTag(TagToken {
                tag_name: "custom".to_string(),
                self_closing: true,
                attributes: vec![Attribute {
                    name: "a".to_string(),
                    value: "1".to_string(),
                }],
            })))
            .unwrap();
        assert_eq!(builder.open.len(), 1);
        let document = builder.into_document();
        let root_children: Vec<_> = document.children(document.root()).collect();
        assert!(matches!(
            document.get(root_children[0]),
            Some(NodeData::Element { tag, attrs, self_closing })
                if tag == "custom" && self_closing == &true && attrs == &vec![("a".to_string(), "1".to_string())]
        ));
    }
}
