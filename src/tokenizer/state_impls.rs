//! One handler per tokenizer state. Each mirrors the corresponding state of
//! the WHATWG tokenization algorithm (see the links in each doc comment),
//! simplified per this crate's scope: no script-data/CDATA/PLAINTEXT/rawtext
//! states, and a single doctype-body state that appends everything after
//! the name verbatim instead of separately tracking PUBLIC/SYSTEM
//! identifiers.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::entities;
use super::{Attribute, DoctypeToken, TagToken, Token, TokenizerState};
use crate::chars;
use crate::error::{HtmlParseError, TokenizerError};

use super::Tokenizer;

impl<'a> Tokenizer<'a> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#data-state>
    pub(super) fn data_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::AMPERSAND) => {
                self.return_state = Some(TokenizerState::Data);
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some(&chars::LESS_THAN_SIGN) => {
                self.switch_to(TokenizerState::TagOpen);
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.emit(Token::Character(chars::NULL))?;
            }
            Some(&c) => {
                self.emit(Token::Character(c))?;
            }
            None => {
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state>
    pub(super) fn rcdata_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::AMPERSAND) => {
                self.return_state = Some(TokenizerState::RcData);
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some(&chars::LESS_THAN_SIGN) => {
                self.switch_to(TokenizerState::RcDataLessThanSign);
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.emit(Token::Character(chars::FEED_REPLACEMENT_CHARACTER))?;
            }
            Some(&c) => {
                self.emit(Token::Character(c))?;
            }
            None => {
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state>
    pub(super) fn tag_open_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::EXCLAMATION_MARK) => {
                self.switch_to(TokenizerState::MarkupDeclarationOpen);
            }
            Some(&chars::SOLIDUS) => {
                self.switch_to(TokenizerState::EndTagOpen);
            }
            Some(&c) if c.is_ascii_alphabetic() => {
                self.create_new_tag_token(false);
                self.reconsume_in(TokenizerState::TagName);
            }
            Some(&chars::QUESTION_MARK) => {
                self.handle_error(TokenizerError::UnexpectedQuestionMarkInsteadOfTagName);
                self.comment_data = Some(String::new());
                self.reconsume_in(TokenizerState::BogusComment);
            }
            None => {
                self.handle_error(TokenizerError::EofBeforeTagName);
                self.emit(Token::Character(chars::LESS_THAN_SIGN))?;
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.handle_error(TokenizerError::InvalidFirstCharacterOfTagName);
                self.emit(Token::Character(chars::LESS_THAN_SIGN))?;
                self.reconsume_in(TokenizerState::Data);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state>
    pub(super) fn end_tag_open_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&c) if c.is_ascii_alphabetic() => {
                self.create_new_tag_token(true);
                self.reconsume_in(TokenizerState::TagName);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.handle_error(TokenizerError::MissingEndTagName);
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.handle_error(TokenizerError::EofBeforeTagName);
                self.emit(Token::Character(chars::LESS_THAN_SIGN))?;
                self.emit(Token::Character(chars::SOLIDUS))?;
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.comment_data = Some(String::new());
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state>
    pub(super) fn tag_name_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some(&chars::SOLIDUS) => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_tag_token()?;
            }
            Some(&c) if c.is_ascii_uppercase() => {
                self.current_tag_mut()?
                    .tag_name
                    .push(c.to_ascii_lowercase());
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.current_tag_mut()?
                    .tag_name
                    .push(chars::FEED_REPLACEMENT_CHARACTER);
            }
            Some(&c) => {
                self.current_tag_mut()?.tag_name.push(c);
            }
            None => {
                self.handle_error(TokenizerError::EofInTag);
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state>
    pub(super) fn rcdata_less_than_sign_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::SOLIDUS) => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::RcDataEndTagOpen);
            }
            _ => {
                self.emit(Token::Character(chars::LESS_THAN_SIGN))?;
                self.reconsume_in(TokenizerState::RcData);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state>
    pub(super) fn rcdata_end_tag_open_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&c) if c.is_ascii_alphabetic() => {
                self.create_new_tag_token(true);
                self.reconsume_in(TokenizerState::RcDataEndTagName);
            }
            _ => {
                self.emit(Token::Character(chars::LESS_THAN_SIGN))?;
                self.emit(Token::Character(chars::SOLIDUS))?;
                self.reconsume_in(TokenizerState::RcData);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state>
    ///
    /// The fallthrough case is a resolved design decision (see SPEC_FULL.md
    /// §9): when the buffered name turns out not to be the appropriate
    /// closing tag, discard the half-built tag token and emit `</` plus the
    /// buffered characters as literal text, then reconsume the current
    /// codepoint back in `rcdata`.
    pub(super) fn rcdata_end_tag_name_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&c)
                if matches!(
                    c,
                    chars::CHARACTER_TABULATION
                        | chars::LINE_FEED
                        | chars::FORM_FEED
                        | chars::SPACE
                ) && self.is_appropriate_end_tag_token() =>
            {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some(&chars::SOLIDUS) if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some(&chars::GREATER_THAN_SIGN) if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_tag_token()?;
            }
            Some(&c) if c.is_ascii_uppercase() => {
                self.current_tag_mut()?
                    .tag_name
                    .push(c.to_ascii_lowercase());
                self.temporary_buffer.push(c);
            }
            Some(&c) if c.is_ascii_lowercase() => {
                self.current_tag_mut()?.tag_name.push(c);
                self.temporary_buffer.push(c);
            }
            _ => {
                self.tag_token = None;
                self.emit(Token::Character(chars::LESS_THAN_SIGN))?;
                self.emit(Token::Character(chars::SOLIDUS))?;
                let buffered = std::mem::take(&mut self.temporary_buffer);
                for c in buffered {
                    self.emit(Token::Character(c))?;
                }
                self.reconsume_in(TokenizerState::RcData);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state>
    pub(super) fn before_attribute_name_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {}
            Some(&chars::SOLIDUS) | Some(&chars::GREATER_THAN_SIGN) | None => {
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some(&chars::EQUALS_SIGN) => {
                self.handle_error(TokenizerError::UnexpectedEqualsSignBeforeAttributeName);
                self.begin_attribute();
                self.push_char_to_attribute_name(chars::EQUALS_SIGN)?;
                self.switch_to(TokenizerState::AttributeName);
            }
            Some(_) => {
                self.begin_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state>
    pub(super) fn attribute_name_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE)
            | Some(&chars::SOLIDUS)
            | Some(&chars::GREATER_THAN_SIGN)
            | None => {
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some(&chars::EQUALS_SIGN) => {
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            Some(&c) if c.is_ascii_uppercase() => {
                self.push_char_to_attribute_name(c.to_ascii_lowercase())?;
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.push_char_to_attribute_name(chars::FEED_REPLACEMENT_CHARACTER)?;
            }
            Some(&c)
                if c == chars::QUOTATION_MARK
                    || c == chars::APOSTROPHE
                    || c == chars::LESS_THAN_SIGN =>
            {
                self.handle_error(TokenizerError::UnexpectedCharacterInAttributeName);
                self.push_char_to_attribute_name(c)?;
            }
            Some(&c) => {
                self.push_char_to_attribute_name(c)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state>
    pub(super) fn after_attribute_name_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {}
            Some(&chars::SOLIDUS) => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some(&chars::EQUALS_SIGN) => {
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_tag_token()?;
            }
            None => {
                self.handle_error(TokenizerError::EofInTag);
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.begin_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state>
    pub(super) fn before_attribute_value_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {}
            Some(&chars::QUOTATION_MARK) => {
                self.switch_to(TokenizerState::AttributeValueDoubleQuoted);
            }
            Some(&chars::APOSTROPHE) => {
                self.switch_to(TokenizerState::AttributeValueSingleQuoted);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.handle_error(TokenizerError::MissingAttributeValue);
                self.switch_to(TokenizerState::Data);
                self.emit_current_tag_token()?;
            }
            _ => {
                self.reconsume_in(TokenizerState::AttributeValueUnquoted);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state>
    pub(super) fn attribute_value_double_quoted_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::QUOTATION_MARK) => {
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            Some(&chars::AMPERSAND) => {
                self.return_state = Some(TokenizerState::AttributeValueDoubleQuoted);
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.push_char_to_attribute_value(chars::FEED_REPLACEMENT_CHARACTER)?;
            }
            Some(&c) => {
                self.push_char_to_attribute_value(c)?;
            }
            None => {
                self.handle_error(TokenizerError::EofInTag);
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state>
    pub(super) fn attribute_value_single_quoted_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::APOSTROPHE) => {
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            Some(&chars::AMPERSAND) => {
                self.return_state = Some(TokenizerState::AttributeValueSingleQuoted);
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.push_char_to_attribute_value(chars::FEED_REPLACEMENT_CHARACTER)?;
            }
            Some(&c) => {
                self.push_char_to_attribute_value(c)?;
            }
            None => {
                self.handle_error(TokenizerError::EofInTag);
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state>
    pub(super) fn attribute_value_unquoted_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some(&chars::AMPERSAND) => {
                self.return_state = Some(TokenizerState::AttributeValueUnquoted);
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_tag_token()?;
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.push_char_to_attribute_value(chars::FEED_REPLACEMENT_CHARACTER)?;
            }
            Some(&c)
                if c == chars::QUOTATION_MARK
                    || c == chars::APOSTROPHE
                    || c == chars::LESS_THAN_SIGN
                    || c == chars::EQUALS_SIGN
                    || c == '`' =>
            {
                self.handle_error(TokenizerError::UnexpectedCharacterInUnquotedAttributeValue);
                self.push_char_to_attribute_value(c)?;
            }
            Some(&c) => {
                self.push_char_to_attribute_value(c)?;
            }
            None => {
                self.handle_error(TokenizerError::EofInTag);
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state>
    pub(super) fn after_attribute_value_quoted_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some(&chars::SOLIDUS) => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_tag_token()?;
            }
            None => {
                self.handle_error(TokenizerError::EofInTag);
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.handle_error(TokenizerError::MissingWhitespaceBetweenAttributes);
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state>
    pub(super) fn self_closing_start_tag_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::GREATER_THAN_SIGN) => {
                self.current_tag_mut()?.self_closing = true;
                self.switch_to(TokenizerState::Data);
                self.emit_current_tag_token()?;
            }
            None => {
                self.handle_error(TokenizerError::EofInTag);
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.handle_error(TokenizerError::UnexpectedSolidusInTag);
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state>
    pub(super) fn bogus_comment_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_comment_token()?;
            }
            None => {
                self.emit_current_comment_token()?;
                self.emit(Token::EndOfFile)?;
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.comment_data_mut()?
                    .push(chars::FEED_REPLACEMENT_CHARACTER);
            }
            Some(&c) => {
                self.comment_data_mut()?.push(c);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state>
    pub(super) fn markup_declaration_open_state(&mut self) -> Result<(), HtmlParseError> {
        let next_two = self.input_stream.peek_multiple(2);
        if next_two.len() == 2 && *next_two[0] == chars::HYPHEN_MINUS && *next_two[1] == chars::HYPHEN_MINUS {
            self.input_stream.next_add(2);
            self.comment_data = Some(String::new());
            self.switch_to(TokenizerState::CommentStart);
            return Ok(());
        }

        let next_seven = self.input_stream.peek_multiple(7);
        if next_seven.len() == 7 {
            let candidate: String = next_seven.iter().map(|c| **c).collect();
            if candidate.eq_ignore_ascii_case("DOCTYPE") {
                self.input_stream.next_add(7);
                self.doctype_token = Some(DoctypeToken {
                    name: String::new(),
                    data: None,
                    force_quirks: false,
                });
                self.switch_to(TokenizerState::Doctype);
                return Ok(());
            }
            if candidate == "[CDATA[" {
                self.input_stream.next_add(7);
                self.comment_data = Some("[CDATA[".to_string());
                self.switch_to(TokenizerState::BogusComment);
                return Ok(());
            }
        }

        self.comment_data = Some(String::new());
        self.switch_to(TokenizerState::BogusComment);
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state>
    pub(super) fn comment_start_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::HYPHEN_MINUS) => {
                self.switch_to(TokenizerState::CommentStartDash);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.handle_error(TokenizerError::AbruptClosingOfEmptyComment);
                self.switch_to(TokenizerState::Data);
                self.emit_current_comment_token()?;
            }
            _ => {
                self.reconsume_in(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state>
    ///
    /// The `>` branch resolves SPEC_FULL.md §9's open question: emit the
    /// current (empty-so-far) comment and return to `data`.
    pub(super) fn comment_start_dash_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::HYPHEN_MINUS) => {
                self.switch_to(TokenizerState::CommentEnd);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_comment_token()?;
            }
            None => {
                self.handle_error(TokenizerError::EofInComment);
                self.emit_current_comment_token()?;
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.comment_data_mut()?.push(chars::HYPHEN_MINUS);
                self.reconsume_in(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-state>
    pub(super) fn comment_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::LESS_THAN_SIGN) => {
                self.comment_data_mut()?.push(chars::LESS_THAN_SIGN);
                self.switch_to(TokenizerState::CommentLessThanSign);
            }
            Some(&chars::HYPHEN_MINUS) => {
                self.switch_to(TokenizerState::CommentEndDash);
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.comment_data_mut()?
                    .push(chars::FEED_REPLACEMENT_CHARACTER);
            }
            Some(&c) => {
                self.comment_data_mut()?.push(c);
            }
            None => {
                self.handle_error(TokenizerError::EofInComment);
                self.emit_current_comment_token()?;
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state>
    pub(super) fn comment_less_than_sign_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::EXCLAMATION_MARK) => {
                self.comment_data_mut()?.push(chars::EXCLAMATION_MARK);
                self.switch_to(TokenizerState::CommentLessThanSignBang);
            }
            Some(&chars::LESS_THAN_SIGN) => {
                self.comment_data_mut()?.push(chars::LESS_THAN_SIGN);
            }
            _ => {
                self.reconsume_in(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state>
    pub(super) fn comment_less_than_sign_bang_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::HYPHEN_MINUS) => {
                self.switch_to(TokenizerState::CommentLessThanSignBangDash);
            }
            _ => {
                self.reconsume_in(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state>
    pub(super) fn comment_less_than_sign_bang_dash_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::HYPHEN_MINUS) => {
                self.switch_to(TokenizerState::CommentLessThanSignBangDashDash);
            }
            _ => {
                self.reconsume_in(TokenizerState::CommentEndDash);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state>
    pub(super) fn comment_less_than_sign_bang_dash_dash_state(
        &mut self,
    ) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::GREATER_THAN_SIGN) => {
                self.reconsume_in(TokenizerState::CommentEnd);
            }
            _ => {
                self.handle_error(TokenizerError::NestedComment);
                self.reconsume_in(TokenizerState::CommentEnd);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state>
    pub(super) fn comment_end_dash_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::HYPHEN_MINUS) => {
                self.switch_to(TokenizerState::CommentEnd);
            }
            None => {
                self.handle_error(TokenizerError::EofInComment);
                self.emit_current_comment_token()?;
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.comment_data_mut()?.push(chars::HYPHEN_MINUS);
                self.reconsume_in(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state>
    pub(super) fn comment_end_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_comment_token()?;
            }
            Some(&chars::EXCLAMATION_MARK) => {
                self.switch_to(TokenizerState::CommentEndBang);
            }
            Some(&chars::HYPHEN_MINUS) => {
                self.comment_data_mut()?.push(chars::HYPHEN_MINUS);
            }
            None => {
                self.handle_error(TokenizerError::EofInComment);
                self.emit_current_comment_token()?;
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.comment_data_mut()?.push_str("--");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state>
    pub(super) fn comment_end_bang_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::HYPHEN_MINUS) => {
                self.comment_data_mut()?.push_str("--!");
                self.switch_to(TokenizerState::CommentEndDash);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.handle_error(TokenizerError::IncorrectlyClosedComment);
                self.switch_to(TokenizerState::Data);
                self.emit_current_comment_token()?;
            }
            None => {
                self.handle_error(TokenizerError::EofInComment);
                self.emit_current_comment_token()?;
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.comment_data_mut()?.push_str("--!");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-state>
    pub(super) fn doctype_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {
                self.switch_to(TokenizerState::BeforeDoctypeName);
            }
            None => {
                self.handle_error(TokenizerError::EofInDoctype);
                self.doctype_token_mut()?.force_quirks = true;
                self.emit_current_doctype_token()?;
                self.emit(Token::EndOfFile)?;
            }
            Some(_) => {
                self.handle_error(TokenizerError::MissingWhitespaceBeforeDoctypeName);
                self.reconsume_in(TokenizerState::BeforeDoctypeName);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state>
    pub(super) fn before_doctype_name_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {}
            Some(&c) if c.is_ascii_uppercase() => {
                self.doctype_token_mut()?.name.push(c.to_ascii_lowercase());
                self.switch_to(TokenizerState::DoctypeName);
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.doctype_token_mut()?
                    .name
                    .push(chars::FEED_REPLACEMENT_CHARACTER);
                self.switch_to(TokenizerState::DoctypeName);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.handle_error(TokenizerError::MissingDoctypeName);
                self.doctype_token_mut()?.force_quirks = true;
                self.switch_to(TokenizerState::Data);
                self.emit_current_doctype_token()?;
            }
            None => {
                self.handle_error(TokenizerError::EofInDoctype);
                self.doctype_token_mut()?.force_quirks = true;
                self.emit_current_doctype_token()?;
                self.emit(Token::EndOfFile)?;
            }
            Some(&c) => {
                self.doctype_token_mut()?.name.push(c);
                self.switch_to(TokenizerState::DoctypeName);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state>
    pub(super) fn doctype_name_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::CHARACTER_TABULATION)
            | Some(&chars::LINE_FEED)
            | Some(&chars::FORM_FEED)
            | Some(&chars::SPACE) => {
                self.switch_to(TokenizerState::AfterDoctypeName);
            }
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_doctype_token()?;
            }
            Some(&c) if c.is_ascii_uppercase() => {
                self.doctype_token_mut()?.name.push(c.to_ascii_lowercase());
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.doctype_token_mut()?
                    .name
                    .push(chars::FEED_REPLACEMENT_CHARACTER);
            }
            Some(&c) => {
                self.doctype_token_mut()?.name.push(c);
            }
            None => {
                self.handle_error(TokenizerError::EofInDoctype);
                self.doctype_token_mut()?.force_quirks = true;
                self.emit_current_doctype_token()?;
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// Everything after the doctype name, up to `>` or EOF, folded into one
    /// state that appends verbatim to the token's `data` field, a
    /// deliberate simplification of the WHATWG PUBLIC/SYSTEM identifier
    /// sub-states (see SPEC_FULL.md §4.2).
    pub(super) fn after_doctype_name_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&chars::GREATER_THAN_SIGN) => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_doctype_token()?;
            }
            Some(&chars::NULL) => {
                self.handle_error(TokenizerError::UnexpectedNullCharacter);
                self.doctype_append_data(chars::FEED_REPLACEMENT_CHARACTER)?;
            }
            Some(&c) => {
                self.doctype_append_data(c)?;
            }
            None => {
                self.handle_error(TokenizerError::EofInDoctype);
                self.doctype_token_mut()?.force_quirks = true;
                self.emit_current_doctype_token()?;
                self.emit(Token::EndOfFile)?;
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state>
    pub(super) fn character_reference_state(&mut self) -> Result<(), HtmlParseError> {
        self.temporary_buffer.clear();
        self.temporary_buffer.push(chars::AMPERSAND);
        match self.input_stream.next() {
            Some(&c) if c.is_ascii_alphanumeric() => {
                self.named_ref_node = entities::root();
                self.named_ref_last_match = None;
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            Some(&chars::NUMBER_SIGN) => {
                self.temporary_buffer.push(chars::NUMBER_SIGN);
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            _ => {
                self.flush_code_points_consumed_as_character_reference()?;
                let return_state = self.current_return_state()?;
                self.reconsume_in(return_state);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state>
    ///
    /// Walks the entity trie one edge at a time instead of rescanning the
    /// whole table on every character (see SPEC_FULL.md §4.1).
    pub(super) fn named_character_reference_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next().copied() {
            Some(c) => {
                if let Some(next) = self.named_ref_node.children.get(&c) {
                    self.named_ref_node = next;
                    self.temporary_buffer.push(c);
                    if let Some(replacement) = next.replacement {
                        self.named_ref_last_match = Some((replacement, self.temporary_buffer.len()));
                    }
                } else {
                    self.resolve_named_character_reference()?;
                }
            }
            None => {
                self.resolve_named_character_reference()?;
            }
        }
        Ok(())
    }

    /// Settles the longest-match-with-backtrack walk: emits the most
    /// recently recorded terminal (if any survives the StartTag/attribute
    /// special case), carries any characters consumed past it forward as
    /// literal text, and returns to `return_state`.
    fn resolve_named_character_reference(&mut self) -> Result<(), HtmlParseError> {
        let Some((replacement, matched_len)) = self.named_ref_last_match.take() else {
            self.handle_error(TokenizerError::UnknownNamedCharacterReference);
            self.flush_code_points_consumed_as_character_reference()?;
            let return_state = self.current_return_state()?;
            self.reconsume_in(return_state);
            return Ok(());
        };

        let ends_with_semicolon = self.temporary_buffer.get(matched_len - 1) == Some(&chars::SEMICOLON);
        let next_char_disqualifies = self
            .input_stream
            .current()
            .is_some_and(|c| *c == chars::EQUALS_SIGN || c.is_ascii_alphanumeric());
        let suppress = !ends_with_semicolon
            && !self.tag_is_end
            && self.tag_token.is_some()
            && self.charref_in_attribute()?
            && next_char_disqualifies;

        if suppress {
            self.handle_error(TokenizerError::UnknownNamedCharacterReference);
            self.flush_code_points_consumed_as_character_reference()?;
            let return_state = self.current_return_state()?;
            self.reconsume_in(return_state);
            return Ok(());
        }

        let leftover: Vec<char> = self.temporary_buffer[matched_len..].to_vec();
        self.add_entity_str(replacement)?;
        for c in leftover {
            self.emit_literal_char(c)?;
        }
        let return_state = self.current_return_state()?;
        self.reconsume_in(return_state);
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state>
    pub(super) fn numeric_character_reference_state(&mut self) -> Result<(), HtmlParseError> {
        self.character_reference_code = 0;
        match self.input_stream.next() {
            Some(&c) if c == chars::LATIN_SMALL_LETTER_X || c == chars::LATIN_CAPITAL_LETTER_X => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            _ => {
                self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state>
    pub(super) fn hexadecimal_character_reference_start_state(
        &mut self,
    ) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&c) if c.is_ascii_hexdigit() => {
                self.reconsume_in(TokenizerState::HexadecimalCharacterReference);
            }
            _ => {
                self.handle_error(TokenizerError::AbsenceOfDigitsInNumericCharacterReference);
                self.flush_code_points_consumed_as_character_reference()?;
                let return_state = self.current_return_state()?;
                self.reconsume_in(return_state);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state>
    pub(super) fn decimal_character_reference_start_state(
        &mut self,
    ) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&c) if c.is_ascii_digit() => {
                self.reconsume_in(TokenizerState::DecimalCharacterReference);
            }
            _ => {
                self.handle_error(TokenizerError::AbsenceOfDigitsInNumericCharacterReference);
                self.flush_code_points_consumed_as_character_reference()?;
                let return_state = self.current_return_state()?;
                self.reconsume_in(return_state);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state>
    pub(super) fn hexadecimal_character_reference_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&c) if c.is_ascii_hexdigit() => {
                let digit = c.to_digit(16).expect("checked is_ascii_hexdigit");
                self.character_reference_code =
                    self.character_reference_code.wrapping_mul(16).wrapping_add(digit);
            }
            Some(&chars::SEMICOLON) => {
                self.switch_to(TokenizerState::NumericCharacterReferenceEnd);
            }
            _ => {
                self.handle_error(TokenizerError::MissingSemicolonAfterCharacterReference);
                self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state>
    pub(super) fn decimal_character_reference_state(&mut self) -> Result<(), HtmlParseError> {
        match self.input_stream.next() {
            Some(&c) if c.is_ascii_digit() => {
                let digit = c.to_digit(10).expect("checked is_ascii_digit");
                self.character_reference_code =
                    self.character_reference_code.wrapping_mul(10).wrapping_add(digit);
            }
            Some(&chars::SEMICOLON) => {
                self.switch_to(TokenizerState::NumericCharacterReferenceEnd);
            }
            _ => {
                self.handle_error(TokenizerError::MissingSemicolonAfterCharacterReference);
                self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
            }
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state>
    ///
    /// Never consumes input itself (whatever codepoint ended the numeric
    /// literal, or the lack of one at EOF, is left for `return_state` to
    /// see), so this transitions via `switch_to`, not `reconsume_in`.
    pub(super) fn numeric_character_reference_end_state(&mut self) -> Result<(), HtmlParseError> {
        if self.character_reference_code == 0x00 {
            self.handle_error(TokenizerError::NullCharacterReference);
            self.character_reference_code = 0xFFFD;
        } else if self.character_reference_code > 0x10FFFF {
            self.handle_error(TokenizerError::CharacterReferenceOutsideUnicodeRange);
            self.character_reference_code = 0xFFFD;
        } else if is_surrogate(self.character_reference_code) {
            self.handle_error(TokenizerError::SurrogateCharacterReference);
            self.character_reference_code = 0xFFFD;
        } else if is_noncharacter(self.character_reference_code) {
            self.handle_error(TokenizerError::NoncharacterCharacterReference);
        } else if self.character_reference_code == 0x0D
            || (is_control(self.character_reference_code)
                && !is_ascii_whitespace(self.character_reference_code))
        {
            self.handle_error(TokenizerError::ControlCharacterReference);
            if let Some(replacement) = NUMERIC_CHARACTER_REF_END_TABLE.get(&self.character_reference_code) {
                self.character_reference_code = *replacement;
            }
        }

        let resolved = char::from_u32(self.character_reference_code)
            .unwrap_or(chars::FEED_REPLACEMENT_CHARACTER);
        self.temporary_buffer.clear();
        self.add_entity_str(&resolved.to_string())?;
        let return_state = self.current_return_state()?;
        self.switch_to(return_state);
        Ok(())
    }
}

/// <https://infra.spec.whatwg.org/#surrogate>
fn is_surrogate(code_point: u32) -> bool {
    is_leading_surrogate(code_point) || is_trailing_surrogate(code_point)
}

/// <https://infra.spec.whatwg.org/#leading-surrogate>
fn is_leading_surrogate(code_point: u32) -> bool {
    (0xD800..=0xDBFF).contains(&code_point)
}

/// <https://infra.spec.whatwg.org/#trailing-surrogate>
fn is_trailing_surrogate(code_point: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&code_point)
}

/// <https://infra.spec.whatwg.org/#noncharacter>
fn is_noncharacter(code_point: u32) -> bool {
    (0xFDD0..=0xFDEF).contains(&code_point)
        || [
            0xFFFE, 0xFFFF, 0x1FFFE, 0x1FFFF, 0x2FFFE, 0x2FFFF, 0x3FFFE, 0x3FFFF, 0x4FFFE, 0x4FFFF,
            0x5FFFE, 0x5FFFF, 0x6FFFE, 0x6FFFF, 0x7FFFE, 0x7FFFF, 0x8FFFE, 0x8FFFF, 0x9FFFE,
            0x9FFFF, 0xAFFFE, 0xAFFFF, 0xBFFFE, 0xBFFFF, 0xCFFFE, 0xCFFFF, 0xDFFFE, 0xDFFFF,
            0xEFFFE, 0xEFFFF, 0xFFFFE, 0xFFFFF, 0x10FFFE, 0x10FFFF,
        ]
        .contains(&code_point)
}

/// <https://infra.spec.whatwg.org/#control>
fn is_control(code_point: u32) -> bool {
    is_c0_control(code_point) || (0x007F..=0x009F).contains(&code_point)
}

/// <https://infra.spec.whatwg.org/#c0-control>
fn is_c0_control(code_point: u32) -> bool {
    code_point <= 0x001F
}

/// <https://infra.spec.whatwg.org/#ascii-whitespace>
fn is_ascii_whitespace(code_point: u32) -> bool {
    matches!(code_point, 0x0009 | 0x000A | 0x000C | 0x000D | 0x0020)
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state>
static NUMERIC_CHARACTER_REF_END_TABLE: Lazy<HashMap<u32, u32>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert(0x80, 0x20AC);
    table.insert(0x82, 0x201A);
    table.insert(0x83, 0x0192);
    table.insert(0x84, 0x201E);
    table.insert(0x85, 0x2026);
    table.insert(0x86, 0x2020);
    table.insert(0x87, 0x2021);
    table.insert(0x88, 0x02C6);
    table.insert(0x89, 0x2030);
    table.insert(0x8A, 0x0160);
    table.insert(0x8B, 0x2039);
    table.insert(0x8C, 0x0152);
    table.insert(0x8E, 0x017D);
    table.insert(0x91, 0x2018);
    table.insert(0x92, 0x2019);
    table.insert(0x93, 0x201C);
    table.insert(0x94, 0x201D);
    table.insert(0x95, 0x2022);
    table.insert(0x96, 0x2013);
    table.insert(0x97, 0x2014);
    table.insert(0x98, 0x02DC);
    table.insert(0x99, 0x2122);
    table.insert(0x9A, 0x0161);
    table.insert(0x9B, 0x203A);
    table.insert(0x9C, 0x0153);
    table.insert(0x9E, 0x017E);
    table.insert(0x9F, 0x0178);
    table
});
