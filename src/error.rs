use thiserror::Error;

/// An internal invariant violation in the tokenizer or tree builder's own
/// bookkeeping (e.g. an attribute state running with no tag token under
/// construction). This is never produced by malformed *input*: malformed
/// HTML is absorbed per the tokenizer's recovery rules and never reaches
/// this type. A caller of [`crate::parse`] never observes it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HtmlParseError {
    pub message: String,
}

impl HtmlParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        HtmlParseError {
            message: message.into(),
        }
    }
}

/// The catalog of WHATWG-named recoverable parse errors this tokenizer
/// recognizes. None of these abort tokenization; the tokenizer logs each one
/// at a severity matching how surprising it is and otherwise ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum TokenizerError {
    #[error("unexpected null character")]
    UnexpectedNullCharacter,
    #[error("unexpected question mark instead of tag name")]
    UnexpectedQuestionMarkInsteadOfTagName,
    #[error("eof before tag name")]
    EofBeforeTagName,
    #[error("invalid first character of tag name")]
    InvalidFirstCharacterOfTagName,
    #[error("missing end tag name")]
    MissingEndTagName,
    #[error("eof in tag")]
    EofInTag,
    #[error("unexpected equals sign before attribute name")]
    UnexpectedEqualsSignBeforeAttributeName,
    #[error("unexpected character in attribute name")]
    UnexpectedCharacterInAttributeName,
    #[error("missing attribute value")]
    MissingAttributeValue,
    #[error("unexpected character in unquoted attribute value")]
    UnexpectedCharacterInUnquotedAttributeValue,
    #[error("missing whitespace between attributes")]
    MissingWhitespaceBetweenAttributes,
    #[error("unexpected solidus in tag")]
    UnexpectedSolidusInTag,
    #[error("eof in comment")]
    EofInComment,
    #[error("incorrectly closed comment")]
    IncorrectlyClosedComment,
    #[error("nested comment")]
    NestedComment,
    #[error("abrupt closing of empty comment")]
    AbruptClosingOfEmptyComment,
    #[error("eof in doctype")]
    EofInDoctype,
    #[error("missing whitespace before doctype name")]
    MissingWhitespaceBeforeDoctypeName,
    #[error("missing doctype name")]
    MissingDoctypeName,
    #[error("absence of digits in numeric character reference")]
    AbsenceOfDigitsInNumericCharacterReference,
    #[error("missing semicolon after character reference")]
    MissingSemicolonAfterCharacterReference,
    #[error("null character reference")]
    NullCharacterReference,
    #[error("character reference outside unicode range")]
    CharacterReferenceOutsideUnicodeRange,
    #[error("surrogate character reference")]
    SurrogateCharacterReference,
    #[error("noncharacter character reference")]
    NoncharacterCharacterReference,
    #[error("control character reference")]
    ControlCharacterReference,
    #[error("unknown named character reference")]
    UnknownNamedCharacterReference,
}
