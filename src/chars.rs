//! Named codepoint constants used throughout the tokenizer, so state handlers
//! read like the prose of the tokenization algorithm instead of a wall of
//! char literals.

pub(crate) const NULL: char = '\u{0000}';
pub(crate) const CHARACTER_TABULATION: char = '\u{0009}';
pub(crate) const LINE_FEED: char = '\u{000A}';
pub(crate) const FORM_FEED: char = '\u{000C}';
pub(crate) const SPACE: char = '\u{0020}';
pub(crate) const EXCLAMATION_MARK: char = '!';
pub(crate) const QUOTATION_MARK: char = '"';
pub(crate) const NUMBER_SIGN: char = '#';
pub(crate) const AMPERSAND: char = '&';
pub(crate) const APOSTROPHE: char = '\'';
pub(crate) const HYPHEN_MINUS: char = '-';
pub(crate) const SOLIDUS: char = '/';
pub(crate) const SEMICOLON: char = ';';
pub(crate) const LESS_THAN_SIGN: char = '<';
pub(crate) const EQUALS_SIGN: char = '=';
pub(crate) const GREATER_THAN_SIGN: char = '>';
pub(crate) const QUESTION_MARK: char = '?';
pub(crate) const LATIN_CAPITAL_LETTER_X: char = 'X';
pub(crate) const LATIN_SMALL_LETTER_X: char = 'x';
pub(crate) const FEED_REPLACEMENT_CHARACTER: char = '\u{FFFD}';
