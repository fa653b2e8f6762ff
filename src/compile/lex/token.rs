use crate::compile::Keyword;
use std::fmt::Display;

/// Types emitted by the Lexer.
///
/// An abstraction over raw text to make construction of Tree types easier.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// Raw text outside of a directive.
    Raw,
    /// Identifier (unquoted string) within a directive.
    Identifier,
    /// Whitespace within a directive.
    Whitespace,
    /// The `$` that begins a directive.
    BeginDirective,
    /// The `$` that ends a directive.
    EndDirective,
    /// .
    Period,
    /// :
    Colon,
    /// The content of a brace-delimited block, such as `{<li>$name$</li>}`.
    ///
    /// The region excludes the braces themselves.
    Block,
    /// A recognized keyword that begins a certain type of directive.
    Keyword(Keyword),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Raw => write!(f, "raw"),
            Token::Identifier => write!(f, "identifier"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::BeginDirective => write!(f, "begin directive ($)"),
            Token::EndDirective => write!(f, "end directive ($)"),
            Token::Period => write!(f, "period (.)"),
            Token::Colon => write!(f, "colon (:)"),
            Token::Block => write!(f, "block"),
            Token::Keyword(keyword) => write!(f, "keyword {keyword}"),
        }
    }
}
