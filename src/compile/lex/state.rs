/// Describes the internal state of a [`Lexer`][`super::Lexer`].
#[derive(Debug, PartialEq)]
pub enum CursorState {
    /// Indicates the [`Lexer`][`super::Lexer`] is reading literal text
    /// outside of a directive.
    Default,
    /// Indicates the [`Lexer`][`super::Lexer`] is inside of a directive.
    Inside,
}
