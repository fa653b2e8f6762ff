mod lex;
mod parse;
mod template;

pub use self::{
    parse::{scope::Scope, tree, Parser},
    template::Template,
};

use crate::log::Error;
use std::{fmt::Display, fs, path::Path};

/// The character that delimits a directive.
///
/// Two consecutive markers in literal text collapse to a single
/// literal marker.
pub const MARKER: char = '$';

/// Compile a [`Template`] from the given text.
///
/// Provides a shortcut to quickly compile a `Template` without creating
/// an `Engine`.
///
/// # Errors
///
/// Returns an [`Error`] when the source contains invalid syntax, such as
/// an unclosed `if` block or unbalanced braces.
///
/// # Examples
///
/// ```
/// use stencil::compile;
///
/// let template = compile("hello, $name$!");
/// assert!(template.is_ok())
/// ```
pub fn compile(text: &str) -> Result<Template, Error> {
    Parser::new(text).compile(None)
}

/// Compile a [`Template`] from the file at the given path.
///
/// The name of the `Template` is the file name of the path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, or when compilation
/// fails.
pub fn compile_from_file<P>(path: P) -> Result<Template, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|error| {
        Error::build(format!(
            "unable to read template file `{}`: {error}",
            path.display()
        ))
    })?;
    let name = path.file_name().map(|name| name.to_string_lossy());

    Parser::new(&text).compile(name.as_deref())
}

/// Keywords recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    /// Beginning of an "if" block.
    If,
    /// Marks the beginning of the else branch in an "if" block.
    Else,
    /// Closes an "if" block, always followed by `if`.
    End,
    /// Renders another template by name.
    Include,
    /// Explicitly invokes a callable value with an argument.
    Apply,
    /// Renders a body once for every element of a list.
    Map,
    /// Renders the elements of a list with a separator between them.
    Join,
    /// A localizable literal string.
    Txt,
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::If => write!(f, "if"),
            Keyword::Else => write!(f, "else"),
            Keyword::End => write!(f, "end"),
            Keyword::Include => write!(f, "include"),
            Keyword::Apply => write!(f, "apply"),
            Keyword::Map => write!(f, "map"),
            Keyword::Join => write!(f, "join"),
            Keyword::Txt => write!(f, "txt"),
        }
    }
}
