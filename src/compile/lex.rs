pub mod token;

mod state;

use self::{state::CursorState, token::Token};
use crate::{
    compile::{Keyword, MARKER},
    log::{Error, INVALID_SYNTAX, UNEXPECTED_TOKEN},
    region::Region,
};

pub type LexResult = Result<Option<(Token, Region)>, Error>;

/// Provides methods to read a source string as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    pub cursor: usize,
    /// Exclusive upper bound of the scan.
    ///
    /// Equal to the source length for a top-level scan, and to the end of
    /// the enclosing block for a nested scan.
    bound: usize,
    /// Tracks the [`Lexer`] state and determines the action taken
    /// when `.next` is called.
    state: CursorState,
    /// Temporary storage for a [`Token`] that will be read
    /// on the following call to `.next`.
    buffer: Option<(Token, Region)>,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] over the given source.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self::bounded(source, (0..source.len()).into())
    }

    /// Create a new [`Lexer`] over the given region of the source.
    ///
    /// Used to re-enter the lexer on the content of an inline block, which
    /// keeps all regions absolute within the original source text.
    #[inline]
    pub fn bounded(source: &'source str, region: Region) -> Self {
        Self {
            source,
            cursor: region.begin,
            bound: region.end,
            state: CursorState::Default,
            buffer: None,
        }
    }

    /// Return the next [`Token`] and [`Region`].
    ///
    /// Any instance of [`Token::Whitespace`] is ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    pub fn next(&mut self) -> LexResult {
        loop {
            // Always prefer taking from the buffer when possible.
            if let Some(next) = self.buffer.take() {
                return Ok(Some(next));
            }
            if self.cursor >= self.bound {
                return Ok(None);
            }

            let c = self.cursor;
            let result = match self.state {
                CursorState::Default => self.lex_default(c),
                CursorState::Inside => self.lex_tag(c),
            }?;

            return match result {
                Some((Token::Whitespace, _)) => continue,
                Some((token, region)) => Ok(Some((token, region))),
                None => Ok(None),
            };
        }
    }

    /// Return the next [`Token`] and [`Region`] in [`CursorState::Default`]
    /// configuration.
    ///
    /// Assumes the cursor is outside of a directive.
    fn lex_default(&mut self, from: usize) -> LexResult {
        match self.source[from..self.bound].find(MARKER) {
            None => {
                self.cursor = self.bound;

                Ok(Some((Token::Raw, (from..self.bound).into())))
            }
            Some(offset) => {
                let at = from + offset;

                // A doubled marker collapses to one literal marker. The raw
                // region keeps the first of the pair.
                if self.source[at + 1..self.bound].starts_with(MARKER) {
                    self.cursor = at + 2;

                    return Ok(Some((Token::Raw, (from..at + 1).into())));
                }

                self.state = CursorState::Inside;
                self.cursor = at + 1;

                if from == at {
                    Ok(Some((Token::BeginDirective, (at..at + 1).into())))
                } else {
                    self.buffer = Some((Token::BeginDirective, (at..at + 1).into()));

                    Ok(Some((Token::Raw, (from..at).into())))
                }
            }
        }
    }

    /// Return the next [`Token`] and [`Region`] in [`CursorState::Inside`]
    /// configuration.
    ///
    /// Assumes the cursor is inside of a directive.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character is found.
    fn lex_tag(&mut self, from: usize) -> LexResult {
        let mut iterator = self.source[from..self.bound]
            .char_indices()
            .map(|(d, c)| (from + d, c));
        let (index, char) = iterator.next().unwrap();

        let mut advance = |length: usize, data: Token| {
            self.cursor = index + length;

            Ok(Some((data, (index..index + length).into())))
        };

        match char {
            MARKER => {
                self.state = CursorState::Default;
                self.cursor = index + 1;

                Ok(Some((Token::EndDirective, (index..index + 1).into())))
            }
            '.' => advance(1, Token::Period),
            ':' => advance(1, Token::Colon),
            '{' => self.lex_block(index),
            c if c.is_whitespace() => Ok(Some(self.lex_whitespace(iterator, index))),
            c if is_ident_start(c) => Ok(Some(self.lex_ident_or_keyword(iterator, index))),
            _ => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.source, index..index + char.len_utf8())
                .with_help(
                    "expected one of `.`, `:`, an identifier, a `{` block, \
                    or a closing `$`",
                )),
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Block`].
    ///
    /// Scans for the `}` that balances the `{` at `from`, counting nested
    /// braces on the way. The returned region excludes the braces.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the braces are unbalanced.
    fn lex_block(&mut self, from: usize) -> LexResult {
        let mut depth = 0usize;

        for (index, char) in self.source[from..self.bound]
            .char_indices()
            .map(|(d, c)| (from + d, c))
        {
            match char {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.cursor = index + 1;

                        return Ok(Some((Token::Block, (from + 1..index).into())));
                    }
                }
                _ => {}
            }
        }

        Err(Error::build(INVALID_SYNTAX)
            .with_pointer(self.source, from..from + 1)
            .with_help("unbalanced braces, expected a closing `}`"))
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Whitespace`].
    fn lex_whitespace<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !char.is_whitespace() => {
                    self.cursor = index;

                    break (Token::Whitespace, (from..index).into());
                }
                Some((_, _)) => continue,
                None => {
                    self.cursor = self.bound;

                    break (Token::Whitespace, (from..self.bound).into());
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] from the given iterator.
    ///
    /// The `Token` will be [`Token::Identifier`] or [`Token::Keyword`].
    fn lex_ident_or_keyword<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        let mut check_keyword = |to: usize| {
            let range_text = self
                .source
                .get(from..to)
                .expect("valid range is required to check keyword");

            let token = match range_text {
                "if" => Token::Keyword(Keyword::If),
                "else" => Token::Keyword(Keyword::Else),
                "end" => Token::Keyword(Keyword::End),
                "include" => Token::Keyword(Keyword::Include),
                "apply" => Token::Keyword(Keyword::Apply),
                "map" => Token::Keyword(Keyword::Map),
                "join" => Token::Keyword(Keyword::Join),
                "txt" => Token::Keyword(Keyword::Txt),
                _ => Token::Identifier,
            };
            self.cursor = to;

            (token, (from..to).into())
        };

        loop {
            match iter.next() {
                Some((index, char)) if !is_ident_continue(char) => {
                    break check_keyword(index);
                }
                Some((_, _)) => continue,
                None => break check_keyword(self.bound),
            }
        }
    }
}

/// Return true if the given character is a recognized beginning identifier,
/// meaning '_' or an `xid_start`.
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character is a recognized continue identifier,
/// meaning an `xid_continue`.
fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token};
    use crate::{compile::Keyword, region::Region};

    #[test]
    fn test_lex_default_no_match() {
        let expect = vec![(Token::Raw, 0..11)];

        helper_lex_next_auto("lorem ipsum", expect)
    }

    #[test]
    fn test_lex_default_match() {
        let expect = vec![
            (Token::Raw, 0..12),
            (Token::BeginDirective, 12..13),
            (Token::Identifier, 13..18),
            (Token::EndDirective, 18..19),
        ];

        helper_lex_next_auto("lorem ipsum $dolor$", expect);
    }

    #[test]
    fn test_lex_escaped_marker() {
        // `$$` collapses to one literal `$`, split across two raw tokens.
        let expect = vec![(Token::Raw, 0..6), (Token::Raw, 7..11)];

        helper_lex_next_auto("five $$ six", expect);
    }

    #[test]
    fn test_lex_path() {
        let expect = vec![
            (Token::BeginDirective, 0..1),
            (Token::Identifier, 1..4),
            (Token::Period, 4..5),
            (Token::Identifier, 5..8),
            (Token::EndDirective, 8..9),
        ];

        helper_lex_next_auto("$foo.bar$", expect);
    }

    #[test]
    fn test_lex_keyword() {
        let expect = vec![
            (Token::BeginDirective, 0..1),
            (Token::Keyword(Keyword::If), 1..3),
            (Token::Identifier, 4..9),
            (Token::EndDirective, 9..10),
        ];

        helper_lex_next_auto("$if title$", expect);
    }

    #[test]
    fn test_lex_end_if() {
        let expect = vec![
            (Token::BeginDirective, 0..1),
            (Token::Keyword(Keyword::End), 1..4),
            (Token::Keyword(Keyword::If), 5..7),
            (Token::EndDirective, 7..8),
        ];

        helper_lex_next_auto("$end if$", expect);
    }

    #[test]
    fn test_lex_block() {
        let expect = vec![
            (Token::BeginDirective, 0..1),
            (Token::Keyword(Keyword::Join), 1..5),
            (Token::Colon, 5..6),
            (Token::Block, 7..8),
            (Token::Identifier, 10..17),
            (Token::EndDirective, 17..18),
        ];

        helper_lex_next_auto("$join:{,} columns$", expect);
    }

    #[test]
    fn test_lex_block_nested_braces() {
        let expect = vec![
            (Token::BeginDirective, 0..1),
            (Token::Keyword(Keyword::Txt), 1..4),
            (Token::Colon, 4..5),
            (Token::Block, 6..13),
            (Token::EndDirective, 14..15),
        ];

        helper_lex_next_auto("$txt:{a {b} c}$", expect);
    }

    #[test]
    fn test_lex_block_with_directives() {
        let source = "$map:{<li>$username$</li>} names$";
        let expect = vec![
            (Token::BeginDirective, 0..1),
            (Token::Keyword(Keyword::Map), 1..4),
            (Token::Colon, 4..5),
            (Token::Block, 6..25),
            (Token::Identifier, 27..32),
            (Token::EndDirective, 32..33),
        ];

        helper_lex_next_auto(source, expect);
        assert_eq!(&source[6..25], "<li>$username$</li>");
    }

    #[test]
    fn test_lex_bounded() {
        let source = "$map:{<li>$username$</li>} names$";
        let mut lexer = Lexer::bounded(source, (6..25).into());

        assert_eq!(lexer.next(), Ok(Some((Token::Raw, (6..10).into()))));
        assert_eq!(
            lexer.next(),
            Ok(Some((Token::BeginDirective, (10..11).into())))
        );
        assert_eq!(lexer.next(), Ok(Some((Token::Identifier, (11..19).into()))));
        assert_eq!(
            lexer.next(),
            Ok(Some((Token::EndDirective, (19..20).into())))
        );
        assert_eq!(lexer.next(), Ok(Some((Token::Raw, (20..25).into()))));
        assert_eq!(lexer.next(), Ok(None));
    }

    #[test]
    fn test_lex_error_unbalanced_block() {
        let mut lexer = Lexer::new("$txt:{hello$");
        lexer.next().unwrap();
        lexer.next().unwrap();
        lexer.next().unwrap();

        assert!(lexer.next().is_err());
    }

    #[test]
    fn test_lex_error_unexpected_character() {
        let mut lexer = Lexer::new("$na#me$");
        lexer.next().unwrap();
        lexer.next().unwrap();

        assert!(lexer.next().is_err());
    }

    /// Helper function which takes in a source string, creates a lexer on that
    /// string and iterates [expect.len()] amount of times and compares the result
    /// against [lexer.next()].
    fn helper_lex_next_auto<T>(source: &str, expect: Vec<(Token, T)>)
    where
        T: Into<Region>,
    {
        let mut lexer = Lexer::new(source);
        for (token, region) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, region.into()))))
        }

        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
    }
}
