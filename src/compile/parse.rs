//! Stencil parser.
//!
//! Utilizes a Lexer to receive instances of Region, which it uses to construct
//! a new Template containing the Abstract Syntax Tree.
//!
//! This template can be combined with some Store data to produce output.
pub mod scope;
pub mod tree;

use self::{
    scope::Scope,
    tree::{Apply, Identifier, IfElse, Include, Join, Key, Map, MapBody, Tree, Txt, Variable},
};
use crate::{
    compile::{
        lex::{token::Token, LexResult, Lexer},
        template::Template,
        Keyword,
    },
    log::{error_eof, Error, INVALID_SYNTAX, UNEXPECTED_BLOCK, UNEXPECTED_TOKEN},
    region::Region,
};

type LexResultMust = Result<(Token, Region), Error>;

/// A directive that terminates the enclosing scope instead of producing
/// a [`Tree`].
#[derive(Debug, PartialEq, Clone, Copy)]
enum Terminator {
    /// `$else$`
    Else,
    /// `$end if$`
    EndIf,
}

/// The result of parsing one directive.
enum Parsed {
    Tree(Tree),
    Terminator(Terminator, Region),
}

pub struct Parser<'source> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source>,
    /// Store peeked tokens.
    ///
    /// Double option is used to remember when the next token is None.
    buffer: Option<Option<(Token, Region)>>,
}

impl<'source> Parser<'source> {
    /// Create a new Parser from the given string.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            buffer: None,
        }
    }

    /// Create a new Parser over the given region of the source.
    ///
    /// Used to compile the inline body of a `map` directive with all
    /// regions staying absolute within the original source.
    #[inline]
    fn in_region(source: &'source str, region: Region) -> Self {
        Self {
            lexer: Lexer::bounded(source, region),
            buffer: None,
        }
    }

    /// Compile the template.
    ///
    /// Returns a new Template, which can be rendered with some Store
    /// data to receive output.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source contains invalid syntax.
    /// A partial template is never produced.
    pub fn compile(mut self, name: Option<&str>) -> Result<Template, Error> {
        let (scope, terminator) = self.parse_scope()?;
        if let Some((terminator, region)) = terminator {
            return Err(error_orphan(self.lexer.source, terminator, region));
        }

        Ok(Template {
            name: name.map(str::to_owned),
            scope,
            source: self.lexer.source.to_owned(),
        })
    }

    /// Parse a Scope.
    ///
    /// Collects trees until the source (or enclosing block) is exhausted,
    /// or until a terminating directive such as `$else$` is found, which is
    /// returned alongside the Scope.
    fn parse_scope(&mut self) -> Result<(Scope, Option<(Terminator, Region)>), Error> {
        let mut scope = Scope::new();

        while let Some((token, region)) = self.next()? {
            match token {
                Token::Raw => scope.data.push(Tree::Raw(region)),
                Token::BeginDirective => match self.parse_directive()? {
                    Parsed::Tree(tree) => scope.data.push(tree),
                    Parsed::Terminator(terminator, region) => {
                        return Ok((scope, Some((terminator, region))))
                    }
                },
                _ => {
                    return Err(Error::build(UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help("expected raw text or the beginning of a directive"))
                }
            }
        }

        Ok((scope, None))
    }

    /// Parse a directive.
    ///
    /// Assumes the [`Token::BeginDirective`] marker is already consumed.
    /// The first token inside the directive selects the tree kind.
    fn parse_directive(&mut self) -> Result<Parsed, Error> {
        match self.next_any_must()? {
            (Token::Identifier, region) => {
                let path = self.parse_path(Identifier { region })?;
                self.next_must(Token::EndDirective)?;

                Ok(Parsed::Tree(Tree::Output(path)))
            }
            (Token::Keyword(keyword), region) => match keyword {
                Keyword::Include => {
                    let (_, name) = self.next_must(Token::Identifier)?;
                    self.next_must(Token::EndDirective)?;

                    Ok(Parsed::Tree(Tree::Include(Include { name })))
                }
                Keyword::Apply => {
                    let function = self.parse_path_must()?;
                    let argument = self.parse_path_must()?;
                    self.next_must(Token::EndDirective)?;

                    Ok(Parsed::Tree(Tree::Apply(Apply { function, argument })))
                }
                Keyword::If => self.parse_if(region),
                Keyword::Else => {
                    self.next_must(Token::EndDirective)?;

                    Ok(Parsed::Terminator(Terminator::Else, region))
                }
                Keyword::End => {
                    self.next_must(Token::Keyword(Keyword::If))?;
                    self.next_must(Token::EndDirective)?;

                    Ok(Parsed::Terminator(Terminator::EndIf, region))
                }
                Keyword::Map => {
                    let body = if self.next_is(Token::Colon)? {
                        self.next_must(Token::Colon)?;
                        let (_, block) = self.next_must(Token::Block)?;

                        MapBody::Inline(self.parse_inline(block)?)
                    } else {
                        let (_, name) = self.next_must(Token::Identifier)?;

                        MapBody::Named(name)
                    };
                    let path = self.parse_path_must()?;
                    self.next_must(Token::EndDirective)?;

                    Ok(Parsed::Tree(Tree::Map(Map { body, path })))
                }
                Keyword::Join => {
                    self.next_must(Token::Colon)?;
                    let (_, separator) = self.next_must(Token::Block)?;
                    let path = self.parse_path_must()?;
                    self.next_must(Token::EndDirective)?;

                    Ok(Parsed::Tree(Tree::Join(Join { separator, path })))
                }
                Keyword::Txt => {
                    self.next_must(Token::Colon)?;
                    let (_, key) = self.next_must(Token::Block)?;
                    self.next_must(Token::EndDirective)?;

                    Ok(Parsed::Tree(Tree::Txt(Txt { key })))
                }
            },
            (_, region) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(
                    "a directive begins with an attribute path or one of \
                    `include`, `apply`, `if`, `map`, `join`, `txt`",
                )),
        }
    }

    /// Parse an `if` block.
    ///
    /// The `if` directive itself is already consumed up to the condition.
    /// Recursively parses the branch scopes, so arbitrarily nested `if`
    /// blocks are supported.
    fn parse_if(&mut self, region: Region) -> Result<Parsed, Error> {
        let condition = self.parse_path_must()?;
        self.next_must(Token::EndDirective)?;

        let (then_branch, terminator) = self.parse_scope()?;
        let (else_branch, closing) = match terminator {
            None => return Err(error_unclosed_if(self.lexer.source, region)),
            Some((Terminator::EndIf, _)) => (None, None),
            Some((Terminator::Else, _)) => {
                let (else_scope, terminator) = self.parse_scope()?;
                (Some(else_scope), Some(terminator))
            }
        };

        if let Some(closing) = closing {
            match closing {
                None => return Err(error_unclosed_if(self.lexer.source, region)),
                Some((Terminator::Else, region)) => {
                    return Err(Error::build(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, region)
                        .with_help("this `if` already has an `else` branch"))
                }
                Some((Terminator::EndIf, _)) => {}
            }
        }

        Ok(Parsed::Tree(Tree::If(IfElse {
            condition,
            then_branch,
            else_branch,
        })))
    }

    /// Parse the content of an inline block as a template body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the block contains invalid syntax,
    /// including an `$else$` or `$end if$` with no matching `if` inside
    /// the block.
    fn parse_inline(&mut self, region: Region) -> Result<Scope, Error> {
        let mut parser = Parser::in_region(self.lexer.source, region);
        let (scope, terminator) = parser.parse_scope()?;
        if let Some((terminator, region)) = terminator {
            return Err(error_orphan(self.lexer.source, terminator, region));
        }

        Ok(scope)
    }

    /// Parse a Variable from the given first segment.
    ///
    /// Keeps chaining keys as long as a period follows.
    fn parse_path(&mut self, first: Identifier) -> Result<Variable, Error> {
        let mut path = vec![Key::from(first)];

        while self.next_is(Token::Period)? {
            self.next_must(Token::Period)?;
            path.push(self.parse_key()?);
        }

        Ok(Variable { path })
    }

    /// Parse a Variable, requiring the first segment.
    fn parse_path_must(&mut self) -> Result<Variable, Error> {
        let (_, region) = self.next_must(Token::Identifier)?;

        self.parse_path(Identifier { region })
    }

    /// Parse a Key.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is not a valid Identifier,
    /// which covers empty path segments such as `one..two`.
    fn parse_key(&mut self) -> Result<Key, Error> {
        match self.next_any_must()? {
            (Token::Identifier, region) => Ok(Key::from(Identifier { region })),
            (_, region) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help("expected an identifier after `.`, path segments may not be empty")),
        }
    }

    /// Peek the next token.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the underlying Lexer.
    fn peek(&mut self) -> LexResult {
        if let o @ None = &mut self.buffer {
            *o = Some(self.lexer.next()?);
        }

        Ok(self.buffer.unwrap())
    }

    /// Get the next token.
    ///
    /// Prefers to pull a token from the internal buffer first, but will pull from
    /// the lexer when the buffer is empty.
    fn next(&mut self) -> LexResult {
        match self.buffer.take() {
            Some(token) => Ok(token),
            None => self.lexer.next(),
        }
    }

    /// Returns true if the given token matches the upcoming token.
    ///
    /// # Errors
    ///
    /// Propagates any errors reported by the underlying lexer.
    fn next_is(&mut self, expect: Token) -> Result<bool, Error> {
        Ok(self
            .peek()?
            .map(|(token, _)| token == expect)
            .unwrap_or(false))
    }

    /// Get the next token, and compare it to the given token.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token does not match the given token,
    /// or when no more tokens are left.
    fn next_must(&mut self, expect: Token) -> LexResultMust {
        match self.next()? {
            Some((token, region)) => {
                if token == expect {
                    Ok((token, region))
                } else {
                    Err(Error::build(UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(format!("expected `{expect}`, found `{token}`")))
                }
            }
            None => Err(error_eof(self.lexer.source)),
        }
    }

    /// Get the next token.
    ///
    /// Similar to `next` but requires that a token is returned.
    ///
    /// # Errors
    ///
    /// An error is returned if no more tokens are left.
    fn next_any_must(&mut self) -> LexResultMust {
        match self.next()? {
            Some((token, region)) => Ok((token, region)),
            None => Err(error_eof(self.lexer.source)),
        }
    }
}

/// Return an [`Error`] describing an `else` or `end if` with no
/// matching `if`.
fn error_orphan(source: &str, terminator: Terminator, region: Region) -> Error {
    let which = match terminator {
        Terminator::Else => "else",
        Terminator::EndIf => "end if",
    };

    Error::build(UNEXPECTED_BLOCK)
        .with_pointer(source, region)
        .with_help(format!("`{which}` has no matching `if`"))
}

/// Return an [`Error`] describing an `if` block that is never closed.
fn error_unclosed_if(source: &str, region: Region) -> Error {
    Error::build(INVALID_SYNTAX)
        .with_pointer(source, region)
        .with_help("did you close this `if` with `$end if$`?")
}
