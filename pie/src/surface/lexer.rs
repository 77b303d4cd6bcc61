use codespan_reporting::diagnostic::{Diagnostic, Label};
use logos::Logos;

use crate::source::{BytePos, ByteRange, FileId, FileRange};

#[derive(Clone, Debug, PartialEq, Eq, Logos)]
#[logos(extras = FileId)]
pub enum Token<'source> {
    #[regex(r"[^\s()\[\]';]+")]
    Name(&'source str),
    #[regex(r"-?[0-9]+", priority = 3)]
    NumberLiteral(&'source str),

    #[token("'")]
    Quote,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,

    #[error]
    #[regex(r"\p{Whitespace}", logos::skip)]
    #[regex(r";[^\n]*", logos::skip)]
    Error,
}

pub type Spanned<Tok, Loc> = (Loc, Tok, Loc);

#[derive(Clone, Debug)]
pub enum Error {
    UnexpectedCharacter { range: FileRange },
}

impl Error {
    pub fn range(&self) -> FileRange {
        match self {
            Error::UnexpectedCharacter { range } => *range,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Error::UnexpectedCharacter { range } => Diagnostic::error()
                .with_message("unexpected character")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
        }
    }
}

pub fn tokens(
    file_id: FileId,
    source: &str,
) -> impl Iterator<Item = Result<Spanned<Token<'_>, BytePos>, Error>> {
    assert!(
        source.len() <= u32::MAX as usize,
        "`source` must be less than 4GiB in length"
    );

    Token::lexer_with_extras(source, file_id)
        .spanned()
        .map(move |(token, range)| {
            let start = range.start as BytePos;
            let end = range.end as BytePos;
            match token {
                Token::Error => Err(Error::UnexpectedCharacter {
                    range: FileRange::new(file_id, ByteRange::new(start, end)),
                }),
                token => Ok((start, token, end)),
            }
        })
}

impl<'source> Token<'source> {
    pub fn description(&self) -> &'static str {
        match self {
            Token::Name(_) => "name",
            Token::NumberLiteral(_) => "number literal",
            Token::Quote => "'",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenBracket => "[",
            Token::CloseBracket => "]",
            Token::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token<'_>> {
        let file_id = FileId::try_from(1).unwrap();
        tokens(file_id, source)
            .map(|token| token.map(|(_, token, _)| token))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn names_and_numbers() {
        assert_eq!(
            lex("(add1 42) -7 vec:: ind-= →"),
            vec![
                Token::OpenParen,
                Token::Name("add1"),
                Token::NumberLiteral("42"),
                Token::CloseParen,
                Token::NumberLiteral("-7"),
                Token::Name("vec::"),
                Token::Name("ind-="),
                Token::Name("→"),
            ],
        );
    }

    #[test]
    fn quotes_and_comments() {
        assert_eq!(
            lex("'pea ; a comment\n[nil]"),
            vec![
                Token::Quote,
                Token::Name("pea"),
                Token::OpenBracket,
                Token::Name("nil"),
                Token::CloseBracket,
            ],
        );
    }

    #[test]
    fn byte_positions() {
        let file_id = FileId::try_from(1).unwrap();
        let spans = tokens(file_id, "  (U)")
            .map(|token| token.map(|(start, _, end)| (start, end)))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(spans, vec![(2, 3), (3, 4), (4, 5)]);
    }
}
