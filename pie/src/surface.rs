//! Surface language.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use scoped_arena::Scope;

use crate::source::{FileId, FileRange, Location};
use crate::symbol::Symbol;

pub mod elaboration;
pub mod lexer;
mod reader;

/// Names that are part of the syntax of the language, and so can't be bound.
pub const KEYWORDS: &[&str] = &[
    "U", "Nat", "zero", "add1", "which-Nat", "iter-Nat", "rec-Nat", "ind-Nat", "->", "→", "Π",
    "Pi", "λ", "lambda", "Σ", "Sigma", "Pair", "cons", "car", "cdr", "Atom", "Trivial", "sole",
    "List", "nil", "::", "rec-List", "ind-List", "Absurd", "ind-Absurd", "=", "same", "replace",
    "trans", "cong", "symm", "ind-=", "Vec", "vecnil", "vec::", "head", "tail", "ind-Vec",
    "Either", "left", "right", "ind-Either", "the", "TODO", "claim", "define", "check-same",
    "data",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|keyword| word == *keyword)
}

/// A name along with the location it was written at.
pub type Name = (Location, Symbol);

/// Surface terms.
#[derive(Debug, Clone)]
pub enum Term<'arena> {
    /// Variables, type constructors, constructors and eliminators.
    Name(Location, Symbol),
    /// `TODO`
    Hole(Location),
    /// Number literals, which still need to be checked.
    NumberLiteral(Location, Symbol),
    /// Annotated expressions: `(the T e)`.
    The(Location, &'arena Term<'arena>, &'arena Term<'arena>),

    Universe(Location),

    Nat(Location),
    Zero(Location),
    Add1(Location, &'arena Term<'arena>),
    /// `(which-Nat target base step)`
    WhichNat(Location, &'arena Term<'arena>, &'arena Term<'arena>, &'arena Term<'arena>),
    /// `(iter-Nat target base step)`
    IterNat(Location, &'arena Term<'arena>, &'arena Term<'arena>, &'arena Term<'arena>),
    /// `(rec-Nat target base step)`
    RecNat(Location, &'arena Term<'arena>, &'arena Term<'arena>, &'arena Term<'arena>),
    /// `(ind-Nat target motive base step)`
    IndNat(
        Location,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
    ),

    /// Non-dependent function types. `(-> A B C)` is read as `(-> A (-> B C))`.
    Arrow(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    /// Dependent function types, with a single binder.
    Pi(Location, Name, &'arena Term<'arena>, &'arena Term<'arena>),
    /// Function literals, with a single binder.
    Lambda(Location, Name, &'arena Term<'arena>),
    /// Function applications, with a single argument.
    App(Location, &'arena Term<'arena>, &'arena Term<'arena>),

    /// Non-dependent pair types.
    Pair(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    /// Dependent pair types, with a single binder.
    Sigma(Location, Name, &'arena Term<'arena>, &'arena Term<'arena>),
    Cons(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    Car(Location, &'arena Term<'arena>),
    Cdr(Location, &'arena Term<'arena>),

    Atom(Location),
    /// Quoted atoms: `'sym`.
    Quote(Location, Symbol),

    Trivial(Location),
    Sole(Location),

    List(Location, &'arena Term<'arena>),
    Nil(Location),
    ListCons(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    /// `(rec-List target base step)`
    RecList(Location, &'arena Term<'arena>, &'arena Term<'arena>, &'arena Term<'arena>),
    /// `(ind-List target motive base step)`
    IndList(
        Location,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
    ),

    Absurd(Location),
    /// `(ind-Absurd target motive)`
    IndAbsurd(Location, &'arena Term<'arena>, &'arena Term<'arena>),

    /// `(= X from to)`
    Equal(Location, &'arena Term<'arena>, &'arena Term<'arena>, &'arena Term<'arena>),
    Same(Location, &'arena Term<'arena>),
    /// `(replace target motive base)`
    Replace(Location, &'arena Term<'arena>, &'arena Term<'arena>, &'arena Term<'arena>),
    Trans(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    /// `(cong target function)`
    Cong(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    Symm(Location, &'arena Term<'arena>),
    /// `(ind-= target motive base)`
    IndEqual(Location, &'arena Term<'arena>, &'arena Term<'arena>, &'arena Term<'arena>),

    /// `(Vec E len)`
    Vec(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    VecNil(Location),
    VecCons(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    Head(Location, &'arena Term<'arena>),
    Tail(Location, &'arena Term<'arena>),
    /// `(ind-Vec len target motive base step)`
    IndVec(
        Location,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
    ),

    Either(Location, &'arena Term<'arena>, &'arena Term<'arena>),
    Left(Location, &'arena Term<'arena>),
    Right(Location, &'arena Term<'arena>),
    /// `(ind-Either target motive base-left base-right)`
    IndEither(
        Location,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
        &'arena Term<'arena>,
    ),
}

impl<'arena> Term<'arena> {
    /// Get the location of the term.
    pub fn location(&self) -> Location {
        match self {
            Term::Name(location, _)
            | Term::Hole(location)
            | Term::NumberLiteral(location, _)
            | Term::The(location, _, _)
            | Term::Universe(location)
            | Term::Nat(location)
            | Term::Zero(location)
            | Term::Add1(location, _)
            | Term::WhichNat(location, _, _, _)
            | Term::IterNat(location, _, _, _)
            | Term::RecNat(location, _, _, _)
            | Term::IndNat(location, _, _, _, _)
            | Term::Arrow(location, _, _)
            | Term::Pi(location, _, _, _)
            | Term::Lambda(location, _, _)
            | Term::App(location, _, _)
            | Term::Pair(location, _, _)
            | Term::Sigma(location, _, _, _)
            | Term::Cons(location, _, _)
            | Term::Car(location, _)
            | Term::Cdr(location, _)
            | Term::Atom(location)
            | Term::Quote(location, _)
            | Term::Trivial(location)
            | Term::Sole(location)
            | Term::List(location, _)
            | Term::Nil(location)
            | Term::ListCons(location, _, _)
            | Term::RecList(location, _, _, _)
            | Term::IndList(location, _, _, _, _)
            | Term::Absurd(location)
            | Term::IndAbsurd(location, _, _)
            | Term::Equal(location, _, _, _)
            | Term::Same(location, _)
            | Term::Replace(location, _, _, _)
            | Term::Trans(location, _, _)
            | Term::Cong(location, _, _)
            | Term::Symm(location, _)
            | Term::IndEqual(location, _, _, _)
            | Term::Vec(location, _, _)
            | Term::VecNil(location)
            | Term::VecCons(location, _, _)
            | Term::Head(location, _)
            | Term::Tail(location, _)
            | Term::IndVec(location, _, _, _, _, _)
            | Term::Either(location, _, _)
            | Term::Left(location, _)
            | Term::Right(location, _)
            | Term::IndEither(location, _, _, _, _) => *location,
        }
    }

    pub fn range(&self) -> FileRange {
        self.location().range()
    }

    /// Parse a single term from the `source` string, allocating nodes to the
    /// `scope`.
    pub fn parse(
        scope: &'arena Scope<'arena>,
        file_id: FileId,
        source: &str,
    ) -> Result<Term<'arena>, ParseMessage> {
        reader::Parser::new(scope).parse_term(file_id, source)
    }
}

/// A parameter, index, or constructor argument of a datatype declaration.
#[derive(Debug, Clone)]
pub struct Param<'arena> {
    pub name: Name,
    pub r#type: Term<'arena>,
}

#[derive(Debug, Clone)]
pub struct ConstructorDeclaration<'arena> {
    pub location: Location,
    pub name: Name,
    pub args: &'arena [Param<'arena>],
    /// The type of the constructed value: the datatype applied to its
    /// parameters and the indices of the result.
    pub result: Term<'arena>,
}

/// `(data Name ((param T) ...) ((index T) ...) (ctor ((arg T) ...) result) ...)`
#[derive(Debug, Clone)]
pub struct DatatypeDeclaration<'arena> {
    pub location: Location,
    pub name: Name,
    pub params: &'arena [Param<'arena>],
    pub indices: &'arena [Param<'arena>],
    pub constructors: &'arena [ConstructorDeclaration<'arena>],
}

/// Top-level items.
#[derive(Debug, Clone)]
pub enum Item<'arena> {
    /// `(claim name type)`
    Claim(Location, Name, &'arena Term<'arena>),
    /// `(define name expr)`
    Define(Location, Name, &'arena Term<'arena>),
    /// `(check-same type expr0 expr1)`
    CheckSame(Location, &'arena Term<'arena>, &'arena Term<'arena>, &'arena Term<'arena>),
    Data(DatatypeDeclaration<'arena>),
    /// An expression to be normalized.
    Term(&'arena Term<'arena>),
}

impl<'arena> Item<'arena> {
    pub fn location(&self) -> Location {
        match self {
            Item::Claim(location, _, _)
            | Item::Define(location, _, _)
            | Item::CheckSame(location, _, _, _) => *location,
            Item::Data(declaration) => declaration.location,
            Item::Term(term) => term.location(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Module<'arena> {
    pub items: &'arena [Item<'arena>],
}

impl<'arena> Module<'arena> {
    /// Parse a sequence of top-level items from the `source` string.
    pub fn parse(
        scope: &'arena Scope<'arena>,
        file_id: FileId,
        source: &str,
    ) -> Result<Module<'arena>, ParseMessage> {
        reader::Parser::new(scope).parse_module(file_id, source)
    }
}

/// Messages produced while reading the surface syntax.
#[derive(Clone, Debug)]
pub enum ParseMessage {
    Lexer(lexer::Error),
    UnexpectedToken {
        range: FileRange,
        found: &'static str,
    },
    UnexpectedEndOfFile {
        range: FileRange,
        /// What the reader was looking for when the input ran out.
        expected: &'static str,
    },
    MismatchedDelimiter {
        open_range: FileRange,
        close_range: FileRange,
    },
    ExtraTokens {
        range: FileRange,
    },
    EmptyApplication {
        range: FileRange,
    },
    /// A keyword form with the wrong shape.
    MalformedForm {
        range: FileRange,
        keyword: &'static str,
        usage: &'static str,
    },
    ExpectedName {
        range: FileRange,
    },
    KeywordAsName {
        range: FileRange,
        name: Symbol,
    },
}

impl ParseMessage {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            ParseMessage::Lexer(error) => error.to_diagnostic(),
            ParseMessage::UnexpectedToken { range, found } => Diagnostic::error()
                .with_message(format!("unexpected `{found}`"))
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
            ParseMessage::UnexpectedEndOfFile { range, expected } => Diagnostic::error()
                .with_message("unexpected end of file")
                .with_labels(vec![Label::primary(range.file_id(), *range)
                    .with_message(format!("expected {expected}"))]),
            ParseMessage::MismatchedDelimiter {
                open_range,
                close_range,
            } => Diagnostic::error()
                .with_message("mismatched delimiter")
                .with_labels(vec![
                    Label::primary(close_range.file_id(), *close_range),
                    Label::secondary(open_range.file_id(), *open_range)
                        .with_message("opened here"),
                ]),
            ParseMessage::ExtraTokens { range } => Diagnostic::error()
                .with_message("expected a single expression")
                .with_labels(vec![Label::primary(range.file_id(), *range)
                    .with_message("unexpected expression")]),
            ParseMessage::EmptyApplication { range } => Diagnostic::error()
                .with_message("empty application")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
            ParseMessage::MalformedForm {
                range,
                keyword,
                usage,
            } => Diagnostic::error()
                .with_message(format!("malformed `{keyword}`"))
                .with_labels(vec![Label::primary(range.file_id(), *range)])
                .with_notes(vec![format!("usage: {usage}")]),
            ParseMessage::ExpectedName { range } => Diagnostic::error()
                .with_message("expected a name")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
            ParseMessage::KeywordAsName { range, name } => Diagnostic::error()
                .with_message(format!("`{name}` is a keyword, and can't be used as a name"))
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
        }
    }
}

impl From<lexer::Error> for ParseMessage {
    fn from(error: lexer::Error) -> ParseMessage {
        ParseMessage::Lexer(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_drop() {
        assert!(!std::mem::needs_drop::<Term<'_>>());
        assert!(!std::mem::needs_drop::<Item<'_>>());
    }
}
