//! Reading s-expressions, and parsing them into surface terms.

use std::iter::Peekable;

use scoped_arena::Scope;

use crate::source::{BytePos, ByteRange, FileId, FileRange, Location};
use crate::surface::lexer::{self, Token};
use crate::surface::{
    is_keyword, ConstructorDeclaration, DatatypeDeclaration, Item, Module, Name, Param,
    ParseMessage, Term,
};
use crate::symbol::Symbol;

enum SExpr<'source> {
    Name(FileRange, &'source str),
    Number(FileRange, &'source str),
    Quote(FileRange, &'source str),
    List(FileRange, Vec<SExpr<'source>>),
}

impl<'source> SExpr<'source> {
    fn range(&self) -> FileRange {
        match self {
            SExpr::Name(range, _)
            | SExpr::Number(range, _)
            | SExpr::Quote(range, _)
            | SExpr::List(range, _) => *range,
        }
    }
}

struct Reader<'source, Tokens: Iterator> {
    file_id: FileId,
    tokens: Peekable<Tokens>,
    source_len: BytePos,
    _source: std::marker::PhantomData<&'source str>,
}

impl<'source, Tokens> Reader<'source, Tokens>
where
    Tokens: Iterator<Item = Result<lexer::Spanned<Token<'source>, BytePos>, lexer::Error>>,
{
    fn range(&self, start: BytePos, end: BytePos) -> FileRange {
        FileRange::new(self.file_id, ByteRange::new(start, end))
    }

    fn eof_range(&self) -> FileRange {
        self.range(self.source_len, self.source_len)
    }

    /// Read the next s-expression, or `None` at the end of the input.
    fn read(&mut self) -> Result<Option<SExpr<'source>>, ParseMessage> {
        let (start, token, end) = match self.tokens.next() {
            None => return Ok(None),
            Some(token) => token?,
        };

        let sexpr = match token {
            Token::Name(name) => SExpr::Name(self.range(start, end), name),
            Token::NumberLiteral(number) => SExpr::Number(self.range(start, end), number),
            Token::Quote => match self.tokens.next() {
                Some(Ok((_, Token::Name(name), end))) => SExpr::Quote(self.range(start, end), name),
                Some(Ok((_, token, end))) => {
                    return Err(ParseMessage::UnexpectedToken {
                        range: self.range(start, end),
                        found: token.description(),
                    })
                }
                Some(Err(error)) => return Err(error.into()),
                None => {
                    return Err(ParseMessage::UnexpectedEndOfFile {
                        range: self.eof_range(),
                        expected: "an atom after `'`",
                    })
                }
            },
            Token::OpenParen => self.read_list(start, end, Token::CloseParen)?,
            Token::OpenBracket => self.read_list(start, end, Token::CloseBracket)?,
            token @ (Token::CloseParen | Token::CloseBracket | Token::Error) => {
                return Err(ParseMessage::UnexpectedToken {
                    range: self.range(start, end),
                    found: token.description(),
                })
            }
        };

        Ok(Some(sexpr))
    }

    fn read_list(
        &mut self,
        open_start: BytePos,
        open_end: BytePos,
        close: Token<'static>,
    ) -> Result<SExpr<'source>, ParseMessage> {
        let mut elems = Vec::new();
        loop {
            match self.tokens.peek() {
                None => {
                    return Err(ParseMessage::UnexpectedEndOfFile {
                        range: self.eof_range(),
                        expected: "a closing parenthesis",
                    })
                }
                Some(Ok((_, token @ (Token::CloseParen | Token::CloseBracket), _))) => {
                    let matches = *token == close;
                    let (close_start, _, close_end) = match self.tokens.next() {
                        Some(Ok(token)) => token,
                        _ => unreachable!("peeked a closing delimiter"),
                    };
                    if !matches {
                        return Err(ParseMessage::MismatchedDelimiter {
                            open_range: self.range(open_start, open_end),
                            close_range: self.range(close_start, close_end),
                        });
                    }
                    return Ok(SExpr::List(self.range(open_start, close_end), elems));
                }
                Some(_) => match self.read()? {
                    Some(sexpr) => elems.push(sexpr),
                    None => {
                        return Err(ParseMessage::UnexpectedEndOfFile {
                            range: self.eof_range(),
                            expected: "a closing parenthesis",
                        })
                    }
                },
            }
        }
    }
}

fn read_all(file_id: FileId, source: &str) -> Result<Vec<SExpr<'_>>, ParseMessage> {
    let mut reader = Reader {
        file_id,
        tokens: lexer::tokens(file_id, source).peekable(),
        source_len: source.len() as BytePos,
        _source: std::marker::PhantomData,
    };

    let mut sexprs = Vec::new();
    while let Some(sexpr) = reader.read()? {
        sexprs.push(sexpr);
    }
    Ok(sexprs)
}

/// The shape of each keyword form, used in error messages.
fn usage(keyword: &str) -> Option<(&'static str, &'static str)> {
    let usage = match keyword {
        "the" => ("the", "(the TYPE EXPR)"),
        "add1" => ("add1", "(add1 N)"),
        "which-Nat" => ("which-Nat", "(which-Nat TARGET BASE STEP)"),
        "iter-Nat" => ("iter-Nat", "(iter-Nat TARGET BASE STEP)"),
        "rec-Nat" => ("rec-Nat", "(rec-Nat TARGET BASE STEP)"),
        "ind-Nat" => ("ind-Nat", "(ind-Nat TARGET MOTIVE BASE STEP)"),
        "->" => ("->", "(-> ARG-TYPE ... RESULT-TYPE)"),
        "→" => ("→", "(→ ARG-TYPE ... RESULT-TYPE)"),
        "Π" => ("Π", "(Π ((NAME TYPE) ...) TYPE)"),
        "Pi" => ("Pi", "(Pi ((NAME TYPE) ...) TYPE)"),
        "λ" => ("λ", "(λ (NAME ...) BODY)"),
        "lambda" => ("lambda", "(lambda (NAME ...) BODY)"),
        "Σ" => ("Σ", "(Σ ((NAME TYPE) ...) TYPE)"),
        "Sigma" => ("Sigma", "(Sigma ((NAME TYPE) ...) TYPE)"),
        "Pair" => ("Pair", "(Pair CAR-TYPE CDR-TYPE)"),
        "cons" => ("cons", "(cons CAR CDR)"),
        "car" => ("car", "(car PAIR)"),
        "cdr" => ("cdr", "(cdr PAIR)"),
        "List" => ("List", "(List ELEM-TYPE)"),
        "::" => ("::", "(:: HEAD TAIL)"),
        "rec-List" => ("rec-List", "(rec-List TARGET BASE STEP)"),
        "ind-List" => ("ind-List", "(ind-List TARGET MOTIVE BASE STEP)"),
        "ind-Absurd" => ("ind-Absurd", "(ind-Absurd TARGET MOTIVE)"),
        "=" => ("=", "(= TYPE FROM TO)"),
        "same" => ("same", "(same EXPR)"),
        "replace" => ("replace", "(replace TARGET MOTIVE BASE)"),
        "trans" => ("trans", "(trans LEFT RIGHT)"),
        "cong" => ("cong", "(cong TARGET FUNCTION)"),
        "symm" => ("symm", "(symm TARGET)"),
        "ind-=" => ("ind-=", "(ind-= TARGET MOTIVE BASE)"),
        "Vec" => ("Vec", "(Vec ELEM-TYPE LENGTH)"),
        "vec::" => ("vec::", "(vec:: HEAD TAIL)"),
        "head" => ("head", "(head VEC)"),
        "tail" => ("tail", "(tail VEC)"),
        "ind-Vec" => ("ind-Vec", "(ind-Vec LENGTH TARGET MOTIVE BASE STEP)"),
        "Either" => ("Either", "(Either LEFT-TYPE RIGHT-TYPE)"),
        "left" => ("left", "(left EXPR)"),
        "right" => ("right", "(right EXPR)"),
        "ind-Either" => ("ind-Either", "(ind-Either TARGET MOTIVE BASE-LEFT BASE-RIGHT)"),
        "claim" => ("claim", "(claim NAME TYPE)"),
        "define" => ("define", "(define NAME EXPR)"),
        "check-same" => ("check-same", "(check-same TYPE EXPR EXPR)"),
        "data" => (
            "data",
            "(data NAME ((PARAM TYPE) ...) ((INDEX TYPE) ...) (CONSTRUCTOR ((ARG TYPE) ...) RESULT-TYPE) ...)",
        ),
        _ => return None,
    };
    Some(usage)
}

pub struct Parser<'arena> {
    scope: &'arena Scope<'arena>,
}

impl<'arena> Parser<'arena> {
    pub fn new(scope: &'arena Scope<'arena>) -> Parser<'arena> {
        Parser { scope }
    }

    pub fn parse_term(&self, file_id: FileId, source: &str) -> Result<Term<'arena>, ParseMessage> {
        let mut sexprs = read_all(file_id, source)?.into_iter();
        match (sexprs.next(), sexprs.next()) {
            (Some(sexpr), None) => self.term(&sexpr),
            (Some(_), Some(extra)) => Err(ParseMessage::ExtraTokens {
                range: extra.range(),
            }),
            (None, _) => Err(ParseMessage::UnexpectedEndOfFile {
                range: FileRange::new(file_id, ByteRange::new(0, source.len() as BytePos)),
                expected: "an expression",
            }),
        }
    }

    pub fn parse_module(
        &self,
        file_id: FileId,
        source: &str,
    ) -> Result<Module<'arena>, ParseMessage> {
        let items = (read_all(file_id, source)?.iter())
            .map(|sexpr| self.item(sexpr))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Module {
            items: self.scope.to_scope_from_iter(items),
        })
    }

    fn alloc(&self, term: Term<'arena>) -> &'arena Term<'arena> {
        self.scope.to_scope(term)
    }

    fn malformed(&self, range: FileRange, keyword: &str) -> ParseMessage {
        let (keyword, usage) = usage(keyword).unwrap_or(("form", "(KEYWORD ARG ...)"));
        ParseMessage::MalformedForm {
            range,
            keyword,
            usage,
        }
    }

    fn item(&self, sexpr: &SExpr<'_>) -> Result<Item<'arena>, ParseMessage> {
        let (range, keyword, args) = match sexpr {
            SExpr::List(range, elems) => match elems.split_first() {
                Some((SExpr::Name(_, keyword), args)) => (*range, *keyword, args),
                _ => return Ok(Item::Term(self.alloc(self.term(sexpr)?))),
            },
            _ => return Ok(Item::Term(self.alloc(self.term(sexpr)?))),
        };
        let location = Location::new(range);

        match (keyword, args) {
            ("claim", [name, r#type]) => Ok(Item::Claim(
                location,
                self.name(name)?,
                self.alloc(self.term(r#type)?),
            )),
            ("define", [name, expr]) => Ok(Item::Define(
                location,
                self.name(name)?,
                self.alloc(self.term(expr)?),
            )),
            ("check-same", [r#type, expr0, expr1]) => Ok(Item::CheckSame(
                location,
                self.alloc(self.term(r#type)?),
                self.alloc(self.term(expr0)?),
                self.alloc(self.term(expr1)?),
            )),
            ("data", [name, params, indices, constructors @ ..]) => {
                let constructors = (constructors.iter())
                    .map(|constructor| self.constructor_declaration(constructor))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Item::Data(DatatypeDeclaration {
                    location,
                    name: self.name(name)?,
                    params: self.params(params)?,
                    indices: self.params(indices)?,
                    constructors: self.scope.to_scope_from_iter(constructors),
                }))
            }
            ("claim" | "define" | "check-same" | "data", _) => Err(self.malformed(range, keyword)),
            _ => Ok(Item::Term(self.alloc(self.term(sexpr)?))),
        }
    }

    fn constructor_declaration(
        &self,
        sexpr: &SExpr<'_>,
    ) -> Result<ConstructorDeclaration<'arena>, ParseMessage> {
        match sexpr {
            SExpr::List(range, elems) => match elems.as_slice() {
                [name, args, result] => Ok(ConstructorDeclaration {
                    location: Location::new(*range),
                    name: self.name(name)?,
                    args: self.params(args)?,
                    result: self.term(result)?,
                }),
                _ => Err(self.malformed(*range, "data")),
            },
            _ => Err(self.malformed(sexpr.range(), "data")),
        }
    }

    /// `((name type) ...)`
    fn params(&self, sexpr: &SExpr<'_>) -> Result<&'arena [Param<'arena>], ParseMessage> {
        let params = (self.binders(sexpr, "data")?.into_iter())
            .map(|(name, r#type)| Ok(Param { name, r#type: self.term(r#type)? }))
            .collect::<Result<Vec<_>, ParseMessage>>()?;
        Ok(self.scope.to_scope_from_iter(params))
    }

    fn binders<'a, 'source>(
        &self,
        sexpr: &'a SExpr<'source>,
        keyword: &str,
    ) -> Result<Vec<(Name, &'a SExpr<'source>)>, ParseMessage> {
        let elems = match sexpr {
            SExpr::List(_, elems) => elems,
            _ => return Err(self.malformed(sexpr.range(), keyword)),
        };
        (elems.iter())
            .map(|binder| match binder {
                SExpr::List(_, binder_elems) => match binder_elems.as_slice() {
                    [name, r#type] => Ok((self.name(name)?, r#type)),
                    _ => Err(self.malformed(binder.range(), keyword)),
                },
                _ => Err(self.malformed(binder.range(), keyword)),
            })
            .collect()
    }

    fn name(&self, sexpr: &SExpr<'_>) -> Result<Name, ParseMessage> {
        match sexpr {
            SExpr::Name(range, name) if is_keyword(name) => Err(ParseMessage::KeywordAsName {
                range: *range,
                name: Symbol::intern(name),
            }),
            SExpr::Name(range, name) => Ok((Location::new(*range), Symbol::intern(name))),
            _ => Err(ParseMessage::ExpectedName {
                range: sexpr.range(),
            }),
        }
    }

    fn term(&self, sexpr: &SExpr<'_>) -> Result<Term<'arena>, ParseMessage> {
        match sexpr {
            SExpr::Name(range, name) => {
                let location = Location::new(*range);
                match *name {
                    "U" => Ok(Term::Universe(location)),
                    "Nat" => Ok(Term::Nat(location)),
                    "zero" => Ok(Term::Zero(location)),
                    "Atom" => Ok(Term::Atom(location)),
                    "Trivial" => Ok(Term::Trivial(location)),
                    "sole" => Ok(Term::Sole(location)),
                    "nil" => Ok(Term::Nil(location)),
                    "Absurd" => Ok(Term::Absurd(location)),
                    "vecnil" => Ok(Term::VecNil(location)),
                    "TODO" => Ok(Term::Hole(location)),
                    name if is_keyword(name) => Err(self.malformed(*range, name)),
                    name => Ok(Term::Name(location, Symbol::intern(name))),
                }
            }
            SExpr::Number(range, number) => {
                Ok(Term::NumberLiteral(Location::new(*range), Symbol::intern(number)))
            }
            SExpr::Quote(range, symbol) => {
                Ok(Term::Quote(Location::new(*range), Symbol::intern(symbol)))
            }
            SExpr::List(range, elems) => match elems.split_first() {
                None => Err(ParseMessage::EmptyApplication { range: *range }),
                Some((SExpr::Name(_, keyword), args)) if is_keyword(keyword) => {
                    self.form(*range, keyword, args)
                }
                Some((head, args)) if !args.is_empty() => {
                    let location = Location::new(*range);
                    let inner = self.inner(location);
                    let head = self.term(head)?;
                    (args.iter().enumerate()).try_fold(head, |head, (i, arg)| {
                        let location = if i + 1 == args.len() { location } else { inner };
                        let arg = self.alloc(self.term(arg)?);
                        Ok(Term::App(location, self.alloc(head), arg))
                    })
                }
                // `(Name)`, for datatypes and constructors without arguments
                Some((head, _)) => self.term(head),
            },
        }
    }

    /// Nested nodes of a desugared form share the location of the outermost
    /// node, but only the outermost node reports information.
    fn inner(&self, location: Location) -> Location {
        location.not_for_info()
    }

    fn form(
        &self,
        range: FileRange,
        keyword: &str,
        args: &[SExpr<'_>],
    ) -> Result<Term<'arena>, ParseMessage> {
        let location = Location::new(range);
        let term = |sexpr: &SExpr<'_>| -> Result<&'arena Term<'arena>, ParseMessage> {
            Ok(self.alloc(self.term(sexpr)?))
        };

        match (keyword, args) {
            ("the", [r#type, expr]) => Ok(Term::The(location, term(r#type)?, term(expr)?)),

            ("add1", [pred]) => Ok(Term::Add1(location, term(pred)?)),
            ("which-Nat", [target, base, step]) => {
                Ok(Term::WhichNat(location, term(target)?, term(base)?, term(step)?))
            }
            ("iter-Nat", [target, base, step]) => {
                Ok(Term::IterNat(location, term(target)?, term(base)?, term(step)?))
            }
            ("rec-Nat", [target, base, step]) => {
                Ok(Term::RecNat(location, term(target)?, term(base)?, term(step)?))
            }
            ("ind-Nat", [target, motive, base, step]) => Ok(Term::IndNat(
                location,
                term(target)?,
                term(motive)?,
                term(base)?,
                term(step)?,
            )),

            ("->" | "→", [arg_types @ .., body_type]) if !arg_types.is_empty() => {
                let body_type = self.term(body_type)?;
                let inner = self.inner(location);
                (arg_types.iter().enumerate().rev()).try_fold(body_type, |body_type, (i, arg_type)| {
                    let location = if i == 0 { location } else { inner };
                    Ok(Term::Arrow(location, term(arg_type)?, self.alloc(body_type)))
                })
            }
            ("Π" | "Pi", [binders, body_type]) => {
                let binders = self.binders(binders, keyword)?;
                self.telescope(location, binders, body_type, Term::Pi)
            }
            ("Σ" | "Sigma", [binders, body_type]) => {
                let binders = self.binders(binders, keyword)?;
                self.telescope(location, binders, body_type, Term::Sigma)
            }
            ("λ" | "lambda", [SExpr::List(_, names), body]) if !names.is_empty() => {
                let names = (names.iter())
                    .map(|name| self.name(name))
                    .collect::<Result<Vec<_>, _>>()?;
                let body = self.term(body)?;
                let inner = self.inner(location);
                Ok((names.into_iter().enumerate().rev()).fold(body, |body, (i, name)| {
                    let location = if i == 0 { location } else { inner };
                    Term::Lambda(location, name, self.alloc(body))
                }))
            }

            ("Pair", [car_type, cdr_type]) => {
                Ok(Term::Pair(location, term(car_type)?, term(cdr_type)?))
            }
            ("cons", [car, cdr]) => Ok(Term::Cons(location, term(car)?, term(cdr)?)),
            ("car", [pair]) => Ok(Term::Car(location, term(pair)?)),
            ("cdr", [pair]) => Ok(Term::Cdr(location, term(pair)?)),

            ("List", [elem_type]) => Ok(Term::List(location, term(elem_type)?)),
            ("::", [head, tail]) => Ok(Term::ListCons(location, term(head)?, term(tail)?)),
            ("rec-List", [target, base, step]) => {
                Ok(Term::RecList(location, term(target)?, term(base)?, term(step)?))
            }
            ("ind-List", [target, motive, base, step]) => Ok(Term::IndList(
                location,
                term(target)?,
                term(motive)?,
                term(base)?,
                term(step)?,
            )),

            ("ind-Absurd", [target, motive]) => {
                Ok(Term::IndAbsurd(location, term(target)?, term(motive)?))
            }

            ("=", [r#type, from, to]) => {
                Ok(Term::Equal(location, term(r#type)?, term(from)?, term(to)?))
            }
            ("same", [expr]) => Ok(Term::Same(location, term(expr)?)),
            ("replace", [target, motive, base]) => {
                Ok(Term::Replace(location, term(target)?, term(motive)?, term(base)?))
            }
            ("trans", [left, right]) => Ok(Term::Trans(location, term(left)?, term(right)?)),
            ("cong", [target, function]) => {
                Ok(Term::Cong(location, term(target)?, term(function)?))
            }
            ("symm", [target]) => Ok(Term::Symm(location, term(target)?)),
            ("ind-=", [target, motive, base]) => {
                Ok(Term::IndEqual(location, term(target)?, term(motive)?, term(base)?))
            }

            ("Vec", [elem_type, len]) => Ok(Term::Vec(location, term(elem_type)?, term(len)?)),
            ("vec::", [head, tail]) => Ok(Term::VecCons(location, term(head)?, term(tail)?)),
            ("head", [target]) => Ok(Term::Head(location, term(target)?)),
            ("tail", [target]) => Ok(Term::Tail(location, term(target)?)),
            ("ind-Vec", [len, target, motive, base, step]) => Ok(Term::IndVec(
                location,
                term(len)?,
                term(target)?,
                term(motive)?,
                term(base)?,
                term(step)?,
            )),

            ("Either", [left_type, right_type]) => {
                Ok(Term::Either(location, term(left_type)?, term(right_type)?))
            }
            ("left", [expr]) => Ok(Term::Left(location, term(expr)?)),
            ("right", [expr]) => Ok(Term::Right(location, term(expr)?)),
            ("ind-Either", [target, motive, base_left, base_right]) => Ok(Term::IndEither(
                location,
                term(target)?,
                term(motive)?,
                term(base_left)?,
                term(base_right)?,
            )),

            (keyword, _) => Err(self.malformed(range, keyword)),
        }
    }

    /// Desugar a binding form with several binders into nested forms with
    /// one binder each.
    fn telescope(
        &self,
        location: Location,
        binders: Vec<(Name, &SExpr<'_>)>,
        body: &SExpr<'_>,
        make: fn(Location, Name, &'arena Term<'arena>, &'arena Term<'arena>) -> Term<'arena>,
    ) -> Result<Term<'arena>, ParseMessage> {
        if binders.is_empty() {
            return Err(self.malformed(location.range(), "Π"));
        }

        let body = self.term(body)?;
        let inner = self.inner(location);
        (binders.into_iter().enumerate().rev()).try_fold(body, |body, (i, (name, r#type))| {
            let location = if i == 0 { location } else { inner };
            let r#type = self.alloc(self.term(r#type)?);
            Ok(make(location, name, r#type, self.alloc(body)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_id() -> FileId {
        FileId::try_from(1).unwrap()
    }

    #[test]
    fn multi_binder_pi_is_nested() {
        let scope = Scope::new();
        let term = Term::parse(&scope, file_id(), "(Π ((A U) (x A)) A)").unwrap();
        match term {
            Term::Pi(location, (_, a), _, Term::Pi(inner, (_, x), _, _)) => {
                assert!(location.for_info());
                assert!(!inner.for_info());
                assert_eq!(a.resolve(), "A");
                assert_eq!(x.resolve(), "x");
            }
            term => panic!("unexpected term: {term:?}"),
        }
    }

    #[test]
    fn applications_are_curried() {
        let scope = Scope::new();
        let term = Term::parse(&scope, file_id(), "(f 1 'a)").unwrap();
        match term {
            Term::App(_, Term::App(_, Term::Name(_, f), Term::NumberLiteral(_, n)), Term::Quote(_, a)) => {
                assert_eq!((f.resolve(), n.resolve(), a.resolve()), ("f", "1", "a"));
            }
            term => panic!("unexpected term: {term:?}"),
        }
    }

    #[test]
    fn brackets_are_parentheses() {
        let scope = Scope::new();
        assert!(matches!(
            Term::parse(&scope, file_id(), "(λ [x] x)"),
            Ok(Term::Lambda(_, _, Term::Name(_, _)))
        ));
    }

    #[test]
    fn mismatched_delimiters_are_reported() {
        let scope = Scope::new();
        assert!(matches!(
            Term::parse(&scope, file_id(), "(add1 zero]"),
            Err(ParseMessage::MismatchedDelimiter { .. })
        ));
    }

    #[test]
    fn keywords_cannot_be_bound() {
        let scope = Scope::new();
        assert!(matches!(
            Term::parse(&scope, file_id(), "(λ (car) car)"),
            Err(ParseMessage::KeywordAsName { .. })
        ));
    }

    #[test]
    fn malformed_forms_are_reported() {
        let scope = Scope::new();
        assert!(matches!(
            Term::parse(&scope, file_id(), "(the Nat)"),
            Err(ParseMessage::MalformedForm { keyword: "the", .. })
        ));
    }

    #[test]
    fn data_declarations() {
        let scope = Scope::new();
        let source = "(data MyList ((E U)) () (my-nil () (MyList E)) (my-cons ((e E) (es (MyList E))) (MyList E)))";
        let module = Module::parse(&scope, file_id(), source).unwrap();
        match module.items {
            [Item::Data(declaration)] => {
                assert_eq!(declaration.name.1.resolve(), "MyList");
                assert_eq!(declaration.params.len(), 1);
                assert_eq!(declaration.indices.len(), 0);
                assert_eq!(declaration.constructors.len(), 2);
                assert_eq!(declaration.constructors[1].args.len(), 2);
            }
            items => panic!("unexpected items: {items:?}"),
        }
    }

    #[test]
    fn trailing_quotes_expect_an_atom() {
        let scope = Scope::new();
        match Term::parse(&scope, file_id(), "(cons 'a ')") {
            Err(ParseMessage::UnexpectedToken { found, .. }) => assert_eq!(found, Token::CloseParen.description()),
            result => panic!("expected an unexpected token, found {result:?}"),
        }
        match Term::parse(&scope, file_id(), "'") {
            Err(ParseMessage::UnexpectedEndOfFile { expected, .. }) => assert_eq!(expected, "an atom after `'`"),
            result => panic!("expected an unexpected end of file, found {result:?}"),
        }
    }

    #[test]
    fn unclosed_lists_expect_a_closing_parenthesis() {
        let scope = Scope::new();
        match Term::parse(&scope, file_id(), "(add1 zero") {
            Err(ParseMessage::UnexpectedEndOfFile { expected, .. }) => assert_eq!(expected, "a closing parenthesis"),
            result => panic!("expected an unexpected end of file, found {result:?}"),
        }
    }
}
