//! A pretty printer for the core language.
//!
//! Terms are printed back as s-expressions in the surface syntax, so that
//! normal forms can be read back in by the reader.
//!
//! Example:
//!
//! ```
//! use pie::core::pretty::Context;
//! use pie::core::Term;
//!
//! let pp = Context::new();
//! let doc = pp.term(&Term::nat(3));
//! assert_eq!(doc.pretty(80).to_string(), "3");
//! ```

use std::fmt;

use pretty::RcDoc;

use crate::core::Term;
use crate::symbol::Symbol;

const INDENT: isize = 2;

pub struct Context {}

impl Context {
    pub fn new() -> Context {
        Context {}
    }

    fn ident(&self, name: Symbol) -> RcDoc<'static> {
        RcDoc::text(name.resolve().to_owned())
    }

    fn keyword(&self, keyword: &'static str) -> RcDoc<'static> {
        RcDoc::text(keyword)
    }

    /// An s-expression that is laid out on one line if it fits, and with
    /// each element on its own line otherwise.
    pub fn sexpr(&self, docs: impl IntoIterator<Item = RcDoc<'static>>) -> RcDoc<'static> {
        RcDoc::concat([
            RcDoc::text("("),
            RcDoc::intersperse(docs, RcDoc::line()).nest(INDENT),
            RcDoc::text(")"),
        ])
        .group()
    }

    fn form<'a>(
        &self,
        keyword: &'static str,
        terms: impl IntoIterator<Item = &'a Term>,
    ) -> RcDoc<'static> {
        let terms = terms.into_iter().map(|term| self.term(term));
        self.sexpr(std::iter::once(self.keyword(keyword)).chain(terms))
    }

    pub fn term(&self, term: &Term) -> RcDoc<'static> {
        match term {
            Term::Var(name) => self.ident(*name),
            Term::The(r#type, expr) => self.form("the", [r#type.as_ref(), expr.as_ref()]),
            Term::Hole(_, _) => self.keyword("TODO"),

            Term::Universe => self.keyword("U"),

            Term::Nat => self.keyword("Nat"),
            Term::Zero => self.keyword("0"),
            Term::Add1(_) | Term::Numeral(_) => match term.peel_add1s() {
                (number, Term::Zero) => RcDoc::text(number.to_string()),
                (count, pred) => (0..count).fold(self.term(pred), |doc, _| {
                    self.sexpr([self.keyword("add1"), doc])
                }),
            },
            Term::WhichNat(target, base_type, base, step) => {
                self.base_elim("which-Nat", target, base_type, base, step)
            }
            Term::IterNat(target, base_type, base, step) => {
                self.base_elim("iter-Nat", target, base_type, base, step)
            }
            Term::RecNat(target, base_type, base, step) => {
                self.base_elim("rec-Nat", target, base_type, base, step)
            }
            Term::IndNat(target, motive, base, step) => {
                self.form("ind-Nat", [target.as_ref(), motive.as_ref(), base.as_ref(), step.as_ref()])
            }

            Term::Pi(_, _, _) => self.pi(term),
            Term::Lambda(_, _) => {
                let mut names = Vec::new();
                let mut body = term;
                while let Term::Lambda(name, next_body) = body {
                    names.push(self.ident(*name));
                    body = next_body;
                }
                self.sexpr([self.keyword("λ"), self.sexpr(names), self.term(body)])
            }
            Term::App(_, _) => {
                let mut args = Vec::new();
                let mut head = term;
                while let Term::App(next_head, arg) = head {
                    args.push(arg.as_ref());
                    head = next_head;
                }
                let docs = std::iter::once(head).chain(args.into_iter().rev());
                self.sexpr(docs.map(|term| self.term(term)))
            }

            Term::Sigma(_, _, _) => self.sigma(term),
            Term::Cons(car, cdr) => self.form("cons", [car.as_ref(), cdr.as_ref()]),
            Term::Car(pair) => self.form("car", [pair.as_ref()]),
            Term::Cdr(pair) => self.form("cdr", [pair.as_ref()]),

            Term::Atom => self.keyword("Atom"),
            Term::Quote(symbol) => RcDoc::text(format!("'{symbol}")),

            Term::Trivial => self.keyword("Trivial"),
            Term::Sole => self.keyword("sole"),

            Term::List(elem_type) => self.form("List", [elem_type.as_ref()]),
            Term::Nil => self.keyword("nil"),
            Term::ListCons(head, tail) => self.form("::", [head.as_ref(), tail.as_ref()]),
            Term::RecList(target, base_type, base, step) => {
                self.base_elim("rec-List", target, base_type, base, step)
            }
            Term::IndList(target, motive, base, step) => {
                self.form("ind-List", [target.as_ref(), motive.as_ref(), base.as_ref(), step.as_ref()])
            }

            Term::Absurd => self.keyword("Absurd"),
            Term::IndAbsurd(target, motive) => self.form("ind-Absurd", [target.as_ref(), motive.as_ref()]),

            Term::Equal(r#type, from, to) => self.form("=", [r#type.as_ref(), from.as_ref(), to.as_ref()]),
            Term::Same(expr) => self.form("same", [expr.as_ref()]),
            Term::Replace(target, motive, base) => {
                self.form("replace", [target.as_ref(), motive.as_ref(), base.as_ref()])
            }
            Term::Trans(left, right) => self.form("trans", [left.as_ref(), right.as_ref()]),
            Term::Cong(target, _, function) => self.form("cong", [target.as_ref(), function.as_ref()]),
            Term::Symm(target) => self.form("symm", [target.as_ref()]),
            Term::IndEqual(target, motive, base) => {
                self.form("ind-=", [target.as_ref(), motive.as_ref(), base.as_ref()])
            }

            Term::Vec(elem_type, len) => self.form("Vec", [elem_type.as_ref(), len.as_ref()]),
            Term::VecNil => self.keyword("vecnil"),
            Term::VecCons(head, tail) => self.form("vec::", [head.as_ref(), tail.as_ref()]),
            Term::Head(target) => self.form("head", [target.as_ref()]),
            Term::Tail(target) => self.form("tail", [target.as_ref()]),
            Term::IndVec(len, target, motive, base, step) => {
                self.form("ind-Vec", [len.as_ref(), target.as_ref(), motive.as_ref(), base.as_ref(), step.as_ref()])
            }

            Term::Either(left_type, right_type) => {
                self.form("Either", [left_type.as_ref(), right_type.as_ref()])
            }
            Term::Left(expr) => self.form("left", [expr.as_ref()]),
            Term::Right(expr) => self.form("right", [expr.as_ref()]),
            Term::IndEither(target, motive, base_left, base_right) => {
                self.form("ind-Either", [target.as_ref(), motive.as_ref(), base_left.as_ref(), base_right.as_ref()])
            }

            Term::TypeConstructor(name, params, indices) => {
                self.applied(*name, params.iter().chain(indices))
            }
            Term::Constructor(app) => self.applied(app.name, app.params.iter().chain(&app.args)),
            Term::Eliminator(datatype, target, motive, methods) => {
                let args = [target.as_ref(), motive.as_ref()].into_iter().chain(methods);
                self.applied(datatype.eliminator_name(), args)
            }
        }
    }

    /// A name applied to arguments, or the bare name if there are none.
    fn applied<'a>(&self, name: Symbol, args: impl Iterator<Item = &'a Term>) -> RcDoc<'static> {
        let mut args = args.peekable();
        match args.peek() {
            None => self.ident(name),
            Some(_) => {
                let args = args.map(|arg| self.term(arg));
                self.sexpr(std::iter::once(self.ident(name)).chain(args))
            }
        }
    }

    /// Eliminators that record the type of their base, printed with the base
    /// annotated so that they can be read back in.
    fn base_elim(
        &self,
        keyword: &'static str,
        target: &Term,
        base_type: &Term,
        base: &Term,
        step: &Term,
    ) -> RcDoc<'static> {
        self.sexpr([
            self.keyword(keyword),
            self.term(target),
            self.form("the", [base_type, base]),
            self.term(step),
        ])
    }

    fn pi(&self, term: &Term) -> RcDoc<'static> {
        match term {
            Term::Pi(name, _, body_type) if !body_type.mentions(*name) => {
                let mut arg_types = Vec::new();
                let mut body_type = term;
                while let Term::Pi(name, arg_type, next_body_type) = body_type {
                    if next_body_type.mentions(*name) {
                        break;
                    }
                    arg_types.push(self.term(arg_type));
                    body_type = next_body_type;
                }
                let docs = std::iter::once(self.keyword("→")).chain(arg_types);
                self.sexpr(docs.chain([self.term(body_type)]))
            }
            _ => {
                let mut binders = Vec::new();
                let mut body_type = term;
                while let Term::Pi(name, arg_type, next_body_type) = body_type {
                    if !next_body_type.mentions(*name) {
                        break;
                    }
                    binders.push(self.sexpr([self.ident(*name), self.term(arg_type)]));
                    body_type = next_body_type;
                }
                self.sexpr([self.keyword("Π"), self.sexpr(binders), self.term(body_type)])
            }
        }
    }

    fn sigma(&self, term: &Term) -> RcDoc<'static> {
        match term {
            Term::Sigma(name, car_type, cdr_type) if !cdr_type.mentions(*name) => {
                self.form("Pair", [car_type.as_ref(), cdr_type.as_ref()])
            }
            _ => {
                let mut binders = Vec::new();
                let mut cdr_type = term;
                while let Term::Sigma(name, car_type, next_cdr_type) = cdr_type {
                    if !next_cdr_type.mentions(*name) {
                        break;
                    }
                    binders.push(self.sexpr([self.ident(*name), self.term(car_type)]));
                    cdr_type = next_cdr_type;
                }
                self.sexpr([self.keyword("Σ"), self.sexpr(binders), self.term(cdr_type)])
            }
        }
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = f.width().unwrap_or(80);
        write!(f, "{}", Context::new().term(self).pretty(width))
    }
}
