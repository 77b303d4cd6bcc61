//! Elaboration of the surface language into the core language.
//!
//! This module is where user-facing type checking happens, along with
//! translating the convenient surface language into a simpler, more explicit
//! core language.
//!
//! The algorithm is structured _bidirectionally_, ie. divided into _checking_
//! and _synthesis_ modes. Introduction forms like `λ`, `cons` and `same` are
//! only ever checked, and eliminators synthesize their types from the types
//! of their targets. Types are compared by reading their values back into
//! normal forms, and comparing those up to alpha-equivalence.
//!
//! ## Resources
//!
//! - [The Little Typer](https://thelittletyper.com/)
//! - [Bidirectional Typing Rules: A Tutorial](https://davidchristiansen.dk/tutorials/bidirectional.pdf)
//! - [Checking Dependent Types with Normalization by Evaluation: A Tutorial](https://davidchristiansen.dk/tutorials/nbe/)

use std::sync::Arc;

use crate::context::{Binder, Context, ContextEntry, Renaming};
use crate::core::datatype::{self, Binding, Datatype};
use crate::core::semantics::{self, do_app, do_car, now, ArcValue, Env, EvalContext, Value};
use crate::core::{self, ConstructorApp};
use crate::source::{FileRange, Location};
use crate::surface::{Item, Name, Term};
use crate::symbol::Symbol;

mod declaration;
pub mod reporting;

pub use reporting::Message;

fn universe() -> ArcValue {
    Arc::new(Value::Universe)
}

fn nat() -> ArcValue {
    Arc::new(Value::Nat)
}

/// Bind a variable of the given type, choosing a name that does not
/// conflict with anything in the context.
fn bind(
    context: &Context,
    renaming: &Renaming,
    (_, name): Name,
    r#type: ArcValue,
) -> (Context, Renaming, Symbol) {
    let fresh = context.fresh(name);
    (
        context.bind_free(fresh, r#type),
        renaming.extend(name, fresh),
        fresh,
    )
}

/// Split an application into its head and its arguments.
fn spine<'a, 'arena>(mut term: &'a Term<'arena>) -> (&'a Term<'arena>, Vec<&'a Term<'arena>>) {
    let mut args = Vec::new();
    while let Term::App(_, head, arg) = term {
        args.push(*arg);
        term = *head;
    }
    args.reverse();
    (term, args)
}

/// Atoms consist of letters and hyphens.
fn is_valid_atom(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.chars().all(|c| c.is_alphabetic() || c == '-')
}

fn pretty_type(context: &Context, r#type: &ArcValue) -> String {
    context.read_back_type(r#type).to_string()
}

fn pretty_value(context: &Context, r#type: &ArcValue, value: &ArcValue) -> String {
    context.read_back(r#type, value).to_string()
}

/// The result of synthesizing the type of a term.
#[derive(Debug, Clone)]
pub struct Synth {
    pub r#type: ArcValue,
    pub term: core::Term,
}

/// An unfilled hole, along with what was known about it.
#[derive(Debug, Clone)]
pub struct Hole {
    pub range: FileRange,
    /// The type the hole was expected to have.
    pub r#type: core::Term,
    /// The context the hole appeared in.
    pub context: Vec<ContextEntry>,
}

/// The type of a node in the source, for reporting back to the user.
#[derive(Debug, Clone)]
pub struct Info {
    pub range: FileRange,
    pub r#type: core::Term,
}

/// The outcome of processing a top-level item.
#[derive(Debug, Clone)]
pub enum ItemResult {
    /// The item added to the context.
    Context(Context),
    /// The item was checked, leaving the context as it was.
    Checked,
    /// An expression, normalized along with its type.
    Normalized { r#type: core::Term, expr: core::Term },
}

/// Whether the components of a type may themselves be types that are not
/// in the universe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Size {
    Large,
    Small,
}

/// Elaboration state.
///
/// Contexts and renamings are passed explicitly, as they change as binders
/// are entered. The elaborator itself only collects the holes and type
/// information found along the way.
#[derive(Debug, Default)]
pub struct Elaborator {
    holes: Vec<Hole>,
    infos: Vec<Info>,
    report_infos: bool,
}

impl Elaborator {
    pub fn new() -> Elaborator {
        Elaborator::default()
    }

    /// Record the type of every synthesized node whose location is marked
    /// for information.
    pub fn set_report_infos(&mut self, report_infos: bool) {
        self.report_infos = report_infos;
    }

    pub fn take_holes(&mut self) -> Vec<Hole> {
        std::mem::take(&mut self.holes)
    }

    pub fn take_infos(&mut self) -> Vec<Info> {
        std::mem::take(&mut self.infos)
    }

    /// Run an elaboration step, discarding any holes and information it
    /// recorded if it fails.
    fn speculate<T>(
        &mut self,
        step: impl FnOnce(&mut Elaborator) -> Result<T, Message>,
    ) -> Result<T, Message> {
        let (holes_len, infos_len) = (self.holes.len(), self.infos.len());
        let result = step(self);
        if result.is_err() {
            self.holes.truncate(holes_len);
            self.infos.truncate(infos_len);
        }
        result
    }

    fn record_info(&mut self, context: &Context, location: Location, r#type: &ArcValue) {
        if self.report_infos && location.for_info() {
            let r#type = context.read_back_type(r#type);
            self.infos.push(Info {
                range: location.range(),
                r#type,
            });
        }
    }

    /// Synthesize the type of a term.
    pub fn elaborate(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
    ) -> Result<Synth, Message> {
        self.speculate(|this| this.synth(context, renaming, term))
    }

    /// Check a term against an expected type.
    pub fn elaborate_check(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
        expected: &ArcValue,
    ) -> Result<core::Term, Message> {
        self.speculate(|this| this.check(context, renaming, term, expected))
    }

    /// Check that a term is a type.
    pub fn elaborate_type(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
    ) -> Result<core::Term, Message> {
        self.speculate(|this| this.is_type(context, renaming, term))
    }

    /// Elaborate a type, and return its normal form.
    pub fn normalize(&mut self, context: &Context, term: &Term<'_>) -> Result<core::Term, Message> {
        let r#type = self.elaborate_type(context, &Renaming::new(), term)?;
        Ok(context.read_back_type(&context.eval(&r#type)))
    }

    /// Elaborate an expression, and return the normal forms of its type and
    /// of the expression itself.
    pub fn normalize_term(
        &mut self,
        context: &Context,
        term: &Term<'_>,
    ) -> Result<(core::Term, core::Term), Message> {
        let synth = self.elaborate(context, &Renaming::new(), term)?;
        let value = context.eval(&synth.term);
        Ok((
            context.read_back_type(&synth.r#type),
            context.read_back(&synth.r#type, &value),
        ))
    }

    /// Process a top-level item.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn process_item(
        &mut self,
        context: &Context,
        item: &Item<'_>,
    ) -> Result<ItemResult, Message> {
        match item {
            Item::Claim(_, name, r#type) => {
                Ok(ItemResult::Context(self.claim(context, *name, r#type)?))
            }
            Item::Define(_, name, expr) => {
                Ok(ItemResult::Context(self.define(context, *name, expr)?))
            }
            Item::CheckSame(location, r#type, expr0, expr1) => {
                self.check_same(context, *location, r#type, expr0, expr1)?;
                Ok(ItemResult::Checked)
            }
            Item::Data(declaration) => {
                let context = self.declare_datatype(context, &Renaming::new(), declaration)?;
                Ok(ItemResult::Context(context))
            }
            Item::Term(term) => {
                let (r#type, expr) = self.normalize_term(context, term)?;
                Ok(ItemResult::Normalized { r#type, expr })
            }
        }
    }

    /// `(claim name type)`
    pub fn claim(
        &mut self,
        context: &Context,
        (location, name): Name,
        r#type: &Term<'_>,
    ) -> Result<Context, Message> {
        if context.contains(name) {
            let range = location.range();
            return Err(Message::AlreadyBound { range, name });
        }

        let r#type = self.elaborate_type(context, &Renaming::new(), r#type)?;
        tracing::debug!(%name, "claimed");
        Ok(context.claim(name, context.eval(&r#type)))
    }

    /// `(define name expr)`
    pub fn define(
        &mut self,
        context: &Context,
        (location, name): Name,
        expr: &Term<'_>,
    ) -> Result<Context, Message> {
        let range = location.range();
        let r#type = match context.lookup(name) {
            Some(Binder::Claim(r#type)) => r#type.clone(),
            Some(Binder::Define(_, _)) => return Err(Message::AlreadyDefined { range, name }),
            Some(_) => return Err(Message::AlreadyBound { range, name }),
            None => return Err(Message::DefineWithoutClaim { range, name }),
        };

        let expr = self.elaborate_check(context, &Renaming::new(), expr, &r#type)?;
        let value = context.eval(&expr);
        tracing::debug!(%name, "defined");
        Ok(context.define(name, r#type, value))
    }

    /// `(check-same type expr0 expr1)`
    pub fn check_same(
        &mut self,
        context: &Context,
        location: Location,
        r#type: &Term<'_>,
        expr0: &Term<'_>,
        expr1: &Term<'_>,
    ) -> Result<(), Message> {
        let renaming = Renaming::new();
        self.speculate(|this| {
            let r#type = this.is_type(context, &renaming, r#type)?;
            let r#type = context.eval(&r#type);
            let expr0 = this.check(context, &renaming, expr0, &r#type)?;
            let expr1 = this.check(context, &renaming, expr1, &r#type)?;

            let (value0, value1) = (context.eval(&expr0), context.eval(&expr1));
            expect_same(context, location.range(), &r#type, &value0, &value1)
        })
    }

    /// Check that a term is a type, returning its elaborated form.
    pub fn is_type(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
    ) -> Result<core::Term, Message> {
        self.elaborate_type_former(context, renaming, term, Size::Large)
    }

    /// Elaborate a type former structurally. Anything else is checked
    /// against the universe.
    fn elaborate_type_former(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
        size: Size,
    ) -> Result<core::Term, Message> {
        let arc = Arc::new;

        match term {
            Term::Universe(_) if size == Size::Large => Ok(core::Term::Universe),
            Term::Nat(_) => Ok(core::Term::Nat),
            Term::Atom(_) => Ok(core::Term::Atom),
            Term::Trivial(_) => Ok(core::Term::Trivial),
            Term::Absurd(_) => Ok(core::Term::Absurd),

            Term::Arrow(_, arg_type, body_type) => {
                let arg_type = self.elaborate_type_former(context, renaming, arg_type, size)?;
                let name = context.fresh(Symbol::intern_static("x"));
                let body_type = self.elaborate_type_former(context, renaming, body_type, size)?;
                Ok(core::Term::Pi(name, arc(arg_type), arc(body_type)))
            }
            Term::Pi(_, name, arg_type, body_type) => {
                let arg_type = self.elaborate_type_former(context, renaming, arg_type, size)?;
                let arg_type_value = context.eval(&arg_type);
                let (context, renaming, name) = bind(context, renaming, *name, arg_type_value);
                let body_type = self.elaborate_type_former(&context, &renaming, body_type, size)?;
                Ok(core::Term::Pi(name, arc(arg_type), arc(body_type)))
            }

            Term::Pair(_, car_type, cdr_type) => {
                let car_type = self.elaborate_type_former(context, renaming, car_type, size)?;
                let name = context.fresh(Symbol::intern_static("x"));
                let cdr_type = self.elaborate_type_former(context, renaming, cdr_type, size)?;
                Ok(core::Term::Sigma(name, arc(car_type), arc(cdr_type)))
            }
            Term::Sigma(_, name, car_type, cdr_type) => {
                let car_type = self.elaborate_type_former(context, renaming, car_type, size)?;
                let car_type_value = context.eval(&car_type);
                let (context, renaming, name) = bind(context, renaming, *name, car_type_value);
                let cdr_type = self.elaborate_type_former(&context, &renaming, cdr_type, size)?;
                Ok(core::Term::Sigma(name, arc(car_type), arc(cdr_type)))
            }

            Term::List(_, elem_type) => {
                let elem_type = self.elaborate_type_former(context, renaming, elem_type, size)?;
                Ok(core::Term::List(arc(elem_type)))
            }
            Term::Vec(_, elem_type, len) => {
                let elem_type = self.elaborate_type_former(context, renaming, elem_type, size)?;
                let len = self.check(context, renaming, len, &nat())?;
                Ok(core::Term::Vec(arc(elem_type), arc(len)))
            }
            Term::Either(_, left_type, right_type) => {
                let left_type = self.elaborate_type_former(context, renaming, left_type, size)?;
                let right_type = self.elaborate_type_former(context, renaming, right_type, size)?;
                Ok(core::Term::Either(arc(left_type), arc(right_type)))
            }
            Term::Equal(_, r#type, from, to) => {
                let r#type = self.elaborate_type_former(context, renaming, r#type, size)?;
                let type_value = context.eval(&r#type);
                let from = self.check(context, renaming, from, &type_value)?;
                let to = self.check(context, renaming, to, &type_value)?;
                Ok(core::Term::Equal(arc(r#type), arc(from), arc(to)))
            }

            _ => self.check(context, renaming, term, &universe()),
        }
    }

    /// Check a term against an expected type.
    pub fn check(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
        expected: &ArcValue,
    ) -> Result<core::Term, Message> {
        let arc = Arc::new;
        let expected = now(expected);

        let term_core = match (term, expected.as_ref()) {
            (Term::Lambda(_, name, body), Value::Pi(_, arg_type, body_type)) => {
                let (context, renaming, name) = bind(context, renaming, *name, arg_type.clone());
                let body_type = body_type.apply(Value::var(arg_type.clone(), name));
                let body = self.check(&context, &renaming, body, &body_type)?;
                core::Term::Lambda(name, arc(body))
            }
            (Term::Lambda(location, _, _), _) => {
                return Err(unexpected_intro(context, *location, "λ", "Π", &expected));
            }

            (Term::Cons(_, car, cdr), Value::Sigma(_, car_type, cdr_type)) => {
                let car = self.check(context, renaming, car, car_type)?;
                let cdr_type = cdr_type.apply(context.eval(&car));
                let cdr = self.check(context, renaming, cdr, &cdr_type)?;
                core::Term::Cons(arc(car), arc(cdr))
            }
            (Term::Cons(location, _, _), _) => {
                return Err(unexpected_intro(context, *location, "cons", "Σ", &expected));
            }

            (Term::Nil(_), Value::List(_)) => core::Term::Nil,
            (Term::Nil(location), _) => {
                return Err(unexpected_intro(context, *location, "nil", "List", &expected));
            }
            (Term::ListCons(_, head, tail), Value::List(elem_type)) => {
                let head = self.check(context, renaming, head, elem_type)?;
                let tail = self.check(context, renaming, tail, &expected)?;
                core::Term::ListCons(arc(head), arc(tail))
            }

            (Term::Same(location, expr), Value::Equal(r#type, from, to)) => {
                let expr = self.check(context, renaming, expr, r#type)?;
                let value = context.eval(&expr);
                expect_same(context, location.range(), r#type, from, &value)?;
                expect_same(context, location.range(), r#type, &value, to)?;
                core::Term::Same(arc(expr))
            }
            (Term::Same(location, _), _) => {
                return Err(unexpected_intro(context, *location, "same", "=", &expected));
            }

            (Term::VecNil(location), Value::Vec(_, len)) => match now(len).as_ref() {
                Value::Zero => core::Term::VecNil,
                _ => {
                    return Err(Message::MismatchedLength {
                        range: location.range(),
                        form: "vecnil",
                        expected_len: "zero",
                        found_len: pretty_value(context, &nat(), len),
                    })
                }
            },
            (Term::VecNil(location), _) => {
                return Err(unexpected_intro(context, *location, "vecnil", "Vec", &expected));
            }
            (Term::VecCons(location, head, tail), Value::Vec(elem_type, len)) => {
                match now(len).as_ref() {
                    Value::Add1(pred) => {
                        let tail_type = Arc::new(Value::Vec(elem_type.clone(), pred.clone()));
                        let head = self.check(context, renaming, head, elem_type)?;
                        let tail = self.check(context, renaming, tail, &tail_type)?;
                        core::Term::VecCons(arc(head), arc(tail))
                    }
                    _ => {
                        return Err(Message::MismatchedLength {
                            range: location.range(),
                            form: "vec::",
                            expected_len: "(add1 n)",
                            found_len: pretty_value(context, &nat(), len),
                        })
                    }
                }
            }
            (Term::VecCons(location, _, _), _) => {
                return Err(unexpected_intro(context, *location, "vec::", "Vec", &expected));
            }

            (Term::Left(_, expr), Value::Either(left_type, _)) => {
                core::Term::Left(arc(self.check(context, renaming, expr, left_type)?))
            }
            (Term::Left(location, _), _) => {
                return Err(unexpected_intro(context, *location, "left", "Either", &expected));
            }
            (Term::Right(_, expr), Value::Either(_, right_type)) => {
                core::Term::Right(arc(self.check(context, renaming, expr, right_type)?))
            }
            (Term::Right(location, _), _) => {
                return Err(unexpected_intro(context, *location, "right", "Either", &expected));
            }

            (Term::Hole(location), _) => {
                let r#type = context.read_back_type(&expected);
                self.holes.push(Hole {
                    range: location.range(),
                    r#type: r#type.clone(),
                    context: context.read_back_context(),
                });
                core::Term::Hole(*location, arc(r#type))
            }

            (_, _) => {
                let synth = self.synth(context, renaming, term)?;
                if !context.same_type(&expected, &synth.r#type) {
                    return Err(Message::MismatchedTypes {
                        range: term.range(),
                        expected_type: pretty_type(context, &expected),
                        found_type: pretty_type(context, &synth.r#type),
                    });
                }
                return Ok(synth.term);
            }
        };

        self.record_info(context, term.location(), &expected);
        Ok(term_core)
    }

    /// Synthesize the type of a term.
    pub fn synth(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
    ) -> Result<Synth, Message> {
        let synth = self.synth_term(context, renaming, term)?;
        self.record_info(context, term.location(), &synth.r#type);
        Ok(synth)
    }

    fn synth_term(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
    ) -> Result<Synth, Message> {
        let arc = Arc::new;
        let cannot_synth = |location: &Location, form| Message::CannotSynth {
            range: location.range(),
            form,
        };

        match term {
            Term::Name(location, name) => self.synth_name(context, renaming, *location, *name),
            Term::Hole(location) => Err(cannot_synth(location, "TODO")),
            Term::NumberLiteral(location, number) => {
                let range = location.range();
                let number = number.resolve();
                if number.starts_with('-') {
                    return Err(Message::NegativeNumeral { range });
                }
                match number.parse::<u64>() {
                    Ok(number) => Ok(Synth {
                        r#type: nat(),
                        term: core::Term::nat(number),
                    }),
                    Err(error) => Err(Message::InvalidNumeral {
                        range,
                        message: error.to_string(),
                    }),
                }
            }
            Term::The(_, r#type, expr) => {
                let r#type = self.is_type(context, renaming, r#type)?;
                let type_value = context.eval(&r#type);
                let expr = self.check(context, renaming, expr, &type_value)?;
                Ok(Synth {
                    r#type: type_value,
                    term: core::Term::The(arc(r#type), arc(expr)),
                })
            }

            Term::Universe(location) => Err(Message::UniverseHasNoType {
                range: location.range(),
            }),
            Term::Nat(_)
            | Term::Atom(_)
            | Term::Trivial(_)
            | Term::Absurd(_)
            | Term::Arrow(_, _, _)
            | Term::Pi(_, _, _, _)
            | Term::Pair(_, _, _)
            | Term::Sigma(_, _, _, _)
            | Term::List(_, _)
            | Term::Vec(_, _, _)
            | Term::Either(_, _, _)
            | Term::Equal(_, _, _, _) => Ok(Synth {
                r#type: universe(),
                term: self.elaborate_type_former(context, renaming, term, Size::Small)?,
            }),

            Term::Zero(_) => Ok(Synth {
                r#type: nat(),
                term: core::Term::Zero,
            }),
            Term::Add1(_, pred) => {
                let pred = self.check(context, renaming, pred, &nat())?;
                Ok(Synth {
                    r#type: nat(),
                    term: core::Term::Add1(arc(pred)),
                })
            }
            Term::WhichNat(_, target, base, step) => self.synth_nat_elim(
                context,
                renaming,
                [target, base, step],
                semantics::which_nat_step_type,
                core::Term::WhichNat,
            ),
            Term::IterNat(_, target, base, step) => self.synth_nat_elim(
                context,
                renaming,
                [target, base, step],
                semantics::iter_nat_step_type,
                core::Term::IterNat,
            ),
            Term::RecNat(_, target, base, step) => self.synth_nat_elim(
                context,
                renaming,
                [target, base, step],
                semantics::rec_nat_step_type,
                core::Term::RecNat,
            ),
            Term::IndNat(_, target, motive, base, step) => {
                let target = self.check(context, renaming, target, &nat())?;
                let motive = self.check(context, renaming, motive, &semantics::ind_nat_motive_type())?;
                let motive_value = context.eval(&motive);
                let base_type = do_app(&motive_value, &Arc::new(Value::Zero));
                let base = self.check(context, renaming, base, &base_type)?;
                let step_type = semantics::ind_nat_step_type(&motive_value);
                let step = self.check(context, renaming, step, &step_type)?;

                Ok(Synth {
                    r#type: do_app(&motive_value, &context.eval(&target)),
                    term: core::Term::IndNat(arc(target), arc(motive), arc(base), arc(step)),
                })
            }

            Term::Lambda(location, _, _) => Err(cannot_synth(location, "λ")),
            Term::App(_, head, arg) => self.synth_app(context, renaming, term, head, arg),

            Term::Cons(location, _, _) => Err(cannot_synth(location, "cons")),
            Term::Car(_, pair) => {
                let synth = self.synth(context, renaming, pair)?;
                match now(&synth.r#type).as_ref() {
                    Value::Sigma(_, car_type, _) => Ok(Synth {
                        r#type: car_type.clone(),
                        term: core::Term::Car(arc(synth.term)),
                    }),
                    _ => Err(unexpected_type(context, pair.range(), "Σ", &synth.r#type)),
                }
            }
            Term::Cdr(_, pair) => {
                let synth = self.synth(context, renaming, pair)?;
                match now(&synth.r#type).as_ref() {
                    Value::Sigma(_, _, cdr_type) => {
                        let car = do_car(&context.eval(&synth.term));
                        Ok(Synth {
                            r#type: cdr_type.apply(car),
                            term: core::Term::Cdr(arc(synth.term)),
                        })
                    }
                    _ => Err(unexpected_type(context, pair.range(), "Σ", &synth.r#type)),
                }
            }

            Term::Quote(location, symbol) => match is_valid_atom(symbol.resolve()) {
                true => Ok(Synth {
                    r#type: Arc::new(Value::Atom),
                    term: core::Term::Quote(*symbol),
                }),
                false => Err(Message::InvalidAtom {
                    range: location.range(),
                    symbol: *symbol,
                }),
            },
            Term::Sole(_) => Ok(Synth {
                r#type: Arc::new(Value::Trivial),
                term: core::Term::Sole,
            }),

            Term::Nil(location) => Err(cannot_synth(location, "nil")),
            Term::ListCons(_, head, tail) => {
                let head = self.synth(context, renaming, head)?;
                let list_type = Arc::new(Value::List(head.r#type));
                let tail = self.check(context, renaming, tail, &list_type)?;
                Ok(Synth {
                    r#type: list_type,
                    term: core::Term::ListCons(arc(head.term), arc(tail)),
                })
            }
            Term::RecList(_, target, base, step) => {
                let (target, elem_type) = self.synth_list(context, renaming, target)?;
                let base = self.synth(context, renaming, base)?;
                let step_type = semantics::rec_list_step_type(&elem_type, &base.r#type);
                let step = self.check(context, renaming, step, &step_type)?;
                let base_type = context.read_back_type(&base.r#type);

                Ok(Synth {
                    r#type: base.r#type,
                    term: core::Term::RecList(arc(target), arc(base_type), arc(base.term), arc(step)),
                })
            }
            Term::IndList(_, target, motive, base, step) => {
                let (target, elem_type) = self.synth_list(context, renaming, target)?;
                let motive_type = semantics::ind_list_motive_type(&elem_type);
                let motive = self.check(context, renaming, motive, &motive_type)?;
                let motive_value = context.eval(&motive);
                let base_type = do_app(&motive_value, &Arc::new(Value::Nil));
                let base = self.check(context, renaming, base, &base_type)?;
                let step_type = semantics::ind_list_step_type(&elem_type, &motive_value);
                let step = self.check(context, renaming, step, &step_type)?;

                Ok(Synth {
                    r#type: do_app(&motive_value, &context.eval(&target)),
                    term: core::Term::IndList(arc(target), arc(motive), arc(base), arc(step)),
                })
            }

            Term::IndAbsurd(_, target, motive) => {
                let target = self.check(context, renaming, target, &Arc::new(Value::Absurd))?;
                let motive = self.check(context, renaming, motive, &universe())?;
                Ok(Synth {
                    r#type: context.eval(&motive),
                    term: core::Term::IndAbsurd(arc(target), arc(motive)),
                })
            }

            Term::Same(location, _) => Err(cannot_synth(location, "same")),
            Term::Replace(_, target, motive, base) => {
                let (target, r#type, from, to) = self.synth_equal(context, renaming, target)?;
                let motive_type = semantics::replace_motive_type(&r#type);
                let motive = self.check(context, renaming, motive, &motive_type)?;
                let motive_value = context.eval(&motive);
                let base = self.check(context, renaming, base, &do_app(&motive_value, &from))?;

                Ok(Synth {
                    r#type: do_app(&motive_value, &to),
                    term: core::Term::Replace(arc(target), arc(motive), arc(base)),
                })
            }
            Term::Trans(location, left, right) => {
                let (left_term, left_type, from, left_to) =
                    self.synth_equal(context, renaming, left)?;
                let (right_term, right_type, right_from, to) =
                    self.synth_equal(context, renaming, right)?;
                if !context.same_type(&left_type, &right_type) {
                    return Err(Message::MismatchedTypes {
                        range: right.range(),
                        expected_type: pretty_type(context, &left_type),
                        found_type: pretty_type(context, &right_type),
                    });
                }
                expect_same(context, location.range(), &left_type, &left_to, &right_from)?;

                Ok(Synth {
                    r#type: Arc::new(Value::Equal(left_type, from, to)),
                    term: core::Term::Trans(arc(left_term), arc(right_term)),
                })
            }
            Term::Cong(_, target, function) => {
                self.synth_cong(context, renaming, target, function)
            }
            Term::Symm(_, target) => {
                let (target, r#type, from, to) = self.synth_equal(context, renaming, target)?;
                Ok(Synth {
                    r#type: Arc::new(Value::Equal(r#type, to, from)),
                    term: core::Term::Symm(arc(target)),
                })
            }
            Term::IndEqual(_, target, motive, base) => {
                let (target, r#type, from, to) = self.synth_equal(context, renaming, target)?;
                let motive_type = semantics::ind_equal_motive_type(&r#type, &from);
                let motive = self.check(context, renaming, motive, &motive_type)?;
                let motive_value = context.eval(&motive);
                let base_type = do_app(
                    &do_app(&motive_value, &from),
                    &Arc::new(Value::Same(from.clone())),
                );
                let base = self.check(context, renaming, base, &base_type)?;

                Ok(Synth {
                    r#type: do_app(&do_app(&motive_value, &to), &context.eval(&target)),
                    term: core::Term::IndEqual(arc(target), arc(motive), arc(base)),
                })
            }

            Term::VecNil(location) => Err(cannot_synth(location, "vecnil")),
            Term::VecCons(location, _, _) => Err(cannot_synth(location, "vec::")),
            Term::Head(location, target) => {
                let (target, elem_type, len) = self.synth_vec(context, renaming, target)?;
                match now(&len).as_ref() {
                    Value::Add1(_) => Ok(Synth {
                        r#type: elem_type,
                        term: core::Term::Head(arc(target)),
                    }),
                    _ => Err(Message::MismatchedLength {
                        range: location.range(),
                        form: "head",
                        expected_len: "(add1 n)",
                        found_len: pretty_value(context, &nat(), &len),
                    }),
                }
            }
            Term::Tail(location, target) => {
                let (target, elem_type, len) = self.synth_vec(context, renaming, target)?;
                match now(&len).as_ref() {
                    Value::Add1(pred) => Ok(Synth {
                        r#type: Arc::new(Value::Vec(elem_type, pred.clone())),
                        term: core::Term::Tail(arc(target)),
                    }),
                    _ => Err(Message::MismatchedLength {
                        range: location.range(),
                        form: "tail",
                        expected_len: "(add1 n)",
                        found_len: pretty_value(context, &nat(), &len),
                    }),
                }
            }
            Term::IndVec(_, len, target, motive, base, step) => {
                let len = self.check(context, renaming, len, &nat())?;
                let len_value = context.eval(&len);
                let target_range = target.range();
                let (target, elem_type, target_len) = self.synth_vec(context, renaming, target)?;
                expect_same(context, target_range, &nat(), &len_value, &target_len)?;

                let motive_type = semantics::ind_vec_motive_type(&elem_type);
                let motive = self.check(context, renaming, motive, &motive_type)?;
                let motive_value = context.eval(&motive);
                let base_type = do_app(
                    &do_app(&motive_value, &Arc::new(Value::Zero)),
                    &Arc::new(Value::VecNil),
                );
                let base = self.check(context, renaming, base, &base_type)?;
                let step_type = semantics::ind_vec_step_type(&elem_type, &motive_value);
                let step = self.check(context, renaming, step, &step_type)?;

                let r#type = do_app(&do_app(&motive_value, &len_value), &context.eval(&target));
                Ok(Synth {
                    r#type,
                    term: core::Term::IndVec(arc(len), arc(target), arc(motive), arc(base), arc(step)),
                })
            }

            Term::Left(location, _) => Err(cannot_synth(location, "left")),
            Term::Right(location, _) => Err(cannot_synth(location, "right")),
            Term::IndEither(_, target, motive, base_left, base_right) => {
                let (target, left_type, right_type) = self.synth_either(context, renaming, target)?;
                let motive_type = semantics::ind_either_motive_type(&left_type, &right_type);
                let motive = self.check(context, renaming, motive, &motive_type)?;
                let motive_value = context.eval(&motive);
                let left_base_type = semantics::ind_either_left_type(&left_type, &motive_value);
                let base_left = self.check(context, renaming, base_left, &left_base_type)?;
                let right_base_type = semantics::ind_either_right_type(&right_type, &motive_value);
                let base_right = self.check(context, renaming, base_right, &right_base_type)?;

                Ok(Synth {
                    r#type: do_app(&motive_value, &context.eval(&target)),
                    term: core::Term::IndEither(arc(target), arc(motive), arc(base_left), arc(base_right)),
                })
            }
        }
    }

    fn synth_name(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        location: Location,
        user_name: Symbol,
    ) -> Result<Synth, Message> {
        let range = location.range();
        let name = renaming.rename(user_name);

        match context.lookup(name) {
            Some(Binder::Free(r#type) | Binder::Define(r#type, _)) => Ok(Synth {
                r#type: r#type.clone(),
                term: core::Term::Var(name),
            }),
            Some(Binder::Claim(_)) => Err(Message::ClaimNotDefined {
                range,
                name: user_name,
            }),
            Some(Binder::Datatype(datatype) | Binder::Placeholder(datatype)) => {
                self.synth_type_constructor(context, renaming, range, datatype, &[])
            }
            Some(Binder::Constructor(datatype, index)) => {
                self.synth_constructor(context, renaming, range, datatype, *index, &[])
            }
            Some(Binder::Eliminator(datatype)) => {
                self.synth_eliminator(context, renaming, range, datatype, &[])
            }
            None => Err(Message::UnboundName {
                range,
                name: user_name,
                suggestion: reporting::suggest_name(
                    user_name,
                    context.binders().map(|(name, _)| name),
                ),
            }),
        }
    }

    fn synth_app(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        term: &Term<'_>,
        head: &Term<'_>,
        arg: &Term<'_>,
    ) -> Result<Synth, Message> {
        let range = term.range();

        // Datatypes, constructors and eliminators are applied to all of
        // their arguments at once.
        if let (Term::Name(_, name), args) = spine(term) {
            match context.lookup(renaming.rename(*name)) {
                Some(Binder::Datatype(datatype) | Binder::Placeholder(datatype)) => {
                    return self.synth_type_constructor(context, renaming, range, datatype, &args);
                }
                Some(Binder::Constructor(datatype, index)) => {
                    return self.synth_constructor(context, renaming, range, datatype, *index, &args);
                }
                Some(Binder::Eliminator(datatype)) => {
                    return self.synth_eliminator(context, renaming, range, datatype, &args);
                }
                Some(_) | None => {}
            }
        }

        let head_synth = self.synth(context, renaming, head)?;
        match now(&head_synth.r#type).as_ref() {
            Value::Pi(_, arg_type, body_type) => {
                let arg = self.check(context, renaming, arg, arg_type)?;
                let r#type = body_type.apply(context.eval(&arg));
                Ok(Synth {
                    r#type,
                    term: core::Term::App(Arc::new(head_synth.term), Arc::new(arg)),
                })
            }
            _ => Err(Message::UnexpectedArgument {
                head_range: head.range(),
                head_type: pretty_type(context, &head_synth.r#type),
                arg_range: arg.range(),
            }),
        }
    }

    /// Check a sequence of arguments against a telescope of bindings, adding
    /// the value of each argument to the environment as it is checked.
    fn check_telescope<'b>(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        env: &mut Env,
        bindings: impl Iterator<Item = &'b Binding>,
        args: &[&Term<'_>],
    ) -> Result<(Vec<core::Term>, Vec<ArcValue>), Message> {
        let mut terms = Vec::with_capacity(args.len());
        let mut values = Vec::with_capacity(args.len());

        for (binding, arg) in bindings.zip(args) {
            let r#type = EvalContext::new(env).eval(&binding.r#type);
            let term = self.check(context, renaming, arg, &r#type)?;
            let value = context.eval(&term);
            env.push(binding.name, value.clone());
            terms.push(term);
            values.push(value);
        }

        Ok((terms, values))
    }

    /// `(Name param ... index ...)`
    fn synth_type_constructor(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        range: FileRange,
        datatype: &Arc<Datatype>,
        args: &[&Term<'_>],
    ) -> Result<Synth, Message> {
        if args.len() != datatype.arity() {
            return Err(Message::TypeConstructorArity {
                range,
                name: datatype.name,
                expected: datatype.arity(),
                found: args.len(),
            });
        }

        let mut env = datatype.env.clone();
        let bindings = datatype.params.iter().chain(datatype.indices.iter());
        let (mut params, _) = self.check_telescope(context, renaming, &mut env, bindings, args)?;
        let indices = params.split_off(datatype.params.len());

        Ok(Synth {
            r#type: universe(),
            term: core::Term::TypeConstructor(datatype.name, params, indices),
        })
    }

    /// `(constructor param ... arg ...)`
    fn synth_constructor(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        range: FileRange,
        datatype: &Arc<Datatype>,
        index: usize,
        args: &[&Term<'_>],
    ) -> Result<Synth, Message> {
        let constructor = &datatype.constructors[index];
        let expected = datatype.params.len() + constructor.arity();
        if args.len() != expected {
            return Err(Message::ConstructorArity {
                range,
                name: constructor.name,
                expected,
                found: args.len(),
            });
        }

        let mut env = datatype.env.clone();
        let bindings = datatype.params.iter().chain(constructor.args.iter());
        let (mut params, mut values) =
            self.check_telescope(context, renaming, &mut env, bindings, args)?;
        let args = params.split_off(datatype.params.len());
        values.truncate(datatype.params.len());

        let indices = (constructor.result_indices.iter())
            .map(|index| EvalContext::new(&env).eval(index))
            .collect();

        Ok(Synth {
            r#type: Arc::new(Value::TypeConstructor(datatype.name, values, indices)),
            term: core::Term::Constructor(ConstructorApp {
                name: constructor.name,
                type_name: datatype.name,
                index,
                params,
                args,
            }),
        })
    }

    /// `(elim-Name target motive method ...)`
    fn synth_eliminator(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        range: FileRange,
        datatype: &Arc<Datatype>,
        args: &[&Term<'_>],
    ) -> Result<Synth, Message> {
        let (target, motive, methods) = match args {
            [target, motive, methods @ ..] if methods.len() == datatype.constructors.len() => {
                (*target, *motive, methods)
            }
            _ => {
                return Err(Message::EliminatorArity {
                    range,
                    name: datatype.eliminator_name(),
                    expected: 2 + datatype.constructors.len(),
                    found: args.len(),
                })
            }
        };

        let target_synth = self.synth(context, renaming, target)?;
        let (params, indices) = match now(&target_synth.r#type).as_ref() {
            Value::TypeConstructor(name, params, indices) if *name == datatype.name => {
                (params.clone(), indices.clone())
            }
            _ => {
                return Err(Message::UnexpectedTarget {
                    range: target.range(),
                    datatype: datatype.name,
                    found_type: pretty_type(context, &target_synth.r#type),
                })
            }
        };

        let motive_type = datatype::motive_type(datatype, &params);
        let motive = self.check(context, renaming, motive, &motive_type)?;
        let motive_value = context.eval(&motive);

        let methods = (methods.iter().enumerate())
            .map(|(index, method)| {
                let method_type = datatype::method_type(datatype, &params, &motive_value, index);
                self.check(context, renaming, method, &method_type)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let target_value = context.eval(&target_synth.term);
        Ok(Synth {
            r#type: datatype::apply_motive(&motive_value, &indices, &target_value),
            term: core::Term::Eliminator(
                datatype.clone(),
                Arc::new(target_synth.term),
                Arc::new(motive),
                methods,
            ),
        })
    }

    /// `(which-Nat target base step)` and friends, where the type of the
    /// base is synthesized.
    fn synth_nat_elim(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        [target, base, step]: [&Term<'_>; 3],
        step_type: fn(&ArcValue) -> ArcValue,
        make: fn(Arc<core::Term>, Arc<core::Term>, Arc<core::Term>, Arc<core::Term>) -> core::Term,
    ) -> Result<Synth, Message> {
        let target = self.check(context, renaming, target, &nat())?;
        let base = self.synth(context, renaming, base)?;
        let step = self.check(context, renaming, step, &step_type(&base.r#type))?;
        let base_type = context.read_back_type(&base.r#type);

        Ok(Synth {
            r#type: base.r#type,
            term: make(
                Arc::new(target),
                Arc::new(base_type),
                Arc::new(base.term),
                Arc::new(step),
            ),
        })
    }

    /// `(cong target function)`
    fn synth_cong(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        target: &Term<'_>,
        function: &Term<'_>,
    ) -> Result<Synth, Message> {
        let (target, r#type, from, to) = self.synth_equal(context, renaming, target)?;
        let function_range = function.range();
        let function = self.synth(context, renaming, function)?;

        let (arg_type, body_type) = match now(&function.r#type).as_ref() {
            Value::Pi(_, arg_type, body_type) => (arg_type.clone(), body_type.clone()),
            _ => return Err(unexpected_type(context, function_range, "Π", &function.r#type)),
        };
        if !context.same_type(&r#type, &arg_type) {
            return Err(Message::MismatchedTypes {
                range: function_range,
                expected_type: pretty_type(context, &r#type),
                found_type: pretty_type(context, &arg_type),
            });
        }

        // The result type must not depend on the argument.
        let var = context.fresh(Symbol::intern_static("x"));
        let result_type = context
            .bind_free(var, arg_type.clone())
            .read_back_type(&body_type.apply(Value::var(arg_type, var)));
        if result_type.mentions(var) {
            return Err(Message::DependentCong {
                range: function_range,
                function_type: pretty_type(context, &function.r#type),
            });
        }

        let result_type_value = context.eval(&result_type);
        let function_value = context.eval(&function.term);
        Ok(Synth {
            r#type: Arc::new(Value::Equal(
                result_type_value,
                do_app(&function_value, &from),
                do_app(&function_value, &to),
            )),
            term: core::Term::Cong(
                Arc::new(target),
                Arc::new(result_type),
                Arc::new(function.term),
            ),
        })
    }

    /// Synthesize the type of a target that should be an equality proof,
    /// returning the type and endpoints of the equality.
    fn synth_equal(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        target: &Term<'_>,
    ) -> Result<(core::Term, ArcValue, ArcValue, ArcValue), Message> {
        let synth = self.synth(context, renaming, target)?;
        match now(&synth.r#type).as_ref() {
            Value::Equal(r#type, from, to) => {
                Ok((synth.term, r#type.clone(), from.clone(), to.clone()))
            }
            _ => Err(unexpected_type(context, target.range(), "=", &synth.r#type)),
        }
    }

    fn synth_list(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        target: &Term<'_>,
    ) -> Result<(core::Term, ArcValue), Message> {
        let synth = self.synth(context, renaming, target)?;
        match now(&synth.r#type).as_ref() {
            Value::List(elem_type) => Ok((synth.term, elem_type.clone())),
            _ => Err(unexpected_type(context, target.range(), "List", &synth.r#type)),
        }
    }

    fn synth_vec(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        target: &Term<'_>,
    ) -> Result<(core::Term, ArcValue, ArcValue), Message> {
        let synth = self.synth(context, renaming, target)?;
        match now(&synth.r#type).as_ref() {
            Value::Vec(elem_type, len) => Ok((synth.term, elem_type.clone(), len.clone())),
            _ => Err(unexpected_type(context, target.range(), "Vec", &synth.r#type)),
        }
    }

    fn synth_either(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        target: &Term<'_>,
    ) -> Result<(core::Term, ArcValue, ArcValue), Message> {
        let synth = self.synth(context, renaming, target)?;
        match now(&synth.r#type).as_ref() {
            Value::Either(left_type, right_type) => {
                Ok((synth.term, left_type.clone(), right_type.clone()))
            }
            _ => Err(unexpected_type(context, target.range(), "Either", &synth.r#type)),
        }
    }
}

/// Require two values to be the same at the given type.
fn expect_same(
    context: &Context,
    range: FileRange,
    r#type: &ArcValue,
    value0: &ArcValue,
    value1: &ArcValue,
) -> Result<(), Message> {
    match context.convert(r#type, value0, value1) {
        true => Ok(()),
        false => Err(Message::NotTheSame {
            range,
            r#type: pretty_type(context, r#type),
            left: pretty_value(context, r#type, value0),
            right: pretty_value(context, r#type, value1),
        }),
    }
}

fn unexpected_intro(
    context: &Context,
    location: Location,
    form: &'static str,
    expected_former: &'static str,
    expected_type: &ArcValue,
) -> Message {
    Message::UnexpectedIntro {
        range: location.range(),
        form,
        expected_former,
        expected_type: pretty_type(context, expected_type),
    }
}

fn unexpected_type(
    context: &Context,
    range: FileRange,
    expected_former: &'static str,
    found_type: &ArcValue,
) -> Message {
    Message::UnexpectedType {
        range,
        expected_former,
        found_type: pretty_type(context, found_type),
    }
}

#[cfg(test)]
mod tests {
    use scoped_arena::Scope;

    use super::*;
    use crate::source::FileId;

    fn file_id() -> FileId {
        FileId::try_from(1).unwrap()
    }

    fn synth_str(context: &Context, source: &str) -> Result<Synth, Message> {
        let scope = Scope::new();
        let term = Term::parse(&scope, file_id(), source).unwrap();
        Elaborator::new().elaborate(context, &Renaming::new(), &term)
    }

    fn normalize_str(context: &Context, source: &str) -> String {
        let scope = Scope::new();
        let term = Term::parse(&scope, file_id(), source).unwrap();
        let (_, expr) = Elaborator::new().normalize_term(context, &term).unwrap();
        expr.to_string()
    }

    #[test]
    fn atoms() {
        assert!(is_valid_atom("pea"));
        assert!(is_valid_atom("ratatouille-soup"));
        assert!(!is_valid_atom("pea42"));
        assert!(!is_valid_atom(""));
    }

    #[test]
    fn numerals_are_nats() {
        let synth = synth_str(&Context::new(), "3").unwrap();
        assert!(matches!(synth.r#type.as_ref(), Value::Nat));
        assert_eq!(synth.term.as_nat(), Some(3));
    }

    #[test]
    fn negative_numerals_are_rejected() {
        let result = synth_str(&Context::new(), "-3");
        assert!(matches!(result, Err(Message::NegativeNumeral { .. })));
    }

    #[test]
    fn annotated_lambdas_synthesize() {
        let synth = synth_str(&Context::new(), "(the (-> Nat Nat) (λ (n) (add1 n)))").unwrap();
        assert!(matches!(now(&synth.r#type).as_ref(), Value::Pi(_, _, _)));
    }

    #[test]
    fn bare_lambdas_do_not_synthesize() {
        let result = synth_str(&Context::new(), "(λ (x) x)");
        assert!(matches!(result, Err(Message::CannotSynth { form: "λ", .. })));
    }

    #[test]
    fn universe_has_no_type() {
        let result = synth_str(&Context::new(), "U");
        assert!(matches!(result, Err(Message::UniverseHasNoType { .. })));
    }

    #[test]
    fn large_types_are_types() {
        let scope = Scope::new();
        let term = Term::parse(&scope, file_id(), "(Π ((A U)) (-> A A))").unwrap();
        let mut elaborator = Elaborator::new();
        assert!(elaborator.is_type(&Context::new(), &Renaming::new(), &term).is_ok());
        assert!(elaborator.synth(&Context::new(), &Renaming::new(), &term).is_err());
    }

    #[test]
    fn iter_nat_computes() {
        let source = "(iter-Nat 3 (the Nat 0) (λ (n) (add1 (add1 n))))";
        assert_eq!(normalize_str(&Context::new(), source), "6");
    }

    #[test]
    fn shadowed_binders_are_renamed() {
        let source = "(the (Π ((x Nat)) (Π ((x Nat)) Nat)) (λ (x x) x))";
        let synth = synth_str(&Context::new(), source).unwrap();
        match synth.term {
            core::Term::The(_, lambda) => match lambda.as_ref() {
                core::Term::Lambda(x0, body) => match body.as_ref() {
                    core::Term::Lambda(x1, body) => {
                        assert_ne!(x0, x1);
                        assert!(matches!(body.as_ref(), core::Term::Var(var) if var == x1));
                    }
                    body => panic!("expected a lambda, found {body:?}"),
                },
                term => panic!("expected a lambda, found {term:?}"),
            },
            term => panic!("expected an annotation, found {term:?}"),
        }
    }

    #[test]
    fn cong_rejects_dependent_functions() {
        let source = "(cong (the (= Nat 0 0) (same 0)) (the (Π ((n Nat)) (Vec Atom n)) (λ (n) TODO)))";
        let result = synth_str(&Context::new(), source);
        assert!(matches!(result, Err(Message::DependentCong { .. })));
    }

    #[test]
    fn failed_elaboration_discards_holes() {
        let scope = Scope::new();
        let term = Term::parse(&scope, file_id(), "(the (Pair Nat Atom) (cons TODO 'x1))").unwrap();
        let mut elaborator = Elaborator::new();
        let result = elaborator.elaborate(&Context::new(), &Renaming::new(), &term);
        assert!(matches!(result, Err(Message::InvalidAtom { .. })));
        assert!(elaborator.take_holes().is_empty());
    }

    #[test]
    fn holes_are_recorded() {
        let scope = Scope::new();
        let term = Term::parse(&scope, file_id(), "(the (-> Nat Atom) (λ (n) TODO))").unwrap();
        let mut elaborator = Elaborator::new();
        elaborator.elaborate(&Context::new(), &Renaming::new(), &term).unwrap();

        let holes = elaborator.take_holes();
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].r#type.to_string(), "Atom");
        assert_eq!(holes[0].context.len(), 1);
        assert_eq!(holes[0].context[0].to_string(), "(free n Nat)");
    }

    #[test]
    fn infos_are_recorded_for_source_nodes() {
        let scope = Scope::new();
        let term = Term::parse(&scope, file_id(), "(add1 zero)").unwrap();
        let mut elaborator = Elaborator::new();
        elaborator.set_report_infos(true);
        elaborator.elaborate(&Context::new(), &Renaming::new(), &term).unwrap();

        let infos = elaborator.take_infos();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|info| info.r#type.to_string() == "Nat"));
    }
}
