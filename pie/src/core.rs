//! Core language.
//!
//! Terms in the core language are the result of elaborating the surface
//! language. They are fully explicit: every binder introduces exactly one
//! name, eliminators that need it record the type of their base case, and
//! the names bound by elaboration are fresh with respect to the context they
//! were elaborated in.

use std::sync::Arc;

use crate::source::Location;
use crate::symbol::Symbol;

pub mod alpha;
pub mod datatype;
pub mod pretty;
pub mod semantics;

pub use datatype::Datatype;

static ZERO: Term = Term::Zero;

/// Core language terms.
#[derive(Debug, Clone)]
pub enum Term {
    /// Variable occurrences.
    Var(Symbol),
    /// Annotated expressions.
    The(Arc<Term>, Arc<Term>),
    /// Unfilled holes, along with the type they were expected to have.
    Hole(Location, Arc<Term>),

    /// The universe of small types.
    Universe,

    /// Natural number type.
    Nat,
    Zero,
    Add1(Arc<Term>),
    /// Natural number literals, standing for that many `add1`s around `zero`.
    Numeral(u64),
    /// `which-Nat` eliminations: target, base type, base, step.
    WhichNat(Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>),
    /// `iter-Nat` eliminations: target, base type, base, step.
    IterNat(Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>),
    /// `rec-Nat` eliminations: target, base type, base, step.
    RecNat(Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>),
    /// `ind-Nat` eliminations: target, motive, base, step.
    IndNat(Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>),

    /// Dependent function types.
    Pi(Symbol, Arc<Term>, Arc<Term>),
    /// Function introductions.
    Lambda(Symbol, Arc<Term>),
    /// Function eliminations.
    App(Arc<Term>, Arc<Term>),

    /// Dependent pair types.
    Sigma(Symbol, Arc<Term>, Arc<Term>),
    Cons(Arc<Term>, Arc<Term>),
    Car(Arc<Term>),
    Cdr(Arc<Term>),

    Atom,
    /// Quoted atoms.
    Quote(Symbol),

    Trivial,
    Sole,

    List(Arc<Term>),
    Nil,
    ListCons(Arc<Term>, Arc<Term>),
    /// `rec-List` eliminations: target, base type, base, step.
    RecList(Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>),
    /// `ind-List` eliminations: target, motive, base, step.
    IndList(Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>),

    Absurd,
    /// `ind-Absurd` eliminations: target, motive.
    IndAbsurd(Arc<Term>, Arc<Term>),

    /// Equality types: type, from, to.
    Equal(Arc<Term>, Arc<Term>, Arc<Term>),
    Same(Arc<Term>),
    /// `replace` eliminations: target, motive, base.
    Replace(Arc<Term>, Arc<Term>, Arc<Term>),
    Trans(Arc<Term>, Arc<Term>),
    /// `cong` eliminations: target, result type, function.
    Cong(Arc<Term>, Arc<Term>, Arc<Term>),
    Symm(Arc<Term>),
    /// `ind-=` eliminations: target, motive, base.
    IndEqual(Arc<Term>, Arc<Term>, Arc<Term>),

    /// Length-indexed vectors: element type, length.
    Vec(Arc<Term>, Arc<Term>),
    VecNil,
    VecCons(Arc<Term>, Arc<Term>),
    Head(Arc<Term>),
    Tail(Arc<Term>),
    /// `ind-Vec` eliminations: length, target, motive, base, step.
    IndVec(Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>),

    Either(Arc<Term>, Arc<Term>),
    Left(Arc<Term>),
    Right(Arc<Term>),
    /// `ind-Either` eliminations: target, motive, left base, right base.
    IndEither(Arc<Term>, Arc<Term>, Arc<Term>, Arc<Term>),

    /// A user datatype applied to its parameters and indices.
    TypeConstructor(Symbol, Vec<Term>, Vec<Term>),
    /// A constructor of a user datatype, applied to the parameters of the
    /// datatype and to the constructor's arguments (in declaration order).
    Constructor(ConstructorApp),
    /// The eliminator of a user datatype.
    Eliminator(Arc<Datatype>, Arc<Term>, Arc<Term>, Vec<Term>),
}

/// A fully applied constructor.
#[derive(Debug, Clone)]
pub struct ConstructorApp {
    pub name: Symbol,
    pub type_name: Symbol,
    /// Position of the constructor in the datatype declaration.
    pub index: usize,
    pub params: Vec<Term>,
    pub args: Vec<Term>,
}

impl Term {
    pub fn var(name: Symbol) -> Term {
        Term::Var(name)
    }

    /// The numeral `number`.
    pub fn nat(number: u64) -> Term {
        Term::Numeral(number)
    }

    /// Wrap a term in `count` applications of `add1`.
    pub fn add1s(count: u64, term: Term) -> Term {
        match (count, term) {
            (count, Term::Zero) => Term::Numeral(count),
            (count, Term::Numeral(number)) => Term::Numeral(number.saturating_add(count)),
            (count, term) => (0..count).fold(term, |term, _| Term::Add1(Arc::new(term))),
        }
    }

    /// Split off the `add1`s at the head of the term, returning how many
    /// there were and the term underneath them. Numerals are counted in
    /// full, leaving `zero` underneath.
    pub fn peel_add1s(&self) -> (u64, &Term) {
        let mut term = self;
        let mut count = 0u64;
        loop {
            match term {
                Term::Add1(pred) => {
                    count = count.saturating_add(1);
                    term = pred;
                }
                Term::Numeral(number) => return (count.saturating_add(*number), &ZERO),
                _ => return (count, term),
            }
        }
    }

    /// If this is a numeral, return the number it denotes.
    pub fn as_nat(&self) -> Option<u64> {
        match self.peel_add1s() {
            (number, Term::Zero) => Some(number),
            _ => None,
        }
    }

    /// Returns `true` if `name` occurs anywhere in the term.
    ///
    /// Elaboration and read-back only ever bind fresh names, so this is a
    /// reliable free-variable check for names bound in the current context.
    pub fn mentions(&self, name: Symbol) -> bool {
        self.any(&mut |term| matches!(term, Term::Var(var) if *var == name))
    }

    /// Returns `true` if the datatype `name` occurs anywhere in the term.
    pub fn mentions_datatype(&self, name: Symbol) -> bool {
        self.any(&mut |term| match term {
            Term::TypeConstructor(type_name, _, _) => *type_name == name,
            Term::Constructor(app) => app.type_name == name,
            Term::Eliminator(datatype, _, _, _) => datatype.name == name,
            _ => false,
        })
    }

    fn any(&self, predicate: &mut impl FnMut(&Term) -> bool) -> bool {
        // `add1` chains can be as long as a numeral.
        let mut term = self;
        loop {
            if predicate(term) {
                return true;
            }
            match term {
                Term::Add1(pred) => term = pred,
                _ => break,
            }
        }

        match term {
            Term::Var(_)
            | Term::Universe
            | Term::Nat
            | Term::Zero
            | Term::Add1(_)
            | Term::Numeral(_)
            | Term::Atom
            | Term::Quote(_)
            | Term::Trivial
            | Term::Sole
            | Term::Nil
            | Term::Absurd
            | Term::VecNil => false,

            Term::Lambda(_, term)
            | Term::Car(term)
            | Term::Cdr(term)
            | Term::List(term)
            | Term::Same(term)
            | Term::Symm(term)
            | Term::Head(term)
            | Term::Tail(term)
            | Term::Left(term)
            | Term::Right(term)
            | Term::Hole(_, term) => term.any(predicate),

            Term::The(term0, term1)
            | Term::Pi(_, term0, term1)
            | Term::App(term0, term1)
            | Term::Sigma(_, term0, term1)
            | Term::Cons(term0, term1)
            | Term::ListCons(term0, term1)
            | Term::IndAbsurd(term0, term1)
            | Term::Trans(term0, term1)
            | Term::Vec(term0, term1)
            | Term::VecCons(term0, term1)
            | Term::Either(term0, term1) => term0.any(predicate) || term1.any(predicate),

            Term::Equal(term0, term1, term2)
            | Term::Replace(term0, term1, term2)
            | Term::Cong(term0, term1, term2)
            | Term::IndEqual(term0, term1, term2) => {
                term0.any(predicate) || term1.any(predicate) || term2.any(predicate)
            }

            Term::WhichNat(term0, term1, term2, term3)
            | Term::IterNat(term0, term1, term2, term3)
            | Term::RecNat(term0, term1, term2, term3)
            | Term::IndNat(term0, term1, term2, term3)
            | Term::RecList(term0, term1, term2, term3)
            | Term::IndList(term0, term1, term2, term3)
            | Term::IndEither(term0, term1, term2, term3) => {
                term0.any(predicate)
                    || term1.any(predicate)
                    || term2.any(predicate)
                    || term3.any(predicate)
            }

            Term::IndVec(term0, term1, term2, term3, term4) => {
                [term0, term1, term2, term3, term4]
                    .into_iter()
                    .any(|term| term.any(predicate))
            }

            Term::TypeConstructor(_, params, indices) => {
                (params.iter().chain(indices)).any(|term| term.any(predicate))
            }
            Term::Constructor(app) => {
                (app.params.iter().chain(&app.args)).any(|term| term.any(predicate))
            }
            Term::Eliminator(_, target, motive, methods) => {
                target.any(predicate)
                    || motive.any(predicate)
                    || methods.iter().any(|method| method.any(predicate))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numerals() {
        assert_eq!(Term::nat(0).as_nat(), Some(0));
        assert_eq!(Term::nat(4).as_nat(), Some(4));
        assert_eq!(Term::Add1(Arc::new(Term::var(Symbol::intern("n")))).as_nat(), None);
        assert_eq!(Term::Add1(Arc::new(Term::nat(4))).as_nat(), Some(5));
    }

    #[test]
    fn add1s_stay_compact_around_numerals() {
        assert!(matches!(Term::add1s(3, Term::Zero), Term::Numeral(3)));
        assert!(matches!(Term::add1s(3, Term::nat(2)), Term::Numeral(5)));

        let n = Symbol::intern("n");
        let term = Term::add1s(2, Term::Var(n));
        match term.peel_add1s() {
            (2, Term::Var(var)) => assert_eq!(*var, n),
            (count, term) => panic!("expected two `add1`s around `n`, found {count} around {term:?}"),
        }
    }

    #[test]
    fn mentions_looks_under_binders() {
        let x = Symbol::intern("x");
        let y = Symbol::intern("y");
        let term = Term::Lambda(y, Arc::new(Term::App(Arc::new(Term::Var(x)), Arc::new(Term::Var(y)))));

        assert!(term.mentions(x));
        assert!(!term.mentions(Symbol::intern("z")));
    }
}
