//! [Alpha-equivalence](https://ncatlab.org/nlab/show/alpha-equivalence) of
//! core terms.
//!
//! Bound variables are compared by the depth of the binder that introduced
//! them, and free variables by name.

use crate::core::Term;
use crate::symbol::Symbol;

/// Returns `true` if the two terms are equal up to the names of their bound
/// variables.
pub fn alpha_equiv(term0: &Term, term1: &Term) -> bool {
    AlphaContext::default().equiv(term0, term1)
}

#[derive(Default)]
struct AlphaContext {
    binders0: Vec<Symbol>,
    binders1: Vec<Symbol>,
}

impl AlphaContext {
    fn bind<T>(&mut self, name0: Symbol, name1: Symbol, f: impl FnOnce(&mut Self) -> T) -> T {
        self.binders0.push(name0);
        self.binders1.push(name1);
        let result = f(self);
        self.binders0.pop();
        self.binders1.pop();
        result
    }

    fn var_equiv(&self, name0: Symbol, name1: Symbol) -> bool {
        let level0 = self.binders0.iter().rposition(|name| *name == name0);
        let level1 = self.binders1.iter().rposition(|name| *name == name1);
        match (level0, level1) {
            (Some(level0), Some(level1)) => level0 == level1,
            (None, None) => name0 == name1,
            _ => false,
        }
    }

    fn all_equiv(&mut self, terms0: &[Term], terms1: &[Term]) -> bool {
        terms0.len() == terms1.len()
            && Iterator::zip(terms0.iter(), terms1).all(|(term0, term1)| self.equiv(term0, term1))
    }

    fn equiv(&mut self, term0: &Term, term1: &Term) -> bool {
        match (term0, term1) {
            (Term::Var(name0), Term::Var(name1)) => self.var_equiv(*name0, *name1),

            // Any two proofs of `Absurd` are the same.
            (Term::The(type0, _), Term::The(type1, _))
                if matches!((type0.as_ref(), type1.as_ref()), (Term::Absurd, Term::Absurd)) =>
            {
                true
            }
            (Term::The(type0, expr0), Term::The(type1, expr1)) => {
                self.equiv(type0, type1) && self.equiv(expr0, expr1)
            }
            (Term::Hole(location0, type0), Term::Hole(location1, type1)) => {
                location0 == location1 && self.equiv(type0, type1)
            }

            (
                Term::Zero | Term::Add1(_) | Term::Numeral(_),
                Term::Zero | Term::Add1(_) | Term::Numeral(_),
            ) => {
                let (count0, term0) = term0.peel_add1s();
                let (count1, term1) = term1.peel_add1s();
                count0 == count1
                    && match (term0, term1) {
                        (Term::Zero, Term::Zero) => true,
                        (Term::Zero, _) | (_, Term::Zero) => false,
                        (term0, term1) => self.equiv(term0, term1),
                    }
            }

            (Term::Universe, Term::Universe)
            | (Term::Nat, Term::Nat)
            | (Term::Atom, Term::Atom)
            | (Term::Trivial, Term::Trivial)
            | (Term::Sole, Term::Sole)
            | (Term::Nil, Term::Nil)
            | (Term::Absurd, Term::Absurd)
            | (Term::VecNil, Term::VecNil) => true,

            (Term::Quote(symbol0), Term::Quote(symbol1)) => symbol0 == symbol1,

            (Term::Car(term0), Term::Car(term1))
            | (Term::Cdr(term0), Term::Cdr(term1))
            | (Term::List(term0), Term::List(term1))
            | (Term::Same(term0), Term::Same(term1))
            | (Term::Symm(term0), Term::Symm(term1))
            | (Term::Head(term0), Term::Head(term1))
            | (Term::Tail(term0), Term::Tail(term1))
            | (Term::Left(term0), Term::Left(term1))
            | (Term::Right(term0), Term::Right(term1)) => self.equiv(term0, term1),

            (Term::Pi(name0, arg_type0, body_type0), Term::Pi(name1, arg_type1, body_type1))
            | (
                Term::Sigma(name0, arg_type0, body_type0),
                Term::Sigma(name1, arg_type1, body_type1),
            ) => {
                self.equiv(arg_type0, arg_type1)
                    && self.bind(*name0, *name1, |this| this.equiv(body_type0, body_type1))
            }
            (Term::Lambda(name0, body0), Term::Lambda(name1, body1)) => {
                self.bind(*name0, *name1, |this| this.equiv(body0, body1))
            }

            (Term::App(head0, arg0), Term::App(head1, arg1))
            | (Term::Cons(head0, arg0), Term::Cons(head1, arg1))
            | (Term::ListCons(head0, arg0), Term::ListCons(head1, arg1))
            | (Term::IndAbsurd(head0, arg0), Term::IndAbsurd(head1, arg1))
            | (Term::Trans(head0, arg0), Term::Trans(head1, arg1))
            | (Term::Vec(head0, arg0), Term::Vec(head1, arg1))
            | (Term::VecCons(head0, arg0), Term::VecCons(head1, arg1))
            | (Term::Either(head0, arg0), Term::Either(head1, arg1)) => {
                self.equiv(head0, head1) && self.equiv(arg0, arg1)
            }

            (Term::Equal(a0, b0, c0), Term::Equal(a1, b1, c1))
            | (Term::Replace(a0, b0, c0), Term::Replace(a1, b1, c1))
            | (Term::Cong(a0, b0, c0), Term::Cong(a1, b1, c1))
            | (Term::IndEqual(a0, b0, c0), Term::IndEqual(a1, b1, c1)) => {
                self.equiv(a0, a1) && self.equiv(b0, b1) && self.equiv(c0, c1)
            }

            (Term::WhichNat(a0, b0, c0, d0), Term::WhichNat(a1, b1, c1, d1))
            | (Term::IterNat(a0, b0, c0, d0), Term::IterNat(a1, b1, c1, d1))
            | (Term::RecNat(a0, b0, c0, d0), Term::RecNat(a1, b1, c1, d1))
            | (Term::IndNat(a0, b0, c0, d0), Term::IndNat(a1, b1, c1, d1))
            | (Term::RecList(a0, b0, c0, d0), Term::RecList(a1, b1, c1, d1))
            | (Term::IndList(a0, b0, c0, d0), Term::IndList(a1, b1, c1, d1))
            | (Term::IndEither(a0, b0, c0, d0), Term::IndEither(a1, b1, c1, d1)) => {
                self.equiv(a0, a1) && self.equiv(b0, b1) && self.equiv(c0, c1) && self.equiv(d0, d1)
            }

            (Term::IndVec(a0, b0, c0, d0, e0), Term::IndVec(a1, b1, c1, d1, e1)) => {
                self.equiv(a0, a1)
                    && self.equiv(b0, b1)
                    && self.equiv(c0, c1)
                    && self.equiv(d0, d1)
                    && self.equiv(e0, e1)
            }

            (
                Term::TypeConstructor(name0, params0, indices0),
                Term::TypeConstructor(name1, params1, indices1),
            ) => {
                name0 == name1 && self.all_equiv(params0, params1) && self.all_equiv(indices0, indices1)
            }
            (Term::Constructor(app0), Term::Constructor(app1)) => {
                app0.name == app1.name
                    && app0.type_name == app1.type_name
                    && self.all_equiv(&app0.params, &app1.params)
                    && self.all_equiv(&app0.args, &app1.args)
            }
            (
                Term::Eliminator(datatype0, target0, motive0, methods0),
                Term::Eliminator(datatype1, target1, motive1, methods1),
            ) => {
                datatype0.name == datatype1.name
                    && self.equiv(target0, target1)
                    && self.equiv(motive0, motive1)
                    && self.all_equiv(methods0, methods1)
            }

            (_, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn var(name: &str) -> Arc<Term> {
        Arc::new(Term::Var(Symbol::intern(name)))
    }

    fn identity(name: &str) -> Term {
        Term::Lambda(Symbol::intern(name), var(name))
    }

    #[test]
    fn bound_names_do_not_matter() {
        assert!(alpha_equiv(&identity("x"), &identity("y")));
    }

    #[test]
    fn free_names_do() {
        assert!(!alpha_equiv(&Term::Var(Symbol::intern("x")), &Term::Var(Symbol::intern("y"))));
    }

    #[test]
    fn bound_and_free_occurrences_differ() {
        // (λ (x) y) and (λ (y) y)
        let term0 = Term::Lambda(Symbol::intern("x"), var("y"));
        let term1 = identity("y");
        assert!(!alpha_equiv(&term0, &term1));
    }

    #[test]
    fn binders_are_compared_by_depth() {
        // (λ (x) (λ (y) x)) and (λ (y) (λ (x) y))
        let term0 = Term::Lambda(Symbol::intern("x"), Arc::new(Term::Lambda(Symbol::intern("y"), var("x"))));
        let term1 = Term::Lambda(Symbol::intern("y"), Arc::new(Term::Lambda(Symbol::intern("x"), var("y"))));
        let term2 = Term::Lambda(Symbol::intern("x"), Arc::new(Term::Lambda(Symbol::intern("y"), var("y"))));

        assert!(alpha_equiv(&term0, &term1));
        assert!(!alpha_equiv(&term0, &term2));
    }

    #[test]
    fn absurd_annotations_are_all_equal() {
        let term0 = Term::The(Arc::new(Term::Absurd), var("a"));
        let term1 = Term::The(Arc::new(Term::Absurd), var("b"));
        assert!(alpha_equiv(&term0, &term1));
    }

    #[test]
    fn numerals_match_add1_chains() {
        let two = Term::Add1(Arc::new(Term::Add1(Arc::new(Term::Zero))));
        assert!(alpha_equiv(&Term::nat(2), &two));
        assert!(alpha_equiv(&Term::nat(0), &Term::Zero));
        assert!(!alpha_equiv(&Term::nat(3), &two));

        let n_plus_one = Term::Add1(var("n"));
        assert!(!alpha_equiv(&Term::nat(1), &n_plus_one));
        assert!(alpha_equiv(&n_plus_one, &Term::Add1(var("n"))));
    }

    #[test]
    fn large_numerals() {
        let million = Term::nat(1_000_000);
        assert!(alpha_equiv(&million, &Term::add1s(999_999, Term::nat(1))));
        assert!(alpha_equiv(&million, &Term::Add1(Arc::new(Term::nat(999_999)))));
        assert!(!alpha_equiv(&million, &Term::nat(999_999)));
    }
}
