//! The operational semantics of the core language, implemented using
//! [normalisation by evaluation](https://en.wikipedia.org/wiki/Normalisation_by_evaluation).
//!
//! Core terms are evaluated into [values][Value], and values are read back
//! into core terms in normal form. Read-back is type directed, which is what
//! lets it perform the eta rules for functions, pairs and `Trivial`.

use std::fmt;
use std::panic::panic_any;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::context::Context;
use crate::core::alpha;
use crate::core::datatype::{self, Datatype};
use crate::core::{ConstructorApp, Term};
use crate::env::SharedEnv;
use crate::source::Location;
use crate::symbol::Symbol;

/// Atomically reference counted values. We use reference counting to
/// increase the amount of sharing we can achieve during evaluation.
pub type ArcValue = Arc<Value>;

/// Evaluation environments, mapping variables to their values.
pub type Env = SharedEnv<ArcValue>;

/// Values in weak-head normal form, or delayed computations that will produce
/// them.
#[derive(Debug, Clone)]
pub enum Value {
    Universe,

    Nat,
    Zero,
    Add1(ArcValue),

    Pi(Symbol, ArcValue, Closure),
    Lambda(Symbol, Closure),

    Sigma(Symbol, ArcValue, Closure),
    Cons(ArcValue, ArcValue),

    Atom,
    Quote(Symbol),

    Trivial,
    Sole,

    List(ArcValue),
    Nil,
    ListCons(ArcValue, ArcValue),

    Absurd,

    Equal(ArcValue, ArcValue, ArcValue),
    Same(ArcValue),

    Vec(ArcValue, ArcValue),
    VecNil,
    VecCons(ArcValue, ArcValue),

    Either(ArcValue, ArcValue),
    Left(ArcValue),
    Right(ArcValue),

    /// A user datatype applied to its parameters and indices.
    TypeConstructor(Symbol, Vec<ArcValue>, Vec<ArcValue>),
    Constructor(ConstructorValue),

    /// A computation that is stuck on a variable or a hole, along with its
    /// type.
    Neutral(ArcValue, Arc<Neutral>),
    /// A computation that has not been run yet. Use [`now`] to force it.
    Delay(Arc<Delayed>),
}

/// A fully applied constructor of a user datatype.
#[derive(Debug, Clone)]
pub struct ConstructorValue {
    pub name: Symbol,
    pub type_name: Symbol,
    pub index: usize,
    pub params: Vec<ArcValue>,
    /// Constructor arguments, in declaration order.
    pub args: Vec<ArcValue>,
}

impl Value {
    pub fn var(r#type: ArcValue, name: Symbol) -> ArcValue {
        Value::neutral(r#type, Neutral::Var(name))
    }

    pub fn neutral(r#type: ArcValue, neutral: Neutral) -> ArcValue {
        Arc::new(Value::Neutral(r#type, Arc::new(neutral)))
    }

    /// Construct a dependent function type whose body is computed directly
    /// from the argument.
    pub fn pi(
        name: Symbol,
        arg_type: ArcValue,
        body_type: impl Fn(ArcValue) -> ArcValue + Send + Sync + 'static,
    ) -> ArcValue {
        Arc::new(Value::Pi(name, arg_type, Closure::higher_order(body_type)))
    }

    /// Construct a non-dependent function type.
    pub fn arrow(name: Symbol, arg_type: ArcValue, body_type: ArcValue) -> ArcValue {
        Value::pi(name, arg_type, move |_| body_type.clone())
    }
}

/// Stuck computations.
#[derive(Debug, Clone)]
pub enum Neutral {
    Var(Symbol),
    /// An unfilled hole, with its expected type.
    Hole(Location, ArcValue),

    App(Arc<Neutral>, Normal),
    Car(Arc<Neutral>),
    Cdr(Arc<Neutral>),

    WhichNat(Arc<Neutral>, Normal, Normal),
    IterNat(Arc<Neutral>, Normal, Normal),
    RecNat(Arc<Neutral>, Normal, Normal),
    IndNat(Arc<Neutral>, Normal, Normal, Normal),

    RecList(Arc<Neutral>, Normal, Normal),
    IndList(Arc<Neutral>, Normal, Normal, Normal),

    IndAbsurd(Arc<Neutral>, Normal),

    Replace(Arc<Neutral>, Normal, Normal),
    Trans1(Arc<Neutral>, Normal),
    Trans2(Normal, Arc<Neutral>),
    Trans12(Arc<Neutral>, Arc<Neutral>),
    /// Stuck `cong`: target, result type, function.
    Cong(Arc<Neutral>, ArcValue, Normal),
    Symm(Arc<Neutral>),
    IndEqual(Arc<Neutral>, Normal, Normal),

    Head(Arc<Neutral>),
    Tail(Arc<Neutral>),
    /// Stuck `ind-Vec` where both the length and the target are stuck.
    IndVec12(Arc<Neutral>, Arc<Neutral>, Normal, Normal, Normal),
    /// Stuck `ind-Vec` where only the target is stuck.
    IndVec2(Normal, Arc<Neutral>, Normal, Normal, Normal),

    IndEither(Arc<Neutral>, Normal, Normal, Normal),

    Eliminator(Arc<Datatype>, Arc<Neutral>, Normal, Vec<Normal>),
}

/// A value paired with its type, so that it can be read back.
#[derive(Debug, Clone)]
pub struct Normal {
    pub r#type: ArcValue,
    pub value: ArcValue,
}

impl Normal {
    pub fn new(r#type: ArcValue, value: ArcValue) -> Normal {
        Normal { r#type, value }
    }
}

/// The body of a binder, waiting for an argument.
#[derive(Clone)]
pub enum Closure {
    /// A core term, along with the environment it was found in.
    FirstOrder {
        env: Env,
        name: Symbol,
        body: Arc<Term>,
    },
    /// A function on values. Used for types that are computed by the
    /// type checker rather than written by the user.
    HigherOrder(Arc<dyn Fn(ArcValue) -> ArcValue + Send + Sync>),
}

impl Closure {
    pub fn new(env: Env, name: Symbol, body: Arc<Term>) -> Closure {
        Closure::FirstOrder { env, name, body }
    }

    pub fn higher_order(body: impl Fn(ArcValue) -> ArcValue + Send + Sync + 'static) -> Closure {
        Closure::HigherOrder(Arc::new(body))
    }

    /// Instantiate the closure with an argument.
    pub fn apply(&self, arg: ArcValue) -> ArcValue {
        match self {
            Closure::FirstOrder { env, name, body } => {
                EvalContext::new(&env.extend(*name, arg)).eval(body)
            }
            Closure::HigherOrder(body) => body(arg),
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Closure::FirstOrder { env, name, body } => f
                .debug_struct("FirstOrder")
                .field("env", env)
                .field("name", name)
                .field("body", body)
                .finish(),
            Closure::HigherOrder(_) => f.write_str("HigherOrder(..)"),
        }
    }
}

/// A core term that will be evaluated the first time it is needed.
pub struct Delayed {
    env: Env,
    term: Arc<Term>,
    value: OnceCell<ArcValue>,
}

impl Delayed {
    pub fn new(env: Env, term: Arc<Term>) -> Delayed {
        Delayed {
            env,
            term,
            value: OnceCell::new(),
        }
    }

    /// Evaluate the term, or return the result of a previous evaluation.
    pub fn force(&self) -> ArcValue {
        // Not cached, so forcing a long numeral doesn't retain every
        // predecessor along the way.
        if let Term::Numeral(number) = self.term.as_ref() {
            return numeral(*number);
        }
        (self.value)
            .get_or_init(|| EvalContext::new(&self.env).eval(&self.term))
            .clone()
    }

    pub fn is_forced(&self) -> bool {
        self.value.get().is_some()
    }
}

impl fmt::Debug for Delayed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Delayed").field(value).finish(),
            None => f.debug_tuple("Delayed").field(&self.term).finish(),
        }
    }
}

/// Force delayed computations until the head of the value is known.
pub fn now(value: &ArcValue) -> ArcValue {
    let mut value = value.clone();
    while let Value::Delay(delayed) = value.as_ref() {
        let forced = delayed.force();
        value = forced;
    }
    value
}

/// Internal errors encountered during evaluation. These indicate a bug in
/// the type checker, and are raised with [`std::panic::panic_any`].
#[derive(Clone, Debug)]
pub enum Error {
    UnboundVariable(Symbol),
    InvalidApplication,
    InvalidCar,
    InvalidCdr,
    InvalidNatElim,
    InvalidListElim,
    InvalidAbsurdElim,
    InvalidEqualElim,
    InvalidVecElim,
    InvalidEitherElim,
    InvalidDatatypeElim,
    InvalidReadBack,
    NotAType,
    MissingDatatype(Symbol),
}

impl Error {
    pub fn description(&self) -> &str {
        match &self {
            Error::UnboundVariable(_) => "unbound variable",
            Error::InvalidApplication => "invalid application",
            Error::InvalidCar => "invalid car",
            Error::InvalidCdr => "invalid cdr",
            Error::InvalidNatElim => "invalid Nat elimination",
            Error::InvalidListElim => "invalid List elimination",
            Error::InvalidAbsurdElim => "invalid Absurd elimination",
            Error::InvalidEqualElim => "invalid equality elimination",
            Error::InvalidVecElim => "invalid Vec elimination",
            Error::InvalidEitherElim => "invalid Either elimination",
            Error::InvalidDatatypeElim => "invalid datatype elimination",
            Error::InvalidReadBack => "value does not match the type it was read back at",
            Error::NotAType => "expected a type",
            Error::MissingDatatype(_) => "datatype not found in context",
        }
    }
}

fn name(name: &'static str) -> Symbol {
    Symbol::intern_static(name)
}

fn value(value: Value) -> ArcValue {
    Arc::new(value)
}

/// The value of a numeral. The predecessor is only unfolded when it is
/// forced.
fn numeral(number: u64) -> ArcValue {
    match number.checked_sub(1) {
        None => value(Value::Zero),
        Some(pred) => {
            let delayed = Delayed::new(Env::new(), Arc::new(Term::Numeral(pred)));
            value(Value::Add1(value(Value::Delay(Arc::new(delayed)))))
        }
    }
}

/// Evaluation of core terms into values.
pub struct EvalContext<'env> {
    env: &'env Env,
}

impl<'env> EvalContext<'env> {
    pub fn new(env: &'env Env) -> EvalContext<'env> {
        EvalContext { env }
    }

    fn delay(&self, term: &Arc<Term>) -> ArcValue {
        let delayed = Delayed::new(self.env.clone(), term.clone());
        value(Value::Delay(Arc::new(delayed)))
    }

    fn closure(&self, name: Symbol, body: &Arc<Term>) -> Closure {
        Closure::new(self.env.clone(), name, body.clone())
    }

    fn eval_all(&self, terms: &[Term]) -> Vec<ArcValue> {
        terms.iter().map(|term| self.eval(term)).collect()
    }

    /// Evaluate a term into a value.
    pub fn eval(&self, term: &Term) -> ArcValue {
        match term {
            Term::Var(name) => match self.env.get(*name) {
                Some(value) => value.clone(),
                None => panic_any(Error::UnboundVariable(*name)),
            },
            Term::The(_, expr) => self.eval(expr),
            Term::Hole(location, r#type) => {
                let r#type = self.eval(r#type);
                Value::neutral(r#type.clone(), Neutral::Hole(*location, r#type))
            }

            Term::Universe => value(Value::Universe),

            Term::Nat => value(Value::Nat),
            Term::Zero => value(Value::Zero),
            Term::Add1(pred) => value(Value::Add1(self.delay(pred))),
            Term::Numeral(number) => numeral(*number),
            Term::WhichNat(target, base_type, base, step) => do_which_nat(
                &self.eval(target),
                &self.eval(base_type),
                &self.eval(base),
                &self.eval(step),
            ),
            Term::IterNat(target, base_type, base, step) => do_iter_nat(
                &self.eval(target),
                &self.eval(base_type),
                &self.eval(base),
                &self.eval(step),
            ),
            Term::RecNat(target, base_type, base, step) => do_rec_nat(
                &self.eval(target),
                &self.eval(base_type),
                &self.eval(base),
                &self.eval(step),
            ),
            Term::IndNat(target, motive, base, step) => do_ind_nat(
                &self.eval(target),
                &self.eval(motive),
                &self.eval(base),
                &self.eval(step),
            ),

            Term::Pi(name, arg_type, body_type) => value(Value::Pi(
                *name,
                self.eval(arg_type),
                self.closure(*name, body_type),
            )),
            Term::Lambda(name, body) => value(Value::Lambda(*name, self.closure(*name, body))),
            Term::App(head, arg) => do_app(&self.eval(head), &self.eval(arg)),

            Term::Sigma(name, car_type, cdr_type) => value(Value::Sigma(
                *name,
                self.eval(car_type),
                self.closure(*name, cdr_type),
            )),
            Term::Cons(car, cdr) => value(Value::Cons(self.eval(car), self.eval(cdr))),
            Term::Car(pair) => do_car(&self.eval(pair)),
            Term::Cdr(pair) => do_cdr(&self.eval(pair)),

            Term::Atom => value(Value::Atom),
            Term::Quote(symbol) => value(Value::Quote(*symbol)),

            Term::Trivial => value(Value::Trivial),
            Term::Sole => value(Value::Sole),

            Term::List(elem_type) => value(Value::List(self.eval(elem_type))),
            Term::Nil => value(Value::Nil),
            Term::ListCons(head, tail) => value(Value::ListCons(self.eval(head), self.eval(tail))),
            Term::RecList(target, base_type, base, step) => do_rec_list(
                &self.eval(target),
                &self.eval(base_type),
                &self.eval(base),
                &self.eval(step),
            ),
            Term::IndList(target, motive, base, step) => do_ind_list(
                &self.eval(target),
                &self.eval(motive),
                &self.eval(base),
                &self.eval(step),
            ),

            Term::Absurd => value(Value::Absurd),
            Term::IndAbsurd(target, motive) => {
                do_ind_absurd(&self.eval(target), &self.eval(motive))
            }

            Term::Equal(r#type, from, to) => value(Value::Equal(
                self.eval(r#type),
                self.eval(from),
                self.eval(to),
            )),
            Term::Same(expr) => value(Value::Same(self.eval(expr))),
            Term::Replace(target, motive, base) => {
                do_replace(&self.eval(target), &self.eval(motive), &self.eval(base))
            }
            Term::Trans(left, right) => do_trans(&self.eval(left), &self.eval(right)),
            Term::Cong(target, result_type, function) => do_cong(
                &self.eval(target),
                &self.eval(result_type),
                &self.eval(function),
            ),
            Term::Symm(target) => do_symm(&self.eval(target)),
            Term::IndEqual(target, motive, base) => {
                do_ind_equal(&self.eval(target), &self.eval(motive), &self.eval(base))
            }

            Term::Vec(elem_type, len) => value(Value::Vec(self.delay(elem_type), self.delay(len))),
            Term::VecNil => value(Value::VecNil),
            Term::VecCons(head, tail) => value(Value::VecCons(self.eval(head), self.eval(tail))),
            Term::Head(target) => do_head(&self.eval(target)),
            Term::Tail(target) => do_tail(&self.eval(target)),
            Term::IndVec(len, target, motive, base, step) => do_ind_vec(
                &self.eval(len),
                &self.eval(target),
                &self.eval(motive),
                &self.eval(base),
                &self.eval(step),
            ),

            Term::Either(left, right) => value(Value::Either(self.eval(left), self.eval(right))),
            Term::Left(expr) => value(Value::Left(self.eval(expr))),
            Term::Right(expr) => value(Value::Right(self.eval(expr))),
            Term::IndEither(target, motive, base_left, base_right) => do_ind_either(
                &self.eval(target),
                &self.eval(motive),
                &self.eval(base_left),
                &self.eval(base_right),
            ),

            Term::TypeConstructor(name, params, indices) => value(Value::TypeConstructor(
                *name,
                self.eval_all(params),
                self.eval_all(indices),
            )),
            Term::Constructor(app) => value(Value::Constructor(ConstructorValue {
                name: app.name,
                type_name: app.type_name,
                index: app.index,
                params: self.eval_all(&app.params),
                args: self.eval_all(&app.args),
            })),
            Term::Eliminator(datatype, target, motive, methods) => do_eliminator(
                datatype,
                &self.eval(target),
                &self.eval(motive),
                &self.eval_all(methods),
            ),
        }
    }
}

// Types of the motives and methods of the built-in eliminators. These are
// needed both to check eliminations and to read back stuck ones.

/// `(Π ((n-1 Nat)) B)`
pub fn which_nat_step_type(base_type: &ArcValue) -> ArcValue {
    Value::arrow(name("n-1"), value(Value::Nat), base_type.clone())
}

/// `(Π ((ih B)) B)`
pub fn iter_nat_step_type(base_type: &ArcValue) -> ArcValue {
    Value::arrow(name("ih"), base_type.clone(), base_type.clone())
}

/// `(Π ((n-1 Nat) (ih B)) B)`
pub fn rec_nat_step_type(base_type: &ArcValue) -> ArcValue {
    let base_type = base_type.clone();
    Value::pi(name("n-1"), value(Value::Nat), move |_| {
        iter_nat_step_type(&base_type)
    })
}

/// `(Π ((n Nat)) U)`
pub fn ind_nat_motive_type() -> ArcValue {
    Value::arrow(name("n"), value(Value::Nat), value(Value::Universe))
}

/// `(Π ((n-1 Nat) (ih (mot n-1))) (mot (add1 n-1)))`
pub fn ind_nat_step_type(motive: &ArcValue) -> ArcValue {
    let motive = motive.clone();
    Value::pi(name("n-1"), value(Value::Nat), move |pred| {
        let result_type = do_app(&motive, &value(Value::Add1(pred.clone())));
        Value::arrow(name("ih"), do_app(&motive, &pred), result_type)
    })
}

/// `(Π ((e E) (es (List E)) (ih B)) B)`
pub fn rec_list_step_type(elem_type: &ArcValue, base_type: &ArcValue) -> ArcValue {
    let list_type = value(Value::List(elem_type.clone()));
    let base_type = base_type.clone();
    Value::pi(name("e"), elem_type.clone(), move |_| {
        Value::arrow(name("es"), list_type.clone(), iter_nat_step_type(&base_type))
    })
}

/// `(Π ((xs (List E))) U)`
pub fn ind_list_motive_type(elem_type: &ArcValue) -> ArcValue {
    let list_type = value(Value::List(elem_type.clone()));
    Value::arrow(name("xs"), list_type, value(Value::Universe))
}

/// `(Π ((e E) (es (List E)) (ih (mot es))) (mot (:: e es)))`
pub fn ind_list_step_type(elem_type: &ArcValue, motive: &ArcValue) -> ArcValue {
    let list_type = value(Value::List(elem_type.clone()));
    let motive = motive.clone();
    Value::pi(name("e"), elem_type.clone(), move |head| {
        let motive = motive.clone();
        Value::pi(name("es"), list_type.clone(), move |tail| {
            let result_type = do_app(&motive, &value(Value::ListCons(head.clone(), tail.clone())));
            Value::arrow(name("ih"), do_app(&motive, &tail), result_type)
        })
    })
}

/// `(Π ((x X)) U)`
pub fn replace_motive_type(r#type: &ArcValue) -> ArcValue {
    Value::arrow(name("x"), r#type.clone(), value(Value::Universe))
}

/// `(Π ((to A) (p (= A from to))) U)`
pub fn ind_equal_motive_type(r#type: &ArcValue, from: &ArcValue) -> ArcValue {
    let (r#type, from) = (r#type.clone(), from.clone());
    Value::pi(name("to"), r#type.clone(), move |to| {
        let equal_type = value(Value::Equal(r#type.clone(), from.clone(), to));
        Value::arrow(name("p"), equal_type, value(Value::Universe))
    })
}

/// `(Π ((k Nat) (es (Vec E k))) U)`
pub fn ind_vec_motive_type(elem_type: &ArcValue) -> ArcValue {
    let elem_type = elem_type.clone();
    Value::pi(name("k"), value(Value::Nat), move |len| {
        let vec_type = value(Value::Vec(elem_type.clone(), len));
        Value::arrow(name("es"), vec_type, value(Value::Universe))
    })
}

/// `(Π ((k Nat) (e E) (es (Vec E k)) (ih (mot k es))) (mot (add1 k) (vec:: e es)))`
pub fn ind_vec_step_type(elem_type: &ArcValue, motive: &ArcValue) -> ArcValue {
    let (elem_type, motive) = (elem_type.clone(), motive.clone());
    Value::pi(name("k"), value(Value::Nat), move |len| {
        let (elem_type, motive) = (elem_type.clone(), motive.clone());
        Value::pi(name("e"), elem_type.clone(), move |head| {
            let vec_type = value(Value::Vec(elem_type.clone(), len.clone()));
            let (len, motive) = (len.clone(), motive.clone());
            Value::pi(name("es"), vec_type, move |tail| {
                let ih_type = do_app(&do_app(&motive, &len), &tail);
                let result_type = do_app(
                    &do_app(&motive, &value(Value::Add1(len.clone()))),
                    &value(Value::VecCons(head.clone(), tail)),
                );
                Value::arrow(name("ih"), ih_type, result_type)
            })
        })
    })
}

/// `(Π ((x (Either L R))) U)`
pub fn ind_either_motive_type(left_type: &ArcValue, right_type: &ArcValue) -> ArcValue {
    let either_type = value(Value::Either(left_type.clone(), right_type.clone()));
    Value::arrow(name("x"), either_type, value(Value::Universe))
}

/// `(Π ((x L)) (mot (left x)))`
pub fn ind_either_left_type(left_type: &ArcValue, motive: &ArcValue) -> ArcValue {
    let motive = motive.clone();
    Value::pi(name("x"), left_type.clone(), move |expr| {
        do_app(&motive, &value(Value::Left(expr)))
    })
}

/// `(Π ((x R)) (mot (right x)))`
pub fn ind_either_right_type(right_type: &ArcValue, motive: &ArcValue) -> ArcValue {
    let motive = motive.clone();
    Value::pi(name("x"), right_type.clone(), move |expr| {
        do_app(&motive, &value(Value::Right(expr)))
    })
}

// Elimination functions. Each of these forces its target, and either
// performs a reduction or builds a neutral value of the appropriate type.

pub fn do_app(head: &ArcValue, arg: &ArcValue) -> ArcValue {
    let head = now(head);
    match head.as_ref() {
        Value::Lambda(_, body) => body.apply(arg.clone()),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Pi(_, arg_type, body_type) => Value::neutral(
                body_type.apply(arg.clone()),
                Neutral::App(neutral.clone(), Normal::new(arg_type.clone(), arg.clone())),
            ),
            _ => panic_any(Error::InvalidApplication),
        },
        _ => panic_any(Error::InvalidApplication),
    }
}

pub fn do_car(pair: &ArcValue) -> ArcValue {
    let pair = now(pair);
    match pair.as_ref() {
        Value::Cons(car, _) => car.clone(),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Sigma(_, car_type, _) => {
                Value::neutral(car_type.clone(), Neutral::Car(neutral.clone()))
            }
            _ => panic_any(Error::InvalidCar),
        },
        _ => panic_any(Error::InvalidCar),
    }
}

pub fn do_cdr(pair: &ArcValue) -> ArcValue {
    let pair = now(pair);
    match pair.as_ref() {
        Value::Cons(_, cdr) => cdr.clone(),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Sigma(_, _, cdr_type) => Value::neutral(
                cdr_type.apply(do_car(&pair)),
                Neutral::Cdr(neutral.clone()),
            ),
            _ => panic_any(Error::InvalidCdr),
        },
        _ => panic_any(Error::InvalidCdr),
    }
}

pub fn do_which_nat(
    target: &ArcValue,
    base_type: &ArcValue,
    base: &ArcValue,
    step: &ArcValue,
) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Zero => base.clone(),
        Value::Add1(pred) => do_app(step, pred),
        Value::Neutral(_, neutral) => Value::neutral(
            base_type.clone(),
            Neutral::WhichNat(
                neutral.clone(),
                Normal::new(base_type.clone(), base.clone()),
                Normal::new(which_nat_step_type(base_type), step.clone()),
            ),
        ),
        _ => panic_any(Error::InvalidNatElim),
    }
}

pub fn do_iter_nat(
    target: &ArcValue,
    base_type: &ArcValue,
    base: &ArcValue,
    step: &ArcValue,
) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Zero => base.clone(),
        Value::Add1(pred) => do_app(step, &do_iter_nat(pred, base_type, base, step)),
        Value::Neutral(_, neutral) => Value::neutral(
            base_type.clone(),
            Neutral::IterNat(
                neutral.clone(),
                Normal::new(base_type.clone(), base.clone()),
                Normal::new(iter_nat_step_type(base_type), step.clone()),
            ),
        ),
        _ => panic_any(Error::InvalidNatElim),
    }
}

pub fn do_rec_nat(
    target: &ArcValue,
    base_type: &ArcValue,
    base: &ArcValue,
    step: &ArcValue,
) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Zero => base.clone(),
        Value::Add1(pred) => {
            let ih = do_rec_nat(pred, base_type, base, step);
            do_app(&do_app(step, pred), &ih)
        }
        Value::Neutral(_, neutral) => Value::neutral(
            base_type.clone(),
            Neutral::RecNat(
                neutral.clone(),
                Normal::new(base_type.clone(), base.clone()),
                Normal::new(rec_nat_step_type(base_type), step.clone()),
            ),
        ),
        _ => panic_any(Error::InvalidNatElim),
    }
}

pub fn do_ind_nat(
    target: &ArcValue,
    motive: &ArcValue,
    base: &ArcValue,
    step: &ArcValue,
) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Zero => base.clone(),
        Value::Add1(pred) => {
            let ih = do_ind_nat(pred, motive, base, step);
            do_app(&do_app(step, pred), &ih)
        }
        Value::Neutral(_, neutral) => Value::neutral(
            do_app(motive, &target),
            Neutral::IndNat(
                neutral.clone(),
                Normal::new(ind_nat_motive_type(), motive.clone()),
                Normal::new(do_app(motive, &value(Value::Zero)), base.clone()),
                Normal::new(ind_nat_step_type(motive), step.clone()),
            ),
        ),
        _ => panic_any(Error::InvalidNatElim),
    }
}

pub fn do_rec_list(
    target: &ArcValue,
    base_type: &ArcValue,
    base: &ArcValue,
    step: &ArcValue,
) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Nil => base.clone(),
        Value::ListCons(head, tail) => {
            let ih = do_rec_list(tail, base_type, base, step);
            do_app(&do_app(&do_app(step, head), tail), &ih)
        }
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::List(elem_type) => Value::neutral(
                base_type.clone(),
                Neutral::RecList(
                    neutral.clone(),
                    Normal::new(base_type.clone(), base.clone()),
                    Normal::new(rec_list_step_type(elem_type, base_type), step.clone()),
                ),
            ),
            _ => panic_any(Error::InvalidListElim),
        },
        _ => panic_any(Error::InvalidListElim),
    }
}

pub fn do_ind_list(
    target: &ArcValue,
    motive: &ArcValue,
    base: &ArcValue,
    step: &ArcValue,
) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Nil => base.clone(),
        Value::ListCons(head, tail) => {
            let ih = do_ind_list(tail, motive, base, step);
            do_app(&do_app(&do_app(step, head), tail), &ih)
        }
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::List(elem_type) => Value::neutral(
                do_app(motive, &target),
                Neutral::IndList(
                    neutral.clone(),
                    Normal::new(ind_list_motive_type(elem_type), motive.clone()),
                    Normal::new(do_app(motive, &value(Value::Nil)), base.clone()),
                    Normal::new(ind_list_step_type(elem_type, motive), step.clone()),
                ),
            ),
            _ => panic_any(Error::InvalidListElim),
        },
        _ => panic_any(Error::InvalidListElim),
    }
}

pub fn do_ind_absurd(target: &ArcValue, motive: &ArcValue) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Neutral(_, neutral) => Value::neutral(
            motive.clone(),
            Neutral::IndAbsurd(
                neutral.clone(),
                Normal::new(value(Value::Universe), motive.clone()),
            ),
        ),
        _ => panic_any(Error::InvalidAbsurdElim),
    }
}

pub fn do_replace(target: &ArcValue, motive: &ArcValue, base: &ArcValue) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Same(_) => base.clone(),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Equal(r#type, from, to) => Value::neutral(
                do_app(motive, to),
                Neutral::Replace(
                    neutral.clone(),
                    Normal::new(replace_motive_type(r#type), motive.clone()),
                    Normal::new(do_app(motive, from), base.clone()),
                ),
            ),
            _ => panic_any(Error::InvalidEqualElim),
        },
        _ => panic_any(Error::InvalidEqualElim),
    }
}

pub fn do_trans(left: &ArcValue, right: &ArcValue) -> ArcValue {
    let (left, right) = (now(left), now(right));
    let equal_parts = |r#type: &ArcValue| match now(r#type).as_ref() {
        Value::Equal(r#type, from, to) => (r#type.clone(), from.clone(), to.clone()),
        _ => panic_any(Error::InvalidEqualElim),
    };

    match (left.as_ref(), right.as_ref()) {
        (Value::Same(expr), Value::Same(_)) => value(Value::Same(expr.clone())),
        (Value::Same(expr), Value::Neutral(right_type, right_neutral)) => {
            let (r#type, _, to) = equal_parts(right_type);
            let left_type = value(Value::Equal(r#type.clone(), expr.clone(), expr.clone()));
            Value::neutral(
                value(Value::Equal(r#type, expr.clone(), to)),
                Neutral::Trans2(Normal::new(left_type, left.clone()), right_neutral.clone()),
            )
        }
        (Value::Neutral(left_type, left_neutral), Value::Same(_)) => {
            let (r#type, from, to) = equal_parts(left_type);
            let right_type = value(Value::Equal(r#type.clone(), to.clone(), to.clone()));
            Value::neutral(
                value(Value::Equal(r#type, from, to)),
                Neutral::Trans1(left_neutral.clone(), Normal::new(right_type, right.clone())),
            )
        }
        (Value::Neutral(left_type, left_neutral), Value::Neutral(right_type, right_neutral)) => {
            let (r#type, from, _) = equal_parts(left_type);
            let (_, _, to) = equal_parts(right_type);
            Value::neutral(
                value(Value::Equal(r#type, from, to)),
                Neutral::Trans12(left_neutral.clone(), right_neutral.clone()),
            )
        }
        _ => panic_any(Error::InvalidEqualElim),
    }
}

pub fn do_cong(target: &ArcValue, result_type: &ArcValue, function: &ArcValue) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Same(expr) => value(Value::Same(do_app(function, expr))),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Equal(r#type, from, to) => Value::neutral(
                value(Value::Equal(
                    result_type.clone(),
                    do_app(function, from),
                    do_app(function, to),
                )),
                Neutral::Cong(
                    neutral.clone(),
                    result_type.clone(),
                    Normal::new(
                        Value::arrow(name("x"), r#type.clone(), result_type.clone()),
                        function.clone(),
                    ),
                ),
            ),
            _ => panic_any(Error::InvalidEqualElim),
        },
        _ => panic_any(Error::InvalidEqualElim),
    }
}

pub fn do_symm(target: &ArcValue) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Same(expr) => value(Value::Same(expr.clone())),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Equal(r#type, from, to) => Value::neutral(
                value(Value::Equal(r#type.clone(), to.clone(), from.clone())),
                Neutral::Symm(neutral.clone()),
            ),
            _ => panic_any(Error::InvalidEqualElim),
        },
        _ => panic_any(Error::InvalidEqualElim),
    }
}

pub fn do_ind_equal(target: &ArcValue, motive: &ArcValue, base: &ArcValue) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Same(_) => base.clone(),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Equal(r#type, from, to) => {
                let base_type = do_app(
                    &do_app(motive, from),
                    &value(Value::Same(from.clone())),
                );
                Value::neutral(
                    do_app(&do_app(motive, to), &target),
                    Neutral::IndEqual(
                        neutral.clone(),
                        Normal::new(ind_equal_motive_type(r#type, from), motive.clone()),
                        Normal::new(base_type, base.clone()),
                    ),
                )
            }
            _ => panic_any(Error::InvalidEqualElim),
        },
        _ => panic_any(Error::InvalidEqualElim),
    }
}

pub fn do_head(target: &ArcValue) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::VecCons(head, _) => head.clone(),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Vec(elem_type, _) => {
                Value::neutral(elem_type.clone(), Neutral::Head(neutral.clone()))
            }
            _ => panic_any(Error::InvalidVecElim),
        },
        _ => panic_any(Error::InvalidVecElim),
    }
}

pub fn do_tail(target: &ArcValue) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::VecCons(_, tail) => tail.clone(),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Vec(elem_type, len) => match now(len).as_ref() {
                Value::Add1(pred) => Value::neutral(
                    value(Value::Vec(elem_type.clone(), pred.clone())),
                    Neutral::Tail(neutral.clone()),
                ),
                _ => panic_any(Error::InvalidVecElim),
            },
            _ => panic_any(Error::InvalidVecElim),
        },
        _ => panic_any(Error::InvalidVecElim),
    }
}

pub fn do_ind_vec(
    len: &ArcValue,
    target: &ArcValue,
    motive: &ArcValue,
    base: &ArcValue,
    step: &ArcValue,
) -> ArcValue {
    let (len, target) = (now(len), now(target));
    match (len.as_ref(), target.as_ref()) {
        (Value::Zero, Value::VecNil) => base.clone(),
        (Value::Add1(pred), Value::VecCons(head, tail)) => {
            let ih = do_ind_vec(pred, tail, motive, base, step);
            do_app(&do_app(&do_app(&do_app(step, pred), head), tail), &ih)
        }
        (_, Value::Neutral(r#type, neutral)) => {
            let elem_type = match now(r#type).as_ref() {
                Value::Vec(elem_type, _) => elem_type.clone(),
                _ => panic_any(Error::InvalidVecElim),
            };
            let motive_normal = Normal::new(ind_vec_motive_type(&elem_type), motive.clone());
            let base_type = do_app(
                &do_app(motive, &value(Value::Zero)),
                &value(Value::VecNil),
            );
            let base_normal = Normal::new(base_type, base.clone());
            let step_normal = Normal::new(ind_vec_step_type(&elem_type, motive), step.clone());
            let result_type = do_app(&do_app(motive, &len), &target);

            let neutral = match len.as_ref() {
                Value::Neutral(_, len_neutral) => Neutral::IndVec12(
                    len_neutral.clone(),
                    neutral.clone(),
                    motive_normal,
                    base_normal,
                    step_normal,
                ),
                _ => Neutral::IndVec2(
                    Normal::new(value(Value::Nat), len.clone()),
                    neutral.clone(),
                    motive_normal,
                    base_normal,
                    step_normal,
                ),
            };
            Value::neutral(result_type, neutral)
        }
        _ => panic_any(Error::InvalidVecElim),
    }
}

pub fn do_ind_either(
    target: &ArcValue,
    motive: &ArcValue,
    base_left: &ArcValue,
    base_right: &ArcValue,
) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Left(expr) => do_app(base_left, expr),
        Value::Right(expr) => do_app(base_right, expr),
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::Either(left_type, right_type) => Value::neutral(
                do_app(motive, &target),
                Neutral::IndEither(
                    neutral.clone(),
                    Normal::new(ind_either_motive_type(left_type, right_type), motive.clone()),
                    Normal::new(ind_either_left_type(left_type, motive), base_left.clone()),
                    Normal::new(ind_either_right_type(right_type, motive), base_right.clone()),
                ),
            ),
            _ => panic_any(Error::InvalidEitherElim),
        },
        _ => panic_any(Error::InvalidEitherElim),
    }
}

/// Eliminate a value of a user datatype. The method for the target's
/// constructor is applied to each of the constructor's arguments in order,
/// with each recursive argument followed by its induction hypothesis.
pub fn do_eliminator(
    datatype: &Arc<Datatype>,
    target: &ArcValue,
    motive: &ArcValue,
    methods: &[ArcValue],
) -> ArcValue {
    let target = now(target);
    match target.as_ref() {
        Value::Constructor(constructor_value) => {
            let constructor = match datatype.constructors.get(constructor_value.index) {
                Some(constructor) => constructor,
                None => panic_any(Error::InvalidDatatypeElim),
            };
            let mut result = methods[constructor_value.index].clone();
            for (position, arg) in constructor_value.args.iter().enumerate() {
                result = do_app(&result, arg);
                if constructor.is_recursive(position) {
                    let ih = do_eliminator(datatype, arg, motive, methods);
                    result = do_app(&result, &ih);
                }
            }
            result
        }
        Value::Neutral(r#type, neutral) => match now(r#type).as_ref() {
            Value::TypeConstructor(_, params, indices) => {
                let method_normals = (datatype.constructors.iter())
                    .zip(methods)
                    .map(|(constructor, method)| {
                        let method_type =
                            datatype::method_type(datatype, params, motive, constructor.index);
                        Normal::new(method_type, method.clone())
                    })
                    .collect();

                Value::neutral(
                    datatype::apply_motive(motive, indices, &target),
                    Neutral::Eliminator(
                        datatype.clone(),
                        neutral.clone(),
                        Normal::new(datatype::motive_type(datatype, params), motive.clone()),
                        method_normals,
                    ),
                )
            }
            _ => panic_any(Error::InvalidDatatypeElim),
        },
        _ => panic_any(Error::InvalidDatatypeElim),
    }
}

/// Reading back values into core terms in normal form.
pub struct ReadBackContext<'context> {
    context: &'context Context,
}

impl<'context> ReadBackContext<'context> {
    pub fn new(context: &'context Context) -> ReadBackContext<'context> {
        ReadBackContext { context }
    }

    fn datatype(&self, name: Symbol) -> Arc<Datatype> {
        match self.context.datatype(name) {
            Some(datatype) => datatype.clone(),
            None => panic_any(Error::MissingDatatype(name)),
        }
    }

    /// Run `f` in a context extended with a fresh variable of type
    /// `r#type`, based on `name`.
    fn with_fresh<T>(
        &self,
        name: Symbol,
        r#type: &ArcValue,
        f: impl FnOnce(&ReadBackContext<'_>, Symbol, ArcValue) -> T,
    ) -> T {
        let name = self.context.fresh(name);
        let context = self.context.bind_free(name, r#type.clone());
        f(&ReadBackContext::new(&context), name, Value::var(r#type.clone(), name))
    }

    /// Read back a value at the given type, performing eta expansion.
    pub fn read_back(&self, r#type: &ArcValue, value: &ArcValue) -> Term {
        let (r#type, value) = (now(r#type), now(value));
        match (r#type.as_ref(), value.as_ref()) {
            (Value::Universe, _) => self.read_back_type(&value),

            (Value::Nat, Value::Zero) => Term::Zero,
            (Value::Nat, Value::Add1(pred)) => {
                let mut count = 1u64;
                let mut pred = now(pred);
                while let Value::Add1(next) = pred.as_ref() {
                    count = count.saturating_add(1);
                    pred = now(next);
                }
                Term::add1s(count, self.read_back(&r#type, &pred))
            }

            (Value::Pi(pi_name, arg_type, body_type), _) => {
                let name = match value.as_ref() {
                    Value::Lambda(name, _) => *name,
                    _ => *pi_name,
                };
                self.with_fresh(name, arg_type, |context, name, var| {
                    let body = context.read_back(&body_type.apply(var.clone()), &do_app(&value, &var));
                    Term::Lambda(name, Arc::new(body))
                })
            }

            (Value::Sigma(_, car_type, cdr_type), _) => {
                let car = do_car(&value);
                let cdr = do_cdr(&value);
                Term::Cons(
                    Arc::new(self.read_back(car_type, &car)),
                    Arc::new(self.read_back(&cdr_type.apply(car.clone()), &cdr)),
                )
            }

            (Value::Atom, Value::Quote(symbol)) => Term::Quote(*symbol),
            (Value::Trivial, _) => Term::Sole,

            (Value::List(_), Value::Nil) => Term::Nil,
            (Value::List(elem_type), Value::ListCons(head, tail)) => Term::ListCons(
                Arc::new(self.read_back(elem_type, head)),
                Arc::new(self.read_back(&r#type, tail)),
            ),

            (Value::Absurd, Value::Neutral(_, neutral)) => Term::The(
                Arc::new(Term::Absurd),
                Arc::new(self.read_back_neutral(neutral)),
            ),

            (Value::Equal(r#type, _, _), Value::Same(expr)) => {
                Term::Same(Arc::new(self.read_back(r#type, expr)))
            }

            (Value::Vec(_, _), Value::VecNil) => Term::VecNil,
            (Value::Vec(elem_type, len), Value::VecCons(head, tail)) => match now(len).as_ref() {
                Value::Add1(pred) => {
                    let tail_type = Arc::new(Value::Vec(elem_type.clone(), pred.clone()));
                    Term::VecCons(
                        Arc::new(self.read_back(elem_type, head)),
                        Arc::new(self.read_back(&tail_type, tail)),
                    )
                }
                _ => panic_any(Error::InvalidReadBack),
            },

            (Value::Either(left_type, _), Value::Left(expr)) => {
                Term::Left(Arc::new(self.read_back(left_type, expr)))
            }
            (Value::Either(_, right_type), Value::Right(expr)) => {
                Term::Right(Arc::new(self.read_back(right_type, expr)))
            }

            (Value::TypeConstructor(..), Value::Constructor(constructor_value)) => {
                self.read_back_constructor(constructor_value)
            }

            (_, Value::Neutral(_, neutral)) => self.read_back_neutral(neutral),

            _ => panic_any(Error::InvalidReadBack),
        }
    }

    fn read_back_constructor(&self, constructor_value: &ConstructorValue) -> Term {
        let datatype = self.datatype(constructor_value.type_name);
        let constructor = match datatype.constructors.get(constructor_value.index) {
            Some(constructor) => constructor,
            None => panic_any(Error::InvalidReadBack),
        };

        let mut env = datatype.env.clone();
        let params = self.read_back_telescope(&mut env, &datatype.params, &constructor_value.params);
        let args = self.read_back_telescope(&mut env, &constructor.args, &constructor_value.args);

        Term::Constructor(ConstructorApp {
            name: constructor_value.name,
            type_name: constructor_value.type_name,
            index: constructor_value.index,
            params,
            args,
        })
    }

    /// Read back a sequence of values, each at the type given by the
    /// corresponding binding, evaluated with the previous values in scope.
    fn read_back_telescope(
        &self,
        env: &mut Env,
        bindings: &[datatype::Binding],
        values: &[ArcValue],
    ) -> Vec<Term> {
        (bindings.iter().zip(values))
            .map(|(binding, value)| {
                let r#type = EvalContext::new(env).eval(&binding.r#type);
                env.push(binding.name, value.clone());
                self.read_back(&r#type, value)
            })
            .collect()
    }

    /// Read back a value that is itself a type.
    pub fn read_back_type(&self, value: &ArcValue) -> Term {
        let value = now(value);
        match value.as_ref() {
            Value::Universe => Term::Universe,
            Value::Nat => Term::Nat,
            Value::Atom => Term::Atom,
            Value::Trivial => Term::Trivial,
            Value::Absurd => Term::Absurd,

            Value::Pi(name, arg_type, body_type) => {
                let arg_type_term = self.read_back_type(arg_type);
                self.with_fresh(*name, arg_type, |context, name, var| {
                    let body_type = context.read_back_type(&body_type.apply(var));
                    Term::Pi(name, Arc::new(arg_type_term), Arc::new(body_type))
                })
            }
            Value::Sigma(name, car_type, cdr_type) => {
                let car_type_term = self.read_back_type(car_type);
                self.with_fresh(*name, car_type, |context, name, var| {
                    let cdr_type = context.read_back_type(&cdr_type.apply(var));
                    Term::Sigma(name, Arc::new(car_type_term), Arc::new(cdr_type))
                })
            }

            Value::List(elem_type) => Term::List(Arc::new(self.read_back_type(elem_type))),
            Value::Equal(r#type, from, to) => Term::Equal(
                Arc::new(self.read_back_type(r#type)),
                Arc::new(self.read_back(r#type, from)),
                Arc::new(self.read_back(r#type, to)),
            ),
            Value::Vec(elem_type, len) => Term::Vec(
                Arc::new(self.read_back_type(elem_type)),
                Arc::new(self.read_back(&Arc::new(Value::Nat), len)),
            ),
            Value::Either(left_type, right_type) => Term::Either(
                Arc::new(self.read_back_type(left_type)),
                Arc::new(self.read_back_type(right_type)),
            ),

            Value::TypeConstructor(name, params, indices) => {
                let datatype = self.datatype(*name);
                let mut env = datatype.env.clone();
                let params = self.read_back_telescope(&mut env, &datatype.params, params);
                let indices = self.read_back_telescope(&mut env, &datatype.indices, indices);
                Term::TypeConstructor(*name, params, indices)
            }

            Value::Neutral(_, neutral) => self.read_back_neutral(neutral),

            _ => panic_any(Error::NotAType),
        }
    }

    fn read_back_normal(&self, normal: &Normal) -> Arc<Term> {
        Arc::new(self.read_back(&normal.r#type, &normal.value))
    }

    fn read_back_base_type(&self, normal: &Normal) -> Arc<Term> {
        Arc::new(self.read_back_type(&normal.r#type))
    }

    /// Read back a stuck computation.
    pub fn read_back_neutral(&self, neutral: &Neutral) -> Term {
        let neutral_term = |neutral: &Arc<Neutral>| Arc::new(self.read_back_neutral(neutral));

        match neutral {
            Neutral::Var(name) => Term::Var(*name),
            Neutral::Hole(location, r#type) => {
                Term::Hole(*location, Arc::new(self.read_back_type(r#type)))
            }

            Neutral::App(head, arg) => Term::App(neutral_term(head), self.read_back_normal(arg)),
            Neutral::Car(pair) => Term::Car(neutral_term(pair)),
            Neutral::Cdr(pair) => Term::Cdr(neutral_term(pair)),

            Neutral::WhichNat(target, base, step) => Term::WhichNat(
                neutral_term(target),
                self.read_back_base_type(base),
                self.read_back_normal(base),
                self.read_back_normal(step),
            ),
            Neutral::IterNat(target, base, step) => Term::IterNat(
                neutral_term(target),
                self.read_back_base_type(base),
                self.read_back_normal(base),
                self.read_back_normal(step),
            ),
            Neutral::RecNat(target, base, step) => Term::RecNat(
                neutral_term(target),
                self.read_back_base_type(base),
                self.read_back_normal(base),
                self.read_back_normal(step),
            ),
            Neutral::IndNat(target, motive, base, step) => Term::IndNat(
                neutral_term(target),
                self.read_back_normal(motive),
                self.read_back_normal(base),
                self.read_back_normal(step),
            ),

            Neutral::RecList(target, base, step) => Term::RecList(
                neutral_term(target),
                self.read_back_base_type(base),
                self.read_back_normal(base),
                self.read_back_normal(step),
            ),
            Neutral::IndList(target, motive, base, step) => Term::IndList(
                neutral_term(target),
                self.read_back_normal(motive),
                self.read_back_normal(base),
                self.read_back_normal(step),
            ),

            Neutral::IndAbsurd(target, motive) => Term::IndAbsurd(
                Arc::new(Term::The(Arc::new(Term::Absurd), neutral_term(target))),
                self.read_back_normal(motive),
            ),

            Neutral::Replace(target, motive, base) => Term::Replace(
                neutral_term(target),
                self.read_back_normal(motive),
                self.read_back_normal(base),
            ),
            Neutral::Trans1(left, right) => {
                Term::Trans(neutral_term(left), self.read_back_normal(right))
            }
            Neutral::Trans2(left, right) => {
                Term::Trans(self.read_back_normal(left), neutral_term(right))
            }
            Neutral::Trans12(left, right) => Term::Trans(neutral_term(left), neutral_term(right)),
            Neutral::Cong(target, result_type, function) => Term::Cong(
                neutral_term(target),
                Arc::new(self.read_back_type(result_type)),
                self.read_back_normal(function),
            ),
            Neutral::Symm(target) => Term::Symm(neutral_term(target)),
            Neutral::IndEqual(target, motive, base) => Term::IndEqual(
                neutral_term(target),
                self.read_back_normal(motive),
                self.read_back_normal(base),
            ),

            Neutral::Head(target) => Term::Head(neutral_term(target)),
            Neutral::Tail(target) => Term::Tail(neutral_term(target)),
            Neutral::IndVec12(len, target, motive, base, step) => Term::IndVec(
                neutral_term(len),
                neutral_term(target),
                self.read_back_normal(motive),
                self.read_back_normal(base),
                self.read_back_normal(step),
            ),
            Neutral::IndVec2(len, target, motive, base, step) => Term::IndVec(
                self.read_back_normal(len),
                neutral_term(target),
                self.read_back_normal(motive),
                self.read_back_normal(base),
                self.read_back_normal(step),
            ),

            Neutral::IndEither(target, motive, base_left, base_right) => Term::IndEither(
                neutral_term(target),
                self.read_back_normal(motive),
                self.read_back_normal(base_left),
                self.read_back_normal(base_right),
            ),

            Neutral::Eliminator(datatype, target, motive, methods) => Term::Eliminator(
                datatype.clone(),
                neutral_term(target),
                self.read_back_normal(motive),
                (methods.iter())
                    .map(|method| self.read_back(&method.r#type, &method.value))
                    .collect(),
            ),
        }
    }
}

/// Definitional equality, decided by comparing normal forms.
pub struct ConversionContext<'context> {
    context: &'context Context,
}

impl<'context> ConversionContext<'context> {
    pub fn new(context: &'context Context) -> ConversionContext<'context> {
        ConversionContext { context }
    }

    /// Returns `true` if the two types are the same.
    pub fn same_type(&self, type0: &ArcValue, type1: &ArcValue) -> bool {
        let read_back = ReadBackContext::new(self.context);
        alpha::alpha_equiv(&read_back.read_back_type(type0), &read_back.read_back_type(type1))
    }

    /// Returns `true` if the two values are the same at the given type.
    pub fn convert(&self, r#type: &ArcValue, value0: &ArcValue, value1: &ArcValue) -> bool {
        let read_back = ReadBackContext::new(self.context);
        alpha::alpha_equiv(
            &read_back.read_back(r#type, value0),
            &read_back.read_back(r#type, value1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nat() -> ArcValue {
        Arc::new(Value::Nat)
    }

    fn eval_closed(term: &Term) -> ArcValue {
        EvalContext::new(&Env::new()).eval(term)
    }

    #[test]
    fn delayed_values_are_forced_once() {
        let two = Term::Add1(Arc::new(Term::Add1(Arc::new(Term::Zero))));
        let delayed = Arc::new(Delayed::new(Env::new(), Arc::new(two)));
        let value = Arc::new(Value::Delay(delayed.clone()));

        assert!(!delayed.is_forced());
        assert!(matches!(now(&value).as_ref(), Value::Add1(_)));
        assert!(delayed.is_forced());
    }

    #[test]
    fn iter_nat_reduces_on_numerals() {
        // (iter-Nat 3 0 (λ (n) (add1 (add1 n))))
        let n = Symbol::intern("n");
        let step = Term::Lambda(
            n,
            Arc::new(Term::Add1(Arc::new(Term::Add1(Arc::new(Term::Var(n)))))),
        );
        let term = Term::IterNat(
            Arc::new(Term::nat(3)),
            Arc::new(Term::Nat),
            Arc::new(Term::nat(0)),
            Arc::new(step),
        );

        let context = Context::new();
        let result = ReadBackContext::new(&context).read_back(&nat(), &eval_closed(&term));
        assert_eq!(result.as_nat(), Some(6));
    }

    #[test]
    fn neutral_functions_are_eta_expanded() {
        let f = Symbol::intern("f");
        let fun_type = Value::arrow(Symbol::intern("x"), nat(), nat());
        let context = Context::new().bind_free(f, fun_type.clone());
        let f_value = Value::var(fun_type.clone(), f);

        let term = ReadBackContext::new(&context).read_back(&fun_type, &f_value);
        match term {
            Term::Lambda(x, body) => match body.as_ref() {
                Term::App(head, arg) => {
                    assert!(matches!(head.as_ref(), Term::Var(name) if *name == f));
                    assert!(matches!(arg.as_ref(), Term::Var(name) if *name == x));
                }
                body => panic!("expected an application, found {body:?}"),
            },
            term => panic!("expected a lambda, found {term:?}"),
        }
    }

    #[test]
    fn trivial_values_read_back_as_sole() {
        let t = Symbol::intern("t");
        let trivial = Arc::new(Value::Trivial);
        let context = Context::new().bind_free(t, trivial.clone());

        let term = ReadBackContext::new(&context).read_back(&trivial, &Value::var(trivial.clone(), t));
        assert!(matches!(term, Term::Sole));
    }

    #[test]
    fn stuck_absurd_values_are_annotated() {
        let a = Symbol::intern("a");
        let absurd = Arc::new(Value::Absurd);
        let context = Context::new().bind_free(a, absurd.clone());

        let term = ReadBackContext::new(&context).read_back(&absurd, &Value::var(absurd.clone(), a));
        assert!(matches!(term, Term::The(r#type, _) if matches!(r#type.as_ref(), Term::Absurd)));
    }

    #[test]
    fn symm_swaps_endpoints_of_stuck_proofs() {
        let p = Symbol::intern("p");
        let (zero, one) = (eval_closed(&Term::nat(0)), eval_closed(&Term::nat(1)));
        let equal_type = Arc::new(Value::Equal(nat(), zero, one));
        let context = Context::new().bind_free(p, equal_type.clone());

        let symm = do_symm(&Value::var(equal_type, p));
        match now(&symm).as_ref() {
            Value::Neutral(r#type, _) => match now(r#type).as_ref() {
                Value::Equal(_, from, to) => {
                    let read_back = ReadBackContext::new(&context);
                    assert_eq!(read_back.read_back(&nat(), from).as_nat(), Some(1));
                    assert_eq!(read_back.read_back(&nat(), to).as_nat(), Some(0));
                }
                other => panic!("expected an equality type, found {other:?}"),
            },
            other => panic!("expected a neutral value, found {other:?}"),
        }
    }

    #[test]
    fn large_numerals_read_back() {
        let context = Context::new();
        let value = eval_closed(&Term::nat(1_000_000));
        let term = ReadBackContext::new(&context).read_back(&nat(), &value);
        assert_eq!(term.as_nat(), Some(1_000_000));
    }

    #[test]
    fn numerals_unfold_one_add1_at_a_time() {
        let value = eval_closed(&Term::nat(3));
        match now(&value).as_ref() {
            Value::Add1(pred) => match now(pred).as_ref() {
                Value::Add1(_) => {}
                other => panic!("expected `add1`, found {other:?}"),
            },
            other => panic!("expected `add1`, found {other:?}"),
        }
    }
}
