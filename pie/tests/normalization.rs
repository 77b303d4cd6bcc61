//! Properties of evaluation and read-back, checked through the elaborator.

use std::sync::Arc;

use pie::context::{Binder, Context};
use pie::core;
use pie::source::FileId;
use pie::surface::elaboration::{Elaborator, ItemResult, Message};
use pie::surface::{Module, Term};
use pie::symbol::Symbol;
use scoped_arena::Scope;

fn file_id() -> FileId {
    FileId::try_from(1).unwrap()
}

fn process(context: &Context, source: &str) -> Result<Context, Message> {
    let scope = Scope::new();
    let module = Module::parse(&scope, file_id(), source).unwrap();
    let mut elaborator = Elaborator::new();
    let mut context = context.clone();
    for item in module.items {
        match elaborator.process_item(&context, item)? {
            ItemResult::Context(next_context) => context = next_context,
            ItemResult::Checked | ItemResult::Normalized { .. } => {}
        }
    }
    Ok(context)
}

/// Normalize an expression, returning `(the T v)`.
fn normalize(context: &Context, source: &str) -> String {
    let scope = Scope::new();
    let term = Term::parse(&scope, file_id(), source).unwrap();
    let (r#type, expr) = Elaborator::new().normalize_term(context, &term).unwrap();
    core::Term::The(Arc::new(r#type), Arc::new(expr)).to_string()
}

#[test]
fn functions_are_eta_equivalent() {
    let source = "
        (claim eta (Π ((f (-> Nat Nat))) (= (-> Nat Nat) f (λ (x) (f x)))))
        (define eta (λ (f) (same f)))
    ";
    assert!(process(&Context::new(), source).is_ok());
}

#[test]
fn pairs_are_eta_equivalent() {
    let source = "
        (claim eta (Π ((p (Pair Nat Atom))) (= (Pair Nat Atom) p (cons (car p) (cdr p)))))
        (define eta (λ (p) (same p)))
    ";
    assert!(process(&Context::new(), source).is_ok());
}

#[test]
fn trivial_values_are_all_sole() {
    let source = "
        (claim eta (Π ((t Trivial)) (= Trivial t sole)))
        (define eta (λ (t) (same t)))
    ";
    assert!(process(&Context::new(), source).is_ok());
}

#[test]
fn different_values_are_not_the_same() {
    let result = process(&Context::new(), "(check-same Nat 1 2)");
    assert!(matches!(result, Err(Message::NotTheSame { .. })));
    assert!(process(&Context::new(), "(check-same Nat (add1 1) 2)").is_ok());
}

#[test]
fn normalization_is_idempotent() {
    let context = process(
        &Context::new(),
        "
        (claim double (-> Nat Nat))
        (define double (λ (n) (iter-Nat n 0 (λ (k) (add1 (add1 k))))))
        ",
    )
    .unwrap();

    let sources = [
        "(the (-> Nat Nat) (λ (n) (double (add1 n))))",
        "(the (Pair Nat (List Atom)) (cons (double 2) (:: 'a nil)))",
        "(the (-> (Either Nat Atom) Nat) (λ (e) (ind-Either e (λ (e) Nat) (λ (n) (double n)) (λ (a) 0))))",
        "(the (Π ((A U) (a A)) (= A a a)) (λ (A a) (symm (the (= A a a) (same a)))))",
    ];
    for source in sources {
        let once = normalize(&context, source);
        let twice = normalize(&context, &once);
        assert_eq!(once, twice, "normalizing `{source}`");
    }
}

#[test]
fn large_numerals_normalize() {
    let context = Context::new();
    assert_eq!(normalize(&context, "100000"), "(the Nat 100000)");
    assert_eq!(normalize(&context, "(add1 999999)"), "(the Nat 1000000)");
    assert!(process(&context, "(check-same Nat 100000 (add1 99999))").is_ok());

    let result = process(&context, "(check-same Nat 100000 99999)");
    assert!(matches!(result, Err(Message::NotTheSame { .. })));
}

#[test]
fn stuck_eliminators_are_neutral() {
    let context = process(
        &Context::new(),
        "(data Color () () (red () Color) (green () Color) (blue () Color))",
    )
    .unwrap();
    let normal = normalize(
        &context,
        "(the (-> Color Atom) (λ (c) (elim-Color c (λ (c) Atom) 'red 'green 'blue)))",
    );
    assert!(normal.contains("elim-Color"), "{normal}");
}

#[test]
fn each_constructor_selects_its_own_method() {
    let context = process(
        &Context::new(),
        "
        (data Color () () (red () Color) (green () Color) (blue () Color))
        (claim name (-> Color Atom))
        (define name (λ (c) (elim-Color c (λ (c) Atom) 'red 'green 'blue)))
        ",
    )
    .unwrap();

    for color in ["red", "green", "blue"] {
        let normal = normalize(&context, &format!("(name {color})"));
        assert_eq!(normal, format!("(the Atom '{color})"));
    }
}

#[test]
fn each_recursive_argument_gets_an_induction_hypothesis() {
    let context = process(
        &Context::new(),
        "
        (data Tree () () (leaf () Tree) (node ((l Tree) (r Tree)) Tree))
        (claim size (-> Tree Nat))
        (define size
          (λ (t)
            (elim-Tree t (λ (t) Nat)
              1
              (λ (l ih-l r ih-r) (add1 (iter-Nat ih-l ih-r (λ (n) (add1 n))))))))
        ",
    )
    .unwrap();

    let normal = normalize(&context, "(size (node leaf (node leaf leaf)))");
    assert_eq!(normal, "(the Nat 5)");
}

#[test]
fn contexts_are_not_changed_by_extension() {
    let x = Symbol::intern("x");
    let before = Context::new();
    let after = process(&before, "(claim x Nat) (define x 3)").unwrap();

    assert!(before.lookup(x).is_none());
    assert!(matches!(after.lookup(x), Some(Binder::Define(_, _))));
}

#[test]
fn failed_items_leave_the_context_unchanged() {
    let context = process(&Context::new(), "(claim x Nat)").unwrap();
    let entries = context.read_back_context().len();

    assert!(process(&context, "(define x 'nope)").is_err());
    assert!(process(&context, "(data D () () (d () Nat))").is_err());
    assert_eq!(context.read_back_context().len(), entries);
    assert!(context.lookup(Symbol::intern("D")).is_none());
}

#[test]
fn holes_are_reported_with_their_context() {
    let scope = Scope::new();
    let module = Module::parse(
        &scope,
        file_id(),
        "(claim f (-> Nat Atom)) (define f (λ (n) TODO))",
    )
    .unwrap();

    let mut elaborator = Elaborator::new();
    let mut context = Context::new();
    for item in module.items {
        if let ItemResult::Context(next_context) = elaborator.process_item(&context, item).unwrap() {
            context = next_context;
        }
    }

    let holes = elaborator.take_holes();
    assert_eq!(holes.len(), 1);
    assert_eq!(holes[0].r#type.to_string(), "Atom");
    let names = holes[0].context.iter().map(|entry| entry.name.to_string()).collect::<Vec<_>>();
    assert_eq!(names, ["f", "n"]);
}
