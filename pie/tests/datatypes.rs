//! User-declared datatypes, from enumerations up to indexed families.

use pie::context::{Binder, Context};
use pie::source::FileId;
use pie::surface::elaboration::{Elaborator, ItemResult, Message};
use pie::surface::{Module, Term};
use pie::symbol::Symbol;
use scoped_arena::Scope;

fn file_id() -> FileId {
    FileId::try_from(1).unwrap()
}

/// Process each item of a module, stopping at the first error.
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

/// Normalize an expression, returning its type and normal form.
fn normalize(context: &Context, source: &str) -> (String, String) {
    let scope = Scope::new();
    let term = Term::parse(&scope, file_id(), source).unwrap();
    let (r#type, expr) = Elaborator::new().normalize_term(context, &term).unwrap();
    (r#type.to_string(), expr.to_string())
}

const BOOL: &str = "
(data Bool () ()
  (true () Bool)
  (false () Bool))

(claim not (-> Bool Bool))
(define not
  (λ (b) (elim-Bool b (λ (b) Bool) false true)))
";

#[test]
fn bool() {
    let context = process(&Context::new(), BOOL).unwrap();

    assert!(matches!(context.lookup(Symbol::intern("Bool")), Some(Binder::Datatype(_))));
    assert!(matches!(context.lookup(Symbol::intern("elim-Bool")), Some(Binder::Eliminator(_))));

    assert_eq!(normalize(&context, "true"), ("Bool".to_owned(), "true".to_owned()));
    assert_eq!(normalize(&context, "(not true)"), ("Bool".to_owned(), "false".to_owned()));
    assert_eq!(normalize(&context, "(not (not true))").1, "true");
}

#[test]
fn bool_methods_must_match_the_motive() {
    let context = process(&Context::new(), BOOL).unwrap();
    let result = process(&context, "(elim-Bool true (λ (b) Nat) 0 'nope)");
    assert!(matches!(result, Err(Message::MismatchedTypes { .. })));
}

#[test]
fn bool_eliminates_true_to_its_first_method() {
    let context = process(&Context::new(), BOOL).unwrap();

    assert_eq!(normalize(&context, "true").0, "Bool");
    assert_eq!(normalize(&context, "false").0, "Bool");
    assert_eq!(
        normalize(&context, "(elim-Bool true (λ (b) Nat) (add1 zero) zero)"),
        ("Nat".to_owned(), "1".to_owned()),
    );
}

const MY_NAT: &str = "
(data MyNat () ()
  (my-zero () MyNat)
  (my-add1 ((n MyNat)) MyNat))

(claim my-plus (-> MyNat MyNat MyNat))
(define my-plus
  (λ (a b)
    (elim-MyNat a (λ (k) MyNat) b (λ (n ih) (my-add1 ih)))))

(claim to-nat (-> MyNat Nat))
(define to-nat
  (λ (n) (elim-MyNat n (λ (k) Nat) 0 (λ (n ih) (add1 ih)))))
";

#[test]
fn my_nat() {
    let context = process(&Context::new(), MY_NAT).unwrap();

    let two = "(my-plus (my-add1 my-zero) (my-add1 my-zero))";
    assert_eq!(
        normalize(&context, two),
        ("MyNat".to_owned(), "(my-add1 (my-add1 my-zero))".to_owned()),
    );
    assert_eq!(normalize(&context, &format!("(to-nat {two})")).1, "2");
}

#[test]
fn my_nat_one_converts_to_nat() {
    let context = process(&Context::new(), MY_NAT).unwrap();

    assert_eq!(normalize(&context, "(my-add1 my-zero)").0, "MyNat");
    assert_eq!(
        normalize(&context, "(to-nat (my-add1 my-zero))"),
        ("Nat".to_owned(), "1".to_owned()),
    );
}

#[test]
fn my_nat_recursive_methods_take_induction_hypotheses() {
    let context = process(&Context::new(), MY_NAT).unwrap();
    let result = process(&context, "(elim-MyNat my-zero (λ (k) Nat) 0 (λ (n) n))");
    assert!(matches!(result, Err(Message::MismatchedTypes { .. })));
}

#[test]
fn constructors_must_be_fully_applied() {
    let context = process(&Context::new(), MY_NAT).unwrap();
    let result = process(&context, "(the MyNat my-add1)");
    assert!(matches!(
        result,
        Err(Message::ConstructorArity { expected: 1, found: 0, .. }),
    ));
}

const MY_LIST: &str = "
(data MyList ((E U)) ()
  (my-nil () (MyList E))
  (my-cons ((e E) (es (MyList E))) (MyList E)))

(claim my-length (Π ((E U)) (-> (MyList E) Nat)))
(define my-length
  (λ (E es)
    (elim-MyList es (λ (xs) Nat) 0 (λ (e es ih) (add1 ih)))))
";

#[test]
fn my_list() {
    let context = process(&Context::new(), MY_LIST).unwrap();

    assert_eq!(
        normalize(&context, "(my-cons Atom 'a (my-nil Atom))"),
        ("(MyList Atom)".to_owned(), "(my-cons Atom 'a (my-nil Atom))".to_owned()),
    );
    let list = "(my-cons Atom 'a (my-cons Atom 'b (my-nil Atom)))";
    assert_eq!(normalize(&context, &format!("(my-length Atom {list})")).1, "2");
}

#[test]
fn my_list_of_one_nat() {
    let context = process(&Context::new(), MY_LIST).unwrap();

    let list = "(my-cons Nat 1 (my-nil Nat))";
    assert_eq!(normalize(&context, list).0, "(MyList Nat)");
    assert_eq!(
        normalize(&context, &format!("(my-length Nat {list})")),
        ("Nat".to_owned(), "1".to_owned()),
    );
}

#[test]
fn my_list_elements_are_checked_against_the_parameter() {
    let context = process(&Context::new(), MY_LIST).unwrap();
    let result = process(&context, "(my-cons Atom 1 (my-nil Atom))");
    assert!(matches!(result, Err(Message::MismatchedTypes { .. })));
}

const MY_VEC: &str = "
(data MyVec ((E U)) ((n Nat))
  (my-vecnil () (MyVec E zero))
  (my-vec:: ((k Nat) (e E) (es (MyVec E k))) (MyVec E (add1 k))))

(claim sum (Π ((n Nat)) (-> (MyVec Nat n) Nat)))
(define sum
  (λ (n v)
    (elim-MyVec v
      (λ (k xs) Nat)
      0
      (λ (k e es ih) (iter-Nat e ih (λ (acc) (add1 acc)))))))
";

#[test]
fn my_vec() {
    let context = process(&Context::new(), MY_VEC).unwrap();

    let vec = "(my-vec:: Nat 2 1 (my-vec:: Nat 1 2 (my-vec:: Nat 0 3 (my-vecnil Nat))))";
    assert_eq!(normalize(&context, vec).0, "(MyVec Nat 3)");
    assert_eq!(normalize(&context, &format!("(sum 3 {vec})")).1, "6");
}

#[test]
fn my_vec_of_two_sums_its_elements() {
    let context = process(&Context::new(), MY_VEC).unwrap();

    let vec = "(my-vec:: Nat 1 3 (my-vec:: Nat 0 4 (my-vecnil Nat)))";
    assert_eq!(normalize(&context, vec).0, "(MyVec Nat 2)");
    assert_eq!(
        normalize(&context, &format!("(sum 2 {vec})")),
        ("Nat".to_owned(), "7".to_owned()),
    );
}

#[test]
fn my_vec_lengths_are_checked() {
    let context = process(&Context::new(), MY_VEC).unwrap();
    let result = process(&context, "(sum 2 (my-vec:: Nat 0 1 (my-vecnil Nat)))");
    assert!(matches!(result, Err(Message::MismatchedTypes { .. })));
}

const LESS_THAN: &str = "
(data Less-Than () ((j Nat) (k Nat))
  (zero-smallest ((n Nat)) (Less-Than zero (add1 n)))
  (add1-smaller ((j Nat) (k Nat) (j<k (Less-Than j k))) (Less-Than (add1 j) (add1 k))))

(claim one<three (Less-Than 1 3))
(define one<three (add1-smaller 0 2 (zero-smallest 1)))

(claim difference (Π ((j Nat) (k Nat)) (-> (Less-Than j k) Nat)))
(define difference
  (λ (j k proof)
    (elim-Less-Than proof
      (λ (j k p) Nat)
      (λ (n) (add1 n))
      (λ (j k j<k ih) ih))))
";

#[test]
fn less_than() {
    let context = process(&Context::new(), LESS_THAN).unwrap();
    assert_eq!(normalize(&context, "(difference 1 3 one<three)").1, "2");
}

#[test]
fn less_than_one_two() {
    let context = process(
        &Context::new(),
        &format!(
            "{LESS_THAN}
            (claim one<two (Less-Than 1 2))
            (define one<two (add1-smaller 0 1 (zero-smallest 0)))

            (claim smaller (Π ((j Nat) (k Nat)) (-> (Less-Than j k) Nat)))
            (define smaller
              (λ (j k proof)
                (elim-Less-Than proof
                  (λ (j k p) Nat)
                  (λ (n) zero)
                  (λ (j k j<k ih) (add1 j)))))"
        ),
    )
    .unwrap();

    assert_eq!(normalize(&context, "(add1-smaller 0 1 (zero-smallest 0))").0, "(Less-Than 1 2)");
    assert_eq!(
        normalize(&context, "(smaller 1 2 one<two)"),
        ("Nat".to_owned(), "1".to_owned()),
    );
    assert_eq!(normalize(&context, "(difference 1 2 one<two)").1, "1");
}

#[test]
fn less_than_indices_are_checked() {
    let context = process(&Context::new(), LESS_THAN).unwrap();
    let result = process(&context, "(claim bad (Less-Than 1 1)) (define bad (zero-smallest 0))");
    assert!(matches!(result, Err(Message::MismatchedTypes { .. })));
}

#[test]
fn eliminator_targets_must_belong_to_the_datatype() {
    let context = process(&Context::new(), LESS_THAN).unwrap();
    let result = process(&context, "(elim-Less-Than 3 (λ (j k p) Nat) (λ (n) n) (λ (j k j<k ih) ih))");
    assert!(matches!(result, Err(Message::UnexpectedTarget { .. })));
}

#[test]
fn lambda_against_a_non_function_type() {
    let context = process(&Context::new(), "(claim five Nat)").unwrap();

    let source = "(define five (λ (x) x))";
    let message = process(&context, source).unwrap_err();
    match &message {
        Message::UnexpectedIntro { form, expected_former, .. } => {
            assert_eq!(*form, "λ");
            assert_eq!(*expected_former, "Π");
        }
        message => panic!("unexpected message: {message:?}"),
    }
    let start = message.range().start() as usize;
    assert_eq!(start, source.find("(λ").unwrap());

    // The claim is still waiting to be defined.
    let five = Symbol::intern("five");
    assert!(matches!(context.lookup(five), Some(Binder::Claim(_))));
    let context = process(&context, "(define five 5)").unwrap();
    assert!(matches!(context.lookup(five), Some(Binder::Define(_, _))));
}
