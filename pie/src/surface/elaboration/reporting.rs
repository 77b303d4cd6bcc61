use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::source::{FileId, FileRange};
use crate::symbol::Symbol;

/// Elaboration diagnostic messages.
#[derive(Debug, Clone)]
pub enum Message {
    /// The name was not previously bound in the current scope.
    UnboundName {
        range: FileRange,
        name: Symbol,
        suggestion: Option<Symbol>,
    },
    /// The name was claimed, but has not been defined yet.
    ClaimNotDefined {
        range: FileRange,
        name: Symbol,
    },
    AlreadyBound {
        range: FileRange,
        name: Symbol,
    },
    DefineWithoutClaim {
        range: FileRange,
        name: Symbol,
    },
    AlreadyDefined {
        range: FileRange,
        name: Symbol,
    },
    /// The same name was used twice in a datatype declaration.
    DuplicateName {
        range: FileRange,
        name: Symbol,
    },
    /// The term needs a type annotation.
    CannotSynth {
        range: FileRange,
        form: &'static str,
    },
    /// `U` is a type, but it does not have a type.
    UniverseHasNoType {
        range: FileRange,
    },
    /// An introduction form was checked against a type with a different
    /// type former.
    UnexpectedIntro {
        range: FileRange,
        form: &'static str,
        expected_former: &'static str,
        expected_type: String,
    },
    /// The target of an elimination has the wrong type.
    UnexpectedType {
        range: FileRange,
        expected_former: &'static str,
        found_type: String,
    },
    UnexpectedArgument {
        head_range: FileRange,
        head_type: String,
        arg_range: FileRange,
    },
    MismatchedTypes {
        range: FileRange,
        expected_type: String,
        found_type: String,
    },
    /// Two expressions were required to be the same, but were not.
    NotTheSame {
        range: FileRange,
        r#type: String,
        left: String,
        right: String,
    },
    /// The length of a vector did not have the required shape.
    MismatchedLength {
        range: FileRange,
        form: &'static str,
        expected_len: &'static str,
        found_len: String,
    },
    /// The function passed to `cong` has a dependent result type.
    DependentCong {
        range: FileRange,
        function_type: String,
    },
    NegativeNumeral {
        range: FileRange,
    },
    InvalidNumeral {
        range: FileRange,
        message: String,
    },
    InvalidAtom {
        range: FileRange,
        symbol: Symbol,
    },
    ConstructorArity {
        range: FileRange,
        name: Symbol,
        expected: usize,
        found: usize,
    },
    EliminatorArity {
        range: FileRange,
        name: Symbol,
        expected: usize,
        found: usize,
    },
    TypeConstructorArity {
        range: FileRange,
        name: Symbol,
        expected: usize,
        found: usize,
    },
    /// The target of a datatype eliminator is not an inhabitant of the
    /// datatype.
    UnexpectedTarget {
        range: FileRange,
        datatype: Symbol,
        found_type: String,
    },
    /// A recursive constructor argument applied the datatype to something
    /// other than its declared parameters.
    NonUniformParameter {
        range: FileRange,
        datatype: Symbol,
        expected: Symbol,
        found: String,
    },
    /// The datatype was mentioned somewhere other than as the whole type of
    /// a constructor argument.
    InvalidRecursiveReference {
        range: FileRange,
        datatype: Symbol,
    },
    /// The result type of a constructor is not the datatype applied to its
    /// parameters and some indices.
    BadResultPattern {
        range: FileRange,
        datatype: Symbol,
        expected: String,
    },
}

impl Message {
    pub fn range(&self) -> FileRange {
        match self {
            Message::UnboundName { range, .. }
            | Message::ClaimNotDefined { range, .. }
            | Message::AlreadyBound { range, .. }
            | Message::DefineWithoutClaim { range, .. }
            | Message::AlreadyDefined { range, .. }
            | Message::DuplicateName { range, .. }
            | Message::CannotSynth { range, .. }
            | Message::UniverseHasNoType { range }
            | Message::UnexpectedIntro { range, .. }
            | Message::UnexpectedType { range, .. }
            | Message::MismatchedTypes { range, .. }
            | Message::NotTheSame { range, .. }
            | Message::MismatchedLength { range, .. }
            | Message::DependentCong { range, .. }
            | Message::NegativeNumeral { range }
            | Message::InvalidNumeral { range, .. }
            | Message::InvalidAtom { range, .. }
            | Message::ConstructorArity { range, .. }
            | Message::EliminatorArity { range, .. }
            | Message::TypeConstructorArity { range, .. }
            | Message::UnexpectedTarget { range, .. }
            | Message::NonUniformParameter { range, .. }
            | Message::InvalidRecursiveReference { range, .. }
            | Message::BadResultPattern { range, .. } => *range,
            Message::UnexpectedArgument { arg_range, .. } => *arg_range,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        let primary_label = |range: &FileRange| Label::primary(range.file_id(), *range);
        let secondary_label = |range: &FileRange| Label::secondary(range.file_id(), *range);

        match self {
            Message::UnboundName {
                range,
                name,
                suggestion,
            } => Diagnostic::error()
                .with_message(format!("cannot find `{name}` in scope"))
                .with_labels(vec![primary_label(range).with_message("unbound name")])
                .with_notes(match suggestion {
                    Some(suggestion) => vec![format!("help: did you mean `{suggestion}`?")],
                    None => Vec::new(),
                }),
            Message::ClaimNotDefined { range, name } => Diagnostic::error()
                .with_message(format!("`{name}` has been claimed, but not yet defined"))
                .with_labels(vec![primary_label(range).with_message("undefined name")])
                .with_notes(vec![format!("help: add `(define {name} ...)` before using it")]),
            Message::AlreadyBound { range, name } => Diagnostic::error()
                .with_message(format!("the name `{name}` is already in use"))
                .with_labels(vec![primary_label(range).with_message("already bound")]),
            Message::DefineWithoutClaim { range, name } => Diagnostic::error()
                .with_message(format!("cannot define `{name}` without a claim"))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![format!("help: add `(claim {name} ...)` first")]),
            Message::AlreadyDefined { range, name } => Diagnostic::error()
                .with_message(format!("`{name}` is already defined"))
                .with_labels(vec![primary_label(range).with_message("redefinition")]),
            Message::DuplicateName { range, name } => Diagnostic::error()
                .with_message(format!("the name `{name}` is declared more than once"))
                .with_labels(vec![primary_label(range).with_message("duplicate name")]),
            Message::CannotSynth { range, form } => Diagnostic::error()
                .with_message(format!("cannot determine the type of `{form}`"))
                .with_labels(vec![primary_label(range).with_message("type annotation needed")])
                .with_notes(vec!["help: use `(the TYPE ...)` to annotate it".to_owned()]),
            Message::UniverseHasNoType { range } => Diagnostic::error()
                .with_message("`U` is a type, but it does not have a type")
                .with_labels(vec![primary_label(range)]),
            Message::UnexpectedIntro {
                range,
                form,
                expected_former,
                expected_type,
            } => Diagnostic::error()
                .with_message(format!("`{form}` requires a `{expected_former}` type"))
                .with_labels(vec![primary_label(range)
                    .with_message(format!("expected a value of type `{expected_type}`"))]),
            Message::UnexpectedType {
                range,
                expected_former,
                found_type,
            } => Diagnostic::error()
                .with_message(format!("expected an expression with a `{expected_former}` type"))
                .with_labels(vec![
                    primary_label(range).with_message(format!("expression of type `{found_type}`"))
                ]),
            Message::UnexpectedArgument {
                head_range,
                head_type,
                arg_range,
            } => Diagnostic::error()
                .with_message("expression was applied to an unexpected argument")
                .with_labels(vec![
                    primary_label(arg_range).with_message("unexpected argument"),
                    secondary_label(head_range)
                        .with_message(format!("expression of type `{head_type}`")),
                ]),
            Message::MismatchedTypes {
                range,
                expected_type,
                found_type,
            } => Diagnostic::error()
                .with_message("mismatched types")
                .with_labels(vec![primary_label(range).with_message("type mismatch")])
                .with_notes(vec![[
                    format!("expected `{expected_type}`"),
                    format!("   found `{found_type}`"),
                ]
                .join("\n")]),
            Message::NotTheSame {
                range,
                r#type,
                left,
                right,
            } => Diagnostic::error()
                .with_message(format!("the expressions are not the same `{}`", r#type))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![[format!("   `{left}`"), format!("is not `{right}`")].join("\n")]),
            Message::MismatchedLength {
                range,
                form,
                expected_len,
                found_len,
            } => Diagnostic::error()
                .with_message(format!("`{form}` requires a vector of length `{expected_len}`"))
                .with_labels(vec![
                    primary_label(range).with_message(format!("found length `{found_len}`"))
                ]),
            Message::DependentCong {
                range,
                function_type,
            } => Diagnostic::error()
                .with_message("the function given to `cong` must not have a dependent type")
                .with_labels(vec![primary_label(range)
                    .with_message(format!("function of type `{function_type}`"))]),
            Message::NegativeNumeral { range } => Diagnostic::error()
                .with_message("natural numbers cannot be negative")
                .with_labels(vec![primary_label(range)]),
            Message::InvalidNumeral { range, message } => Diagnostic::error()
                .with_message(format!("failed to parse numeral ({message})"))
                .with_labels(vec![primary_label(range)]),
            Message::InvalidAtom { range, symbol } => Diagnostic::error()
                .with_message(format!("invalid atom `'{symbol}`"))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec!["atoms may only contain letters and hyphens".to_owned()]),
            Message::ConstructorArity {
                range,
                name,
                expected,
                found,
            } => Diagnostic::error()
                .with_message(format!(
                    "constructor `{name}` expects {expected} arguments, but was given {found}"
                ))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec!["the datatype's parameters come first".to_owned()]),
            Message::EliminatorArity {
                range,
                name,
                expected,
                found,
            } => Diagnostic::error()
                .with_message(format!(
                    "`{name}` expects {expected} arguments, but was given {found}"
                ))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![
                    "expected a target, a motive, and one method per constructor".to_owned(),
                ]),
            Message::TypeConstructorArity {
                range,
                name,
                expected,
                found,
            } => Diagnostic::error()
                .with_message(format!(
                    "type constructor `{name}` expects {expected} arguments, but was given {found}"
                ))
                .with_labels(vec![primary_label(range)]),
            Message::UnexpectedTarget {
                range,
                datatype,
                found_type,
            } => Diagnostic::error()
                .with_message(format!("expected a target of type `{datatype}`"))
                .with_labels(vec![
                    primary_label(range).with_message(format!("expression of type `{found_type}`"))
                ]),
            Message::NonUniformParameter {
                range,
                datatype,
                expected,
                found,
            } => Diagnostic::error()
                .with_message(format!("parameters of `{datatype}` must be used uniformly"))
                .with_labels(vec![primary_label(range)
                    .with_message(format!("expected `{expected}`, found `{found}`"))]),
            Message::InvalidRecursiveReference { range, datatype } => Diagnostic::error()
                .with_message(format!("invalid recursive reference to `{datatype}`"))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![format!(
                    "`{datatype}` may only appear as the whole type of a constructor argument"
                )]),
            Message::BadResultPattern {
                range,
                datatype,
                expected,
            } => Diagnostic::error()
                .with_message(format!("constructors must construct a `{datatype}`"))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![format!("expected a type of the form `{expected}`")]),
        }
    }
}

/// Find a name that was probably meant instead of `name`.
pub fn suggest_name(name: Symbol, candidates: impl Iterator<Item = Symbol>) -> Option<Symbol> {
    let name = name.resolve();
    candidates
        .filter(|candidate| candidate.resolve() != name)
        .map(|candidate| (levenshtein::levenshtein(name, candidate.resolve()), candidate))
        .filter(|(distance, _)| *distance <= usize::max(1, name.chars().count() / 3))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_close() {
        let candidates = ["length", "append", "vec-append"].map(Symbol::intern);
        assert_eq!(
            suggest_name(Symbol::intern("lenght"), candidates.into_iter()),
            Some(Symbol::intern("length")),
        );
        assert_eq!(suggest_name(Symbol::intern("zzz"), candidates.into_iter()), None);
    }
}
