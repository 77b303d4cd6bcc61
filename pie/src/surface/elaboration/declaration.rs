//! Elaboration of datatype declarations.

use std::sync::Arc;

use fxhash::FxHashSet;

use super::{bind, spine, Elaborator, Message};
use crate::context::{Binder, Context, Renaming};
use crate::core;
use crate::core::datatype::{Binding, Constructor, Datatype};
use crate::core::semantics::EvalContext;
use crate::surface::{ConstructorDeclaration, DatatypeDeclaration, Param, Term};
use crate::symbol::Symbol;

impl Elaborator {
    /// Declare a datatype, returning a context extended with its type
    /// constructor, its constructors, and its eliminator.
    #[tracing::instrument(level = "trace", skip_all, fields(name = %declaration.name.1))]
    pub fn declare_datatype(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        declaration: &DatatypeDeclaration<'_>,
    ) -> Result<Context, Message> {
        self.speculate(|this| this.elaborate_declaration(context, renaming, declaration))
    }

    fn elaborate_declaration(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        declaration: &DatatypeDeclaration<'_>,
    ) -> Result<Context, Message> {
        let (_, name) = declaration.name;
        check_declared_names(context, declaration)?;

        // Parameters are in scope in the constructors, indices are not.
        let (param_context, param_renaming, params) =
            self.elaborate_telescope(context, renaming, declaration.params)?;
        let (_, _, indices) =
            self.elaborate_telescope(&param_context, &param_renaming, declaration.indices)?;
        tracing::trace!(params = params.len(), indices = indices.len(), "elaborated signature");

        let env = context.to_env();
        let placeholder = Arc::new(Datatype {
            name,
            params: params.into(),
            indices: indices.into(),
            constructors: Vec::new(),
            env: env.clone(),
        });
        let constructor_context = param_context.extend(name, Binder::Placeholder(placeholder.clone()));

        let constructors = (declaration.constructors.iter().enumerate())
            .map(|(index, constructor)| {
                self.elaborate_constructor(
                    &constructor_context,
                    &param_renaming,
                    &placeholder,
                    index,
                    constructor,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let datatype = Arc::new(Datatype {
            name,
            params: placeholder.params.clone(),
            indices: placeholder.indices.clone(),
            constructors,
            env,
        });

        let mut context = context.extend(name, Binder::Datatype(datatype.clone()));
        for constructor in &datatype.constructors {
            let binder = Binder::Constructor(datatype.clone(), constructor.index);
            context = context.extend(constructor.name, binder);
        }
        context = context.extend(datatype.eliminator_name(), Binder::Eliminator(datatype.clone()));

        tracing::debug!(
            %name,
            constructors = datatype.constructors.len(),
            "declared datatype",
        );
        Ok(context)
    }

    /// Elaborate a sequence of bindings, each of which may mention the ones
    /// before it.
    fn elaborate_telescope(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        params: &[Param<'_>],
    ) -> Result<(Context, Renaming, Vec<Binding>), Message> {
        let mut context = context.clone();
        let mut renaming = renaming.clone();
        let mut bindings = Vec::with_capacity(params.len());

        for param in params {
            let r#type = self.is_type(&context, &renaming, &param.r#type)?;
            let type_value = context.eval(&r#type);
            let (next_context, next_renaming, name) = bind(&context, &renaming, param.name, type_value);
            bindings.push(Binding::new(name, r#type));
            context = next_context;
            renaming = next_renaming;
        }

        Ok((context, renaming, bindings))
    }

    fn elaborate_constructor(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        signature: &Datatype,
        index: usize,
        declaration: &ConstructorDeclaration<'_>,
    ) -> Result<Constructor, Message> {
        let mut context = context.clone();
        let mut renaming = renaming.clone();
        let mut args = Vec::with_capacity(declaration.args.len());
        let mut recursive = Vec::with_capacity(declaration.args.len());

        for arg in declaration.args {
            let r#type = self.is_type(&context, &renaming, &arg.r#type)?;
            recursive.push(check_recursive_arg(signature, &arg.r#type, &r#type)?);

            let type_value = context.eval(&r#type);
            let (next_context, next_renaming, name) = bind(&context, &renaming, arg.name, type_value);
            args.push(Binding::new(name, r#type));
            context = next_context;
            renaming = next_renaming;
        }

        let result_indices = self.elaborate_result(&context, &renaming, signature, &declaration.result)?;
        tracing::trace!(name = %declaration.name.1, "elaborated constructor");

        Ok(Constructor {
            name: declaration.name.1,
            index,
            type_name: signature.name,
            args: args.into(),
            recursive,
            result_indices,
        })
    }

    /// Check the result type of a constructor, which must be the datatype
    /// applied to exactly its own parameters, followed by some indices.
    fn elaborate_result(
        &mut self,
        context: &Context,
        renaming: &Renaming,
        signature: &Datatype,
        result: &Term<'_>,
    ) -> Result<Vec<core::Term>, Message> {
        let bad_pattern = || Message::BadResultPattern {
            range: result.range(),
            datatype: signature.name,
            expected: expected_pattern(signature),
        };

        let (head, args) = spine(result);
        match head {
            Term::Name(_, head) if renaming.rename(*head) == signature.name => {}
            _ => return Err(bad_pattern()),
        }
        if args.len() != signature.arity() {
            return Err(bad_pattern());
        }

        let (param_args, index_args) = args.split_at(signature.params.len());
        for (arg, binding) in param_args.iter().zip(signature.params.iter()) {
            match arg {
                Term::Name(_, name) if renaming.rename(*name) == binding.name => {}
                _ => return Err(bad_pattern()),
            }
        }

        let mut env = context.to_env();
        let mut result_indices = Vec::with_capacity(index_args.len());
        for (arg, binding) in index_args.iter().zip(signature.indices.iter()) {
            let r#type = EvalContext::new(&env).eval(&binding.r#type);
            let index = self.check(context, renaming, arg, &r#type)?;
            env.push(binding.name, context.eval(&index));
            result_indices.push(index);
        }

        Ok(result_indices)
    }
}

/// The datatype, its constructors and its eliminator must all be new names.
fn check_declared_names(
    context: &Context,
    declaration: &DatatypeDeclaration<'_>,
) -> Result<(), Message> {
    let (location, name) = declaration.name;
    let eliminator_name = Symbol::intern(format!("elim-{name}"));

    let declared = std::iter::once(declaration.name)
        .chain(declaration.constructors.iter().map(|c| c.name))
        .chain(std::iter::once((location, eliminator_name)));

    let mut seen = FxHashSet::default();
    for (location, name) in declared {
        let range = location.range();
        if context.contains(name) {
            return Err(Message::AlreadyBound { range, name });
        }
        if !seen.insert(name) {
            return Err(Message::DuplicateName { range, name });
        }
    }

    let mut seen = FxHashSet::default();
    seen.insert(name);
    for param in declaration.params.iter().chain(declaration.indices.iter()) {
        let (location, name) = param.name;
        if !seen.insert(name) {
            let range = location.range();
            return Err(Message::DuplicateName { range, name });
        }
    }

    Ok(())
}

/// Decide whether a constructor argument is recursive. Recursive arguments
/// must be the datatype applied to its own parameters, and the datatype may
/// not appear anywhere else in an argument's type.
fn check_recursive_arg(
    signature: &Datatype,
    surface_type: &Term<'_>,
    r#type: &core::Term,
) -> Result<bool, Message> {
    let range = surface_type.range();
    let datatype = signature.name;

    match r#type {
        core::Term::TypeConstructor(name, params, indices) if *name == datatype => {
            for (param, binding) in params.iter().zip(signature.params.iter()) {
                match param {
                    core::Term::Var(var) if *var == binding.name => {}
                    _ => {
                        return Err(Message::NonUniformParameter {
                            range,
                            datatype,
                            expected: binding.name,
                            found: param.to_string(),
                        })
                    }
                }
            }
            if indices.iter().any(|index| index.mentions_datatype(datatype)) {
                return Err(Message::InvalidRecursiveReference { range, datatype });
            }
            Ok(true)
        }
        r#type if r#type.mentions_datatype(datatype) => {
            Err(Message::InvalidRecursiveReference { range, datatype })
        }
        _ => Ok(false),
    }
}

fn expected_pattern(signature: &Datatype) -> String {
    let params = signature.params.iter().map(|binding| binding.name.to_string());
    let indices = signature.indices.iter().map(|binding| format!("<{}>", binding.name));
    let parts = std::iter::once(signature.name.to_string())
        .chain(params)
        .chain(indices)
        .collect::<Vec<_>>();
    match parts.len() {
        1 => parts[0].clone(),
        _ => format!("({})", parts.join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use scoped_arena::Scope;

    use super::*;
    use crate::source::FileId;
    use crate::surface::{Item, Module};

    fn declare(context: &Context, source: &str) -> Result<Context, Message> {
        let scope = Scope::new();
        let file_id = FileId::try_from(1).unwrap();
        let module = Module::parse(&scope, file_id, source).unwrap();
        let mut elaborator = Elaborator::new();
        let mut context = context.clone();
        for item in module.items {
            match item {
                Item::Data(declaration) => {
                    context = elaborator.declare_datatype(&context, &Renaming::new(), declaration)?;
                }
                item => panic!("expected a datatype declaration, found {item:?}"),
            }
        }
        Ok(context)
    }

    const MY_LIST: &str = "(data MyList ((E U)) () (my-nil () (MyList E)) (my-cons ((e E) (es (MyList E))) (MyList E)))";

    #[test]
    fn declarations_bind_every_name() {
        let context = declare(&Context::new(), MY_LIST).unwrap();
        let my_list = Symbol::intern("MyList");

        assert!(matches!(context.lookup(my_list), Some(Binder::Datatype(_))));
        assert!(matches!(context.lookup(Symbol::intern("my-nil")), Some(Binder::Constructor(_, 0))));
        assert!(matches!(context.lookup(Symbol::intern("my-cons")), Some(Binder::Constructor(_, 1))));
        assert!(matches!(context.lookup(Symbol::intern("elim-MyList")), Some(Binder::Eliminator(_))));

        let datatype = context.datatype(my_list).unwrap();
        assert_eq!(datatype.params.len(), 1);
        assert!(datatype.indices.is_empty());
        assert_eq!(datatype.constructors[1].recursive, [false, true]);
    }

    #[test]
    fn names_cannot_be_redeclared() {
        let context = declare(&Context::new(), MY_LIST).unwrap();
        let result = declare(&context, "(data MyList () () (other () MyList))");
        assert!(matches!(result, Err(Message::AlreadyBound { .. })));
    }

    #[test]
    fn constructor_names_must_be_distinct() {
        let result = declare(&Context::new(), "(data Two () () (one () Two) (one () Two))");
        assert!(matches!(result, Err(Message::DuplicateName { .. })));
    }

    #[test]
    fn parameters_must_be_uniform() {
        let source = "(data Bad ((E U)) () (bad ((b (Bad Nat))) (Bad E)))";
        let result = declare(&Context::new(), source);
        assert!(matches!(result, Err(Message::NonUniformParameter { .. })));
    }

    #[test]
    fn recursive_occurrences_must_be_direct() {
        let source = "(data Bad () () (bad ((f (-> Bad Nat))) Bad))";
        let result = declare(&Context::new(), source);
        assert!(matches!(result, Err(Message::InvalidRecursiveReference { .. })));
    }

    #[test]
    fn results_must_apply_the_datatype_to_its_parameters() {
        let source = "(data Bad ((E U)) () (bad () (Bad Nat)))";
        let result = declare(&Context::new(), source);
        assert!(matches!(result, Err(Message::BadResultPattern { .. })));
    }

    #[test]
    fn indices_are_not_in_scope_in_constructors() {
        let source = "(data Bad () ((n Nat)) (bad ((v (Vec Atom n))) (Bad zero)))";
        let result = declare(&Context::new(), source);
        assert!(matches!(result, Err(Message::UnboundName { .. })));
    }

    #[test]
    fn failed_declarations_leave_the_context_unchanged() {
        let context = Context::new();
        let result = declare(&context, "(data Bad () () (bad () Nat))");
        assert!(result.is_err());
        assert!(context.is_empty());
    }

    #[test]
    fn expected_patterns_name_the_parameters() {
        let context = declare(&Context::new(), MY_LIST).unwrap();
        let datatype = context.datatype(Symbol::intern("MyList")).unwrap();
        assert_eq!(expected_pattern(datatype), "(MyList E)");
    }
}
