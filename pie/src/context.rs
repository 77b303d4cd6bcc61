//! Typing contexts and renamings.

use std::fmt;
use std::sync::Arc;

use ::pretty::RcDoc;

use crate::core::datatype::{self, Datatype};
use crate::core::pretty;
use crate::core::semantics::{
    ArcValue, ConversionContext, Env, EvalContext, ReadBackContext, Value,
};
use crate::core::Term;
use crate::env::SharedEnv;
use crate::symbol::Symbol;

/// What a name in the context stands for.
#[derive(Debug, Clone)]
pub enum Binder {
    /// A variable bound by a Π, Σ or λ.
    Free(ArcValue),
    /// A top-level name that has been claimed but not yet defined.
    Claim(ArcValue),
    /// A top-level definition: type and value.
    Define(ArcValue, ArcValue),
    /// A datatype that is in the middle of being declared.
    Placeholder(Arc<Datatype>),
    Datatype(Arc<Datatype>),
    /// A constructor, along with its position in the datatype.
    Constructor(Arc<Datatype>, usize),
    Eliminator(Arc<Datatype>),
}

/// An ordered, persistent mapping from names to binders.
///
/// Contexts are never updated in place: every extension returns a new
/// context that shares structure with the old one.
#[derive(Debug, Clone, Default)]
pub struct Context {
    binders: SharedEnv<Binder>,
    /// The values of the variables and definitions in scope.
    env: Env,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }

    pub fn lookup(&self, name: Symbol) -> Option<&Binder> {
        self.binders.get(name)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.binders.contains(name)
    }

    pub fn binders(&self) -> impl '_ + DoubleEndedIterator<Item = (Symbol, &Binder)> {
        self.binders.iter()
    }

    /// A variant of `name` that is not bound in this context.
    pub fn fresh(&self, name: Symbol) -> Symbol {
        name.freshen(|name| self.binders.contains(name))
    }

    /// Extend the context with a binder. Free variables and definitions are
    /// also added to the environment.
    pub fn extend(&self, name: Symbol, binder: Binder) -> Context {
        let env = match &binder {
            Binder::Free(r#type) => self.env.extend(name, Value::var(r#type.clone(), name)),
            Binder::Define(_, value) => self.env.extend(name, value.clone()),
            Binder::Claim(_)
            | Binder::Placeholder(_)
            | Binder::Datatype(_)
            | Binder::Constructor(_, _)
            | Binder::Eliminator(_) => self.env.clone(),
        };

        Context {
            binders: self.binders.extend(name, binder),
            env,
        }
    }

    pub fn bind_free(&self, name: Symbol, r#type: ArcValue) -> Context {
        self.extend(name, Binder::Free(r#type))
    }

    pub fn claim(&self, name: Symbol, r#type: ArcValue) -> Context {
        self.extend(name, Binder::Claim(r#type))
    }

    /// Define a claimed name, replacing its claim.
    pub fn define(&self, name: Symbol, r#type: ArcValue, value: ArcValue) -> Context {
        let context = Context {
            binders: self.binders.remove(name),
            env: self.env.clone(),
        };
        context.extend(name, Binder::Define(r#type, value))
    }

    /// The evaluation environment for terms elaborated in this context.
    pub fn to_env(&self) -> Env {
        self.env.clone()
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Lookup a datatype record by the name of its type constructor,
    /// including one that is still being declared.
    pub fn datatype(&self, name: Symbol) -> Option<&Arc<Datatype>> {
        match self.lookup(name)? {
            Binder::Datatype(datatype) | Binder::Placeholder(datatype) => Some(datatype),
            _ => None,
        }
    }

    pub fn eval(&self, term: &Term) -> ArcValue {
        EvalContext::new(&self.env).eval(term)
    }

    pub fn read_back(&self, r#type: &ArcValue, value: &ArcValue) -> Term {
        ReadBackContext::new(self).read_back(r#type, value)
    }

    pub fn read_back_type(&self, r#type: &ArcValue) -> Term {
        ReadBackContext::new(self).read_back_type(r#type)
    }

    pub fn same_type(&self, type0: &ArcValue, type1: &ArcValue) -> bool {
        ConversionContext::new(self).same_type(type0, type1)
    }

    pub fn convert(&self, r#type: &ArcValue, value0: &ArcValue, value1: &ArcValue) -> bool {
        ConversionContext::new(self).convert(r#type, value0, value1)
    }

    /// Serialize the context, from the least recently bound entry. Each
    /// entry is read back in the context of the entries before it.
    pub fn read_back_context(&self) -> Vec<ContextEntry> {
        let mut prefix = Context::new();
        let mut entries = Vec::with_capacity(self.len());

        for (name, binder) in self.binders.iter() {
            let entry = |kind, r#type: &ArcValue, value: Option<Term>| ContextEntry {
                name,
                kind,
                r#type: prefix.read_back_type(r#type),
                value,
            };

            entries.push(match binder {
                Binder::Free(r#type) => entry(EntryKind::Free, r#type, None),
                Binder::Claim(r#type) => entry(EntryKind::Claim, r#type, None),
                Binder::Define(r#type, value) => {
                    entry(EntryKind::Def, r#type, Some(prefix.read_back(r#type, value)))
                }
                Binder::Placeholder(datatype) | Binder::Datatype(datatype) => {
                    entry(EntryKind::Def, &datatype::type_constructor_type(datatype), None)
                }
                Binder::Constructor(datatype, index) => {
                    entry(EntryKind::Def, &datatype::constructor_type(datatype, *index), None)
                }
                Binder::Eliminator(datatype) => {
                    entry(EntryKind::Def, &datatype::eliminator_type(datatype), None)
                }
            });

            prefix = prefix.extend(name, binder.clone());
        }

        entries
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Free,
    Claim,
    Def,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Free => "free",
            EntryKind::Claim => "claim",
            EntryKind::Def => "def",
        }
    }
}

/// A serialized context entry.
#[derive(Debug, Clone)]
pub struct ContextEntry {
    pub name: Symbol,
    pub kind: EntryKind,
    pub r#type: Term,
    pub value: Option<Term>,
}

impl ContextEntry {
    pub fn to_doc(&self, pp: &pretty::Context) -> RcDoc<'static> {
        let mut docs = vec![
            RcDoc::text(self.kind.as_str()),
            RcDoc::text(self.name.resolve().to_owned()),
            pp.term(&self.r#type),
        ];
        docs.extend(self.value.iter().map(|value| pp.term(value)));
        pp.sexpr(docs)
    }
}

impl fmt::Display for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.to_doc(&pretty::Context::new());
        write!(f, "{}", doc.pretty(f.width().unwrap_or(80)))
    }
}

/// A mapping from the names written by the user to the names used in core
/// terms. Names that have not been renamed stand for themselves.
#[derive(Debug, Clone, Default)]
pub struct Renaming {
    names: SharedEnv<Symbol>,
}

impl Renaming {
    pub fn new() -> Renaming {
        Renaming::default()
    }

    pub fn extend(&self, from: Symbol, to: Symbol) -> Renaming {
        Renaming {
            names: self.names.extend(from, to),
        }
    }

    pub fn get(&self, name: Symbol) -> Option<Symbol> {
        self.names.get(name).copied()
    }

    pub fn rename(&self, name: Symbol) -> Symbol {
        self.get(name).unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nat() -> ArcValue {
        Arc::new(Value::Nat)
    }

    #[test]
    fn define_replaces_claim() {
        let x = Symbol::intern("x");
        let claimed = Context::new().claim(x, nat());
        let defined = claimed.define(x, nat(), claimed.eval(&Term::nat(2)));

        assert!(matches!(claimed.lookup(x), Some(Binder::Claim(_))));
        assert!(matches!(defined.lookup(x), Some(Binder::Define(_, _))));
        assert_eq!(defined.len(), 1);
        assert!(claimed.env().get(x).is_none());
        assert!(defined.env().get(x).is_some());
    }

    #[test]
    fn fresh_names_avoid_bound_names() {
        let x = Symbol::intern("x");
        let context = Context::new().bind_free(x, nat());
        assert_eq!(context.fresh(x), Symbol::intern("x₁"));
        assert_eq!(context.fresh(Symbol::intern("y")), Symbol::intern("y"));
    }

    #[test]
    fn renamings_fall_back_to_the_name_itself() {
        let (x, x1, y) = (Symbol::intern("x"), Symbol::intern("x₁"), Symbol::intern("y"));
        let renaming = Renaming::new().extend(x, x1);
        assert_eq!(renaming.rename(x), x1);
        assert_eq!(renaming.rename(y), y);
    }

    #[test]
    fn read_back_context_lists_entries_in_order() {
        let (a, b, c) = (Symbol::intern("a"), Symbol::intern("b"), Symbol::intern("c"));
        let context = Context::new()
            .bind_free(a, nat())
            .claim(b, Arc::new(Value::Atom))
            .claim(c, nat());
        let context = context.define(c, nat(), context.eval(&Term::Var(a)));

        let entries = context.read_back_context();
        let summary = (entries.iter())
            .map(|entry| (entry.name, entry.kind))
            .collect::<Vec<_>>();
        assert_eq!(summary, [(a, EntryKind::Free), (b, EntryKind::Claim), (c, EntryKind::Def)]);
        assert_eq!(entries[2].to_string(), "(def c Nat a)");
    }
}
