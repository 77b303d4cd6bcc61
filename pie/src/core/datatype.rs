//! User-declared inductive datatypes.
//!
//! A [`Datatype`] records everything needed to type and evaluate the type
//! constructor, the constructors, and the eliminator of a datatype. The
//! types of motives and methods are computed on demand from the record, as
//! values built out of higher-order closures.

use std::fmt;
use std::sync::Arc;

use crate::core::semantics::{do_app, ArcValue, ConstructorValue, Env, EvalContext, Value};
use crate::core::Term;
use crate::symbol::Symbol;

/// A named entry in a telescope: a parameter, an index, or a constructor
/// argument. The type may mention the names bound before it.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: Symbol,
    pub r#type: Term,
}

impl Binding {
    pub fn new(name: Symbol, r#type: Term) -> Binding {
        Binding { name, r#type }
    }
}

/// An inductive datatype declaration, after elaboration.
pub struct Datatype {
    pub name: Symbol,
    /// Uniform parameters, shared by every constructor.
    pub params: Arc<[Binding]>,
    /// Indices, which may vary between constructors.
    pub indices: Arc<[Binding]>,
    pub constructors: Vec<Constructor>,
    /// The environment the declaration was elaborated in.
    pub env: Env,
}

impl Datatype {
    /// The name of the eliminator, `elim-<Name>`.
    pub fn eliminator_name(&self) -> Symbol {
        Symbol::intern(format!("elim-{}", self.name))
    }

    pub fn constructor(&self, name: Symbol) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.name == name)
    }

    /// The number of arguments the type constructor expects.
    pub fn arity(&self) -> usize {
        self.params.len() + self.indices.len()
    }

    fn param_env(&self, params: &[ArcValue]) -> Env {
        let mut env = self.env.clone();
        for (binding, param) in self.params.iter().zip(params) {
            env.push(binding.name, param.clone());
        }
        env
    }
}

impl fmt::Debug for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datatype")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("indices", &self.indices)
            .field("constructors", &self.constructors)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: Symbol,
    /// Position of the constructor in the declaration.
    pub index: usize,
    pub type_name: Symbol,
    /// Arguments in declaration order. Their types may mention the
    /// parameters and the preceding arguments.
    pub args: Arc<[Binding]>,
    /// Whether each argument's type is the datatype itself.
    pub recursive: Vec<bool>,
    /// The indices of the constructed value, in terms of the parameters and
    /// arguments.
    pub result_indices: Vec<Term>,
}

impl Constructor {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_recursive(&self, position: usize) -> bool {
        self.recursive.get(position).copied().unwrap_or(false)
    }

    pub fn non_recursive_args(&self) -> impl Iterator<Item = &Binding> {
        (self.args.iter().enumerate())
            .filter(|(position, _)| !self.is_recursive(*position))
            .map(|(_, arg)| arg)
    }

    pub fn recursive_args(&self) -> impl Iterator<Item = &Binding> {
        (self.args.iter().enumerate())
            .filter(|(position, _)| self.is_recursive(*position))
            .map(|(_, arg)| arg)
    }

    /// The index expressions of a recursive argument's type.
    fn recursive_indices(&self, position: usize) -> Option<&[Term]> {
        match &self.args[position].r#type {
            Term::TypeConstructor(_, _, indices) if self.is_recursive(position) => Some(indices),
            _ => None,
        }
    }
}

type Finish = Arc<dyn Fn(Env, Vec<ArcValue>) -> ArcValue + Send + Sync>;

/// Build a Π-type over each of the bindings in turn, passing the bound
/// values to `finish` to construct the final body type.
fn telescope(env: Env, bindings: Arc<[Binding]>, values: Vec<ArcValue>, finish: Finish) -> ArcValue {
    let (name, r#type) = match bindings.get(values.len()) {
        None => return finish(env, values),
        Some(binding) => (binding.name, EvalContext::new(&env).eval(&binding.r#type)),
    };

    Value::pi(name, r#type, move |value| {
        let mut values = values.clone();
        values.push(value.clone());
        telescope(env.extend(name, value), bindings.clone(), values, finish.clone())
    })
}

/// Apply a motive to some indices, and then to a target.
pub fn apply_motive(motive: &ArcValue, indices: &[ArcValue], target: &ArcValue) -> ArcValue {
    let motive = (indices.iter()).fold(motive.clone(), |motive, index| do_app(&motive, index));
    do_app(&motive, target)
}

pub fn constructor_value(
    datatype: &Datatype,
    index: usize,
    params: Vec<ArcValue>,
    args: Vec<ArcValue>,
) -> ArcValue {
    Arc::new(Value::Constructor(ConstructorValue {
        name: datatype.constructors[index].name,
        type_name: datatype.name,
        index,
        params,
        args,
    }))
}

/// The type of motives for a datatype, applied to some parameters:
///
/// ```text
/// (Π ((index Index) ... (target (Name param ... index ...))) U)
/// ```
pub fn motive_type(datatype: &Arc<Datatype>, params: &[ArcValue]) -> ArcValue {
    let env = datatype.param_env(params);
    let (name, params) = (datatype.name, params.to_vec());

    telescope(
        env,
        datatype.indices.clone(),
        Vec::new(),
        Arc::new(move |_: Env, indices: Vec<ArcValue>| {
            let target_type = Arc::new(Value::TypeConstructor(name, params.clone(), indices));
            Value::arrow(Symbol::intern_static("target"), target_type, Arc::new(Value::Universe))
        }),
    )
}

/// The type of the method for the constructor at `index`. Each recursive
/// argument is immediately followed by its induction hypothesis.
pub fn method_type(
    datatype: &Arc<Datatype>,
    params: &[ArcValue],
    motive: &ArcValue,
    index: usize,
) -> ArcValue {
    let env = datatype.param_env(params);
    let params: Arc<[ArcValue]> = params.into();
    method_telescope(datatype.clone(), index, params, motive.clone(), env, Vec::new())
}

fn method_telescope(
    datatype: Arc<Datatype>,
    index: usize,
    params: Arc<[ArcValue]>,
    motive: ArcValue,
    env: Env,
    args: Vec<ArcValue>,
) -> ArcValue {
    let constructor = &datatype.constructors[index];

    let (name, arg_type) = match constructor.args.get(args.len()) {
        Some(arg) => (arg.name, EvalContext::new(&env).eval(&arg.r#type)),
        None => {
            let indices = (constructor.result_indices.iter())
                .map(|index| EvalContext::new(&env).eval(index))
                .collect::<Vec<_>>();
            let target = constructor_value(&datatype, index, params.to_vec(), args);
            return apply_motive(&motive, &indices, &target);
        }
    };

    Value::pi(name, arg_type, move |arg| {
        let env = env.extend(name, arg.clone());
        let position = args.len();
        let mut args = args.clone();
        args.push(arg.clone());

        let constructor = &datatype.constructors[index];
        match constructor.recursive_indices(position) {
            None => method_telescope(
                datatype.clone(),
                index,
                params.clone(),
                motive.clone(),
                env,
                args,
            ),
            Some(indices) => {
                let indices = (indices.iter())
                    .map(|index| EvalContext::new(&env).eval(index))
                    .collect::<Vec<_>>();
                let ih_type = apply_motive(&motive, &indices, &arg);
                let (datatype, params, motive) = (datatype.clone(), params.clone(), motive.clone());

                Value::pi(Symbol::intern_static("ih"), ih_type, move |_| {
                    method_telescope(
                        datatype.clone(),
                        index,
                        params.clone(),
                        motive.clone(),
                        env.clone(),
                        args.clone(),
                    )
                })
            }
        }
    })
}

/// The type of the type constructor: `(Π ((param Param) ... (index Index) ...) U)`.
pub fn type_constructor_type(datatype: &Arc<Datatype>) -> ArcValue {
    let indices = datatype.indices.clone();
    telescope(
        datatype.env.clone(),
        datatype.params.clone(),
        Vec::new(),
        Arc::new(move |env: Env, _: Vec<ArcValue>| {
            telescope(
                env,
                indices.clone(),
                Vec::new(),
                Arc::new(|_: Env, _: Vec<ArcValue>| Arc::new(Value::Universe)),
            )
        }),
    )
}

/// The type of the constructor at `index`, closed over the parameters.
pub fn constructor_type(datatype: &Arc<Datatype>, index: usize) -> ArcValue {
    let datatype_ = datatype.clone();
    telescope(
        datatype.env.clone(),
        datatype.params.clone(),
        Vec::new(),
        Arc::new(move |env: Env, params: Vec<ArcValue>| {
            let datatype = datatype_.clone();
            let constructor = &datatype.constructors[index];
            let args = constructor.args.clone();
            telescope(
                env,
                args,
                Vec::new(),
                Arc::new(move |env: Env, _: Vec<ArcValue>| {
                    let constructor = &datatype.constructors[index];
                    let indices = (constructor.result_indices.iter())
                        .map(|index| EvalContext::new(&env).eval(index))
                        .collect();
                    Arc::new(Value::TypeConstructor(datatype.name, params.clone(), indices))
                }),
            )
        }),
    )
}

/// The full type of the eliminator:
///
/// ```text
/// (Π ((param Param) ...
///     (index Index) ...
///     (target (Name param ... index ...))
///     (motive <motive type>)
///     (method-ctor <method type>) ...)
///   (motive index ... target))
/// ```
pub fn eliminator_type(datatype: &Arc<Datatype>) -> ArcValue {
    let datatype_ = datatype.clone();
    telescope(
        datatype.env.clone(),
        datatype.params.clone(),
        Vec::new(),
        Arc::new(move |env: Env, params: Vec<ArcValue>| {
            let datatype = datatype_.clone();
            telescope(
                env,
                datatype_.indices.clone(),
                Vec::new(),
                Arc::new(move |_: Env, indices: Vec<ArcValue>| {
                    let target_type = Arc::new(Value::TypeConstructor(
                        datatype.name,
                        params.clone(),
                        indices.clone(),
                    ));
                    let (datatype, params, indices) =
                        (datatype.clone(), params.clone(), indices);

                    Value::pi(Symbol::intern_static("target"), target_type, move |target| {
                        let motive_type = motive_type(&datatype, &params);
                        let (datatype, params, indices) =
                            (datatype.clone(), params.clone(), indices.clone());

                        Value::pi(Symbol::intern_static("motive"), motive_type, move |motive| {
                            let result_type = apply_motive(&motive, &indices, &target);
                            methods(datatype.clone(), params.clone(), motive, 0, result_type)
                        })
                    })
                }),
            )
        }),
    )
}

fn methods(
    datatype: Arc<Datatype>,
    params: Vec<ArcValue>,
    motive: ArcValue,
    index: usize,
    result_type: ArcValue,
) -> ArcValue {
    let constructor = match datatype.constructors.get(index) {
        Some(constructor) => constructor,
        None => return result_type,
    };

    let name = Symbol::intern(format!("method-{}", constructor.name));
    let method_type = method_type(&datatype, &params, &motive, index);
    Value::pi(name, method_type, move |_| {
        methods(
            datatype.clone(),
            params.clone(),
            motive.clone(),
            index + 1,
            result_type.clone(),
        )
    })
}
