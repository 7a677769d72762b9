//! Abstract syntax tree for the ASN.1 subset accepted by [`crate::parser`].

use std::collections::HashMap;

/// Errors from parsing or resolving a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Duplicate definition: {0}")]
    Duplicate(String),
    #[error("Unresolved reference {name} in {context}")]
    Unresolved { name: String, context: String },
    #[error("Invalid schema: {0}")]
    Invalid(String),
}

/// A parsed module: type and integer value assignments in source order.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: Option<String>,
    pub assignments: Vec<TypeAssignment>,
    pub values: Vec<ValueAssignment>,
}

/// `Name { Param, ... } ::= Type`
#[derive(Debug, Clone)]
pub struct TypeAssignment {
    pub name: String,
    pub params: Vec<String>,
    pub ty: Type,
}

/// `name INTEGER ::= value`
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAssignment {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Value(i64),
    Ref(String),
    Min,
    Max,
}

/// `(lb..ub)`, `(v)` or `SIZE(...)`, optionally with `...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub lb: Bound,
    pub ub: Bound,
    pub extensible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Boolean,
    Null,
    Integer(Option<Constraint>),
    Enumerated(EnumeratedType),
    BitString(Option<Constraint>),
    OctetString(Option<Constraint>),
    Sequence(SequenceType),
    SequenceOf(Box<Type>, Option<Constraint>),
    Choice(ChoiceType),
    /// Reference to another assignment, with actual parameters if it is
    /// parameterized.
    Reference { name: String, args: Vec<Type> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedType {
    pub root: Vec<String>,
    pub extensible: bool,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceType {
    pub root: Vec<Component>,
    pub extensible: bool,
    pub additions: Vec<Addition>,
}

/// One extension addition of a SEQUENCE.
#[derive(Debug, Clone, PartialEq)]
pub enum Addition {
    /// `[[ ... ]]`
    Group(Vec<Component>),
    Single(Component),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub ty: Type,
    pub presence: Presence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    Default(DefaultValue),
}

impl Presence {
    /// OPTIONAL and DEFAULT components take a presence bit.
    pub fn has_bit(&self) -> bool {
        !matches!(self, Presence::Required)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Int(i64),
    Bool(bool),
    /// An enumeration identifier or a value reference.
    Ident(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceType {
    pub root: Vec<Alternative>,
    pub extensible: bool,
    pub extensions: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub name: String,
    pub ty: Type,
}

impl Type {
    /// Substitute formal parameters of a parameterized assignment.
    pub fn substitute(&self, params: &[String], args: &[Type]) -> Type {
        if params.is_empty() {
            return self.clone();
        }
        let sub = |t: &Type| t.substitute(params, args);
        match self {
            Type::Reference { name, args: inner } if inner.is_empty() => params
                .iter()
                .position(|p| p == name)
                .and_then(|i| args.get(i).cloned())
                .unwrap_or_else(|| self.clone()),
            Type::Reference { name, args: inner } => Type::Reference {
                name: name.clone(),
                args: inner.iter().map(sub).collect(),
            },
            Type::SequenceOf(elem, c) => Type::SequenceOf(Box::new(sub(elem)), c.clone()),
            Type::Sequence(seq) => {
                let comp = |c: &Component| Component {
                    name: c.name.clone(),
                    ty: sub(&c.ty),
                    presence: c.presence.clone(),
                };
                Type::Sequence(SequenceType {
                    root: seq.root.iter().map(comp).collect(),
                    extensible: seq.extensible,
                    additions: seq
                        .additions
                        .iter()
                        .map(|a| match a {
                            Addition::Group(cs) => Addition::Group(cs.iter().map(comp).collect()),
                            Addition::Single(c) => Addition::Single(comp(c)),
                        })
                        .collect(),
                })
            }
            Type::Choice(ch) => {
                let alt = |a: &Alternative| Alternative {
                    name: a.name.clone(),
                    ty: sub(&a.ty),
                };
                Type::Choice(ChoiceType {
                    root: ch.root.iter().map(alt).collect(),
                    extensible: ch.extensible,
                    extensions: ch.extensions.iter().map(alt).collect(),
                })
            }
            other => other.clone(),
        }
    }
}

/// A module with name lookups, checked for duplicates and dangling references.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub module: Module,
    pub types_by_name: HashMap<String, usize>,
    pub values_by_name: HashMap<String, i64>,
}

impl ResolvedModule {
    pub fn resolve(module: Module) -> Result<Self, SchemaError> {
        let mut types_by_name = HashMap::new();
        let mut values_by_name = HashMap::new();
        for (i, a) in module.assignments.iter().enumerate() {
            if types_by_name.insert(a.name.clone(), i).is_some() {
                return Err(SchemaError::Duplicate(a.name.clone()));
            }
        }
        for v in &module.values {
            if values_by_name.insert(v.name.clone(), v.value).is_some()
                || types_by_name.contains_key(&v.name)
            {
                return Err(SchemaError::Duplicate(v.name.clone()));
            }
        }
        let resolved = ResolvedModule {
            module,
            types_by_name,
            values_by_name,
        };
        for a in &resolved.module.assignments {
            resolved.check_type(&a.ty, &a.params, &a.name)?;
        }
        Ok(resolved)
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeAssignment> {
        self.types_by_name
            .get(name)
            .map(|&i| &self.module.assignments[i])
    }

    pub fn get_value(&self, name: &str) -> Option<i64> {
        self.values_by_name.get(name).copied()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.module.assignments.iter().map(|a| a.name.as_str())
    }

    /// Numeric value of a bound; `None` for `MIN` / `MAX`.
    pub fn bound_value(&self, b: &Bound) -> Result<Option<i64>, SchemaError> {
        match b {
            Bound::Value(v) => Ok(Some(*v)),
            Bound::Min | Bound::Max => Ok(None),
            Bound::Ref(name) => self
                .get_value(name)
                .map(Some)
                .ok_or_else(|| SchemaError::Unresolved {
                    name: name.clone(),
                    context: "constraint".to_string(),
                }),
        }
    }

    fn check_constraint(&self, c: &Option<Constraint>) -> Result<(), SchemaError> {
        if let Some(c) = c {
            self.bound_value(&c.lb)?;
            self.bound_value(&c.ub)?;
        }
        Ok(())
    }

    fn check_type(&self, ty: &Type, params: &[String], context: &str) -> Result<(), SchemaError> {
        match ty {
            Type::Boolean | Type::Null | Type::Enumerated(_) => Ok(()),
            Type::Integer(c) | Type::BitString(c) | Type::OctetString(c) => self.check_constraint(c),
            Type::SequenceOf(elem, c) => {
                self.check_constraint(c)?;
                self.check_type(elem, params, context)
            }
            Type::Sequence(seq) => {
                let additions = seq.additions.iter().flat_map(|a| match a {
                    Addition::Group(cs) => cs.iter().collect::<Vec<_>>(),
                    Addition::Single(c) => vec![c],
                });
                for c in seq.root.iter().chain(additions) {
                    self.check_type(&c.ty, params, &format!("{context}.{}", c.name))?;
                }
                Ok(())
            }
            Type::Choice(ch) => {
                for a in ch.root.iter().chain(&ch.extensions) {
                    self.check_type(&a.ty, params, &format!("{context}.{}", a.name))?;
                }
                Ok(())
            }
            Type::Reference { name, args } => {
                if params.contains(name) && args.is_empty() {
                    return Ok(());
                }
                let target = self.get_type(name).ok_or_else(|| SchemaError::Unresolved {
                    name: name.clone(),
                    context: context.to_string(),
                })?;
                if target.params.len() != args.len() {
                    return Err(SchemaError::Invalid(format!(
                        "{name} takes {} parameters, {} given in {context}",
                        target.params.len(),
                        args.len()
                    )));
                }
                for a in args {
                    self.check_type(a, params, context)?;
                }
                Ok(())
            }
        }
    }
}
