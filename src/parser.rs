//! Parse ASN.1 module text into the AST using PEST.

use std::path::Path;

use crate::ast::*;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct Asn1Parser;

/// Parse module source into an AST.
pub fn parse(source: &str) -> Result<Module, SchemaError> {
    let pairs =
        Asn1Parser::parse(Rule::module, source).map_err(|e| SchemaError::Parse(e.to_string()))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| SchemaError::Parse("empty input".to_string()))?;
    build_module(pair)
}

/// Read and parse a module file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Module, SchemaError> {
    let source = std::fs::read_to_string(path)?;
    parse(&source)
}

fn build_module(pair: Pair<Rule>) -> Result<Module, SchemaError> {
    let mut module = Module::default();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::module_header => {
                module.name = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::ident)
                    .map(|p| p.as_str().to_string());
            }
            Rule::value_assignment => module.values.push(build_value_assignment(inner)?),
            Rule::type_assignment => module.assignments.push(build_type_assignment(inner)?),
            _ => {}
        }
    }
    Ok(module)
}

fn build_value_assignment(pair: Pair<Rule>) -> Result<ValueAssignment, SchemaError> {
    let mut name = None;
    let mut value = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = Some(inner.as_str().to_string()),
            Rule::number => value = Some(parse_number(inner.as_str())?),
            _ => {}
        }
    }
    match (name, value) {
        (Some(name), Some(value)) => Ok(ValueAssignment { name, value }),
        _ => Err(SchemaError::Parse("value assignment: missing name or value".into())),
    }
}

fn build_type_assignment(pair: Pair<Rule>) -> Result<TypeAssignment, SchemaError> {
    let mut name = None;
    let mut params = Vec::new();
    let mut ty = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = Some(inner.as_str().to_string()),
            Rule::formal_params => {
                params = inner.into_inner().map(|p| p.as_str().to_string()).collect();
            }
            Rule::asn_type => ty = Some(build_type(inner)?),
            _ => {}
        }
    }
    let name = name.ok_or_else(|| SchemaError::Parse("type assignment: missing name".into()))?;
    let ty = ty.ok_or_else(|| SchemaError::Parse(format!("{name}: missing type")))?;
    Ok(TypeAssignment { name, params, ty })
}

fn build_type(pair: Pair<Rule>) -> Result<Type, SchemaError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| SchemaError::Parse("empty type".into()))?;
    match inner.as_rule() {
        Rule::boolean_type => Ok(Type::Boolean),
        Rule::null_type => Ok(Type::Null),
        Rule::integer_type => Ok(Type::Integer(find_constraint(inner)?)),
        Rule::bit_string_type => Ok(Type::BitString(find_constraint(inner)?)),
        Rule::octet_string_type => Ok(Type::OctetString(find_constraint(inner)?)),
        Rule::enumerated_type => build_enumerated(inner),
        Rule::sequence_of_type => {
            let mut constraint = None;
            let mut elem = None;
            for p in inner.into_inner() {
                match p.as_rule() {
                    Rule::size_constraint | Rule::size_spec => constraint = Some(build_size(p)?),
                    Rule::asn_type => elem = Some(build_type(p)?),
                    _ => {}
                }
            }
            let elem = elem.ok_or_else(|| SchemaError::Parse("SEQUENCE OF: missing element type".into()))?;
            Ok(Type::SequenceOf(Box::new(elem), constraint))
        }
        Rule::sequence_type => build_sequence(inner),
        Rule::choice_type => build_choice(inner),
        Rule::type_reference => {
            let mut it = inner.into_inner();
            let name = it
                .next()
                .ok_or_else(|| SchemaError::Parse("type reference: missing name".into()))?
                .as_str()
                .to_string();
            let args = match it.next() {
                Some(params) => params.into_inner().map(build_type).collect::<Result<_, _>>()?,
                None => Vec::new(),
            };
            Ok(Type::Reference { name, args })
        }
        other => Err(SchemaError::Parse(format!("unexpected {other:?} in type"))),
    }
}

/// The value or size constraint directly under `pair`, if any.
fn find_constraint(pair: Pair<Rule>) -> Result<Option<Constraint>, SchemaError> {
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::value_constraint => return build_range(p).map(Some),
            Rule::size_constraint | Rule::size_spec => return build_size(p).map(Some),
            _ => {}
        }
    }
    Ok(None)
}

fn build_size(pair: Pair<Rule>) -> Result<Constraint, SchemaError> {
    let spec = if pair.as_rule() == Rule::size_spec {
        pair
    } else {
        pair.into_inner()
            .find(|p| p.as_rule() == Rule::size_spec)
            .ok_or_else(|| SchemaError::Parse("SIZE: missing range".into()))?
    };
    build_range(spec)
}

/// Build from a rule holding `range_spec` and an optional `ext_marker`.
fn build_range(pair: Pair<Rule>) -> Result<Constraint, SchemaError> {
    let mut bounds = Vec::new();
    let mut extensible = false;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::range_spec => {
                for b in p.into_inner() {
                    bounds.push(build_bound(b)?);
                }
            }
            Rule::ext_marker => extensible = true,
            _ => {}
        }
    }
    let mut it = bounds.into_iter();
    let lb = it
        .next()
        .ok_or_else(|| SchemaError::Parse("constraint: missing bound".into()))?;
    let ub = it.next().unwrap_or_else(|| lb.clone());
    Ok(Constraint { lb, ub, extensible })
}

fn build_bound(pair: Pair<Rule>) -> Result<Bound, SchemaError> {
    let p = pair
        .into_inner()
        .next()
        .ok_or_else(|| SchemaError::Parse("empty bound".into()))?;
    Ok(match p.as_rule() {
        Rule::number => Bound::Value(parse_number(p.as_str())?),
        Rule::kw_min => Bound::Min,
        Rule::kw_max => Bound::Max,
        _ => Bound::Ref(p.as_str().to_string()),
    })
}

fn build_enumerated(pair: Pair<Rule>) -> Result<Type, SchemaError> {
    let mut root = Vec::new();
    let mut extensions = Vec::new();
    let mut extensible = false;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::ext_marker if extensible => {
                return Err(SchemaError::Parse("ENUMERATED: second extension marker".into()))
            }
            Rule::ext_marker => extensible = true,
            Rule::ident if extensible => extensions.push(p.as_str().to_string()),
            Rule::ident => root.push(p.as_str().to_string()),
            _ => {}
        }
    }
    if root.is_empty() {
        return Err(SchemaError::Parse("ENUMERATED: empty root".into()));
    }
    Ok(Type::Enumerated(EnumeratedType {
        root,
        extensible,
        extensions,
    }))
}

fn build_component(pair: Pair<Rule>) -> Result<Component, SchemaError> {
    let mut name = None;
    let mut ty = None;
    let mut presence = Presence::Required;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::ident => name = Some(p.as_str().to_string()),
            Rule::asn_type => ty = Some(build_type(p)?),
            Rule::kw_optional => presence = Presence::Optional,
            Rule::default_spec => {
                let v = p
                    .into_inner()
                    .find(|v| v.as_rule() != Rule::kw_default)
                    .ok_or_else(|| SchemaError::Parse("DEFAULT: missing value".into()))?;
                presence = Presence::Default(match v.as_rule() {
                    Rule::number => DefaultValue::Int(parse_number(v.as_str())?),
                    Rule::kw_true => DefaultValue::Bool(true),
                    Rule::kw_false => DefaultValue::Bool(false),
                    _ => DefaultValue::Ident(v.as_str().to_string()),
                });
            }
            _ => {}
        }
    }
    let name = name.ok_or_else(|| SchemaError::Parse("component: missing name".into()))?;
    let ty = ty.ok_or_else(|| SchemaError::Parse(format!("{name}: missing type")))?;
    Ok(Component { name, ty, presence })
}

fn build_sequence(pair: Pair<Rule>) -> Result<Type, SchemaError> {
    let mut root = Vec::new();
    let mut additions = Vec::new();
    // number of `...` markers seen
    let mut markers = 0;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::ext_marker => {
                markers += 1;
                if markers > 2 {
                    return Err(SchemaError::Parse("SEQUENCE: too many extension markers".into()));
                }
            }
            Rule::component => {
                let c = build_component(p)?;
                match markers {
                    0 => root.push(c),
                    1 => additions.push(Addition::Single(c)),
                    _ => {
                        return Err(SchemaError::Parse(format!(
                            "{}: root components after the extension additions are not supported",
                            c.name
                        )))
                    }
                }
            }
            Rule::addition_group => {
                if markers != 1 {
                    return Err(SchemaError::Parse("[[ ]] outside the extension additions".into()));
                }
                let group = p.into_inner().map(build_component).collect::<Result<_, _>>()?;
                additions.push(Addition::Group(group));
            }
            _ => {}
        }
    }
    Ok(Type::Sequence(SequenceType {
        root,
        extensible: markers > 0,
        additions,
    }))
}

fn build_choice(pair: Pair<Rule>) -> Result<Type, SchemaError> {
    let mut root = Vec::new();
    let mut extensions = Vec::new();
    let mut extensible = false;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::ext_marker => extensible = true,
            Rule::alternative => {
                let mut it = p.into_inner();
                let name = it
                    .next()
                    .ok_or_else(|| SchemaError::Parse("alternative: missing name".into()))?
                    .as_str()
                    .to_string();
                let ty = build_type(
                    it.next()
                        .ok_or_else(|| SchemaError::Parse(format!("{name}: missing type")))?,
                )?;
                let alt = Alternative { name, ty };
                if extensible {
                    extensions.push(alt);
                } else {
                    root.push(alt);
                }
            }
            _ => {}
        }
    }
    if root.is_empty() {
        return Err(SchemaError::Parse("CHOICE: empty root".into()));
    }
    Ok(Type::Choice(ChoiceType {
        root,
        extensible,
        extensions,
    }))
}

fn parse_number(s: &str) -> Result<i64, SchemaError> {
    s.parse::<i64>()
        .map_err(|e| SchemaError::Parse(format!("number {s}: {e}")))
}
