//! Encode/decode UPER values from a parsed ASN.1 module.
//!
//! Walks the resolved type tree and drives the same [`crate::per`] primitives the
//! hand-written records use, so both produce identical bits for the same definitions.
//! References to parameterized assignments are expanded on the fly.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::ast::*;
use crate::per::choice::UnknownAlternative;
use crate::per::primitives::{
    decode_bit_string, decode_constrained_whole_number, decode_discriminant,
    decode_extensible_whole_number, decode_octet_string, decode_semi_constrained_whole_number,
    decode_unconstrained_whole_number, decode_with_length, encode_bit_string,
    encode_constrained_whole_number, encode_discriminant, encode_extensible_whole_number,
    encode_normally_small_length, encode_octet_string, encode_semi_constrained_whole_number,
    encode_unconstrained_whole_number, encode_with_length,
};
use crate::per::sequence::{decode_open_type, encode_open_type};
use crate::per::{
    BitReader, BitWriter, Discriminant, ExtensionReader, PerError, Preamble, SizeConstraint,
    ZeroWidthGuard,
};
use crate::value::Value;

/// Runtime limits of a [`Codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum nesting of types (references included) before giving up.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig { max_depth: 64 }
    }
}

#[derive(Debug)]
pub struct Codec {
    config: CodecConfig,
    resolved: ResolvedModule,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Per(#[from] PerError),
    #[error("Schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("Unknown type: {0}")]
    UnknownType(String),
    #[error("Validation: {0}")]
    Validation(String),
    #[error("Nesting deeper than {0} levels")]
    DepthExceeded(usize),
}

/// Bounds of an INTEGER after resolving value references.
#[derive(Debug, Clone, Copy)]
enum IntRange {
    Constrained(i64, i64),
    SemiConstrained(i64),
    Unconstrained,
}

/// Prefix validation messages with the component they concern.
fn in_component(name: &str) -> impl FnOnce(CodecError) -> CodecError + '_ {
    move |e| match e {
        CodecError::Validation(msg) => CodecError::Validation(format!("{name}: {msg}")),
        other => other,
    }
}

fn mismatch(expected: &str, got: &Value) -> CodecError {
    CodecError::Validation(format!("expected {expected}, got {}", got.kind()))
}

fn components(a: &Addition) -> &[Component] {
    match a {
        Addition::Group(cs) => cs,
        Addition::Single(c) => std::slice::from_ref(c),
    }
}

impl Codec {
    pub fn new(resolved: ResolvedModule) -> Self {
        Self::with_config(resolved, CodecConfig::default())
    }

    pub fn with_config(resolved: ResolvedModule, config: CodecConfig) -> Self {
        Codec { config, resolved }
    }

    pub fn resolved(&self) -> &ResolvedModule {
        &self.resolved
    }

    /// Encode a complete PDU of type `type_name`: padded to whole octets, at least one.
    pub fn encode(&self, type_name: &str, value: &Value) -> Result<Vec<u8>, CodecError> {
        let (mut bytes, _) = self.encode_bits(type_name, value)?;
        if bytes.is_empty() {
            bytes.push(0);
        }
        Ok(bytes)
    }

    /// Encode and return the octets with the exact number of bits written.
    pub fn encode_bits(&self, type_name: &str, value: &Value) -> Result<(Vec<u8>, usize), CodecError> {
        let ty = self.top_level(type_name)?;
        let mut w = BitWriter::growable();
        self.encode_type(&mut w, ty, value, 0)
            .map_err(in_component(type_name))?;
        let bits = w.bits_written();
        Ok((w.into_bytes(), bits))
    }

    /// Decode a value of type `type_name` from the start of `bytes`.
    pub fn decode(&self, type_name: &str, bytes: &[u8]) -> Result<Value, CodecError> {
        self.decode_with_extent(type_name, bytes).1
    }

    /// Decode and return (bits consumed, result). On failure the count is the
    /// position reached when decoding stopped.
    pub fn decode_with_extent(
        &self,
        type_name: &str,
        bytes: &[u8],
    ) -> (usize, Result<Value, CodecError>) {
        let ty = match self.top_level(type_name) {
            Ok(t) => t,
            Err(e) => return (0, Err(e)),
        };
        let mut r = BitReader::new(bytes);
        let result = self
            .decode_type(&mut r, ty, 0)
            .map_err(in_component(type_name));
        if let Err(e) = &result {
            log::trace!("decode {type_name} failed at bit {}: {e}", r.position());
        }
        (r.position(), result)
    }

    fn top_level(&self, type_name: &str) -> Result<&Type, CodecError> {
        let a = self
            .resolved
            .get_type(type_name)
            .ok_or_else(|| CodecError::UnknownType(type_name.to_string()))?;
        if !a.params.is_empty() {
            return Err(CodecError::Validation(format!(
                "{type_name} is parameterized; encode a type that instantiates it"
            )));
        }
        Ok(&a.ty)
    }

    fn check_depth(&self, depth: usize) -> Result<(), CodecError> {
        if depth > self.config.max_depth {
            return Err(CodecError::DepthExceeded(self.config.max_depth));
        }
        Ok(())
    }

    /// Body of a referenced assignment, with actual parameters substituted.
    fn dereference(&self, name: &str, args: &[Type]) -> Result<Cow<'_, Type>, CodecError> {
        let a = self
            .resolved
            .get_type(name)
            .ok_or_else(|| CodecError::UnknownType(name.to_string()))?;
        if a.params.is_empty() {
            Ok(Cow::Borrowed(&a.ty))
        } else {
            Ok(Cow::Owned(a.ty.substitute(&a.params, args)))
        }
    }

    /// Follow references until a structural type is reached.
    fn underlying<'a>(&'a self, ty: &'a Type) -> Result<Cow<'a, Type>, CodecError> {
        let mut current = Cow::Borrowed(ty);
        for _ in 0..=self.config.max_depth {
            let next = match current.as_ref() {
                Type::Reference { name, args } => self.dereference(name, args)?.into_owned(),
                _ => return Ok(current),
            };
            current = Cow::Owned(next);
        }
        Err(CodecError::DepthExceeded(self.config.max_depth))
    }

    fn int_range(&self, c: &Option<Constraint>) -> Result<(IntRange, bool), CodecError> {
        let Some(c) = c else {
            return Ok((IntRange::Unconstrained, false));
        };
        let range = match (self.resolved.bound_value(&c.lb)?, self.resolved.bound_value(&c.ub)?) {
            (Some(lb), Some(ub)) if lb <= ub => IntRange::Constrained(lb, ub),
            (Some(lb), Some(ub)) => {
                return Err(CodecError::Validation(format!("empty range {lb}..{ub}")))
            }
            (Some(lb), None) => IntRange::SemiConstrained(lb),
            (None, _) => IntRange::Unconstrained,
        };
        Ok((range, c.extensible))
    }

    fn size_constraint(&self, c: &Option<Constraint>) -> Result<SizeConstraint, CodecError> {
        let Some(c) = c else {
            return Ok(SizeConstraint::unbounded());
        };
        let to_size = |v: i64| {
            u64::try_from(v).map_err(|_| CodecError::Validation(format!("negative size {v}")))
        };
        let lb = match self.resolved.bound_value(&c.lb)? {
            Some(v) => to_size(v)?,
            None => 0,
        };
        let ub = self.resolved.bound_value(&c.ub)?.map(to_size).transpose()?;
        Ok(SizeConstraint {
            lb,
            ub,
            extensible: c.extensible,
        })
    }

    fn default_value(&self, ty: &Type, d: &DefaultValue) -> Result<Value, CodecError> {
        Ok(match d {
            DefaultValue::Int(i) => Value::Int(*i),
            DefaultValue::Bool(b) => Value::Bool(*b),
            DefaultValue::Ident(id) => match self.underlying(ty)?.as_ref() {
                Type::Enumerated(_) => Value::Enumerated(id.clone()),
                Type::Integer(_) => Value::Int(self.resolved.get_value(id).ok_or_else(|| {
                    CodecError::Validation(format!("unknown default value {id}"))
                })?),
                _ => {
                    return Err(CodecError::Validation(format!(
                        "DEFAULT {id} is not supported for this type"
                    )))
                }
            },
        })
    }

    // ---------------------------------------------------------------------
    // Encoding
    // ---------------------------------------------------------------------

    fn encode_type(
        &self,
        w: &mut BitWriter<'_>,
        ty: &Type,
        v: &Value,
        depth: usize,
    ) -> Result<(), CodecError> {
        self.check_depth(depth)?;
        match ty {
            Type::Boolean => match v {
                Value::Bool(b) => Ok(w.write_bit(*b)?),
                other => Err(mismatch("BOOLEAN", other)),
            },
            Type::Null => match v {
                Value::Null => Ok(()),
                other => Err(mismatch("NULL", other)),
            },
            Type::Integer(c) => {
                let n = v.as_int().ok_or_else(|| mismatch("INTEGER", v))?;
                self.encode_integer(w, n, c)
            }
            Type::Enumerated(e) => self.encode_enumerated(w, e, v),
            Type::BitString(c) => {
                let bits = v.as_bits().ok_or_else(|| mismatch("BIT STRING", v))?;
                Ok(encode_bit_string(w, bits, self.size_constraint(c)?)?)
            }
            Type::OctetString(c) => {
                let octets = v.as_octets().ok_or_else(|| mismatch("OCTET STRING", v))?;
                Ok(encode_octet_string(w, octets, self.size_constraint(c)?)?)
            }
            Type::SequenceOf(elem, c) => {
                let items = v.as_list().ok_or_else(|| mismatch("SEQUENCE OF", v))?;
                let size = self.size_constraint(c)?;
                encode_with_length(w, items.len(), size, |w, range| {
                    items[range]
                        .iter()
                        .try_for_each(|item| self.encode_type(w, elem, item, depth + 1))
                })
            }
            Type::Sequence(seq) => {
                let fields = v.as_sequence().ok_or_else(|| mismatch("SEQUENCE", v))?;
                self.encode_sequence(w, seq, fields, depth)
            }
            Type::Choice(ch) => self.encode_choice(w, ch, v, depth),
            Type::Reference { name, args } => {
                let target = self.dereference(name, args)?;
                self.encode_type(w, &target, v, depth + 1)
            }
        }
    }

    fn encode_integer(
        &self,
        w: &mut BitWriter<'_>,
        n: i64,
        c: &Option<Constraint>,
    ) -> Result<(), CodecError> {
        let (range, extensible) = self.int_range(c)?;
        match range {
            IntRange::Constrained(lb, ub) if extensible => {
                encode_extensible_whole_number(w, n, lb, ub)?
            }
            IntRange::Constrained(lb, ub) => encode_constrained_whole_number(w, n, lb, ub)?,
            IntRange::SemiConstrained(lb) => {
                if extensible {
                    w.write_bit(n < lb)?;
                    if n < lb {
                        encode_unconstrained_whole_number(w, n)?;
                        return Ok(());
                    }
                }
                encode_semi_constrained_whole_number(w, n, lb)?
            }
            IntRange::Unconstrained => {
                if extensible {
                    w.write_bit(false)?;
                }
                encode_unconstrained_whole_number(w, n)?
            }
        }
        Ok(())
    }

    fn encode_enumerated(
        &self,
        w: &mut BitWriter<'_>,
        e: &EnumeratedType,
        v: &Value,
    ) -> Result<(), CodecError> {
        let d = match v {
            Value::Enumerated(name) => {
                if let Some(i) = e.root.iter().position(|r| r == name) {
                    Discriminant::Root(i as u64)
                } else if let Some(i) = e.extensions.iter().position(|x| x == name) {
                    Discriminant::Extension(i as u64)
                } else {
                    return Err(CodecError::Validation(format!("unknown enumeration value {name}")));
                }
            }
            Value::UnknownEnumerated(i) => Discriminant::Extension(*i),
            other => return Err(mismatch("ENUMERATED", other)),
        };
        Ok(encode_discriminant(w, d, e.root.len() as u64, e.extensible)?)
    }

    /// Whether `fields` carries a component that changes the encoding: present and,
    /// for DEFAULT components, different from the default.
    fn is_encoded(&self, c: &Component, fields: &BTreeMap<String, Value>) -> Result<bool, CodecError> {
        Ok(match (fields.get(&c.name), &c.presence) {
            (None, _) => false,
            (Some(v), Presence::Default(d)) => *v != self.default_value(&c.ty, d)?,
            (Some(_), _) => true,
        })
    }

    fn encode_components(
        &self,
        w: &mut BitWriter<'_>,
        comps: &[Component],
        fields: &BTreeMap<String, Value>,
        extensible: bool,
        extended: bool,
        depth: usize,
    ) -> Result<(), CodecError> {
        let mut pre = Preamble::new(extensible).extended(extended);
        let mut encoded = Vec::with_capacity(comps.len());
        for c in comps {
            let present = self.is_encoded(c, fields)?;
            if c.presence.has_bit() {
                pre = pre.optional(present);
            } else if !present {
                return Err(CodecError::Validation(format!("missing component {}", c.name)));
            }
            encoded.push(present);
        }
        pre.pack(w)?;
        for (c, present) in comps.iter().zip(encoded) {
            if let (true, Some(v)) = (present, fields.get(&c.name)) {
                self.encode_type(w, &c.ty, v, depth + 1)
                    .map_err(in_component(&c.name))?;
            }
        }
        Ok(())
    }

    fn encode_sequence(
        &self,
        w: &mut BitWriter<'_>,
        seq: &SequenceType,
        fields: &BTreeMap<String, Value>,
        depth: usize,
    ) -> Result<(), CodecError> {
        let known = seq
            .root
            .iter()
            .chain(seq.additions.iter().flat_map(components))
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        if let Some(extra) = fields.keys().find(|k| !known.contains(&k.as_str())) {
            return Err(CodecError::Validation(format!("unknown component {extra}")));
        }

        let mut present = Vec::with_capacity(seq.additions.len());
        for a in &seq.additions {
            let mut any = false;
            for c in components(a) {
                any |= self.is_encoded(c, fields)?;
            }
            present.push(any);
        }
        let extended = present.iter().any(|p| *p);
        if extended && !seq.extensible {
            return Err(CodecError::Validation("additions on a closed SEQUENCE".into()));
        }

        self.encode_components(w, &seq.root, fields, seq.extensible, extended, depth)?;
        if !extended {
            return Ok(());
        }
        encode_normally_small_length(w, seq.additions.len())?;
        for p in &present {
            w.write_bit(*p)?;
        }
        for (a, _) in seq.additions.iter().zip(&present).filter(|(_, p)| **p) {
            encode_open_type(w, |w| match a {
                Addition::Group(cs) => self.encode_components(w, cs, fields, false, false, depth + 1),
                Addition::Single(c) => match fields.get(&c.name) {
                    Some(v) => self
                        .encode_type(w, &c.ty, v, depth + 1)
                        .map_err(in_component(&c.name)),
                    None => Ok(()),
                },
            })?;
        }
        Ok(())
    }

    fn encode_choice(
        &self,
        w: &mut BitWriter<'_>,
        ch: &ChoiceType,
        v: &Value,
        depth: usize,
    ) -> Result<(), CodecError> {
        let root_count = ch.root.len() as u64;
        match v {
            Value::Choice(name, inner) => {
                if let Some(i) = ch.root.iter().position(|a| &a.name == name) {
                    encode_discriminant(w, Discriminant::Root(i as u64), root_count, ch.extensible)?;
                    return self
                        .encode_type(w, &ch.root[i].ty, inner, depth + 1)
                        .map_err(in_component(name));
                }
                let i = ch
                    .extensions
                    .iter()
                    .position(|a| &a.name == name)
                    .ok_or_else(|| CodecError::Validation(format!("unknown alternative {name}")))?;
                encode_discriminant(w, Discriminant::Extension(i as u64), root_count, true)?;
                encode_open_type(w, |w| {
                    self.encode_type(w, &ch.extensions[i].ty, inner, depth + 1)
                        .map_err(in_component(name))
                })
            }
            Value::UnknownChoice { index, encoding } => {
                if !ch.extensible {
                    return Err(CodecError::Validation("extension alternative on a closed CHOICE".into()));
                }
                let alt = UnknownAlternative {
                    index: *index,
                    encoding: encoding.clone(),
                };
                Ok(alt.pack(w, root_count)?)
            }
            other => Err(mismatch("CHOICE", other)),
        }
    }

    // ---------------------------------------------------------------------
    // Decoding
    // ---------------------------------------------------------------------

    fn decode_type(&self, r: &mut BitReader<'_>, ty: &Type, depth: usize) -> Result<Value, CodecError> {
        self.check_depth(depth)?;
        Ok(match ty {
            Type::Boolean => Value::Bool(r.read_bit()?),
            Type::Null => Value::Null,
            Type::Integer(c) => Value::Int(self.decode_integer(r, c)?),
            Type::Enumerated(e) => {
                match decode_discriminant(r, e.root.len() as u64, e.extensible, "ENUMERATED")? {
                    Discriminant::Root(i) => e
                        .root
                        .get(i as usize)
                        .map(|s| Value::Enumerated(s.clone()))
                        .ok_or(PerError::UnknownDiscriminant {
                            type_name: "ENUMERATED",
                            index: i,
                        })?,
                    Discriminant::Extension(i) => match e.extensions.get(i as usize) {
                        Some(s) => Value::Enumerated(s.clone()),
                        None => {
                            log::debug!("keeping unknown enumeration extension {i}");
                            Value::UnknownEnumerated(i)
                        }
                    },
                }
            }
            Type::BitString(c) => Value::BitString(decode_bit_string(r, self.size_constraint(c)?)?),
            Type::OctetString(c) => Value::OctetString(decode_octet_string(r, self.size_constraint(c)?)?),
            Type::SequenceOf(elem, c) => {
                let size = self.size_constraint(c)?;
                let mut items = Vec::new();
                let mut guard = ZeroWidthGuard::default();
                decode_with_length(r, size, |r, n| -> Result<(), CodecError> {
                    items.reserve(n.min(r.remaining()));
                    for _ in 0..n {
                        let start = r.position();
                        items.push(self.decode_type(r, elem, depth + 1)?);
                        guard.check(r, start)?;
                    }
                    Ok(())
                })?;
                Value::SequenceOf(items)
            }
            Type::Sequence(seq) => self.decode_sequence(r, seq, depth)?,
            Type::Choice(ch) => self.decode_choice(r, ch, depth)?,
            Type::Reference { name, args } => {
                let target = self.dereference(name, args)?;
                self.decode_type(r, &target, depth + 1)?
            }
        })
    }

    fn decode_integer(&self, r: &mut BitReader<'_>, c: &Option<Constraint>) -> Result<i64, CodecError> {
        let (range, extensible) = self.int_range(c)?;
        Ok(match range {
            IntRange::Constrained(lb, ub) if extensible => decode_extensible_whole_number(r, lb, ub)?,
            IntRange::Constrained(lb, ub) => decode_constrained_whole_number(r, lb, ub)?,
            IntRange::SemiConstrained(lb) => {
                if extensible && r.read_bit()? {
                    decode_unconstrained_whole_number(r)?
                } else {
                    decode_semi_constrained_whole_number(r, lb)?
                }
            }
            IntRange::Unconstrained => {
                if extensible {
                    r.read_bit()?;
                }
                decode_unconstrained_whole_number(r)?
            }
        })
    }

    /// Decode the preamble and components of `comps` into `out`. Absent DEFAULT
    /// components are filled with their default. Returns the extension bit.
    fn decode_components(
        &self,
        r: &mut BitReader<'_>,
        comps: &[Component],
        extensible: bool,
        out: &mut BTreeMap<String, Value>,
        depth: usize,
    ) -> Result<bool, CodecError> {
        let optionals = comps.iter().filter(|c| c.presence.has_bit()).count();
        let pre = Preamble::unpack(r, extensible, optionals)?;
        let mut bit = 0;
        for c in comps {
            let present = if c.presence.has_bit() {
                bit += 1;
                pre.is_present(bit - 1)
            } else {
                true
            };
            if present {
                let v = self
                    .decode_type(r, &c.ty, depth + 1)
                    .map_err(in_component(&c.name))?;
                out.insert(c.name.clone(), v);
            } else if let Presence::Default(d) = &c.presence {
                out.insert(c.name.clone(), self.default_value(&c.ty, d)?);
            }
        }
        Ok(pre.is_extended())
    }

    fn decode_sequence(
        &self,
        r: &mut BitReader<'_>,
        seq: &SequenceType,
        depth: usize,
    ) -> Result<Value, CodecError> {
        let mut out = BTreeMap::new();
        if !self.decode_components(r, &seq.root, seq.extensible, &mut out, depth)? {
            return Ok(Value::Sequence(out));
        }
        let mut ext = ExtensionReader::unpack(r)?;
        for a in &seq.additions {
            match a {
                Addition::Group(cs) => {
                    let group = ext.next_with(r, |r| {
                        let mut group = BTreeMap::new();
                        self.decode_components(r, cs, false, &mut group, depth + 1)?;
                        Ok::<_, CodecError>(group)
                    })?;
                    out.extend(group.into_iter().flatten());
                }
                Addition::Single(c) => {
                    let v = ext.next_with(r, |r| {
                        self.decode_type(r, &c.ty, depth + 1)
                            .map_err(in_component(&c.name))
                    })?;
                    match (v, &c.presence) {
                        (Some(v), _) => {
                            out.insert(c.name.clone(), v);
                        }
                        (None, Presence::Default(d)) => {
                            out.insert(c.name.clone(), self.default_value(&c.ty, d)?);
                        }
                        (None, _) => {}
                    }
                }
            }
        }
        ext.finish(r, "SEQUENCE")?;
        Ok(Value::Sequence(out))
    }

    fn decode_choice(&self, r: &mut BitReader<'_>, ch: &ChoiceType, depth: usize) -> Result<Value, CodecError> {
        let root_count = ch.root.len() as u64;
        Ok(match decode_discriminant(r, root_count, ch.extensible, "CHOICE")? {
            Discriminant::Root(i) => {
                let alt = ch.root.get(i as usize).ok_or(PerError::UnknownDiscriminant {
                    type_name: "CHOICE",
                    index: i,
                })?;
                let v = self
                    .decode_type(r, &alt.ty, depth + 1)
                    .map_err(in_component(&alt.name))?;
                Value::Choice(alt.name.clone(), Box::new(v))
            }
            Discriminant::Extension(i) => match ch.extensions.get(i as usize) {
                Some(alt) => {
                    let v = decode_open_type(r, |r| {
                        self.decode_type(r, &alt.ty, depth + 1)
                            .map_err(in_component(&alt.name))
                    })?;
                    Value::Choice(alt.name.clone(), Box::new(v))
                }
                None => {
                    let alt = UnknownAlternative::unpack(r, i, "CHOICE")?;
                    Value::UnknownChoice {
                        index: alt.index,
                        encoding: alt.encoding,
                    }
                }
            },
        })
    }
}
