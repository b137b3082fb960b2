//! Type factory and select resolver.
//!
//! Turns one decoded argument into a [`Value`] according to the attribute's
//! declared [`AttrKind`]. Select-typed positions are resolved from the shape
//! of the token: `#id` looks up the id table, `KEYWORD(inline)` dispatches on
//! the schema's type registry.

use log::debug;

use crate::arguments::{
    read_binary, read_bool, read_entity_id, read_entity_ref_list, read_entity_ref_list_2d,
    read_enum, read_integer, read_logical, read_real, read_string,
};
use crate::error::{Result, StepError};
use crate::model::EntityKey;
use crate::schema::{AttrKind, EntityTypeId, Schema, TypeDef, TypeId};
use crate::tokenizer::{split_inline, split_list};
use crate::value::Value;

/// Id-to-entity lookup used while resolving references.
pub trait EntityLookup: Sync {
    /// Arena key and type of the entity with this record id.
    fn lookup(&self, id: u64) -> Option<(EntityKey, EntityTypeId)>;
}

/// Builds typed values for one schema against one id table.
pub struct TypeFactory<'a, L: ?Sized> {
    schema: &'a Schema,
    lookup: &'a L,
}

impl<'a, L: EntityLookup + ?Sized> TypeFactory<'a, L> {
    /// Create a factory.
    pub fn new(schema: &'a Schema, lookup: &'a L) -> Self {
        Self { schema, lookup }
    }

    /// Decode one argument for an attribute of the given kind.
    ///
    /// `$` yields [`Value::Null`] and `*` yields [`Value::Derived`] for any
    /// kind. A reference to an entity of the wrong type is not an error: the
    /// slot is left empty.
    pub fn decode(&self, kind: &AttrKind, arg: &str) -> Result<Value> {
        let arg = arg.trim();
        match arg {
            "$" => return Ok(Value::Null),
            "*" => return Ok(Value::Derived),
            _ => {}
        }

        match kind {
            AttrKind::Integer => Ok(or_null(read_integer(arg)?.map(Value::Integer))),
            AttrKind::Real => Ok(or_null(read_real(arg)?.map(Value::Real))),
            AttrKind::String => {
                if !arg.starts_with('\'') {
                    return Err(StepError::syntax("expected string", arg));
                }
                Ok(Value::String(read_string(arg)))
            }
            AttrKind::Binary => Ok(or_null(read_binary(arg)?.map(Value::Binary))),
            AttrKind::Boolean => Ok(or_null(read_bool(arg).map(Value::Boolean))),
            AttrKind::Logical => Ok(or_null(read_logical(arg).map(Value::Logical))),
            AttrKind::Entity(expected) => {
                let Some(id) = read_entity_id(arg)? else {
                    return Ok(Value::Null);
                };
                let (key, ty) = self
                    .lookup
                    .lookup(id)
                    .ok_or_else(|| StepError::unresolved(vec![id]))?;
                Ok(self.downcast(key, ty, *expected))
            }
            AttrKind::Type(ty) => self.decode_type(*ty, arg),
            AttrKind::List(inner) => self.decode_list(inner, arg),
        }
    }

    /// Construct the value named by an inline `KEYWORD(inline)` token.
    ///
    /// Unknown keywords are errors naming `context`.
    pub fn construct(&self, keyword: &str, inline: &str, context: &str) -> Result<(TypeId, Value)> {
        let ty = self
            .schema
            .type_by_name(keyword)
            .ok_or_else(|| StepError::unknown_keyword(keyword, context))?;
        Ok((ty, self.decode_type(ty, inline)?))
    }

    /// Resolve one token of a select-typed position.
    pub fn resolve_select(&self, select: TypeId, token: &str) -> Result<Value> {
        let token = token.trim();
        match token {
            "$" => return Ok(Value::Null),
            "*" => return Ok(Value::Derived),
            _ => {}
        }

        if token.starts_with('#') {
            let Some(id) = read_entity_id(token)? else {
                return Ok(Value::Null);
            };
            let (key, ty) = self
                .lookup
                .lookup(id)
                .ok_or_else(|| StepError::unresolved(vec![id]))?;
            if self.schema.select_accepts_entity(select, ty) {
                return Ok(Value::Ref(key));
            }
            debug!(
                "#{id} ({}) is not a {}, leaving slot empty",
                self.schema.entity(ty).name,
                self.schema.type_name(select)
            );
            return Ok(Value::Null);
        }

        let (keyword, inline) = split_inline(token)?;
        if keyword.is_empty() {
            return Ok(self.bare_literal(select, inline));
        }

        let context = self.schema.type_name(select);
        let (ty, value) = self.construct(&keyword, inline, context)?;
        if !self.schema.select_accepts_type(select, ty) {
            debug!("{keyword} is not an alternative of {context}, leaving slot empty");
            return Ok(Value::Null);
        }
        Ok(value)
    }

    /// Resolve a list of select values.
    ///
    /// Every element is attempted; failures are reported together.
    pub fn resolve_select_list(&self, select: TypeId, arg: &str) -> Result<Value> {
        self.decode_list(&AttrKind::Type(select), arg)
    }

    fn decode_type(&self, ty: TypeId, arg: &str) -> Result<Value> {
        match self.schema.type_def(ty) {
            TypeDef::Defined { kind, .. } => match self.decode(kind, arg)? {
                value @ (Value::Null | Value::Derived) => Ok(value),
                value => Ok(Value::typed(ty, value)),
            },
            TypeDef::Enumeration { name, symbols } => {
                let Some(symbol) = read_enum(arg)? else {
                    return Ok(Value::Null);
                };
                if !symbols.contains(&symbol) {
                    return Err(StepError::syntax(format!("not a symbol of {name}"), arg));
                }
                Ok(Value::Enum(ty, symbol))
            }
            TypeDef::Select { .. } => self.resolve_select(ty, arg),
        }
    }

    fn decode_list(&self, inner: &AttrKind, arg: &str) -> Result<Value> {
        if let AttrKind::Entity(expected) = *inner {
            let refs = read_entity_ref_list(arg, |id| self.lookup.lookup(id))?;
            return Ok(Value::List(self.downcast_all(refs, expected)));
        }
        if let AttrKind::List(nested) = inner {
            if let AttrKind::Entity(expected) = **nested {
                let rows = read_entity_ref_list_2d(arg, |id| self.lookup.lookup(id))?;
                return Ok(Value::List(
                    rows.into_iter()
                        .map(|row| Value::List(self.downcast_all(row, expected)))
                        .collect(),
                ));
            }
        }

        let Some(items) = split_list(arg)? else {
            return Ok(Value::Null);
        };
        let mut values = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for item in items {
            match self.decode(inner, item) {
                // Mismatched alternatives are dropped from the list.
                Ok(Value::Null) if item.trim() != "$" => {}
                Ok(value) => values.push(value),
                Err(e) => errors.push(e),
            }
        }
        match StepError::merge(errors) {
            Some(error) => Err(error),
            None => Ok(Value::List(values)),
        }
    }

    fn downcast(&self, key: EntityKey, ty: EntityTypeId, expected: EntityTypeId) -> Value {
        if self.schema.is_subtype(ty, expected) {
            Value::Ref(key)
        } else {
            debug!(
                "{} is not a {}, leaving slot empty",
                self.schema.entity(ty).name,
                self.schema.entity(expected).name
            );
            Value::Null
        }
    }

    fn downcast_all(&self, refs: Vec<(EntityKey, EntityTypeId)>, expected: EntityTypeId) -> Vec<Value> {
        refs.into_iter()
            .map(|(key, ty)| self.downcast(key, ty, expected))
            .filter(|v| !v.is_null())
            .collect()
    }

    /// A select token without a type name: only `.SYMBOL.` can be placed.
    fn bare_literal(&self, select: TypeId, token: &str) -> Value {
        let symbol = read_enum(token).ok().flatten();
        match symbol.and_then(|s| self.schema.select_enum_with_symbol(select, &s).map(|ty| (ty, s))) {
            Some((ty, symbol)) => Value::Enum(ty, symbol),
            None => {
                debug!(
                    "untyped `{token}` matches no alternative of {}",
                    self.schema.type_name(select)
                );
                Value::Null
            }
        }
    }
}

fn or_null(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}
