//! Resolved entity graph.
//!
//! Entities live in a generational arena. Forward attributes hold
//! [`EntityKey`]s; inverse attributes are a rebuildable index of keys that
//! may go stale when an entity is removed. A stale key never aliases a newer
//! entity, so readers simply skip keys that no longer resolve.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::debug;
use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, StepError};
use crate::header::StepHeader;
use crate::schema::{AttrKind, EntityTypeId, Schema, TypeDef};
use crate::value::Value;

new_key_type! {
    /// Arena key of an entity; doubles as a weak reference.
    pub struct EntityKey;
}

/// One entity instance.
#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) id: u64,
    pub(crate) type_id: EntityTypeId,
    pub(crate) attributes: Vec<Value>,
    pub(crate) inverses: Vec<Vec<EntityKey>>,
    pub(crate) wired: bool,
}

impl Entity {
    pub(crate) fn stub(id: u64, type_id: EntityTypeId, schema: &Schema) -> Self {
        let def = schema.entity(type_id);
        Self {
            id,
            type_id,
            attributes: Vec::new(),
            inverses: vec![Vec::new(); def.inverses.len()],
            wired: false,
        }
    }
}

/// Mapping from record id to arena key.
#[derive(Debug, Clone, Default)]
pub struct IdTable {
    map: BTreeMap<u64, EntityKey>,
}

impl IdTable {
    /// Key of the entity with this id.
    pub fn get(&self, id: u64) -> Option<EntityKey> {
        self.map.get(&id).copied()
    }

    /// True if the id is taken.
    pub fn contains(&self, id: u64) -> bool {
        self.map.contains_key(&id)
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if no id is taken.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Ids and keys in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, EntityKey)> + '_ {
        self.map.iter().map(|(id, key)| (*id, *key))
    }

    /// Highest id in use, `0` when empty.
    pub fn max_id(&self) -> u64 {
        self.map.keys().next_back().copied().unwrap_or(0)
    }

    /// First id above every id in use.
    pub fn next_id(&self) -> Result<u64> {
        let max = self.max_id();
        max.checked_add(1).ok_or(StepError::IdSpaceExhausted(max))
    }

    pub(crate) fn insert(&mut self, id: u64, key: EntityKey) -> Result<()> {
        if self.map.contains_key(&id) {
            return Err(StepError::DuplicateId(id));
        }
        self.map.insert(id, key);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: u64) -> Option<EntityKey> {
        self.map.remove(&id)
    }
}

/// A fully resolved model.
///
/// Only produced by a successful parse or built up through [`Model::insert`],
/// so every forward reference points at a live entity.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) schema: Arc<Schema>,
    pub(crate) header: StepHeader,
    pub(crate) entities: SlotMap<EntityKey, Entity>,
    pub(crate) ids: IdTable,
}

impl Model {
    /// Create an empty model for a schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        let header = StepHeader::for_schema(schema.name());
        Self {
            schema,
            header,
            entities: SlotMap::with_key(),
            ids: IdTable::default(),
        }
    }

    pub(crate) fn from_parts(
        schema: Arc<Schema>,
        header: StepHeader,
        entities: SlotMap<EntityKey, Entity>,
        ids: IdTable,
    ) -> Self {
        Self {
            schema,
            header,
            entities,
            ids,
        }
    }

    /// The schema entities are typed against.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// File header.
    pub fn header(&self) -> &StepHeader {
        &self.header
    }

    /// Mutable file header.
    pub fn header_mut(&mut self) -> &mut StepHeader {
        &mut self.header
    }

    /// The id table.
    pub fn id_table(&self) -> &IdTable {
        &self.ids
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the model holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// True if the key still refers to an entity of this model.
    pub fn is_alive(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Entity by record id.
    pub fn get(&self, id: u64) -> Option<EntityView<'_>> {
        self.ids.get(id).and_then(|key| self.entity(key))
    }

    /// Entity by record id, or an error naming the id.
    pub fn require(&self, id: u64) -> Result<EntityView<'_>> {
        self.get(id).ok_or(StepError::MissingEntity(id))
    }

    /// Entity by key.
    pub fn entity(&self, key: EntityKey) -> Option<EntityView<'_>> {
        self.entities.get(key).map(|entity| EntityView {
            model: self,
            key,
            entity,
        })
    }

    /// Every entity in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = EntityView<'_>> + '_ {
        self.ids.iter().filter_map(|(_, key)| self.entity(key))
    }

    /// Entities of a type, optionally including subtypes, in id order.
    pub fn entities_of_type(&self, type_name: &str, include_subtypes: bool) -> Vec<EntityView<'_>> {
        let Some(ty) = self.schema.entity_by_name(type_name) else {
            return Vec::new();
        };
        self.entities()
            .filter(|e| {
                e.entity.type_id == ty
                    || (include_subtypes && self.schema.is_subtype(e.entity.type_id, ty))
            })
            .collect()
    }

    pub(crate) fn type_name_of(&self, key: EntityKey) -> &str {
        self.entities
            .get(key)
            .map(|e| self.schema.entity(e.type_id).name.as_str())
            .unwrap_or("<removed>")
    }

    /// Add a new entity with the next unused id.
    ///
    /// `values` must match the type's attribute count; references must point
    /// at live entities of an acceptable type. The entity is wired if
    /// `wire` is set.
    pub fn insert(&mut self, type_name: &str, values: Vec<Value>, wire: bool) -> Result<EntityKey> {
        let id = self.ids.next_id()?;
        self.insert_with_id(id, type_name, values, wire)
    }

    /// Add a new entity with an explicit id.
    pub fn insert_with_id(
        &mut self,
        id: u64,
        type_name: &str,
        values: Vec<Value>,
        wire: bool,
    ) -> Result<EntityKey> {
        if id == 0 {
            return Err(StepError::InvalidId(id));
        }
        if self.ids.contains(id) {
            return Err(StepError::DuplicateId(id));
        }
        let ty = self
            .schema
            .entity_by_name(type_name)
            .ok_or_else(|| StepError::UnknownEntity {
                entity_id: id,
                keyword: type_name.to_ascii_uppercase(),
            })?;
        let def = self.schema.entity(ty);
        if def.is_abstract {
            return Err(StepError::AbstractEntity {
                entity_id: id,
                type_name: def.name.clone(),
            });
        }
        if values.len() != def.attributes.len() {
            return Err(StepError::Arity {
                entity_id: id,
                type_name: def.name.clone(),
                expected: def.attributes.len(),
                actual: values.len(),
            });
        }
        for (attr, value) in def.attributes.iter().zip(&values) {
            self.check_value(&attr.kind, value)?;
        }

        let mut entity = Entity::stub(id, ty, &self.schema);
        entity.attributes = values;
        let key = self.entities.insert(entity);
        self.ids.insert(id, key)?;
        if wire {
            self.wire_entity(key);
        }
        Ok(key)
    }

    /// Replace one forward attribute, keeping inverse attributes in step.
    pub fn set_attribute(&mut self, key: EntityKey, name: &str, value: Value) -> Result<()> {
        let entity = self.entities.get(key).ok_or(StepError::StaleReference)?;
        let ty = entity.type_id;
        let index = self.schema.attribute_index(ty, name).ok_or_else(|| {
            StepError::Schema(format!(
                "{} has no attribute {name}",
                self.schema.entity(ty).name
            ))
        })?;
        let kind = self.schema.entity(ty).attributes[index].kind.clone();
        self.check_value(&kind, &value)?;

        let wired = entity.wired;
        if wired {
            self.unlink(key);
        }
        if let Some(entity) = self.entities.get_mut(key) {
            entity.attributes[index] = value;
        }
        if wired {
            self.wire_entity(key);
        }
        Ok(())
    }

    /// Replace `target`'s forward attributes with `source`'s.
    ///
    /// `source` must be of `target`'s type or a subtype. Inverse attributes
    /// pointing at `target` are kept; its own registrations are redone.
    pub fn take_over(&mut self, target: EntityKey, source: EntityKey) -> Result<()> {
        let target_entity = self.entities.get(target).ok_or(StepError::StaleReference)?;
        let source_entity = self.entities.get(source).ok_or(StepError::StaleReference)?;
        let (target_ty, source_ty) = (target_entity.type_id, source_entity.type_id);
        if !self.schema.is_subtype(source_ty, target_ty) {
            return Err(StepError::type_mismatch(
                self.schema.entity(target_ty).name.clone(),
                self.schema.entity(source_ty).name.clone(),
            ));
        }
        let count = self.schema.entity(target_ty).attributes.len();
        let mut values: Vec<Value> = source_entity.attributes.iter().take(count).cloned().collect();
        // A self reference in the source now means the target.
        for value in &mut values {
            replace_ref(value, source, target);
        }

        let wired = target_entity.wired;
        if wired {
            self.unlink(target);
        }
        if let Some(entity) = self.entities.get_mut(target) {
            entity.attributes = values;
        }
        if wired {
            self.wire_entity(target);
        }
        Ok(())
    }

    /// Remove an entity.
    ///
    /// The entity is unlinked first; references to it held by other
    /// entities are dropped from lists or set to `$`.
    pub fn remove(&mut self, key: EntityKey) -> Result<()> {
        let entity = self.entities.get(key).ok_or(StepError::StaleReference)?;
        let id = entity.id;
        let referrers = self.referrers_of(key);

        self.unlink(key);
        for referrer in referrers {
            let wired = self.entities.get(referrer).map(|e| e.wired).unwrap_or(false);
            if wired {
                self.unlink(referrer);
            }
            if let Some(entity) = self.entities.get_mut(referrer) {
                entity.attributes.iter_mut().for_each(|v| v.strip_ref(key));
            }
            if wired {
                self.wire_entity(referrer);
            }
        }
        self.entities.remove(key);
        self.ids.remove(id);
        debug!("removed #{id}");
        Ok(())
    }

    /// Every entity whose forward attributes reference `key`.
    pub fn referrers_of(&self, key: EntityKey) -> Vec<EntityKey> {
        self.entities
            .iter()
            .filter(|(k, e)| *k != key && e.attributes.iter().any(|v| v.references(key)))
            .map(|(k, _)| k)
            .collect()
    }

    /// Every entity reachable from `key` through forward attributes,
    /// excluding `key` itself, in discovery order.
    pub fn collect_dependencies(&self, key: EntityKey) -> Vec<EntityKey> {
        let mut seen = HashSet::from([key]);
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(entity) = self.entities.get(current) else {
                continue;
            };
            for target in entity.attributes.iter().flat_map(Value::refs) {
                if self.is_alive(target) && seen.insert(target) {
                    out.push(target);
                    stack.push(target);
                }
            }
        }
        out
    }

    /// Remove entities of the given types (subtypes included) that nothing
    /// references, repeating until none are left. Returns the number removed.
    pub fn remove_unreferenced(&mut self, type_names: &[&str]) -> Result<usize> {
        let types: Vec<EntityTypeId> = type_names
            .iter()
            .map(|name| {
                self.schema
                    .entity_by_name(name)
                    .ok_or_else(|| StepError::Schema(format!("unknown entity {name}")))
            })
            .collect::<Result<_>>()?;

        let mut removed = 0;
        loop {
            let referenced: HashSet<EntityKey> = self
                .entities
                .values()
                .flat_map(|e| e.attributes.iter().flat_map(Value::refs))
                .collect();
            let doomed: Vec<EntityKey> = self
                .entities
                .iter()
                .filter(|(k, e)| {
                    !referenced.contains(k)
                        && types.iter().any(|t| self.schema.is_subtype(e.type_id, *t))
                })
                .map(|(k, _)| k)
                .collect();
            if doomed.is_empty() {
                return Ok(removed);
            }
            for key in doomed {
                self.remove(key)?;
                removed += 1;
            }
        }
    }

    /// Check references inside a value against a declared kind.
    fn check_value(&self, kind: &AttrKind, value: &Value) -> Result<()> {
        match (kind, value) {
            (_, Value::Null | Value::Derived) => Ok(()),
            (AttrKind::List(inner), Value::List(items)) => {
                items.iter().try_for_each(|v| self.check_value(inner, v))
            }
            (_, Value::Ref(key)) => {
                let entity = self.entities.get(*key).ok_or(StepError::StaleReference)?;
                let accepted = match kind {
                    AttrKind::Entity(expected) => self.schema.is_subtype(entity.type_id, *expected),
                    AttrKind::Type(t) => self.schema.select_accepts_entity(*t, entity.type_id),
                    _ => false,
                };
                if accepted {
                    Ok(())
                } else {
                    Err(StepError::type_mismatch(
                        self.kind_name(kind),
                        self.schema.entity(entity.type_id).name.clone(),
                    ))
                }
            }
            (AttrKind::Type(t), Value::Typed(_, inner)) => match self.schema.type_def(*t) {
                TypeDef::Defined { kind, .. } => self.check_value(kind, inner),
                _ => self.check_value(kind, inner),
            },
            _ => Ok(()),
        }
    }

    fn kind_name(&self, kind: &AttrKind) -> String {
        match kind {
            AttrKind::Entity(e) => self.schema.entity(*e).name.clone(),
            AttrKind::Type(t) => self.schema.type_name(*t).to_string(),
            AttrKind::List(inner) => format!("LIST OF {}", self.kind_name(inner)),
            other => format!("{other:?}").to_ascii_uppercase(),
        }
    }
}

fn replace_ref(value: &mut Value, from: EntityKey, to: EntityKey) {
    match value {
        Value::Ref(k) if *k == from => *k = to,
        Value::Typed(_, v) => replace_ref(v, from, to),
        Value::List(items) => items.iter_mut().for_each(|v| replace_ref(v, from, to)),
        _ => {}
    }
}

/// Read access to one entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityView<'a> {
    model: &'a Model,
    key: EntityKey,
    entity: &'a Entity,
}

impl<'a> EntityView<'a> {
    /// Arena key.
    pub fn key(&self) -> EntityKey {
        self.key
    }

    /// Record id.
    pub fn id(&self) -> u64 {
        self.entity.id
    }

    /// Entity type.
    pub fn type_id(&self) -> EntityTypeId {
        self.entity.type_id
    }

    /// Entity type name as declared (e.g. `IfcWall`).
    pub fn type_name(&self) -> &'a str {
        &self.model.schema.entity(self.entity.type_id).name
    }

    /// True if the entity is of the named type or a subtype of it.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.model
            .schema
            .entity_by_name(type_name)
            .map(|t| self.model.schema.is_subtype(self.entity.type_id, t))
            .unwrap_or(false)
    }

    /// Forward attribute by name, case-insensitive.
    pub fn get_attribute(&self, name: &str) -> Option<&'a Value> {
        let index = self.model.schema.attribute_index(self.entity.type_id, name)?;
        self.entity.attributes.get(index)
    }

    /// Forward attributes with their names, in record order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        let def = self.model.schema.entity(self.entity.type_id);
        def.attributes
            .iter()
            .map(|a| a.name.as_str())
            .zip(self.entity.attributes.iter())
    }

    /// Live back-references of an inverse attribute, case-insensitive.
    ///
    /// Stale keys are skipped. Unknown names yield an empty list.
    pub fn get_inverse(&self, name: &str) -> Vec<EntityKey> {
        let Some(index) = self.model.schema.inverse_index(self.entity.type_id, name) else {
            return Vec::new();
        };
        self.entity.inverses[index]
            .iter()
            .copied()
            .filter(|k| self.model.is_alive(*k))
            .collect()
    }

    /// Entity referenced by a forward attribute.
    pub fn get_entity(&self, name: &str) -> Option<EntityView<'a>> {
        let key = self.get_attribute(name)?.as_entity()?;
        self.model.entity(key)
    }

    /// True once wiring registered this entity with its targets.
    pub fn is_wired(&self) -> bool {
        self.entity.wired
    }
}
