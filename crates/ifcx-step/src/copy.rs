//! Deep copy of entities within a model.

use std::collections::{BTreeSet, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StepError};
use crate::guid::new_global_id;
use crate::model::{Entity, EntityKey, Model};
use crate::schema::EntityTypeId;
use crate::value::Value;

/// Copy policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyOptions {
    /// Entity types (subtypes included, names case-insensitive) that are
    /// shared by reference instead of cloned.
    pub shallow_copy_types: BTreeSet<String>,
    /// Give copied global-id attributes fresh values.
    pub new_global_ids: bool,
}

impl CopyOptions {
    /// Share entities of this type instead of cloning them.
    pub fn shallow(mut self, type_name: &str) -> Self {
        self.shallow_copy_types.insert(type_name.to_string());
        self
    }

    /// Regenerate global ids on the copies.
    pub fn with_new_global_ids(mut self) -> Self {
        self.new_global_ids = true;
        self
    }
}

struct CopyContext<'o> {
    options: &'o CopyOptions,
    shallow: Vec<EntityTypeId>,
    copies: HashMap<EntityKey, EntityKey>,
    order: Vec<(EntityKey, EntityKey)>,
}

impl Model {
    /// Clone an entity and, recursively, every entity its forward attributes
    /// reference, except types marked shallow. Returns the root copy.
    ///
    /// Copies get fresh ids and empty, unwired inverse attributes.
    pub fn deep_copy(&mut self, key: EntityKey, options: &CopyOptions) -> Result<EntityKey> {
        let pairs = self.deep_copy_graph(key, options)?;
        pairs
            .first()
            .map(|(_, copy)| *copy)
            .ok_or(StepError::StaleReference)
    }

    /// Like [`Model::deep_copy`], returning every `(original, copy)` pair in
    /// creation order, root first.
    pub fn deep_copy_graph(
        &mut self,
        key: EntityKey,
        options: &CopyOptions,
    ) -> Result<Vec<(EntityKey, EntityKey)>> {
        if !self.is_alive(key) {
            return Err(StepError::StaleReference);
        }
        let shallow = options
            .shallow_copy_types
            .iter()
            .map(|name| {
                self.schema
                    .entity_by_name(name)
                    .ok_or_else(|| StepError::Schema(format!("unknown entity {name}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut ctx = CopyContext {
            options,
            shallow,
            copies: HashMap::new(),
            order: Vec::new(),
        };
        if let Err(error) = self.copy_entity(key, &mut ctx) {
            // Drop the partial copies; none of them is referenced from outside.
            for (_, copy) in &ctx.order {
                if let Some(entity) = self.entities.remove(*copy) {
                    self.ids.remove(entity.id);
                }
            }
            return Err(error);
        }
        debug!("deep copy of {} entities", ctx.order.len());
        Ok(ctx.order)
    }

    fn copy_entity(&mut self, key: EntityKey, ctx: &mut CopyContext<'_>) -> Result<EntityKey> {
        if let Some(copy) = ctx.copies.get(&key) {
            return Ok(*copy);
        }
        let source = self.entities.get(key).ok_or(StepError::StaleReference)?;
        let type_id = source.type_id;
        let mut values = source.attributes.clone();

        let id = self.ids.next_id()?;
        let copy = self.entities.insert(Entity::stub(id, type_id, &self.schema));
        self.ids.insert(id, copy)?;
        ctx.copies.insert(key, copy);
        ctx.order.push((key, copy));

        for value in &mut values {
            self.copy_value(value, ctx)?;
        }
        if let Some(entity) = self.entities.get_mut(copy) {
            entity.attributes = values;
        }
        Ok(copy)
    }

    fn copy_value(&mut self, value: &mut Value, ctx: &mut CopyContext<'_>) -> Result<()> {
        match value {
            Value::Ref(target) => {
                let Some(entity) = self.entities.get(*target) else {
                    return Ok(());
                };
                let ty = entity.type_id;
                if !ctx.shallow.iter().any(|s| self.schema.is_subtype(ty, *s)) {
                    *target = self.copy_entity(*target, ctx)?;
                }
            }
            Value::Typed(ty, inner) => {
                if ctx.options.new_global_ids && self.schema.global_id_type() == Some(*ty) {
                    **inner = Value::String(new_global_id());
                } else {
                    self.copy_value(inner, ctx)?;
                }
            }
            Value::List(items) => {
                for item in items.iter_mut() {
                    self.copy_value(item, ctx)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::guid::expand_global_id;
    use crate::schema::{Decl, Schema, SchemaBuilder};

    fn schema() -> Arc<Schema> {
        let mut b = SchemaBuilder::new("TEST");
        b.defined("Guid", Decl::String);
        b.defined("Label", Decl::String);
        b.global_id_type("Guid");
        b.entity("Profile").attribute("Width", Decl::Real);
        b.entity("Point").attribute("Coordinates", Decl::list(Decl::Real));
        b.entity("Solid")
            .attribute("GlobalId", Decl::named("Guid"))
            .optional("Name", Decl::named("Label"))
            .attribute("Profile", Decl::named("Profile"))
            .attribute("Points", Decl::list(Decl::named("Point")))
            .inverse("Users", "Solid", "Twin")
            .optional("Twin", Decl::named("Solid"));
        Arc::new(b.build().unwrap())
    }

    fn guid(model: &Model, s: &str) -> Value {
        let ty = model.schema().type_by_name("Guid").unwrap();
        Value::typed(ty, Value::from(s))
    }

    fn sample(model: &mut Model) -> EntityKey {
        let profile = model.insert("Profile", vec![Value::from(0.2)], true).unwrap();
        let p1 = model
            .insert("Point", vec![Value::from(vec![0.0, 0.0])], true)
            .unwrap();
        let p2 = model
            .insert("Point", vec![Value::from(vec![1.0, 0.0])], true)
            .unwrap();
        let g = guid(model, "2O2Fr$t4X7Zf8NOew3FLOH");
        model
            .insert(
                "Solid",
                vec![g, Value::Null, Value::from(profile), Value::from(vec![p1, p2]), Value::Null],
                true,
            )
            .unwrap()
    }

    #[test]
    fn test_copy_is_independent() {
        let mut model = Model::new(schema());
        let solid = sample(&mut model);
        let copy = model.deep_copy(solid, &CopyOptions::default()).unwrap();

        assert_eq!(model.len(), 8);
        assert_eq!(model.entity(copy).unwrap().id(), 5);
        let original_points = model.entity(solid).unwrap().get_attribute("Points").unwrap().clone();
        let copied_points = model.entity(copy).unwrap().get_attribute("Points").unwrap().clone();
        assert_ne!(original_points, copied_points);
        // Null stays null.
        assert!(model.entity(copy).unwrap().get_attribute("Name").unwrap().is_null());

        let copied_first = copied_points.as_list().unwrap()[0].as_entity().unwrap();
        model
            .set_attribute(copied_first, "Coordinates", Value::from(vec![9.0, 9.0]))
            .unwrap();
        let original_first = original_points.as_list().unwrap()[0].as_entity().unwrap();
        assert_eq!(
            model.entity(original_first).unwrap().get_attribute("Coordinates").unwrap(),
            &Value::from(vec![0.0, 0.0])
        );
    }

    #[test]
    fn test_shallow_types_are_shared() {
        let mut model = Model::new(schema());
        let solid = sample(&mut model);
        let options = CopyOptions::default().shallow("PROFILE");
        let pairs = model.deep_copy_graph(solid, &options).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0, solid);

        let copy = model.entity(pairs[0].1).unwrap();
        let original = model.entity(solid).unwrap();
        assert_eq!(
            copy.get_attribute("Profile").unwrap(),
            original.get_attribute("Profile").unwrap()
        );
        assert_eq!(copy.get_attribute("GlobalId"), original.get_attribute("GlobalId"));
    }

    #[test]
    fn test_copy_leaves_inverses_empty() {
        let mut model = Model::new(schema());
        let solid = sample(&mut model);
        let g = guid(&model, "0000000000000000000001");
        let profile = model.get(1).unwrap().key();
        let user = model
            .insert(
                "Solid",
                vec![g, Value::Null, Value::from(profile), Value::List(vec![]), Value::from(solid)],
                true,
            )
            .unwrap();
        assert_eq!(model.entity(solid).unwrap().get_inverse("Users"), vec![user]);

        let copy = model.deep_copy(solid, &CopyOptions::default()).unwrap();
        let view = model.entity(copy).unwrap();
        assert!(view.get_inverse("Users").is_empty());
        assert!(!view.is_wired());
    }

    #[test]
    fn test_cycles_and_new_global_ids() {
        let mut model = Model::new(schema());
        let solid = sample(&mut model);
        model.set_attribute(solid, "Twin", Value::from(solid)).unwrap();

        let options = CopyOptions::default().with_new_global_ids();
        let copy = model.deep_copy(solid, &options).unwrap();
        let view = model.entity(copy).unwrap();
        assert_eq!(view.get_attribute("Twin").unwrap().as_entity(), Some(copy));

        let new_id = view.get_attribute("GlobalId").unwrap().as_str().unwrap();
        assert_ne!(new_id, "2O2Fr$t4X7Zf8NOew3FLOH");
        assert!(expand_global_id(new_id).is_some());
    }

    #[test]
    fn test_copy_fails_cleanly_without_free_ids() {
        let mut model = Model::new(schema());
        let solid = sample(&mut model);
        model
            .insert_with_id(u64::MAX - 1, "Profile", vec![Value::from(0.5)], true)
            .unwrap();
        let before = model.len();

        // The root copy takes the last id; its profile finds none left.
        assert_eq!(
            model.deep_copy(solid, &CopyOptions::default()),
            Err(StepError::IdSpaceExhausted(u64::MAX))
        );
        assert_eq!(model.len(), before);
        assert!(model.get(u64::MAX).is_none());
        assert_eq!(model.id_table().max_id(), u64::MAX - 1);
    }

    #[test]
    fn test_bad_options() {
        let mut model = Model::new(schema());
        let solid = sample(&mut model);
        let options = CopyOptions::default().shallow("Nope");
        assert!(matches!(
            model.deep_copy(solid, &options),
            Err(StepError::Schema(_))
        ));
        model.remove(solid).unwrap();
        assert_eq!(
            model.deep_copy(solid, &CopyOptions::default()),
            Err(StepError::StaleReference)
        );
    }
}
