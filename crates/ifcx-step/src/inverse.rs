//! Inverse attribute wiring.
//!
//! Wiring registers an entity's key in the inverse collections of every
//! entity its forward attributes reference; which collection is decided by
//! [`Schema::inverse_slots`](crate::schema::Schema::inverse_slots). Wiring
//! runs on one thread with exclusive access to the model, so appends to a
//! target's collection are never concurrent.

use std::collections::HashSet;

use log::{debug, info};

use crate::model::{EntityKey, Model};
use crate::value::Value;

impl Model {
    /// Wire every entity, in id order.
    pub fn wire_inverses(&mut self) {
        let keys: Vec<EntityKey> = self.ids.iter().map(|(_, key)| key).collect();
        let count = keys.len();
        for key in keys {
            self.wire_entity(key);
        }
        info!("wired inverse attributes of {count} entities");
    }

    /// Register one entity with the targets of its forward attributes.
    ///
    /// Does nothing for an entity that is already wired or no longer alive.
    pub fn wire_entity(&mut self, key: EntityKey) {
        let Some(entity) = self.entities.get(key) else {
            return;
        };
        if entity.wired {
            return;
        }
        let source_ty = entity.type_id;
        let targets: Vec<(usize, EntityKey)> = entity
            .attributes
            .iter()
            .enumerate()
            .flat_map(|(index, value)| value.refs().into_iter().map(move |t| (index, t)))
            .collect();

        // An unwired entity is in no inverse collection yet, so the only
        // duplicates are repeated references from this entity itself.
        let mut registered = HashSet::new();
        for (attribute, target) in targets {
            let Some(target_entity) = self.entities.get_mut(target) else {
                continue;
            };
            for slot in self.schema.inverse_slots(target_entity.type_id, source_ty, attribute) {
                if registered.insert((target, slot)) {
                    target_entity.inverses[slot].push(key);
                }
            }
        }
        if let Some(entity) = self.entities.get_mut(key) {
            entity.wired = true;
        }
    }

    /// Remove one entity from every inverse collection it registered into.
    ///
    /// Forward attributes are untouched. Calling it again, or on an entity
    /// that was never wired, is a no-op. Targets that no longer exist are
    /// skipped.
    pub fn unlink(&mut self, key: EntityKey) {
        let Some(entity) = self.entities.get(key) else {
            return;
        };
        if !entity.wired {
            return;
        }
        let targets: Vec<EntityKey> = entity.attributes.iter().flat_map(Value::refs).collect();

        for target in targets {
            let Some(target_entity) = self.entities.get_mut(target) else {
                debug!("unlink: skipping removed target");
                continue;
            };
            for list in &mut target_entity.inverses {
                if list.contains(&key) {
                    let kept: Vec<EntityKey> = list.iter().copied().filter(|k| *k != key).collect();
                    *list = kept;
                }
            }
        }
        if let Some(entity) = self.entities.get_mut(key) {
            entity.wired = false;
        }
    }
}
