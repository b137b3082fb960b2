//! Two-pass entity graph assembly.
//!
//! The stub pass allocates one empty entity per record and fills the id
//! table. The attribute pass then decodes every record against the frozen
//! table. [`StubGraph`] is the intermediate state: it has no attribute
//! accessors, and only a fully successful [`StubGraph::resolve`] yields a
//! [`Model`].

use std::sync::Arc;

use log::{debug, warn};
use rayon::prelude::*;
use slotmap::SlotMap;

use crate::error::{Result, StepError, StepErrors};
use crate::header::StepHeader;
use crate::lexer::RawRecord;
use crate::model::{Entity, EntityKey, IdTable, Model};
use crate::schema::{EntityTypeId, Schema};
use crate::select::{EntityLookup, TypeFactory};
use crate::settings::ReaderSettings;
use crate::tokenizer::read_arguments;
use crate::value::Value;

/// Entities allocated but not yet decoded.
pub struct StubGraph {
    schema: Arc<Schema>,
    entities: SlotMap<EntityKey, Entity>,
    ids: IdTable,
    pending: Vec<(EntityKey, RawRecord)>,
    errors: Vec<StepError>,
    skipped: usize,
}

impl StubGraph {
    /// Id table built by the stub pass.
    pub fn id_table(&self) -> &IdTable {
        &self.ids
    }

    /// Failures found by the stub pass.
    pub fn errors(&self) -> &[StepError] {
        &self.errors
    }

    /// Records skipped because of unknown keywords.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Decode every pending record and produce the resolved model.
    ///
    /// Either every record decodes, or every independent failure of both
    /// passes is returned.
    pub fn resolve(self, settings: &ReaderSettings, header: StepHeader) -> std::result::Result<Model, StepErrors> {
        let decoded: Vec<(EntityKey, Result<Vec<Value>>)> = if settings.parallel {
            self.pending
                .par_iter()
                .map(|(key, record)| (*key, self.decode_record(*key, record, settings)))
                .collect()
        } else {
            self.pending
                .iter()
                .map(|(key, record)| (*key, self.decode_record(*key, record, settings)))
                .collect()
        };

        let StubGraph {
            schema,
            mut entities,
            ids,
            mut errors,
            ..
        } = self;
        for (key, result) in decoded {
            match result {
                Ok(values) => {
                    if let Some(entity) = entities.get_mut(key) {
                        entity.attributes = values;
                    }
                }
                Err(e) => errors.extend(e.into_flat()),
            }
        }

        if !errors.is_empty() {
            return Err(StepErrors(errors));
        }
        Ok(Model::from_parts(schema, header, entities, ids))
    }

    fn decode_record(&self, key: EntityKey, record: &RawRecord, settings: &ReaderSettings) -> Result<Vec<Value>> {
        let id = record.id;
        let ty = self
            .entities
            .get(key)
            .map(|e| e.type_id)
            .ok_or(StepError::MissingEntity(id))?;
        let def = self.schema.entity(ty);

        let args = read_arguments(&record.args).map_err(|e| e.at_entity(id))?;
        let expected = def.attributes.len();
        if args.len() < expected || (settings.strict_arity && args.len() > expected) {
            return Err(StepError::Arity {
                entity_id: id,
                type_name: def.name.clone(),
                expected,
                actual: args.len(),
            });
        }
        if args.len() > expected {
            warn!(
                "#{id}={}: ignoring {} extra argument(s)",
                record.keyword,
                args.len() - expected
            );
        }

        let factory = TypeFactory::new(&self.schema, self);
        let mut values = Vec::with_capacity(expected);
        let mut errors = Vec::new();
        for (attr, arg) in def.attributes.iter().zip(&args) {
            match factory.decode(&attr.kind, arg) {
                Ok(value) => values.push(value),
                Err(e) => errors.push(e),
            }
        }
        match StepError::merge(errors) {
            Some(error) => Err(error.at_entity(id)),
            None => Ok(values),
        }
    }
}

impl EntityLookup for StubGraph {
    fn lookup(&self, id: u64) -> Option<(EntityKey, EntityTypeId)> {
        let key = self.ids.get(id)?;
        self.entities.get(key).map(|e| (key, e.type_id))
    }
}

/// Stub pass: classify every record and allocate its entity.
///
/// Keyword resolution runs in parallel; insertion into the id table is
/// sequential and in file order.
pub fn build_stubs(schema: Arc<Schema>, records: Vec<RawRecord>, settings: &ReaderSettings) -> StubGraph {
    let classified: Vec<Result<Option<EntityTypeId>>> = if settings.parallel {
        records
            .par_iter()
            .map(|r| classify(&schema, r, settings))
            .collect()
    } else {
        records.iter().map(|r| classify(&schema, r, settings)).collect()
    };

    let mut entities = SlotMap::with_capacity_and_key(records.len());
    let mut ids = IdTable::default();
    let mut pending = Vec::with_capacity(records.len());
    let mut errors = Vec::new();
    let mut skipped = 0;
    for (record, class) in records.into_iter().zip(classified) {
        match class {
            Ok(Some(ty)) => {
                let key = entities.insert(Entity::stub(record.id, ty, &schema));
                if let Err(e) = ids.insert(record.id, key) {
                    entities.remove(key);
                    errors.push(e);
                    continue;
                }
                pending.push((key, record));
            }
            Ok(None) => skipped += 1,
            Err(e) => errors.push(e),
        }
    }
    debug!(
        "stub pass: {} entities, {} skipped, {} errors",
        pending.len(),
        skipped,
        errors.len()
    );

    StubGraph {
        schema,
        entities,
        ids,
        pending,
        errors,
        skipped,
    }
}

fn classify(schema: &Schema, record: &RawRecord, settings: &ReaderSettings) -> Result<Option<EntityTypeId>> {
    let id = record.id;
    if record.keyword.is_empty() {
        return Err(StepError::syntax("complex entity instances are not supported", &record.args).at_entity(id));
    }
    let Some((ty, aliased)) = schema.resolve_keyword(&record.keyword) else {
        if settings.skip_unknown_entities {
            warn!("#{id}: skipping unknown entity {}", record.keyword);
            return Ok(None);
        }
        return Err(StepError::UnknownEntity {
            entity_id: id,
            keyword: record.keyword.clone(),
        });
    };

    let def = schema.entity(ty);
    if aliased {
        warn!("#{id}: reading {} as {}", record.keyword, def.name);
    }
    if def.is_abstract {
        return Err(StepError::AbstractEntity {
            entity_id: id,
            type_name: def.name.clone(),
        });
    }
    Ok(Some(ty))
}
