//! Declarative schema construction.
//!
//! Declarations refer to each other by name and may appear in any order;
//! names are resolved in [`SchemaBuilder::build`].

use std::collections::HashMap;

use super::{
    AttrKind, AttributeDef, EntityDef, EntityTypeId, InverseDef, Schema, SelectAlternative, TypeDef,
    TypeId,
};
use crate::error::{Result, StepError};

/// Attribute or underlying type as declared, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// INTEGER
    Integer,
    /// REAL or NUMBER
    Real,
    /// STRING
    String,
    /// BINARY
    Binary,
    /// BOOLEAN
    Boolean,
    /// LOGICAL
    Logical,
    /// A named type or entity.
    Named(String),
    /// An aggregate of the inner declaration.
    List(Box<Decl>),
}

impl Decl {
    /// A named type or entity.
    pub fn named(name: &str) -> Self {
        Decl::Named(name.to_string())
    }

    /// An aggregate of `inner`.
    pub fn list(inner: Decl) -> Self {
        Decl::List(Box::new(inner))
    }
}

#[derive(Debug, Clone)]
enum TypeDecl {
    Defined(Decl),
    Enumeration(Vec<String>),
    Select(Vec<String>),
}

/// Entity declaration in progress.
#[derive(Debug, Clone)]
pub struct EntityDecl {
    name: String,
    supertype: Option<String>,
    is_abstract: bool,
    attributes: Vec<(String, Decl, bool)>,
    inverses: Vec<(String, String, String)>,
}

impl EntityDecl {
    /// Set the direct supertype.
    pub fn subtype_of(&mut self, supertype: &str) -> &mut Self {
        self.supertype = Some(supertype.to_string());
        self
    }

    /// Mark the entity ABSTRACT.
    pub fn abstract_entity(&mut self) -> &mut Self {
        self.is_abstract = true;
        self
    }

    /// Append a mandatory attribute.
    pub fn attribute(&mut self, name: &str, decl: Decl) -> &mut Self {
        self.attributes.push((name.to_string(), decl, false));
        self
    }

    /// Append an OPTIONAL attribute.
    pub fn optional(&mut self, name: &str, decl: Decl) -> &mut Self {
        self.attributes.push((name.to_string(), decl, true));
        self
    }

    /// Declare an inverse attribute filled by `source`'s forward attribute `attribute`.
    pub fn inverse(&mut self, name: &str, source: &str, attribute: &str) -> &mut Self {
        self.inverses
            .push((name.to_string(), source.to_string(), attribute.to_string()));
        self
    }
}

/// Builder for a [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    types: Vec<(String, TypeDecl)>,
    entities: Vec<EntityDecl>,
    aliases: Vec<(String, String)>,
    global_id_type: Option<String>,
}

impl SchemaBuilder {
    /// Start a schema with the given FILE_SCHEMA identifier.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            types: Vec::new(),
            entities: Vec::new(),
            aliases: Vec::new(),
            global_id_type: None,
        }
    }

    /// Declare a defined type over `underlying`.
    pub fn defined(&mut self, name: &str, underlying: Decl) -> &mut Self {
        self.types.push((name.to_string(), TypeDecl::Defined(underlying)));
        self
    }

    /// Declare an enumeration.
    pub fn enumeration(&mut self, name: &str, symbols: &[&str]) -> &mut Self {
        let symbols = symbols.iter().map(|s| s.to_ascii_uppercase()).collect();
        self.types.push((name.to_string(), TypeDecl::Enumeration(symbols)));
        self
    }

    /// Declare a select over named types and entities.
    pub fn select(&mut self, name: &str, alternatives: &[&str]) -> &mut Self {
        let alternatives = alternatives.iter().map(|s| s.to_string()).collect();
        self.types.push((name.to_string(), TypeDecl::Select(alternatives)));
        self
    }

    /// Declare an entity; configure it through the returned handle.
    pub fn entity(&mut self, name: &str) -> &mut EntityDecl {
        self.entities.push(EntityDecl {
            name: name.to_string(),
            supertype: None,
            is_abstract: false,
            attributes: Vec::new(),
            inverses: Vec::new(),
        });
        let last = self.entities.len() - 1;
        &mut self.entities[last]
    }

    /// Map a legacy record keyword onto an entity.
    pub fn alias(&mut self, keyword: &str, entity: &str) -> &mut Self {
        self.aliases.push((keyword.to_ascii_uppercase(), entity.to_string()));
        self
    }

    /// Mark the defined type holding GUIDs.
    pub fn global_id_type(&mut self, name: &str) -> &mut Self {
        self.global_id_type = Some(name.to_string());
        self
    }

    /// Resolve every name and produce the schema.
    pub fn build(&self) -> Result<Schema> {
        let mut type_index = HashMap::new();
        for (i, (name, _)) in self.types.iter().enumerate() {
            if type_index
                .insert(name.to_ascii_uppercase(), TypeId(i as u32))
                .is_some()
            {
                return Err(StepError::Schema(format!("duplicate type {name}")));
            }
        }
        let mut entity_index = HashMap::new();
        for (i, decl) in self.entities.iter().enumerate() {
            let keyword = decl.name.to_ascii_uppercase();
            if type_index.contains_key(&keyword)
                || entity_index.insert(keyword, EntityTypeId(i as u32)).is_some()
            {
                return Err(StepError::Schema(format!("duplicate name {}", decl.name)));
            }
        }

        let resolver = Resolver {
            types: &type_index,
            entities: &entity_index,
        };

        let mut types = Vec::with_capacity(self.types.len());
        for (name, decl) in &self.types {
            let def = match decl {
                TypeDecl::Defined(underlying) => TypeDef::Defined {
                    name: name.clone(),
                    kind: resolver.kind(underlying, name)?,
                },
                TypeDecl::Enumeration(symbols) => TypeDef::Enumeration {
                    name: name.clone(),
                    symbols: symbols.clone(),
                },
                TypeDecl::Select(alternatives) => TypeDef::Select {
                    name: name.clone(),
                    alternatives: alternatives
                        .iter()
                        .map(|alt| resolver.alternative(alt, name))
                        .collect::<Result<_>>()?,
                },
            };
            types.push(def);
        }
        check_type_cycles(&types)?;

        let entities = self.build_entities(&resolver)?;

        let mut aliases = HashMap::new();
        for (keyword, target) in &self.aliases {
            let id = resolver.entity(target, keyword)?;
            aliases.insert(keyword.clone(), id);
        }

        let global_id_type = match &self.global_id_type {
            Some(name) => Some(
                type_index
                    .get(&name.to_ascii_uppercase())
                    .copied()
                    .ok_or_else(|| StepError::Schema(format!("unknown global id type {name}")))?,
            ),
            None => None,
        };

        Ok(Schema {
            name: self.name.clone(),
            entities,
            types,
            entity_index,
            type_index,
            aliases,
            global_id_type,
        })
    }

    fn build_entities(&self, resolver: &Resolver<'_>) -> Result<Vec<EntityDef>> {
        let count = self.entities.len();
        let mut supertypes = Vec::with_capacity(count);
        for decl in &self.entities {
            let supertype = match &decl.supertype {
                Some(name) => Some(resolver.entity(name, &decl.name)?),
                None => None,
            };
            supertypes.push(supertype);
        }

        // Ancestor chains, self first.
        let mut ancestors = Vec::with_capacity(count);
        for i in 0..count {
            let mut chain = vec![EntityTypeId(i as u32)];
            let mut current = supertypes[i];
            while let Some(parent) = current {
                if chain.len() > count {
                    return Err(StepError::Schema(format!(
                        "supertype cycle at {}",
                        self.entities[i].name
                    )));
                }
                chain.push(parent);
                current = supertypes[parent.0 as usize];
            }
            ancestors.push(chain);
        }

        // Flatten attributes root first.
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by_key(|&i| ancestors[i].len());
        let mut attributes: Vec<Vec<AttributeDef>> = vec![Vec::new(); count];
        for &i in &order {
            let mut flat = match supertypes[i] {
                Some(parent) => attributes[parent.0 as usize].clone(),
                None => Vec::new(),
            };
            let decl = &self.entities[i];
            for (name, attr_decl, optional) in &decl.attributes {
                flat.push(AttributeDef {
                    name: name.clone(),
                    kind: resolver.kind(attr_decl, &decl.name)?,
                    optional: *optional,
                    owner: EntityTypeId(i as u32),
                });
            }
            attributes[i] = flat;
        }

        let mut inverses: Vec<Vec<InverseDef>> = vec![Vec::new(); count];
        for &i in &order {
            let mut flat = match supertypes[i] {
                Some(parent) => inverses[parent.0 as usize].clone(),
                None => Vec::new(),
            };
            let decl = &self.entities[i];
            for (name, source_name, attribute_name) in &decl.inverses {
                let source = resolver.entity(source_name, &decl.name)?;
                let attribute = attributes[source.0 as usize]
                    .iter()
                    .position(|a| a.name.eq_ignore_ascii_case(attribute_name))
                    .ok_or_else(|| {
                        StepError::Schema(format!(
                            "inverse {}.{name}: {source_name} has no attribute {attribute_name}",
                            decl.name
                        ))
                    })?;
                flat.push(InverseDef {
                    name: name.clone(),
                    source,
                    attribute,
                });
            }
            inverses[i] = flat;
        }

        Ok(self
            .entities
            .iter()
            .zip(attributes)
            .zip(inverses)
            .zip(ancestors)
            .zip(supertypes)
            .map(|((((decl, attributes), inverses), ancestors), supertype)| EntityDef {
                name: decl.name.clone(),
                keyword: decl.name.to_ascii_uppercase(),
                supertype,
                is_abstract: decl.is_abstract,
                attributes,
                inverses,
                ancestors,
            })
            .collect())
    }
}

/// Named types a type decodes through: a defined type's underlying type
/// (inside any aggregate) and a select's type alternatives.
fn type_edges(def: &TypeDef) -> Vec<TypeId> {
    match def {
        TypeDef::Defined { kind, .. } => {
            let mut kind = kind;
            while let AttrKind::List(inner) = kind {
                kind = inner;
            }
            match kind {
                AttrKind::Type(t) => vec![*t],
                _ => Vec::new(),
            }
        }
        TypeDef::Select { alternatives, .. } => alternatives
            .iter()
            .filter_map(|alt| match alt {
                SelectAlternative::Type(t) => Some(*t),
                SelectAlternative::Entity(_) => None,
            })
            .collect(),
        TypeDef::Enumeration { .. } => Vec::new(),
    }
}

/// Reject defined types and selects that reach themselves.
fn check_type_cycles(types: &[TypeDef]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Open,
        Done,
    }

    let mut marks = vec![Mark::New; types.len()];
    for start in 0..types.len() {
        if marks[start] != Mark::New {
            continue;
        }
        marks[start] = Mark::Open;
        let mut stack = vec![(start, type_edges(&types[start]).into_iter())];
        while let Some((node, edges)) = stack.last_mut() {
            let node = *node;
            let Some(next) = edges.next() else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            let next = next.0 as usize;
            match marks[next] {
                Mark::New => {
                    marks[next] = Mark::Open;
                    stack.push((next, type_edges(&types[next]).into_iter()));
                }
                Mark::Open => {
                    return Err(StepError::Schema(format!(
                        "type cycle through {}",
                        types[next].name()
                    )));
                }
                Mark::Done => {}
            }
        }
    }
    Ok(())
}

struct Resolver<'a> {
    types: &'a HashMap<String, TypeId>,
    entities: &'a HashMap<String, EntityTypeId>,
}

impl Resolver<'_> {
    fn kind(&self, decl: &Decl, context: &str) -> Result<AttrKind> {
        Ok(match decl {
            Decl::Integer => AttrKind::Integer,
            Decl::Real => AttrKind::Real,
            Decl::String => AttrKind::String,
            Decl::Binary => AttrKind::Binary,
            Decl::Boolean => AttrKind::Boolean,
            Decl::Logical => AttrKind::Logical,
            Decl::List(inner) => AttrKind::List(Box::new(self.kind(inner, context)?)),
            Decl::Named(name) => match self.alternative(name, context)? {
                SelectAlternative::Type(t) => AttrKind::Type(t),
                SelectAlternative::Entity(e) => AttrKind::Entity(e),
            },
        })
    }

    fn alternative(&self, name: &str, context: &str) -> Result<SelectAlternative> {
        let upper = name.to_ascii_uppercase();
        if let Some(t) = self.types.get(&upper) {
            return Ok(SelectAlternative::Type(*t));
        }
        self.entities
            .get(&upper)
            .map(|e| SelectAlternative::Entity(*e))
            .ok_or_else(|| StepError::Schema(format!("unknown type {name} in {context}")))
    }

    fn entity(&self, name: &str, context: &str) -> Result<EntityTypeId> {
        self.entities
            .get(&name.to_ascii_uppercase())
            .copied()
            .ok_or_else(|| StepError::Schema(format!("unknown entity {name} in {context}")))
    }
}
