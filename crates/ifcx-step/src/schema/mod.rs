//! Schema descriptors: the closed set of entity and type definitions the
//! engine dispatches on.
//!
//! A [`Schema`] is built once with [`SchemaBuilder`] and shared read-only
//! (typically behind an `Arc`) by every model parsed against it. Entity
//! attributes are flattened at build time, inherited ones first, so an
//! attribute index is the argument position in a record.

mod builder;

pub use builder::{Decl, EntityDecl, SchemaBuilder};

use std::collections::HashMap;

/// Index of an entity definition within its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityTypeId(pub(crate) u32);

/// Index of a defined, enumeration or select type within its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

/// Resolved kind of an attribute or of a defined type's underlying value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrKind {
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
    /// Named defined, enumeration or select type.
    Type(TypeId),
    /// Reference to an entity of the given type or a subtype.
    Entity(EntityTypeId),
    /// LIST, SET, BAG or ARRAY of the inner kind.
    List(Box<AttrKind>),
}

/// One explicit attribute.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    /// Attribute name as declared.
    pub name: String,
    /// Value kind.
    pub kind: AttrKind,
    /// OPTIONAL in the schema.
    pub optional: bool,
    /// Entity type that declares the attribute.
    pub owner: EntityTypeId,
}

/// One inverse attribute: the back-references populated by wiring.
#[derive(Debug, Clone)]
pub struct InverseDef {
    /// Inverse attribute name.
    pub name: String,
    /// Entity type whose forward attribute points here.
    pub source: EntityTypeId,
    /// Index of that forward attribute on the source type.
    pub attribute: usize,
}

/// An entity type.
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Type name as declared (e.g. `IfcWall`).
    pub name: String,
    /// Upper-case keyword used in records.
    pub keyword: String,
    /// Direct supertype.
    pub supertype: Option<EntityTypeId>,
    /// ABSTRACT entities cannot be instantiated by records.
    pub is_abstract: bool,
    /// Explicit attributes, inherited first.
    pub attributes: Vec<AttributeDef>,
    /// Inverse attributes, inherited first.
    pub inverses: Vec<InverseDef>,
    ancestors: Vec<EntityTypeId>,
}

/// A defined, enumeration or select type.
#[derive(Debug, Clone)]
pub enum TypeDef {
    /// `TYPE IfcLabel = STRING;`
    Defined {
        /// Type name.
        name: String,
        /// Underlying kind.
        kind: AttrKind,
    },
    /// `TYPE IfcUnitEnum = ENUMERATION OF (...);`
    Enumeration {
        /// Type name.
        name: String,
        /// Upper-case symbols.
        symbols: Vec<String>,
    },
    /// `TYPE IfcValue = SELECT (...);`
    Select {
        /// Type name.
        name: String,
        /// Alternatives, in declaration order.
        alternatives: Vec<SelectAlternative>,
    },
}

impl TypeDef {
    /// Declared name.
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Defined { name, .. }
            | TypeDef::Enumeration { name, .. }
            | TypeDef::Select { name, .. } => name,
        }
    }
}

/// One alternative of a select type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAlternative {
    /// An entity type (and its subtypes).
    Entity(EntityTypeId),
    /// A defined, enumeration or nested select type.
    Type(TypeId),
}

/// A complete schema.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    entities: Vec<EntityDef>,
    types: Vec<TypeDef>,
    entity_index: HashMap<String, EntityTypeId>,
    type_index: HashMap<String, TypeId>,
    aliases: HashMap<String, EntityTypeId>,
    global_id_type: Option<TypeId>,
}

impl Schema {
    /// Schema identifier as written in FILE_SCHEMA (e.g. `IFC4`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entity definition by id.
    pub fn entity(&self, id: EntityTypeId) -> &EntityDef {
        &self.entities[id.0 as usize]
    }

    /// All entity definitions.
    pub fn entities(&self) -> impl Iterator<Item = (EntityTypeId, &EntityDef)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, def)| (EntityTypeId(i as u32), def))
    }

    /// Entity type by name, case-insensitive.
    pub fn entity_by_name(&self, name: &str) -> Option<EntityTypeId> {
        self.entity_index.get(&name.to_ascii_uppercase()).copied()
    }

    /// Entity type for a record keyword, following legacy aliases.
    ///
    /// The flag is true when an alias was applied.
    pub fn resolve_keyword(&self, keyword: &str) -> Option<(EntityTypeId, bool)> {
        if let Some(id) = self.entity_index.get(keyword) {
            return Some((*id, false));
        }
        self.aliases.get(keyword).map(|id| (*id, true))
    }

    /// Type definition by id.
    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    /// Defined, enumeration or select type by name, case-insensitive.
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.type_index.get(&name.to_ascii_uppercase()).copied()
    }

    /// Declared name of a type.
    pub fn type_name(&self, id: TypeId) -> &str {
        self.type_def(id).name()
    }

    /// The defined type used for GUIDs, if the schema declares one.
    pub fn global_id_type(&self) -> Option<TypeId> {
        self.global_id_type
    }

    /// True if `sub` is `sup` or one of its subtypes.
    pub fn is_subtype(&self, sub: EntityTypeId, sup: EntityTypeId) -> bool {
        self.entity(sub).ancestors.contains(&sup)
    }

    /// Index of an explicit attribute by name, case-insensitive.
    pub fn attribute_index(&self, ty: EntityTypeId, name: &str) -> Option<usize> {
        self.entity(ty)
            .attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Index of an inverse attribute by name, case-insensitive.
    pub fn inverse_index(&self, ty: EntityTypeId, name: &str) -> Option<usize> {
        self.entity(ty)
            .inverses
            .iter()
            .position(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Inverse slots on `target` populated by attribute `attribute` of an
    /// entity of type `source`.
    pub fn inverse_slots(
        &self,
        target: EntityTypeId,
        source: EntityTypeId,
        attribute: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        self.entity(target)
            .inverses
            .iter()
            .enumerate()
            .filter(move |(_, inv)| inv.attribute == attribute && self.is_subtype(source, inv.source))
            .map(|(i, _)| i)
    }

    /// True if an entity of type `ty` is a valid value of `select`.
    pub fn select_accepts_entity(&self, select: TypeId, ty: EntityTypeId) -> bool {
        self.select_alternatives(select).iter().any(|alt| match *alt {
            SelectAlternative::Entity(e) => self.is_subtype(ty, e),
            SelectAlternative::Type(t) => self.select_accepts_entity(t, ty),
        })
    }

    /// True if a defined or enumeration value of type `ty` is a valid value of `select`.
    pub fn select_accepts_type(&self, select: TypeId, ty: TypeId) -> bool {
        if select == ty {
            return true;
        }
        self.select_alternatives(select).iter().any(|alt| match *alt {
            SelectAlternative::Type(t) => t == ty || self.select_accepts_type(t, ty),
            SelectAlternative::Entity(_) => false,
        })
    }

    /// Enumeration alternative of `select` that contains `symbol`.
    pub fn select_enum_with_symbol(&self, select: TypeId, symbol: &str) -> Option<TypeId> {
        self.select_alternatives(select).iter().find_map(|alt| match *alt {
            SelectAlternative::Type(t) => match self.type_def(t) {
                TypeDef::Enumeration { symbols, .. } if symbols.iter().any(|s| s == symbol) => Some(t),
                TypeDef::Select { .. } => self.select_enum_with_symbol(t, symbol),
                _ => None,
            },
            SelectAlternative::Entity(_) => None,
        })
    }

    /// True if values of this kind are written with their type name wrapper.
    pub fn is_select_kind(&self, kind: &AttrKind) -> bool {
        match kind {
            AttrKind::Type(t) => matches!(self.type_def(*t), TypeDef::Select { .. }),
            AttrKind::List(inner) => self.is_select_kind(inner),
            _ => false,
        }
    }

    fn select_alternatives(&self, select: TypeId) -> &[SelectAlternative] {
        match self.type_def(select) {
            TypeDef::Select { alternatives, .. } => alternatives,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        let mut b = SchemaBuilder::new("TEST");
        b.defined("Label", Decl::String);
        b.defined("Length", Decl::Real);
        b.enumeration("Colour", &["RED", "GREEN"]);
        b.select("Measure", &["Length", "Label"]);
        b.select("Thing", &["Measure", "Colour", "Shape"]);
        b.entity("Shape").abstract_entity().optional("Name", Decl::named("Label"));
        b.entity("Box")
            .subtype_of("Shape")
            .attribute("Size", Decl::named("Length"))
            .inverse("UsedBy", "Holder", "Items");
        b.entity("Holder").attribute("Items", Decl::list(Decl::named("Shape")));
        b.alias("CUBE", "Box");
        b.build().unwrap()
    }

    #[test]
    fn test_flattened_attributes() {
        let s = sample();
        let bx = s.entity_by_name("box").unwrap();
        let def = s.entity(bx);
        let names: Vec<_> = def.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Size"]);
        assert!(def.attributes[0].optional);
        assert_eq!(def.attributes[0].owner, s.entity_by_name("Shape").unwrap());
        assert_eq!(s.attribute_index(bx, "SIZE"), Some(1));
    }

    #[test]
    fn test_subtypes_and_aliases() {
        let s = sample();
        let shape = s.entity_by_name("Shape").unwrap();
        let bx = s.entity_by_name("Box").unwrap();
        assert!(s.is_subtype(bx, shape));
        assert!(!s.is_subtype(shape, bx));
        assert_eq!(s.resolve_keyword("BOX"), Some((bx, false)));
        assert_eq!(s.resolve_keyword("CUBE"), Some((bx, true)));
        assert_eq!(s.resolve_keyword("SPHERE"), None);
    }

    #[test]
    fn test_select_membership() {
        let s = sample();
        let thing = s.type_by_name("Thing").unwrap();
        let length = s.type_by_name("Length").unwrap();
        let colour = s.type_by_name("Colour").unwrap();
        let bx = s.entity_by_name("Box").unwrap();
        assert!(s.select_accepts_type(thing, length));
        assert!(s.select_accepts_entity(thing, bx));
        assert_eq!(s.select_enum_with_symbol(thing, "GREEN"), Some(colour));
        assert_eq!(s.select_enum_with_symbol(thing, "BLUE"), None);
        assert!(s.is_select_kind(&AttrKind::List(Box::new(AttrKind::Type(thing)))));
        assert!(!s.is_select_kind(&AttrKind::Type(length)));
    }

    #[test]
    fn test_inverse_slots() {
        let s = sample();
        let bx = s.entity_by_name("Box").unwrap();
        let holder = s.entity_by_name("Holder").unwrap();
        assert_eq!(s.inverse_slots(bx, holder, 0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(s.inverse_index(bx, "usedby"), Some(0));
        assert_eq!(s.inverse_slots(bx, bx, 0).count(), 0);
    }
}
