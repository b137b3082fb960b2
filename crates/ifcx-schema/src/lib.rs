#![warn(missing_docs)]

//! IFC4 schema subset for the ifcx STEP engine.
//!
//! Covers the kernel (roots, objects, relationships), spatial structure,
//! walls, ownership, units, materials, property sets and the geometry needed
//! for extruded profiles. Types are registered through
//! [`ifcx_step::SchemaBuilder`]; the built schema is shared.
//!
//! ```no_run
//! let schema = ifcx_schema::ifc4().unwrap();
//! let model = ifcx_step::parse(schema, "#1=IFCCOLOURRGB($,0.1,0.2,0.3);").unwrap();
//! assert_eq!(model.get(1).unwrap().type_name(), "IfcColourRgb");
//! ```

mod actor;
mod geometry;
mod material;
mod product;
mod property;
mod types;

use std::sync::{Arc, OnceLock};

use ifcx_step::{Decl, Result, Schema, SchemaBuilder};

/// FILE_SCHEMA identifier of the schema.
pub const SCHEMA_NAME: &str = "IFC4";

/// Builder with every IFC4 declaration of this crate, for extension.
pub fn ifc4_builder() -> SchemaBuilder {
    let mut b = SchemaBuilder::new(SCHEMA_NAME);
    types::declare(&mut b);
    actor::declare(&mut b);
    product::declare(&mut b);
    geometry::declare(&mut b);
    material::declare(&mut b);
    property::declare(&mut b);
    b.global_id_type("IfcGloballyUniqueId");
    b
}

/// The shared IFC4 schema, built on first use.
pub fn ifc4() -> Result<Arc<Schema>> {
    static SCHEMA: OnceLock<Result<Arc<Schema>>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| ifc4_builder().build().map(Arc::new))
        .clone()
}

fn label() -> Decl {
    Decl::named("IfcLabel")
}

fn text() -> Decl {
    Decl::named("IfcText")
}
