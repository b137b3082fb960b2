#![warn(missing_docs)]

//! STEP Part 21 reading, resolving and writing for IFC models.
//!
//! Text is read in two passes against a [`Schema`]: every record first gets
//! an empty entity in the id table, then every record's arguments are
//! decoded with all `#id` references resolved. Inverse attributes are wired
//! afterwards. A parse yields either a complete [`Model`] or every
//! independent failure found ([`StepErrors`]).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ifcx_step::{parse, write_model, Decl, SchemaBuilder, WriterSettings};
//!
//! let mut b = SchemaBuilder::new("DEMO");
//! b.defined("Label", Decl::String);
//! b.entity("Tag").attribute("Name", Decl::named("Label"));
//! let schema = Arc::new(b.build().unwrap());
//!
//! let model = parse(schema, "#1=TAG('hello');").unwrap();
//! let name = model.get(1).unwrap().get_attribute("Name").unwrap();
//! assert_eq!(name.as_str(), Some("hello"));
//!
//! let text = write_model(&model, &WriterSettings::default()).unwrap();
//! ```

pub mod arguments;
mod assembler;
mod copy;
pub mod encoding;
mod error;
pub mod guid;
mod header;
mod inverse;
mod lexer;
mod model;
mod parser;
mod reader;
pub mod schema;
mod select;
mod settings;
pub mod tokenizer;
mod value;
mod writer;

pub use assembler::{build_stubs, StubGraph};
pub use copy::CopyOptions;
pub use error::{Result, StepError, StepErrors};
pub use header::StepHeader;
pub use lexer::{Lexer, RawRecord, Statement};
pub use model::{EntityKey, EntityView, IdTable, Model};
pub use parser::{parse_exchange, ExchangeFile};
pub use reader::{parse, Reader};
pub use schema::{
    AttrKind, AttributeDef, Decl, EntityDecl, EntityDef, EntityTypeId, InverseDef, Schema,
    SchemaBuilder, SelectAlternative, TypeDef, TypeId,
};
pub use select::{EntityLookup, TypeFactory};
pub use settings::{ReaderSettings, WriterSettings};
pub use value::{Logical, Value};
pub use writer::{format_real, write_entity, write_model};
