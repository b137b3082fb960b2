//! STEP reader: text in, resolved [`Model`] out.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::assembler::build_stubs;
use crate::error::{StepError, StepErrors};
use crate::header::StepHeader;
use crate::model::Model;
use crate::parser::parse_exchange;
use crate::schema::Schema;
use crate::settings::ReaderSettings;

/// Parses Part 21 text against one schema.
#[derive(Debug, Clone)]
pub struct Reader {
    schema: Arc<Schema>,
    settings: ReaderSettings,
}

impl Reader {
    /// Reader with default settings.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            settings: ReaderSettings::default(),
        }
    }

    /// Reader with explicit settings.
    pub fn with_settings(schema: Arc<Schema>, settings: ReaderSettings) -> crate::error::Result<Self> {
        settings.validate()?;
        Ok(Self { schema, settings })
    }

    /// Active settings.
    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// Parse a complete buffer.
    ///
    /// Returns the resolved model, or every independent failure found.
    pub fn parse(&self, text: &str) -> Result<Model, StepErrors> {
        if self.settings.parallel && self.settings.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.settings.threads)
                .build()
                .map_err(|e| StepError::InvalidSettings(e.to_string()))?;
            return pool.install(|| self.parse_text(text));
        }
        self.parse_text(text)
    }

    fn parse_text(&self, text: &str) -> Result<Model, StepErrors> {
        let start = Instant::now();
        let file = parse_exchange(text)?;
        let header = if file.header.is_empty() {
            StepHeader::for_schema(self.schema.name())
        } else {
            StepHeader::from_records(&file.header)?
        };
        if self.settings.check_schema_name {
            self.check_schema_name(&header);
        }

        let records = file.data.len();
        let stubs = build_stubs(self.schema.clone(), file.data, &self.settings);
        let mut model = stubs.resolve(&self.settings, header)?;
        if self.settings.wire_inverses {
            model.wire_inverses();
        }
        info!(
            "read {} entities from {records} records in {:?}",
            model.len(),
            start.elapsed()
        );
        Ok(model)
    }

    fn check_schema_name(&self, header: &StepHeader) {
        let expected = self.schema.name();
        if header.schema_identifiers.is_empty() {
            return;
        }
        if !header
            .schema_identifiers
            .iter()
            .any(|s| s.eq_ignore_ascii_case(expected))
        {
            warn!(
                "file schema {:?} does not match {expected}",
                header.schema_identifiers
            );
        }
    }
}

/// Parse text with default settings.
pub fn parse(schema: Arc<Schema>, text: &str) -> Result<Model, StepErrors> {
    Reader::new(schema).parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Decl, SchemaBuilder};

    fn schema() -> Arc<Schema> {
        let mut b = SchemaBuilder::new("MINI");
        b.defined("Label", Decl::String);
        b.entity("Site").attribute("Name", Decl::named("Label"));
        b.entity("Building")
            .attribute("Name", Decl::named("Label"))
            .attribute("Site", Decl::named("Site"))
            .inverse("Storeys", "Storey", "Building");
        b.entity("Storey")
            .attribute("Name", Decl::named("Label"))
            .attribute("Building", Decl::named("Building"));
        Arc::new(b.build().unwrap())
    }

    const FILE: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('test'),'2;1');
FILE_NAME('mini.stp','2024-01-01T00:00:00',(''),(''),'','','');
FILE_SCHEMA(('MINI'));
ENDSEC;
DATA;
/* storeys first, buildings after */
#3=STOREY('Ground',#2);
#4=STOREY('First',#2);
#2=BUILDING('Main',#1);
#1=SITE('Campus');
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_parse_full_file() {
        let model = parse(schema(), FILE).unwrap();
        assert_eq!(model.len(), 4);
        assert_eq!(model.header().name, "mini.stp");
        let ids: Vec<u64> = model.entities().map(|e| e.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let building = model.get(2).unwrap();
        let storeys = building.get_inverse("Storeys");
        assert_eq!(storeys.len(), 2);
        assert_eq!(model.entity(storeys[0]).unwrap().id(), 3);
        assert_eq!(building.get_entity("Site").unwrap().type_name(), "Site");
    }

    #[test]
    fn test_settings_variants() {
        let sequential = Reader::with_settings(schema(), ReaderSettings::sequential()).unwrap();
        assert_eq!(sequential.parse(FILE).unwrap().len(), 4);

        let pooled = ReaderSettings {
            threads: 2,
            ..ReaderSettings::default()
        };
        assert_eq!(Reader::with_settings(schema(), pooled).unwrap().parse(FILE).unwrap().len(), 4);

        let unwired = ReaderSettings {
            wire_inverses: false,
            ..ReaderSettings::default()
        };
        let model = Reader::with_settings(schema(), unwired).unwrap().parse(FILE).unwrap();
        assert!(model.get(2).unwrap().get_inverse("Storeys").is_empty());

        let bad = ReaderSettings {
            parallel: false,
            threads: 3,
            ..ReaderSettings::default()
        };
        assert!(Reader::with_settings(schema(), bad).is_err());
    }

    #[test]
    fn test_lexer_errors_surface() {
        let errors = parse(schema(), "#1=SITE('unterminated);").unwrap_err();
        assert!(matches!(errors.errors(), [StepError::Lexer { line: 1, .. }]));
    }

    #[test]
    fn test_bare_records_get_default_header() {
        let model = parse(schema(), "#1=SITE('x');").unwrap();
        assert_eq!(model.header().schema_identifiers, vec!["MINI"]);
    }
}
