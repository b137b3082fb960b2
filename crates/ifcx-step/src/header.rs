//! HEADER section: FILE_DESCRIPTION, FILE_NAME and FILE_SCHEMA.

use serde::{Deserialize, Serialize};

use crate::arguments::{read_string, read_string_list};
use crate::encoding::encode_string;
use crate::error::{Result, StepError};
use crate::lexer::RawRecord;
use crate::tokenizer::read_arguments;

/// Contents of the HEADER section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepHeader {
    /// FILE_DESCRIPTION.description
    pub description: Vec<String>,
    /// FILE_DESCRIPTION.implementation_level
    pub implementation_level: String,
    /// FILE_NAME.name
    pub name: String,
    /// FILE_NAME.time_stamp
    pub time_stamp: String,
    /// FILE_NAME.author
    pub author: Vec<String>,
    /// FILE_NAME.organization
    pub organization: Vec<String>,
    /// FILE_NAME.preprocessor_version
    pub preprocessor_version: String,
    /// FILE_NAME.originating_system
    pub originating_system: String,
    /// FILE_NAME.authorization
    pub authorization: String,
    /// FILE_SCHEMA.schema_identifiers
    pub schema_identifiers: Vec<String>,
}

impl StepHeader {
    /// Default header for a new file of the given schema.
    pub fn for_schema(schema: &str) -> Self {
        Self {
            description: vec!["ViewDefinition [CoordinationView]".to_string()],
            implementation_level: "2;1".to_string(),
            schema_identifiers: vec![schema.to_string()],
            ..Self::default()
        }
    }

    /// Read the header from its records. Unknown records are ignored.
    pub fn from_records(records: &[RawRecord]) -> Result<Self> {
        let mut header = Self::default();
        for record in records {
            let args = read_arguments(&record.args)?;
            match record.keyword.as_str() {
                "FILE_DESCRIPTION" => {
                    header.description = strings_at(&args, 0)?;
                    header.implementation_level = string_at(&args, 1);
                }
                "FILE_NAME" => {
                    header.name = string_at(&args, 0);
                    header.time_stamp = string_at(&args, 1);
                    header.author = strings_at(&args, 2)?;
                    header.organization = strings_at(&args, 3)?;
                    header.preprocessor_version = string_at(&args, 4);
                    header.originating_system = string_at(&args, 5);
                    header.authorization = string_at(&args, 6);
                }
                "FILE_SCHEMA" => header.schema_identifiers = strings_at(&args, 0)?,
                _ => {}
            }
        }
        Ok(header)
    }

    /// Write the three header records, one per line.
    pub fn write(&self, out: &mut String, line_ending: &str) {
        out.push_str(&format!(
            "FILE_DESCRIPTION({},{});{line_ending}",
            quoted_list(&self.description),
            quoted(&self.implementation_level)
        ));
        out.push_str(&format!(
            "FILE_NAME({},{},{},{},{},{},{});{line_ending}",
            quoted(&self.name),
            quoted(&self.time_stamp),
            quoted_list(&self.author),
            quoted_list(&self.organization),
            quoted(&self.preprocessor_version),
            quoted(&self.originating_system),
            quoted(&self.authorization)
        ));
        out.push_str(&format!(
            "FILE_SCHEMA({});{line_ending}",
            quoted_list(&self.schema_identifiers)
        ));
    }
}

fn string_at(args: &[String], index: usize) -> String {
    match args.get(index).map(String::as_str) {
        None | Some("$") | Some("*") => String::new(),
        Some(arg) => read_string(arg),
    }
}

fn strings_at(args: &[String], index: usize) -> Result<Vec<String>> {
    match args.get(index) {
        None => Ok(Vec::new()),
        Some(arg) if arg.starts_with('(') || arg == "$" || arg == "*" => read_string_list(arg),
        Some(arg) => Err(StepError::syntax("expected a list of strings", arg.as_str())),
    }
}

fn quoted(s: &str) -> String {
    format!("'{}'", encode_string(s))
}

fn quoted_list(items: &[String]) -> String {
    let items: Vec<String> = items.iter().map(|s| quoted(s)).collect();
    format!("({})", items.join(","))
}
