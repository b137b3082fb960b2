//! Part 21 exchange structure: splits statements into header and data records.
//!
//! Accepts the full envelope (`ISO-10303-21;`, `HEADER;`, one or more
//! `DATA;` sections, `END-ISO-10303-21;`) as well as a bare sequence of
//! instance records.

use crate::error::{Result, StepError};
use crate::lexer::{Lexer, RawRecord, Statement};

/// Records of one exchange structure, before any attribute decoding.
#[derive(Debug, Clone, Default)]
pub struct ExchangeFile {
    /// Records of the HEADER section.
    pub header: Vec<RawRecord>,
    /// Instance records of every DATA section, in file order.
    pub data: Vec<RawRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    Header,
    Data,
    Ended,
}

/// Parse an exchange structure into header and data records.
pub fn parse_exchange(input: &str) -> Result<ExchangeFile> {
    let mut lexer = Lexer::new(input);
    let mut file = ExchangeFile::default();
    let mut section = Section::Outside;

    while let Some(statement) = lexer.next_statement()? {
        match statement {
            Statement::Keyword { name, line } => {
                section = match (name.as_str(), section) {
                    ("ISO-10303-21", Section::Outside) => Section::Outside,
                    ("HEADER", Section::Outside) => Section::Header,
                    ("DATA", Section::Outside) => Section::Data,
                    ("ENDSEC", Section::Header | Section::Data) => Section::Outside,
                    ("END-ISO-10303-21", Section::Outside) => Section::Ended,
                    (other, _) => {
                        return Err(StepError::lexer(
                            line,
                            1,
                            format!("unexpected keyword {other}"),
                        ));
                    }
                };
            }
            Statement::Record(record) => match section {
                Section::Header if record.id == 0 => file.header.push(record),
                Section::Data | Section::Outside if record.id != 0 => file.data.push(record),
                Section::Ended => {
                    return Err(StepError::lexer(
                        record.line,
                        1,
                        "record after END-ISO-10303-21",
                    ));
                }
                _ => {
                    return Err(StepError::lexer(
                        record.line,
                        1,
                        format!("record {} outside of its section", record.keyword),
                    ));
                }
            },
        }
    }

    if matches!(section, Section::Header | Section::Data) {
        return Err(StepError::lexer(0, 0, "missing ENDSEC"));
    }

    Ok(file)
}
