//! Part 21 writer.
//!
//! Each entity becomes one `#id=KEYWORD(args);` line. Defined-type and
//! enumeration values are wrapped in their type name only where the
//! attribute is declared with a select type.

use crate::encoding::encode_string;
use crate::error::{Result, StepError};
use crate::model::{EntityKey, Model};
use crate::schema::Schema;
use crate::settings::WriterSettings;
use crate::value::{Logical, Value};

/// Serialize one entity as `#id=KEYWORD(args);`.
pub fn write_entity(model: &Model, key: EntityKey) -> Result<String> {
    let entity = model.entities.get(key).ok_or(StepError::StaleReference)?;
    let schema = model.schema();
    let def = schema.entity(entity.type_id);

    let mut out = format!("#{}={}(", entity.id, def.keyword);
    for (i, (attr, value)) in def.attributes.iter().zip(&entity.attributes).enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_value(model, value, schema.is_select_kind(&attr.kind), &mut out);
    }
    out.push_str(");");
    Ok(out)
}

/// Serialize a whole model, entities in ascending id order.
pub fn write_model(model: &Model, settings: &WriterSettings) -> Result<String> {
    settings.validate()?;
    let eol = settings.line_ending.as_str();
    let mut out = String::new();
    if settings.include_header {
        out.push_str("ISO-10303-21;");
        out.push_str(eol);
        out.push_str("HEADER;");
        out.push_str(eol);
        model.header().write(&mut out, eol);
        out.push_str("ENDSEC;");
        out.push_str(eol);
        out.push_str("DATA;");
        out.push_str(eol);
    }
    for (_, key) in model.id_table().iter() {
        out.push_str(&write_entity(model, key)?);
        out.push_str(eol);
    }
    if settings.include_header {
        out.push_str("ENDSEC;");
        out.push_str(eol);
        out.push_str("END-ISO-10303-21;");
        out.push_str(eol);
    }
    Ok(out)
}

impl Model {
    /// Serialize one entity; see [`write_entity`].
    pub fn write_entity(&self, key: EntityKey) -> Result<String> {
        write_entity(self, key)
    }

    /// Serialize the whole model; see [`write_model`].
    pub fn to_step(&self, settings: &WriterSettings) -> Result<String> {
        write_model(self, settings)
    }
}

/// Format a REAL: always a decimal point, upper-case exponent, shortest
/// text that reads back to the same value. Non-finite values have no
/// Part 21 form and are written as `$`.
pub fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return "$".into();
    }
    let text = format!("{value:?}");
    let (mantissa, exponent) = match text.split_once('e') {
        Some((m, e)) => (m, Some(e)),
        None => (text.as_str(), None),
    };
    let mut out = match mantissa.strip_suffix(".0") {
        Some(whole) => format!("{whole}."),
        None if mantissa.contains('.') => mantissa.to_string(),
        None => format!("{mantissa}."),
    };
    if let Some(exponent) = exponent {
        out.push('E');
        out.push_str(exponent);
    }
    out
}

fn write_value(model: &Model, value: &Value, in_select: bool, out: &mut String) {
    let schema: &Schema = model.schema();
    match value {
        Value::Null => out.push('$'),
        Value::Derived => out.push('*'),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Real(r) => out.push_str(&format_real(*r)),
        Value::String(s) => {
            out.push('\'');
            out.push_str(&encode_string(s));
            out.push('\'');
        }
        Value::Binary(hex) => {
            out.push('"');
            out.push_str(hex);
            out.push('"');
        }
        Value::Boolean(b) => out.push_str(if *b { ".T." } else { ".F." }),
        Value::Logical(l) => out.push_str(match l {
            Logical::True => ".T.",
            Logical::False => ".F.",
            Logical::Unknown => ".U.",
        }),
        Value::Enum(ty, symbol) => {
            if in_select {
                out.push_str(&schema.type_name(*ty).to_ascii_uppercase());
                out.push_str(&format!("(.{symbol}.)"));
            } else {
                out.push_str(&format!(".{symbol}."));
            }
        }
        Value::Ref(key) => match model.entities.get(*key) {
            Some(target) => out.push_str(&format!("#{}", target.id)),
            None => out.push('$'),
        },
        Value::Typed(ty, inner) => {
            if in_select {
                out.push_str(&schema.type_name(*ty).to_ascii_uppercase());
                out.push('(');
                write_value(model, inner, false, out);
                out.push(')');
            } else {
                write_value(model, inner, false, out);
            }
        }
        Value::List(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(model, item, in_select, out);
            }
            out.push(')');
        }
    }
}
