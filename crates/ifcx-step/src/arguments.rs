//! Scalar and list readers.
//!
//! Pure functions from one (already escape-decoded) argument to one value.
//! `$` and `*` read as "no value" for scalars and as an empty collection
//! wherever a list is expected.

use crate::error::{Result, StepError};
use crate::tokenizer::split_list;
use crate::value::Logical;

/// True for `$` (not applicable) and `*` (derived).
pub fn is_absent(arg: &str) -> bool {
    matches!(arg.trim(), "$" | "*")
}

/// Read an INTEGER.
pub fn read_integer(arg: &str) -> Result<Option<i64>> {
    let arg = arg.trim();
    if is_absent(arg) {
        return Ok(None);
    }
    arg.parse()
        .map(Some)
        .map_err(|_| StepError::syntax("expected integer", arg))
}

/// Read a REAL. Integers are accepted.
pub fn read_real(arg: &str) -> Result<Option<f64>> {
    let arg = arg.trim();
    if is_absent(arg) {
        return Ok(None);
    }
    let numeric = arg.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    match arg.parse::<f64>() {
        Ok(v) if numeric => Ok(Some(v)),
        _ => Err(StepError::syntax("expected real", arg)),
    }
}

/// Read a BOOLEAN. Anything but `.T.`/`.F.` yields `None`.
pub fn read_bool(arg: &str) -> Option<bool> {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case(".T.") {
        Some(true)
    } else if arg.eq_ignore_ascii_case(".F.") {
        Some(false)
    } else {
        None
    }
}

/// Read a LOGICAL. Anything but `.T.`/`.F.`/`.U.` yields `None`.
pub fn read_logical(arg: &str) -> Option<Logical> {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case(".U.") {
        return Some(Logical::Unknown);
    }
    read_bool(arg).map(Logical::from)
}

/// Read a STRING: strip one layer of quotes and collapse `''`.
///
/// Text shorter than two characters cannot be quoted and passes through.
pub fn read_string(arg: &str) -> String {
    let arg = arg.trim();
    if arg.len() >= 2 && arg.starts_with('\'') && arg.ends_with('\'') {
        arg[1..arg.len() - 1].replace("''", "'")
    } else {
        arg.to_string()
    }
}

/// Read a BINARY literal `"0AF..."` as its hex digits.
pub fn read_binary(arg: &str) -> Result<Option<String>> {
    let arg = arg.trim();
    if is_absent(arg) {
        return Ok(None);
    }
    let body = arg
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| StepError::syntax("expected binary literal", arg))?;
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StepError::syntax("expected binary literal", arg));
    }
    Ok(Some(body.to_ascii_uppercase()))
}

/// Read an enumeration literal `.SYMBOL.` as its upper-case symbol.
pub fn read_enum(arg: &str) -> Result<Option<String>> {
    let arg = arg.trim();
    if is_absent(arg) {
        return Ok(None);
    }
    arg.strip_prefix('.')
        .and_then(|s| s.strip_suffix('.'))
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        .map(|s| Some(s.to_ascii_uppercase()))
        .ok_or_else(|| StepError::syntax("expected enumeration", arg))
}

/// Read an entity reference `#123` as its id.
pub fn read_entity_id(arg: &str) -> Result<Option<u64>> {
    let arg = arg.trim();
    if is_absent(arg) {
        return Ok(None);
    }
    arg.strip_prefix('#')
        .and_then(|digits| digits.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| StepError::syntax("expected entity reference", arg))
}

/// Read a one-dimensional list, one element at a time.
pub fn read_list<T>(arg: &str, mut element: impl FnMut(&str) -> Result<T>) -> Result<Vec<T>> {
    match split_list(arg)? {
        None => Ok(Vec::new()),
        Some(items) => items.into_iter().map(&mut element).collect(),
    }
}

/// Read a two-dimensional list.
pub fn read_list_2d<T>(arg: &str, mut element: impl FnMut(&str) -> Result<T>) -> Result<Vec<Vec<T>>> {
    read_list(arg, |row| read_list(row, &mut element))
}

/// Read a three-dimensional list.
pub fn read_list_3d<T>(
    arg: &str,
    mut element: impl FnMut(&str) -> Result<T>,
) -> Result<Vec<Vec<Vec<T>>>> {
    read_list(arg, |plane| read_list_2d(plane, &mut element))
}

fn required<T>(value: Option<T>, arg: &str) -> Result<T> {
    value.ok_or_else(|| StepError::syntax("missing list element", arg))
}

/// Read a list of INTEGER.
pub fn read_integer_list(arg: &str) -> Result<Vec<i64>> {
    read_list(arg, |s| required(read_integer(s)?, s))
}

/// Read a list of lists of INTEGER.
pub fn read_integer_list_2d(arg: &str) -> Result<Vec<Vec<i64>>> {
    read_list_2d(arg, |s| required(read_integer(s)?, s))
}

/// Read a list of REAL.
pub fn read_real_list(arg: &str) -> Result<Vec<f64>> {
    read_list(arg, |s| required(read_real(s)?, s))
}

/// Read a list of lists of REAL.
pub fn read_real_list_2d(arg: &str) -> Result<Vec<Vec<f64>>> {
    read_list_2d(arg, |s| required(read_real(s)?, s))
}

/// Read a three-dimensional list of REAL.
pub fn read_real_list_3d(arg: &str) -> Result<Vec<Vec<Vec<f64>>>> {
    read_list_3d(arg, |s| required(read_real(s)?, s))
}

/// Read a list of STRING.
pub fn read_string_list(arg: &str) -> Result<Vec<String>> {
    read_list(arg, |s| Ok(read_string(s)))
}

/// Read a list of entity references, resolving each id with `resolve`.
///
/// Every id that does not resolve is reported in one error; nothing is
/// dropped silently.
pub fn read_entity_ref_list<T>(arg: &str, resolve: impl Fn(u64) -> Option<T>) -> Result<Vec<T>> {
    let mut missing = Vec::new();
    let refs = read_list(arg, |s| resolve_ref(s, &resolve, &mut missing))?;
    finish(refs.into_iter().flatten().collect(), missing)
}

/// Read a list of lists of entity references.
pub fn read_entity_ref_list_2d<T>(
    arg: &str,
    resolve: impl Fn(u64) -> Option<T>,
) -> Result<Vec<Vec<T>>> {
    let mut missing = Vec::new();
    let refs = read_list_2d(arg, |s| resolve_ref(s, &resolve, &mut missing))?;
    let refs: Vec<Vec<T>> = refs
        .into_iter()
        .map(|row| row.into_iter().flatten().collect())
        .collect();
    finish(refs, missing)
}

/// Read a three-dimensional list of entity references.
pub fn read_entity_ref_list_3d<T>(
    arg: &str,
    resolve: impl Fn(u64) -> Option<T>,
) -> Result<Vec<Vec<Vec<T>>>> {
    let mut missing = Vec::new();
    let refs = read_list_3d(arg, |s| resolve_ref(s, &resolve, &mut missing))?;
    let refs: Vec<Vec<Vec<T>>> = refs
        .into_iter()
        .map(|plane| {
            plane
                .into_iter()
                .map(|row| row.into_iter().flatten().collect())
                .collect()
        })
        .collect();
    finish(refs, missing)
}

fn resolve_ref<T>(
    arg: &str,
    resolve: &impl Fn(u64) -> Option<T>,
    missing: &mut Vec<u64>,
) -> Result<Option<T>> {
    let id = required(read_entity_id(arg)?, arg)?;
    let found = resolve(id);
    if found.is_none() && !missing.contains(&id) {
        missing.push(id);
    }
    Ok(found)
}

fn finish<T>(value: T, missing: Vec<u64>) -> Result<T> {
    if missing.is_empty() {
        Ok(value)
    } else {
        Err(StepError::unresolved(missing))
    }
}
