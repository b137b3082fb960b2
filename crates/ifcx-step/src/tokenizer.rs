//! Argument tokenizer.
//!
//! Splits a parenthesized argument list into its top-level arguments. Commas
//! and parentheses inside string (`'...'`) and binary (`"..."`) literals are
//! not structural.

use crate::encoding::decode_argument;
use crate::error::{Result, StepError};

/// Split `(a,b,(c,d))` into `["a", "b", "(c,d)"]`.
///
/// Arguments are trimmed. An empty list `()` yields no arguments.
/// Unbalanced parentheses and text trailing the closing parenthesis are
/// syntax errors naming the whole list.
pub fn tokenize_arguments(text: &str) -> Result<Vec<&str>> {
    let text = text.trim();
    if !text.starts_with('(') {
        return Err(StepError::syntax("argument list must start with '('", text));
    }

    let bytes = text.as_bytes();
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 1;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i = skip_literal(bytes, i).ok_or_else(|| StepError::syntax("unterminated string", text))?;
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    let last = text[start..i].trim();
                    if !last.is_empty() || !args.is_empty() {
                        push_argument(&mut args, last, text)?;
                    }
                    if !text[i + 1..].trim().is_empty() {
                        return Err(StepError::syntax("unbalanced parentheses", text));
                    }
                    return Ok(args);
                }
            }
            b',' if depth == 1 => {
                push_argument(&mut args, text[start..i].trim(), text)?;
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    Err(StepError::syntax("unbalanced parentheses", text))
}

/// Tokenize an argument list and decode string escapes in every argument.
pub fn read_arguments(text: &str) -> Result<Vec<String>> {
    tokenize_arguments(text)?
        .into_iter()
        .map(decode_argument)
        .collect()
}

/// Split a list-shaped argument into its elements.
///
/// `$` and `*` yield `None` (absent list).
pub fn split_list(arg: &str) -> Result<Option<Vec<&str>>> {
    let arg = arg.trim();
    match arg {
        "$" | "*" => Ok(None),
        _ if arg.starts_with('(') => tokenize_arguments(arg).map(Some),
        _ => Err(StepError::syntax("expected a list", arg)),
    }
}

/// Split an inline value `KEYWORD(inline)` into its upper-cased keyword and
/// the text between the parentheses.
///
/// A token not starting with a letter has no keyword: the whole token is
/// returned as the inline argument (bare literals such as `.T.`).
pub fn split_inline(token: &str) -> Result<(String, &str)> {
    let token = token.trim();
    if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Ok((String::new(), token));
    }

    let end = token
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(token.len());
    let keyword = token[..end].to_ascii_uppercase();
    let rest = token[end..].trim_start();
    if !rest.starts_with('(') {
        return Err(StepError::syntax(
            format!("expected '(' after {keyword}"),
            token,
        ));
    }

    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i = skip_literal(bytes, i).ok_or_else(|| StepError::syntax("unterminated string", token))?;
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    if !rest[i + 1..].trim().is_empty() {
                        return Err(StepError::syntax("unbalanced parentheses", token));
                    }
                    return Ok((keyword, rest[1..i].trim()));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(StepError::syntax("unbalanced parentheses", token))
}

/// Index just past the literal opening at `start`, or `None` if unterminated.
fn skip_literal(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

fn push_argument<'a>(args: &mut Vec<&'a str>, arg: &'a str, text: &str) -> Result<()> {
    if arg.is_empty() {
        return Err(StepError::syntax("empty argument", text));
    }
    args.push(arg);
    Ok(())
}
