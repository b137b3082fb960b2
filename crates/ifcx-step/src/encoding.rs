//! Part 21 string escapes.
//!
//! Decoding handles the control directives that may appear inside a quoted
//! string literal:
//! - `\S\c` : `c` shifted up by 128
//! - `\X\hh` : one 8-bit code given as two hex digits
//! - `\X2\hhhh...\X0\` : UTF-16 code units, four hex digits each
//! - `\X4\hhhhhhhh...\X0\` : code points, eight hex digits each
//! - `\N\` : newline
//! - `\\` : a single backslash
//! - `\PA\` .. `\PI\` : code page switches, skipped
//!
//! A backslash that starts none of these is kept as a literal character.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Result, StepError};

/// Decode escapes inside every quoted string of one argument.
///
/// Text outside quotes is copied unchanged. Inside quotes a decoded
/// apostrophe is written back doubled (`''`), so the result still splits
/// correctly on quote boundaries.
pub fn decode_argument(arg: &str) -> Result<String> {
    if !arg.contains('\\') {
        return Ok(arg.to_string());
    }
    let mut unescaper = Unescaper::new(arg, true);
    while let Some(c) = unescaper.chars.next() {
        unescaper.out.push(c);
        if c == '\'' {
            unescaper.run()?;
        }
    }
    Ok(unescaper.out)
}

/// Decode the body of a string literal (without its surrounding quotes).
///
/// Both escape directives and doubled apostrophes are collapsed.
pub fn decode_string(body: &str) -> Result<String> {
    let mut unescaper = Unescaper::new(body, false);
    unescaper.run()?;
    Ok(unescaper.out)
}

/// Encode a string as the body of a Part 21 string literal.
///
/// Inverse of [`decode_string`]: apostrophes and backslashes are doubled,
/// newlines become `\N\`, other control characters `\X\hh`, and non-ASCII
/// text is grouped into `\X2\` (or `\X4\` above U+FFFF) runs.
pub fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    let mut run: Option<Run> = None;
    for c in s.chars() {
        let wanted = if c.is_ascii() {
            None
        } else if (c as u32) <= 0xFFFF {
            Some(Run::Wide)
        } else {
            Some(Run::Extended)
        };
        if run != wanted {
            if run.is_some() {
                out.push_str("\\X0\\");
            }
            match wanted {
                Some(Run::Wide) => out.push_str("\\X2\\"),
                Some(Run::Extended) => out.push_str("\\X4\\"),
                None => {}
            }
            run = wanted;
        }
        match run {
            Some(Run::Wide) => out.push_str(&format!("{:04X}", c as u32)),
            Some(Run::Extended) => out.push_str(&format!("{:08X}", c as u32)),
            None => match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\N\\"),
                c if c.is_ascii_control() => out.push_str(&format!("\\X\\{:02X}", c as u32)),
                c => out.push(c),
            },
        }
    }
    if run.is_some() {
        out.push_str("\\X0\\");
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Wide,
    Extended,
}

struct Unescaper<'a> {
    text: &'a str,
    chars: Peekable<Chars<'a>>,
    out: String,
    /// Argument mode: stop at the closing quote and keep quotes doubled.
    in_argument: bool,
}

impl<'a> Unescaper<'a> {
    fn new(text: &'a str, in_argument: bool) -> Self {
        Self {
            text,
            chars: text.chars().peekable(),
            out: String::with_capacity(text.len()),
            in_argument,
        }
    }

    /// Decode up to the closing quote (argument mode) or the end of input.
    fn run(&mut self) -> Result<()> {
        loop {
            match self.chars.next() {
                None if self.in_argument => {
                    return Err(StepError::syntax("unterminated string", self.text));
                }
                None => return Ok(()),
                Some('\'') => {
                    if self.chars.peek() == Some(&'\'') {
                        self.chars.next();
                        self.emit('\'');
                    } else if self.in_argument {
                        self.out.push('\'');
                        return Ok(());
                    } else {
                        self.out.push('\'');
                    }
                }
                Some('\\') => self.directive()?,
                Some(c) => self.out.push(c),
            }
        }
    }

    fn emit(&mut self, c: char) {
        if c == '\'' && self.in_argument {
            self.out.push_str("''");
        } else {
            self.out.push(c);
        }
    }

    fn directive(&mut self) -> Result<()> {
        let Some(&next) = self.chars.peek() else {
            self.out.push('\\');
            return Ok(());
        };
        match next {
            '\\' => {
                self.chars.next();
                self.emit('\\');
            }
            'N' if self.lookahead_is("N\\") => {
                self.skip(2);
                self.emit('\n');
            }
            'S' if self.lookahead_is("S\\") => {
                self.skip(2);
                let c = self.chars.next().ok_or_else(|| self.malformed())?;
                if c == '\'' && self.in_argument && self.chars.next_if_eq(&'\'').is_none() {
                    return Err(self.malformed());
                }
                let shifted = char::from_u32(c as u32 + 128).ok_or_else(|| self.malformed())?;
                self.emit(shifted);
            }
            'P' if self.lookahead_matches(|s| {
                let b = s.as_bytes();
                b.len() >= 3 && (b'A'..=b'I').contains(&b[1]) && b[2] == b'\\'
            }) =>
            {
                self.skip(3);
            }
            'X' if self.lookahead_is("X\\") => {
                self.skip(2);
                let code = self.hex(2)?;
                let c = char::from_u32(code).ok_or_else(|| self.malformed())?;
                self.emit(c);
            }
            'X' if self.lookahead_is("X2\\") => {
                self.skip(3);
                let mut units = Vec::new();
                while !self.terminator()? {
                    units.push(self.hex(4)? as u16);
                }
                for c in char::decode_utf16(units) {
                    let c = c.map_err(|_| self.malformed())?;
                    self.emit(c);
                }
            }
            'X' if self.lookahead_is("X4\\") => {
                self.skip(3);
                while !self.terminator()? {
                    let code = self.hex(8)?;
                    let c = char::from_u32(code).ok_or_else(|| self.malformed())?;
                    self.emit(c);
                }
            }
            _ => self.out.push('\\'),
        }
        Ok(())
    }

    /// Consume `\X0\` if it comes next. Running out of input is malformed.
    fn terminator(&mut self) -> Result<bool> {
        match self.chars.peek() {
            None | Some('\'') => Err(self.malformed()),
            Some('\\') => {
                if self.lookahead_is("\\X0\\") {
                    self.skip(4);
                    Ok(true)
                } else {
                    Err(self.malformed())
                }
            }
            Some(_) => Ok(false),
        }
    }

    fn hex(&mut self, digits: usize) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..digits {
            let d = self
                .chars
                .next()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.malformed())?;
            value = (value << 4) | d;
        }
        Ok(value)
    }

    fn lookahead_is(&self, prefix: &str) -> bool {
        self.lookahead_matches(|s| s.starts_with(prefix))
    }

    fn lookahead_matches(&self, pred: impl Fn(&str) -> bool) -> bool {
        let rest: String = self.chars.clone().take(8).collect();
        pred(&rest)
    }

    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.chars.next();
        }
    }

    fn malformed(&self) -> StepError {
        StepError::syntax("malformed escape sequence", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_shift() {
        assert_eq!(decode_string("A\\S\\\"B").unwrap(), "A\u{A2}B");
        assert_eq!(decode_string("\\S\\D").unwrap(), "\u{C4}");
    }

    #[test]
    fn test_decode_hex_forms() {
        assert_eq!(decode_string("\\X\\E9t\\X\\E9").unwrap(), "été");
        assert_eq!(decode_string("\\X2\\00C400D6\\X0\\x").unwrap(), "ÄÖx");
        assert_eq!(decode_string("\\X4\\0001F600\\X0\\").unwrap(), "\u{1F600}");
        // Surrogate pair inside an X2 run.
        assert_eq!(decode_string("\\X2\\D83DDE00\\X0\\").unwrap(), "\u{1F600}");
    }

    #[test]
    fn test_decode_newline_backslash_quote() {
        assert_eq!(decode_string("a\\N\\b").unwrap(), "a\nb");
        assert_eq!(decode_string("C:\\\\temp").unwrap(), "C:\\temp");
        assert_eq!(decode_string("it''s").unwrap(), "it's");
        assert_eq!(decode_string("\\PA\\abc").unwrap(), "abc");
    }

    #[test]
    fn test_unknown_directive_is_literal() {
        assert_eq!(decode_string("C:\\temp").unwrap(), "C:\\temp");
        assert_eq!(decode_string("end\\").unwrap(), "end\\");
    }

    #[test]
    fn test_malformed_escapes() {
        assert!(matches!(
            decode_string("\\X2\\00C4"),
            Err(StepError::Syntax { .. })
        ));
        assert!(decode_string("\\X\\G1").is_err());
        assert!(decode_string("\\X2\\00C\\X0\\").is_err());
    }

    #[test]
    fn test_decode_argument_keeps_structure() {
        assert_eq!(
            decode_argument("('a\\X2\\00E9\\X0\\',#3,'b')").unwrap(),
            "('aé',#3,'b')"
        );
        // A decoded apostrophe stays doubled so quotes still balance.
        assert_eq!(decode_argument("'\\X\\27x'").unwrap(), "'''x'");
        assert!(decode_argument("'abc\\N\\").is_err());
    }

    #[test]
    fn test_encode_forms() {
        assert_eq!(encode_string("it's"), "it''s");
        assert_eq!(encode_string("a\nb"), "a\\N\\b");
        assert_eq!(encode_string("C:\\x"), "C:\\\\x");
        assert_eq!(encode_string("Zürich"), "Z\\X2\\00FC\\X0\\rich");
        assert_eq!(encode_string("\u{1F600}é"), "\\X4\\0001F600\\X0\\\\X2\\00E9\\X0\\");
        assert_eq!(encode_string("a\tb"), "a\\X\\09b");
    }

    proptest! {
        #[test]
        fn test_encode_decode_symmetry(s in "\\PC*") {
            prop_assert_eq!(decode_string(&encode_string(&s)).unwrap(), s);
        }

        #[test]
        fn test_symmetry_with_escape_prone_text(
            parts in prop::collection::vec(
                prop_oneof![
                    Just("\\S\\".to_string()),
                    Just("\\X2\\".to_string()),
                    Just("\\X0\\".to_string()),
                    Just("\\N\\".to_string()),
                    Just("'".to_string()),
                    Just("\n".to_string()),
                    Just("é".to_string()),
                    "[a-z]{0,3}",
                ],
                0..8,
            )
        ) {
            let s: String = parts.concat();
            let quoted = format!("'{}'", encode_string(&s));
            let decoded = decode_argument(&quoted).unwrap();
            let body = &decoded[1..decoded.len() - 1];
            prop_assert_eq!(body.replace("''", "'"), s);
        }
    }
}
