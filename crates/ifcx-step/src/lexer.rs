//! Part 21 (STEP physical file format) statement lexer.
//!
//! Splits an exchange structure into statements without interpreting
//! argument lists. Handles:
//! - Section keywords (e.g., `HEADER;`, `DATA;`, `ENDSEC;`)
//! - Header records (e.g., `FILE_SCHEMA(('IFC4'));`)
//! - Instance records (e.g., `#12=IFCWALL(...);`), possibly spanning lines
//! - Comments (`/* ... */`) outside string literals
//!
//! Whitespace outside string and binary literals is dropped from the
//! captured argument text.

use crate::error::{Result, StepError};

/// One statement of an exchange structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Section keyword terminated by `;` (e.g., `DATA`).
    Keyword {
        /// Upper-cased keyword.
        name: String,
        /// Line where the keyword starts.
        line: usize,
    },
    /// Header or instance record.
    Record(RawRecord),
}

/// One record before attribute decoding.
///
/// Transient: records are consumed by the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Instance id, `0` for header records.
    pub id: u64,
    /// Upper-cased type keyword, empty for complex instances.
    pub keyword: String,
    /// Parenthesized argument text with insignificant whitespace removed.
    pub args: String,
    /// Line where the record starts (1-indexed).
    pub line: usize,
}

/// Lexer for Part 21 statements.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Split the entire input into statements.
    pub fn statements(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        while let Some(statement) = self.next_statement()? {
            statements.push(statement);
        }
        Ok(statements)
    }

    /// Get the next statement, or `None` if at end of input.
    pub fn next_statement(&mut self) -> Result<Option<Statement>> {
        self.skip_whitespace_and_comments()?;

        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };
        let line = self.line;

        match ch {
            b'#' => {
                let id = self.read_entity_id()?;
                self.skip_whitespace_and_comments()?;
                if self.peek_char() != Some(b'=') {
                    return Err(self.error(format!("expected '=' after #{id}")));
                }
                self.advance();
                self.skip_whitespace_and_comments()?;
                let keyword = self.read_keyword();
                let args = self.read_until_semicolon()?;
                Ok(Some(Statement::Record(RawRecord {
                    id,
                    keyword,
                    args,
                    line,
                })))
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                let keyword = self.read_keyword();
                self.skip_whitespace_and_comments()?;
                if self.peek_char() == Some(b';') {
                    self.advance();
                    return Ok(Some(Statement::Keyword {
                        name: keyword,
                        line,
                    }));
                }
                let args = self.read_until_semicolon()?;
                Ok(Some(Statement::Record(RawRecord {
                    id: 0,
                    keyword,
                    args,
                    line,
                })))
            }
            _ => Err(self.error(format!("unexpected character: '{}'", ch as char))),
        }
    }

    fn peek_char(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.input.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> StepError {
        StepError::lexer(self.line, self.col, message)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            while let Some(ch) = self.peek_char() {
                if ch.is_ascii_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }
            if self.peek_char() == Some(b'/') && self.peek_next() == Some(b'*') {
                self.skip_comment()?;
                continue;
            }
            return Ok(());
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        let (line, col) = (self.line, self.col);
        self.advance(); // /
        self.advance(); // *
        loop {
            match self.peek_char() {
                None => return Err(StepError::lexer(line, col, "unterminated comment")),
                Some(b'*') if self.peek_next() == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn read_entity_id(&mut self) -> Result<u64> {
        let (line, col) = (self.line, self.col);
        self.advance(); // skip '#'

        let start = self.pos;
        while matches!(self.peek_char(), Some(b'0'..=b'9')) {
            self.advance();
        }
        let digits = &self.input[start..self.pos];
        if digits.is_empty() {
            return Err(StepError::lexer(line, col, "expected digits after '#'"));
        }
        let id: u64 = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| StepError::lexer(line, col, "invalid entity ID"))?;
        if id == 0 {
            return Err(StepError::lexer(line, col, "entity ID must be positive"));
        }
        Ok(id)
    }

    fn read_keyword(&mut self) -> String {
        let start = self.pos;
        // Section markers like ISO-10303-21 carry hyphens.
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'-' {
                self.advance();
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).to_ascii_uppercase()
    }

    /// Capture the argument text up to the terminating `;`.
    fn read_until_semicolon(&mut self) -> Result<String> {
        let (line, col) = (self.line, self.col);
        let mut out = Vec::new();
        loop {
            match self.peek_char() {
                None => return Err(StepError::lexer(line, col, "missing ';' at end of record")),
                Some(b';') => {
                    self.advance();
                    break;
                }
                Some(quote @ (b'\'' | b'"')) => self.read_literal(quote, &mut out)?,
                Some(b'/') if self.peek_next() == Some(b'*') => self.skip_comment()?,
                Some(ch) if ch.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(ch) => {
                    out.push(ch);
                    self.advance();
                }
            }
        }
        String::from_utf8(out).map_err(|_| StepError::lexer(line, col, "invalid UTF-8 in record"))
    }

    /// Copy a string or binary literal verbatim, including its delimiters.
    fn read_literal(&mut self, quote: u8, out: &mut Vec<u8>) -> Result<()> {
        let (line, col) = (self.line, self.col);
        out.push(quote);
        self.advance();
        loop {
            match self.advance() {
                None => return Err(StepError::lexer(line, col, "unterminated string")),
                Some(ch) if ch == quote => {
                    out.push(ch);
                    // Doubled apostrophe is an escaped quote, not the end.
                    if quote == b'\'' && self.peek_char() == Some(b'\'') {
                        out.push(b'\'');
                        self.advance();
                    } else {
                        return Ok(());
                    }
                }
                Some(ch) => out.push(ch),
            }
        }
    }
}
