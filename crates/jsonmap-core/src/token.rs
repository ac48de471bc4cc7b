//! Forward-only JSON token cursor.
//!
//! [`JsonParser`] is a pull reader over an in-memory JSON text. Each call to
//! [`JsonParser::next_token`] advances exactly one token; the codec inspects
//! [`JsonParser::current_token`] to decide how to read a value, and calls
//! [`JsonParser::skip_children`] to discard sub-structures it does not want.
//!
//! # Key design decisions
//!
//! - **Container stack**: the parser tracks open objects/arrays so it knows
//!   whether the next token in an object is a field name or that field's value,
//!   and so that separators (`,` and `:`) are validated rather than guessed.
//! - **Fast path for strings**: string literals without a backslash are copied
//!   straight out of the input. Escaped literals are handed to `serde_json`,
//!   which handles `\uXXXX` and surrogate pairs.
//! - **Raw numeric text**: numbers keep their literal text; conversion happens
//!   in the accessors so integer and float reads can apply their own rules.

use crate::error::{DecodeError, DecodeResult};
use crate::writer::{NAN, NEGATIVE_INFINITY, POSITIVE_INFINITY};

/// A single JSON token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonToken {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName,
    String,
    NumberInt,
    NumberFloat,
    True,
    False,
    Null,
}

impl JsonToken {
    /// True for numeric literals of either kind.
    pub fn is_number(self) -> bool {
        matches!(self, JsonToken::NumberInt | JsonToken::NumberFloat)
    }

    /// True for `true`/`false`.
    pub fn is_boolean(self) -> bool {
        matches!(self, JsonToken::True | JsonToken::False)
    }

    /// True for the tokens that open a sub-structure.
    pub fn is_structure_start(self) -> bool {
        matches!(self, JsonToken::StartObject | JsonToken::StartArray)
    }

    /// Human-readable token kind, used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            JsonToken::StartObject => "start of object",
            JsonToken::EndObject => "end of object",
            JsonToken::StartArray => "start of array",
            JsonToken::EndArray => "end of array",
            JsonToken::FieldName => "field name",
            JsonToken::String => "string",
            JsonToken::NumberInt => "integer",
            JsonToken::NumberFloat => "float",
            JsonToken::True | JsonToken::False => "boolean",
            JsonToken::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Array,
}

/// Pull reader over a JSON document.
#[derive(Debug)]
pub struct JsonParser<'a> {
    input: &'a str,
    pos: usize,
    /// Open containers, each with a flag recording whether it holds an element yet.
    stack: Vec<(Frame, bool)>,
    /// Set after a field name; the next token is that field's value.
    awaiting_value: bool,
    root_done: bool,
    current: Option<JsonToken>,
    text: String,
    name: String,
}

impl<'a> JsonParser<'a> {
    /// Create a cursor positioned before the first token.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            awaiting_value: false,
            root_done: false,
            current: None,
            text: String::new(),
            name: String::new(),
        }
    }

    /// Advance to the next token. Returns `None` once the root value is complete.
    pub fn next_token(&mut self) -> DecodeResult<Option<JsonToken>> {
        let token = self.read_token()?;
        self.current = token;
        Ok(token)
    }

    /// The token the cursor is positioned on.
    pub fn current_token(&self) -> Option<JsonToken> {
        self.current
    }

    /// The most recently read field name.
    pub fn current_name(&self) -> &str {
        &self.name
    }

    /// Text of the current token: unescaped for strings and field names, the
    /// literal text for numbers and keywords, the delimiter for structure tokens.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of containers currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Byte offset of the cursor in the input.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// If the current token opens an object or array, consume through its
    /// matching end token. Otherwise do nothing.
    pub fn skip_children(&mut self) -> DecodeResult<()> {
        if !self.current.is_some_and(JsonToken::is_structure_start) {
            return Ok(());
        }
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_token()? {
                Some(JsonToken::StartObject | JsonToken::StartArray) => depth += 1,
                Some(JsonToken::EndObject | JsonToken::EndArray) => depth -= 1,
                Some(_) => {}
                None => return Err(self.syntax("unexpected end of input")),
            }
        }
        Ok(())
    }

    /// Consume tokens until the container that was open at `depth` has closed.
    ///
    /// The cursor ends on that container's end token. If it has already closed,
    /// nothing is consumed.
    pub fn finish_container(&mut self, depth: usize) -> DecodeResult<()> {
        while self.depth() >= depth {
            self.skip_children()?;
            if self.next_token()?.is_none() {
                return Err(self.syntax("unexpected end of input"));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Value accessors
    // ------------------------------------------------------------------------

    /// The current integer literal as `i64`, if it is one and fits.
    pub fn long_value(&self) -> Option<i64> {
        match self.current {
            Some(JsonToken::NumberInt) => self.text.parse().ok(),
            _ => None,
        }
    }

    /// The current numeric literal as `f64`, if the token is a number.
    ///
    /// The strings `"NaN"`, `"Infinity"` and `"-Infinity"` also count, since
    /// that is how the writer spells non-finite values.
    pub fn double_value(&self) -> Option<f64> {
        match self.current {
            Some(t) if t.is_number() => self.text.parse().ok(),
            Some(JsonToken::String) => match self.text.as_str() {
                NAN => Some(f64::NAN),
                POSITIVE_INFINITY => Some(f64::INFINITY),
                NEGATIVE_INFINITY => Some(f64::NEG_INFINITY),
                _ => None,
            },
            _ => None,
        }
    }

    /// Best-effort boolean view of the current token: `true`, a non-zero
    /// integer, or a string reading `true` once trimmed.
    pub fn value_as_bool(&self) -> bool {
        match self.current {
            Some(JsonToken::True) => true,
            Some(JsonToken::NumberInt) => self.text.bytes().any(|b| matches!(b, b'1'..=b'9')),
            Some(JsonToken::String) => self.text.trim() == "true",
            _ => false,
        }
    }

    /// Best-effort `i64` view of the current token.
    pub fn value_as_long(&self) -> i64 {
        match self.current {
            Some(JsonToken::NumberInt | JsonToken::NumberFloat | JsonToken::String) => {
                parse_long_lenient(&self.text)
            }
            Some(JsonToken::True) => 1,
            _ => 0,
        }
    }

    /// Best-effort `i32` view of the current token.
    pub fn value_as_int(&self) -> i32 {
        match self.current {
            Some(JsonToken::NumberFloat) => self.value_as_double() as i32,
            _ => {
                let n = self.value_as_long();
                i32::try_from(n).unwrap_or(if n < 0 { i32::MIN } else { i32::MAX })
            }
        }
    }

    /// Best-effort `f64` view of the current token.
    pub fn value_as_double(&self) -> f64 {
        match self.current {
            Some(JsonToken::NumberInt | JsonToken::NumberFloat | JsonToken::String) => {
                self.text.trim().parse().unwrap_or(0.0)
            }
            Some(JsonToken::True) => 1.0,
            _ => 0.0,
        }
    }

    // ------------------------------------------------------------------------
    // Tokenizer
    // ------------------------------------------------------------------------

    fn read_token(&mut self) -> DecodeResult<Option<JsonToken>> {
        self.skip_whitespace();

        let Some(&(frame, has_items)) = self.stack.last() else {
            if self.root_done || self.pos >= self.input.len() {
                if self.pos < self.input.len() {
                    return Err(self.syntax("trailing characters after root value"));
                }
                self.root_done = true;
                return Ok(None);
            }
            return self.read_value().map(Some);
        };

        match frame {
            Frame::Object if self.awaiting_value => {
                self.awaiting_value = false;
                self.read_value().map(Some)
            }
            Frame::Object => {
                if self.peek() == Some(b'}') {
                    self.pos += 1;
                    return Ok(Some(self.close(JsonToken::EndObject, "}")));
                }
                if has_items {
                    self.expect(b',')?;
                    self.skip_whitespace();
                }
                self.mark_item();
                if self.peek() != Some(b'"') {
                    return Err(self.syntax("expected field name"));
                }
                self.name = self.read_string()?;
                self.skip_whitespace();
                self.expect(b':')?;
                self.awaiting_value = true;
                self.text.clone_from(&self.name);
                Ok(Some(JsonToken::FieldName))
            }
            Frame::Array => {
                if self.peek() == Some(b']') {
                    self.pos += 1;
                    return Ok(Some(self.close(JsonToken::EndArray, "]")));
                }
                if has_items {
                    self.expect(b',')?;
                    self.skip_whitespace();
                }
                self.mark_item();
                self.read_value().map(Some)
            }
        }
    }

    fn read_value(&mut self) -> DecodeResult<JsonToken> {
        let token = match self.peek() {
            None => return Err(self.syntax("unexpected end of input")),
            Some(b'{') => {
                self.pos += 1;
                self.stack.push((Frame::Object, false));
                self.set_text("{");
                return Ok(JsonToken::StartObject);
            }
            Some(b'[') => {
                self.pos += 1;
                self.stack.push((Frame::Array, false));
                self.set_text("[");
                return Ok(JsonToken::StartArray);
            }
            Some(b'"') => {
                self.text = self.read_string()?;
                JsonToken::String
            }
            Some(b't') => self.read_keyword("true", JsonToken::True)?,
            Some(b'f') => self.read_keyword("false", JsonToken::False)?,
            Some(b'n') => self.read_keyword("null", JsonToken::Null)?,
            Some(b'-' | b'0'..=b'9') => self.read_number()?,
            Some(_) => return Err(self.syntax("unexpected character")),
        };
        if self.stack.is_empty() {
            self.root_done = true;
        }
        Ok(token)
    }

    /// Read a string literal starting at the opening quote, returning its
    /// unescaped contents and leaving the cursor after the closing quote.
    fn read_string(&mut self) -> DecodeResult<String> {
        let open = self.pos;
        let bytes = self.input.as_bytes();
        let mut i = open + 1;
        let mut escaped = false;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    escaped = true;
                    i += 2;
                }
                b'"' => break,
                b if b < 0x20 => {
                    self.pos = i;
                    return Err(self.syntax("control character in string"));
                }
                _ => i += 1,
            }
        }
        if i >= bytes.len() {
            self.pos = bytes.len();
            return Err(self.syntax("unterminated string"));
        }
        let close = i;
        self.pos = close + 1;
        if !escaped {
            return Ok(self.input[open + 1..close].to_string());
        }
        serde_json::from_str::<String>(&self.input[open..=close]).map_err(|e| DecodeError::Syntax {
            offset: open,
            message: format!("invalid string literal: {e}"),
        })
    }

    fn read_keyword(&mut self, keyword: &'static str, token: JsonToken) -> DecodeResult<JsonToken> {
        if !self.input[self.pos..].starts_with(keyword) {
            return Err(self.syntax("invalid literal"));
        }
        self.pos += keyword.len();
        self.set_text(keyword);
        Ok(token)
    }

    fn read_number(&mut self) -> DecodeResult<JsonToken> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start;
        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
        let int_digits = count_digits(bytes, i);
        if int_digits == 0 {
            self.pos = i;
            return Err(self.syntax("expected digit"));
        }
        i += int_digits;

        let mut is_float = false;
        if bytes.get(i) == Some(&b'.') {
            let frac_digits = count_digits(bytes, i + 1);
            if frac_digits == 0 {
                self.pos = i + 1;
                return Err(self.syntax("expected digit after decimal point"));
            }
            i += 1 + frac_digits;
            is_float = true;
        }
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            i += 1;
            if matches!(bytes.get(i), Some(b'+' | b'-')) {
                i += 1;
            }
            let exp_digits = count_digits(bytes, i);
            if exp_digits == 0 {
                self.pos = i;
                return Err(self.syntax("expected digit in exponent"));
            }
            i += exp_digits;
            is_float = true;
        }

        self.pos = i;
        self.text.clear();
        self.text.push_str(&self.input[start..i]);
        Ok(if is_float {
            JsonToken::NumberFloat
        } else {
            JsonToken::NumberInt
        })
    }

    fn close(&mut self, token: JsonToken, text: &str) -> JsonToken {
        self.stack.pop();
        if self.stack.is_empty() {
            self.root_done = true;
        }
        self.set_text(text);
        token
    }

    fn mark_item(&mut self) {
        if let Some(top) = self.stack.last_mut() {
            top.1 = true;
        }
    }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn expect(&mut self, byte: u8) -> DecodeResult<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.syntax(&format!("expected '{}'", byte as char)))
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b'\t' | b'\n' | b'\r') {
            self.pos += 1;
        }
    }

    fn syntax(&self, message: &str) -> DecodeError {
        DecodeError::Syntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }
}

fn count_digits(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .map(|rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
        .unwrap_or(0)
}

/// Integer parse that falls back through float parsing and truncation.
fn parse_long_lenient(text: &str) -> i64 {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return n;
    }
    text.parse::<f64>().map(|f| f as i64).unwrap_or(0)
}
