//! Compact JSON token sink.
//!
//! [`JsonWriter`] mirrors [`crate::token::JsonParser`]: the codec emits one
//! token at a time and the writer inserts `,` and `:` separators from its own
//! container stack, so callers never track "first element" state.

/// Spellings used for non-finite floating-point values, which JSON numbers
/// cannot express.
pub(crate) const NAN: &str = "NaN";
pub(crate) const POSITIVE_INFINITY: &str = "Infinity";
pub(crate) const NEGATIVE_INFINITY: &str = "-Infinity";

/// In-memory JSON generator producing compact output.
#[derive(Debug, Default)]
pub struct JsonWriter {
    out: String,
    /// Open containers: `(is_object, has_items)`.
    stack: Vec<(bool, bool)>,
    after_name: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_object(&mut self) {
        self.before_value();
        self.out.push('{');
        self.stack.push((true, false));
    }

    pub fn end_object(&mut self) {
        self.stack.pop();
        self.out.push('}');
    }

    pub fn start_array(&mut self) {
        self.before_value();
        self.out.push('[');
        self.stack.push((false, false));
    }

    pub fn end_array(&mut self) {
        self.stack.pop();
        self.out.push(']');
    }

    /// Write an object key. The next value written belongs to it.
    pub fn field_name(&mut self, name: &str) {
        if let Some(top) = self.stack.last_mut() {
            if top.1 {
                self.out.push(',');
            }
            top.1 = true;
        }
        escape_into(name, &mut self.out);
        self.out.push(':');
        self.after_name = true;
    }

    pub fn string(&mut self, value: &str) {
        self.before_value();
        escape_into(value, &mut self.out);
    }

    pub fn bool(&mut self, value: bool) {
        self.before_value();
        self.out.push_str(if value { "true" } else { "false" });
    }

    pub fn int(&mut self, value: i32) {
        self.before_value();
        self.out.push_str(&value.to_string());
    }

    pub fn long(&mut self, value: i64) {
        self.before_value();
        self.out.push_str(&value.to_string());
    }

    /// Non-finite values are written as the strings `"NaN"`, `"Infinity"`
    /// and `"-Infinity"`.
    pub fn float(&mut self, value: f32) {
        if value.is_finite() {
            self.raw_number(value.to_string());
        } else {
            self.non_finite(f64::from(value));
        }
    }

    /// See [`JsonWriter::float`].
    pub fn double(&mut self, value: f64) {
        if value.is_finite() {
            self.raw_number(value.to_string());
        } else {
            self.non_finite(value);
        }
    }

    pub fn null(&mut self) {
        self.before_value();
        self.out.push_str("null");
    }

    /// The text written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consume the writer, returning the accumulated text.
    pub fn finish(self) -> String {
        self.out
    }

    /// Floats always carry a fractional part so they read back as floats.
    fn raw_number(&mut self, mut text: String) {
        if !text.contains(['.', 'e', 'E']) {
            text.push_str(".0");
        }
        self.before_value();
        self.out.push_str(&text);
    }

    fn non_finite(&mut self, value: f64) {
        let text = if value.is_nan() {
            NAN
        } else if value > 0.0 {
            POSITIVE_INFINITY
        } else {
            NEGATIVE_INFINITY
        };
        self.string(text);
    }

    fn before_value(&mut self) {
        if self.after_name {
            self.after_name = false;
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            if top.1 {
                self.out.push(',');
            }
            top.1 = true;
        }
    }
}

/// Write `s` as a quoted JSON string literal.
fn escape_into(s: &str, out: &mut String) {
    out.reserve(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(ch),
        }
    }
    out.push('"');
}
