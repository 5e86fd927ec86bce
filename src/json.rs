//! A minimal hand-rolled JSON reader/writer: a recursive-descent parser
//! over a small cursor, plus a compact `Display` serializer.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Value, JsonError> {
        let mut cursor = Cursor { bytes, pos: 0 };
        cursor.skip_whitespace();
        let value = cursor.parse_value()?;
        cursor.skip_whitespace();
        if cursor.pos != cursor.bytes.len() {
            return Err(JsonError::TrailingData);
        }
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "\"{}\"", escape(s)),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "\"{}\":{}", escape(key), value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonError {
    UnexpectedEof,
    UnexpectedByte(u8),
    InvalidNumber,
    InvalidEscape,
    TrailingData,
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::UnexpectedEof => write!(f, "unexpected end of input"),
            JsonError::UnexpectedByte(b) => write!(f, "unexpected byte {:#04x}", b),
            JsonError::InvalidNumber => write!(f, "invalid number literal"),
            JsonError::InvalidEscape => write!(f, "invalid escape sequence"),
            JsonError::TrailingData => write!(f, "trailing data after JSON value"),
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, b: u8) -> Result<(), JsonError> {
        match self.bump() {
            Some(actual) if actual == b => Ok(()),
            Some(actual) => Err(JsonError::UnexpectedByte(actual)),
            None => Err(JsonError::UnexpectedEof),
        }
    }

    fn consume_literal(&mut self, literal: &[u8]) -> Result<(), JsonError> {
        if self.bytes[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(JsonError::UnexpectedByte(self.peek().unwrap_or(b'\0')))
        }
    }

    fn parse_value(&mut self) -> Result<Value, JsonError> {
        self.skip_whitespace();
        match self.peek().ok_or(JsonError::UnexpectedEof)? {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b'"' => Ok(Value::String(self.parse_string()?)),
            b't' => {
                self.consume_literal(b"true")?;
                Ok(Value::Bool(true))
            }
            b'f' => {
                self.consume_literal(b"false")?;
                Ok(Value::Bool(false))
            }
            b'n' => {
                self.consume_literal(b"null")?;
                Ok(Value::Null)
            }
            b'-' | b'0'..=b'9' => self.parse_number(),
            other => Err(JsonError::UnexpectedByte(other)),
        }
    }

    fn parse_object(&mut self) -> Result<Value, JsonError> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Object(entries));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b'}') => break,
                Some(other) => return Err(JsonError::UnexpectedByte(other)),
                None => return Err(JsonError::UnexpectedEof),
            }
        }
        Ok(Value::Object(entries))
    }

    fn parse_array(&mut self) -> Result<Value, JsonError> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b']') => break,
                Some(other) => return Err(JsonError::UnexpectedByte(other)),
                None => return Err(JsonError::UnexpectedEof),
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_string(&mut self) -> Result<String, JsonError> {
        self.expect(b'"')?;
        let mut out = String::new();
        loop {
            match self.bump().ok_or(JsonError::UnexpectedEof)? {
                b'"' => break,
                b'\\' => match self.bump().ok_or(JsonError::UnexpectedEof)? {
                    b'"' => out.push('"'),
                    b'\\' => out.push('\\'),
                    b'/' => out.push('/'),
                    b'n' => out.push('\n'),
                    b't' => out.push('\t'),
                    b'r' => out.push('\r'),
                    _ => return Err(JsonError::InvalidEscape),
                },
                b => out.push(b as char),
            }
        }
        Ok(out)
    }

    fn parse_number(&mut self) -> Result<Value, JsonError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')) {
            self.pos += 1;
        }
        let slice = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| JsonError::InvalidNumber)?;
        slice
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| JsonError::InvalidNumber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_with_mixed_types() {
        let value = Value::parse(br#"{"username":"admin","age":30,"ok":true,"tags":null}"#).unwrap();
        assert_eq!(value.get("username").unwrap().as_str(), Some("admin"));
        assert_eq!(value.get("age").unwrap(), &Value::Number(30.0));
        assert_eq!(value.get("ok").unwrap(), &Value::Bool(true));
        assert_eq!(value.get("tags").unwrap(), &Value::Null);
    }

    #[test]
    fn parses_nested_array() {
        let value = Value::parse(br#"{"items":[1,2,3]}"#).unwrap();
        assert_eq!(
            value.get("items").unwrap(),
            &Value::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert_eq!(Value::parse(b"{}x"), Err(JsonError::TrailingData));
    }

    #[test]
    fn round_trips_through_display() {
        let value = Value::Object(vec![
            ("status".to_string(), Value::String("success".to_string())),
            ("token".to_string(), Value::String("abc".to_string())),
        ]);
        assert_eq!(value.to_string(), r#"{"status":"success","token":"abc"}"#);
    }
}
