use std::collections::HashMap;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(u64),
    List(Vec<StepValue>),
    /// Typed value such as `IFCLENGTHMEASURE(2.5)`.
    Typed(String, Box<StepValue>),
    Null,
    Derived,
}

impl StepValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Typed(_, inner) => inner.as_str(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<u64> {
        match self {
            Self::Reference(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            Self::Typed(_, inner) => inner.as_float(),
            _ => None,
        }
    }

    /// List items, or an empty slice for anything else.
    #[must_use]
    pub fn items(&self) -> &[StepValue] {
        match self {
            Self::List(list) => list,
            _ => &[],
        }
    }

    /// References contained in a list value.
    #[must_use]
    pub fn references(&self) -> Vec<u64> {
        self.items().iter().filter_map(StepValue::as_reference).collect()
    }
}

#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: u64,
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepValue> {
        self.values.get(index)
    }

    #[must_use]
    pub fn string_at(&self, index: usize) -> Option<String> {
        self.get(index)
            .and_then(StepValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    #[must_use]
    pub fn reference_at(&self, index: usize) -> Option<u64> {
        self.get(index).and_then(StepValue::as_reference)
    }

    #[must_use]
    pub fn references_at(&self, index: usize) -> Vec<u64> {
        self.get(index).map(StepValue::references).unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct StepFile {
    pub entities: HashMap<u64, StepEntity>,
    pub schema: String,
}

impl StepFile {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut entities = HashMap::new();
        let mut schema = String::new();
        let mut in_data = false;
        let mut saw_header = false;

        for statement in split_statements(content) {
            let statement = statement.trim();

            if statement.starts_with("ISO-10303-21") {
                saw_header = true;
                continue;
            }

            if statement.starts_with("FILE_SCHEMA") {
                if let Some(start) = statement.find("('") {
                    if let Some(end) = statement[start + 2..].find('\'') {
                        schema = statement[start + 2..start + 2 + end].to_string();
                    }
                }
                continue;
            }

            if statement == "DATA" {
                in_data = true;
                continue;
            }
            if statement == "ENDSEC" {
                in_data = false;
                continue;
            }

            if in_data && statement.starts_with('#') {
                if let Some(entity) = Self::parse_entity(statement) {
                    entities.insert(entity.id, entity);
                }
            }
        }

        if !saw_header {
            return Err(ParseError::InvalidStep {
                message: "missing ISO-10303-21 header".to_string(),
            });
        }

        Ok(StepFile { entities, schema })
    }

    fn parse_entity(statement: &str) -> Option<StepEntity> {
        // Format: #123=IFCWALL('guid',#ref,'name',...)
        let eq_pos = statement.find('=')?;
        let id: u64 = statement[1..eq_pos].trim().parse().ok()?;

        let rest = statement[eq_pos + 1..].trim();
        let paren_pos = rest.find('(')?;
        let entity_type = rest[..paren_pos].trim().to_uppercase();

        let close = rest.rfind(')')?;
        if close <= paren_pos {
            return None;
        }
        let values = Self::parse_values(&rest[paren_pos + 1..close]);

        Some(StepEntity {
            id,
            entity_type,
            values,
        })
    }

    fn parse_values(s: &str) -> Vec<StepValue> {
        let mut values = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut paren_depth = 0;

        for ch in s.chars() {
            match ch {
                '\'' => {
                    in_string = !in_string;
                    current.push(ch);
                }
                '(' if !in_string => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' if !in_string => {
                    paren_depth -= 1;
                    current.push(ch);
                }
                ',' if !in_string && paren_depth == 0 => {
                    values.push(Self::parse_single_value(current.trim()));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.trim().is_empty() {
            values.push(Self::parse_single_value(current.trim()));
        }

        values
    }

    fn parse_single_value(s: &str) -> StepValue {
        let s = s.trim();

        if s == "$" {
            return StepValue::Null;
        }
        if s == "*" {
            return StepValue::Derived;
        }
        if let Some(stripped) = s.strip_prefix('#') {
            if let Ok(id) = stripped.parse::<u64>() {
                return StepValue::Reference(id);
            }
        }
        if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
            return StepValue::String(decode_step_string(&s[1..s.len() - 1]));
        }
        if s.len() >= 2 && s.starts_with('.') && s.ends_with('.') {
            return match &s[1..s.len() - 1] {
                "T" => StepValue::Boolean(true),
                "F" => StepValue::Boolean(false),
                inner => StepValue::Enum(inner.to_string()),
            };
        }
        if s.starts_with('(') && s.ends_with(')') {
            return StepValue::List(Self::parse_values(&s[1..s.len() - 1]));
        }
        if let Ok(i) = s.parse::<i64>() {
            return StepValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return StepValue::Real(f);
        }
        // Typed value like IFCBOOLEAN(.T.)
        if let Some(paren_pos) = s.find('(') {
            if s.ends_with(')') {
                let type_name = s[..paren_pos].trim().to_uppercase();
                let inner = Self::parse_single_value(&s[paren_pos + 1..s.len() - 1]);
                return StepValue::Typed(type_name, Box::new(inner));
            }
        }

        StepValue::String(s.to_string())
    }

    #[must_use]
    pub fn get_entity(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities of one type, ordered by id so traversal is stable across runs.
    #[must_use]
    pub fn get_entities_by_type(&self, entity_type: &str) -> Vec<&StepEntity> {
        let mut found: Vec<&StepEntity> = self
            .entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }
}

/// Splits STEP content on `;` outside string literals, so entities spanning
/// several lines come out as one statement.
fn split_statements(content: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            '/' if !in_string && chars.peek() == Some(&'*') => {
                // Skip /* comment */
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' if !in_string => {
                statements.push(std::mem::take(&mut current));
            }
            '\n' | '\r' if !in_string => current.push(' '),
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        statements.push(current);
    }

    statements
}

/// Decode STEP/IFC encoded strings with Unicode escape sequences.
/// Supports:
/// - `\X2\XXXX\X0\` - 2-byte Unicode (BMP), can have multiple 4-char hex codes
/// - `\X\XX` - 1-byte ISO 8859-1
/// - `\S\X` - high-bit shift
/// - `\\` - escaped backslash
/// - `''` - escaped apostrophe
fn decode_step_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
            }
            result.push('\'');
            continue;
        }
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('X') => {
                chars.next();
                match chars.peek() {
                    Some('2') => {
                        chars.next(); // '2'
                        chars.next(); // '\'
                        let hex: String = chars.by_ref().take_while(|&c| c != '\\').collect();
                        // take_while consumed the '\' of the \X0\ terminator
                        for _ in 0..3 {
                            chars.next();
                        }
                        for chunk in hex.as_bytes().chunks(4) {
                            let decoded = std::str::from_utf8(chunk)
                                .ok()
                                .and_then(|h| u32::from_str_radix(h, 16).ok())
                                .and_then(char::from_u32);
                            if let Some(c) = decoded {
                                result.push(c);
                            }
                        }
                    }
                    Some('\\') => {
                        chars.next();
                        let hex: String = chars.by_ref().take(2).collect();
                        if let Ok(code) = u8::from_str_radix(&hex, 16) {
                            result.push(char::from(code));
                        }
                    }
                    _ => result.push_str("\\X"),
                }
            }
            Some('\\') => {
                chars.next();
                result.push('\\');
            }
            Some('S') => {
                chars.next(); // 'S'
                chars.next(); // '\'
                if let Some(c) = chars.next() {
                    let shifted = u32::from(c) + 128;
                    result.push(char::from_u32(shifted).unwrap_or(c));
                }
            }
            _ => result.push('\\'),
        }
    }

    result
}
