//! Field tag microsyntax.
//!
//! A raw tag is a space-separated list of `key:"value"` pairs. Three keys are
//! understood:
//!
//! | Key | Value | Effect |
//! |-----|-------|--------|
//! | `json` | `name[,omitempty][,omitzero][,string]` or `-` | serialized name, exclusion |
//! | `ts_type` | verbatim TypeScript type | overrides structural inference |
//! | `ts_transform` | expression containing `__VALUE__` once | factory access expression |
//!
//! Unknown keys are ignored. Everything else that does not fit the grammar is
//! reported as a [`TagError`] when the tag is parsed during conversion.

use std::collections::HashSet;

use crate::error::TagError;

/// Placeholder substituted with the default property read in transforms.
pub const PLACEHOLDER: &str = "__VALUE__";

/// Raw, unparsed tag text attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StructTag(String);

impl StructTag {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a `key:"value"` pair, escaping the value.
    pub fn push(&mut self, key: &str, value: &str) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(key);
        self.0.push_str(":\"");
        for c in value.chars() {
            match c {
                '"' => self.0.push_str("\\\""),
                '\\' => self.0.push_str("\\\\"),
                '\n' => self.0.push_str("\\n"),
                '\t' => self.0.push_str("\\t"),
                '\r' => self.0.push_str("\\r"),
                c => self.0.push(c),
            }
        }
        self.0.push('"');
    }

    /// Split the tag into its key/value pairs, unescaping values.
    pub fn pairs(&self) -> Result<Vec<(String, String)>, TagError> {
        let raw = self.0.as_str();
        let bytes = raw.as_bytes();
        let mut pairs = Vec::new();
        let mut i = 0;

        loop {
            while i < bytes.len() && bytes[i] == b' ' {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }

            let start = i;
            while i < bytes.len()
                && bytes[i] > b' '
                && bytes[i] != b':'
                && bytes[i] != b'"'
                && bytes[i] != 0x7f
            {
                i += 1;
            }
            if i == start {
                return Err(TagError::syntax(start, "expected a key"));
            }
            let key = &raw[start..i];
            if bytes.get(i) != Some(&b':') {
                return Err(TagError::syntax(i, format!("expected `:` after key `{key}`")));
            }
            i += 1;
            if bytes.get(i) != Some(&b'"') {
                return Err(TagError::syntax(
                    i,
                    format!("expected a quoted value for key `{key}`"),
                ));
            }
            i += 1;

            let mut value = String::new();
            loop {
                let Some(c) = raw[i..].chars().next() else {
                    return Err(TagError::syntax(
                        raw.len(),
                        format!("unterminated value for key `{key}`"),
                    ));
                };
                i += c.len_utf8();
                match c {
                    '"' => break,
                    '\\' => {
                        let Some(escaped) = raw[i..].chars().next() else {
                            return Err(TagError::syntax(
                                raw.len(),
                                format!("unterminated value for key `{key}`"),
                            ));
                        };
                        value.push(match escaped {
                            '"' => '"',
                            '\\' => '\\',
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => {
                                return Err(TagError::syntax(
                                    i - 1,
                                    format!("unsupported escape `\\{other}`"),
                                ));
                            }
                        });
                        i += escaped.len_utf8();
                    }
                    c => value.push(c),
                }
            }
            pairs.push((key.to_string(), value));
        }

        Ok(pairs)
    }

    /// Parse the tag into structured options.
    pub fn parse(&self) -> Result<TagOptions, TagError> {
        let mut options = TagOptions::default();
        let mut seen = HashSet::new();

        for (key, value) in self.pairs()? {
            if !seen.insert(key.clone()) {
                return Err(TagError::DuplicateKey { key });
            }
            match key.as_str() {
                "json" => options.json = Some(JsonTag::parse(&value)?),
                "ts_type" => {
                    if value.trim().is_empty() {
                        return Err(TagError::EmptyTypeOverride);
                    }
                    options.ts_type = Some(value);
                }
                "ts_transform" => {
                    let count = value.matches(PLACEHOLDER).count();
                    if count != 1 {
                        return Err(TagError::Placeholder {
                            template: value,
                            count,
                        });
                    }
                    options.ts_transform = Some(value);
                }
                _ => {}
            }
        }

        Ok(options)
    }
}

/// The `json` tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonTag {
    /// `json:"-"`: the field is never serialized.
    Skip,
    Field(JsonField),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonField {
    /// Serialized name; `None` when the tag only carries options.
    pub name: Option<String>,
    pub omit_empty: bool,
    /// Scalars travel as quoted strings.
    pub as_string: bool,
}

impl JsonTag {
    fn parse(value: &str) -> Result<Self, TagError> {
        if value == "-" {
            return Ok(JsonTag::Skip);
        }

        let (name, options) = value.split_once(',').unwrap_or((value, ""));
        let name = name.trim();
        let mut field = JsonField {
            name: (!name.is_empty()).then(|| name.to_string()),
            ..JsonField::default()
        };

        for option in options.split(',').map(str::trim) {
            match option {
                "" => {}
                "omitempty" | "omitzero" => field.omit_empty = true,
                "string" => field.as_string = true,
                other => {
                    return Err(TagError::UnknownOption {
                        option: other.to_string(),
                    });
                }
            }
        }

        Ok(JsonTag::Field(field))
    }
}

/// Structured tag metadata for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
    pub json: Option<JsonTag>,
    pub ts_type: Option<String>,
    pub ts_transform: Option<String>,
}

impl TagOptions {
    /// Whether the field carries the exclusion marker.
    pub fn is_excluded(&self) -> bool {
        matches!(self.json, Some(JsonTag::Skip))
    }

    /// Name used both as the emitted property and as the JSON key.
    ///
    /// Untagged fields keep their declared identifier. Excluded fields and
    /// fields whose `json` tag has options but no name are not emitted.
    pub fn serialized_name<'a>(&'a self, declared: &'a str) -> Option<&'a str> {
        match &self.json {
            None => Some(declared),
            Some(JsonTag::Skip) => None,
            Some(JsonTag::Field(field)) => field.name.as_deref(),
        }
    }

    pub fn omit_empty(&self) -> bool {
        matches!(&self.json, Some(JsonTag::Field(field)) if field.omit_empty)
    }

    pub fn as_string(&self) -> bool {
        matches!(&self.json, Some(JsonTag::Field(field)) if field.as_string)
    }
}
