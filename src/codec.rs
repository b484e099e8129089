//! Payload codecs
//!
//! Every value file holds one payload, interpreted by the codec registered
//! for its extension. Payloads are represented as [`serde_json::Value`]: text
//! codecs produce strings, structured codecs produce mappings.

use crate::error::CodecError;
use ini::{Ini, ParseOption};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Channel holding structured key/value payloads; the only kind cascades merge
pub const CHANNEL_KVS: &str = ".kvs";
pub const CHANNEL_TEXT: &str = ".txt";
pub const CHANNEL_MARKDOWN: &str = ".mdw";
pub const CHANNEL_IMAGES: &str = ".img";
pub const CHANNEL_VIDEO: &str = ".vid";

/// Extension given to values written through a channel of the given kind.
///
/// Image and video channels hold materialized references only.
pub fn value_extension(channel_extension: &str) -> Option<&'static str> {
    match channel_extension.to_ascii_lowercase().as_str() {
        CHANNEL_KVS => Some(".json"),
        CHANNEL_TEXT | CHANNEL_MARKDOWN => Some(".txt"),
        _ => None,
    }
}

/// Bytes <-> payload conversion for one file extension
pub trait Codec: Send + Sync {
    /// Short format name used in diagnostics
    fn format(&self) -> &'static str;

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError>;

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    /// Payload a value degrades to when reading fails
    fn default_value(&self) -> Value;
}

/// Plain text; identity over UTF-8
pub struct TextCodec;

impl Codec for TextCodec {
    fn format(&self) -> &'static str {
        "text"
    }

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError> {
        String::from_utf8(raw.to_vec())
            .map(Value::String)
            .map_err(|e| CodecError::Malformed {
                format: self.format(),
                message: e.to_string(),
            })
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        Ok(match value {
            Value::String(s) => s.clone().into_bytes(),
            Value::Null => Vec::new(),
            other => other.to_string().into_bytes(),
        })
    }

    fn default_value(&self) -> Value {
        Value::String(String::new())
    }
}

/// JSON, written with four-space indentation
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn format(&self) -> &'static str {
        "json"
    }

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(raw).map_err(|e| CodecError::Malformed {
            format: self.format(),
            message: e.to_string(),
        })
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        use serde::Serialize;

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| CodecError::Unsupported {
                format: self.format(),
                message: e.to_string(),
            })?;
        Ok(out)
    }

    fn default_value(&self) -> Value {
        Value::Object(Map::new())
    }
}

/// INI: sections map to nested mappings, section-less keys to top-level scalars
pub struct IniCodec;

impl IniCodec {
    fn scalar(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::String(s) if !s.contains('\n') => Ok(s.clone()),
            Value::String(_) => Err(CodecError::Unsupported {
                format: self.format(),
                message: format!("multi-line value for key {:?}", key),
            }),
            _ => Err(CodecError::Unsupported {
                format: self.format(),
                message: format!("key {:?} nests deeper than one section", key),
            }),
        }
    }
}

impl Codec for IniCodec {
    fn format(&self) -> &'static str {
        "ini"
    }

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError> {
        let malformed = |message: String| CodecError::Malformed {
            format: "ini",
            message,
        };
        let text = std::str::from_utf8(raw).map_err(|e| malformed(e.to_string()))?;
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(text, options).map_err(|e| malformed(e.to_string()))?;

        // Section and key names keep their case
        let mut out = Map::new();
        for (section, properties) in ini.iter() {
            let entries = properties
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())));
            match section {
                None => out.extend(entries),
                Some(section) => {
                    let slot = out
                        .entry(section.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(map) = slot {
                        map.extend(entries);
                    } else {
                        *slot = Value::Object(entries.collect());
                    }
                }
            }
        }
        Ok(Value::Object(out))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let Value::Object(map) = value else {
            return Err(CodecError::Unsupported {
                format: self.format(),
                message: "top level must be a mapping".to_string(),
            });
        };

        let mut out = String::new();
        for (key, value) in map.iter().filter(|(_, v)| !v.is_object()) {
            out.push_str(&format!("{} = {}\n", key, self.scalar(key, value)?));
        }
        for (section, value) in map.iter() {
            let Value::Object(entries) = value else {
                continue;
            };
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            for (key, value) in entries {
                out.push_str(&format!("{} = {}\n", key, self.scalar(key, value)?));
            }
        }
        Ok(out.into_bytes())
    }

    fn default_value(&self) -> Value {
        Value::Object(Map::new())
    }
}

/// TOML documents; the top level must be a table
pub struct TomlCodec;

impl Codec for TomlCodec {
    fn format(&self) -> &'static str {
        "toml"
    }

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError> {
        let malformed = |message: String| CodecError::Malformed {
            format: "toml",
            message,
        };
        let text = std::str::from_utf8(raw).map_err(|e| malformed(e.to_string()))?;
        toml::from_str::<Value>(text).map_err(|e| malformed(e.to_string()))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        toml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Unsupported {
                format: self.format(),
                message: e.to_string(),
            })
    }

    fn default_value(&self) -> Value {
        Value::Object(Map::new())
    }
}

/// Static extension -> codec table
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    pub fn empty() -> Self {
        Self {
            codecs: BTreeMap::new(),
        }
    }

    /// Text (`.txt`, `.mdw`), JSON, INI and TOML
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(".txt", Arc::new(TextCodec));
        registry.register(".mdw", Arc::new(TextCodec));
        registry.register(".json", Arc::new(JsonCodec));
        registry.register(".ini", Arc::new(IniCodec));
        registry.register(".toml", Arc::new(TomlCodec));
        registry
    }

    /// Register (or replace) the codec for an extension such as `.json`
    pub fn register(&mut self, extension: &str, codec: Arc<dyn Codec>) {
        self.codecs.insert(extension.to_ascii_lowercase(), codec);
    }

    pub fn get(&self, extension: &str) -> Option<&dyn Codec> {
        self.codecs
            .get(&extension.to_ascii_lowercase())
            .map(|c| c.as_ref())
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    pub fn decode(&self, extension: &str, raw: &[u8]) -> Result<Value, CodecError> {
        self.get(extension)
            .ok_or_else(|| CodecError::UnknownExtension(extension.to_string()))?
            .decode(raw)
    }

    pub fn encode(&self, extension: &str, value: &Value) -> Result<Vec<u8>, CodecError> {
        self.get(extension)
            .ok_or_else(|| CodecError::UnknownExtension(extension.to_string()))?
            .encode(value)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.codecs.keys()).finish()
    }
}
