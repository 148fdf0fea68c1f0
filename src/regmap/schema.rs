// ABOUTME: Typed record definitions for the register map schema
// ABOUTME: Decodes JSON into regions, block types, registers and fields, validating layout once

use super::error::RegMapError;
use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Region kind value for register block regions
pub const REGION_TYPE_REGISTER_BLOCK: &str = "register_block";
/// Region kind value for memory regions
pub const REGION_TYPE_MEMORY: &str = "memory";

/// Complete register map description
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Schema {
    /// Top-level regions keyed by region name
    pub default_map: BTreeMap<String, RegionEntry>,
    /// Shared register layouts keyed by block type name
    #[serde(default)]
    pub register_blocks: BTreeMap<String, BlockTypeEntry>,
}

/// One entry of `default_map`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionEntry {
    /// Declared kind, `register_block` or `memory`
    #[serde(default)]
    pub region_type: Option<String>,
    /// Block type name, for register block regions
    #[serde(default)]
    pub register_block_type: Option<String>,
    /// Base address
    #[serde(default)]
    pub base: Option<u64>,
    /// Every other key declared on the region
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl RegionEntry {
    /// Value of any key declared on the entry, the typed keys included
    pub fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        match key {
            "region_type" => self.region_type.as_deref().map(|v| Cow::Owned(Value::from(v))),
            "register_block_type" => self
                .register_block_type
                .as_deref()
                .map(|v| Cow::Owned(Value::from(v))),
            "base" => self.base.map(|base| Cow::Owned(Value::from(base))),
            _ => self.attributes.get(key).map(Cow::Borrowed),
        }
    }

    /// Every key declared on the entry, sorted
    pub fn keys(&self) -> Vec<&str> {
        let typed = [
            ("base", self.base.is_some()),
            ("region_type", self.region_type.is_some()),
            ("register_block_type", self.register_block_type.is_some()),
        ];
        let mut keys: Vec<&str> = typed
            .into_iter()
            .filter_map(|(key, declared)| declared.then_some(key))
            .chain(self.attributes.keys().map(String::as_str))
            .collect();
        keys.sort_unstable();
        keys
    }
}

/// One entry of `register_blocks`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockTypeEntry {
    /// Registers keyed by register name
    #[serde(default)]
    pub registers: BTreeMap<String, RegisterEntry>,
}

/// Register layout within a block type
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterEntry {
    /// Byte offset from the block base
    pub offset: u64,
    /// Access qualifier string such as `RW`, `RO` or `WOC`
    #[serde(rename = "type")]
    pub access_type: String,
    /// Bit-fields keyed by field name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldEntry>,
    /// Description lines
    #[serde(default, deserialize_with = "one_or_many")]
    pub desc: Vec<String>,
}

/// Bit-field layout within a register
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldEntry {
    /// Least significant bit position
    pub lsb: u32,
    /// Width in bits
    pub width: u32,
    /// Permitted values
    #[serde(default)]
    pub valid: ValidValues,
    /// Every other key declared on the field
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

/// Declared set of permitted field values
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawValid")]
pub enum ValidValues {
    /// Unconstrained, either `"all"` or not declared
    #[default]
    All,
    /// Explicit list of permitted values
    Values(Vec<i64>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValid {
    Values(Vec<i64>),
    Keyword(String),
}

impl TryFrom<RawValid> for ValidValues {
    type Error = String;

    fn try_from(raw: RawValid) -> Result<Self, Self::Error> {
        match raw {
            RawValid::Values(values) => Ok(ValidValues::Values(values)),
            RawValid::Keyword(keyword) if keyword == "all" => Ok(ValidValues::All),
            RawValid::Keyword(keyword) => Err(format!("unsupported valid keyword {keyword:?}")),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(line) => vec![line],
        OneOrMany::Many(lines) => lines,
    })
}

impl Schema {
    /// Decode and validate a schema from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, RegMapError> {
        let schema: Schema = serde_json::from_str(json).map_err(malformed)?;
        schema.checked()
    }

    /// Decode and validate a schema from JSON bytes
    pub fn from_slice(json: &[u8]) -> Result<Self, RegMapError> {
        let schema: Schema = serde_json::from_slice(json).map_err(malformed)?;
        schema.checked()
    }

    /// Decode and validate a schema from an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, RegMapError> {
        let schema: Schema = serde_json::from_value(value).map_err(malformed)?;
        schema.checked()
    }

    fn checked(self) -> Result<Self, RegMapError> {
        self.validate()?;
        debug!(
            "decoded register map schema: {} regions, {} block types",
            self.default_map.len(),
            self.register_blocks.len()
        );
        Ok(self)
    }

    /// Check the bit layout of every field
    ///
    /// Fields need `width > 0` and must fit in 64 bits. An explicit `valid`
    /// list must not be empty.
    pub fn validate(&self) -> Result<(), RegMapError> {
        for (type_name, block_type) in &self.register_blocks {
            for (register_name, register) in &block_type.registers {
                for (field_name, field) in &register.fields {
                    let path = || format!("{type_name}.{register_name}.{field_name}");

                    if field.width == 0 {
                        return Err(RegMapError::MalformedSchema(format!(
                            "field {} has zero width",
                            path()
                        )));
                    }

                    if u64::from(field.lsb) + u64::from(field.width) > 64 {
                        return Err(RegMapError::MalformedSchema(format!(
                            "field {} (lsb {}, width {}) does not fit in 64 bits",
                            path(),
                            field.lsb,
                            field.width
                        )));
                    }

                    if let ValidValues::Values(values) = &field.valid
                        && values.is_empty()
                    {
                        return Err(RegMapError::MalformedSchema(format!(
                            "field {} has an empty valid list",
                            path()
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Look up a region entry by name
    pub fn region(&self, name: &str) -> Result<&RegionEntry, RegMapError> {
        self.default_map
            .get(name)
            .ok_or_else(|| RegMapError::UnknownRegion(name.to_string()))
    }

    /// Look up a block type entry by name
    pub fn block_type(&self, type_name: &str) -> Result<&BlockTypeEntry, RegMapError> {
        self.register_blocks
            .get(type_name)
            .ok_or_else(|| RegMapError::UnknownRegisterBlockType(type_name.to_string()))
    }
}

fn malformed(err: serde_json::Error) -> RegMapError {
    RegMapError::MalformedSchema(err.to_string())
}
