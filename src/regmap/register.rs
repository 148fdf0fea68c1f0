// ABOUTME: Register view computing offsets, absolute addresses and access permissions
// ABOUTME: Resolves every property on demand from the block type's register entry

use super::block::RegisterBlock;
use super::error::RegMapError;
use super::field::Field;
use super::map::RegisterMap;
use super::node::{MapNode, Node};
use super::schema::RegisterEntry;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

/// True if the access qualifier permits writes (`RW`, `WO`, `WOC`, `WOT`)
pub fn access_is_writeable(access_type: &str) -> bool {
    access_type.contains("RW") || access_type.contains("WO")
}

/// True if the access qualifier permits reads (anything without `WO`)
pub fn access_is_readable(access_type: &str) -> bool {
    !access_type.contains("WO")
}

/// View over one register of a block
///
/// Equality and hashing use the dotted `map.block.register` name.
#[derive(Debug, Clone)]
pub struct Register<'a> {
    block: RegisterBlock<'a>,
    name: String,
}

impl<'a> Register<'a> {
    /// Register length in bytes
    pub const LENGTH: u64 = 4;

    pub(crate) fn new(block: RegisterBlock<'a>, name: &str) -> Self {
        Self {
            block,
            name: name.to_string(),
        }
    }

    /// Register name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning block
    pub fn block(&self) -> RegisterBlock<'a> {
        self.block
    }

    /// Map this register belongs to
    pub fn map(&self) -> &'a RegisterMap {
        self.block.map()
    }

    pub(crate) fn entry(&self) -> Result<&'a RegisterEntry, RegMapError> {
        self.block
            .block_type_entry()?
            .registers
            .get(&self.name)
            .ok_or_else(|| {
                RegMapError::UnknownRegister(format!(
                    "{} has no register {}",
                    self.block.name(),
                    self.name
                ))
            })
    }

    /// Field names, sorted
    pub fn fields(&self) -> Result<Vec<&'a str>, RegMapError> {
        Ok(self.entry()?.fields.keys().map(String::as_str).collect())
    }

    /// Field names ordered by bit position, ties broken by name
    pub fn fields_by_lsb(&self) -> Result<Vec<&'a str>, RegMapError> {
        let mut fields: Vec<(u32, &'a str)> = self
            .entry()?
            .fields
            .iter()
            .map(|(name, field)| (field.lsb, name.as_str()))
            .collect();
        fields.sort();
        Ok(fields.into_iter().map(|(_, name)| name).collect())
    }

    /// Byte offset from the block base
    pub fn offset(&self) -> Result<u64, RegMapError> {
        Ok(self.entry()?.offset)
    }

    /// Base address of the owning block
    pub fn base_address(&self) -> Result<u64, RegMapError> {
        self.block.base_address()
    }

    /// Absolute address, block base plus offset
    pub fn address(&self) -> Result<u64, RegMapError> {
        Ok(self.block.base_address()?.wrapping_add(self.offset()?))
    }

    /// Register length in bytes
    pub fn length(&self) -> u64 {
        Self::LENGTH
    }

    /// Raw access qualifier string
    pub fn access_type(&self) -> Result<&'a str, RegMapError> {
        Ok(self.entry()?.access_type.as_str())
    }

    /// True if the access qualifier contains `RW` or `WO`
    pub fn is_writeable(&self) -> Result<bool, RegMapError> {
        Ok(access_is_writeable(self.access_type()?))
    }

    /// True if the access qualifier does not contain `WO`
    pub fn is_readable(&self) -> Result<bool, RegMapError> {
        Ok(access_is_readable(self.access_type()?))
    }

    /// First description line, if any
    pub fn description(&self) -> Result<Option<&'a str>, RegMapError> {
        Ok(self.entry()?.desc.first().map(String::as_str))
    }

    /// Field view by name, failing with `UnknownField` if absent
    pub fn field(&self, name: &str) -> Result<Field<'a>, RegMapError> {
        if !self.entry()?.fields.contains_key(name) {
            return Err(RegMapError::UnknownField(format!(
                "{} register does not have a field {name}",
                self.name
            )));
        }
        Ok(Field::new(self.clone(), name))
    }

    /// Iterate over the fields of this register in name order
    pub fn iter(&self) -> Result<impl Iterator<Item = Field<'a>> + use<'a>, RegMapError> {
        let register = self.clone();
        Ok(self
            .entry()?
            .fields
            .keys()
            .map(move |name| Field::new(register.clone(), name)))
    }

    /// Dotted `map.block.register` name
    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}", self.map().name(), self.block.name(), self.name)
    }
}

impl<'a> MapNode<'a> for Register<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn qualified_name(&self) -> String {
        Register::qualified_name(self)
    }

    fn children(&self) -> Result<Vec<&'a str>, RegMapError> {
        self.fields()
    }

    fn lookup(&self, name: &str) -> Result<Node<'a>, RegMapError> {
        self.field(name).map(Node::Field)
    }

    fn is_register(&self) -> bool {
        true
    }
}

impl PartialEq for Register<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name() == other.qualified_name()
    }
}

impl Eq for Register<'_> {}

impl Hash for Register<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified_name().hash(state);
    }
}

impl fmt::Display for Register<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}
