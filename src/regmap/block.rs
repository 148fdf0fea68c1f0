// ABOUTME: Register block view resolving base addresses and register catalogs
// ABOUTME: Binds one default_map region to its shared block type layout

use super::error::RegMapError;
use super::map::RegisterMap;
use super::node::{MapNode, Node};
use super::register::Register;
use super::schema::{BlockTypeEntry, REGION_TYPE_REGISTER_BLOCK};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// View over a `register_block` region
///
/// The block type is resolved once, when the view is built.
#[derive(Debug, Clone, Copy)]
pub struct RegisterBlock<'a> {
    map: &'a RegisterMap,
    name: &'a str,
    block_type: &'a str,
}

impl<'a> RegisterBlock<'a> {
    /// Bind a block view to region `name`
    ///
    /// Fails with `UnknownRegion` if the region is missing, is not declared as
    /// a `register_block`, or has no `register_block_type`.
    pub fn new(map: &'a RegisterMap, name: &str) -> Result<Self, RegMapError> {
        let (name, entry) = map
            .schema()
            .default_map
            .get_key_value(name)
            .ok_or_else(|| RegMapError::UnknownRegion(name.to_string()))?;

        if entry.region_type.as_deref() != Some(REGION_TYPE_REGISTER_BLOCK) {
            return Err(RegMapError::UnknownRegion(format!(
                "region {name} is not a register block"
            )));
        }

        let block_type = entry.register_block_type.as_deref().ok_or_else(|| {
            RegMapError::UnknownRegion(format!("region {name} has no register_block_type"))
        })?;

        Ok(Self {
            map,
            name: name.as_str(),
            block_type,
        })
    }

    /// Region name
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Name of the shared block type
    pub fn block_type(&self) -> &'a str {
        self.block_type
    }

    /// Map this block belongs to
    pub fn map(&self) -> &'a RegisterMap {
        self.map
    }

    /// Base address of this block
    pub fn base_address(&self) -> Result<u64, RegMapError> {
        self.map.schema().region(self.name)?.base.ok_or_else(|| {
            RegMapError::MissingBaseAddress(format!(
                "register block {} has no base entry",
                self.name
            ))
        })
    }

    pub(crate) fn block_type_entry(&self) -> Result<&'a BlockTypeEntry, RegMapError> {
        self.map.schema().block_type(self.block_type)
    }

    /// Register names, sorted
    pub fn registers(&self) -> Result<Vec<&'a str>, RegMapError> {
        Ok(self
            .block_type_entry()?
            .registers
            .keys()
            .map(String::as_str)
            .collect())
    }

    /// Register names ordered by absolute address, ties broken by name
    pub fn registers_by_address(&self) -> Result<Vec<&'a str>, RegMapError> {
        let base = self.base_address()?;
        let mut registers: Vec<(u64, &'a str)> = self
            .block_type_entry()?
            .registers
            .iter()
            .map(|(name, entry)| (base.wrapping_add(entry.offset), name.as_str()))
            .collect();
        registers.sort();
        Ok(registers.into_iter().map(|(_, name)| name).collect())
    }

    /// Register view bound to this block
    ///
    /// The name is not checked here; the register's own lookups report
    /// `UnknownRegister`.
    pub fn register(&self, name: &str) -> Register<'a> {
        Register::new(*self, name)
    }

    /// Iterate over the registers of this block in name order
    pub fn iter(&self) -> Result<impl Iterator<Item = Register<'a>> + use<'a>, RegMapError> {
        let block = *self;
        Ok(self
            .block_type_entry()?
            .registers
            .keys()
            .map(move |name| Register::new(block, name)))
    }

    /// Always true
    pub fn is_register_block(&self) -> bool {
        true
    }

    /// Always false
    pub fn is_memory(&self) -> bool {
        false
    }
}

impl<'a> MapNode<'a> for RegisterBlock<'a> {
    fn name(&self) -> &str {
        self.name
    }

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.map.name(), self.name)
    }

    fn children(&self) -> Result<Vec<&'a str>, RegMapError> {
        self.registers()
    }

    fn lookup(&self, name: &str) -> Result<Node<'a>, RegMapError> {
        if !self.block_type_entry()?.registers.contains_key(name) {
            return Err(RegMapError::UnknownRegister(format!(
                "{} has no register {name}",
                self.name
            )));
        }
        Ok(Node::Register(self.register(name)))
    }

    fn is_register_block(&self) -> bool {
        true
    }
}

impl fmt::Display for RegisterBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
