// ABOUTME: Root register map view classifying regions and resolving dotted paths
// ABOUTME: Provides the RegisterMap entry point, the Region sum type and region iteration

use super::block::RegisterBlock;
use super::error::RegMapError;
use super::memory::Memory;
use super::node::{MapNode, Node, NodeWalker};
use super::schema::{REGION_TYPE_MEMORY, REGION_TYPE_REGISTER_BLOCK, RegionEntry, Schema};
use alloc::collections::btree_map;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use log::trace;

/// Declared kind of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// `register_block`
    RegisterBlock,
    /// `memory`
    Memory,
}

impl RegionKind {
    /// Classify a `region_type` value
    pub fn from_region_type(region_type: &str) -> Option<Self> {
        match region_type {
            REGION_TYPE_REGISTER_BLOCK => Some(RegionKind::RegisterBlock),
            REGION_TYPE_MEMORY => Some(RegionKind::Memory),
            _ => None,
        }
    }

    fn of(entry: &RegionEntry) -> Option<Self> {
        entry.region_type.as_deref().and_then(Self::from_region_type)
    }
}

/// Top-level region of a map, classified once by its declared kind
#[derive(Debug, Clone)]
pub enum Region<'a> {
    /// Register block region
    Block(RegisterBlock<'a>),
    /// Memory region
    Memory(Memory<'a>),
}

impl<'a> Region<'a> {
    /// Region name
    pub fn name(&self) -> &str {
        match self {
            Region::Block(block) => block.name(),
            Region::Memory(memory) => memory.name(),
        }
    }

    /// Base address of the region
    pub fn base_address(&self) -> Result<u64, RegMapError> {
        match self {
            Region::Block(block) => block.base_address(),
            Region::Memory(memory) => memory.base_address(),
        }
    }

    /// Kind of this region
    pub fn kind(&self) -> RegionKind {
        match self {
            Region::Block(_) => RegionKind::RegisterBlock,
            Region::Memory(_) => RegionKind::Memory,
        }
    }

    /// True for register block regions
    pub fn is_register_block(&self) -> bool {
        matches!(self, Region::Block(_))
    }

    /// True for memory regions
    pub fn is_memory(&self) -> bool {
        matches!(self, Region::Memory(_))
    }
}

impl fmt::Display for Region<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Register map over one schema, the entry point for every lookup
#[derive(Debug, Clone)]
pub struct RegisterMap {
    schema: Schema,
    name: String,
}

impl RegisterMap {
    /// Create a map from a decoded schema and a display name
    pub fn new(schema: Schema, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
        }
    }

    /// Decode a schema from JSON text and wrap it in a map
    pub fn from_json_str(json: &str, name: impl Into<String>) -> Result<Self, RegMapError> {
        Ok(Self::new(Schema::from_json_str(json)?, name))
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Region names, sorted
    pub fn regions(&self) -> Vec<&str> {
        self.schema.default_map.keys().map(String::as_str).collect()
    }

    /// Classify and return region `name`
    pub fn region(&self, name: &str) -> Result<Region<'_>, RegMapError> {
        let entry = self.schema.region(name)?;
        let kind = RegionKind::of(entry).ok_or_else(|| {
            RegMapError::UnknownRegion(format!(
                "region {name} has unrecognized region_type {:?}",
                entry.region_type.as_deref().unwrap_or("")
            ))
        })?;
        trace!("region {name} classified as {kind:?}");

        Ok(match kind {
            RegionKind::RegisterBlock => Region::Block(RegisterBlock::new(self, name)?),
            RegionKind::Memory => Region::Memory(Memory::new(self, name)),
        })
    }

    /// True if `name` is a register block region; never fails
    pub fn is_register_block(&self, name: &str) -> bool {
        self.kind_of(name) == Some(RegionKind::RegisterBlock)
    }

    /// True if `name` is a memory region; never fails
    pub fn is_memory(&self, name: &str) -> bool {
        self.kind_of(name) == Some(RegionKind::Memory)
    }

    fn kind_of(&self, name: &str) -> Option<RegionKind> {
        self.schema.default_map.get(name).and_then(RegionKind::of)
    }

    /// Region `name` as a register block, failing with `UnknownRegion` otherwise
    pub fn register_block(&self, name: &str) -> Result<RegisterBlock<'_>, RegMapError> {
        match self.region(name)? {
            Region::Block(block) => Ok(block),
            Region::Memory(_) => Err(RegMapError::UnknownRegion(format!(
                "region {name} is not a register block"
            ))),
        }
    }

    /// Region `name` as a memory region, failing with `UnknownRegion` otherwise
    pub fn memory(&self, name: &str) -> Result<Memory<'_>, RegMapError> {
        match self.region(name)? {
            Region::Memory(memory) => Ok(memory),
            Region::Block(_) => Err(RegMapError::UnknownRegion(format!(
                "region {name} is not a memory region"
            ))),
        }
    }

    /// Follow a dotted `region.register.field` path
    pub fn resolve(&self, path: &str) -> Result<Node<'_>, RegMapError> {
        trace!("resolving {}.{path}", self.name);
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        if first.is_empty() {
            return Err(RegMapError::UnknownRegion(path.to_string()));
        }

        let mut node = Node::from(self.region(first)?);
        for segment in segments {
            node = node.lookup(segment)?;
        }
        Ok(node)
    }

    /// Iterate over every region in name order
    pub fn iter(&self) -> RegionIter<'_> {
        RegionIter {
            map: self,
            names: self.schema.default_map.keys(),
        }
    }

    /// Depth-first walk over regions, registers and fields
    pub fn walk(&self) -> NodeWalker<'_> {
        NodeWalker::new(self)
    }
}

impl fmt::Display for RegisterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<'a> IntoIterator for &'a RegisterMap {
    type Item = Result<Region<'a>, RegMapError>;
    type IntoIter = RegionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the regions of a map in name order
pub struct RegionIter<'a> {
    map: &'a RegisterMap,
    names: btree_map::Keys<'a, String, RegionEntry>,
}

impl<'a> Iterator for RegionIter<'a> {
    type Item = Result<Region<'a>, RegMapError>;

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.map;
        self.names.next().map(|name| map.region(name))
    }
}

/// Load a JSON schema file into a map named after the file
///
/// The display name is the file name up to its first `.`, so
/// `maps/test_data.json` becomes `test_data`.
#[cfg(feature = "std")]
pub fn load_map<P: AsRef<std::path::Path>>(path: P) -> Result<RegisterMap, RegMapError> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|err| RegMapError::Io(format!("{}: {err}", path.display())))?;
    let schema = Schema::from_slice(&data)?;

    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .unwrap_or("undefined");
    log::debug!("loaded register map {name} from {}", path.display());

    Ok(RegisterMap::new(schema, name))
}
