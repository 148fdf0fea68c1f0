// ABOUTME: Memory region view with base address and attribute pass-through
// ABOUTME: Any key on a memory region is read straight from its schema entry

use super::error::RegMapError;
use super::map::RegisterMap;
use super::node::{MapNode, Node};
use super::schema::RegionEntry;
use alloc::borrow::Cow;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use serde_json::Value;

/// View over a `memory` region
#[derive(Debug, Clone)]
pub struct Memory<'a> {
    map: &'a RegisterMap,
    name: String,
}

impl<'a> Memory<'a> {
    /// Bind a memory view to region `name`, without checking it exists
    pub fn new(map: &'a RegisterMap, name: &str) -> Self {
        Self {
            map,
            name: name.to_string(),
        }
    }

    /// Region name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Map this region belongs to
    pub fn map(&self) -> &'a RegisterMap {
        self.map
    }

    fn entry(&self) -> Result<&'a RegionEntry, RegMapError> {
        self.map.schema().region(&self.name)
    }

    /// Base address of this region
    pub fn base_address(&self) -> Result<u64, RegMapError> {
        self.entry()?.base.ok_or_else(|| {
            RegMapError::MissingBaseAddress(format!("memory {} has no base entry", self.name))
        })
    }

    /// Value of any key declared on the region, such as `size` or `region_type`
    pub fn attribute(&self, key: &str) -> Result<Cow<'a, Value>, RegMapError> {
        self.entry()?.get(key).ok_or_else(|| {
            RegMapError::UnknownRegion(format!("memory {} has no attribute {key}", self.name))
        })
    }

    /// Names of every key declared on the region, sorted
    pub fn attributes(&self) -> Result<Vec<&'a str>, RegMapError> {
        Ok(self.entry()?.keys())
    }

    /// Declared `is_readable` flag of the region
    ///
    /// Memory regions carry no access type, so the flag must be declared as
    /// a boolean key; otherwise this fails with `UnknownRegion`.
    pub fn is_readable(&self) -> Result<bool, RegMapError> {
        self.flag("is_readable")
    }

    /// Declared `is_writeable` flag of the region
    pub fn is_writeable(&self) -> Result<bool, RegMapError> {
        self.flag("is_writeable")
    }

    fn flag(&self, key: &str) -> Result<bool, RegMapError> {
        self.attribute(key)?.as_bool().ok_or_else(|| {
            RegMapError::UnknownRegion(format!(
                "memory {} attribute {key} is not a boolean",
                self.name
            ))
        })
    }

    /// Always true
    pub fn is_memory(&self) -> bool {
        true
    }

    /// Always false
    pub fn is_register_block(&self) -> bool {
        false
    }

    /// Always false
    pub fn is_register(&self) -> bool {
        false
    }
}

impl<'a> MapNode<'a> for Memory<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.map.name(), self.name)
    }

    fn children(&self) -> Result<Vec<&'a str>, RegMapError> {
        Ok(Vec::new())
    }

    fn lookup(&self, name: &str) -> Result<Node<'a>, RegMapError> {
        Err(RegMapError::UnknownRegion(format!(
            "memory {} has no child {name}",
            self.name
        )))
    }

    fn is_memory(&self) -> bool {
        true
    }
}

impl fmt::Display for Memory<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regmap::error::ErrorKind;

    fn test_map() -> RegisterMap {
        RegisterMap::from_json_str(
            r#"{
                "default_map": {
                    "fb0": {
                        "region_type": "memory",
                        "base": 1073741824,
                        "size": 8388608,
                        "description": "frame buffer",
                        "is_readable": true,
                        "is_writeable": false
                    },
                    "scratch": { "region_type": "memory" }
                }
            }"#,
            "soc",
        )
        .unwrap()
    }

    #[test]
    fn test_memory_base_address() {
        let map = test_map();
        let fb0 = Memory::new(&map, "fb0");
        assert_eq!(fb0.base_address(), Ok(0x4000_0000));
        assert!(fb0.is_memory());
        assert!(!fb0.is_register_block());
        assert!(!fb0.is_register());
        assert_eq!(fb0.to_string(), "fb0");
    }

    #[test]
    fn test_memory_base_failures() {
        let map = test_map();
        assert_eq!(
            Memory::new(&map, "scratch").base_address().unwrap_err().kind(),
            ErrorKind::MissingBaseAddress
        );
        assert_eq!(
            Memory::new(&map, "ghost").base_address().unwrap_err().kind(),
            ErrorKind::UnknownRegion
        );
    }

    #[test]
    fn test_attribute_pass_through() {
        let map = test_map();
        let fb0 = Memory::new(&map, "fb0");
        assert_eq!(*fb0.attribute("size").unwrap(), Value::from(0x80_0000u64));
        assert_eq!(
            fb0.attribute("description").unwrap().as_str(),
            Some("frame buffer")
        );
        assert_eq!(
            fb0.attributes().unwrap(),
            ["base", "description", "is_readable", "is_writeable", "region_type", "size"]
        );
        assert_eq!(
            fb0.attribute("alignment").unwrap_err().kind(),
            ErrorKind::UnknownRegion
        );
    }

    #[test]
    fn test_attribute_reads_typed_keys() {
        let map = test_map();
        let fb0 = Memory::new(&map, "fb0");
        assert_eq!(
            fb0.attribute("region_type").unwrap().as_str(),
            Some("memory")
        );
        assert_eq!(fb0.attribute("base").unwrap().as_u64(), Some(0x4000_0000));
        assert_eq!(
            fb0.attribute("register_block_type").unwrap_err().kind(),
            ErrorKind::UnknownRegion
        );

        let scratch = Memory::new(&map, "scratch");
        assert_eq!(scratch.attributes().unwrap(), ["region_type"]);
        assert_eq!(
            scratch.attribute("base").unwrap_err().kind(),
            ErrorKind::UnknownRegion
        );
    }

    #[test]
    fn test_access_flags() {
        let map = test_map();
        let fb0 = Memory::new(&map, "fb0");
        assert_eq!(fb0.is_readable(), Ok(true));
        assert_eq!(fb0.is_writeable(), Ok(false));

        let scratch = Memory::new(&map, "scratch");
        assert_eq!(
            scratch.is_readable().unwrap_err().kind(),
            ErrorKind::UnknownRegion
        );
        assert_eq!(
            Memory::new(&map, "fb0").flag("size").unwrap_err().kind(),
            ErrorKind::UnknownRegion
        );
    }

    #[test]
    fn test_memory_has_no_children() {
        let map = test_map();
        let fb0 = Memory::new(&map, "fb0");
        assert!(fb0.children().unwrap().is_empty());
        assert_eq!(
            fb0.lookup("anything").unwrap_err().kind(),
            ErrorKind::UnknownRegion
        );
    }
}
