// ABOUTME: Common navigation interface over blocks, memories, registers and fields
// ABOUTME: Provides the Node sum type and a depth-first walker over a whole map

use super::block::RegisterBlock;
use super::error::RegMapError;
use super::field::Field;
use super::map::{Region, RegisterMap};
use super::memory::Memory;
use super::register::Register;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use log::warn;

/// Name based navigation shared by every view
pub trait MapNode<'a> {
    /// Local name of this node
    fn name(&self) -> &str;

    /// Dotted name starting at the map
    fn qualified_name(&self) -> String;

    /// Names of the child nodes, sorted
    fn children(&self) -> Result<Vec<&'a str>, RegMapError>;

    /// Resolve a child node by name
    fn lookup(&self, name: &str) -> Result<Node<'a>, RegMapError>;

    /// True for register block regions
    fn is_register_block(&self) -> bool {
        false
    }

    /// True for memory regions
    fn is_memory(&self) -> bool {
        false
    }

    /// True for registers
    fn is_register(&self) -> bool {
        false
    }

    /// True for bit-fields
    fn is_field(&self) -> bool {
        false
    }
}

/// Any view reachable from a [`RegisterMap`]
#[derive(Debug, Clone)]
pub enum Node<'a> {
    /// Register block region
    Block(RegisterBlock<'a>),
    /// Memory region
    Memory(Memory<'a>),
    /// Register within a block
    Register(Register<'a>),
    /// Bit-field within a register
    Field(Field<'a>),
}

impl<'a> Node<'a> {
    fn inner(&self) -> &dyn MapNode<'a> {
        match self {
            Node::Block(block) => block,
            Node::Memory(memory) => memory,
            Node::Register(register) => register,
            Node::Field(field) => field,
        }
    }

    /// Block view, if this node is one
    pub fn as_block(&self) -> Option<&RegisterBlock<'a>> {
        match self {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Memory view, if this node is one
    pub fn as_memory(&self) -> Option<&Memory<'a>> {
        match self {
            Node::Memory(memory) => Some(memory),
            _ => None,
        }
    }

    /// Register view, if this node is one
    pub fn as_register(&self) -> Option<&Register<'a>> {
        match self {
            Node::Register(register) => Some(register),
            _ => None,
        }
    }

    /// Field view, if this node is one
    pub fn as_field(&self) -> Option<&Field<'a>> {
        match self {
            Node::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Absolute address: region base, or register address for registers and fields
    pub fn address(&self) -> Result<u64, RegMapError> {
        match self {
            Node::Block(block) => block.base_address(),
            Node::Memory(memory) => memory.base_address(),
            Node::Register(register) => register.address(),
            Node::Field(field) => field.address(),
        }
    }
}

impl<'a> MapNode<'a> for Node<'a> {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn qualified_name(&self) -> String {
        self.inner().qualified_name()
    }

    fn children(&self) -> Result<Vec<&'a str>, RegMapError> {
        self.inner().children()
    }

    fn lookup(&self, name: &str) -> Result<Node<'a>, RegMapError> {
        self.inner().lookup(name)
    }

    fn is_register_block(&self) -> bool {
        matches!(self, Node::Block(_))
    }

    fn is_memory(&self) -> bool {
        matches!(self, Node::Memory(_))
    }

    fn is_register(&self) -> bool {
        matches!(self, Node::Register(_))
    }

    fn is_field(&self) -> bool {
        matches!(self, Node::Field(_))
    }
}

impl<'a> From<Region<'a>> for Node<'a> {
    fn from(region: Region<'a>) -> Self {
        match region {
            Region::Block(block) => Node::Block(block),
            Region::Memory(memory) => Node::Memory(memory),
        }
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Block(block) => fmt::Display::fmt(block, f),
            Node::Memory(memory) => fmt::Display::fmt(memory, f),
            Node::Register(register) => fmt::Display::fmt(register, f),
            Node::Field(field) => fmt::Display::fmt(field, f),
        }
    }
}

/// Depth-first traversal of every node in a map
///
/// Regions come in name order, each followed by its registers and their
/// fields. A node whose children cannot be listed yields the error right
/// after the node and its subtree is skipped.
pub struct NodeWalker<'a> {
    stack: Vec<Result<Node<'a>, RegMapError>>,
}

impl<'a> NodeWalker<'a> {
    pub(crate) fn new(map: &'a RegisterMap) -> Self {
        let stack = map
            .regions()
            .into_iter()
            .rev()
            .map(|name| map.region(name).map(Node::from))
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for NodeWalker<'a> {
    type Item = Result<Node<'a>, RegMapError>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = match self.stack.pop()? {
            Ok(node) => node,
            Err(err) => {
                warn!("register map walk: {err}");
                return Some(Err(err));
            }
        };

        match node.children() {
            // Push in reverse so children come off the stack in order
            Ok(children) => {
                for child in children.into_iter().rev() {
                    self.stack.push(node.lookup(child));
                }
            }
            Err(err) => self.stack.push(Err(err)),
        }

        Some(Ok(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regmap::error::ErrorKind;
    use alloc::string::ToString;

    fn test_map() -> RegisterMap {
        RegisterMap::from_json_str(
            r#"{
                "default_map": {
                    "bank1": { "region_type": "register_block", "register_block_type": "bankA", "base": 4096 },
                    "fb0": { "region_type": "memory", "base": 1073741824 },
                    "broken": { "region_type": "register_block", "register_block_type": "missing" }
                },
                "register_blocks": {
                    "bankA": { "registers": {
                        "status": { "offset": 4, "type": "RW", "fields": {
                            "field1": { "lsb": 2, "width": 3 },
                            "busy": { "lsb": 0, "width": 1 }
                        } },
                        "ctrl": { "offset": 0, "type": "WO" }
                    } }
                }
            }"#,
            "soc",
        )
        .unwrap()
    }

    #[test]
    fn test_node_classification() {
        let map = test_map();
        let block: Node = map.region("bank1").unwrap().into();
        assert!(block.is_register_block());
        assert!(!block.is_memory());
        assert!(block.as_block().is_some());

        let register = block.lookup("status").unwrap();
        assert!(register.is_register());
        assert_eq!(register.qualified_name(), "soc.bank1.status");
        assert_eq!(register.address(), Ok(0x1004));

        let field = register.lookup("field1").unwrap();
        assert!(field.is_field());
        assert_eq!(field.name(), "field1");
        assert_eq!(field.as_field().unwrap().mask(), Ok(0b11100));
    }

    #[test]
    fn test_walk_order() {
        let map = test_map();
        let visited: Vec<_> = map
            .walk()
            .map(|node| match node {
                Ok(node) => node.qualified_name(),
                Err(err) => alloc::format!("{:?}", err.kind()),
            })
            .collect();

        assert_eq!(
            visited,
            [
                "soc.bank1",
                "soc.bank1.ctrl",
                "soc.bank1.status",
                "soc.bank1.status.busy",
                "soc.bank1.status.field1",
                "soc.broken",
                "UnknownRegisterBlockType",
                "soc.fb0",
            ]
        );
    }

    #[test]
    fn test_walk_reports_error_once() {
        let map = test_map();
        let errors: Vec<_> = map.walk().filter_map(Result::err).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::UnknownRegisterBlockType);
    }

    #[test]
    fn test_node_display() {
        let map = test_map();
        let memory: Node = map.region("fb0").unwrap().into();
        assert_eq!(memory.to_string(), "fb0");
        let field = map.resolve("bank1.status.busy").unwrap();
        assert_eq!(field.to_string(), "soc.bank1.status.busy");
    }
}
