// ABOUTME: Register map library resolving symbolic register names to addresses and masks
// ABOUTME: Provides typed views over blocks, registers and bit-fields of a JSON register map

//! # Register Map
//!
//! Resolve symbolic names like `block.register.field` from a hardware
//! register-map description into addresses, bit masks and decoded values.
//!
//! ## Quick Start
//!
//! ```rust
//! # use register_map::{MapNode, RegMapError, RegisterMap};
//! # fn main() -> Result<(), RegMapError> {
//! let json = r#"{
//!     "default_map": {
//!         "bank1": { "region_type": "register_block", "register_block_type": "bankA", "base": 4096 },
//!         "fb0": { "region_type": "memory", "base": 1073741824 }
//!     },
//!     "register_blocks": {
//!         "bankA": { "registers": {
//!             "status": { "offset": 4, "type": "RW", "fields": {
//!                 "field1": { "lsb": 2, "width": 3 }
//!             } }
//!         } }
//!     }
//! }"#;
//!
//! let map = RegisterMap::from_json_str(json, "soc")?;
//!
//! let status = map.register_block("bank1")?.register("status");
//! assert_eq!(status.address()?, 0x1004);
//! assert!(status.is_writeable()?);
//!
//! let field1 = status.field("field1")?;
//! assert_eq!(field1.mask()?, 0b11100);
//! assert_eq!(field1.extract_value(0b1110_1100)?, 0b011);
//!
//! // Generic walk over every region, register and field
//! for node in map.walk() {
//!     println!("{}", node?.qualified_name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Typed schema**: JSON is decoded once into checked records
//! - **Lazy views**: blocks, registers and fields borrow the map, nothing is copied
//! - **Deterministic**: regions, registers and fields enumerate in sorted order
//! - **`no_std` compatible**: works with `alloc`; `std` adds `load_map` for files
//!
//! ## Main Types
//!
//! - [`RegisterMap`] - Root of every lookup
//! - [`Region`] - A register block or memory region
//! - [`RegisterBlock`], [`Register`], [`Field`], [`Memory`] - Resolver views
//! - [`Node`] / [`MapNode`] - Uniform name based navigation
//! - [`RegMapError`] - Lookup and schema errors

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod regmap;


// Re-export main types
pub use regmap::{
    BlockTypeEntry, ErrorKind, Field, FieldEntry, MapNode, Memory, Node, NodeWalker, RegMapError,
    Region, RegionEntry, RegionIter, RegionKind, Register, RegisterBlock, RegisterEntry,
    RegisterMap, Schema, ValidRange, ValidValues,
};

#[cfg(feature = "std")]
pub use regmap::load_map;

// Re-export bit helpers
pub use regmap::field::field_mask;
pub use regmap::register::{access_is_readable, access_is_writeable};
