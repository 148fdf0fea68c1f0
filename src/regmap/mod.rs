// ABOUTME: Register map resolution module over a decoded JSON schema
// ABOUTME: Provides no_std compatible views for regions, registers and bit-fields

pub mod block;
pub mod error;
pub mod field;
pub mod map;
pub mod memory;
pub mod node;
pub mod register;
pub mod schema;

pub use block::RegisterBlock;
pub use error::{ErrorKind, RegMapError};
pub use field::{Field, ValidRange};
#[cfg(feature = "std")]
pub use map::load_map;
pub use map::{Region, RegionIter, RegionKind, RegisterMap};
pub use memory::Memory;
pub use node::{MapNode, Node, NodeWalker};
pub use register::Register;
pub use schema::{BlockTypeEntry, FieldEntry, RegionEntry, RegisterEntry, Schema, ValidValues};
