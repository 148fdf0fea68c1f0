// ABOUTME: Error types for register map resolution
// ABOUTME: Provides no_std compatible lookup and schema errors with a kind tag

use alloc::string::String;
use core::fmt;

/// Kind tag for a [`RegMapError`], for branching without matching on messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Region name absent from `default_map`, or its kind is unrecognized
    UnknownRegion,
    /// Register block type has no entry in `register_blocks`
    UnknownRegisterBlockType,
    /// Register name absent from its block type
    UnknownRegister,
    /// Field name absent from its register
    UnknownField,
    /// Region is known but has no `base` entry
    MissingBaseAddress,
    /// Schema could not be decoded or violates a layout rule
    MalformedSchema,
    /// Schema file could not be read
    Io,
}

/// Main error type for register map operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegMapError {
    /// Unknown region name or unrecognized region kind
    UnknownRegion(String),
    /// Register block type missing from `register_blocks`
    UnknownRegisterBlockType(String),
    /// Register missing from its block type
    UnknownRegister(String),
    /// Field missing from its register
    UnknownField(String),
    /// Region without a base address
    MissingBaseAddress(String),
    /// Schema decode or validation failure
    MalformedSchema(String),
    /// Failure reading a schema file
    Io(String),
}

impl RegMapError {
    /// Kind tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegMapError::UnknownRegion(_) => ErrorKind::UnknownRegion,
            RegMapError::UnknownRegisterBlockType(_) => ErrorKind::UnknownRegisterBlockType,
            RegMapError::UnknownRegister(_) => ErrorKind::UnknownRegister,
            RegMapError::UnknownField(_) => ErrorKind::UnknownField,
            RegMapError::MissingBaseAddress(_) => ErrorKind::MissingBaseAddress,
            RegMapError::MalformedSchema(_) => ErrorKind::MalformedSchema,
            RegMapError::Io(_) => ErrorKind::Io,
        }
    }

    /// Descriptive message carried by this error
    pub fn message(&self) -> &str {
        match self {
            RegMapError::UnknownRegion(msg)
            | RegMapError::UnknownRegisterBlockType(msg)
            | RegMapError::UnknownRegister(msg)
            | RegMapError::UnknownField(msg)
            | RegMapError::MissingBaseAddress(msg)
            | RegMapError::MalformedSchema(msg)
            | RegMapError::Io(msg) => msg,
        }
    }
}

impl fmt::Display for RegMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegMapError::UnknownRegion(msg) => write!(f, "unknown region: {msg}"),
            RegMapError::UnknownRegisterBlockType(msg) => {
                write!(f, "unknown register block type: {msg}")
            }
            RegMapError::UnknownRegister(msg) => write!(f, "unknown register: {msg}"),
            RegMapError::UnknownField(msg) => write!(f, "unknown field: {msg}"),
            RegMapError::MissingBaseAddress(msg) => write!(f, "missing base address: {msg}"),
            RegMapError::MalformedSchema(msg) => write!(f, "malformed schema: {msg}"),
            RegMapError::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegMapError {}
