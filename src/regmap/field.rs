// ABOUTME: Bit-field view computing masks, extracted values and valid ranges
// ABOUTME: All arithmetic is recomputed from the schema on every call

use super::error::RegMapError;
use super::map::RegisterMap;
use super::node::{MapNode, Node};
use super::register::Register;
use super::schema::{FieldEntry, ValidValues};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use serde_json::Value;

/// Mask covering `width` bits starting at `lsb`
///
/// Bits shifted past bit 63 are dropped; a zero width gives an empty mask.
pub fn field_mask(lsb: u32, width: u32) -> u64 {
    let ones = u64::MAX.checked_shr(64u32.saturating_sub(width)).unwrap_or(0);
    ones.checked_shl(lsb).unwrap_or(0)
}

/// Range of permitted values declared for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidRange {
    /// Unconstrained, the `("all", "all")` sentinel
    All,
    /// Smallest and largest declared value
    Range {
        /// Minimum permitted value
        min: i64,
        /// Maximum permitted value
        max: i64,
    },
}

impl ValidRange {
    /// True for the unconstrained sentinel
    pub fn is_all(&self) -> bool {
        matches!(self, ValidRange::All)
    }

    /// Check a value against the range; `All` accepts everything
    pub fn contains(&self, value: i64) -> bool {
        match self {
            ValidRange::All => true,
            ValidRange::Range { min, max } => (*min..=*max).contains(&value),
        }
    }
}

impl fmt::Display for ValidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidRange::All => write!(f, "(all, all)"),
            ValidRange::Range { min, max } => write!(f, "({min}, {max})"),
        }
    }
}

/// View over one bit-field of a register
#[derive(Debug, Clone)]
pub struct Field<'a> {
    register: Register<'a>,
    name: String,
}

impl<'a> Field<'a> {
    pub(crate) fn new(register: Register<'a>, name: &str) -> Self {
        Self {
            register,
            name: name.to_string(),
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning register
    pub fn register(&self) -> &Register<'a> {
        &self.register
    }

    /// Map this field belongs to
    pub fn map(&self) -> &'a RegisterMap {
        self.register.map()
    }

    fn entry(&self) -> Result<&'a FieldEntry, RegMapError> {
        self.register.entry()?.fields.get(&self.name).ok_or_else(|| {
            RegMapError::UnknownField(format!(
                "{} register does not have a field {}",
                self.register.name(),
                self.name
            ))
        })
    }

    /// Least significant bit position
    pub fn lsb(&self) -> Result<u32, RegMapError> {
        Ok(self.entry()?.lsb)
    }

    /// Width in bits
    pub fn width(&self) -> Result<u32, RegMapError> {
        Ok(self.entry()?.width)
    }

    /// `((1 << width) - 1) << lsb`
    pub fn mask(&self) -> Result<u64, RegMapError> {
        let entry = self.entry()?;
        Ok(field_mask(entry.lsb, entry.width))
    }

    /// Address of the owning register
    pub fn address(&self) -> Result<u64, RegMapError> {
        self.register.address()
    }

    /// Decode this field from a raw register value
    ///
    /// Pure arithmetic on a caller supplied value, no register access.
    pub fn extract_value(&self, raw_register_value: u64) -> Result<u64, RegMapError> {
        let entry = self.entry()?;
        let mask = field_mask(entry.lsb, entry.width);
        Ok((raw_register_value & mask) >> entry.lsb)
    }

    /// Minimum and maximum of the declared `valid` list, or `All`
    pub fn valid_range(&self) -> Result<ValidRange, RegMapError> {
        Ok(match &self.entry()?.valid {
            ValidValues::All => ValidRange::All,
            ValidValues::Values(values) => {
                match (values.iter().min(), values.iter().max()) {
                    (Some(&min), Some(&max)) => ValidRange::Range { min, max },
                    _ => ValidRange::All,
                }
            }
        })
    }

    /// printf-style hex template sized to the field, `0x%0Nx` with `N = ceil(width / 4)`
    pub fn width_format_hint(&self) -> Result<String, RegMapError> {
        Ok(format!("0x%0{}x", hex_digits(self.width()?)))
    }

    /// Render a field value as zero padded hex, as the width hint describes
    pub fn format_value(&self, value: u64) -> Result<String, RegMapError> {
        let digits = hex_digits(self.width()?) as usize;
        Ok(format!("0x{value:0digits$x}"))
    }

    /// Any other key declared on the field entry
    pub fn attribute(&self, key: &str) -> Result<&'a Value, RegMapError> {
        self.entry()?.attributes.get(key).ok_or_else(|| {
            RegMapError::UnknownField(format!("field {} has no attribute {key}", self.name))
        })
    }

    /// Dotted `map.block.register.field` name
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.register.qualified_name(), self.name)
    }
}

fn hex_digits(width: u32) -> u32 {
    width.div_ceil(4)
}

impl<'a> MapNode<'a> for Field<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn qualified_name(&self) -> String {
        Field::qualified_name(self)
    }

    fn children(&self) -> Result<Vec<&'a str>, RegMapError> {
        Ok(Vec::new())
    }

    fn lookup(&self, name: &str) -> Result<Node<'a>, RegMapError> {
        Err(RegMapError::UnknownField(format!(
            "field {} has no child {name}",
            self.name
        )))
    }

    fn is_field(&self) -> bool {
        true
    }
}

impl PartialEq for Field<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name() == other.qualified_name()
    }
}

impl Eq for Field<'_> {}

impl Hash for Field<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified_name().hash(state);
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
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
                    "bank1": { "region_type": "register_block", "register_block_type": "bankA", "base": 4096 }
                },
                "register_blocks": {
                    "bankA": { "registers": {
                        "status": {
                            "offset": 4,
                            "type": "RW",
                            "fields": {
                                "field1": { "lsb": 2, "width": 3 },
                                "even": { "lsb": 8, "width": 3, "valid": [6, 0, 4, 2] },
                                "any": { "lsb": 11, "width": 1, "valid": "all" },
                                "wide": { "lsb": 0, "width": 64 },
                                "top": { "lsb": 48, "width": 13, "reset": 0 },
                                "bias": { "lsb": 16, "width": 4, "valid": [3, -2, 0, -8] }
                            }
                        }
                    } }
                }
            }"#,
            "soc",
        )
        .unwrap()
    }

    fn field<'a>(map: &'a RegisterMap, name: &str) -> Field<'a> {
        map.register_block("bank1")
            .unwrap()
            .register("status")
            .field(name)
            .unwrap()
    }

    #[test]
    fn test_field_mask_helper() {
        assert_eq!(field_mask(2, 3), 0b11100);
        assert_eq!(field_mask(0, 1), 1);
        assert_eq!(field_mask(0, 64), u64::MAX);
        assert_eq!(field_mask(63, 1), 1 << 63);
        assert_eq!(field_mask(4, 0), 0);
    }

    #[test]
    fn test_mask_matches_formula() {
        let map = test_map();
        for name in ["field1", "even", "any", "top"] {
            let f = field(&map, name);
            let (lsb, width) = (f.lsb().unwrap(), f.width().unwrap());
            assert_eq!(f.mask().unwrap(), ((1u64 << width) - 1) << lsb, "{name}");
        }
        assert_eq!(field(&map, "wide").mask(), Ok(u64::MAX));
    }

    #[test]
    fn test_extract_value() {
        let map = test_map();
        let f = field(&map, "field1");
        assert_eq!(f.mask(), Ok(0b11100));
        assert_eq!(f.extract_value(0b1110_1100), Ok(0b011));

        for raw in [0u64, 1, 0xff, 0xdead_beef, u64::MAX] {
            let mask = f.mask().unwrap();
            let lsb = f.lsb().unwrap();
            assert_eq!(f.extract_value(raw), Ok((raw & mask) >> lsb));
        }

        assert_eq!(field(&map, "wide").extract_value(0x1234), Ok(0x1234));
    }

    #[test]
    fn test_valid_range() {
        let map = test_map();
        assert_eq!(
            field(&map, "even").valid_range(),
            Ok(ValidRange::Range { min: 0, max: 6 })
        );
        assert_eq!(field(&map, "any").valid_range(), Ok(ValidRange::All));
        assert_eq!(field(&map, "field1").valid_range(), Ok(ValidRange::All));

        let range = field(&map, "even").valid_range().unwrap();
        assert!(!range.is_all());
        assert!(range.contains(5));
        assert!(!range.contains(7));
        assert_eq!(range.to_string(), "(0, 6)");
        assert_eq!(ValidRange::All.to_string(), "(all, all)");
    }

    #[test]
    fn test_valid_range_with_negative_values() {
        let map = test_map();
        let range = field(&map, "bias").valid_range().unwrap();
        assert_eq!(range, ValidRange::Range { min: -8, max: 3 });
        assert!(range.contains(-8));
        assert!(range.contains(0));
        assert!(!range.contains(-9));
        assert_eq!(range.to_string(), "(-8, 3)");
    }

    #[test]
    fn test_width_format_hint() {
        let map = test_map();
        assert_eq!(field(&map, "field1").width_format_hint().unwrap(), "0x%01x");
        assert_eq!(field(&map, "top").width_format_hint().unwrap(), "0x%04x");
        assert_eq!(field(&map, "wide").width_format_hint().unwrap(), "0x%016x");
        assert_eq!(field(&map, "top").format_value(0xab).unwrap(), "0x00ab");
    }

    #[test]
    fn test_field_attribute() {
        let map = test_map();
        assert_eq!(field(&map, "top").attribute("reset"), Ok(&Value::from(0u64)));
        assert_eq!(
            field(&map, "top").attribute("missing").unwrap_err().kind(),
            ErrorKind::UnknownField
        );
    }

    #[test]
    fn test_field_identity() {
        let map = test_map();
        let f = field(&map, "field1");
        assert_eq!(f.to_string(), "soc.bank1.status.field1");
        assert_eq!(f, field(&map, "field1"));
        assert_ne!(f, field(&map, "even"));
        assert_eq!(f.address(), Ok(0x1004));
        assert!(f.children().unwrap().is_empty());
        assert_eq!(f.lookup("x").unwrap_err().kind(), ErrorKind::UnknownField);
    }
}
