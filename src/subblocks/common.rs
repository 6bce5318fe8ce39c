//! Field descriptions, layout compilation, and byte parsing helpers.
//!
//! This module provides:
//! - [`Field`]: a declarative description of one slot in a sub-block
//! - [`CompiledLayout`]: a field list compiled into a byte offset table
//! - Little-endian read helpers shared by the decoders
//!
//! A CORSIKA sub-block is a fixed-size run of 4-byte words; each field is
//! addressed by a 1-based word position, so a field at position `p` starts
//! at byte offset `(p - 1) * 4`.

use crate::{Error, Result, Value, types::Record};

// ============================================================================
// Byte Parsing Helpers
// ============================================================================

/// Read an f32 from a byte slice at the given offset (little-endian).
///
/// # Panics
/// Panics if `offset + 4 > bytes.len()`.
#[inline]
pub fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Read a u32 from a byte slice at the given offset (little-endian).
#[inline]
pub fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Read a u16 from a byte slice at the given offset (little-endian).
#[inline]
pub fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

/// Validate that a buffer has at least `expected` bytes.
///
/// Returns `Err(Truncated)` if the buffer is too small.
#[inline]
pub fn validate_buffer_size(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() < expected {
        return Err(Error::Truncated {
            actual: bytes.len(),
            expected,
        });
    }
    Ok(())
}

// ============================================================================
// Field descriptions
// ============================================================================

/// Element type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    /// 32-bit little-endian float
    Float32,
    /// 32-bit little-endian unsigned integer
    UInt32,
    /// 16-bit little-endian unsigned integer
    UInt16,
    /// 4-byte ASCII tag
    Tag,
}

impl ElementType {
    /// Size of one element in bytes.
    pub const fn size(self) -> usize {
        match self {
            ElementType::Float32 | ElementType::UInt32 | ElementType::Tag => 4,
            ElementType::UInt16 => 2,
        }
    }
}

/// Shape of a field: scalar, fixed-length vector, or fixed-size 2-D array
/// of words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldShape {
    /// A single element
    Scalar,
    /// `n` consecutive elements
    Vector(usize),
    /// `rows * cols` consecutive elements, row-major
    Matrix(usize, usize),
}

impl FieldShape {
    /// Total number of elements covered by this shape.
    pub const fn element_count(self) -> usize {
        match self {
            FieldShape::Scalar => 1,
            FieldShape::Vector(n) => n,
            FieldShape::Matrix(r, c) => r * c,
        }
    }
}

/// A named, typed slot within a sub-block.
///
/// `position` is the 1-based word index used throughout the CORSIKA user
/// guide; the byte offset is `(position - 1) * 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Field {
    /// 1-based word index into the sub-block
    pub position: usize,
    /// Field name, unique within a layout
    pub name: &'static str,
    /// Physical unit, if any (e.g. `"GeV"`, `"cm"`)
    pub unit: Option<&'static str>,
    /// Scalar, vector, or matrix of elements
    pub shape: FieldShape,
    /// Element type
    pub ty: ElementType,
}

impl Field {
    /// A scalar float field without a unit.
    pub const fn scalar(position: usize, name: &'static str) -> Self {
        Field {
            position,
            name,
            unit: None,
            shape: FieldShape::Scalar,
            ty: ElementType::Float32,
        }
    }

    /// A scalar float field with a unit.
    pub const fn with_unit(position: usize, name: &'static str, unit: &'static str) -> Self {
        Field {
            position,
            name,
            unit: Some(unit),
            shape: FieldShape::Scalar,
            ty: ElementType::Float32,
        }
    }

    /// A fixed-length float vector field.
    pub const fn vector(position: usize, name: &'static str, len: usize) -> Self {
        Field {
            position,
            name,
            unit: None,
            shape: FieldShape::Vector(len),
            ty: ElementType::Float32,
        }
    }

    /// A fixed-length float vector field with a unit.
    pub const fn vector_with_unit(
        position: usize,
        name: &'static str,
        unit: &'static str,
        len: usize,
    ) -> Self {
        Field {
            position,
            name,
            unit: Some(unit),
            shape: FieldShape::Vector(len),
            ty: ElementType::Float32,
        }
    }

    /// A fixed-size 2-D float array field.
    pub const fn matrix(position: usize, name: &'static str, rows: usize, cols: usize) -> Self {
        Field {
            position,
            name,
            unit: None,
            shape: FieldShape::Matrix(rows, cols),
            ty: ElementType::Float32,
        }
    }

    /// A 4-byte ASCII tag field.
    pub const fn tag(position: usize, name: &'static str) -> Self {
        Field {
            position,
            name,
            unit: None,
            shape: FieldShape::Scalar,
            ty: ElementType::Tag,
        }
    }

    /// Byte offset of this field inside the sub-block.
    pub const fn byte_offset(&self) -> usize {
        (self.position - 1) * 4
    }

    /// Number of bytes this field covers.
    pub const fn byte_len(&self) -> usize {
        self.shape.element_count() * self.ty.size()
    }
}

// ============================================================================
// Compiled layouts
// ============================================================================

/// One field with its precomputed byte offset.
#[derive(Debug, Clone)]
pub struct CompiledField {
    /// The declarative field description
    pub field: Field,
    /// Byte offset inside the sub-block
    pub offset: usize,
}

/// A field list compiled into a byte offset table for a fixed item size.
///
/// Built once per record kind and version (see the sibling layout modules)
/// and shared via `LazyLock` statics.
#[derive(Debug, Clone)]
pub struct CompiledLayout {
    item_size: usize,
    fields: Vec<CompiledField>,
}

/// Compile a field list into an offset table.
///
/// # Panics
/// Panics if a field extends past `item_size` or two fields overlap. The
/// field tables are static format descriptions, so either condition is a
/// bug in the table, not bad input.
pub fn build_layout(fields: &[Field], item_size: usize) -> CompiledLayout {
    let mut compiled: Vec<CompiledField> = fields
        .iter()
        .map(|&field| CompiledField {
            field,
            offset: field.byte_offset(),
        })
        .collect();

    let mut by_offset: Vec<(usize, usize, &'static str)> = compiled
        .iter()
        .map(|c| (c.offset, c.offset + c.field.byte_len(), c.field.name))
        .collect();
    by_offset.sort_unstable();

    for window in by_offset.windows(2) {
        let (_, end, name) = window[0];
        let (next_start, _, next_name) = window[1];
        assert!(
            end <= next_start,
            "fields {name} and {next_name} overlap in layout"
        );
    }
    if let Some(&(_, end, name)) = by_offset.last() {
        assert!(
            end <= item_size,
            "field {name} extends past item size {item_size}"
        );
    }

    compiled.shrink_to_fit();
    CompiledLayout {
        item_size,
        fields: compiled,
    }
}

impl CompiledLayout {
    /// Declared total size of one item in bytes.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// The compiled fields in declaration order.
    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    /// Decode one sub-block into a [`Record`].
    ///
    /// `bytes` must be exactly [`item_size`](Self::item_size) long; any
    /// other length means the framing layer handed over a wrong buffer and
    /// yields [`Error::LayoutMismatch`]. All values are copied out of the
    /// input buffer.
    pub fn decode(&self, bytes: &[u8]) -> Result<Record> {
        if bytes.len() != self.item_size {
            return Err(Error::LayoutMismatch {
                expected: self.item_size,
                actual: bytes.len(),
            });
        }

        let mut record = Record::with_capacity(self.fields.len());
        for c in &self.fields {
            record.push(c.field.name, decode_field(bytes, c));
        }
        Ok(record)
    }
}

fn decode_field(bytes: &[u8], c: &CompiledField) -> Value {
    let offset = c.offset;
    match (c.field.ty, c.field.shape) {
        (ElementType::Tag, _) => {
            let raw = &bytes[offset..offset + 4];
            Value::Tag(String::from_utf8_lossy(raw).into_owned())
        }
        (ElementType::UInt32, _) => Value::UnsignedInteger(read_u32(bytes, offset)),
        (ElementType::UInt16, _) => Value::UnsignedShort(read_u16(bytes, offset)),
        (ElementType::Float32, FieldShape::Scalar) => Value::Float(read_f32(bytes, offset)),
        (ElementType::Float32, FieldShape::Vector(n)) => {
            Value::FloatVector(read_f32_slice(bytes, offset, n))
        }
        (ElementType::Float32, FieldShape::Matrix(rows, cols)) => Value::FloatMatrix {
            rows,
            cols,
            values: read_f32_slice(bytes, offset, rows * cols),
        },
    }
}

fn read_f32_slice(bytes: &[u8], offset: usize, n: usize) -> Vec<f32> {
    (0..n).map(|i| read_f32(bytes, offset + 4 * i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Vec<Field> {
        vec![
            Field::tag(1, "run_header"),
            Field::scalar(2, "run_number"),
            Field::with_unit(3, "energy_min", "GeV"),
            Field::vector(4, "observation_height", 3),
            Field::matrix(7, "random_seeds", 2, 2),
        ]
    }

    #[test]
    fn offsets_follow_one_based_positions() {
        let layout = build_layout(&sample_fields(), 44);
        let offsets: Vec<_> = layout.fields().iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![0, 4, 8, 12, 24]);
    }

    #[test]
    fn decode_reads_all_shapes() {
        let layout = build_layout(&sample_fields(), 44);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RUNH");
        for v in [7.0f32, 100.0, 1.0, 2.0, 3.0, 10.0, 20.0, 30.0, 40.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.resize(44, 0);

        let rec = layout.decode(&bytes).unwrap();
        assert_eq!(rec.get("run_header").unwrap().as_tag(), Some("RUNH"));
        assert_eq!(rec.float("run_number"), Some(7.0));
        assert_eq!(
            rec.get("observation_height").unwrap().as_f32_slice(),
            Some(&[1.0, 2.0, 3.0][..])
        );
        match rec.get("random_seeds").unwrap() {
            Value::FloatMatrix { rows, cols, values } => {
                assert_eq!((*rows, *cols), (2, 2));
                assert_eq!(values, &[10.0, 20.0, 30.0, 40.0]);
            }
            other => panic!("expected matrix, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let layout = build_layout(&[Field::scalar(1, "x")], 8);
        let err = layout.decode(&[0u8; 12]).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::LayoutMismatch {
                expected: 8,
                actual: 12
            }
        ));
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn overlapping_fields_panic() {
        build_layout(
            &[Field::vector(1, "a", 2), Field::scalar(2, "b")],
            1092,
        );
    }

    #[test]
    #[should_panic(expected = "extends past")]
    fn out_of_bounds_field_panics() {
        build_layout(&[Field::scalar(3, "x")], 8);
    }

    #[test]
    fn decoded_record_owns_its_values() {
        let layout = build_layout(&[Field::scalar(1, "x")], 4);
        let rec = {
            let bytes = 1.5f32.to_le_bytes().to_vec();
            layout.decode(&bytes).unwrap()
        };
        // source buffer dropped; record must still be complete
        assert_eq!(rec.float("x"), Some(1.5));
    }
}
