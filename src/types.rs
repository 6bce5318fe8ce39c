//! Decoded value and record types shared across the crate.

/// A single decoded field value.
///
/// CORSIKA stores almost everything as 32-bit floats; the remaining
/// variants cover the 4-byte ASCII tags and the integer fields used by
/// some producers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// 32-bit float scalar
    Float(f32),
    /// 32-bit unsigned integer scalar
    UnsignedInteger(u32),
    /// 16-bit unsigned integer scalar
    UnsignedShort(u16),
    /// 4-byte ASCII tag such as `"RUNH"`
    Tag(String),
    /// Fixed-length vector of 32-bit floats
    FloatVector(Vec<f32>),
    /// Fixed-size 2-D array of 32-bit floats, stored row-major
    FloatMatrix {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
        /// `rows * cols` values, row-major
        values: Vec<f32>,
    },
}

impl Value {
    /// The value as an `f32` if it is a float scalar.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a string slice if it is a tag.
    pub fn as_tag(&self) -> Option<&str> {
        match self {
            Value::Tag(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a float slice if it is a vector or matrix.
    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        match self {
            Value::FloatVector(v) => Some(v),
            Value::FloatMatrix { values, .. } => Some(values),
            _ => None,
        }
    }
}

/// An immutable, ordered mapping from field name to decoded value.
///
/// Produced by applying a [`CompiledLayout`](crate::subblocks::CompiledLayout)
/// to one block's bytes. The record owns all its values; it never borrows
/// from the block buffer it was decoded from.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Record {
            fields: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Shortcut for float-scalar fields, which make up nearly every field
    /// in CORSIKA headers.
    pub fn float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(Value::as_f32)
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    /// Field names in layout order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|(n, _)| *n)
    }
}
