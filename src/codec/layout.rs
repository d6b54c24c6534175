//! Named fixed-field records
//!
//! A [`FieldLayout`] is an ordered list of `(primitive, name)` pairs. The
//! same order is used to unpack a byte buffer into a [`Record`] and to pack
//! a record back into bytes, so a layout fully describes one on-disk struct.
//! All primitives are little-endian.

use indexmap::IndexMap;

use super::{BinaryReader, BinaryWriter};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    I8,
    U8,
    U16,
    U32,
    F32,
}

impl Primitive {
    pub const fn width(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }

    /// Inclusive integer range, `None` for floating point
    fn range(self) -> Option<(i64, i64)> {
        match self {
            Self::I8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::U8 => Some((0, u8::MAX as i64)),
            Self::U16 => Some((0, u16::MAX as i64)),
            Self::U32 => Some((0, u32::MAX as i64)),
            Self::F32 => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f32),
}

macro_rules! int_field_value {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                Self::Int(v as i64)
            }
        })*
    };
}

int_field_value!(i8, u8, u16, u32, i64);

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub ty: Primitive,
    pub name: &'static str,
}

impl Field {
    pub const fn new(ty: Primitive, name: &'static str) -> Self {
        Self { ty, name }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldLayout {
    fields: &'static [Field],
}

impl FieldLayout {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// Packed size in bytes
    pub const fn size(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].ty.width();
            i += 1;
        }
        total
    }

    /// Unpack one record starting at `offset`; returns the record and bytes consumed
    pub fn unpack_head(&self, data: &[u8], offset: usize) -> Result<(Record, usize)> {
        let mut reader = BinaryReader::at(data, offset);
        let record = self.read(&mut reader)?;
        Ok((record, self.size()))
    }

    pub fn read(&self, reader: &mut BinaryReader) -> Result<Record> {
        let mut record = Record::with_capacity(self.fields.len());
        for field in self.fields {
            reader.require(field.ty.width(), field.name)?;
            let value = match field.ty {
                Primitive::I8 => FieldValue::from(reader.read_i8()?),
                Primitive::U8 => FieldValue::from(reader.read_u8()?),
                Primitive::U16 => FieldValue::from(reader.read_u16_le()?),
                Primitive::U32 => FieldValue::from(reader.read_u32_le()?),
                Primitive::F32 => FieldValue::from(reader.read_f32_le()?),
            };
            record.set(field.name, value);
        }
        Ok(record)
    }

    pub fn pack(&self, record: &Record) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::with_capacity(self.size());
        self.write(record, &mut writer)?;
        Ok(writer.into_vec())
    }

    /// Append `record` to `writer`. Nothing is written if any field fails to encode.
    pub fn write(&self, record: &Record, writer: &mut BinaryWriter) -> Result<()> {
        let mut staged = BinaryWriter::with_capacity(self.size());
        for field in self.fields {
            let value = record
                .get(field.name)
                .ok_or(Error::MissingField { field: field.name })?;
            let overflow = || Error::FieldOverflow { field: field.name, value: value.to_string() };
            match (field.ty.range(), value) {
                (None, FieldValue::Float(v)) => staged.write_f32_le(v),
                (None, FieldValue::Int(v)) => staged.write_f32_le(v as f32),
                (Some((min, max)), FieldValue::Int(v)) if v >= min && v <= max => match field.ty {
                    Primitive::I8 => staged.write_i8(v as i8),
                    Primitive::U8 => staged.write_u8(v as u8),
                    Primitive::U16 => staged.write_u16_le(v as u16),
                    _ => staged.write_u32_le(v as u32),
                },
                _ => return Err(overflow()),
            }
        }
        writer.write_bytes(staged.as_slice());
        Ok(())
    }
}

/// Field name to value mapping, in layout order when produced by [`FieldLayout::read`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: IndexMap<&'static str, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { values: IndexMap::with_capacity(capacity) }
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<FieldValue>) -> &mut Self {
        self.values.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FieldValue)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    fn int(&self, name: &'static str) -> Result<i64> {
        match self.get(name) {
            Some(FieldValue::Int(v)) => Ok(v),
            Some(other) => Err(Error::FieldOverflow { field: name, value: other.to_string() }),
            None => Err(Error::MissingField { field: name }),
        }
    }

    fn int_as<T: TryFrom<i64>>(&self, name: &'static str) -> Result<T> {
        let v = self.int(name)?;
        T::try_from(v).map_err(|_| Error::FieldOverflow { field: name, value: v.to_string() })
    }

    pub fn i8(&self, name: &'static str) -> Result<i8> {
        self.int_as(name)
    }

    pub fn u8(&self, name: &'static str) -> Result<u8> {
        self.int_as(name)
    }

    pub fn u16(&self, name: &'static str) -> Result<u16> {
        self.int_as(name)
    }

    pub fn u32(&self, name: &'static str) -> Result<u32> {
        self.int_as(name)
    }

    pub fn f32(&self, name: &'static str) -> Result<f32> {
        match self.get(name) {
            Some(FieldValue::Float(v)) => Ok(v),
            Some(FieldValue::Int(v)) => Ok(v as f32),
            None => Err(Error::MissingField { field: name }),
        }
    }
}

/// A typed struct with a fixed binary layout
pub trait Packed: Sized {
    const LAYOUT: FieldLayout;

    fn from_record(record: &Record) -> Result<Self>;

    fn to_record(&self) -> Record;

    fn unpack(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (record, size) = Self::LAYOUT.unpack_head(data, offset)?;
        Ok((Self::from_record(&record)?, size))
    }

    fn pack(&self) -> Result<Vec<u8>> {
        Self::LAYOUT.pack(&self.to_record())
    }
}
