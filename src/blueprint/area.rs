use serde::Serialize;

use crate::codec::{Field, FieldLayout, Packed, Primitive::*, Record};
use crate::error::Result;

/// One rectangular placement area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Area {
    pub index: i8,
    pub parent_index: i8,
    pub tropic_anchor: u16,
    pub area_segments: u16,
    pub anchor_local_offset_x: u16,
    pub anchor_local_offset_y: u16,
    pub width: u16,
    pub height: u16,
}

impl Packed for Area {
    const LAYOUT: FieldLayout = FieldLayout::new(&[
        Field::new(I8, "index"),
        Field::new(I8, "parent_index"),
        Field::new(U16, "tropic_anchor"),
        Field::new(U16, "area_segments"),
        Field::new(U16, "anchor_local_offset_x"),
        Field::new(U16, "anchor_local_offset_y"),
        Field::new(U16, "width"),
        Field::new(U16, "height"),
    ]);

    fn from_record(r: &Record) -> Result<Self> {
        Ok(Self {
            index: r.i8("index")?,
            parent_index: r.i8("parent_index")?,
            tropic_anchor: r.u16("tropic_anchor")?,
            area_segments: r.u16("area_segments")?,
            anchor_local_offset_x: r.u16("anchor_local_offset_x")?,
            anchor_local_offset_y: r.u16("anchor_local_offset_y")?,
            width: r.u16("width")?,
            height: r.u16("height")?,
        })
    }

    fn to_record(&self) -> Record {
        let mut r = Record::with_capacity(8);
        r.set("index", self.index)
            .set("parent_index", self.parent_index)
            .set("tropic_anchor", self.tropic_anchor)
            .set("area_segments", self.area_segments)
            .set("anchor_local_offset_x", self.anchor_local_offset_x)
            .set("anchor_local_offset_y", self.anchor_local_offset_y)
            .set("width", self.width)
            .set("height", self.height);
        r
    }
}

impl Area {
    pub const SIZE: usize = Self::LAYOUT.size();

    pub fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        Self::unpack(data, offset)
    }

    pub fn size(&self) -> usize {
        Self::SIZE
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<area {}.{}: {}x{} {} segments, tropic {}>",
            self.parent_index, self.index, self.width, self.height, self.area_segments, self.tropic_anchor
        )
    }
}
