pub mod layout;
pub mod reader;
pub mod writer;

pub use layout::{Field, FieldLayout, FieldValue, Packed, Primitive, Record};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;
