use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use super::params::BuildingParameters;
use crate::catalog::{BuildingCategory, Item, Recipe};
use crate::codec::{BinaryReader, BinaryWriter, Field, FieldLayout, Packed, Primitive::*, Record};
use crate::error::{Error, Result};

/// Fixed part of a placed building
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BuildingHeader {
    pub index: u32,
    pub area_index: i8,
    pub local_offset_x: f32,
    pub local_offset_y: f32,
    pub local_offset_z: f32,
    pub local_offset_x2: f32,
    pub local_offset_y2: f32,
    pub local_offset_z2: f32,
    pub yaw: f32,
    pub yaw2: f32,
    pub item_id: u16,
    pub model_index: u16,
    pub output_object_index: u32,
    pub input_object_index: u32,
    pub output_to_slot: i8,
    pub input_from_slot: i8,
    pub output_from_slot: i8,
    pub input_to_slot: i8,
    pub output_offset: i8,
    pub input_offset: i8,
    pub recipe_id: u16,
    pub filter_id: u16,
    pub parameter_count: u16,
}

impl Packed for BuildingHeader {
    const LAYOUT: FieldLayout = FieldLayout::new(&[
        Field::new(U32, "index"),
        Field::new(I8, "area_index"),
        Field::new(F32, "local_offset_x"),
        Field::new(F32, "local_offset_y"),
        Field::new(F32, "local_offset_z"),
        Field::new(F32, "local_offset_x2"),
        Field::new(F32, "local_offset_y2"),
        Field::new(F32, "local_offset_z2"),
        Field::new(F32, "yaw"),
        Field::new(F32, "yaw2"),
        Field::new(U16, "item_id"),
        Field::new(U16, "model_index"),
        Field::new(U32, "output_object_index"),
        Field::new(U32, "input_object_index"),
        Field::new(I8, "output_to_slot"),
        Field::new(I8, "input_from_slot"),
        Field::new(I8, "output_from_slot"),
        Field::new(I8, "input_to_slot"),
        Field::new(I8, "output_offset"),
        Field::new(I8, "input_offset"),
        Field::new(U16, "recipe_id"),
        Field::new(U16, "filter_id"),
        Field::new(U16, "parameter_count"),
    ]);

    fn from_record(r: &Record) -> Result<Self> {
        Ok(Self {
            index: r.u32("index")?,
            area_index: r.i8("area_index")?,
            local_offset_x: r.f32("local_offset_x")?,
            local_offset_y: r.f32("local_offset_y")?,
            local_offset_z: r.f32("local_offset_z")?,
            local_offset_x2: r.f32("local_offset_x2")?,
            local_offset_y2: r.f32("local_offset_y2")?,
            local_offset_z2: r.f32("local_offset_z2")?,
            yaw: r.f32("yaw")?,
            yaw2: r.f32("yaw2")?,
            item_id: r.u16("item_id")?,
            model_index: r.u16("model_index")?,
            output_object_index: r.u32("output_object_index")?,
            input_object_index: r.u32("input_object_index")?,
            output_to_slot: r.i8("output_to_slot")?,
            input_from_slot: r.i8("input_from_slot")?,
            output_from_slot: r.i8("output_from_slot")?,
            input_to_slot: r.i8("input_to_slot")?,
            output_offset: r.i8("output_offset")?,
            input_offset: r.i8("input_offset")?,
            recipe_id: r.u16("recipe_id")?,
            filter_id: r.u16("filter_id")?,
            parameter_count: r.u16("parameter_count")?,
        })
    }

    fn to_record(&self) -> Record {
        let mut r = Record::with_capacity(23);
        r.set("index", self.index)
            .set("area_index", self.area_index)
            .set("local_offset_x", self.local_offset_x)
            .set("local_offset_y", self.local_offset_y)
            .set("local_offset_z", self.local_offset_z)
            .set("local_offset_x2", self.local_offset_x2)
            .set("local_offset_y2", self.local_offset_y2)
            .set("local_offset_z2", self.local_offset_z2)
            .set("yaw", self.yaw)
            .set("yaw2", self.yaw2)
            .set("item_id", self.item_id)
            .set("model_index", self.model_index)
            .set("output_object_index", self.output_object_index)
            .set("input_object_index", self.input_object_index)
            .set("output_to_slot", self.output_to_slot)
            .set("input_from_slot", self.input_from_slot)
            .set("output_from_slot", self.output_from_slot)
            .set("input_to_slot", self.input_to_slot)
            .set("output_offset", self.output_offset)
            .set("input_offset", self.input_offset)
            .set("recipe_id", self.recipe_id)
            .set("filter_id", self.filter_id)
            .set("parameter_count", self.parameter_count);
        r
    }
}

impl BuildingHeader {
    pub const SIZE: usize = Self::LAYOUT.size();

    pub fn item(&self) -> Option<Item> {
        Item::from_building_id(self.item_id)
    }

    pub fn recipe(&self) -> Option<Recipe> {
        Recipe::from_id(self.recipe_id)
    }

    pub fn category(&self) -> BuildingCategory {
        BuildingCategory::of_id(self.item_id)
    }
}

/// One placed building: header, raw parameter array and its typed view
///
/// The view is chosen once, when the building is constructed. Edits made
/// through [`Building::parameters_mut`] are projected back onto the raw
/// array by [`Building::pack`].
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    header: BuildingHeader,
    raw_parameters: Vec<u32>,
    parameters: BuildingParameters,
}

impl Building {
    pub fn new(header: BuildingHeader, raw_parameters: Vec<u32>) -> Result<Self> {
        if raw_parameters.len() != usize::from(header.parameter_count) {
            return Err(Error::ParameterCountMismatch {
                index: header.index,
                expected: usize::from(header.parameter_count),
                actual: raw_parameters.len(),
            });
        }

        let category = header.category();
        let parameters = match BuildingParameters::try_decode(category, &raw_parameters) {
            Some(parameters) => parameters,
            None => {
                warn!(
                    "Building {} (item {}): {} parameters do not fit {:?} layout, keeping raw values",
                    header.index,
                    header.item_id,
                    raw_parameters.len(),
                    category
                );
                BuildingParameters::Raw
            }
        };

        if header.item().is_none() {
            debug!("Building {}: unknown item id {}", header.index, header.item_id);
        }

        Ok(Self { header, raw_parameters, parameters })
    }

    /// Read one building at `offset`; returns it and the bytes consumed
    pub fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut reader = BinaryReader::at(data, offset);
        let record = BuildingHeader::LAYOUT.read(&mut reader)?;
        let header = BuildingHeader::from_record(&record)?;
        let raw_parameters = reader.read_u32_array(usize::from(header.parameter_count), "parameters")?;
        let building = Self::new(header, raw_parameters)?;
        let size = building.size();
        Ok((building, size))
    }

    pub fn header(&self) -> &BuildingHeader {
        &self.header
    }

    pub fn item(&self) -> Option<Item> {
        self.header.item()
    }

    pub fn recipe(&self) -> Option<Recipe> {
        self.header.recipe()
    }

    pub fn category(&self) -> BuildingCategory {
        self.header.category()
    }

    /// Parameter array as it was read
    pub fn raw_parameters(&self) -> &[u32] {
        &self.raw_parameters
    }

    pub fn parameters(&self) -> &BuildingParameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut BuildingParameters {
        &mut self.parameters
    }

    /// True when the category has a typed view but the array did not fit it
    pub fn parameters_fell_back(&self) -> bool {
        self.category() != BuildingCategory::Other && self.parameters.is_raw()
    }

    /// Parameter array with any edits made through the typed view applied
    pub fn projected_parameters(&self) -> Vec<u32> {
        self.parameters
            .encode(&self.raw_parameters)
            .unwrap_or_else(|| self.raw_parameters.clone())
    }

    /// Rebuild with a replaced header. Parameter edits are carried over and the
    /// view is chosen again for the new item id.
    pub fn with_header(&self, header: BuildingHeader) -> Result<Self> {
        Self::new(header, self.projected_parameters())
    }

    pub fn size(&self) -> usize {
        BuildingHeader::SIZE + 4 * self.raw_parameters.len()
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        let parameters = self.projected_parameters();
        if parameters.len() != usize::from(self.header.parameter_count) {
            return Err(Error::ParameterCountMismatch {
                index: self.header.index,
                expected: usize::from(self.header.parameter_count),
                actual: parameters.len(),
            });
        }
        BuildingHeader::LAYOUT.write(&self.header.to_record(), writer)?;
        writer.write_u32_array(&parameters);
        Ok(())
    }

    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::with_capacity(self.size());
        self.write(&mut writer)?;
        Ok(writer.into_vec())
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ParameterView<'a> {
    Typed(&'a BuildingParameters),
    Raw(Vec<u32>),
}

#[derive(Serialize)]
struct BuildingView<'a> {
    #[serde(flatten)]
    header: &'a BuildingHeader,
    item: Option<Item>,
    recipe: Option<Recipe>,
    parameters: ParameterView<'a>,
}

impl Serialize for Building {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let parameters = if self.parameters.is_raw() {
            ParameterView::Raw(self.projected_parameters())
        } else {
            ParameterView::Typed(&self.parameters)
        };
        BuildingView {
            header: &self.header,
            item: self.item(),
            recipe: self.recipe(),
            parameters,
        }
        .serialize(serializer)
    }
}

impl std::fmt::Display for Building {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let h = &self.header;
        match self.item() {
            Some(item) => write!(f, "<building {} {}", h.index, item)?,
            None => write!(f, "<building {} item#{}", h.index, h.item_id)?,
        }
        write!(f, " at ({:.2}, {:.2}, {:.2})", h.local_offset_x, h.local_offset_y, h.local_offset_z)?;
        match self.recipe() {
            Some(recipe) => write!(f, " recipe {}", recipe)?,
            None if h.recipe_id != 0 => write!(f, " recipe#{}", h.recipe_id)?,
            None => {}
        }
        write!(f, ">")
    }
}
