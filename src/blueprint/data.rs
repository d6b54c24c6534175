//! Blueprint body: header, areas and buildings
//!
//! ```text
//! header (29 bytes) | area * area_count | building_count: u32 | building * building_count
//! ```
//!
//! Decoding never fails on ids the catalog does not know; those are kept as
//! raw numbers and reported as [`Anomaly`] values alongside the data.

use serde::Serialize;
use tracing::{debug, warn};

use super::area::Area;
use super::building::{Building, BuildingHeader};
use crate::catalog::{Item, Recipe};
use crate::codec::{BinaryReader, BinaryWriter, Field, FieldLayout, Packed, Primitive::*, Record};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub version: u32,
    pub cursor_offset_x: u32,
    pub cursor_offset_y: u32,
    pub cursor_target_area: u32,
    pub dragbox_size_x: u32,
    pub dragbox_size_y: u32,
    pub primary_area_index: u32,
    pub area_count: u8,
}

impl Packed for Header {
    const LAYOUT: FieldLayout = FieldLayout::new(&[
        Field::new(U32, "version"),
        Field::new(U32, "cursor_offset_x"),
        Field::new(U32, "cursor_offset_y"),
        Field::new(U32, "cursor_target_area"),
        Field::new(U32, "dragbox_size_x"),
        Field::new(U32, "dragbox_size_y"),
        Field::new(U32, "primary_area_index"),
        Field::new(U8, "area_count"),
    ]);

    fn from_record(r: &Record) -> Result<Self> {
        Ok(Self {
            version: r.u32("version")?,
            cursor_offset_x: r.u32("cursor_offset_x")?,
            cursor_offset_y: r.u32("cursor_offset_y")?,
            cursor_target_area: r.u32("cursor_target_area")?,
            dragbox_size_x: r.u32("dragbox_size_x")?,
            dragbox_size_y: r.u32("dragbox_size_y")?,
            primary_area_index: r.u32("primary_area_index")?,
            area_count: r.u8("area_count")?,
        })
    }

    fn to_record(&self) -> Record {
        let mut r = Record::with_capacity(8);
        r.set("version", self.version)
            .set("cursor_offset_x", self.cursor_offset_x)
            .set("cursor_offset_y", self.cursor_offset_y)
            .set("cursor_target_area", self.cursor_target_area)
            .set("dragbox_size_x", self.dragbox_size_x)
            .set("dragbox_size_y", self.dragbox_size_y)
            .set("primary_area_index", self.primary_area_index)
            .set("area_count", self.area_count);
        r
    }
}

impl Header {
    pub const SIZE: usize = Self::LAYOUT.size();
}

/// What to do with bytes left over after the last building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingPolicy {
    /// Log a warning and record [`Anomaly::TrailingBytes`]
    #[default]
    Lenient,
    /// Fail with [`Error::TrailingData`]
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub trailing: TrailingPolicy,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self { trailing: TrailingPolicy::Strict }
    }
}

/// Tolerated irregularity found while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anomaly {
    TrailingBytes { consumed: usize, len: usize },
    UnknownItem { building: u32, item_id: u16 },
    UnknownRecipe { building: u32, recipe_id: u16 },
    /// Parameter array did not fit its category's layout and is kept raw
    ParameterShape { building: u32, item_id: u16 },
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrailingBytes { consumed, len } => {
                write!(f, "data length is {} but {} bytes deserialized", len, consumed)
            }
            Self::UnknownItem { building, item_id } => {
                write!(f, "building {}: unknown item id {}", building, item_id)
            }
            Self::UnknownRecipe { building, recipe_id } => {
                write!(f, "building {}: unknown recipe id {}", building, recipe_id)
            }
            Self::ParameterShape { building, item_id } => {
                write!(f, "building {}: parameters of item {} kept raw", building, item_id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintData {
    header: Header,
    areas: Vec<Area>,
    buildings: Vec<Building>,
    #[serde(skip)]
    anomalies: Vec<Anomaly>,
}

impl BlueprintData {
    pub fn new(header: Header, areas: Vec<Area>, buildings: Vec<Building>) -> Self {
        Self { header, areas, buildings, anomalies: Vec::new() }
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        Self::deserialize_with(data, DecodeOptions::default())
    }

    pub fn deserialize_with(data: &[u8], options: DecodeOptions) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let header = Header::from_record(&Header::LAYOUT.read(&mut reader)?)?;

        let mut offset = reader.position();
        let mut areas = Vec::with_capacity(usize::from(header.area_count));
        for _ in 0..header.area_count {
            let (area, size) = Area::deserialize(data, offset)?;
            offset += size;
            areas.push(area);
        }

        reader.set_position(offset);
        reader.require(4, "building_count")?;
        let building_count = reader.read_u32_le()?;
        offset = reader.position();
        debug!(
            "Blueprint v{}: {} areas, {} buildings, {} bytes",
            header.version,
            areas.len(),
            building_count,
            data.len()
        );

        let mut anomalies = Vec::new();
        // The count comes from the file; do not trust it for preallocation.
        let mut buildings = Vec::with_capacity((building_count as usize).min(data.len() / BuildingHeader::SIZE));
        for _ in 0..building_count {
            let (building, size) = Building::deserialize(data, offset)?;
            offset += size;
            Self::collect_anomalies(&building, &mut anomalies);
            buildings.push(building);
        }

        if offset != data.len() {
            match options.trailing {
                TrailingPolicy::Strict => {
                    return Err(Error::TrailingData { consumed: offset, len: data.len() });
                }
                TrailingPolicy::Lenient => {
                    warn!(
                        "Blueprint data integrity: data length is {} but {} bytes deserialized",
                        data.len(),
                        offset
                    );
                    anomalies.push(Anomaly::TrailingBytes { consumed: offset, len: data.len() });
                }
            }
        }

        Ok(Self { header, areas, buildings, anomalies })
    }

    fn collect_anomalies(building: &Building, anomalies: &mut Vec<Anomaly>) {
        let h = building.header();
        if building.item().is_none() {
            anomalies.push(Anomaly::UnknownItem { building: h.index, item_id: h.item_id });
        }
        if h.recipe_id != 0 && building.recipe().is_none() {
            anomalies.push(Anomaly::UnknownRecipe { building: h.index, recipe_id: h.recipe_id });
        }
        if building.parameters_fell_back() {
            anomalies.push(Anomaly::ParameterShape { building: h.index, item_id: h.item_id });
        }
    }

    /// Encode to the binary payload. `area_count` and `building_count` are
    /// taken from the current lists.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::with_capacity(self.size());

        let mut header = self.header.to_record();
        header.set("area_count", self.areas.len() as i64);
        Header::LAYOUT.write(&header, &mut writer)?;

        for area in &self.areas {
            Area::LAYOUT.write(&area.to_record(), &mut writer)?;
        }

        let building_count = u32::try_from(self.buildings.len()).map_err(|_| Error::FieldOverflow {
            field: "building_count",
            value: self.buildings.len().to_string(),
        })?;
        writer.write_u32_le(building_count);
        for building in &self.buildings {
            building.write(&mut writer)?;
        }

        Ok(writer.into_vec())
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        Header::SIZE
            + self.areas.len() * Area::SIZE
            + 4
            + self.buildings.iter().map(Building::size).sum::<usize>()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn set_header(&mut self, header: Header) {
        self.header = header;
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Area the cursor refers to, if the index is valid
    pub fn primary_area(&self) -> Option<&Area> {
        self.areas.get(self.header.primary_area_index as usize)
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn buildings_mut(&mut self) -> &mut [Building] {
        &mut self.buildings
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Set every building using recipe `from` to recipe `to`; returns how
    /// many buildings changed
    pub fn replace_recipe(&mut self, from: &str, to: &str) -> Result<usize> {
        let from = Recipe::from_name(from).ok_or_else(|| Error::UnknownRecipe(from.to_string()))?;
        let to = Recipe::from_name(to).ok_or_else(|| Error::UnknownRecipe(to.to_string()))?;

        let mut replaced = 0;
        for building in &mut self.buildings {
            if building.header().recipe_id != from.id() {
                continue;
            }
            let mut header = *building.header();
            header.recipe_id = to.id();
            *building = building.with_header(header)?;
            replaced += 1;
        }
        debug!("Replaced recipe {} with {} in {} buildings", from, to, replaced);
        Ok(replaced)
    }

    /// Swap the item of every building placed as `from` (and every filter set
    /// to `from`) to `to`; returns how many buildings changed
    pub fn replace_item(&mut self, from: &str, to: &str) -> Result<usize> {
        let from = Self::building_item_id(from)?;
        let to = Self::building_item_id(to)?;

        let mut replaced = 0;
        for building in &mut self.buildings {
            let mut header = *building.header();
            if header.item_id != from && header.filter_id != from {
                continue;
            }
            if header.item_id == from {
                header.item_id = to;
            }
            if header.filter_id == from {
                header.filter_id = to;
            }
            *building = building.with_header(header)?;
            replaced += 1;
        }
        debug!("Replaced item {} with {} in {} buildings", from, to, replaced);
        Ok(replaced)
    }

    fn building_item_id(name: &str) -> Result<u16> {
        Item::from_name(name)
            .and_then(|item| u16::try_from(item.id()).ok())
            .ok_or_else(|| Error::UnknownItem(name.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::building::tests::{header as building_header, packed as packed_building};
    use crate::blueprint::params::BuildingParameters;
    use crate::catalog::{BuildingCategory, LogisticsDirection, ProliferationEffect, CONVEYORS, PRODUCTION_MACHINES};

    fn body_header(area_count: u8) -> Header {
        Header {
            version: 1,
            cursor_offset_x: 3,
            cursor_offset_y: 4,
            cursor_target_area: 0,
            dragbox_size_x: 1,
            dragbox_size_y: 1,
            primary_area_index: 0,
            area_count,
        }
    }

    fn area(width: u16, height: u16) -> Area {
        Area {
            index: 0,
            parent_index: -1,
            tropic_anchor: 0,
            area_segments: 200,
            anchor_local_offset_x: 0,
            anchor_local_offset_y: 0,
            width,
            height,
        }
    }

    /// Hand-assembled payload; `buildings` are `(item_id, recipe_id, parameters)`
    fn payload(buildings: &[(u16, u16, Vec<u32>)]) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        writer.write_bytes(&body_header(1).pack().unwrap());
        writer.write_bytes(&area(10, 10).pack().unwrap());
        writer.write_u32_le(buildings.len() as u32);
        for (i, (item_id, recipe_id, parameters)) in buildings.iter().enumerate() {
            let h = building_header(i as u32, *item_id, *recipe_id, parameters.len() as u16);
            writer.write_bytes(&packed_building(&h, parameters));
        }
        writer.into_vec()
    }

    fn station_parameters() -> Vec<u32> {
        let mut raw = vec![0u32; 2048];
        raw[0..6].copy_from_slice(&[1001, 2, 0, 100, 0, 0]);
        raw[192..196].copy_from_slice(&[1, 1, 0, 0]);
        raw[320..328].copy_from_slice(&[300, 180, 100, 0, 20, 1, 50, 10]);
        raw
    }

    #[test]
    fn test_scenario_a_assembler() {
        let bytes = payload(&[(2303, 5, vec![0])]);
        let bp = BlueprintData::deserialize(&bytes).unwrap();

        assert_eq!(bp.header().version, 1);
        assert_eq!(bp.areas().len(), 1);
        assert_eq!(bp.areas()[0].width, 10);
        assert_eq!(bp.buildings().len(), 1);
        let building = &bp.buildings()[0];
        assert_eq!(building.item(), Some(Item::AssemblingMachineMkI));
        assert_eq!(building.recipe(), Some(Recipe::Gear));
        assert_eq!(
            building.parameters().as_production().unwrap().proliferation_effect,
            ProliferationEffect::Product
        );
        assert!(bp.anomalies().is_empty());
        assert_eq!(bp.serialize().unwrap(), bytes);
    }

    #[test]
    fn test_scenario_b_station_storage() {
        let bytes = payload(&[(2103, 0, station_parameters())]);
        let bp = BlueprintData::deserialize(&bytes).unwrap();
        let station = bp.buildings()[0].parameters().as_station().unwrap();

        let entry = station.storage()[0].unwrap();
        assert_eq!(entry.item_id, 1001);
        assert_eq!(entry.local_logic, LogisticsDirection::Input);
        assert_eq!(entry.remote_logic, LogisticsDirection::Unused);
        assert_eq!(entry.max_count, 100);
        assert_eq!(station.storage().len(), 4);
        assert_eq!(bp.serialize().unwrap(), bytes);
    }

    #[test]
    fn test_scenario_c_recipe_edit_touches_two_bytes() {
        let bytes = payload(&[(2303, 5, vec![0])]);
        let mut bp = BlueprintData::deserialize(&bytes).unwrap();

        let building = &mut bp.buildings_mut()[0];
        let mut h = *building.header();
        h.recipe_id = 0x0102;
        *building = building.with_header(h).unwrap();

        let edited = bp.serialize().unwrap();
        assert_eq!(edited.len(), bytes.len());
        let recipe_offset = Header::SIZE + Area::SIZE + 4 + 55;
        let changed: Vec<usize> = (0..bytes.len()).filter(|&i| bytes[i] != edited[i]).collect();
        assert_eq!(changed, vec![recipe_offset, recipe_offset + 1]);
        assert_eq!(&edited[recipe_offset..recipe_offset + 2], &[0x02, 0x01]);
    }

    #[test]
    fn test_scenario_d_trailing_bytes_tolerated() {
        let mut bytes = payload(&[(2303, 5, vec![0])]);
        let len = bytes.len();
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let bp = BlueprintData::deserialize(&bytes).unwrap();
        assert_eq!(bp.buildings().len(), 1);
        assert_eq!(bp.anomalies(), &[Anomaly::TrailingBytes { consumed: len, len: len + 4 }]);
        assert_eq!(bp.serialize().unwrap(), &bytes[..len]);
    }

    #[test]
    fn test_strict_rejects_trailing_bytes() {
        let mut bytes = payload(&[]);
        bytes.push(0);
        match BlueprintData::deserialize_with(&bytes, DecodeOptions::strict()) {
            Err(Error::TrailingData { consumed, len }) => assert_eq!(len, consumed + 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_mixed_buildings() {
        let bytes = payload(&[
            (2104, 0, station_parameters()),
            (2107, 0, vec![1, 2, 120000, 0]),
            (2001, 0, vec![1201, 7]),
            (2002, 0, vec![]),
            (2011, 0, vec![]),
            (2311, 0, vec![0, 0, 0, 0]),
            (9999, 4321, vec![5, 6, 7]),
            (2305, 5, vec![]),
        ]);
        let bp = BlueprintData::deserialize(&bytes).unwrap();
        assert_eq!(bp.buildings().len(), 8);
        assert_eq!(bp.size(), bytes.len());
        assert_eq!(bp.serialize().unwrap(), bytes);

        assert_eq!(
            bp.anomalies(),
            &[
                Anomaly::UnknownItem { building: 6, item_id: 9999 },
                Anomaly::UnknownRecipe { building: 6, recipe_id: 4321 },
            ]
        );
    }

    #[test]
    fn test_unknown_item_keeps_raw_parameters() {
        let bytes = payload(&[(9999, 0, vec![1, 2, 3])]);
        let bp = BlueprintData::deserialize(&bytes).unwrap();
        let building = &bp.buildings()[0];
        assert_eq!(building.item(), None);
        assert_eq!(*building.parameters(), BuildingParameters::Raw);
        assert_eq!(building.raw_parameters(), &[1, 2, 3]);
    }

    #[test]
    fn test_category_dispatch() {
        let mut buildings: Vec<(u16, u16, Vec<u32>)> = Vec::new();
        for item in PRODUCTION_MACHINES {
            buildings.push((item.id() as u16, 0, vec![0]));
        }
        for item in CONVEYORS {
            buildings.push((item.id() as u16, 0, vec![0, 0]));
        }
        buildings.push((2103, 0, station_parameters()));
        buildings.push((2104, 0, station_parameters()));
        buildings.push((2011, 0, vec![0]));

        let bp = BlueprintData::deserialize(&payload(&buildings)).unwrap();
        for building in bp.buildings() {
            match (building.category(), building.parameters()) {
                (BuildingCategory::Production, BuildingParameters::Production(Some(_))) => {}
                (BuildingCategory::Conveyor, BuildingParameters::Conveyor(Some(_))) => {}
                (BuildingCategory::PlanetaryStation, BuildingParameters::Station(s)) => {
                    assert_eq!(s.storage().len(), 4)
                }
                (BuildingCategory::InterstellarStation, BuildingParameters::Station(s)) => {
                    assert_eq!(s.storage().len(), 5)
                }
                (BuildingCategory::Other, BuildingParameters::Raw) => {}
                other => panic!("unexpected dispatch {:?}", other),
            }
        }
    }

    #[test]
    fn test_station_edit_round_trip() {
        let bytes = payload(&[(2103, 0, station_parameters())]);
        let mut bp = BlueprintData::deserialize(&bytes).unwrap();
        let station = bp.buildings_mut()[0].parameters_mut().as_station_mut().unwrap();
        station.storage_mut()[0].as_mut().unwrap().max_count = 5000;

        let edited = bp.serialize().unwrap();
        let reread = BlueprintData::deserialize(&edited).unwrap();
        let station = reread.buildings()[0].parameters().as_station().unwrap();
        assert_eq!(station.storage()[0].unwrap().max_count, 5000);
        assert_eq!(reread.buildings()[0].raw_parameters()[4..], station_parameters()[4..]);
    }

    #[test]
    fn test_truncated_building() {
        let bytes = payload(&[(2303, 5, vec![0])]);
        let err = BlueprintData::deserialize(&bytes[..bytes.len() - 10]).unwrap_err();
        assert!(matches!(err, Error::TruncatedBuffer { .. }));

        let err = BlueprintData::deserialize(&bytes[..Header::SIZE + Area::SIZE + 2]).unwrap_err();
        match err {
            Error::TruncatedBuffer { field, .. } => assert_eq!(field, "building_count"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_replace_recipe() {
        let bytes = payload(&[(2303, 5, vec![0]), (2304, 5, vec![0]), (2305, 6, vec![0])]);
        let mut bp = BlueprintData::deserialize(&bytes).unwrap();

        assert_eq!(bp.replace_recipe("gear", "MagneticCoil").unwrap(), 2);
        let recipes: Vec<Option<Recipe>> = bp.buildings().iter().map(Building::recipe).collect();
        assert_eq!(recipes[0], Some(Recipe::MagneticCoil));
        assert_eq!(recipes[1], Some(Recipe::MagneticCoil));

        assert!(matches!(bp.replace_recipe("NoSuchThing", "Gear"), Err(Error::UnknownRecipe(_))));
    }

    #[test]
    fn test_replace_item() {
        let bytes = payload(&[(2303, 5, vec![0]), (2001, 0, vec![0, 0])]);
        let mut bp = BlueprintData::deserialize(&bytes).unwrap();

        assert_eq!(bp.replace_item("AssemblingMachineMkI", "AssemblingMachineMkIII").unwrap(), 1);
        assert_eq!(bp.buildings()[0].item(), Some(Item::AssemblingMachineMkIII));
        assert!(bp.buildings()[0].parameters().as_production().is_some());
        assert!(matches!(bp.replace_item("Gear", "Unobtainium"), Err(Error::UnknownItem(_))));
    }

    #[test]
    fn test_json_export() {
        let bytes = payload(&[(2303, 5, vec![0])]);
        let bp = BlueprintData::deserialize(&bytes).unwrap();
        let json: serde_json::Value = serde_json::from_str(&bp.to_json().unwrap()).unwrap();
        assert_eq!(json["header"]["version"], 1);
        assert_eq!(json["areas"][0]["width"], 10);
        assert_eq!(json["buildings"][0]["item"], "AssemblingMachineMkI");
        assert!(json.get("anomalies").is_none());
    }

    #[test]
    fn test_area_count_follows_list() {
        let bp = BlueprintData::new(body_header(3), vec![area(5, 5)], Vec::new());
        let bytes = bp.serialize().unwrap();
        assert_eq!(bytes[Header::SIZE - 1], 1);
        assert_eq!(bytes.len(), bp.size());
    }
}
