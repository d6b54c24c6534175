//! Typed views over a building's trailing parameter array
//!
//! Each building category lays out its `u32` parameters differently. A view
//! is decoded once from the raw array and re-encoded against that same array:
//! offsets the view does not model are copied through unchanged. Unused
//! station storage entries are the exception and are always written as
//! zeros, so an unmodified view reproduces any input whose unused entries
//! are already zero.
//!
//! Station layout (offsets in `u32` units):
//!
//! | zone     | offset | stride | fields                                              |
//! |----------|--------|--------|-----------------------------------------------------|
//! | storage  | 0      | 6      | item_id, local_logic, remote_logic, max_count, 2 reserved |
//! | slots    | 192    | 4      | direction, storage_index, 2 reserved                |
//! | settings | 320    | 8      | work_energy .. vessel_count                         |

use serde::Serialize;

use crate::catalog::{BuildingCategory, Item, LogisticsDirection, ProliferationEffect};

pub const PLANETARY_STATION_STORAGE: usize = 4;
pub const INTERSTELLAR_STATION_STORAGE: usize = 5;
pub const STATION_SLOTS: usize = 12;

const STORAGE_OFFSET: usize = 0;
const STORAGE_STRIDE: usize = 6;
const SLOTS_OFFSET: usize = STORAGE_OFFSET + 192;
const SLOT_STRIDE: usize = 4;
const SETTINGS_OFFSET: usize = SLOTS_OFFSET + 128;
const SETTINGS_LEN: usize = 8;

/// Minimum parameter count of a station
pub const STATION_MIN_PARAMETERS: usize = SETTINGS_OFFSET + SETTINGS_LEN;

fn decode_bool(v: u32) -> Option<bool> {
    match v {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

fn encode_bool(v: bool) -> u32 {
    if v { 1 } else { 0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageEntry {
    pub item_id: u32,
    pub local_logic: LogisticsDirection,
    pub remote_logic: LogisticsDirection,
    pub max_count: u32,
}

impl StorageEntry {
    pub fn item(&self) -> Option<Item> {
        Item::from_parameter(self.item_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotEntry {
    pub direction: LogisticsDirection,
    pub storage_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationSettings {
    pub work_energy: u32,
    pub drone_range: u32,
    pub vessel_range: u32,
    pub orbital_collector: bool,
    pub warp_distance: u32,
    pub equip_warper: bool,
    pub drone_count: u32,
    pub vessel_count: u32,
}

/// Planetary or interstellar logistics station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationParameters {
    storage: Vec<Option<StorageEntry>>,
    slots: Vec<Option<SlotEntry>>,
    settings: StationSettings,
}

impl StationParameters {
    pub fn decode(raw: &[u32], storage_len: usize) -> Option<Self> {
        if raw.len() < STATION_MIN_PARAMETERS {
            return None;
        }

        let mut storage = Vec::with_capacity(storage_len);
        for i in 0..storage_len {
            let at = STORAGE_OFFSET + STORAGE_STRIDE * i;
            if raw[at] == 0 {
                storage.push(None);
                continue;
            }
            storage.push(Some(StorageEntry {
                item_id: raw[at],
                local_logic: LogisticsDirection::from_raw(raw[at + 1])?,
                remote_logic: LogisticsDirection::from_raw(raw[at + 2])?,
                max_count: raw[at + 3],
            }));
        }

        let mut slots = Vec::with_capacity(STATION_SLOTS);
        for i in 0..STATION_SLOTS {
            let at = SLOTS_OFFSET + SLOT_STRIDE * i;
            if raw[at + 1] == 0 {
                slots.push(None);
                continue;
            }
            slots.push(Some(SlotEntry {
                direction: LogisticsDirection::from_raw(raw[at])?,
                storage_index: raw[at + 1],
            }));
        }

        let p = &raw[SETTINGS_OFFSET..SETTINGS_OFFSET + SETTINGS_LEN];
        let settings = StationSettings {
            work_energy: p[0],
            drone_range: p[1],
            vessel_range: p[2],
            orbital_collector: decode_bool(p[3])?,
            warp_distance: p[4],
            equip_warper: decode_bool(p[5])?,
            drone_count: p[6],
            vessel_count: p[7],
        };

        Some(Self { storage, slots, settings })
    }

    /// Storage entries; `None` marks an unused entry
    pub fn storage(&self) -> &[Option<StorageEntry>] {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut [Option<StorageEntry>] {
        &mut self.storage
    }

    /// Slot entries are read-only; re-encoding always copies them through
    pub fn slots(&self) -> &[Option<SlotEntry>] {
        &self.slots
    }

    pub fn settings(&self) -> &StationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut StationSettings {
        &mut self.settings
    }

    fn encode_into(&self, out: &mut [u32]) {
        for (i, entry) in self.storage.iter().enumerate() {
            let at = STORAGE_OFFSET + STORAGE_STRIDE * i;
            match entry {
                Some(entry) => {
                    out[at] = entry.item_id;
                    out[at + 1] = entry.local_logic.raw();
                    out[at + 2] = entry.remote_logic.raw();
                    out[at + 3] = entry.max_count;
                }
                // Unused entries are zeroed across their whole span.
                None => out[at..at + STORAGE_STRIDE].fill(0),
            }
        }

        let s = &self.settings;
        let p = &mut out[SETTINGS_OFFSET..SETTINGS_OFFSET + SETTINGS_LEN];
        p[0] = s.work_energy;
        p[1] = s.drone_range;
        p[2] = s.vessel_range;
        p[3] = encode_bool(s.orbital_collector);
        p[4] = s.warp_distance;
        p[5] = encode_bool(s.equip_warper);
        p[6] = s.drone_count;
        p[7] = s.vessel_count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistributorParameters {
    pub supply_icarus_logic: u32,
    pub supply_logic: LogisticsDirection,
    pub work_energy: u32,
    pub autofill: u32,
}

impl DistributorParameters {
    pub fn decode(raw: &[u32]) -> Option<Self> {
        match raw {
            [icarus, logic, energy, autofill, ..] => Some(Self {
                supply_icarus_logic: *icarus,
                supply_logic: LogisticsDirection::from_raw(*logic)?,
                work_energy: *energy,
                autofill: *autofill,
            }),
            _ => None,
        }
    }

    fn encode_into(&self, out: &mut [u32]) {
        out[0] = self.supply_icarus_logic;
        out[1] = self.supply_logic.raw();
        out[2] = self.work_energy;
        out[3] = self.autofill;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductionParameters {
    pub proliferation_effect: ProliferationEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConveyorParameters {
    pub memo_icon: u32,
    pub memo_number: u32,
}

impl ConveyorParameters {
    pub fn memo_item(&self) -> Option<Item> {
        Item::from_parameter(self.memo_icon)
    }
}

/// Parameter view chosen by building category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BuildingParameters {
    Station(StationParameters),
    Distributor(DistributorParameters),
    /// `None` when the building carries no parameters
    Production(Option<ProductionParameters>),
    /// `None` when the building carries no parameters
    Conveyor(Option<ConveyorParameters>),
    /// No typed view; the raw array is passed through verbatim
    Raw,
}

impl BuildingParameters {
    /// Decode `raw` for `category`. Returns `None` when the array does not have
    /// the shape the category expects.
    pub fn try_decode(category: BuildingCategory, raw: &[u32]) -> Option<Self> {
        match category {
            BuildingCategory::PlanetaryStation => {
                StationParameters::decode(raw, PLANETARY_STATION_STORAGE).map(Self::Station)
            }
            BuildingCategory::InterstellarStation => {
                StationParameters::decode(raw, INTERSTELLAR_STATION_STORAGE).map(Self::Station)
            }
            BuildingCategory::Distributor => DistributorParameters::decode(raw).map(Self::Distributor),
            BuildingCategory::Production => match raw {
                [] => Some(Self::Production(None)),
                [effect, ..] => ProliferationEffect::from_raw(*effect)
                    .map(|proliferation_effect| Self::Production(Some(ProductionParameters { proliferation_effect }))),
            },
            BuildingCategory::Conveyor => match raw {
                [] => Some(Self::Conveyor(None)),
                [memo_icon, memo_number, ..] => Some(Self::Conveyor(Some(ConveyorParameters {
                    memo_icon: *memo_icon,
                    memo_number: *memo_number,
                }))),
                [_] => None,
            },
            BuildingCategory::Other => Some(Self::Raw),
        }
    }

    /// Decode, falling back to [`BuildingParameters::Raw`] on a shape mismatch
    pub fn decode(category: BuildingCategory, raw: &[u32]) -> Self {
        Self::try_decode(category, raw).unwrap_or(Self::Raw)
    }

    /// Project the view back onto `original`. `None` means the view has no
    /// projection and `original` should be used verbatim.
    pub fn encode(&self, original: &[u32]) -> Option<Vec<u32>> {
        if original.len() < self.min_parameters() {
            return None;
        }
        let mut out = original.to_vec();
        match self {
            Self::Station(station) => station.encode_into(&mut out),
            Self::Distributor(distributor) => distributor.encode_into(&mut out),
            Self::Production(Some(production)) => out[0] = production.proliferation_effect.raw(),
            Self::Production(None) => {}
            Self::Conveyor(Some(conveyor)) => {
                out[0] = conveyor.memo_icon;
                out[1] = conveyor.memo_number;
            }
            Self::Conveyor(None) => {}
            Self::Raw => return None,
        }
        Some(out)
    }

    /// Shortest array the view can be projected onto
    fn min_parameters(&self) -> usize {
        match self {
            Self::Station(_) => STATION_MIN_PARAMETERS,
            Self::Distributor(_) => 4,
            Self::Production(Some(_)) => 1,
            Self::Conveyor(Some(_)) => 2,
            Self::Production(None) | Self::Conveyor(None) | Self::Raw => 0,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw)
    }

    pub fn as_station(&self) -> Option<&StationParameters> {
        match self {
            Self::Station(station) => Some(station),
            _ => None,
        }
    }

    pub fn as_station_mut(&mut self) -> Option<&mut StationParameters> {
        match self {
            Self::Station(station) => Some(station),
            _ => None,
        }
    }

    pub fn as_distributor(&self) -> Option<&DistributorParameters> {
        match self {
            Self::Distributor(distributor) => Some(distributor),
            _ => None,
        }
    }

    pub fn as_production(&self) -> Option<&ProductionParameters> {
        match self {
            Self::Production(production) => production.as_ref(),
            _ => None,
        }
    }

    pub fn as_conveyor(&self) -> Option<&ConveyorParameters> {
        match self {
            Self::Conveyor(conveyor) => conveyor.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station_raw(storage: &[[u32; 6]]) -> Vec<u32> {
        let mut raw = vec![0u32; 2048];
        for (i, entry) in storage.iter().enumerate() {
            raw[i * 6..i * 6 + 6].copy_from_slice(entry);
        }
        // slot 0: output from storage 1
        raw[SLOTS_OFFSET] = 1;
        raw[SLOTS_OFFSET + 1] = 1;
        raw[SETTINGS_OFFSET..SETTINGS_OFFSET + 8].copy_from_slice(&[300, 180, 100, 1, 20, 0, 50, 10]);
        raw
    }

    #[test]
    fn test_station_decode() {
        let raw = station_raw(&[[1001, 2, 0, 100, 0, 0]]);
        let station = StationParameters::decode(&raw, PLANETARY_STATION_STORAGE).unwrap();

        assert_eq!(station.storage().len(), 4);
        assert_eq!(
            station.storage()[0],
            Some(StorageEntry {
                item_id: 1001,
                local_logic: LogisticsDirection::Input,
                remote_logic: LogisticsDirection::Unused,
                max_count: 100,
            })
        );
        assert_eq!(station.storage()[0].unwrap().item(), Some(Item::IronOre));
        assert!(station.storage()[1..].iter().all(Option::is_none));

        assert_eq!(station.slots().len(), STATION_SLOTS);
        assert_eq!(
            station.slots()[0],
            Some(SlotEntry { direction: LogisticsDirection::Output, storage_index: 1 })
        );
        assert!(station.slots()[1..].iter().all(Option::is_none));

        let settings = station.settings();
        assert_eq!(settings.work_energy, 300);
        assert!(settings.orbital_collector);
        assert!(!settings.equip_warper);
        assert_eq!(settings.vessel_count, 10);
    }

    #[test]
    fn test_interstellar_has_five_entries() {
        let raw = station_raw(&[[0; 6], [0; 6], [0; 6], [0; 6], [1120, 1, 1, 5000, 0, 0]]);
        let params = BuildingParameters::decode(BuildingCategory::InterstellarStation, &raw);
        let station = params.as_station().unwrap();
        assert_eq!(station.storage().len(), 5);
        assert_eq!(station.storage()[4].unwrap().item(), Some(Item::Hydrogen));
    }

    #[test]
    fn test_unmodified_views_reproduce_raw() {
        let mut raw = station_raw(&[[1001, 2, 0, 100, 7, 9], [0; 6], [1104, 1, 1, 50, 0, 2]]);
        raw[SLOTS_OFFSET + 2] = 42;
        raw[1000] = 0xDEAD;
        for category in [BuildingCategory::PlanetaryStation, BuildingCategory::InterstellarStation] {
            let params = BuildingParameters::decode(category, &raw);
            assert!(!params.is_raw());
            assert_eq!(params.encode(&raw).unwrap(), raw);
        }

        let distributor = vec![1, 2, 120000, 0, 99];
        let params = BuildingParameters::decode(BuildingCategory::Distributor, &distributor);
        assert_eq!(params.as_distributor().unwrap().supply_logic, LogisticsDirection::Input);
        assert_eq!(params.encode(&distributor).unwrap(), distributor);

        let conveyor = vec![1201, 64];
        let params = BuildingParameters::decode(BuildingCategory::Conveyor, &conveyor);
        assert_eq!(params.as_conveyor().unwrap().memo_item(), Some(Item::Gear));
        assert_eq!(params.encode(&conveyor).unwrap(), conveyor);
    }

    #[test]
    fn test_storage_edit_preserves_other_offsets() {
        let raw = station_raw(&[[1001, 2, 0, 100, 7, 9]]);
        let mut params = BuildingParameters::decode(BuildingCategory::PlanetaryStation, &raw);
        let station = params.as_station_mut().unwrap();
        station.storage_mut()[0].as_mut().unwrap().max_count = 500;
        station.storage_mut()[1] = Some(StorageEntry {
            item_id: 1104,
            local_logic: LogisticsDirection::Output,
            remote_logic: LogisticsDirection::Unused,
            max_count: 200,
        });
        station.settings_mut().equip_warper = true;

        let encoded = params.encode(&raw).unwrap();
        assert_eq!(encoded.len(), raw.len());
        assert_eq!(&encoded[0..6], &[1001, 2, 0, 500, 7, 9]);
        assert_eq!(&encoded[6..12], &[1104, 1, 0, 200, 0, 0]);
        assert_eq!(encoded[SETTINGS_OFFSET + 5], 1);
        let changed: Vec<usize> = (0..raw.len()).filter(|&i| raw[i] != encoded[i]).collect();
        assert_eq!(changed, vec![3, 6, 7, 9, SETTINGS_OFFSET + 5]);
    }

    #[test]
    fn test_cleared_storage_is_zeroed() {
        let raw = station_raw(&[[1001, 2, 0, 100, 7, 9]]);
        let mut params = BuildingParameters::decode(BuildingCategory::PlanetaryStation, &raw);
        params.as_station_mut().unwrap().storage_mut()[0] = None;

        let encoded = params.encode(&raw).unwrap();
        assert_eq!(&encoded[0..6], &[0; 6]);
    }

    #[test]
    fn test_unused_storage_round_trips() {
        let raw = station_raw(&[[0; 6], [1104, 1, 0, 200, 0, 0]]);
        let params = BuildingParameters::decode(BuildingCategory::PlanetaryStation, &raw);
        assert!(params.as_station().unwrap().storage()[0].is_none());
        assert_eq!(params.encode(&raw).unwrap(), raw);
    }

    #[test]
    fn test_unused_storage_with_stale_words_is_zeroed() {
        let raw = station_raw(&[[1001, 2, 0, 100, 0, 0], [0, 1, 0, 3, 7, 9]]);
        let params = BuildingParameters::decode(BuildingCategory::PlanetaryStation, &raw);
        assert!(params.as_station().unwrap().storage()[1].is_none());

        let encoded = params.encode(&raw).unwrap();
        assert_eq!(&encoded[6..12], &[0; 6]);
        assert_eq!(&encoded[0..6], &raw[0..6]);
        assert_eq!(&encoded[12..], &raw[12..]);
    }

    #[test]
    fn test_production_views() {
        let params = BuildingParameters::decode(BuildingCategory::Production, &[1]);
        assert_eq!(params.as_production().unwrap().proliferation_effect, ProliferationEffect::Speedup);

        let params = BuildingParameters::decode(BuildingCategory::Production, &[]);
        assert_eq!(params, BuildingParameters::Production(None));
        assert_eq!(params.encode(&[]).unwrap(), Vec::<u32>::new());

        let mut params = BuildingParameters::decode(BuildingCategory::Production, &[0, 5]);
        if let BuildingParameters::Production(Some(p)) = &mut params {
            p.proliferation_effect = ProliferationEffect::Speedup;
        }
        assert_eq!(params.encode(&[0, 5]).unwrap(), vec![1, 5]);
    }

    #[test]
    fn test_shape_mismatch_falls_back_to_raw() {
        assert!(BuildingParameters::decode(BuildingCategory::PlanetaryStation, &[0; 10]).is_raw());
        assert!(BuildingParameters::decode(BuildingCategory::Distributor, &[0, 7, 0, 0]).is_raw());
        assert!(BuildingParameters::decode(BuildingCategory::Production, &[9]).is_raw());
        assert!(BuildingParameters::decode(BuildingCategory::Conveyor, &[1]).is_raw());

        let mut raw = station_raw(&[]);
        raw[SETTINGS_OFFSET + 3] = 2;
        assert!(BuildingParameters::decode(BuildingCategory::PlanetaryStation, &raw).is_raw());
    }

    #[test]
    fn test_swapped_view_without_room_is_not_projected() {
        let params = BuildingParameters::Production(Some(ProductionParameters {
            proliferation_effect: ProliferationEffect::Speedup,
        }));
        assert_eq!(params.encode(&[]), None);

        let params = BuildingParameters::decode(BuildingCategory::Distributor, &[0, 1, 0, 0]);
        assert_eq!(params.encode(&[0, 1]), None);
    }

    #[test]
    fn test_raw_has_no_projection() {
        let params = BuildingParameters::decode(BuildingCategory::Other, &[1, 2, 3]);
        assert!(params.is_raw());
        assert_eq!(params.encode(&[1, 2, 3]), None);
    }
}
