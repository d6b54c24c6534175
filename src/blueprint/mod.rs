//! Blueprint records and the text envelope around them

pub mod area;
pub mod building;
pub mod data;
pub mod envelope;
pub mod params;

pub use area::Area;
pub use building::{Building, BuildingHeader};
pub use data::{Anomaly, BlueprintData, DecodeOptions, Header, TrailingPolicy};
pub use envelope::{BlueprintHasher, Envelope, Validation};
pub use params::{
    BuildingParameters, ConveyorParameters, DistributorParameters, ProductionParameters, SlotEntry,
    StationParameters, StationSettings, StorageEntry,
};
