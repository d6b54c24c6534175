//! Dyson Sphere Program blueprint toolkit
//!
//! Decodes the binary payload of a blueprint into typed areas and buildings,
//! re-encodes it byte-for-byte, and wraps it in the game's text envelope.

pub mod assess;
pub mod blueprint;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;

pub use assess::{Annotation, Assessment, ItemFlow, SizeAssessment};
pub use blueprint::{
    Anomaly, Area, BlueprintData, BlueprintHasher, Building, BuildingHeader, BuildingParameters,
    DecodeOptions, Envelope, Header, TrailingPolicy, Validation,
};
pub use catalog::{Item, MachineTable, Recipe, RecipeTable};
pub use config::Config;
pub use error::{Error, Result};
