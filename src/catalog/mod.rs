//! Static game tables
//!
//! Item and recipe enumerations, building classification, and the machine
//! and recipe tables used by the assessment. These are pure lookups; nothing
//! here is registered at runtime.

mod ids;
pub mod items;
pub mod machines;
pub mod recipes;

pub use items::{
    BuildingCategory, Item, LogisticsDirection, ProductCategory, ProliferationEffect,
    CONVEYORS, PRODUCTION_MACHINES,
};
pub use machines::{Machine, MachineTable};
pub use recipes::{proliferation_multiplier, Recipe, RecipeDetails, RecipeTable};
