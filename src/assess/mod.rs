//! Production and footprint assessment of a decoded blueprint
//!
//! Flows are steady-state rates in items per second, assuming every machine
//! runs continuously and, when a proliferator is imported, that every output
//! gets the extra-product bonus.

mod annotate;
mod flow;
mod size;

pub use annotate::{destination_folder, Annotation, DescriptionUpdate, TextUpdate};
pub use flow::ItemFlow;
pub use size::{Sector, SizeAssessment, SECTORS};

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::blueprint::{BlueprintData, BuildingParameters};
use crate::catalog::{
    proliferation_multiplier, BuildingCategory, Item, LogisticsDirection, MachineTable, Recipe, RecipeTable,
};

/// Tech level used for the best-case output estimate
pub const MAX_TECH_LEVEL: u32 = 10;

const PROLIFERATORS: [Item; 3] = [Item::ProliferatorMkIII, Item::ProliferatorMkII, Item::ProliferatorMkI];

#[derive(Debug, Clone)]
pub struct Assessment {
    building_counts: BTreeMap<u16, usize>,
    recipe_counts: BTreeMap<Recipe, usize>,
    building_recipe_counts: BTreeMap<(u16, Recipe), usize>,
    imports: BTreeSet<u32>,
    exports: BTreeSet<u32>,
    proliferator: Option<Item>,
    inputs: ItemFlow,
    outputs: ItemFlow,
    intermediate_inputs: ItemFlow,
    intermediate_outputs: ItemFlow,
    max_outputs: ItemFlow,
    tech_level: u32,
    size: Option<SizeAssessment>,
}

impl Assessment {
    pub fn new(data: &BlueprintData, machines: &MachineTable, recipes: &RecipeTable) -> Self {
        let mut building_counts = BTreeMap::new();
        let mut recipe_counts = BTreeMap::new();
        let mut building_recipe_counts = BTreeMap::new();
        let mut imports = BTreeSet::new();
        let mut exports = BTreeSet::new();

        for building in data.buildings() {
            let header = building.header();
            *building_counts.entry(header.item_id).or_insert(0) += 1;

            if header.recipe_id != 0 {
                match building.recipe() {
                    Some(recipe) => {
                        *recipe_counts.entry(recipe).or_insert(0) += 1;
                        *building_recipe_counts.entry((header.item_id, recipe)).or_insert(0) += 1;
                    }
                    None => warn!("Unknown recipe id {}", header.recipe_id),
                }
            }

            match building.parameters() {
                BuildingParameters::Station(station) => {
                    let interstellar = building.category() == BuildingCategory::InterstellarStation;
                    for entry in station.storage().iter().flatten() {
                        let logic = if interstellar { entry.remote_logic } else { entry.local_logic };
                        match logic {
                            LogisticsDirection::Input => {
                                imports.insert(entry.item_id);
                            }
                            LogisticsDirection::Output => {
                                exports.insert(entry.item_id);
                            }
                            LogisticsDirection::Unused => {}
                        }
                    }
                }
                BuildingParameters::Distributor(distributor) if header.filter_id != 0 => {
                    let item_id = u32::from(header.filter_id);
                    match distributor.supply_logic {
                        LogisticsDirection::Input => {
                            imports.insert(item_id);
                        }
                        LogisticsDirection::Output => {
                            exports.insert(item_id);
                        }
                        LogisticsDirection::Unused => {}
                    }
                }
                _ => {}
            }
        }

        let proliferator = PROLIFERATORS
            .into_iter()
            .find(|p| imports.contains(&(p.id() as u32)));
        let product_multiplier = proliferator.and_then(proliferation_multiplier).unwrap_or(1.0);
        let best_multiplier = proliferation_multiplier(Item::ProliferatorMkIII).unwrap_or(1.0);

        let mut consumed = ItemFlow::new();
        let mut produced = ItemFlow::new();
        let mut best = ItemFlow::new();
        for (&(item_id, recipe), &count) in &building_recipe_counts {
            let Some(details) = recipes.get(recipe) else {
                warn!("Recipe {} has no production information", recipe);
                continue;
            };
            let Some(machine) = Item::from_building_id(item_id).and_then(|item| machines.get(item)) else {
                warn!("Item {} running {} has no production multiplier", item_id, recipe);
                continue;
            };

            let equivalent = machine.production_multiplier * count as f64;
            consumed += ItemFlow::from_rates(details.input_rates(equivalent));
            produced += ItemFlow::from_rates(details.output_rates(equivalent, product_multiplier));

            let top = machines.equivalent_at(machine.id, MAX_TECH_LEVEL);
            let top_multiplier = machines.production_multiplier(top).unwrap_or(machine.production_multiplier);
            best += ItemFlow::from_rates(details.output_rates(top_multiplier * count as f64, best_multiplier));
        }

        let (intermediate_inputs, inputs) = consumed.partition(|item| produced.contains(item));
        let (intermediate_outputs, outputs) = produced.partition(|item| consumed.contains(item));
        let (_, max_outputs) = best.partition(|item| consumed.contains(item));

        let tech_level = building_counts
            .keys()
            .filter_map(|&id| Item::from_building_id(id))
            .map(|item| machines.tech_level(item))
            .max()
            .unwrap_or(0);

        let size = SizeAssessment::new(data);
        debug!(
            "Assessed {} buildings: {} inputs, {} outputs, tech level {}",
            data.buildings().len(),
            inputs.len(),
            outputs.len(),
            tech_level
        );

        Self {
            building_counts,
            recipe_counts,
            building_recipe_counts,
            imports,
            exports,
            proliferator,
            inputs,
            outputs,
            intermediate_inputs,
            intermediate_outputs,
            max_outputs,
            tech_level,
            size,
        }
    }

    /// Building item id -> count
    pub fn building_counts(&self) -> &BTreeMap<u16, usize> {
        &self.building_counts
    }

    pub fn recipe_counts(&self) -> &BTreeMap<Recipe, usize> {
        &self.recipe_counts
    }

    /// (building item id, recipe) pairs, most common first
    pub fn machine_recap(&self) -> Vec<((u16, Recipe), usize)> {
        let mut recap: Vec<_> = self.building_recipe_counts.iter().map(|(&k, &v)| (k, v)).collect();
        recap.sort_by(|a, b| b.1.cmp(&a.1));
        recap
    }

    /// Item ids delivered into the blueprint by stations and distributors
    pub fn imports(&self) -> &BTreeSet<u32> {
        &self.imports
    }

    pub fn exports(&self) -> &BTreeSet<u32> {
        &self.exports
    }

    pub fn proliferator(&self) -> Option<Item> {
        self.proliferator
    }

    /// Consumed items nothing in the blueprint produces
    pub fn inputs(&self) -> &ItemFlow {
        &self.inputs
    }

    /// Produced items nothing in the blueprint consumes
    pub fn outputs(&self) -> &ItemFlow {
        &self.outputs
    }

    pub fn intermediate_inputs(&self) -> &ItemFlow {
        &self.intermediate_inputs
    }

    pub fn intermediate_outputs(&self) -> &ItemFlow {
        &self.intermediate_outputs
    }

    /// Outputs with every machine upgraded and MkIII proliferation
    pub fn max_outputs(&self) -> &ItemFlow {
        &self.max_outputs
    }

    /// Outputs positive, inputs negative
    pub fn net(&self) -> ItemFlow {
        self.outputs.clone() - self.inputs.clone()
    }

    pub fn primary_output(&self) -> Option<(Item, f64)> {
        self.outputs.primary_output()
    }

    pub fn tech_level(&self) -> u32 {
        self.tech_level
    }

    pub fn size(&self) -> Option<&SizeAssessment> {
        self.size.as_ref()
    }

    /// Imported item ids the production chain does not consume
    pub fn additional_imports(&self) -> Vec<u32> {
        self.imports
            .iter()
            .copied()
            .filter(|&id| Item::from_parameter(id).map_or(true, |item| !self.inputs.contains(item)))
            .collect()
    }

    /// Exported item ids the production chain does not produce
    pub fn additional_exports(&self) -> Vec<u32> {
        self.exports
            .iter()
            .copied()
            .filter(|&id| Item::from_parameter(id).map_or(true, |item| !self.outputs.contains(item)))
            .collect()
    }
}

fn item_name(id: u32) -> String {
    match Item::from_parameter(id) {
        Some(item) => item.to_string(),
        None => format!("[{}]", id),
    }
}

impl std::fmt::Display for Assessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Unique building types: {}, unique recipes: {}",
            self.building_counts.len(),
            self.recipe_counts.len()
        )?;
        writeln!(f, "Tech level: {}", self.tech_level)?;
        match &self.size {
            Some(size) => writeln!(f, "Area: {} | {} | {}", size, size.height_scale(), size.sector_widths())?,
            None => writeln!(f, "Area: none")?,
        }

        writeln!(f, "Machine recap:")?;
        for ((item_id, recipe), count) in self.machine_recap() {
            writeln!(f, "{:5}  {:>25} {:>20}", count, item_name(u32::from(item_id)), recipe)?;
        }

        let extra_imports = self.additional_imports();
        if !extra_imports.is_empty() {
            let names: Vec<String> = extra_imports.into_iter().map(item_name).collect();
            writeln!(f, "Additional imports: {}", names.join(", "))?;
        }
        let extra_exports = self.additional_exports();
        if !extra_exports.is_empty() {
            let names: Vec<String> = extra_exports.into_iter().map(item_name).collect();
            writeln!(f, "Additional exports: {}", names.join(", "))?;
        }

        writeln!(f, "Input/output summary")?;
        write!(f, "{}", self.net())?;
        match self.primary_output() {
            Some((item, rate)) => write!(f, "Primary output: {} @ {:.1}/sec", item, rate),
            None => write!(f, "Primary output: None"),
        }
    }
}
