//! Generated descriptions, icons and filing folders
//!
//! Short descriptions read
//! `<output> <rate>ips (<scale><width><proliferator>-<tech>-<recipes><i per advanced recipe>)`,
//! so variants of the same build sort together and differ only where they
//! differ in scale or tier.

use std::path::{Component, Path, PathBuf};

use super::{item_name, Assessment};
use crate::blueprint::Envelope;
use crate::catalog::{Item, MachineTable, ProductCategory, Recipe};

pub const LAYOUT_SINGLE: u32 = 10;
pub const LAYOUT_UPPER_RIGHT: u32 = 22;
pub const LAYOUT_UPPER_LEFT: u32 = 23;
/// Large icon with one in the upper left and one in the lower right
pub const LAYOUT_THREE: u32 = 32;

/// Recipes that start from a rare resource, with that resource as their icon
const ADVANCED_RECIPES: [(Recipe, Item); 7] = [
    (Recipe::CasimirCrystalAdvanced, Item::OpticalGratingCrystal),
    (Recipe::GrapheneAdvanced, Item::FireIce),
    (Recipe::CarbonNanotubeAdvanced, Item::SpiniformStalagmiteCrystal),
    (Recipe::DiamondAdvanced, Item::KimberliteOre),
    (Recipe::CrystalSiliconAdvanced, Item::FractalSilicon),
    (Recipe::PhotonCombinerAdvanced, Item::OpticalGratingCrystal),
    (Recipe::ParticleContainerAdvanced, Item::UnipolarMagnet),
];

fn roman(level: u32) -> &'static str {
    match level {
        0 => "0",
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        6 => "VI",
        7 => "VII",
        _ => "",
    }
}

fn proliferator_mark(proliferator: Option<Item>) -> &'static str {
    match proliferator {
        Some(Item::ProliferatorMkI) => "+1",
        Some(Item::ProliferatorMkII) => "+2",
        Some(Item::ProliferatorMkIII) => "+3",
        _ => "",
    }
}

fn icon(item: Item) -> u32 {
    item.id() as u32
}

/// Outcome of offering a generated text to an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextUpdate {
    Unchanged,
    Written,
    /// Existing text kept because overwriting was not requested
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptionUpdate {
    pub short_desc: TextUpdate,
    pub long_desc: TextUpdate,
}

/// Descriptions and icons derived from an assessment
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub short_desc: String,
    pub long_desc: String,
    pub layout: u32,
    /// Leading icon slots; later slots keep whatever the envelope has
    pub icons: Vec<u32>,
}

impl Annotation {
    pub fn new(assessment: &Assessment, machines: &MachineTable) -> Self {
        let primary = assessment.primary_output();
        let proliferator = assessment.proliferator();
        let advanced: Vec<Item> = ADVANCED_RECIPES
            .iter()
            .filter(|(recipe, _)| assessment.recipe_counts().contains_key(recipe))
            .map(|&(_, item)| item)
            .collect();
        let production_building = assessment
            .building_counts()
            .keys()
            .filter_map(|&id| Item::from_building_id(id))
            .find(|&item| machines.contains(item));

        let (name, rate) = match primary {
            Some((item, rate)) => (item.to_string(), rate),
            None => ("None".to_string(), 0.0),
        };
        let (scale, widths) = match assessment.size() {
            Some(size) => (size.height_scale().to_string(), size.sector_widths().to_string()),
            None => (String::new(), String::new()),
        };
        let short_desc = format!(
            "{} {:5.1}ips ({}{}{}-{}-{}{})",
            name,
            rate,
            scale,
            widths,
            proliferator_mark(proliferator),
            roman(assessment.tech_level()),
            assessment.recipe_counts().len(),
            "i".repeat(advanced.len())
        );

        let primary_icon = primary.map_or(0, |(item, _)| icon(item));
        let secondary = advanced.first().copied().or(production_building);
        let shown = [advanced.first().copied(), production_building, proliferator]
            .iter()
            .flatten()
            .count();
        let (layout, icons) = match (shown, proliferator) {
            (0, _) => (LAYOUT_SINGLE, vec![primary_icon]),
            (1, Some(p)) => (LAYOUT_UPPER_RIGHT, vec![primary_icon, icon(p)]),
            (1, None) => (LAYOUT_UPPER_LEFT, vec![primary_icon, secondary.map_or(0, icon)]),
            _ => (
                LAYOUT_THREE,
                vec![
                    primary_icon,
                    secondary.map_or(0, icon),
                    proliferator.or(production_building).map_or(0, icon),
                ],
            ),
        };

        Self { short_desc, long_desc: long_description(assessment), layout, icons }
    }

    /// Set the icons unless the envelope already shows them
    pub fn apply_icons(&self, envelope: &mut Envelope) {
        let mut icons = *envelope.icons();
        for (slot, &icon) in icons.iter_mut().zip(&self.icons) {
            *slot = icon;
        }
        if envelope.layout() != self.layout {
            envelope.set_layout(self.layout);
        }
        if *envelope.icons() != icons {
            envelope.set_icons(icons);
        }
    }

    /// Write descriptions that are blank, or every description with `overwrite`
    pub fn apply_descriptions(&self, envelope: &mut Envelope, overwrite: bool) -> DescriptionUpdate {
        let short_desc = offer(envelope.short_desc(), &self.short_desc, overwrite);
        if short_desc == TextUpdate::Written {
            envelope.set_short_desc(&self.short_desc);
        }
        let long_desc = offer(envelope.long_desc().unwrap_or(""), &self.long_desc, overwrite);
        if long_desc == TextUpdate::Written {
            envelope.set_long_desc(&self.long_desc);
        }
        DescriptionUpdate { short_desc, long_desc }
    }
}

fn offer(current: &str, generated: &str, overwrite: bool) -> TextUpdate {
    if current == generated {
        TextUpdate::Unchanged
    } else if overwrite || current.is_empty() {
        TextUpdate::Written
    } else {
        TextUpdate::Skipped
    }
}

fn long_description(assessment: &Assessment) -> String {
    let mut lines = Vec::new();
    for (item, rate) in assessment.outputs().iter() {
        lines.push(format!("{}: {:.1}/sec", item, rate));
    }
    lines.push(String::new());
    lines.push("Inputs:".to_string());
    for (item, rate) in assessment.inputs().iter() {
        lines.push(format!("    {:20}: {:6.1}/sec", item, rate));
    }
    lines.push(String::new());

    let imports = assessment.additional_imports();
    if !imports.is_empty() {
        let names: Vec<String> = imports.into_iter().map(item_name).collect();
        lines.push(format!("Additional imports: {}", names.join(", ")));
    }
    let exports = assessment.additional_exports();
    if !exports.is_empty() {
        let names: Vec<String> = exports.into_iter().map(item_name).collect();
        lines.push(format!("Additional exports: {}", names.join(", ")));
    }
    lines.join("\n")
}

/// Everything up to and including the first `Blueprint` directory of
/// `folder`, or `folder` itself when there is none
fn blueprint_root(folder: &Path) -> PathBuf {
    let mut root = PathBuf::new();
    for component in folder.components() {
        root.push(component);
        if component == Component::Normal("Blueprint".as_ref()) {
            return root;
        }
    }
    root
}

/// Folder a blueprint currently in `folder` should be filed in
///
/// Science goes to `Science/Science - <matrix>`. Builds without a logistics
/// station at tech level III or below are early-game helpers and go to
/// `Bootstrap`. Everything else goes to its product category. Blueprints
/// with no categorised output stay where they are.
pub fn destination_folder(folder: &Path, assessment: &Assessment) -> PathBuf {
    let Some((item, _)) = assessment.primary_output() else {
        return folder.to_path_buf();
    };
    let Some(category) = ProductCategory::of(item) else {
        return folder.to_path_buf();
    };

    let root = blueprint_root(folder);
    if category == ProductCategory::ScienceMatrix {
        return root.join(category.folder()).join(format!("{} - {}", category.folder(), item));
    }

    let counts = assessment.building_counts();
    let has_station = [Item::PlanetaryLogisticsStation, Item::InterstellarLogisticsStation]
        .iter()
        .any(|station| counts.contains_key(&(station.id() as u16)));
    if !has_station && assessment.tech_level() <= 3 {
        return root.join("Bootstrap");
    }
    root.join(category.folder())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assess::tests::{assess, blueprint, building, gear_factory};

    #[test]
    fn test_gear_factory_annotation() {
        let annotation = Annotation::new(&assess(&gear_factory()), &MachineTable::standard());

        assert_eq!(annotation.short_desc, "Gear   9.0ips (C3+2-I-2)");
        assert_eq!(annotation.layout, LAYOUT_THREE);
        assert_eq!(annotation.icons, vec![1201, Item::ArcSmelter.id() as u32, 1142]);

        let expected = [
            "Gear: 9.0/sec".to_string(),
            String::new(),
            "Inputs:".to_string(),
            format!("    {:20}:    4.0/sec", "IronOre"),
            String::new(),
            "Additional imports: ProliferatorMkII".to_string(),
        ]
        .join("\n");
        assert_eq!(annotation.long_desc, expected);
    }

    #[test]
    fn test_advanced_recipe_marks_and_icons() {
        let data = blueprint(vec![building(0, Item::ChemicalPlant, Recipe::GrapheneAdvanced.id(), vec![0])]);
        let annotation = Annotation::new(&assess(&data), &MachineTable::standard());

        assert!(annotation.short_desc.starts_with("Graphene "));
        assert!(annotation.short_desc.ends_with("(C3-I-1i)"));
        assert_eq!(annotation.layout, LAYOUT_THREE);
        assert_eq!(
            annotation.icons,
            vec![
                Item::Graphene.id() as u32,
                Item::FireIce.id() as u32,
                Item::ChemicalPlant.id() as u32
            ]
        );
    }

    #[test]
    fn test_icon_layouts() {
        let data = blueprint(vec![building(0, Item::AssemblingMachineMkI, Recipe::Gear.id(), vec![0])]);
        let annotation = Annotation::new(&assess(&data), &MachineTable::standard());
        assert_eq!(annotation.layout, LAYOUT_UPPER_LEFT);
        assert_eq!(annotation.icons, vec![1201, 2303]);

        let empty = Annotation::new(&assess(&blueprint(Vec::new())), &MachineTable::standard());
        assert_eq!(empty.layout, LAYOUT_SINGLE);
        assert_eq!(empty.icons, vec![0]);
        assert!(empty.short_desc.starts_with("None   0.0ips"));
    }

    #[test]
    fn test_destination_folder() {
        let folder = Path::new("/games/Dyson Sphere Program/Blueprint/Unsorted/New");
        let root = Path::new("/games/Dyson Sphere Program/Blueprint");

        assert_eq!(destination_folder(folder, &assess(&gear_factory())), root.join("Components"));

        let hand_fed = blueprint(vec![building(0, Item::AssemblingMachineMkI, Recipe::Gear.id(), vec![0])]);
        assert_eq!(destination_folder(folder, &assess(&hand_fed)), root.join("Bootstrap"));

        let science = blueprint(vec![building(0, Item::MatrixLab, Recipe::ElectromagneticMatrix.id(), vec![0])]);
        assert_eq!(
            destination_folder(folder, &assess(&science)),
            root.join("Science").join("Science - ElectromagneticMatrix")
        );

        assert_eq!(destination_folder(folder, &assess(&blueprint(Vec::new()))), folder);
        let elsewhere = Path::new("/tmp/plans");
        assert_eq!(destination_folder(elsewhere, &assess(&hand_fed)), elsewhere.join("Bootstrap"));
    }

    #[test]
    fn test_apply_respects_existing_text() {
        let annotation = Annotation::new(&assess(&gear_factory()), &MachineTable::standard());

        let mut envelope = Envelope::new(10, "0.10.30", vec![1]);
        let update = annotation.apply_descriptions(&mut envelope, false);
        assert_eq!(update, DescriptionUpdate { short_desc: TextUpdate::Written, long_desc: TextUpdate::Written });
        assert_eq!(envelope.short_desc(), annotation.short_desc);

        envelope.set_short_desc("My gears");
        let update = annotation.apply_descriptions(&mut envelope, false);
        assert_eq!(update, DescriptionUpdate { short_desc: TextUpdate::Skipped, long_desc: TextUpdate::Unchanged });
        assert_eq!(envelope.short_desc(), "My gears");

        let update = annotation.apply_descriptions(&mut envelope, true);
        assert_eq!(update.short_desc, TextUpdate::Written);
        assert_eq!(envelope.short_desc(), annotation.short_desc);
    }

    #[test]
    fn test_apply_icons_keeps_later_slots() {
        let annotation = Annotation::new(&assess(&gear_factory()), &MachineTable::standard());
        let mut envelope = Envelope::new(10, "0.10.30", vec![1]);
        envelope.set_icons([9, 9, 9, 9, 7]);

        annotation.apply_icons(&mut envelope);
        assert_eq!(envelope.layout(), LAYOUT_THREE);
        assert_eq!(*envelope.icons(), [1201, Item::ArcSmelter.id() as u32, 1142, 9, 7]);
    }
}
