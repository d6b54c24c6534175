use std::collections::HashMap;

use super::ids::id_enum;
use super::items::Item;

id_enum! {
    /// Recipe ids as stored in a building header
    pub enum Recipe: u16 {
        IronIngot = 1,
        Magnet = 2,
        CopperIngot = 3,
        StoneBrick = 4,
        Gear = 5,
        MagneticCoil = 6,
        WindTurbine = 7,
        TeslaTower = 8,
        ElectromagneticMatrix = 9,
        MatrixLab = 10,
        Prism = 11,
        PlasmaExciter = 12,
        WirelessPowerTower = 13,
        OilExtractor = 14,
        OilRefinery = 15,
        PlasmaRefining = 16,
        EnergeticGraphite = 17,
        EnergyMatrix = 18,
        HydrogenFuelRod = 19,
        Thruster = 20,
        ReinforcedThruster = 21,
        ChemicalPlant = 22,
        Plastic = 23,
        SulfuricAcid = 24,
        OrganicCrystal = 25,
        TitaniumCrystal = 26,
        StructureMatrix = 27,
        CasimirCrystal = 28,
        CasimirCrystalAdvanced = 29,
        TitaniumGlass = 30,
        Graphene = 31,
        GrapheneAdvanced = 32,
        CarbonNanotube = 33,
        Silicon = 34,
        CarbonNanotubeAdvanced = 35,
        ParticleBroadband = 36,
        CrystalSilicon = 37,
        PlaneFilter = 38,
        MiniatureParticleCollider = 39,
        Deuterium = 40,
        DeuteronFuelRod = 41,
        AnnihilationConstraintSphere = 42,
        ArtificialStar = 43,
        AntimatterFuelRod = 44,
        AssemblerI = 45,
        AssemblerII = 46,
        AssemblerIII = 47,
        MiningMachine = 48,
        WaterPump = 49,
        CircuitBoard = 50,
        Processor = 51,
        QuantumChip = 52,
        MicrocrystallineComponent = 53,
        OrganicCrystalOriginal = 54,
        InformationMatrix = 55,
        ArcSmelter = 56,
        Glass = 57,
        XRayCracking = 58,
        HighPuritySilicon = 59,
        Diamond = 60,
        DiamondAdvanced = 61,
        CrystalSiliconAdvanced = 62,
        Steel = 63,
        ThermalPowerPlant = 64,
        TitaniumIngot = 65,
        TitaniumAlloy = 66,
        SolarPanel = 67,
        PhotonCombiner = 68,
        PhotonCombinerAdvanced = 69,
        SolarSail = 70,
        EmRailEjector = 71,
        RayReceiver = 72,
        SatelliteSubstation = 73,
        AntiMatter = 74,
        UniverseMatrix = 75,
        Accumulator = 76,
        EnergyExchange = 77,
        SpaceWarper = 78,
        SpaceWarperAdvanced = 79,
        FrameMaterial = 80,
        DysonSphereComponent = 81,
        VerticalLaunchingSilo = 82,
        SmallCarrierRocket = 83,
        BeltI = 84,
        SorterI = 85,
        StorageI = 86,
        Splitter = 87,
        SorterII = 88,
        BeltII = 89,
        SorterIII = 90,
        StorageII = 91,
        BeltIII = 92,
        PlanetaryLogisticsStation = 93,
        LogisticsDrone = 94,
        InterstellarLogisticsStation = 95,
        LogisticsVessel = 96,
        ElectricMotor = 97,
        ElectromagneticTurbine = 98,
        ParticleContainer = 99,
        ParticleContainerAdvanced = 100,
        GravitonLens = 101,
        GravityMatrix = 102,
        SuperMagneticRing = 103,
        StrangeMatter = 104,
        Engine = 105,
        ProliferatorI = 106,
        ProliferatorII = 107,
        ProliferatorIII = 108,
        SprayCoater = 109,
        Fractionator = 110,
        OrbitalCollector = 111,
        Foundation = 112,
        MiniFusionPowerPlant = 113,
        StorageTank = 114,
        DeuteriumFractionation = 115,
        PlaneSmelter = 116,
        TrafficMonitor = 117,
        GeothermalPowerStation = 118,
        AdvancedMiningMachine = 119,
        AutomaticPiler = 120,
        ReformingRefine = 121,
        LogisticsDistributor = 122,
        LogisticsBot = 123,
        QuantumChemicalPlant = 124,
        CombustibleUnit = 133,
        ExplosiveUnit = 134,
        CrystalExplosiveUnit = 135,
        MagnumAmmoBox = 136,
        TitaniumAmmoBox = 137,
        TitaniumAlloyAmmoBox = 138,
        MissileSet = 144,
        SupersonicMissileSet = 145,
        GravityMissileSet = 146,
    }
}

/// Inputs and outputs of one crafting cycle
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetails {
    pub inputs: Vec<(Item, f64)>,
    pub outputs: Vec<(Item, f64)>,
    /// Cycle length in seconds
    pub period: f64,
}

impl RecipeDetails {
    pub fn new(inputs: &[(Item, f64)], outputs: &[(Item, f64)], period: f64) -> Self {
        Self {
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
            period,
        }
    }

    /// Output rates per second for `machines` machine-equivalents
    pub fn output_rates(&self, machines: f64, product_multiplier: f64) -> Vec<(Item, f64)> {
        let scale = machines / self.period * product_multiplier;
        self.outputs.iter().map(|&(item, amount)| (item, amount * scale)).collect()
    }

    /// Input rates per second for `machines` machine-equivalents
    pub fn input_rates(&self, machines: f64) -> Vec<(Item, f64)> {
        let scale = machines / self.period;
        self.inputs.iter().map(|&(item, amount)| (item, amount * scale)).collect()
    }
}

/// Recipe -> production details
#[derive(Debug, Clone, Default)]
pub struct RecipeTable {
    recipes: HashMap<Recipe, RecipeDetails>,
}

impl RecipeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, recipe: Recipe, details: RecipeDetails) {
        self.recipes.insert(recipe, details);
    }

    pub fn get(&self, recipe: Recipe) -> Option<&RecipeDetails> {
        self.recipes.get(&recipe)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Production details for the recipes the assessment understands
    pub fn standard() -> Self {
        use Item::*;

        let mut table = Self::new();
        let mut add = |recipe, inputs: &[(Item, f64)], outputs: &[(Item, f64)], period| {
            table.add(recipe, RecipeDetails::new(inputs, outputs, period));
        };

        add(Recipe::Foundation, &[(Steel, 1.0), (StoneBrick, 3.0)], &[(Foundation, 1.0)], 3.0);
        add(Recipe::Gear, &[(IronIngot, 1.0)], &[(Gear, 1.0)], 1.0);

        add(Recipe::MagneticCoil, &[(CopperIngot, 1.0), (Magnet, 2.0)], &[(MagneticCoil, 2.0)], 1.0);
        add(Recipe::ElectricMotor, &[(MagneticCoil, 1.0), (IronIngot, 2.0), (Gear, 1.0)], &[(ElectricMotor, 1.0)], 2.0);
        add(Recipe::ElectromagneticTurbine, &[(ElectricMotor, 2.0), (MagneticCoil, 2.0)], &[(ElectromagneticTurbine, 1.0)], 2.0);
        add(Recipe::SuperMagneticRing, &[(ElectromagneticTurbine, 2.0), (EnergeticGraphite, 3.0), (Magnet, 1.0)], &[(SuperMagneticRing, 1.0)], 3.0);
        add(Recipe::ParticleContainer, &[(ElectromagneticTurbine, 2.0), (CopperIngot, 2.0)], &[(ParticleContainer, 1.0)], 4.0);

        add(Recipe::CircuitBoard, &[(CopperIngot, 1.0), (IronIngot, 2.0)], &[(CircuitBoard, 2.0)], 1.0);
        add(Recipe::MicrocrystallineComponent, &[(HighPuritySilicon, 2.0), (CopperIngot, 1.0)], &[(MicrocrystallineComponent, 1.0)], 3.0);
        add(Recipe::Processor, &[(CircuitBoard, 2.0), (MicrocrystallineComponent, 2.0)], &[(Processor, 1.0)], 3.0);

        add(Recipe::Prism, &[(Glass, 3.0)], &[(Prism, 2.0)], 2.0);
        add(Recipe::PlasmaExciter, &[(Prism, 2.0), (MagneticCoil, 4.0)], &[(PlasmaExciter, 1.0)], 2.0);
        add(Recipe::PhotonCombiner, &[(Prism, 2.0), (CircuitBoard, 1.0)], &[(PhotonCombiner, 1.0)], 3.0);
        add(Recipe::PhotonCombinerAdvanced, &[(OpticalGratingCrystal, 1.0), (CircuitBoard, 1.0)], &[(PhotonCombiner, 1.0)], 3.0);

        add(Recipe::FrameMaterial, &[(CarbonNanotube, 4.0), (TitaniumAlloy, 1.0), (HighPuritySilicon, 1.0)], &[(FrameMaterial, 1.0)], 6.0);
        add(Recipe::DysonSphereComponent, &[(FrameMaterial, 3.0), (SolarSail, 3.0), (Processor, 3.0)], &[(DysonSphereComponent, 1.0)], 8.0);
        add(Recipe::SmallCarrierRocket, &[(DysonSphereComponent, 2.0), (QuantumChip, 2.0), (DeuteronFuelRod, 4.0)], &[(SmallCarrierRocket, 1.0)], 6.0);

        add(Recipe::QuantumChip, &[(Processor, 2.0), (PlaneFilter, 2.0)], &[(QuantumChip, 1.0)], 6.0);

        add(Recipe::GravitonLens, &[(Diamond, 4.0), (StrangeMatter, 1.0)], &[(GravitonLens, 1.0)], 6.0);
        add(Recipe::ParticleBroadband, &[(CarbonNanotube, 2.0), (CrystalSilicon, 2.0), (Plastic, 1.0)], &[(ParticleBroadband, 1.0)], 8.0);
        add(Recipe::SpaceWarperAdvanced, &[(GravityMatrix, 1.0)], &[(SpaceWarper, 8.0)], 10.0);

        add(Recipe::TitaniumGlass, &[(Glass, 2.0), (TitaniumIngot, 2.0), (Water, 2.0)], &[(TitaniumGlass, 2.0)], 5.0);
        add(Recipe::TitaniumCrystal, &[(OrganicCrystal, 1.0), (TitaniumIngot, 3.0)], &[(TitaniumCrystal, 1.0)], 4.0);
        add(Recipe::CasimirCrystal, &[(TitaniumCrystal, 1.0), (Graphene, 2.0), (Hydrogen, 12.0)], &[(CasimirCrystal, 1.0)], 4.0);
        add(Recipe::CasimirCrystalAdvanced, &[(OpticalGratingCrystal, 8.0), (Graphene, 2.0), (Hydrogen, 12.0)], &[(CasimirCrystal, 1.0)], 4.0);
        add(Recipe::PlaneFilter, &[(TitaniumGlass, 2.0), (CasimirCrystal, 1.0)], &[(PlaneFilter, 1.0)], 12.0);

        add(Recipe::HydrogenFuelRod, &[(TitaniumIngot, 1.0), (Hydrogen, 10.0)], &[(HydrogenFuelRod, 2.0)], 6.0);
        add(Recipe::DeuteronFuelRod, &[(TitaniumAlloy, 1.0), (SuperMagneticRing, 1.0), (Deuterium, 20.0)], &[(DeuteronFuelRod, 2.0)], 12.0);
        add(Recipe::AntimatterFuelRod, &[(TitaniumAlloy, 1.0), (AnnihilationConstraintSphere, 1.0), (Hydrogen, 12.0), (Antimatter, 12.0)], &[(AntimatterFuelRod, 2.0)], 24.0);

        // Ammo
        add(Recipe::MagnumAmmoBox, &[(CopperIngot, 4.0)], &[(MagnumAmmoBox, 1.0)], 1.0);
        add(Recipe::TitaniumAmmoBox, &[(TitaniumIngot, 2.0), (MagnumAmmoBox, 1.0)], &[(TitaniumAmmoBox, 1.0)], 2.0);
        add(Recipe::TitaniumAlloyAmmoBox, &[(TitaniumAlloy, 2.0), (TitaniumAmmoBox, 1.0)], &[(TitaniumAlloyAmmoBox, 1.0)], 3.0);

        // Science
        add(Recipe::ElectromagneticMatrix, &[(CircuitBoard, 1.0), (MagneticCoil, 1.0)], &[(ElectromagneticMatrix, 1.0)], 3.0);
        add(Recipe::EnergyMatrix, &[(EnergeticGraphite, 2.0), (Hydrogen, 2.0)], &[(EnergyMatrix, 1.0)], 6.0);
        add(Recipe::StructureMatrix, &[(TitaniumCrystal, 1.0), (Diamond, 1.0)], &[(StructureMatrix, 1.0)], 8.0);
        add(Recipe::InformationMatrix, &[(Processor, 2.0), (ParticleBroadband, 1.0)], &[(InformationMatrix, 1.0)], 10.0);
        add(Recipe::GravityMatrix, &[(GravitonLens, 1.0), (QuantumChip, 2.0)], &[(GravityMatrix, 2.0)], 24.0);
        add(
            Recipe::UniverseMatrix,
            &[
                (ElectromagneticMatrix, 1.0),
                (EnergyMatrix, 1.0),
                (StructureMatrix, 1.0),
                (InformationMatrix, 1.0),
                (GravityMatrix, 1.0),
                (Antimatter, 1.0),
            ],
            &[(UniverseMatrix, 1.0)],
            15.0,
        );

        // Smelting
        add(Recipe::IronIngot, &[(IronOre, 1.0)], &[(IronIngot, 1.0)], 1.0);
        add(Recipe::Magnet, &[(IronOre, 1.0)], &[(Magnet, 1.0)], 1.5);
        add(Recipe::Steel, &[(IronIngot, 3.0)], &[(Steel, 1.0)], 3.0);
        add(Recipe::CopperIngot, &[(CopperOre, 1.0)], &[(CopperIngot, 1.0)], 1.0);
        add(Recipe::HighPuritySilicon, &[(SiliconOre, 1.0)], &[(HighPuritySilicon, 1.0)], 2.0);
        add(Recipe::TitaniumIngot, &[(TitaniumOre, 1.0)], &[(TitaniumIngot, 1.0)], 2.0);
        add(Recipe::EnergeticGraphite, &[(Coal, 1.0)], &[(EnergeticGraphite, 1.0)], 2.0);
        add(Recipe::StoneBrick, &[(Stone, 1.0)], &[(StoneBrick, 1.0)], 1.0);
        add(Recipe::Glass, &[(Stone, 2.0)], &[(Glass, 1.0)], 2.0);
        add(Recipe::Diamond, &[(EnergeticGraphite, 1.0)], &[(Diamond, 1.0)], 2.0);
        add(Recipe::DiamondAdvanced, &[(KimberliteOre, 1.0)], &[(Diamond, 2.0)], 1.5);
        add(Recipe::TitaniumAlloy, &[(TitaniumIngot, 4.0), (Steel, 4.0), (SulfuricAcid, 4.0)], &[(TitaniumAlloy, 4.0)], 12.0);
        add(Recipe::CrystalSilicon, &[(HighPuritySilicon, 1.0)], &[(CrystalSilicon, 1.0)], 2.0);

        // Particle collider
        add(Recipe::Deuterium, &[(Hydrogen, 24.0)], &[(Deuterium, 12.0)], 6.0);
        add(Recipe::StrangeMatter, &[(IronIngot, 2.0), (ParticleContainer, 2.0), (Deuterium, 10.0)], &[(StrangeMatter, 1.0)], 8.0);

        // Refinery
        add(Recipe::PlasmaRefining, &[(CrudeOil, 2.0)], &[(RefinedOil, 2.0), (Hydrogen, 1.0)], 4.0);
        add(Recipe::XRayCracking, &[(RefinedOil, 1.0), (Hydrogen, 2.0)], &[(EnergeticGraphite, 1.0), (Hydrogen, 3.0)], 4.0);

        // Chemistry
        add(Recipe::SulfuricAcid, &[(Stone, 4.0), (RefinedOil, 3.0), (Water, 2.0)], &[(SulfuricAcid, 2.0)], 3.0);
        add(Recipe::Plastic, &[(RefinedOil, 2.0), (EnergeticGraphite, 1.0)], &[(Plastic, 1.0)], 3.0);
        add(Recipe::Graphene, &[(EnergeticGraphite, 3.0), (SulfuricAcid, 1.0)], &[(Graphene, 2.0)], 3.0);
        add(Recipe::GrapheneAdvanced, &[(FireIce, 2.0)], &[(Graphene, 2.0), (Hydrogen, 1.0)], 2.0);
        add(Recipe::CarbonNanotube, &[(Graphene, 3.0), (TitaniumIngot, 1.0)], &[(CarbonNanotube, 2.0)], 4.0);
        add(Recipe::OrganicCrystal, &[(Plastic, 2.0), (RefinedOil, 1.0), (Water, 1.0)], &[(OrganicCrystal, 8.0)], 6.0);

        table
    }
}

/// Extra-product multiplier granted by a proliferator tier
pub fn proliferation_multiplier(proliferator: Item) -> Option<f64> {
    match proliferator {
        Item::ProliferatorMkI => Some(1.125),
        Item::ProliferatorMkII => Some(1.2),
        Item::ProliferatorMkIII => Some(1.25),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_lookup() {
        assert_eq!(Recipe::from_id(5), Some(Recipe::Gear));
        assert_eq!(Recipe::from_name("gear"), Some(Recipe::Gear));
        assert_eq!(Recipe::from_id(500), None);
    }

    #[test]
    fn test_standard_table_rates() {
        let table = RecipeTable::standard();
        let gear = table.get(Recipe::Gear).unwrap();

        assert_eq!(gear.output_rates(2.0, 1.0), vec![(Item::Gear, 2.0)]);
        assert_eq!(gear.input_rates(0.75), vec![(Item::IronIngot, 0.75)]);

        let magnet = table.get(Recipe::Magnet).unwrap();
        assert_eq!(magnet.output_rates(3.0, 1.0), vec![(Item::Magnet, 2.0)]);
    }

    #[test]
    fn test_proliferation_multiplier() {
        assert_eq!(proliferation_multiplier(Item::ProliferatorMkIII), Some(1.25));
        assert_eq!(proliferation_multiplier(Item::Gear), None);
    }
}
