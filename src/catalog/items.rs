use super::ids::id_enum;

id_enum! {
    /// Item ids, covering raw resources, intermediates and buildings
    pub enum Item: i32 {
        Lava = -1,

        // Raw resources
        Water = 1000,
        IronOre = 1001,
        CopperOre = 1002,
        SiliconOre = 1003,
        TitaniumOre = 1004,
        Stone = 1005,
        Coal = 1006,
        CrudeOil = 1007,
        FireIce = 1011,
        KimberliteOre = 1012,
        FractalSilicon = 1013,
        OpticalGratingCrystal = 1014,
        SpiniformStalagmiteCrystal = 1015,
        UnipolarMagnet = 1016,
        Log = 1030,
        PlantFuel = 1031,

        // Smelted and refined
        IronIngot = 1101,
        Magnet = 1102,
        Steel = 1103,
        CopperIngot = 1104,
        HighPuritySilicon = 1105,
        TitaniumIngot = 1106,
        TitaniumAlloy = 1107,
        StoneBrick = 1108,
        EnergeticGraphite = 1109,
        Glass = 1110,
        Prism = 1111,
        Diamond = 1112,
        CrystalSilicon = 1113,
        RefinedOil = 1114,
        Plastic = 1115,
        SulfuricAcid = 1116,
        OrganicCrystal = 1117,
        TitaniumCrystal = 1118,
        TitaniumGlass = 1119,
        Hydrogen = 1120,
        Deuterium = 1121,
        Antimatter = 1122,
        Graphene = 1123,
        CarbonNanotube = 1124,
        FrameMaterial = 1125,
        CasimirCrystal = 1126,
        StrangeMatter = 1127,
        CombustibleUnit = 1128,
        ExplosiveUnit = 1129,
        CrystalExplosiveUnit = 1130,
        Foundation = 1131,
        ProliferatorMkI = 1141,
        ProliferatorMkII = 1142,
        ProliferatorMkIII = 1143,

        // Components
        Gear = 1201,
        MagneticCoil = 1202,
        ElectricMotor = 1203,
        ElectromagneticTurbine = 1204,
        SuperMagneticRing = 1205,
        ParticleContainer = 1206,
        CriticalPhoton = 1208,
        GravitonLens = 1209,
        SpaceWarper = 1210,
        CircuitBoard = 1301,
        MicrocrystallineComponent = 1302,
        Processor = 1303,
        PlaneFilter = 1304,
        QuantumChip = 1305,
        PlasmaExciter = 1401,
        ParticleBroadband = 1402,
        AnnihilationConstraintSphere = 1403,
        PhotonCombiner = 1404,
        Thruster = 1405,
        ReinforcedThruster = 1406,
        SolarSail = 1501,
        DysonSphereComponent = 1502,
        SmallCarrierRocket = 1503,
        MagnumAmmoBox = 1601,
        TitaniumAmmoBox = 1602,
        TitaniumAlloyAmmoBox = 1603,
        MissileSet = 1609,
        SupersonicMissileSet = 1610,
        GravityMissileSet = 1611,
        HydrogenFuelRod = 1801,
        DeuteronFuelRod = 1802,
        AntimatterFuelRod = 1803,

        // Logistics
        ConveyorBeltMkI = 2001,
        ConveyorBeltMkII = 2002,
        ConveyorBeltMkIII = 2003,
        SorterMkI = 2011,
        SorterMkII = 2012,
        SorterMkIII = 2013,
        Splitter = 2020,
        TrafficMonitor = 2030,
        AutomaticPiler = 2040,
        StorageMkI = 2101,
        StorageMkII = 2102,
        PlanetaryLogisticsStation = 2103,
        InterstellarLogisticsStation = 2104,
        OrbitalCollector = 2105,
        StorageTank = 2106,
        LogisticsDistributor = 2107,

        // Power
        TeslaTower = 2201,
        WirelessPowerTower = 2202,
        WindTurbine = 2203,
        ThermalPowerStation = 2204,
        SolarPanel = 2205,
        Accumulator = 2206,
        AccumulatorFull = 2207,
        RayReceiver = 2208,
        EnergyExchanger = 2209,
        ArtificialStar = 2210,
        MiniFusionPowerStation = 2211,
        SatelliteSubstation = 2212,

        // Production
        MiningMachine = 2301,
        ArcSmelter = 2302,
        AssemblingMachineMkI = 2303,
        AssemblingMachineMkII = 2304,
        AssemblingMachineMkIII = 2305,
        WaterPump = 2306,
        OilExtractor = 2307,
        OilRefinery = 2308,
        ChemicalPlant = 2309,
        MiniatureParticleCollider = 2310,
        EmRailEjector = 2311,
        VerticalLaunchingSilo = 2312,
        SprayCoater = 2313,
        Fractionator = 2314,
        PlaneSmelter = 2315,
        AdvancedMiningMachine = 2316,
        QuantumChemicalPlant = 2317,
        MatrixLab = 2901,

        // Defense
        MissileTurret = 3005,
        SignalTower = 3007,
        ShieldGenerator = 3008,
        BattlefieldAnalysisBase = 3009,

        LogisticsDrone = 5001,
        LogisticsVessel = 5002,

        // Science
        ElectromagneticMatrix = 6001,
        EnergyMatrix = 6002,
        StructureMatrix = 6003,
        InformationMatrix = 6004,
        GravityMatrix = 6005,
        UniverseMatrix = 6006,
    }
}

impl Item {
    /// Look up an item id as stored in a building header
    pub fn from_building_id(id: u16) -> Option<Self> {
        Self::from_id(i32::from(id))
    }

    /// Look up an item id as stored in a parameter array
    pub fn from_parameter(value: u32) -> Option<Self> {
        i32::try_from(value).ok().and_then(Self::from_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LogisticsDirection {
    Unused = 0,
    Output = 1,
    Input = 2,
}

impl LogisticsDirection {
    pub fn from_raw(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Unused),
            1 => Some(Self::Output),
            2 => Some(Self::Input),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ProliferationEffect {
    Product = 0,
    Speedup = 1,
}

impl ProliferationEffect {
    pub fn from_raw(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Product),
            1 => Some(Self::Speedup),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        self as u32
    }
}

/// Product family a blueprint is filed under, named after its folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    ScienceMatrix,
    Material,
    Component,
    EndProduct,
    Smelted,
    Proliferator,
    Ammo,
}

impl ProductCategory {
    pub fn folder(self) -> &'static str {
        match self {
            Self::ScienceMatrix => "Science",
            Self::Material => "Materials",
            Self::Component => "Components",
            Self::EndProduct => "End Products",
            Self::Smelted => "Smelters",
            Self::Proliferator => "Proliferator",
            Self::Ammo => "Ammo",
        }
    }

    /// Category of a produced item; raw resources have none
    pub fn of(item: Item) -> Option<Self> {
        use Item::*;

        let category = match item {
            ElectromagneticMatrix | EnergyMatrix | StructureMatrix | InformationMatrix | GravityMatrix
            | UniverseMatrix => Self::ScienceMatrix,

            IronIngot | Magnet | Steel | CopperIngot | HighPuritySilicon | TitaniumIngot | TitaniumAlloy
            | StoneBrick | EnergeticGraphite | Glass | Diamond | CrystalSilicon => Self::Smelted,

            ProliferatorMkI | ProliferatorMkII | ProliferatorMkIII => Self::Proliferator,

            MagnumAmmoBox | TitaniumAmmoBox | TitaniumAlloyAmmoBox | MissileSet | SupersonicMissileSet
            | GravityMissileSet | CombustibleUnit | ExplosiveUnit | CrystalExplosiveUnit => Self::Ammo,

            Prism | RefinedOil | Plastic | SulfuricAcid | OrganicCrystal | TitaniumCrystal | TitaniumGlass
            | Hydrogen | Deuterium | Antimatter | Graphene | CarbonNanotube | CasimirCrystal | StrangeMatter
            | CriticalPhoton | Foundation => Self::Material,

            Gear | MagneticCoil | ElectricMotor | ElectromagneticTurbine | SuperMagneticRing | ParticleContainer
            | GravitonLens | CircuitBoard | MicrocrystallineComponent | Processor | PlaneFilter | QuantumChip
            | PlasmaExciter | ParticleBroadband | PhotonCombiner | AnnihilationConstraintSphere | Thruster
            | ReinforcedThruster | FrameMaterial => Self::Component,

            SolarSail | DysonSphereComponent | SmallCarrierRocket | SpaceWarper | HydrogenFuelRod
            | DeuteronFuelRod | AntimatterFuelRod | LogisticsDrone | LogisticsVessel => Self::EndProduct,

            // Buildings
            other if (2001..4000).contains(&other.id()) => Self::EndProduct,

            _ => return None,
        };
        Some(category)
    }
}

/// Parameter layout family of a placed building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildingCategory {
    PlanetaryStation,
    InterstellarStation,
    Distributor,
    Production,
    Conveyor,
    Other,
}

impl BuildingCategory {
    pub fn of(item: Option<Item>) -> Self {
        match item {
            Some(Item::PlanetaryLogisticsStation) => Self::PlanetaryStation,
            Some(Item::InterstellarLogisticsStation) => Self::InterstellarStation,
            Some(Item::LogisticsDistributor) => Self::Distributor,
            Some(item) if PRODUCTION_MACHINES.contains(&item) => Self::Production,
            Some(item) if CONVEYORS.contains(&item) => Self::Conveyor,
            _ => Self::Other,
        }
    }

    pub fn of_id(item_id: u16) -> Self {
        Self::of(Item::from_building_id(item_id))
    }
}

pub const PRODUCTION_MACHINES: &[Item] = &[
    Item::AssemblingMachineMkI,
    Item::AssemblingMachineMkII,
    Item::AssemblingMachineMkIII,
    Item::ChemicalPlant,
    Item::QuantumChemicalPlant,
    Item::ArcSmelter,
    Item::PlaneSmelter,
    Item::MatrixLab,
    Item::MiniatureParticleCollider,
    Item::OilRefinery,
];

pub const CONVEYORS: &[Item] = &[
    Item::ConveyorBeltMkI,
    Item::ConveyorBeltMkII,
    Item::ConveyorBeltMkIII,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id_and_name() {
        assert_eq!(Item::from_building_id(2303), Some(Item::AssemblingMachineMkI));
        assert_eq!(Item::from_id(-1), Some(Item::Lava));
        assert_eq!(Item::from_name("ironore"), Some(Item::IronOre));
        assert_eq!(Item::IronOre.id(), 1001);
        assert_eq!(Item::from_building_id(9999), None);
        assert_eq!(Item::from_parameter(u32::MAX), None);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<i32> = Item::ALL.iter().map(|i| i.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Item::ALL.len());
    }

    #[test]
    fn test_category_dispatch() {
        for item in PRODUCTION_MACHINES {
            assert_eq!(BuildingCategory::of(Some(*item)), BuildingCategory::Production);
        }
        for item in CONVEYORS {
            assert_eq!(BuildingCategory::of(Some(*item)), BuildingCategory::Conveyor);
        }
        assert_eq!(BuildingCategory::of_id(2103), BuildingCategory::PlanetaryStation);
        assert_eq!(BuildingCategory::of_id(2104), BuildingCategory::InterstellarStation);
        assert_eq!(BuildingCategory::of_id(2107), BuildingCategory::Distributor);
        assert_eq!(BuildingCategory::of_id(2011), BuildingCategory::Other);
        assert_eq!(BuildingCategory::of_id(60000), BuildingCategory::Other);
    }

    #[test]
    fn test_product_category() {
        assert_eq!(ProductCategory::of(Item::GravityMatrix), Some(ProductCategory::ScienceMatrix));
        assert_eq!(ProductCategory::of(Item::Steel), Some(ProductCategory::Smelted));
        assert_eq!(ProductCategory::of(Item::Gear), Some(ProductCategory::Component));
        assert_eq!(ProductCategory::of(Item::AssemblingMachineMkIII), Some(ProductCategory::EndProduct));
        assert_eq!(ProductCategory::of(Item::IronOre), None);
        assert_eq!(ProductCategory::of(Item::Water), None);
        assert_eq!(ProductCategory::Smelted.folder(), "Smelters");
    }

    #[test]
    fn test_logistics_direction_raw() {
        assert_eq!(LogisticsDirection::from_raw(2), Some(LogisticsDirection::Input));
        assert_eq!(LogisticsDirection::from_raw(3), None);
        assert_eq!(ProliferationEffect::Speedup.raw(), 1);
    }
}
