use std::collections::HashMap;

use super::items::Item;

/// Production machine metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Machine {
    pub id: Item,
    pub tech_level: u32,
    pub production_multiplier: f64,
    pub downgrade: Option<Item>,
    pub upgrade: Option<Item>,
}

/// Immutable machine table with upgrade/downgrade chains resolved at construction
#[derive(Debug, Clone, Default)]
pub struct MachineTable {
    machines: HashMap<Item, Machine>,
}

impl MachineTable {
    /// Build from `(id, downgrade, multiplier, tech_level)` rows. Upgrade links
    /// are derived from the downgrade links, so row order does not matter.
    pub fn new(rows: &[(Item, Option<Item>, f64, u32)]) -> Self {
        let mut machines: HashMap<Item, Machine> = rows
            .iter()
            .map(|&(id, downgrade, production_multiplier, tech_level)| {
                (id, Machine { id, tech_level, production_multiplier, downgrade, upgrade: None })
            })
            .collect();

        for &(id, downgrade, _, _) in rows {
            if let Some(lower) = downgrade.and_then(|d| machines.get_mut(&d)) {
                lower.upgrade = Some(id);
            }
        }

        Self { machines }
    }

    pub fn standard() -> Self {
        use Item::*;

        Self::new(&[
            (AssemblingMachineMkI, None, 0.75, 1),
            (AssemblingMachineMkII, Some(AssemblingMachineMkI), 1.0, 3),
            (AssemblingMachineMkIII, Some(AssemblingMachineMkII), 1.5, 5),
            (MatrixLab, None, 1.0, 1),
            (ArcSmelter, None, 1.0, 1),
            (PlaneSmelter, Some(ArcSmelter), 2.0, 6),
            (MiniatureParticleCollider, None, 1.0, 4),
            (ChemicalPlant, None, 1.0, 1),
            (QuantumChemicalPlant, Some(ChemicalPlant), 2.0, 6),
            (OilRefinery, None, 1.0, 1),
        ])
    }

    pub fn get(&self, id: Item) -> Option<&Machine> {
        self.machines.get(&id)
    }

    pub fn contains(&self, id: Item) -> bool {
        self.machines.contains_key(&id)
    }

    pub fn production_multiplier(&self, id: Item) -> Option<f64> {
        self.get(id).map(|m| m.production_multiplier)
    }

    /// Tech level of `id`, 0 for anything that is not a known machine
    pub fn tech_level(&self, id: Item) -> u32 {
        self.get(id).map_or(0, |m| m.tech_level)
    }

    /// Walk the chain to the best machine available at `tech_level`
    pub fn equivalent_at(&self, id: Item, tech_level: u32) -> Item {
        let mut current = id;
        // Chains are short; the bound guards against a malformed cycle.
        for _ in 0..=self.machines.len() {
            let Some(machine) = self.get(current) else {
                return current;
            };
            if machine.tech_level > tech_level {
                match machine.downgrade {
                    Some(lower) => current = lower,
                    None => return current,
                }
            } else {
                match machine.upgrade.and_then(|u| self.get(u)) {
                    Some(upper) if upper.tech_level <= tech_level => current = upper.id,
                    _ => return current,
                }
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_links_derived() {
        let table = MachineTable::standard();
        let mk1 = table.get(Item::AssemblingMachineMkI).unwrap();
        assert_eq!(mk1.upgrade, Some(Item::AssemblingMachineMkII));
        assert_eq!(table.get(Item::AssemblingMachineMkIII).unwrap().upgrade, None);
    }

    #[test]
    fn test_row_order_independent() {
        let table = MachineTable::new(&[
            (Item::PlaneSmelter, Some(Item::ArcSmelter), 2.0, 6),
            (Item::ArcSmelter, None, 1.0, 1),
        ]);
        assert_eq!(table.get(Item::ArcSmelter).unwrap().upgrade, Some(Item::PlaneSmelter));
    }

    #[test]
    fn test_equivalent_at() {
        let table = MachineTable::standard();
        assert_eq!(table.equivalent_at(Item::AssemblingMachineMkI, 10), Item::AssemblingMachineMkIII);
        assert_eq!(table.equivalent_at(Item::AssemblingMachineMkI, 4), Item::AssemblingMachineMkII);
        assert_eq!(table.equivalent_at(Item::AssemblingMachineMkIII, 0), Item::AssemblingMachineMkI);
        assert_eq!(table.equivalent_at(Item::PlaneSmelter, 2), Item::ArcSmelter);
        assert_eq!(table.equivalent_at(Item::Gear, 5), Item::Gear);
    }

    #[test]
    fn test_tech_level_unknown_is_zero() {
        let table = MachineTable::standard();
        assert_eq!(table.tech_level(Item::MiniatureParticleCollider), 4);
        assert_eq!(table.tech_level(Item::ConveyorBeltMkI), 0);
    }
}
