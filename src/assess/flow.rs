use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::catalog::Item;

/// Per-second item rates keyed by item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFlow {
    rates: BTreeMap<Item, f64>,
}

impl ItemFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect rates, summing repeated items
    pub fn from_rates(rates: impl IntoIterator<Item = (Item, f64)>) -> Self {
        let mut flow = Self::new();
        for (item, rate) in rates {
            *flow.rates.entry(item).or_insert(0.0) += rate;
        }
        flow
    }

    /// Rate of `item`, zero when absent
    pub fn get(&self, item: Item) -> f64 {
        self.rates.get(&item).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, item: Item) -> bool {
        self.rates.contains_key(&item)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Item, f64)> + '_ {
        self.rates.iter().map(|(&item, &rate)| (item, rate))
    }

    /// Split into `(matching, rest)` by item
    pub fn partition(&self, mut pred: impl FnMut(Item) -> bool) -> (Self, Self) {
        let mut matching = Self::new();
        let mut rest = Self::new();
        for (item, rate) in self.iter() {
            if pred(item) {
                matching.rates.insert(item, rate);
            } else {
                rest.rates.insert(item, rate);
            }
        }
        (matching, rest)
    }

    /// Largest positive rate. Hydrogen is a common byproduct, so it is only
    /// chosen when nothing else is produced.
    pub fn primary_output(&self) -> Option<(Item, f64)> {
        self.iter()
            .filter(|&(_, rate)| rate > 0.0)
            .max_by(|a, b| {
                let a_key = (a.0 != Item::Hydrogen, a.1);
                let b_key = (b.0 != Item::Hydrogen, b.1);
                a_key.partial_cmp(&b_key).unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

impl AddAssign for ItemFlow {
    fn add_assign(&mut self, rhs: Self) {
        for (item, rate) in rhs.rates {
            *self.rates.entry(item).or_insert(0.0) += rate;
        }
    }
}

impl SubAssign for ItemFlow {
    fn sub_assign(&mut self, rhs: Self) {
        for (item, rate) in rhs.rates {
            *self.rates.entry(item).or_insert(0.0) -= rate;
        }
    }
}

impl Add for ItemFlow {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl Sub for ItemFlow {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

/// Inputs (negative rates) first, then outputs; zero rates are skipped
impl std::fmt::Display for ItemFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<(Item, f64)> = self.iter().filter(|&(_, rate)| rate != 0.0).collect();
        entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut section = "";
        for (item, rate) in entries {
            let (label, amount) = if rate < 0.0 { ("Input", -rate) } else { ("Output", rate) };
            if section != label {
                writeln!(f, "{}:", label)?;
                section = label;
            }
            writeln!(f, "    {:25} {:8.2}/s | {:8.1}/min", item, amount, amount * 60.0)?;
        }
        Ok(())
    }
}
