use std::collections::BTreeSet;

use crate::model::CellTower;

/// Towers in the order they were first seen, each at most once.
#[derive(Debug, Default)]
pub struct TowerStore {
    seen: BTreeSet<CellTower>,
    towers: Vec<CellTower>,
}

impl TowerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tower` unless an equal one is already stored.
    pub fn try_insert(&mut self, tower: CellTower) -> bool {
        if !self.seen.insert(tower) {
            return false;
        }
        self.towers.push(tower);
        true
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.towers.clear();
    }

    pub fn snapshot(&self) -> &[CellTower] {
        &self.towers
    }

    pub fn len(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert() {
        let mut store = TowerStore::new();
        let a = CellTower::new(310, 260, 1000, 5000);
        assert!(store.try_insert(a));
        assert!(!store.try_insert(a));
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot(), &[a]);
    }

    #[test]
    fn first_seen_order() {
        let a = CellTower::new(310, 260, 1000, 5000);
        let b = CellTower::new(262, 1, 2000, 6000);
        let c = CellTower::new(208, 10, 3000, 1);

        let mut store = TowerStore::new();
        store.try_insert(a);
        store.try_insert(b);
        store.try_insert(a);
        store.try_insert(c);
        assert_eq!(store.snapshot(), &[a, b, c]);
    }

    #[test]
    fn clear() {
        let mut store = TowerStore::new();
        for i in 1..=20 {
            store.try_insert(CellTower::new(310, 260, i, u64::from(i) * 10));
        }
        assert_eq!(store.len(), 20);

        store.clear();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());

        // towers may be collected again after a clear
        assert!(store.try_insert(CellTower::new(310, 260, 1, 10)));
    }
}
