//! Hall of fame
//!
//! Tracks the fittest genomes seen across a training run.

use serde::{Deserialize, Serialize};

use crate::sim::GenomeId;

/// Maximum number of genomes to keep
pub const MAX_ENTRIES: usize = 10;

/// A single hall of fame entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallOfFameEntry {
    pub genome: GenomeId,
    pub fitness: f64,
    /// Generation the fitness was scored in
    pub generation: u32,
    /// Pipes the cohort passed in that generation
    pub score: u32,
}

/// Fittest genomes, sorted descending by fitness
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HallOfFame {
    pub entries: Vec<HallOfFameEntry>,
}

impl HallOfFame {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a fitness would make the list
    pub fn qualifies(&self, fitness: f64) -> bool {
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| fitness > e.fitness).unwrap_or(true)
    }

    /// Record a genome's result. A genome already listed keeps only its best
    /// fitness. Returns the rank achieved.
    pub fn record(&mut self, entry: HallOfFameEntry) -> Option<usize> {
        if let Some(existing) = self.entries.iter().position(|e| e.genome == entry.genome) {
            if self.entries[existing].fitness >= entry.fitness {
                return Some(existing + 1);
            }
            self.entries.remove(existing);
        }

        if !self.qualifies(entry.fitness) {
            return None;
        }

        let pos = self.entries.iter().position(|e| entry.fitness > e.fitness);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&HallOfFameEntry> {
        self.entries.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(genome: GenomeId, fitness: f64) -> HallOfFameEntry {
        HallOfFameEntry {
            genome,
            fitness,
            generation: 1,
            score: 0,
        }
    }

    #[test]
    fn test_sorted_descending() {
        let mut hof = HallOfFame::new();
        assert_eq!(hof.record(entry(1, 5.0)), Some(1));
        assert_eq!(hof.record(entry(2, 9.0)), Some(1));
        assert_eq!(hof.record(entry(3, 7.0)), Some(2));
        let order: Vec<_> = hof.entries.iter().map(|e| e.genome).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(hof.best().unwrap().genome, 2);
    }

    #[test]
    fn test_capped_at_max() {
        let mut hof = HallOfFame::new();
        for i in 0..MAX_ENTRIES as u64 {
            hof.record(entry(i, 10.0 + i as f64));
        }
        assert!(!hof.qualifies(5.0));
        assert_eq!(hof.record(entry(99, 5.0)), None);
        assert!(hof.qualifies(100.0));
        assert_eq!(hof.record(entry(100, 100.0)), Some(1));
        assert_eq!(hof.entries.len(), MAX_ENTRIES);
        assert_eq!(hof.entries.last().unwrap().fitness, 11.0);
    }

    #[test]
    fn test_same_genome_keeps_best() {
        let mut hof = HallOfFame::new();
        hof.record(entry(1, 8.0));
        hof.record(entry(2, 6.0));
        assert_eq!(hof.record(entry(1, 3.0)), Some(1));
        assert_eq!(hof.entries.len(), 2);
        assert_eq!(hof.record(entry(2, 12.0)), Some(1));
        let order: Vec<_> = hof.entries.iter().map(|e| (e.genome, e.fitness)).collect();
        assert_eq!(order, vec![(2, 12.0), (1, 8.0)]);
    }

    #[test]
    fn test_negative_fitness_still_ranks() {
        let mut hof = HallOfFame::new();
        assert_eq!(hof.record(entry(1, -0.9)), Some(1));
        assert!(!hof.is_empty());
    }
}
