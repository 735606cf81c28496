use super::domain::TaskCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step of a slab table: `points` is the total awarded once `min_count` valid entries exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabTier {
    pub min_count: u32,
    pub points: u32,
}

/// Step function from cumulative valid count to total points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SlabTier>", into = "Vec<SlabTier>")]
pub struct SlabTable {
    tiers: Vec<SlabTier>,
}

impl SlabTable {
    pub fn new(tiers: Vec<SlabTier>) -> Result<Self, SlabTableError> {
        let mut previous: Option<SlabTier> = None;
        for tier in &tiers {
            if tier.min_count == 0 {
                return Err(SlabTableError::ZeroThreshold);
            }
            if let Some(prev) = previous {
                if tier.min_count <= prev.min_count {
                    return Err(SlabTableError::UnorderedThreshold {
                        min_count: tier.min_count,
                    });
                }
                if tier.points < prev.points {
                    return Err(SlabTableError::DecreasingPoints {
                        min_count: tier.min_count,
                    });
                }
            }
            previous = Some(*tier);
        }
        Ok(Self { tiers })
    }

    /// Trade schedule: 1 → 3, 2–3 → 5, 4–6 → 7, 7+ → 8.
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                SlabTier {
                    min_count: 1,
                    points: 3,
                },
                SlabTier {
                    min_count: 2,
                    points: 5,
                },
                SlabTier {
                    min_count: 4,
                    points: 7,
                },
                SlabTier {
                    min_count: 7,
                    points: 8,
                },
            ],
        }
    }

    pub fn tiers(&self) -> &[SlabTier] {
        &self.tiers
    }

    pub fn total(&self, count: u32) -> u32 {
        self.tiers
            .iter()
            .take_while(|tier| tier.min_count <= count)
            .last()
            .map(|tier| tier.points)
            .unwrap_or(0)
    }
}

impl Default for SlabTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<SlabTier>> for SlabTable {
    type Error = SlabTableError;

    fn try_from(tiers: Vec<SlabTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<SlabTable> for Vec<SlabTier> {
    fn from(table: SlabTable) -> Self {
        table.tiers
    }
}

/// Parses the `min_count:points` list form, e.g. `1:3,2:5,4:7,7:8`.
impl FromStr for SlabTable {
    type Err = SlabTableError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut tiers = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (count, points) = entry
                .split_once(':')
                .ok_or_else(|| SlabTableError::Malformed(entry.to_string()))?;
            let min_count = count
                .trim()
                .parse::<u32>()
                .map_err(|_| SlabTableError::Malformed(entry.to_string()))?;
            let points = points
                .trim()
                .parse::<u32>()
                .map_err(|_| SlabTableError::Malformed(entry.to_string()))?;
            tiers.push(SlabTier { min_count, points });
        }
        Self::new(tiers)
    }
}

impl fmt::Display for SlabTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .tiers
            .iter()
            .map(|tier| format!("{}:{}", tier.min_count, tier.points))
            .collect();
        write!(f, "{}", rendered.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlabTableError {
    #[error("slab entry '{0}' must look like <min_count>:<points>")]
    Malformed(String),
    #[error("slab thresholds must start at 1 or above")]
    ZeroThreshold,
    #[error("slab threshold {min_count} is not above the previous threshold")]
    UnorderedThreshold { min_count: u32 },
    #[error("slab at threshold {min_count} awards fewer points than the previous slab")]
    DecreasingPoints { min_count: u32 },
}

/// Per-category accrual settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub analysis_points: u32,
    pub signal_points: u32,
    pub twitter_points: u32,
    pub trade_slabs: SlabTable,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            analysis_points: 2,
            signal_points: 1,
            twitter_points: 2,
            trade_slabs: SlabTable::standard(),
        }
    }
}

/// Stateless evaluator turning valid counts into points at report time.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn points(&self, category: TaskCategory, valid_count: u32) -> u32 {
        match category {
            TaskCategory::Trade => self.config.trade_slabs.total(valid_count),
            TaskCategory::Analysis => self.config.analysis_points.saturating_mul(valid_count),
            TaskCategory::Signal => self.config.signal_points.saturating_mul(valid_count),
            TaskCategory::Twitter => self.config.twitter_points.saturating_mul(valid_count),
        }
    }

    /// Display-only increment attributed to the `nth` valid entry of a category.
    pub fn marginal(&self, category: TaskCategory, nth: u32) -> u32 {
        if nth == 0 {
            return 0;
        }
        self.points(category, nth) - self.points(category, nth - 1)
    }

    pub fn breakdown(&self, category: TaskCategory, valid_count: u32) -> Vec<u32> {
        (1..=valid_count)
            .map(|nth| self.marginal(category, nth))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRADE_MARGINALS: [u32; 7] = [3, 2, 0, 2, 0, 0, 1];

    fn scheduled_marginal(nth: u32) -> u32 {
        match nth {
            0 => 0,
            n => TRADE_MARGINALS
                .get((n - 1) as usize)
                .copied()
                .unwrap_or(0),
        }
    }

    #[test]
    fn trade_slab_boundaries() {
        let engine = ScoringEngine::default();
        let expected = [(0, 0), (1, 3), (2, 5), (3, 5), (4, 7), (5, 7), (6, 7), (7, 8), (40, 8)];
        for (count, points) in expected {
            assert_eq!(
                engine.points(TaskCategory::Trade, count),
                points,
                "slab({count})"
            );
        }
    }

    #[test]
    fn slab_total_matches_cumulative_marginal_schedule() {
        let engine = ScoringEngine::default();
        let mut cumulative = 0;
        for n in 0..=50 {
            cumulative += scheduled_marginal(n);
            assert_eq!(engine.points(TaskCategory::Trade, n), cumulative, "n = {n}");
            assert_eq!(engine.marginal(TaskCategory::Trade, n), scheduled_marginal(n));
        }
    }

    #[test]
    fn linear_categories() {
        let engine = ScoringEngine::default();
        assert_eq!(engine.points(TaskCategory::Analysis, 1), 2);
        assert_eq!(engine.points(TaskCategory::Signal, 2), 2);
        assert_eq!(engine.points(TaskCategory::Twitter, 3), 6);
        assert_eq!(engine.points(TaskCategory::Twitter, 0), 0);
    }

    #[test]
    fn breakdown_sums_to_total() {
        let engine = ScoringEngine::default();
        let breakdown = engine.breakdown(TaskCategory::Trade, 4);
        assert_eq!(breakdown, vec![3, 2, 0, 2]);
        assert_eq!(breakdown.iter().sum::<u32>(), engine.points(TaskCategory::Trade, 4));
    }

    #[test]
    fn parses_slab_table() {
        let table: SlabTable = "1:3, 2:5,4:7,7:8".parse().expect("valid table");
        assert_eq!(table, SlabTable::standard());
        assert_eq!(table.to_string(), "1:3,2:5,4:7,7:8");
    }

    #[test]
    fn rejects_inconsistent_slab_tables() {
        assert_eq!(
            "0:1".parse::<SlabTable>(),
            Err(SlabTableError::ZeroThreshold)
        );
        assert_eq!(
            "2:5,2:6".parse::<SlabTable>(),
            Err(SlabTableError::UnorderedThreshold { min_count: 2 })
        );
        assert_eq!(
            "1:5,3:2".parse::<SlabTable>(),
            Err(SlabTableError::DecreasingPoints { min_count: 3 })
        );
        assert!(matches!(
            "1-3".parse::<SlabTable>(),
            Err(SlabTableError::Malformed(_))
        ));
    }

    #[test]
    fn empty_slab_table_awards_nothing() {
        let table: SlabTable = "".parse().expect("empty table is allowed");
        assert_eq!(table.total(10), 0);
    }
}
