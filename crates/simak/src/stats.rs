//! Derived dashboard statistics.
//!
//! Everything here is a pure function of the current record and unit lists
//! and is recomputed on every read.

use serde::Serialize;

use crate::record::{CaseStatus, ViolationRecord};
use crate::vocab::short_unit_name;

/// Number of cases attributed to one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitCount {
    /// Unit name as it appears in the unit list.
    pub unit: String,
    /// Abbreviated name for chart axes.
    pub short_name: String,
    /// Number of records referencing the unit.
    pub total: usize,
}

/// Number of cases for one rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankCount {
    /// Rank name.
    pub rank: String,
    /// Number of records with this rank.
    pub count: usize,
}

/// Number of cases for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Case category.
    pub category: String,
    /// Number of records in this category.
    pub count: usize,
}

/// Aggregate figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Total number of records.
    pub total: usize,
    /// Records still in legal process.
    pub in_process: usize,
    /// Closed records.
    pub closed: usize,
    /// Per-unit counts, in unit-list order.
    pub per_unit: Vec<UnitCount>,
    /// Per-rank counts in vocabulary order, zero counts omitted.
    pub per_rank: Vec<RankCount>,
    /// Per-category counts in first-seen order.
    pub per_category: Vec<CategoryCount>,
}

impl DashboardStats {
    /// Compute statistics for a record list.
    #[must_use]
    pub fn compute<S: AsRef<str>>(
        records: &[ViolationRecord],
        units: &[String],
        ranks: &[S],
    ) -> Self {
        let in_process = count_status(records, CaseStatus::ProsesHukum);
        let closed = count_status(records, CaseStatus::Selesai);

        let per_unit = units
            .iter()
            .map(|unit| UnitCount {
                unit: unit.clone(),
                short_name: short_unit_name(unit),
                total: records.iter().filter(|r| &r.satuan == unit).count(),
            })
            .collect();

        let per_rank = ranks
            .iter()
            .map(|rank| RankCount {
                rank: rank.as_ref().to_string(),
                count: records
                    .iter()
                    .filter(|r| r.pangkat == rank.as_ref())
                    .count(),
            })
            .filter(|r| r.count > 0)
            .collect();

        Self {
            total: records.len(),
            in_process,
            closed,
            per_unit,
            per_rank,
            per_category: per_category(records),
        }
    }

    /// Records whose unit is not in the unit list.
    #[must_use]
    pub fn unlisted(&self) -> usize {
        let listed: usize = self.per_unit.iter().map(|u| u.total).sum();
        self.total.saturating_sub(listed)
    }
}

fn count_status(records: &[ViolationRecord], status: CaseStatus) -> usize {
    records.iter().filter(|r| r.status == status).count()
}

/// Count records per distinct category, in first-seen order.
#[must_use]
pub fn per_category(records: &[ViolationRecord]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|c| c.category == record.perkara) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: record.perkara.clone(),
                count: 1,
            }),
        }
    }
    counts
}
