//! Per-condition reduction of observations pooled across runs.
//!
//! A cell that received no observations reduces to 0, matching the
//! statistics crate's treatment of degenerate input.

use cogfit_stats::stats;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct ConditionMeans {
    cells: Vec<Vec<f64>>,
}

impl ConditionMeans {
    pub fn new(conditions: usize) -> Self {
        Self {
            cells: vec![Vec::new(); conditions],
        }
    }

    /// Adds one observation. Out-of-range conditions are dropped.
    pub fn add(&mut self, condition: usize, value: f64) -> bool {
        match self.cells.get_mut(condition) {
            Some(cell) => {
                cell.push(value);
                true
            }
            None => {
                warn!(condition, conditions = self.cells.len(), "observation for unknown condition");
                false
            }
        }
    }

    pub fn conditions(&self) -> usize {
        self.cells.len()
    }

    pub fn count(&self, condition: usize) -> usize {
        self.cells.get(condition).map_or(0, Vec::len)
    }

    pub fn observations(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn means(&self) -> Vec<f64> {
        self.cells.iter().map(|c| stats::mean(c)).collect()
    }

    /// Per-condition means, or an empty series when nothing at all was
    /// observed, so that fitting it yields zero statistics.
    pub fn series(&self) -> Vec<f64> {
        if self.observations() == 0 {
            Vec::new()
        } else {
            self.means()
        }
    }

    /// 95% half-widths; 0 for cells with fewer than two observations.
    pub fn confidence_widths(&self) -> Vec<f64> {
        self.cells
            .iter()
            .map(|c| {
                if c.len() < 2 {
                    0.0
                } else {
                    stats::confidence_width(c)
                }
            })
            .collect()
    }
}

/// Row-by-column grid of condition cells, e.g. session by block.
#[derive(Debug, Clone, Default)]
pub struct GridMeans {
    rows: Vec<ConditionMeans>,
}

impl GridMeans {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![ConditionMeans::new(cols); rows],
        }
    }

    pub fn add(&mut self, row: usize, col: usize, value: f64) -> bool {
        match self.rows.get_mut(row) {
            Some(cells) => cells.add(col, value),
            None => {
                warn!(row, rows = self.rows.len(), "observation for unknown row");
                false
            }
        }
    }

    pub fn observations(&self) -> usize {
        self.rows.iter().map(ConditionMeans::observations).sum()
    }

    pub fn means(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(ConditionMeans::means).collect()
    }
}
