use rand::Rng;
use rand::seq::SliceRandom;

/// Walks a fixed condition table, wrapping at the end.
///
/// The table can be shuffled once at construction; the order then stays
/// fixed for the whole run. With a limit the cycle ends after that many
/// draws, otherwise it is endless.
#[derive(Debug, Clone)]
pub struct ConditionCycle<C> {
    table: Vec<C>,
    position: usize,
    drawn: usize,
    limit: Option<usize>,
}

impl<C: Clone> ConditionCycle<C> {
    pub fn new(table: Vec<C>) -> Self {
        Self {
            table,
            position: 0,
            drawn: 0,
            limit: None,
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(mut table: Vec<C>, rng: &mut R) -> Self {
        table.shuffle(rng);
        Self::new(table)
    }

    /// Each entry of `conditions` repeated `repeats` times, shuffled, and
    /// limited to one pass over the result.
    pub fn balanced<R: Rng + ?Sized>(conditions: &[C], repeats: usize, rng: &mut R) -> Self {
        let table: Vec<C> = (0..repeats)
            .flat_map(|_| conditions.iter().cloned())
            .collect();
        let len = table.len();
        Self::shuffled(table, rng).with_limit(len)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &[C] {
        &self.table
    }

    pub fn drawn(&self) -> usize {
        self.drawn
    }

    pub fn is_exhausted(&self) -> bool {
        self.table.is_empty() || self.limit.is_some_and(|l| self.drawn >= l)
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.drawn = 0;
    }
}

impl<C: Clone> Iterator for ConditionCycle<C> {
    type Item = C;

    fn next(&mut self) -> Option<C> {
        if self.is_exhausted() {
            return None;
        }
        let item = self.table[self.position].clone();
        self.position = (self.position + 1) % self.table.len();
        self.drawn += 1;
        Some(item)
    }
}
