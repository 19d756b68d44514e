//! Running collection of points classified as non-ground.

use crate::types::PointSet;

/// Merges the outliers of every iteration and scale domain.
///
/// Points are only ever appended: once classified non-ground a point has
/// already left the candidate set and is never re-examined.
#[derive(Debug, Default)]
pub struct ClassificationAccumulator {
    nonground: PointSet,
    batches: usize,
}

impl ClassificationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of outliers. Empty batches are counted but add nothing.
    pub fn append(&mut self, outliers: PointSet) {
        self.batches += 1;
        self.nonground.append(outliers);
    }

    /// Points accumulated so far.
    pub fn count(&self) -> usize {
        self.nonground.count()
    }

    /// Number of batches appended so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// The complete non-ground output.
    pub fn finalize(self) -> PointSet {
        self.nonground
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn batch(n: usize, z: f64) -> PointSet {
        (0..n).map(|i| Point::new(i as f64, 0.0, z)).collect()
    }

    #[test]
    fn batches_are_merged_in_order() {
        let mut acc = ClassificationAccumulator::new();
        acc.append(batch(3, 1.0));
        acc.append(PointSet::new());
        acc.append(batch(2, 2.0));
        assert_eq!(acc.count(), 5);
        assert_eq!(acc.batches(), 3);

        let out = acc.finalize();
        let zs: Vec<f64> = out.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![1.0, 1.0, 1.0, 2.0, 2.0]);
    }
}
