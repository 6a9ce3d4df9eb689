use crate::error::EvalError;

/// Ordered producer of the frame pairs of one video sequence.
///
/// Item `i` pairs frame `i` with frame `i + 1`, so a dataset of `len()` items
/// covers `len() + 1` frames.
pub trait FramePairDataset {
    /// What the pose model consumes for one pair.
    type Item;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn get(&self, index: usize) -> Result<Self::Item, EvalError>;
}

/// View over a selection of another dataset's pairs.
pub struct SubsetDataset<D> {
    dataset: D,
    indices: Vec<usize>,
}

impl<D: FramePairDataset> SubsetDataset<D> {
    pub fn new(dataset: D, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// The first `count` pairs, or the whole dataset if it is shorter.
    pub fn head(dataset: D, count: usize) -> Self {
        let count = count.min(dataset.len());
        Self::new(dataset, (0..count).collect())
    }
}

impl<D: FramePairDataset> FramePairDataset for SubsetDataset<D> {
    type Item = D::Item;

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<Self::Item, EvalError> {
        let inner = self.indices.get(index).ok_or_else(|| {
            EvalError::invalid_parameter(format!(
                "Pair {index} out of range for a subset of {}",
                self.indices.len()
            ))
        })?;
        self.dataset.get(*inner)
    }
}
