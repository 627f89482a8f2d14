//! Parallel sequence loading.
//!
//! Distributes [`ShotSequenceDataset::load`] calls across [`rayon`] worker
//! threads. Every load opens its own session inside the worker, so no
//! decoder or cache is ever shared between threads.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::dataset::{LabeledSequence, ShotSequenceDataset};
use crate::error::ShotFramesError;
use crate::source::SourceOpener;

impl<O> ShotSequenceDataset<O>
where
    O: SourceOpener + Sync,
{
    /// Load several entries in parallel.
    ///
    /// Results are returned in the order of `indices`. If any load fails the
    /// whole call fails with one of the errors.
    ///
    /// # Errors
    ///
    /// See [`load`](ShotSequenceDataset::load).
    pub fn load_parallel(&self, indices: &[usize]) -> Result<Vec<LabeledSequence>, ShotFramesError> {
        log::debug!("Loading {} sequences in parallel", indices.len());
        indices.par_iter().map(|&index| self.load(index)).collect()
    }
}
