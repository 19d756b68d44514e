//! Point collection storage consumed by the store-backed run.
//!
//! A [`PointStore`] maps collection names to point sets and answers the
//! region query that supplies the base grid resolution. Two stores ship with
//! the crate: [`MemoryStore`] keeps collections in a map, [`DirectoryStore`]
//! keeps one `<name>.xyz` text file per collection in a directory.

pub mod directory;
pub mod io;
pub mod memory;
pub mod region;

use crate::error::Result;
use crate::types::PointSet;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use region::Region;

/// Named point collections plus the working region.
pub trait PointStore {
    /// Whether a collection called `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Number of points in `name`.
    fn count(&self, name: &str) -> Result<usize>;

    /// Load `name` as an owned point set.
    fn load(&self, name: &str) -> Result<PointSet>;

    /// Store `points` under `name`. Fails with
    /// [`MccError::OutputExists`](crate::MccError::OutputExists) when the
    /// collection exists and `overwrite` is false.
    fn write(&mut self, name: &str, points: PointSet, overwrite: bool) -> Result<()>;

    /// Delete `name`; returns whether it existed.
    fn remove(&mut self, name: &str) -> Result<bool>;

    /// Move collection `from` to `to`. Fails with
    /// [`MccError::OutputExists`](crate::MccError::OutputExists) when `to`
    /// exists and `overwrite` is false.
    fn rename(&mut self, from: &str, to: &str, overwrite: bool) -> Result<()>;

    /// Reject names the store cannot hold. Checked before a run does any work.
    fn validate_name(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Base resolution of the working area for collection `name`.
    fn region(&self, name: &str) -> Result<Region>;
}
