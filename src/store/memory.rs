use super::{PointStore, Region};
use crate::error::{MccError, Result};
use crate::types::{Point, PointSet};
use std::collections::HashMap;

/// In-memory store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Point>>,
    region: Option<Region>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed region instead of estimating it from the collection.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Insert or replace a collection.
    pub fn insert(&mut self, name: impl Into<String>, points: PointSet) {
        self.collections.insert(name.into(), points.into_points());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    fn get(&self, name: &str) -> Result<&Vec<Point>> {
        self.collections
            .get(name)
            .ok_or_else(|| MccError::NotFound(name.to_string()))
    }
}

impl PointStore for MemoryStore {
    fn exists(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    fn count(&self, name: &str) -> Result<usize> {
        Ok(self.get(name)?.len())
    }

    fn load(&self, name: &str) -> Result<PointSet> {
        Ok(PointSet::from_points(self.get(name)?.clone()))
    }

    fn write(&mut self, name: &str, points: PointSet, overwrite: bool) -> Result<()> {
        if !overwrite && self.exists(name) {
            return Err(MccError::OutputExists(name.to_string()));
        }
        self.insert(name, points);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<bool> {
        Ok(self.collections.remove(name).is_some())
    }

    fn rename(&mut self, from: &str, to: &str, overwrite: bool) -> Result<()> {
        if !self.exists(from) {
            return Err(MccError::NotFound(from.to_string()));
        }
        if from == to {
            return Ok(());
        }
        if !overwrite && self.exists(to) {
            return Err(MccError::OutputExists(to.to_string()));
        }
        if let Some(points) = self.collections.remove(from) {
            self.collections.insert(to.to_string(), points);
        }
        Ok(())
    }

    fn region(&self, name: &str) -> Result<Region> {
        match self.region {
            Some(region) => Ok(region),
            None => Region::estimate(&self.load(name)?),
        }
    }
}
