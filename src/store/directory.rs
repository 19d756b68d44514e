use super::io::{read_xyz, write_xyz};
use super::{PointStore, Region};
use crate::error::{MccError, Result};
use crate::types::PointSet;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "xyz";

/// Store keeping one `<name>.xyz` file per collection inside a directory.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    region: Option<Region>,
}

impl DirectoryStore {
    /// Open (and create if needed) the store directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, region: None })
    }

    /// Use a fixed region instead of estimating it from the collection.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing collection `name`.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{EXTENSION}"))
    }

    fn check_name(name: &str) -> Result<()> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !name.starts_with('.');
        if valid {
            Ok(())
        } else {
            Err(MccError::invalid(
                "name",
                format!("<{name}> is not a legal collection name"),
            ))
        }
    }
}

impl PointStore for DirectoryStore {
    fn exists(&self, name: &str) -> bool {
        Self::check_name(name).is_ok() && self.path_of(name).is_file()
    }

    fn count(&self, name: &str) -> Result<usize> {
        Ok(self.load(name)?.count())
    }

    fn load(&self, name: &str) -> Result<PointSet> {
        Self::check_name(name)?;
        if !self.exists(name) {
            return Err(MccError::NotFound(name.to_string()));
        }
        read_xyz(&self.path_of(name))
    }

    fn write(&mut self, name: &str, points: PointSet, overwrite: bool) -> Result<()> {
        Self::check_name(name)?;
        if !overwrite && self.exists(name) {
            return Err(MccError::OutputExists(name.to_string()));
        }
        write_xyz(&self.path_of(name), &points)
    }

    fn remove(&mut self, name: &str) -> Result<bool> {
        Self::check_name(name)?;
        let path = self.path_of(name);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    fn rename(&mut self, from: &str, to: &str, overwrite: bool) -> Result<()> {
        Self::check_name(from)?;
        Self::check_name(to)?;
        if !self.exists(from) {
            return Err(MccError::NotFound(from.to_string()));
        }
        if !overwrite && self.exists(to) {
            return Err(MccError::OutputExists(to.to_string()));
        }
        fs::rename(self.path_of(from), self.path_of(to))?;
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        Self::check_name(name)
    }

    fn region(&self, name: &str) -> Result<Region> {
        match self.region {
            Some(region) => Ok(region),
            None => Region::estimate(&self.load(name)?),
        }
    }
}
