//! File helpers for point collections and reports.
//!
//! - `read_xyz`: parse a whitespace or comma separated `x y z` text file.
//! - `write_xyz`: write a point set as `x y z` lines.
//! - `write_json_file`: pretty-print a serializable value to disk.
//!
//! Lines starting with `#` and blank lines are ignored; columns beyond the
//! third are ignored as well so that exports with intensity or class columns
//! can be read directly.
use crate::error::{MccError, Result};
use crate::types::{Point, PointSet};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read a point set from an XYZ text file.
pub fn read_xyz(path: &Path) -> Result<PointSet> {
    let reader = BufReader::new(File::open(path)?);
    let mut points = PointSet::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(point) = parse_line(&line).map_err(|reason| MccError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        })? {
            points.push(point);
        }
    }
    Ok(points)
}

fn parse_line(line: &str) -> std::result::Result<Option<Point>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut fields = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty());
    let mut coords = [0.0f64; 3];
    for (axis, slot) in ["x", "y", "z"].iter().zip(coords.iter_mut()) {
        let field = fields
            .next()
            .ok_or_else(|| format!("missing {axis} coordinate"))?;
        let value: f64 = field
            .parse()
            .map_err(|e| format!("invalid {axis} coordinate {field:?}: {e}"))?;
        if !value.is_finite() {
            return Err(format!("non-finite {axis} coordinate {field:?}"));
        }
        *slot = value;
    }
    Ok(Some(Point::new(coords[0], coords[1], coords[2])))
}

/// Write a point set to an XYZ text file, creating parent directories.
pub fn write_xyz(path: &Path, points: &PointSet) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    for p in points.iter() {
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }
    out.flush()?;
    Ok(())
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
