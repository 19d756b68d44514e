//! Seeded synthetic LiDAR-like clouds with known ground truth.
//!
//! The terrain is a gently rolling surface sampled on a jittered lattice.
//! Trees add crown returns at least `min_crown_base` above the terrain and
//! buildings replace the terrain returns inside their footprint with flat
//! roof returns. Object returns are kept separate from terrain returns so
//! that a classification can be scored against the truth.

use crate::types::{Point, PointSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Generator options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainOptions {
    /// Extent along x (m).
    pub width: f64,
    /// Extent along y (m).
    pub height: f64,
    /// Lattice spacing of terrain returns (m).
    pub spacing: f64,
    /// Maximum planimetric jitter as a fraction of the spacing.
    pub jitter: f64,
    /// Maximum absolute elevation noise on terrain returns (m).
    pub noise: f64,
    pub trees: usize,
    /// Crown returns per tree.
    pub returns_per_tree: usize,
    pub crown_radius: f64,
    /// Lowest crown return above the terrain (m).
    pub min_crown_base: f64,
    pub max_tree_height: f64,
    pub buildings: usize,
    /// Side length of the square building footprints (m).
    pub building_size: f64,
    pub building_height: f64,
    pub seed: u64,
}

impl Default for TerrainOptions {
    fn default() -> Self {
        Self {
            width: 60.0,
            height: 50.0,
            spacing: 1.0,
            jitter: 0.25,
            noise: 0.02,
            trees: 8,
            returns_per_tree: 40,
            crown_radius: 3.0,
            min_crown_base: 2.0,
            max_tree_height: 14.0,
            buildings: 1,
            building_size: 6.0,
            building_height: 6.0,
            seed: 7,
        }
    }
}

/// Terrain elevation at `(x, y)`.
pub fn terrain_height(x: f64, y: f64) -> f64 {
    100.0 + 0.05 * x + 2.0 * (x / 25.0).sin() * (y / 30.0).cos()
}

/// Generated cloud split by ground truth.
#[derive(Debug, Default)]
pub struct SyntheticCloud {
    pub ground: PointSet,
    pub objects: PointSet,
}

impl SyntheticCloud {
    pub fn count(&self) -> usize {
        self.ground.count() + self.objects.count()
    }

    /// Terrain and object returns in one set (terrain first).
    pub fn into_point_set(self) -> PointSet {
        let mut all = self.ground;
        all.append(self.objects);
        all
    }
}

/// Whether `p` lies more than `margin` above the synthetic terrain.
pub fn is_above_terrain(p: &Point, margin: f64) -> bool {
    p.z - terrain_height(p.x, p.y) > margin
}

pub fn generate(opts: &TerrainOptions) -> SyntheticCloud {
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut cloud = SyntheticCloud::default();

    let footprints: Vec<[f64; 2]> = (0..opts.buildings)
        .map(|_| {
            [
                random_in(&mut rng, 0.0, (opts.width - opts.building_size).max(0.0)),
                random_in(&mut rng, 0.0, (opts.height - opts.building_size).max(0.0)),
            ]
        })
        .collect();
    let roof_of = |x: f64, y: f64| {
        footprints.iter().find(|o| {
            x >= o[0] && x <= o[0] + opts.building_size && y >= o[1] && y <= o[1] + opts.building_size
        })
    };

    let spacing = opts.spacing.max(1e-3);
    let cols = (opts.width / spacing).floor() as usize + 1;
    let rows = (opts.height / spacing).floor() as usize + 1;
    let max_jitter = opts.jitter * spacing;
    for r in 0..rows {
        for c in 0..cols {
            let x = c as f64 * spacing + random_in(&mut rng, -max_jitter, max_jitter);
            let y = r as f64 * spacing + random_in(&mut rng, -max_jitter, max_jitter);
            match roof_of(x, y) {
                Some(origin) => {
                    let eave = terrain_height(origin[0], origin[1]) + opts.building_height;
                    cloud.objects.push(Point::new(x, y, eave));
                }
                None => {
                    let z = terrain_height(x, y) + random_in(&mut rng, -opts.noise, opts.noise);
                    cloud.ground.push(Point::new(x, y, z));
                }
            }
        }
    }

    for _ in 0..opts.trees {
        let cx = random_in(&mut rng, 0.0, opts.width);
        let cy = random_in(&mut rng, 0.0, opts.height);
        let top = random_in(
            &mut rng,
            (opts.min_crown_base + 1.0).min(opts.max_tree_height),
            opts.max_tree_height,
        );
        for _ in 0..opts.returns_per_tree {
            let angle = random_in(&mut rng, 0.0, std::f64::consts::TAU);
            let dist = opts.crown_radius * random_in(&mut rng, 0.0, 1.0).sqrt();
            let (x, y) = (cx + dist * angle.cos(), cy + dist * angle.sin());
            let shape = (1.0 - (dist / opts.crown_radius.max(1e-6)).powi(2)).max(0.0).sqrt();
            let above = opts.min_crown_base + (top - opts.min_crown_base) * shape;
            let above = (above * random_in(&mut rng, 0.85, 1.0)).max(opts.min_crown_base);
            cloud
                .objects
                .push(Point::new(x, y, terrain_height(x, y) + above));
        }
    }

    cloud
}

fn random_in(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_cloud() {
        let opts = TerrainOptions::default();
        let a = generate(&opts).into_point_set();
        let b = generate(&opts).into_point_set();
        assert_eq!(a, b);
    }

    #[test]
    fn objects_stand_above_terrain() {
        let cloud = generate(&TerrainOptions::default());
        assert!(cloud.objects.count() > 0);
        assert!(cloud.objects.iter().all(|p| is_above_terrain(p, 1.0)));
        assert!(cloud.ground.iter().all(|p| !is_above_terrain(p, 0.1)));
    }
}
