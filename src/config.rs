//! # Configuration Module
//!
//! The JSON configuration of a fill: grid resolution, bounding volumes,
//! patterns and search parameters. Every field has a default, so an empty
//! object (or no file at all) describes the stock setup: a 2×4×1 box split
//! into 0.2 voxels with two voxels of padding, filled with the built-in
//! patterns over 100 trials of 2500 tries.
//!
//! ## Example
//! ```json
//! {
//!   "voxel_size": 0.25,
//!   "iterations": 20,
//!   "workers": 4,
//!   "bounding_volumes": [
//!     { "type": "cuboid", "min": [0, 0, 0], "max": [2, 1, 1] }
//!   ],
//!   "patterns": [
//!     { "id": "PatternA", "offsets": [[0, 0, 0], [1, 0, 0]] }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{FillerError, FillerResult};
use crate::generator::SearchConfig;
use crate::placement::pattern::{default_library, PatternLibrary, PatternType};
use crate::voxels::bounding_mesh::{BoundingMesh, ClosedMesh};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_FILLER_CONFIG";

/// One closed bounding volume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VolumeConfig {
    /// An axis-aligned box.
    Cuboid {
        /// Minimum corner
        min: [f64; 3],
        /// Maximum corner
        max: [f64; 3],
    },
    /// An arbitrary closed triangle mesh.
    Mesh {
        /// Vertex positions
        vertices: Vec<[f64; 3]>,
        /// Vertex indices, three per triangle
        triangles: Vec<[usize; 3]>,
    },
}

impl VolumeConfig {
    fn to_mesh(&self) -> FillerResult<ClosedMesh> {
        match self {
            VolumeConfig::Cuboid { min, max } => {
                ClosedMesh::cuboid(Point3::from(*min), Point3::from(*max))
            }
            VolumeConfig::Mesh {
                vertices,
                triangles,
            } => ClosedMesh::new(
                vertices.iter().copied().map(Point3::from).collect(),
                triangles.clone(),
            ),
        }
    }
}

/// A pattern template given in the configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Identifier to register the pattern under
    pub id: PatternType,
    /// Local offsets, zero offset included
    pub offsets: Vec<[i32; 3]>,
}

/// Everything needed to run a fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillerConfig {
    /// Edge length of a voxel
    pub voxel_size: f64,
    /// Padding voxels around the bounding volumes on each side
    pub voxel_offset: i32,
    /// Placement attempts per trial
    pub tries_per_iteration: usize,
    /// Number of trials
    pub iterations: usize,
    /// Seed of the first trial
    pub start_seed: u64,
    /// Number of best seeds kept
    pub ledger_capacity: usize,
    /// Whether each attempt picks a random pattern type
    pub randomize_pattern: bool,
    /// Worker threads for the search; 0 runs it on the calling thread
    pub workers: usize,
    /// Volumes whose union is the region to fill
    pub bounding_volumes: Vec<VolumeConfig>,
    /// Pattern templates; empty means the built-in patterns
    pub patterns: Vec<PatternConfig>,
}

impl Default for FillerConfig {
    fn default() -> Self {
        let search = SearchConfig::default();
        FillerConfig {
            voxel_size: 0.2,
            voxel_offset: 2,
            tries_per_iteration: search.tries_per_iteration,
            iterations: search.iterations,
            start_seed: search.start_seed,
            ledger_capacity: search.ledger_capacity,
            randomize_pattern: search.randomize_pattern,
            workers: 0,
            bounding_volumes: vec![VolumeConfig::Cuboid {
                min: [0.0, 0.0, 0.0],
                max: [2.0, 4.0, 1.0],
            }],
            patterns: Vec::new(),
        }
    }
}

impl FillerConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> FillerResult<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        FillerConfig::from_json_str(&text)
    }

    /// Parses and validates a configuration.
    pub fn from_json_str(text: &str) -> FillerResult<Self> {
        let config: FillerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by the first argument or by [`CONFIG_ENV_VAR`],
    /// falling back to the defaults when neither is given.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> FillerResult<Self> {
        match args.next().or_else(|| std::env::var(CONFIG_ENV_VAR).ok()) {
            Some(path) => FillerConfig::load(path),
            None => {
                info!("No configuration given, using defaults");
                let config = FillerConfig::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// [`FillerError::InvalidConfig`] for a non-positive voxel size, a negative
    /// offset, zero tries, iterations or ledger capacity, or no volumes.
    pub fn validate(&self) -> FillerResult<()> {
        if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
            return Err(FillerError::invalid_config(format!(
                "voxel_size must be positive, got {}",
                self.voxel_size
            )));
        }
        if self.voxel_offset < 0 {
            return Err(FillerError::invalid_config(format!(
                "voxel_offset must not be negative, got {}",
                self.voxel_offset
            )));
        }
        if self.tries_per_iteration == 0 || self.iterations == 0 {
            return Err(FillerError::invalid_config(
                "tries_per_iteration and iterations must be positive",
            ));
        }
        if self.ledger_capacity == 0 {
            return Err(FillerError::invalid_config("ledger_capacity must be positive"));
        }
        if self.bounding_volumes.is_empty() {
            return Err(FillerError::invalid_config("no bounding volumes given"));
        }
        Ok(())
    }

    /// Builds the bounding mesh from the configured volumes.
    pub fn bounding_mesh(&self) -> FillerResult<BoundingMesh> {
        let volumes = self
            .bounding_volumes
            .iter()
            .map(VolumeConfig::to_mesh)
            .collect::<FillerResult<Vec<_>>>()?;
        BoundingMesh::new(volumes)
    }

    /// The pattern library to fill with.
    ///
    /// The shared built-in library when no patterns are configured; otherwise
    /// a new library holding exactly the configured ones.
    ///
    /// # Errors
    /// [`FillerError::InvalidPattern`] for the first template that is refused.
    pub fn pattern_library(&self) -> FillerResult<Arc<PatternLibrary>> {
        if self.patterns.is_empty() {
            return Ok(default_library());
        }

        let mut library = PatternLibrary::new();
        for pattern in &self.patterns {
            let offsets = pattern.offsets.iter().copied().map(Vector3::from).collect();
            library.try_register(offsets, pattern.id)?;
        }
        Ok(Arc::new(library))
    }

    /// Search parameters.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            tries_per_iteration: self.tries_per_iteration,
            iterations: self.iterations,
            start_seed: self.start_seed,
            ledger_capacity: self.ledger_capacity,
            randomize_pattern: self.randomize_pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = FillerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, FillerConfig::default());
        assert_eq!(config.voxel_size, 0.2);
        assert_eq!(config.voxel_offset, 2);
        assert_eq!(config.search_config(), SearchConfig::default());
    }

    #[test]
    fn test_default_grid_dimensions() {
        let mesh = FillerConfig::default().bounding_mesh().unwrap();
        assert_eq!(mesh.grid_dimensions(2, 0.2).unwrap(), Vector3::new(14, 24, 9));
    }

    #[test]
    fn test_volumes_and_patterns() {
        let config = FillerConfig::from_json_str(
            r#"{
                "bounding_volumes": [
                    { "type": "cuboid", "min": [0, 0, 0], "max": [1, 1, 1] },
                    {
                        "type": "mesh",
                        "vertices": [[2, 0, 0], [3, 0, 0], [2, 1, 0], [2, 0, 1]],
                        "triangles": [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]
                    }
                ],
                "patterns": [
                    { "id": "PatternB", "offsets": [[0, 0, 0], [0, 0, 1]] }
                ]
            }"#,
        )
        .unwrap();

        let mesh = config.bounding_mesh().unwrap();
        assert_eq!(mesh.volumes().len(), 2);
        assert!(mesh.is_inside(Point3::new(0.5, 0.5, 0.5)));
        assert!(mesh.is_inside(Point3::new(2.2, 0.2, 0.2)));

        let library = config.pattern_library().unwrap();
        assert_eq!(library.types(), vec![PatternType::PatternB]);
        assert_eq!(library.get(PatternType::PatternB).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            FillerConfig::from_json_str(r#"{ "voxel_size": 0 }"#),
            Err(FillerError::InvalidConfig(_))
        ));
        assert!(FillerConfig::from_json_str(r#"{ "iterations": 0 }"#).is_err());
        assert!(FillerConfig::from_json_str(r#"{ "bounding_volumes": [] }"#).is_err());
        assert!(matches!(
            FillerConfig::from_json_str(r#"{ "voxel_size": "big" }"#),
            Err(FillerError::Parse(_))
        ));
    }

    #[test]
    fn test_tiny_voxel_size_gives_grid_error() {
        let config = FillerConfig::from_json_str(r#"{ "voxel_size": 0.001 }"#).unwrap();
        assert!(matches!(
            crate::generator::prepare_grid(&config),
            Err(FillerError::InvalidGrid(_))
        ));

        let config = FillerConfig::from_json_str(r#"{ "voxel_offset": 2147483647 }"#).unwrap();
        assert!(crate::generator::prepare_grid(&config).is_err());
    }

    #[test]
    fn test_invalid_pattern_fails_fast() {
        let config = FillerConfig::from_json_str(
            r#"{ "patterns": [{ "id": "PatternA", "offsets": [[1, 0, 0]] }] }"#,
        )
        .unwrap();
        assert!(matches!(
            config.pattern_library(),
            Err(FillerError::InvalidPattern(PatternType::PatternA, _))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FillerConfig::load("/nonexistent/voxel-filler.json"),
            Err(FillerError::Io(_))
        ));
    }
}
