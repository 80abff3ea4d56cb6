//! Configuration for the Kaleido engine
//!
//! Every knob has a default that reproduces the viewer's stock behavior, so
//! an empty JSON object `{}` is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KaleidoError, Result};
use crate::mesh::FillMode;

/// Fixed numeric tolerances.
///
/// Borderline inputs resolve deterministically one way or the other against
/// these values; there is no recovery path beyond them.
pub mod tolerance {
    /// Two faces share a plane when normals and offsets agree within this
    pub const PLANE_EPSILON: f64 = 1e-6;

    /// Segment crossings closer than this to an endpoint are not crossings
    pub const INTERSECTION_EPSILON: f64 = 1e-9;

    /// `from_to` is undefined when `1 + u·v` falls below this
    pub const ANTIPODAL_EPSILON: f64 = 1e-9;

    /// Points closer than this collapse into one point glyph
    pub const POINT_MERGE_EPSILON: f64 = 1e-6;

    /// Edges shorter than this produce no line glyph
    pub const DEGENERATE_EDGE_EPSILON: f64 = 1e-9;

    /// `slerp` switches to normalized lerp above this dot product
    pub const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

    /// Cholesky pivots at or below this mean the mirrors do not embed
    pub const PIVOT_EPSILON: f64 = 1e-9;
}

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Closure budget
    #[serde(default)]
    pub closure: ClosureConfig,

    /// Mesh builder defaults
    #[serde(default)]
    pub mesh: MeshConfig,
}

impl EngineConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| KaleidoError::Config {
            reason: e.to_string(),
        })
    }

    /// Load a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| KaleidoError::Config {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&text)
    }
}

/// Budget of the closure engine.
///
/// The largest finite groups of rank 3 and 4 have orders 120 and 14400, so
/// reaching one more element proves the input infinite. The depth caps only
/// trigger together with a layer that failed to shrink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureConfig {
    /// Order cap for rank ≤ 3
    #[serde(default = "default_max_order_low")]
    pub max_order_low_rank: usize,

    /// Order cap for rank 4
    #[serde(default = "default_max_order_rank4")]
    pub max_order_rank4: usize,

    /// Depth cap for rank ≤ 3
    #[serde(default = "default_max_depth_low")]
    pub max_depth_low_rank: usize,

    /// Depth cap for rank 4
    #[serde(default = "default_max_depth_rank4")]
    pub max_depth_rank4: usize,
}

fn default_max_order_low() -> usize { 121 }
fn default_max_order_rank4() -> usize { 14401 }
fn default_max_depth_low() -> usize { 60 }
fn default_max_depth_rank4() -> usize { 120 }

impl Default for ClosureConfig {
    fn default() -> Self {
        Self {
            max_order_low_rank: default_max_order_low(),
            max_order_rank4: default_max_order_rank4(),
            max_depth_low_rank: default_max_depth_low(),
            max_depth_rank4: default_max_depth_rank4(),
        }
    }
}

impl ClosureConfig {
    /// Limits that apply to a group of the given rank
    pub fn limits_for(&self, rank: usize) -> ClosureLimits {
        if rank >= 4 {
            ClosureLimits {
                max_order: self.max_order_rank4,
                max_depth: self.max_depth_rank4,
            }
        } else {
            ClosureLimits {
                max_order: self.max_order_low_rank,
                max_depth: self.max_depth_low_rank,
            }
        }
    }
}

/// Resolved limits for one closure run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureLimits {
    /// Stop once this many elements exist
    pub max_order: usize,
    /// Past this depth, a layer that does not shrink stops the closure
    pub max_depth: usize,
}

impl ClosureLimits {
    /// Stock limits for a rank
    pub fn for_rank(rank: usize) -> Self {
        ClosureConfig::default().limits_for(rank)
    }
}

/// Mesh builder defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Polygon fill rule
    #[serde(default)]
    pub fill: FillMode,

    /// Plane matching tolerance for global even-odd fill
    #[serde(default = "default_plane_epsilon")]
    pub plane_epsilon: f64,

    /// Emit point glyphs for vertexes
    #[serde(default = "default_true")]
    pub show_vertexes: bool,

    /// Emit line glyphs for edges
    #[serde(default = "default_true")]
    pub show_edges: bool,

    /// Eye distance of the 4D perspective projection
    #[serde(default = "default_projection_distance")]
    pub projection_distance: f64,
}

fn default_true() -> bool { true }
fn default_plane_epsilon() -> f64 { tolerance::PLANE_EPSILON }
fn default_projection_distance() -> f64 { 2.0 }

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            fill: FillMode::default(),
            plane_epsilon: default_plane_epsilon(),
            show_vertexes: true,
            show_edges: true,
            projection_distance: default_projection_distance(),
        }
    }
}
