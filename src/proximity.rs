//! Static distance checks between agents.

use serde::{Deserialize, Serialize};

/// A point in the 2D plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// True iff `a` and `b` are at most `radius` apart (boundary inclusive).
///
/// Compares squared distances so the result is symmetric and no square root
/// is taken on the hot path. A zero radius matches co-located points only.
pub fn is_close(a: Position, b: Position, radius: f64) -> bool {
    a.distance_squared(b) <= radius * radius
}
