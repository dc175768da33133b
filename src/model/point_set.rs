//! Point sets (waypoint files) cached alongside the project files.

use serde::{Deserialize, Serialize};

/// A named set of points in scanner coordinates.
///
/// Point sets are kept in the project snapshot's cache but are not part of
/// the volume/surface views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSetFile {
    pub name: String,
    pub color: [u8; 3],
    pub points: Vec<[f32; 3]>,
}

impl PointSetFile {
    pub fn new(name: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            color,
            points: Vec::new(),
        }
    }

    /// Copy of this point set with one more point appended.
    pub fn with_point(&self, point: [f32; 3]) -> Self {
        let mut points = self.points.clone();
        points.push(point);
        Self {
            points,
            ..self.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
