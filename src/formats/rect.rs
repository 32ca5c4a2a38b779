use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in normalized image coordinates, rotated by
/// `rotation` radians around its center.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect_id: Option<i64>,
}

impl NormalizedRect {
    pub fn new(x_center: f32, y_center: f32, width: f32, height: f32) -> Self {
        Self {
            x_center,
            y_center,
            width,
            height,
            rotation: 0.0,
            rect_id: None,
        }
    }

    pub fn with_id(mut self, rect_id: i64) -> Self {
        self.rect_id = Some(rect_id);
        self
    }
}
