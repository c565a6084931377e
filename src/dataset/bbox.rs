//! Bounding boxes in COCO XYWH convention.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in COCO `[x, y, width, height]` order,
/// where `(x, y)` is the top-left corner in absolute pixel coordinates.
///
/// Fields are stored as `f64` even when the source document writes
/// integers. Width and height of a well-formed box are non-negative; the
/// loader rejects annotation records that violate this.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    /// Creates a bounding box from its corner and dimensions.
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The right edge (`x + width`).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// The bottom edge (`y + height`).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Box area (`width * height`).
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True if all fields are finite and the dimensions are non-negative.
    pub fn is_well_formed(&self) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        finite && self.width >= 0.0 && self.height >= 0.0
    }
}

impl From<[f64; 4]> for BBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        BBox::new(x, y, width, height)
    }
}

impl From<BBox> for [f64; 4] {
    fn from(bbox: BBox) -> Self {
        [bbox.x, bbox.y, bbox.width, bbox.height]
    }
}
