//! The polymorphic region type behind every annotation.
//!
//! COCO documents write a region in one of three incompatible encodings:
//! polygon outlines, uncompressed run-length counts, or compressed
//! run-length strings. [`Segmentation`] normalizes them into one closed
//! enum with a single factory ([`Segmentation::from_raw`]) and a uniform
//! pair of operations: [`rle`](Segmentation::rle) to get the compressed
//! encoding and [`mask`](Segmentation::mask) to rasterize.
//!
//! The factory is total: any JSON payload classifies into some variant,
//! and a payload that fits none of the structured shapes is held as an
//! opaque compressed encoding whose problems only surface at decode time.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CocoError;
use crate::mask::{Mask, Rle, RunLengths};

/// A region of an image, in whichever encoding the document used.
///
/// The variant is fixed at construction and never changes. The canvas
/// width/height passed to [`rle`](Segmentation::rle) and
/// [`mask`](Segmentation::mask) must be the owning image's dimensions;
/// the encoding itself does not know the canvas size.
#[derive(Clone, Debug, PartialEq)]
pub enum Segmentation {
    /// One or more closed rings of flattened `[x0, y0, x1, y1, ...]`
    /// coordinates.
    Polygon(Vec<Vec<f64>>),

    /// Explicit run-length counts with their embedded canvas size.
    Uncompressed(RunLengths),

    /// An opaque compressed encoding, kept exactly as it appeared on the
    /// wire. Not validated until decoded.
    Compressed(Value),
}

/// The wire encoding a [`Segmentation`] was classified as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentationKind {
    Polygon,
    UncompressedRle,
    CompressedRle,
}

impl Segmentation {
    /// Classifies a raw wire payload. Total and deterministic; never
    /// fails.
    ///
    /// Resolution order:
    /// 1. a list of numeric lists, each longer than 4 entries, is a
    ///    polygon (4 or fewer coordinates cannot enclose an area and are
    ///    deliberately not treated as one);
    /// 2. a list whose first element is an object carrying parseable
    ///    `counts` and `size` is an uncompressed RLE;
    /// 3. everything else is kept opaque as a compressed RLE.
    pub fn from_raw(raw: Value) -> Segmentation {
        if let Some(rings) = as_polygon(&raw) {
            return Segmentation::Polygon(rings);
        }
        if let Some(runs) = as_uncompressed(&raw) {
            return Segmentation::Uncompressed(runs);
        }
        Segmentation::Compressed(raw)
    }

    /// Which encoding this region uses.
    pub fn kind(&self) -> SegmentationKind {
        match self {
            Segmentation::Polygon(_) => SegmentationKind::Polygon,
            Segmentation::Uncompressed(_) => SegmentationKind::UncompressedRle,
            Segmentation::Compressed(_) => SegmentationKind::CompressedRle,
        }
    }

    /// Produces the compressed run-length encoding of this region on a
    /// `width` x `height` canvas.
    ///
    /// Polygons are rasterized ring by ring and merged by union;
    /// uncompressed counts are compressed; a compressed payload is
    /// returned unchanged (a bare string adopts the caller's canvas, an
    /// object keeps its embedded size). An embedded size that contradicts
    /// the canvas is a [`CocoError::DecodeFailure`].
    pub fn rle(&self, width: u32, height: u32) -> Result<Rle, CocoError> {
        match self {
            Segmentation::Polygon(rings) => {
                let rles: Vec<Rle> = rings
                    .iter()
                    .map(|ring| Rle::from_polygon(ring, height, width))
                    .collect();
                Rle::merge(&rles)
            }
            Segmentation::Uncompressed(runs) => {
                if runs.size != [height, width] {
                    return Err(CocoError::decode_failure(format!(
                        "uncompressed RLE is sized {}x{} but the canvas is {height}x{width}",
                        runs.size[0], runs.size[1]
                    )));
                }
                Ok(Rle::from_runs(runs))
            }
            Segmentation::Compressed(raw) => match raw {
                Value::String(counts) => Ok(Rle {
                    size: [height, width],
                    counts: counts.clone(),
                }),
                Value::Object(_) => {
                    let rle: Rle =
                        serde_json::from_value(raw.clone()).map_err(|err| {
                            CocoError::decode_failure(format!(
                                "payload is not a compressed RLE object: {err}"
                            ))
                        })?;
                    if rle.size != [height, width] {
                        return Err(CocoError::decode_failure(format!(
                            "compressed RLE is sized {}x{} but the canvas is {height}x{width}",
                            rle.size[0], rle.size[1]
                        )));
                    }
                    Ok(rle)
                }
                other => Err(CocoError::decode_failure(format!(
                    "payload {other} is not a recognized RLE encoding"
                ))),
            },
        }
    }

    /// Rasterizes this region into a binary mask of shape
    /// `(height, width)`.
    pub fn mask(&self, width: u32, height: u32) -> Result<Mask, CocoError> {
        self.rle(width, height)?.decode()
    }
}

impl<'de> Deserialize<'de> for Segmentation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Segmentation::from_raw(Value::deserialize(deserializer)?))
    }
}

/// Rule 1: a non-empty list of numeric lists, each longer than 4 entries.
fn as_polygon(raw: &Value) -> Option<Vec<Vec<f64>>> {
    let items = raw.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| {
            let coords = item.as_array()?;
            if coords.len() <= 4 {
                return None;
            }
            coords.iter().map(Value::as_f64).collect()
        })
        .collect()
}

/// Rule 2: a list whose first element is an object with parseable
/// `counts` and `size`.
fn as_uncompressed(raw: &Value) -> Option<RunLengths> {
    let first = raw.as_array()?.first()?.as_object()?;

    let size = first.get("size")?.as_array()?;
    let [height, width] = size.as_slice() else {
        return None;
    };

    let counts = first
        .get("counts")?
        .as_array()?
        .iter()
        .map(as_count)
        .collect::<Option<Vec<u32>>>()?;

    Some(RunLengths {
        size: [as_count(height)?, as_count(width)?],
        counts,
    })
}

/// Reads a run count that the wire may spell as an integer or a
/// fraction-free float.
fn as_count(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    (f >= 0.0 && f <= f64::from(u32::MAX) && f.fract() == 0.0).then_some(f as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_polygon() {
        let seg = Segmentation::from_raw(json!([[1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0, 1.0]]));
        assert_eq!(seg.kind(), SegmentationKind::Polygon);
    }

    #[test]
    fn classifies_uncompressed_rle() {
        let seg = Segmentation::from_raw(json!([{"counts": [50, 14, 36], "size": [10, 10]}]));
        assert_eq!(seg.kind(), SegmentationKind::UncompressedRle);
    }

    #[test]
    fn classifies_string_as_compressed() {
        let seg = Segmentation::from_raw(json!("a2T1c3"));
        assert_eq!(seg.kind(), SegmentationKind::CompressedRle);
    }

    #[test]
    fn four_coordinate_ring_is_not_a_polygon() {
        // The historical boundary: a 4-number ring cannot enclose area and
        // falls through to the opaque branch, as does a 5-number one only
        // once it exceeds the threshold.
        let four = Segmentation::from_raw(json!([[0.0, 0.0, 5.0, 5.0]]));
        assert_eq!(four.kind(), SegmentationKind::CompressedRle);

        let five = Segmentation::from_raw(json!([[0.0, 0.0, 5.0, 5.0, 2.0]]));
        assert_eq!(five.kind(), SegmentationKind::Polygon);
    }

    #[test]
    fn classification_is_total() {
        for raw in [
            json!(null),
            json!(42),
            json!([]),
            json!({}),
            json!([[]]),
            json!([{"counts": "not-a-list", "size": [10, 10]}]),
            json!([{"size": [10, 10]}]),
            json!([{"counts": [1, 2], "size": [10]}]),
        ] {
            // Never panics, and anything unstructured lands in the
            // opaque fallback.
            let seg = Segmentation::from_raw(raw);
            assert_eq!(seg.kind(), SegmentationKind::CompressedRle);
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let raw = json!([[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]]);
        let a = Segmentation::from_raw(raw.clone());
        let b = Segmentation::from_raw(raw);
        assert_eq!(a, b);
    }

    #[test]
    fn uncompressed_counts_accept_float_spelling() {
        let seg = Segmentation::from_raw(json!([{"counts": [50.0, 14.0, 36.0], "size": [10.0, 10.0]}]));
        assert_eq!(seg.kind(), SegmentationKind::UncompressedRle);
        let Segmentation::Uncompressed(runs) = seg else {
            panic!("expected uncompressed runs");
        };
        assert_eq!(runs.counts, vec![50, 14, 36]);
        assert_eq!(runs.size, [10, 10]);
    }

    #[test]
    fn fractional_counts_fall_through_to_opaque() {
        let seg = Segmentation::from_raw(json!([{"counts": [50.5], "size": [10, 10]}]));
        assert_eq!(seg.kind(), SegmentationKind::CompressedRle);
    }

    #[test]
    fn polygon_masks_to_canvas_shape() {
        let seg = Segmentation::from_raw(json!([[1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0, 1.0]]));
        let mask = seg.mask(10, 10).expect("rasterize");
        assert_eq!(mask.width(), 10);
        assert_eq!(mask.height(), 10);
        assert!(mask.as_bytes().iter().all(|&px| px == 0 || px == 1));
        assert!(mask.area() > 0);
    }

    #[test]
    fn multi_ring_polygon_unions_rings() {
        let seg = Segmentation::from_raw(json!([
            [1.0, 1.0, 3.0, 1.0, 3.0, 3.0, 1.0, 3.0],
            [6.0, 6.0, 9.0, 6.0, 9.0, 9.0, 6.0, 9.0]
        ]));
        let mask = seg.mask(10, 10).expect("rasterize");
        assert_eq!(mask.get(1, 1), 1);
        assert_eq!(mask.get(7, 7), 1);
        assert_eq!(mask.get(4, 4), 0);
    }

    #[test]
    fn uncompressed_rle_roundtrips_through_mask() {
        let seg = Segmentation::from_raw(json!([{"counts": [50, 14, 36], "size": [10, 10]}]));
        let mask = seg.mask(10, 10).expect("decode");
        assert_eq!(mask.area(), 14);
    }

    #[test]
    fn uncompressed_rle_rejects_mismatched_canvas() {
        let seg = Segmentation::from_raw(json!([{"counts": [50, 14, 36], "size": [10, 10]}]));
        assert!(matches!(
            seg.rle(20, 20),
            Err(CocoError::DecodeFailure { .. })
        ));
    }

    #[test]
    fn compressed_string_rle_is_idempotent() {
        let seg = Segmentation::from_raw(json!("XYZ123"));
        let first = seg.rle(10, 10).expect("wrap");
        let second = seg.rle(10, 10).expect("wrap");
        assert_eq!(first, second);
        assert_eq!(first.counts, "XYZ123");
        assert_eq!(first.size, [10, 10]);
    }

    #[test]
    fn compressed_object_keeps_embedded_size() {
        let runs = RunLengths {
            size: [6, 6],
            counts: vec![14, 8, 14],
        };
        let wire = Rle::from_runs(&runs);
        let seg = Segmentation::from_raw(json!({"size": [6, 6], "counts": wire.counts}));
        assert_eq!(seg.kind(), SegmentationKind::CompressedRle);

        let mask = seg.mask(6, 6).expect("decode");
        assert_eq!(mask.area(), 8);

        assert!(matches!(
            seg.rle(7, 7),
            Err(CocoError::DecodeFailure { .. })
        ));
    }

    #[test]
    fn malformed_compressed_payload_fails_only_at_decode() {
        let seg = Segmentation::from_raw(json!(42));
        assert_eq!(seg.kind(), SegmentationKind::CompressedRle);
        assert!(matches!(
            seg.rle(10, 10),
            Err(CocoError::DecodeFailure { .. })
        ));
    }
}
