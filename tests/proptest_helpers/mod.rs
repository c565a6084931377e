#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{json, Value};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A polygon ring: 3 to 8 vertices, flattened to `[x0, y0, x1, y1, ...]`.
pub fn arb_ring() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0.0f64..40.0, 0.0f64..40.0), 3..8)
        .prop_map(|points| points.into_iter().flat_map(|(x, y)| [x, y]).collect())
}

/// One to three rings.
pub fn arb_rings() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(arb_ring(), 1..4)
}

/// Any of the wire shapes a `segmentation` field shows up as, valid or
/// not: polygon lists, RLE objects, strings, and junk.
pub fn arb_segmentation_payload() -> BoxedStrategy<Value> {
    prop_oneof![
        arb_rings().prop_map(|rings| json!(rings)),
        (prop::collection::vec(0u32..500, 1..10), 1u32..20, 1u32..20)
            .prop_map(|(counts, h, w)| json!([{"counts": counts, "size": [h, w]}])),
        "[0-9A-Za-z]{0,24}".prop_map(Value::String),
        prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 0..5), 0..3)
            .prop_map(|short| json!(short)),
        Just(Value::Null),
        any::<i64>().prop_map(|n| json!(n)),
    ]
    .boxed()
}

/// A well-formed annotation record for `image_id`/`category_id` 1.
pub fn good_annotation(id: u64) -> Value {
    json!({
        "id": id, "image_id": 1, "category_id": 1, "iscrowd": 0,
        "segmentation": [[1, 1, 1, 9, 9, 9, 9, 1]],
        "bbox": [1, 1, 8, 8], "area": 64.0
    })
}

/// A record that fails the annotation schema (no bbox).
pub fn bad_annotation(id: u64) -> Value {
    json!({
        "id": id, "image_id": 1, "category_id": 1, "iscrowd": 0,
        "segmentation": [[1, 1, 1, 9, 9, 9, 9, 1]],
        "area": 64.0
    })
}
