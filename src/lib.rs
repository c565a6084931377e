//! cocoset: a typed, read-only model of COCO-style annotation datasets.
//!
//! A COCO document is a JSON object holding images, licenses, categories
//! and annotations that reference each other by id. This crate loads such
//! a document into validated records with O(1) id lookup, lazy
//! relationship resolution (`annotation.image()`, `annotation.category()`,
//! `image.license()`), and a polymorphic [`Segmentation`] type that
//! normalizes the three region encodings COCO uses and rasterizes them
//! into binary masks on demand.
//!
//! # Modules
//!
//! - [`dataset`]: entity records, ids, the loader and the read-only facade
//! - [`segmentation`]: the polymorphic region type
//! - [`mask`]: run-length encodings and rasterization
//! - [`error`]: the error type for cocoset operations
//!
//! # Example
//!
//! ```
//! use cocoset::Dataset;
//!
//! let dataset = Dataset::from_json_str(r#"{
//!     "images": [{"id": 1, "file_name": "a.jpg", "width": 10, "height": 10}],
//!     "categories": [{"id": 1, "name": "x"}],
//!     "annotations": [{
//!         "id": 1, "image_id": 1, "category_id": 1, "iscrowd": 0,
//!         "segmentation": [[1, 1, 1, 9, 9, 9, 9, 1]],
//!         "bbox": [1, 1, 8, 8], "area": 64.0
//!     }]
//! }"#)?;
//!
//! let ann = &dataset.annotations()[0];
//! assert_eq!(ann.image()?.file_name, "a.jpg");
//! assert_eq!(ann.category()?.name, "x");
//!
//! let mask = ann.segmentation.mask(10, 10)?;
//! assert!(mask.area() > 0);
//! # Ok::<(), cocoset::CocoError>(())
//! ```

pub mod dataset;
pub mod error;
pub mod mask;
pub mod segmentation;

pub use dataset::{
    Annotation, AnnotationId, BBox, Category, CategoryId, Dataset, DatasetIndex, Image, ImageId,
    Info, License, LicenseId, LoadReport, SkippedAnnotation,
};
pub use error::CocoError;
pub use mask::{Mask, Rle, RunLengths};
pub use segmentation::{Segmentation, SegmentationKind};
