//! The entity model: records, ids, and the loaded-dataset index.
//!
//! A document loads through [`Dataset::from_path`] (or the str/slice/value
//! variants) into an immutable graph: ordered collections of [`License`],
//! [`Image`], [`Category`] and [`Annotation`] records, an id index per
//! collection, and lazy child-to-parent links so an annotation can
//! resolve its image and category without the caller threading the
//! dataset around.

mod bbox;
mod ids;
mod index;
mod loader;
mod records;

pub use bbox::BBox;
pub use ids::{AnnotationId, CategoryId, ImageId, LicenseId};
pub use index::{Dataset, DatasetIndex};
pub use loader::{LoadReport, SkippedAnnotation};
pub use records::{Annotation, Category, Image, Info, License};
