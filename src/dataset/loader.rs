//! Turns a raw JSON document into a populated dataset index.
//!
//! The load is one pass over an already-parsed document, in dependency
//! order: licenses, images, categories, annotations. The first three
//! collections are trusted once the top-level shape check passes — a
//! malformed record there fails the whole load. Annotations get
//! partial-failure semantics instead: a record that does not match the
//! schema is skipped and reported in the [`LoadReport`], and the load
//! continues.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::index::{DatasetIndex, DatasetLink};
use super::records::{Annotation, Category, Image, Info, License};
use crate::error::CocoError;

/// What the loader recovered from rather than aborted on.
///
/// One entry per skipped annotation record. Fatal problems never reach
/// this report; they surface as [`CocoError`] and no dataset is returned.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    skipped: Vec<SkippedAnnotation>,
}

impl LoadReport {
    /// Skipped annotation records, in document order.
    pub fn skipped(&self) -> &[SkippedAnnotation] {
        &self.skipped
    }

    /// Number of skipped annotation records.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// True if every annotation record loaded.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn add(&mut self, index: usize, reason: impl Into<String>) {
        self.skipped.push(SkippedAnnotation {
            index,
            reason: reason.into(),
        });
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped.is_empty() {
            return writeln!(f, "all annotation records loaded");
        }
        writeln!(f, "skipped {} annotation record(s):", self.skipped.len())?;
        for entry in &self.skipped {
            writeln!(f, "  - {}", entry)?;
        }
        Ok(())
    }
}

/// One annotation record the loader skipped.
#[derive(Clone, Debug)]
pub struct SkippedAnnotation {
    /// Position in the document's `annotations` list.
    pub index: usize,
    /// Why the record was rejected.
    pub reason: String,
}

impl fmt::Display for SkippedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "annotations[{}]: {}", self.index, self.reason)
    }
}

/// Loads a parsed document into a fresh index.
pub(crate) fn load_document(raw: Value) -> Result<Arc<DatasetIndex>, CocoError> {
    let Value::Object(mut doc) = raw else {
        return Err(CocoError::format_invalid(
            "top level must be a JSON object",
        ));
    };

    let missing: Vec<&str> = ["images", "annotations"]
        .into_iter()
        .filter(|key| !doc.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(CocoError::format_invalid(format!(
            "missing required key(s): {}",
            missing.join(", ")
        )));
    }

    let info: Info = match doc.remove("info") {
        None | Some(Value::Null) => Info::default(),
        Some(value) => serde_json::from_value(value)
            .map_err(|source| CocoError::InvalidRecord {
                collection: "info",
                source,
            })?,
    };

    let licenses: Vec<License> = parse_section(doc.remove("licenses"), "licenses", "license")?;
    let images: Vec<Image> = parse_section(doc.remove("images"), "images", "image")?;
    let categories: Vec<Category> =
        parse_section(doc.remove("categories"), "categories", "category")?;

    for image in &images {
        if image.width == 0 || image.height == 0 {
            return Err(CocoError::format_invalid(format!(
                "image {} has invalid dimensions {}x{}",
                image.id, image.width, image.height
            )));
        }
    }

    let license_index = build_index(&licenses, "license", |l| (l.id, l.id.as_u64()))?;
    let image_index = build_index(&images, "image", |i| (i.id, i.id.as_u64()))?;
    let category_index = build_index(&categories, "category", |c| (c.id, c.id.as_u64()))?;

    let mut report = LoadReport::default();
    let mut annotations: Vec<Annotation> = Vec::new();
    let mut annotation_index = HashMap::new();

    let Some(Value::Array(raw_annotations)) = doc.remove("annotations") else {
        return Err(CocoError::format_invalid("`annotations` must be a list"));
    };
    for (at, item) in raw_annotations.into_iter().enumerate() {
        match serde_json::from_value::<Annotation>(item) {
            Ok(ann) => {
                if !ann.bbox.is_well_formed() {
                    report.add(
                        at,
                        format!("bbox {:?} is not a well-formed box", ann.bbox),
                    );
                    continue;
                }
                if !ann.area.is_finite() || ann.area < 0.0 {
                    report.add(at, format!("area {} is not a non-negative number", ann.area));
                    continue;
                }
                if annotation_index.contains_key(&ann.id) {
                    report.add(at, format!("duplicate annotation id {}", ann.id));
                    continue;
                }
                annotation_index.insert(ann.id, annotations.len());
                annotations.push(ann);
            }
            Err(source) => {
                report.add(at, format!("does not match the annotation schema: {source}"));
            }
        }
    }

    // Attach back-links in one infallible pass: every record has already
    // parsed, so no error path can leak a half-built index.
    Ok(Arc::new_cyclic(|weak| {
        let link = DatasetLink::attached(weak.clone());

        let mut images = images;
        for image in &mut images {
            image.link = link.clone();
        }
        let mut annotations = annotations;
        for ann in &mut annotations {
            ann.link = link.clone();
        }

        DatasetIndex {
            info,
            licenses,
            images,
            categories,
            annotations,
            license_index,
            image_index,
            category_index,
            annotation_index,
            report,
        }
    }))
}

/// Parses one optional top-level list strictly: an absent or null section
/// is empty, a non-list section is a format error, and a malformed record
/// fails the load.
fn parse_section<T: DeserializeOwned>(
    value: Option<Value>,
    key: &'static str,
    collection: &'static str,
) -> Result<Vec<T>, CocoError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    if value.is_null() {
        return Ok(Vec::new());
    }
    let Value::Array(items) = value else {
        return Err(CocoError::format_invalid(format!("`{key}` must be a list")));
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|source| CocoError::InvalidRecord {
                collection,
                source,
            })
        })
        .collect()
}

/// Builds the id → position map for one collection, rejecting duplicates.
fn build_index<T, I: Copy + Eq + Hash>(
    items: &[T],
    collection: &'static str,
    id_of: impl Fn(&T) -> (I, u64),
) -> Result<HashMap<I, usize>, CocoError> {
    let mut index = HashMap::with_capacity(items.len());
    for (at, item) in items.iter().enumerate() {
        let (id, raw) = id_of(item);
        if index.insert(id, at).is_some() {
            return Err(CocoError::DuplicateId {
                collection,
                id: raw,
            });
        }
    }
    Ok(index)
}
