//! Dataset index and the public read-only facade.
//!
//! [`DatasetIndex`] owns the four ordered collections plus one id lookup
//! map per collection. Every load builds a fresh index; nothing is shared
//! between datasets. [`Dataset`] is the cheap-to-clone public view over
//! the index.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};

use super::ids::{AnnotationId, CategoryId, ImageId, LicenseId};
use super::loader::{self, LoadReport};
use super::records::{Annotation, Category, Image, Info, License};
use crate::error::CocoError;

/// Non-owning back-link from a child entity to the dataset index that
/// constructed it.
///
/// Used only for id lookup, never for lifetime control: dropping every
/// [`Dataset`] handle drops the index regardless of surviving entity
/// clones, whose accessors then report [`CocoError::NotAttached`].
#[derive(Clone, Default)]
pub(crate) struct DatasetLink(Option<Weak<DatasetIndex>>);

impl DatasetLink {
    pub(crate) fn attached(index: Weak<DatasetIndex>) -> Self {
        Self(Some(index))
    }

    pub(crate) fn resolve(&self) -> Option<Arc<DatasetIndex>> {
        self.0.as_ref().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for DatasetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("DatasetLink(attached)"),
            None => f.write_str("DatasetLink(detached)"),
        }
    }
}

/// The owning store behind a loaded dataset.
///
/// Collections preserve source document order; the id maps give O(1)
/// lookup for the getters. Callers normally reach this through
/// [`Dataset`].
pub struct DatasetIndex {
    pub(crate) info: Info,
    pub(crate) licenses: Vec<License>,
    pub(crate) images: Vec<Image>,
    pub(crate) categories: Vec<Category>,
    pub(crate) annotations: Vec<Annotation>,

    pub(crate) license_index: HashMap<LicenseId, usize>,
    pub(crate) image_index: HashMap<ImageId, usize>,
    pub(crate) category_index: HashMap<CategoryId, usize>,
    pub(crate) annotation_index: HashMap<AnnotationId, usize>,

    pub(crate) report: LoadReport,
}

impl DatasetIndex {
    /// Dataset metadata; all-unset if the document had no `info` section.
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Licenses in source document order.
    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    /// Images in source document order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Categories in source document order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Annotations in source document order (malformed records were
    /// skipped at load; see [`DatasetIndex::load_report`]).
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// What the loader skipped.
    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Looks an image up by id.
    pub fn get_image(&self, id: ImageId) -> Result<&Image, CocoError> {
        self.image_index
            .get(&id)
            .map(|&at| &self.images[at])
            .ok_or(CocoError::NotFound {
                collection: "image",
                id: id.as_u64(),
            })
    }

    /// Looks a category up by id.
    pub fn get_category(&self, id: CategoryId) -> Result<&Category, CocoError> {
        self.category_index
            .get(&id)
            .map(|&at| &self.categories[at])
            .ok_or(CocoError::NotFound {
                collection: "category",
                id: id.as_u64(),
            })
    }

    /// Looks a license up by id.
    pub fn get_license(&self, id: LicenseId) -> Result<&License, CocoError> {
        self.license_index
            .get(&id)
            .map(|&at| &self.licenses[at])
            .ok_or(CocoError::NotFound {
                collection: "license",
                id: id.as_u64(),
            })
    }

    /// Looks an annotation up by id.
    pub fn get_annotation(&self, id: AnnotationId) -> Result<&Annotation, CocoError> {
        self.annotation_index
            .get(&id)
            .map(|&at| &self.annotations[at])
            .ok_or(CocoError::NotFound {
                collection: "annotation",
                id: id.as_u64(),
            })
    }
}

impl fmt::Debug for DatasetIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetIndex")
            .field("licenses", &self.licenses.len())
            .field("images", &self.images.len())
            .field("categories", &self.categories.len())
            .field("annotations", &self.annotations.len())
            .field("skipped", &self.report.skipped_count())
            .finish()
    }
}

/// A loaded COCO-style dataset.
///
/// The public read-only view: ordered collections, id getters, and the
/// load report. Cloning shares the underlying index, and a loaded dataset
/// never mutates, so clones may be handed to other threads freely.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub(crate) index: Arc<DatasetIndex>,
}

impl Dataset {
    /// Loads a dataset from a JSON annotation file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CocoError> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }

    /// Loads a dataset from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, CocoError> {
        Self::from_slice(json.as_bytes())
    }

    /// Loads a dataset from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CocoError> {
        let raw = serde_json::from_slice(bytes)
            .map_err(|source| CocoError::Corrupted { source })?;
        Self::from_value(raw)
    }

    /// Loads a dataset from an already-parsed JSON document.
    pub fn from_value(raw: serde_json::Value) -> Result<Self, CocoError> {
        let index = loader::load_document(raw)?;
        Ok(Dataset { index })
    }

    /// Dataset metadata.
    pub fn info(&self) -> &Info {
        self.index.info()
    }

    /// Licenses in source document order.
    pub fn licenses(&self) -> &[License] {
        self.index.licenses()
    }

    /// Images in source document order.
    pub fn images(&self) -> &[Image] {
        self.index.images()
    }

    /// Categories in source document order.
    pub fn categories(&self) -> &[Category] {
        self.index.categories()
    }

    /// Annotations in source document order.
    pub fn annotations(&self) -> &[Annotation] {
        self.index.annotations()
    }

    /// What the loader skipped.
    pub fn load_report(&self) -> &LoadReport {
        self.index.load_report()
    }

    /// Looks an image up by id.
    pub fn get_image(&self, id: ImageId) -> Result<&Image, CocoError> {
        self.index.get_image(id)
    }

    /// Looks a category up by id.
    pub fn get_category(&self, id: CategoryId) -> Result<&Category, CocoError> {
        self.index.get_category(id)
    }

    /// Looks a license up by id.
    pub fn get_license(&self, id: LicenseId) -> Result<&License, CocoError> {
        self.index.get_license(id)
    }

    /// Looks an annotation up by id.
    pub fn get_annotation(&self, id: AnnotationId) -> Result<&Annotation, CocoError> {
        self.index.get_annotation(id)
    }
}

impl fmt::Display for Dataset {
    /// Renders a one-line diagnostic summary; unset Info fields show as
    /// empty placeholders.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info();
        write!(
            f,
            "Dataset('{}' v{} [{}], images: {}, annotations: {})",
            info.description.as_deref().unwrap_or(""),
            info.version.as_deref().unwrap_or("?"),
            info.contributor.as_deref().unwrap_or("-"),
            self.images().len(),
            self.annotations().len()
        )
    }
}
