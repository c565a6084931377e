//! Entity records: Info, License, Category, Image, Annotation.
//!
//! Records are passive, immutable values constructed once at load time.
//! Every schema except [`Annotation`] is strict: an unknown key is a
//! deserialization error. Annotations instead collect unrecognized keys
//! into an open `extra` map, because task-specific dialects (keypoints,
//! captions, panoptic) extend the base annotation schema with fields this
//! model does not know about.
//!
//! Images and annotations carry a non-owning back-link to the dataset that
//! constructed them; the relationship accessors ([`Annotation::image`],
//! [`Annotation::category`], [`Image::license`]) resolve through it lazily
//! at call time.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::bbox::BBox;
use super::ids::{AnnotationId, CategoryId, ImageId, LicenseId};
use super::index::DatasetLink;
use crate::error::CocoError;
use crate::segmentation::Segmentation;

/// Dataset-level metadata.
///
/// Every field is optional; an absent `info` section yields the all-unset
/// default, so callers can distinguish "not provided" from an empty value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Info {
    #[serde(default)]
    pub year: Option<u32>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub contributor: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub date_created: Option<String>,
}

/// An image license, referenced by zero or more images.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct License {
    pub id: LicenseId,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl License {
    /// Creates a standalone license.
    pub fn new(id: impl Into<LicenseId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: None,
        }
    }

    /// Sets the license URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A category (class label), referenced by zero or more annotations.
///
/// The optional `keypoints`/`skeleton` fields carry the pose-estimation
/// dialect's category extensions; plain object-detection datasets leave
/// them unset.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,

    #[serde(default)]
    pub supercategory: Option<String>,

    /// Keypoint names, in skeleton order.
    #[serde(default)]
    pub keypoints: Option<Vec<String>>,

    /// Keypoint edge pairs, for visualization.
    #[serde(default)]
    pub skeleton: Option<Vec<[u32; 2]>>,
}

impl Category {
    /// Creates a standalone category.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
            keypoints: None,
            skeleton: None,
        }
    }

    /// Sets the supercategory.
    pub fn with_supercategory(mut self, supercategory: impl Into<String>) -> Self {
        self.supercategory = Some(supercategory.into());
        self
    }
}

/// An image record.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Image {
    pub id: ImageId,
    pub file_name: String,

    /// Width in pixels; zero is rejected at load time.
    pub width: u32,

    /// Height in pixels; zero is rejected at load time.
    pub height: u32,

    /// Wire key `license` (the historical `license_id` spelling is also
    /// accepted).
    #[serde(default, rename = "license", alias = "license_id")]
    pub license_id: Option<LicenseId>,

    #[serde(default)]
    pub coco_url: Option<String>,

    #[serde(default)]
    pub flickr_url: Option<String>,

    #[serde(default)]
    pub date_captured: Option<String>,

    #[serde(skip)]
    pub(crate) link: DatasetLink,
}

impl Image {
    /// Creates a standalone image, not attached to any dataset.
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
            license_id: None,
            coco_url: None,
            flickr_url: None,
            date_captured: None,
            link: DatasetLink::default(),
        }
    }

    /// Sets the license reference.
    pub fn with_license(mut self, license_id: impl Into<LicenseId>) -> Self {
        self.license_id = Some(license_id.into());
        self
    }

    /// Resolves this image's license through the owning dataset.
    ///
    /// Returns `Ok(None)` when the image has no `license_id`. Fails with
    /// [`CocoError::NotAttached`] if the image was created outside of any
    /// dataset, or [`CocoError::NotFound`] if the referenced license does
    /// not exist.
    pub fn license(&self) -> Result<Option<License>, CocoError> {
        let Some(license_id) = self.license_id else {
            return Ok(None);
        };
        let index = self.link.resolve().ok_or(CocoError::NotAttached {
            entity: "image",
            id: self.id.as_u64(),
        })?;
        index.get_license(license_id).map(|l| Some(l.clone()))
    }
}

/// An object annotation: a labeled region of one image.
#[derive(Clone, Debug, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,

    /// Marks a region labeling a group of objects rather than a single one.
    /// The wire accepts `0`/`1` or a JSON bool.
    #[serde(deserialize_with = "bool_from_wire")]
    pub iscrowd: bool,

    /// Region area in pixels; negative values are rejected at load time.
    pub area: f64,

    /// Bounding box, `[x, y, width, height]` on the wire.
    pub bbox: BBox,

    /// Region shape; see [`Segmentation`] for the accepted encodings.
    pub segmentation: Segmentation,

    /// Unrecognized keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,

    #[serde(skip)]
    pub(crate) link: DatasetLink,
}

impl Annotation {
    /// Creates a standalone annotation, not attached to any dataset.
    ///
    /// `iscrowd` defaults to false and `area` to the bbox area; use the
    /// builder methods to override.
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: BBox,
        segmentation: Segmentation,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            iscrowd: false,
            area: bbox.area(),
            bbox,
            segmentation,
            extra: BTreeMap::new(),
            link: DatasetLink::default(),
        }
    }

    /// Sets the crowd flag.
    pub fn with_iscrowd(mut self, iscrowd: bool) -> Self {
        self.iscrowd = iscrowd;
        self
    }

    /// Sets the region area.
    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    /// Adds an unrecognized-field entry.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Resolves the annotated image through the owning dataset.
    ///
    /// Fails with [`CocoError::NotAttached`] on a standalone annotation and
    /// [`CocoError::NotFound`] on a dangling `image_id`.
    pub fn image(&self) -> Result<Image, CocoError> {
        let index = self.link.resolve().ok_or(CocoError::NotAttached {
            entity: "annotation",
            id: self.id.as_u64(),
        })?;
        index.get_image(self.image_id).cloned()
    }

    /// Resolves the annotation's category through the owning dataset.
    ///
    /// Same failure modes as [`Annotation::image`].
    pub fn category(&self) -> Result<Category, CocoError> {
        let index = self.link.resolve().ok_or(CocoError::NotAttached {
            entity: "annotation",
            id: self.id.as_u64(),
        })?;
        index.get_category(self.category_id).cloned()
    }
}

/// Accepts `0`/`1` integers or a JSON bool for the `iscrowd` flag.
fn bool_from_wire<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u8),
    }
    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(i) => Ok(i != 0),
    }
}
