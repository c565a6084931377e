use thiserror::Error;

/// The main error type for cocoset operations.
///
/// Load-time variants (`Corrupted`, `FormatInvalid`, `InvalidRecord`,
/// `DuplicateId`) abort dataset construction entirely; the remaining
/// variants are scoped to the single call that produced them and leave the
/// rest of the dataset usable.
#[derive(Debug, Error)]
pub enum CocoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source document could not be parsed as JSON at all.
    #[error("dataset is corrupted or not a valid JSON document: {source}")]
    Corrupted {
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but does not have the minimal COCO shape.
    #[error("not a valid COCO dataset: {reason}")]
    FormatInvalid { reason: String },

    /// A license, image or category record did not match its schema.
    ///
    /// Unlike annotations, these collections are not recovered per-record:
    /// one malformed entry fails the whole load.
    #[error("invalid {collection} record: {source}")]
    InvalidRecord {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Two records in the same collection share an id.
    #[error("duplicate {collection} id {id}")]
    DuplicateId { collection: &'static str, id: u64 },

    /// A relationship accessor was called on an entity that was built
    /// outside of any dataset.
    #[error("{entity} {id} was created outside of any COCO dataset; related entities cannot be resolved")]
    NotAttached { entity: &'static str, id: u64 },

    /// A foreign key did not resolve to any entity in its target collection.
    #[error("no {collection} with id {id} in this dataset")]
    NotFound { collection: &'static str, id: u64 },

    /// A segmentation payload could not be rasterized against the
    /// requested canvas.
    #[error("cannot decode segmentation: {reason}")]
    DecodeFailure { reason: String },
}

impl CocoError {
    pub(crate) fn format_invalid(reason: impl Into<String>) -> Self {
        CocoError::FormatInvalid {
            reason: reason.into(),
        }
    }

    pub(crate) fn decode_failure(reason: impl Into<String>) -> Self {
        CocoError::DecodeFailure {
            reason: reason.into(),
        }
    }
}
