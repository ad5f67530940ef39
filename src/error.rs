use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading or querying a map.
///
/// Every load-time failure aborts the whole load; a partially resolved
/// [`Map`](crate::Map) is never handed out.
#[derive(Debug, Error)]
pub enum MapError {
    /// A map, tileset or config file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The XML document does not match the TMX/TSX shape, including malformed
    /// numeric or enum attributes.
    #[error("malformed document {path}: {source}")]
    Document {
        /// Document that failed to parse
        path: PathBuf,
        /// Underlying error
        source: quick_xml::DeError,
    },

    /// The document parsed but is inconsistent.
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// A recognised Tiled feature that this crate does not implement.
    #[error("unsupported feature: {feature}")]
    Unsupported {
        /// Human readable feature name
        feature: String,
    },

    /// A tileset's image is missing or its geometry is inconsistent.
    #[error("tileset '{tileset}' could not be resolved: {reason}")]
    Resolution {
        /// Tileset name (or source path when unnamed)
        tileset: String,
        /// What went wrong
        reason: String,
    },

    /// A layer payload could not be decoded.
    #[error("layer '{layer}' payload: {reason}")]
    Payload {
        /// Layer name
        layer: String,
        /// What went wrong
        reason: String,
    },

    /// A non-empty cell references a gid that no tileset owns.
    #[error("layer '{layer}' cell {cell}: no tileset owns gid {gid}")]
    UnresolvedTile {
        /// Layer name
        layer: String,
        /// 0-based cell index in the layer's payload
        cell: usize,
        /// Offending global tile id (flags stripped)
        gid: u32,
    },

    /// A spatial query named an object group the map does not have.
    #[error("object group '{0}' not found")]
    GroupNotFound(String),

    /// A configuration blob could not be parsed.
    #[error("invalid configuration: {source}")]
    Config {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },
}

/// Coarse category of a [`MapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreadable or malformed source document, tileset description or config.
    Document,
    /// Tileset image missing or geometry inconsistent.
    Resolution,
    /// Unsupported encoding/compression or bad base64.
    Payload,
    /// Global id not owned by any tileset.
    UnresolvedTile,
    /// Query against an unknown object group.
    GroupNotFound,
}

impl MapError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::Io { .. }
            | MapError::Document { .. }
            | MapError::InvalidMap(_)
            | MapError::Unsupported { .. }
            | MapError::Config { .. } => ErrorKind::Document,
            MapError::Resolution { .. } => ErrorKind::Resolution,
            MapError::Payload { .. } => ErrorKind::Payload,
            MapError::UnresolvedTile { .. } => ErrorKind::UnresolvedTile,
            MapError::GroupNotFound(_) => ErrorKind::GroupNotFound,
        }
    }

    pub(crate) fn unsupported(feature: impl Into<String>) -> Self {
        MapError::Unsupported {
            feature: feature.into(),
        }
    }

    pub(crate) fn payload(layer: &str, reason: impl Into<String>) -> Self {
        MapError::Payload {
            layer: layer.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn resolution(tileset: &str, reason: impl Into<String>) -> Self {
        MapError::Resolution {
            tileset: tileset.to_owned(),
            reason: reason.into(),
        }
    }
}
