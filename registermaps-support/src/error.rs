//! Error types for registermaps-support.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from resource, template, output, and registry
/// operations.
#[derive(Debug, Error)]
pub enum SupportError {
    /// No resource (or template dependency) exists under this name.
    #[error("resource not found: {name}")]
    ResourceNotFound { name: String },

    /// No output class is registered under this name.
    #[error("no output registered as '{name}'")]
    OutputNotFound { name: String },

    /// Resource bytes are invalid under the requested encoding.
    #[error("cannot decode {name} as {encoding}: invalid data at byte {offset}")]
    Decode {
        name: String,
        encoding: &'static str,
        offset: usize,
    },

    /// The encoding label is not one this crate understands.
    #[error("unknown text encoding '{0}'")]
    UnknownEncoding(String),

    /// The decode-error policy label is not one this crate understands.
    #[error("unknown decode error policy '{0}'; expected: strict, replace, ignore")]
    UnknownDecodePolicy(String),

    /// Template source failed to parse or link.
    #[error("failed to compile template {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// A compiled template failed while rendering.
    #[error("failed to render template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// The destination variant has no meaningful implementation of this call.
    #[error("{destination} output does not support {operation}()")]
    Unsupported {
        operation: &'static str,
        destination: &'static str,
    },

    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SupportError {
    /// `true` for the not-found family: missing resources and unregistered outputs.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SupportError::ResourceNotFound { .. } | SupportError::OutputNotFound { .. }
        )
    }
}

/// Convenience constructor for [`SupportError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SupportError {
    SupportError::Io {
        path: path.into(),
        source,
    }
}
