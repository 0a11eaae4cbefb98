//! Error types for manifest loading and icon export.

use std::io;
use std::path::PathBuf;
use thiserror::Error as DeriveError;

/// Errors returned while loading manifests or exporting icons.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// A manifest could not be located or does not have the expected
    /// structure.
    #[error("invalid manifest {manifest}: {reason}")]
    Configuration {
        /// Name of the manifest (built-in name or file path).
        manifest: String,
        /// What was wrong with it.
        reason: String,
    },

    /// File system error with path context.
    #[error("{context} {path}: {error}")]
    Fs {
        /// The operation that failed (e.g. "creating idiom directory").
        context: &'static str,
        /// Path that was being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        error: io::Error,
    },

    /// The source image could not be decoded.
    #[error("failed to decode image {path}: {error}")]
    Decode {
        /// Path of the source image.
        path: PathBuf,
        /// The underlying decoder error.
        error: image::ImageError,
    },

    /// Two icons in the same idiom would be written to the same file.
    #[error("duplicate icon {idiom}/{label}.png")]
    DuplicateLabel {
        /// Idiom shared by the colliding icons.
        idiom: String,
        /// Display label shared by the colliding icons.
        label: String,
    },

    /// An idiom or label cannot be used as a single path component inside
    /// the output root.
    #[error("icon name {name:?} in idiom {idiom:?} is not a plain file name")]
    UnsafeName {
        /// Idiom of the offending spec.
        idiom: String,
        /// The idiom or label that was rejected.
        name: String,
    },

    /// The source image has no pixels.
    #[error("source image is empty")]
    EmptySource,

    /// Generic I/O error (encoding, buffer validation).
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Creates a configuration error for the named manifest.
    pub fn configuration(manifest: impl Into<String>,
                         reason: impl ToString)
                         -> Error {
        Error::Configuration {
            manifest: manifest.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this error came from manifest loading.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Returns true if this error came from the file system.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Fs { .. } | Error::Io(_))
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Attaches an operation and a path to I/O failures.
pub trait ErrorExt<T> {
    /// Converts an `io::Error` into `Error::Fs`.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>)
                  -> Result<T>;
}

impl<T> ErrorExt<T> for io::Result<T> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>)
                  -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_context_keeps_path() {
        let result: io::Result<()> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.fs_context("removing output root", "/tmp/Icons")
                        .unwrap_err();
        assert!(err.is_io());
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "removing output root /tmp/Icons: gone");
    }

    #[test]
    fn configuration_message() {
        let err = Error::configuration("watch", "missing field `idiom`");
        assert!(err.is_configuration());
        assert_eq!(err.to_string(),
                   "invalid manifest watch: missing field `idiom`");
    }

    #[test]
    fn unsafe_name_is_neither_kind() {
        let err = Error::UnsafeName {
            idiom: "mac".to_string(),
            name: "../up".to_string(),
        };
        assert!(!err.is_io());
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(),
                   "icon name \"../up\" in idiom \"mac\" is not a plain file name");
    }
}
