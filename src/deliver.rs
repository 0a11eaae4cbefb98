//! Handing a finished icon directory over to its final destination.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, ErrorExt, Result};

/// Moves or copies a produced directory to wherever the caller wants it.
pub trait Delivery {
    /// Delivers `produced` into the `destination` directory and returns the
    /// path of the delivered copy.
    fn deliver(&self, produced: &Path, destination: &Path) -> Result<PathBuf>;
}

/// Recursively copies the produced directory into
/// `<destination>/<produced directory name>`, replacing any previous copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct CopyDelivery;

impl Delivery for CopyDelivery {
    fn deliver(&self, produced: &Path, destination: &Path) -> Result<PathBuf> {
        let metadata = fs::metadata(produced)
            .fs_context("reading produced directory", produced)?;
        if !metadata.is_dir() {
            return Err(invalid(produced, "not a directory"));
        }
        let name = produced.file_name()
                           .ok_or_else(|| invalid(produced,
                                                  "directory has no name"))?
                           .to_owned();
        fs::create_dir_all(destination)
            .fs_context("creating delivery destination", destination)?;

        // Compare resolved paths so that `./Icons` and symlinked temp
        // directories are recognized as the produced tree itself.
        let produced = fs::canonicalize(produced)
            .fs_context("resolving produced directory", produced)?;
        let destination = fs::canonicalize(destination)
            .fs_context("resolving delivery destination", destination)?;
        let target = destination.join(&name);
        if target == produced {
            return Ok(target);
        }
        if target.starts_with(&produced) {
            return Err(invalid(&target,
                               "destination lies inside the produced \
                                directory"));
        }
        if produced.starts_with(&target) {
            return Err(invalid(&target,
                               "replacing it would remove the produced \
                                directory"));
        }
        if target.exists() {
            fs::remove_dir_all(&target)
                .fs_context("removing previous delivery", &target)?;
        }

        for entry in WalkDir::new(&produced).sort_by_file_name() {
            let entry = entry.map_err(|err| Error::Fs {
                context: "walking",
                path: err.path().unwrap_or(&produced).to_path_buf(),
                error: err.into(),
            })?;
            let relative = entry.path()
                                .strip_prefix(&produced)
                                .unwrap_or_else(|_| entry.path());
            let dest = target.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest)
                    .fs_context("creating delivery directory", &dest)?;
            } else {
                fs::copy(entry.path(), &dest)
                    .fs_context("copying icon", &dest)?;
            }
        }

        log::info!("Delivered {} to {}", produced.display(), target.display());
        Ok(target)
    }
}

fn invalid(path: &Path, reason: &str) -> Error {
    Error::Fs {
        context: "delivering",
        path: path.to_path_buf(),
        error: io::Error::new(io::ErrorKind::InvalidInput, reason.to_string()),
    }
}
