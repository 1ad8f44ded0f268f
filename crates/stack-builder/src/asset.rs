// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    fs,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use stack_model::asset::Packaging;
use tracing::debug;

use crate::error::BuildError;

/// A local file or directory to be uploaded before deployment, identified by the hash of
/// its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: PathBuf,
    pub fingerprint: String,
    pub packaging: Packaging,
    extension: Option<String>,
}

impl Asset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)
            .map_err(|_| BuildError::AssetNotFound(path.display().to_string()))?;

        let (fingerprint, packaging, extension) = if metadata.is_dir() {
            (fingerprint_directory(path)?, Packaging::Zip, None)
        } else {
            let mut hasher = Sha256::new();
            hasher.update(fs::read(path)?);
            (
                format!("{:x}", hasher.finalize()),
                Packaging::File,
                path.extension()
                    .and_then(|extension| extension.to_str())
                    .map(str::to_string),
            )
        };

        debug!(path = %path.display(), %fingerprint, "Fingerprinted asset");

        Ok(Self {
            path: path.to_path_buf(),
            fingerprint,
            packaging,
            extension,
        })
    }

    /// Key of the uploaded object: directories are zipped, files keep their extension.
    pub fn object_key(&self) -> String {
        match (&self.packaging, &self.extension) {
            (Packaging::Zip, _) => format!("{}.zip", self.fingerprint),
            (Packaging::File, Some(extension)) => format!("{}.{extension}", self.fingerprint),
            (Packaging::File, None) => self.fingerprint.clone(),
        }
    }
}

/// Hash of every file below `root`: relative path and content, in path order. Renaming,
/// adding or changing any file changes the fingerprint; file system timestamps don't.
fn fingerprint_directory(root: &Path) -> Result<String, BuildError> {
    let mut files = vec![];
    collect_files(root, root, &mut files)?;
    files.sort();

    let mut hasher = Sha256::new();
    for relative in files {
        hasher.update(relative.as_bytes());
        hasher.update([0u8]);
        let content = fs::read(root.join(&relative))?;
        hasher.update((content.len() as u64).to_be_bytes());
        hasher.update(content);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<String>) -> Result<(), BuildError> {
    for entry in dir.read_dir()? {
        let entry = entry?;
        let path = entry.path();

        let file_type = entry.file_type()?;
        let is_dir = if file_type.is_symlink() {
            linked_is_dir(dir, &path)?
        } else {
            file_type.is_dir()
        };

        if is_dir {
            collect_files(root, &path, files)?;
        } else {
            let relative = path
                .strip_prefix(root)
                .map_err(|e| BuildError::Generic(e.to_string()))?
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(relative);
        }
    }
    Ok(())
}

/// Links are followed, so the asset holds what they point to. A link to a directory
/// containing it would never end.
fn linked_is_dir(dir: &Path, link: &Path) -> Result<bool, BuildError> {
    let link_error = |reason: &str| BuildError::AssetLink {
        path: link.display().to_string(),
        reason: reason.to_string(),
    };

    let metadata = fs::metadata(link).map_err(|_| link_error("target does not exist"))?;
    if !metadata.is_dir() {
        return Ok(false);
    }

    let target = fs::canonicalize(link)?;
    if fs::canonicalize(dir)?.starts_with(&target) {
        return Err(link_error("links to a directory that contains it"));
    }
    Ok(true)
}
