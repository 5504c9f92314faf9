//! Content fingerprinting for directory deploys.
//!
//! Walks a deploy root and maps every visible file to the lowercase hex
//! SHA-1 of its bytes. The server computes its `required` list against
//! exactly this scheme, so the digest algorithm, the hex casing, the `/`
//! path separator, and the hidden-path rule are all part of the wire
//! contract.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::CoreError;

const READ_BUF_SIZE: usize = 64 * 1024;

/// Relative path → hex SHA-1 for one deploy root.
///
/// Ordered by path so iteration, serialization and upload order are
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    root: PathBuf,
    files: BTreeMap<String, String>,
}

impl Manifest {
    /// The directory the manifest was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path → digest map, as sent to the server.
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Digest of one relative path.
    pub fn digest(&self, relative_path: &str) -> Option<&str> {
        self.files.get(relative_path).map(String::as_str)
    }

    /// Absolute location of a manifest entry on disk.
    pub fn local_path(&self, relative_path: &str) -> PathBuf {
        relative_path
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Paths whose digest the server asked for, in manifest order.
    ///
    /// Membership is by digest, so every path sharing a required digest is
    /// returned and paths sharing a non-required digest never are.
    pub fn required_paths(&self, required: &[String]) -> Vec<&str> {
        let wanted: HashSet<&str> = required.iter().map(String::as_str).collect();
        self.files
            .iter()
            .filter(|(_, digest)| wanted.contains(digest.as_str()))
            .map(|(path, _)| path.as_str())
            .collect()
    }
}

/// Whether any component of a root-relative path starts with `.`.
pub fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Hex SHA-1 of a file's full contents, read in fixed-size chunks.
pub fn digest_file(path: &Path) -> Result<String, CoreError> {
    let mut file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; READ_BUF_SIZE];

    loop {
        let read = file.read(&mut buffer).map_err(|e| CoreError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(to_hex(&hasher.finalize()))
}

/// Hex SHA-1 of an in-memory buffer.
pub fn digest_bytes(data: &[u8]) -> String {
    to_hex(&Sha1::digest(data))
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Build the manifest for a deploy root.
///
/// Hidden entries are pruned during the walk, so nothing below a hidden
/// directory is ever read. Symlinks are followed. The first walk, stat, or
/// read error aborts the whole build.
pub fn fingerprint_dir(root: &Path) -> Result<Manifest, CoreError> {
    let meta = std::fs::metadata(root).map_err(|e| CoreError::io(root, e))?;
    if !meta.is_dir() {
        return Err(CoreError::io(
            root,
            std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "deploy root is not a directory",
            ),
        ));
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        })
        .build();

    let mut files = BTreeMap::new();

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if !is_file {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| CoreError::InvalidPath {
                path: entry.path().to_path_buf(),
            })?;
        if is_hidden(relative) {
            continue;
        }

        let key = relative_key(relative)?;
        let digest = digest_file(entry.path())?;
        files.insert(key, digest);
    }

    debug!(root = %root.display(), files = files.len(), "fingerprinted deploy root");

    Ok(Manifest {
        root: root.to_path_buf(),
        files,
    })
}

/// Join path components with `/` regardless of platform.
fn relative_key(relative: &Path) -> Result<String, CoreError> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(name) = component {
            let part = name.to_str().ok_or_else(|| CoreError::InvalidPath {
                path: relative.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

fn walk_error(root: &Path, err: ignore::Error) -> CoreError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(source) => CoreError::io(root, source),
        None => CoreError::io(root, std::io::Error::other(message)),
    }
}
