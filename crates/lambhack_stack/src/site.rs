use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::cors::AttributeRef;
use crate::error::{Result, StackError};

pub const WEBSITE_URL_ATTRIBUTE: &str = "WebsiteURL";

/// Static-asset hosting resource backed by a local directory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct S3Site {
    pub resource_name: String,
    pub source_dir: PathBuf,
    pub content_fingerprint: String,
    pub file_count: usize,
}

impl S3Site {
    pub fn new(source_dir: impl AsRef<Path>) -> Result<Self> {
        let source_dir = source_dir.as_ref();
        let metadata = fs::metadata(source_dir).map_err(|error| StackError::SiteSource {
            path: source_dir.to_path_buf(),
            reason: error.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(StackError::SiteSource {
                path: source_dir.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let canonical = fs::canonicalize(source_dir).map_err(|error| StackError::SiteSource {
            path: source_dir.to_path_buf(),
            reason: error.to_string(),
        })?;

        let mut files = Vec::new();
        collect_files(source_dir, source_dir, &mut files)?;
        files.sort();

        let mut hasher = Sha256::new();
        for relative in &files {
            hasher.update(relative.as_bytes());
            hasher.update([0u8]);
            hasher.update(fs::read(source_dir.join(relative))?);
        }

        Ok(Self {
            resource_name: site_resource_name(&canonical),
            source_dir: source_dir.to_path_buf(),
            content_fingerprint: format!("{:x}", hasher.finalize()),
            file_count: files.len(),
        })
    }

    /// Reference to the site's public URL, resolved by the deployment engine.
    pub fn website_url(&self) -> AttributeRef {
        AttributeRef::new(&self.resource_name, WEBSITE_URL_ATTRIBUTE)
    }
}

/// Hashed from the canonical path so every spelling of one directory maps to
/// the same logical resource.
fn site_resource_name(canonical_dir: &Path) -> String {
    let digest = Sha256::digest(canonical_dir.to_string_lossy().as_bytes());
    let hex = format!("{digest:x}");
    format!("S3Site{}", &hex[..8])
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, files)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}
