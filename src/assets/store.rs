use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::assets::source::{ImageSource, decode_data_uri};
use crate::foundation::error::{BoothError, BoothResult};

/// Resolves asset references to raw bytes.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, reference: &str) -> BoothResult<Vec<u8>>;
}

/// Reads assets from a directory on disk.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetFetcher for FsFetcher {
    fn fetch(&self, reference: &str) -> BoothResult<Vec<u8>> {
        let rel = normalize_rel_path(reference)?;
        let path = self.root.join(&rel);
        let bytes = std::fs::read(&path).with_context(|| format!("read asset '{}'", path.display()))?;
        Ok(bytes)
    }
}

/// Normalize an asset reference to a `/`-separated relative path.
///
/// Web-rooted references (`/frames/a.png`) are treated as relative to the assets root.
pub(crate) fn normalize_rel_path(source: &str) -> BoothResult<String> {
    let s = source.trim().replace('\\', "/");
    let s = s.trim_start_matches('/');
    if s.is_empty() {
        return Err(BoothError::validation("asset path must be non-empty"));
    }
    if s.contains("://") {
        return Err(BoothError::validation(format!(
            "remote asset references are not supported: '{source}'"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(BoothError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(BoothError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Produce the encoded bytes behind `source`.
pub fn source_bytes(source: &ImageSource, fetcher: &dyn AssetFetcher) -> BoothResult<Arc<Vec<u8>>> {
    match source {
        ImageSource::Encoded(bytes) => Ok(Arc::clone(bytes)),
        ImageSource::DataUri(uri) => Ok(Arc::new(decode_data_uri(uri)?.1)),
        ImageSource::Asset(reference) => Ok(Arc::new(fetcher.fetch(reference)?)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
