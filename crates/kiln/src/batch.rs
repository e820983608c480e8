//! Batch decoding of many files.
//!
//! Every file gets its own session; a failure is recorded against its path
//! and never stops the rest. With the `parallel` feature, files are decoded
//! on rayon's thread pool.

use std::path::{Path, PathBuf};

use crate::{Asset, AssetKind, Result};

/// Outcome of decoding one file.
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub result: Result<Asset>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn kind(&self) -> Option<AssetKind> {
        self.result.as_ref().ok().map(Asset::kind)
    }
}

/// Counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub decoded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(items: &[BatchItem]) -> Self {
        let decoded = items.iter().filter(|item| item.is_ok()).count();
        Self {
            decoded,
            failed: items.len() - decoded,
        }
    }
}

fn decode_one(path: &Path) -> BatchItem {
    let result = Asset::open(path);
    match &result {
        Ok(asset) => tracing::trace!(path = %path.display(), kind = ?asset.kind(), "decoded"),
        Err(err) => tracing::debug!(path = %path.display(), error = %err, "decode failed"),
    }
    BatchItem {
        path: path.to_path_buf(),
        result,
    }
}

/// Decode every path independently, in input order.
#[cfg(feature = "parallel")]
pub fn decode_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<BatchItem> {
    use rayon::prelude::*;

    let items: Vec<BatchItem> = paths
        .par_iter()
        .map(|path| decode_one(path.as_ref()))
        .collect();
    log_summary(&items);
    items
}

/// Decode every path independently, in input order.
#[cfg(not(feature = "parallel"))]
pub fn decode_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<BatchItem> {
    let items: Vec<BatchItem> = paths.iter().map(|path| decode_one(path.as_ref())).collect();
    log_summary(&items);
    items
}

fn log_summary(items: &[BatchItem]) {
    let summary = BatchSummary::of(items);
    tracing::debug!(
        decoded = summary.decoded,
        failed = summary.failed,
        "batch finished"
    );
}
