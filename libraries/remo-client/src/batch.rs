//! Size-bounded partitioning of resolved files into upload batches.

use crate::resolver::ResolvedFile;

/// Default batch threshold: 8 MiB.
pub const DEFAULT_BULK_SIZE: u64 = 8 * 1024 * 1024;

/// A group of files sent in one upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    /// Position in submission order
    pub index: usize,
    pub files: Vec<ResolvedFile>,
}

impl UploadBatch {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(ResolvedFile::size).sum()
    }
}

/// Split files into batches, closing a batch once its size reaches `bulk_size`.
///
/// A single file larger than `bulk_size` ends up alone in its batch. Order is
/// preserved and only the last batch may be below the threshold.
pub fn split_files_by_size(files: Vec<ResolvedFile>, bulk_size: u64) -> Vec<UploadBatch> {
    let mut batches = Vec::new();
    let mut current = Vec::new();
    let mut current_size = 0u64;

    for file in files {
        current_size = current_size.saturating_add(file.size());
        current.push(file);

        if current_size >= bulk_size {
            batches.push(UploadBatch {
                index: batches.len(),
                files: std::mem::take(&mut current),
            });
            current_size = 0;
        }
    }

    if !current.is_empty() {
        batches.push(UploadBatch {
            index: batches.len(),
            files: current,
        });
    }

    batches
}
