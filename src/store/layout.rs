use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::content_hash::BlobName;
use crate::error::{MigrateError, Result};
use crate::model::RecordKind;

pub const DEFAULT_SRC_ROOT: &str = "../../blogimported";
pub const DEFAULT_DST_ROOT: &str = "../../blogdata";

const TEXT_BLOBS_DIR: &str = "blobs";
const CRASH_BLOBS_DIR: &str = "blobs_crashes";
const DATA_DIR: &str = "data";

/// Source and destination trees of one migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    src_root: PathBuf,
    dst_root: PathBuf,
}

impl Layout {
    /// Both roots must already exist.
    pub fn open(src_root: impl Into<PathBuf>, dst_root: impl Into<PathBuf>) -> Result<Self> {
        let layout = Self {
            src_root: src_root.into(),
            dst_root: dst_root.into(),
        };
        for root in [&layout.src_root, &layout.dst_root] {
            if !root.is_dir() {
                return Err(MigrateError::MissingFile(root.clone()));
            }
        }
        Ok(layout)
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    pub fn dst_root(&self) -> &Path {
        &self.dst_root
    }

    /// Legacy dump for one record kind, e.g. `<src>/texts.txt`.
    pub fn source_dump(&self, kind: RecordKind) -> PathBuf {
        let name = match kind {
            RecordKind::Text => "texts.txt",
            RecordKind::Article => "articles.txt",
            RecordKind::Crash => "crashes.txt",
        };
        self.src_root.join(name)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dst_root.join(DATA_DIR)
    }

    pub fn blog_data_path(&self) -> PathBuf {
        self.data_dir().join("blogdata.txt")
    }

    pub fn crashes_data_path(&self) -> PathBuf {
        self.data_dir().join("crashesdata.txt")
    }

    pub fn redirects_path(&self) -> PathBuf {
        self.data_dir().join("article_redirects.txt")
    }

    pub fn src_text_blob(&self, blob: &(impl BlobName + ?Sized)) -> PathBuf {
        blob_path(&self.src_root, TEXT_BLOBS_DIR, &blob.blob_name())
    }

    pub fn dst_text_blob(&self, blob: &(impl BlobName + ?Sized)) -> PathBuf {
        blob_path(&self.dst_root, TEXT_BLOBS_DIR, &blob.blob_name())
    }

    pub fn src_crash_blob(&self, blob: &(impl BlobName + ?Sized)) -> PathBuf {
        blob_path(&self.src_root, CRASH_BLOBS_DIR, &blob.blob_name())
    }

    pub fn dst_crash_blob(&self, blob: &(impl BlobName + ?Sized)) -> PathBuf {
        blob_path(&self.dst_root, CRASH_BLOBS_DIR, &blob.blob_name())
    }
}

/// `<root>/<tree>/<name[0..2]>/<name[2..4]>/<name>`
fn blob_path(root: &Path, tree: &str, name: &str) -> PathBuf {
    let mut path = root.join(tree);
    if let (Some(outer), Some(inner)) = (name.get(..2), name.get(2..4)) {
        path.push(outer);
        path.push(inner);
    }
    path.join(name)
}
