//! Content-addressed blob relocation.
//!
//! Text blobs are copied byte-for-byte under their existing hash. Crash dumps
//! gain a metadata header first, which changes their hash, so they are stored
//! under the hash of the combined bytes. Both movers skip destinations that
//! already exist, which makes re-running a migration cheap.

use chrono::SecondsFormat;
use serde::Serialize;

use crate::content_hash::ContentHash;
use crate::crash_line::extract_crashing_line;
use crate::error::{MigrateError, Result};
use crate::model::{Crash, Text};
use crate::store::files::{copy_atomic, read_required, write_atomic};
use crate::store::layout::Layout;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlobSummary {
    pub written: usize,
    pub skipped: usize,
}

impl BlobSummary {
    fn record(&mut self, written: bool) {
        if written {
            self.written += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Copy one text blob; returns whether anything was written.
pub fn copy_text_blob(layout: &Layout, text: &Text) -> Result<bool> {
    let src = layout.src_text_blob(text);
    let dst = layout.dst_text_blob(text);

    if !src.is_file() {
        return Err(MigrateError::MissingFile(src));
    }
    if dst.exists() {
        tracing::debug!(hash = %text.hash, "text blob already present");
        return Ok(false);
    }

    copy_atomic(&src, &dst)?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), "copied text blob");
    Ok(true)
}

pub fn copy_text_blobs(layout: &Layout, texts: &[Text]) -> Result<BlobSummary> {
    let mut summary = BlobSummary::default();
    for text in texts {
        summary.record(copy_text_blob(layout, text)?);
    }
    tracing::info!(
        copied = summary.written,
        skipped = summary.skipped,
        "text blobs relocated"
    );
    Ok(summary)
}

/// Three `Key: Value` lines prepended to every migrated crash dump.
pub fn crash_header(crash: &Crash) -> String {
    format!(
        "App: {}\nIp: {}\nOn: {}\n",
        crash.program_name,
        crash.ip_addr,
        crash
            .created_on
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Prefix a crash dump with its header, store it under the new content hash,
/// and fill in the crash's `hash` and `crashed_line`.
///
/// Returns whether the destination blob was written.
pub fn relocate_crash_blob(layout: &Layout, crash: &mut Crash) -> Result<bool> {
    let src = layout.src_crash_blob(&*crash);
    let raw = read_required(&src)?;

    let mut combined = crash_header(crash).into_bytes();
    combined.extend_from_slice(&raw);
    let new_hash = ContentHash::of(&combined);

    let dst = layout.dst_crash_blob(&new_hash);
    let written = if dst.exists() {
        tracing::debug!(hash = %new_hash, "crash blob already present");
        false
    } else {
        write_atomic(&dst, &combined)?;
        tracing::debug!(old = %crash.hash, new = %new_hash, "relocated crash blob");
        true
    };

    crash.hash = new_hash;
    crash.source_name = None;
    crash.crashed_line = extract_crashing_line(&combined);
    Ok(written)
}

pub fn relocate_crash_blobs(layout: &Layout, crashes: &mut [Crash]) -> Result<BlobSummary> {
    let mut summary = BlobSummary::default();
    for crash in crashes.iter_mut() {
        summary.record(relocate_crash_blob(layout, crash)?);
    }
    tracing::info!(
        written = summary.written,
        skipped = summary.skipped,
        "crash blobs relocated"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn layout() -> (TempDir, Layout) {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        let layout = Layout::open(src, dst).unwrap();
        (dir, layout)
    }

    fn put(path: &Path, data: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn crash_with_dump(layout: &Layout, dump: &[u8]) -> Crash {
        let hash = ContentHash::of(dump);
        put(&layout.src_crash_blob(&hash), dump);
        Crash {
            created_on: Utc.with_ymd_and_hms(2011, 2, 3, 4, 5, 6).unwrap(),
            program_name: "SumatraPDF".into(),
            program_version: "1.5".into(),
            ip_addr: "10.0.0.1".into(),
            ip_addr_compact: "a000001".into(),
            hash,
            source_name: None,
            crashed_line: String::new(),
        }
    }

    #[test]
    fn text_blob_is_copied_unchanged_then_skipped() {
        let (_dir, layout) = layout();
        let body = b"<p>hello</p>";
        let text = Text {
            hash: ContentHash::of(body),
            ..Text::default()
        };
        put(&layout.src_text_blob(&text.hash), body);

        let first = copy_text_blobs(&layout, std::slice::from_ref(&text)).unwrap();
        assert_eq!(first, BlobSummary { written: 1, skipped: 0 });
        assert_eq!(fs::read(layout.dst_text_blob(&text.hash)).unwrap(), body);

        let second = copy_text_blobs(&layout, &[text]).unwrap();
        assert_eq!(second, BlobSummary { written: 0, skipped: 1 });
    }

    #[test]
    fn text_blob_named_in_uppercase_is_found_and_kept_under_that_name() {
        let (_dir, layout) = layout();
        let body = b"legacy body";
        let hash = ContentHash::of(body);
        let upper = hash.to_hex().to_uppercase();
        put(&layout.src_text_blob(upper.as_str()), body);
        let text = Text {
            hash,
            source_name: Some(upper.clone()),
            ..Text::default()
        };

        assert!(copy_text_blob(&layout, &text).unwrap());
        assert_eq!(fs::read(layout.dst_text_blob(upper.as_str())).unwrap(), body);
    }

    #[test]
    fn missing_text_blob_is_fatal() {
        let (_dir, layout) = layout();
        let text = Text {
            hash: ContentHash::of(b"never written"),
            ..Text::default()
        };
        let err = copy_text_blob(&layout, &text).unwrap_err();
        assert!(matches!(err, MigrateError::MissingFile(ref p) if *p == layout.src_text_blob(&text.hash)));
    }

    #[test]
    fn crash_header_has_three_lines_with_rfc3339_time() {
        let crash = Crash {
            created_on: Utc.with_ymd_and_hms(2011, 2, 3, 4, 5, 6).unwrap(),
            program_name: "SumatraPDF".into(),
            ip_addr: "::1".into(),
            ..Crash::default()
        };
        assert_eq!(
            crash_header(&crash),
            "App: SumatraPDF\nIp: ::1\nOn: 2011-02-03T04:05:06Z\n"
        );
    }

    #[test]
    fn crash_blob_is_rehashed_over_header_and_dump() {
        let (_dir, layout) = layout();
        let dump = b"Crashed thread:\n00 01:00 SumatraPDF.exe!Boom+0x1\n";
        let mut crash = crash_with_dump(&layout, dump);
        let original_hash = crash.hash;

        let written = relocate_crash_blob(&layout, &mut crash).unwrap();
        assert!(written);

        let mut expected = crash_header(&crash).into_bytes();
        expected.extend_from_slice(dump);
        assert_eq!(crash.hash, ContentHash::of(&expected));
        assert_ne!(crash.hash, original_hash);
        assert_eq!(fs::read(layout.dst_crash_blob(&crash.hash)).unwrap(), expected);
        assert_eq!(crash.crashed_line, "SumatraPDF.exe!Boom+0x1");
        assert!(layout.src_crash_blob(&original_hash).exists());
    }

    #[test]
    fn relocating_again_does_not_rewrite_destination() {
        let (_dir, layout) = layout();
        let dump = b"raw dump bytes";
        let crash = crash_with_dump(&layout, dump);

        let mut first = crash.clone();
        assert!(relocate_crash_blob(&layout, &mut first).unwrap());
        let dst = layout.dst_crash_blob(&first.hash);
        let before = fs::metadata(&dst).unwrap().modified().unwrap();

        let mut second = crash.clone();
        assert!(!relocate_crash_blob(&layout, &mut second).unwrap());
        assert_eq!(second.hash, first.hash);
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), before);

        let summary = relocate_crash_blobs(&layout, &mut [crash]).unwrap();
        assert_eq!(summary, BlobSummary { written: 0, skipped: 1 });
    }

    #[test]
    fn crash_dump_named_in_uppercase_is_relocated_under_lowercase_hash() {
        let (_dir, layout) = layout();
        let dump = b"uppercase named dump";
        let mut crash = crash_with_dump(&layout, dump);
        let upper = crash.hash.to_hex().to_uppercase();
        fs::remove_file(layout.src_crash_blob(&crash.hash)).unwrap();
        put(&layout.src_crash_blob(upper.as_str()), dump);
        crash.source_name = Some(upper);

        assert!(relocate_crash_blob(&layout, &mut crash).unwrap());
        assert_eq!(crash.source_name, None);
        assert!(layout.dst_crash_blob(&crash.hash).exists());
    }

    #[test]
    fn missing_crash_dump_is_fatal() {
        let (_dir, layout) = layout();
        let mut crash = Crash {
            hash: ContentHash::of(b"gone"),
            ..Crash::default()
        };
        let err = relocate_crash_blob(&layout, &mut crash).unwrap_err();
        assert_eq!(err.code(), "missing_file");
        assert_eq!(crash.hash, ContentHash::of(b"gone"));
    }
}
