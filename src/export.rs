//! Bundles completed photos into a single zip archive.

use std::{
    collections::HashSet,
    io::{Cursor, Write as _},
    path::{Path, PathBuf},
};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    batch::Batch,
    error::{FramerError, FramerResult},
    render::FramedImage,
};

/// Appended to the prefix to name the folder inside the archive.
pub const FOLDER_SUFFIX: &str = "photos";
/// Appended to the prefix, before the timestamp, in the archive file name.
pub const ARCHIVE_SUFFIX: &str = "batch_";

/// `<prefix><stem>.jpg`, where `stem` is the display name without directories
/// or its last extension.
///
/// Only the last extension goes: `IMG.0042.HEIC` becomes `IMG.0042.jpg`, so
/// dotted names stay distinct. The browser tool cut at the first dot and
/// would have named both `IMG.0042.HEIC` and `IMG.0043.HEIC` `IMG.jpg`.
pub fn entry_name(prefix: &str, name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    };
    format!("{prefix}{stem}.jpg")
}

pub fn archive_file_name(prefix: &str, timestamp_ms: i64) -> String {
    format!("{prefix}{ARCHIVE_SUFFIX}{timestamp_ms}.zip")
}

/// Serializes `(display name, output)` pairs into zip bytes: one folder,
/// one stored entry per photo. Names that collide get `-2`, `-3`, ...
/// appended so no photo is lost.
pub fn build_archive<'a>(
    prefix: &str,
    items: impl IntoIterator<Item = (&'a str, &'a FramedImage)>,
) -> FramerResult<Vec<u8>> {
    let folder = format!("{prefix}{FOLDER_SUFFIX}/");
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.add_directory(folder.as_str(), options)
        .map_err(|e| FramerError::archive(format!("add folder: {e}")))?;

    let mut used = HashSet::new();
    let mut entries = 0usize;
    for (name, out) in items {
        let entry = unique_name(&mut used, entry_name(prefix, name));
        zip.start_file(format!("{folder}{entry}"), options)
            .map_err(|e| FramerError::archive(format!("start entry '{entry}': {e}")))?;
        zip.write_all(&out.jpeg)
            .map_err(|e| FramerError::archive(format!("write entry '{entry}': {e}")))?;
        entries += 1;
    }

    let bytes = zip
        .finish()
        .map_err(|e| FramerError::archive(format!("finish archive: {e}")))?
        .into_inner();
    tracing::debug!(entries, bytes = bytes.len(), "archive built");
    Ok(bytes)
}

fn unique_name(used: &mut HashSet<String>, name: String) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name.as_str(), ""));
    let mut n = 2usize;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem}-{n}")
        } else {
            format!("{stem}-{n}.{ext}")
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Writes the archive of every completed photo in `batch` into `out_dir`
/// and returns its path. The file appears only once fully written.
///
/// Fails when nothing is completed. Never changes photo state.
pub fn write_archive(batch: &Batch, out_dir: &Path) -> FramerResult<PathBuf> {
    let timestamp_ms = chrono::Utc::now().timestamp_millis();
    write_archive_at(batch, out_dir, timestamp_ms)
}

pub fn write_archive_at(
    batch: &Batch,
    out_dir: &Path,
    timestamp_ms: i64,
) -> FramerResult<PathBuf> {
    let prefix = batch.config().prefix.as_str();
    let items: Vec<_> = batch
        .completed()
        .map(|(img, out)| (img.name(), out))
        .collect();
    if items.is_empty() {
        return Err(FramerError::archive("no completed images to export"));
    }

    let bytes = build_archive(prefix, items.iter().copied())?;

    std::fs::create_dir_all(out_dir).map_err(|e| {
        FramerError::io(format!(
            "create output directory '{}': {e}",
            out_dir.display()
        ))
    })?;
    let path = out_dir.join(archive_file_name(prefix, timestamp_ms));

    let mut tmp = tempfile::NamedTempFile::new_in(out_dir)
        .map_err(|e| FramerError::io(format!("create temp file: {e}")))?;
    tmp.write_all(&bytes)
        .map_err(|e| FramerError::io(format!("write archive: {e}")))?;
    tmp.persist(&path)
        .map_err(|e| FramerError::io(format!("persist '{}': {}", path.display(), e.error)))?;

    tracing::info!(
        path = %path.display(),
        entries = items.len(),
        bytes = bytes.len(),
        "archive written"
    );
    Ok(path)
}
