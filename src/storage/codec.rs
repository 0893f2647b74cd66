//! Backup archive codec: the full store as `db.json` inside `db.zip`
//!
//! The wire shape is a single JSON object, `slogans` first then
//! `user_scores`, wrapped as the only member of a deflated zip. Decode is
//! all-or-nothing: a foreign archive, a missing member, or any malformed or
//! mistyped field rejects the whole document.

use std::io::{Cursor, Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::storage::db::{Slogan, UserScore};

/// File name the backup archive is published and accepted under.
pub const ARCHIVE_NAME: &str = "db.zip";

/// Name of the single JSON member inside the archive.
pub const ARCHIVE_ENTRY: &str = "db.json";

/// Point-in-time snapshot of the full store. A derived, disposable artifact
/// regenerated fresh on every mutation; restoring one replaces all rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub slogans: Vec<Slogan>,
    pub user_scores: Vec<UserScore>,
}

/// Errors raised while reading or writing a backup archive.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("not a valid zip archive: {0}")]
    Archive(#[from] ZipError),

    #[error("archive does not contain {ARCHIVE_ENTRY}")]
    MissingEntry,

    #[error("malformed backup document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read archive entry: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes the document as `db.json` inside a deflated in-memory zip.
pub fn encode(document: &BackupDocument) -> Result<Vec<u8>, CodecError> {
    let json = serde_json::to_vec(document)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(ARCHIVE_ENTRY, options)?;
    writer.write_all(&json)?;

    Ok(writer.finish()?.into_inner())
}

/// Parses a backup archive back into a document.
pub fn decode(bytes: &[u8]) -> Result<BackupDocument, CodecError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = match archive.by_name(ARCHIVE_ENTRY) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(CodecError::MissingEntry),
        Err(e) => return Err(e.into()),
    };

    let mut json = String::new();
    entry.read_to_string(&mut json)?;

    Ok(serde_json::from_str(&json)?)
}
