//! Input journal persisted as JSON lines with a SHA-256 hash chain.
//!
//! Line 1 is a [`JournalHeader`]. Every following line is one accepted input
//! stamped with the session clock. Its `digest` covers the entry JSON plus the
//! digest of the line before, so edits, deletions and reorderings all break the
//! chain. Lines are flushed as they are written and a missing final newline
//! marks a torn write.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::journal::{InputJournal, InputPayload, InputRecord, JOURNAL_FORMAT_VERSION};

/// Digest the first record chains from.
pub const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalHeader {
    pub format_version: u16,
    pub build_id: String,
    /// Fingerprint of the first level the run was recorded against.
    pub content_hash: u64,
    pub seed: u64,
}

impl From<JournalHeader> for InputJournal {
    fn from(header: JournalHeader) -> Self {
        Self {
            format_version: header.format_version,
            build_id: header.build_id,
            content_hash: header.content_hash,
            seed: header.seed,
            inputs: Vec::new(),
        }
    }
}

/// The hashed part of a line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct JournalEntry {
    seq: u64,
    clock_ms: u64,
    payload: InputPayload,
}

impl JournalEntry {
    fn digest_after(&self, prev_digest: &str) -> serde_json::Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(self)?);
        hasher.update(prev_digest.as_bytes());
        Ok(format!("{:064x}", hasher.finalize()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChainedLine {
    #[serde(flatten)]
    entry: JournalEntry,
    prev_digest: String,
    digest: String,
}

/// Appends chained lines to a journal file.
pub struct JournalWriter {
    out: BufWriter<File>,
    last_digest: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Creates the file and any missing parent directories, then writes the header.
    pub fn create(path: &Path, seed: u64, build_id: &str, content_hash: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let header = JournalHeader {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: build_id.to_string(),
            content_hash,
            seed,
        };
        let mut writer =
            Self { out: BufWriter::new(File::create(path)?), last_digest: INITIAL_HASH.to_string(), next_seq: 0 };
        writer.write_line(&header)?;
        Ok(writer)
    }

    /// Continues a journal returned by [`load_journal_from_file`].
    pub fn resume(path: &Path, last_digest: String, next_seq: u64) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self { out: BufWriter::new(file), last_digest, next_seq })
    }

    pub fn append(&mut self, clock_ms: u64, payload: &InputPayload) -> io::Result<()> {
        let entry = JournalEntry { seq: self.next_seq, clock_ms, payload: payload.clone() };
        let digest = entry.digest_after(&self.last_digest).map_err(io::Error::other)?;
        let line = ChainedLine { entry, prev_digest: self.last_digest.clone(), digest };
        self.write_line(&line)?;

        self.last_digest = line.digest;
        self.next_seq += 1;
        Ok(())
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value).map_err(io::Error::other)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    /// Clock stamp of every record, parallel to `journal.inputs`.
    pub clock_stamps: Vec<u64>,
    /// Pass to [`JournalWriter::resume`] to keep extending the chain.
    pub last_digest: String,
    pub next_seq: u64,
}

#[derive(Debug, Error)]
pub enum JournalLoadError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("journal file is empty")]
    EmptyFile,
    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("journal format version {found} is not supported (expected {JOURNAL_FORMAT_VERSION})")]
    UnsupportedVersion { found: u16 },
    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    /// The file ends without a trailing newline.
    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },
    #[error("SHA-256 hash chain broken at line {line}")]
    HashChainBroken { line: usize },
}

/// Reads and verifies a whole journal file.
pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();
    let Some(first) = lines.next() else {
        return Err(JournalLoadError::EmptyFile);
    };
    if !content.ends_with('\n') {
        return Err(JournalLoadError::IncompleteLine { line: content.lines().count() });
    }

    let header: JournalHeader = serde_json::from_str(first)
        .map_err(|error| JournalLoadError::InvalidHeader { line: 1, message: error.to_string() })?;
    if header.format_version != JOURNAL_FORMAT_VERSION {
        return Err(JournalLoadError::UnsupportedVersion { found: header.format_version });
    }

    let mut journal = InputJournal::from(header);
    let mut clock_stamps = Vec::new();
    let mut last_digest = INITIAL_HASH.to_string();
    for (offset, text) in lines.enumerate() {
        let line = offset + 2;
        let invalid = |message: String| JournalLoadError::InvalidRecord { line, message };

        let chained: ChainedLine = serde_json::from_str(text).map_err(|error| invalid(error.to_string()))?;
        let expected_seq = journal.inputs.len() as u64;
        if chained.entry.seq != expected_seq {
            return Err(invalid(format!("expected seq {expected_seq}, found {}", chained.entry.seq)));
        }
        let recomputed = chained.entry.digest_after(&last_digest).map_err(|error| invalid(error.to_string()))?;
        if chained.prev_digest != last_digest || chained.digest != recomputed {
            return Err(JournalLoadError::HashChainBroken { line });
        }

        let JournalEntry { seq, clock_ms, payload } = chained.entry;
        clock_stamps.push(clock_ms);
        journal.inputs.push(InputRecord { seq, payload });
        last_digest = chained.digest;
    }

    let next_seq = journal.inputs.len() as u64;
    Ok(LoadedJournal { journal, clock_stamps, last_digest, next_seq })
}
