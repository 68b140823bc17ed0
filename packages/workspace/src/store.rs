//! On-disk artifacts: the append-only patch log, snapshots, and the manifest
//!
//! Log entries are named `patch-<seq>.xml`. Sequence numbers start at 1 and
//! only grow; gaps are fine. An entry is written once and never touched
//! again. Snapshots and the manifest are derived and are replaced through a
//! temp file and a rename so a reader never sees half a file.

use crate::errors::{ProjectError, ProjectResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ENTRY_PREFIX: &str = "patch-";
const ENTRY_EXTENSION: &str = "xml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub seq: u64,
    pub path: PathBuf,
}

/// Sequence number embedded in an entry file name: `patch-12.xml` → 12.
/// Any non-digit prefix is accepted (`patch_0012.xml`, `12.xml`).
pub fn parse_seq(file_name: &str) -> Option<u64> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if !extension.eq_ignore_ascii_case(ENTRY_EXTENSION) {
        return None;
    }
    let digits = stem.trim_start_matches(|c: char| !c.is_ascii_digit());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn entry_file_name(seq: u64) -> String {
    format!("{}{}.{}", ENTRY_PREFIX, seq, ENTRY_EXTENSION)
}

#[derive(Debug)]
pub struct PatchLog {
    dir: PathBuf,
}

impl PatchLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Entries ordered by sequence number. A missing directory is an empty log.
    pub fn entries(&self) -> ProjectResult<Vec<LogEntry>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            let name = dir_entry.file_name();
            let name = name.to_string_lossy();
            match parse_seq(&name) {
                Some(seq) => entries.push(LogEntry {
                    seq,
                    path: dir_entry.path(),
                }),
                None => warn!(file = %name, "Ignoring file without a sequence number in patch log"),
            }
        }

        entries.sort_by(|a, b| a.seq.cmp(&b.seq).then_with(|| a.path.cmp(&b.path)));
        for pair in entries.windows(2) {
            if pair[0].seq == pair[1].seq {
                warn!(seq = pair[0].seq, "Two patch log entries share a sequence number");
            }
        }
        Ok(entries)
    }

    /// Highest sequence number present, 0 for an empty log
    pub fn last_seq(&self) -> ProjectResult<u64> {
        Ok(self.entries()?.last().map(|entry| entry.seq).unwrap_or(0))
    }

    pub fn next_seq(&self) -> ProjectResult<u64> {
        let last = self.last_seq()?;
        last.checked_add(1).ok_or(ProjectError::SequenceExhausted(last))
    }

    /// Write a new entry. Fails rather than overwrite an existing file.
    pub fn append(&self, seq: u64, text: &str) -> ProjectResult<LogEntry> {
        self.write_entry(seq, |file| file.write_all(text.as_bytes()))
    }

    /// Create entry `seq` and fill it with `write`. A failed write removes
    /// the file again so a partial entry is never replayed.
    fn write_entry<F>(&self, seq: u64, write: F) -> ProjectResult<LogEntry>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(entry_file_name(seq));

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ProjectError::EntryExists(seq))
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = write(&mut file).and_then(|()| file.sync_all()) {
            drop(file);
            if let Err(remove) = fs::remove_file(&path) {
                warn!(seq, error = %remove, "Could not remove partial patch log entry");
            }
            return Err(e.into());
        }

        debug!(seq, path = %path.display(), "Appended patch log entry");
        Ok(LogEntry { seq, path })
    }

    pub fn read(&self, entry: &LogEntry) -> io::Result<String> {
        fs::read_to_string(&entry.path)
    }
}

/// Which log position the working snapshot reflects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub working_seq: u64,
    pub updated_at: DateTime<Utc>,
}

impl Manifest {
    pub fn new(working_seq: u64) -> Self {
        Self {
            working_seq,
            updated_at: Utc::now(),
        }
    }

    /// `None` when there is no manifest yet
    pub fn read(path: &Path) -> ProjectResult<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, path: &Path) -> ProjectResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        write_atomic(path, &text)?;
        Ok(())
    }
}

/// Replace `path` with `contents` via a sibling temp file and a rename
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let mut file = File::create(&tmp)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)
}
