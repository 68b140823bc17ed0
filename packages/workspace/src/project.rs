//! # Project Controller
//!
//! Owns one project directory and the one [`Document`] derived from it.
//!
//! ## Load
//!
//! ```text
//! NoSnapshot ──► SnapshotLoaded ──► PatchesReplaying ──► Ready
//! ```
//!
//! The base snapshot plus the patch log is the source of truth. When a
//! working snapshot and manifest are present and readable, load starts from
//! them and replays only the newer entries; otherwise it replays everything
//! from the base. A corrupt log entry is skipped with a warning.
//!
//! ## Mutate
//!
//! Generator text is parsed, merged into a copy, and only when something
//! matched is the patch appended to the log and the copy committed. The
//! working snapshot is refreshed afterwards; failing to write it costs load
//! time, not correctness.

use crate::config::ProjectConfig;
use crate::errors::{ProjectError, ProjectResult};
use crate::store::{write_atomic, LogEntry, Manifest, PatchLog};
use folio_editor::{
    fingerprint, parse_document, parse_patch, render_document, render_patch, slice, ContextSlice,
    Document, MergeOutcome, Patch, SectionStatus, SliceMode,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    NoSnapshot,
    SnapshotLoaded,
    PatchesReplaying,
    Ready,
}

/// Where replay started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "from", rename_all = "camelCase")]
pub enum LoadSource {
    Base,
    Working { seq: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub source: LoadSource,
    /// Entries merged during replay
    pub replayed: usize,
    /// Entries that could not be read or parsed
    pub skipped: Vec<u64>,
    /// Highest sequence number seen in the log
    pub last_seq: u64,
}

/// Result of one mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    pub outcome: MergeOutcome,
    /// Log entry written, `None` when nothing matched
    pub seq: Option<u64>,
}

impl Mutation {
    pub fn applied(&self) -> usize {
        self.outcome.applied
    }
}

/// Fingerprints of the same state reached three ways
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Base snapshot plus the full log
    pub replayed: u32,
    /// Working snapshot plus newer entries, as a normal load would do
    pub bounded: u32,
    /// The document held in memory
    pub in_memory: u32,
    pub entries: usize,
}

impl Verification {
    pub fn is_consistent(&self) -> bool {
        self.replayed == self.bounded && self.bounded == self.in_memory
    }
}

#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
    log: PatchLog,
    document: Document,
    report: LoadReport,
}

impl Project {
    /// Initialize a project directory from a generated outline.
    ///
    /// Refuses a directory that still holds any project state: a base or
    /// working snapshot, a manifest, or patch log entries. A new outline
    /// laid over an old log would not survive the next load.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn create(root: &Path, outline: &str, config: ProjectConfig) -> ProjectResult<Self> {
        let snapshot = config.snapshot_path(root);
        let log = PatchLog::new(config.patch_dir(root));
        let leftover = [
            snapshot.clone(),
            config.working_path(root),
            config.manifest_path(root),
        ]
        .into_iter()
        .find(|path| path.exists());
        if let Some(path) = leftover {
            warn!(path = %path.display(), "Existing project state, refusing to initialize");
            return Err(ProjectError::AlreadyInitialized(root.to_path_buf()));
        }
        if !log.entries()?.is_empty() {
            warn!(dir = %log.dir().display(), "Patch log is not empty, refusing to initialize");
            return Err(ProjectError::AlreadyInitialized(root.to_path_buf()));
        }

        let document = parse_document(outline)?;
        fs::create_dir_all(root)?;
        fs::create_dir_all(log.dir())?;
        write_atomic(&snapshot, &render_document(&document))?;

        info!(sections = document.len(), "Created project");
        Ok(Self {
            root: root.to_path_buf(),
            log,
            config,
            document,
            report: LoadReport {
                source: LoadSource::Base,
                replayed: 0,
                skipped: Vec::new(),
                last_seq: 0,
            },
        })
    }

    /// Load, starting from the working snapshot when it can be trusted
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn load(root: &Path, config: ProjectConfig) -> ProjectResult<Self> {
        Loader::new(root, &config).run(true).map(|(document, report)| {
            Self::ready(root, config, document, report)
        })
    }

    /// Load by replaying the whole log over the base snapshot
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn load_from_base(root: &Path, config: ProjectConfig) -> ProjectResult<Self> {
        Loader::new(root, &config).run(false).map(|(document, report)| {
            Self::ready(root, config, document, report)
        })
    }

    fn ready(root: &Path, config: ProjectConfig, document: Document, report: LoadReport) -> Self {
        info!(
            sections = document.len(),
            replayed = report.replayed,
            skipped = report.skipped.len(),
            last_seq = report.last_seq,
            "Project ready"
        );
        Self {
            root: root.to_path_buf(),
            log: PatchLog::new(config.patch_dir(root)),
            config,
            document,
            report,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// How the last load went
    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Parse generator text as a patch and apply it.
    ///
    /// A parse failure leaves the document and the log untouched. A patch
    /// that matches nothing succeeds without being logged.
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn apply_patch_text(&mut self, text: &str) -> ProjectResult<Mutation> {
        let patch = parse_patch(text)?;
        self.apply_patch(&patch)
    }

    pub fn apply_patch(&mut self, patch: &Patch) -> ProjectResult<Mutation> {
        let mut working = self.document.clone();
        let outcome = patch.apply(&mut working);

        if outcome.is_noop() {
            info!(
                missing = ?outcome.missing_sections,
                "Patch matched nothing, not logging"
            );
            return Ok(Mutation { outcome, seq: None });
        }

        let seq = self.log.next_seq()?;
        self.log.append(seq, &render_patch(patch))?;

        self.document = working;
        self.report.last_seq = seq;
        info!(seq, applied = outcome.applied, "Applied patch");

        if let Err(e) = self.write_working_snapshot(seq) {
            warn!(error = %e, "Could not refresh working snapshot; replay remains authoritative");
        }

        Ok(Mutation {
            outcome,
            seq: Some(seq),
        })
    }

    fn write_working_snapshot(&self, seq: u64) -> ProjectResult<()> {
        write_atomic(
            &self.config.working_path(&self.root),
            &render_document(&self.document),
        )?;
        Manifest::new(seq).write(&self.config.manifest_path(&self.root))?;
        debug!(seq, "Wrote working snapshot");
        Ok(())
    }

    /// Bounded view around `section_id`, budgets from the project config
    pub fn slice(&self, section_id: &str, mode: SliceMode) -> ProjectResult<ContextSlice> {
        Ok(slice(&self.document, section_id, mode, &self.config.slice)?)
    }

    pub fn section_statuses(&self) -> Vec<SectionStatus> {
        self.document.section_statuses()
    }

    /// Log entries in sequence order
    pub fn history(&self) -> ProjectResult<Vec<LogEntry>> {
        self.log.entries()
    }

    /// Rebuild the state from disk both ways and compare with memory
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn verify(&self) -> ProjectResult<Verification> {
        let (replayed, report) = Loader::new(&self.root, &self.config).run(false)?;
        let (bounded, _) = Loader::new(&self.root, &self.config).run(true)?;

        let verification = Verification {
            replayed: fingerprint(&replayed),
            bounded: fingerprint(&bounded),
            in_memory: fingerprint(&self.document),
            entries: report.replayed + report.skipped.len(),
        };
        if verification.is_consistent() {
            info!(fingerprint = verification.replayed, "Project state verified");
        } else {
            warn!(?verification, "Project state diverges");
        }
        Ok(verification)
    }
}

/// One pass through the load state machine
struct Loader<'a> {
    root: &'a Path,
    config: &'a ProjectConfig,
    state: LoadState,
}

impl<'a> Loader<'a> {
    fn new(root: &'a Path, config: &'a ProjectConfig) -> Self {
        Self {
            root,
            config,
            state: LoadState::NoSnapshot,
        }
    }

    fn advance(&mut self, state: LoadState) {
        debug!(from = ?self.state, to = ?state, "Load state");
        self.state = state;
    }

    fn run(mut self, bounded: bool) -> ProjectResult<(Document, LoadReport)> {
        let base = self.config.snapshot_path(self.root);
        if !base.is_file() {
            return Err(ProjectError::MissingSnapshot(base));
        }

        let working = if bounded { self.working() } else { None };
        let (mut document, source) = match working {
            Some((document, seq)) => (document, LoadSource::Working { seq }),
            None => (parse_document(&fs::read_to_string(&base)?)?, LoadSource::Base),
        };
        self.advance(LoadState::SnapshotLoaded);

        let after = match source {
            LoadSource::Base => 0,
            LoadSource::Working { seq } => seq,
        };
        let log = PatchLog::new(self.config.patch_dir(self.root));
        let entries = log.entries()?;

        self.advance(LoadState::PatchesReplaying);
        let mut report = LoadReport {
            source,
            replayed: 0,
            skipped: Vec::new(),
            last_seq: entries.last().map_or(after, |entry| entry.seq.max(after)),
        };
        for entry in entries.iter().filter(|entry| entry.seq > after) {
            if replay_entry(&log, entry, &mut document) {
                report.replayed += 1;
            } else {
                report.skipped.push(entry.seq);
            }
        }

        self.advance(LoadState::Ready);
        Ok((document, report))
    }

    /// Working snapshot and the sequence it reflects, if both are usable
    fn working(&self) -> Option<(Document, u64)> {
        let working = self.config.working_path(self.root);
        let manifest = match Manifest::read(&self.config.manifest_path(self.root)) {
            Ok(Some(manifest)) => manifest,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Unreadable manifest, replaying from base");
                return None;
            }
        };

        let text = match fs::read_to_string(&working) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, path = %working.display(), "Unreadable working snapshot, replaying from base");
                return None;
            }
        };
        match parse_document(&text) {
            Ok(document) => {
                debug!(seq = manifest.working_seq, "Starting from working snapshot");
                Some((document, manifest.working_seq))
            }
            Err(e) => {
                warn!(error = %e, "Corrupt working snapshot, replaying from base");
                None
            }
        }
    }
}

/// Merge one log entry into `document`; false when it had to be skipped
fn replay_entry(log: &PatchLog, entry: &LogEntry, document: &mut Document) -> bool {
    let text = match log.read(entry) {
        Ok(text) => text,
        Err(e) => {
            warn!(seq = entry.seq, error = %e, "Unreadable patch log entry, skipping");
            return false;
        }
    };
    match parse_patch(&text) {
        Ok(patch) => {
            let outcome = patch.apply(document);
            debug!(seq = entry.seq, applied = outcome.applied, "Replayed entry");
            true
        }
        Err(e) => {
            warn!(seq = entry.seq, error = %e, "Corrupt patch log entry, skipping");
            false
        }
    }
}
