//! Document synchronization engine.
//!
//! Every operation loads the records of one document (inline or from the
//! linked external file), changes them, and produces at most one
//! [`DocumentEdit`]. Nothing is written unless the whole operation succeeds.

use std::path::{Path, PathBuf};

use cabbage_widgets::normalize::unique_channel;
use cabbage_widgets::schema::schema;
use cabbage_widgets::{RecordError, WidgetKind, WidgetRecord};
use serde_json::Value;
use text_size::TextRange;
use tracing::{debug, info, warn};

use crate::clipboard::Clipboard;
use crate::error::SyncError;
use crate::external::{external_target, FileSystem, StdFileSystem};
use crate::format::{format_external, format_records, JsonFormat};
use crate::highlight::highlight_range;
use crate::layout::{reorder, ROW_TOLERANCE};
use crate::merge::merge_update;
use crate::region::{parse_records, text_size, Region, RegionContent};

/// Engine settings, usually taken from the host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub format: JsonFormat,
    pub highlight: bool,
    pub external_indent: usize,
    pub fallback_extension: String,
    pub row_tolerance: f64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            format: JsonFormat::Compact,
            highlight: true,
            external_indent: 2,
            fallback_extension: "json".to_string(),
            row_tolerance: ROW_TOLERANCE,
        }
    }
}

/// Where a document's records are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    Inline,
    External(PathBuf),
}

/// Records of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecords {
    pub records: Vec<WidgetRecord>,
    pub source: RecordSource,
}

/// New text for one file. External files have already been written.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEdit {
    pub path: PathBuf,
    pub text: String,
    pub highlight: Option<TextRange>,
    pub external: bool,
}

/// An update that was refused while the rest of its batch went through.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub channel: Option<String>,
    pub error: RecordError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOutcome {
    pub edit: Option<DocumentEdit>,
    pub rejected: Vec<Rejection>,
}

enum Target {
    Inline(Region, Vec<WidgetRecord>),
    External(PathBuf, String, Vec<WidgetRecord>),
}

#[derive(Debug)]
pub struct SyncEngine<F = StdFileSystem> {
    fs: F,
    options: SyncOptions,
}

impl SyncEngine<StdFileSystem> {
    pub fn new(options: SyncOptions) -> Self {
        Self::with_file_system(StdFileSystem, options)
    }
}

impl Default for SyncEngine<StdFileSystem> {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

impl<F: FileSystem> SyncEngine<F> {
    pub fn with_file_system(fs: F, options: SyncOptions) -> Self {
        Self { fs, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn set_format(&mut self, format: JsonFormat) {
        self.options.format = format;
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// Records the live graph should show for `text`.
    pub fn load(&self, path: &Path, text: &str) -> Result<LoadedRecords, SyncError> {
        Ok(match self.target(path, text)? {
            Target::Inline(_, records) => LoadedRecords {
                records,
                source: RecordSource::Inline,
            },
            Target::External(external, _, records) => LoadedRecords {
                records,
                source: RecordSource::External(external),
            },
        })
    }

    /// Merge a batch of partial records. Invalid entries are rejected one by
    /// one; a document that cannot be parsed rejects the whole batch.
    pub fn apply_updates(
        &self,
        path: &Path,
        text: &str,
        updates: impl IntoIterator<Item = Value>,
    ) -> Result<SyncOutcome, SyncError> {
        let mut rejected = Vec::new();
        let edit = self.edit(path, text, |records| {
            let mut last = None;
            for update in updates {
                let channel = update
                    .get("channel")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                let result = match update {
                    Value::Object(update) => merge_update(records, update),
                    _ => Err(RecordError::NotAnObject),
                };
                match result {
                    Ok(outcome) => {
                        if let Some(index) = outcome.index() {
                            last = Some(records[index].channel.clone());
                        }
                    }
                    Err(error) => {
                        warn!("rejected widget update: {error}");
                        rejected.push(Rejection { channel, error });
                    }
                }
            }
            Ok(last)
        })?;
        Ok(SyncOutcome { edit, rejected })
    }

    pub fn apply_update(
        &self,
        path: &Path,
        text: &str,
        update: Value,
    ) -> Result<SyncOutcome, SyncError> {
        self.apply_updates(path, text, [update])
    }

    /// Rewrite the inline region in `format` without changing any record.
    /// Regions that only include an external file are left alone.
    pub fn format_document(&self, text: &str, format: JsonFormat) -> Result<Option<String>, SyncError> {
        let region = Region::find(text)?;
        let RegionContent::Records(records) = RegionContent::parse(region.content(text))? else {
            return Ok(None);
        };
        let updated = region.replace(text, &format_records(&records, format));
        Ok((updated != text).then_some(updated))
    }

    /// Insert a new widget seeded from its schema defaults. Returns the
    /// generated channel with the edit.
    pub fn add_widget(
        &self,
        path: &Path,
        text: &str,
        kind: WidgetKind,
        position: Option<(f64, f64)>,
    ) -> Result<(String, Option<DocumentEdit>), SyncError> {
        if kind == WidgetKind::Form {
            return Err(SyncError::Rejected(RecordError::InvalidValue {
                key: "type".into(),
                expected: "a widget other than form",
            }));
        }
        if kind == WidgetKind::Unknown {
            return Err(SyncError::Rejected(RecordError::UnknownType(kind.as_str().into())));
        }
        let mut channel = String::new();
        let edit = self.edit(path, text, |records| {
            let taken: Vec<&str> = records.iter().map(|record| record.channel.as_str()).collect();
            channel = unique_channel(schema(kind).default_channel, &taken);
            let mut record = WidgetRecord::with_defaults(kind, channel.clone());
            if let Some((left, top)) = position {
                let mut bounds = record.bounds();
                bounds.left = left;
                bounds.top = top;
                record.set_bounds(bounds);
            }
            let Value::Object(update) = record.to_value() else {
                return Ok(None);
            };
            merge_update(records, update)?;
            info!("added widget '{channel}'");
            Ok(Some(channel.clone()))
        })?;
        Ok((channel, edit))
    }

    /// Remove the first record with `channel`. `None` when it is not present.
    pub fn remove_widget(
        &self,
        path: &Path,
        text: &str,
        channel: &str,
    ) -> Result<Option<DocumentEdit>, SyncError> {
        self.edit(path, text, |records| {
            if let Some(index) = records.iter().position(|record| record.channel == channel) {
                records.remove(index);
                info!("removed widget '{channel}'");
            } else {
                debug!("no widget '{channel}' to remove");
            }
            Ok(None)
        })
    }

    /// Sort records by visual hierarchy.
    pub fn reorder_widgets(&self, path: &Path, text: &str) -> Result<Option<DocumentEdit>, SyncError> {
        let tolerance = self.options.row_tolerance;
        self.edit(path, text, |records| {
            *records = reorder(std::mem::take(records), tolerance);
            Ok(None)
        })
    }

    /// Copy the named records into `clipboard`.
    pub fn copy_widgets(
        &self,
        path: &Path,
        text: &str,
        channels: &[String],
        clipboard: &mut Clipboard,
    ) -> Result<usize, SyncError> {
        let loaded = self.load(path, text)?;
        Ok(clipboard.copy(&loaded.records, channels))
    }

    /// Append the clipboard records with fresh channels.
    pub fn paste_widgets(
        &self,
        path: &Path,
        text: &str,
        clipboard: &Clipboard,
        offset: (f64, f64),
    ) -> Result<Option<DocumentEdit>, SyncError> {
        if clipboard.is_empty() {
            return Ok(None);
        }
        self.edit(path, text, |records| {
            let pasted = clipboard.prepare_paste(records, offset);
            let last = pasted.last().map(|record| record.channel.clone());
            for record in pasted {
                if let Value::Object(update) = record.to_value() {
                    merge_update(records, update)?;
                }
            }
            Ok(last)
        })
    }

    fn target(&self, path: &Path, text: &str) -> Result<Target, SyncError> {
        let region = Region::find(text)?;
        let content = RegionContent::parse(region.content(text)).inspect_err(|error| {
            warn!("failed to parse <Cabbage> region of {}: {error}", path.display());
        })?;
        match external_target(path, &content, &self.options.fallback_extension, &self.fs) {
            Some(external) => {
                let contents = self
                    .fs
                    .read_to_string(&external)
                    .map_err(|error| SyncError::external(&external, error))?;
                let records = parse_records(&contents)?;
                Ok(Target::External(external, contents, records))
            }
            None => match content {
                RegionContent::Records(records) => Ok(Target::Inline(region, records)),
                RegionContent::Include(include) => Err(SyncError::external(include, "not resolved")),
            },
        }
    }

    /// Load, change and write back. `action` returns the channel to reveal.
    fn edit(
        &self,
        path: &Path,
        text: &str,
        action: impl FnOnce(&mut Vec<WidgetRecord>) -> Result<Option<String>, SyncError>,
    ) -> Result<Option<DocumentEdit>, SyncError> {
        match self.target(path, text)? {
            Target::Inline(region, mut records) => {
                let reveal = action(&mut records)?;
                let format = self.options.format;
                let updated = region.replace(text, &format_records(&records, format));
                if updated == text {
                    return Ok(None);
                }
                let highlight = self.reveal(&updated, reveal.as_deref(), format, |text| {
                    Region::find(text).ok().map(|region| region.content)
                });
                Ok(Some(DocumentEdit {
                    path: path.to_path_buf(),
                    text: updated,
                    highlight,
                    external: false,
                }))
            }
            Target::External(external, contents, mut records) => {
                let reveal = action(&mut records)?;
                let updated = format_external(&records, self.options.external_indent);
                if updated == contents {
                    return Ok(None);
                }
                self.fs
                    .write(&external, &updated)
                    .map_err(|error| SyncError::external(&external, error))?;
                info!("updated external widget file {}", external.display());
                let highlight = self.reveal(&updated, reveal.as_deref(), JsonFormat::Expanded, |text| {
                    Some(TextRange::up_to(text_size(text.len())))
                });
                Ok(Some(DocumentEdit {
                    path: external,
                    text: updated,
                    highlight,
                    external: true,
                }))
            }
        }
    }

    fn reveal(
        &self,
        text: &str,
        channel: Option<&str>,
        format: JsonFormat,
        scope: impl FnOnce(&str) -> Option<TextRange>,
    ) -> Option<TextRange> {
        if !self.options.highlight {
            return None;
        }
        highlight_range(text, scope(text)?, channel?, format)
    }
}
