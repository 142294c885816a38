//! Host session state and message dispatch.
//!
//! The session owns the text of every open document, the current mode and
//! the widget clipboard. Each document sits behind its own mutex so updates
//! to one document are applied one at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cabbage_sync::{
    line_range, Clipboard, DocumentEdit, JsonFormat, SyncEngine, SyncOutcome, PASTE_OFFSET,
};
use cabbage_widgets::WidgetKind;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::HostConfig;
use crate::error::SessionError;
use crate::protocol::{Inbound, Mode, Outbound};

#[derive(Debug)]
struct DocumentState {
    text: String,
}

/// Messages produced by one inbound message, in send order.
#[derive(Debug, Default, PartialEq)]
pub struct DispatchOutcome {
    pub messages: Vec<Outbound>,
    pub should_exit: bool,
}

#[derive(Debug)]
pub struct Session {
    engine: SyncEngine,
    documents: RwLock<FxHashMap<PathBuf, Arc<Mutex<DocumentState>>>>,
    active: RwLock<Option<PathBuf>>,
    mode: RwLock<Mode>,
    snap_size: RwLock<f64>,
    clipboard: Mutex<Clipboard>,
}

impl Session {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            engine: SyncEngine::new(config.sync_options()),
            documents: RwLock::new(FxHashMap::default()),
            active: RwLock::new(None),
            mode: RwLock::new(Mode::Edit),
            snap_size: RwLock::new(config.layout.snap_size),
            clipboard: Mutex::new(Clipboard::new()),
        }
    }

    pub fn mode(&self) -> Mode {
        *self.mode.read()
    }

    pub fn snap_size(&self) -> f64 {
        *self.snap_size.read()
    }

    pub fn active_document(&self) -> Option<PathBuf> {
        self.active.read().clone()
    }

    /// Current text of an open document.
    pub fn document_text(&self, path: &Path) -> Option<String> {
        let state = self.documents.read().get(path).cloned()?;
        let text = state.lock().text.clone();
        Some(text)
    }

    pub fn dispatch(&self, message: Inbound) -> DispatchOutcome {
        let path = message_path(&message);
        match self.handle(message) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!("{error}");
                DispatchOutcome {
                    messages: vec![Outbound::diagnostic(path, error.to_string())],
                    ..DispatchOutcome::default()
                }
            }
        }
    }

    fn handle(&self, message: Inbound) -> Result<DispatchOutcome, SessionError> {
        let messages = match message {
            Inbound::OpenDocument { path, text } => {
                info!("opened {}", path.display());
                self.store(&path, text);
                *self.active.write() = Some(path.clone());
                self.reload(&path)?
            }
            Inbound::OnFileChanged { path, text } => {
                self.store(&path, text);
                *self.active.write() = Some(path.clone());
                self.reload(&path)?
            }
            Inbound::CloseDocument { path } => {
                self.documents.write().remove(&path);
                let mut active = self.active.write();
                if active.as_deref() == Some(path.as_path()) {
                    *active = None;
                }
                Vec::new()
            }
            Inbound::SetMode { mode } => self.set_mode(mode),
            Inbound::OnEnterEditMode => self.set_mode(Mode::Edit),
            Inbound::OnEnterPerformanceMode => self.set_mode(Mode::Play),
            Inbound::CabbageSetupComplete => {
                let mut messages = match self.active_document() {
                    Some(path) => self.reload(&path)?,
                    None => Vec::new(),
                };
                messages.push(self.mode_message(self.mode()));
                messages
            }
            Inbound::SnapToSize { size } => {
                let size = size.max(0.0);
                *self.snap_size.write() = size;
                vec![Outbound::SnapToSize { size }]
            }
            Inbound::ParameterChange(update) => vec![Outbound::ParameterChange(update)],
            Inbound::MidiMessage { channel, message } => {
                vec![Outbound::MidiMessage { channel, message }]
            }
            Inbound::FileOpen { channel } => vec![Outbound::FileOpen { channel }],
            Inbound::FileOpenFromVsCode { file_name, channel } => {
                vec![Outbound::FileOpenFromVsCode { file_name, channel }]
            }
            Inbound::WidgetUpdate { path, data } => {
                if self.mode() == Mode::Play {
                    debug!("ignoring widget update in play mode");
                    return Ok(DispatchOutcome::default());
                }
                let path = match path {
                    Some(path) => path,
                    None => self.active_document().ok_or(SessionError::NoActiveDocument)?,
                };
                self.widget_update(&path, data)?
            }
            Inbound::AddWidget {
                path,
                kind,
                left,
                top,
            } => self.add_widget(&path, kind, left.zip(top))?,
            Inbound::RemoveWidget { path, channel } => self.structural(&path, |text| {
                self.engine.remove_widget(&path, text, &channel)
            })?,
            Inbound::FormatDocument { path } => self.format(&path, JsonFormat::Compact)?,
            Inbound::ExpandDocument { path } => self.format(&path, JsonFormat::Expanded)?,
            Inbound::ReorderWidgets { path } => {
                self.structural(&path, |text| self.engine.reorder_widgets(&path, text))?
            }
            Inbound::CopyWidgets { path, channels } => {
                let text = self.text(&path)?;
                let mut clipboard = self.clipboard.lock();
                let copied = self
                    .engine
                    .copy_widgets(&path, &text, &channels, &mut clipboard)?;
                debug!("copied {copied} widgets");
                Vec::new()
            }
            Inbound::PasteWidgets { path } => {
                let clipboard = self.clipboard.lock().clone();
                self.structural(&path, |text| {
                    self.engine
                        .paste_widgets(&path, text, &clipboard, (PASTE_OFFSET, PASTE_OFFSET))
                })?
            }
            Inbound::Exit => {
                return Ok(DispatchOutcome {
                    should_exit: true,
                    ..DispatchOutcome::default()
                })
            }
        };
        Ok(DispatchOutcome {
            messages,
            ..DispatchOutcome::default()
        })
    }

    fn store(&self, path: &Path, text: String) {
        let mut documents = self.documents.write();
        let state = documents.entry(path.to_path_buf()).or_insert_with(|| {
            Arc::new(Mutex::new(DocumentState {
                text: String::new(),
            }))
        });
        state.lock().text = text;
    }

    fn state(&self, path: &Path) -> Result<Arc<Mutex<DocumentState>>, SessionError> {
        self.documents
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| SessionError::DocumentNotOpen(path.to_path_buf()))
    }

    fn text(&self, path: &Path) -> Result<String, SessionError> {
        let state = self.state(path)?;
        let text = state.lock().text.clone();
        Ok(text)
    }

    fn set_mode(&self, mode: Mode) -> Vec<Outbound> {
        *self.mode.write() = mode;
        vec![self.mode_message(mode)]
    }

    fn mode_message(&self, mode: Mode) -> Outbound {
        match mode {
            Mode::Edit => Outbound::OnEnterEditMode {
                snap_size: self.snap_size(),
            },
            Mode::Play => Outbound::OnEnterPerformanceMode,
        }
    }

    /// Clear the panel and send every record of `path`.
    fn reload(&self, path: &Path) -> Result<Vec<Outbound>, SessionError> {
        let text = self.text(path)?;
        let loaded = self.engine.load(path, &text)?;
        let mut messages = Vec::with_capacity(loaded.records.len() + 1);
        messages.push(Outbound::OnFileChanged);
        for record in loaded.records {
            messages.push(Outbound::WidgetUpdate {
                channel: record.channel.clone(),
                data: Some(record.to_value().to_string()),
                value: None,
            });
        }
        Ok(messages)
    }

    fn widget_update(&self, path: &Path, data: Value) -> Result<Vec<Outbound>, SessionError> {
        let updates = match data {
            Value::String(json) => serde_json::from_str::<Value>(&json)
                .map_err(|error| SessionError::InvalidPayload(error.to_string()))?,
            other => other,
        };
        let updates = match updates {
            Value::Array(updates) => updates,
            update @ Value::Object(_) => vec![update],
            other => {
                return Err(SessionError::InvalidPayload(format!(
                    "expected an object or an array, found {other}"
                )))
            }
        };
        let state = self.state(path)?;
        let mut state = state.lock();
        let SyncOutcome { edit, rejected } =
            self.engine.apply_updates(path, &state.text, updates)?;
        let mut messages: Vec<Outbound> = rejected
            .into_iter()
            .map(|rejection| {
                let message = match rejection.channel {
                    Some(channel) => format!("widget '{channel}' rejected: {}", rejection.error),
                    None => format!("widget update rejected: {}", rejection.error),
                };
                Outbound::diagnostic(Some(path.to_path_buf()), message)
            })
            .collect();
        if let Some(edit) = edit {
            messages.insert(0, Self::apply_edit(&mut state, edit));
        }
        Ok(messages)
    }

    fn add_widget(
        &self,
        path: &Path,
        kind: WidgetKind,
        position: Option<(f64, f64)>,
    ) -> Result<Vec<Outbound>, SessionError> {
        let snap = self.snap_size();
        let position = position.map(|(left, top)| (snap_to(left, snap), snap_to(top, snap)));
        self.structural(path, |text| {
            let (_, edit) = self.engine.add_widget(path, text, kind, position)?;
            Ok(edit)
        })
    }

    fn format(&self, path: &Path, format: JsonFormat) -> Result<Vec<Outbound>, SessionError> {
        let state = self.state(path)?;
        let mut state = state.lock();
        let Some(text) = self.engine.format_document(&state.text, format)? else {
            return Ok(Vec::new());
        };
        let edit = DocumentEdit {
            path: path.to_path_buf(),
            text,
            highlight: None,
            external: false,
        };
        Ok(vec![Self::apply_edit(&mut state, edit)])
    }

    /// Run an edit that changes which widgets exist, then resend them all.
    fn structural(
        &self,
        path: &Path,
        action: impl FnOnce(&str) -> Result<Option<DocumentEdit>, cabbage_sync::SyncError>,
    ) -> Result<Vec<Outbound>, SessionError> {
        let state = self.state(path)?;
        let mut messages = {
            let mut state = state.lock();
            match action(&state.text)? {
                Some(edit) => vec![Self::apply_edit(&mut state, edit)],
                None => return Ok(Vec::new()),
            }
        };
        messages.extend(self.reload(path)?);
        Ok(messages)
    }

    fn apply_edit(state: &mut DocumentState, edit: DocumentEdit) -> Outbound {
        let highlight = edit.highlight.map(|range| line_range(&edit.text, range));
        if !edit.external {
            state.text.clone_from(&edit.text);
        }
        Outbound::DocumentEdit {
            path: edit.path,
            text: edit.text,
            highlight,
            external: edit.external,
        }
    }
}

fn snap_to(position: f64, size: f64) -> f64 {
    if size <= 0.0 {
        return position;
    }
    (position / size).round() * size
}

fn message_path(message: &Inbound) -> Option<PathBuf> {
    match message {
        Inbound::OpenDocument { path, .. }
        | Inbound::CloseDocument { path }
        | Inbound::OnFileChanged { path, .. }
        | Inbound::AddWidget { path, .. }
        | Inbound::RemoveWidget { path, .. }
        | Inbound::FormatDocument { path }
        | Inbound::ExpandDocument { path }
        | Inbound::ReorderWidgets { path }
        | Inbound::CopyWidgets { path, .. }
        | Inbound::PasteWidgets { path } => Some(path.clone()),
        Inbound::WidgetUpdate { path, .. } => path.clone(),
        _ => None,
    }
}
