use std::rc::Rc;

use im::Vector;
use leptos_reactive::{create_signal, ReadSignal, SignalGetUntracked, SignalSet, WriteSignal};
use serde::Serialize;
use tracing::debug;

use crate::prelude::{DocumentMutator, ProcessDocument, RestClient, SyncError};

use super::{
    utils::{remove_record, replace_record, tracked},
    LoadingFlag, Notifications,
};

/// The process collection as last seen from the backend.
///
/// The document being edited, its history and the element selection live in
/// the store's [`DocumentMutator`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessState {
    pub processes: Vector<ProcessDocument>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessAction {
    SetError(Option<String>),
    SetProcesses(Vector<ProcessDocument>),
    AddProcess(ProcessDocument),
    UpdateProcess(ProcessDocument),
    DeleteProcess(String),
}

impl ProcessState {
    pub fn reduce(&self, action: ProcessAction) -> Self {
        match action {
            ProcessAction::SetError(error) => Self {
                error,
                ..self.clone()
            },
            ProcessAction::SetProcesses(processes) => Self {
                processes,
                ..self.clone()
            },
            ProcessAction::AddProcess(process) => {
                let mut processes = self.processes.clone();
                processes.push_back(process);
                Self {
                    processes,
                    ..self.clone()
                }
            }
            ProcessAction::UpdateProcess(process) => Self {
                processes: replace_record(&self.processes, process),
                ..self.clone()
            },
            ProcessAction::DeleteProcess(id) => Self {
                processes: remove_record(&self.processes, &id),
                ..self.clone()
            },
        }
    }

    pub fn summary(&self) -> ProcessSummary {
        ProcessSummary {
            total: self.processes.len(),
            active: self
                .processes
                .iter()
                .filter(|process| process.is_active())
                .count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProcessSummary {
    pub total: usize,
    pub active: usize,
}

pub struct ProcessStore {
    pub state: ReadSignal<ProcessState>,
    set_state: WriteSignal<ProcessState>,
    pub editor: DocumentMutator,
    loading: LoadingFlag,
    client: Rc<RestClient>,
    notifications: Rc<Notifications>,
}

impl ProcessStore {
    pub fn new(
        client: Rc<RestClient>,
        notifications: Rc<Notifications>,
        max_history_depth: usize,
    ) -> Self {
        let (state, set_state) = create_signal(ProcessState::default());
        Self {
            state,
            set_state,
            editor: DocumentMutator::new(max_history_depth),
            loading: LoadingFlag::new(),
            client,
            notifications,
        }
    }

    pub fn dispatch(&self, action: ProcessAction) {
        debug!(?action, "process dispatch");
        let next = self.state.get_untracked().reduce(action);
        self.set_state.set(next);
    }

    pub fn snapshot(&self) -> ProcessState {
        self.state.get_untracked()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn summary(&self) -> ProcessSummary {
        self.snapshot().summary()
    }

    fn record_error(&self, error: &SyncError) {
        self.dispatch(ProcessAction::SetError(Some(error.to_string())));
    }

    pub async fn load_processes(&self) -> Result<Vector<ProcessDocument>, SyncError> {
        let processes = tracked(
            &self.loading,
            &self.notifications,
            "Failed to load processes",
            |error| self.record_error(error),
            self.client.list::<ProcessDocument>(),
        )
        .await?;
        self.dispatch(ProcessAction::SetProcesses(processes.clone()));
        Ok(processes)
    }

    pub async fn create_process(&self, process: &ProcessDocument) -> Result<ProcessDocument, SyncError> {
        let created = tracked(
            &self.loading,
            &self.notifications,
            "Failed to create process",
            |error| self.record_error(error),
            self.client.create(process),
        )
        .await?;
        self.dispatch(ProcessAction::AddProcess(created.clone()));
        self.notifications.success("Process created successfully");
        Ok(created)
    }

    pub async fn update_process<P: Serialize + ?Sized>(
        &self,
        id: &str,
        updates: &P,
    ) -> Result<ProcessDocument, SyncError> {
        let updated: ProcessDocument = tracked(
            &self.loading,
            &self.notifications,
            "Failed to update process",
            |error| self.record_error(error),
            self.client.update(id, updates),
        )
        .await?;
        self.dispatch(ProcessAction::UpdateProcess(updated.clone()));
        self.editor.refresh_saved(&updated);
        self.notifications.success("Process updated successfully");
        Ok(updated)
    }

    /// Deletes a process; closes the editor if it was showing that process.
    pub async fn delete_process(&self, id: &str) -> Result<(), SyncError> {
        tracked(
            &self.loading,
            &self.notifications,
            "Failed to delete process",
            |error| self.record_error(error),
            self.client.remove::<ProcessDocument>(id),
        )
        .await?;
        self.dispatch(ProcessAction::DeleteProcess(id.to_string()));
        let is_open = self
            .editor
            .current()
            .map(|document| document.id.as_deref() == Some(id))
            .unwrap_or(false);
        if is_open {
            self.editor.close();
        }
        self.notifications.success("Process deleted successfully");
        Ok(())
    }

    pub fn open_process(&self, process: ProcessDocument) {
        self.editor.open(process);
    }

    /// Persists the visible document.
    ///
    /// A document the server has never seen is created instead, and the
    /// editor reopens on the server's copy so later saves target its id.
    /// Returns `None` when nothing is open.
    pub async fn save_current(&self) -> Result<Option<ProcessDocument>, SyncError> {
        let Some(document) = self.editor.current() else {
            return Ok(None);
        };
        match document.id.clone() {
            Some(id) => self.update_process(&id, document.as_ref()).await.map(Some),
            None => {
                let created = self.create_process(&document).await?;
                self.editor.open(created.clone());
                Ok(Some(created))
            }
        }
    }
}
