mod dialog;
mod edit;

pub use dialog::{Decision, DialogKind, DialogService};
pub use edit::{EditBuffer, EditError, EditFields};

use tracing::{error, info, warn};

use super::gateway::MetadataGateway;
use super::listing::MetadataListing;
use super::metadata::MetadataRecord;

/// How an admin action ended. Every variant short of `Completed` means the
/// held list was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Operator declined or dismissed the confirmation.
    Cancelled,
    /// A newer load finished first and owns the list now.
    Superseded,
    /// Update submitted with nothing changed; no network call was made.
    NoChanges,
    /// Required input was empty; no network call was made.
    MissingInput,
    /// The edited feeds/authors text failed to decode; no network call.
    InvalidInput,
    Failed,
}

/// Sequences operator intent through confirmation, the gateway call and
/// local list reconciliation. Mutations that echo the record are patched
/// into the held list; everything else falls back to a full refresh.
pub struct AdminSession<D: DialogService> {
    gateway: MetadataGateway,
    dialogs: D,
    listing: MetadataListing,
    edit: Option<EditBuffer>,
    load_token: u64,
}

impl<D: DialogService> AdminSession<D> {
    pub fn new(gateway: MetadataGateway, dialogs: D) -> Self {
        Self {
            gateway,
            dialogs,
            listing: MetadataListing::new(),
            edit: None,
            load_token: 0,
        }
    }

    pub fn listing(&self) -> &MetadataListing {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut MetadataListing {
        &mut self.listing
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.edit.as_ref()
    }

    pub fn edit_fields_mut(&mut self) -> Option<&mut EditFields> {
        self.edit.as_mut().map(|buffer| &mut buffer.fields)
    }

    /// Fetches the list for the current mode. Loads carry a monotonically
    /// increasing token so that a stale completion never overwrites the
    /// result of a newer request.
    pub async fn load(&mut self, preserve_page: bool) -> ActionOutcome {
        let token = self.begin_load();
        match self.gateway.list(self.listing.mode()).await {
            Ok(records) => {
                if self.finish_load(token, records, preserve_page) {
                    ActionOutcome::Completed
                } else {
                    ActionOutcome::Superseded
                }
            }
            Err(load_error) => {
                error!(error = %load_error, "failed to load metadata list");
                ActionOutcome::Failed
            }
        }
    }

    pub async fn toggle_mode(&mut self) -> ActionOutcome {
        self.listing.flip_mode();
        self.load(false).await
    }

    pub async fn submit_new(&mut self, source_url: &str) -> ActionOutcome {
        if source_url.trim().is_empty() {
            self.dialogs.notify(
                "Advertencia",
                "No has agregado ningún metadato",
                DialogKind::Warning,
            );
            return ActionOutcome::MissingInput;
        }
        match self.gateway.create(source_url.trim()).await {
            Ok(()) => {
                info!(url = source_url.trim(), "metadata submitted for analysis");
                // the created record is not echoed back, so refetch
                self.load(true).await;
                self.dialogs.notify(
                    "¡Éxito!",
                    "Metadato agregado correctamente",
                    DialogKind::Success,
                );
                ActionOutcome::Completed
            }
            Err(create_error) => {
                error!(error = %create_error, "failed to create metadata");
                self.dialogs.notify(
                    "¡Error!",
                    "Hubo un problema al agregar el metadato",
                    DialogKind::Error,
                );
                ActionOutcome::Failed
            }
        }
    }

    pub async fn request_activate(&mut self, id: i64) -> ActionOutcome {
        let decision = self.dialogs.confirm(
            "¿Estás seguro?",
            "Estás a punto de activar este metadato.",
            DialogKind::Warning,
        );
        if decision != Decision::Confirmed {
            return ActionOutcome::Cancelled;
        }
        match self.gateway.activate(id).await {
            Ok(record) => {
                info!(id, "metadata activated");
                self.listing.apply_mutation(record);
                self.dialogs.notify(
                    "¡Éxito!",
                    "Metadato activado correctamente",
                    DialogKind::Success,
                );
                ActionOutcome::Completed
            }
            Err(activate_error) => {
                error!(error = %activate_error, id, "failed to activate metadata");
                self.dialogs.notify(
                    "¡Error!",
                    "Hubo un problema al activar el metadato",
                    DialogKind::Error,
                );
                ActionOutcome::Failed
            }
        }
    }

    /// Three-way gate: confirm deactivates, the alternate button deletes,
    /// anything else walks away.
    pub async fn request_deactivate_or_delete(&mut self, id: i64) -> ActionOutcome {
        let decision = self.dialogs.confirm(
            "¿Qué acción quieres realizar?",
            "Desactivar o eliminar este metadato.",
            DialogKind::Question,
        );
        match decision {
            Decision::Confirmed => self.request_deactivate(id).await,
            Decision::Cancelled => self.request_delete(id).await,
            Decision::Dismissed => ActionOutcome::Cancelled,
        }
    }

    pub async fn request_deactivate(&mut self, id: i64) -> ActionOutcome {
        let decision = self.dialogs.confirm(
            "¿Estás seguro?",
            "Estás a punto de desactivar este metadato.",
            DialogKind::Warning,
        );
        if decision != Decision::Confirmed {
            return ActionOutcome::Cancelled;
        }
        match self.gateway.deactivate(id).await {
            Ok(Some(record)) => {
                info!(id, "metadata deactivated");
                self.listing.apply_mutation(record);
                self.notify_deactivated();
                ActionOutcome::Completed
            }
            Ok(None) => {
                info!(id, "metadata deactivated, ack without record echo");
                self.load(true).await;
                self.notify_deactivated();
                ActionOutcome::Completed
            }
            Err(deactivate_error) => {
                error!(error = %deactivate_error, id, "failed to deactivate metadata");
                self.dialogs.notify(
                    "¡Error!",
                    "Hubo un problema al desactivar el metadato",
                    DialogKind::Error,
                );
                ActionOutcome::Failed
            }
        }
    }

    pub async fn request_delete(&mut self, id: i64) -> ActionOutcome {
        let decision = self.dialogs.confirm(
            "¿Estás seguro?",
            "Estás a punto de eliminar este metadato.",
            DialogKind::Warning,
        );
        if decision != Decision::Confirmed {
            return ActionOutcome::Cancelled;
        }
        match self.gateway.delete(id).await {
            Ok(outcome) => {
                if outcome.already_deleted {
                    info!(id, "metadata was already deleted on the server");
                } else {
                    info!(id, "metadata deleted");
                }
                self.listing.remove(id);
                self.dialogs.notify(
                    "¡Éxito!",
                    "Metadato eliminado correctamente",
                    DialogKind::Success,
                );
                ActionOutcome::Completed
            }
            Err(delete_error) => {
                error!(error = %delete_error, id, "failed to delete metadata");
                self.dialogs.notify(
                    "¡Error!",
                    "Hubo un problema al eliminar el metadato",
                    DialogKind::Error,
                );
                ActionOutcome::Failed
            }
        }
    }

    /// Loads the record into the edit buffer. Returns false when the id is
    /// not in the held list.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        match self.listing.find(id) {
            Some(record) => {
                self.edit = Some(EditBuffer::new(record.clone()));
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    pub async fn submit_update(&mut self) -> ActionOutcome {
        let Some(buffer) = self.edit.as_ref() else {
            return ActionOutcome::MissingInput;
        };
        if !buffer.is_dirty() {
            self.dialogs.notify(
                "Información",
                "No se han realizado cambios",
                DialogKind::Info,
            );
            return ActionOutcome::NoChanges;
        }
        let payload = match buffer.build_update() {
            Ok(payload) => payload,
            Err(parse_error) => {
                error!(error = %parse_error, "failed to parse edited metadata");
                self.dialogs.notify(
                    "¡Error!",
                    "Hubo un problema al parsear los datos",
                    DialogKind::Error,
                );
                return ActionOutcome::InvalidInput;
            }
        };
        let decision = self.dialogs.confirm(
            "¿Estás seguro?",
            "Estás a punto de actualizar este metadato.",
            DialogKind::Warning,
        );
        if decision != Decision::Confirmed {
            return ActionOutcome::Cancelled;
        }
        match self.gateway.update(&payload).await {
            Ok(record) => {
                info!(id = record.id, "metadata updated");
                self.edit = None;
                self.listing.apply_mutation(record);
                self.dialogs.notify(
                    "¡Éxito!",
                    "Metadato actualizado correctamente",
                    DialogKind::Success,
                );
                ActionOutcome::Completed
            }
            Err(update_error) => {
                error!(error = %update_error, "failed to update metadata");
                self.dialogs.notify(
                    "¡Error!",
                    "Hubo un problema al actualizar el metadato",
                    DialogKind::Error,
                );
                ActionOutcome::Failed
            }
        }
    }

    fn notify_deactivated(&self) {
        self.dialogs.notify(
            "¡Éxito!",
            "Metadato desactivado correctamente",
            DialogKind::Success,
        );
    }

    fn begin_load(&mut self) -> u64 {
        self.load_token += 1;
        self.load_token
    }

    fn finish_load(
        &mut self,
        token: u64,
        records: Vec<MetadataRecord>,
        preserve_page: bool,
    ) -> bool {
        if token != self.load_token {
            warn!(
                token,
                current = self.load_token,
                "discarding stale metadata load"
            );
            return false;
        }
        self.listing.reload(records, preserve_page);
        true
    }
}
