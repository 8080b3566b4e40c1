use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AppError;
use crate::services::file_processor::UploadAnalysis;

pub const UPLOAD_CANCELLED: &str = "Upload cancelled";

/// Which of the two dashboard files an upload fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Products,
    Sales,
}

impl UploadKind {
    pub fn label(self) -> &'static str {
        match self {
            UploadKind::Products => "products",
            UploadKind::Sales => "sales",
        }
    }

    /// Name and header line of the downloadable example file.
    pub fn template(self) -> (&'static str, &'static str) {
        match self {
            UploadKind::Products => (
                "plantilla_productos.csv",
                "codigo,nombre,pais,tiempo_llegada,cantidad_minima_compra,sensibilidad_precio,stock\n",
            ),
            UploadKind::Sales => ("plantilla_ventas_historicas.csv", "codigo,mes,ventas\n"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadState {
    Idle,
    Reading { upload_id: u64 },
    Parsed(UploadAnalysis),
    Failed { message: String },
}

/// Handle returned by [`UploadWorkflow::begin`]; only the newest ticket per
/// slot may publish a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    pub kind: UploadKind,
    pub upload_id: u64,
}

#[derive(Debug)]
struct Slot {
    latest: u64,
    state: UploadState,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            latest: 0,
            state: UploadState::Idle,
        }
    }
}

#[derive(Debug, Default)]
struct Slots {
    products: Slot,
    sales: Slot,
}

impl Slots {
    fn get_mut(&mut self, kind: UploadKind) -> &mut Slot {
        match kind {
            UploadKind::Products => &mut self.products,
            UploadKind::Sales => &mut self.sales,
        }
    }
}

/// Ticket that marks its slot as failed if dropped before [`finish`] is
/// called, so an abandoned request cannot leave the slot in `Reading`.
///
/// [`finish`]: UploadGuard::finish
#[derive(Debug)]
pub struct UploadGuard<'a> {
    workflow: &'a UploadWorkflow,
    ticket: UploadTicket,
    finished: bool,
}

impl UploadGuard<'_> {
    pub fn ticket(&self) -> UploadTicket {
        self.ticket
    }

    /// Same contract as [`UploadWorkflow::complete`].
    pub fn finish(mut self, result: &Result<UploadAnalysis, AppError>) -> bool {
        self.finished = true;
        self.workflow.complete(self.ticket, result)
    }
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.workflow.cancel(self.ticket);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    pub products: UploadAnalysis,
    pub sales: UploadAnalysis,
}

#[derive(Debug, Default)]
pub struct UploadWorkflow {
    slots: Mutex<Slots>,
    next_id: AtomicU64,
}

impl UploadWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, kind: UploadKind) -> UploadTicket {
        let upload_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(kind);
        slot.latest = upload_id;
        slot.state = UploadState::Reading { upload_id };
        tracing::debug!("Upload {} started for {}", upload_id, kind.label());
        UploadTicket { kind, upload_id }
    }

    /// Like [`begin`](Self::begin), but the slot is failed automatically if
    /// the guard is dropped unfinished.
    pub fn start(&self, kind: UploadKind) -> UploadGuard<'_> {
        UploadGuard {
            workflow: self,
            ticket: self.begin(kind),
            finished: false,
        }
    }

    /// Publishes the outcome of an upload. Returns `false` when a newer
    /// upload for the same slot has started; the result is then dropped.
    pub fn complete(&self, ticket: UploadTicket, result: &Result<UploadAnalysis, AppError>) -> bool {
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(ticket.kind);
        if slot.latest != ticket.upload_id {
            tracing::info!(
                "Discarding stale upload {} for {} (latest is {})",
                ticket.upload_id,
                ticket.kind.label(),
                slot.latest
            );
            return false;
        }

        slot.state = match result {
            Ok(analysis) => UploadState::Parsed(analysis.clone()),
            Err(e) => UploadState::Failed {
                message: e.to_string(),
            },
        };
        true
    }

    /// Fails the slot if `ticket` is still the one being read there.
    pub fn cancel(&self, ticket: UploadTicket) {
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(ticket.kind);
        if slot.latest != ticket.upload_id {
            return;
        }
        tracing::warn!(
            "Upload {} for {} cancelled before completion",
            ticket.upload_id,
            ticket.kind.label()
        );
        slot.state = UploadState::Failed {
            message: UPLOAD_CANCELLED.to_string(),
        };
    }

    pub fn state(&self, kind: UploadKind) -> UploadState {
        self.slots.lock().get_mut(kind).state.clone()
    }

    pub fn reset(&self, kind: UploadKind) {
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(kind);
        // Bump the generation so an in-flight read cannot repopulate the slot.
        slot.latest = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        slot.state = UploadState::Idle;
    }

    pub fn process(&self) -> Result<ProcessSummary, AppError> {
        let slots = self.slots.lock();
        match (&slots.products.state, &slots.sales.state) {
            (UploadState::Parsed(products), UploadState::Parsed(sales)) => Ok(ProcessSummary {
                products: products.clone(),
                sales: sales.clone(),
            }),
            _ => Err(AppError::Conflict(
                "Load both the products and sales files before continuing".to_string(),
            )),
        }
    }
}
