use jiff::Zoned;
use thiserror::Error;

use crate::{
    models::invoice::{InvalidAmount, Invoice, InvoiceStatus, check_amount},
    notification::{DeliveryError, Notification, Notifier},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum CreateInvoiceError {
    #[error(transparent)]
    InvalidAmount(#[from] InvalidAmount),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreateInvoiceParameters {
    pub client_name: String,
    pub contact: String,
    pub amount: f64,
    pub notes: String,
    pub created_at: Zoned,
}

pub fn create_invoice(
    storage: &impl Storage,
    parameters: CreateInvoiceParameters,
) -> Result<Invoice, CreateInvoiceError> {
    let amount = check_amount(parameters.amount)?;
    let mut store = storage.load()?;

    let invoice = Invoice::new(
        parameters.client_name,
        parameters.contact,
        amount,
        parameters.notes,
        &parameters.created_at,
    );
    let created = store.add_invoice(invoice).clone();

    storage.save(&store)?;
    tracing::info!(id = %created.id, "invoice created");

    Ok(created)
}

pub fn list_invoices(storage: &impl Storage) -> Result<Vec<Invoice>, StorageError> {
    Ok(storage.load()?.invoices)
}

#[derive(Debug, Error)]
pub enum MarkPaidError {
    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct MarkPaidParameters {
    pub invoice_id: String,
}

/// Marks the first invoice with the given id as paid. Marking an already
/// paid invoice succeeds without changes to its state.
pub fn mark_paid(
    storage: &impl Storage,
    parameters: MarkPaidParameters,
) -> Result<Invoice, MarkPaidError> {
    let mut store = storage.load()?;

    let invoice = store
        .get_invoice_mut(&parameters.invoice_id)
        .ok_or_else(|| MarkPaidError::InvoiceNotFound(parameters.invoice_id.clone()))?;
    if invoice.is_paid() {
        tracing::debug!(id = %invoice.id, "invoice already paid");
    }
    invoice.status = InvoiceStatus::Paid;
    let updated = invoice.clone();

    storage.save(&store)?;
    tracing::info!(id = %updated.id, "invoice marked paid");

    Ok(updated)
}

#[derive(Debug, Error)]
pub enum SendInvoiceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct SendInvoiceParameters {
    pub invoice_id: String,
    pub notification: Notification,
}

/// Outcome of a send: the record update and the email delivery are
/// independent of each other
#[derive(Debug)]
pub struct SendInvoiceReport {
    /// The invoice flagged as sent, `None` when no invoice matched
    pub invoice: Option<Invoice>,
    pub delivery: Result<(), DeliveryError>,
}

/// Flags the first invoice with the given id as sent, then delivers the
/// fixed notification whether or not the invoice was found.
pub fn send_invoice(
    storage: &impl Storage,
    notifier: &dyn Notifier,
    parameters: SendInvoiceParameters,
) -> Result<SendInvoiceReport, SendInvoiceError> {
    let mut store = storage.load()?;

    let invoice = match store.get_invoice_mut(&parameters.invoice_id) {
        Some(invoice) => {
            invoice.sent = true;
            Some(invoice.clone())
        }
        None => {
            tracing::warn!(id = %parameters.invoice_id, "invoice to send not found");
            None
        }
    };

    if invoice.is_some() {
        storage.save(&store)?;
        tracing::info!(id = %parameters.invoice_id, "invoice marked sent");
    }

    let delivery = notifier.send(&parameters.notification);
    if let Err(e) = &delivery {
        tracing::error!(error = %e, "notification delivery failed");
    }

    Ok(SendInvoiceReport { invoice, delivery })
}
