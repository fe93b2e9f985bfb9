use jiff::Zoned;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Format of the identifier derived from the creation time
pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Invoice {
    /// Creation timestamp with second resolution, used as lookup key
    pub id: String,
    /// Name of the billed client
    pub client_name: String,
    /// Email or phone of the client
    pub contact: String,
    /// Billed amount, shown in CAD
    pub amount: f64,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Day the invoice was created
    pub date: Date,
    /// Payment status
    pub status: InvoiceStatus,
    /// Whether the invoice was emailed
    pub sent: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON has no representation for NaN or infinities, so only finite
/// amounts can be stored.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Invalid amount '{0}': must be a finite number")]
pub struct InvalidAmount(pub f64);

pub fn check_amount(amount: f64) -> Result<f64, InvalidAmount> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(InvalidAmount(amount))
    }
}

impl Invoice {
    /// Build an unpaid, unsent invoice stamped with `created_at`
    pub fn new(
        client_name: String,
        contact: String,
        amount: f64,
        notes: String,
        created_at: &Zoned,
    ) -> Self {
        Self {
            id: created_at.strftime(ID_FORMAT).to_string(),
            client_name,
            contact,
            amount,
            notes,
            date: created_at.date(),
            status: InvoiceStatus::Unpaid,
            sent: false,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}
