use serde::{Deserialize, Serialize};

use crate::models::invoice::Invoice;

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Store {
    pub invoices: Vec<Invoice>,
}

impl Store {
    /// First invoice with the given id, in stored order
    pub fn get_invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    pub fn get_invoice_mut(&mut self, id: &str) -> Option<&mut Invoice> {
        self.invoices.iter_mut().find(|i| i.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get_invoice(id).is_some()
    }

    /// Append an invoice, suffixing its id with `-2`, `-3`, ... when it is
    /// already taken.
    pub fn add_invoice(&mut self, mut invoice: Invoice) -> &Invoice {
        if self.contains_id(&invoice.id) {
            let base = invoice.id.clone();
            let mut n = 2;
            while self.contains_id(&format!("{}-{}", base, n)) {
                n += 1;
            }
            invoice.id = format!("{}-{}", base, n);
            tracing::warn!(base_id = %base, id = %invoice.id, "invoice id already taken, suffixed");
        }

        let index = self.invoices.len();
        self.invoices.push(invoice);
        &self.invoices[index]
    }
}
