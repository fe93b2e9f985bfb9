use inquire::{CustomType, Text, error::InquireError, validator::Validation};

use crate::models::invoice::check_amount;

type InputResult<T> = Result<T, InquireError>;

/// Values for a new invoice; any field left as `None` is asked for
#[derive(Default)]
pub struct InvoiceDraft {
    pub client_name: Option<String>,
    pub contact: Option<String>,
    pub amount: Option<f64>,
    pub notes: Option<String>,
}

pub struct InvoiceInput {
    pub client_name: String,
    pub contact: String,
    pub amount: f64,
    pub notes: String,
}

pub fn complete_invoice(draft: InvoiceDraft) -> InputResult<InvoiceInput> {
    let client_name = match draft.client_name {
        Some(name) => name,
        None => Text::new("Client Name:").prompt()?,
    };
    let contact = match draft.contact {
        Some(contact) => contact,
        None => Text::new("Contact (email or phone):").prompt()?,
    };
    let amount = match draft.amount {
        Some(amount) => amount,
        None => CustomType::<f64>::new("Amount (CAD):")
            .with_error_message("Please type a valid number")
            .with_validator(|amount: &f64| {
                let validation = match check_amount(*amount) {
                    Ok(_) => Validation::Valid,
                    Err(e) => Validation::Invalid(e.to_string().into()),
                };
                Ok::<_, inquire::CustomUserError>(validation)
            })
            .prompt()?,
    };
    let notes = match draft.notes {
        Some(notes) => notes,
        None => Text::new("Notes (optional):").with_default("").prompt()?,
    };

    Ok(InvoiceInput {
        client_name,
        contact,
        amount,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_draft_needs_no_prompt() {
        let input = complete_invoice(InvoiceDraft {
            client_name: Some(String::from("Jane")),
            contact: Some(String::from("jane@x.com")),
            amount: Some(50.0),
            notes: Some(String::new()),
        })
        .unwrap();

        assert_eq!(input.client_name, "Jane");
        assert_eq!(input.contact, "jane@x.com");
        assert_eq!(input.amount, 50.0);
        assert_eq!(input.notes, "");
    }
}
