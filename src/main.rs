use std::{fmt::Display, path::PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    input::{InvoiceDraft, complete_invoice},
    models::invoice::check_amount,
    notification::configured_notifier,
    services::invoices::{
        CreateInvoiceParameters, MarkPaidError, MarkPaidParameters, SendInvoiceParameters,
        create_invoice, list_invoices, mark_paid, send_invoice,
    },
    storage::json::JsonFileStorage,
};

mod config;
mod input;
mod models;
mod notification;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(name = "tinvoice", about = "Personal trainer invoice management")]
struct Cli {
    /// Invoice store to use instead of the configured one
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new invoice (prompts for anything not given)
    #[command(alias = "new")]
    Create {
        /// Client name
        #[arg(long)]
        client: Option<String>,

        /// Client email or phone
        #[arg(long)]
        contact: Option<String>,

        /// Amount in CAD
        #[arg(long, allow_hyphen_values = true, value_parser = parse_amount)]
        amount: Option<f64>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List all invoices
    List,

    /// Mark an invoice as paid
    #[command(alias = "mark")]
    MarkPaid { invoice_id: String },

    /// Mark an invoice as sent and email the client
    Send { invoice_id: String },
}

fn parse_amount(value: &str) -> Result<f64, String> {
    let amount: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    check_amount(amount).map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl Display) -> ! {
    ui::render_error(&message.to_string());
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load().unwrap_or_else(|e| fail(e));

    let storage_path = cli.file.unwrap_or_else(|| config.data_file());
    let storage = JsonFileStorage::new(storage_path);
    tracing::debug!(path = %storage.path().display(), "using invoice store");
    if let Err(e) = storage.ensure_initialized() {
        fail(e);
    }

    match cli.command {
        Commands::Create {
            client,
            contact,
            amount,
            notes,
        } => {
            let draft = InvoiceDraft {
                client_name: client,
                contact,
                amount,
                notes,
            };
            let input = complete_invoice(draft)
                .unwrap_or_else(|e| fail(format!("Failed to read invoice details: {}", e)));

            let params = CreateInvoiceParameters {
                client_name: input.client_name,
                contact: input.contact,
                amount: input.amount,
                notes: input.notes,
                created_at: jiff::Zoned::now(),
            };

            match create_invoice(&storage, params) {
                Ok(invoice) => {
                    ui::render_success("Invoice created successfully!");
                    println!("  Invoice ID: {}", invoice.id);
                }
                Err(e) => fail(e),
            }
        }
        Commands::List => match list_invoices(&storage) {
            Ok(invoices) => ui::render_invoice_list(&invoices),
            Err(e) => fail(e),
        },
        Commands::MarkPaid { invoice_id } => {
            match mark_paid(&storage, MarkPaidParameters { invoice_id }) {
                Ok(invoice) => {
                    ui::render_success(&format!("Invoice {} marked as paid", invoice.id))
                }
                Err(e @ MarkPaidError::InvoiceNotFound(_)) => ui::render_error(&e.to_string()),
                Err(e) => fail(e),
            }
        }
        Commands::Send { invoice_id } => {
            let notifier = configured_notifier(&config);

            let params = SendInvoiceParameters {
                invoice_id: invoice_id.clone(),
                notification: config.notification(),
            };

            let report = send_invoice(&storage, notifier.as_ref(), params).unwrap_or_else(|e| fail(e));

            match &report.invoice {
                Some(invoice) => {
                    ui::render_success(&format!("Invoice {} marked as sent", invoice.id))
                }
                None => ui::render_error(&format!("Invoice '{}' not found", invoice_id)),
            }

            match report.delivery {
                Ok(()) => ui::render_success(&format!(
                    "Notification sent to {}",
                    config.notify_to
                )),
                Err(e) => fail(format!("Failed to send notification: {}", e)),
            }
        }
    }
}
