use colored::*;

use crate::models::invoice::{Invoice, InvoiceStatus};

const SEPARATOR_WIDTH: usize = 40;

/// Shortest round-trip rendering: `50.0`, `72.25`, and exponent form
/// (`1e+16`, `1.5e-05`) outside `1e-4 <= |amount| < 1e16`
pub fn format_amount(amount: f64) -> String {
    let scientific = format!("{:e}", amount);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{}", amount);
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{}", amount);
    };

    if (-4..16).contains(&exponent) {
        let fixed = format!("{}", amount);
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Label/value pairs shown for an invoice, in display order
pub fn invoice_fields(invoice: &Invoice) -> Vec<(&'static str, String)> {
    vec![
        ("ID", invoice.id.clone()),
        ("Client Name", invoice.client_name.clone()),
        ("Contact", invoice.contact.clone()),
        ("Amount", format!("{} CAD", format_amount(invoice.amount))),
        ("Notes", invoice.notes.clone()),
        ("Date", invoice.date.to_string()),
        ("Status", invoice.status.to_string()),
        ("Sent", yes_no(invoice.sent).to_string()),
    ]
}

/// Plain-text block for one invoice, separator line included
pub fn format_invoice(invoice: &Invoice) -> String {
    let mut block = String::new();
    for (label, value) in invoice_fields(invoice) {
        block.push_str(&format!("{}: {}\n", label, value));
    }
    block.push_str(&"-".repeat(SEPARATOR_WIDTH));
    block.push('\n');
    block
}

pub fn format_invoice_list(invoices: &[Invoice]) -> String {
    if invoices.is_empty() {
        return String::from("No invoices found.\n");
    }
    invoices.iter().map(format_invoice).collect()
}

fn styled_value(label: &str, value: String, invoice: &Invoice) -> ColoredString {
    match label {
        "Status" => match invoice.status {
            InvoiceStatus::Paid => value.green(),
            InvoiceStatus::Unpaid => value.yellow(),
        },
        "ID" => value.bold(),
        _ => value.normal(),
    }
}

/// Print every invoice in stored order, plain when output is not colorized
pub fn render_invoice_list(invoices: &[Invoice]) {
    if invoices.is_empty() || !colored::control::SHOULD_COLORIZE.should_colorize() {
        print!("{}", format_invoice_list(invoices));
        return;
    }

    for invoice in invoices {
        for (label, value) in invoice_fields(invoice) {
            let value = styled_value(label, value, invoice);
            println!("{}: {}", label, value);
        }
        println!("{}", "-".repeat(SEPARATOR_WIDTH).dimmed());
    }
}

pub fn render_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn render_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}
