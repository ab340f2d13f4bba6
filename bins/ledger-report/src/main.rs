//! Ledger report
//!
//! Reads ledger documents from a JSON file, runs the save hooks on each of
//! them (total aggregation, rounding) and prints the resulting totals as
//! seen by one party.
//!
//! Usage: ledger-report documents.json --viewer 1 --debits-negative

mod document;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use invoicing_core::behavior::ModelType;
use invoicing_core::memory::InMemoryLedgerItem;
use invoicing_core::{
    BehaviorRegistry, CurrencyValue, FormatOptions, LedgerItem, LineItem, SignDisplay, Subtype,
    Value, options,
};
use invoicing_shared::AppConfig;
use invoicing_shared::types::NegativeStyle;

use document::DocumentTypes;

static REPORT_DOCUMENT: ModelType = ModelType::root("ReportDocument");
static REPORT_INVOICE: ModelType = ModelType::derived("ReportInvoice", &REPORT_DOCUMENT);
static REPORT_CREDIT_NOTE: ModelType = ModelType::derived("ReportCreditNote", &REPORT_DOCUMENT);
static REPORT_PAYMENT: ModelType = ModelType::derived("ReportPayment", &REPORT_DOCUMENT);
static REPORT_LINE: ModelType = ModelType::root("ReportLine");

#[derive(Parser)]
#[command(name = "ledger-report")]
#[command(about = "Recompute ledger document totals and print them per viewer", long_about = None)]
struct Cli {
    /// JSON file holding a `documents` array
    input: PathBuf,

    /// Party id to view the documents as; omit to view as the party whose
    /// details carry `is_self`
    #[arg(long)]
    viewer: Option<i64>,

    /// Rendering of negative amounts: minus, hyphen or brackets
    #[arg(long)]
    negative: Option<NegativeStyle>,

    /// Show debits as negative amounts
    #[arg(long)]
    debits_negative: bool,

    /// Show credits as negative amounts
    #[arg(long)]
    credits_negative: bool,

    /// Print one JSON object per document instead of text
    #[arg(long)]
    json: bool,
}

/// One printed report row.
#[derive(Debug, Serialize)]
struct ReportRow {
    index: usize,
    kind: String,
    lines: usize,
    total: String,
    tax: String,
    net: String,
    direction: Option<&'static str>,
}

fn document_types() -> DocumentTypes {
    DocumentTypes {
        document: REPORT_DOCUMENT,
        invoice: REPORT_INVOICE,
        credit_note: REPORT_CREDIT_NOTE,
        payment: REPORT_PAYMENT,
        line: REPORT_LINE,
    }
}

/// Declares the report's record types.
fn declare(registry: &BehaviorRegistry, default_currency: &str) {
    LedgerItem::acts_as(
        registry,
        REPORT_DOCUMENT,
        vec![options([("currency_code", default_currency)]).into()],
    );
    LedgerItem::acts_as_invoice(registry, REPORT_INVOICE, Vec::new());
    LedgerItem::acts_as_credit_note(registry, REPORT_CREDIT_NOTE, Vec::new());
    LedgerItem::acts_as_payment(registry, REPORT_PAYMENT, Vec::new());
    LineItem::acts_as(registry, REPORT_LINE, Vec::new());
}

fn format_or_blank(
    index: usize,
    formatted: Result<String, invoicing_core::BehaviorError>,
) -> String {
    formatted.unwrap_or_else(|err| {
        warn!(document = index, code = err.error_code(), error = %err, "amount not formatted");
        String::new()
    })
}

fn report_row(
    registry: &BehaviorRegistry,
    index: usize,
    kind: &Subtype,
    record: &InMemoryLedgerItem,
    viewer: Option<&Value>,
    options: &FormatOptions,
) -> ReportRow {
    let plain = FormatOptions {
        negative: options.negative,
        ..FormatOptions::default()
    };

    let net = LedgerItem::net_amount(registry, record)
        .map(|net| {
            let formatted = CurrencyValue::format_value(registry, record, net, &plain);
            format_or_blank(index, formatted)
        })
        .unwrap_or_default();

    let direction = match LedgerItem::is_debit(registry, record, viewer) {
        Ok(true) => Some("debit"),
        Ok(false) => Some("credit"),
        Err(err) => {
            warn!(document = index, code = err.error_code(), error = %err, "no perspective");
            None
        }
    };

    ReportRow {
        index,
        kind: kind.to_string(),
        lines: record.line_items().len(),
        total: format_or_blank(
            index,
            LedgerItem::formatted(registry, record, "total_amount_formatted", options),
        ),
        tax: format_or_blank(
            index,
            LedgerItem::formatted(registry, record, "tax_amount_formatted", options),
        ),
        net,
        direction,
    }
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.as_str().into());
    let subscriber = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let table = Arc::new(config.currency_table()?);
    info!(currencies = table.len(), default = %config.currency.default_code, "currencies loaded");

    let registry = BehaviorRegistry::global();
    declare(registry, &config.currency.default_code);

    let file = document::read_documents(&cli.input).context("Failed to load documents")?;
    info!(documents = file.documents.len(), "documents loaded");

    let viewer = cli.viewer.map(Value::Integer);
    let mut options = FormatOptions::new()
        .negative(cli.negative.unwrap_or(config.currency.negative));
    if cli.debits_negative {
        options = options.debit(SignDisplay::Negative);
    }
    if cli.credits_negative {
        options = options.credit(SignDisplay::Negative);
    }
    if let Some(viewer) = &viewer {
        options = options.self_id(viewer.clone());
    }

    let types = document_types();
    for (index, document) in file.documents.iter().enumerate() {
        let mut record = document.to_record(&types, &table);
        registry
            .prepare_for_save(&mut record)
            .with_context(|| format!("Document {index} failed its save hooks"))?;

        let row = report_row(registry, index, &document.kind, &record, viewer.as_ref(), &options);
        if cli.json {
            println!("{}", serde_json::to_string(&row)?);
        } else {
            println!(
                "#{:<3} {:<12} lines={:<3} total={:>16} tax={:>14} net={:>16} {}",
                row.index,
                row.kind,
                row.lines,
                row.total,
                row.tax,
                row.net,
                row.direction.unwrap_or("-"),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use document::DocumentFile;
    use invoicing_shared::types::CurrencyTable;

    fn sample() -> DocumentFile {
        serde_json::from_str(
            r#"{"documents": [
                {"kind": "invoice", "currency": "USD", "sender_id": 1, "recipient_id": 2,
                 "line_items": [{"net_amount": "100.005", "tax_amount": "20"}]},
                {"kind": "payment", "sender_id": 2, "recipient_id": 1,
                 "total_amount": "120.01", "tax_amount": "0"},
                {"kind": "order", "sender_id": 1, "recipient_id": 2}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_report_rows_from_supplier_view() {
        let registry = BehaviorRegistry::new();
        declare(&registry, "EUR");
        let table = Arc::new(CurrencyTable::builtin());
        let viewer = Value::Integer(1);
        let options = FormatOptions::new()
            .negative(NegativeStyle::Hyphen)
            .debit(SignDisplay::Negative)
            .self_id(1_i64);

        let rows: Vec<ReportRow> = sample()
            .documents
            .iter()
            .enumerate()
            .map(|(index, document)| {
                let mut record = document.to_record(&document_types(), &table);
                registry.prepare_for_save(&mut record).unwrap();
                report_row(&registry, index, &document.kind, &record, Some(&viewer), &options)
            })
            .collect();

        assert_eq!(rows[0].kind, "invoice");
        assert_eq!(rows[0].total, "-$120.01");
        assert_eq!(rows[0].tax, "-$20.00");
        assert_eq!(rows[0].net, "$100.01");
        assert_eq!(rows[0].direction, Some("debit"));

        // a payment received by the viewer is a debit for it
        assert_eq!(rows[1].total, "-120.01 €");
        assert_eq!(rows[1].direction, Some("debit"));

        // custom kind has no debit policy
        assert_eq!(rows[2].kind, "order");
        assert_eq!(rows[2].direction, None);
        assert_eq!(rows[2].total, "");
    }
}
