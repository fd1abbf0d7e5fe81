use serde::Serialize;
use crate::server::engine::currency::CurrencyFormat;
use crate::server::engine::totals::InvoiceSummary;
use crate::server::handoff::HandoffToken;
use crate::server::validation::ValidationErrors;

/// Totals as shown in the preview, figures plus their printed form
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoicePreview {
    #[serde(flatten)]
    pub summary: InvoiceSummary,
    pub formatted: FormattedTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FormattedTotals {
    pub line_totals: Vec<String>,
    pub subtotal: String,
    pub tax_total: String,
    pub grand_total: String,
}

impl InvoicePreview {
    pub fn new(summary: InvoiceSummary, currency: &CurrencyFormat) -> Self {
        let formatted = FormattedTotals {
            line_totals: summary.lines.iter().map(|line| currency.format(line.gross)).collect(),
            subtotal: currency.format(summary.subtotal),
            tax_total: currency.format(summary.tax_total),
            grand_total: currency.format(summary.grand_total),
        };
        Self { summary, formatted }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidateInvoiceResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostHandoffResponse {
    pub token: HandoffToken,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}
