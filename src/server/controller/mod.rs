pub(crate) mod error;
pub(crate) mod handoff;
pub(crate) mod invoice;

use actix_web::http::header;
use actix_web::rt::time;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use crate::server::controller::error::CustomError;
use crate::server::document::pdf;
use crate::server::engine::totals::InvoiceSummary;
use crate::server::model::invoice::Invoice;
use crate::server::state::AppState;

const PDF_DISPOSITION: &str = "inline; filename=invoice.pdf";

fn validate(invoice: &Invoice, data: &AppState) -> Result<(), CustomError> {
    data.rules().validate(invoice).map_err(|errors| {
        info!("rejected invoice with {} problem(s)", errors.len());
        CustomError::InvalidInvoice { errors }
    })
}

/// Compute totals, paint the pdf off the async workers and answer with it.
async fn render_pdf(invoice: Invoice, data: &AppState) -> Result<HttpResponse, CustomError> {
    let summary = InvoiceSummary::compute(&invoice.items);
    let currency = data.currency().clone();
    let number = invoice.details.invoice_number.clone();
    let rendering = web::block(move || pdf::render(&invoice, &summary, &currency));
    let sleep = time::sleep(data.render_timeout());
    tokio::pin!(sleep);
    tokio::select! {
        result = rendering => {
            match result {
                Ok(Ok(bytes)) => {
                    info!("rendered invoice={} ({} bytes)", number, bytes.len());
                    Ok(HttpResponse::Ok()
                        .content_type("application/pdf")
                        .insert_header((header::CONTENT_DISPOSITION, PDF_DISPOSITION))
                        .body(bytes))
                }
                Ok(Err(e)) => {
                    error!("pdf generation failed for invoice={}, {:#}", number, e);
                    Err(CustomError::RenderFailed)
                }
                Err(e) => {
                    error!("pdf generation task failed, {}", e);
                    Err(CustomError::RenderFailed)
                }
            }
        },
        _ = &mut sleep => {
            warn!("timeout rendering invoice={}", number);
            Err(CustomError::Timeout)
        }
    }
}
