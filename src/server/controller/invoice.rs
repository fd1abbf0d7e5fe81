use actix_web::{get, post, web, HttpResponse, Responder};
use log::info;
use crate::server::controller::error::CustomError;
use crate::server::controller::{render_pdf, validate};
use crate::server::engine::totals::InvoiceSummary;
use crate::server::model::invoice::Invoice;
use crate::server::model::preview::{InvoicePreview, ValidateInvoiceResponse};
use crate::server::state::AppState;

#[get("/v1/invoice/draft")]
/// a fresh invoice with one blank line
pub(crate) async fn get_draft() -> impl Responder {
    web::Json(Invoice::draft())
}

#[post("/v1/invoice/validate")]
/// check an invoice without rendering it
pub(crate) async fn post_validate(body: web::Json<Invoice>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    validate(&body, &data)?;
    Ok(web::Json(ValidateInvoiceResponse { valid: true }))
}

#[post("/v1/invoice/totals")]
/// per line and invoice totals for the preview, no validation
pub(crate) async fn post_totals(body: web::Json<Invoice>, data: web::Data<AppState>) -> impl Responder {
    let summary = InvoiceSummary::compute(&body.items);
    web::Json(InvoicePreview::new(summary, data.currency()))
}

#[post("/api/generate-pdf")]
/// validate and answer with the rendered pdf
pub(crate) async fn generate_pdf(body: web::Json<Invoice>, data: web::Data<AppState>) -> Result<HttpResponse, CustomError> {
    let invoice = body.into_inner();
    validate(&invoice, &data)?;
    info!("generating pdf for invoice={}", invoice.details.invoice_number);
    render_pdf(invoice, &data).await
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::{self, ContentType};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::time::Duration;
    use crate::server::tests::{sample_invoice, test_config, test_state, test_state_with};
    use crate::server::configure;

    #[actix_web::test]
    async fn draft_has_one_item() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/v1/invoice/draft").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["items"][0]["id"], "1");
        assert_eq!(body["items"][0]["quantity"], 1.0);
    }

    #[actix_web::test]
    async fn validate_accepts_and_rejects() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;

        let req = test::TestRequest::post().uri("/v1/invoice/validate").set_json(sample_invoice()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "valid": true }));

        let mut invoice = sample_invoice();
        invoice.recipient.name.clear();
        invoice.items[0].quantity = 0.0;
        let req = test::TestRequest::post().uri("/v1/invoice/validate").set_json(invoice).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"]["recipient.name"], "Recipient name is required");
        assert_eq!(body["fields"]["items[0].quantity"], "Quantity must be greater than zero");
    }

    #[actix_web::test]
    async fn totals_are_computed_and_formatted() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let payload = json!({
            "items": [
                { "id": "1", "description": "A", "quantity": 2, "price": 50, "taxRate": 10, "taxIncluded": false },
                { "id": "2", "description": "B", "quantity": 1, "price": 20, "taxRate": 0, "taxIncluded": false }
            ]
        });
        let req = test::TestRequest::post().uri("/v1/invoice/totals").set_json(payload).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["formatted"]["subtotal"], "120,00 EUR");
        assert_eq!(body["formatted"]["taxTotal"], "10,00 EUR");
        assert_eq!(body["formatted"]["grandTotal"], "130,00 EUR");
        assert_eq!(body["formatted"]["lineTotals"], json!(["110,00 EUR", "20,00 EUR"]));
        assert_eq!(body["lines"][0]["id"], "1");
        assert_eq!(body["vatBreakdown"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn totals_of_empty_invoice_are_zero() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::post().uri("/v1/invoice/totals").set_json(json!({})).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["grandTotal"], 0.0);
        assert_eq!(body["formatted"]["grandTotal"], "0,00 EUR");
    }

    #[actix_web::test]
    async fn generate_pdf_returns_document() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::post().uri("/api/generate-pdf").set_json(sample_invoice()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
        assert_eq!(
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "inline; filename=invoice.pdf"
        );
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF"));
    }

    #[actix_web::test]
    async fn slow_render_times_out() {
        let state = test_state_with(test_config().with_render_timeout(Duration::ZERO));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let req = test::TestRequest::post().uri("/api/generate-pdf").set_json(sample_invoice()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "timeout occurred" }));
    }

    #[actix_web::test]
    async fn generate_pdf_rejects_missing_fields() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let mut invoice = sample_invoice();
        invoice.details.invoice_number.clear();
        let req = test::TestRequest::post().uri("/api/generate-pdf").set_json(invoice).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid invoice data");
        assert_eq!(body["fields"]["details.invoiceNumber"], "Invoice number is required");
    }

    #[actix_web::test]
    async fn malformed_json_is_bad_request() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/generate-pdf")
            .insert_header(ContentType::json())
            .set_payload("{\"sender\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid invoice data" }));
    }
}
