use actix_web::{get, post, web, HttpResponse, Responder};
use log::{info, warn};
use crate::server::controller::error::CustomError;
use crate::server::controller::{render_pdf, validate};
use crate::server::model::invoice::Invoice;
use crate::server::model::preview::PostHandoffResponse;
use crate::server::state::AppState;

#[post("/v1/handoff")]
/// park a validated invoice for the render view
pub(crate) async fn post_handoff(body: web::Json<Invoice>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    let invoice = body.into_inner();
    validate(&invoice, &data)?;
    let token = data.handoff().put(&invoice).await.map_err(|e| {
        warn!("post_handoff failed, {:#}", e);
        CustomError::BadRequest
    })?;
    Ok(web::Json(PostHandoffResponse { token }))
}

#[get("/v1/handoff/{token}/pdf")]
/// take the parked invoice, once, and render it
pub(crate) async fn get_handoff_pdf(token: web::Path<String>, data: web::Data<AppState>) -> Result<HttpResponse, CustomError> {
    match data.handoff().take(&token).await {
        Some(invoice) => render_pdf(invoice, &data).await,
        None => {
            info!("no hand-off data for the requested token");
            Err(CustomError::NoInvoiceData)
        }
    }
}
