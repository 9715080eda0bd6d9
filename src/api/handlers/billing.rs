use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::api::dtos::requests::PaymentCompleteRequest;
use crate::api::extractors::tenant::Tenant;
use crate::error::AppError;

pub async fn get_billing(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    ctx.billing.refresh().await?;
    Ok(Json(json!({ "success": true, "billing": ctx.billing.snapshot() })))
}

pub async fn payment_complete(
    Tenant(ctx): Tenant,
    Json(payload): Json<PaymentCompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = ctx.billing.apply_payment(&payload.tier, payload.billing_cycle).await?;
    Ok(Json(json!({ "success": true, "billing": snapshot })))
}
