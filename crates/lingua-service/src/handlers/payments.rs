//! Payment handlers: intents, completion and history.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use lingua_core::money::{to_major_units, to_minor_units};
use lingua_core::{
    normalize_email, Payment, PaymentCompletion, Program, ProgramId, SelectionId, WithProgram,
};
use lingua_store::Store;

use crate::auth::{AuthClaims, Claims};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Payment intent request.
#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in the currency's major unit.
    #[serde(alias = "price")]
    pub amount: f64,
}

/// Payment intent response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    /// Secret the browser uses to confirm the card payment.
    pub client_secret: String,
}

/// Payment completion request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentRequest {
    /// Student email.
    pub email: String,
    /// Program paid for.
    pub program_id: ProgramId,
    /// Selection settled by this payment.
    pub selected_program_id: SelectionId,
    /// Amount paid in the currency's major unit.
    #[serde(alias = "price")]
    pub amount: f64,
    /// Gateway transaction reference.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Payment response, joined with its program.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: String,
    /// Student email.
    pub email: String,
    /// Program paid for.
    pub program_id: String,
    /// Amount in the currency's major unit.
    pub amount: f64,
    /// Amount in minor units.
    pub amount_cents: i64,
    /// Gateway transaction reference.
    pub transaction_id: Option<String>,
    /// Payment timestamp.
    pub date: String,
    /// The program; `null` if it no longer exists.
    pub program: Option<Program>,
}

impl From<WithProgram<Payment>> for PaymentResponse {
    fn from(joined: WithProgram<Payment>) -> Self {
        let WithProgram { record, program } = joined;
        Self {
            id: record.id.to_string(),
            email: record.email,
            program_id: record.program_id.to_string(),
            amount: to_major_units(record.amount_cents),
            amount_cents: record.amount_cents,
            transaction_id: record.transaction_id,
            date: record.date.to_rfc3339(),
            program,
        }
    }
}

/// Reject a token whose `email` claim names another student.
fn ensure_token_owns(claims: &Claims, email: &str) -> Result<(), ApiError> {
    match claims.email().map(normalize_email) {
        Some(Ok(token_email)) if token_email != email => {
            tracing::debug!(
                token_email = %token_email,
                email = %email,
                "Token email does not match request"
            );
            Err(ApiError::Forbidden)
        }
        _ => Ok(()),
    }
}

/// Create a card payment intent for `amount`.
pub async fn create_payment_intent(
    State(state): State<Arc<AppState>>,
    AuthClaims(_claims): AuthClaims,
    ApiJson(body): ApiJson<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    let amount_cents = to_minor_units(body.amount)?;

    let gateway = state
        .payments
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("payment gateway not configured".into()))?;

    let client_secret = gateway
        .create_payment_intent(amount_cents, &state.config.payment_currency)
        .await?;

    Ok(Json(PaymentIntentResponse { client_secret }))
}

/// Record a completed payment.
///
/// Increments the program's enrollment, removes the selection and stores the
/// payment in one atomic write. A second submission for the same selection
/// fails with 409 and changes nothing.
pub async fn complete_payment(
    State(state): State<Arc<AppState>>,
    AuthClaims(claims): AuthClaims,
    ApiJson(body): ApiJson<CompletePaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let email = normalize_email(&body.email)?;
    ensure_token_owns(&claims, &email)?;
    let amount_cents = to_minor_units(body.amount)?;

    let completion = PaymentCompletion::new(
        body.selected_program_id,
        email,
        body.program_id,
        amount_cents,
        body.transaction_id,
    );

    let program = state.store.complete_payment(&completion)?;

    tracing::info!(
        payment_id = %completion.payment.id,
        selection_id = %completion.selection_id,
        program_id = %program.id,
        email = %completion.payment.email,
        amount_cents = %amount_cents,
        enrolled = %program.enrolled,
        "Payment completed"
    );

    Ok(Json(WithProgram::new(completion.payment, Some(program)).into()))
}

/// Programs a student has paid for.
pub async fn enrolled_programs(
    State(state): State<Arc<AppState>>,
    ApiPath(email): ApiPath<String>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    payments_for(&state, &email)
}

/// A student's payments, newest first.
pub async fn payment_history(
    State(state): State<Arc<AppState>>,
    ApiPath(email): ApiPath<String>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    payments_for(&state, &email)
}

fn payments_for(state: &AppState, email: &str) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let email = normalize_email(email)?;
    let payments = state.store.list_payments_with_programs(&email)?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}
