//! Payment webhook
//!
//! The signature is checked against the raw body before anything is parsed.
//! Only `payment.completed` events touch a session; other event types are
//! acknowledged with 202 so the provider stops retrying them.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use ikigai_common::db::{assign_tier, AssignmentOutcome, PaymentRecord};
use ikigai_common::offers::{tier_for_offer, OfferSource};
use ikigai_common::signature::{verify_signature, SIGNATURE_HEADER};
use ikigai_common::time::{now, now_secs};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::AppState;

/// Event type that grants a tier
pub const PAYMENT_COMPLETED: &str = "payment.completed";

/// Webhook payload as sent by the payment provider
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// `upgraded`, `unchanged`, `duplicate` or `ignored`
    pub status: &'static str,
    pub event_id: String,
    pub session_id: Option<String>,
    pub premium_tier: Option<String>,
}

/// POST /api/webhooks/payment
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<WebhookResponse>)> {
    let secret = state
        .webhook_secret
        .as_deref()
        .ok_or(ApiError::WebhookDisabled)?;

    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    verify_signature(
        header,
        &body,
        secret.as_bytes(),
        now_secs(),
        state.settings.webhook_tolerance_secs,
    )?;

    let event: PaymentEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::MalformedPayload(e.to_string()))?;

    if event.event_id.trim().is_empty() {
        return Err(ApiError::MalformedPayload("eventId is empty".to_string()));
    }

    if event.event_type != PAYMENT_COMPLETED {
        info!("Ignoring webhook event {} of type '{}'", event.event_id, event.event_type);
        return Ok((
            StatusCode::ACCEPTED,
            Json(WebhookResponse {
                status: "ignored",
                event_id: event.event_id,
                session_id: event.session_id,
                premium_tier: None,
            }),
        ));
    }

    let record = payment_record(event)?;
    let session_id = record.session_id;

    let outcome = assign_tier(&state.db, &record).await.map_err(|e| match e {
        ikigai_common::Error::NotFound(_) => ApiError::SessionNotFound(session_id),
        other => ApiError::Database(other),
    })?;

    match &outcome {
        AssignmentOutcome::Upgraded { previous, tier } => {
            info!(
                "Session {} upgraded from {} to {} by event {}",
                session_id,
                previous.as_deref().unwrap_or("none"),
                tier,
                record.event_id
            );
            state.cache.invalidate(session_id).await;
        }
        AssignmentOutcome::Unchanged { current } => {
            info!(
                "Session {} kept tier {} for event {} (offer {})",
                session_id,
                current.as_deref().unwrap_or("none"),
                record.event_id,
                record.offer_id
            );
        }
        AssignmentOutcome::Duplicate { .. } => {}
    }

    Ok((
        StatusCode::OK,
        Json(WebhookResponse {
            status: outcome.status(),
            event_id: record.event_id,
            session_id: Some(session_id.to_string()),
            premium_tier: outcome.current_tier().map(str::to_string),
        }),
    ))
}

/// Validate a completed-payment event and map its offer to a tier
fn payment_record(event: PaymentEvent) -> ApiResult<PaymentRecord> {
    let raw_session = event
        .session_id
        .ok_or_else(|| ApiError::MalformedPayload("sessionId is required".to_string()))?;
    let session_id = Uuid::parse_str(raw_session.trim())
        .map_err(|_| ApiError::InvalidSessionId(raw_session.clone()))?;

    let offer_id = event
        .offer_id
        .ok_or_else(|| ApiError::MalformedPayload("offerId is required".to_string()))?;
    let grant = tier_for_offer(&offer_id).map_err(|e| ApiError::MalformedPayload(e.to_string()))?;

    match grant.source {
        OfferSource::Catalog => {}
        OfferSource::Legacy => {
            info!("Legacy offer '{}' mapped to {}", offer_id, grant.tier)
        }
        OfferSource::Unrecognized => warn!(
            "Unrecognized offer '{}' on event {}, granting {}",
            offer_id, event.event_id, grant.tier
        ),
    }

    Ok(PaymentRecord {
        event_id: event.event_id,
        session_id,
        offer_id,
        tier: grant.tier,
        amount_cents: event.amount_cents,
        currency: event.currency,
        received_at: now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ikigai_common::PremiumTier;

    fn event(offer: Option<&str>, session: Option<&str>) -> PaymentEvent {
        PaymentEvent {
            event_id: "evt_1".to_string(),
            event_type: PAYMENT_COMPLETED.to_string(),
            session_id: session.map(str::to_string),
            offer_id: offer.map(str::to_string),
            amount_cents: Some(1900),
            currency: Some("usd".to_string()),
        }
    }

    #[test]
    fn test_legacy_offer_grants_blueprint() {
        let id = Uuid::new_v4().to_string();
        let record = payment_record(event(Some("premium-report"), Some(&id))).unwrap();
        assert_eq!(record.tier, PremiumTier::Blueprint);
        assert_eq!(record.offer_id, "premium-report");
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let id = Uuid::new_v4().to_string();
        assert!(matches!(
            payment_record(event(None, Some(&id))),
            Err(ApiError::MalformedPayload(_))
        ));
        assert!(matches!(
            payment_record(event(Some("roadmap"), None)),
            Err(ApiError::MalformedPayload(_))
        ));
        assert!(matches!(
            payment_record(event(Some("  "), Some(&id))),
            Err(ApiError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_bad_session_id() {
        assert!(matches!(
            payment_record(event(Some("roadmap"), Some("not-a-uuid"))),
            Err(ApiError::InvalidSessionId(_))
        ));
    }

    #[test]
    fn test_payload_field_names() {
        let event: PaymentEvent = serde_json::from_str(
            r#"{"eventId":"evt_9","type":"payment.completed","sessionId":"s","offerId":"roadmap","amountCents":900}"#,
        )
        .unwrap();
        assert_eq!(event.event_id, "evt_9");
        assert_eq!(event.amount_cents, Some(900));
        assert!(event.currency.is_none());
    }
}
