use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::AppState;
use super::response::ApiResponse;
use crate::error::ErrorCode;
use crate::orchestrator::SigningRequest;
use crate::signing::DocumentPayload;

/// JSON body of a signing request.
///
/// Only `nit`, `passwordPri` and `dteJson` drive signing; the other fields
/// are accepted for compatibility with existing clients.
#[derive(Default, Deserialize)]
pub struct SignDocumentInput {
    #[serde(rename = "nit", default)]
    pub taxpayer_id: String,
    #[serde(rename = "passwordPri", default)]
    pub private_key_password: String,
    #[serde(rename = "passwordPub", default)]
    pub public_key_password: Option<String>,
    #[serde(rename = "nombreDocumento", default)]
    pub document_name: Option<String>,
    #[serde(rename = "nombreFirma", default)]
    pub signature_name: Option<String>,
    #[serde(rename = "compactSerialization", default)]
    pub compact_serialization: Option<String>,
    #[serde(rename = "dteJson", default)]
    pub document: Value,
    #[serde(rename = "dte", default)]
    pub document_text: Option<String>,
    #[serde(rename = "activo", default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub path: Option<String>,
}

impl From<SignDocumentInput> for SigningRequest {
    fn from(input: SignDocumentInput) -> Self {
        SigningRequest {
            taxpayer_id: input.taxpayer_id,
            credential: input.private_key_password,
            payload: DocumentPayload::from_json(input.document),
            document_name: input.document_name,
            signature_name: input.signature_name,
        }
    }
}

pub async fn sign_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SignDocumentInput>, JsonRejection>,
) -> ApiResponse {
    let locale = state
        .translator
        .negotiate(
            headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok()),
        )
        .to_string();

    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "undecodable signing request");
            return ApiResponse::rejected(
                &state.translator,
                &locale,
                ErrorCode::StrToJsonConversion,
                &[],
            );
        }
    };
    let request = SigningRequest::from(input);

    // Leaving this handler for any reason (client gone, timeout) cancels
    // the pipeline.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let signer = state.signer.clone();
    let task = tokio::task::spawn_blocking(move || signer.sign(request, &cancel));

    let outcome = match tokio::time::timeout(state.request_timeout, task).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(
                timeout_ms = state.request_timeout.as_millis() as u64,
                "signing request timed out"
            );
            return ApiResponse::internal(&state.translator, &locale);
        }
    };

    match outcome {
        Ok(Ok(token)) => ApiResponse::success(Value::String(token.into_string())),
        Ok(Err(error)) => ApiResponse::from_error(&state.translator, &locale, &error),
        Err(join_error) => {
            tracing::error!(error = %join_error, "signing task did not complete");
            ApiResponse::internal(&state.translator, &locale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> SignDocumentInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_wire_fields_onto_request() {
        let input = decode(json!({
            "nit": "06142010",
            "passwordPri": "secret",
            "passwordPub": "ignored",
            "nombreDocumento": "factura",
            "nombreFirma": "firma",
            "dteJson": {"a": 1},
            "activo": true
        }));
        let request = SigningRequest::from(input);
        assert_eq!(request.taxpayer_id, "06142010");
        assert_eq!(request.credential, "secret");
        assert_eq!(request.document_name.as_deref(), Some("factura"));
        assert_eq!(
            request.payload,
            Some(DocumentPayload::Structured(json!({"a": 1})))
        );
        assert!(request.is_well_formed());
    }

    #[test]
    fn absent_or_null_document_is_not_well_formed() {
        for body in [
            json!({"nit": "1", "passwordPri": "p"}),
            json!({"nit": "1", "passwordPri": "p", "dteJson": null}),
        ] {
            let request = SigningRequest::from(decode(body));
            assert!(request.payload.is_none());
            assert!(!request.is_well_formed());
        }
    }

    #[test]
    fn string_document_is_text() {
        let request = SigningRequest::from(decode(json!({
            "nit": "1", "passwordPri": "p", "dteJson": "{\"raw\":true}"
        })));
        assert_eq!(
            request.payload,
            Some(DocumentPayload::Text("{\"raw\":true}".into()))
        );
    }
}
