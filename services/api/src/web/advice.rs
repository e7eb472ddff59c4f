//! services/api/src/web/advice.rs
//!
//! The style-consultant endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::rest::reject;
use crate::web::state::AppState;

/// Returned instead of an error when the advisor call fails.
pub const ADVICE_FAILED: &str = "Sorry, the style consultant could not answer right now.";

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdviceRequest {
    pub query: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdviceResponse {
    pub advice: String,
}

/// POST /advice - Ask which service fits a described style
#[utoipa::path(
    post,
    path = "/advice",
    request_body = AdviceRequest,
    responses(
        (status = 200, description = "Suggestion text", body = AdviceResponse),
        (status = 400, description = "Empty question")
    )
)]
pub async fn advice_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AdviceRequest>,
) -> Result<Json<AdviceResponse>, (StatusCode, String)> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query is required".to_string()));
    }

    let services = state.catalog.list().await.map_err(reject)?;
    let advice = match state.advisor.advise(query, &services).await {
        Ok(text) => text,
        Err(e) => {
            error!("Style advisor failed: {:?}", e);
            ADVICE_FAILED.to_string()
        }
    };
    Ok(Json(AdviceResponse { advice }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::web::test_support::{test_state, test_state_with_advisor};
    use async_trait::async_trait;
    use salon_core::ports::{PortError, PortResult, StyleAdvisor};
    use salon_core::Service;

    struct EchoAdvisor;

    #[async_trait]
    impl StyleAdvisor for EchoAdvisor {
        async fn advise(&self, query: &str, services: &[Service]) -> PortResult<String> {
            Ok(format!("{} -> {} options", query, services.len()))
        }
    }

    struct BrokenAdvisor;

    #[async_trait]
    impl StyleAdvisor for BrokenAdvisor {
        async fn advise(&self, _query: &str, _services: &[Service]) -> PortResult<String> {
            Err(PortError::Unexpected("rate limited".to_string()))
        }
    }

    fn ask(query: &str) -> Json<AdviceRequest> {
        Json(AdviceRequest {
            query: query.to_string(),
        })
    }

    #[tokio::test]
    async fn advisor_sees_the_catalog() {
        let state = test_state_with_advisor(Arc::new(EchoAdvisor), Config::from_lookup(|_| None).unwrap());
        state.seed().await.unwrap();
        let Json(res) = advice_handler(State(state), ask(" short fade ")).await.unwrap();
        assert_eq!(res.advice, "short fade -> 4 options");
    }

    #[tokio::test]
    async fn advisor_failure_becomes_a_polite_answer() {
        let state = test_state_with_advisor(Arc::new(BrokenAdvisor), Config::from_lookup(|_| None).unwrap());
        let Json(res) = advice_handler(State(state), ask("beard?")).await.unwrap();
        assert_eq!(res.advice, ADVICE_FAILED);
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let (status, _) = advice_handler(State(test_state()), ask("   "))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
