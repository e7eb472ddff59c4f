//! services/api/src/adapters/advice_llm.rs
//!
//! This module contains the adapter for the style-advice LLM.
//! It implements the `StyleAdvisor` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use salon_core::{
    domain::Service,
    ports::{PortError, PortResult, StyleAdvisor},
};

/// Shown when no LLM is configured.
pub const ADVISOR_UNAVAILABLE: &str =
    "The style consultant is not configured and is unavailable right now.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StyleAdvisor` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAdviceAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAdviceAdapter {
    /// Creates a new `OpenAiAdviceAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Lists the catalog the way it is handed to the model.
pub fn describe_services(services: &[Service]) -> String {
    services
        .iter()
        .map(|s| format!("{} ({} min)", s.name, s.duration_minutes))
        .collect::<Vec<_>>()
        .join(", ")
}

//=========================================================================================
// `StyleAdvisor` Trait Implementation
//=========================================================================================

#[async_trait]
impl StyleAdvisor for OpenAiAdviceAdapter {
    /// Asks the model which of our services fits the client's request.
    async fn advise(&self, query: &str, services: &[Service]) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(
                "You are the style consultant of a premium barbershop. Answer briefly and elegantly, and suggest which of the available services best fits the client's request. Do not use markdown, only plain text and line breaks.")
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "CLIENT REQUEST: {}\n\nAVAILABLE SERVICES: {}",
                    query,
                    describe_services(services)
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                PortError::Unexpected("Advice LLM response contained no text content.".to_string())
            })
    }
}

/// Stand-in used when no API key is configured.
#[derive(Clone, Default)]
pub struct UnavailableAdvisor;

#[async_trait]
impl StyleAdvisor for UnavailableAdvisor {
    async fn advise(&self, _query: &str, _services: &[Service]) -> PortResult<String> {
        Ok(ADVISOR_UNAVAILABLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn services_are_listed_with_durations() {
        let services = vec![
            Service {
                id: Uuid::new_v4(),
                name: "Classic Cut".to_string(),
                price: 50.0,
                duration_minutes: 30,
                image_url: String::new(),
                description: None,
            },
            Service {
                id: Uuid::new_v4(),
                name: "Beard Therapy".to_string(),
                price: 40.0,
                duration_minutes: 30,
                image_url: String::new(),
                description: None,
            },
        ];
        assert_eq!(
            describe_services(&services),
            "Classic Cut (30 min), Beard Therapy (30 min)"
        );
    }

    #[tokio::test]
    async fn unavailable_advisor_explains_itself() {
        let text = UnavailableAdvisor.advise("fade?", &[]).await.unwrap();
        assert_eq!(text, ADVISOR_UNAVAILABLE);
    }
}
