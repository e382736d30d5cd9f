//! Chat-completion based analyzer.

use super::Analyzer;
use crate::config::{AnalysisSettings, Prompts};
use crate::error::{NotewiseError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Summarizes content with an OpenAI chat model.
pub struct ChatAnalyzer {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    prompts: Prompts,
}

impl ChatAnalyzer {
    pub fn with_config(client: Client<OpenAIConfig>, settings: &AnalysisSettings) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    fn build_request(&self, content: &str) -> Result<CreateChatCompletionRequest> {
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), content.to_string());
        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.analysis.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.analysis.system.clone())
                .build()
                .map_err(|e| NotewiseError::Analysis(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| NotewiseError::Analysis(e.to_string()))?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(|e| NotewiseError::Analysis(e.to_string()))
    }
}

#[async_trait]
impl Analyzer for ChatAnalyzer {
    #[instrument(skip(self, content), fields(model = %self.model, chars = content.len()))]
    async fn analyze(&self, content: &str) -> Result<String> {
        let request = self.build_request(content)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            NotewiseError::Analysis(format!("Failed to generate analysis: {}", e))
        })?;

        let analysis =
            completion_text(response.choices.first().and_then(|c| c.message.content.as_deref()))?;

        debug!("Received {} characters of analysis", analysis.len());
        Ok(analysis)
    }
}

/// The completion text, or an analysis error when the model returned nothing usable.
fn completion_text(content: Option<&str>) -> Result<String> {
    match content {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(NotewiseError::Analysis("Empty response from LLM".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ChatAnalyzer {
        let client =
            crate::openai::create_client("sk-test", std::time::Duration::from_secs(1)).unwrap();
        ChatAnalyzer::with_config(client, &AnalysisSettings::default())
    }

    #[test]
    fn test_request_carries_content() {
        let request = analyzer().build_request("hello from the meeting").unwrap();

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.max_completion_tokens, Some(1000));

        let user = serde_json::to_string(&request.messages[1]).unwrap();
        assert!(user.contains("hello from the meeting"));
        assert!(user.contains("Key Points:"));
    }

    #[test]
    fn test_custom_prompt_variables() {
        let mut prompts = Prompts::default();
        prompts.analysis.user = "Audience: {{audience}}\n{{content}}".to_string();
        prompts.variables.insert("audience".to_string(), "voters".to_string());

        let request = analyzer().with_prompts(prompts).build_request("text").unwrap();
        let user = serde_json::to_string(&request.messages[1]).unwrap();
        assert!(user.contains("Audience: voters\\ntext"));
    }

    #[test]
    fn test_completion_text() {
        assert_eq!(completion_text(Some("Topics: rent")).unwrap(), "Topics: rent");
    }

    #[test]
    fn test_empty_completion_is_analysis_error() {
        for content in [None, Some(""), Some("  \n\t")] {
            let err = completion_text(content).unwrap_err();
            assert!(matches!(err, NotewiseError::Analysis(_)), "{:?}", content);
        }
    }
}
