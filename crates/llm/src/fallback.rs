use async_trait::async_trait;

use crate::{CompletionProvider, CompletionRequest, ProviderError};

/// Stand-in used when no API key is configured. Every call fails with
/// `NotConfigured`, which callers map to their apology reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredProvider;

#[async_trait]
impl CompletionProvider for UnconfiguredProvider {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<Option<String>, ProviderError> {
        Err(ProviderError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompletionSettings;

    #[tokio::test]
    async fn always_reports_not_configured() {
        let request = CompletionRequest {
            system: "system".to_string(),
            user: "hello".to_string(),
            settings: CompletionSettings::default(),
        };
        assert_eq!(
            UnconfiguredProvider.complete(&request).await,
            Err(ProviderError::NotConfigured)
        );
    }
}
