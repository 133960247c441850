use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};
use uuid::Uuid;
use vera_core::{
    plan_turn, validate_message, ChatTurnRequest, TurnOutcome, TurnPlan, TurnReport,
    TurnValidationError, CRISIS_REPLY, EMPTY_COMPLETION_REPLY, PROVIDER_FAILURE_REPLY,
};
use vera_llm::{CompletionProvider, CompletionRequest, CompletionSettings};
use vera_observability::AppMetrics;

/// Runs one chat turn end to end. Holds no per-conversation state, so a
/// single instance is shared across concurrent requests.
#[derive(Clone)]
pub struct CompanionAgent {
    provider: Arc<dyn CompletionProvider>,
    settings: CompletionSettings,
    metrics: Arc<AppMetrics>,
}

impl CompanionAgent {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        settings: CompletionSettings,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            provider,
            settings,
            metrics,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub async fn process_request(
        &self,
        request: &ChatTurnRequest,
    ) -> Result<TurnReport, TurnValidationError> {
        let message = self.checked(request.validated_message())?;
        Ok(self.run_turn(message).await)
    }

    pub async fn process_turn(&self, message: &str) -> Result<TurnReport, TurnValidationError> {
        let message = self.checked(validate_message(message))?;
        Ok(self.run_turn(message).await)
    }

    /// Dry run: validation and classification without touching the provider.
    pub fn classify(&self, message: &str) -> Result<TurnPlan, TurnValidationError> {
        validate_message(message).map(plan_turn)
    }

    fn checked<'a>(
        &self,
        validated: Result<&'a str, TurnValidationError>,
    ) -> Result<&'a str, TurnValidationError> {
        if let Err(error) = &validated {
            self.metrics.inc_rejected();
            info!(reason = %error, "turn rejected");
        }
        validated
    }

    #[instrument(skip(self, message), fields(turn_id = %Uuid::new_v4()))]
    async fn run_turn(&self, message: &str) -> TurnReport {
        let started = Instant::now();
        self.metrics.inc_turn();

        let report = match plan_turn(message) {
            TurnPlan::Crisis { matched_phrase } => {
                self.metrics.inc_crisis();
                warn!(matched_phrase, "crisis phrase detected, model bypassed");
                TurnReport::new(CRISIS_REPLY, TurnOutcome::Crisis, None)
            }
            TurnPlan::Model {
                detected,
                directive,
            } => {
                let code = detected.map(|entry| entry.code);
                if let Some(code) = code {
                    self.metrics.inc_trigger_hit(code);
                }
                self.invoke_model(message, directive, code).await
            }
        };

        self.metrics.observe_latency(started.elapsed());
        info!(
            outcome = ?report.outcome,
            detected_code = report.detected_code.unwrap_or("none"),
            provider = self.provider.name(),
            "turn handled"
        );

        report
    }

    async fn invoke_model(
        &self,
        message: &str,
        directive: String,
        code: Option<&'static str>,
    ) -> TurnReport {
        let request = CompletionRequest {
            system: directive,
            user: message.to_string(),
            settings: self.settings.clone(),
        };

        match self.provider.complete(&request).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                TurnReport::new(text, TurnOutcome::Completed, code)
            }
            Ok(_) => {
                self.metrics.inc_fallback();
                warn!("provider returned no usable text, using default reply");
                TurnReport::new(EMPTY_COMPLETION_REPLY, TurnOutcome::EmptyCompletion, code)
            }
            Err(error) => {
                self.metrics.inc_fallback();
                self.metrics.inc_provider_failure(error.category());
                warn!(
                    category = error.category(),
                    error = %error,
                    "completion failed, using fallback reply"
                );
                TurnReport::new(PROVIDER_FAILURE_REPLY, TurnOutcome::ProviderFailure, code)
            }
        }
    }
}
