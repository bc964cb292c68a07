//! Event factory: stamps agent identity, request id and hashes on every event.
use crate::event::{
    Completed, DecisionEvent, EventKind, Failed, Initiated, LanguageGenerationDecision,
    Telemetry, TypeMappingDecision,
};
use sdkgen_core::{FailureMode, TracingContext, AGENT_ID, AGENT_VERSION};

/// Builds events for one request.
#[derive(Debug, Clone)]
pub struct EventFactory {
    agent_id: String,
    agent_version: String,
    request_id: String,
    input_hash: String,
    output_hash: Option<String>,
    tracing: Option<TracingContext>,
}

impl EventFactory {
    /// Factory stamped with this agent's identity.
    pub fn new(request_id: impl Into<String>, input_hash: impl Into<String>) -> Self {
        Self {
            agent_id: AGENT_ID.to_string(),
            agent_version: AGENT_VERSION.to_string(),
            request_id: request_id.into(),
            input_hash: input_hash.into(),
            output_hash: None,
            tracing: None,
        }
    }

    /// Overrides the agent identity (sibling agents share this protocol).
    pub fn with_agent(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.agent_id = id.into();
        self.agent_version = version.into();
        self
    }

    pub fn with_tracing(mut self, tracing: Option<TracingContext>) -> Self {
        self.tracing = tracing;
        self
    }

    /// Replaces the input hash once the request has been parsed.
    pub fn set_input_hash(&mut self, input_hash: impl Into<String>) {
        self.input_hash = input_hash.into();
    }

    /// Outcome events emitted after this call carry the output hash.
    pub fn set_output_hash(&mut self, output_hash: impl Into<String>) {
        self.output_hash = Some(output_hash.into());
    }

    pub fn set_tracing(&mut self, tracing: Option<TracingContext>) {
        self.tracing = tracing;
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn input_hash(&self) -> &str {
        &self.input_hash
    }

    fn build(&self, kind: EventKind, output_hash: Option<String>) -> DecisionEvent {
        DecisionEvent::new(
            uuid::Uuid::new_v4().to_string(),
            self.agent_id.clone(),
            self.agent_version.clone(),
            self.request_id.clone(),
            self.input_hash.clone(),
            output_hash,
            kind,
            self.tracing.clone(),
        )
    }

    pub fn initiated(&self, details: Initiated) -> DecisionEvent {
        self.build(EventKind::Initiated(details), None)
    }

    pub fn completed(&self, details: Completed) -> DecisionEvent {
        self.build(EventKind::Completed(details), self.output_hash.clone())
    }

    /// Failure event for `mode` with the individual error strings.
    pub fn failed(
        &self,
        mode: FailureMode,
        message: impl Into<String>,
        errors: Vec<String>,
    ) -> DecisionEvent {
        let details = Failed {
            failure_mode: mode,
            message: message.into(),
            recoverable: mode.recoverable(),
            errors,
        };
        self.build(EventKind::Failed(details), self.output_hash.clone())
    }

    /// Type-mapping decision; `confidence` is clamped to `[0, 1]`.
    pub fn type_mapping_decision(&self, mut details: TypeMappingDecision) -> DecisionEvent {
        details.confidence = if details.confidence.is_nan() {
            0.0
        } else {
            details.confidence.clamp(0.0, 1.0)
        };
        self.build(EventKind::TypeMappingDecision(details), None)
    }

    pub fn language_generation_decision(
        &self,
        details: LanguageGenerationDecision,
    ) -> DecisionEvent {
        self.build(
            EventKind::LanguageGenerationDecision(details),
            self.output_hash.clone(),
        )
    }

    pub fn telemetry(
        &self,
        duration_ms: u64,
        status_code: u16,
        failure_mode: Option<FailureMode>,
    ) -> DecisionEvent {
        let details = Telemetry {
            duration_ms,
            status_code,
            failure_mode,
        };
        self.build(EventKind::Telemetry(details), self.output_hash.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CompletionStatus;

    fn factory() -> EventFactory {
        EventFactory::new("req-1", "blake3:in")
    }

    #[test]
    fn test_identity_is_stamped() {
        let event = factory().telemetry(12, 200, None);
        assert_eq!(event.agent_id(), AGENT_ID);
        assert_eq!(event.agent_version(), AGENT_VERSION);
        assert_eq!(event.request_id(), "req-1");
        assert_eq!(event.input_hash(), "blake3:in");
        assert_eq!(event.kind_name(), "telemetry");
    }

    #[test]
    fn test_output_hash_only_on_outcome_events() {
        let mut factory = factory();
        factory.set_output_hash("blake3:out");

        let initiated = factory.initiated(Initiated {
            target_languages: vec!["go".into()],
            package_name: "acme".into(),
            package_version: "1.0.0".into(),
            type_count: 0,
            endpoint_count: 0,
            confidence: 1.0,
            confidence_semantics: "deterministic".into(),
        });
        assert_eq!(initiated.output_hash(), None);

        let completed = factory.completed(Completed {
            status: CompletionStatus::Success,
            languages: vec!["go".into()],
            file_count: 3,
            total_bytes: 100,
            determinism_hash: "blake3:det".into(),
            warning_count: 0,
            error_count: 0,
        });
        assert_eq!(completed.output_hash(), Some("blake3:out"));
    }

    #[test]
    fn test_failed_carries_recoverability() {
        let event = factory().failed(FailureMode::Timeout, "too slow", vec![]);
        match event.kind() {
            EventKind::Failed(failed) => {
                assert!(failed.recoverable);
                assert_eq!(failed.failure_mode, FailureMode::Timeout);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_type_mapping_confidence_is_clamped() {
        let event = factory().type_mapping_decision(TypeMappingDecision {
            language: "go".into(),
            confidence: 1.7,
            exact: 1,
            approximate: 0,
            fallback: 0,
        });
        match event.kind() {
            EventKind::TypeMappingDecision(decision) => assert_eq!(decision.confidence, 1.0),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_event_ids_are_unique() {
        let factory = factory();
        let a = factory.telemetry(1, 200, None);
        let b = factory.telemetry(1, 200, None);
        assert_ne!(a.event_id(), b.event_id());
    }

    #[test]
    fn test_wire_shape() {
        let event = factory().failed(FailureMode::InvalidSchema, "bad", vec!["x".into()]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["requestId"], "req-1");
        assert_eq!(json["kind"]["type"], "failed");
        assert_eq!(json["kind"]["failureMode"], "INVALID_SCHEMA");
        assert!(json.get("outputHash").is_none());

        let back: DecisionEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
