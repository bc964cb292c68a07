//! SDKGen Events: decision events and their delivery.
//!
//! Every request emits an ordered series of [`DecisionEvent`]s. The
//! [`EventTransport`] coalesces events emitted in the same turn into one batch
//! and hands it to an [`EventSink`] in the background, so a slow or missing
//! collector never delays a response.

pub mod client;
pub mod event;
pub mod factory;
pub mod sink;
pub mod transport;

pub use client::{ClientError, DecisionClient, HealthStatus, RetryPolicy};
pub use event::{
    Completed, CompletionStatus, DecisionEvent, EventKind, Failed, Initiated,
    LanguageGenerationDecision, Telemetry, TypeMappingDecision,
};
pub use factory::EventFactory;
pub use sink::{sink_for, EventSink, HttpCollectorSink, LogSink, MemorySink, SinkError};
pub use transport::{EventTransport, TransportConfig};
