//! The tutoring engine: subject detection, prompt assembly, the upstream
//! call, and suggestion selection for one request.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::completion::{invoke, ChatCompletion, Completion, OpenAiClient};
use crate::config::Config;
use crate::context;
use crate::error::Result;
use crate::models::{TutorRequest, TutorResponse};
use crate::subject::{self, Subject};
use crate::suggestions::suggestions;

/// Confidence reported with engine answers.
///
/// A fixed placeholder; no confidence model exists.
pub const RESPONSE_CONFIDENCE: f64 = 0.9;

// ============================================================================
// RequestPhase
// ============================================================================

/// Phase of a single tutoring request.
///
/// Every request moves through:
/// - `Received` -> `GateCheck`
/// - `GateCheck` -> `Redirected` (off-topic) or `DetectingSubject`
/// - `DetectingSubject` -> `BuildingContext` -> `CallingUpstream`
/// - `CallingUpstream` -> `Success` or `Fallback`
/// - `Redirected` | `Success` | `Fallback` -> `Responded`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// Request accepted by the gateway.
    Received,
    /// Educational-content gate is being applied.
    GateCheck,
    /// Gate rejected the message; a redirect answer is returned.
    Redirected,
    /// Subject is being resolved.
    DetectingSubject,
    /// Upstream prompt is being assembled.
    BuildingContext,
    /// Completion API call in flight.
    CallingUpstream,
    /// The model answered.
    Success,
    /// The offline fallback answered.
    Fallback,
    /// Response handed back to the client.
    Responded,
}

impl RequestPhase {
    /// Returns `true` if `next` is a legal successor of this phase.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Received, Self::GateCheck)
                | (Self::GateCheck, Self::Redirected | Self::DetectingSubject)
                | (Self::DetectingSubject, Self::BuildingContext)
                | (Self::BuildingContext, Self::CallingUpstream)
                | (Self::CallingUpstream, Self::Success | Self::Fallback)
                | (Self::Redirected | Self::Success | Self::Fallback, Self::Responded)
        )
    }
}

impl std::fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::GateCheck => "gate_check",
            Self::Redirected => "redirected",
            Self::DetectingSubject => "detecting_subject",
            Self::BuildingContext => "building_context",
            Self::CallingUpstream => "calling_upstream",
            Self::Success => "success",
            Self::Fallback => "fallback",
            Self::Responded => "responded",
        };
        f.write_str(s)
    }
}

/// Logs a phase transition.
pub(crate) fn trace_phase(from: RequestPhase, to: RequestPhase) -> RequestPhase {
    debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
    debug!(from = %from, to = %to, "Request phase");
    to
}

// ============================================================================
// TutorEngine
// ============================================================================

/// Produces tutor answers for requests that passed the gateway checks.
///
/// Holds no per-request state; one engine is shared by all handlers.
#[derive(Clone)]
pub struct TutorEngine {
    completion: Arc<dyn ChatCompletion>,
    upstream_timeout: Duration,
}

impl std::fmt::Debug for TutorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorEngine")
            .field("upstream_timeout", &self.upstream_timeout)
            .finish_non_exhaustive()
    }
}

impl TutorEngine {
    /// Creates an engine around an arbitrary completion provider.
    #[must_use]
    pub fn new(completion: Arc<dyn ChatCompletion>, upstream_timeout: Duration) -> Self {
        Self {
            completion,
            upstream_timeout,
        }
    }

    /// Creates an engine that calls the configured OpenAI-compatible API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = OpenAiClient::new(config)?;
        info!(
            endpoint = client.endpoint(),
            model = %config.model,
            timeout_secs = config.upstream_timeout_secs,
            "Completion client ready"
        );
        Ok(Self::new(Arc::new(client), config.upstream_timeout()))
    }

    /// Resolves the subject for a request.
    ///
    /// A hint naming a known subject wins; otherwise the message is scanned.
    #[must_use]
    pub fn resolve_subject(request: &TutorRequest) -> Option<Subject> {
        request
            .subject_hint()
            .or_else(|| subject::detect(&request.message))
    }

    /// Answers a tutoring request.
    ///
    /// Upstream failures never surface here: they are answered by the
    /// offline fallback.
    pub async fn respond(&self, request: &TutorRequest) -> TutorResponse {
        let phase = trace_phase(RequestPhase::GateCheck, RequestPhase::DetectingSubject);
        let subject = Self::resolve_subject(request);

        let phase = trace_phase(phase, RequestPhase::BuildingContext);
        let prompt = context::build(
            &request.message,
            &request.conversation_history,
            request.user_level,
            subject,
        );

        let phase = trace_phase(phase, RequestPhase::CallingUpstream);
        let completion = invoke(self.completion.as_ref(), &prompt, self.upstream_timeout).await;
        let outcome = match &completion {
            Completion::Live(_) => RequestPhase::Success,
            Completion::Offline { .. } => RequestPhase::Fallback,
        };
        let phase = trace_phase(phase, outcome);

        info!(
            subject = ?subject,
            level = %request.user_level,
            history = request.conversation_history.len(),
            offline = completion.is_offline(),
            answer_len = completion.text().len(),
            "Tutor answer ready"
        );

        let response = completion.into_text();
        let answer = TutorResponse {
            suggestions: suggestions(&response, subject),
            response,
            subject_detected: subject,
            confidence: RESPONSE_CONFIDENCE,
            timestamp: Utc::now(),
        };
        trace_phase(phase, RequestPhase::Responded);
        answer
    }
}
