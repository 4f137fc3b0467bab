//! LearnMate AI Tutor
//!
//! Tutoring engine and HTTP gateway: subject detection, prompt assembly,
//! the chat-completion call with its offline fallback, and the REST API.

pub mod api;
pub mod catalog;
pub mod completion;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod gate;
pub mod models;
pub mod subject;
pub mod suggestions;

pub use api::{
    create_router, AppState, EndpointListing, HealthResponse, RootResponse, StudyTipsResponse,
    SubjectsResponse, SERVICE_NAME,
};
pub use catalog::{StudyTip, SubjectCatalog, SubjectInfo, STUDY_TIPS};
pub use completion::{invoke, ChatCompletion, Completion, OpenAiClient, SamplingParams};
pub use config::Config;
pub use context::{PromptMessage, PromptRole, HISTORY_LIMIT};
pub use engine::{RequestPhase, TutorEngine, RESPONSE_CONFIDENCE};
pub use error::{Result, TutorError, UpstreamErrorKind};
pub use gate::is_educational;
pub use models::{ChatMessage, ErrorResponse, Role, TutorRequest, TutorResponse, UserLevel};
pub use subject::{detect, Subject};
