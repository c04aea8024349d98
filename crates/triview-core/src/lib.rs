pub mod config;
pub mod error;
pub mod feedback;
pub mod form;
pub mod render;
pub mod validation;

pub use config::TriviewConfig;
pub use error::{Result, SubmitError, TriviewError};
pub use feedback::{Domain, DraftRequest, FeedbackResult, Perspective, PerspectiveFeedback, Preferences};
pub use form::{FieldUpdate, FormState, RequestId, Settlement, Submission, TextField};
