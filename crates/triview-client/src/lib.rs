pub mod client;
pub mod service;

pub use client::FeedbackClient;
pub use service::FeedbackService;
