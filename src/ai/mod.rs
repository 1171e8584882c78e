//! Server-side mood analysis against a hosted language model.
//!
//! # Module Structure
//!
//! - `gateway`: HTTP client for the chat-completion endpoint
//! - `prompts`: System prompt and message builder
//! - `schema`: Function-calling schema constraining the model output
//!
//! # Example
//!
//! ```no_run
//! use serenity::ai::MoodGateway;
//! use secrecy::SecretString;
//!
//! # async fn run() -> Result<(), serenity::errors::AIError> {
//! let gateway = MoodGateway::new(
//!     "https://ai.gateway.lovable.dev/v1/chat/completions",
//!     "google/gemini-2.5-flash",
//!     Some(SecretString::from("secret".to_string())),
//! );
//! let analysis = gateway.analyze("I had a wonderful productive day").await?;
//! println!("{}", analysis.mental_state);
//! # Ok(())
//! # }
//! ```

pub mod gateway;
pub mod prompts;
pub mod schema;

// Re-export commonly used types
pub use gateway::{CompletionResponse, Message, MoodGateway};
pub use prompts::{analysis_messages, SYSTEM_PROMPT};
