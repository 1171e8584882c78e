//! System prompt and message builder for mood analysis.

use super::gateway::Message;

/// System prompt establishing the assistant persona and the five analysis
/// dimensions the model must produce.
pub const SYSTEM_PROMPT: &str = r#"You are a compassionate mental wellness AI assistant. Analyze the user's journal entry and provide:
1. A mood score (0-100, where 0 is very negative and 100 is very positive)
2. Mental state classification (choose one: stressed, anxious, motivated, sad, peaceful, distracted, content, energized, overwhelmed, calm)
3. 3-5 personalized self-improvement suggestions (short, actionable)
4. 3-5 daily habits/micro-tasks to improve mental state
5. A breathing or meditation prompt

Be empathetic, supportive, and encouraging. Focus on growth and self-compassion."#;

/// Builds the message list for analysing one journal entry.
///
/// The entry text is passed through untouched as the user message.
pub fn analysis_messages(entry_text: &str) -> Vec<Message> {
    vec![Message::system(SYSTEM_PROMPT), Message::user(entry_text)]
}
