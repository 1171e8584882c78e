//! The mood analysis contract.
//!
//! `MoodAnalysis` is the structured object the language model is forced to
//! produce and that the service relays to its callers. Deserialization enforces
//! field presence, the closed `MentalState` enumeration and the absence of
//! extra fields; [`MoodAnalysis::validate`] enforces the numeric and length
//! bounds. Both sides of the wire call it on receipt.

use crate::constants::{MAX_RECOMMENDATIONS, MIN_RECOMMENDATIONS, MOOD_SCORE_MAX, MOOD_SCORE_MIN};
use crate::errors::AIError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of mental states the model may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentalState {
    Stressed,
    Anxious,
    Motivated,
    Sad,
    Peaceful,
    Distracted,
    Content,
    Energized,
    Overwhelmed,
    Calm,
}

impl MentalState {
    /// Every state, in the order presented to the model.
    pub const ALL: [MentalState; 10] = [
        MentalState::Stressed,
        MentalState::Anxious,
        MentalState::Motivated,
        MentalState::Sad,
        MentalState::Peaceful,
        MentalState::Distracted,
        MentalState::Content,
        MentalState::Energized,
        MentalState::Overwhelmed,
        MentalState::Calm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MentalState::Stressed => "stressed",
            MentalState::Anxious => "anxious",
            MentalState::Motivated => "motivated",
            MentalState::Sad => "sad",
            MentalState::Peaceful => "peaceful",
            MentalState::Distracted => "distracted",
            MentalState::Content => "content",
            MentalState::Energized => "energized",
            MentalState::Overwhelmed => "overwhelmed",
            MentalState::Calm => "calm",
        }
    }

    /// Presentation grouping used when rendering an analysis.
    pub fn tone(&self) -> MoodTone {
        match self {
            MentalState::Peaceful | MentalState::Calm => MoodTone::Peaceful,
            MentalState::Content => MoodTone::Content,
            MentalState::Motivated | MentalState::Energized => MoodTone::Motivated,
            MentalState::Stressed | MentalState::Anxious | MentalState::Overwhelmed => {
                MoodTone::Distressed
            }
            MentalState::Sad | MentalState::Distracted => MoodTone::Low,
        }
    }

    /// Whether the state belongs to the positive half of the scale.
    pub fn is_positive(&self) -> bool {
        matches!(
            self.tone(),
            MoodTone::Peaceful | MoodTone::Content | MoodTone::Motivated
        )
    }
}

impl fmt::Display for MentalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MentalState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MentalState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown mental state '{}'", s))
    }
}

/// Visual grouping of mental states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodTone {
    Peaceful,
    Content,
    Motivated,
    Distressed,
    Low,
}

impl MoodTone {
    pub fn label(&self) -> &'static str {
        match self {
            MoodTone::Peaceful => "peaceful",
            MoodTone::Content => "content",
            MoodTone::Motivated => "motivated",
            MoodTone::Distressed => "distressed",
            MoodTone::Low => "low",
        }
    }
}

/// Structured result of analysing one journal entry.
///
/// # Examples
///
/// ```
/// use serenity::analysis::{MentalState, MoodAnalysis};
///
/// let json = r#"{
///     "mood_score": 72,
///     "mental_state": "content",
///     "suggestions": ["Take a walk", "Call a friend", "Read a chapter"],
///     "habits": ["Drink water", "Stretch", "Journal nightly"],
///     "breathing_prompt": "Breathe in for four, out for six."
/// }"#;
///
/// let analysis = MoodAnalysis::from_json(json)?;
/// assert_eq!(analysis.mental_state, MentalState::Content);
/// # Ok::<(), serenity::errors::AIError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoodAnalysis {
    pub mood_score: f64,
    pub mental_state: MentalState,
    pub suggestions: Vec<String>,
    pub habits: Vec<String>,
    pub breathing_prompt: String,
}

impl MoodAnalysis {
    /// Parses and validates an analysis from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `AIError::MalformedArguments` if the text is not a five-field
    /// analysis object and `AIError::ContractViolation` if it parses but a
    /// field is out of bounds.
    pub fn from_json(text: &str) -> Result<Self, AIError> {
        let analysis: MoodAnalysis =
            serde_json::from_str(text).map_err(|e| AIError::MalformedArguments(e.to_string()))?;
        analysis.validate()?;
        Ok(analysis)
    }

    /// Checks the bounds the type system cannot express.
    pub fn validate(&self) -> Result<(), AIError> {
        if !self.mood_score.is_finite()
            || self.mood_score < MOOD_SCORE_MIN
            || self.mood_score > MOOD_SCORE_MAX
        {
            return Err(AIError::ContractViolation(format!(
                "mood_score {} is outside [{}, {}]",
                self.mood_score, MOOD_SCORE_MIN, MOOD_SCORE_MAX
            )));
        }

        validate_list("suggestions", &self.suggestions)?;
        validate_list("habits", &self.habits)?;

        if self.breathing_prompt.trim().is_empty() {
            return Err(AIError::ContractViolation(
                "breathing_prompt is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Score rounded for display and averaging.
    pub fn rounded_score(&self) -> i64 {
        self.mood_score.round() as i64
    }
}

fn validate_list(field: &str, items: &[String]) -> Result<(), AIError> {
    if items.len() < MIN_RECOMMENDATIONS || items.len() > MAX_RECOMMENDATIONS {
        return Err(AIError::ContractViolation(format!(
            "{} has {} items, expected {}-{}",
            field,
            items.len(),
            MIN_RECOMMENDATIONS,
            MAX_RECOMMENDATIONS
        )));
    }
    if items.iter().any(|item| item.trim().is_empty()) {
        return Err(AIError::ContractViolation(format!(
            "{} contains an empty item",
            field
        )));
    }
    Ok(())
}
