//! Graded multiple-choice question types
//!
//! A `QuestionItem` is immutable once generated and carries its own answer
//! key. Clients only ever see the `QuestionView` projection: grading happens
//! server-side, so the correct value never crosses the wire.

use serde::{Deserialize, Serialize};

/// Number of candidate answers per question
pub const OPTION_COUNT: usize = 4;

/// One graded multiple-choice item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    /// 0-based ordinal within the session's sequence, sequential, no gaps
    pub index: usize,
    /// Prompt text shown to the player
    pub prompt: String,
    /// Candidate answers in display order (no duplicates)
    pub options: [u32; OPTION_COUNT],
    /// The correct answer value (always present in `options`)
    pub correct: u32,
}

impl QuestionItem {
    /// Check whether a submitted answer value is correct
    pub fn grade(&self, answer: u32) -> bool {
        answer == self.correct
    }

    /// Client-facing projection without the answer key
    pub fn view(&self) -> QuestionView {
        QuestionView {
            index: self.index,
            prompt: self.prompt.clone(),
            options: self.options,
        }
    }
}

/// What a player's client receives for each question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub index: usize,
    pub prompt: String,
    pub options: [u32; OPTION_COUNT],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> QuestionItem {
        QuestionItem {
            index: 3,
            prompt: "17 + 25 = ?".to_string(),
            options: [40, 42, 43, 39],
            correct: 42,
        }
    }

    #[test]
    fn test_grading() {
        let item = sample_item();
        assert!(item.grade(42));
        assert!(!item.grade(40));
        assert!(!item.grade(0));
    }

    #[test]
    fn test_view_omits_answer_key() {
        let item = sample_item();
        let json = serde_json::to_string(&item.view()).unwrap();
        assert!(!json.contains("correct"));
        assert!(json.contains("\"index\":3"));
    }
}
