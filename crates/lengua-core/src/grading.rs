//! Grading engine.
//!
//! Pure functions comparing learner input against expected values. All
//! comparisons are loose (see [`crate::normalize`]).

use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::model::{BvLetter, DeviceItem, Facet, FacetMap, SpellingItem};
use crate::normalize::{normalize, normalize_opt};
use crate::tense::{TenseClassification, TenseLevel, TenseSelection};

/// Result of one graded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeOutcome {
    Correct,
    Incorrect,
    /// The learner submitted nothing. Not scored.
    NoAnswerGiven,
}

impl GradeOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, GradeOutcome::Correct)
    }
}

/// Verdict for a free-text answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextVerdict {
    pub outcome: GradeOutcome,
    /// The expected answer in display form, for feedback.
    pub expected_canonical: String,
}

/// Verdict for a multi-part classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationVerdict<F> {
    pub correct: bool,
    /// Gradable parts that did not match.
    pub mismatches: Vec<F>,
    /// Parts with no expected value; neither right nor wrong.
    pub skipped: Vec<F>,
}

/// Verdict for a spelling attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellingVerdict {
    pub outcome: GradeOutcome,
    pub expected: BvLetter,
    /// The full word, when it can be rebuilt.
    pub word: Option<String>,
}

fn display_form(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grade a free-text answer against one expected value.
pub fn grade_free_text(user: &str, expected: &str) -> FreeTextVerdict {
    grade_free_text_any(user, &[expected], expected)
}

/// Grade a free-text answer that may match any of several accepted forms.
/// `display` is what the feedback reveals.
pub fn grade_free_text_any(user: &str, accepted: &[&str], display: &str) -> FreeTextVerdict {
    let answer = normalize(user);
    let outcome = if answer.is_empty() {
        GradeOutcome::NoAnswerGiven
    } else if accepted.iter().any(|a| normalize(a) == answer) {
        GradeOutcome::Correct
    } else {
        GradeOutcome::Incorrect
    };

    FreeTextVerdict {
        outcome,
        expected_canonical: display_form(display),
    }
}

/// Grade a b/v answer for a spelling item.
pub fn grade_letter(user: &str, item: &SpellingItem) -> Result<SpellingVerdict, GradeError> {
    let expected = item
        .expected
        .ok_or_else(|| GradeError::Ungradable(format!("no b/v known for {:?}", item.pattern)))?;

    let outcome = if normalize(user).is_empty() {
        GradeOutcome::NoAnswerGiven
    } else if user.parse::<BvLetter>().ok() == Some(expected) {
        GradeOutcome::Correct
    } else {
        GradeOutcome::Incorrect
    };

    Ok(SpellingVerdict {
        outcome,
        expected,
        word: item.revealed(),
    })
}

/// Grade a multiple-choice answer. The learner may type the option text or
/// its 1-based number.
pub fn grade_choice(user: &str, item: &DeviceItem) -> FreeTextVerdict {
    let chosen = user
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| item.options.get(i))
        .map(String::as_str)
        .unwrap_or(user);
    grade_free_text(chosen, &item.answer)
}

/// Grade independent facet selections.
///
/// Facets that are absent or empty in `expected` are skipped: incomplete
/// source data never counts against the learner. With no gradable facet at
/// all the verdict is vacuously correct.
pub fn grade_classification(selected: &FacetMap, expected: &FacetMap) -> ClassificationVerdict<Facet> {
    let mut mismatches = Vec::new();
    let mut skipped = Vec::new();

    for facet in Facet::ALL {
        let want = normalize_opt(expected.get(&facet).map(String::as_str));
        if want.is_empty() {
            skipped.push(facet);
            continue;
        }
        if normalize_opt(selected.get(&facet).map(String::as_str)) != want {
            mismatches.push(facet);
        }
    }

    ClassificationVerdict {
        correct: mismatches.is_empty(),
        mismatches,
        skipped,
    }
}

/// Grade the three dependent tense selections. A missing selection counts as
/// a mismatch at that level.
pub fn grade_tense_steps(
    selection: &TenseSelection,
    expected: &TenseClassification,
) -> ClassificationVerdict<TenseLevel> {
    let mut mismatches = Vec::new();
    if selection.mood != Some(expected.mood) {
        mismatches.push(TenseLevel::Mood);
    }
    if selection.group != Some(expected.group) {
        mismatches.push(TenseLevel::Group);
    }
    if selection.exact != Some(expected.exact) {
        mismatches.push(TenseLevel::Exact);
    }

    ClassificationVerdict {
        correct: mismatches.is_empty(),
        mismatches,
        skipped: Vec::new(),
    }
}
