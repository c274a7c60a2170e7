//! Core data model types for Lengua.
//!
//! These are the fixed internal shapes every quiz item is mapped to at load
//! time. The loose field names found in data files are handled once, in
//! [`crate::ingest`], and never re-probed afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// A quiz category, one per data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// b/v spelling (`bv.json`).
    Spelling,
    /// Literary devices (`recursos.json`).
    LiteraryDevice,
    /// Verb conjugation (`conjugaciones.json`).
    Conjugation,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Spelling,
        Category::LiteraryDevice,
        Category::Conjugation,
    ];

    /// File stem of the data file this category is read from.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Category::Spelling => "bv",
            Category::LiteraryDevice => "recursos",
            Category::Conjugation => "conjugaciones",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "bv" | "spelling" | "ortografia" => Ok(Category::Spelling),
            "recursos" | "recursos literarios" | "devices" | "literary-device" => {
                Ok(Category::LiteraryDevice)
            }
            "conjugaciones" | "conjugacion" | "conjugation" | "conj" => Ok(Category::Conjugation),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// The two letters a spelling item can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BvLetter {
    B,
    V,
}

impl BvLetter {
    pub fn as_char(&self) -> char {
        match self {
            BvLetter::B => 'b',
            BvLetter::V => 'v',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_lowercase().next()? {
            'b' => Some(BvLetter::B),
            'v' => Some(BvLetter::V),
            _ => None,
        }
    }
}

impl fmt::Display for BvLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for BvLetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = normalize(s);
        let mut chars = n.chars();
        match (chars.next().and_then(BvLetter::from_char), chars.next()) {
            (Some(letter), None) => Ok(letter),
            _ => Err(format!("not b or v: {s:?}")),
        }
    }
}

/// Marker that stands for the hidden letter in a masked pattern.
pub const BLANK: char = '_';

/// A b/v spelling item: one word with one hidden letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellingItem {
    /// The full word, when known.
    #[serde(default)]
    pub word: Option<String>,
    /// The word with exactly one [`BLANK`].
    pub pattern: String,
    /// Character index of the blank within `pattern`.
    pub blank: usize,
    /// The hidden letter. `None` means the item cannot be graded.
    #[serde(default)]
    pub expected: Option<BvLetter>,
}

impl SpellingItem {
    /// The word with the blank filled in, if the letter is known.
    pub fn revealed(&self) -> Option<String> {
        if let Some(word) = &self.word {
            return Some(word.clone());
        }
        let letter = self.expected?;
        Some(
            self.pattern
                .chars()
                .map(|c| if c == BLANK { letter.as_char() } else { c })
                .collect(),
        )
    }

    pub fn is_gradable(&self) -> bool {
        self.expected.is_some()
    }
}

/// A literary device item: identify the device in a text or definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceItem {
    /// The example text or definition shown to the learner.
    pub prompt: String,
    /// The expected device name.
    pub answer: String,
    /// Multiple-choice options; always contains `answer`.
    pub options: Vec<String>,
}

/// Built-in device vocabulary, offered when a record carries no options.
pub const DEFAULT_DEVICES: &[&str] = &[
    "Metáfora",
    "Símil",
    "Personificación",
    "Hipérbole",
    "Anáfora",
    "Aliteración",
    "Hipérbaton",
    "Antítesis",
    "Epíteto",
    "Onomatopeya",
];

/// One independently graded facet of a conjugated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Person,
    Number,
    TenseLabel,
    Mood,
    ConjugationClass,
    Aspect,
    Voice,
    Regularity,
}

impl Facet {
    pub const ALL: [Facet; 8] = [
        Facet::Person,
        Facet::Number,
        Facet::TenseLabel,
        Facet::Mood,
        Facet::ConjugationClass,
        Facet::Aspect,
        Facet::Voice,
        Facet::Regularity,
    ];

    /// Label shown to the learner.
    pub fn label(&self) -> &'static str {
        match self {
            Facet::Person => "Persona",
            Facet::Number => "Número",
            Facet::TenseLabel => "Tiempo",
            Facet::Mood => "Modo",
            Facet::ConjugationClass => "Conjugación",
            Facet::Aspect => "Aspecto",
            Facet::Voice => "Voz",
            Facet::Regularity => "Regularidad",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Facet values keyed by facet.
pub type FacetMap = BTreeMap<Facet, String>;

/// A conjugation item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConjugationItem {
    /// Sentence the form appears in, if any.
    #[serde(default)]
    pub sentence: Option<String>,
    /// The conjugated form; also the expected answer when producing.
    pub form: String,
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default)]
    pub pronoun: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub tense: Option<String>,
    #[serde(default)]
    pub person: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub conjugation_class: Option<String>,
    #[serde(default)]
    pub aspect: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub regularity: Option<String>,
}

impl ConjugationItem {
    /// The text to show when recognizing: the sentence, else the form.
    pub fn prompt(&self) -> &str {
        self.sentence.as_deref().unwrap_or(&self.form)
    }

    pub fn facet(&self, facet: Facet) -> Option<&str> {
        let value = match facet {
            Facet::Person => &self.person,
            Facet::Number => &self.number,
            Facet::TenseLabel => &self.tense,
            Facet::Mood => &self.mood,
            Facet::ConjugationClass => &self.conjugation_class,
            Facet::Aspect => &self.aspect,
            Facet::Voice => &self.voice,
            Facet::Regularity => &self.regularity,
        };
        value.as_deref()
    }

    /// Non-empty facets, i.e. the ones a recognition attempt is graded on.
    pub fn facets(&self) -> FacetMap {
        Facet::ALL
            .iter()
            .filter_map(|&f| {
                self.facet(f)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (f, v.to_string()))
            })
            .collect()
    }

    /// Accepted answers when producing the form: the bare form, and
    /// "pronoun form" when a pronoun is known.
    pub fn accepted_answers(&self) -> Vec<String> {
        let mut accepted = vec![self.form.clone()];
        if let Some(pronoun) = self.pronoun.as_deref().filter(|p| !p.trim().is_empty()) {
            accepted.push(format!("{pronoun} {}", self.form));
        }
        accepted
    }
}
