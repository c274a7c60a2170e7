//! Record ingestion.
//!
//! Data files are written by hand and disagree on field names ("frase",
//! "sentence", "texto", ...). Each category has one adapter here that maps
//! the alias keys onto the fixed types in [`crate::model`], once, at load
//! time. Records that cannot produce a usable item are skipped with a warning.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::LoadError;
use crate::model::{
    BvLetter, Category, ConjugationItem, DeviceItem, SpellingItem, BLANK, DEFAULT_DEVICES,
};
use crate::normalize::{equals_loose, normalize};

const WORD: &[&str] = &["word", "palabra"];
const PATTERN: &[&str] = &["pattern", "patron", "mascara", "masked"];
const LETTER: &[&str] = &["missing", "letter", "letra", "answer", "respuesta"];
const INDEX: &[&str] = &["index", "indice"];
const POSITION: &[&str] = &["position", "posicion"];

const DEVICE_PROMPT: &[&str] = &[
    "text",
    "texto",
    "prompt",
    "frase",
    "ejemplo",
    "definicion",
    "definition",
];
const DEVICE_ANSWER: &[&str] = &["answer", "respuesta", "recurso", "device"];
const DEVICE_OPTIONS: &[&str] = &["options", "opciones", "choices"];

const SENTENCE: &[&str] = &["frase", "sentence", "texto", "oracion"];
const FORM: &[&str] = &["forma", "form"];
const EXPECTED: &[&str] = &["respuesta", "answer", "solucion"];
const VERB: &[&str] = &["verbo", "verb", "infinitivo"];
const PRONOUN: &[&str] = &["pronombre", "pronoun"];
const MOOD: &[&str] = &["modo", "mood"];
const TENSE: &[&str] = &["tipo", "tiempo", "tense"];
const PERSON: &[&str] = &["persona", "person"];
const NUMBER: &[&str] = &["numero", "number"];
const CONJUGATION_CLASS: &[&str] = &["grupo", "conjugacion", "conjugation"];
const ASPECT: &[&str] = &["aspecto", "aspect"];
const VOICE: &[&str] = &["voz", "voice"];
const REGULARITY: &[&str] = &["regularidad", "regularity", "regular"];

/// A note about a record that was skipped or degraded during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestWarning {
    /// Position of the record in the source array.
    pub index: usize,
    pub message: String,
}

/// The items produced from one source, plus what went wrong on the way.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub items: Vec<T>,
    pub warnings: Vec<IngestWarning>,
}

impl<T> Default for Ingested<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Parse a JSON document that must be an array of records.
pub fn parse_records(content: &str) -> Result<Vec<Value>, LoadError> {
    let value: Value = serde_json::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?;
    into_records(value)
}

/// Accept a decoded JSON value only if it is an array.
pub fn into_records(value: Value) -> Result<Vec<Value>, LoadError> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(_) => Err(LoadError::NotAnArray("object")),
        Value::String(_) => Err(LoadError::NotAnArray("string")),
        Value::Number(_) => Err(LoadError::NotAnArray("number")),
        Value::Bool(_) => Err(LoadError::NotAnArray("boolean")),
        Value::Null => Err(LoadError::NotAnArray("null")),
    }
}

/// A JSON object with its keys normalized for alias lookup.
struct Record<'a> {
    fields: HashMap<String, &'a Value>,
}

impl<'a> Record<'a> {
    fn new(value: &'a Value) -> Option<Self> {
        let object = value.as_object()?;
        let fields = object.iter().map(|(k, v)| (normalize(k), v)).collect();
        Some(Self { fields })
    }

    fn value(&self, aliases: &[&str]) -> Option<&'a Value> {
        aliases.iter().find_map(|alias| self.fields.get(*alias).copied())
    }

    /// First alias holding a non-empty scalar, stringified and trimmed.
    fn text(&self, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .filter_map(|alias| self.fields.get(*alias))
            .find_map(|v| scalar_text(v))
    }

    fn integer(&self, aliases: &[&str]) -> Option<i64> {
        match self.value(aliases)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn list(&self, aliases: &[&str]) -> Vec<String> {
        match self.value(aliases) {
            Some(Value::Array(values)) => values.iter().filter_map(scalar_text).collect(),
            Some(Value::String(s)) => s
                .split(['|', ';'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn ingest<T>(
    category: Category,
    records: &[Value],
    mut adapt: impl FnMut(&Record<'_>, &mut Vec<String>) -> Option<T>,
) -> Ingested<T> {
    let mut out = Ingested::default();

    for (index, value) in records.iter().enumerate() {
        let Some(record) = Record::new(value) else {
            out.warnings.push(IngestWarning {
                index,
                message: "record is not a JSON object".into(),
            });
            continue;
        };

        let mut notes = Vec::new();
        if let Some(item) = adapt(&record, &mut notes) {
            out.items.push(item);
        }
        out.warnings
            .extend(notes.into_iter().map(|message| IngestWarning { index, message }));
    }

    if !out.warnings.is_empty() {
        tracing::warn!(
            %category,
            warnings = out.warnings.len(),
            usable = out.items.len(),
            "some records were skipped or degraded"
        );
    }

    out
}

// ---------------------------------------------------------------------------
// Spelling
// ---------------------------------------------------------------------------

/// Collapse any run of blank markers ("_", "__", "…") into one [`BLANK`].
fn canonical_pattern(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c == '…' { BLANK } else { c };
        if c == BLANK && out.ends_with(BLANK) {
            continue;
        }
        out.push(c);
    }
    out
}

fn mask(word: &str, at: usize) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| if i == at { BLANK } else { c })
        .collect()
}

fn adapt_spelling(record: &Record<'_>, notes: &mut Vec<String>) -> Option<SpellingItem> {
    let word = record.text(WORD);

    let letter = match record.text(LETTER) {
        Some(raw) => match raw.parse::<BvLetter>() {
            Ok(letter) => Some(letter),
            Err(_) => {
                notes.push(format!("letter {raw:?} is not b or v"));
                None
            }
        },
        None => None,
    };

    if let Some(raw) = record.text(PATTERN) {
        let pattern = canonical_pattern(&raw);
        let blanks: Vec<usize> = pattern
            .chars()
            .enumerate()
            .filter(|&(_, c)| c == BLANK)
            .map(|(i, _)| i)
            .collect();
        let &[blank] = blanks.as_slice() else {
            notes.push(format!(
                "pattern {raw:?} must contain exactly one blank, found {}",
                blanks.len()
            ));
            return None;
        };

        let from_word = word
            .as_deref()
            .filter(|w| w.chars().count() == pattern.chars().count())
            .and_then(|w| w.chars().nth(blank))
            .and_then(BvLetter::from_char);

        let expected = match (letter, from_word) {
            (Some(given), Some(derived)) if given != derived => {
                notes.push(format!(
                    "letter {given} disagrees with word {:?}; using {given}",
                    word.as_deref().unwrap_or_default()
                ));
                Some(given)
            }
            (Some(given), _) => Some(given),
            (None, derived) => derived,
        };
        if expected.is_none() {
            notes.push(format!("cannot determine the missing letter for {raw:?}"));
        }

        return Some(SpellingItem {
            word,
            pattern,
            blank,
            expected,
        });
    }

    let Some(word) = word else {
        notes.push("neither a pattern nor a word".into());
        return None;
    };
    let chars: Vec<char> = word.chars().collect();

    let explicit = record
        .integer(INDEX)
        .or_else(|| record.integer(POSITION).map(|p| p - 1));

    let blank = match explicit {
        Some(i) => match usize::try_from(i).ok().filter(|&i| i < chars.len()) {
            Some(i) => i,
            None => {
                notes.push(format!("blank index {i} is outside {word:?}"));
                return None;
            }
        },
        None => {
            let candidates: Vec<usize> = chars
                .iter()
                .enumerate()
                .filter(|&(_, &c)| match letter {
                    Some(l) => BvLetter::from_char(c) == Some(l),
                    None => BvLetter::from_char(c).is_some(),
                })
                .map(|(i, _)| i)
                .collect();
            match (letter, candidates.as_slice()) {
                (Some(_), [first, ..]) => *first,
                (None, [only]) => *only,
                (_, []) => {
                    notes.push(format!("no b/v to blank in {word:?}"));
                    return None;
                }
                (None, _) => {
                    notes.push(format!("{word:?} has several b/v; give an index"));
                    return None;
                }
            }
        }
    };

    let at_blank = BvLetter::from_char(chars[blank]);
    let expected = match (letter, at_blank) {
        (Some(given), Some(found)) if given != found => {
            notes.push(format!("letter {given} disagrees with {word:?}; using {found}"));
            Some(found)
        }
        (_, Some(found)) => Some(found),
        (_, None) => {
            notes.push(format!(
                "blank at {blank} in {word:?} is {:?}, not b or v",
                chars[blank]
            ));
            None
        }
    };

    Some(SpellingItem {
        pattern: mask(&word, blank),
        word: Some(word),
        blank,
        expected,
    })
}

/// Map raw `bv.json` records onto [`SpellingItem`]s.
pub fn ingest_spelling(records: &[Value]) -> Ingested<SpellingItem> {
    ingest(Category::Spelling, records, adapt_spelling)
}

// ---------------------------------------------------------------------------
// Literary devices
// ---------------------------------------------------------------------------

fn adapt_device(record: &Record<'_>, notes: &mut Vec<String>) -> Option<DeviceItem> {
    let Some(prompt) = record.text(DEVICE_PROMPT) else {
        notes.push("missing prompt text".into());
        return None;
    };
    let Some(answer) = record.text(DEVICE_ANSWER) else {
        notes.push("missing expected device".into());
        return None;
    };

    let mut options: Vec<String> = Vec::new();
    let raw = record.list(DEVICE_OPTIONS);
    let source: Vec<String> = if raw.is_empty() {
        DEFAULT_DEVICES.iter().map(|s| s.to_string()).collect()
    } else {
        raw
    };
    for option in source {
        if !options.iter().any(|o| equals_loose(o, &option)) {
            options.push(option);
        }
    }

    if !options.iter().any(|o| equals_loose(o, &answer)) {
        notes.push(format!("answer {answer:?} missing from options; added"));
        options.push(answer.clone());
    }

    Some(DeviceItem {
        prompt,
        answer,
        options,
    })
}

/// Map raw `recursos.json` records onto [`DeviceItem`]s.
pub fn ingest_devices(records: &[Value]) -> Ingested<DeviceItem> {
    ingest(Category::LiteraryDevice, records, adapt_device)
}

// ---------------------------------------------------------------------------
// Conjugation
// ---------------------------------------------------------------------------

fn adapt_conjugation(record: &Record<'_>, notes: &mut Vec<String>) -> Option<ConjugationItem> {
    let Some(form) = record.text(FORM).or_else(|| record.text(EXPECTED)) else {
        notes.push("missing conjugated form / expected answer".into());
        return None;
    };

    Some(ConjugationItem {
        sentence: record.text(SENTENCE),
        form,
        verb: record.text(VERB),
        pronoun: record.text(PRONOUN),
        mood: record.text(MOOD),
        tense: record.text(TENSE),
        person: record.text(PERSON),
        number: record.text(NUMBER),
        conjugation_class: record.text(CONJUGATION_CLASS),
        aspect: record.text(ASPECT),
        voice: record.text(VOICE),
        regularity: record.text(REGULARITY),
    })
}

/// Map raw `conjugaciones.json` records onto [`ConjugationItem`]s.
pub fn ingest_conjugations(records: &[Value]) -> Ingested<ConjugationItem> {
    ingest(Category::Conjugation, records, adapt_conjugation)
}
