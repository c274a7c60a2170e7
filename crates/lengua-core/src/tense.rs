//! Three-level tense classification.
//!
//! Conjugation records describe their form with free-text mood and tense
//! labels ("Pretérito perfecto compuesto", "subjuntivo", ...). The resolver
//! maps those onto three dependent levels: mood, then time-group, then exact
//! tense. Matching is by substring on normalized text, applied through ordered
//! rule tables where the first matching rule wins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Unclassifiable;
use crate::normalize::{normalize, normalize_opt};

/// Level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Indicative,
    Subjunctive,
    Imperative,
}

/// Level 2: umbrella tense groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGroup {
    Present,
    Preterite,
    Future,
    Conditional,
}

/// Level 3: exact tense within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactTense {
    Present,
    Imperfect,
    SimplePerfect,
    CompoundPerfect,
    Pluperfect,
    Anterior,
    SimpleFuture,
    CompoundFuture,
    SimpleConditional,
    CompoundConditional,
    Imperative,
}

/// The resolved three levels for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenseClassification {
    pub mood: Mood,
    pub group: TimeGroup,
    pub exact: ExactTense,
}

/// The learner's step-by-step picks; later levels stay `None` until chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenseSelection {
    pub mood: Option<Mood>,
    pub group: Option<TimeGroup>,
    pub exact: Option<ExactTense>,
}

/// How to treat labels that only match a fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverPolicy {
    /// Unmatched groups fall back to Present and a bare "perfecto" to
    /// Simple Perfect.
    #[default]
    Lenient,
    /// Fallback matches are reported as unclassifiable.
    Strict,
}

/// One of the three dependent levels, used to report step mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenseLevel {
    Mood,
    Group,
    Exact,
}

impl fmt::Display for TenseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenseLevel::Mood => f.write_str("Modo"),
            TenseLevel::Group => f.write_str("Tiempo"),
            TenseLevel::Exact => f.write_str("Tiempo exacto"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

type Predicate = fn(&str) -> bool;

fn has_preterite_marker(t: &str) -> bool {
    ["preterito", "imperfecto", "pluscuamperfecto", "anterior"]
        .iter()
        .any(|m| t.contains(m))
        || (t.contains("perfecto") && !t.contains("presente"))
}

/// Level-2 rules. Order matters: "pretérito perfecto compuesto" would also
/// satisfy later rules.
const GROUP_RULES: &[(Predicate, TimeGroup)] = &[
    (|t: &str| t.contains("condicional"), TimeGroup::Conditional),
    (|t: &str| t.contains("futuro"), TimeGroup::Future),
    (has_preterite_marker, TimeGroup::Preterite),
    (|t: &str| t.contains("presente"), TimeGroup::Present),
];

/// Level-3 rules inside Preterite. "imperfecto" and "pluscuamperfecto" both
/// contain "perfecto", so they come first.
const PRETERITE_RULES: &[(Predicate, ExactTense)] = &[
    (|t: &str| t.contains("imperfecto"), ExactTense::Imperfect),
    (|t: &str| t.contains("pluscuamperfecto"), ExactTense::Pluperfect),
    (|t: &str| t.contains("anterior"), ExactTense::Anterior),
    (
        |t: &str| t.contains("perfecto") && t.contains("compuesto"),
        ExactTense::CompoundPerfect,
    ),
    (
        |t: &str| t.contains("perfecto") && t.contains("simple"),
        ExactTense::SimplePerfect,
    ),
    (|t: &str| t.contains("indefinido"), ExactTense::SimplePerfect),
];

fn first_match<T: Copy>(rules: &[(Predicate, T)], label: &str) -> Option<T> {
    rules
        .iter()
        .find(|(when, _)| when(label))
        .map(|&(_, then)| then)
}

/// Level 1 from a free-text mood label. Empty labels yield `None`.
pub fn classify_mood(mood: &str) -> Option<Mood> {
    let m = normalize(mood);
    if m.is_empty() {
        None
    } else if m.contains("subj") {
        Some(Mood::Subjunctive)
    } else if m.contains("imper") {
        Some(Mood::Imperative)
    } else {
        Some(Mood::Indicative)
    }
}

/// Resolve a record's mood and tense labels into three levels.
pub fn resolve(
    mood: Option<&str>,
    tense: Option<&str>,
    policy: ResolverPolicy,
) -> Result<TenseClassification, Unclassifiable> {
    let unclassifiable = || Unclassifiable {
        mood: mood.unwrap_or_default().to_string(),
        tense: tense.unwrap_or_default().to_string(),
    };

    let mood_level = mood.and_then(classify_mood).ok_or_else(|| unclassifiable())?;

    if mood_level == Mood::Imperative {
        return Ok(TenseClassification {
            mood: Mood::Imperative,
            group: TimeGroup::Present,
            exact: ExactTense::Imperative,
        });
    }

    let label = normalize_opt(tense);
    if label.is_empty() {
        return Err(unclassifiable());
    }

    let group = match (first_match(GROUP_RULES, &label), policy) {
        (Some(group), _) => group,
        (None, ResolverPolicy::Lenient) => {
            tracing::debug!(tense = %label, "no group rule matched, defaulting to present");
            TimeGroup::Present
        }
        (None, ResolverPolicy::Strict) => return Err(unclassifiable()),
    };

    let exact = match group {
        TimeGroup::Conditional if label.contains("compuesto") => ExactTense::CompoundConditional,
        TimeGroup::Conditional => ExactTense::SimpleConditional,
        TimeGroup::Future if label.contains("compuesto") => ExactTense::CompoundFuture,
        TimeGroup::Future => ExactTense::SimpleFuture,
        TimeGroup::Present => ExactTense::Present,
        TimeGroup::Preterite => match (first_match(PRETERITE_RULES, &label), policy) {
            (Some(exact), _) => exact,
            (None, ResolverPolicy::Lenient) => ExactTense::SimplePerfect,
            (None, ResolverPolicy::Strict) => return Err(unclassifiable()),
        },
    };

    Ok(TenseClassification {
        mood: mood_level,
        group,
        exact,
    })
}

// ---------------------------------------------------------------------------
// Dependent option lists
// ---------------------------------------------------------------------------

/// Level-2 choices offered once a mood is chosen.
pub fn group_options(mood: Mood) -> &'static [TimeGroup] {
    match mood {
        Mood::Imperative => &[TimeGroup::Present],
        Mood::Indicative | Mood::Subjunctive => &[
            TimeGroup::Present,
            TimeGroup::Preterite,
            TimeGroup::Future,
            TimeGroup::Conditional,
        ],
    }
}

/// Level-3 choices offered once a mood and group are chosen.
pub fn exact_options(mood: Mood, group: TimeGroup) -> &'static [ExactTense] {
    if mood == Mood::Imperative {
        return &[ExactTense::Imperative];
    }
    match group {
        TimeGroup::Present => &[ExactTense::Present],
        TimeGroup::Preterite => &[
            ExactTense::Imperfect,
            ExactTense::SimplePerfect,
            ExactTense::CompoundPerfect,
            ExactTense::Pluperfect,
            ExactTense::Anterior,
        ],
        TimeGroup::Future => &[ExactTense::SimpleFuture, ExactTense::CompoundFuture],
        TimeGroup::Conditional => &[
            ExactTense::SimpleConditional,
            ExactTense::CompoundConditional,
        ],
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

impl Mood {
    pub const ALL: [Mood; 3] = [Mood::Indicative, Mood::Subjunctive, Mood::Imperative];

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Indicative => "Indicativo",
            Mood::Subjunctive => "Subjuntivo",
            Mood::Imperative => "Imperativo",
        }
    }
}

impl TimeGroup {
    pub fn label(&self) -> &'static str {
        match self {
            TimeGroup::Present => "Presente",
            TimeGroup::Preterite => "Pretérito",
            TimeGroup::Future => "Futuro",
            TimeGroup::Conditional => "Condicional",
        }
    }
}

impl ExactTense {
    pub fn label(&self) -> &'static str {
        match self {
            ExactTense::Present => "Presente",
            ExactTense::Imperfect => "Pretérito imperfecto",
            ExactTense::SimplePerfect => "Pretérito perfecto simple",
            ExactTense::CompoundPerfect => "Pretérito perfecto compuesto",
            ExactTense::Pluperfect => "Pretérito pluscuamperfecto",
            ExactTense::Anterior => "Pretérito anterior",
            ExactTense::SimpleFuture => "Futuro simple",
            ExactTense::CompoundFuture => "Futuro compuesto",
            ExactTense::SimpleConditional => "Condicional simple",
            ExactTense::CompoundConditional => "Condicional compuesto",
            ExactTense::Imperative => "Imperativo",
        }
    }

    /// Every exact tense, in display order.
    pub const ALL: [ExactTense; 11] = [
        ExactTense::Present,
        ExactTense::Imperfect,
        ExactTense::SimplePerfect,
        ExactTense::CompoundPerfect,
        ExactTense::Pluperfect,
        ExactTense::Anterior,
        ExactTense::SimpleFuture,
        ExactTense::CompoundFuture,
        ExactTense::SimpleConditional,
        ExactTense::CompoundConditional,
        ExactTense::Imperative,
    ];

    fn english(&self) -> &'static str {
        match self {
            ExactTense::Present => "present",
            ExactTense::Imperfect => "imperfect",
            ExactTense::SimplePerfect => "simple perfect",
            ExactTense::CompoundPerfect => "compound perfect",
            ExactTense::Pluperfect => "pluperfect",
            ExactTense::Anterior => "anterior",
            ExactTense::SimpleFuture => "simple future",
            ExactTense::CompoundFuture => "compound future",
            ExactTense::SimpleConditional => "simple conditional",
            ExactTense::CompoundConditional => "compound conditional",
            ExactTense::Imperative => "imperative",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for TimeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for ExactTense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for TenseClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} · {} · {}", self.mood, self.group, self.exact)
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "indicativo" | "indicative" => Ok(Mood::Indicative),
            "subjuntivo" | "subjunctive" => Ok(Mood::Subjunctive),
            "imperativo" | "imperative" => Ok(Mood::Imperative),
            other => Err(format!("unknown mood: {other}")),
        }
    }
}

impl FromStr for TimeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "presente" | "present" => Ok(TimeGroup::Present),
            "preterito" | "preterite" | "pasado" | "past" => Ok(TimeGroup::Preterite),
            "futuro" | "future" => Ok(TimeGroup::Future),
            "condicional" | "conditional" => Ok(TimeGroup::Conditional),
            other => Err(format!("unknown time group: {other}")),
        }
    }
}

impl FromStr for ExactTense {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = normalize(s);
        ExactTense::ALL
            .iter()
            .copied()
            .find(|t| normalize(t.label()) == n || t.english() == n)
            .ok_or_else(|| format!("unknown tense: {n}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(mood: &str, tense: &str) -> TenseClassification {
        resolve(Some(mood), Some(tense), ResolverPolicy::Lenient).unwrap()
    }

    fn exact(mood: &str, tense: &str) -> ExactTense {
        lenient(mood, tense).exact
    }

    #[test]
    fn imperative_short_circuits() {
        let expected = TenseClassification {
            mood: Mood::Imperative,
            group: TimeGroup::Present,
            exact: ExactTense::Imperative,
        };
        assert_eq!(lenient("Imperativo", "Futuro compuesto"), expected);
        assert_eq!(lenient("imperativo", ""), expected);
        assert_eq!(
            resolve(Some("Imperativo"), None, ResolverPolicy::Strict).unwrap(),
            expected
        );
    }

    #[test]
    fn compound_future() {
        assert_eq!(
            lenient("Indicativo", "Futuro compuesto"),
            TenseClassification {
                mood: Mood::Indicative,
                group: TimeGroup::Future,
                exact: ExactTense::CompoundFuture,
            }
        );
        assert_eq!(exact("Indicativo", "Futuro"), ExactTense::SimpleFuture);
    }

    #[test]
    fn subjunctive_imperfect() {
        assert_eq!(
            lenient("Subjuntivo", "Pretérito imperfecto"),
            TenseClassification {
                mood: Mood::Subjunctive,
                group: TimeGroup::Preterite,
                exact: ExactTense::Imperfect,
            }
        );
    }

    #[test]
    fn present_regardless_of_mood() {
        for mood in ["Indicativo", "Subjuntivo", "modo raro"] {
            let c = lenient(mood, "Presente");
            assert_eq!(c.group, TimeGroup::Present);
            assert_eq!(c.exact, ExactTense::Present);
        }
    }

    #[test]
    fn mood_substring_heuristic() {
        assert_eq!(classify_mood("SUBJ."), Some(Mood::Subjunctive));
        assert_eq!(classify_mood("Imperativo negativo"), Some(Mood::Imperative));
        assert_eq!(classify_mood("indicativo"), Some(Mood::Indicative));
        assert_eq!(classify_mood("cualquier cosa"), Some(Mood::Indicative));
        assert_eq!(classify_mood("   "), None);
    }

    #[test]
    fn conditional_branches() {
        assert_eq!(exact("Indicativo", "Condicional"), ExactTense::SimpleConditional);
        assert_eq!(exact("Indicativo", "Condicional simple"), ExactTense::SimpleConditional);
        assert_eq!(
            exact("Indicativo", "Condicional compuesto"),
            ExactTense::CompoundConditional
        );
    }

    #[test]
    fn preterite_branches_in_order() {
        assert_eq!(exact("Indicativo", "Pretérito imperfecto"), ExactTense::Imperfect);
        assert_eq!(exact("Indicativo", "Pretérito pluscuamperfecto"), ExactTense::Pluperfect);
        assert_eq!(exact("Subjuntivo", "Pluscuamperfecto"), ExactTense::Pluperfect);
        assert_eq!(exact("Indicativo", "Pretérito anterior"), ExactTense::Anterior);
        assert_eq!(
            exact("Indicativo", "Pretérito perfecto compuesto"),
            ExactTense::CompoundPerfect
        );
        assert_eq!(
            exact("Indicativo", "Pretérito perfecto simple"),
            ExactTense::SimplePerfect
        );
        assert_eq!(exact("Indicativo", "Pretérito indefinido"), ExactTense::SimplePerfect);
        assert_eq!(exact("Indicativo", "PRETERITO PERFECTO"), ExactTense::SimplePerfect);
        assert_eq!(exact("Indicativo", "Imperfecto"), ExactTense::Imperfect);
    }

    #[test]
    fn perfecto_with_presente_is_not_preterite() {
        // "presente perfecto" falls through to Present
        let c = lenient("Subjuntivo", "Presente perfecto");
        assert_eq!(c.group, TimeGroup::Present);
    }

    #[test]
    fn group_priority_beats_later_markers() {
        // contains "perfecto" too, but "futuro" is tested first
        assert_eq!(lenient("Indicativo", "Futuro perfecto").group, TimeGroup::Future);
        assert_eq!(
            lenient("Indicativo", "Condicional perfecto compuesto").group,
            TimeGroup::Conditional
        );
    }

    #[test]
    fn lenient_fallbacks() {
        let c = lenient("Indicativo", "gerundio");
        assert_eq!(c.group, TimeGroup::Present);
        assert_eq!(c.exact, ExactTense::Present);
        assert_eq!(exact("Indicativo", "pretérito"), ExactTense::SimplePerfect);
    }

    #[test]
    fn strict_rejects_fallbacks() {
        assert!(resolve(Some("Indicativo"), Some("gerundio"), ResolverPolicy::Strict).is_err());
        assert!(resolve(Some("Indicativo"), Some("pretérito"), ResolverPolicy::Strict).is_err());
        assert!(resolve(
            Some("Indicativo"),
            Some("Pretérito perfecto simple"),
            ResolverPolicy::Strict
        )
        .is_ok());
    }

    #[test]
    fn empty_fields_are_unclassifiable() {
        for policy in [ResolverPolicy::Lenient, ResolverPolicy::Strict] {
            assert!(resolve(None, Some("Presente"), policy).is_err());
            assert!(resolve(Some(""), Some("Presente"), policy).is_err());
            assert!(resolve(Some("Indicativo"), None, policy).is_err());
            assert!(resolve(Some("Indicativo"), Some("  "), policy).is_err());
        }
        let err = resolve(Some("Indicativo"), Some(""), ResolverPolicy::Lenient).unwrap_err();
        assert_eq!(err.mood, "Indicativo");
    }

    #[test]
    fn dependent_options() {
        assert_eq!(group_options(Mood::Imperative), &[TimeGroup::Present]);
        assert_eq!(group_options(Mood::Subjunctive).len(), 4);
        assert_eq!(
            exact_options(Mood::Imperative, TimeGroup::Present),
            &[ExactTense::Imperative]
        );
        assert_eq!(exact_options(Mood::Indicative, TimeGroup::Preterite).len(), 5);
        assert_eq!(
            exact_options(Mood::Indicative, TimeGroup::Present),
            &[ExactTense::Present]
        );
    }

    #[test]
    fn every_resolution_is_among_the_offered_options() {
        let labels = [
            "Presente",
            "Pretérito imperfecto",
            "Pretérito perfecto simple",
            "Pretérito perfecto compuesto",
            "Pretérito pluscuamperfecto",
            "Pretérito anterior",
            "Futuro simple",
            "Futuro compuesto",
            "Condicional simple",
            "Condicional compuesto",
        ];
        for mood in ["Indicativo", "Subjuntivo", "Imperativo"] {
            for label in labels {
                let c = lenient(mood, label);
                assert!(group_options(c.mood).contains(&c.group));
                assert!(exact_options(c.mood, c.group).contains(&c.exact));
            }
        }
    }

    #[test]
    fn labels_parse_back() {
        for t in ExactTense::ALL {
            assert_eq!(t.label().parse::<ExactTense>().unwrap(), t);
        }
        assert_eq!(
            "compound future".parse::<ExactTense>().unwrap(),
            ExactTense::CompoundFuture
        );
        assert_eq!("PRETERITO".parse::<TimeGroup>().unwrap(), TimeGroup::Preterite);
        assert_eq!("Subjunctive".parse::<Mood>().unwrap(), Mood::Subjunctive);
        assert!("optativo".parse::<Mood>().is_err());
    }
}
