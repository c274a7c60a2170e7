//! Quiz session state and its pure update function.
//!
//! A front end feeds [`Msg`]s to [`update`] and renders the [`Signal`]s it
//! gets back. The session owns the score and the current round; nothing here
//! touches I/O.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NoItemsAvailable, Unclassifiable};
use crate::grading::{
    grade_choice, grade_classification, grade_free_text_any, grade_letter, grade_tense_steps,
    GradeOutcome,
};
use crate::model::{Category, ConjugationItem, DeviceItem, Facet, FacetMap, SpellingItem};
use crate::normalize::{equals_loose, normalize};
use crate::repository::{pick_random, pick_with_constraint, Catalog};
use crate::score::{ScoreSnapshot, ScoreTracker};
use crate::tense::{resolve, Mood, ResolverPolicy, TenseClassification, TenseSelection};

/// The five quiz screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fill in b or v.
    Spelling,
    /// Name the literary device.
    Devices,
    /// Identify the facets of a conjugated form.
    Recognize,
    /// Write the form for a person, number, tense and mood.
    Produce,
    /// Pick mood, time group and exact tense step by step.
    Classify,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Spelling,
        Mode::Devices,
        Mode::Recognize,
        Mode::Produce,
        Mode::Classify,
    ];

    /// The category a mode draws its items from.
    pub fn category(&self) -> Category {
        match self {
            Mode::Spelling => Category::Spelling,
            Mode::Devices => Category::LiteraryDevice,
            Mode::Recognize | Mode::Produce | Mode::Classify => Category::Conjugation,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Spelling => "spelling",
            Mode::Devices => "devices",
            Mode::Recognize => "recognize",
            Mode::Produce => "produce",
            Mode::Classify => "classify",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "spelling" | "bv" | "ortografia" => Ok(Mode::Spelling),
            "devices" | "recursos" => Ok(Mode::Devices),
            "recognize" | "reconocer" => Ok(Mode::Recognize),
            "produce" | "producir" => Ok(Mode::Produce),
            "classify" | "clasificar" => Ok(Mode::Classify),
            other => Err(format!(
                "unknown mode: {other} (expected spelling, devices, recognize, produce or classify)"
            )),
        }
    }
}

/// Tunables for drawing and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bound on re-draws when looking for an item that fits the mode.
    pub max_draw_attempts: usize,
    pub policy: ResolverPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_draw_attempts: 20,
            policy: ResolverPolicy::Lenient,
        }
    }
}

/// Learner input for the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Spelling, devices and produce.
    Text(String),
    /// Recognize.
    Facets(FacetMap),
    /// Classify.
    Tense(TenseSelection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Open(Mode),
    Submit(Answer),
    Next,
    ResetScore,
    /// Show the metadata of the current conjugation item.
    Help,
}

/// What a round asks the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptView {
    pub mode: Mode,
    pub text: String,
    /// Extra line shown under the prompt, such as a sentence with the form
    /// masked.
    pub context: Option<String>,
    /// Choices, when the answer is picked from a list.
    pub options: Vec<String>,
    /// Facets to fill in, for recognition rounds.
    pub facets: Vec<Facet>,
}

/// Result of a submission, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub outcome: GradeOutcome,
    /// The right answer, revealed after grading.
    pub expected: String,
    /// Labels of the parts that were wrong.
    pub mismatches: Vec<String>,
}

/// One line of the help panel, e.g. `Verbo: cantar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpLine {
    pub label: &'static str,
    pub value: String,
}

/// Display output of [`update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Signal {
    Prompt(PromptView),
    Feedback(Feedback),
    Score(ScoreSnapshot),
    Help(Vec<HelpLine>),
    Notice(String),
}

/// The item currently on screen, with whatever was resolved when drawing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Round {
    Spelling(SpellingItem),
    Device(DeviceItem),
    Recognize(ConjugationItem),
    Produce {
        item: ConjugationItem,
        /// `None` when the item has no usable mood or tense; the round is
        /// then asked from its sentence alone.
        classification: Option<TenseClassification>,
    },
    Classify {
        item: ConjugationItem,
        classification: TenseClassification,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub mode: Mode,
    pub round: Option<Round>,
    /// Set once the round has been graded; cleared by [`Msg::Next`].
    pub locked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub score: ScoreTracker,
    pub screen: Option<Screen>,
}

impl Session {
    pub fn new(score: ScoreTracker) -> Self {
        Self {
            score,
            screen: None,
        }
    }
}

/// Advance the session by one message.
pub fn update<R: Rng + ?Sized>(
    mut session: Session,
    msg: Msg,
    catalog: &Catalog,
    rng: &mut R,
    config: &SessionConfig,
) -> (Session, Vec<Signal>) {
    let mut signals = Vec::new();

    match msg {
        Msg::Open(mode) => {
            session.screen = Some(start_round(mode, catalog, rng, config, &mut signals));
        }
        Msg::Next => match session.screen.as_ref().map(|s| s.mode) {
            Some(mode) => {
                session.screen = Some(start_round(mode, catalog, rng, config, &mut signals));
            }
            None => signals.push(Signal::Notice("Elige un modo primero.".into())),
        },
        Msg::ResetScore => {
            session.score.reset();
            signals.push(Signal::Score(session.score.snapshot()));
        }
        Msg::Submit(answer) => submit(&mut session, answer, &mut signals),
        Msg::Help => signals.push(help(&session)),
    }

    (session, signals)
}

fn start_round<R: Rng + ?Sized>(
    mode: Mode,
    catalog: &Catalog,
    rng: &mut R,
    config: &SessionConfig,
    signals: &mut Vec<Signal>,
) -> Screen {
    let round = match draw(mode, catalog, rng, config) {
        Ok(round) => {
            signals.push(Signal::Prompt(prompt_for(mode, &round)));
            Some(round)
        }
        Err(message) => {
            signals.push(Signal::Notice(message));
            None
        }
    };

    Screen {
        mode,
        round,
        locked: false,
    }
}

fn draw<R: Rng + ?Sized>(
    mode: Mode,
    catalog: &Catalog,
    rng: &mut R,
    config: &SessionConfig,
) -> Result<Round, String> {
    let empty = || NoItemsAvailable(mode.category()).to_string();
    let attempts = config.max_draw_attempts;

    match mode {
        Mode::Spelling => {
            pick_with_constraint(&catalog.spelling, SpellingItem::is_gradable, attempts, rng)
                .cloned()
                .map(Round::Spelling)
                .ok_or_else(empty)
        }
        Mode::Devices => pick_random(&catalog.devices, rng)
            .cloned()
            .map(Round::Device)
            .ok_or_else(empty),
        Mode::Recognize => {
            let item = pick_with_constraint(
                &catalog.conjugations,
                |c: &ConjugationItem| !c.facets().is_empty(),
                attempts,
                rng,
            )
            .ok_or_else(empty)?;
            if item.facets().is_empty() {
                tracing::warn!(attempts, form = %item.form, "no conjugation item with facets found");
                return Err(format!("nothing to recognize in {:?}: no facets", item.form));
            }
            Ok(Round::Recognize(item.clone()))
        }
        Mode::Produce => {
            let item = pick_with_constraint(
                &catalog.conjugations,
                |c: &ConjugationItem| classify(c, config.policy).is_ok(),
                attempts,
                rng,
            )
            .ok_or_else(empty)?;
            let classification = classify(item, config.policy).ok();
            if classification.is_none() {
                tracing::debug!(form = %item.form, "producing without a tense classification");
            }
            Ok(Round::Produce {
                item: item.clone(),
                classification,
            })
        }
        Mode::Classify => {
            let mut last_error = None;
            for _ in 0..attempts.max(1) {
                let item = pick_random(&catalog.conjugations, rng).ok_or_else(empty)?;
                match classify(item, config.policy) {
                    Ok(classification) => {
                        return Ok(Round::Classify {
                            item: item.clone(),
                            classification,
                        })
                    }
                    Err(e) => last_error = Some(e),
                }
            }
            tracing::warn!(attempts, "no classifiable conjugation item found");
            Err(last_error.map(|e| e.to_string()).unwrap_or_else(empty))
        }
    }
}

fn classify(item: &ConjugationItem, policy: ResolverPolicy) -> Result<TenseClassification, Unclassifiable> {
    resolve(item.mood.as_deref(), item.tense.as_deref(), policy)
}

/// Instruction for a produce round, e.g.
/// `1ª persona singular del pretérito imperfecto de indicativo de “cantar”`.
///
/// Without a classification only person, number and verb are named.
pub fn produce_instruction(
    item: &ConjugationItem,
    classification: Option<&TenseClassification>,
) -> String {
    let mut parts = Vec::new();
    if let Some(person) = non_empty(item.person.as_deref()) {
        parts.push(format!("{person}ª persona"));
    }
    if let Some(number) = non_empty(item.number.as_deref()) {
        parts.push(number.to_lowercase());
    }

    if let Some(classification) = classification {
        let tense = if classification.mood == Mood::Imperative {
            "imperativo".to_string()
        } else {
            format!(
                "{} de {}",
                classification.exact.label().to_lowercase(),
                classification.mood.label().to_lowercase()
            )
        };
        if parts.is_empty() {
            parts.push(tense);
        } else {
            parts.push(format!("del {tense}"));
        }
    }

    if let Some(verb) = non_empty(item.verb.as_deref()) {
        if parts.is_empty() {
            parts.push("Forma".to_string());
        }
        parts.push(format!("de “{verb}”"));
    }

    if parts.is_empty() {
        "Escribe la forma verbal que falta".to_string()
    } else {
        parts.join(" ")
    }
}

/// Split a token into leading punctuation, word and trailing punctuation.
fn split_punctuation(token: &str) -> (&str, &str, &str) {
    let start = token.find(char::is_alphanumeric).unwrap_or(token.len());
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map_or(start, |(i, c)| i + c.len_utf8());
    (&token[..start], &token[start..end], &token[end..])
}

/// The sentence with the conjugated form hidden, when the sentence has it
/// as whole words. Matching is loose, so "Cantaba" hides "cantaba".
fn masked_sentence(item: &ConjugationItem) -> Option<String> {
    let sentence = non_empty(item.sentence.as_deref())?;
    let form = non_empty(Some(item.form.as_str()))?;
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    let width = form.split_whitespace().count();

    let start = (0..=tokens.len().checked_sub(width)?).find(|&i| {
        let words: Vec<&str> = tokens[i..i + width]
            .iter()
            .map(|t| split_punctuation(t).1)
            .collect();
        equals_loose(&words.join(" "), form)
    })?;

    let (lead, _, _) = split_punctuation(tokens[start]);
    let (_, _, trail) = split_punctuation(tokens[start + width - 1]);
    let mut masked: Vec<String> = tokens[..start].iter().map(|t| t.to_string()).collect();
    masked.push(format!("{lead}____{trail}"));
    masked.extend(tokens[start + width..].iter().map(|t| t.to_string()));
    Some(masked.join(" "))
}

/// What a produce round reveals: `“él cantaba” (o solo “cantaba”)`, or just
/// the form when no pronoun is known.
fn produce_reveal(item: &ConjugationItem) -> String {
    let form = item.form.split_whitespace().collect::<Vec<_>>().join(" ");
    match non_empty(item.pronoun.as_deref()) {
        Some(pronoun) => format!("“{pronoun} {form}” (o solo “{form}”)"),
        None => form,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn prompt_for(mode: Mode, round: &Round) -> PromptView {
    let mut view = PromptView {
        mode,
        text: String::new(),
        context: None,
        options: Vec::new(),
        facets: Vec::new(),
    };

    match round {
        Round::Spelling(item) => {
            view.text = item.pattern.clone();
            view.options = vec!["b".into(), "v".into()];
        }
        Round::Device(item) => {
            view.text = item.prompt.clone();
            view.options = item.options.clone();
        }
        Round::Recognize(item) => {
            view.text = item.prompt().to_string();
            view.facets = item.facets().into_keys().collect();
        }
        Round::Produce {
            item,
            classification,
        } => {
            view.text = produce_instruction(item, classification.as_ref());
            view.context = masked_sentence(item);
        }
        Round::Classify { item, .. } => {
            view.text = item.prompt().to_string();
            if item.sentence.is_some() {
                view.context = Some(item.form.clone());
            }
            view.options = Mood::ALL.iter().map(|m| m.label().to_string()).collect();
        }
    }
    view
}

fn submit(session: &mut Session, answer: Answer, signals: &mut Vec<Signal>) {
    let Some(screen) = session.screen.as_mut() else {
        signals.push(Signal::Notice("Elige un modo primero.".into()));
        return;
    };
    let Some(round) = screen.round.as_ref() else {
        signals.push(Signal::Notice("No hay ninguna pregunta activa.".into()));
        return;
    };
    if screen.locked {
        signals.push(Signal::Notice(
            "Esta pregunta ya está corregida. Pasa a la siguiente.".into(),
        ));
        return;
    }

    let feedback = match grade_round(round, answer) {
        Ok(feedback) => feedback,
        Err(message) => {
            signals.push(Signal::Notice(message));
            return;
        }
    };

    if feedback.outcome != GradeOutcome::NoAnswerGiven {
        session.score.record(feedback.outcome);
        screen.locked = true;
    }
    let graded = feedback.outcome != GradeOutcome::NoAnswerGiven;
    signals.push(Signal::Feedback(feedback));
    if graded {
        signals.push(Signal::Score(session.score.snapshot()));
    }
}

fn grade_round(round: &Round, answer: Answer) -> Result<Feedback, String> {
    match (round, answer) {
        (Round::Spelling(item), Answer::Text(text)) => {
            let verdict = grade_letter(&text, item).map_err(|e| e.to_string())?;
            Ok(Feedback {
                outcome: verdict.outcome,
                expected: verdict
                    .word
                    .unwrap_or_else(|| verdict.expected.to_string()),
                mismatches: Vec::new(),
            })
        }
        (Round::Device(item), Answer::Text(text)) => {
            let verdict = grade_choice(&text, item);
            Ok(Feedback {
                outcome: verdict.outcome,
                expected: verdict.expected_canonical,
                mismatches: Vec::new(),
            })
        }
        (Round::Produce { item, .. }, Answer::Text(text)) => {
            let accepted = item.accepted_answers();
            let accepted: Vec<&str> = accepted.iter().map(String::as_str).collect();
            let verdict = grade_free_text_any(&text, &accepted, &item.form);
            Ok(Feedback {
                outcome: verdict.outcome,
                expected: produce_reveal(item),
                mismatches: Vec::new(),
            })
        }
        (Round::Recognize(item), Answer::Facets(selected)) => {
            let expected = item.facets();
            if selected.values().all(|v| v.trim().is_empty()) {
                return Ok(no_answer(describe_facets(&expected)));
            }
            let verdict = grade_classification(&selected, &expected);
            Ok(Feedback {
                outcome: outcome_of(verdict.correct),
                expected: describe_facets(&expected),
                mismatches: verdict.mismatches.iter().map(ToString::to_string).collect(),
            })
        }
        (Round::Classify { classification, .. }, Answer::Tense(selection)) => {
            if selection == TenseSelection::default() {
                return Ok(no_answer(classification.to_string()));
            }
            let verdict = grade_tense_steps(&selection, classification);
            Ok(Feedback {
                outcome: outcome_of(verdict.correct),
                expected: classification.to_string(),
                mismatches: verdict.mismatches.iter().map(ToString::to_string).collect(),
            })
        }
        (round, _) => Err(format!("Respuesta no válida para {}.", round_kind(round))),
    }
}

fn help(session: &Session) -> Signal {
    let round = session.screen.as_ref().and_then(|s| s.round.as_ref());
    let item = match round {
        Some(Round::Recognize(item))
        | Some(Round::Produce { item, .. })
        | Some(Round::Classify { item, .. }) => item,
        Some(_) => return Signal::Notice("No hay ayuda para este modo.".into()),
        None => return Signal::Notice("No hay ninguna pregunta activa.".into()),
    };

    let person_number = [item.person.as_deref(), item.number.as_deref()]
        .into_iter()
        .filter_map(non_empty)
        .collect::<Vec<_>>()
        .join(" ");
    let fields = [
        ("Forma", Some(item.form.as_str())),
        ("Verbo", item.verb.as_deref()),
        ("Pronombre", item.pronoun.as_deref()),
        ("Modo", item.mood.as_deref()),
        ("Grupo", item.conjugation_class.as_deref()),
        ("Tipo", item.tense.as_deref()),
        ("Persona/Número", Some(person_number.as_str())),
    ];
    Signal::Help(
        fields
            .into_iter()
            .filter_map(|(label, value)| {
                non_empty(value).map(|value| HelpLine {
                    label,
                    value: value.to_string(),
                })
            })
            .collect(),
    )
}

fn round_kind(round: &Round) -> &'static str {
    match round {
        Round::Spelling(_) => "ortografía (escribe b o v)",
        Round::Device(_) => "recursos literarios (escribe el recurso)",
        Round::Recognize(_) => "reconocer (completa los rasgos)",
        Round::Produce { .. } => "producir (escribe la forma)",
        Round::Classify { .. } => "clasificar (elige modo y tiempo)",
    }
}

fn outcome_of(correct: bool) -> GradeOutcome {
    if correct {
        GradeOutcome::Correct
    } else {
        GradeOutcome::Incorrect
    }
}

fn no_answer(expected: String) -> Feedback {
    Feedback {
        outcome: GradeOutcome::NoAnswerGiven,
        expected,
        mismatches: Vec::new(),
    }
}

fn describe_facets(facets: &FacetMap) -> String {
    facets
        .iter()
        .map(|(facet, value)| format!("{facet}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BvLetter;
    use crate::tense::{ExactTense, TimeGroup};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(session: Session, msg: Msg, catalog: &Catalog) -> (Session, Vec<Signal>) {
        let mut rng = StdRng::seed_from_u64(42);
        update(session, msg, catalog, &mut rng, &SessionConfig::default())
    }

    fn feedback(signals: &[Signal]) -> &Feedback {
        signals
            .iter()
            .find_map(|s| match s {
                Signal::Feedback(f) => Some(f),
                _ => None,
            })
            .expect("no feedback signal")
    }

    fn prompt(signals: &[Signal]) -> &PromptView {
        signals
            .iter()
            .find_map(|s| match s {
                Signal::Prompt(p) => Some(p),
                _ => None,
            })
            .expect("no prompt signal")
    }

    fn has_notice(signals: &[Signal]) -> bool {
        signals.iter().any(|s| matches!(s, Signal::Notice(_)))
    }

    fn buscar() -> Catalog {
        Catalog {
            spelling: vec![SpellingItem {
                word: Some("buscar".into()),
                pattern: "_uscar".into(),
                blank: 0,
                expected: Some(BvLetter::B),
            }],
            ..Default::default()
        }
    }

    fn haya_cantado() -> ConjugationItem {
        ConjugationItem {
            sentence: Some("Ojalá haya cantado bien.".into()),
            form: "haya cantado".into(),
            verb: Some("cantar".into()),
            pronoun: Some("él".into()),
            mood: Some("Subjuntivo".into()),
            tense: Some("Pretérito perfecto compuesto".into()),
            person: Some("3".into()),
            number: Some("singular".into()),
            ..Default::default()
        }
    }

    #[test]
    fn spelling_round_wrong_letter() {
        let catalog = buscar();
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Spelling), &catalog);
        assert_eq!(prompt(&signals).text, "_uscar");

        let (session, signals) = run(session, Msg::Submit(Answer::Text("v".into())), &catalog);
        let fb = feedback(&signals);
        assert_eq!(fb.outcome, GradeOutcome::Incorrect);
        assert_eq!(fb.expected, "buscar");
        assert_eq!(session.score.snapshot(), ScoreSnapshot { correct: 0, total: 1 });
        assert!(signals.contains(&Signal::Score(ScoreSnapshot { correct: 0, total: 1 })));
    }

    #[test]
    fn round_locks_after_grading() {
        let catalog = buscar();
        let (session, _) = run(Session::default(), Msg::Open(Mode::Spelling), &catalog);
        let (session, _) = run(session, Msg::Submit(Answer::Text("b".into())), &catalog);
        let (session, signals) = run(session, Msg::Submit(Answer::Text("b".into())), &catalog);

        assert!(has_notice(&signals));
        assert_eq!(session.score.snapshot(), ScoreSnapshot { correct: 1, total: 1 });

        let (session, _) = run(session, Msg::Next, &catalog);
        let (session, _) = run(session, Msg::Submit(Answer::Text("b".into())), &catalog);
        assert_eq!(session.score.snapshot(), ScoreSnapshot { correct: 2, total: 2 });
    }

    #[test]
    fn empty_answer_is_not_scored_and_keeps_round_open() {
        let catalog = buscar();
        let (session, _) = run(Session::default(), Msg::Open(Mode::Spelling), &catalog);
        let (session, signals) = run(session, Msg::Submit(Answer::Text("  ".into())), &catalog);

        assert_eq!(feedback(&signals).outcome, GradeOutcome::NoAnswerGiven);
        assert_eq!(session.score.snapshot().total, 0);
        assert!(!session.screen.as_ref().unwrap().locked);
    }

    #[test]
    fn device_round_reveals_answer() {
        let catalog = Catalog {
            devices: vec![DeviceItem {
                prompt: "Sus ojos eran dos luceros".into(),
                answer: "Metáfora".into(),
                options: vec!["Símil".into(), "Metáfora".into()],
            }],
            ..Default::default()
        };
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Devices), &catalog);
        assert_eq!(prompt(&signals).options.len(), 2);

        let (session, signals) = run(session, Msg::Submit(Answer::Text("Símil".into())), &catalog);
        let fb = feedback(&signals);
        assert_eq!(fb.outcome, GradeOutcome::Incorrect);
        assert_eq!(fb.expected, "Metáfora");
        assert_eq!(session.score.snapshot(), ScoreSnapshot { correct: 0, total: 1 });
    }

    #[test]
    fn classify_round_grades_each_level() {
        let catalog = Catalog {
            conjugations: vec![haya_cantado()],
            ..Default::default()
        };
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Classify), &catalog);
        assert_eq!(prompt(&signals).options, vec!["Indicativo", "Subjuntivo", "Imperativo"]);

        let selection = TenseSelection {
            mood: Some(Mood::Subjunctive),
            group: Some(TimeGroup::Preterite),
            exact: Some(ExactTense::SimplePerfect),
        };
        let (session, signals) = run(session, Msg::Submit(Answer::Tense(selection)), &catalog);
        let fb = feedback(&signals);
        assert_eq!(fb.outcome, GradeOutcome::Incorrect);
        assert_eq!(fb.mismatches, vec!["Tiempo exacto"]);
        assert_eq!(session.score.snapshot().total, 1);
    }

    #[test]
    fn classify_reports_unclassifiable_data() {
        let catalog = Catalog {
            conjugations: vec![ConjugationItem {
                form: "canto".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Classify), &catalog);
        assert!(has_notice(&signals));
        assert!(session.screen.unwrap().round.is_none());
    }

    #[test]
    fn produce_round_accepts_pronoun_form() {
        let catalog = Catalog {
            conjugations: vec![haya_cantado()],
            ..Default::default()
        };
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Produce), &catalog);
        let view = prompt(&signals);
        assert_eq!(
            view.text,
            "3ª persona singular del pretérito perfecto compuesto de subjuntivo de “cantar”"
        );
        assert_eq!(view.context.as_deref(), Some("Ojalá ____ bien."));

        let (_, signals) = run(session, Msg::Submit(Answer::Text("Él haya cantado".into())), &catalog);
        assert_eq!(feedback(&signals).outcome, GradeOutcome::Correct);
    }

    #[test]
    fn produce_round_without_tense_metadata() {
        let catalog = Catalog {
            conjugations: vec![ConjugationItem {
                sentence: Some("Ayer yo cantaba una canción".into()),
                form: "cantaba".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Produce), &catalog);
        let view = prompt(&signals);
        assert_eq!(view.text, "Escribe la forma verbal que falta");
        assert_eq!(view.context.as_deref(), Some("Ayer yo ____ una canción"));

        let (session, signals) = run(session, Msg::Submit(Answer::Text("Cantaba ".into())), &catalog);
        let fb = feedback(&signals);
        assert_eq!(fb.outcome, GradeOutcome::Correct);
        assert_eq!(fb.expected, "cantaba");
        assert_eq!(session.score.snapshot(), ScoreSnapshot { correct: 1, total: 1 });
    }

    #[test]
    fn produce_instruction_without_classification_names_the_verb() {
        let item = ConjugationItem {
            form: "cantaba".into(),
            verb: Some("cantar".into()),
            ..Default::default()
        };
        assert_eq!(produce_instruction(&item, None), "Forma de “cantar”");

        let item = ConjugationItem {
            person: Some("1".into()),
            number: Some("Singular".into()),
            ..item
        };
        assert_eq!(produce_instruction(&item, None), "1ª persona singular de “cantar”");
    }

    #[test]
    fn masking_matches_whole_words_loosely() {
        let item = |sentence: &str, form: &str| ConjugationItem {
            sentence: Some(sentence.into()),
            form: form.into(),
            ..Default::default()
        };
        assert_eq!(
            masked_sentence(&item("Cantaba sin parar.", "cantaba")).as_deref(),
            Some("____ sin parar.")
        );
        assert_eq!(
            masked_sentence(&item("La cantora dijo: «canto».", "canto")).as_deref(),
            Some("La cantora dijo: «____».")
        );
        assert_eq!(masked_sentence(&item("La cantora llegó.", "canto")), None);
        assert_eq!(
            masked_sentence(&item("¡Ojalá hayas venido!", "hayas venido")).as_deref(),
            Some("¡Ojalá ____!")
        );
    }

    #[test]
    fn produce_reveals_pronoun_form() {
        let catalog = Catalog {
            conjugations: vec![haya_cantado()],
            ..Default::default()
        };
        let (session, _) = run(Session::default(), Msg::Open(Mode::Produce), &catalog);
        let (_, signals) = run(session, Msg::Submit(Answer::Text("hubiera cantado".into())), &catalog);
        let fb = feedback(&signals);
        assert_eq!(fb.outcome, GradeOutcome::Incorrect);
        assert_eq!(fb.expected, "“él haya cantado” (o solo “haya cantado”)");
    }

    #[test]
    fn recognize_without_facets_is_a_notice() {
        let catalog = Catalog {
            conjugations: vec![ConjugationItem {
                form: "canto".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Recognize), &catalog);
        assert!(has_notice(&signals));
        assert!(!signals.iter().any(|s| matches!(s, Signal::Prompt(_))));
        assert!(session.screen.unwrap().round.is_none());
    }

    #[test]
    fn help_lists_item_metadata() {
        let catalog = Catalog {
            conjugations: vec![haya_cantado()],
            ..Default::default()
        };
        let (session, _) = run(Session::default(), Msg::Open(Mode::Produce), &catalog);
        let (session, signals) = run(session, Msg::Help, &catalog);
        let Signal::Help(lines) = &signals[0] else {
            panic!("expected help, got {signals:?}");
        };
        let labels: Vec<&str> = lines.iter().map(|l| l.label).collect();
        assert_eq!(
            labels,
            vec!["Forma", "Verbo", "Pronombre", "Modo", "Tipo", "Persona/Número"]
        );
        assert_eq!(lines[5].value, "3 singular");
        assert!(!session.screen.unwrap().locked);

        let spelling = buscar();
        let (session, _) = run(Session::default(), Msg::Open(Mode::Spelling), &spelling);
        let (_, signals) = run(session, Msg::Help, &spelling);
        assert!(has_notice(&signals));
    }

    #[test]
    fn recognize_round_skips_missing_facets() {
        let catalog = Catalog {
            conjugations: vec![haya_cantado()],
            ..Default::default()
        };
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Recognize), &catalog);
        assert!(!prompt(&signals).facets.contains(&Facet::Voice));

        let selected: FacetMap = haya_cantado().facets();
        let (_, signals) = run(session, Msg::Submit(Answer::Facets(selected)), &catalog);
        assert_eq!(feedback(&signals).outcome, GradeOutcome::Correct);
    }

    #[test]
    fn wrong_answer_kind_is_a_notice() {
        let catalog = buscar();
        let (session, _) = run(Session::default(), Msg::Open(Mode::Spelling), &catalog);
        let (session, signals) = run(
            session,
            Msg::Submit(Answer::Tense(TenseSelection::default())),
            &catalog,
        );
        assert!(has_notice(&signals));
        assert_eq!(session.score.snapshot().total, 0);
    }

    #[test]
    fn empty_category_yields_notice() {
        let (session, signals) = run(Session::default(), Msg::Open(Mode::Devices), &Catalog::default());
        assert_eq!(
            signals,
            vec![Signal::Notice("no items available for recursos".into())]
        );
        let (_, signals) = run(session, Msg::Submit(Answer::Text("x".into())), &Catalog::default());
        assert!(has_notice(&signals));
    }

    #[test]
    fn reset_score() {
        let session = Session::new(ScoreTracker::from_snapshot(ScoreSnapshot { correct: 3, total: 4 }));
        let (session, signals) = run(session, Msg::ResetScore, &Catalog::default());
        assert_eq!(session.score.snapshot(), ScoreSnapshot::default());
        assert_eq!(signals, vec![Signal::Score(ScoreSnapshot::default())]);
    }

    #[test]
    fn mode_parse() {
        assert_eq!("Clasificar".parse::<Mode>().unwrap(), Mode::Classify);
        assert_eq!("bv".parse::<Mode>().unwrap(), Mode::Spelling);
        assert!("poesia".parse::<Mode>().is_err());
        assert_eq!(Mode::Produce.category(), Category::Conjugation);
    }
}
