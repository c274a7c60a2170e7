//! The `lengua play` command.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lengua_core::grading::GradeOutcome;
use lengua_core::model::FacetMap;
use lengua_core::repository::Catalog;
use lengua_core::score::{JsonFileStore, KeyValueStore, ScoreSnapshot, ScoreStore};
use lengua_core::session::{
    update, Answer, Feedback, Mode, Msg, PromptView, Session, SessionConfig, Signal,
};
use lengua_core::tense::{exact_options, group_options, Mood, TenseSelection};
use lengua_loader::config::{create_sources, load_config_from};
use lengua_loader::load_catalog;

pub async fn execute(
    mode: Mode,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    rounds: Option<usize>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let sources = create_sources(&config)?;
    let outcome = load_catalog(&sources, config.timeout()).await;

    for report in &outcome.reports {
        if let Some(e) = &report.error {
            eprintln!(
                "Warning: {} unavailable ({}): {e}",
                report.category, report.location
            );
        }
    }

    let score_path = config.score_path();
    tracing::debug!(
        %mode,
        items = outcome.catalog.len(mode.category()),
        score = %score_path.display(),
        "starting session"
    );

    let store = ScoreStore::new(JsonFileStore::new(score_path));
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut player = Player::new(
        &outcome.catalog,
        config.session_config(),
        rng,
        store,
        stdout.lock(),
    );
    player.run(mode, rounds, &mut stdin.lock())
}

/// Loop commands typed instead of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Next,
    Reset,
    Help,
    /// `:q` or end of input.
    Quit,
}

enum Input {
    Text(String),
    Control(Control),
}

enum Reply {
    Answer(Answer),
    Control(Control),
}

/// Drives a session from line-based input and renders its signals.
struct Player<'a, S, W> {
    session: Session,
    catalog: &'a Catalog,
    config: SessionConfig,
    rng: StdRng,
    store: ScoreStore<S>,
    out: W,
    prompt: Option<PromptView>,
    graded: usize,
}

impl<'a, S: KeyValueStore, W: Write> Player<'a, S, W> {
    fn new(
        catalog: &'a Catalog,
        config: SessionConfig,
        rng: StdRng,
        store: ScoreStore<S>,
        out: W,
    ) -> Self {
        let session = Session::new(store.load());
        Self {
            session,
            catalog,
            config,
            rng,
            store,
            out,
            prompt: None,
            graded: 0,
        }
    }

    fn run<R: BufRead>(&mut self, mode: Mode, rounds: Option<usize>, input: &mut R) -> Result<()> {
        writeln!(
            self.out,
            "Modo {mode}. Escribe tu respuesta; :n siguiente, :h ayuda, :r reiniciar puntuación, :q salir."
        )?;
        self.dispatch(Msg::Open(mode))?;

        loop {
            if rounds.is_some_and(|limit| self.graded >= limit) || !self.has_round() {
                break;
            }

            match self.ask(input)? {
                Reply::Control(Control::Quit) => break,
                Reply::Control(Control::Next) => {
                    self.dispatch(Msg::Next)?;
                }
                Reply::Control(Control::Reset) => {
                    self.dispatch(Msg::ResetScore)?;
                }
                Reply::Control(Control::Help) => {
                    self.dispatch(Msg::Help)?;
                }
                Reply::Answer(answer) => {
                    if self.dispatch(Msg::Submit(answer))? {
                        self.graded += 1;
                        if rounds.map_or(true, |limit| self.graded < limit) {
                            self.dispatch(Msg::Next)?;
                        }
                    }
                }
            }
        }

        let snapshot = self.session.score.snapshot();
        writeln!(self.out, "\nPuntuación final: {}", score_line(&snapshot))?;
        Ok(())
    }

    fn has_round(&self) -> bool {
        self.session
            .screen
            .as_ref()
            .is_some_and(|screen| screen.round.is_some())
    }

    /// Feed one message to the session. Returns whether an answer was graded.
    fn dispatch(&mut self, msg: Msg) -> Result<bool> {
        let session = std::mem::take(&mut self.session);
        let (session, signals) = update(session, msg, self.catalog, &mut self.rng, &self.config);
        self.session = session;

        let mut graded = false;
        for signal in signals {
            match signal {
                Signal::Prompt(view) => {
                    render_prompt(&mut self.out, &view)?;
                    self.prompt = Some(view);
                }
                Signal::Feedback(feedback) => {
                    graded |= feedback.outcome != GradeOutcome::NoAnswerGiven;
                    render_feedback(&mut self.out, &feedback)?;
                }
                Signal::Score(snapshot) => {
                    self.store.save(&snapshot);
                    writeln!(self.out, "Puntuación: {}", score_line(&snapshot))?;
                }
                Signal::Help(lines) => {
                    for line in lines {
                        writeln!(self.out, "  {}: {}", line.label, line.value)?;
                    }
                }
                Signal::Notice(message) => writeln!(self.out, "{message}")?,
            }
        }
        Ok(graded)
    }

    fn ask<R: BufRead>(&mut self, input: &mut R) -> Result<Reply> {
        let Some(view) = self.prompt.clone() else {
            return Ok(Reply::Control(Control::Quit));
        };

        match view.mode {
            Mode::Spelling | Mode::Devices | Mode::Produce => {
                let label = if view.mode == Mode::Spelling { "b/v" } else { "" };
                Ok(match self.read(input, label)? {
                    Input::Text(text) => Reply::Answer(Answer::Text(text)),
                    Input::Control(c) => Reply::Control(c),
                })
            }
            Mode::Recognize if view.facets.is_empty() => Ok(match self.read(input, "")? {
                Input::Control(c) => Reply::Control(c),
                Input::Text(_) => Reply::Control(Control::Next),
            }),
            Mode::Recognize => {
                let mut selected = FacetMap::new();
                for facet in view.facets {
                    match self.read(input, facet.label())? {
                        Input::Text(text) => {
                            if !text.trim().is_empty() {
                                selected.insert(facet, text);
                            }
                        }
                        Input::Control(c) => return Ok(Reply::Control(c)),
                    }
                }
                Ok(Reply::Answer(Answer::Facets(selected)))
            }
            Mode::Classify => self.ask_tense(input),
        }
    }

    /// Ask mood, then time group, then exact tense, offering only the
    /// choices that fit the previous step.
    fn ask_tense<R: BufRead>(&mut self, input: &mut R) -> Result<Reply> {
        let mut selection = TenseSelection::default();

        let mood = match self.choose(input, "Modo", &Mood::ALL)? {
            Ok(Some(mood)) => mood,
            Ok(None) => return Ok(Reply::Answer(Answer::Tense(selection))),
            Err(c) => return Ok(Reply::Control(c)),
        };
        selection.mood = Some(mood);

        let group = match self.choose(input, "Tiempo", group_options(mood))? {
            Ok(Some(group)) => group,
            Ok(None) => return Ok(Reply::Answer(Answer::Tense(selection))),
            Err(c) => return Ok(Reply::Control(c)),
        };
        selection.group = Some(group);

        match self.choose(input, "Tiempo exacto", exact_options(mood, group))? {
            Ok(exact) => selection.exact = exact,
            Err(c) => return Ok(Reply::Control(c)),
        }
        Ok(Reply::Answer(Answer::Tense(selection)))
    }

    /// Offer numbered options until one is picked or the line is empty.
    fn choose<R, T>(
        &mut self,
        input: &mut R,
        label: &str,
        options: &[T],
    ) -> Result<std::result::Result<Option<T>, Control>>
    where
        R: BufRead,
        T: Copy + PartialEq + Display + FromStr,
    {
        if let [only] = options {
            writeln!(self.out, "{label}: {only}")?;
            return Ok(Ok(Some(*only)));
        }

        for (i, option) in options.iter().enumerate() {
            writeln!(self.out, "  {}) {option}", i + 1)?;
        }
        loop {
            match self.read(input, label)? {
                Input::Control(c) => return Ok(Err(c)),
                Input::Text(text) if text.trim().is_empty() => return Ok(Ok(None)),
                Input::Text(text) => match pick(&text, options) {
                    Some(choice) => return Ok(Ok(Some(choice))),
                    None => writeln!(self.out, "Opción no válida: {}", text.trim())?,
                },
            }
        }
    }

    fn read<R: BufRead>(&mut self, input: &mut R, label: &str) -> Result<Input> {
        if label.is_empty() {
            write!(self.out, "> ")?;
        } else {
            write!(self.out, "{label} > ")?;
        }
        self.out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Input::Control(Control::Quit));
        }

        Ok(match line.trim() {
            ":q" => Input::Control(Control::Quit),
            ":n" => Input::Control(Control::Next),
            ":r" => Input::Control(Control::Reset),
            ":h" => Input::Control(Control::Help),
            _ => Input::Text(line.trim_end_matches(['\n', '\r']).to_string()),
        })
    }
}

/// Resolve a typed choice: a 1-based number or the option's name.
fn pick<T: Copy + PartialEq + FromStr>(text: &str, options: &[T]) -> Option<T> {
    if let Ok(n) = text.trim().parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    text.parse::<T>().ok().filter(|choice| options.contains(choice))
}

fn score_line(snapshot: &ScoreSnapshot) -> String {
    format!(
        "{}/{} ({:.0}%)",
        snapshot.correct,
        snapshot.total,
        snapshot.accuracy()
    )
}

fn render_prompt<W: Write>(out: &mut W, view: &PromptView) -> io::Result<()> {
    writeln!(out, "\n[{}] {}", view.mode, view.text)?;
    if let Some(context) = &view.context {
        writeln!(out, "  {context}")?;
    }
    if view.mode != Mode::Classify {
        for (i, option) in view.options.iter().enumerate() {
            writeln!(out, "  {}) {option}", i + 1)?;
        }
    }
    Ok(())
}

fn render_feedback<W: Write>(out: &mut W, feedback: &Feedback) -> io::Result<()> {
    match feedback.outcome {
        GradeOutcome::Correct => writeln!(out, "¡Correcto! {}", feedback.expected),
        GradeOutcome::Incorrect => {
            writeln!(out, "Incorrecto. Respuesta: {}", feedback.expected)?;
            if !feedback.mismatches.is_empty() {
                writeln!(out, "  Fallos: {}", feedback.mismatches.join(", "))?;
            }
            Ok(())
        }
        GradeOutcome::NoAnswerGiven => writeln!(out, "Escribe una respuesta."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lengua_core::model::{BvLetter, ConjugationItem, SpellingItem};
    use lengua_core::score::MemoryStore;
    use lengua_core::tense::TimeGroup;
    use std::io::Cursor;

    fn catalog() -> Catalog {
        Catalog {
            spelling: vec![SpellingItem {
                word: Some("buscar".into()),
                pattern: "_uscar".into(),
                blank: 0,
                expected: Some(BvLetter::B),
            }],
            conjugations: vec![ConjugationItem {
                form: "habremos comido".into(),
                verb: Some("comer".into()),
                mood: Some("Indicativo".into()),
                tense: Some("Futuro compuesto".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn play(mode: Mode, rounds: Option<usize>, input: &str) -> (String, ScoreSnapshot) {
        play_with(&catalog(), mode, rounds, input)
    }

    fn play_with(
        catalog: &Catalog,
        mode: Mode,
        rounds: Option<usize>,
        input: &str,
    ) -> (String, ScoreSnapshot) {
        let mut out = Vec::new();
        let snapshot = {
            let mut player = Player::new(
                catalog,
                SessionConfig::default(),
                StdRng::seed_from_u64(1),
                ScoreStore::new(MemoryStore::default()),
                &mut out,
            );
            player.run(mode, rounds, &mut Cursor::new(input)).unwrap();
            player.session.score.snapshot()
        };
        (String::from_utf8(out).unwrap(), snapshot)
    }

    #[test]
    fn spelling_answers_are_scored() {
        let (out, score) = play(Mode::Spelling, None, "b\nv\n:q\n");
        assert!(out.contains("_uscar"));
        assert!(out.contains("¡Correcto!"));
        assert!(out.contains("Incorrecto. Respuesta: buscar"));
        assert_eq!(score, ScoreSnapshot { correct: 1, total: 2 });
    }

    #[test]
    fn empty_line_is_not_an_answer() {
        let (out, score) = play(Mode::Spelling, None, "\n");
        assert!(out.contains("Escribe una respuesta."));
        assert_eq!(score.total, 0);
    }

    #[test]
    fn rounds_limit_and_reset() {
        let (out, score) = play(Mode::Spelling, Some(1), ":r\nb\nb\n");
        assert!(out.contains("Puntuación: 0/0"));
        assert_eq!(score, ScoreSnapshot { correct: 1, total: 1 });
    }

    #[test]
    fn classify_step_by_step() {
        let (out, score) = play(Mode::Classify, Some(1), "indicativo\n3\n2\n");
        assert!(out.contains("habremos comido"));
        assert!(out.contains("¡Correcto!"));
        assert_eq!(score, ScoreSnapshot { correct: 1, total: 1 });
    }

    #[test]
    fn classify_invalid_option_is_asked_again() {
        let (out, score) = play(Mode::Classify, Some(1), "1\nayer\n1\n");
        assert!(out.contains("Opción no válida: ayer"));
        assert!(out.contains("Incorrecto."));
        assert_eq!(score.total, 1);
    }

    #[test]
    fn empty_category_ends_the_game() {
        let (out, score) = play(Mode::Devices, None, "");
        assert!(out.contains("no items available for recursos"));
        assert_eq!(score.total, 0);
    }

    #[test]
    fn recognize_without_facets_does_not_spin() {
        let catalog = Catalog {
            conjugations: vec![ConjugationItem {
                form: "canto".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let (out, score) = play_with(&catalog, Mode::Recognize, None, "");
        assert!(out.contains("nothing to recognize"));
        assert!(!out.contains("Escribe una respuesta."));
        assert_eq!(score.total, 0);
    }

    #[test]
    fn help_shows_item_metadata() {
        let (out, score) = play(Mode::Produce, Some(1), ":h
habremos comido
");
        assert!(out.contains("  Verbo: comer"));
        assert!(out.contains("  Tipo: Futuro compuesto"));
        assert!(out.contains("¡Correcto!"));
        assert_eq!(score, ScoreSnapshot { correct: 1, total: 1 });
    }

    #[test]
    fn pick_by_number_or_name() {
        let groups = group_options(Mood::Indicative);
        assert_eq!(pick("3", groups), Some(TimeGroup::Future));
        assert_eq!(pick("Futuro", groups), Some(TimeGroup::Future));
        assert_eq!(pick("9", groups), None);
        assert_eq!(pick("0", groups), None);
        assert_eq!(pick("Presente", group_options(Mood::Imperative)), Some(TimeGroup::Present));
    }
}
