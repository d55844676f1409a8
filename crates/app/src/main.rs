use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use quiz_core::model::{Exercise, RoundResult, SessionSettings};
use quiz_core::time::format_elapsed;
use quiz_core::{Clock, SessionSummary};
use serde::Deserialize;
use services::{
    RoundPhase, RoundSnapshot, RoundUpdate, SessionLoopService, SessionObserver, SessionService,
    SessionStatus, TickOutcome,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeconds { flag: &'static str, raw: String },
    MissingExercises,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeconds { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::MissingExercises => {
                write!(f, "no exercise file given (--exercises or QUIZ_EXERCISES)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_seconds(raw: String, flag: &'static str) -> Result<u32, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidSeconds { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --exercises <file.json> [--answer-secs <n>] [--reveal-secs <n>] [--shuffle]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --answer-secs 10");
    eprintln!("  --reveal-secs 5");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_EXERCISES, QUIZ_ANSWER_SECS, QUIZ_REVEAL_SECS, RUST_LOG");
    eprintln!();
    eprintln!("While playing, type choice numbers (e.g. `2` or `1,3`) and press enter; `q` quits.");
}

// ─── ARGS ──────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Args {
    exercises: PathBuf,
    answer_secs: Option<u32>,
    reveal_secs: Option<u32>,
    shuffle: bool,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut exercises = env("QUIZ_EXERCISES").map(PathBuf::from);
        let mut answer_secs = env("QUIZ_ANSWER_SECS")
            .map(|raw| parse_seconds(raw, "QUIZ_ANSWER_SECS"))
            .transpose()?;
        let mut reveal_secs = env("QUIZ_REVEAL_SECS")
            .map(|raw| parse_seconds(raw, "QUIZ_REVEAL_SECS"))
            .transpose()?;
        let mut shuffle = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--exercises" => {
                    exercises = Some(PathBuf::from(require_value(args, "--exercises")?));
                }
                "--answer-secs" => {
                    let value = require_value(args, "--answer-secs")?;
                    answer_secs = Some(parse_seconds(value, "--answer-secs")?);
                }
                "--reveal-secs" => {
                    let value = require_value(args, "--reveal-secs")?;
                    reveal_secs = Some(parse_seconds(value, "--reveal-secs")?);
                }
                "--shuffle" => shuffle = true,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let exercises = exercises.ok_or(ArgsError::MissingExercises)?;
        Ok(Some(Self {
            exercises,
            answer_secs,
            reveal_secs,
            shuffle,
        }))
    }

    fn settings(&self) -> Result<SessionSettings, quiz_core::model::SettingsError> {
        let defaults = SessionSettings::default();
        SessionSettings::new(
            self.answer_secs.unwrap_or(defaults.answering_secs()),
            self.reveal_secs.unwrap_or(defaults.reveal_secs()),
            self.shuffle,
        )
    }
}

// ─── EXERCISE FILE ─────────────────────────────────────────────────────────────

/// Lesson object wrapping the exercise list.
#[derive(Deserialize)]
struct Lesson {
    exercises: Vec<Exercise>,
}

/// Accepts a bare array of exercises or a `{ "exercises": [...] }` lesson.
fn parse_exercises(raw: &str) -> Result<Vec<Exercise>, serde_json::Error> {
    if raw.trim_start().starts_with('[') {
        serde_json::from_str(raw)
    } else {
        serde_json::from_str::<Lesson>(raw).map(|lesson| lesson.exercises)
    }
}

fn load_exercises(path: &Path) -> Result<Vec<Exercise>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let exercises = parse_exercises(&raw)
        .map_err(|e| format!("invalid exercise file {}: {e}", path.display()))?;
    Ok(exercises)
}

// ─── INPUT ─────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Quit,
    Answer(Vec<usize>),
}

#[derive(Debug, PartialEq, Eq)]
struct InputError(String);

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a choice number: {}", self.0)
    }
}

/// Parses `1`, `1,3` or `1 3` into zero-based choice indices.
fn parse_input(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Ok(Input::Quit);
    }

    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(InputError(part.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Input::Answer)
}

// ─── CONSOLE ───────────────────────────────────────────────────────────────────

/// Prints countdown checkpoints, verdicts and the final score.
#[derive(Debug, Default)]
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_round_changed(&mut self, update: RoundUpdate) {
        if update.phase == RoundPhase::Answering
            && (1..=3).contains(&update.seconds_left)
        {
            println!("  {}...", update.seconds_left);
        }
    }

    fn on_round_concluded(&mut self, result: &RoundResult) {
        let verdict = if result.is_timeout() {
            "time's up"
        } else if result.is_correct {
            "correct"
        } else {
            "incorrect"
        };
        println!("  -> {verdict} ({}s)", result.seconds_spent);
    }

    fn on_session_completed(&mut self, results: &[RoundResult], summary: &SessionSummary) {
        println!();
        println!(
            "Score: {}/{} ({}%) in {}",
            summary.correct_count,
            summary.total_count,
            summary.percentage,
            format_elapsed(summary.total_seconds_elapsed)
        );
        println!("{}", summary.tier.message());
        tracing::debug!(rounds = results.len(), "results delivered");
    }
}

fn render_question(snapshot: &RoundSnapshot) {
    println!();
    println!(
        "Question {}/{}: {}",
        snapshot.index + 1,
        snapshot.total,
        snapshot.question
    );
    if !snapshot.playable {
        println!("  (this question has no readable choices)");
    }
    for (i, choice) in snapshot.choices.iter().enumerate() {
        println!("  {}. {choice}", i + 1);
    }
    println!("  [{}s]", snapshot.seconds_left);
}

fn render_reveal(snapshot: &RoundSnapshot) {
    let Some(correct) = snapshot.correct_answers.as_ref() else {
        return;
    };
    let labels: Vec<String> = correct
        .iter()
        .filter_map(|&i| snapshot.choices.get(i).map(|text| format!("{}. {text}", i + 1)))
        .collect();
    if !labels.is_empty() {
        println!("  answer: {}", labels.join(", "));
    }
}

// ─── LOOP ──────────────────────────────────────────────────────────────────────

/// Drives `session` with a one-second ticker and answers read from `input`
/// until it ends. Resolving `shutdown` cancels the session.
async fn play(
    session: &mut SessionService,
    input: impl AsyncBufRead + Unpin,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately.
    ticker.tick().await;

    let mut lines = input.lines();
    let mut stdin_open = true;
    tokio::pin!(shutdown);
    let mut interrupted = false;

    if let Some(snapshot) = session.snapshot() {
        render_question(&snapshot);
    }

    while session.status() == SessionStatus::InProgress {
        let scheduled = session.current_index();

        tokio::select! {
            _ = ticker.tick() => {
                let Some(index) = scheduled else { break };
                match session.tick_round(index) {
                    TickOutcome::TimedOut(_) => {
                        if let Some(snapshot) = session.snapshot() {
                            render_reveal(&snapshot);
                        }
                    }
                    TickOutcome::Advanced { .. } => {
                        if let Some(snapshot) = session.snapshot() {
                            render_question(&snapshot);
                        }
                    }
                    _ => {}
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                match parse_input(&line) {
                    Ok(Input::Empty) => {}
                    Ok(Input::Quit) => {
                        session.cancel();
                        println!("Session abandoned.");
                    }
                    Ok(Input::Answer(selection)) => match session.submit_answer(selection) {
                        Ok(_) => {
                            if let Some(snapshot) = session.snapshot() {
                                render_reveal(&snapshot);
                            }
                        }
                        Err(err) => println!("  ({err})"),
                    },
                    Err(err) => println!("  ({err})"),
                }
            }
            () = &mut shutdown, if !interrupted => {
                interrupted = true;
                session.cancel();
                println!();
                println!("Session abandoned.");
            }
        }
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let Some(args) = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let settings = args.settings()?;
    let exercises = load_exercises(&args.exercises)?;
    tracing::info!(
        file = %args.exercises.display(),
        exercises = exercises.len(),
        "exercise file loaded"
    );

    let session_loop = SessionLoopService::new(settings, Clock::system());
    let mut session = session_loop.start_session_with_observer(exercises, ConsoleObserver)?;

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal support: play until the session ends on its own.
            std::future::pending::<()>().await;
        }
    };
    play(&mut session, BufReader::new(tokio::io::stdin()), shutdown).await?;

    if let Some(report) = session.report() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info,quiz_core=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

// ─── TESTS ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Choice, ExerciseId};
    use quiz_core::time::fixed_clock;
    use std::collections::HashMap;
    use std::io::Write;

    fn parse(argv: &[&str], env: &[(&str, &str)]) -> Result<Option<Args>, ArgsError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut iter = argv.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter, |key| env.get(key).cloned())
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["--answer-secs", "20", "--exercises", "b.json", "--shuffle"],
            &[("QUIZ_EXERCISES", "a.json"), ("QUIZ_ANSWER_SECS", "15"), ("QUIZ_REVEAL_SECS", "3")],
        )
        .unwrap()
        .unwrap();

        assert_eq!(args.exercises, PathBuf::from("b.json"));
        let settings = args.settings().unwrap();
        assert_eq!(settings.answering_secs(), 20);
        assert_eq!(settings.reveal_secs(), 3);
        assert!(settings.shuffle_rounds());
    }

    #[test]
    fn missing_exercise_file_is_an_error() {
        assert!(matches!(parse(&[], &[]), Err(ArgsError::MissingExercises)));
        assert!(matches!(
            parse(&["--exercises"], &[]),
            Err(ArgsError::MissingValue { flag: "--exercises" })
        ));
        assert!(matches!(parse(&["--help"], &[]), Ok(None)));
    }

    #[test]
    fn out_of_range_seconds_fail_validation() {
        let args = parse(&["--exercises", "x.json", "--reveal-secs", "0"], &[])
            .unwrap()
            .unwrap();
        assert!(args.settings().is_err());
        assert!(matches!(
            parse(&["--answer-secs", "ten"], &[]),
            Err(ArgsError::InvalidSeconds { flag: "--answer-secs", .. })
        ));
    }

    #[test]
    fn input_is_one_based() {
        assert_eq!(parse_input("2"), Ok(Input::Answer(vec![1])));
        assert_eq!(parse_input(" 1, 3 "), Ok(Input::Answer(vec![0, 2])));
        assert_eq!(parse_input("1 2"), Ok(Input::Answer(vec![0, 1])));
        assert_eq!(parse_input(""), Ok(Input::Empty));
        assert_eq!(parse_input("Q"), Ok(Input::Quit));
        assert_eq!(parse_input("0"), Err(InputError("0".into())));
        assert!(parse_input("a").is_err());
    }

    #[test]
    fn loads_wrapped_and_bare_exercise_files() {
        let bare = r#"[
            {"id": 1, "type": "MULTIPLE_CHOICE", "question": "2 + 2?",
             "choices": "{\"choices\":[{\"text\":\"4\",\"isCorrect\":true},{\"text\":\"5\",\"isCorrect\":false}]}"},
            {"id": 2, "type": "CODING", "question": "fizzbuzz"}
        ]"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bare.as_bytes()).unwrap();
        let exercises = load_exercises(file.path()).unwrap();
        assert_eq!(exercises.len(), 2);
        assert!(exercises[0].is_gradable());
        assert_eq!(exercises[0].choices().len(), 2);

        let wrapped = format!(r#"{{ "exercises": {bare} }}"#);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(wrapped.as_bytes()).unwrap();
        assert_eq!(load_exercises(file.path()).unwrap().len(), 2);
    }

    #[test]
    fn unreadable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_exercises(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn bad_entry_error_names_the_field() {
        let missing_type = r#"[{"id": 1, "question": "?"}]"#;
        let err = parse_exercises(missing_type).unwrap_err();
        assert!(err.to_string().contains("missing field `type`"), "{err}");

        let wrapped = r#"{ "exercises": [{"id": [1], "type": "CODING"}] }"#;
        let err = parse_exercises(wrapped).unwrap_err();
        assert!(err.to_string().contains("exercise id"), "{err}");
    }

    #[test]
    fn mixed_id_shapes_load() {
        let raw = r#"[
            {"id": "3f2a-uuid", "type": "MULTIPLE_CHOICE", "question": "?"},
            {"id": 4, "type": "CODING", "question": "?"}
        ]"#;
        let exercises = parse_exercises(raw).unwrap();
        assert_eq!(exercises[0].id, ExerciseId::named("3f2a-uuid"));
        assert_eq!(exercises[1].id, ExerciseId::new(4));
    }

    fn one_round() -> SessionService {
        let settings = SessionSettings::new(10, 1, false).unwrap();
        SessionLoopService::new(settings, fixed_clock())
            .start_session(vec![Exercise::multiple_choice(
                ExerciseId::new(1),
                "pick A",
                &[Choice::correct("A"), Choice::incorrect("B")],
            )])
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn typed_answer_plays_the_round_to_completion() {
        let mut session = one_round();
        play(&mut session, &b"1\n"[..], std::future::pending())
            .await
            .unwrap();

        assert!(session.is_complete());
        assert!(session.results()[0].is_correct);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_the_session() {
        let mut session = one_round();
        play(&mut session, tokio::io::empty(), std::future::ready(()))
            .await
            .unwrap();

        assert_eq!(session.status(), SessionStatus::Cancelled);
        assert!(session.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_between_ticks_is_not_lost() {
        let mut session = one_round();
        let shutdown = tokio::time::sleep(Duration::from_millis(2500));
        play(&mut session, tokio::io::empty(), shutdown)
            .await
            .unwrap();

        assert_eq!(session.status(), SessionStatus::Cancelled);
        assert_eq!(session.total_seconds_elapsed(), 2);
        assert!(session.results().is_empty());
    }
}
