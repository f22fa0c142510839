mod wizard;

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wizard::{RenderMode, WizardInput, WizardPresenter};
use wizard_spec::{
    AnswerSet, Answers, EngineError, HttpScorer, PredictionResult, Questionnaire, Scorer,
    ScorerConfig, USER_FACING_FAILURE, ValidationReport, WizardEngine, WizardView,
    answers_schema, validate_all,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const ENDPOINT_ENV: &str = "HEART_RISK_ENDPOINT";
const TIMEOUT_ENV: &str = "HEART_RISK_TIMEOUT_SECS";
const LOG_ENV: &str = "HEART_RISK_LOG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Step-by-step heart attack risk questionnaire",
    long_about = "Collects answers one question at a time, validates each step and sends the record to a scoring service"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer the questionnaire interactively.
    Run {
        /// Optional questionnaire JSON replacing the built-in catalog.
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
        #[command(flatten)]
        scorer: ScorerArgs,
        /// Print the answers as JSON and CBOR after a successful prediction.
        #[arg(long)]
        answers_json: bool,
        /// Render output mode for the wizard display.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Print the questionnaire as JSON.
    Catalog {
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
        /// Print the JSON schema of questionnaire files instead.
        #[arg(long, conflicts_with = "spec")]
        schema: bool,
    },
    /// Print the JSON schema of the scoring request body.
    Schema {
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
    },
    /// Validate a saved answers file.
    Validate {
        /// Answers JSON: a plain key/value object or an exported answer set.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
    },
    /// Validate a saved answers file and send it to the scoring service.
    Score {
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
        #[command(flatten)]
        scorer: ScorerArgs,
    },
}

#[derive(clap::Args)]
struct ScorerArgs {
    /// Scoring endpoint (defaults to HEART_RISK_ENDPOINT or http://localhost:8020/predict).
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,
    /// Request timeout in seconds (defaults to HEART_RISK_TIMEOUT_SECS; no timeout when unset).
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            spec,
            scorer,
            answers_json,
            format,
        } => run_wizard(spec, scorer, answers_json, format).await,
        Command::Catalog { spec, schema } => {
            if schema {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&Questionnaire::json_schema())?
                );
                return Ok(());
            }
            let questionnaire = load_questionnaire(spec.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&questionnaire)?);
            Ok(())
        }
        Command::Schema { spec } => {
            let questionnaire = load_questionnaire(spec.as_deref())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&answers_schema(&questionnaire))?
            );
            Ok(())
        }
        Command::Validate { answers, spec } => run_validate(&answers, spec.as_deref()),
        Command::Score {
            answers,
            spec,
            scorer,
        } => run_score(&answers, spec.as_deref(), scorer).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_questionnaire(path: Option<&Path>) -> CliResult<Questionnaire> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(Questionnaire::from_json(&contents)?)
        }
        None => Ok(Questionnaire::heart_risk()),
    }
}

fn resolve_scorer_config(args: &ScorerArgs) -> CliResult<ScorerConfig> {
    let mut config = ScorerConfig::default();
    if let Some(endpoint) = args
        .endpoint
        .clone()
        .or_else(|| env::var(ENDPOINT_ENV).ok())
        .filter(|endpoint| !endpoint.trim().is_empty())
    {
        config = config.with_endpoint(endpoint);
    }

    let timeout = match args.timeout_secs {
        Some(secs) => Some(secs),
        None => match env::var(TIMEOUT_ENV) {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| format!("{} must be a whole number of seconds", TIMEOUT_ENV))?,
            ),
            Err(_) => None,
        },
    };
    if let Some(secs) = timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    debug!(endpoint = %config.endpoint, timeout = ?config.timeout, "scorer configured");
    Ok(config)
}

fn load_answers(path: &Path, questionnaire: &Questionnaire) -> CliResult<Answers> {
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    let answers = if value.get("form_id").is_some() && value.get("answers").is_some() {
        let set: AnswerSet = serde_json::from_value(value)?;
        if set.form_id != questionnaire.id {
            warn!(
                expected = %questionnaire.id,
                found = %set.form_id,
                "answer set was exported from a different questionnaire"
            );
        }
        set.answers
    } else {
        serde_json::from_value(value)?
    };
    answers
        .conformed_to(questionnaire)
        .map_err(|(key, error)| format!("answer '{}' is invalid: {}", key, error).into())
}

fn run_validate(answers_path: &Path, spec_path: Option<&Path>) -> CliResult<()> {
    let questionnaire = load_questionnaire(spec_path)?;
    let answers = load_answers(answers_path, &questionnaire)?;
    let report = validate_all(&questionnaire, &answers);
    println!(
        "Validation result: {}",
        if report.valid { "valid" } else { "invalid" }
    );
    describe_validation(&report);

    if report.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(report: &ValidationReport) {
    if !report.errors.is_empty() {
        println!("Errors:");
        for error in &report.errors {
            println!("  {} - {}", error.key(), error);
        }
    }
    if !report.missing.is_empty() {
        println!("Missing answers: {}", report.missing.join(", "));
    }
    if !report.unknown.is_empty() {
        println!("Unknown answer fields: {}", report.unknown.join(", "));
    }
}

async fn run_score(
    answers_path: &Path,
    spec_path: Option<&Path>,
    scorer_args: ScorerArgs,
) -> CliResult<()> {
    let questionnaire = load_questionnaire(spec_path)?;
    let answers = load_answers(answers_path, &questionnaire)?;
    let report = validate_all(&questionnaire, &answers);
    if !report.valid {
        describe_validation(&report);
        return Err("validation failed".into());
    }

    let scorer = HttpScorer::new(resolve_scorer_config(&scorer_args)?)?;
    match scorer
        .score(&answers.to_request_body())
        .await
        .and_then(|response| response.checked())
    {
        Ok(response) => {
            print_result(&PredictionResult::from(response));
            Ok(())
        }
        Err(error) => {
            warn!(%error, "scoring failed");
            Err(USER_FACING_FAILURE.into())
        }
    }
}

fn print_result(result: &PredictionResult) {
    println!("Result: {}", result.verdict());
    println!("{}", result.summary());
    println!("Heart attack probability: {}", result.confidence_display());
}

async fn run_wizard(
    spec_path: Option<PathBuf>,
    scorer_args: ScorerArgs,
    answers_json: bool,
    format: RenderMode,
) -> CliResult<()> {
    let questionnaire = load_questionnaire(spec_path.as_deref())?;
    let scorer = HttpScorer::new(resolve_scorer_config(&scorer_args)?)?;
    let mut engine = WizardEngine::new(questionnaire, Arc::new(scorer))?;
    let mut presenter = WizardPresenter::new(format, answers_json);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let view = WizardView::from_engine(&engine);
        presenter.show_header(&view);
        presenter.show_view(&view);
        presenter.show_prompt(&view);
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                return if engine.result().is_some() {
                    Ok(())
                } else {
                    Err("input ended before a prediction was made".into())
                };
            }
        };

        let had_result = engine.result().is_some();
        if apply_input(&mut engine, WizardInput::parse(&line), &presenter).await? {
            return Ok(());
        }
        if !had_result && engine.result().is_some() {
            presenter.show_completion(&engine.answer_set());
        }
    }
}

/// Applies one prompt line to the engine. Returns `true` when the user quits.
async fn apply_input(
    engine: &mut WizardEngine,
    input: WizardInput,
    presenter: &WizardPresenter,
) -> CliResult<bool> {
    if engine.result().is_some() {
        match input {
            WizardInput::Exit => return Ok(true),
            WizardInput::Restart => engine.reset(),
            WizardInput::Edit => engine.edit_after_result(),
            _ => println!("Type 'restart', 'edit' or 'exit'."),
        }
        return Ok(false);
    }

    match input {
        WizardInput::Exit => return Ok(true),
        WizardInput::Back => engine.retreat()?,
        WizardInput::Restart => engine.reset(),
        WizardInput::Edit => engine.edit_after_result(),
        WizardInput::Next => step_forward(engine).await?,
        WizardInput::Answer(raw) => match engine.set_answer(&raw) {
            Ok(()) => step_forward(engine).await?,
            Err(EngineError::Input(error)) => presenter.show_input_error(&error),
            Err(other) => return Err(other.into()),
        },
    }
    Ok(false)
}

async fn step_forward(engine: &mut WizardEngine) -> CliResult<()> {
    match engine.advance().await {
        // the view shows validation errors on the next render
        Ok(_) | Err(EngineError::Validation(_)) => Ok(()),
        Err(other) => Err(other.into()),
    }
}
