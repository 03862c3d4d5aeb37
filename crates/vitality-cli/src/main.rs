//! `vitality` command-line interface.

mod telemetry;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use vitality_core::{build_context, fallback_scores, AnswerSheet, Questionnaire};
use vitality_runtime::{
    ConnectivityProbe, MetricScorer, Offline, ProviderHealthProbe, RuntimeConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "vitality",
    about = "Score wellness questionnaire answers into personal-development metrics",
    version
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print both questionnaires
    Questions {
        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the context block rendered from an answers file
    Context(AnswersArgs),
    /// Print deterministic fallback scores as JSON
    Fallback(AnswersArgs),
    /// Score answers with the configured model, falling back per metric
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
struct AnswersArgs {
    /// Answers file (.yaml, .yml or .json)
    answers: PathBuf,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    #[command(flatten)]
    answers: AnswersArgs,
    /// Runtime configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skip the model entirely and use fallback scores
    #[arg(long)]
    offline: bool,
    /// Print the full report with score sources and token usage
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Command::Questions { json } => print_questions(json),
        Command::Context(args) => {
            let sheet = load_answers(&args)?;
            println!("{}", build_context(sheet.quiz.as_slice(), sheet.habits.as_slice()));
            Ok(())
        }
        Command::Fallback(args) => {
            let sheet = load_answers(&args)?;
            let scores = fallback_scores(sheet.quiz.as_slice(), sheet.habits.as_slice());
            println!("{}", serde_json::to_string_pretty(&scores)?);
            Ok(())
        }
        Command::Score(args) => score(args).await,
    }
}

fn load_answers(args: &AnswersArgs) -> Result<AnswerSheet> {
    AnswerSheet::from_file(&args.answers)
        .with_context(|| format!("failed to load answers from {}", args.answers.display()))
}

fn print_questions(json: bool) -> Result<()> {
    let questionnaires = [Questionnaire::Quiz, Questionnaire::Habits];

    if json {
        let mut all = serde_json::Map::new();
        for questionnaire in questionnaires {
            all.insert(
                questionnaire.line_prefix().to_lowercase(),
                serde_json::to_value(questionnaire.questions())?,
            );
        }
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    for questionnaire in questionnaires {
        println!("{}", questionnaire.line_prefix());
        for question in questionnaire.questions() {
            println!("  Q{}: {}", question.id, question.prompt);
            for (i, label) in question.labels().iter().enumerate() {
                println!("      {}. {}", i + 1, label);
            }
        }
        println!();
    }
    Ok(())
}

async fn score(args: ScoreArgs) -> Result<()> {
    let sheet = load_answers(&args.answers)?;

    let config = match &args.config {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    let provider = config.build_provider()?;
    tracing::debug!(
        provider = provider.name(),
        model = %config.completion.model,
        offline = args.offline,
        "Scoring answers"
    );
    let probe: Arc<dyn ConnectivityProbe> = if args.offline {
        Arc::new(Offline)
    } else {
        Arc::new(ProviderHealthProbe::new(provider.clone()))
    };

    let scorer = MetricScorer::builder()
        .provider(provider)
        .probe(probe)
        .config(config)
        .build()?;

    let report = scorer
        .compute_report(sheet.quiz.as_slice(), sheet.habits.as_slice())
        .await;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&report.scores)?);
    }
    Ok(())
}
