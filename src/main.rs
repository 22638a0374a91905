use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use survey_wallet::{
    models::amount,
    summarize, write_csv, Config, FileStorage, Payout, QuestionPatch, QuestionResult,
    QuestionType, Response, Survey, SurveyStore, REWARD_PER_SUBMISSION,
};

#[derive(Debug, Parser)]
#[command(name = "survey-wallet", version, about = "Build surveys, collect answers, earn points")]
struct Cli {
    /// Configuration file.
    #[arg(long, env = "SURVEY_CONFIG", default_value = "survey.toml")]
    config: PathBuf,

    /// Overrides `store_dir` from the configuration file.
    #[arg(long, env = "SURVEY_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current survey.
    Show,
    /// Change the survey title or description.
    Edit {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Append a question: short-text, single-select or rating.
    AddQuestion { question_type: QuestionType },
    UpdateQuestion {
        id: String,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        required: Option<bool>,
        #[arg(long = "type")]
        question_type: Option<QuestionType>,
        #[arg(long, value_delimiter = ',')]
        options: Option<Vec<String>>,
        #[arg(long)]
        max: Option<u32>,
    },
    RemoveQuestion { id: String },
    /// Submit one response, e.g. `-a satisfaction=4 -a comments="great"`.
    Submit {
        #[arg(short, long = "answer", value_name = "ID=VALUE")]
        answers: Vec<String>,
    },
    /// Per-question tallies of all responses.
    Results,
    Wallet,
    CashOut,
    /// Write the survey as a shareable template.
    Export { file: PathBuf },
    /// Replace the state with a previously exported document.
    Import { file: PathBuf },
    /// Write all responses as CSV.
    ExportCsv { file: PathBuf },
    ClearResponses,
    /// Start over from the default survey.
    Reset,
}

#[derive(Clone, Debug, Serialize)]
struct SubmitReply<'a> {
    response: &'a Response,
    #[serde(serialize_with = "amount::serialize")]
    reward: Decimal,
    #[serde(serialize_with = "amount::serialize")]
    balance: Decimal,
}

#[derive(Clone, Debug, Serialize)]
struct ResultsReply<'a> {
    title: &'a str,
    responses: usize,
    questions: Vec<QuestionResult>,
}

#[derive(Clone, Debug, Serialize)]
struct WalletReply<'a> {
    #[serde(serialize_with = "amount::serialize")]
    balance: Decimal,
    #[serde(serialize_with = "amount::serialize")]
    withdrawable: Decimal,
    #[serde(serialize_with = "amount::serialize")]
    total_paid_out: Decimal,
    payouts: &'a [Payout],
}

#[derive(Clone, Debug, Serialize)]
struct CashOutReply<'a> {
    payout: &'a Payout,
    #[serde(serialize_with = "amount::serialize")]
    balance: Decimal,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_question(survey: &Survey, id: &str) -> Result<()> {
    survey
        .question(id)
        .map(|_question| ())
        .ok_or_else(|| anyhow!("no question with id {}", id))
}

fn split_answer(answer: &str) -> Result<(&str, &str)> {
    let mut parts = answer.splitn(2, '=');
    let id = parts.next().unwrap_or_default();
    let value = parts
        .next()
        .ok_or_else(|| anyhow!("expected ID=VALUE, got {:?}", answer))?;

    Ok((id, value))
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("couldn't load {}", cli.config.display()))?;
    let store_dir = cli.store.clone().unwrap_or_else(|| config.store_dir.clone());

    let storage = FileStorage::new(&store_dir)?;
    let mut store = SurveyStore::open(storage, config.state_key.clone(), config.default_state())?;

    match cli.command {
        Command::Show => print_json(store.survey())?,
        Command::Edit { title, description } => {
            let survey = store.edit_survey(|survey| {
                let mut survey = survey.clone();
                if let Some(title) = title {
                    survey.title = title;
                }
                if let Some(description) = description {
                    survey.description = description;
                }
                survey
            })?;
            print_json(survey)?;
        }
        Command::AddQuestion { question_type } => {
            let survey = store.edit_survey(|survey| survey.add_question(question_type))?;
            print_json(&survey.questions.last())?;
        }
        Command::UpdateQuestion {
            id,
            prompt,
            required,
            question_type,
            options,
            max,
        } => {
            require_question(store.survey(), &id)?;
            let patch = QuestionPatch {
                prompt,
                required,
                question_type,
                options,
                max,
            };
            let survey = store.edit_survey(|survey| survey.update_question(&id, &patch))?;
            print_json(&survey.question(&id))?;
        }
        Command::RemoveQuestion { id } => {
            require_question(store.survey(), &id)?;
            let survey = store.edit_survey(|survey| survey.remove_question(&id))?;
            print_json(survey)?;
        }
        Command::Submit { answers } => {
            let pairs = answers
                .iter()
                .map(|answer| split_answer(answer))
                .collect::<Result<Vec<_>>>()?;
            let answers = store.survey().parse_answers(pairs)?;

            let response = store.submit(answers)?.clone();
            let reply = SubmitReply {
                response: &response,
                reward: REWARD_PER_SUBMISSION,
                balance: store.wallet().balance,
            };
            print_json(&reply)?;
        }
        Command::Results => {
            let reply = ResultsReply {
                title: &store.survey().title,
                responses: store.responses().len(),
                questions: summarize(store.survey(), store.responses()),
            };
            print_json(&reply)?;
        }
        Command::Wallet => {
            let wallet = store.wallet();
            let reply = WalletReply {
                balance: wallet.balance,
                withdrawable: wallet.withdrawable(),
                total_paid_out: wallet.total_paid_out(),
                payouts: &wallet.payouts,
            };
            print_json(&reply)?;
        }
        Command::CashOut => {
            let payout = store.cash_out()?;
            let reply = CashOutReply {
                payout: &payout,
                balance: store.wallet().balance,
            };
            print_json(&reply)?;
        }
        Command::Export { file } => {
            fs::write(&file, store.export()?)?;
            info!("exported survey to {}", file.display());
        }
        Command::Import { file } => {
            let document = fs::read_to_string(&file)?;
            store.import(&document)?;
            print_json(store.survey())?;
        }
        Command::ExportCsv { file } => {
            let writer = fs::File::create(&file)?;
            write_csv(store.survey(), store.responses(), writer)?;
            info!(
                "wrote {} responses to {}",
                store.responses().len(),
                file.display()
            );
        }
        Command::ClearResponses => store.clear_responses()?,
        Command::Reset => {
            store.reset()?;
            print_json(store.survey())?;
        }
    }

    Ok(())
}
