use rust_decimal::Decimal;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("please answer all required questions: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("insufficient balance: {balance} available, at least {minimum} needed to cash out")]
    InsufficientBalance { balance: Decimal, minimum: Decimal },

    #[error("invalid file: {0}")]
    ImportFormat(String),

    #[error("invalid answer for question {question}: {reason}")]
    InvalidAnswer { question: String, reason: String },

    #[error("no question with id {0}")]
    UnknownQuestion(String),

    #[error("unknown question type {0:?}, expected short-text, single-select or rating")]
    UnknownQuestionType(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
