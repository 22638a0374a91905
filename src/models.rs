use chrono::{DateTime, Utc};
use rand::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::error::Error;

pub const DEFAULT_RATING_MAX: u32 = 5;

/// Random 64-bit identifier, hex encoded.
pub fn generate_id() -> String {
    let mut id = [0u8; 8];
    rand::rngs::OsRng.fill(&mut id);
    hex::encode(id)
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Survey {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,

    #[serde(default)]
    pub required: bool,

    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Type-specific part of a question. Serialized inline with the question as
/// `"type": "short-text" | "single-select" | "rating"`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    ShortText,
    SingleSelect {
        options: Vec<String>,
    },
    Rating {
        #[serde(default = "default_rating_max")]
        max: u32,
    },
}

fn default_rating_max() -> u32 {
    DEFAULT_RATING_MAX
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::ShortText => QuestionType::ShortText,
            QuestionKind::SingleSelect { .. } => QuestionType::SingleSelect,
            QuestionKind::Rating { .. } => QuestionType::Rating,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionType {
    ShortText,
    SingleSelect,
    Rating,
}

impl QuestionType {
    /// The kind a freshly added question of this type starts with.
    pub fn default_kind(self) -> QuestionKind {
        match self {
            QuestionType::ShortText => QuestionKind::ShortText,
            QuestionType::SingleSelect => QuestionKind::SingleSelect {
                options: vec!["Option 1".into(), "Option 2".into()],
            },
            QuestionType::Rating => QuestionKind::Rating {
                max: DEFAULT_RATING_MAX,
            },
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionType::ShortText => "short-text",
            QuestionType::SingleSelect => "single-select",
            QuestionType::Rating => "rating",
        };
        f.write_str(name)
    }
}

impl FromStr for QuestionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short-text" | "text" => Ok(QuestionType::ShortText),
            "single-select" | "select" => Ok(QuestionType::SingleSelect),
            "rating" => Ok(QuestionType::Rating),
            _ => Err(Error::UnknownQuestionType(s.into())),
        }
    }
}

/// Partial update of a question. `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct QuestionPatch {
    pub prompt: Option<String>,
    pub required: Option<bool>,
    pub question_type: Option<QuestionType>,
    pub options: Option<Vec<String>>,
    pub max: Option<u32>,
}

/// A submitted answer. Stored as a bare JSON string or integer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Rating(u32),
    Text(String),
}

impl AnswerValue {
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Rating(_) => false,
            AnswerValue::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Rating(_) => None,
        }
    }

    /// Ratings recorded as numeric strings still count as ratings.
    pub fn as_rating(&self) -> Option<u32> {
        match self {
            AnswerValue::Rating(value) => Some(*value),
            AnswerValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Rating(value) => write!(f, "{}", value),
            AnswerValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(text: &str) -> Self {
        AnswerValue::Text(text.into())
    }
}

impl From<String> for AnswerValue {
    fn from(text: String) -> Self {
        AnswerValue::Text(text)
    }
}

impl From<u32> for AnswerValue {
    fn from(value: u32) -> Self {
        AnswerValue::Rating(value)
    }
}

pub type Answers = BTreeMap<String, AnswerValue>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Response {
    pub timestamp: DateTime<Utc>,
    pub answers: Answers,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Wallet {
    #[serde(default, with = "amount")]
    pub balance: Decimal,

    #[serde(default)]
    pub payouts: Vec<Payout>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Payout {
    pub id: String,
    #[serde(with = "amount")]
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Exact JSON encoding for money: whole amounts are written as integers,
/// anything else as a decimal string. Reading accepts either, plus floats.
pub mod amount {
    use rust_decimal::{prelude::ToPrimitive, Decimal};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let value = value.normalize();
        match value.to_i64() {
            Some(whole) if value.scale() == 0 => serializer.serialize_i64(whole),
            _ => serializer.serialize_str(&value.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer)
    }
}

/// Everything the application persists, as one document.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AppState {
    pub survey: Survey,

    #[serde(default)]
    pub responses: Vec<Response>,

    #[serde(default)]
    pub wallet: Wallet,
}

impl AppState {
    pub fn new(survey: Survey) -> AppState {
        AppState {
            survey,
            responses: Vec::new(),
            wallet: Wallet::default(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new(Survey::sample())
    }
}
