//! A local survey builder and collector with a simulated reward wallet.
//!
//! The whole application state (survey, collected responses and wallet) is
//! one [`AppState`] document owned by a [`SurveyStore`], which persists it
//! through a [`Storage`] backend after every change.

pub mod config;
pub mod error;
pub mod models;
pub mod results;
pub mod storage;
pub mod store;
pub mod survey;
pub mod wallet;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    AnswerValue, Answers, AppState, Payout, Question, QuestionKind, QuestionPatch, QuestionType,
    Response, Survey, Wallet,
};
pub use results::{summarize, write_csv, QuestionResult, Summary};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::SurveyStore;
pub use wallet::REWARD_PER_SUBMISSION;
