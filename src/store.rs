//! The single owner of application state.
//!
//! `SurveyStore` loads the persisted document once, hands out read-only
//! snapshots, and applies every change by building a new `AppState`,
//! writing it to storage, and only then swapping it in. A failed write or a
//! rejected operation leaves the previous state untouched.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Answers, AppState, Payout, Response, Survey, Wallet};
use crate::storage::Storage;

pub const DEFAULT_STATE_KEY: &str = "survey-app-state";

#[derive(Debug)]
pub struct SurveyStore<S> {
    storage: S,
    key: String,
    default_state: AppState,
    state: AppState,
}

impl<S: Storage> SurveyStore<S> {
    /// Reads the persisted state, falling back to `default_state` when it is
    /// missing or unreadable.
    pub fn open(storage: S, key: impl Into<String>, default_state: AppState) -> Result<Self> {
        let key = key.into();

        let state = match storage.get(&key)? {
            None => {
                info!("no saved state under {}, starting fresh", key);
                default_state.clone()
            }
            Some(blob) => match parse_state(&blob) {
                Ok(state) => state,
                Err(err) => {
                    warn!("discarding saved state under {}: {}", key, err);
                    default_state.clone()
                }
            },
        };

        Ok(SurveyStore {
            storage,
            key,
            default_state,
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn survey(&self) -> &Survey {
        &self.state.survey
    }

    pub fn responses(&self) -> &[Response] {
        &self.state.responses
    }

    pub fn wallet(&self) -> &Wallet {
        &self.state.wallet
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn replace(&mut self, next: AppState) -> Result<()> {
        let blob = serde_json::to_string(&next)?;
        self.storage.set(&self.key, &blob)?;
        self.state = next;

        Ok(())
    }

    pub fn edit_survey<F>(&mut self, edit: F) -> Result<&Survey>
    where
        F: FnOnce(&Survey) -> Survey,
    {
        let next = AppState {
            survey: edit(&self.state.survey),
            ..self.state.clone()
        };
        debug!("survey now has {} questions", next.survey.questions.len());
        self.replace(next)?;

        Ok(&self.state.survey)
    }

    pub fn submit(&mut self, answers: Answers) -> Result<&Response> {
        self.submit_at(answers, Utc::now())
    }

    pub fn submit_at(&mut self, answers: Answers, timestamp: DateTime<Utc>) -> Result<&Response> {
        let missing = self
            .state
            .survey
            .missing_answers(&answers)
            .into_iter()
            .map(|question| question.prompt.clone())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(Error::Validation { missing });
        }

        let mut next = self.state.clone();
        let index = next.responses.len();
        next.responses.push(Response { timestamp, answers });
        next.wallet = next.wallet.record_submission();
        self.replace(next)?;

        info!(
            "recorded response #{}, balance is now {}",
            index + 1,
            self.state.wallet.balance
        );

        Ok(&self.state.responses[index])
    }

    pub fn cash_out(&mut self) -> Result<Payout> {
        let (wallet, payout) = self.state.wallet.cash_out()?;
        let next = AppState {
            wallet,
            ..self.state.clone()
        };
        self.replace(next)?;

        info!("cashed out {}", payout.amount);

        Ok(payout)
    }

    /// The survey as a shareable template: responses and wallet are zeroed.
    pub fn export(&self) -> Result<String> {
        let template = AppState::new(self.state.survey.clone());
        Ok(serde_json::to_string_pretty(&template)?)
    }

    pub fn import(&mut self, document: &str) -> Result<()> {
        let next = parse_state(document)?;
        info!(
            "importing survey {:?} with {} responses",
            next.survey.title,
            next.responses.len()
        );

        self.replace(next)
    }

    pub fn clear_responses(&mut self) -> Result<()> {
        let next = AppState {
            responses: Vec::new(),
            ..self.state.clone()
        };
        self.replace(next)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.replace(self.default_state.clone())
    }
}

/// Parses a state document and checks its invariants.
pub fn parse_state(document: &str) -> Result<AppState> {
    let state: AppState =
        serde_json::from_str(document).map_err(|err| Error::ImportFormat(err.to_string()))?;
    state.survey.check()?;
    state.wallet.check()?;

    Ok(state)
}
