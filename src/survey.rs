//! Survey builder operations.
//!
//! Every operation takes the current survey by reference and returns a new
//! one; callers decide when to persist the result.

use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    generate_id, AnswerValue, Answers, Question, QuestionKind, QuestionPatch, QuestionType,
    Survey,
};

impl Survey {
    /// The survey a fresh installation starts with.
    pub fn sample() -> Survey {
        Survey {
            title: "Customer Feedback".into(),
            description: "Tell us how we're doing. Every completed survey earns 100 points."
                .into(),
            questions: vec![
                Question {
                    id: "satisfaction".into(),
                    prompt: "How satisfied are you with our service?".into(),
                    required: true,
                    kind: QuestionKind::Rating { max: 5 },
                },
                Question {
                    id: "channel".into(),
                    prompt: "How did you hear about us?".into(),
                    required: false,
                    kind: QuestionKind::SingleSelect {
                        options: vec![
                            "Friend".into(),
                            "Social media".into(),
                            "Search engine".into(),
                        ],
                    },
                },
                Question {
                    id: "comments".into(),
                    prompt: "Anything else you'd like to share?".into(),
                    required: false,
                    kind: QuestionKind::ShortText,
                },
            ],
        }
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn add_question(&self, question_type: QuestionType) -> Survey {
        self.add_question_with_ids(question_type, generate_id)
    }

    /// Draws ids from `next_id` until one is not already taken.
    pub fn add_question_with_ids<F>(&self, question_type: QuestionType, mut next_id: F) -> Survey
    where
        F: FnMut() -> String,
    {
        let mut id = next_id();
        while self.question(&id).is_some() {
            debug!("generated question id {} is taken", id);
            id = next_id();
        }

        let mut survey = self.clone();
        survey.questions.push(Question::new(id, question_type));
        survey
    }

    pub fn update_question(&self, id: &str, patch: &QuestionPatch) -> Survey {
        let mut survey = self.clone();
        match survey.questions.iter_mut().find(|question| question.id == id) {
            None => debug!("update of unknown question {} ignored", id),
            Some(question) => question.apply(patch),
        }
        survey
    }

    pub fn remove_question(&self, id: &str) -> Survey {
        let mut survey = self.clone();
        survey.questions.retain(|question| question.id != id);
        survey
    }

    /// Required questions with no usable answer, in survey order.
    pub fn missing_answers<'a>(&'a self, answers: &Answers) -> Vec<&'a Question> {
        self.questions
            .iter()
            .filter(|question| question.required)
            .filter(|question| match answers.get(&question.id) {
                None => true,
                Some(answer) => answer.is_blank(),
            })
            .collect()
    }

    pub fn validate_answers(&self, answers: &Answers) -> bool {
        self.missing_answers(answers).is_empty()
    }

    /// Resolves raw `id=value` input against the question types.
    pub fn parse_answers<'a>(
        &self,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Answers> {
        pairs
            .into_iter()
            .map(|(id, raw)| -> Result<(String, AnswerValue)> {
                let question = self
                    .question(id)
                    .ok_or_else(|| Error::UnknownQuestion(id.into()))?;
                Ok((question.id.clone(), question.parse_answer(raw)?))
            })
            .collect()
    }

    pub fn check(&self) -> Result<()> {
        let mut ids = BTreeSet::new();
        for question in &self.questions {
            if !ids.insert(question.id.as_str()) {
                return Err(Error::ImportFormat(format!(
                    "duplicate question id {}",
                    question.id
                )));
            }

            match &question.kind {
                QuestionKind::SingleSelect { options } if options.is_empty() => {
                    return Err(Error::ImportFormat(format!(
                        "question {} has no options",
                        question.id
                    )));
                }
                QuestionKind::Rating { max } if *max < 1 => {
                    return Err(Error::ImportFormat(format!(
                        "question {} has a rating maximum below 1",
                        question.id
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl Question {
    pub fn new(id: String, question_type: QuestionType) -> Question {
        Question {
            id,
            prompt: "Untitled question".into(),
            required: false,
            kind: question_type.default_kind(),
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    fn apply(&mut self, patch: &QuestionPatch) {
        if let Some(prompt) = &patch.prompt {
            self.prompt = prompt.clone();
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(question_type) = patch.question_type {
            if question_type != self.question_type() {
                debug!("question {} is now {}", self.id, question_type);
                self.kind = question_type.default_kind();
            }
        }

        match &mut self.kind {
            QuestionKind::SingleSelect { options } => {
                if let Some(new_options) = &patch.options {
                    if new_options.is_empty() {
                        debug!("ignoring empty option list for question {}", self.id);
                    } else {
                        *options = new_options.clone();
                    }
                }
            }
            QuestionKind::Rating { max } => {
                if let Some(new_max) = patch.max {
                    if new_max < 1 {
                        debug!("ignoring rating maximum {} for question {}", new_max, self.id);
                    } else {
                        *max = new_max;
                    }
                }
            }
            QuestionKind::ShortText => {}
        }
    }

    pub fn parse_answer(&self, raw: &str) -> Result<AnswerValue> {
        let invalid = |reason: String| Error::InvalidAnswer {
            question: self.id.clone(),
            reason,
        };

        match &self.kind {
            QuestionKind::ShortText => Ok(AnswerValue::Text(raw.into())),
            QuestionKind::SingleSelect { options } => options
                .iter()
                .find(|option| option.as_str() == raw)
                .map(|option| AnswerValue::Text(option.clone()))
                .ok_or_else(|| invalid(format!("expected one of: {}", options.join(", ")))),
            QuestionKind::Rating { max } => {
                let value: u32 = raw
                    .trim()
                    .parse()
                    .map_err(|_err| invalid(format!("{:?} is not a whole number", raw)))?;
                if value < 1 || value > *max {
                    return Err(invalid(format!("expected a rating from 1 to {}", max)));
                }
                Ok(AnswerValue::Rating(value))
            }
        }
    }
}
