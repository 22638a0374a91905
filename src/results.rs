//! Per-question summaries of collected responses.

use serde::Serialize;
use std::io;

use crate::error::Result;
use crate::models::{Question, QuestionKind, Response, Survey};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub prompt: String,
    /// Responses that contributed to the summary.
    pub answered: usize,

    #[serde(flatten)]
    pub summary: Summary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Summary {
    ShortText { answers: Vec<String> },
    SingleSelect { counts: Vec<OptionCount> },
    Rating { counts: Vec<RatingCount> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionCount {
    pub option: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatingCount {
    pub value: u32,
    pub count: u64,
}

pub fn summarize(survey: &Survey, responses: &[Response]) -> Vec<QuestionResult> {
    survey
        .questions
        .iter()
        .map(|question| summarize_question(question, responses))
        .collect()
}

/// Answers are only counted against the question as it currently stands:
/// values for removed options or out-of-range ratings are left out.
fn summarize_question(question: &Question, responses: &[Response]) -> QuestionResult {
    let answers = responses
        .iter()
        .filter_map(|response| response.answers.get(&question.id));

    let (answered, summary) = match &question.kind {
        // every submitted entry, blanks included
        QuestionKind::ShortText => {
            let answers = answers
                .map(|answer| answer.to_string())
                .collect::<Vec<_>>();
            (answers.len(), Summary::ShortText { answers })
        }
        QuestionKind::SingleSelect { options } => {
            let mut counts = options
                .iter()
                .map(|option| OptionCount {
                    option: option.clone(),
                    count: 0,
                })
                .collect::<Vec<_>>();
            let mut answered = 0;

            for answer in answers.filter_map(|answer| answer.as_text()) {
                if let Some(entry) = counts.iter_mut().find(|entry| entry.option == answer) {
                    entry.count += 1;
                    answered += 1;
                }
            }

            (answered, Summary::SingleSelect { counts })
        }
        QuestionKind::Rating { max } => {
            let mut counts = (1..=*max)
                .map(|value| RatingCount { value, count: 0 })
                .collect::<Vec<_>>();
            let mut answered = 0;

            for value in answers.filter_map(|answer| answer.as_rating()) {
                if value >= 1 && value <= *max {
                    counts[(value - 1) as usize].count += 1;
                    answered += 1;
                }
            }

            (answered, Summary::Rating { counts })
        }
    };

    QuestionResult {
        question_id: question.id.clone(),
        prompt: question.prompt.clone(),
        answered,
        summary,
    }
}

/// Writes one CSV row per response, with a column per current question.
pub fn write_csv<W: io::Write>(survey: &Survey, responses: &[Response], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);

    let header = std::iter::once("timestamp")
        .chain(survey.questions.iter().map(|question| question.prompt.as_str()));
    writer.write_record(header)?;

    for response in responses {
        let mut record = vec![response.timestamp.to_rfc3339()];
        record.extend(survey.questions.iter().map(|question| {
            response
                .answers
                .get(&question.id)
                .map(|answer| answer.to_string())
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerValue, Answers};
    use chrono::{TimeZone, Utc};

    fn response(pairs: &[(&str, AnswerValue)]) -> Response {
        Response {
            timestamp: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            answers: pairs
                .iter()
                .map(|(id, value)| (id.to_string(), value.clone()))
                .collect::<Answers>(),
        }
    }

    fn survey(kind: QuestionKind) -> Survey {
        Survey {
            title: "T".into(),
            description: String::new(),
            questions: vec![Question {
                id: "q".into(),
                prompt: "Q?".into(),
                required: false,
                kind,
            }],
        }
    }

    #[test]
    fn single_select_counts_current_options() {
        let survey = survey(QuestionKind::SingleSelect {
            options: vec!["A".into(), "B".into()],
        });
        let responses = ["A", "A", "B", "C"]
            .iter()
            .map(|&value| response(&[("q", value.into())]))
            .collect::<Vec<_>>();

        let results = summarize(&survey, &responses);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].answered, 3);
        assert_eq!(
            results[0].summary,
            Summary::SingleSelect {
                counts: vec![
                    OptionCount {
                        option: "A".into(),
                        count: 2
                    },
                    OptionCount {
                        option: "B".into(),
                        count: 1
                    },
                ]
            }
        );
    }

    #[test]
    fn rating_counts_every_level() {
        let survey = survey(QuestionKind::Rating { max: 3 });
        let responses = vec![
            response(&[("q", 3u32.into())]),
            response(&[("q", 3u32.into())]),
            response(&[("q", "1".into())]),
            response(&[("q", 9u32.into())]),
            response(&[]),
        ];

        let results = summarize(&survey, &responses);

        let counts = match &results[0].summary {
            Summary::Rating { counts } => counts
                .iter()
                .map(|count| (count.value, count.count))
                .collect::<Vec<_>>(),
            other => panic!("unexpected summary {:?}", other),
        };
        assert_eq!(counts, vec![(1, 1), (2, 0), (3, 2)]);
        assert_eq!(results[0].answered, 3);
    }

    #[test]
    fn short_text_keeps_submission_order() {
        let survey = survey(QuestionKind::ShortText);
        let responses = vec![
            response(&[("q", "first".into())]),
            response(&[("other", "ignored".into())]),
            response(&[("q", "  ".into())]),
            response(&[("q", "second".into())]),
        ];

        let results = summarize(&survey, &responses);

        assert_eq!(
            results[0].summary,
            Summary::ShortText {
                answers: vec!["first".into(), "  ".into(), "second".into()]
            }
        );
    }

    #[test]
    fn no_responses_gives_zeroed_tallies() {
        let results = summarize(&Survey::sample(), &[]);

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|result| result.answered == 0));
        assert_eq!(
            serde_json::to_value(&results[1]).unwrap()["type"],
            "single-select"
        );
    }

    #[test]
    fn csv_has_a_column_per_question() {
        let survey = Survey::sample();
        let responses = vec![
            response(&[("satisfaction", 5u32.into()), ("comments", "nice, thanks".into())]),
            response(&[("satisfaction", 2u32.into()), ("channel", "Friend".into())]),
        ];

        let mut buffer = Vec::new();
        write_csv(&survey, &responses, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,How satisfied are you with our service?,How did you hear about us?,Anything else you'd like to share?"
        );
        assert_eq!(lines[1], "2020-09-13T12:26:40+00:00,5,,\"nice, thanks\"");
        assert_eq!(lines[2], "2020-09-13T12:26:40+00:00,2,Friend,");
    }
}
