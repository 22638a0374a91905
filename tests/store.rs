use rust_decimal::Decimal;
use std::{fs, path::PathBuf};

use survey_wallet::{
    models::generate_id, summarize, AnswerValue, AppState, Error, FileStorage, QuestionPatch,
    QuestionType, Storage, Summary, SurveyStore,
};

const KEY: &str = "state";

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("survey-wallet-{}", generate_id()))
}

fn open(dir: &PathBuf) -> SurveyStore<FileStorage> {
    let storage = FileStorage::new(dir).unwrap();
    SurveyStore::open(storage, KEY, AppState::default()).unwrap()
}

#[test]
fn build_collect_and_cash_out() {
    let dir = scratch_dir();
    let mut store = open(&dir);

    let survey = store
        .edit_survey(|survey| survey.add_question(QuestionType::SingleSelect))
        .unwrap()
        .clone();
    let added = survey.questions.last().unwrap().id.clone();
    store
        .edit_survey(|survey| {
            survey.update_question(
                &added,
                &QuestionPatch {
                    prompt: Some("Favourite colour?".into()),
                    options: Some(vec!["Red".into(), "Blue".into()]),
                    required: Some(true),
                    ..Default::default()
                },
            )
        })
        .unwrap();

    for (rating, colour) in &[("5", "Red"), ("4", "Red"), ("2", "Blue")] {
        let answers = store
            .survey()
            .parse_answers(vec![("satisfaction", *rating), (added.as_str(), *colour)])
            .unwrap();
        store.submit(answers).unwrap();
    }

    // missing the new required question
    let answers = store
        .survey()
        .parse_answers(vec![("satisfaction", "3")])
        .unwrap();
    assert!(matches!(
        store.submit(answers),
        Err(Error::Validation { .. })
    ));

    // drop an option after the fact: its answers no longer show up
    store
        .edit_survey(|survey| {
            survey.update_question(
                &added,
                &QuestionPatch {
                    options: Some(vec!["Red".into(), "Green".into()]),
                    ..Default::default()
                },
            )
        })
        .unwrap();

    let mut store = open(&dir);
    assert_eq!(store.responses().len(), 3);
    assert_eq!(store.wallet().balance, Decimal::from(300));

    let results = summarize(store.survey(), store.responses());
    let colours = results.iter().find(|result| result.question_id == added).unwrap();
    match &colours.summary {
        Summary::SingleSelect { counts } => {
            let counts = counts
                .iter()
                .map(|count| (count.option.as_str(), count.count))
                .collect::<Vec<_>>();
            assert_eq!(counts, vec![("Red", 2), ("Green", 0)]);
        }
        other => panic!("unexpected summary {:?}", other),
    }

    let payout = store.cash_out().unwrap();
    assert_eq!(payout.amount, Decimal::from(300));

    let store = open(&dir);
    assert!(store.wallet().balance.is_zero());
    assert_eq!(store.wallet().payouts.len(), 1);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn export_then_import_into_fresh_store() {
    let source_dir = scratch_dir();
    let mut source = open(&source_dir);
    source
        .edit_survey(|survey| survey.remove_question("channel"))
        .unwrap();
    let mut answers = survey_wallet::Answers::new();
    answers.insert("satisfaction".into(), AnswerValue::Rating(5));
    source.submit(answers).unwrap();

    let document = source.export().unwrap();

    let target_dir = scratch_dir();
    let mut target = open(&target_dir);
    target.import(&document).unwrap();

    assert_eq!(target.survey(), source.survey());
    assert!(target.responses().is_empty());
    assert!(target.wallet().balance.is_zero());

    fs::remove_dir_all(&source_dir).unwrap();
    fs::remove_dir_all(&target_dir).unwrap();
}

#[test]
fn corrupt_file_starts_over() {
    let dir = scratch_dir();
    let mut storage = FileStorage::new(&dir).unwrap();
    storage.set(KEY, "{\"survey\": 42}").unwrap();

    let store = open(&dir);

    assert_eq!(store.state(), &AppState::default());

    fs::remove_dir_all(&dir).unwrap();
}
