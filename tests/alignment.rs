use std::ops::Range;

use pretty_assertions::assert_eq;
use token_aligner::{
    alignment::Config,
    pipelines::question_answering::{self, extract_answers, ScoredWindow, SpanLogits},
    spans::{merge_candidates, windows, Candidate},
    utils::files::read_yaml,
    Answer, CharSpan, InvalidSpanError, LabelPolicy, TokenLabel, TokenLabelAligner,
};

/// `[CLS] Jeff De ##an works at Google [SEP]`
const WORD_IDS: [Option<usize>; 8] = [
    None,
    Some(0),
    Some(1),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    None,
];

const WORD_LABELS: [&str; 5] = ["B-PER", "I-PER", "O", "O", "B-ORG"];

#[test]
fn labels_first_sub_token_only() {
    let aligner = TokenLabelAligner::default();

    let aligned = aligner.align_labels(&WORD_IDS, &WORD_LABELS).unwrap();

    assert_eq!(
        aligned,
        vec![
            TokenLabel::Ignore,
            TokenLabel::Label("B-PER"),
            TokenLabel::Label("I-PER"),
            TokenLabel::Ignore,
            TokenLabel::Label("O"),
            TokenLabel::Label("O"),
            TokenLabel::Label("B-ORG"),
            TokenLabel::Ignore,
        ]
    );

    // Every word is labelled exactly once
    let labelled: Vec<&str> = aligned.iter().filter_map(|l| l.label().copied()).collect();
    assert_eq!(labelled, WORD_LABELS.to_vec());
}

#[test]
fn labels_every_sub_token() {
    let aligner = TokenLabelAligner::new(Config::new().with_label_policy(LabelPolicy::AllSubTokens));

    let aligned = aligner.align_labels(&WORD_IDS, &WORD_LABELS).unwrap();

    assert_eq!(aligned[3], TokenLabel::Label("I-PER"));
    assert_eq!(aligned[0], TokenLabel::Ignore);
    assert_eq!(aligned[7], TokenLabel::Ignore);
}

#[test]
fn rejects_words_without_labels() {
    let aligner = TokenLabelAligner::default();

    assert!(aligner.align_labels(&WORD_IDS, &WORD_LABELS[..4]).is_err());
}

#[test]
fn decodes_token_span_to_characters() {
    let aligner = TokenLabelAligner::default();
    let context = "Jeff Germany works";

    // [CLS] Jeff Ger ##many works [SEP]
    let offsets = vec![
        None,
        Some((0, 4)),
        Some((5, 8)),
        Some((8, 12)),
        Some((13, 18)),
        None,
    ];

    let answer = aligner.decode_span(2, 3, &offsets).unwrap();

    assert_eq!(answer, Answer::Span(CharSpan::new(5, 12)));
    assert_eq!(answer.span().and_then(|s| s.extract(context)), Some("Germany"));

    assert_eq!(aligner.decode_span(0, 0, &offsets).unwrap(), Answer::NoAnswer);
    assert_eq!(
        aligner.decode_span(3, 2, &offsets),
        Err(InvalidSpanError::Inverted { start: 3, end: 2 })
    );
}

#[test]
fn covers_long_inputs_with_strided_windows() {
    let ranges = windows(250, 100, 25).unwrap();

    assert_eq!(ranges, vec![0..100, 75..175, 150..250]);
    assert!(ranges.windows(2).all(|pair| pair[0].end - pair[1].start == 25));
}

#[test]
fn reports_overlapping_answers_once() {
    let merged = merge_candidates(vec![
        Candidate::new(CharSpan::new(300, 310), 2.5, 0),
        Candidate::new(CharSpan::new(300, 310), 3.0, 1),
        Candidate::new(CharSpan::new(40, 45), 1.0, 0),
    ]);

    assert_eq!(
        merged,
        vec![
            Candidate::new(CharSpan::new(300, 310), 3.0, 1),
            Candidate::new(CharSpan::new(40, 45), 1.0, 0),
        ]
    );
}

#[test]
fn extracts_answer_text_from_scored_windows() {
    let context = "Jeff Dean works at Google";
    let aligner = TokenLabelAligner::default();
    let config = question_answering::Config::new().with_max_answer_length(3);

    // [CLS] Where ? [SEP] Jeff Dean works at Google [SEP]
    let offsets = vec![
        None,
        None,
        None,
        None,
        Some((0, 4)),
        Some((5, 9)),
        Some((10, 15)),
        Some((16, 18)),
        Some((19, 25)),
        None,
    ];

    let mut start = vec![0.0; 10];
    let mut end = vec![0.0; 10];
    start[8] = 6.0;
    end[8] = 6.0;

    let window = ScoredWindow::new(offsets, SpanLogits::new(start, end));
    let predictions = extract_answers(context, &[window], &aligner, &config).unwrap();

    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].text, "Google");
    assert_eq!(predictions[0].answer, Answer::Span(CharSpan::new(19, 25)));
}

/// A context of 250 four-character words, `w000 w001 ... w249`. Word `i` covers `[5i, 5i + 4)`.
fn long_context() -> String {
    (0..250)
        .map(|i| format!("w{:03}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `[CLS] words-in-range [SEP]`, with the given `(word, start logit, end logit)` scores
fn scored_window(range: Range<usize>, scores: &[(usize, f32, f32)]) -> ScoredWindow {
    let mut offsets = vec![None];
    offsets.extend(range.clone().map(|i| Some((5 * i, 5 * i + 4))));
    offsets.push(None);

    let mut start = vec![0.0; offsets.len()];
    let mut end = vec![0.0; offsets.len()];

    for (word, start_logit, end_logit) in scores {
        let position = 1 + word - range.start;

        start[position] = *start_logit;
        end[position] = *end_logit;
    }

    ScoredWindow::new(offsets, SpanLogits::new(start, end))
}

#[test]
fn merges_overlapping_answers_from_strided_windows() {
    let context = long_context();
    let ranges = windows(250, 100, 25).unwrap();

    assert_eq!(ranges, vec![0..100, 75..175, 150..250]);

    // The first two windows both see words 75..100 and find different but overlapping answers
    let scored = vec![
        scored_window(ranges[0].clone(), &[(80, 3.0, 0.0), (81, 0.0, 3.0)]),
        scored_window(ranges[1].clone(), &[(81, 3.5, 0.0), (82, 0.0, 3.5)]),
        scored_window(ranges[2].clone(), &[(200, 2.0, 2.0)]),
    ];

    let config = question_answering::Config::new()
        .with_top_k(2)
        .with_max_answer_length(2);

    let predictions =
        extract_answers(&context, &scored, &TokenLabelAligner::default(), &config).unwrap();

    assert_eq!(
        predictions
            .iter()
            .map(|p| (p.text.as_str(), p.answer, p.score))
            .collect::<Vec<_>>(),
        vec![
            ("w081 w082", Answer::Span(CharSpan::new(405, 414)), 7.0),
            ("w200", Answer::Span(CharSpan::new(1000, 1004)), 4.0),
        ]
    );
}

#[tokio::test]
async fn loads_the_no_answer_index_from_yaml() {
    let dir = std::env::temp_dir().join(format!("token-aligner-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join("aligner.yaml");
    std::fs::write(
        &path,
        "label_policy: first_sub_token\nignore_index: -100\nno_answer_index: 3\n",
    )
    .unwrap();

    let config: Config = read_yaml(path.to_str().unwrap()).await.unwrap();
    assert_eq!(config.no_answer_index, 3);

    // [CLS] Jeff Dean [SEP], with the model pointing at [SEP] for "no answer"
    let scored = ScoredWindow::new(
        vec![None, Some((0, 4)), Some((5, 9)), None],
        SpanLogits::new(vec![0.0, 3.0, 0.0, 5.0], vec![0.0, 3.0, 0.0, 5.0]),
    );
    let reader = question_answering::Config::new().with_handle_impossible_answer(true);

    let default = extract_answers(
        "Jeff Dean",
        &[scored.clone()],
        &TokenLabelAligner::default(),
        &reader,
    )
    .unwrap();
    assert_eq!(default[0].text, "Jeff");

    let moved = extract_answers(
        "Jeff Dean",
        &[scored],
        &TokenLabelAligner::new(config),
        &reader,
    )
    .unwrap();
    assert_eq!(moved[0].answer, Answer::NoAnswer);
    assert_eq!(moved[0].score, 10.0);
}
