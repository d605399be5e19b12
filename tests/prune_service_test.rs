//! Integration tests for PruneService.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use feedsift::application::services::{PruneRequest, PruneService};
use feedsift::application::ApplicationError;
use feedsift::config::Settings;
use feedsift::infrastructure::{Answer, ItemPrompt, Operator};
use feedsift::util::testing::init_test_setup;
use rstest::rstest;
use tempfile::TempDir;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Feed</title>
    <item><title>Alpha</title></item>
    <channel>
      <item><title>Beta</title></item>
      <item><title>Gamma</title></item>
    </channel>
    <item><title>Delta</title><dc:creator>someone</dc:creator></item>
  </channel>
</rss>
"#;

/// What the operator saw for one item.
#[derive(Debug, Clone)]
struct Seen {
    /// (ordinal, total)
    position: (usize, usize),
    title: String,
    matches: Vec<(String, u8)>,
}

/// Answers from a queue; interrupts once the queue runs dry.
struct ScriptedOperator {
    answers: VecDeque<Answer>,
    seen: Vec<Seen>,
}

impl ScriptedOperator {
    fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    fn titles(&self) -> Vec<&str> {
        self.seen.iter().map(|s| s.title.as_str()).collect()
    }
}

impl Operator for ScriptedOperator {
    fn decide(&mut self, prompt: &ItemPrompt<'_>) -> io::Result<Answer> {
        self.seen.push(Seen {
            position: (prompt.ordinal, prompt.total),
            title: prompt.title.to_string(),
            matches: prompt
                .matches
                .iter()
                .map(|m| (m.entry.clone(), m.score))
                .collect(),
        });
        Ok(self.answers.pop_front().unwrap_or(Answer::Interrupted))
    }
}

struct Fixture {
    _temp: TempDir,
    input: PathBuf,
    output: PathBuf,
    dir: PathBuf,
}

fn fixture(feed: &str) -> Fixture {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let dir = temp.path().to_path_buf();
    let input = dir.join("feed.xml");
    fs::write(&input, feed).unwrap();
    Fixture {
        input,
        output: dir.join("pruned.xml"),
        dir,
        _temp: temp,
    }
}

fn request(fx: &Fixture) -> PruneRequest {
    PruneRequest {
        input: fx.input.clone(),
        output: fx.output.clone(),
        keep_titles: None,
        force_overwrite: false,
    }
}

fn service(settings: Settings) -> PruneService {
    PruneService::new(Arc::new(settings))
}

#[test]
fn given_nested_channels_when_run_then_every_item_visited_once_in_order() {
    let fx = fixture(FEED);
    let mut op = ScriptedOperator::new([Answer::Keep; 4]);

    let summary = service(Settings::default())
        .run(&request(&fx), &mut op)
        .unwrap();

    assert_eq!(op.titles(), vec!["Alpha", "Beta", "Gamma", "Delta"]);
    let positions: Vec<(usize, usize)> = op.seen.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.kept, 4);
    assert_eq!(summary.removed, 0);
    assert!(!summary.interrupted);
}

#[test]
fn given_mixed_answers_when_run_then_only_rejected_items_removed() {
    let fx = fixture(FEED);
    let mut op = ScriptedOperator::new([Answer::Keep, Answer::Remove, Answer::Keep, Answer::Remove]);

    let summary = service(Settings::default())
        .run(&request(&fx), &mut op)
        .unwrap();

    let out = fs::read_to_string(&fx.output).unwrap();
    assert!(out.contains("<item><title>Alpha</title></item>"));
    assert!(out.contains("<item><title>Gamma</title></item>"));
    assert!(!out.contains("Beta"));
    assert!(!out.contains("Delta"));
    assert!(!out.contains("dc:creator"));
    assert!(out.find("Alpha").unwrap() < out.find("Gamma").unwrap());
    // untouched parts survive verbatim
    assert!(out.contains("<title>Feed</title>"));
    assert!(out.contains(r#"xmlns:dc="http://purl.org/dc/elements/1.1/""#));
    assert_eq!(summary.kept, 2);
    assert_eq!(summary.removed, 2);
}

#[rstest]
#[case(0, 4)]
#[case(1, 3)]
#[case(3, 1)]
fn given_interrupt_after_n_decisions_when_run_then_only_rejected_items_missing(
    #[case] decided: usize,
    #[case] expected_remaining: usize,
) {
    let fx = fixture(FEED);
    let mut op = ScriptedOperator::new(std::iter::repeat(Answer::Remove).take(decided));

    let summary = service(Settings::default())
        .run(&request(&fx), &mut op)
        .unwrap();

    let out = fs::read_to_string(&fx.output).unwrap();
    assert_eq!(out.matches("<item>").count(), expected_remaining);
    assert!(summary.interrupted);
    assert_eq!(summary.removed, decided);
    assert_eq!(summary.undecided, 4 - decided);
}

#[test]
fn given_keep_list_when_run_then_exact_matches_annotated_but_not_decided() {
    let fx = fixture(FEED);
    let keep = fx.dir.join("keep.txt");
    fs::write(&keep, "  gamma!\n\nunrelated title\n").unwrap();
    let mut req = request(&fx);
    req.keep_titles = Some(keep);
    let mut op = ScriptedOperator::new([Answer::Remove; 4]);

    service(Settings::default()).run(&req, &mut op).unwrap();

    let gamma = &op.seen[2];
    assert_eq!(gamma.title, "Gamma");
    assert_eq!(gamma.matches, vec![("gamma!".to_string(), 100)]);
    assert!(op.seen[0].matches.is_empty());
    // a match only informs; the operator removed it anyway
    let out = fs::read_to_string(&fx.output).unwrap();
    assert!(!out.contains("Gamma"));
}

#[cfg(feature = "fuzzy")]
#[test]
fn given_fuzzy_settings_when_titles_differ_slightly_then_flagged_as_similar() {
    let fx = fixture(
        "<rss><channel><item><title>Weekly Digest #43</title></item><item><title>Cooking Tips</title></item></channel></rss>",
    );
    let keep = fx.dir.join("keep.txt");
    fs::write(&keep, "Weekly Digest #42\n").unwrap();
    let settings = Settings {
        fuzzy: true,
        threshold: 85,
        keep_titles: Some(keep),
        ..Default::default()
    };
    let mut op = ScriptedOperator::new([Answer::Keep, Answer::Keep]);

    service(settings).run(&request(&fx), &mut op).unwrap();

    let (entry, score) = &op.seen[0].matches[0];
    assert_eq!(entry, "Weekly Digest #42");
    assert!((85..100).contains(score), "score was {score}");
    assert!(op.seen[1].matches.is_empty());
}

#[test]
fn given_existing_output_when_run_then_fails_before_prompting_and_leaves_file() {
    let fx = fixture(FEED);
    fs::write(&fx.output, "precious").unwrap();
    let mut op = ScriptedOperator::new([Answer::Remove; 4]);

    let result = service(Settings::default()).run(&request(&fx), &mut op);

    assert!(matches!(result, Err(ApplicationError::OutputExists(_))));
    assert!(op.seen.is_empty());
    assert_eq!(fs::read_to_string(&fx.output).unwrap(), "precious");
}

#[test]
fn given_existing_output_with_force_when_run_then_replaced() {
    let fx = fixture(FEED);
    fs::write(&fx.output, "stale").unwrap();
    let mut req = request(&fx);
    req.force_overwrite = true;
    let mut op = ScriptedOperator::new([Answer::Keep; 4]);

    service(Settings::default()).run(&req, &mut op).unwrap();

    assert!(fs::read_to_string(&fx.output).unwrap().contains("Delta"));
}

#[test]
fn given_atom_feed_when_run_then_entries_reviewed_at_root() {
    let fx = fixture(
        r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Atom</title><entry><title>One</title></entry><entry><title>Two</title></entry></feed>"#,
    );
    let mut op = ScriptedOperator::new([Answer::Remove, Answer::Keep]);

    service(Settings::default())
        .run(&request(&fx), &mut op)
        .unwrap();

    let out = fs::read_to_string(&fx.output).unwrap();
    assert_eq!(op.titles(), vec!["One", "Two"]);
    assert!(out.contains(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#));
    assert!(!out.contains("One"));
    assert!(out.contains("<entry><title>Two</title></entry>"));
}

#[test]
fn given_item_without_title_when_run_then_placeholder_shown() {
    let fx = fixture("<rss><channel><item><link>x</link></item></channel></rss>");
    let mut op = ScriptedOperator::new([Answer::Keep]);

    service(Settings::default())
        .run(&request(&fx), &mut op)
        .unwrap();

    assert_eq!(op.titles(), vec!["(unable to display title of post)"]);
}

#[test]
fn given_malformed_input_when_run_then_document_error_and_no_output() {
    let fx = fixture("<rss><channel><item></channel></rss>");
    let mut op = ScriptedOperator::new([]);

    let result = service(Settings::default()).run(&request(&fx), &mut op);

    assert!(matches!(result, Err(ApplicationError::Document { .. })));
    assert!(!fx.output.exists());
}

#[test]
fn given_missing_keep_list_when_run_then_not_found() {
    let fx = fixture(FEED);
    let mut req = request(&fx);
    req.keep_titles = Some(fx.dir.join("nope.txt"));
    let mut op = ScriptedOperator::new([]);

    let result = service(Settings::default()).run(&req, &mut op);

    assert!(matches!(result, Err(ApplicationError::NotFound(_))));
}

#[test]
fn given_latin1_feed_when_run_then_titles_decoded_and_output_is_utf8() {
    let fx = fixture("");
    let mut feed = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<rss><channel><item><title>Caf".to_vec();
    feed.push(0xE9);
    feed.extend_from_slice(b"</title></item></channel></rss>\n");
    fs::write(&fx.input, feed).unwrap();
    let mut op = ScriptedOperator::new([Answer::Keep]);

    service(Settings::default())
        .run(&request(&fx), &mut op)
        .unwrap();

    assert_eq!(op.titles(), vec!["Café"]);
    let out = fs::read_to_string(&fx.output).unwrap();
    assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(out.contains("<title>Café</title>"));
}

#[test]
fn given_undeclared_non_utf8_feed_when_run_then_document_error() {
    let fx = fixture("");
    fs::write(&fx.input, b"<rss><channel><item><title>Caf\xE9</title></item></channel></rss>").unwrap();
    let mut op = ScriptedOperator::new([]);

    let result = service(Settings::default()).run(&request(&fx), &mut op);

    assert!(
        matches!(result, Err(ApplicationError::Document { .. })),
        "got {result:?}"
    );
    assert!(op.seen.is_empty());
    assert!(!fx.output.exists());
}
