//! Filter Pipeline Integration Tests
//!
//! End-to-end tests from persisted settings through compiled blocklists to
//! the composed pipeline.

use std::collections::HashSet;

use relay_sieve::moderation::{
    FilterContext, FilterPipeline, FilterReason, FilterSettings, TopicFilter, TopicFilterConfig,
};
use relay_sieve::relay_client::test_utils::{events, keys};
use relay_sieve::relay_client::Event;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ids(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.id.as_str()).collect()
}

fn flagged_nsfw(event: &Event) -> bool {
    event.hashtags().any(|tag| tag.eq_ignore_ascii_case("nsfw"))
}

/// Test a full settings-driven run with every stage enabled
#[test]
fn test_settings_to_pipeline() {
    init_tracing();

    let settings = FilterSettings::from_json(
        r##"{
            "topics": {
                "keywords": ["palestine", "election"],
                "hashtags": ["#bitcoin"],
                "emojis": ["🍉", "🐸"]
            },
            "trustActive": true,
            "nsfwFilterEnabled": true
        }"##,
    )
    .unwrap();

    let topics = settings.compile_topics().unwrap();
    let network: HashSet<String> = [keys::alice(), keys::bob(), keys::carol()].into_iter().collect();

    let context = FilterContext::from_settings(&settings, Some(&topics), Some(&network))
        .with_nsfw_predicate(flagged_nsfw);
    let pipeline = FilterPipeline::new(context);

    let input = vec![
        events::note_with_id("keep-1", &keys::alice(), "good morning"),
        events::note_with_id("evasion", &keys::alice(), "Free P4l3st1ne"),
        events::note_with_id("spaced", &keys::bob(), "vote in the e l e c t i o n"),
        events::note_with_id("tagged", &keys::bob(), "stacking").with_hashtag("Bitcoin"),
        events::note_with_id("keep-2", &keys::bob(), "stacking").with_hashtag("bitcoiners"),
        events::note_with_id("frog", &keys::carol(), "feels good 🐸"),
        events::note_with_id("melon-alone", &keys::carol(), "🍉"),
        events::note_with_id("nsfw", &keys::carol(), "look").with_hashtag("NSFW"),
        events::note_with_id("stranger", &keys::dave(), "good morning"),
    ];

    let (kept, stats) = pipeline.apply_with_stats(&input);

    assert_eq!(ids(&kept), vec!["keep-1", "keep-2", "melon-alone"]);
    assert_eq!(stats.input, 9);
    assert_eq!(stats.nsfw, 1);
    assert_eq!(stats.topic, 4);
    assert_eq!(stats.untrusted, 1);
    assert_eq!(stats.kept, 3);
    assert_eq!(stats.dropped(), 6);
}

/// Test the evasion cases end to end
#[test]
fn test_evasion_variants_are_caught() {
    let mut config = TopicFilterConfig::new();
    config.block_keyword("palestine").unwrap();
    let topics = TopicFilter::new(&config);
    let pipeline = FilterPipeline::new(FilterContext::new().with_topic_filter(&topics));

    for content in [
        "Palestine",
        "PALESTINE",
        "P4l3st1ne",
        "p a l e s t i n e",
        "free-palestine",
        "Pälestine",
        "pal\u{200B}estine",
    ] {
        let event = events::note(&keys::alice(), content);
        assert_eq!(
            pipeline.evaluate(&event),
            Some(FilterReason::Keyword("palestine".to_string())),
            "expected {:?} to be filtered",
            content
        );
    }

    let unrelated = events::note(&keys::alice(), "palatable stein");
    assert!(pipeline.allows(&unrelated));
}

/// Test emoji disambiguation through the pipeline
#[test]
fn test_watermelon_needs_context() {
    let mut config = TopicFilterConfig::new();
    config.block_emoji("🍉").unwrap();
    let topics = TopicFilter::new(&config);
    let pipeline = FilterPipeline::new(FilterContext::new().with_topic_filter(&topics));

    let input = vec![
        events::note_with_id("context", &keys::alice(), "nice day, had watermelon 🍉"),
        events::note_with_id("bare", &keys::alice(), "🍉"),
        events::note_with_id("tagged", &keys::alice(), "🍉").with_hashtag("ceasefire"),
    ];

    assert_eq!(ids(&pipeline.apply(&input)), vec!["bare"]);
}

/// Test that applying the pipeline twice changes nothing
#[test]
fn test_pipeline_is_idempotent() {
    let mut config = TopicFilterConfig::new();
    config.block_keyword("spoiler").unwrap();
    config.block_hashtag("crypto").unwrap();
    let topics = TopicFilter::new(&config);
    let network: HashSet<String> = [keys::alice(), keys::bob()].into_iter().collect();

    let pipeline = FilterPipeline::new(
        FilterContext::new()
            .with_nsfw_predicate(flagged_nsfw)
            .apply_nsfw(true)
            .with_topic_filter(&topics)
            .with_trust_network(&network, true),
    );

    let input: Vec<Event> = (0..20)
        .map(|i| {
            let author = match i % 3 {
                0 => keys::alice(),
                1 => keys::bob(),
                _ => keys::carol(),
            };
            let content = if i % 4 == 0 { "big spoiler" } else { "gm" };
            events::note_with_id(&i.to_string(), &author, content)
        })
        .collect();

    let once = pipeline.apply(&input);
    let twice = pipeline.apply(&once);

    assert_eq!(once, twice);
    assert!(once.len() < input.len());
    assert!(once.iter().all(|e| input.contains(e)));
}

/// Test that permissive settings keep everything
#[test]
fn test_permissive_settings_keep_everything() {
    let settings = FilterSettings::permissive();
    let topics = settings.compile_topics();
    let network: HashSet<String> = HashSet::new();

    let context = FilterContext::from_settings(&settings, topics.as_ref(), Some(&network))
        .with_nsfw_predicate(|_: &Event| true);
    let pipeline = FilterPipeline::new(context);

    let input = vec![
        events::note_with_id("1", &keys::alice(), "anything"),
        events::note_with_id("2", &keys::dave(), "🍉 watermelon"),
    ];

    assert_eq!(pipeline.apply(&input), input);
}

/// Test that an empty trust network never hides everything
#[test]
fn test_empty_trust_network_is_skipped() {
    let settings = FilterSettings::from_json(r#"{ "trustActive": true }"#).unwrap();
    let network: HashSet<String> = HashSet::new();

    let pipeline =
        FilterPipeline::new(FilterContext::from_settings(&settings, None, Some(&network)));

    let event = events::note(&keys::dave(), "hello");
    assert!(pipeline.allows(&event));
}

/// Test rejecting invalid persisted settings
#[test]
fn test_invalid_settings_rejected() {
    let too_many: Vec<String> = (0..501).map(|i| format!("\"term{}\"", i)).collect();
    let json = format!(r#"{{ "topics": {{ "keywords": [{}] }} }}"#, too_many.join(","));

    assert!(FilterSettings::from_json(&json).is_err());
    assert!(FilterSettings::from_json("not json").is_err());
}
