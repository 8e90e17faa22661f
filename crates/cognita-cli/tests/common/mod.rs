//! Shared test helpers for replay integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use cognita_cli::flow_file::{FlowDocument, FlowFormat};
use cognita_cli::runner::{ReplayOptions, ReplayReport, replay};
use cognita_core::clock::Clock;
use cognita_session::SessionSettings;
use cognita_test_support::{FixedClock, fixed_now};

/// Onboarding flow used across the replay tests: a welcome screen, a
/// language question, a short arithmetic round and a paywall.
pub const ONBOARDING_FLOW: &str = r#"
flow_id: 0192f0c1-0000-7000-8000-000000000001
category: onboarding
steps:
  - kind: welcome
    entity_id: welcome
    copy:
      headline: Welcome
      subtext: Train your brain daily
      cta: Continue
  - kind: language_game
    entity_id: lang-1
    content_ref: lang-1
    copy:
      headline: Pick the right word
  - kind: arithmetic_game
    content_ref: math-1
    copy:
      headline: Quick maths
  - kind: paywall
    entity_id: paywall
    config:
      plan: annual
    copy:
      headline: Go premium
content:
  - entity_id: lang-1
    payload:
      type: mental_language_discrimination
      sentenceParts: ["She", "to school every day."]
      options: ["go", "goes", "going"]
      answer: goes
  - entity_id: math-1
    payload:
      type: mental_arithmetic
      operandRange: [1, 9]
      operators: ["+", "x"]
translations:
  es:
    - { entity_id: welcome, field: headline, text: Bienvenido }
    - { entity_id: welcome, field: subtext, text: "" }
    - { entity_id: lang-1, field: option.0, text: ir }
    - { entity_id: lang-1, field: option.1, text: va }
    - { entity_id: lang-1, field: option.2, text: yendo }
    - { entity_id: paywall, field: headline, text: Hazte premium }
"#;

/// Fixed timestamp used across all integration tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(fixed_now()))
}

/// Replay options with three arithmetic rounds and no time limit.
pub fn options(locale: &str) -> ReplayOptions {
    ReplayOptions {
        locale: locale.to_owned(),
        seed: 7,
        settings: SessionSettings::new(3, None).unwrap(),
    }
}

/// Parses a YAML flow document.
pub fn parse(yaml: &str) -> FlowDocument {
    FlowDocument::parse(yaml, FlowFormat::Yaml).unwrap()
}

/// Replays `yaml` in `locale` with the fixed clock.
pub async fn replay_yaml(yaml: &str, locale: &str) -> ReplayReport {
    replay(&parse(yaml), &options(locale), fixed_clock())
        .await
        .unwrap()
}
