//! Plugin directory integration tests
//! Run with: cargo test --test registry_test

use std::sync::Arc;

use chrono::Utc;

use pingu::application::runtime::{BuildInfo, Runtime, RuntimeOptions, Session};
use pingu::domain::entities::{InboundMessage, TransportEvent};
use pingu::domain::traits::Transport;
use pingu::infrastructure::adapters::MemoryTransport;
use pingu::infrastructure::config::Config;
use pingu::infrastructure::plugins::{Catalog, PluginRegistry};

fn plugin_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("20-ping.yaml"), "entry: ping\n").unwrap();
    std::fs::write(dir.path().join("10-help.yaml"), "entry: help\n").unwrap();
    std::fs::write(dir.path().join("30-jira.yml"), "entry: jira\nenabled: false\n").unwrap();
    std::fs::write(dir.path().join(".40-broken.yaml"), "entry: nothing\n").unwrap();
    std::fs::write(dir.path().join("README.md"), "not a manifest\n").unwrap();
    dir
}

#[test]
fn test_builtin_plugins_load_in_file_name_order() {
    let dir = plugin_dir();

    let registry = PluginRegistry::load(dir.path(), &Config::default(), &Catalog::builtin()).unwrap();

    assert_eq!(registry.names(), vec!["Help", "Ping"]);
}

#[test]
fn test_plugin_needing_missing_section_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("aoc.yaml"), "entry: aoc\n").unwrap();

    assert!(PluginRegistry::load(dir.path(), &Config::default(), &Catalog::builtin()).is_err());
}

#[tokio::test]
async fn test_loaded_plugins_answer_commands() {
    let dir = plugin_dir();
    let registry = PluginRegistry::load(dir.path(), &Config::default(), &Catalog::builtin()).unwrap();

    let transport = Arc::new(MemoryTransport::new().with_events(vec![
        TransportEvent::Connected,
        TransportEvent::Message(InboundMessage::new("U1", "C1", "!ping")),
        TransportEvent::Message(InboundMessage::new("U1", "C1", "!version")),
    ]));
    let session = Arc::new(Session::new(
        "Pingu",
        BuildInfo::new("dev", Utc::now()),
        Arc::new(registry),
        Arc::clone(&transport) as Arc<dyn Transport>,
    ));

    Runtime::new(session, RuntimeOptions::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        transport.texts(),
        vec!["<@U1>: My current latency towards Slack is 0s."]
    );
}
