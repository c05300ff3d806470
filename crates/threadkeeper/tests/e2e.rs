// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests from a TOML configuration to a finished archive run.
//!
//! Each test loads a config the way `serve` does, builds the workflow over an
//! in-memory platform and drives it with reaction and control events.

use std::sync::Arc;

use threadkeeper_core::types::{ChannelId, ReactionEmoji, ReactionEvent};
use threadkeeper_test_utils::harness::TEST_GUILD;
use threadkeeper_test_utils::{human, MockPlatform, Operation};
use threadkeeper_workflow::{ArchiveOutcome, ReactionOutcome, Workflow, WorkflowSettings};

fn config_toml(monitored: ChannelId, completion: &str) -> String {
    format!(
        r#"
[discord]
bot_token = "test-token"
monitored_channel_id = {monitored}
completion_channel = "{completion}"

[archive]
pacing_ms = 0
"#
    )
}

async fn workflow_from(platform: &Arc<MockPlatform>, toml: &str) -> Workflow {
    let config = threadkeeper_config::load_and_validate_str(toml).expect("config loads");
    threadkeeper_config::validate_for_serve(&config).expect("config is servable");
    let settings = WorkflowSettings::from_config(&config).unwrap();
    Workflow::connect(platform.clone(), settings).await.unwrap()
}

fn checkmark(channel: ChannelId, message: threadkeeper_core::MessageId) -> ReactionEvent {
    ReactionEvent {
        emoji: ReactionEmoji::Unicode("✔️".into()),
        user: human(20, "carol"),
        channel_id: channel,
        message_id: message,
        guild_id: Some(TEST_GUILD),
    }
}

// ---- Completion channel addressed by name ----

#[tokio::test]
async fn configured_workflow_archives_into_named_channel() {
    let platform = Arc::new(MockPlatform::new());
    let monitored = platform.add_text_channel(TEST_GUILD, "tasks").await;
    let done = platform.add_text_channel(TEST_GUILD, "done").await;
    let workflow = workflow_from(&platform, &config_toml(monitored, "#done")).await;

    let alice = human(10, "alice");
    let starter = platform.post(monitored, &alice, "Ship the release").await;
    let thread = platform.add_thread(monitored, "Ship the release", Some(starter)).await;
    platform.post(thread, &alice, "tagged v1.2").await;

    let outcome = workflow
        .process_reaction(&checkmark(monitored, starter))
        .await
        .unwrap();
    let ReactionOutcome::Completed(ArchiveOutcome::Archived(record)) = outcome else {
        panic!("expected an archived thread, got {outcome:?}");
    };

    assert_eq!(record.completion_channel, done);
    assert_eq!(record.source_thread, thread);
    assert_eq!(platform.threads_in(done).await.len(), 1);
    assert!(record.control_attached);
}

// ---- Completion channel addressed by id ----

#[tokio::test]
async fn configured_workflow_archives_into_channel_by_id() {
    let platform = Arc::new(MockPlatform::new());
    let monitored = platform.add_text_channel(TEST_GUILD, "tasks").await;
    let done = platform.add_text_channel(TEST_GUILD, "archive").await;
    let workflow = workflow_from(&platform, &config_toml(monitored, &done.to_string())).await;

    let bob = human(11, "bob");
    let message = platform.post(monitored, &bob, "Renew the certificate").await;

    let outcome = workflow
        .process_reaction(&checkmark(monitored, message))
        .await
        .unwrap();
    let ReactionOutcome::Completed(ArchiveOutcome::Standalone {
        completion_channel, ..
    }) = outcome
    else {
        panic!("expected a standalone notice, got {outcome:?}");
    };
    assert_eq!(completion_channel, done);
    assert_eq!(platform.call_count(Operation::FindChannel).await, 0);
}

// ---- Startup preparation ----

#[tokio::test]
async fn missing_named_channel_is_created_at_startup() {
    let platform = Arc::new(MockPlatform::new());
    let monitored = platform.add_text_channel(TEST_GUILD, "tasks").await;
    let workflow = workflow_from(&platform, &config_toml(monitored, "finished")).await;

    let created = workflow
        .ensure_completion_channel(TEST_GUILD)
        .await
        .unwrap()
        .expect("channel created");
    assert_eq!(platform.call_count(Operation::CreateChannel).await, 1);
    assert_eq!(platform.channel_info(created).await.unwrap().name, "finished");

    // A second ready event finds the existing channel.
    let again = workflow.ensure_completion_channel(TEST_GUILD).await.unwrap();
    assert_eq!(again, Some(created));
    assert_eq!(platform.call_count(Operation::CreateChannel).await, 1);
}

#[test]
fn config_without_monitored_channel_cannot_serve() {
    let config = threadkeeper_config::load_and_validate_str(
        "[discord]\nbot_token = \"t\"\n",
    )
    .unwrap();
    assert!(threadkeeper_config::validate_for_serve(&config).is_err());
    assert!(WorkflowSettings::from_config(&config).is_err());
}
