// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end archive and reopen scenarios against the in-memory platform.

use threadkeeper_core::types::{ChannelId, HealthStatus, ReactionEmoji, ReactionEvent, ThreadState};
use threadkeeper_core::ThreadkeeperError;
use threadkeeper_test_utils::harness::TEST_GUILD;
use threadkeeper_test_utils::{human, Operation, TestHarness};
use threadkeeper_workflow::correlation::short_task_id;
use threadkeeper_workflow::reopener::ReopenStep;
use threadkeeper_workflow::render::CLOSING_MARKER;
use threadkeeper_workflow::{
    ArchiveOutcome, ArchiveRecord, ComponentOutcome, IgnoreReason, ReactionOutcome, ReopenReport,
    StepOutcome, TRIGGER_MARK,
};
use tracing_test::traced_test;

fn archived(outcome: ReactionOutcome) -> ArchiveRecord {
    match outcome {
        ReactionOutcome::Completed(ArchiveOutcome::Archived(record)) => record,
        other => panic!("expected an archived thread, got {other:?}"),
    }
}

fn reopened(outcome: ComponentOutcome) -> ReopenReport {
    match outcome {
        ComponentOutcome::Reopened(report) => report,
        other => panic!("expected a reopen report, got {other:?}"),
    }
}

/// Archives a three-reply thread and returns the harness, the starter
/// message and the record.
async fn archived_thread() -> (TestHarness, threadkeeper_core::MessageId, ArchiveRecord) {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let bob = human(11, "bob");
    let (starter, _) = harness
        .thread_with_replies(
            "Fix the build",
            &alice,
            &[(&alice, "it's red"), (&bob, "pushed a fix"), (&alice, "green now")],
        )
        .await;
    let record = archived(
        harness
            .react(&alice, harness.monitored, starter, "✅")
            .await
            .unwrap(),
    );
    (harness, starter, record)
}

#[tokio::test]
async fn checkmark_on_thread_starter_archives_the_thread() {
    let (harness, starter, record) = archived_thread().await;
    let platform = &harness.platform;
    let completion = harness.completion();

    assert_eq!(record.completion_channel, completion);
    assert_eq!(record.stats.message_count, 3);
    assert_eq!(record.stats.participants, 2);
    assert!(!record.stats.truncated);
    assert!(record.control_attached);
    assert_eq!(record.failed_posts, 0);

    // Anchor: header with stats and correlation tag.
    let anchor = platform
        .stored_message(completion, record.anchor)
        .await
        .expect("anchor posted");
    assert!(anchor.content.contains("alice"));
    assert_eq!(anchor.thread_id, Some(record.transcript));
    let (_, header) = platform
        .sent()
        .await
        .into_iter()
        .find(|(channel, _)| *channel == completion)
        .expect("header sent");
    let embed = header.embed.expect("header embed");
    let stats = &embed.fields[0].value;
    assert!(stats.contains("Messages: 3"), "{stats}");
    assert!(stats.contains("Participants: 2"), "{stats}");
    assert!(
        embed
            .footer
            .as_deref()
            .is_some_and(|f| f.contains(&format!("ref:{}", record.source_thread)))
    );

    // Reopen control carries both ids.
    let buttons = platform.buttons(record.anchor).await;
    assert_eq!(buttons.len(), 1);
    assert_eq!(
        buttons[0].custom_id,
        format!("tk1_reopen_{}_{}", record.source_thread, record.anchor)
    );

    // The finished anchor links both the source and its transcript.
    let finished = platform.rendered(record.anchor).await.expect("anchor rendered");
    let links = finished
        .embed
        .expect("anchor embed")
        .fields
        .into_iter()
        .find(|f| f.name == "🔗 Links")
        .expect("links field")
        .value;
    assert_eq!(
        links,
        format!(
            "• [Original Thread](https://chat.test/channels/42/{})\n\
             • [Archive Copy](https://chat.test/channels/42/{})",
            record.source_thread, record.transcript
        )
    );
    assert_eq!(finished.buttons, buttons);

    // Transcript: entries in order, then the closing marker.
    let transcript = platform.messages(record.transcript).await;
    let texts: Vec<&str> = transcript.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts.len(), 4);
    assert!(texts[0].starts_with("**alice**") && texts[0].ends_with("it's red"));
    assert!(texts[1].starts_with("**bob**") && texts[1].ends_with("pushed a fix"));
    assert!(texts[2].ends_with("green now"));
    assert_eq!(texts[3], CLOSING_MARKER);
    let info = platform.channel_info(record.transcript).await.unwrap();
    assert_eq!(info.name, "✅ Fix the build");

    // Source: notice, then marker, then closed.
    let source = platform.channel_info(record.source_thread).await.unwrap();
    assert_eq!(source.thread_state, Some(ThreadState::CLOSED));
    let notice = platform.messages(record.source_thread).await.pop().unwrap();
    assert!(notice.content.contains("marked complete by <@10>"));
    let starter_msg = platform
        .stored_message(harness.monitored, starter)
        .await
        .unwrap();
    assert!(starter_msg.has_own_reaction(TRIGGER_MARK));

    let calls = platform.calls().await;
    let position = |op: Operation, channel: ChannelId| {
        calls
            .iter()
            .rposition(|c| c.op == op && c.channel == Some(channel))
            .unwrap()
    };
    let notice_at = position(Operation::Send, record.source_thread);
    let mark_at = position(Operation::React, harness.monitored);
    let lock_at = position(Operation::SetThreadState, record.source_thread);
    assert!(notice_at < mark_at && mark_at < lock_at);

    assert!(harness.workflow.claims().is_empty());
}

#[tokio::test]
async fn non_checkmark_reactions_are_ignored() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let (starter, _) = harness.thread_with_replies("t", &alice, &[]).await;

    let outcome = harness
        .react(&alice, harness.monitored, starter, "👍")
        .await
        .unwrap();
    assert_eq!(outcome, ReactionOutcome::Ignored(IgnoreReason::NotCheckmark));
    assert!(harness.platform.calls().await.is_empty());
}

#[tokio::test]
async fn bot_reactions_are_ignored() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let (starter, _) = harness.thread_with_replies("t", &alice, &[]).await;
    let bot = harness.platform.bot_user();

    let outcome = harness
        .react(&bot, harness.monitored, starter, "✅")
        .await
        .unwrap();
    assert_eq!(outcome, ReactionOutcome::Ignored(IgnoreReason::BotUser));
}

#[tokio::test]
async fn reactions_outside_the_monitored_channel_are_ignored() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let elsewhere = harness
        .platform
        .add_text_channel(TEST_GUILD, "random")
        .await;
    let message = harness.platform.post(elsewhere, &alice, "hello").await;

    let outcome = harness.react(&alice, elsewhere, message, "✅").await.unwrap();
    assert_eq!(outcome, ReactionOutcome::Ignored(IgnoreReason::OutsideScope));
    assert_eq!(harness.platform.call_count(Operation::Send).await, 0);
}

#[tokio::test]
async fn second_checkmark_produces_no_second_record() {
    let (harness, starter, _) = archived_thread().await;
    let bob = human(11, "bob");
    let before = harness.platform.messages(harness.completion()).await.len();

    let outcome = harness
        .react(&bob, harness.monitored, starter, "✔️")
        .await
        .unwrap();
    assert_eq!(outcome, ReactionOutcome::Ignored(IgnoreReason::AlreadyMarked));
    assert_eq!(
        harness.platform.messages(harness.completion()).await.len(),
        before
    );
}

#[tokio::test(start_paused = true)]
async fn simultaneous_checkmarks_archive_once() {
    let harness = TestHarness::builder()
        .with_pacing_ms(250)
        .build()
        .await
        .unwrap();
    let alice = human(10, "alice");
    let bob = human(11, "bob");
    let (starter, _) = harness
        .thread_with_replies("race", &alice, &[(&alice, "a"), (&bob, "b")])
        .await;

    let (first, second) = tokio::join!(
        harness.react(&alice, harness.monitored, starter, "✅"),
        harness.react(&bob, harness.monitored, starter, "☑️"),
    );
    let outcomes = [first.unwrap(), second.unwrap()];

    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, ReactionOutcome::Completed(_)))
        .count();
    assert_eq!(completed, 1);
    assert!(outcomes.iter().any(|o| matches!(
        o,
        ReactionOutcome::AlreadyClaimed | ReactionOutcome::Ignored(IgnoreReason::AlreadyMarked)
    )));
    assert_eq!(harness.platform.messages(harness.completion()).await.len(), 1);
    assert_eq!(harness.platform.threads_in(harness.completion()).await.len(), 1);
}

#[tokio::test]
async fn held_claim_is_reported_as_an_outcome() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let (starter, _) = harness.thread_with_replies("Deploy", &alice, &[]).await;

    let held = harness.workflow.claims().try_claim(starter).expect("claim");
    let outcome = harness
        .react(&alice, harness.monitored, starter, "✅")
        .await
        .unwrap();
    assert_eq!(outcome, ReactionOutcome::AlreadyClaimed);
    assert_eq!(harness.platform.call_count(Operation::Send).await, 0);

    drop(held);
    let outcome = harness
        .react(&alice, harness.monitored, starter, "✅")
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        ReactionOutcome::Completed(ArchiveOutcome::Archived(_))
    ));
}

#[tokio::test]
async fn long_threads_are_truncated_with_a_warning() {
    let harness = TestHarness::builder()
        .with_fetch_limit(5)
        .build()
        .await
        .unwrap();
    let alice = human(10, "alice");
    let replies: Vec<String> = (1..=8).map(|i| format!("reply {i}")).collect();
    let pairs: Vec<_> = replies.iter().map(|r| (&alice, r.as_str())).collect();
    let (starter, _) = harness.thread_with_replies("long", &alice, &pairs).await;

    let record = archived(
        harness
            .react(&alice, harness.monitored, starter, "✅")
            .await
            .unwrap(),
    );
    assert!(record.stats.truncated);
    assert_eq!(record.stats.message_count_text(), "5+ (truncated)");

    let transcript = harness.platform.messages(record.transcript).await;
    assert!(transcript[0].content.contains("more than 5 messages"));
    // The most recent five, oldest first.
    assert!(transcript[1].content.ends_with("reply 4"));
    assert!(transcript[5].content.ends_with("reply 8"));
    assert_eq!(transcript[6].content, CLOSING_MARKER);
    assert_eq!(transcript.len(), 7);
}

#[tokio::test]
async fn long_messages_are_chunked_and_system_messages_skipped() {
    let harness = TestHarness::builder()
        .with_chunk_limit(60)
        .build()
        .await
        .unwrap();
    let alice = human(10, "alice");
    let long = "x".repeat(150);
    let (starter, thread) = harness
        .thread_with_replies("chunky", &alice, &[(&alice, long.as_str())])
        .await;
    harness.platform.post_system(thread, "alice pinned a message").await;

    let record = archived(
        harness
            .react(&alice, harness.monitored, starter, "✅")
            .await
            .unwrap(),
    );

    let transcript = harness.platform.messages(record.transcript).await;
    assert!(transcript.iter().all(|m| m.content.chars().count() <= 60));
    let xs: usize = transcript
        .iter()
        .map(|m| m.content.matches('x').count())
        .sum();
    assert_eq!(xs, 150);
    assert!(transcript.iter().all(|m| !m.content.contains("pinned")));
    assert_eq!(transcript.last().unwrap().content, CLOSING_MARKER);
}

#[tokio::test]
async fn checkmark_inside_a_thread_archives_it() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let bob = human(11, "bob");
    let (_, thread) = harness
        .thread_with_replies("inner", &alice, &[(&bob, "done?")])
        .await;
    let reply = harness.platform.post(thread, &alice, "yes").await;

    let record = archived(harness.react(&alice, thread, reply, "✅").await.unwrap());
    assert_eq!(record.source_thread, thread);
    let marked = harness.platform.stored_message(thread, reply).await.unwrap();
    assert!(marked.has_own_reaction(TRIGGER_MARK));
    assert_eq!(
        harness.platform.channel_info(thread).await.unwrap().thread_state,
        Some(ThreadState::CLOSED)
    );
}

#[tokio::test]
async fn standalone_message_gets_a_notice() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let bob = human(11, "bob");
    let message = harness
        .platform
        .post(harness.monitored, &alice, "order more coffee")
        .await;

    let outcome = harness
        .react(&bob, harness.monitored, message, "✅")
        .await
        .unwrap();
    let ReactionOutcome::Completed(ArchiveOutcome::Standalone { notice, .. }) = outcome else {
        panic!("expected a standalone notice, got {outcome:?}");
    };

    let completion = harness.platform.messages(harness.completion()).await;
    assert_eq!(completion.len(), 2);
    assert_eq!(completion[0].id, notice);
    assert!(completion[0].content.contains("**Task:** order more coffee"));
    assert!(completion[0].content.contains("**Originally posted by:** alice"));
    assert!(completion[0].content.contains("**Marked complete by:** bob"));
    assert_eq!(completion[1].embed_count, 1);

    let marked = harness
        .platform
        .stored_message(harness.monitored, message)
        .await
        .unwrap();
    assert!(marked.has_own_reaction(TRIGGER_MARK));
}

#[tokio::test]
async fn summary_embed_can_be_disabled() {
    let harness = TestHarness::builder()
        .without_summary_embed()
        .build()
        .await
        .unwrap();
    let alice = human(10, "alice");
    let message = harness.platform.post(harness.monitored, &alice, "x").await;

    harness
        .react(&alice, harness.monitored, message, "✅")
        .await
        .unwrap();
    assert_eq!(harness.platform.messages(harness.completion()).await.len(), 1);
}

#[tokio::test]
async fn missing_completion_channel_aborts_before_side_effects() {
    let harness = TestHarness::builder()
        .without_completion_channel()
        .build()
        .await
        .unwrap();
    let alice = human(10, "alice");
    let (starter, thread) = harness
        .thread_with_replies("t", &alice, &[(&alice, "a")])
        .await;

    let err = harness
        .react(&alice, harness.monitored, starter, "✅")
        .await
        .unwrap_err();
    assert!(matches!(err, ThreadkeeperError::NotFound { .. }), "{err:?}");
    assert_eq!(harness.platform.call_count(Operation::Send).await, 0);
    assert_eq!(harness.platform.call_count(Operation::React).await, 0);
    assert_eq!(
        harness.platform.channel_info(thread).await.unwrap().thread_state,
        Some(ThreadState::OPEN)
    );
    assert!(harness.workflow.claims().is_empty());
}

#[tokio::test]
async fn completion_channel_by_id() {
    let harness = TestHarness::builder()
        .with_completion_by_id()
        .build()
        .await
        .unwrap();
    let alice = human(10, "alice");
    let (starter, _) = harness
        .thread_with_replies("t", &alice, &[(&alice, "a")])
        .await;

    let record = archived(
        harness
            .react(&alice, harness.monitored, starter, "✅")
            .await
            .unwrap(),
    );
    assert_eq!(record.completion_channel, harness.completion());
}

#[tokio::test]
async fn failed_thread_start_removes_the_anchor() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let (starter, thread) = harness
        .thread_with_replies("t", &alice, &[(&alice, "a")])
        .await;
    harness.platform.fail(Operation::StartThread).await;

    let result = harness.react(&alice, harness.monitored, starter, "✅").await;
    assert!(result.is_err());
    assert!(harness.platform.messages(harness.completion()).await.is_empty());
    assert_eq!(
        harness.platform.channel_info(thread).await.unwrap().thread_state,
        Some(ThreadState::OPEN)
    );
    let starter_msg = harness
        .platform
        .stored_message(harness.monitored, starter)
        .await
        .unwrap();
    assert!(!starter_msg.has_own_reaction(TRIGGER_MARK));
}

#[tokio::test]
async fn rejected_transcript_posts_are_skipped() {
    // Above the platform's 2000-character cap, so the oversized entry is
    // refused while the rest of the run continues.
    let harness = TestHarness::builder()
        .with_chunk_limit(2500)
        .build()
        .await
        .unwrap();
    let alice = human(10, "alice");
    let huge = "z".repeat(2100);
    let (starter, thread) = harness
        .thread_with_replies("big", &alice, &[(&alice, huge.as_str()), (&alice, "small")])
        .await;

    let record = archived(
        harness
            .react(&alice, harness.monitored, starter, "✅")
            .await
            .unwrap(),
    );
    assert_eq!(record.failed_posts, 1);
    assert_eq!(record.posted, 2);
    let transcript = harness.platform.messages(record.transcript).await;
    assert!(transcript[0].content.ends_with("small"));
    assert_eq!(transcript[1].content, CLOSING_MARKER);
    assert_eq!(
        harness.platform.channel_info(thread).await.unwrap().thread_state,
        Some(ThreadState::CLOSED)
    );
}

#[tokio::test]
async fn failed_closure_notice_still_locks_the_thread() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = human(10, "alice");
    let (starter, thread) = harness
        .thread_with_replies("t", &alice, &[(&alice, "a")])
        .await;
    harness.platform.fail_in(Operation::Send, thread).await;

    archived(
        harness
            .react(&alice, harness.monitored, starter, "✅")
            .await
            .unwrap(),
    );
    assert_eq!(
        harness.platform.channel_info(thread).await.unwrap().thread_state,
        Some(ThreadState::CLOSED)
    );
    let starter_msg = harness
        .platform
        .stored_message(harness.monitored, starter)
        .await
        .unwrap();
    assert!(starter_msg.has_own_reaction(TRIGGER_MARK));
}

#[tokio::test]
async fn reopen_reverses_the_archive() {
    let (harness, starter, record) = archived_thread().await;
    let bob = human(11, "bob");
    let completion = harness.completion();
    let custom_id = harness.platform.buttons(record.anchor).await[0]
        .custom_id
        .clone();

    let report = reopened(
        harness
            .press(&bob, completion, record.anchor, &custom_id)
            .await
            .unwrap(),
    );
    assert!(report.fully_reopened(), "{report:?}");

    let platform = &harness.platform;
    assert!(platform.stored_message(completion, record.anchor).await.is_none());
    assert!(platform.channel_info(record.transcript).await.is_none());
    assert_eq!(
        platform
            .channel_info(record.source_thread)
            .await
            .unwrap()
            .thread_state,
        Some(ThreadState::OPEN)
    );
    let starter_msg = platform
        .stored_message(harness.monitored, starter)
        .await
        .unwrap();
    assert!(!starter_msg.has_own_reaction(TRIGGER_MARK));

    let in_thread = platform.messages(record.source_thread).await.pop().unwrap();
    assert!(in_thread.content.contains("reopened by <@11>"));
    let in_parent = platform.messages(harness.monitored).await.pop().unwrap();
    assert!(in_parent.content.contains("**Fix the build** was reopened"));

    let replies = platform.private_replies().await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("has been reopened"));

    // The thread can be archived again.
    let again = harness
        .react(&bob, harness.monitored, starter, "✅")
        .await
        .unwrap();
    assert!(matches!(
        again,
        ReactionOutcome::Completed(ArchiveOutcome::Archived(_))
    ));
}

#[tokio::test]
async fn reopen_sweeps_only_tagged_bot_messages() {
    let (harness, _, record) = archived_thread().await;
    let completion = harness.completion();
    let bot = harness.platform.bot_user();
    let tagged = harness
        .platform
        .post(completion, &bot, &format!("leftover ref:{}", record.source_thread))
        .await;
    let suffix_only = harness
        .platform
        .post(
            completion,
            &bot,
            &format!("Task ID: {}", short_task_id(record.source_thread)),
        )
        .await;
    let human_tagged = harness
        .platform
        .post(
            completion,
            &human(12, "carol"),
            &format!("see ref:{}", record.source_thread),
        )
        .await;

    let custom_id = harness.platform.buttons(record.anchor).await[0]
        .custom_id
        .clone();
    let report = reopened(
        harness
            .press(&human(10, "alice"), completion, record.anchor, &custom_id)
            .await
            .unwrap(),
    );

    assert_eq!(report.swept, 1);
    assert!(harness.platform.stored_message(completion, tagged).await.is_none());
    assert!(harness.platform.stored_message(completion, suffix_only).await.is_some());
    assert!(harness.platform.stored_message(completion, human_tagged).await.is_some());
}

#[tokio::test]
async fn reopen_reports_partial_failure() {
    let (harness, _, record) = archived_thread().await;
    harness.platform.fail(Operation::DeleteChannel).await;
    let custom_id = harness.platform.buttons(record.anchor).await[0]
        .custom_id
        .clone();

    let report = reopened(
        harness
            .press(&human(10, "alice"), harness.completion(), record.anchor, &custom_id)
            .await
            .unwrap(),
    );
    assert!(!report.fully_reopened());
    assert!(matches!(
        report.outcome(ReopenStep::DeleteTranscript),
        Some(StepOutcome::Failed(_))
    ));
    assert_eq!(report.outcome(ReopenStep::UnlockSource), Some(&StepOutcome::Done));
    assert_eq!(
        harness
            .platform
            .channel_info(record.source_thread)
            .await
            .unwrap()
            .thread_state,
        Some(ThreadState::OPEN)
    );

    let reply = harness.platform.private_replies().await.pop().unwrap();
    assert!(reply.contains("partially reopened"));
    assert!(reply.contains("delete transcript thread"));
}

#[tokio::test]
async fn reopen_finds_transcript_when_payload_omits_thread() {
    let (harness, _, record) = archived_thread().await;
    let completion = harness.completion();
    let custom_id = harness.platform.buttons(record.anchor).await[0]
        .custom_id
        .clone();
    let mut delivered = harness
        .platform
        .stored_message(completion, record.anchor)
        .await
        .unwrap();
    delivered.thread_id = None;

    let report = reopened(
        harness
            .press_on(&human(10, "alice"), delivered, &custom_id)
            .await
            .unwrap(),
    );
    assert_eq!(
        report.outcome(ReopenStep::DeleteTranscript),
        Some(&StepOutcome::Done)
    );
    assert!(report.fully_reopened(), "{report:?}");
    assert!(harness.platform.channel_info(record.transcript).await.is_none());
}

#[tokio::test]
async fn reopen_without_locatable_transcript_is_partial() {
    let (harness, _, record) = archived_thread().await;
    let completion = harness.completion();
    harness
        .platform
        .edit(completion, record.anchor, |m| m.thread_id = None)
        .await;
    let custom_id = harness.platform.buttons(record.anchor).await[0]
        .custom_id
        .clone();

    let report = reopened(
        harness
            .press(&human(10, "alice"), completion, record.anchor, &custom_id)
            .await
            .unwrap(),
    );
    assert!(matches!(
        report.outcome(ReopenStep::DeleteTranscript),
        Some(StepOutcome::Failed(_))
    ));
    assert!(!report.fully_reopened());
    assert_eq!(report.outcome(ReopenStep::UnlockSource), Some(&StepOutcome::Done));
    assert!(harness.platform.channel_info(record.transcript).await.is_some());

    let reply = harness.platform.private_replies().await.pop().unwrap();
    assert!(reply.contains("partially reopened"));
    assert!(reply.contains("delete transcript thread"));
}

#[tokio::test]
async fn reopen_with_deleted_source_falls_back_to_monitored_channel() {
    let (harness, _, record) = archived_thread().await;
    harness.platform.remove_channel(record.source_thread).await;
    let custom_id = harness.platform.buttons(record.anchor).await[0]
        .custom_id
        .clone();

    let report = reopened(
        harness
            .press(&human(10, "alice"), harness.completion(), record.anchor, &custom_id)
            .await
            .unwrap(),
    );
    assert!(!report.fully_reopened());
    assert_eq!(report.outcome(ReopenStep::Announce), Some(&StepOutcome::Done));
    assert!(harness.platform.channel_info(record.transcript).await.is_none());

    let fallback = harness
        .platform
        .messages(harness.monitored)
        .await
        .pop()
        .unwrap();
    assert!(fallback.content.contains("could not be found"));
    let reply = harness.platform.private_replies().await.pop().unwrap();
    assert!(reply.contains("could not be found"));
}

#[tokio::test]
async fn stale_control_layout_is_rejected() {
    let (harness, _, record) = archived_thread().await;

    let outcome = harness
        .press(
            &human(10, "alice"),
            harness.completion(),
            record.anchor,
            &format!("reopen_{}", record.source_thread),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, ComponentOutcome::Rejected(_)));
    assert!(
        harness
            .platform
            .stored_message(harness.completion(), record.anchor)
            .await
            .is_some()
    );
    let reply = harness.platform.private_replies().await.pop().unwrap();
    assert!(reply.contains("no longer valid"));
}

#[tokio::test]
async fn completion_channel_is_created_on_demand() {
    let harness = TestHarness::builder()
        .without_completion_channel()
        .build()
        .await
        .unwrap();

    let created = harness
        .workflow
        .ensure_completion_channel(TEST_GUILD)
        .await
        .unwrap()
        .expect("channel created");
    assert_eq!(
        harness.platform.channel_info(created).await.unwrap().name,
        "completed-tasks"
    );

    // Second call finds the same channel.
    let found = harness
        .workflow
        .ensure_completion_channel(TEST_GUILD)
        .await
        .unwrap();
    assert_eq!(found, Some(created));
    assert_eq!(harness.platform.call_count(Operation::CreateChannel).await, 1);
}

#[tokio::test]
async fn missing_channel_by_id_is_not_created() {
    let harness = TestHarness::builder()
        .with_completion_by_id()
        .without_completion_channel()
        .build()
        .await
        .unwrap();

    let found = harness
        .workflow
        .ensure_completion_channel(TEST_GUILD)
        .await
        .unwrap();
    assert_eq!(found, None);
    assert_eq!(harness.platform.call_count(Operation::CreateChannel).await, 0);
}

#[tokio::test]
#[traced_test]
async fn event_entry_point_logs_instead_of_failing() {
    let harness = TestHarness::builder()
        .without_completion_channel()
        .build()
        .await
        .unwrap();
    let alice = human(10, "alice");
    let (starter, _) = harness
        .thread_with_replies("t", &alice, &[(&alice, "a")])
        .await;

    harness
        .workflow
        .on_reaction(ReactionEvent {
            emoji: ReactionEmoji::Unicode("✅".into()),
            user: alice,
            channel_id: harness.monitored,
            message_id: starter,
            guild_id: Some(TEST_GUILD),
        })
        .await;

    assert!(logs_contain("archive run failed"));
    assert!(logs_contain("completion channel not found"));
}

// ---- Adapter lifecycle ----

#[tokio::test]
async fn unhealthy_platform_refuses_to_connect() {
    let result = TestHarness::builder()
        .with_health(HealthStatus::Unhealthy("token revoked".into()))
        .build()
        .await;
    let Err(ThreadkeeperError::Platform { message, .. }) = result else {
        panic!("expected a platform error");
    };
    assert!(message.contains("mock-platform adapter is unhealthy: token revoked"));
}

#[tokio::test]
#[traced_test]
async fn degraded_platform_connects_with_a_warning() {
    let harness = TestHarness::builder()
        .with_health(HealthStatus::Degraded("rate limited".into()))
        .build()
        .await
        .unwrap();
    assert!(logs_contain("platform degraded"));
    assert!(logs_contain("rate limited"));
    assert!(harness.workflow.settings().fetch_limit > 0);
}

#[tokio::test]
async fn shutdown_releases_the_platform_adapter() {
    let harness = TestHarness::builder().build().await.unwrap();
    assert_eq!(harness.platform.shutdowns().await, 0);
    harness.workflow.shutdown().await.unwrap();
    assert_eq!(harness.platform.shutdowns().await, 1);
}
