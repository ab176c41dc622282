//! Integration tests for the notification loop, driven by the recording
//! mock platform.

use std::fs;
use tempfile::TempDir;

use libboorucast::mentions::{self, DELETE_COMMAND};
use libboorucast::platforms::mock::MockPlatform;
use libboorucast::state::CursorFile;
use libboorucast::types::{Notification, NotificationKind, StatusInfo, Visibility};
use libboorucast::Config;

fn test_config() -> Config {
    Config {
        base_url: "https://example.social".to_string(),
        client_id: "cid".to_string(),
        client_secret: "csecret".to_string(),
        access_token: "token".to_string(),
        post_interval: 30,
        required_tags: vec!["scenery".to_string()],
        forbidden_tags: vec![],
        message: "I am a bot, a human will get back to you.".to_string(),
        maintainer: "alice".to_string(),
        state_file: "unused".to_string(),
    }
}

fn mention(id: u64, sender: &str, html: &str, visibility: Visibility) -> Notification {
    Notification {
        id,
        kind: NotificationKind::Mention,
        status: Some(StatusInfo {
            id: format!("status-{id}"),
            content_html: html.to_string(),
            sender: sender.to_string(),
            visibility,
            mentioned: vec![],
            in_reply_to_id: None,
        }),
    }
}

/// A state file seeded with `value`, or pristine when `None`.
fn cursor_file(dir: &TempDir, value: Option<u64>) -> CursorFile {
    let path = dir.path().join("state");
    if let Some(value) = value {
        fs::write(&path, value.to_string()).unwrap();
    }
    CursorFile::load(path)
}

#[tokio::test]
async fn test_first_run_seeds_cursor_without_responding() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, None);

    // Newest first, as the API serves them.
    let mock = MockPlatform::with_notifications(vec![
        mention(7, "bob", "<p>hello?</p>", Visibility::Public),
        mention(3, "carol", "<p>anyone home</p>", Visibility::Public),
    ]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    assert_eq!(state.cursor(), Some(7));
    assert_eq!(fs::read_to_string(dir.path().join("state")).unwrap(), "7");
    assert!(mock.sent().is_empty());
    assert!(mock.deleted().is_empty());
}

#[tokio::test]
async fn test_first_run_with_no_notifications_seeds_zero() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, None);
    let mock = MockPlatform::new();

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    assert_eq!(state.cursor(), Some(0));
    assert_eq!(fs::read_to_string(dir.path().join("state")).unwrap(), "0");
}

#[tokio::test]
async fn test_new_mention_is_forwarded_to_maintainer() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mock = MockPlatform::with_notifications(vec![mention(
        6,
        "bob",
        "<p>nice pictures</p>",
        Visibility::Public,
    )]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    let sent = mock.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].text,
        "@alice I am a bot, a human will get back to you. @alice"
    );
    assert_eq!(sent[0].options.in_reply_to_id.as_deref(), Some("status-6"));
    assert_eq!(sent[0].options.visibility, Some(Visibility::Direct));

    assert_eq!(state.cursor(), Some(6));
    assert_eq!(fs::read_to_string(dir.path().join("state")).unwrap(), "6");
}

#[tokio::test]
async fn test_maintainer_mention_is_not_forwarded() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mock = MockPlatform::with_notifications(vec![mention(
        6,
        "alice",
        "<p>good bot</p>",
        Visibility::Public,
    )]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    assert!(mock.sent().is_empty());
    assert_eq!(state.cursor(), Some(6));
}

#[tokio::test]
async fn test_mention_already_tagging_maintainer_is_skipped() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mut notification = mention(6, "bob", "<p>cc</p>", Visibility::Public);
    notification.status.as_mut().unwrap().mentioned = vec!["alice".to_string()];
    let mock = MockPlatform::with_notifications(vec![notification]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    assert!(mock.sent().is_empty());
    assert_eq!(state.cursor(), Some(6));
}

#[tokio::test]
async fn test_direct_mention_relays_sanitized_text() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mock = MockPlatform::with_notifications(vec![mention(
        6,
        "bob",
        "<p>please tell @eve about this</p>",
        Visibility::Direct,
    )]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    let sent = mock.sent();
    assert_eq!(sent.len(), 2);

    // The forward notice replies to the mention itself.
    assert_eq!(sent[0].options.in_reply_to_id.as_deref(), Some("status-6"));

    // The relayed part chains off the notice and carries defanged handles.
    assert_eq!(sent[1].text, "@alice\nplease tell /eve about this");
    assert_eq!(
        sent[1].options.in_reply_to_id.as_deref(),
        Some(sent[0].id.as_str())
    );
    assert_eq!(sent[1].options.visibility, Some(Visibility::Direct));
}

#[tokio::test]
async fn test_long_direct_mention_is_relayed_in_chained_parts() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    // 1000 characters; with the "@alice" prefix each part holds 491.
    let body = "x".repeat(1000);
    let mock = MockPlatform::with_notifications(vec![mention(
        6,
        "bob",
        &format!("<p>{body}</p>"),
        Visibility::Direct,
    )]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    let sent = mock.sent();
    assert_eq!(sent.len(), 4, "one notice plus three relay parts");

    for part in &sent[1..] {
        assert!(part.text.chars().count() <= 500);
        assert!(part.text.starts_with("@alice\n"));
    }
    assert!(sent[1].text.ends_with('…'));
    assert!(sent[2].text.ends_with('…'));
    assert!(!sent[3].text.ends_with('…'));

    // Parts chain as sequential replies so ordering is preserved.
    assert_eq!(
        sent[2].options.in_reply_to_id.as_deref(),
        Some(sent[1].id.as_str())
    );
    assert_eq!(
        sent[3].options.in_reply_to_id.as_deref(),
        Some(sent[2].id.as_str())
    );
}

#[tokio::test]
async fn test_public_mention_is_not_relayed() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mock = MockPlatform::with_notifications(vec![mention(
        6,
        "bob",
        "<p>public chatter</p>",
        Visibility::Public,
    )]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    // Only the forward notice, no relay of public content.
    assert_eq!(mock.sent().len(), 1);
}

#[tokio::test]
async fn test_delete_command_from_maintainer_deletes_target() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mut notification = mention(
        6,
        "alice",
        &format!("<p>{DELETE_COMMAND}</p>"),
        Visibility::Public,
    );
    notification.status.as_mut().unwrap().in_reply_to_id = Some("status-victim".to_string());
    let mock = MockPlatform::with_notifications(vec![notification]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    assert_eq!(mock.deleted(), vec!["status-victim"]);
    // Maintainer mentions are never forwarded.
    assert!(mock.sent().is_empty());
    assert_eq!(state.cursor(), Some(6));
}

#[tokio::test]
async fn test_delete_command_from_other_sender_is_ignored_entirely() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mut notification = mention(
        6,
        "bob",
        &format!("<p>{DELETE_COMMAND}</p>"),
        Visibility::Public,
    );
    notification.status.as_mut().unwrap().in_reply_to_id = Some("status-victim".to_string());
    let mock = MockPlatform::with_notifications(vec![notification]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    // Neither deleted nor forwarded; the cursor still advances.
    assert!(mock.deleted().is_empty());
    assert!(mock.sent().is_empty());
    assert_eq!(state.cursor(), Some(6));
}

#[tokio::test]
async fn test_delete_failure_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mut delete_request = mention(
        6,
        "alice",
        &format!("<p>{DELETE_COMMAND}</p>"),
        Visibility::Public,
    );
    delete_request.status.as_mut().unwrap().in_reply_to_id = Some("status-victim".to_string());

    let mock = MockPlatform::with_notifications(vec![
        mention(7, "bob", "<p>hi</p>", Visibility::Public),
        delete_request,
    ]);
    mock.fail_deleting(true);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    // The later mention was still forwarded and the cursor covers both.
    assert_eq!(mock.sent().len(), 1);
    assert_eq!(state.cursor(), Some(7));
}

#[tokio::test]
async fn test_non_mention_notifications_advance_cursor_silently() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mock = MockPlatform::with_notifications(vec![Notification {
        id: 6,
        kind: NotificationKind::Other,
        status: None,
    }]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    assert!(mock.sent().is_empty());
    assert_eq!(state.cursor(), Some(6));
    assert_eq!(fs::read_to_string(dir.path().join("state")).unwrap(), "6");
}

#[tokio::test]
async fn test_replay_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mock = MockPlatform::with_notifications(vec![mention(
        6,
        "bob",
        "<p>hello</p>",
        Visibility::Public,
    )]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();
    assert_eq!(mock.sent().len(), 1);
    assert_eq!(state.cursor(), Some(6));

    // Same notification list again: nothing new happens.
    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();
    assert_eq!(mock.sent().len(), 1);
    assert_eq!(state.cursor(), Some(6));
}

#[tokio::test]
async fn test_fetch_failure_leaves_cursor_untouched() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mock = MockPlatform::with_notifications(vec![mention(
        6,
        "bob",
        "<p>hello</p>",
        Visibility::Public,
    )]);
    mock.fail_notifications(true);

    let result = mentions::process_notifications(&mock, &config, &mut state).await;

    assert!(result.is_err());
    assert_eq!(state.cursor(), Some(5));
    assert_eq!(fs::read_to_string(dir.path().join("state")).unwrap(), "5");
}

#[tokio::test]
async fn test_reply_failure_still_advances_cursor() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(5));

    let mock = MockPlatform::with_notifications(vec![mention(
        6,
        "bob",
        "<p>hello</p>",
        Visibility::Public,
    )]);
    mock.fail_posting(true);

    // The send fails, is logged, and the notification is given up on.
    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    assert!(mock.sent().is_empty());
    assert_eq!(state.cursor(), Some(6));
    assert_eq!(fs::read_to_string(dir.path().join("state")).unwrap(), "6");
}

#[tokio::test]
async fn test_batch_processes_in_chronological_order() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let mut state = cursor_file(&dir, Some(0));

    let mock = MockPlatform::with_notifications(vec![
        mention(3, "bob", "<p>third</p>", Visibility::Public),
        mention(2, "bob", "<p>second</p>", Visibility::Public),
        mention(1, "bob", "<p>first</p>", Visibility::Public),
    ]);

    mentions::process_notifications(&mock, &config, &mut state)
        .await
        .unwrap();

    let sent = mock.sent();
    assert_eq!(sent.len(), 3);
    // Replies go out oldest first.
    assert_eq!(sent[0].options.in_reply_to_id.as_deref(), Some("status-1"));
    assert_eq!(sent[1].options.in_reply_to_id.as_deref(), Some("status-2"));
    assert_eq!(sent[2].options.in_reply_to_id.as_deref(), Some("status-3"));
    assert_eq!(state.cursor(), Some(3));
}
