//! Reply messages are consumed only by pending prompts; replies to
//! unrelated messages report "not handled" so the runner can route them to
//! search instead of dropping them.

use mediavault_core::classify::ClassificationFlow;
use mediavault_core::dispatch::CallbackDispatcher;
use mediavault_core::prompts::PromptTracker;
use mediavault_core::record::{FileType, MediaInfo, MediaUpload};
use mediavault_core::router::{DistributionRouter, RoutingTable};
use mediavault_core::store::{FileStore, MemoryFileStore};
use mediavault_core::testing::RecordingGateway;
use mediavault_transport_telegram::bot::handlers;
use std::collections::HashSet;
use std::sync::Arc;
use teloxide::types::Message;
use teloxide::Bot;

const CHAT: i64 = 500;
const ADMIN: i64 = 42;

const TABLE: RoutingTable = RoutingTable {
    edited_sermon_video: -101,
    unedited_sermon_video: -102,
    edited_prophecy_video: -103,
    unedited_prophecy_video: -104,
    sermon_audio: -105,
};

struct Harness {
    store: Arc<MemoryFileStore>,
    flow: Arc<ClassificationFlow>,
    dispatcher: Arc<CallbackDispatcher>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryFileStore::new());
    let flow = Arc::new(ClassificationFlow::new(
        store.clone(),
        Arc::new(RecordingGateway::new()),
        Arc::new(PromptTracker::new()),
        DistributionRouter::new(TABLE),
        -900,
    ));
    let dispatcher = Arc::new(CallbackDispatcher::new(flow.clone(), HashSet::from([ADMIN])));
    Harness {
        store,
        flow,
        dispatcher,
    }
}

/// A private-chat text message replying to `reply_to`, built from Bot API
/// JSON the way the update parser sees it.
fn private_reply(from_id: i64, reply_to: i64, text: &str) -> Message {
    serde_json::from_value(serde_json::json!({
        "message_id": 900,
        "date": 1_700_000_000,
        "chat": {"id": CHAT, "type": "private", "first_name": "A"},
        "from": {"id": from_id, "is_bot": false, "first_name": "A"},
        "text": text,
        "reply_to_message": {
            "message_id": reply_to,
            "date": 1_699_999_999,
            "chat": {"id": CHAT, "type": "private", "first_name": "A"},
            "from": {"id": 999, "is_bot": true, "first_name": "Bot"},
            "text": "hello"
        }
    }))
    .expect("message json")
}

#[tokio::test]
async fn reply_to_an_unrelated_message_is_not_handled() {
    let h = harness();
    let bot = Bot::new("123456:TEST");

    // no prompt was ever registered under message id 50
    let handled = handlers::handle_reply(
        bot,
        private_reply(7, 50, "sermon"),
        h.flow.clone(),
        h.dispatcher.clone(),
    )
    .await
    .expect("reply");
    assert!(!handled);
}

#[tokio::test]
async fn reply_to_a_pending_prompt_is_consumed() {
    let h = harness();
    let bot = Bot::new("123456:TEST");

    h.flow
        .ingest(MediaUpload {
            chat_id: CHAT,
            message_id: 1,
            sender_id: Some(ADMIN),
            caption: Some("Sermon".to_string()),
            media: MediaInfo {
                file_type: FileType::Video,
                handle: "h1".to_string(),
                file_name: None,
            },
        })
        .await
        .expect("ingest");
    // registers a prompt; recorded prompt ids start at 1000
    h.flow.publish_schedule(CHAT, 1).await.expect("schedule");

    let handled = handlers::handle_reply(
        bot,
        private_reply(ADMIN, 1000, "2025-12-25 14:30"),
        h.flow.clone(),
        h.dispatcher.clone(),
    )
    .await
    .expect("reply");
    assert!(handled);

    let record = h.store.get(1).await.expect("get").expect("present");
    assert!(record.publish_date.is_some());
}
