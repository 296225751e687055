//! End-to-end dialogue tests over the in-memory store and recording gateway.

use chrono::NaiveDate;
use mediavault_core::classify::ClassificationFlow;
use mediavault_core::dispatch::{ButtonPress, CallbackDispatcher};
use mediavault_core::prompts::PromptTracker;
use mediavault_core::record::{FileType, MediaInfo, MediaUpload};
use mediavault_core::router::{DistributionRouter, RoutingTable};
use mediavault_core::store::{FileStore, MemoryFileStore};
use mediavault_core::testing::{RecordingGateway, SentItem};
use std::collections::HashSet;
use std::sync::Arc;

const STORAGE: i64 = -900;
const EDITED_SERMON: i64 = -101;
const UNEDITED_SERMON: i64 = -102;
const SERMON_AUDIO: i64 = -105;
const CHAT: i64 = 500;
const ADMIN: i64 = 42;

const TABLE: RoutingTable = RoutingTable {
    edited_sermon_video: EDITED_SERMON,
    unedited_sermon_video: UNEDITED_SERMON,
    edited_prophecy_video: -103,
    unedited_prophecy_video: -104,
    sermon_audio: SERMON_AUDIO,
};

struct Harness {
    store: Arc<MemoryFileStore>,
    gateway: Arc<RecordingGateway>,
    flow: Arc<ClassificationFlow>,
    dispatcher: CallbackDispatcher,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryFileStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let flow = Arc::new(ClassificationFlow::new(
            store.clone(),
            gateway.clone(),
            Arc::new(PromptTracker::new()),
            DistributionRouter::new(TABLE),
            STORAGE,
        ));
        let dispatcher = CallbackDispatcher::new(flow.clone(), HashSet::from([ADMIN]));
        Self {
            store,
            gateway,
            flow,
            dispatcher,
        }
    }

    async fn press(&self, payload: &str) -> String {
        self.press_as(ADMIN, payload).await
    }

    async fn press_as(&self, from_id: i64, payload: &str) -> String {
        self.dispatcher
            .dispatch(&ButtonPress {
                from_id,
                chat_id: CHAT,
                payload: payload.to_string(),
            })
            .await
    }

    /// Media sent to a given chat, as (handle, caption) pairs.
    fn media_sent_to(&self, chat_id: i64) -> Vec<(String, String)> {
        self.gateway
            .sent()
            .into_iter()
            .filter_map(|item| match item {
                SentItem::Media {
                    chat_id: c,
                    handle,
                    caption,
                } if c == chat_id => Some((handle, caption)),
                _ => None,
            })
            .collect()
    }

    fn last_prompt_id(&self) -> i64 {
        self.gateway
            .sent()
            .into_iter()
            .filter_map(|item| match item {
                SentItem::Prompt { prompt_id, .. } => Some(prompt_id),
                _ => None,
            })
            .last()
            .expect("a prompt was sent")
    }
}

fn upload(message_id: i64, caption: Option<&str>, file_type: FileType) -> MediaUpload {
    MediaUpload {
        chat_id: CHAT,
        message_id,
        sender_id: Some(ADMIN),
        caption: caption.map(ToString::to_string),
        media: MediaInfo {
            file_type,
            handle: format!("handle-{message_id}"),
            file_name: None,
        },
    }
}

#[tokio::test]
async fn captioned_video_runs_the_full_sequence() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Sunday Service"), FileType::Video))
        .await
        .expect("ingest");

    // one storage copy, a confirmation and the category question
    assert_eq!(
        h.media_sent_to(STORAGE),
        vec![("handle-1".to_string(), "Sunday Service".to_string())]
    );
    assert!(h
        .gateway
        .texts()
        .contains(&"✅ \"Sunday Service\" saved ✔️".to_string()));

    assert_eq!(h.press("cat|sermon|1").await, "Category set to sermon");
    assert_eq!(h.press("class|edited|1").await, "Marked as edited");
    assert_eq!(h.press("uday|2|1").await, "Day selected: 2");
    assert_eq!(h.press("umonth|3|1").await, "Month selected");
    assert_eq!(h.press("uyear|2023|1").await, "Upload date set: 2023-3-2");

    let record = h.store.get(1).await.expect("get").expect("present");
    assert_eq!(record.upload_date, NaiveDate::from_ymd_opt(2023, 3, 2));
    assert!(record.edited);

    // after the date completes the file is forwarded exactly once
    assert_eq!(
        h.media_sent_to(EDITED_SERMON),
        vec![("handle-1".to_string(), "Sunday Service".to_string())]
    );
}

#[tokio::test]
async fn year_before_day_restarts_the_date_sequence() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Sermon"), FileType::Video))
        .await
        .expect("ingest");
    h.press("cat|sermon|1").await;
    h.press("class|unedited|1").await;

    assert_eq!(
        h.press("uyear|2024|1").await,
        "Please select day and month first."
    );
    let record = h.store.get(1).await.expect("get").expect("present");
    assert_eq!(record.upload_date, None);

    // the sequence still completes normally afterwards
    h.press("uday|5|1").await;
    h.press("umonth|6|1").await;
    assert_eq!(h.press("uyear|2024|1").await, "Upload date set: 2024-6-5");
    assert_eq!(h.media_sent_to(UNEDITED_SERMON).len(), 1);
}

#[tokio::test]
async fn impossible_dates_restart_at_the_day_question() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Sermon"), FileType::Video))
        .await
        .expect("ingest");
    h.press("cat|sermon|1").await;
    h.press("class|edited|1").await;
    h.press("uday|31|1").await;
    h.press("umonth|2|1").await;

    let ack = h.press("uyear|2024|1").await;
    assert_eq!(ack, "That date does not exist. Please select the day again.");
    let record = h.store.get(1).await.expect("get").expect("present");
    assert_eq!(record.upload_date, None);
    assert!(h.media_sent_to(EDITED_SERMON).is_empty());

    // month selection was discarded along with the day
    assert_eq!(
        h.press("uyear|2024|1").await,
        "Please select day and month first."
    );
}

#[tokio::test]
async fn captionless_upload_goes_through_the_caption_prompt() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, None, FileType::Video))
        .await
        .expect("ingest");
    let prompt_id = h.last_prompt_id();
    assert!(h.store.get(1).await.expect("get").is_none());

    // an empty reply keeps the prompt alive
    let handled = h
        .flow
        .handle_prompt_reply(prompt_id, CHAT, "   ")
        .await
        .expect("reply");
    assert!(handled);
    assert!(h
        .gateway
        .texts()
        .contains(&"❌ Caption cannot be empty. Please send a valid caption.".to_string()));

    let handled = h
        .flow
        .handle_prompt_reply(prompt_id, CHAT, "Evening Service")
        .await
        .expect("reply");
    assert!(handled);
    let record = h.store.get(1).await.expect("get").expect("present");
    assert_eq!(record.caption, "Evening Service");
    assert_eq!(h.media_sent_to(STORAGE).len(), 1);

    // the prompt was consumed; replying again falls through
    let handled = h
        .flow
        .handle_prompt_reply(prompt_id, CHAT, "again")
        .await
        .expect("reply");
    assert!(!handled);
}

#[tokio::test]
async fn duplicate_ingest_is_answered_without_a_second_copy() {
    let h = Harness::new();
    let first = upload(1, Some("Sermon"), FileType::Video);
    h.flow.ingest(first.clone()).await.expect("ingest");
    h.flow.ingest(first).await.expect("duplicate ingest");

    assert_eq!(h.media_sent_to(STORAGE).len(), 1);
    assert!(h
        .gateway
        .texts()
        .contains(&"This file is already recorded.".to_string()));
}

#[tokio::test]
async fn publishing_an_unedited_file_is_refused() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Sermon"), FileType::Video))
        .await
        .expect("ingest");

    let ack = h.press("publish|now|1").await;
    assert_eq!(ack, "File not marked edited. Mark as edited first.");
    let record = h.store.get(1).await.expect("get").expect("present");
    assert!(!record.published);

    h.press("class|edited|1").await;
    assert_eq!(h.press("publish|now|1").await, "Published now.");
    let record = h.store.get(1).await.expect("get").expect("present");
    assert!(record.published);
}

#[tokio::test]
async fn admin_actions_are_refused_for_other_users() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Sermon"), FileType::Video))
        .await
        .expect("ingest");

    assert_eq!(h.press_as(7, "admin|delete|1").await, "Admins only.");
    assert!(h.store.get(1).await.expect("get").is_some());

    assert_eq!(h.press("admin|delete|1").await, "File deleted from DB");
    assert!(h.store.get(1).await.expect("get").is_none());
}

#[tokio::test]
async fn rename_flow_updates_caption_and_filename() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Old Name"), FileType::Video))
        .await
        .expect("ingest");

    assert_eq!(
        h.press("admin|editname|1").await,
        "Reply with new filename."
    );
    let prompt_id = h.last_prompt_id();
    h.flow
        .handle_prompt_reply(prompt_id, CHAT, "New Name")
        .await
        .expect("reply");

    let record = h.store.get(1).await.expect("get").expect("present");
    assert_eq!(record.caption, "New Name");
    assert_eq!(record.real_filename.as_deref(), Some("New Name"));
    assert!(h
        .gateway
        .texts()
        .contains(&"✅ Filename updated: \"New Name\"".to_string()));
}

#[tokio::test]
async fn schedule_flow_validates_the_date_format() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Sermon"), FileType::Video))
        .await
        .expect("ingest");

    assert_eq!(
        h.press("publish|schedule|1").await,
        "Send publish date by replying to the prompt."
    );
    let prompt_id = h.last_prompt_id();

    // a bad date keeps the prompt alive
    h.flow
        .handle_prompt_reply(prompt_id, CHAT, "next tuesday")
        .await
        .expect("reply");
    let record = h.store.get(1).await.expect("get").expect("present");
    assert_eq!(record.publish_date, None);

    h.flow
        .handle_prompt_reply(prompt_id, CHAT, "2025-12-25 14:30")
        .await
        .expect("reply");
    let record = h.store.get(1).await.expect("get").expect("present");
    assert_eq!(
        record.publish_date,
        NaiveDate::from_ymd_opt(2025, 12, 25).and_then(|d| d.and_hms_opt(14, 30, 0))
    );
    assert!(!record.published);
}

#[tokio::test]
async fn get_resends_the_stored_file() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Sermon"), FileType::Audio))
        .await
        .expect("ingest");

    // silent ack, file arrives in the requesting chat
    assert_eq!(h.press("get|1").await, "");
    assert_eq!(
        h.media_sent_to(CHAT),
        vec![("handle-1".to_string(), "Sermon".to_string())]
    );

    assert_eq!(h.press("get|99").await, "File not found.");
}

#[tokio::test]
async fn documents_stay_in_the_storage_channel() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Meeting Notes"), FileType::Document))
        .await
        .expect("ingest");
    h.press("cat|sermon|1").await;
    h.press("class|edited|1").await;
    h.press("uday|1|1").await;
    h.press("umonth|1|1").await;
    h.press("uyear|2024|1").await;

    assert_eq!(h.media_sent_to(STORAGE).len(), 1);
    for group in [EDITED_SERMON, UNEDITED_SERMON, SERMON_AUDIO] {
        assert!(h.media_sent_to(group).is_empty());
    }
}

#[tokio::test]
async fn replying_to_stored_media_opens_the_edit_entry() {
    let h = Harness::new();
    h.flow
        .ingest(upload(1, Some("Sermon"), FileType::Video))
        .await
        .expect("ingest");

    let found = h
        .flow
        .show_record_for_origin(CHAT, CHAT, 1, "handle-1")
        .await
        .expect("lookup");
    assert!(found);
    let opened = h.gateway.sent().into_iter().any(|item| {
        matches!(
            item,
            SentItem::Keyboard { text, keyboard, .. }
                if text.starts_with("File found in DB:")
                    && keyboard[0][0].payload == "admin|openedit|1"
        )
    });
    assert!(opened);

    let found = h
        .flow
        .show_record_for_origin(CHAT, CHAT, 9, "other")
        .await
        .expect("lookup");
    assert!(!found);
}
