//! Routing of inbound button presses to the classification flow.

use crate::callback::{CallbackAction, PayloadError};
use crate::classify::ClassificationFlow;
use crate::error::ArchiveError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::error;

/// One inbound button press as seen by the transport.
#[derive(Debug, Clone)]
pub struct ButtonPress {
    /// Identity of the pressing user.
    pub from_id: i64,
    /// Chat the button's message lives in.
    pub chat_id: i64,
    /// Raw wire payload.
    pub payload: String,
}

/// Parses payloads, enforces the admin gate and turns every outcome into the
/// acknowledgement text for the press. Never fails: internal errors are
/// logged and acknowledged generically.
pub struct CallbackDispatcher {
    flow: Arc<ClassificationFlow>,
    admins: HashSet<i64>,
}

impl CallbackDispatcher {
    /// Build a dispatcher over the flow and the configured admin set.
    #[must_use]
    pub fn new(flow: Arc<ClassificationFlow>, admins: HashSet<i64>) -> Self {
        Self { flow, admins }
    }

    /// Whether the user may upload files and run admin actions.
    #[must_use]
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    /// Handle a button press and return the toast text; empty text means a
    /// silent acknowledgement.
    pub async fn dispatch(&self, press: &ButtonPress) -> String {
        let action = match CallbackAction::parse(&press.payload) {
            Ok(action) => action,
            Err(PayloadError::Unknown(_)) => return "Unknown action.".to_string(),
            Err(PayloadError::Malformed(_)) => return "Invalid selection.".to_string(),
        };
        match self.run(press, action).await {
            Ok(ack) => ack,
            Err(ArchiveError::Validation(message)) => message,
            Err(ArchiveError::Permission) => "Admins only.".to_string(),
            Err(ArchiveError::NotFound(_)) => "File not found.".to_string(),
            Err(ArchiveError::Conflict) => "Already recorded.".to_string(),
            Err(e @ (ArchiveError::Persistence(_) | ArchiveError::Delivery(_))) => {
                error!(error = %e, payload = %press.payload, "Callback failed");
                "An error occurred.".to_string()
            }
        }
    }

    async fn run(
        &self,
        press: &ButtonPress,
        action: CallbackAction,
    ) -> Result<String, ArchiveError> {
        let chat_id = press.chat_id;
        match action {
            CallbackAction::SetCategory { file_id, category } => {
                self.flow.set_category(chat_id, file_id, category).await
            }
            CallbackAction::SetEdited { file_id, edited } => {
                self.flow.set_edited(chat_id, file_id, edited).await
            }
            CallbackAction::SetDay { file_id, day } => {
                self.flow.set_day(chat_id, file_id, day).await
            }
            CallbackAction::SetMonth { file_id, month } => {
                self.flow.set_month(chat_id, file_id, month).await
            }
            CallbackAction::SetYear { file_id, year } => {
                self.flow.set_year(chat_id, file_id, year).await
            }
            CallbackAction::PublishNow { file_id } => {
                self.flow.publish_now(chat_id, file_id).await
            }
            CallbackAction::PublishSchedule { file_id } => {
                self.flow.publish_schedule(chat_id, file_id).await
            }
            CallbackAction::Get { file_id } => self.flow.send_file(chat_id, file_id).await,
            CallbackAction::Admin { file_id, op } => {
                if !self.is_admin(press.from_id) {
                    return Err(ArchiveError::Permission);
                }
                self.flow.admin_action(chat_id, file_id, op).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockMediaGateway;
    use crate::prompts::PromptTracker;
    use crate::router::{DistributionRouter, RoutingTable};
    use crate::store::MockFileStore;

    const TABLE: RoutingTable = RoutingTable {
        edited_sermon_video: -101,
        unedited_sermon_video: -102,
        edited_prophecy_video: -103,
        unedited_prophecy_video: -104,
        sermon_audio: -105,
    };

    fn dispatcher(store: MockFileStore, gateway: MockMediaGateway) -> CallbackDispatcher {
        let flow = ClassificationFlow::new(
            Arc::new(store),
            Arc::new(gateway),
            Arc::new(PromptTracker::new()),
            DistributionRouter::new(TABLE),
            -100,
        );
        CallbackDispatcher::new(Arc::new(flow), HashSet::from([42]))
    }

    fn press(from_id: i64, payload: &str) -> ButtonPress {
        ButtonPress {
            from_id,
            chat_id: 500,
            payload: payload.to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_and_malformed_payloads_get_fixed_acks() {
        let d = dispatcher(MockFileStore::new(), MockMediaGateway::new());
        assert_eq!(d.dispatch(&press(42, "zap|1|2")).await, "Unknown action.");
        assert_eq!(d.dispatch(&press(42, "uday|x|3")).await, "Invalid selection.");
    }

    #[tokio::test]
    async fn admin_actions_require_membership() {
        let mut store = MockFileStore::new();
        store.expect_get().never();
        let d = dispatcher(store, MockMediaGateway::new());
        assert_eq!(d.dispatch(&press(7, "admin|delete|3")).await, "Admins only.");
    }

    #[tokio::test]
    async fn absent_records_answer_not_found() {
        let mut store = MockFileStore::new();
        store.expect_get().returning(|_| Ok(None));
        let d = dispatcher(store, MockMediaGateway::new());
        assert_eq!(d.dispatch(&press(42, "get|3")).await, "File not found.");
    }

    #[tokio::test]
    async fn persistence_errors_are_acknowledged_generically() {
        let mut store = MockFileStore::new();
        store
            .expect_get()
            .returning(|_| Err(ArchiveError::Persistence(sqlx::Error::PoolClosed)));
        let d = dispatcher(store, MockMediaGateway::new());
        assert_eq!(d.dispatch(&press(42, "get|3")).await, "An error occurred.");
    }
}
