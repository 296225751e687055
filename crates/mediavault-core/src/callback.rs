//! Inline button payload grammar.
//!
//! The wire format is `action|arg1|arg2`. Buttons attached to old messages
//! keep firing these payloads long after the message was sent, so the grammar
//! must stay byte-compatible across releases.

use crate::record::Category;
use std::str::FromStr;
use thiserror::Error;

/// Payloads that failed to parse into a [`CallbackAction`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PayloadError {
    /// The action token is not part of the grammar.
    #[error("unknown action: {0}")]
    Unknown(String),
    /// Known action with missing or unusable arguments.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Admin sub-actions carried as `admin|<sub>|<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOp {
    /// Ask for a new caption/filename by reply.
    EditName,
    /// Flip the published flag (edited records only).
    TogglePublished,
    /// Flip the search visibility flag.
    ToggleVisible,
    /// Open the publish-now / schedule keyboard.
    SetPublishDate,
    /// Restart the day/month/year upload-date dialogue.
    SetUploadDate,
    /// Hard-delete the record. The platform copy of the file stays.
    Delete,
    /// Open the admin edit menu.
    OpenEdit,
}

impl AdminOp {
    /// Wire token for this sub-action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EditName => "editname",
            Self::TogglePublished => "togglepublished",
            Self::ToggleVisible => "togglevisible",
            Self::SetPublishDate => "setpublishdate",
            Self::SetUploadDate => "setuploaddate",
            Self::Delete => "delete",
            Self::OpenEdit => "openedit",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "editname" => Some(Self::EditName),
            "togglepublished" => Some(Self::TogglePublished),
            "togglevisible" => Some(Self::ToggleVisible),
            "setpublishdate" => Some(Self::SetPublishDate),
            "setuploaddate" => Some(Self::SetUploadDate),
            "delete" => Some(Self::Delete),
            "openedit" => Some(Self::OpenEdit),
            _ => None,
        }
    }
}

/// One inbound button press, parsed into a closed variant at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// `cat|<sermon|prophecy>|<id>`
    SetCategory {
        /// Subject record id.
        file_id: i64,
        /// Selected category.
        category: Category,
    },
    /// `class|<edited|unedited>|<id>`
    SetEdited {
        /// Subject record id.
        file_id: i64,
        /// True for the edited cut.
        edited: bool,
    },
    /// `uday|<1-31>|<id>`
    SetDay {
        /// Subject record id.
        file_id: i64,
        /// Selected day of month.
        day: u32,
    },
    /// `umonth|<1-12>|<id>`
    SetMonth {
        /// Subject record id.
        file_id: i64,
        /// Selected month.
        month: u32,
    },
    /// `uyear|<year>|<id>`
    SetYear {
        /// Subject record id.
        file_id: i64,
        /// Selected year.
        year: i32,
    },
    /// `publish|now|<id>`
    PublishNow {
        /// Subject record id.
        file_id: i64,
    },
    /// `publish|schedule|<id>`
    PublishSchedule {
        /// Subject record id.
        file_id: i64,
    },
    /// `get|<id>` — re-send the stored file to the requester.
    Get {
        /// Subject record id.
        file_id: i64,
    },
    /// `admin|<sub>|<id>` — privileged record maintenance.
    Admin {
        /// Subject record id.
        file_id: i64,
        /// Sub-action.
        op: AdminOp,
    },
}

fn parse_num<T: FromStr>(part: Option<&str>, payload: &str) -> Result<T, PayloadError> {
    part.and_then(|p| p.parse().ok())
        .ok_or_else(|| PayloadError::Malformed(payload.to_string()))
}

impl CallbackAction {
    /// Parse a raw payload.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Unknown`] for actions outside the grammar and
    /// [`PayloadError::Malformed`] for known actions with bad arguments.
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let mut parts = payload.split('|');
        let action = parts.next().unwrap_or_default();
        let arg1 = parts.next();
        let arg2 = parts.next();
        match action {
            "cat" => {
                let category = arg1
                    .and_then(|t| Category::from_str(t).ok())
                    .ok_or_else(|| PayloadError::Malformed(payload.to_string()))?;
                Ok(Self::SetCategory {
                    file_id: parse_num(arg2, payload)?,
                    category,
                })
            }
            "class" => {
                let edited = match arg1 {
                    Some("edited") => true,
                    Some("unedited") => false,
                    _ => return Err(PayloadError::Malformed(payload.to_string())),
                };
                Ok(Self::SetEdited {
                    file_id: parse_num(arg2, payload)?,
                    edited,
                })
            }
            "uday" => Ok(Self::SetDay {
                day: parse_num(arg1, payload)?,
                file_id: parse_num(arg2, payload)?,
            }),
            "umonth" => Ok(Self::SetMonth {
                month: parse_num(arg1, payload)?,
                file_id: parse_num(arg2, payload)?,
            }),
            "uyear" => Ok(Self::SetYear {
                year: parse_num(arg1, payload)?,
                file_id: parse_num(arg2, payload)?,
            }),
            "publish" => {
                let file_id = parse_num(arg2, payload)?;
                match arg1 {
                    Some("now") => Ok(Self::PublishNow { file_id }),
                    Some("schedule") => Ok(Self::PublishSchedule { file_id }),
                    _ => Err(PayloadError::Malformed(payload.to_string())),
                }
            }
            "get" => Ok(Self::Get {
                file_id: parse_num(arg1, payload)?,
            }),
            "admin" => {
                let op = arg1
                    .and_then(AdminOp::from_token)
                    .ok_or_else(|| PayloadError::Malformed(payload.to_string()))?;
                Ok(Self::Admin {
                    file_id: parse_num(arg2, payload)?,
                    op,
                })
            }
            other => Err(PayloadError::Unknown(other.to_string())),
        }
    }

    /// Encode back to the wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        match *self {
            Self::SetCategory { file_id, category } => format!("cat|{category}|{file_id}"),
            Self::SetEdited { file_id, edited } => {
                let word = if edited { "edited" } else { "unedited" };
                format!("class|{word}|{file_id}")
            }
            Self::SetDay { file_id, day } => format!("uday|{day}|{file_id}"),
            Self::SetMonth { file_id, month } => format!("umonth|{month}|{file_id}"),
            Self::SetYear { file_id, year } => format!("uyear|{year}|{file_id}"),
            Self::PublishNow { file_id } => format!("publish|now|{file_id}"),
            Self::PublishSchedule { file_id } => format!("publish|schedule|{file_id}"),
            Self::Get { file_id } => format!("get|{file_id}"),
            Self::Admin { file_id, op } => format!("admin|{}|{file_id}", op.as_str()),
        }
    }
}
