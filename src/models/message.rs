use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::database::Document;
use crate::envelope::ErrorDetail;

/// Contact form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Message {
    const COLLECTION: &'static str = "messages";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageInput {
    /// Every field is required
    pub fn validate(self) -> Result<Message, Vec<ErrorDetail>> {
        let mut errors = Vec::new();
        let mut require = |field: &str, value: Option<&str>| -> String {
            match non_blank(value) {
                Some(v) => v.to_string(),
                None => {
                    errors.push(ErrorDetail::field(field, format!("{} is required", field)));
                    String::new()
                }
            }
        };

        let name = require("name", self.name.as_deref());
        let email = require("email", self.email.as_deref());
        let subject = require("subject", self.subject.as_deref());
        let message = require("message", self.message.as_deref());

        if !errors.is_empty() {
            return Err(errors);
        }

        let now = Utc::now();
        Ok(Message {
            id: super::new_id(),
            name,
            email,
            subject,
            message,
            read: false,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of `PATCH /api/messages/:id`; an absent `read` toggles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageStatusUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl Message {
    pub fn set_read(&mut self, update: MessageStatusUpdate) {
        self.read = update.read.unwrap_or(!self.read);
        self.updated_at = Utc::now();
    }
}
