//! MessagePayload - what the caller wants sent
//!
//! Mirrors the commonly used subset of nodemailer message options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One email as submitted by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Addresses>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Addresses>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Addresses>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Addresses>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Addresses>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Plain text body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// HTML body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Extra headers (name -> value)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Explicit Message-ID, generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentPayload>,
}

/// Address field: one string (possibly comma separated) or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Addresses {
    One(String),
    Many(Vec<String>),
}

impl Addresses {
    /// Individual address entries, comma lists left for the parser
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::One(s) => vec![s.as_str()],
            Self::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Addresses {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

/// File attached to a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayload {
    pub filename: String,

    /// Inline content, interpreted according to `encoding`
    pub content: String,

    #[serde(default)]
    pub encoding: ContentEncoding,

    /// MIME type, `application/octet-stream` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// How attachment content is encoded in the payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    #[default]
    Utf8,
    Base64,
}

impl MessagePayload {
    /// Convenience constructor for a plain-text message
    pub fn text(from: &str, to: &str, subject: &str, body: &str) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            subject: Some(subject.to_string()),
            text: Some(body.to_string()),
            ..Default::default()
        }
    }
}
