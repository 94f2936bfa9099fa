//! Work items and their outcomes
//!
//! `Outcome` is the single result contract every send path produces:
//! `Result<SendInfo, ErrorProjection>` tagged with the caller's id.

use std::any::Any;
use std::error::Error as StdError;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{MailError, MessagePayload};

/// One (identifier, message) pair to be sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Caller-supplied opaque identifier, echoed verbatim
    #[serde(default)]
    pub id: Value,
    pub message: MessagePayload,
}

/// Envelope actually used for the SMTP transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub from: Option<String>,
    pub to: Vec<String>,
}

/// Transport-returned metadata for a delivered message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInfo {
    pub message_id: Option<String>,
    pub envelope: Envelope,
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    /// Final server reply, e.g. `250 2.0.0 Ok: queued`
    pub response: String,
}

/// Serializable view of a failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorProjection {
    Error {
        name: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
        /// Source chain, outermost first
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        causes: Vec<String>,
    },
    /// Failure value that is not an error
    Opaque(Value),
}

impl ErrorProjection {
    /// Project any error with an explicit classification name
    pub fn from_error(name: impl Into<String>, err: &(dyn StdError + 'static), code: Option<u16>) -> Self {
        let mut causes = Vec::new();
        let mut next = err.source();
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }
        Self::Error {
            name: name.into(),
            message: err.to_string(),
            code,
            causes,
        }
    }

    /// Project a panic payload caught around a send
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            Some((*s).to_string())
        } else {
            payload.downcast_ref::<String>().cloned()
        };
        match message {
            Some(message) => Self::Error {
                name: "Panic".to_string(),
                message,
                code: None,
                causes: Vec::new(),
            },
            None => Self::Opaque(Value::String("opaque failure".to_string())),
        }
    }

    /// Classification name, `None` for opaque values
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Error { name, .. } => Some(name),
            Self::Opaque(_) => None,
        }
    }
}

impl From<&MailError> for ErrorProjection {
    fn from(err: &MailError) -> Self {
        Self::from_error(err.kind(), err, err.code())
    }
}

impl From<MailError> for ErrorProjection {
    fn from(err: MailError) -> Self {
        Self::from(&err)
    }
}

/// Result of attempting to send one work item
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub id: Value,
    pub result: Result<SendInfo, ErrorProjection>,
}

impl Outcome {
    pub fn success(id: Value, info: SendInfo) -> Self {
        Self {
            id,
            result: Ok(info),
        }
    }

    pub fn failure(id: Value, err: impl Into<ErrorProjection>) -> Self {
        Self {
            id,
            result: Err(err.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id)?;
        match &self.result {
            Ok(info) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("info", info)?;
            }
            Err(err) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("err", err)?;
            }
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct OutcomeRecord {
    #[serde(default)]
    id: Value,
    success: bool,
    info: Option<SendInfo>,
    err: Option<ErrorProjection>,
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = OutcomeRecord::deserialize(deserializer)?;
        let result = match (record.success, record.info, record.err) {
            (true, Some(info), _) => Ok(info),
            (false, _, Some(err)) => Err(err),
            (true, None, _) => return Err(D::Error::missing_field("info")),
            (false, _, None) => return Err(D::Error::missing_field("err")),
        };
        Ok(Self {
            id: record.id,
            result,
        })
    }
}
