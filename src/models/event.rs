use garde::Validate;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use strum::{AsRefStr, Display, EnumString};

/// Trigger kinds understood by the dispatcher, keyed by their wire discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum EventType {
    #[strum(serialize = "yandex.cloud.events.storage.ObjectCreate")]
    ObjectCreate,

    #[strum(serialize = "yandex.cloud.events.serverless.triggers.TimerMessage")]
    Timer,
}

/// Inbound event payload: a homogeneous batch of trigger messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub messages: Vec<EventMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(default)]
    pub event_metadata: EventMetadata,

    /// Present on object-creation messages; timer messages may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ObjectDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default)]
    pub event_type: String,
}

/// Location of a newly created object.
///
/// Fields default to empty so timer messages, whose details carry trigger
/// fields instead, still parse; validation rejects the empty values.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObjectDetails {
    #[serde(default)]
    #[garde(length(min = 1, max = 255))]
    pub bucket_id: String,

    #[serde(default)]
    #[garde(length(min = 1, max = 1024), custom(relative_object_path))]
    pub object_id: String,
}

/// Object ids are joined onto the bucket root, so they must stay inside it.
fn relative_object_path(value: &str, _context: &()) -> garde::Result {
    let escapes = Path::new(value)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(garde::Error::new("object id must be a relative path inside the bucket"));
    }
    Ok(())
}

impl EventEnvelope {
    /// Discriminator of the first message; batches are homogeneous upstream.
    pub fn event_type(&self) -> Option<EventType> {
        self.messages
            .first()
            .and_then(|m| m.event_metadata.event_type.parse().ok())
    }

    /// A single-message timer envelope, as the scheduler trigger would send.
    pub fn timer() -> Self {
        Self {
            messages: vec![EventMessage {
                event_metadata: EventMetadata {
                    event_type: EventType::Timer.to_string(),
                },
                details: None,
            }],
        }
    }

    /// One object-creation message per `(bucket_id, object_id)` pair.
    pub fn object_created<'a>(objects: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            messages: objects
                .into_iter()
                .map(|(bucket_id, object_id)| EventMessage {
                    event_metadata: EventMetadata {
                        event_type: EventType::ObjectCreate.to_string(),
                    },
                    details: Some(ObjectDetails {
                        bucket_id: bucket_id.to_string(),
                        object_id: object_id.to_string(),
                    }),
                })
                .collect(),
        }
    }
}
