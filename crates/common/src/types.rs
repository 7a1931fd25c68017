use serde::{Deserialize, Serialize};

/// Batch of SNS notifications handed to one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SnsEventRecord>,
}

/// A single SNS record inside an [`SnsEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsEventRecord {
    #[serde(rename = "Sns", default)]
    pub sns: SnsMessage,
}

/// The SNS envelope. Only `Message` is relayed; the ids are logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SnsMessage {
    pub message_id: Option<String>,
    pub topic_arn: Option<String>,
    pub message: Option<String>,
}

impl SnsEvent {
    /// Build an event from raw message strings, in order.
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: messages
                .into_iter()
                .map(|m| SnsEventRecord {
                    sns: SnsMessage {
                        message: Some(m.into()),
                        ..Default::default()
                    },
                })
                .collect(),
        }
    }
}

/// Fields extracted from a CloudWatch alarm state-change notification.
///
/// Every field is optional on the wire. A key that is absent, `null` or not a
/// string falls back to its default instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmDescriptor {
    pub alarm_name: String,
    pub state: String,
    pub old_state: Option<String>,
    pub reason: String,
    /// `None` when the key is unusable; an empty string stays empty.
    pub description: Option<String>,
    pub region: Option<String>,
}

impl Default for AlarmDescriptor {
    fn default() -> Self {
        Self {
            alarm_name: "Unknown Alarm".to_string(),
            state: "Unknown".to_string(),
            old_state: None,
            reason: String::new(),
            description: None,
            region: None,
        }
    }
}

impl AlarmDescriptor {
    /// Extract the alarm fields from a parsed notification object.
    pub fn from_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let text = |key: &str| object.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let defaults = Self::default();

        Self {
            alarm_name: text("AlarmName").unwrap_or(defaults.alarm_name),
            state: text("NewStateValue").unwrap_or(defaults.state),
            old_state: text("OldStateValue"),
            reason: text("NewStateReason").unwrap_or(defaults.reason),
            description: text("AlarmDescription"),
            region: text("Region"),
        }
    }

    pub fn alarm_state(&self) -> AlarmState {
        AlarmState::from(self.state.as_str())
    }
}

/// CloudWatch alarm states. The set is open; unknown values map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Alarm,
    Ok,
    InsufficientData,
    Other,
}

impl From<&str> for AlarmState {
    fn from(value: &str) -> Self {
        match value {
            "ALARM" => AlarmState::Alarm,
            "OK" => AlarmState::Ok,
            "INSUFFICIENT_DATA" => AlarmState::InsufficientData,
            _ => AlarmState::Other,
        }
    }
}
