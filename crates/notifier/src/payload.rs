//! Discord payload construction for CloudWatch alarm notifications.
//!
//! Turns one raw SNS message into a [`DiscordMessage`]. A JSON object becomes
//! a headline plus a colored embed, with defaults for any unusable alarm key;
//! anything else is echoed verbatim inside a code block. Building never fails.

use serde::{Deserialize, Serialize};

use alarm_relay_common::types::{AlarmDescriptor, AlarmState};

/// Discord's per-field value limit.
pub const FIELD_VALUE_LIMIT: usize = 1024;

pub const COLOR_ALARM: u32 = 0xD00000;
pub const COLOR_OK: u32 = 0x439FE0;
pub const COLOR_OTHER: u32 = 0xFFA500;

/// Shown in place of an empty state-change reason.
pub const EMPTY_REASON_PLACEHOLDER: &str = "(no details)";

/// Used when the alarm carries no `AlarmDescription` at all.
pub const MISSING_DESCRIPTION: &str = "None";

/// Body of a Discord webhook execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }
}

/// Build the Discord message for one raw SNS message.
pub fn build_payload(raw_message: &str) -> DiscordMessage {
    match parse_alarm(raw_message) {
        Some(alarm) => alarm_message(&alarm),
        None => fallback_message(raw_message),
    }
}

/// Only JSON objects are alarm notifications; arrays and scalars are not.
fn parse_alarm(raw_message: &str) -> Option<AlarmDescriptor> {
    match serde_json::from_str::<serde_json::Value>(raw_message) {
        Ok(serde_json::Value::Object(object)) => Some(AlarmDescriptor::from_object(&object)),
        Ok(_) => {
            tracing::debug!("Message is JSON but not an object, using plain-text fallback");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "Message is not JSON, using plain-text fallback");
            None
        }
    }
}

/// Embed color for an alarm state.
pub fn state_color(state: AlarmState) -> u32 {
    match state {
        AlarmState::Alarm => COLOR_ALARM,
        AlarmState::Ok => COLOR_OK,
        AlarmState::InsufficientData | AlarmState::Other => COLOR_OTHER,
    }
}

fn alarm_message(alarm: &AlarmDescriptor) -> DiscordMessage {
    tracing::info!(
        alarm = %alarm.alarm_name,
        state = %alarm.state,
        old_state = alarm.old_state.as_deref().unwrap_or("-"),
        region = alarm.region.as_deref().unwrap_or("-"),
        "Formatting alarm notification"
    );

    let reason = truncate_chars(&alarm.reason, FIELD_VALUE_LIMIT);
    let reason = if reason.is_empty() {
        EMPTY_REASON_PLACEHOLDER.to_string()
    } else {
        reason
    };
    let description = truncate_chars(
        alarm.description.as_deref().unwrap_or(MISSING_DESCRIPTION),
        FIELD_VALUE_LIMIT,
    );

    DiscordMessage {
        content: format!(":rotating_light: **{}**", alarm.alarm_name),
        embeds: vec![Embed {
            color: state_color(alarm.alarm_state()),
            fields: vec![
                EmbedField::new("State", alarm.state.clone(), true),
                EmbedField::new("Reason", reason, false),
                EmbedField::new("Description", description, false),
            ],
        }],
    }
}

fn fallback_message(raw_message: &str) -> DiscordMessage {
    DiscordMessage {
        content: format!(":rotating_light: *SNS Notification*\n```{raw_message}```"),
        embeds: Vec::new(),
    }
}

/// Keep at most `limit` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}
