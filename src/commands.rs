//! Request, reply and notification types of the command surface.
//!
//! On the wire every request is a JSON object tagged by `cmd`:
//!
//! ```json
//! {"seq": 1, "cmd": "scheduler-start", "input": "left", "type": "single", "repeat": "loop", "interval": 100}
//! {"seq": 2, "cmd": "settings-save", "inputId": "loopInput", "inputValue": true}
//! ```
//!
//! Replies echo the `seq`; notifications carry an `event` name and a `payload`.

use crate::input::MouseButton;
use crate::profile::{ClickOptions, ClickType, FieldUpdate, FieldValue, Profile, RepeatPolicy};
use crate::scheduler::ClickJob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd", rename_all = "kebab-case")]
pub enum Request {
    ProfileList,
    ProfileAdd {
        title: String,
        #[serde(default, alias = "optionValues")]
        fields: Vec<FieldUpdate>,
    },
    ProfileUpdate {
        id: i64,
        title: String,
        #[serde(default, alias = "options")]
        fields: Vec<FieldUpdate>,
    },
    ProfileDelete {
        id: i64,
    },
    SettingsGet,
    SettingsSave {
        #[serde(alias = "inputId")]
        field: String,
        #[serde(alias = "inputValue")]
        value: FieldValue,
    },
    SchedulerStart(StartParams),
    SchedulerStop,
    WindowMinimize,
    WindowClose,
    AlwaysOnTop {
        enabled: bool,
    },
    WindowFocus {
        focused: bool,
    },
}

/// Loosely typed start parameters.
///
/// Missing or malformed values make the start a silent no-op, so nothing is
/// validated until [`StartParams::click_job`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StartParams {
    #[serde(default, alias = "button")]
    pub input: Option<Value>,
    #[serde(default, rename = "type", alias = "clickType")]
    pub click_type: Option<Value>,
    #[serde(default)]
    pub repeat: Option<Value>,
    #[serde(default, alias = "intervalMs")]
    pub interval: Option<Value>,
}

impl StartParams {
    pub fn click_job(&self) -> Option<ClickJob> {
        let button: MouseButton = as_text(self.input.as_ref()?)?.parse().ok()?;
        let click_type: ClickType = as_text(self.click_type.as_ref()?)?.parse().ok()?;
        let repeat: RepeatPolicy = as_text(self.repeat.as_ref()?)?.parse().ok()?;
        let interval_ms: u64 = as_text(self.interval.as_ref()?)?.trim().parse().ok()?;

        Some(ClickJob {
            button,
            click_type,
            repeat,
            interval: Duration::from_millis(interval_ms),
        })
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    None,
    Profiles(Vec<Profile>),
    Deleted(bool),
    Settings(Option<ClickOptions>),
}

/// Messages pushed to the UI without a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum Notification {
    /// The hotkey asks the UI to start (`true`) or stop (`false`).
    BackgroundHotkeys { start: bool },
    /// The scheduler stopped itself after its repeat count.
    AutoclickStopped { success: bool },
    /// Window chrome request for the external frame.
    Frame(FrameRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "request", content = "value", rename_all = "kebab-case")]
pub enum FrameRequest {
    Minimize,
    Exit,
    AlwaysOnTop(bool),
}

/// One incoming line: a request plus the sequence number to echo back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub seq: Option<u64>,
    #[serde(flatten)]
    pub request: Request,
}

/// One outgoing line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    Reply {
        seq: Option<u64>,
        result: Response,
    },
    Error {
        seq: Option<u64>,
        error: String,
    },
    Event(Notification),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_requests() {
        let env: Envelope = serde_json::from_str(r#"{"seq": 3, "cmd": "profile-list"}"#).unwrap();
        assert_eq!(env.seq, Some(3));
        assert_eq!(env.request, Request::ProfileList);

        let env: Envelope =
            serde_json::from_str(r#"{"seq": 4, "cmd": "profile-delete", "id": 12}"#).unwrap();
        assert_eq!(env.seq, Some(4));
        assert_eq!(env.request, Request::ProfileDelete { id: 12 });

        let env: Envelope = serde_json::from_str(
            r#"{"cmd": "profile-add", "title": "fast", "optionValues": [{"input": "delayAmount", "value": "10"}]}"#,
        )
        .unwrap();
        assert_eq!(
            env.request,
            Request::ProfileAdd {
                title: "fast".into(),
                fields: vec![FieldUpdate::new("delayAmount", FieldValue::Text("10".into()))],
            }
        );

        let env: Envelope = serde_json::from_str(
            r#"{"cmd": "settings-save", "inputId": "loopInput", "inputValue": false}"#,
        )
        .unwrap();
        assert_eq!(
            env.request,
            Request::SettingsSave {
                field: "loopInput".into(),
                value: FieldValue::Bool(false),
            }
        );
    }

    #[test]
    fn test_start_params_to_job() {
        let env: Envelope = serde_json::from_str(
            r#"{"cmd": "scheduler-start", "input": "right", "type": "double", "repeat": "3", "interval": 250}"#,
        )
        .unwrap();
        let Request::SchedulerStart(params) = env.request else {
            panic!("expected scheduler-start");
        };
        let job = params.click_job().unwrap();
        assert_eq!(job.button, MouseButton::Right);
        assert_eq!(job.click_type, ClickType::Double);
        assert_eq!(job.repeat, RepeatPolicy::Times(3));
        assert_eq!(job.interval, Duration::from_millis(250));
    }

    #[test]
    fn test_incomplete_start_params_yield_no_job() {
        let complete = StartParams {
            input: Some(json!("left")),
            click_type: Some(json!("single")),
            repeat: Some(json!("loop")),
            interval: Some(json!("0")),
        };
        assert!(complete.click_job().is_some());

        let missing = StartParams {
            repeat: None,
            ..complete.clone()
        };
        assert!(missing.click_job().is_none());

        let malformed = StartParams {
            click_type: Some(json!("triple")),
            ..complete.clone()
        };
        assert!(malformed.click_job().is_none());

        let negative = StartParams {
            interval: Some(json!(-10)),
            ..complete
        };
        assert!(negative.click_job().is_none());
    }

    #[test]
    fn test_outbound_shapes() {
        let line = serde_json::to_value(Outbound::Event(Notification::BackgroundHotkeys {
            start: true,
        }))
        .unwrap();
        assert_eq!(line, json!({"event": "background-hotkeys", "payload": {"start": true}}));

        let line = serde_json::to_value(Outbound::Event(Notification::AutoclickStopped {
            success: true,
        }))
        .unwrap();
        assert_eq!(line, json!({"event": "autoclick-stopped", "payload": {"success": true}}));

        let line = serde_json::to_value(Outbound::Reply {
            seq: Some(9),
            result: Response::Deleted(false),
        })
        .unwrap();
        assert_eq!(line, json!({"seq": 9, "result": false}));

        let line = serde_json::to_value(Outbound::Reply {
            seq: None,
            result: Response::None,
        })
        .unwrap();
        assert_eq!(line, json!({"seq": null, "result": null}));

        let line = serde_json::to_value(Notification::Frame(FrameRequest::Minimize)).unwrap();
        assert_eq!(line, json!({"event": "frame", "payload": {"request": "minimize"}}));

        let line = serde_json::to_value(Notification::Frame(FrameRequest::AlwaysOnTop(true))).unwrap();
        assert_eq!(
            line,
            json!({"event": "frame", "payload": {"request": "always-on-top", "value": true}})
        );
    }
}
