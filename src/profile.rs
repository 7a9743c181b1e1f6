//! Click profiles and the option fields they are made of.
//!
//! Every field identifier that arrives from the UI is parsed into
//! [`ProfileField`] before it is allowed anywhere near the profile table or the
//! settings document. Values are coerced per field, so a checkbox can be sent
//! as `true` or `"true"` and a number as `250` or `"250"`.

use crate::error::{ClickerError, Result};
use crate::input::MouseButton;
use crate::scheduler::ClickJob;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Click pattern performed on every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickType {
    #[default]
    Single,
    Double,
    Hold,
}

impl ClickType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Hold => "hold",
        }
    }
}

impl FromStr for ClickType {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "hold" => Ok(Self::Hold),
            other => Err(ClickerError::invalid_value(
                "typeInput",
                other,
                "expected single, double or hold",
            )),
        }
    }
}

/// How many cycles a click job runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPolicy {
    Loop,
    /// Always at least one.
    Times(u32),
}

impl FromStr for RepeatPolicy {
    type Err = ClickerError;

    /// Accepts `"loop"` or a positive cycle count.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("loop") {
            return Ok(Self::Loop);
        }
        match s.parse::<u32>() {
            Ok(0) => Err(ClickerError::invalid_value("repeat", s, "count must be at least 1")),
            Ok(n) => Ok(Self::Times(n)),
            Err(e) => Err(ClickerError::invalid_value("repeat", s, e.to_string())),
        }
    }
}

/// The option columns shared by profiles and the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    MouseButtonInput,
    DelayCheckbox,
    DelayAmount,
    TypeInput,
    RepeatSetTimesInput,
    RepeatTimes,
    AlwaysOnTopCheckbox,
    LoopInput,
    HoursInput,
    MinutesInput,
    SecondsInput,
    MillisecondsInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Button,
    ClickType,
    Flag,
    Number,
}

impl ProfileField {
    pub const ALL: [ProfileField; 12] = [
        Self::MouseButtonInput,
        Self::DelayCheckbox,
        Self::DelayAmount,
        Self::TypeInput,
        Self::RepeatSetTimesInput,
        Self::RepeatTimes,
        Self::AlwaysOnTopCheckbox,
        Self::LoopInput,
        Self::HoursInput,
        Self::MinutesInput,
        Self::SecondsInput,
        Self::MillisecondsInput,
    ];

    /// Column name in the profile table, identical to the UI's input id.
    pub fn column(&self) -> &'static str {
        match self {
            Self::MouseButtonInput => "mouseButtonInput",
            Self::DelayCheckbox => "delayCheckbox",
            Self::DelayAmount => "delayAmount",
            Self::TypeInput => "typeInput",
            Self::RepeatSetTimesInput => "repeatSetTimesInput",
            Self::RepeatTimes => "repeatTimes",
            Self::AlwaysOnTopCheckbox => "alwaysOnTopCheckbox",
            Self::LoopInput => "loopInput",
            Self::HoursInput => "hoursInput",
            Self::MinutesInput => "minutesInput",
            Self::SecondsInput => "secondsInput",
            Self::MillisecondsInput => "millisecondsInput",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            Self::MouseButtonInput => FieldKind::Button,
            Self::TypeInput => FieldKind::ClickType,
            Self::DelayCheckbox
            | Self::RepeatSetTimesInput
            | Self::AlwaysOnTopCheckbox
            | Self::LoopInput => FieldKind::Flag,
            Self::DelayAmount
            | Self::RepeatTimes
            | Self::HoursInput
            | Self::MinutesInput
            | Self::SecondsInput
            | Self::MillisecondsInput => FieldKind::Number,
        }
    }

    /// The other half of the mutually exclusive repeat-mode pair.
    pub fn exclusive_partner(&self) -> Option<ProfileField> {
        match self {
            Self::LoopInput => Some(Self::RepeatSetTimesInput),
            Self::RepeatSetTimesInput => Some(Self::LoopInput),
            _ => None,
        }
    }

    /// Normalizes `value` into the representation stored for this field.
    pub fn coerce(&self, value: &FieldValue) -> Result<FieldValue> {
        let invalid = |reason: &str| ClickerError::invalid_value(self.column(), value.to_string(), reason);

        match (self.kind(), value) {
            (FieldKind::Button, FieldValue::Text(s)) => {
                Ok(FieldValue::Text(s.parse::<MouseButton>()?.as_str().to_string()))
            }
            (FieldKind::ClickType, FieldValue::Text(s)) => {
                Ok(FieldValue::Text(s.parse::<ClickType>()?.as_str().to_string()))
            }
            (FieldKind::Flag, FieldValue::Bool(b)) => Ok(FieldValue::Bool(*b)),
            (FieldKind::Flag, FieldValue::Integer(0)) => Ok(FieldValue::Bool(false)),
            (FieldKind::Flag, FieldValue::Integer(1)) => Ok(FieldValue::Bool(true)),
            (FieldKind::Flag, FieldValue::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(FieldValue::Bool(true)),
                "false" | "0" => Ok(FieldValue::Bool(false)),
                _ => Err(invalid("expected a boolean")),
            },
            (FieldKind::Number, FieldValue::Integer(n)) if *n >= 0 => Ok(FieldValue::Integer(*n)),
            (FieldKind::Number, FieldValue::Text(s)) => parse_number::<i64>(s)
                .ok()
                .filter(|n| *n >= 0)
                .map(FieldValue::Integer)
                .ok_or_else(|| invalid("expected a non-negative integer")),
            (FieldKind::Number, _) => Err(invalid("expected a non-negative integer")),
            (FieldKind::Flag, _) => Err(invalid("expected a boolean")),
            (FieldKind::Button | FieldKind::ClickType, _) => Err(invalid("expected text")),
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for ProfileField {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.column() == s)
            .ok_or_else(|| ClickerError::unknown_field(s))
    }
}

/// A raw option value as sent by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One `(fieldId, value)` pair of an add/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    #[serde(alias = "input")]
    pub id: String,
    pub value: FieldValue,
}

impl FieldUpdate {
    pub fn new(id: impl Into<String>, value: FieldValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// Validates a batch of updates against the field allow-list.
///
/// Values are coerced, later entries win over earlier ones, and setting one
/// repeat-mode flag writes the complement into its partner.
pub fn normalize_updates(updates: &[FieldUpdate]) -> Result<Vec<(ProfileField, FieldValue)>> {
    let mut out: Vec<(ProfileField, FieldValue)> = Vec::with_capacity(updates.len() + 1);

    let mut put = |field: ProfileField, value: FieldValue| {
        match out.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => out.push((field, value)),
        }
    };

    for update in updates {
        let field: ProfileField = update.id.parse()?;
        let value = field.coerce(&update.value)?;
        if let (Some(partner), FieldValue::Bool(b)) = (field.exclusive_partner(), &value) {
            put(partner, FieldValue::Bool(!b));
        }
        put(field, value);
    }

    Ok(out)
}

/// Every option of a click job, as stored in a profile row or the settings
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickOptions {
    pub mouse_button_input: MouseButton,
    pub delay_checkbox: bool,
    #[serde(with = "numeric_string")]
    pub delay_amount: u64,
    pub type_input: ClickType,
    pub repeat_set_times_input: bool,
    #[serde(with = "numeric_string")]
    pub repeat_times: u32,
    pub always_on_top_checkbox: bool,
    pub loop_input: bool,
    #[serde(with = "numeric_string")]
    pub hours_input: u64,
    #[serde(with = "numeric_string")]
    pub minutes_input: u64,
    #[serde(with = "numeric_string")]
    pub seconds_input: u64,
    #[serde(with = "numeric_string")]
    pub milliseconds_input: u64,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            mouse_button_input: MouseButton::Left,
            delay_checkbox: false,
            delay_amount: 1000,
            type_input: ClickType::Single,
            repeat_set_times_input: false,
            repeat_times: 1,
            always_on_top_checkbox: false,
            loop_input: true,
            hours_input: 0,
            minutes_input: 0,
            seconds_input: 0,
            milliseconds_input: 0,
        }
    }
}

impl ClickOptions {
    /// Sets a single field, keeping the repeat-mode flags mutually exclusive.
    pub fn set(&mut self, field: ProfileField, value: &FieldValue) -> Result<()> {
        self.set_raw(field, value)?;
        match field {
            ProfileField::LoopInput => self.repeat_set_times_input = !self.loop_input,
            ProfileField::RepeatSetTimesInput => self.loop_input = !self.repeat_set_times_input,
            _ => {}
        }
        Ok(())
    }

    /// Sets a single field exactly as given, without touching its
    /// repeat-mode partner.
    pub fn set_raw(&mut self, field: ProfileField, value: &FieldValue) -> Result<()> {
        match field.coerce(value)? {
            FieldValue::Text(s) => match field {
                ProfileField::MouseButtonInput => self.mouse_button_input = s.parse()?,
                ProfileField::TypeInput => self.type_input = s.parse()?,
                _ => unreachable!("coerce yields text only for enum fields"),
            },
            FieldValue::Bool(b) => match field {
                ProfileField::DelayCheckbox => self.delay_checkbox = b,
                ProfileField::AlwaysOnTopCheckbox => self.always_on_top_checkbox = b,
                ProfileField::LoopInput => self.loop_input = b,
                ProfileField::RepeatSetTimesInput => self.repeat_set_times_input = b,
                _ => unreachable!("coerce yields booleans only for flag fields"),
            },
            FieldValue::Integer(n) => {
                let n = n as u64;
                match field {
                    ProfileField::DelayAmount => self.delay_amount = n,
                    ProfileField::RepeatTimes => {
                        self.repeat_times = u32::try_from(n).map_err(|_| {
                            ClickerError::invalid_value(field.column(), n.to_string(), "too large")
                        })?
                    }
                    ProfileField::HoursInput => self.hours_input = n,
                    ProfileField::MinutesInput => self.minutes_input = n,
                    ProfileField::SecondsInput => self.seconds_input = n,
                    ProfileField::MillisecondsInput => self.milliseconds_input = n,
                    _ => unreachable!("coerce yields integers only for number fields"),
                }
            }
        }
        Ok(())
    }

    /// Applies a batch of updates in order.
    pub fn apply(&mut self, updates: &[(ProfileField, FieldValue)]) -> Result<()> {
        for (field, value) in updates {
            self.set(*field, value)?;
        }
        Ok(())
    }

    /// Interval between cycles, summed from the four timing inputs.
    pub fn interval(&self) -> Duration {
        let ms = self
            .hours_input
            .saturating_mul(3_600_000)
            .saturating_add(self.minutes_input.saturating_mul(60_000))
            .saturating_add(self.seconds_input.saturating_mul(1_000))
            .saturating_add(self.milliseconds_input);
        Duration::from_millis(ms)
    }

    pub fn repeat_policy(&self) -> RepeatPolicy {
        if self.loop_input {
            RepeatPolicy::Loop
        } else {
            RepeatPolicy::Times(self.repeat_times.max(1))
        }
    }

    /// Scheduler parameters described by these options.
    pub fn click_job(&self) -> ClickJob {
        ClickJob {
            button: self.mouse_button_input,
            click_type: self.type_input,
            repeat: self.repeat_policy(),
            interval: self.interval(),
        }
    }
}

/// A named, persisted set of click options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub title: String,
    #[serde(flatten)]
    pub options: ClickOptions,
}

/// Empty input counts as zero, the way a cleared number box reads.
fn parse_number<T: FromStr>(s: &str) -> std::result::Result<T, T::Err> {
    let s = s.trim();
    if s.is_empty() { "0" } else { s }.parse()
}

/// Numbers written as decimal strings, read from either strings or numbers.
mod numeric_string {
    use serde::de;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Number(T),
        Text(String),
    }

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + Deserialize<'de>,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match Raw::<T>::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => super::parse_number(&s).map_err(de::Error::custom),
        }
    }
}
