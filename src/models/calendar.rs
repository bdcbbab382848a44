//! Academic calendar: one document per month, holding that month's events.

use serde::de::{Deserializer, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Label set an event's `type` is drawn from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Admission,
    #[default]
    Academic,
    Exam,
    Holiday,
    Result,
    Event,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Admission,
        EventType::Academic,
        EventType::Exam,
        EventType::Holiday,
        EventType::Result,
        EventType::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Admission => "admission",
            EventType::Academic => "academic",
            EventType::Exam => "exam",
            EventType::Holiday => "holiday",
            EventType::Result => "result",
            EventType::Event => "event",
        }
    }

    /// Reads `type` as the validator accepts it: blank or missing means the
    /// default, anything else must name a variant.
    fn lenient<'de, D: Deserializer<'de>>(de: D) -> Result<EventType, D::Error> {
        let raw = match Value::deserialize(de)? {
            Value::Null => return Ok(EventType::default()),
            Value::String(s) if s.trim().is_empty() => return Ok(EventType::default()),
            Value::String(s) => s,
            other => return Err(D::Error::custom(format!("invalid event type {other}"))),
        };
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == raw)
            .ok_or_else(|| D::Error::custom(format!("unknown event type `{raw}`")))
    }
}

/// A single dated entry in a month group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CalendarEvent {
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "EventType::lenient")]
    pub event_type: EventType,
    #[serde(default, deserialize_with = "lenient::string")]
    pub desc: String,
}

/// All events of one month of one year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CalendarMonthGroup {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub month: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub year: String,
    /// Sort key for display (1 = January).
    #[serde(default, deserialize_with = "lenient::order")]
    pub month_order: u32,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// 1-based position of a month name, case-insensitive. Unknown names sort last.
pub fn month_order(month: &str) -> u32 {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month.trim()))
        .map(|i| i as u32 + 1)
        .unwrap_or(13)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_month_group_round_trips_wire_shape() {
        let raw = json!({
            "_id": "m1",
            "month": "January",
            "year": "2026",
            "month_order": 1,
            "events": [ { "date": "05", "title": "Orientation", "type": "academic", "desc": "Welcome" } ],
            "color": "blue"
        });
        let group: CalendarMonthGroup = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(group.events[0].event_type, EventType::Academic);
        assert_eq!(group.extra["color"], "blue");
        assert_eq!(serde_json::to_value(&group).unwrap(), raw);
    }

    #[test]
    fn test_blank_type_and_numeric_year_are_accepted() {
        let raw = json!({
            "month": "May",
            "year": 2026,
            "month_order": "5",
            "events": [ { "date": 1, "title": "Labour Day", "type": "" }, { "date": "20", "title": "Exam", "type": null } ]
        });
        let group: CalendarMonthGroup = serde_json::from_value(raw).unwrap();
        assert_eq!(group.year, "2026");
        assert_eq!(group.month_order, 5);
        assert_eq!(group.events[0].date, "1");
        assert_eq!(group.events[0].event_type, EventType::Academic);
        assert_eq!(group.events[1].event_type, EventType::Academic);

        let unknown = json!({ "month": "May", "events": [ { "title": "Party", "type": "party" } ] });
        assert!(serde_json::from_value::<CalendarMonthGroup>(unknown).is_err());
    }

    #[test]
    fn test_month_order() {
        assert_eq!(month_order("January"), 1);
        assert_eq!(month_order(" december "), 12);
        assert_eq!(month_order("Smarch"), 13);
    }
}
