//! Event records as stored in the search index.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::{format_event_dates, parse_event_datetime, EventDates};
use crate::geo::Coordinates;

const IMAGE_TRANSFORM: &str = "/m/600x300/filters:quality(80):format(webp)";
const PLACEHOLDER_IMAGE: &str = "https://placehold.net/default.svg";

/// Image reference attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventImage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// One event. Read-only on the client side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EventImage>,
    /// Rich-text document as delivered by the CMS.
    #[serde(default)]
    pub summary: serde_json::Value,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "_geoloc", default, skip_serializing_if = "Option::is_none")]
    pub geoloc: Option<Coordinates>,
    #[serde(default)]
    pub event_format: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<i64>,
    #[serde(default)]
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<i64>,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
}

/// Attendance format of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventFormat {
    Online,
    InPerson,
    Hybrid,
    Other,
}

impl EventFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "online" => EventFormat::Online,
            "in-person" => EventFormat::InPerson,
            "hybrid" => EventFormat::Hybrid,
            _ => EventFormat::Other,
        }
    }
}

impl Event {
    pub fn format(&self) -> EventFormat {
        EventFormat::parse(&self.event_format)
    }

    /// Start instant, preferring the indexed millisecond timestamp.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        instant(self.start_timestamp, &self.start_date)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        instant(self.end_timestamp, &self.end_date)
    }

    pub fn dates(&self) -> Option<EventDates> {
        Some(format_event_dates(self.start()?, self.end()?))
    }

    /// Location line for cards, depending on the attendance format.
    pub fn location_label(&self) -> Option<String> {
        let loc = self.location.trim();
        match self.format() {
            EventFormat::Online => Some("Online".to_string()),
            EventFormat::InPerson => (!loc.is_empty()).then(|| loc.to_string()),
            EventFormat::Hybrid if loc.is_empty() => Some("Online".to_string()),
            EventFormat::Hybrid => Some(format!("{loc} & Online")),
            EventFormat::Other => (!loc.is_empty()).then(|| loc.to_string()),
        }
    }

    /// `"Free"` or `"From £12.50 (Excl. VAT)"`.
    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) if price != 0.0 && price.is_finite() => {
                format!("From {} (Excl. VAT)", format_gbp(price))
            }
            _ => "Free".to_string(),
        }
    }

    /// Category tag with dashes rendered as spaces.
    pub fn type_label(&self) -> Option<String> {
        let trimmed = self.event_type.trim();
        (!trimmed.is_empty()).then(|| trimmed.replace('-', " "))
    }

    /// Card image URL with the CDN resize transform, or a placeholder.
    pub fn card_image_url(&self) -> String {
        match &self.image {
            Some(image) if !image.url.is_empty() => format!("{}{}", image.url, IMAGE_TRANSFORM),
            _ => PLACEHOLDER_IMAGE.to_string(),
        }
    }

    /// Plain-text rendering of the rich-text summary.
    pub fn summary_text(&self) -> Option<String> {
        let text = rich_text_to_plain(&self.summary);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Events carrying a valid coordinate pair, in input order.
pub fn mappable_events(events: &[Event]) -> Vec<&Event> {
    events
        .iter()
        .filter(|event| event.geoloc.is_some_and(|coords| coords.is_valid()))
        .collect()
}

fn instant(timestamp: Option<i64>, raw: &str) -> Option<DateTime<Utc>> {
    timestamp
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .or_else(|| parse_event_datetime(raw))
}

fn format_gbp(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}£{grouped}.{fraction}")
}

/// Flatten a rich-text document: block nodes become lines, text nodes are
/// concatenated.
fn rich_text_to_plain(node: &serde_json::Value) -> String {
    let kind = node.get("type").and_then(|t| t.as_str()).unwrap_or_default();
    match kind {
        "text" => node
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string(),
        "hard_break" => "\n".to_string(),
        _ => {
            let children = node
                .get("content")
                .and_then(|c| c.as_array())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let separator = if kind == "paragraph" || kind == "heading" {
                ""
            } else {
                "\n"
            };
            children
                .iter()
                .map(rich_text_to_plain)
                .collect::<Vec<_>>()
                .join(separator)
        }
    }
}

pub(crate) fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(format: &str, location: &str) -> Event {
        Event {
            object_id: "evt-1".to_string(),
            event_format: format.to_string(),
            location: location.to_string(),
            ..Event::default()
        }
    }

    #[test]
    fn location_label_by_format() {
        assert_eq!(event("Online", "Leeds").location_label().as_deref(), Some("Online"));
        assert_eq!(event("in-person", " Leeds ").location_label().as_deref(), Some("Leeds"));
        assert_eq!(event("in-person", "").location_label(), None);
        assert_eq!(
            event("Hybrid", "Leeds").location_label().as_deref(),
            Some("Leeds & Online")
        );
        assert_eq!(event("hybrid", "").location_label().as_deref(), Some("Online"));
        assert_eq!(event("", "York").location_label().as_deref(), Some("York"));
    }

    #[test]
    fn price_labels() {
        let mut e = event("online", "");
        assert_eq!(e.price_label(), "Free");
        e.price = Some(0.0);
        assert_eq!(e.price_label(), "Free");
        e.price = Some(12.5);
        assert_eq!(e.price_label(), "From £12.50 (Excl. VAT)");
        e.price = Some(1250.0);
        assert_eq!(e.price_label(), "From £1,250.00 (Excl. VAT)");
    }

    #[test]
    fn image_url_gets_cdn_transform() {
        let mut e = event("online", "");
        assert_eq!(e.card_image_url(), PLACEHOLDER_IMAGE);
        e.image = Some(EventImage {
            url: "https://a.storyblok.com/f/1/img.jpg".to_string(),
            alt: String::new(),
        });
        assert_eq!(
            e.card_image_url(),
            "https://a.storyblok.com/f/1/img.jpg/m/600x300/filters:quality(80):format(webp)"
        );
    }

    #[test]
    fn decodes_index_record() {
        let record = json!({
            "objectID": "abc",
            "title": "Smeaton Lecture",
            "location": "Leeds",
            "_geoloc": {"lat": "53.8", "lng": -1.55},
            "eventFormat": "in-person",
            "eventType": "guest-lecture",
            "startDate": "2025-07-18 09:00",
            "startTimestamp": 1752825600000_i64,
            "endDate": "2025-07-18 16:00",
            "price": "15",
            "summary": {"type": "doc", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "Hello "}, {"type": "text", "text": "world"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "Second"}]}
            ]}
        });
        let e: Event = serde_json::from_value(record).unwrap();
        assert_eq!(e.object_id, "abc");
        assert_eq!(e.geoloc, Some(Coordinates::new(53.8, -1.55)));
        assert_eq!(e.price, Some(15.0));
        assert_eq!(e.type_label().as_deref(), Some("guest lecture"));
        assert_eq!(e.summary_text().as_deref(), Some("Hello world\nSecond"));
        assert_eq!(e.format(), EventFormat::InPerson);
        assert!(e.dates().is_some());
    }

    #[test]
    fn mappable_events_skip_missing_or_bad_coordinates() {
        let mut good = event("in-person", "Leeds");
        good.geoloc = Some(Coordinates::new(53.8, -1.55));
        let mut bad = event("in-person", "Nowhere");
        bad.geoloc = Some(Coordinates::new(f64::NAN, 0.0));
        let none = event("online", "");

        let events = vec![good.clone(), bad, none];
        let mappable = mappable_events(&events);
        assert_eq!(mappable.len(), 1);
        assert_eq!(mappable[0].location, "Leeds");
    }
}
