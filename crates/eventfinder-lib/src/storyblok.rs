//! Published event content from the Storyblok CDN API.

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::StoryblokConfig;
use crate::error::{Error, Result};
use crate::event::lenient_price;
use crate::http::{build_client, check_status};

const SERVICE: &str = "cms";
const CDN_ENDPOINT: &str = "https://api.storyblok.com/v2/cdn/stories";

/// Story that holds the event list.
pub const EVENTS_STORY_SLUG: &str = "events";

/// Component name of the block carrying the events.
pub const EVENT_LIST_COMPONENT: &str = "eventList";

/// Asset reference as delivered by the CMS.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoryblokAsset {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One event entry inside the `eventList` block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoryblokEvent {
    #[serde(rename = "_uid")]
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<StoryblokAsset>,
    #[serde(default)]
    pub summary: serde_json::Value,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub event_format: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
}

/// Where the indexing pipeline reads events from.
pub trait EventSource {
    fn fetch_events(&self) -> Result<Vec<StoryblokEvent>>;
}

#[derive(Debug, Deserialize)]
struct StoryResponse {
    story: Story,
}

#[derive(Debug, Deserialize)]
struct Story {
    #[serde(default)]
    slug: String,
    #[serde(default)]
    content: StoryContent,
}

#[derive(Debug, Default, Deserialize)]
struct StoryContent {
    #[serde(default)]
    body: Vec<serde_json::Value>,
}

/// Pull the events out of a story payload.
///
/// A story with no `eventList` block is rejected with
/// [`Error::MissingEventList`] so a mis-published story cannot empty the
/// index. A block whose `events` field is absent or null yields no events.
pub fn parse_event_story(payload: &str) -> Result<Vec<StoryblokEvent>> {
    let response: StoryResponse = serde_json::from_str(payload)?;
    let story = response.story;
    let block = story
        .content
        .body
        .into_iter()
        .find(|block| {
            block.get("component").and_then(|c| c.as_str()) == Some(EVENT_LIST_COMPONENT)
        })
        .ok_or_else(|| Error::MissingEventList {
            slug: story.slug.clone(),
        })?;

    match block.get("events") {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(events) => Ok(serde_json::from_value(events.clone())?),
    }
}

/// Blocking CDN client for the published events story.
#[derive(Debug, Clone)]
pub struct StoryblokClient {
    client: Client,
    access_token: String,
}

impl StoryblokClient {
    pub fn new(config: &StoryblokConfig) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            access_token: config.access_token.clone(),
        })
    }

    pub fn story_url(&self, slug: &str) -> Result<Url> {
        let mut url = Url::parse(CDN_ENDPOINT).map_err(|err| Error::InvalidUrl {
            url: CDN_ENDPOINT.to_string(),
            message: err.to_string(),
        })?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(slug);
        }
        url.query_pairs_mut()
            .append_pair("version", "published")
            .append_pair("token", &self.access_token);
        Ok(url)
    }
}

impl EventSource for StoryblokClient {
    fn fetch_events(&self) -> Result<Vec<StoryblokEvent>> {
        let url = self.story_url(EVENTS_STORY_SLUG)?;
        debug!(slug = EVENTS_STORY_SLUG, "fetching published story");
        let response = self.client.get(url).send()?;
        let response = check_status(SERVICE, response)?;
        let events = parse_event_story(&response.text()?)?;
        info!(count = events.len(), "fetched events from CMS");
        Ok(events)
    }
}
