//! Hosted search index client and query model.

use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AlgoliaConfig;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::http::{build_client, check_status};
use crate::indexer::IndexWriter;

const SERVICE: &str = "search";
const APP_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

/// Radius in metres applied around a resolved location.
pub const AROUND_RADIUS_METRES: u32 = 50_000;

/// Number of suggestions requested for keyword autocomplete.
pub const KEYWORD_SUGGESTION_LIMIT: usize = 5;

/// Records per batch write request.
pub const BATCH_SIZE: usize = 1000;

/// Pagination is capped at this many pages regardless of result count.
pub const MAX_PAGES: usize = 20;

/// Page numbers shown either side of the current page.
pub const PAGE_PADDING: usize = 3;

/// Parameters of one query against the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: String,
    pub hits_per_page: usize,
    pub page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub around_lat_lng: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub around_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_retrieve: Option<Vec<String>>,
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub hits: Vec<Event>,
    #[serde(default)]
    pub nb_hits: usize,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub nb_pages: usize,
    #[serde(default)]
    pub hits_per_page: usize,
}

/// Query side of the hosted search index.
pub trait SearchBackend {
    fn search(&self, params: &SearchParams) -> Result<SearchResults>;

    /// Candidate titles for keyword autocomplete.
    fn keyword_suggestions(&self, query: &str) -> Result<Vec<String>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let params = SearchParams {
            query: query.to_string(),
            hits_per_page: KEYWORD_SUGGESTION_LIMIT,
            attributes_to_retrieve: Some(vec!["title".to_string()]),
            ..SearchParams::default()
        };
        let results = self.search(&params)?;
        Ok(results
            .hits
            .into_iter()
            .map(|hit| hit.title)
            .filter(|title| !title.is_empty())
            .collect())
    }
}

/// REST client for the hosted index.
#[derive(Debug, Clone)]
pub struct AlgoliaClient {
    client: Client,
    app_id: String,
    api_key: String,
    index_name: String,
    search_host: Url,
    write_host: Url,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    requests: Vec<BatchOperation<'a>>,
}

#[derive(Debug, Serialize)]
struct BatchOperation<'a> {
    action: &'static str,
    body: &'a Event,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchResponse {
    #[serde(default, rename = "objectIDs")]
    object_ids: Vec<String>,
    #[serde(default, rename = "taskID")]
    task_id: Option<u64>,
}

impl AlgoliaClient {
    pub fn new(config: &AlgoliaConfig) -> Result<Self> {
        let search_host = default_host(&format!("{}-dsn", config.app_id))?;
        let write_host = default_host(&config.app_id)?;
        Ok(Self {
            client: build_client()?,
            app_id: config.app_id.clone(),
            api_key: config.api_key.clone(),
            index_name: config.index_name.clone(),
            search_host,
            write_host,
        })
    }

    /// Point both read and write calls at `host` (used against local fakes).
    pub fn with_host(mut self, host: Url) -> Self {
        self.search_host = host.clone();
        self.write_host = host;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn query_url(&self) -> Url {
        index_url(&self.search_host, &self.index_name, "query")
    }

    pub fn batch_url(&self) -> Url {
        index_url(&self.write_host, &self.index_name, "batch")
    }

    fn save_batch(&self, chunk: &[Event]) -> Result<Vec<String>> {
        let body = BatchRequest {
            requests: chunk
                .iter()
                .map(|record| BatchOperation {
                    action: "updateObject",
                    body: record,
                })
                .collect(),
        };
        let response = self
            .client
            .post(self.batch_url())
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()?;
        let response = check_status(SERVICE, response)?;
        let parsed: BatchResponse = response.json()?;
        debug!(
            task = ?parsed.task_id,
            records = parsed.object_ids.len(),
            "batch accepted"
        );
        Ok(parsed.object_ids)
    }
}

impl SearchBackend for AlgoliaClient {
    fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        debug!(
            query = %params.query,
            page = params.page,
            filters = ?params.filters,
            "searching index"
        );
        let response = self
            .client
            .post(self.query_url())
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(params)
            .send()?;
        let response = check_status(SERVICE, response)?;
        Ok(response.json::<SearchResults>()?)
    }
}

impl IndexWriter for AlgoliaClient {
    fn save_objects(&self, records: &[Event]) -> Result<Vec<String>> {
        let mut saved = Vec::with_capacity(records.len());
        for chunk in records.chunks(BATCH_SIZE) {
            saved.extend(self.save_batch(chunk)?);
        }
        info!(index = %self.index_name, records = saved.len(), "records upserted");
        Ok(saved)
    }
}

fn default_host(subdomain: &str) -> Result<Url> {
    let raw = format!("https://{subdomain}.algolia.net");
    Url::parse(&raw).map_err(|err| Error::InvalidUrl {
        url: raw.clone(),
        message: err.to_string(),
    })
}

fn index_url(host: &Url, index: &str, action: &str) -> Url {
    let mut url = host.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().extend(["1", "indexes", index, action]);
    }
    url
}

/// Page navigation derived from a result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub nb_pages: usize,
}

impl Pagination {
    /// Clamp to [`MAX_PAGES`] and to the available pages.
    pub fn new(current: usize, nb_pages: usize) -> Self {
        let nb_pages = nb_pages.min(MAX_PAGES);
        Self {
            current: current.min(nb_pages.saturating_sub(1)),
            nb_pages,
        }
    }

    pub fn from_results(results: &SearchResults) -> Self {
        Self::new(results.page, results.nb_pages)
    }

    /// Controls are hidden when everything fits on one page.
    pub fn should_render(&self) -> bool {
        self.nb_pages > 1
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.nb_pages
    }

    pub fn previous(&self) -> Option<usize> {
        (!self.is_first()).then(|| self.current - 1)
    }

    pub fn next(&self) -> Option<usize> {
        (!self.is_last()).then(|| self.current + 1)
    }

    /// Zero-based page indexes to show as buttons.
    pub fn pages(&self) -> Vec<usize> {
        let shown = PAGE_PADDING * 2 + 1;
        if self.nb_pages <= shown {
            return (0..self.nb_pages).collect();
        }
        let mut start = self.current.saturating_sub(PAGE_PADDING);
        let mut end = start + shown;
        if end > self.nb_pages {
            end = self.nb_pages;
            start = end - shown;
        }
        (start..end).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    fn config() -> AlgoliaConfig {
        AlgoliaConfig {
            app_id: "APPID".to_string(),
            api_key: "key".to_string(),
            index_name: "events".to_string(),
            hits_per_page: 12,
        }
    }

    #[test]
    fn urls_use_dsn_for_queries() {
        let client = AlgoliaClient::new(&config()).unwrap();
        assert_eq!(
            client.query_url().as_str(),
            "https://appid-dsn.algolia.net/1/indexes/events/query"
        );
        assert_eq!(
            client.batch_url().as_str(),
            "https://appid.algolia.net/1/indexes/events/batch"
        );
    }

    #[test]
    fn params_serialize_only_set_fields() {
        let params = SearchParams {
            query: "rocket".to_string(),
            hits_per_page: 12,
            page: 1,
            around_lat_lng: Some("53.5, -2.2".to_string()),
            around_radius: Some(AROUND_RADIUS_METRES),
            ..SearchParams::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "rocket",
                "hitsPerPage": 12,
                "page": 1,
                "aroundLatLng": "53.5, -2.2",
                "aroundRadius": 50000
            })
        );
    }

    #[test]
    fn decodes_result_page() {
        let payload = json!({
            "hits": [{"objectID": "a", "title": "Quarry tips"}],
            "nbHits": 15,
            "page": 0,
            "nbPages": 2,
            "hitsPerPage": 12,
            "processingTimeMS": 1
        });
        let results: SearchResults = serde_json::from_value(payload).unwrap();
        assert_eq!(results.nb_hits, 15);
        assert_eq!(results.hits[0].title, "Quarry tips");
    }

    struct RecordingBackend {
        seen: RefCell<Vec<SearchParams>>,
    }

    impl SearchBackend for RecordingBackend {
        fn search(&self, params: &SearchParams) -> Result<SearchResults> {
            self.seen.borrow_mut().push(params.clone());
            Ok(SearchResults {
                hits: vec![
                    Event {
                        object_id: "1".to_string(),
                        title: "Rocket".to_string(),
                        ..Event::default()
                    },
                    Event {
                        object_id: "2".to_string(),
                        ..Event::default()
                    },
                ],
                ..SearchResults::default()
            })
        }
    }

    #[test]
    fn keyword_suggestions_request_titles_only() {
        let backend = RecordingBackend {
            seen: RefCell::new(Vec::new()),
        };
        assert_eq!(backend.keyword_suggestions("roc").unwrap(), vec!["Rocket"]);
        let seen = backend.seen.borrow();
        assert_eq!(seen[0].hits_per_page, 5);
        assert_eq!(seen[0].attributes_to_retrieve, Some(vec!["title".to_string()]));
    }

    #[test]
    fn blank_keyword_skips_request() {
        let backend = RecordingBackend {
            seen: RefCell::new(Vec::new()),
        };
        assert!(backend.keyword_suggestions("   ").unwrap().is_empty());
        assert!(backend.seen.borrow().is_empty());
    }

    #[test]
    fn pagination_is_capped_and_windowed() {
        let p = Pagination::new(0, 50);
        assert_eq!(p.nb_pages, 20);
        assert_eq!(p.pages(), vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(p.is_first());
        assert_eq!(p.previous(), None);
        assert_eq!(p.next(), Some(1));

        let middle = Pagination::new(10, 20);
        assert_eq!(middle.pages(), vec![7, 8, 9, 10, 11, 12, 13]);

        let end = Pagination::new(19, 20);
        assert_eq!(end.pages(), vec![13, 14, 15, 16, 17, 18, 19]);
        assert!(end.is_last());
    }

    #[test]
    fn single_page_hides_controls() {
        assert!(!Pagination::new(0, 1).should_render());
        assert!(Pagination::new(0, 2).should_render());
        assert_eq!(Pagination::new(0, 0).pages(), Vec::<usize>::new());
    }
}
