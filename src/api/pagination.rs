// api/pagination.rs - Query string parsing and page envelopes

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Uri},
};
use serde::Serialize;
use std::convert::Infallible;

use crate::config::ApiConfig;
use crate::database::PageRequest;

/// Raw query pairs in request order. Repeated keys (`?tags=a&tags=b`) are
/// kept, which `axum::extract::Query` into a struct cannot express.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
    path: String,
}

impl QueryParams {
    pub fn from_uri(uri: &Uri) -> Self {
        let pairs = uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { pairs, path: uri.path().to_string() }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str()).collect()
    }

    /// `?flag=1` or `?flag=true`
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1") | Some("true"))
    }

    /// Positive integer parameter; anything else reads as absent
    pub fn positive(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.parse::<i64>().ok()).filter(|v| *v > 0)
    }

    pub fn pager(&self, api: &ApiConfig) -> Pager {
        let limit = self
            .positive("limit")
            .unwrap_or(i64::from(api.page_size))
            .min(i64::from(api.max_page_size));
        Pager { page: self.positive("page").unwrap_or(1), limit }
    }

    /// Link to another page of the same listing, other parameters unchanged
    fn link(&self, page: i64) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.pairs.iter().filter(|(k, _)| k != "page") {
            query.append_pair(k, v);
        }
        query.append_pair("page", &page.to_string());
        format!("{}?{}", self.path, query.finish())
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(QueryParams::from_uri(&parts.uri))
    }
}

/// 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: i64,
    pub limit: i64,
}

impl Pager {
    pub fn request(&self) -> PageRequest {
        PageRequest { limit: self.limit, offset: (self.page - 1).saturating_mul(self.limit) }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    pub fn new(results: Vec<T>, count: i64, pager: Pager, params: &QueryParams) -> Self {
        let has_next = pager.page.saturating_mul(pager.limit) < count;
        Self {
            count,
            next: has_next.then(|| params.link(pager.page + 1)),
            previous: (pager.page > 1).then(|| params.link(pager.page - 1)),
            results,
        }
    }
}
