//! Collection pagination.
//!
//! Slices an ordered, countable collection into pages and builds the
//! navigation links. Out-of-range pages are not an error: they come back
//! with no items and the regular metadata.

use axum::extract::{FromRef, FromRequestParts, OriginalUri};
use axum::http::Uri;
use axum::http::request::Parts;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::response::{PublicUrl, Resource};
use crate::state::KernelState;

/// An ordered collection with a stable count that can be sliced by offset.
pub trait OrderedCollection {
    type Item;

    fn total(&self) -> u64;

    fn slice(&self, offset: u64, limit: u64) -> Vec<Self::Item>;
}

impl<T: Clone> OrderedCollection for Vec<T> {
    type Item = T;

    fn total(&self) -> u64 {
        self.len() as u64
    }

    fn slice(&self, offset: u64, limit: u64) -> Vec<T> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        self.iter().skip(start).take(limit).cloned().collect()
    }
}

/// Paging parameters read from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Requested page, 1-based. May be out of range.
    pub page: i64,
    /// Items per page, already clamped into `1..=max_per_page`.
    pub per_page: u64,
    /// Return full projections instead of references.
    pub expanded: bool,
}

impl PageRequest {
    /// Parse `page`, `per_page` and `expanded` from a raw query string.
    ///
    /// Values that are not integers fall back to their defaults.
    pub fn from_query(query: Option<&str>, max_per_page: u64) -> Self {
        let max_per_page = max_per_page.max(1);
        let mut page = 1;
        let mut per_page = max_per_page;
        let mut expanded = false;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "page" => {
                    if let Ok(v) = value.trim().parse::<i64>() {
                        page = v;
                    }
                }
                "per_page" => {
                    if let Ok(v) = value.trim().parse::<i64>() {
                        per_page = u64::try_from(v.max(1)).unwrap_or(1).min(max_per_page);
                    }
                }
                "expanded" => {
                    if let Ok(v) = value.trim().parse::<i64>() {
                        expanded = v != 0;
                    }
                }
                _ => {}
            }
        }

        Self {
            page,
            per_page,
            expanded,
        }
    }
}

/// Builds absolute links to other pages of the current collection.
#[derive(Debug, Clone)]
pub struct PageLinks {
    base: String,
    preserved: Vec<(String, String)>,
}

impl PageLinks {
    /// Links rooted at `public_url` + the path of `uri`, keeping every query
    /// parameter except the paging ones.
    pub fn new(public_url: &PublicUrl, uri: &Uri) -> Self {
        let preserved = url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
            .filter(|(k, _)| !matches!(k.as_ref(), "page" | "per_page" | "expanded"))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self {
            base: public_url.join(uri.path()),
            preserved,
        }
    }

    /// Absolute URL of `page`.
    pub fn page_url(&self, page: i64, per_page: u64, expanded: bool) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.preserved {
            query.append_pair(k, v);
        }
        query.append_pair("page", &page.to_string());
        query.append_pair("per_page", &per_page.to_string());
        if expanded {
            query.append_pair("expanded", "1");
        }
        format!("{}?{}", self.base, query.finish())
    }
}

/// Pagination metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub first_url: String,
    pub last_url: String,
}

/// One page of a collection.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// References (URL strings) or expanded projections.
    pub items: Vec<Value>,
    pub pages: PageMeta,
}

impl PageResult {
    /// Render as `{ <collection>: [...], "pages": {...} }`.
    pub fn into_body(self, collection: &str) -> Value {
        let mut body = Map::new();
        body.insert(collection.to_string(), Value::Array(self.items));
        body.insert(
            "pages".to_string(),
            serde_json::to_value(self.pages).unwrap_or(Value::Null),
        );
        Value::Object(body)
    }
}

/// Slice `collection` according to `request`.
pub fn paginate<C>(collection: &C, request: &PageRequest, links: &PageLinks) -> PageResult
where
    C: OrderedCollection,
    C::Item: Resource,
{
    let per_page = request.per_page.max(1);
    let total = collection.total();
    let pages = total.div_ceil(per_page);
    let page = request.page;

    let items = match u64::try_from(page) {
        Ok(p) if p >= 1 && p <= pages => collection
            .slice((p - 1) * per_page, per_page)
            .iter()
            .map(|item| {
                if request.expanded {
                    item.export_data()
                } else {
                    Value::String(item.url())
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let pages_i64 = i64::try_from(pages).unwrap_or(i64::MAX);
    let link = |p: i64| links.page_url(p, per_page, request.expanded);

    PageResult {
        items,
        pages: PageMeta {
            page,
            per_page,
            total,
            pages,
            prev_url: (page > 1).then(|| link(page - 1)),
            next_url: (page < pages_i64).then(|| link(page + 1)),
            first_url: link(1),
            last_url: link(pages_i64.max(1)),
        },
    }
}

/// Extractor bundling the paging parameters and link builder of a request.
#[derive(Debug, Clone)]
pub struct Paginated {
    pub request: PageRequest,
    pub links: PageLinks,
}

impl Paginated {
    pub fn paginate<C>(&self, collection: &C) -> PageResult
    where
        C: OrderedCollection,
        C::Item: Resource,
    {
        paginate(collection, &self.request, &self.links)
    }
}

impl<S> FromRequestParts<S> for Paginated
where
    KernelState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let kernel = KernelState::from_ref(state);
        // nested routers strip their prefix from `parts.uri`
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(&parts.uri);
        Ok(Self {
            request: PageRequest::from_query(uri.query(), kernel.max_per_page()),
            links: PageLinks::new(kernel.public_url(), uri),
        })
    }
}
