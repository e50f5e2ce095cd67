//! HTTP client for the posts API
//!
//! The bearer token is read from the session on every request rather than
//! baked into default headers, so a refreshed or cleared session takes effect
//! immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::domain::entities::{
    Category, Pagination, PopularTag, Post, PostId, PostListRequest, PostPage, PostStats,
    QueryState,
};
use crate::domain::ports::{PostMutationService, PostQueryService, SessionProvider};
use crate::error::FeedError;

/// reqwest-backed implementation of both posts ports
pub struct HttpPostService<S>
where
    S: SessionProvider,
{
    http: Client,
    base_url: String,
    session: Arc<S>,
}

impl<S> HttpPostService<S>
where
    S: SessionProvider,
{
    pub fn new(base_url: &str, session: Arc<S>, timeout: Duration) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &Config, session: Arc<S>) -> Result<Self, FeedError> {
        Self::new(&config.api_url, session, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/posts{}", self.base_url, path)
    }

    fn token(&self) -> Result<String, FeedError> {
        self.session.token().ok_or(FeedError::Unauthenticated)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FeedError> {
        let token = self.token()?;
        let response = self
            .http
            .get(self.api_url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        handle_response(response).await
    }
}

#[async_trait]
impl<S> PostQueryService for HttpPostService<S>
where
    S: SessionProvider,
{
    async fn list_posts(&self, request: &PostListRequest) -> Result<PostPage, FeedError> {
        let params = list_params(request);
        let body: ListPostsResponse = self.get_json("/", &params).await?;

        Ok(PostPage {
            posts: body.posts,
            pagination: body.pagination,
        })
    }

    async fn categories(&self) -> Result<Vec<Category>, FeedError> {
        let body: CategoriesResponse = self.get_json("/categories", &[]).await?;
        Ok(body.categories)
    }

    async fn popular_tags(&self) -> Result<Vec<PopularTag>, FeedError> {
        let body: PopularTagsResponse = self.get_json("/popular-tags", &[]).await?;
        Ok(body.popular_tags)
    }

    async fn stats(&self) -> Result<PostStats, FeedError> {
        let body: StatsResponse = self.get_json("/stats", &[]).await?;
        Ok(body.stats)
    }
}

#[async_trait]
impl<S> PostMutationService for HttpPostService<S>
where
    S: SessionProvider,
{
    async fn like(&self, id: PostId) -> Result<u64, FeedError> {
        let token = self.token()?;
        let response = self
            .http
            .post(self.api_url(&format!("/{}/like", id)))
            .bearer_auth(token)
            .send()
            .await?;

        let body: LikeResponse = handle_response(response).await?;
        Ok(body.likes_count)
    }

    async fn delete(&self, id: PostId) -> Result<(), FeedError> {
        let token = self.token()?;
        let response = self
            .http
            .delete(self.api_url(&format!("/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;

        handle_empty_response(response).await
    }
}

/// Flatten a list request into query parameters. Unset filters are omitted.
pub(crate) fn list_params(request: &PostListRequest) -> Vec<(&'static str, String)> {
    let QueryState {
        search,
        category,
        tags,
        visibility,
        sort_by,
        sort_order,
        author,
    } = &request.query;

    let mut params = vec![
        ("page", request.page.to_string()),
        ("per_page", request.per_page.to_string()),
    ];

    if let Some(author) = author {
        params.push(("user_id", author.to_string()));
    }
    let search = search.trim();
    if !search.is_empty() {
        params.push(("search", search.to_string()));
    }
    if let Some(category) = category {
        params.push(("category", category.clone()));
    }
    if !tags.is_empty() {
        params.push(("tags", tags.iter().cloned().collect::<Vec<_>>().join(",")));
    }
    params.push(("visibility", visibility.as_str().to_string()));
    params.push(("sort_by", sort_by.as_str().to_string()));
    params.push(("sort_order", sort_order.as_str().to_string()));

    params
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FeedError> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| FeedError::Deserialization(e.to_string()))
    } else {
        Err(error_for_status(status, response).await)
    }
}

async fn handle_empty_response(response: reqwest::Response) -> Result<(), FeedError> {
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        Err(error_for_status(status, response).await)
    }
}

async fn error_for_status(status: StatusCode, response: reqwest::Response) -> FeedError {
    match status {
        StatusCode::UNAUTHORIZED => FeedError::Unauthenticated,
        StatusCode::TOO_MANY_REQUESTS => FeedError::RateLimited,
        _ => {
            let body = response.text().await.unwrap_or_default();
            classify_error(status, &body)
        }
    }
}

/// JWT rejections (malformed, bad signature) come back as 422 with a `msg`
/// body; anything else is an ordinary API error.
fn classify_error(status: StatusCode, body: &str) -> FeedError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Some(ErrorBody { msg: Some(msg), .. }) = &parsed {
            tracing::debug!("Token rejected: {}", msg);
            return FeedError::Unauthenticated;
        }
    }

    FeedError::Api {
        status: status.as_u16(),
        message: error_message(parsed, body),
    }
}

/// The backend reports failures as `{"error": ...}` or `{"message": ...}`;
/// the JWT layer uses `{"msg": ...}`
fn error_message(parsed: Option<ErrorBody>, body: &str) -> String {
    parsed
        .and_then(|body| body.error.or(body.message).or(body.msg))
        .unwrap_or_else(|| body.trim().to_string())
}

// --- Response Types ---

#[derive(Debug, Deserialize)]
struct ListPostsResponse {
    posts: Vec<Post>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct PopularTagsResponse {
    popular_tags: Vec<PopularTag>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    stats: PostStats,
}

#[derive(Debug, Deserialize)]
struct LikeResponse {
    likes_count: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}
