//! Mock implementations of port traits
//!
//! `MockPostService` serves posts from an in-memory dataset (or from scripted
//! pages), records every request, and can hold list requests until the test
//! releases them, which lets tests choose the order responses arrive in.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use tokio::sync::{oneshot, Notify};

use crate::domain::entities::{
    Category, Identity, Pagination, PopularTag, Post, PostId, PostListRequest, PostPage,
    PostStats, Visibility,
};
use crate::domain::ports::{PostMutationService, PostQueryService, SessionProvider};
use crate::error::FeedError;

/// Failure a mock should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Unauthenticated,
    Server,
    RateLimited,
}

impl MockFailure {
    fn to_error(self) -> FeedError {
        match self {
            MockFailure::Unauthenticated => FeedError::Unauthenticated,
            MockFailure::Server => FeedError::Api {
                status: 500,
                message: "Internal server error".to_string(),
            },
            MockFailure::RateLimited => FeedError::RateLimited,
        }
    }
}

// ============================================================================
// Mock Post Service
// ============================================================================

#[derive(Default)]
pub struct MockPostService {
    posts: RwLock<Vec<Post>>,
    scripted: Mutex<VecDeque<PostPage>>,
    list_failures: Mutex<VecDeque<MockFailure>>,
    mutation_failure: Mutex<Option<MockFailure>>,
    requests: Mutex<Vec<PostListRequest>>,
    likes: Mutex<Vec<PostId>>,
    deletes: Mutex<Vec<PostId>>,
    holding: AtomicBool,
    gates: Mutex<HashMap<usize, oneshot::Sender<()>>>,
    request_seen: Notify,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockPostService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve list requests by filtering and paginating these posts
    pub fn with_posts(posts: Vec<Post>) -> Self {
        let service = Self::default();
        *service.posts.write().unwrap() = posts;
        service
    }

    /// Queue a canned page; queued pages are served before the dataset
    pub fn push_page(&self, page: PostPage) {
        self.scripted.lock().unwrap().push_back(page);
    }

    /// Make the next list request fail
    pub fn fail_next_list(&self, failure: MockFailure) {
        self.list_failures.lock().unwrap().push_back(failure);
    }

    /// Make every like/delete fail
    pub fn fail_mutations(&self, failure: MockFailure) {
        *self.mutation_failure.lock().unwrap() = Some(failure);
    }

    /// From now on, list requests wait until `release` is called
    pub fn hold_lists(&self) {
        self.holding.store(true, Ordering::SeqCst);
    }

    /// Let the list request with this index (0-based, in call order) respond
    pub fn release(&self, index: usize) {
        if let Some(gate) = self.gates.lock().unwrap().remove(&index) {
            let _ = gate.send(());
        }
    }

    /// Wait until at least `count` list requests have been received
    pub async fn wait_for_requests(&self, count: usize) {
        loop {
            let notified = self.request_seen.notified();
            if self.request_count() >= count {
                return;
            }
            notified.await;
        }
    }

    pub fn requests(&self) -> Vec<PostListRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn likes(&self) -> Vec<PostId> {
        self.likes.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<PostId> {
        self.deletes.lock().unwrap().clone()
    }

    fn respond(&self, request: &PostListRequest) -> Result<PostPage, FeedError> {
        if let Some(failure) = self.list_failures.lock().unwrap().pop_front() {
            return Err(failure.to_error());
        }
        if let Some(mut page) = self.scripted.lock().unwrap().pop_front() {
            page.pagination.page = request.page;
            return Ok(page);
        }

        let query = &request.query;
        let search = query.search.trim().to_lowercase();
        let matching: Vec<Post> = self
            .posts
            .read()
            .unwrap()
            .iter()
            .filter(|p| {
                search.is_empty()
                    || p.content.to_lowercase().contains(&search)
                    || p.title
                        .as_deref()
                        .map(|t| t.to_lowercase().contains(&search))
                        .unwrap_or(false)
            })
            .filter(|p| query.category.as_ref().map_or(true, |c| p.tags.contains(c)))
            .filter(|p| query.tags.is_empty() || query.tags.iter().any(|t| p.tags.contains(t)))
            .filter(|p| query.visibility != Visibility::Featured || p.is_featured)
            .filter(|p| query.author.map_or(true, |a| p.user_id == a))
            .cloned()
            .collect();

        let per_page = request.per_page.max(1) as usize;
        let total = matching.len();
        let pages = total.div_ceil(per_page) as u32;
        let start = (request.page.saturating_sub(1) as usize) * per_page;
        let posts = matching.into_iter().skip(start).take(per_page).collect();

        Ok(PostPage {
            posts,
            pagination: Pagination {
                page: request.page,
                per_page: request.per_page,
                total: total as u64,
                pages,
                has_next: request.page < pages,
                has_prev: request.page > 1,
            },
        })
    }

    fn mutation_result(&self) -> Result<(), FeedError> {
        match *self.mutation_failure.lock().unwrap() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostQueryService for MockPostService {
    async fn list_posts(&self, request: &PostListRequest) -> Result<PostPage, FeedError> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let response = self.respond(request);
        let gate = {
            let mut requests = self.requests.lock().unwrap();
            let index = requests.len();
            requests.push(request.clone());

            if self.holding.load(Ordering::SeqCst) {
                let (tx, rx) = oneshot::channel();
                self.gates.lock().unwrap().insert(index, tx);
                Some(rx)
            } else {
                None
            }
        };
        self.request_seen.notify_waiters();

        if let Some(rx) = gate {
            let _ = rx.await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }

    async fn categories(&self) -> Result<Vec<Category>, FeedError> {
        Ok(Vec::new())
    }

    async fn popular_tags(&self) -> Result<Vec<PopularTag>, FeedError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for post in self.posts.read().unwrap().iter() {
            for tag in &post.tags {
                *counts.entry(tag.clone()).or_default() += 1;
            }
        }

        let mut tags: Vec<PopularTag> = counts
            .into_iter()
            .map(|(tag, count)| PopularTag {
                slug: tag.to_lowercase(),
                tag,
                count,
            })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(tags)
    }

    async fn stats(&self) -> Result<PostStats, FeedError> {
        let posts = self.posts.read().unwrap();
        Ok(PostStats {
            total_posts: posts.len() as u64,
            featured_posts: posts.iter().filter(|p| p.is_featured).count() as u64,
            recent_posts: posts.len() as u64,
            total_likes: posts.iter().map(|p| p.likes_count).sum(),
            total_views: posts.iter().map(|p| p.views_count).sum(),
        })
    }
}

#[async_trait]
impl PostMutationService for MockPostService {
    async fn like(&self, id: PostId) -> Result<u64, FeedError> {
        self.likes.lock().unwrap().push(id);
        self.mutation_result()?;

        let mut posts = self.posts.write().unwrap();
        match posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.likes_count += 1;
                Ok(post.likes_count)
            }
            None => Ok(1),
        }
    }

    async fn delete(&self, id: PostId) -> Result<(), FeedError> {
        self.deletes.lock().unwrap().push(id);
        self.mutation_result()?;

        self.posts.write().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}

// ============================================================================
// Mock Session
// ============================================================================

#[derive(Default)]
pub struct MockSession {
    token: Option<String>,
    identity: Option<Identity>,
    unauthenticated_calls: AtomicUsize,
}

impl MockSession {
    pub fn signed_in() -> Self {
        Self {
            token: Some("test-token".to_string()),
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn unauthenticated_calls(&self) -> usize {
        self.unauthenticated_calls.load(Ordering::SeqCst)
    }
}

impl SessionProvider for MockSession {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn cached_identity(&self) -> Option<Identity> {
        self.identity.clone()
    }

    fn unauthenticated(&self) {
        self.unauthenticated_calls.fetch_add(1, Ordering::SeqCst);
    }
}
