//! Feed synchronizer
//!
//! Owns the ordered post list for the current query and keeps it consistent
//! with the server while applying likes and deletes optimistically.
//!
//! Rules the implementation maintains:
//! - every reset bumps a generation counter; a response tagged with an older
//!   generation is discarded on arrival
//! - at most one next-page fetch is in flight; extra calls are dropped
//! - merged pages never introduce a duplicate id and never bring back a post
//!   deleted locally since the last reset
//! - failed likes and deletes are not rolled back (the server state may
//!   diverge until the next reset)
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`; every transition republishes a `FeedSnapshot` on a watch channel.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use super::debounce::Debouncer;
use crate::config::Config;
use crate::domain::entities::{
    Category, PageState, PopularTag, Post, PostId, PostListRequest, PostPage, PostStats,
    QueryPatch, QueryState,
};
use crate::domain::ports::{PostMutationService, PostQueryService, SessionProvider};
use crate::error::FeedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub page_size: u32,
    /// Quiet window for search-term changes
    pub search_debounce: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SyncOptions {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            search_debounce: config.search_debounce,
        }
    }
}

/// Read-only view of the feed handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedSnapshot {
    pub items: Vec<Post>,
    pub loading: bool,
    pub loading_more: bool,
    pub has_more: bool,
    pub error: Option<String>,
    /// The session was rejected; the caller should route to login
    pub unauthenticated: bool,
    pub query: QueryState,
    pub total: Option<u64>,
}

/// What a load request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was merged into the feed
    Loaded { appended: usize },
    /// Nothing to do: no more pages, a fetch already in flight, or the
    /// query did not change
    Skipped,
    /// The response belonged to a superseded query and was dropped
    Stale,
    /// A search change is waiting for the debounce window
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Reset,
    NextPage,
}

/// A fetch tagged with the generation it was issued under
#[derive(Debug, Clone)]
struct FetchTicket {
    generation: u64,
    kind: FetchKind,
    request: PostListRequest,
}

struct FeedState {
    query: QueryState,
    page: PageState,
    items: Vec<Post>,
    ids: HashSet<PostId>,
    /// Deleted locally since the last reset; filtered out of every merge
    suppressed: HashSet<PostId>,
    generation: u64,
    unauthenticated: bool,
    pending_search: Option<String>,
}

impl FeedState {
    fn new() -> Self {
        Self {
            query: QueryState::default(),
            page: PageState::default(),
            items: Vec::new(),
            ids: HashSet::new(),
            suppressed: HashSet::new(),
            generation: 0,
            unauthenticated: false,
            pending_search: None,
        }
    }

    fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: self.items.clone(),
            loading: self.page.loading,
            loading_more: self.page.loading_more,
            has_more: self.page.has_more,
            error: self.page.error.clone(),
            unauthenticated: self.unauthenticated,
            query: self.query.clone(),
            total: self.page.total,
        }
    }

    /// Start over at page 1 under a new generation. Pages from before the
    /// reset are dropped as stale, so the deleted-id filter starts empty too.
    fn reset(&mut self, page_size: u32) -> FetchTicket {
        self.generation += 1;
        self.items.clear();
        self.ids.clear();
        self.suppressed.clear();
        self.page = PageState {
            loading: true,
            ..PageState::default()
        };

        FetchTicket {
            generation: self.generation,
            kind: FetchKind::Reset,
            request: PostListRequest {
                page: 1,
                per_page: page_size,
                query: self.query.clone(),
            },
        }
    }

    /// Append posts in server order, skipping known and deleted ids
    fn merge(&mut self, posts: Vec<Post>) -> usize {
        let mut appended = 0;
        for post in posts {
            if self.suppressed.contains(&post.id) || !self.ids.insert(post.id) {
                continue;
            }
            self.items.push(post);
            appended += 1;
        }
        appended
    }

    fn record_error(&mut self, err: &FeedError) {
        if err.is_unauthenticated() {
            self.unauthenticated = true;
        } else {
            self.page.error = Some(err.user_message());
        }
    }
}

struct Shared<Q, M, S> {
    queries: Arc<Q>,
    mutations: Arc<M>,
    session: Arc<S>,
    options: SyncOptions,
    state: Mutex<FeedState>,
    snapshots: watch::Sender<FeedSnapshot>,
    search_debounce: Debouncer,
}

/// Cheaply cloneable handle; clones share the same feed
pub struct FeedSynchronizer<Q, M, S> {
    shared: Arc<Shared<Q, M, S>>,
}

impl<Q, M, S> Clone for FeedSynchronizer<Q, M, S> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<Q, M, S> FeedSynchronizer<Q, M, S>
where
    Q: PostQueryService + 'static,
    M: PostMutationService + 'static,
    S: SessionProvider + 'static,
{
    pub fn new(queries: Arc<Q>, mutations: Arc<M>, session: Arc<S>, options: SyncOptions) -> Self {
        let state = FeedState::new();
        let (snapshots, _) = watch::channel(state.snapshot());

        Self {
            shared: Arc::new(Shared {
                queries,
                mutations,
                session,
                search_debounce: Debouncer::new(options.search_debounce),
                options,
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.state().snapshot()
    }

    /// Receive a fresh snapshot after every state transition
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn query(&self) -> QueryState {
        self.state().query.clone()
    }

    pub fn page_state(&self) -> PageState {
        self.state().page.clone()
    }

    /// Merge a query change and reload from page 1.
    ///
    /// A patch that only touches the search term is debounced and returns
    /// `Scheduled`; the reset happens when the quiet window elapses. Any
    /// other patch applies immediately, taking a pending search term with it.
    pub async fn set_query(&self, patch: QueryPatch) -> Result<LoadOutcome, FeedError> {
        if patch.is_search_only() {
            self.schedule_search(patch.search.unwrap_or_default());
            return Ok(LoadOutcome::Scheduled);
        }

        self.shared.search_debounce.cancel();
        let ticket = {
            let mut state = self.state();
            let mut patch = patch;
            if let Some(pending) = state.pending_search.take() {
                patch.search.get_or_insert(pending);
            }
            if !state.query.apply(patch) {
                tracing::debug!("Query unchanged, keeping current feed");
                return Ok(LoadOutcome::Skipped);
            }
            let ticket = state.reset(self.shared.options.page_size);
            self.publish(&state);
            ticket
        };

        self.fetch(ticket).await
    }

    /// Debounced search-term change
    pub async fn set_search(&self, term: impl Into<String>) -> Result<LoadOutcome, FeedError> {
        self.set_query(QueryPatch::search(term)).await
    }

    /// Restore the default query and reload, even if it was already default
    pub async fn clear_filters(&self) -> Result<LoadOutcome, FeedError> {
        self.shared.search_debounce.cancel();
        let ticket = {
            let mut state = self.state();
            state.pending_search = None;
            state.query = QueryState::default();
            let ticket = state.reset(self.shared.options.page_size);
            self.publish(&state);
            ticket
        };

        self.fetch(ticket).await
    }

    /// Reload page 1 for the current query
    pub async fn refresh(&self) -> Result<LoadOutcome, FeedError> {
        let ticket = {
            let mut state = self.state();
            let ticket = state.reset(self.shared.options.page_size);
            self.publish(&state);
            ticket
        };

        self.fetch(ticket).await
    }

    /// Fetch and append the page at the cursor. Dropped (`Skipped`) when
    /// there are no more pages or any fetch is already in flight.
    pub async fn load_next_page(&self) -> Result<LoadOutcome, FeedError> {
        let ticket = {
            let mut state = self.state();
            if !state.page.has_more || state.page.is_fetching() {
                tracing::debug!(
                    "Skipping next page (has_more={}, loading={}, loading_more={})",
                    state.page.has_more,
                    state.page.loading,
                    state.page.loading_more
                );
                return Ok(LoadOutcome::Skipped);
            }

            state.page.loading_more = true;
            state.page.error = None;
            let ticket = FetchTicket {
                generation: state.generation,
                kind: FetchKind::NextPage,
                request: PostListRequest {
                    page: state.page.cursor,
                    per_page: self.shared.options.page_size,
                    query: state.query.clone(),
                },
            };
            self.publish(&state);
            ticket
        };

        self.fetch(ticket).await
    }

    /// Optimistically add one like, then tell the server. A failed request
    /// leaves the local count bumped.
    pub async fn like_item(&self, id: PostId) -> Result<(), FeedError> {
        let found = {
            let mut state = self.state();
            match state.items.iter_mut().find(|post| post.id == id) {
                Some(post) => {
                    post.bump_likes();
                    self.publish(&state);
                    true
                }
                None => false,
            }
        };
        if !found {
            tracing::debug!("Like ignored, post {} not in feed", id);
            return Ok(());
        }

        match self.shared.mutations.like(id).await {
            Ok(likes_count) => {
                tracing::debug!("Post {} liked, server count {}", id, likes_count);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to like post {}: {}", id, e);
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Optimistically remove a post, then tell the server. A failed request
    /// does not restore the post.
    pub async fn delete_item(&self, id: PostId) -> Result<(), FeedError> {
        let removed = {
            let mut state = self.state();
            match state.items.iter().position(|post| post.id == id) {
                Some(index) => {
                    state.items.remove(index);
                    state.ids.remove(&id);
                    state.suppressed.insert(id);
                    self.publish(&state);
                    true
                }
                None => false,
            }
        };
        if !removed {
            tracing::debug!("Delete ignored, post {} not in feed", id);
            return Ok(());
        }

        match self.shared.mutations.delete(id).await {
            Ok(()) => {
                tracing::debug!("Post {} deleted", id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to delete post {}: {}", id, e);
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Whether the signed-in user wrote this post
    pub fn can_delete(&self, post: &Post) -> bool {
        self.shared
            .session
            .cached_identity()
            .map(|identity| identity.is_author_of(post))
            .unwrap_or(false)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, FeedError> {
        let result = self.shared.queries.categories().await;
        self.observe_auth(result)
    }

    pub async fn popular_tags(&self) -> Result<Vec<PopularTag>, FeedError> {
        let result = self.shared.queries.popular_tags().await;
        self.observe_auth(result)
    }

    pub async fn stats(&self) -> Result<PostStats, FeedError> {
        let result = self.shared.queries.stats().await;
        self.observe_auth(result)
    }

    /// Drop a search term still waiting for its debounce window
    pub fn cancel_pending_search(&self) {
        self.shared.search_debounce.cancel();
        self.state().pending_search = None;
    }

    fn schedule_search(&self, term: String) {
        self.state().pending_search = Some(term);

        let weak: Weak<Shared<Q, M, S>> = Arc::downgrade(&self.shared);
        self.shared.search_debounce.call(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let sync = FeedSynchronizer { shared };
            tokio::spawn(async move {
                if let Err(e) = sync.apply_pending_search().await {
                    tracing::debug!("Debounced search failed: {}", e);
                }
            });
        });
    }

    async fn apply_pending_search(&self) -> Result<LoadOutcome, FeedError> {
        let ticket = {
            let mut state = self.state();
            let Some(term) = state.pending_search.take() else {
                return Ok(LoadOutcome::Skipped);
            };
            if !state.query.apply(QueryPatch::search(term)) {
                return Ok(LoadOutcome::Skipped);
            }
            let ticket = state.reset(self.shared.options.page_size);
            self.publish(&state);
            ticket
        };

        self.fetch(ticket).await
    }

    async fn fetch(&self, ticket: FetchTicket) -> Result<LoadOutcome, FeedError> {
        tracing::debug!(
            "Fetching page {} (generation {}, {:?})",
            ticket.request.page,
            ticket.generation,
            ticket.kind
        );
        let result = self.shared.queries.list_posts(&ticket.request).await;
        self.apply_page(ticket, result)
    }

    fn apply_page(
        &self,
        ticket: FetchTicket,
        result: Result<PostPage, FeedError>,
    ) -> Result<LoadOutcome, FeedError> {
        let outcome = {
            let mut state = self.state();
            if state.generation != ticket.generation {
                tracing::debug!(
                    "Discarding stale page {} (generation {}, current {})",
                    ticket.request.page,
                    ticket.generation,
                    state.generation
                );
                return Ok(LoadOutcome::Stale);
            }

            match ticket.kind {
                FetchKind::Reset => state.page.loading = false,
                FetchKind::NextPage => state.page.loading_more = false,
            }

            let outcome = match result {
                Ok(page) => {
                    let appended = state.merge(page.posts);
                    state.page.cursor = ticket.request.page + 1;
                    state.page.has_more = page.pagination.has_next;
                    state.page.total = Some(page.pagination.total);
                    state.page.pages = Some(page.pagination.pages);
                    state.page.error = None;
                    state.unauthenticated = false;
                    tracing::debug!(
                        "Merged page {}: {} new posts, has_more={}",
                        ticket.request.page,
                        appended,
                        state.page.has_more
                    );
                    Ok(LoadOutcome::Loaded { appended })
                }
                Err(e) => {
                    tracing::warn!("Failed to load page {}: {}", ticket.request.page, e);
                    state.record_error(&e);
                    Err(e)
                }
            };
            self.publish(&state);
            outcome
        };

        if matches!(&outcome, Err(e) if e.is_unauthenticated()) {
            self.signal_unauthenticated();
        }
        outcome
    }

    fn record_failure(&self, err: &FeedError) {
        {
            let mut state = self.state();
            state.record_error(err);
            self.publish(&state);
        }
        if err.is_unauthenticated() {
            self.signal_unauthenticated();
        }
    }

    fn observe_auth<T>(&self, result: Result<T, FeedError>) -> Result<T, FeedError> {
        if let Err(e) = &result {
            if e.is_unauthenticated() {
                self.record_failure(e);
            }
        }
        result
    }

    fn signal_unauthenticated(&self) {
        tracing::info!("Session rejected, signalling unauthenticated");
        self.shared.session.unauthenticated();
    }

    fn publish(&self, state: &FeedState) {
        self.shared.snapshots.send_replace(state.snapshot());
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
