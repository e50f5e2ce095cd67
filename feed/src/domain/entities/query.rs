//! Feed query configuration
//!
//! `QueryState` is the full filter/sort configuration applied to the feed.
//! Callers never mutate it directly; they submit a `QueryPatch` and the
//! synchronizer merges it and resets the feed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::UserId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    All,
    Featured,
    Recent,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::All => "all",
            Visibility::Featured => "featured",
            Visibility::Recent => "recent",
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Visibility::All),
            "featured" => Ok(Visibility::Featured),
            "recent" => Ok(Visibility::Recent),
            _ => Err(format!("Unknown visibility: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    LikesCount,
    ViewsCount,
    CommentsCount,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
            SortKey::LikesCount => "likes_count",
            SortKey::ViewsCount => "views_count",
            SortKey::CommentsCount => "comments_count",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created_at" => Ok(SortKey::CreatedAt),
            "updated_at" => Ok(SortKey::UpdatedAt),
            "likes_count" => Ok(SortKey::LikesCount),
            "views_count" => Ok(SortKey::ViewsCount),
            "comments_count" => Ok(SortKey::CommentsCount),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// Active filter and sort configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub search: String,
    pub category: Option<String>,
    /// Matched server-side; the client only sends the set
    pub tags: BTreeSet<String>,
    pub visibility: Visibility,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    /// Restrict to one author's posts
    pub author: Option<UserId>,
}

impl QueryState {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Merge a patch. Returns true if anything actually changed.
    pub fn apply(&mut self, patch: QueryPatch) -> bool {
        let before = self.clone();

        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(category) = patch.category {
            self.category = category.filter(|c| !c.is_empty());
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(visibility) = patch.visibility {
            self.visibility = visibility;
        }
        if let Some(sort_by) = patch.sort_by {
            self.sort_by = sort_by;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }

        *self != before
    }
}

/// Partial update to a `QueryState`. `None` leaves a field untouched;
/// the nested options on `category` and `author` clear the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub search: Option<String>,
    pub category: Option<Option<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub visibility: Option<Visibility>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
    pub author: Option<Option<UserId>>,
}

impl QueryPatch {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(Some(category.into())),
            ..Default::default()
        }
    }

    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: Some(tags.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn visibility(visibility: Visibility) -> Self {
        Self {
            visibility: Some(visibility),
            ..Default::default()
        }
    }

    pub fn sort(sort_by: SortKey, sort_order: SortOrder) -> Self {
        Self {
            sort_by: Some(sort_by),
            sort_order: Some(sort_order),
            ..Default::default()
        }
    }

    pub fn author(author: Option<UserId>) -> Self {
        Self {
            author: Some(author),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Only the free-text term changes. Such patches are debounced.
    pub fn is_search_only(&self) -> bool {
        self.search.is_some()
            && Self {
                search: None,
                ..self.clone()
            }
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = QueryState::default();
        assert_eq!(state.visibility, Visibility::All);
        assert_eq!(state.sort_by, SortKey::CreatedAt);
        assert_eq!(state.sort_order, SortOrder::Descending);
        assert!(state.is_default());
    }

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut state = QueryState {
            search: "drift".to_string(),
            ..Default::default()
        };
        assert!(state.apply(QueryPatch::category("cars")));
        assert_eq!(state.search, "drift");
        assert_eq!(state.category.as_deref(), Some("cars"));
    }

    #[test]
    fn test_apply_reports_no_change() {
        let mut state = QueryState::default();
        assert!(!state.apply(QueryPatch::visibility(Visibility::All)));
    }

    #[test]
    fn test_empty_category_clears_filter() {
        let mut state = QueryState::default();
        state.apply(QueryPatch::category("cars"));
        state.apply(QueryPatch::category(""));
        assert!(state.category.is_none());
    }

    #[test]
    fn test_search_only_detection() {
        assert!(QueryPatch::search("abc").is_search_only());
        assert!(!QueryPatch::category("cars").is_search_only());

        let mixed = QueryPatch {
            search: Some("abc".to_string()),
            visibility: Some(Visibility::Featured),
            ..Default::default()
        };
        assert!(!mixed.is_search_only());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("likes_count".parse::<SortKey>(), Ok(SortKey::LikesCount));
        assert_eq!("ASC".parse::<SortOrder>(), Ok(SortOrder::Ascending));
        assert_eq!("featured".parse::<Visibility>(), Ok(Visibility::Featured));
        assert!("popular".parse::<SortKey>().is_err());
    }
}
