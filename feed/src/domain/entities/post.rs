//! Post domain entity
//!
//! A post is one item of the feed. Posts are created by the server and only
//! ever reach the client through list responses; the client mutates them in
//! exactly two ways (bumping the like counter, dropping the post on delete).

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unique identifier for a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user account on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of media attached to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Gif,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Gif => write!(f, "gif"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "gif" => Ok(MediaKind::Gif),
            _ => Err(format!("Unknown media type: {}", s)),
        }
    }
}

/// Media reference attached to a post. The URL is relative to the API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: String,
    pub kind: MediaKind,
}

/// Author summary embedded in a post. The client never owns the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl AuthorSummary {
    /// "First Last" when both are known, otherwise the username
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{} {}", first, last)
            }
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PostRecord", into = "PostRecord")]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub author: Option<AuthorSummary>,
    pub title: Option<String>,
    pub content: String,
    pub media: Option<Media>,
    pub tags: BTreeSet<String>,
    pub is_published: bool,
    pub is_featured: bool,
    pub likes_count: u64,
    pub comments_count: u64,
    pub shares_count: u64,
    pub views_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Apply an optimistic like
    pub fn bump_likes(&mut self) {
        self.likes_count = self.likes_count.saturating_add(1);
    }

    pub fn author_name(&self) -> String {
        self.author
            .as_ref()
            .map(AuthorSummary::display_name)
            .unwrap_or_else(|| "Unknown User".to_string())
    }
}

/// Flat wire representation used by the posts API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostRecord {
    id: PostId,
    user_id: UserId,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(default = "default_true")]
    is_published: bool,
    #[serde(default)]
    is_featured: bool,
    #[serde(default)]
    likes_count: u64,
    #[serde(default)]
    comments_count: u64,
    #[serde(default)]
    shares_count: u64,
    #[serde(default)]
    views_count: u64,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "user")]
    author: Option<AuthorSummary>,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        // Media without a URL is meaningless; an unknown type is shown as an image
        let media = record.media_url.filter(|url| !url.is_empty()).map(|url| Media {
            url,
            kind: record
                .media_type
                .as_deref()
                .and_then(|t| t.parse().ok())
                .unwrap_or(MediaKind::Image),
        });

        Self {
            id: record.id,
            user_id: record.user_id,
            author: record.author,
            title: record.title,
            content: record.content,
            media,
            tags: record.tags.into_iter().collect(),
            is_published: record.is_published,
            is_featured: record.is_featured,
            likes_count: record.likes_count,
            comments_count: record.comments_count,
            shares_count: record.shares_count,
            views_count: record.views_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<Post> for PostRecord {
    fn from(post: Post) -> Self {
        let (media_url, media_type) = match post.media {
            Some(media) => (Some(media.url), Some(media.kind.to_string())),
            None => (None, None),
        };

        Self {
            id: post.id,
            user_id: post.user_id,
            content: post.content,
            title: post.title,
            media_url,
            media_type,
            tags: post.tags.into_iter().collect(),
            is_published: post.is_published,
            is_featured: post.is_featured,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            shares_count: post.shares_count,
            views_count: post.views_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author: post.author,
        }
    }
}

fn default_true() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO-8601 timestamps. The backend emits naive datetimes (no offset) which
/// are UTC; RFC 3339 strings with an offset are accepted too.
pub(crate) mod timestamp {
    use super::*;

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
                None => Ok(None),
            }
        }
    }
}
