//! Per-method parameter records and validated operations
//!
//! Each method has a params record deserialized from the request bag. The
//! records are lenient: every field is optional, and `null` or an empty
//! string counts as absent. Validation then turns a record into an
//! [`Operation`], which only exists when every required field is present.
//! The backend is only ever invoked with an `Operation`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use wprpc_core::{Error, Result};

/// Status given to new posts when the request names none
pub const DEFAULT_STATUS: &str = "draft";
/// Page size used when `perPage` is absent, zero or empty
pub const DEFAULT_PER_PAGE: u32 = 10;
/// Page number used when `page` is absent, zero or empty
pub const DEFAULT_PAGE: u32 = 1;

/// Message for a `create_post` call without title or content
pub const MISSING_TITLE_OR_CONTENT: &str = "Title and content are required for creating a post";
/// Message for an `update_post` call without a post id
pub const MISSING_POST_ID: &str = "Post ID is required for updating a post";

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

/// A paging number given as a JSON number or a numeric string
///
/// `null`, zero and the empty string count as absent. Negative, fractional
/// and non-numeric values are rejected.
fn page_number<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(
            n.as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| D::Error::custom(format!("invalid page number: {}", n)))?,
        ),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(
            s.trim()
                .parse::<u32>()
                .map_err(|_| D::Error::custom(format!("invalid page number: {:?}", s)))?,
        ),
        Some(other) => {
            return Err(D::Error::custom(format!("invalid page number: {}", other)));
        }
    };
    Ok(number.filter(|n| *n > 0))
}

fn present_id<'de, D>(deserializer: D) -> std::result::Result<Option<PostId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PostId>::deserialize(deserializer)?.filter(|id| !id.is_empty()))
}

/// Identifier of an existing post, given as a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Number(u64),
    Text(String),
}

impl PostId {
    /// Zero and the empty string do not identify a post
    pub fn is_empty(&self) -> bool {
        match self {
            PostId::Number(n) => *n == 0,
            PostId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Number(n) => write!(f, "{}", n),
            PostId::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

impl From<u64> for PostId {
    fn from(n: u64) -> Self {
        PostId::Number(n)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        PostId::Text(s.to_string())
    }
}

/// Params of `create_post`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePostParams {
    #[serde(default, deserialize_with = "non_empty")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub status: Option<String>,
}

impl CreatePostParams {
    /// Require title and content, defaulting the status
    pub fn into_operation(self) -> Result<Operation> {
        match (self.title, self.content) {
            (Some(title), Some(content)) => Ok(Operation::CreatePost(NewPost {
                title,
                content,
                status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            })),
            _ => Err(Error::Validation(MISSING_TITLE_OR_CONTENT.to_string())),
        }
    }
}

/// Params of `get_posts`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPostsParams {
    #[serde(default, deserialize_with = "page_number")]
    pub per_page: Option<u32>,
    #[serde(default, deserialize_with = "page_number")]
    pub page: Option<u32>,
}

impl GetPostsParams {
    /// Fill in paging defaults; listing has no required fields
    pub fn into_operation(self) -> Result<Operation> {
        Ok(Operation::GetPosts(PostQuery {
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            page: self.page.unwrap_or(DEFAULT_PAGE),
        }))
    }
}

/// Params of `update_post`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostParams {
    #[serde(default, deserialize_with = "present_id")]
    pub post_id: Option<PostId>,
    #[serde(default, deserialize_with = "non_empty")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub status: Option<String>,
}

impl UpdatePostParams {
    /// Require the post id; the changes carry only the fields given
    pub fn into_operation(self) -> Result<Operation> {
        let post_id = self
            .post_id
            .ok_or_else(|| Error::Validation(MISSING_POST_ID.to_string()))?;

        Ok(Operation::UpdatePost(PostUpdate {
            post_id,
            changes: PostChanges {
                title: self.title,
                content: self.content,
                status: self.status,
            },
        }))
    }
}

/// Body of a create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: String,
}

/// Paging of a list call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostQuery {
    pub per_page: u32,
    pub page: u32,
}

/// Fields to change on an existing post; absent fields are left out of the body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Target and body of an update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpdate {
    pub post_id: PostId,
    pub changes: PostChanges,
}

/// A validated backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreatePost(NewPost),
    GetPosts(PostQuery),
    UpdatePost(PostUpdate),
}

impl Operation {
    /// The JSON-RPC method this operation serves
    pub fn method(&self) -> &'static str {
        match self {
            Operation::CreatePost(_) => crate::CREATE_POST,
            Operation::GetPosts(_) => crate::GET_POSTS,
            Operation::UpdatePost(_) => crate::UPDATE_POST,
        }
    }
}
