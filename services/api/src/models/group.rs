//! Group entity

use serde::Deserialize;
use sqlx::FromRow;

pub type GroupId = i64;

/// A thematic group posts may belong to
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Administrative group creation payload; never reachable from the public API
#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}
