//! Domain entities as stored by the resource repositories

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;

pub use comment::{Comment, CommentChanges, CommentId, NewComment};
pub use follow::Follow;
pub use group::{Group, GroupId, NewGroup};
pub use post::{NewPost, Post, PostChanges, PostId};
