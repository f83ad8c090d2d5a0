//! Wire representation of each entity
//!
//! Every entity declares its field allowlist and read-only subset as a
//! [`FieldSet`] constant. Outbound records expose exactly the declared
//! fields; inbound drafts read only the writable ones, so owner and parent
//! fields can never be set by a client.

use auth::User;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    error::ValidationErrors,
    models::{Comment, CommentId, Follow, Group, GroupId, Post, PostId},
};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";

/// Declared fields of an entity and which of them clients cannot write
#[derive(Debug, Clone, Copy)]
pub struct FieldSet {
    pub fields: &'static [&'static str],
    pub read_only: &'static [&'static str],
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn contains(list: &[&str], name: &str) -> bool {
    let mut i = 0;
    while i < list.len() {
        if str_eq(list[i], name) {
            return true;
        }
        i += 1;
    }
    false
}

impl FieldSet {
    /// Panics (at compile time when used in a `const`) if a field is declared
    /// twice or a read-only name is not a declared field.
    pub const fn new(fields: &'static [&'static str], read_only: &'static [&'static str]) -> Self {
        let mut i = 0;
        while i < fields.len() {
            let mut j = i + 1;
            while j < fields.len() {
                if str_eq(fields[i], fields[j]) {
                    panic!("field declared twice");
                }
                j += 1;
            }
            i += 1;
        }

        let mut k = 0;
        while k < read_only.len() {
            if !contains(fields, read_only[k]) {
                panic!("read-only field is not a declared field");
            }
            k += 1;
        }

        Self { fields, read_only }
    }

    pub fn is_writable(&self, name: &str) -> bool {
        contains(self.fields, name) && !contains(self.read_only, name)
    }

    pub fn writable(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .copied()
            .filter(|name| !contains(self.read_only, name))
    }
}

pub const POST_FIELDS: FieldSet = FieldSet::new(
    &["id", "text", "pub_date", "author", "image", "group"],
    &["id", "pub_date", "author"],
);

pub const GROUP_FIELDS: FieldSet = FieldSet::new(
    &["id", "title", "slug", "description"],
    &["id", "title", "slug", "description"],
);

pub const COMMENT_FIELDS: FieldSet = FieldSet::new(
    &["id", "author", "post", "text", "created"],
    &["id", "author", "post", "created"],
);

pub const FOLLOW_FIELDS: FieldSet = FieldSet::new(&["user", "following"], &["user"]);

pub const TOKEN_FIELDS: FieldSet =
    FieldSet::new(&["username", "password", "token"], &["token"]);

/// Whether missing required fields are errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// POST and PUT
    Full,
    /// PATCH
    Partial,
}

// ---------------------------------------------------------------------------
// Outbound records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PostRecord {
    pub id: PostId,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub image: Option<String>,
    pub group: Option<GroupId>,
}

impl From<Post> for PostRecord {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author: post.author,
            image: post.image,
            group: post.group_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<Group> for GroupRecord {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentRecord {
    pub id: CommentId,
    pub author: String,
    pub post: PostId,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl From<Comment> for CommentRecord {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author: comment.author,
            post: comment.post_id,
            text: comment.text,
            created: comment.created,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowRecord {
    pub user: String,
    pub following: String,
}

impl From<Follow> for FollowRecord {
    fn from(follow: Follow) -> Self {
        Self {
            user: follow.user,
            following: follow.following,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenRecord {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Inbound drafts
// ---------------------------------------------------------------------------

/// Reads writable fields out of a request body and collects field errors
struct Reader<'a> {
    body: &'a Map<String, Value>,
    fields: FieldSet,
    mode: Mode,
    errors: ValidationErrors,
}

impl<'a> Reader<'a> {
    fn new(body: &'a Map<String, Value>, fields: FieldSet, mode: Mode) -> Self {
        Self {
            body,
            fields,
            mode,
            errors: ValidationErrors::new(),
        }
    }

    fn get(&mut self, name: &str, required: bool) -> Option<&'a Value> {
        debug_assert!(self.fields.is_writable(name), "`{}` is not writable", name);

        let value = self.body.get(name);
        if value.is_none() && required && self.mode == Mode::Full {
            self.errors.add(name, REQUIRED);
        }
        value
    }

    /// Text field; numbers are accepted and stringified, surrounding
    /// whitespace is trimmed unless `trim` is false.
    fn text(&mut self, name: &str, required: bool, trim: bool) -> Option<String> {
        let value = self.get(name, required)?;

        let raw = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Null => {
                self.errors.add(name, NULL);
                return None;
            }
            _ => {
                self.errors.add(name, NOT_A_STRING);
                return None;
            }
        };

        let text = if trim { raw.trim().to_string() } else { raw };
        if text.is_empty() {
            self.errors.add(name, BLANK);
            return None;
        }

        Some(text)
    }

    /// Optional, nullable text; blank clears the value
    fn nullable_text(&mut self, name: &str) -> Option<Option<String>> {
        let raw = match self.get(name, false)? {
            Value::Null => return Some(None),
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.errors.add(name, NOT_A_STRING);
                return None;
            }
        };

        Some(Some(raw).filter(|s| !s.is_empty()))
    }

    /// Optional, nullable primary-key reference
    fn nullable_pk(&mut self, name: &str) -> Option<Option<i64>> {
        let value = self.get(name, false)?;

        let parsed = match value {
            Value::Null => return Some(None),
            Value::String(s) if s.is_empty() => return Some(None),
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        };

        match parsed {
            Some(pk) => Some(Some(pk)),
            None => {
                self.errors.add(
                    name,
                    format!(
                        "Incorrect type. Expected pk value, received {}.",
                        type_name(value)
                    ),
                );
                None
            }
        }
    }

    fn finish<T>(self, draft: T) -> Result<T, ValidationErrors> {
        self.errors.into_result(draft)
    }
}

/// Type name as reported in validation messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Client-writable post fields. `None` means the field was not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub text: Option<String>,
    pub image: Option<Option<String>>,
    pub group: Option<Option<GroupId>>,
}

impl PostDraft {
    pub fn from_wire(body: &Map<String, Value>, mode: Mode) -> Result<Self, ValidationErrors> {
        let mut reader = Reader::new(body, POST_FIELDS, mode);
        let draft = Self {
            text: reader.text("text", true, true),
            image: reader.nullable_text("image"),
            group: reader.nullable_pk("group"),
        };
        reader.finish(draft)
    }

    /// The referenced group, if the draft sets one
    pub fn group_id(&self) -> Option<GroupId> {
        self.group.flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentDraft {
    pub text: Option<String>,
}

impl CommentDraft {
    pub fn from_wire(body: &Map<String, Value>, mode: Mode) -> Result<Self, ValidationErrors> {
        let mut reader = Reader::new(body, COMMENT_FIELDS, mode);
        let draft = Self {
            text: reader.text("text", true, true),
        };
        reader.finish(draft)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowDraft {
    /// Username of the author to follow
    pub following: String,
}

impl FollowDraft {
    pub fn from_wire(body: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut reader = Reader::new(body, FOLLOW_FIELDS, Mode::Full);
        let following = reader.text("following", true, false);
        match following {
            Some(following) => reader.finish(Self { following }),
            None => Err(reader.errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginDraft {
    pub username: String,
    pub password: String,
}

impl LoginDraft {
    pub fn from_wire(body: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut reader = Reader::new(body, TOKEN_FIELDS, Mode::Full);
        let username = reader.text("username", true, true);
        let password = reader.text("password", true, false);
        match (username, password) {
            (Some(username), Some(password)) => reader.finish(Self { username, password }),
            _ => Err(reader.errors),
        }
    }
}

pub const SELF_FOLLOW: &str = "You cannot follow yourself.";
pub const DUPLICATE_FOLLOW: &str = "You are already following this author.";

pub fn unknown_username(username: &str) -> String {
    format!("Object with username={} does not exist.", username)
}

pub fn unknown_pk(pk: i64) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", pk)
}

/// Object-level follow rules: no self-follow, no duplicate edge
pub fn validate_follow(
    user: &User,
    following: &User,
    already_following: bool,
) -> Result<(), ValidationErrors> {
    if user.id == following.id {
        return Err(ValidationErrors::single("following", SELF_FOLLOW));
    }
    if already_following {
        return Err(ValidationErrors::non_field(DUPLICATE_FOLLOW));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn keys<T: Serialize>(record: &T) -> Vec<String> {
        let mut keys: Vec<String> = serde_json::to_value(record)
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn sorted(fields: FieldSet) -> Vec<String> {
        let mut names: Vec<String> = fields.fields.iter().map(|s| s.to_string()).collect();
        names.sort();
        names
    }

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_records_expose_exactly_the_declared_fields() {
        let post = PostRecord {
            id: 1,
            text: "text".into(),
            pub_date: Utc::now(),
            author: "leo".into(),
            image: None,
            group: None,
        };
        assert_eq!(keys(&post), sorted(POST_FIELDS));

        let group = GroupRecord {
            id: 1,
            title: "t".into(),
            slug: "s".into(),
            description: String::new(),
        };
        assert_eq!(keys(&group), sorted(GROUP_FIELDS));

        let comment = CommentRecord {
            id: 1,
            author: "leo".into(),
            post: 3,
            text: "c".into(),
            created: Utc::now(),
        };
        assert_eq!(keys(&comment), sorted(COMMENT_FIELDS));

        let follow = FollowRecord {
            user: "a".into(),
            following: "b".into(),
        };
        assert_eq!(keys(&follow), sorted(FOLLOW_FIELDS));
    }

    #[test]
    fn test_writable_fields() {
        assert_eq!(
            POST_FIELDS.writable().collect::<Vec<_>>(),
            vec!["text", "image", "group"]
        );
        assert_eq!(COMMENT_FIELDS.writable().collect::<Vec<_>>(), vec!["text"]);
        assert_eq!(FOLLOW_FIELDS.writable().collect::<Vec<_>>(), vec!["following"]);
        assert_eq!(GROUP_FIELDS.writable().count(), 0);
        assert!(!POST_FIELDS.is_writable("author"));
        assert!(!POST_FIELDS.is_writable("unknown"));
    }

    #[test]
    fn test_post_draft_requires_text() {
        let errors = PostDraft::from_wire(&Map::new(), Mode::Full).unwrap_err();
        assert_eq!(errors.field("text"), Some(&[REQUIRED.to_string()][..]));

        let partial = PostDraft::from_wire(&Map::new(), Mode::Partial).unwrap();
        assert_eq!(partial, PostDraft::default());
    }

    #[test]
    fn test_post_draft_ignores_read_only_and_unknown_fields() {
        let draft = PostDraft::from_wire(
            &body(json!({
                "text": "  hello  ",
                "author": 99,
                "id": 5,
                "pub_date": "2000-01-01T00:00:00Z",
                "likes": 3,
            })),
            Mode::Full,
        )
        .unwrap();

        assert_eq!(draft.text.as_deref(), Some("hello"));
        assert_eq!(draft.image, None);
        assert_eq!(draft.group, None);
    }

    #[test]
    fn test_post_draft_rejects_malformed_values() {
        let errors = PostDraft::from_wire(
            &body(json!({ "text": {}, "group": "abc" })),
            Mode::Partial,
        )
        .unwrap_err();
        assert_eq!(errors.field("text"), Some(&[NOT_A_STRING.to_string()][..]));
        assert_eq!(
            errors.field("group"),
            Some(&["Incorrect type. Expected pk value, received str.".to_string()][..])
        );

        let errors =
            PostDraft::from_wire(&body(json!({ "text": "   " })), Mode::Full).unwrap_err();
        assert_eq!(errors.field("text"), Some(&[BLANK.to_string()][..]));

        let errors =
            PostDraft::from_wire(&body(json!({ "text": null })), Mode::Full).unwrap_err();
        assert_eq!(errors.field("text"), Some(&[NULL.to_string()][..]));
    }

    #[test]
    fn test_post_draft_group_and_image() {
        let draft = PostDraft::from_wire(
            &body(json!({ "text": "t", "group": "7", "image": "posts/cat.jpg" })),
            Mode::Full,
        )
        .unwrap();
        assert_eq!(draft.group, Some(Some(7)));
        assert_eq!(draft.group_id(), Some(7));
        assert_eq!(draft.image, Some(Some("posts/cat.jpg".to_string())));

        let cleared =
            PostDraft::from_wire(&body(json!({ "group": null, "image": "" })), Mode::Partial)
                .unwrap();
        assert_eq!(cleared.group, Some(None));
        assert_eq!(cleared.image, Some(None));
    }

    #[test]
    fn test_post_draft_image_coerces_like_text() {
        let draft = PostDraft::from_wire(
            &body(json!({ "text": 12, "image": 34 })),
            Mode::Full,
        )
        .unwrap();
        assert_eq!(draft.text.as_deref(), Some("12"));
        assert_eq!(draft.image, Some(Some("34".to_string())));

        let errors =
            PostDraft::from_wire(&body(json!({ "text": "t", "image": [1] })), Mode::Full)
                .unwrap_err();
        assert_eq!(errors.field("image"), Some(&[NOT_A_STRING.to_string()][..]));
    }

    #[test]
    fn test_comment_draft_ignores_post_and_author() {
        let draft = CommentDraft::from_wire(
            &body(json!({ "text": "nice", "post": 42, "author": "someone" })),
            Mode::Full,
        )
        .unwrap();
        assert_eq!(draft.text.as_deref(), Some("nice"));
    }

    #[test]
    fn test_follow_draft() {
        let draft = FollowDraft::from_wire(&body(json!({ "following": "bob", "user": "eve" })))
            .unwrap();
        assert_eq!(draft.following, "bob");

        let errors = FollowDraft::from_wire(&Map::new()).unwrap_err();
        assert_eq!(errors.field("following"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_login_draft_reports_every_missing_field() {
        let errors = LoginDraft::from_wire(&Map::new()).unwrap_err();
        assert!(errors.field("username").is_some());
        assert!(errors.field("password").is_some());

        let draft =
            LoginDraft::from_wire(&body(json!({ "username": "leo", "password": " pw " })))
                .unwrap();
        assert_eq!(draft.password, " pw ");
    }

    #[test]
    fn test_validate_follow() {
        let (alice, bob) = (user(1), user(2));

        assert!(validate_follow(&alice, &bob, false).is_ok());

        let errors = validate_follow(&alice, &alice, false).unwrap_err();
        assert_eq!(errors.field("following"), Some(&[SELF_FOLLOW.to_string()][..]));

        let errors = validate_follow(&alice, &bob, true).unwrap_err();
        assert_eq!(
            errors.field(crate::error::NON_FIELD_ERRORS),
            Some(&[DUPLICATE_FOLLOW.to_string()][..])
        );
    }
}
