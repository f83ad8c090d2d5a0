//! Ownership and access policy
//!
//! Every handler asks this module before touching a resource. The requester
//! is passed in explicitly; nothing here reads request state.
//!
//! Rules, evaluated in order:
//!
//! 1. An anonymous requester is denied any read.
//! 2. An anonymous requester is denied any write.
//! 3. Groups cannot be created, changed or deleted through the API.
//! 4. Authenticated reads are allowed.
//! 5. Authenticated creation is allowed; the requester becomes the owner.
//! 6. Update and delete are allowed only to the owner.

use auth::{User, UserId};

use crate::{
    error::ApiError,
    models::{Comment, Post},
};

/// The identity behind a request
#[derive(Debug, Clone, PartialEq)]
pub enum Requester {
    Anonymous,
    Authenticated(User),
}

impl Requester {
    pub fn user(&self) -> Option<&User> {
        match self {
            Requester::Anonymous => None,
            Requester::Authenticated(user) => Some(user),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Post,
    Group,
    Comment,
    Follow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// List and retrieve never change state
    pub fn is_safe(self) -> bool {
        matches!(self, Operation::List | Operation::Retrieve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    DenyUnauthenticated,
    DenyForbidden,
}

/// Entities whose mutation is restricted to a single user
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

impl Owned for Post {
    fn owner_id(&self) -> UserId {
        self.author_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> UserId {
        self.author_id
    }
}

/// Decide whether `requester` may perform `operation` on a resource of
/// `kind` owned by `owner`.
///
/// `owner` is only consulted for update and delete; an unowned target
/// cannot be mutated by anyone.
pub fn evaluate(
    requester: &Requester,
    kind: ResourceKind,
    operation: Operation,
    owner: Option<UserId>,
) -> Decision {
    let Some(user) = requester.user() else {
        return Decision::DenyUnauthenticated;
    };

    if kind == ResourceKind::Group && !operation.is_safe() {
        return Decision::DenyForbidden;
    }

    match operation {
        Operation::List | Operation::Retrieve | Operation::Create => Decision::Allow,
        Operation::Update | Operation::Delete => match owner {
            Some(owner) if owner == user.id => Decision::Allow,
            _ => Decision::DenyForbidden,
        },
    }
}

/// Turn a decision into a handler result. On success the authenticated user
/// is returned; for creation it is the identity to record as owner.
pub fn authorize(
    requester: &Requester,
    kind: ResourceKind,
    operation: Operation,
    owner: Option<UserId>,
) -> Result<&User, ApiError> {
    match evaluate(requester, kind, operation, owner) {
        Decision::Allow => requester.user().ok_or_else(ApiError::not_authenticated),
        Decision::DenyUnauthenticated => Err(ApiError::not_authenticated()),
        Decision::DenyForbidden => Err(ApiError::Forbidden(
            forbidden_message(kind, operation).to_string(),
        )),
    }
}

/// The authenticated user, or the same 401 rules 1 and 2 produce.
///
/// Item mutations call this before loading the target so an anonymous
/// requester never learns whether the target exists.
pub fn authenticated(requester: &Requester) -> Result<&User, ApiError> {
    requester.user().ok_or_else(ApiError::not_authenticated)
}

/// Ownership check for update and delete once the target is loaded
pub fn authorize_owner<'r>(
    requester: &'r Requester,
    kind: ResourceKind,
    operation: Operation,
    target: &impl Owned,
) -> Result<&'r User, ApiError> {
    authorize(requester, kind, operation, Some(target.owner_id()))
}

fn forbidden_message(kind: ResourceKind, operation: Operation) -> &'static str {
    match (kind, operation) {
        (ResourceKind::Post, Operation::Update) => "Editing another user's post is forbidden.",
        (ResourceKind::Post, Operation::Delete) => "Deleting another user's post is forbidden.",
        (ResourceKind::Comment, Operation::Update) => {
            "Editing another user's comment is forbidden."
        }
        (ResourceKind::Comment, Operation::Delete) => {
            "Deleting another user's comment is forbidden."
        }
        _ => "You do not have permission to perform this action.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const ALL_KINDS: [ResourceKind; 4] = [
        ResourceKind::Post,
        ResourceKind::Group,
        ResourceKind::Comment,
        ResourceKind::Follow,
    ];

    const ALL_OPERATIONS: [Operation; 5] = [
        Operation::List,
        Operation::Retrieve,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    fn requester(id: UserId) -> Requester {
        Requester::Authenticated(User {
            id,
            username: format!("user{}", id),
            password_hash: String::new(),
            created_at: Utc::now(),
        })
    }

    #[test]
    fn test_anonymous_is_always_unauthenticated() {
        for kind in ALL_KINDS {
            for operation in ALL_OPERATIONS {
                for owner in [None, Some(1)] {
                    assert_eq!(
                        evaluate(&Requester::Anonymous, kind, operation, owner),
                        Decision::DenyUnauthenticated,
                        "{:?} {:?}",
                        kind,
                        operation
                    );
                }
            }
        }
    }

    #[test]
    fn test_authenticated_reads_and_creates_are_allowed() {
        let alice = requester(1);
        for kind in [ResourceKind::Post, ResourceKind::Comment, ResourceKind::Follow] {
            for operation in [Operation::List, Operation::Retrieve, Operation::Create] {
                assert_eq!(evaluate(&alice, kind, operation, None), Decision::Allow);
            }
        }
        assert_eq!(
            evaluate(&alice, ResourceKind::Group, Operation::List, None),
            Decision::Allow
        );
        assert_eq!(
            evaluate(&alice, ResourceKind::Group, Operation::Retrieve, None),
            Decision::Allow
        );
    }

    #[test]
    fn test_only_owner_may_mutate() {
        let alice = requester(1);
        for kind in [ResourceKind::Post, ResourceKind::Comment] {
            for operation in [Operation::Update, Operation::Delete] {
                assert_eq!(evaluate(&alice, kind, operation, Some(1)), Decision::Allow);
                assert_eq!(
                    evaluate(&alice, kind, operation, Some(2)),
                    Decision::DenyForbidden
                );
                assert_eq!(
                    evaluate(&alice, kind, operation, None),
                    Decision::DenyForbidden
                );
            }
        }
    }

    #[test]
    fn test_groups_are_read_only_for_everyone() {
        let alice = requester(1);
        for operation in [Operation::Create, Operation::Update, Operation::Delete] {
            assert_eq!(
                evaluate(&alice, ResourceKind::Group, operation, Some(1)),
                Decision::DenyForbidden
            );
        }
    }

    #[test]
    fn test_authorize_returns_the_requesting_user() {
        let alice = requester(1);
        let user = authorize(&alice, ResourceKind::Post, Operation::Create, None).unwrap();
        assert_eq!(user.id, 1);

        assert!(matches!(
            authorize(&Requester::Anonymous, ResourceKind::Post, Operation::Create, None),
            Err(ApiError::Unauthenticated(_))
        ));
        assert!(matches!(
            authorize(&alice, ResourceKind::Post, Operation::Delete, Some(2)),
            Err(ApiError::Forbidden(msg)) if msg == "Deleting another user's post is forbidden."
        ));
    }

    #[test]
    fn test_authorize_owner_uses_the_owner_field() {
        let post = Post {
            id: 10,
            text: "text".to_string(),
            pub_date: Utc::now(),
            author_id: 2,
            author: "user2".to_string(),
            image: None,
            group_id: None,
        };

        assert!(authorize_owner(&requester(2), ResourceKind::Post, Operation::Update, &post).is_ok());
        assert!(matches!(
            authorize_owner(&requester(1), ResourceKind::Post, Operation::Update, &post),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            authenticated(&Requester::Anonymous),
            Err(ApiError::Unauthenticated(_))
        ));
    }
}
