//! Role-based access rules for every resource kind.
//!
//! Pure predicates: the actor is passed explicitly into every call and no
//! storage is consulted. `None` means an anonymous request. Anything
//! ambiguous denies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed role set stored on the user record. Wire names match the stored
/// values ("user", "moderator", "admin").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Title,
    Category,
    Genre,
    Review,
    Comment,
    UserProfile,
}

/// The identity making a request, as carried by a validated token.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub is_superuser: bool,
}

impl Actor {
    /// Derived, not stored: admin role or the orthogonal superuser flag.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}

/// Kind-level rule: may `actor` perform `action` on resources of `kind`?
///
/// Reads on public kinds are decided before authentication is even
/// considered, so anonymous reads succeed. Object-level ownership on
/// reviews and comments is checked separately via [`can_modify_object`].
pub fn can_perform(actor: Option<&Actor>, action: Action, kind: ResourceKind) -> bool {
    match (kind, action) {
        // Taxonomy and titles: world-readable, admin-writable
        (ResourceKind::Title | ResourceKind::Category | ResourceKind::Genre, Action::Read) => true,
        (ResourceKind::Title | ResourceKind::Category | ResourceKind::Genre, _) => {
            actor.is_some_and(Actor::is_admin)
        }

        // Reviews and comments: world-readable, any authenticated user may
        // create; update/delete gated per-object on authorship or rank
        (ResourceKind::Review | ResourceKind::Comment, Action::Read) => true,
        (ResourceKind::Review | ResourceKind::Comment, Action::Create) => actor.is_some(),
        (ResourceKind::Review | ResourceKind::Comment, _) => actor.is_some(),

        // Arbitrary user profiles are admin-only in every direction; the
        // /users/me path bypasses this with its own self rule
        (ResourceKind::UserProfile, _) => actor.is_some_and(Actor::is_admin),
    }
}

/// Object-level rule for reviews and comments: the author, a moderator, or
/// an admin may update/delete.
pub fn can_modify_object(actor: Option<&Actor>, author_id: Uuid) -> bool {
    match actor {
        Some(actor) => actor.id == author_id || actor.is_moderator() || actor.is_admin(),
        None => false,
    }
}
