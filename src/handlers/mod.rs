// Request handlers, grouped per resource. Every mutating operation goes
// through a policy check before any storage write.
pub mod auth;
pub mod comments;
pub mod reviews;
pub mod taxonomy;
pub mod titles;
pub mod users;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::policy::{self, Action, Actor, ResourceKind};

/// Kind-level guard: 401 for anonymous actors, 403 for authenticated ones
/// without sufficient role.
pub(crate) fn require(
    auth: &Option<AuthUser>,
    action: Action,
    kind: ResourceKind,
) -> Result<Option<Actor>, ApiError> {
    let actor = auth.as_ref().map(AuthUser::actor);
    if policy::can_perform(actor.as_ref(), action, kind) {
        Ok(actor)
    } else if actor.is_none() {
        Err(ApiError::unauthorized("Authentication required"))
    } else {
        Err(ApiError::forbidden("Insufficient permissions"))
    }
}

/// Object-level guard for reviews and comments.
pub(crate) fn require_object(actor: Option<&Actor>, author_id: uuid::Uuid) -> Result<(), ApiError> {
    if policy::can_modify_object(actor, author_id) {
        Ok(())
    } else if actor.is_none() {
        Err(ApiError::unauthorized("Authentication required"))
    } else {
        Err(ApiError::forbidden("Only the author, a moderator or an admin may do this"))
    }
}

/// The authenticated actor, or 401.
pub(crate) fn require_authenticated(auth: &Option<AuthUser>) -> Result<Actor, ApiError> {
    auth.as_ref()
        .map(AuthUser::actor)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}
