/// Authorization checks for the chatting surfaces.
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, Capability};
///
/// Actor::new(user.member_id)
///     .can(Capability::JoinStudentQueue(organization_id))
///     .check(state.deps.directory.as_ref())
///     .await?;
/// ```
///
/// Checks run in the HTTP layer before any queue or dialog state is touched;
/// the core services never check identity themselves.

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::Capability;
pub use errors::AuthError;
