//! Typed ID definitions for the admissions entities.

use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Organization entities (universities, faculties).
pub struct Organization;

/// Marker type for Member entities (every user account).
pub struct Member;

/// Marker type for Dialog entities.
pub struct Dialog;

/// Marker type for Message entities.
pub struct Message;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type OrganizationId = Id<Organization>;

pub type MemberId = Id<Member>;

pub type DialogId = Id<Dialog>;

pub type MessageId = Id<Message>;
