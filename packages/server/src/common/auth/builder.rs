use super::{AuthError, Capability};
use crate::common::entity_ids::MemberId;
use crate::kernel::BaseDirectory;

/// Entry point for authorization checks
pub struct Actor {
    actor_id: MemberId,
}

impl Actor {
    pub fn new(actor_id: MemberId) -> Self {
        Self { actor_id }
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor_id: self.actor_id,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor_id: MemberId,
    capability: Capability,
}

impl CapabilityBuilder {
    /// Perform the authorization check
    pub async fn check(self, directory: &dyn BaseDirectory) -> Result<(), AuthError> {
        match self.capability {
            Capability::JoinStudentQueue(organization_id) => {
                let approval = directory.student_approval(self.actor_id).await?;
                let approved = approval
                    .as_ref()
                    .is_some_and(|a| a.is_approved_for(organization_id));
                if !approved {
                    return Err(AuthError::PermissionDenied(
                        "not an approved student of this organization".to_string(),
                    ));
                }
                Ok(())
            }
            Capability::ParticipateIn {
                student_id,
                enrollee_id,
            } => {
                if self.actor_id != student_id && self.actor_id != enrollee_id {
                    return Err(AuthError::PermissionDenied(
                        "not a party to this dialog".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}
