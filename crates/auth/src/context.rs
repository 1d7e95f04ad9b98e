//! Authentication context type

use uuid::Uuid;

use crate::claims::IdentityClaims;
use crate::error::AuthError;
use crate::types::Role;

/// Identity of the caller, derived from a validated token.
/// Handlers never read identity from request bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub contact: String,
    pub role: Role,
}

impl AuthContext {
    pub(crate) fn from_claims(claims: IdentityClaims) -> Result<Self, AuthError> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            user_id,
            contact: claims.contact,
            role: claims.role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role.can_manage_users()
    }

    /// Whether the caller may read records belonging to `patient_id`
    pub fn can_access_patient(&self, patient_id: Uuid) -> bool {
        self.role.is_clinical_staff() || self.user_id == patient_id
    }

    /// Whether the caller may modify the account `user_id`
    pub fn can_act_on_user(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.role.can_manage_users()
    }
}
