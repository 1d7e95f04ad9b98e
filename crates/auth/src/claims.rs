//! JWT claims types

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Identity claim set carried by every issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Contact identifier (mobile number)
    pub contact: String,
    pub role: Role,
    /// Issuer
    pub iss: String,
    /// Issued at
    pub iat: u64,
    /// Expires at
    pub exp: u64,
}
