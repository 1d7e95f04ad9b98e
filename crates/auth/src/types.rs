//! Role type shared by the token claims and the user records

use serde::{Deserialize, Serialize};

/// Account role governing authorization decisions.
///
/// Every authorization point matches exhaustively on this enum, so adding
/// a role forces each check to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Patient,
    Doctor,
    Staff,
}

impl Role {
    /// Roles allowed to upload, modify, and delete patient files
    pub fn can_upload_files(&self) -> bool {
        match self {
            Role::Admin | Role::Doctor => true,
            Role::Patient | Role::Staff => false,
        }
    }

    /// Roles allowed to list, edit, and delete other users' accounts
    pub fn can_manage_users(&self) -> bool {
        match self {
            Role::Admin => true,
            Role::Patient | Role::Doctor | Role::Staff => false,
        }
    }

    /// Clinic-side roles; everyone else only sees records they own
    pub fn is_clinical_staff(&self) -> bool {
        match self {
            Role::Admin | Role::Doctor | Role::Staff => true,
            Role::Patient => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Patient => "PATIENT",
            Role::Doctor => "DOCTOR",
            Role::Staff => "STAFF",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
