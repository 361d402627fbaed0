use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column names of the `data_disabilitas` sheet, in export order.
pub const RECORD_COLUMNS: [&str; 5] = [
    "nama",
    "jenis_disabilitas",
    "desa_kelurahan",
    "kecamatan",
    "kab_kota",
];

/// Column names of the `users` sheet.
pub const CREDENTIAL_COLUMNS: [&str; 3] = ["username", "password", "role"];

/// One census row: a single person with a disability and where they live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub nama: String,
    pub jenis_disabilitas: String,
    pub desa_kelurahan: String,
    pub kecamatan: String,
    pub kab_kota: String,
}

impl Record {
    pub fn new(
        nama: impl Into<String>,
        jenis_disabilitas: impl Into<String>,
        desa_kelurahan: impl Into<String>,
        kecamatan: impl Into<String>,
        kab_kota: impl Into<String>,
    ) -> Self {
        Record {
            nama: nama.into(),
            jenis_disabilitas: jenis_disabilitas.into(),
            desa_kelurahan: desa_kelurahan.into(),
            kecamatan: kecamatan.into(),
            kab_kota: kab_kota.into(),
        }
    }

    /// Field values in the same order as [`RECORD_COLUMNS`].
    pub fn values(&self) -> [&str; 5] {
        [
            &self.nama,
            &self.jenis_disabilitas,
            &self.desa_kelurahan,
            &self.kecamatan,
            &self.kab_kota,
        ]
    }
}

/// Access tier read from the `role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including export
    Admin,
    /// View and export
    Operator,
    /// View only
    Viewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role may download the filtered workbook.
    pub fn can_export(self) -> bool {
        matches!(self, Role::Admin | Role::Operator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "operator" => Ok(Role::Operator),
            "viewer" => Ok(Role::Viewer),
            _ => Err(DashboardError::InvalidRole(s.to_string())),
        }
    }
}

/// A row of the `users` sheet.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,

    /// Plaintext password, or an Argon2 PHC string starting with `$argon2`
    pub password: String,

    pub role: Role,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Credential {
            username: username.into(),
            password: password.into(),
            role,
        }
    }
}

// Keep passwords out of log output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" operator ".parse::<Role>().unwrap(), Role::Operator);
        assert_eq!("VIEWER".parse::<Role>().unwrap(), Role::Viewer);
        assert!(matches!(
            "guest".parse::<Role>(),
            Err(DashboardError::InvalidRole(r)) if r == "guest"
        ));
    }

    #[test]
    fn only_admin_and_operator_export() {
        assert!(Role::Admin.can_export());
        assert!(Role::Operator.can_export());
        assert!(!Role::Viewer.can_export());
    }

    #[test]
    fn credential_debug_hides_password() {
        let cred = Credential::new("admin1", "secret", Role::Admin);
        let printed = format!("{:?}", cred);
        assert!(printed.contains("admin1"));
        assert!(!printed.contains("secret"));
    }
}
