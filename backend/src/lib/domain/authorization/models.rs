use std::fmt;
use std::str::FromStr;

use super::errors::PermissionLevelError;

/// Per-project permission tier.
///
/// Ordered by convention (read < read_write < admin < owner) but always
/// compared by membership in an explicit allowed set, never by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    Read,
    ReadWrite,
    Admin,
    Owner,
}

impl PermissionLevel {
    /// Stable storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Read => "read",
            PermissionLevel::ReadWrite => "read_write",
            PermissionLevel::Admin => "admin",
            PermissionLevel::Owner => "owner",
        }
    }

    /// Every level; usable as the allowed set for read-only access.
    pub fn all() -> [PermissionLevel; 4] {
        [
            PermissionLevel::Read,
            PermissionLevel::ReadWrite,
            PermissionLevel::Admin,
            PermissionLevel::Owner,
        ]
    }
}

impl FromStr for PermissionLevel {
    type Err = PermissionLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(PermissionLevel::Read),
            "read_write" => Ok(PermissionLevel::ReadWrite),
            "admin" => Ok(PermissionLevel::Admin),
            "owner" => Ok(PermissionLevel::Owner),
            other => Err(PermissionLevelError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_roundtrip() {
        for level in PermissionLevel::all() {
            assert_eq!(level.as_str().parse::<PermissionLevel>().unwrap(), level);
        }
        assert!("write".parse::<PermissionLevel>().is_err());
    }
}
