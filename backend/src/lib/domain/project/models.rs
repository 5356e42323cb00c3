use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::domain::account::models::AccountId;
use crate::domain::authorization::models::PermissionLevel;
use crate::domain::project::errors::ProjectIdError;
use crate::domain::project::errors::VisibilityError;

/// Project unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Generate a new random project ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a project ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, ProjectIdError> {
        Uuid::parse_str(s)
            .map(ProjectId)
            .map_err(|e| ProjectIdError::InvalidFormat(e.to_string()))
    }

    /// Get a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectVisibility {
    Public,
    Private,
}

impl ProjectVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectVisibility::Public => "public",
            ProjectVisibility::Private => "private",
        }
    }
}

impl FromStr for ProjectVisibility {
    type Err = VisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(ProjectVisibility::Public),
            "private" => Ok(ProjectVisibility::Private),
            other => Err(VisibilityError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for ProjectVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project aggregate entity.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub creator: AccountId,
    pub label: String,
    pub description: String,
    pub visibility: ProjectVisibility,
}

/// Command to create a new project.
#[derive(Debug)]
pub struct NewProject {
    pub label: String,
    pub description: String,
    pub visibility: ProjectVisibility,
}

/// Command to add one sample to a project.
#[derive(Debug, Clone)]
pub struct NewSample {
    pub label: String,
}

/// A project together with the caller's permission on it.
#[derive(Debug, Clone)]
pub struct ProjectWithPermission {
    pub project: Project,
    pub permission: PermissionLevel,
}
