use serde::Deserialize;

use crate::{DomainError, KeywordTable};

pub const SUPPORTED_PROFILE_VERSION: u32 = 1;

const BUILTIN_PROFILE: &str = include_str!("../site.toml");

/// Versioned configuration for everything that classifies or orders site content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteProfile {
    pub version: u32,
    pub intake: KeywordTable,
    pub gallery: KeywordTable,
    pub upload: UploadPolicy,
    pub navigation: NavigationOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadPolicy {
    pub projects: Vec<String>,
}

impl UploadPolicy {
    pub fn accepts(&self, project: &str) -> bool {
        self.projects.iter().any(|known| known == project)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationOrder {
    pub order: Vec<String>,
}

impl SiteProfile {
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_toml_str(BUILTIN_PROFILE)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, DomainError> {
        let profile: SiteProfile =
            toml::from_str(raw).map_err(|error| DomainError::MalformedProfile(error.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.version != SUPPORTED_PROFILE_VERSION {
            return Err(DomainError::UnsupportedProfileVersion(self.version));
        }
        self.intake.validate("intake")?;
        self.gallery.validate("gallery")?;
        Ok(())
    }
}
