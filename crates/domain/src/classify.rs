use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// A keyword and the label it maps to. Matching is substring containment
/// against the lowercased name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub label: String,
}

/// Ordered keyword table. Entry order is match priority for projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub default_project: String,
    pub default_tags: Vec<String>,
    #[serde(default)]
    pub projects: Vec<KeywordRule>,
    #[serde(default)]
    pub tags: Vec<KeywordRule>,
    #[serde(default)]
    pub display_names: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub project: String,
    pub tags: Vec<String>,
}

impl KeywordTable {
    pub(crate) fn validate(&self, table: &'static str) -> Result<(), DomainError> {
        if self.default_project.trim().is_empty() || self.default_tags.is_empty() {
            return Err(DomainError::MissingDefault(table));
        }
        for rule in self.projects.iter().chain(self.tags.iter()) {
            if rule.keyword.trim().is_empty() {
                return Err(DomainError::EmptyKeyword {
                    table,
                    label: rule.label.clone(),
                });
            }
        }
        Ok(())
    }

    /// Human-readable project name, falling back to the title-cased tag.
    pub fn display_name(&self, project: &str) -> String {
        self.display_names
            .get(project)
            .cloned()
            .unwrap_or_else(|| crate::gallery::title_case(project))
    }
}

pub fn classify_project(table: &KeywordTable, name: &str) -> String {
    let lowered = name.to_lowercase();
    table
        .projects
        .iter()
        .find(|rule| lowered.contains(&rule.keyword.to_lowercase()))
        .map(|rule| rule.label.clone())
        .unwrap_or_else(|| table.default_project.clone())
}

pub fn classify_tags(table: &KeywordTable, name: &str) -> Vec<String> {
    let lowered = name.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for rule in &table.tags {
        if lowered.contains(&rule.keyword.to_lowercase()) && !tags.contains(&rule.label) {
            tags.push(rule.label.clone());
        }
    }

    if tags.is_empty() {
        return table.default_tags.clone();
    }
    tags
}

pub fn classify(table: &KeywordTable, name: &str) -> ClassificationResult {
    ClassificationResult {
        project: classify_project(table, name),
        tags: classify_tags(table, name),
    }
}
