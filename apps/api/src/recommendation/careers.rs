use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Built-in career table, compiled into the binary.
const EMBEDDED_CAREERS: &str = include_str!("../../data/careers.json");

#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("failed to read career table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid career table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("career table is empty")]
    Empty,

    #[error("career ids must be contiguous from 0; expected {expected}, found {found}")]
    NonContiguousIds { expected: usize, found: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerProfile {
    pub id: usize,
    pub name: String,
    pub salary: String,
    pub growth: String,
    pub required_skills: Vec<String>,
    /// Academic year (1–4) → topics to focus on that year.
    pub roadmap: BTreeMap<i64, Vec<String>>,
}

impl CareerProfile {
    /// Topics for the given year; empty when the year has no entry.
    pub fn roadmap_for(&self, year: i64) -> &[String] {
        self.roadmap.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Read-only career table indexed by classifier class id.
#[derive(Debug, Clone)]
pub struct CareerKnowledgeBase {
    profiles: Vec<CareerProfile>,
}

impl CareerKnowledgeBase {
    pub fn embedded() -> Result<Self, KnowledgeBaseError> {
        Self::from_json(EMBEDDED_CAREERS)
    }

    pub fn from_path(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let raw = std::fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let kb = Self::from_json(&raw)?;
        info!("Loaded {} career profiles from {}", kb.len(), path.display());
        Ok(kb)
    }

    pub fn from_json(raw: &str) -> Result<Self, KnowledgeBaseError> {
        let profiles: Vec<CareerProfile> = serde_json::from_str(raw)?;
        Self::new(profiles)
    }

    pub fn new(mut profiles: Vec<CareerProfile>) -> Result<Self, KnowledgeBaseError> {
        if profiles.is_empty() {
            return Err(KnowledgeBaseError::Empty);
        }
        profiles.sort_by_key(|p| p.id);
        for (expected, profile) in profiles.iter().enumerate() {
            if profile.id != expected {
                return Err(KnowledgeBaseError::NonContiguousIds {
                    expected,
                    found: profile.id,
                });
            }
        }
        Ok(Self { profiles })
    }

    pub fn get(&self, id: usize) -> Option<&CareerProfile> {
        self.profiles.get(id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CareerProfile> {
        self.profiles.iter()
    }
}
