//! Skill gap analysis against a career's curated required-skill list.
//!
//! Unlike the feature encoder, matching here is exact token equality after
//! splitting on commas, trimming and lower-casing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub missing: Vec<String>,
    pub matched: Vec<String>,
    pub match_percentage: u32, // 0 – 100, floored
}

pub fn analyze_gaps(free_text_skills: &str, required: &[String]) -> GapAnalysis {
    let possessed: HashSet<String> = free_text_skills
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let (matched, missing): (Vec<String>, Vec<String>) = required
        .iter()
        .cloned()
        .partition(|skill| possessed.contains(&skill.to_lowercase()));

    let match_percentage = if required.is_empty() {
        0
    } else {
        (100 * matched.len() / required.len()) as u32
    };

    GapAnalysis {
        missing,
        matched,
        match_percentage,
    }
}
