//! Feature Encoder: maps a loosely-typed student submission to the fixed
//! 13-column vector the career classifier was trained on.
//!
//! Keyword detection is plain case-insensitive substring containment, so
//! "SQLite" sets the sql flag and "HTML" sets the ml flag. The trained model
//! depends on exactly these semantics; do not tokenize here.

use serde::Serialize;

use crate::models::student::{LooseNumber, StudentInput};
use crate::recommendation::RecommendError;

pub const FEATURE_COUNT: usize = 13;

/// Column order of the encoded vector. The model artifact stores the same list.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "dept_code",
    "year",
    "cgpa",
    "python",
    "java",
    "sql",
    "ml",
    "ai",
    "coding",
    "design",
    "logic_thinking",
    "teamwork",
    "risk_taking",
];

const DEPARTMENT_CODES: &[(&str, f64)] = &[
    ("Computer Science", 0.0),
    ("Information Tech", 0.0),
    ("Mechanical", 1.0),
    ("Civil", 1.0),
    ("Electrical", 1.0),
    ("Other", 2.0),
];

const UNKNOWN_DEPARTMENT_CODE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

pub fn department_code(department: &str) -> f64 {
    DEPARTMENT_CODES
        .iter()
        .find(|(name, _)| *name == department)
        .map(|(_, code)| *code)
        .unwrap_or(UNKNOWN_DEPARTMENT_CODE)
}

pub fn encode(input: &StudentInput) -> Result<FeatureVector, RecommendError> {
    let dept_code = department_code(&input.department);
    let year = parse_year(&input.year)?;
    let cgpa = input
        .cgpa
        .as_f64()
        .ok_or_else(|| RecommendError::input_format("cgpa", &input.cgpa))?;

    let skills = input.skills.to_lowercase();
    let interests = input.interests.to_lowercase();

    let python = flag(skills.contains("python"));
    let java = flag(skills.contains("java"));
    let sql = flag(skills.contains("sql"));
    let ml = flag(skills.contains("machine learning") || skills.contains("ml"));
    let ai = flag(interests.contains("ai"));
    let coding = flag(interests.contains("coding"));
    // cross-field: design interest OR figma skill
    let design = flag(interests.contains("design") || skills.contains("figma"));

    let logic_thinking = parse_rating("logic_thinking", input.logic_thinking.as_ref())?;
    let teamwork = parse_rating("teamwork", input.teamwork.as_ref())?;
    let risk_taking = parse_rating("risk_taking", input.risk_taking.as_ref())?;

    Ok(FeatureVector([
        dept_code,
        year as f64,
        cgpa,
        python,
        java,
        sql,
        ml,
        ai,
        coding,
        design,
        logic_thinking as f64,
        teamwork as f64,
        risk_taking as f64,
    ]))
}

/// Parses the academic year as an integer. Also used to pick the roadmap slice.
pub fn parse_year(year: &LooseNumber) -> Result<i64, RecommendError> {
    year.as_i64()
        .ok_or_else(|| RecommendError::input_format("year", year))
}

fn parse_rating(field: &str, value: Option<&LooseNumber>) -> Result<i64, RecommendError> {
    match value {
        None => Ok(0),
        Some(v) if v.is_blank() => Ok(0),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| RecommendError::input_format(field, v)),
    }
}

fn flag(present: bool) -> f64 {
    if present {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(department: &str, skills: &str, interests: &str) -> StudentInput {
        StudentInput {
            name: "Test Student".to_string(),
            department: department.to_string(),
            year: LooseNumber::Int(3),
            cgpa: LooseNumber::Float(8.5),
            skills: skills.to_string(),
            interests: interests.to_string(),
            logic_thinking: None,
            teamwork: None,
            risk_taking: None,
        }
    }

    #[test]
    fn test_cs_student_scenario() {
        let input = student(
            "Computer Science",
            "Python, SQL, Machine Learning",
            "AI, coding",
        );
        let v = encode(&input).unwrap();
        assert_eq!(
            v.0,
            [0.0, 3.0, 8.5, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_vector_length_matches_feature_names() {
        let v = encode(&student("Civil", "", "")).unwrap();
        assert_eq!(v.as_slice().len(), FEATURE_NAMES.len());
        assert_eq!(FEATURE_NAMES[0], "dept_code");
        assert_eq!(FEATURE_NAMES[12], "risk_taking");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let input = student("Mechanical", "AutoCAD, java", "design");
        assert_eq!(encode(&input).unwrap(), encode(&input).unwrap());
    }

    #[test]
    fn test_unknown_department_defaults_to_bucket_two() {
        let v = encode(&student("Unknown Dept", "", "")).unwrap();
        assert_eq!(v.0[0], 2.0);
        // lookup is exact, not case-insensitive
        assert_eq!(department_code("computer science"), 2.0);
        assert_eq!(department_code("Information Tech"), 0.0);
        assert_eq!(department_code("Electrical"), 1.0);
    }

    #[test]
    fn test_substring_matching_is_intentionally_loose() {
        let v = encode(&student("Other", "SQLite, JavaScript, HTML", "")).unwrap();
        assert_eq!(v.0[4], 1.0, "javascript contains java");
        assert_eq!(v.0[5], 1.0, "sqlite contains sql");
        assert_eq!(v.0[6], 1.0, "html contains ml");
        assert_eq!(v.0[3], 0.0);
    }

    #[test]
    fn test_design_flag_is_cross_field() {
        let from_skills = encode(&student("Other", "Figma", "")).unwrap();
        let from_interests = encode(&student("Other", "", "UI Design")).unwrap();
        let neither = encode(&student("Other", "design", "figma")).unwrap();
        assert_eq!(from_skills.0[9], 1.0);
        assert_eq!(from_interests.0[9], 1.0);
        assert_eq!(neither.0[9], 0.0);
    }

    #[test]
    fn test_personality_defaults_and_parsing() {
        let mut input = student("Other", "", "");
        input.logic_thinking = Some(LooseNumber::from("4"));
        input.teamwork = Some(LooseNumber::from(""));
        input.risk_taking = None;
        let v = encode(&input).unwrap();
        assert_eq!(&v.0[10..], &[4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_string_year_and_cgpa_are_coerced() {
        let mut input = student("Other", "", "");
        input.year = LooseNumber::from("2");
        input.cgpa = LooseNumber::from("7.75");
        let v = encode(&input).unwrap();
        assert_eq!(v.0[1], 2.0);
        assert_eq!(v.0[2], 7.75);
    }

    #[test]
    fn test_malformed_year_is_input_format_error() {
        let mut input = student("Other", "", "");
        input.year = LooseNumber::from("third");
        let err = encode(&input).unwrap_err();
        assert!(matches!(err, RecommendError::InputFormat { ref field, .. } if field == "year"));
    }

    #[test]
    fn test_malformed_rating_is_input_format_error() {
        let mut input = student("Other", "", "");
        input.risk_taking = Some(LooseNumber::from("very"));
        let err = encode(&input).unwrap_err();
        assert!(matches!(err, RecommendError::InputFormat { ref field, .. } if field == "risk_taking"));
    }
}
