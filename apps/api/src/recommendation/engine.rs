//! Recommendation Engine: ranks the classifier's distribution and annotates
//! the top careers with a suitability score, gap analysis and roadmap slice.
//!
//! Dependencies are injected at construction so tests can swap in a
//! classifier that returns a fixed distribution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::classifier::Classifier;
use crate::models::student::StudentInput;
use crate::recommendation::careers::CareerKnowledgeBase;
use crate::recommendation::features::{encode, parse_year};
use crate::recommendation::gaps::{analyze_gaps, GapAnalysis};
use crate::recommendation::RecommendError;

pub const TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterRoadmap {
    pub year: i64,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub career: String,
    pub score: u32, // 0 – 100
    pub suitability_text: String,
    pub salary: String,
    pub growth: String,
    pub required_skills: Vec<String>,
    pub gap_analysis: GapAnalysis,
    pub semester_roadmap: SemesterRoadmap,
}

/// Ranked recommendations plus the single top prediction for the audit log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub top_class: usize,
    pub top_career: String,
    pub top_confidence: f64,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    classifier: Arc<dyn Classifier>,
    careers: Arc<CareerKnowledgeBase>,
}

impl RecommendationEngine {
    pub fn new(classifier: Arc<dyn Classifier>, careers: Arc<CareerKnowledgeBase>) -> Self {
        Self {
            classifier,
            careers,
        }
    }

    pub fn careers(&self) -> &CareerKnowledgeBase {
        &self.careers
    }

    pub fn recommend(&self, input: &StudentInput) -> Result<RecommendationResult, RecommendError> {
        let vector = encode(input)?;
        let year = parse_year(&input.year)?;
        debug!("Encoded features: {:?}", vector.as_slice());

        let probabilities = self.classifier.predict_proba(&vector);
        if probabilities.len() != self.careers.len() {
            error!(
                "Classifier returned {} probabilities for {} careers",
                probabilities.len(),
                self.careers.len()
            );
            return Err(RecommendError::ClassifierOutput {
                expected: self.careers.len(),
                actual: probabilities.len(),
            });
        }

        let top_class = self.classifier.predict(&vector);
        let top_career = self
            .careers
            .get(top_class)
            .ok_or_else(|| mismatch(top_class))?
            .name
            .clone();
        let top_confidence = probabilities.iter().copied().fold(0.0, f64::max);

        let recommendations = rank(&probabilities)
            .into_iter()
            .take(TOP_K)
            .map(|class_id| self.annotate(class_id, probabilities[class_id], input, year))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Top career: {top_career} ({top_confidence:.3})");

        Ok(RecommendationResult {
            top_class,
            top_career,
            top_confidence,
            recommendations,
        })
    }

    fn annotate(
        &self,
        class_id: usize,
        probability: f64,
        input: &StudentInput,
        year: i64,
    ) -> Result<Recommendation, RecommendError> {
        let career = self.careers.get(class_id).ok_or_else(|| mismatch(class_id))?;
        let score = suitability_score(probability);

        Ok(Recommendation {
            career: career.name.clone(),
            score,
            suitability_text: format!("You are {score}% suitable for {}", career.name),
            salary: career.salary.clone(),
            growth: career.growth.clone(),
            required_skills: career.required_skills.clone(),
            gap_analysis: analyze_gaps(&input.skills, &career.required_skills),
            semester_roadmap: SemesterRoadmap {
                year,
                skills: career.roadmap_for(year).to_vec(),
            },
        })
    }
}

fn mismatch(class_id: usize) -> RecommendError {
    error!("Classifier emitted class {class_id} absent from the career table; model and table are out of sync");
    RecommendError::KnowledgeBaseMismatch { class_id }
}

/// Class ids by descending probability. Stable, so equal probabilities keep
/// ascending id order.
pub fn rank(probabilities: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    order
}

pub fn suitability_score(probability: f64) -> u32 {
    (probability * 100.0).round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::models::student::LooseNumber;
    use crate::recommendation::features::FeatureVector;

    struct FixedClassifier(Vec<f64>);

    impl Classifier for FixedClassifier {
        fn n_classes(&self) -> usize {
            self.0.len()
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Vec<f64> {
            self.0.clone()
        }
    }

    /// Reports a class the table does not have as its prediction.
    struct RogueClassifier;

    impl Classifier for RogueClassifier {
        fn n_classes(&self) -> usize {
            6
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Vec<f64> {
            vec![0.5, 0.1, 0.1, 0.1, 0.1, 0.1]
        }

        fn predict(&self, _features: &FeatureVector) -> usize {
            9
        }
    }

    fn engine(classifier: impl Classifier + 'static) -> RecommendationEngine {
        RecommendationEngine::new(
            Arc::new(classifier),
            Arc::new(CareerKnowledgeBase::embedded().unwrap()),
        )
    }

    fn cs_student(year: i64) -> StudentInput {
        StudentInput {
            name: "Meera".to_string(),
            department: "Computer Science".to_string(),
            year: LooseNumber::Int(year),
            cgpa: LooseNumber::Float(8.5),
            skills: "Python, SQL, Machine Learning".to_string(),
            interests: "AI, coding".to_string(),
            logic_thinking: Some(LooseNumber::Int(5)),
            teamwork: Some(LooseNumber::Int(3)),
            risk_taking: Some(LooseNumber::Int(2)),
        }
    }

    #[test]
    fn test_cs_student_top_recommendation() {
        let engine = engine(FixedClassifier(vec![0.62, 0.03, 0.05, 0.1, 0.15, 0.05]));
        let result = engine.recommend(&cs_student(3)).unwrap();

        assert_eq!(result.top_class, 0);
        assert_eq!(result.top_career, "AI / Data Science / Software Engineering");
        assert_eq!(result.top_confidence, 0.62);

        let top = &result.recommendations[0];
        assert_eq!(top.career, "AI / Data Science / Software Engineering");
        assert_eq!(top.score, 62);
        assert_eq!(
            top.suitability_text,
            "You are 62% suitable for AI / Data Science / Software Engineering"
        );
        assert_eq!(top.gap_analysis.matched, vec!["Python", "Machine Learning", "SQL"]);
        assert_eq!(top.gap_analysis.missing, vec!["AI"]);
        assert_eq!(top.gap_analysis.match_percentage, 75);
        assert_eq!(top.semester_roadmap.year, 3);
        assert_eq!(
            top.semester_roadmap.skills,
            vec!["Machine Learning", "Deep Learning", "Projects"]
        );
    }

    #[test]
    fn test_returns_three_sorted_unique_careers() {
        let engine = engine(FixedClassifier(vec![0.1, 0.05, 0.3, 0.05, 0.2, 0.3]));
        let result = engine.recommend(&cs_student(2)).unwrap();
        let recs = &result.recommendations;

        assert_eq!(recs.len(), TOP_K);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
        let names: HashSet<&str> = recs.iter().map(|r| r.career.as_str()).collect();
        assert_eq!(names.len(), 3);
        // tie between 2 and 5 keeps ascending id order
        assert_eq!(recs[0].career, "Design / UI/UX / Creative");
        assert_eq!(recs[1].career, "Startup / Entrepreneurship");
        assert_eq!(recs[2].career, "Higher Studies (MS/MBA/PhD)");
    }

    #[test]
    fn test_out_of_range_year_gives_empty_roadmap() {
        let engine = engine(FixedClassifier(vec![0.5, 0.1, 0.1, 0.1, 0.1, 0.1]));
        let result = engine.recommend(&cs_student(7)).unwrap();
        for rec in &result.recommendations {
            assert_eq!(rec.semester_roadmap.year, 7);
            assert!(rec.semester_roadmap.skills.is_empty());
        }
    }

    #[test]
    fn test_wrong_distribution_length_is_rejected() {
        let engine = engine(FixedClassifier(vec![0.5, 0.5]));
        let err = engine.recommend(&cs_student(1)).unwrap_err();
        assert!(matches!(
            err,
            RecommendError::ClassifierOutput {
                expected: 6,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_unknown_predicted_class_is_knowledge_base_mismatch() {
        let engine = engine(RogueClassifier);
        let err = engine.recommend(&cs_student(1)).unwrap_err();
        assert!(matches!(
            err,
            RecommendError::KnowledgeBaseMismatch { class_id: 9 }
        ));
    }

    #[test]
    fn test_bad_cgpa_fails_before_classification() {
        let engine = engine(FixedClassifier(vec![0.5, 0.1, 0.1, 0.1, 0.1, 0.1]));
        let mut input = cs_student(1);
        input.cgpa = LooseNumber::from("eight");
        assert!(matches!(
            engine.recommend(&input),
            Err(RecommendError::InputFormat { .. })
        ));
    }

    #[test]
    fn test_all_equal_probabilities_do_not_crash() {
        let engine = engine(FixedClassifier(vec![1.0 / 6.0; 6]));
        let result = engine.recommend(&cs_student(4)).unwrap();
        assert_eq!(result.recommendations.len(), 3);
        assert!(result.recommendations.iter().all(|r| r.score == 17));
    }

    #[test]
    fn test_rank_handles_fewer_than_three_classes() {
        assert_eq!(rank(&[0.3, 0.7]), vec![1, 0]);
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn test_rank_is_total_with_nan() {
        assert_eq!(rank(&[0.2, f64::NAN, 0.5, 0.2]), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_suitability_score_rounds_and_clamps() {
        assert_eq!(suitability_score(0.625), 63);
        assert_eq!(suitability_score(0.004), 0);
        assert_eq!(suitability_score(1.0), 100);
        assert_eq!(suitability_score(1.2), 100);
    }
}
