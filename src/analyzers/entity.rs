//! Named-entity coverage weighted by entity type

use super::{preview, AnalysisDetails, AnalysisResult, Analyzer, AnalyzerKind};
use crate::error::Result;
use crate::processing::linguistic::{Entity, EntityLabel};
use crate::processing::text_processor::TextPreprocessor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Entity buckets compared by the analyzer. `Skill` is filled from skill
/// extraction rather than from the entity recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Skill,
    Product,
    Org,
    Gpe,
    Cardinal,
    Date,
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        EntityType::Skill,
        EntityType::Product,
        EntityType::Org,
        EntityType::Gpe,
        EntityType::Cardinal,
        EntityType::Date,
    ];

    pub fn weight(&self) -> f32 {
        match self {
            EntityType::Skill => 1.0,
            EntityType::Product => 0.9,
            EntityType::Org => 0.8,
            EntityType::Gpe => 0.7,
            EntityType::Cardinal => 0.6,
            EntityType::Date => 0.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Skill => "SKILL",
            EntityType::Product => "PRODUCT",
            EntityType::Org => "ORG",
            EntityType::Gpe => "GPE",
            EntityType::Cardinal => "CARDINAL",
            EntityType::Date => "DATE",
        }
    }
}

impl From<EntityLabel> for EntityType {
    fn from(label: EntityLabel) -> Self {
        match label {
            EntityLabel::Product => EntityType::Product,
            EntityLabel::Org => EntityType::Org,
            EntityLabel::Gpe => EntityType::Gpe,
            EntityLabel::Cardinal => EntityType::Cardinal,
            EntityLabel::Date => EntityType::Date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDetails {
    /// Coverage of the job's entities per type, keyed by type name
    pub entity_similarities: BTreeMap<String, f32>,
    pub matched_entities: Vec<String>,
    pub missing_entities: Vec<String>,
    pub suggestions: Vec<String>,
}

pub struct EntityAnalyzer {
    preprocessor: Arc<TextPreprocessor>,
}

type Buckets = BTreeMap<EntityType, BTreeSet<String>>;

impl EntityAnalyzer {
    pub fn new(preprocessor: Arc<TextPreprocessor>) -> Self {
        Self { preprocessor }
    }

    fn buckets(entities: &[Entity], skills: BTreeSet<String>) -> Buckets {
        let mut buckets = Buckets::new();
        for entity in entities {
            buckets
                .entry(EntityType::from(entity.label))
                .or_default()
                .insert(entity.text.to_lowercase());
        }
        buckets.insert(EntityType::Skill, skills);
        buckets
    }
}

impl Analyzer for EntityAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Ner
    }

    fn analyze(&self, cv_text: &str, job_text: &str) -> Result<AnalysisResult> {
        let job = self.preprocessor.process(job_text);
        if job.is_empty() {
            return Ok(AnalysisResult::new(
                0.0,
                AnalysisDetails::Ner(EntityDetails::default()),
                Vec::new(),
            ));
        }
        let cv = self.preprocessor.process(cv_text);

        let cv_buckets = Self::buckets(&cv.entities, self.preprocessor.extract_skills_and_requirements(cv_text));
        let job_buckets = Self::buckets(&job.entities, self.preprocessor.extract_skills_and_requirements(job_text));
        let empty = BTreeSet::new();

        let mut entity_similarities = BTreeMap::new();
        let mut matched = BTreeSet::new();
        let mut missing_by_type: Vec<(EntityType, Vec<String>)> = Vec::new();
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for entity_type in EntityType::ALL {
            let cv_set = cv_buckets.get(&entity_type).unwrap_or(&empty);
            let job_set = job_buckets.get(&entity_type).unwrap_or(&empty);

            // Absence from the job is not a penalty
            let score = if job_set.is_empty() {
                1.0
            } else {
                job_set.intersection(cv_set).count() as f32 / job_set.len() as f32
            };

            matched.extend(job_set.intersection(cv_set).cloned());
            missing_by_type.push((entity_type, job_set.difference(cv_set).cloned().collect()));

            entity_similarities.insert(entity_type.as_str().to_string(), score);
            weighted_sum += score * entity_type.weight();
            weight_total += entity_type.weight();
        }

        // Each missing entity is reported once, under the first type that holds it
        let mut reported = BTreeSet::new();
        let mut suggestions = Vec::new();
        for (entity_type, missing) in &missing_by_type {
            let fresh: Vec<String> = missing.iter().filter(|e| reported.insert((*e).clone())).cloned().collect();
            if !fresh.is_empty() {
                suggestions.push(format!(
                    "Consider adding these {} mentions: {}",
                    entity_type.as_str().to_lowercase(),
                    preview(&fresh, 5)
                ));
            }
        }

        let matched_entities: Vec<String> = matched.into_iter().collect();
        Ok(AnalysisResult::new(
            weighted_sum / weight_total,
            AnalysisDetails::Ner(EntityDetails {
                entity_similarities,
                matched_entities: matched_entities.clone(),
                missing_entities: reported.into_iter().collect(),
                suggestions,
            }),
            matched_entities,
        ))
    }
}
