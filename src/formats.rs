use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDocument {
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub sections: Vec<Section>,
    pub conclusion: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub word_count: usize,
    pub reading_time_minutes: usize,
    pub content_type: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub used_fallback: bool,
}

/// Scored snapshot of a website, as produced by the analysis side of the product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAnalysis {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub scores: SiteScores,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_grams_per_view: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting_provider: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sustainability: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_quality: Option<u8>,
}

impl SiteScores {
    /// Labelled scores that are present, in display order.
    pub fn entries(&self) -> Vec<(&'static str, u8)> {
        [
            ("Performance", self.performance),
            ("Security", self.security),
            ("Sustainability", self.sustainability),
            ("Content quality", self.content_quality),
        ]
        .into_iter()
        .filter_map(|(label, score)| score.map(|s| (label, s)))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub url: String,
    pub content_type: String,
    pub tone: String,
    pub engine: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
    pub request: GenerationRequest,
    pub document: StructuredDocument,
}
