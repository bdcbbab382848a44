//! Academic program documents. Everything about a program lives in one document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CurriculumSemester {
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CareerPath {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: String,
}

/// A degree program with its nested curriculum and career sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Short code used in URLs and fee tables (e.g. "BBA").
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub overview: Vec<String>,
    #[serde(default)]
    pub eligibility: Vec<String>,
    #[serde(default)]
    pub curriculum: Vec<CurriculumSemester>,
    #[serde(default)]
    pub careers: Vec<CareerPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
