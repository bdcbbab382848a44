//! Online admission application submitted from the public form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Secondary / higher-secondary exam results block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExamResult {
    #[serde(default)]
    pub board: String,
    #[serde(default)]
    pub roll: String,
    #[serde(default)]
    pub gpa: String,
    #[serde(default)]
    pub year: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionApplication {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub applicant_name: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Abbreviation of the program applied for.
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub ssc: ExamResult,
    #[serde(default)]
    pub hsc: ExamResult,
    /// Uploaded photograph URL.
    #[serde(default)]
    pub photo: String,
    /// Uploaded signature URL.
    #[serde(default)]
    pub signature: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
