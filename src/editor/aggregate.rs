//! Multi-step "Save All" with per-step failure reporting.
//!
//! Steps run independently: a failed step does not stop the others, and
//! steps that succeeded are not rolled back. The report names exactly the
//! steps that failed.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;

use super::{is_temporary_id, ClientError, DocumentApi};
use crate::document::{document_id, ID_KEY};
use crate::schema::{Section, ValidationReport};

type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ClientError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<StepFailure>,
}

impl AggregateReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_steps(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.step.as_str()).collect()
    }

    /// User-facing status line.
    pub fn summary(&self) -> String {
        if self.is_success() {
            return "All changes saved".to_string();
        }
        let failed: Vec<String> = self
            .failed
            .iter()
            .map(|f| format!("{} ({})", f.step, f.message))
            .collect();
        format!("Failed to save: {}", failed.join(", "))
    }
}

/// Named save steps collected before running.
#[derive(Default)]
pub struct AggregateSave<'a> {
    steps: Vec<(String, StepFuture<'a>)>,
}

impl<'a> AggregateSave<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn step<F>(mut self, name: impl Into<String>, fut: F) -> Self
    where
        F: Future<Output = Result<(), ClientError>> + Send + 'a,
    {
        self.steps.push((name.into(), Box::pin(fut)));
        self
    }

    /// Run every step in order and collect the outcome.
    pub async fn run(self) -> AggregateReport {
        let mut report = AggregateReport::default();
        for (name, fut) in self.steps {
            match fut.await {
                Ok(()) => report.succeeded.push(name),
                Err(e) => {
                    tracing::warn!(step = %name, "save step failed: {}", e);
                    report.failed.push(StepFailure {
                        step: name,
                        message: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// Everything the dashboard's "Save All" button sends.
#[derive(Debug, Clone, Default)]
pub struct DashboardDraft {
    pub hero_slides: Vec<Value>,
    /// Merge patch for the homepage document; other keys are left alone.
    pub homepage: Value,
    pub programs: Vec<Value>,
}

/// Save hero slides, homepage and programs as three independent steps.
///
/// Records created along the way are written back into the draft with their
/// stored `_id`, so running the save again updates instead of duplicating.
pub async fn save_dashboard<A: DocumentApi>(api: &A, draft: &mut DashboardDraft) -> AggregateReport {
    let homepage = &draft.homepage;
    AggregateSave::new()
        .step("hero", save_records(api, Section::HeroSlides, &mut draft.hero_slides))
        .step("homepage", async move {
            api.patch(Section::Homepage, homepage).await.map(|_| ())
        })
        .step("programs", save_records(api, Section::Programs, &mut draft.programs))
        .run()
        .await
}

/// Validate every record, then create those without a stored id and update
/// the rest. Each stored record replaces its draft entry.
async fn save_records<A: DocumentApi>(
    api: &A,
    section: Section,
    records: &mut [Value],
) -> Result<(), ClientError> {
    let mut report = ValidationReport::default();
    for (i, record) in records.iter().enumerate() {
        for (path, reason) in section.validate(record).field_errors {
            report.add(format!("{i}.{path}"), reason);
        }
    }
    if !report.is_valid() {
        return Err(ClientError::Validation(report));
    }

    for record in records.iter_mut() {
        let stored = match document_id(record) {
            Some(id) if !is_temporary_id(&id) => api.update(section, record).await?,
            _ => {
                let mut fresh = record.clone();
                if let Value::Object(map) = &mut fresh {
                    map.remove(ID_KEY);
                }
                api.create(section, &fresh).await?
            }
        };
        *record = stored;
    }
    Ok(())
}
