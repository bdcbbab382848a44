//! Read-side helpers for the public pages: fee lookup, people directory,
//! calendar display, and the online admission form.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::document_id;
use crate::editor::{ClientError, DocumentApi, UploadFile};
use crate::models::{month_order, CalendarMonthGroup, FeeTable, PersonRecord};
use crate::schema::{Section, ValidationReport};

/// Folder admission photos and signatures are uploaded to.
pub const ADMISSION_UPLOAD_FOLDER: &str = "admissions";

/// Parse fee table documents, skipping any that do not have the table shape.
pub fn fee_tables(docs: &[Value]) -> Vec<FeeTable> {
    docs.iter()
        .filter_map(|doc| match serde_json::from_value(doc.clone()) {
            Ok(table) => Some(table),
            Err(e) => {
                tracing::warn!(id = ?document_id(doc), "skipping malformed fee table: {}", e);
                None
            }
        })
        .collect()
}

/// The fee table of a program, by abbreviation (case-insensitive).
pub fn find_fee_table<'a>(tables: &'a [FeeTable], program: &str) -> Option<&'a FeeTable> {
    let wanted = program.trim();
    tables
        .iter()
        .find(|t| t.program.trim().eq_ignore_ascii_case(wanted))
}

/// Fee tables grouped under one tab (`type`), in stored order.
pub fn fee_tables_of_kind<'a>(tables: &'a [FeeTable], kind: &str) -> Vec<&'a FeeTable> {
    tables.iter().filter(|t| t.kind == kind).collect()
}

/// A person by route parameter, matching either `_id` or legacy `id`.
pub fn find_person(records: &[Value], id: &str) -> Option<PersonRecord> {
    let doc = records.iter().find(|r| {
        document_id(r).as_deref() == Some(id)
            || r.get("id").map(|v| value_matches(v, id)).unwrap_or(false)
    })?;
    serde_json::from_value(doc.clone()).ok()
}

fn value_matches(value: &Value, id: &str) -> bool {
    match value {
        Value::String(s) => s == id,
        Value::Number(n) => n.to_string() == id,
        _ => false,
    }
}

/// Month groups ready for display: groups without events are dropped,
/// the rest ordered by year then month.
pub fn calendar_for_display(docs: &[Value]) -> Vec<CalendarMonthGroup> {
    let mut groups: Vec<CalendarMonthGroup> = docs
        .iter()
        .filter_map(|doc| match serde_json::from_value::<CalendarMonthGroup>(doc.clone()) {
            Ok(group) => Some(group),
            Err(e) => {
                tracing::warn!(id = ?document_id(doc), "skipping malformed calendar month: {}", e);
                None
            }
        })
        .filter(|g| !g.events.is_empty())
        .collect();

    for group in &mut groups {
        if group.month_order == 0 {
            group.month_order = month_order(&group.month);
        }
    }
    groups.sort_by(|a, b| compare_years(&a.year, &b.year).then(a.month_order.cmp(&b.month_order)));
    groups
}

/// Numeric years in numeric order, then anything unparseable by text.
fn compare_years(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim(), b.trim());
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Required-field check of the admission form.
pub fn validate_admission(form: &Value) -> ValidationReport {
    Section::Admissions.validate(form)
}

/// Validate, upload photo and signature, then submit the application.
///
/// Text fields are checked before anything is uploaded so a rejected form
/// never leaves files behind.
pub async fn submit_admission<A: DocumentApi>(
    api: &A,
    mut form: Value,
    photo: UploadFile,
    signature: UploadFile,
) -> Result<Value, ClientError> {
    let mut report = validate_admission(&form);
    report.field_errors.remove("photo");
    report.field_errors.remove("signature");
    if !report.is_valid() {
        return Err(ClientError::Validation(report));
    }

    let photo_url = api.upload(ADMISSION_UPLOAD_FOLDER, photo).await?;
    let signature_url = api.upload(ADMISSION_UPLOAD_FOLDER, signature).await?;
    crate::document::set_path_mut(&mut form, "photo", Value::String(photo_url))?;
    crate::document::set_path_mut(&mut form, "signature", Value::String(signature_url))?;

    let report = validate_admission(&form);
    if !report.is_valid() {
        return Err(ClientError::Validation(report));
    }

    let stored = api.create(Section::Admissions, &form).await?;
    tracing::info!(id = ?document_id(&stored), "admission application submitted");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::fake::FakeApi;
    use serde_json::json;

    #[test]
    fn test_find_fee_table_by_program() {
        let docs = vec![
            json!({ "_id": "1", "program": "BBA", "type": "undergraduate", "title": "BBA", "headers": ["Item"], "rows": [["Admission"]] }),
            json!({ "_id": "2", "program": "MBA", "type": "graduate", "title": "MBA", "headers": [], "rows": [] }),
            json!({ "_id": "3", "program": "LLM", "headers": "Item" }),
            json!({ "_id": "4", "program": 42, "title": "Numeric", "headers": ["Item"], "rows": [[1]] }),
        ];
        let tables = fee_tables(&docs);
        assert_eq!(tables.len(), 3);

        assert_eq!(find_fee_table(&tables, "bba").unwrap().id.as_deref(), Some("1"));
        assert_eq!(find_fee_table(&tables, "42").unwrap().cell(0, "Item"), Some("1"));
        assert!(find_fee_table(&tables, "LLB").is_none());
        assert_eq!(fee_tables_of_kind(&tables, "graduate").len(), 1);
    }

    #[test]
    fn test_find_person_matches_either_id() {
        let records = vec![
            json!({ "_id": "abc", "name": "Dr. Karim" }),
            json!({ "id": 1718000000, "name": "Ms. Rina" }),
        ];
        assert_eq!(find_person(&records, "abc").unwrap().name, "Dr. Karim");
        assert_eq!(find_person(&records, "1718000000").unwrap().name, "Ms. Rina");
        assert!(find_person(&records, "nope").is_none());
    }

    #[test]
    fn test_calendar_for_display_orders_and_drops_empty() {
        let docs = vec![
            json!({ "month": "March", "year": "2026", "events": [ { "date": "01", "title": "Exam" } ] }),
            json!({ "month": "January", "year": "2026", "events": [ { "date": "05", "title": "Orientation" } ] }),
            json!({ "month": "February", "year": "2026", "events": [] }),
            json!({ "month": "December", "year": "2025", "month_order": 12, "events": [ { "date": "16", "title": "Victory Day", "type": "holiday" } ] }),
        ];
        let months: Vec<String> = calendar_for_display(&docs)
            .into_iter()
            .map(|g| format!("{} {}", g.month, g.year))
            .collect();
        assert_eq!(months, vec!["December 2025", "January 2026", "March 2026"]);
    }

    #[test]
    fn test_calendar_keeps_documents_the_validator_accepts() {
        let docs = vec![
            json!({ "month": "April", "year": "2026", "events": [ { "date": "14", "title": "Pohela Boishakh", "type": "" } ] }),
            json!({ "month": "May", "year": 2026, "events": [ { "date": 1, "title": "May Day" } ] }),
        ];
        for doc in &docs {
            assert!(Section::AcademicCalendar.validate(doc).is_valid());
        }
        let groups = calendar_for_display(&docs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].events[0].event_type, crate::models::EventType::Academic);
        assert_eq!(groups[1].year, "2026");
    }

    #[test]
    fn test_calendar_years_sort_numerically() {
        let docs = vec![
            json!({ "month": "January", "year": "2026", "events": [ { "date": "1", "title": "New year" } ] }),
            json!({ "month": "January", "year": "TBA", "events": [ { "date": "1", "title": "Later" } ] }),
            json!({ "month": "January", "year": " 999", "events": [ { "date": "1", "title": "Founding" } ] }),
        ];
        let years: Vec<String> = calendar_for_display(&docs).into_iter().map(|g| g.year).collect();
        assert_eq!(years, vec![" 999", "2026", "TBA"]);
    }

    fn complete_form() -> Value {
        json!({
            "applicantName": "Rahim Uddin",
            "fatherName": "Karim Uddin",
            "motherName": "Rokeya Begum",
            "dateOfBirth": "2006-04-12",
            "phone": "01700000000",
            "program": "BBA",
            "hsc": { "gpa": "5.00", "year": "2024" }
        })
    }

    #[tokio::test]
    async fn test_submit_admission_uploads_then_posts() {
        let api = FakeApi::default();
        let stored = submit_admission(
            &api,
            complete_form(),
            UploadFile::new("photo.jpg", vec![1]),
            UploadFile::new("sign.png", vec![2]),
        )
        .await
        .unwrap();

        assert_eq!(stored["photo"], "/uploads/admissions/photo.jpg");
        assert_eq!(stored["signature"], "/uploads/admissions/sign.png");
        assert_eq!(api.stored(Section::Admissions).len(), 1);
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn test_submit_admission_rejects_before_uploading() {
        let api = FakeApi::default();
        let mut form = complete_form();
        form["motherName"] = json!(" ");

        let err = submit_admission(
            &api,
            form,
            UploadFile::new("photo.jpg", vec![1]),
            UploadFile::new("sign.png", vec![2]),
        )
        .await
        .unwrap_err();

        match err {
            ClientError::Validation(report) => {
                assert_eq!(report.field_errors.keys().collect::<Vec<_>>(), vec!["motherName"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(api.calls(), 0);
    }
}
