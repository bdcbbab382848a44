//! Section registry: every content area of the site, how it is stored, and
//! which fields it requires.

mod validation;

pub use validation::*;

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::models::{
    AdmissionApplication, CalendarEvent, CalendarMonthGroup, FeeTable, HeroSlide, PersonRecord,
    Program, StatCounter,
};

/// How a section's documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Many documents, each with its own `_id`.
    Collection,
    /// Exactly one document for the whole section.
    Singleton,
}

/// A content area of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    AcademicCalendar,
    Faculty,
    Administrative,
    Alumni,
    Programs,
    News,
    Partners,
    Testimonials,
    HeroSlides,
    Stats,
    Scholarships,
    TuitionFees,
    GeneralPages,
    CampusActivities,
    Facilities,
    AdmissionEligibility,
    Admissions,
    SiteInfo,
    CallToAction,
    OnlineAdmission,
    Homepage,
}

const EVENT_TYPES: &[&str] = &["admission", "academic", "exam", "holiday", "result", "event"];

impl Section {
    pub const ALL: [Section; 21] = [
        Section::AcademicCalendar,
        Section::Faculty,
        Section::Administrative,
        Section::Alumni,
        Section::Programs,
        Section::News,
        Section::Partners,
        Section::Testimonials,
        Section::HeroSlides,
        Section::Stats,
        Section::Scholarships,
        Section::TuitionFees,
        Section::GeneralPages,
        Section::CampusActivities,
        Section::Facilities,
        Section::AdmissionEligibility,
        Section::Admissions,
        Section::SiteInfo,
        Section::CallToAction,
        Section::OnlineAdmission,
        Section::Homepage,
    ];

    /// URL segment under `/api/`.
    pub fn slug(&self) -> &'static str {
        match self {
            Section::AcademicCalendar => "academic-calendar",
            Section::Faculty => "faculty",
            Section::Administrative => "administrative",
            Section::Alumni => "alumni",
            Section::Programs => "programs",
            Section::News => "news",
            Section::Partners => "partners",
            Section::Testimonials => "testimonials",
            Section::HeroSlides => "hero-slides",
            Section::Stats => "stats",
            Section::Scholarships => "scholarships",
            Section::TuitionFees => "tuition-fees",
            Section::GeneralPages => "general-pages",
            Section::CampusActivities => "campus-activities",
            Section::Facilities => "facilities",
            Section::AdmissionEligibility => "admission-eligibility",
            Section::Admissions => "admissions",
            Section::SiteInfo => "site-info",
            Section::CallToAction => "call-to-action",
            Section::OnlineAdmission => "online-admission",
            Section::Homepage => "homepage",
        }
    }

    pub fn storage(&self) -> Storage {
        match self {
            Section::SiteInfo
            | Section::CallToAction
            | Section::OnlineAdmission
            | Section::Homepage => Storage::Singleton,
            _ => Storage::Collection,
        }
    }

    /// Whether anonymous visitors may create documents (public forms).
    pub fn accepts_public_submissions(&self) -> bool {
        matches!(self, Section::Admissions)
    }

    /// Whether documents appear in site search. Submissions carry personal data.
    pub fn is_searchable(&self) -> bool {
        self.storage() == Storage::Collection && *self != Section::Admissions
    }

    /// Required-field rules for documents of this section.
    pub fn rules(&self) -> &'static [Rule] {
        use Rule::*;
        match self {
            Section::AcademicCalendar => &[
                Required("month"),
                Required("year"),
                NonEmptyList("events"),
                EachRequired {
                    list: "events",
                    field: "title",
                },
                EachRequired {
                    list: "events",
                    field: "date",
                },
                OneOf {
                    path: "events.*.type",
                    allowed: EVENT_TYPES,
                },
            ],
            Section::Faculty => &[
                Required("name"),
                Required("designation"),
                Required("department"),
            ],
            Section::Administrative => &[Required("name"), Required("designation")],
            Section::Alumni | Section::Partners => &[Required("name")],
            Section::Testimonials => &[Required("name"), Required("message")],
            Section::Stats => &[Required("label"), Required("value")],
            Section::TuitionFees => &[
                Required("program"),
                Required("title"),
                NonEmptyList("headers"),
                RowsMatchHeaders {
                    headers: "headers",
                    rows: "rows",
                },
            ],
            Section::GeneralPages => &[Required("slug"), Required("title")],
            Section::AdmissionEligibility => &[Required("program")],
            Section::Admissions => &[
                Required("applicantName"),
                Required("fatherName"),
                Required("motherName"),
                Required("dateOfBirth"),
                Required("phone"),
                Required("program"),
                Required("photo"),
                Required("signature"),
            ],
            Section::SiteInfo => &[Required("name")],
            Section::Programs
            | Section::News
            | Section::HeroSlides
            | Section::Scholarships
            | Section::CampusActivities
            | Section::Facilities
            | Section::CallToAction => &[Required("title")],
            Section::OnlineAdmission | Section::Homepage => &[],
        }
    }

    /// Fresh record an "Add" action starts from.
    pub fn template(&self) -> Value {
        let typed = match self {
            Section::AcademicCalendar => serde_json::to_value(CalendarMonthGroup {
                events: vec![CalendarEvent::default()],
                ..Default::default()
            }),
            Section::Faculty | Section::Administrative | Section::Alumni => {
                serde_json::to_value(PersonRecord::default())
            }
            Section::Programs => serde_json::to_value(Program::default()),
            Section::TuitionFees => serde_json::to_value(FeeTable::default()),
            Section::HeroSlides => serde_json::to_value(HeroSlide::default()),
            Section::Stats => serde_json::to_value(StatCounter::default()),
            Section::Admissions => serde_json::to_value(AdmissionApplication::default()),
            Section::Partners => Ok(json!({ "name": "", "logo": "", "website": "" })),
            Section::Testimonials => Ok(json!({ "name": "", "role": "", "message": "", "image": "" })),
            Section::GeneralPages => Ok(json!({ "slug": "", "title": "", "content": "" })),
            Section::AdmissionEligibility => Ok(json!({ "program": "", "requirements": [] })),
            Section::SiteInfo => Ok(json!({ "name": "", "address": "", "phone": "", "email": "" })),
            Section::OnlineAdmission => Ok(json!({ "open": false, "instructions": "" })),
            Section::Homepage => Ok(json!({})),
            Section::News
            | Section::Scholarships
            | Section::CampusActivities
            | Section::Facilities
            | Section::CallToAction => {
                Ok(json!({ "title": "", "description": "", "image": "" }))
            }
        };
        typed.unwrap_or_else(|_| json!({}))
    }

    /// Validate a document against this section's rules.
    pub fn validate(&self, doc: &Value) -> ValidationReport {
        let mut report = check(self.rules(), doc);
        if !doc.is_object() {
            report.add("", "document must be a JSON object");
        }
        report
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Unrecognised section slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section `{0}`")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.slug() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}
