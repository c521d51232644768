//! Per-kind normalization of a candidate record into column values.
//!
//! Rules, by field kind:
//! - title (Name) and the org-ish rich-text fields (Company/Org, Role/Title,
//!   Location) are title-cased; prose rich-text fields pass through verbatim
//! - select (Category) is kept only when the value is in the allowed option
//!   set, silently dropped otherwise
//! - multi-select (Tags) accepts one value or a list; entries are trimmed,
//!   title-cased, and empties dropped
//! - date (Met Date) passes through verbatim as a start date
//! - anything absent or empty is omitted from the write entirely, so a
//!   partial update never nulls out existing data

use crate::schema;
use crate::util::title_case;

use super::ContactRecord;

/// Normalized, present-only field values ready to be written. `None` means
/// "not provided" and is never written, as opposed to an explicit empty.
#[derive(Debug, Clone, Default)]
pub struct MappedFields {
    pub company: Option<String>,
    pub one_liner: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub met_how: Option<String>,
    pub met_date: Option<String>,
    pub introduced_by: Option<String>,
    pub linkedin: Option<String>,
    pub category: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn titled(v: &Option<String>) -> Option<String> {
    non_empty(v).map(|s| title_case(&s))
}

impl MappedFields {
    pub fn from_record(record: &ContactRecord) -> Self {
        let tags = record.tags.as_ref().map(|raw| {
            raw.iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(title_case)
                .collect::<Vec<_>>()
        });

        let category = non_empty(&record.category)
            .filter(|v| schema::CATEGORY_OPTIONS.contains(&v.as_str()));

        Self {
            company: titled(&record.company),
            one_liner: non_empty(&record.one_liner),
            role: titled(&record.role),
            location: titled(&record.location),
            email: non_empty(&record.email),
            phone: non_empty(&record.phone),
            tags: tags.filter(|t| !t.is_empty()),
            notes: non_empty(&record.notes),
            met_how: non_empty(&record.met_how),
            met_date: non_empty(&record.met_date),
            introduced_by: non_empty(&record.introduced_by),
            linkedin: non_empty(&record.linkedin),
            category,
        }
    }

    /// Column name / value pairs, `None` where the field was not provided.
    /// Tags serialize to their JSON column form.
    pub fn column_values(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("company", self.company.clone()),
            ("one_liner", self.one_liner.clone()),
            ("role", self.role.clone()),
            ("location", self.location.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            (
                "tags",
                self.tags
                    .as_ref()
                    .map(|t| serde_json::to_string(t).unwrap_or_else(|_| "[]".into())),
            ),
            ("notes", self.notes.clone()),
            ("met_how", self.met_how.clone()),
            ("met_date", self.met_date.clone()),
            ("introduced_by", self.introduced_by.clone()),
            ("linkedin", self.linkedin.clone()),
            ("category", self.category.clone()),
        ]
    }
}
