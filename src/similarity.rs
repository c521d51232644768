//! Name reconciliation: decide whether a candidate record is an existing
//! contact, probably one, or new.

use strsim::normalized_levenshtein;

use crate::error::CrmError;
use crate::store::{Contact, ContactDB, ContactRecord};
use crate::thresholds::SUGGEST_SIM;
use crate::util::title_case;

/// Outcome of reconciling one candidate against the store.
#[derive(Debug, Clone)]
pub enum Classification {
    /// Normalized-name equality. Safe to write through; the upsert's own
    /// lookup will land on the same entity.
    ExactMatch(Vec<Contact>),
    /// Single best fuzzy candidate at or above [`SUGGEST_SIM`]. Needs a
    /// user decision before anything is written.
    Suggest { contact: Contact, score: f64 },
    NoMatch,
}

/// Case-insensitive similarity ratio in [0, 1].
pub fn name_ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Classify a candidate: exact normalized-name lookup first, then a fuzzy
/// pass over every stored name. Only the single top-scoring fuzzy candidate
/// is ever surfaced; ties keep the first-seen contact (strict `>` against
/// the running best).
///
/// Store failures surface as `Err` — the caller logs and treats that as
/// `NoMatch`, failing open to a direct create.
pub fn classify(db: &ContactDB, record: &ContactRecord) -> Result<Classification, CrmError> {
    let Some(name) = record.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Classification::NoMatch);
    };

    let normalized = title_case(name);
    let exact = db.find_by_name(&normalized)?;
    if !exact.is_empty() {
        return Ok(Classification::ExactMatch(exact));
    }

    let mut best: Option<(Contact, f64)> = None;
    for contact in db.list_all()? {
        let score = name_ratio(name, &contact.name);
        if score < SUGGEST_SIM {
            continue;
        }
        if best.as_ref().map_or(true, |(_, b)| score > *b) {
            best = Some((contact, score));
        }
    }

    Ok(match best {
        Some((contact, score)) => Classification::Suggest { contact, score },
        None => Classification::NoMatch,
    })
}
