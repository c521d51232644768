//! Centralised prompt texts.
//!
//! Every prompt sent to the AI service lives here so wording can be audited
//! and tuned in one place. The rest of the codebase imports from
//! `crate::prompts`.

use crate::schema;

pub const EXTRACT_SYSTEM_PROMPT: &str =
    "You are a CRM assistant. Extract customer info from the text you are given. \
     Respond ONLY with valid JSON.";

/// Extraction prompt: lists every schema field with its kind, then the
/// special rules the model keeps getting wrong without them.
fn options_for(field: &str) -> &'static [&'static str] {
    schema::SCHEMA
        .iter()
        .find(|f| f.name == field)
        .map(|f| f.options)
        .unwrap_or(&[])
}

pub fn extraction_prompt(text: &str) -> String {
    let fields = schema::SCHEMA
        .iter()
        .map(|f| format!("- {} ({})", f.name, f.kind.label()))
        .collect::<Vec<_>>()
        .join("\n");
    let tag_options = options_for("Tags").join(", ");
    let category_options = options_for("Category").join(", ");

    format!(
        r#"Extract customer info from the text below.

Required fields:
{fields}

Special rules:
- If a field is not mentioned, return null.
- For "One-liner": Actively look for a brief description, summary, or key point about the person.
  This could be an event, why they're relevant, or a brief note about them.
  Only include if there's meaningful content - don't make up generic descriptions.
- For emails (text or pictures): Only extract the SENDER as a customer, ignore recipients.
  Focus on the person who sent the email, not who received it.
- Tags are STRICTLY opt-in. Only populate "Tags" if the text explicitly requests a tag
  (e.g., lines like "Tag name as X", "tags: X, Y", or "please add tag Foo"). Do not infer tags.
- When tags are requested, first try to match them to these predefined options:
  {tag_options}
- If there's a good match (exact or very close), use the predefined option.
- If no good match exists, create a new tag with the exact text requested.
- Accept a single tag or multiple tags. Output Tags as an array of strings.
- "Category" must be one of: {category_options}. Leave null when unsure.
- If multiple people are mentioned, return a JSON array of objects.

Respond ONLY with valid JSON.

Text: {text}"#
    )
}

/// Instruction sent alongside a screenshot for the vision model.
pub const IMAGE_EXTRACT_PROMPT: &str =
    "Extract CRM fields in JSON based on the schema. \
     If multiple people are mentioned, return a JSON array of objects.";
