/// Words kept lowercase when title-casing a name or org, unless they lead.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "at", "de", "for", "in", "of", "on", "the", "to", "van", "von",
];

/// Title-case a human-entered value: each word capitalized, whitespace
/// collapsed. All-caps tokens of 2+ chars are acronyms and pass through
/// unchanged ("IBM", "SPV"). Stop-words stay lowercase except in first
/// position ("Bank of America", "The Hague").
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            if word.len() >= 2
                && word.chars().any(|c| c.is_uppercase())
                && !word.chars().any(|c| c.is_lowercase())
            {
                return word.to_string();
            }
            let lower = word.to_lowercase();
            if i > 0 && STOP_WORDS.contains(&lower.as_str()) {
                return lower;
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => lower,
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A name is persistable only with first + last: 2+ whitespace tokens.
pub fn valid_name(name: &str) -> bool {
    name.split_whitespace().count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name() {
        assert_eq!(title_case("jane doe"), "Jane Doe");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(title_case("  jane   doe "), "Jane Doe");
    }

    #[test]
    fn preserves_acronyms() {
        assert_eq!(title_case("IBM research"), "IBM Research");
        assert_eq!(title_case("head of SPV ops"), "Head of SPV Ops");
    }

    #[test]
    fn stop_words_lowered_unless_first() {
        assert_eq!(title_case("bank of america"), "Bank of America");
        assert_eq!(title_case("the hague"), "The Hague");
    }

    #[test]
    fn downcases_shouting() {
        // single mixed-case or lowercase words still get normal casing;
        // "MCDONALD" is treated as an acronym and left alone
        assert_eq!(title_case("jane DOE"), "Jane DOE");
        assert_eq!(title_case("o'brien"), "O'brien");
    }

    #[test]
    fn name_validity() {
        assert!(valid_name("Jane Doe"));
        assert!(valid_name("jane  doe  smith"));
        assert!(!valid_name("Jane"));
        assert!(!valid_name(""));
        assert!(!valid_name("   "));
    }
}
