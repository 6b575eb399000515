//! Cleanup for name and identifier fields.
//!
//! These fields have no canonical form beyond whitespace and label
//! hygiene, so cleanup never fails; validation decides afterwards
//! whether anything useful is left.

/// Label prefixes the extraction collaborator sometimes leaves attached
/// to party names.
const NAME_PREFIXES: [&str; 6] = [
    "vendor:",
    "customer:",
    "bill to:",
    "ship to:",
    "from:",
    "to:",
];

/// Clean an identifier field (invoice number).
pub fn clean_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    collapsed
        .trim_matches(|c| matches!(c, '.' | ',' | ';' | ':'))
        .trim()
        .to_string()
}

/// Clean a party name field (vendor or customer).
pub fn clean_name(name: &str) -> String {
    let mut name = collapse_whitespace(name);

    for prefix in NAME_PREFIXES {
        if name.len() > prefix.len()
            && name.is_char_boundary(prefix.len())
            && name[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            name = name[prefix.len()..].trim().to_string();
            break;
        }
    }

    // Shouty OCR output reads better title-cased; short all-caps strings
    // are likely acronyms and stay untouched.
    if name.len() > 5 && is_all_caps(&name) {
        name = title_case(&name);
    }

    name
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_all_caps(s: &str) -> bool {
    s.chars().any(|c| c.is_alphabetic()) && !s.chars().any(|c| c.is_lowercase())
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
