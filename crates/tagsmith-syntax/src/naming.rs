//! Naming and wording helpers shared by schemas and error messages.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name pattern"));

const CARDINALS: [&str; 11] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

const ORDINALS: [&str; 9] = [
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
];

/// Returns `true` if `name` can be used as an argument or tag name.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Strips the trailing underscores used to dodge reserved words
/// (`as_` -> `as`, `with_` -> `with`).
pub fn unescape_key(key: &str) -> &str {
    key.trim_end_matches('_')
}

/// Derives a tag name from a Rust type name.
///
/// `KeywordNoDefaultTag` becomes `keyword_no_default`; module paths and
/// generic parameters are ignored.
pub fn tag_name_from_type(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let base = base.rsplit("::").next().unwrap_or(base);

    let chars: Vec<char> = base.chars().collect();
    let mut name = String::with_capacity(base.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let after_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let before_lower = chars.get(i + 1).is_some_and(|next| !next.is_ascii_uppercase());
            if after_lower || before_lower {
                name.push('_');
            }
        }
        name.push(ch.to_ascii_lowercase());
    }

    let name = name.trim_matches('_');
    name.strip_suffix("_tag").unwrap_or(name).to_string()
}

/// Spells out 0 through 10, digits above that.
pub fn cardinal(n: usize) -> String {
    CARDINALS
        .get(n)
        .map(|s| s.to_string())
        .unwrap_or_else(|| n.to_string())
}

/// `first` through `ninth`, then `10th`, `11th`, `21st`, ...
///
/// Returns `None` for zero.
pub fn ordinal(n: usize) -> Option<String> {
    if n == 0 {
        return None;
    }
    if let Some(word) = ORDINALS.get(n - 1) {
        return Some(word.to_string());
    }
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    Some(format!("{}{}", n, suffix))
}

pub fn pluralize(singular: &str, quantity: usize) -> String {
    if quantity == 1 {
        singular.to_string()
    } else {
        format!("{}s", singular)
    }
}

/// `verbose_quantity("argument", 2)` -> `"two arguments"`.
pub fn verbose_quantity(singular: &str, quantity: usize) -> String {
    format!("{} {}", cardinal(quantity), pluralize(singular, quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_from_types() {
        assert_eq!(tag_name_from_type("KeywordNoDefaultTag"), "keyword_no_default");
        assert_eq!(tag_name_from_type("NoArgumentTag"), "no_argument");
        assert_eq!(tag_name_from_type("Constant"), "constant");
        assert_eq!(tag_name_from_type("my_crate::tags::PositionalMixed"), "positional_mixed");
        assert_eq!(tag_name_from_type("HTMLParserTag"), "html_parser");
    }

    #[test]
    fn unescape_reserved_keys() {
        assert_eq!(unescape_key("as_"), "as");
        assert_eq!(unescape_key("name_"), "name");
        assert_eq!(unescape_key("limit"), "limit");
        assert_eq!(unescape_key("_"), "");
    }

    #[test]
    fn wording() {
        assert_eq!(cardinal(0), "zero");
        assert_eq!(cardinal(10), "ten");
        assert_eq!(cardinal(11), "11");
        assert_eq!(ordinal(0), None);
        assert_eq!(ordinal(3).as_deref(), Some("third"));
        assert_eq!(ordinal(11).as_deref(), Some("11th"));
        assert_eq!(ordinal(22).as_deref(), Some("22nd"));
        assert_eq!(ordinal(101).as_deref(), Some("101st"));
        assert_eq!(verbose_quantity("argument", 1), "one argument");
        assert_eq!(verbose_quantity("argument", 0), "zero arguments");
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name("limit"));
        assert!(is_valid_name("single_arg"));
        assert!(!is_valid_name("1st"));
        assert!(!is_valid_name("a-b"));
        assert!(!is_valid_name(""));
    }
}
