//! Property naming rules for bound accessor methods

/// Property name bound by an accessor method
///
/// `getName` and `isActive` lose their prefix, a prefix followed by a
/// lowercase letter is kept (`island` stays `island`), and the result is
/// decapitalized.
pub fn property_name(method_name: &str) -> String {
    let stripped = ["get", "is"]
        .iter()
        .find_map(|prefix| {
            method_name
                .strip_prefix(*prefix)
                .filter(|rest| rest.chars().next().map_or(false, char::is_uppercase))
        })
        .unwrap_or(method_name);
    decapitalize(stripped)
}

/// Lowercase the first letter unless the name starts with an acronym
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => {
            let mut result: String = first.to_lowercase().collect();
            result.push_str(&name[first.len_utf8()..]);
            result
        }
        (None, _) => String::new(),
    }
}

/// Uppercase the first letter
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
