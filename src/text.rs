//! Text helpers for request naming in the collection builder.

/// Maps an HTTP method to the verb used in generated request names.
pub fn http_method_to_verb(method: &str) -> &'static str {
    match method.to_lowercase().as_str() {
        "get" => "get",
        "post" => "add",
        "put" | "patch" => "update",
        "delete" => "remove",
        _ => "",
    }
}

/// Splits a camelCase identifier into lowercase words
/// (`changePasswordByEmailToken` -> `change password by email token`).
pub fn humanize(text: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_uppercase() && !current.is_empty() {
            words.push(current.clone());
            current.clear();
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words.join(" ")
}

/// Uppercases the first letter of each whitespace-separated word.
pub fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_to_verb() {
        assert_eq!(http_method_to_verb("get"), "get");
        assert_eq!(http_method_to_verb("POST"), "add");
        assert_eq!(http_method_to_verb("put"), "update");
        assert_eq!(http_method_to_verb("patch"), "update");
        assert_eq!(http_method_to_verb("delete"), "remove");
        assert_eq!(http_method_to_verb("options"), "");
    }

    #[test]
    fn test_humanize_camel_case() {
        assert_eq!(humanize("login"), "login");
        assert_eq!(humanize("changePasswordByEmailToken"), "change password by email token");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize("content-type"), "Content-type");
        assert_eq!(capitalize("x correlation id"), "X Correlation Id");
        assert_eq!(capitalize(""), "");
    }
}
