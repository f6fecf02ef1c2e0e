use regex::Regex;

/// Finds template placeholders: `{name}` and docxtpl-style `{{ name }}`.
#[derive(Debug, Clone)]
pub struct PlaceholderScanner {
    pattern: Regex,
}

impl PlaceholderScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\{\{\s*([^{}\s][^{}]*?)\s*\}\}|\{\s*([^{}\s][^{}]*?)\s*\}")
                .expect("placeholder pattern is a valid regex"),
        }
    }

    /// Unique placeholder names in order of first occurrence.
    pub fn scan(&self, text: &str) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let name = name.as_str();
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        }

        fields
    }
}

impl Default for PlaceholderScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let text = "Dear {buyer_name}, your order {order_id} is ready. {buyer_name} thanks you.";
        assert_eq!(PlaceholderScanner::new().scan(text), vec!["buyer_name", "order_id"]);
    }

    #[test]
    fn test_jinja_style_and_whitespace() {
        let text = "Contract {{ contract_number }} of { date } for {{buyer}}";
        assert_eq!(
            PlaceholderScanner::new().scan(text),
            vec!["contract_number", "date", "buyer"]
        );
    }

    #[test]
    fn test_no_placeholders() {
        assert!(PlaceholderScanner::new().scan("plain text, {} and { }").is_empty());
    }
}
