use std::borrow::Cow;

/// Traffic categories the classifier was trained on, keyed by class id.
pub const LABELS: [(i64, &str); 5] = [
    (0, "Streaming"),
    (1, "Secure"),
    (2, "DNS"),
    (3, "Web"),
    (4, "Other"),
];

/// Resolves a predicted class id to its label, or `Class <id>` when unmapped.
pub fn label_for(class: i64) -> Cow<'static, str> {
    LABELS
        .iter()
        .find(|(id, _)| *id == class)
        .map(|(_, label)| Cow::Borrowed(*label))
        .unwrap_or_else(|| Cow::Owned(format!("Class {}", class)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(label_for(0), "Streaming");
        assert_eq!(label_for(1), "Secure");
        assert_eq!(label_for(2), "DNS");
        assert_eq!(label_for(3), "Web");
        assert_eq!(label_for(4), "Other");
    }

    #[test]
    fn test_unknown_label_fallback() {
        assert_eq!(label_for(7), "Class 7");
        assert_eq!(label_for(-1), "Class -1");
    }
}
