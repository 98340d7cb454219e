//! Support line types and the endpoints each type requires

pub const AERIEN: &str = "aérien";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportRequirement {
    /// Both ends on technical points whose TYPE contains the keyword
    TechnicalPoints(&'static str),
    /// Pole to pole, or pole to technical point
    Aerial,
}

/// Declared support type → requirement. Keys are kept as written in the
/// source data ("Saut de façade" is capitalised unlike the others).
pub const SUPPORT_RULES: &[(&str, SupportRequirement)] = &[
    ("façade", SupportRequirement::TechnicalPoints("façade")),
    ("immeuble", SupportRequirement::TechnicalPoints("immeuble")),
    ("Saut de façade", SupportRequirement::TechnicalPoints("point façade")),
    (AERIEN, SupportRequirement::Aerial),
];

/// Rule for a trimmed declared type. Lowercase keys accept any case;
/// a capitalised key only matches as written.
pub fn support_rule(declared: &str) -> Option<SupportRequirement> {
    let lower = declared.to_lowercase();
    SUPPORT_RULES
        .iter()
        .find(|(key, _)| {
            if key.chars().any(char::is_uppercase) {
                *key == declared
            } else {
                *key == lower
            }
        })
        .map(|(_, rule)| *rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(support_rule("Aérien"), Some(SupportRequirement::Aerial));
        assert_eq!(
            support_rule("Saut de façade"),
            Some(SupportRequirement::TechnicalPoints("point façade"))
        );
        assert_eq!(support_rule("saut de façade"), None);
        assert_eq!(support_rule("SAUT DE FAÇADE"), None);
        assert_eq!(support_rule("souterrain"), None);
    }
}
