//! Expected duct category from the entities at both ends

use super::names::{CHAMBRE, POINT_TECHNIQUE, POTEAU, SITE};
use std::fmt;

pub const DISTRIBUTION: &str = "Distribution";
pub const ADDUCTION_FACADE: &str = "Adduction Façade";
pub const ADDUCTION_IMMEUBLE: &str = "Adduction Immeuble";
pub const ADDUCTION_AERIEN: &str = "Adduction Aérien";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Chamber,
    TechnicalPoint,
    Pole,
    Site,
    Unknown,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Chamber => CHAMBRE,
            EntityKind::TechnicalPoint => POINT_TECHNIQUE,
            EntityKind::Pole => POTEAU,
            EntityKind::Site => SITE,
            EntityKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layers tested for a duct endpoint, first match wins
pub const CONNECTION_PRIORITY: &[(EntityKind, &str)] = &[
    (EntityKind::Chamber, CHAMBRE),
    (EntityKind::TechnicalPoint, POINT_TECHNIQUE),
    (EntityKind::Pole, POTEAU),
    (EntityKind::Site, SITE),
];

/// Resolved duct endpoint; `subtype` is the technical point TYPE
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub kind: EntityKind,
    pub subtype: Option<String>,
}

impl Endpoint {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            subtype: None,
        }
    }

    pub fn with_subtype(kind: EntityKind, subtype: Option<String>) -> Self {
        Self { kind, subtype }
    }
}

fn is_pair(a: EntityKind, b: EntityKind, x: EntityKind, y: EntityKind) -> bool {
    (a == x && b == y) || (a == y && b == x)
}

/// Expected duct category, or `None` for a connection pattern with no rule
pub fn expected_duct_category(a: &Endpoint, b: &Endpoint) -> Option<&'static str> {
    use EntityKind::*;

    if a.kind == Chamber && b.kind == Chamber {
        return Some(DISTRIBUTION);
    }
    if is_pair(a.kind, b.kind, Chamber, TechnicalPoint) {
        // Both ends are inspected; a later match overrides an earlier one
        let mut expected = None;
        for subtype in [&a.subtype, &b.subtype] {
            let hint = subtype.as_deref().unwrap_or_default().to_lowercase();
            if hint.contains("façade") {
                expected = Some(ADDUCTION_FACADE);
            } else if hint.contains("immeuble") {
                expected = Some(ADDUCTION_IMMEUBLE);
            } else if hint.contains("armoire") {
                expected = Some(DISTRIBUTION);
            }
        }
        return expected;
    }
    if is_pair(a.kind, b.kind, Chamber, Pole) {
        return Some(ADDUCTION_AERIEN);
    }
    if is_pair(a.kind, b.kind, Chamber, Site) {
        return Some(DISTRIBUTION);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chamber_to_chamber_is_distribution() {
        let c = Endpoint::new(EntityKind::Chamber);
        assert_eq!(expected_duct_category(&c, &c), Some(DISTRIBUTION));
    }

    #[test]
    fn test_technical_point_subtypes() {
        let c = Endpoint::new(EntityKind::Chamber);
        let facade = Endpoint::with_subtype(EntityKind::TechnicalPoint, Some("Point Façade".into()));
        let immeuble = Endpoint::with_subtype(EntityKind::TechnicalPoint, Some("adduction immeuble".into()));
        let armoire = Endpoint::with_subtype(EntityKind::TechnicalPoint, Some("adduction armoire".into()));
        let other = Endpoint::with_subtype(EntityKind::TechnicalPoint, Some("adduction site".into()));

        assert_eq!(expected_duct_category(&facade, &c), Some(ADDUCTION_FACADE));
        assert_eq!(expected_duct_category(&c, &immeuble), Some(ADDUCTION_IMMEUBLE));
        assert_eq!(expected_duct_category(&c, &armoire), Some(DISTRIBUTION));
        assert_eq!(expected_duct_category(&c, &other), None);
    }

    #[test]
    fn test_other_patterns() {
        let c = Endpoint::new(EntityKind::Chamber);
        assert_eq!(expected_duct_category(&Endpoint::new(EntityKind::Pole), &c), Some(ADDUCTION_AERIEN));
        assert_eq!(expected_duct_category(&c, &Endpoint::new(EntityKind::Site)), Some(DISTRIBUTION));
        assert_eq!(expected_duct_category(&c, &Endpoint::new(EntityKind::Unknown)), None);
        assert_eq!(
            expected_duct_category(&Endpoint::new(EntityKind::Pole), &Endpoint::new(EntityKind::Pole)),
            None
        );
    }
}
