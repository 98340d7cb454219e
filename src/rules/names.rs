//! Layer, group and attribute names of the network data model

pub const INFRASTRUCTURE: &str = "Infrastructure";
pub const CUIVRE: &str = "Cuivre";
pub const FIBRE_OPTIQUE: &str = "Fibre Optique";

pub const CHAMBRE: &str = "Chambre";
pub const CANALISATION: &str = "Canalisation";
pub const TRANCHEE: &str = "Tranchee";
pub const POTEAU: &str = "Poteau";
pub const POINT_TECHNIQUE: &str = "Point Technique";
pub const POINT_GC: &str = "Point GC";
pub const SITE: &str = "Site";
pub const SUPPORT: &str = "Support";
pub const BATIMENT: &str = "Batiment";

pub const NOM: &str = "NOM";
pub const TYPE: &str = "TYPE";
pub const TYPE_CANAL: &str = "TYPE CANAL";
pub const TYPE_CPS: &str = "TYPE CPS";
pub const TYPE_TRANC: &str = "TYPE TRANC";
pub const FONCTION: &str = "FONCTION";
/// Business id field written by the rename action
pub const ID: &str = "id";

/// Point and line layers cross-checked by the endpoint connectivity rule
#[derive(Debug, Clone, Copy)]
pub struct SnapGroup {
    pub name: &'static str,
    pub points: &'static [&'static str],
    pub lines: &'static [&'static str],
}

pub const SNAP_GROUPS: &[SnapGroup] = &[
    SnapGroup {
        name: INFRASTRUCTURE,
        points: &[CHAMBRE, POINT_TECHNIQUE, POTEAU, POINT_GC, SITE],
        lines: &[CANALISATION, SUPPORT, TRANCHEE],
    },
    SnapGroup {
        name: CUIVRE,
        points: &["SR", "Manchon", "PC"],
        lines: &["Cable Cuivre"],
    },
    SnapGroup {
        name: FIBRE_OPTIQUE,
        points: &["SRO", "Closer", "BPE", "PCO"],
        lines: &["Cable Fo"],
    },
];

pub fn snap_group(name: &str) -> Option<&'static SnapGroup> {
    SNAP_GROUPS.iter().find(|g| g.name == name)
}

/// Expected layers per group for the feature-count report
pub const SANITY_GROUPS: &[(&str, &[&str])] = &[
    (
        INFRASTRUCTURE,
        &[CANALISATION, CHAMBRE, POINT_TECHNIQUE, POTEAU, POINT_GC, SITE, BATIMENT],
    ),
    (CUIVRE, &["Cable Cuivre", "SR", "Manchon", "PC"]),
    (FIBRE_OPTIQUE, &["Cable Fo", "SRO", "Closer", "BPE", "PCO"]),
];

pub fn sanity_group(name: &str) -> Option<&'static [&'static str]> {
    SANITY_GROUPS
        .iter()
        .find(|(g, _)| *g == name)
        .map(|(_, layers)| *layers)
}
