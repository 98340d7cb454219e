//! Duct CPS type → chamber types it may terminate at

use indexmap::IndexMap;
use std::collections::BTreeSet;

pub type CpsTable = IndexMap<String, BTreeSet<String>>;

const CANIVEAUX: &[&str] = &["CANIVEAU TYPE A", "CANIVEAU TYPE B"];
const CANIVEAUX_MIXED_CASE: &[&str] = &["Caniveau type A", "Caniveau type B"];
const PNS1: &[&str] = &["PNS1"];
const FROM_PNS2: &[&str] = &["PNS2", "PNS2C", "PN2"];
const FROM_PNS3: &[&str] = &[
    "PNS3", "PNS3C", "PNS3L", "PNS3LC", "PN3", "PN3 TER", "PNP4", "PNP4C", "PNP4L", "PNP4LC",
];
const FROM_PNP5: &[&str] = &["PNP5", "PNP5C", "PNP5L", "PNP5LC", "PNP6", "PNP6C"];

fn chambers(parts: &[&[&str]]) -> BTreeSet<String> {
    parts
        .iter()
        .flat_map(|p| p.iter())
        .map(|s| s.to_string())
        .collect()
}

/// Built-in compatibility table. Chamber codes are compared verbatim,
/// including the mixed-case caniveau codes used by the "Buse" ducts.
pub fn default_cps_table() -> CpsTable {
    let mut table = CpsTable::new();

    let all = chambers(&[CANIVEAUX, PNS1, FROM_PNS2, FROM_PNS3, FROM_PNP5]);
    for code in ["CPS1", "CPS1M", "CPS1L"] {
        table.insert(code.to_string(), all.clone());
    }

    let from_caniveau_b = chambers(&[&CANIVEAUX[1..], PNS1, FROM_PNS2, FROM_PNS3, FROM_PNP5]);
    for code in ["CPS2", "CPS2M", "CPS2L"] {
        table.insert(code.to_string(), from_caniveau_b.clone());
    }

    let from_pns2 = chambers(&[FROM_PNS2, FROM_PNS3, FROM_PNP5]);
    for code in ["CPS4", "CPS4L", "CPS4LBis", "CPS4M", "CPS6", "CPS6L", "CPS6M"] {
        table.insert(code.to_string(), from_pns2.clone());
    }

    let from_pns3 = chambers(&[FROM_PNS3, FROM_PNP5]);
    for code in [
        "CPP9", "CPP9AC", "CPP9Bis", "CPP12", "CPP12A.L", "CPP12A.M", "CPP15B.L", "CPP15B.M",
    ] {
        table.insert(code.to_string(), from_pns3.clone());
    }

    let from_pnp5 = chambers(&[FROM_PNP5]);
    for code in [
        "CPP20", "CPP20B.L", "CPP20B.M", "CPP25", "CPP25B.L", "CPP25B.M", "CPP30", "CPP30B.L",
        "CPP30B.M", "CPP35", "CPP35B.L", "CPP35B.M", "CPP42", "CPP42B.L", "CPP42B.M", "CPP49",
        "CPP49B.L", "CPP49B.M",
    ] {
        table.insert(code.to_string(), from_pnp5.clone());
    }

    let buses = chambers(&[CANIVEAUX_MIXED_CASE, PNS1, FROM_PNS2, FROM_PNS3, FROM_PNP5]);
    for code in ["Buse de 10", "Buse de 15", "Buse de 20", "Buse de 30"] {
        table.insert(code.to_string(), buses.clone());
    }

    // Same range as CPP9, which Basement 5 replaced in the field
    table.insert("Basement 5".to_string(), from_pns3);

    table
}

/// Two trench/duct category codes match when equal, or when one is the
/// other with a single trailing 'C'. Inputs are expected normalised.
pub fn categories_compatible(duct: &str, trench: &str) -> bool {
    if duct == trench {
        return true;
    }
    duct.strip_suffix('C') == Some(trench) || trench.strip_suffix('C') == Some(duct)
}

/// Trim and uppercase a category code
pub fn normalize_code(code: Option<&str>) -> String {
    code.map(|c| c.trim().to_uppercase()).unwrap_or_default()
}
