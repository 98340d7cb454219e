//! Chamber function from the number of distribution ducts ending in it

pub const DEPART: &str = "Chambre de départ";
pub const TERMINAISON: &str = "Chambre de Terminaison";
pub const TIRAGE: &str = "Chambre de tirage";
pub const RACCORDEMENT: &str = "Chambre de raccordement";

pub fn expected_function(distribution_ducts: usize) -> Option<&'static str> {
    match distribution_ducts {
        0 => None,
        1 => Some(TERMINAISON),
        2 => Some(TIRAGE),
        _ => Some(RACCORDEMENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(expected_function(0), None);
        assert_eq!(expected_function(1), Some(TERMINAISON));
        assert_eq!(expected_function(2), Some(TIRAGE));
        assert_eq!(expected_function(3), Some(RACCORDEMENT));
        assert_eq!(expected_function(7), Some(RACCORDEMENT));
    }
}
