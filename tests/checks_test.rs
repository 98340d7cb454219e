mod common;

use common::{ids, line, pt, run, run_with, square, ProjectBuilder};
use verif_infra::checks::{
    ChamberDuctChecker, ChamberFunctionChecker, ContainmentChecker, GeometryDuplicatesChecker,
    NameDuplicatesChecker, PhantomChecker, SnappingChecker,
};
use verif_infra::{Feature, FindingKind, GeometryClass, QaConfig, QaError, Remediation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cps_pass_and_incompatible_chamber() {
        let project = ProjectBuilder::new()
            .layer(
                "Chambre",
                GeometryClass::Point,
                &["NOM", "TYPE"],
                vec![
                    pt(1, 10.0, 0.0).with_attr("TYPE", "PNS1"),
                    pt(2, 20.0, 0.0).with_attr("TYPE", "XYZ"),
                ],
            )
            .layer(
                "Canalisation",
                GeometryClass::Line,
                &["NOM", "TYPE CPS"],
                vec![
                    line(1, &[(0.0, 0.0), (10.0, 0.0)]).with_attr("TYPE CPS", "CPS1"),
                    line(2, &[(30.0, 0.0), (20.0, 0.0)]).with_attr("TYPE CPS", "CPS1"),
                ],
            )
            .build();

        let report = run(&project, &ChamberDuctChecker);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.count(FindingKind::IncompatibleChamber), 1);
        assert_eq!(ids(&report, "Canalisation"), vec![2]);
        assert_eq!(ids(&report, "Chambre"), vec![2]);
    }

    #[test]
    fn test_line_with_loose_end_b() {
        let project = ProjectBuilder::new()
            .layer("Chambre", GeometryClass::Point, &["NOM"], vec![pt(1, 0.0, 0.0)])
            .layer(
                "Canalisation",
                GeometryClass::Line,
                &["NOM"],
                vec![line(5, &[(0.0, 0.0), (10.0, 0.0)]).with_attr("NOM", "C5")],
            )
            .build();

        let report = run(&project, &SnappingChecker::new(None));
        assert_eq!(report.count(FindingKind::UnconnectedEndpoint), 1);
        assert_eq!(report.count(FindingKind::IsolatedPoint), 0);
        let finding = report
            .of_kind(FindingKind::UnconnectedEndpoint)
            .next()
            .unwrap();
        assert!(finding.message.ends_with("(end B)"), "{}", finding.message);
        assert_eq!(ids(&report, "Canalisation"), vec![5]);
        assert!(ids(&report, "Chambre").is_empty());
    }

    #[test]
    fn test_snapping_tolerance_from_config() {
        let project = ProjectBuilder::new()
            .layer(
                "Chambre",
                GeometryClass::Point,
                &["NOM"],
                vec![pt(1, 0.0, 0.0), pt(2, 10.05, 0.0)],
            )
            .layer(
                "Canalisation",
                GeometryClass::Line,
                &["NOM"],
                vec![line(1, &[(0.0, 0.0), (10.0, 0.0)])],
            )
            .build();
        let mut config = QaConfig::default();
        config.snapping.tolerance = 0.1;

        let report = run_with(&project, &config, &SnappingChecker::new(None));
        assert!(report.is_clean());
    }

    #[test]
    fn test_duct_starts_at_same_position() {
        let project = ProjectBuilder::new()
            .layer(
                "Canalisation",
                GeometryClass::Line,
                &["NOM"],
                vec![
                    line(1, &[(2.0, 48.0), (2.001, 48.0)]),
                    line(2, &[(2.0, 48.0), (2.0, 48.001)]),
                    line(3, &[(2.01, 48.0), (2.02, 48.0)]),
                ],
            )
            .build();

        let report = run(&project, &GeometryDuplicatesChecker);
        assert_eq!(report.count(FindingKind::ExactDuplicate), 1);
        let dup = report.of_kind(FindingKind::ExactDuplicate).next().unwrap();
        let mut flagged: Vec<_> = dup.features.iter().map(|f| f.id).collect();
        flagged.sort_unstable();
        assert_eq!(flagged, vec![1, 2]);
        assert_eq!(ids(&report, "Canalisation"), vec![1, 2]);
    }

    fn chamber_with_two_ducts(function: &str) -> verif_infra::Project {
        ProjectBuilder::new()
            .layer(
                "Chambre",
                GeometryClass::Polygon,
                &["NOM", "FONCTION"],
                vec![square(1, 0.0, 0.0, 1.0)
                    .with_attr("NOM", "CH1")
                    .with_attr("FONCTION", function)],
            )
            .layer(
                "Canalisation",
                GeometryClass::Line,
                &["NOM", "TYPE CANAL"],
                vec![
                    line(1, &[(0.0, 0.0), (10.0, 0.0)]).with_attr("TYPE CANAL", "Distribution"),
                    line(2, &[(0.0, 0.0), (0.0, 10.0)]).with_attr("TYPE CANAL", "Distribution"),
                    line(3, &[(0.0, 0.0), (-10.0, 0.0)]).with_attr("TYPE CANAL", "Adduction Façade"),
                ],
            )
            .build()
    }

    #[test]
    fn test_departure_chamber_is_exempt() {
        let project = chamber_with_two_ducts("Chambre de départ");
        let report = run(&project, &ChamberFunctionChecker);
        assert!(report.is_clean());
    }

    #[test]
    fn test_terminal_chamber_with_two_ducts_should_be_pulling() {
        let project = chamber_with_two_ducts("Chambre de Terminaison");
        let report = run(&project, &ChamberFunctionChecker);
        assert_eq!(report.count(FindingKind::ChamberFunction), 1);
        let finding = &report.findings[0];
        assert!(finding.message.contains("Chambre de tirage"), "{}", finding.message);
        assert_eq!(ids(&report, "Chambre"), vec![1]);
        assert_eq!(ids(&report, "Canalisation"), vec![1, 2]);
    }

    #[test]
    fn test_duct_outside_trench_and_excess_trench() {
        let project = ProjectBuilder::new()
            .layer(
                "Canalisation",
                GeometryClass::Line,
                &["NOM"],
                vec![
                    line(1, &[(0.0, 0.0), (10.0, 0.0)]),
                    line(2, &[(0.0, 5.0), (10.0, 5.0)]),
                ],
            )
            .layer(
                "Tranchee",
                GeometryClass::Line,
                &["NOM"],
                vec![
                    line(1, &[(0.0, 0.0), (6.0, 0.0)]),
                    line(2, &[(6.0, 0.0), (10.0, 0.0)]),
                    line(3, &[(0.0, 9.0), (10.0, 9.0)]),
                ],
            )
            .build();

        let report = run(&project, &ContainmentChecker);
        assert_eq!(ids(&report, "Canalisation"), vec![2]);
        assert_eq!(ids(&report, "Tranchee"), vec![3]);
        assert_eq!(report.count(FindingKind::OutsideTrench), 1);
        assert_eq!(report.count(FindingKind::ExcessTrench), 1);
    }

    #[test]
    fn test_name_duplicates_offer_rename() {
        let project = ProjectBuilder::new()
            .grouped(
                "SRO",
                Some("Fibre Optique"),
                GeometryClass::Point,
                &["NOM", "ID"],
                vec![
                    pt(1, 0.0, 0.0).with_attr("NOM", "A").with_attr("ID", 1),
                    pt(2, 1.0, 0.0).with_attr("NOM", " A").with_attr("ID", 2),
                    pt(3, 2.0, 0.0).with_attr("NOM", "B").with_attr("ID", 2),
                    pt(4, 3.0, 0.0).with_attr("NOM", "C").with_attr("ID", 4),
                ],
            )
            .build();

        let report = run(&project, &NameDuplicatesChecker);
        assert_eq!(report.count(FindingKind::DuplicateName), 1);
        assert_eq!(report.count(FindingKind::DuplicateId), 1);
        assert_eq!(ids(&report, "SRO"), vec![1, 2, 3]);
        assert_eq!(report.remediation, Some(Remediation::RenameAll));
    }

    #[test]
    fn test_phantoms_only_in_listed_layers() {
        let project = ProjectBuilder::new()
            .layer(
                "Poteau",
                GeometryClass::Point,
                &["NOM"],
                vec![Feature::new(1, None), pt(2, 0.0, 0.0)],
            )
            .layer("Cable Fo", GeometryClass::Line, &["NOM"], vec![Feature::new(1, None)])
            .build();

        let report = run(&project, &PhantomChecker);
        assert_eq!(ids(&report, "Poteau"), vec![1]);
        assert!(report.selection.ids("Cable Fo").is_none());
        assert_eq!(report.remediation, Some(Remediation::DeletePhantoms));
    }

    #[test]
    fn test_missing_layer_aborts_checker() {
        let project = ProjectBuilder::new()
            .layer("Chambre", GeometryClass::Point, &["NOM"], vec![pt(1, 0.0, 0.0)])
            .build();
        let config = QaConfig::default();
        let rules = verif_infra::RuleTables::from_config(&config).unwrap();
        let err = verif_infra::Checker::run(
            &ChamberDuctChecker,
            &verif_infra::CheckContext::new(&project, &config, &rules),
        )
        .unwrap_err();
        assert!(matches!(err, QaError::MissingLayer(ref name) if name == "Canalisation"));
    }
}
