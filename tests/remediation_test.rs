mod common;

use common::{line, pt, run, ProjectBuilder};
use verif_infra::checks::{NullValuesChecker, PhantomChecker};
use verif_infra::remediation::{delete_phantoms, fill_missing, rename_all};
use verif_infra::{AttrValue, Feature, FindingKind, GeometryClass, Project, QaConfig};

fn fillable_project() -> Project {
    ProjectBuilder::new()
        .layer(
            "Chambre",
            GeometryClass::Point,
            &["REP", "PROJET", "COMMENTAIRE"],
            vec![
                pt(1, 0.0, 0.0).with_attr("REP", "X").with_attr("PROJET", "P1"),
                pt(2, 1.0, 0.0).with_attr("REP", "X").with_attr("PROJET", "null"),
                pt(3, 2.0, 0.0).with_attr("REP", "Y").with_attr("PROJET", "P1"),
                pt(4, 3.0, 0.0)
                    .with_attr("REP", AttrValue::Null)
                    .with_attr("PROJET", "P1"),
            ],
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_fill_takes_most_frequent_value() {
        let mut project = fillable_project();
        let config = QaConfig::default();
        let nulls = run(&project, &NullValuesChecker);

        let report = fill_missing(&mut project, &config, &nulls).unwrap();
        assert!(report.is_success());
        assert_eq!(report.applied.get("Chambre"), Some(&2));

        let chambre = project.layer("Chambre").unwrap();
        assert_eq!(chambre.feature(4).unwrap().text("REP").as_deref(), Some("X"));
        assert_eq!(chambre.feature(2).unwrap().text("PROJET").as_deref(), Some("P1"));
        // Not fillable: left empty
        assert!(chambre.feature(1).unwrap().attr("COMMENTAIRE").is_null());
    }

    #[test]
    fn test_fill_leaves_no_fillable_gap() {
        let mut project = fillable_project();
        let config = QaConfig::default();
        let nulls = run(&project, &NullValuesChecker);
        fill_missing(&mut project, &config, &nulls).unwrap();

        let again = run(&project, &NullValuesChecker);
        let remaining: Vec<_> = again
            .of_kind(FindingKind::MissingValue)
            .filter_map(|f| f.attribute.as_deref())
            .collect();
        assert_eq!(remaining, vec!["COMMENTAIRE"]);
        assert_eq!(again.remediation, None);

        // Nothing left to fill
        let second = fill_missing(&mut project, &config, &again).unwrap();
        assert_eq!(second.total_applied(), 0);
    }

    #[test]
    fn test_delete_phantoms_after_check() {
        let mut project = ProjectBuilder::new()
            .layer(
                "Chambre",
                GeometryClass::Point,
                &["NOM"],
                vec![pt(1, 0.0, 0.0), Feature::new(2, None)],
            )
            .layer(
                "Tranchee",
                GeometryClass::Line,
                &["NOM"],
                vec![
                    line(1, &[(0.0, 0.0), (0.0, 0.0)]),
                    line(2, &[(0.0, 0.0), (1.0, 0.0)]),
                ],
            )
            .build();

        let phantoms = run(&project, &PhantomChecker);
        let report = delete_phantoms(&mut project, &phantoms).unwrap();
        assert_eq!(report.total_applied(), 2);

        assert_eq!(project.layer("Chambre").unwrap().len(), 1);
        let trenches = project.layer("Tranchee").unwrap();
        assert!(trenches.feature(1).is_none());
        assert!(trenches.feature(2).is_some());
        assert!(run(&project, &PhantomChecker).is_clean());
    }

    #[test]
    fn test_rename_builds_line_names_from_new_point_names() {
        let mut project = ProjectBuilder::new()
            .layer(
                "Chambre",
                GeometryClass::Point,
                &["id", "NOM"],
                vec![pt(10, 0.0, 0.0), pt(11, 10.0, 0.0)],
            )
            .layer(
                "Point GC",
                GeometryClass::Point,
                &["id"],
                vec![pt(1, 20.0, 0.0).with_attr("id", "GC7")],
            )
            .layer(
                "Tranchee",
                GeometryClass::Line,
                &["id", "NOM"],
                vec![
                    line(1, &[(0.0, 0.0), (10.0, 0.0)]),
                    line(2, &[(10.0, 0.0), (20.0, 0.0)]),
                    line(3, &[(10.0, 0.0), (10.0, 0.0001), (10.0, 0.0)]),
                ],
            )
            .build();

        let report = rename_all(&mut project, "ZR9").unwrap();

        let chambre = project.layer("Chambre").unwrap();
        assert_eq!(chambre.feature(10).unwrap().text("NOM").as_deref(), Some("ZR9-Cham_00001"));
        assert_eq!(chambre.feature(11).unwrap().text("NOM").as_deref(), Some("ZR9-Cham_00002"));

        let trenches = project.layer("Tranchee").unwrap();
        assert_eq!(
            trenches.feature(1).unwrap().text("NOM").as_deref(),
            Some("Tran_ZR9-Cham_00001-ZR9-Cham_00002")
        );
        assert_eq!(
            trenches.feature(2).unwrap().text("NOM").as_deref(),
            Some("Tran_ZR9-Cham_00002-GC7")
        );
        // Same chamber at both ends: not renamed, not an error
        assert!(trenches.feature(3).unwrap().attr("NOM").is_null());
        assert_eq!(trenches.feature(3).unwrap().text("id").as_deref(), Some("3"));
        assert!(report.failed.is_empty());
        assert!(report.is_success());
    }
}
