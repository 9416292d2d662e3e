use gridusage_analyze::{
    ClassifyStatus, FailurePolicy, FileRecord, GroupBuilder, GroupCategory, GroupingError,
    PathClassifier, ReportConfig, TreeAggregator, TreeError, UsageReport, category_breakdown,
    report, sum_size,
};

fn inventory() -> Vec<FileRecord> {
    vec![
        FileRecord::new(
            "/alice/data/2015/LHC15o/000246751/ESDs/pass1/AOD/001/AliAOD.root",
            100,
            1420070400,
            "nansaf01",
        ),
        FileRecord::new(
            "/alice/data/2015/LHC15o/000246751/ESDs/pass1/AOD/002/AliAOD.root",
            200,
            1420070400,
            "nansaf02",
        ),
        FileRecord::new(
            "/alice/data/2015/LHC15o/000246751/raw/15000246751019.100.root",
            1000,
            1420070400,
            "nansaf01",
        ),
        FileRecord::new(
            "/alice/sim/2015/LHC15k1a1/244918/AOD175/0001/AliAOD.root",
            50,
            1420070400,
            "nansaf02",
        ),
        FileRecord::new(
            "/alice/cern.ch/user/j/jdoe/analysis/output.root",
            7,
            1420070400,
            "nansaf01",
        ),
        FileRecord::new("/alice/some/random/path/file.root", 3, 1420070400, "nansaf02"),
    ]
}

#[test]
fn test_classification_examples() {
    let classifier = PathClassifier::new();

    let esd = classifier.classify("/alice/data/2015/LHC15o/000246751/ESDs/pass1/AliESDs.root");
    assert_eq!(esd.period, "LHC15o");
    assert_eq!(esd.run_number, Some(246751));
    assert_eq!(esd.pass, "pass1");
    assert_eq!(esd.status, ClassifyStatus::Success);

    let user = classifier.classify("/alice/cern.ch/user/j/jdoe/analysis/output.root");
    assert_eq!(user.user, "jdoe");
    assert_eq!(user.status, ClassifyStatus::Success);

    let random = classifier.classify("/some/random/path/file.root");
    assert_eq!(random.status, ClassifyStatus::FailNoPeriod);
}

#[test]
fn test_dataset_group_keeps_insertion_order() {
    let records = inventory();
    let index = GroupBuilder::new().build_groups(&records).unwrap();

    let members = index.get("DS:LHC15o_pass1_AOD_246751").unwrap();
    assert_eq!(members.len(), 2);
    assert!(std::ptr::eq(members[0], &records[0]));
    assert!(std::ptr::eq(members[1], &records[1]));

    let summary = report(&index)
        .into_iter()
        .find(|s| s.key == "DS:LHC15o_pass1_AOD_246751")
        .unwrap();
    assert_eq!(summary.file_count, 2);
    assert_eq!(summary.total_size, 300);
}

#[test]
fn test_record_joins_every_applicable_group() {
    let records = inventory();
    let index = GroupBuilder::new().build_groups(&records).unwrap();

    let first = &records[0];
    let groups_of_first: Vec<&str> = index
        .iter()
        .filter(|(_, members)| members.iter().any(|m| std::ptr::eq(*m, first)))
        .map(|(key, _)| key)
        .collect();

    assert_eq!(
        groups_of_first,
        vec![
            "AOD:LHC15o_pass1_AOD",
            "DATATYPE:DATA",
            "DS:LHC15o_pass1_AOD_246751",
            "ESDPASS:LHC15o_pass1",
            "FILETYPE:AliAOD.root",
            "LHC15o",
            "RUN:246751",
            "SERVER:nansaf01",
        ]
    );
}

#[test]
fn test_coarse_and_fine_groups() {
    let records = inventory();
    let index = GroupBuilder::new().build_groups(&records).unwrap();

    assert_eq!(index.get("FILETYPE:RAW 2015").unwrap().len(), 1);
    assert_eq!(index.get("DATATYPE:SIM").unwrap().len(), 1);
    assert_eq!(index.get("USER:jdoe").unwrap().len(), 1);
    assert_eq!(index.get("DATATYPE:USER").unwrap().len(), 1);
    assert_eq!(index.get("AOD:LHC15k1a1_AOD175").unwrap().len(), 1);
    assert_eq!(index.get("DS:LHC15k1a1_AOD175_244918").unwrap().len(), 1);
    // raw data carries no pass: period and run only
    assert_eq!(index.get("LHC15o").unwrap().len(), 3);
    assert_eq!(index.get("ESDPASS:LHC15o_pass1").unwrap().len(), 2);

    let periods: Vec<String> = category_breakdown(&index, GroupCategory::Period)
        .into_iter()
        .map(|s| s.key)
        .collect();
    assert_eq!(periods, vec!["LHC15k1a1", "LHC15o"]);
}

#[test]
fn test_unclassified_records_stay_in_coarse_groups() {
    let records = inventory();
    let random = &records[5];
    let index = GroupBuilder::new().build_groups(&records).unwrap();

    assert_eq!(index.unclassified().len(), 1);
    assert!(std::ptr::eq(index.unclassified()[0], random));

    let holding: Vec<&str> = index
        .iter()
        .filter(|(_, members)| members.iter().any(|m| std::ptr::eq(*m, random)))
        .map(|(key, _)| key)
        .collect();
    assert_eq!(holding, vec!["FILETYPE:file.root", "SERVER:nansaf02"]);
}

#[test]
fn test_abort_policy_stops_grouping() {
    let records = inventory();
    let result = GroupBuilder::new()
        .failure_policy(FailurePolicy::Abort)
        .build_groups(&records);

    match result {
        Err(GroupingError::ClassificationFailed {
            path,
            classification,
        }) => {
            assert_eq!(path, "/alice/some/random/path/file.root");
            assert_eq!(classification.status, ClassifyStatus::FailNoPeriod);
        }
        other => panic!("expected classification failure, got {other:?}"),
    }
}

#[test]
fn test_group_sums_and_idempotence() {
    let records = inventory();
    let builder = GroupBuilder::new();

    let first = builder.build_groups(&records).unwrap();
    let second = builder.build_groups(&records).unwrap();

    for (key, members) in first.iter() {
        let expected: u64 = members.iter().map(|r| r.size).sum();
        assert_eq!(sum_size(members), expected, "{key}");
    }
    assert_eq!(report(&first), report(&second));
}

#[test]
fn test_treemap_invariants() {
    let records = inventory();
    let tree = TreeAggregator::new("/alice").build(&records).unwrap();

    let total: u64 = records.iter().map(|r| r.size).sum();
    assert_eq!(tree.total_size(), total);
    assert_eq!(tree.aggregate_size("/alice"), Some(total));

    let nodes = tree.nodes();
    let roots: Vec<_> = nodes.iter().filter(|n| n.parent.is_none()).collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].path, "/alice");
    assert_eq!(roots[0].color_weight, 1.0);

    for node in &nodes {
        if let Some(parent) = &node.parent {
            let parent_size = tree.aggregate_size(parent).unwrap();
            assert!(node.aggregate_size <= parent_size, "{}", node.path);
            assert!(node.color_weight <= 1.0);
        }
    }

    // intermediate directories without direct files are still present
    assert_eq!(tree.aggregate_size("/alice/data/2015"), Some(1300));
    assert_eq!(
        tree.aggregate_size("/alice/data/2015/LHC15o/000246751/ESDs/pass1"),
        Some(300)
    );
}

#[test]
fn test_treemap_missing_root_keeps_groups_valid() {
    let records = inventory();
    let config = ReportConfig::builder()
        .treemap_root("/nowhere")
        .build()
        .unwrap();

    assert!(matches!(
        TreeAggregator::with_config(&config).build(&records),
        Err(TreeError::MissingRoot { .. })
    ));

    let report = UsageReport::build(&records, &config).unwrap();
    assert!(!report.has_treemap());
    assert!(report.treemap.is_empty());
    assert!(!report.groups.is_empty());
    assert_eq!(report.total_files, 6);
    assert_eq!(report.unclassified_files, 1);
}
