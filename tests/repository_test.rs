// ==========================================
// ProductionDataRepository 集成测试
// ==========================================
// 覆盖: 词表查询 / 预测查询 / 参数化聚合
// ==========================================


use chrono::NaiveDate;
use garment_insight::domain::query::{DateRange, Filters, ParsedQuery};
use garment_insight::engine::QueryBuilder;
use garment_insight::repository::{ProductionDataRepository, RepositoryError};
use garment_insight::{GroupBy, Intent};
use test_helpers::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_repo() -> (tempfile::NamedTempFile, ProductionDataRepository) {
    let (tmp, db_path) = create_test_db().unwrap();
    seed_standard_dataset(&db_path).unwrap();
    let repo = ProductionDataRepository::new(&db_path).unwrap();
    (tmp, repo)
}

fn parsed(metric: Intent, filters: Filters, date_range: Option<DateRange>, group_by: GroupBy) -> ParsedQuery {
    ParsedQuery {
        metric,
        filters,
        date_range,
        group_by,
    }
}

// ==========================================
// 词表
// ==========================================

#[test]
fn test_vocabulary_queries() {
    let (_tmp, repo) = seeded_repo();

    assert_eq!(repo.distinct_buyers().unwrap(), vec!["Adidas", "Nike", "Zara"]);
    assert_eq!(
        repo.distinct_fabrics().unwrap(),
        vec!["Fleece", "Rib", "Single Jersey"]
    );
    assert_eq!(repo.max_production_date().unwrap(), Some(date(2024, 12, 31)));

    let refs = repo.recent_style_refs(3).unwrap();
    assert_eq!(refs.len(), 3);
    assert!(refs.iter().all(|s| s == "ST150" || s == "ST120"));
}

#[test]
fn test_empty_table() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = ProductionDataRepository::new(&db_path).unwrap();

    assert!(repo.distinct_buyers().unwrap().is_empty());
    assert_eq!(repo.max_production_date().unwrap(), None);
    assert_eq!(repo.cumulative_achieved("ST1").unwrap(), 0);
    assert!(repo.find_latest_snapshot("ST1").unwrap().is_none());
}

#[test]
fn test_missing_table_is_reported() {
    let (_tmp, db_path) = create_empty_db().unwrap();
    let repo = ProductionDataRepository::new(&db_path).unwrap();

    let err = repo.distinct_buyers().unwrap_err();
    assert!(matches!(err, RepositoryError::MissingTable(_)));
}

// ==========================================
// 预测查询
// ==========================================

#[test]
fn test_latest_snapshot_and_history() {
    let (_tmp, repo) = seeded_repo();

    let snapshot = repo.find_latest_snapshot("ST120").unwrap().unwrap();
    assert_eq!(snapshot.production_date, date(2024, 12, 31));
    assert_eq!(snapshot.buyer_name.as_deref(), Some("Nike"));
    assert_eq!(snapshot.order_no.as_deref(), Some("ORD-ST120"));
    assert_eq!(snapshot.day_achieved, 900);
    assert_eq!(snapshot.hourly_output, [112; 8]);
    assert_eq!(snapshot.line_no, 7);
    assert_eq!(snapshot.rework, 0);

    assert_eq!(repo.cumulative_achieved("ST120").unwrap(), 1700);
    assert_eq!(repo.cumulative_achieved("ST150").unwrap(), 3000);

    let effs = repo.recent_daily_efficiencies("ST120", 7).unwrap();
    assert_eq!(effs, vec![0.9, 0.8]);

    let effs = repo.recent_daily_efficiencies("ST120", 1).unwrap();
    assert_eq!(effs, vec![0.9]);

    // 目标为 0 的记录记 0
    let effs = repo.recent_daily_efficiencies("ST130", 7).unwrap();
    assert_eq!(effs, vec![0.0]);
}

#[test]
fn test_null_numeric_columns_read_as_zero() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "INSERT INTO production_data (style_no, production_date, order_quantity) VALUES ('ST5', '2024-06-01', 100)",
        [],
    )
    .unwrap();

    let repo = ProductionDataRepository::new(&db_path).unwrap();
    let snapshot = repo.find_latest_snapshot("ST5").unwrap().unwrap();
    assert_eq!(snapshot.day_target, 0);
    assert_eq!(snapshot.hourly_output, [0; 8]);
    assert_eq!(snapshot.planned_fabric_meters, 0.0);
    assert!(snapshot.buyer_name.is_none());
    assert_eq!(snapshot.daily_efficiency(), 0.0);
}

// ==========================================
// 参数化聚合
// ==========================================

#[test]
fn test_metric_query_with_all_filters() {
    let (_tmp, repo) = seeded_repo();

    let filters = Filters {
        buyer_name: Some("Adidas".to_string()),
        style_no: Some("ST150".to_string()),
        line_no: Some(3),
        fabric_type: Some("Rib".to_string()),
    };
    let query = QueryBuilder::new().build(&parsed(
        Intent::Rejection,
        filters,
        Some(DateRange::new(date(2024, 12, 30), date(2024, 12, 31))),
        GroupBy::None,
    ));

    assert_eq!(query.placeholder_count(), query.params.len());
    assert_eq!(query.params.len(), 6);

    let rows = repo.run_metric_query(&query).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, 10.0);
}

#[test]
fn test_metric_query_grouped_by_date() {
    let (_tmp, repo) = seeded_repo();

    let query = QueryBuilder::new().build(&parsed(
        Intent::TargetGap,
        Filters::default(),
        Some(DateRange::new(date(2024, 12, 29), date(2024, 12, 31))),
        GroupBy::Date,
    ));

    let rows = repo.run_metric_query(&query).unwrap();
    let dates: Vec<NaiveDate> = rows.iter().filter_map(|r| r.production_date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 12, 29), date(2024, 12, 30), date(2024, 12, 31)]
    );
    let gaps: Vec<f64> = rows.iter().map(|r| r.value).collect();
    assert_eq!(gaps, vec![0.0, 200.0, 100.0]);
}

#[test]
fn test_metric_query_drops_null_aggregate() {
    let (_tmp, repo) = seeded_repo();

    let query = QueryBuilder::new().build(&parsed(
        Intent::Production,
        Filters {
            buyer_name: Some("Nobody".to_string()),
            ..Default::default()
        },
        None,
        GroupBy::None,
    ));

    assert!(repo.run_metric_query(&query).unwrap().is_empty());
}

#[test]
fn test_metric_values_are_not_interpolated() {
    let (_tmp, repo) = seeded_repo();

    let hostile = "Nike' OR '1'='1";
    let query = QueryBuilder::new().build(&parsed(
        Intent::Production,
        Filters {
            buyer_name: Some(hostile.to_string()),
            ..Default::default()
        },
        None,
        GroupBy::None,
    ));

    assert!(!query.sql.contains(hostile));
    assert!(repo.run_metric_query(&query).unwrap().is_empty());
}
