//! Query Execution Tests
//!
//! End-to-end tests through `QueryEngine` over on-disk datasets:
//! - Filtering, projection, and ordering
//! - Grouping and aggregation
//! - The match cap, applied before grouping
//! - Repeatable output

use campusdb::api::{ApiErrorCode, QueryEngine};
use campusdb::dataset::DatasetKind;
use campusdb::executor::{Row, MAX_MATCHED_RECORDS};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn section(dept: &str, id: &str, avg: f64, audit: u32, year: &str) -> Value {
    json!({
        "Subject": dept,
        "Course": id,
        "Professor": "lee, ann",
        "Title": format!("{} {}", dept, id),
        "id": format!("{}{}{}", dept, id, year),
        "Avg": avg,
        "Pass": 40,
        "Fail": 3,
        "Audit": audit,
        "Year": year,
        "Section": "001"
    })
}

fn room(shortname: &str, number: &str, seats: u32, furniture: &str) -> Value {
    json!({
        "fullname": format!("{} Building", shortname),
        "shortname": shortname,
        "number": number,
        "name": format!("{}_{}", shortname, number),
        "address": "2329 West Mall",
        "type": "Small Group",
        "furniture": furniture,
        "href": format!("http://example.org/{}-{}", shortname, number),
        "lat": 49.26,
        "lon": -123.25,
        "seats": seats
    })
}

fn engine_with(temp_dir: &TempDir, id: &str, kind: DatasetKind, records: &[Value]) -> QueryEngine {
    let mut engine = QueryEngine::open(temp_dir.path()).unwrap();
    engine.add_dataset(id, kind, records).unwrap();
    engine
}

fn to_json(rows: &[Row]) -> Value {
    Value::Array(rows.iter().map(Row::to_json).collect())
}

// =============================================================================
// Filter and Order Tests
// =============================================================================

/// GT filter with ascending order on the numeric column.
#[test]
fn test_filter_and_order() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "courses",
        DatasetKind::Courses,
        &[
            section("math", "527", 99.78, 0, "2009"),
            section("cnps", "574", 99.19, 0, "2012"),
            section("cpsc", "110", 72.5, 0, "2014"),
            section("math", "527", 99.78, 0, "2010"),
        ],
    );

    let rows = engine
        .perform_query(&json!({
            "WHERE": {"GT": {"courses_avg": 90}},
            "OPTIONS": {
                "COLUMNS": ["courses_dept", "courses_avg"],
                "ORDER": "courses_avg"
            }
        }))
        .unwrap();

    assert_eq!(
        to_json(&rows),
        json!([
            {"courses_dept": "cnps", "courses_avg": 99.19},
            {"courses_dept": "math", "courses_avg": 99.78},
            {"courses_dept": "math", "courses_avg": 99.78}
        ])
    );
}

/// Empty WHERE returns every record of the dataset.
#[test]
fn test_empty_where_returns_everything() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "ubc",
        DatasetKind::Rooms,
        &[
            room("DMP", "110", 120, "Classroom-Fixed Tablets"),
            room("DMP", "201", 40, "Classroom-Movable Tables & Chairs"),
            room("WOOD", "1", 120, "Classroom-Fixed Tables/Fixed Chairs"),
        ],
    );

    let rows = engine
        .perform_query(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["ubc_name"]}
        }))
        .unwrap();

    let mut names: Vec<String> = rows
        .iter()
        .map(|r| r.get("ubc_name").and_then(|v| v.as_str()).unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["DMP_110", "DMP_201", "WOOD_1"]);
}

/// Wildcards, NOT, and multi-key DOWN ordering.
#[test]
fn test_wildcards_and_multi_key_order() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "ubc",
        DatasetKind::Rooms,
        &[
            room("DMP", "110", 120, "Classroom-Fixed Tablets"),
            room("DMP", "201", 40, "Classroom-Movable Tables & Chairs"),
            room("WOOD", "1", 120, "Classroom-Fixed Tables/Fixed Chairs"),
            room("ANGU", "98", 260, "Classroom-Fixed Tables/Movable Chairs"),
        ],
    );

    let rows = engine
        .perform_query(&json!({
            "WHERE": {"AND": [
                {"IS": {"ubc_furniture": "*Tables*"}},
                {"NOT": {"IS": {"ubc_shortname": "ANG*"}}}
            ]},
            "OPTIONS": {
                "COLUMNS": ["ubc_name", "ubc_seats"],
                "ORDER": {"dir": "DOWN", "keys": ["ubc_seats", "ubc_name"]}
            }
        }))
        .unwrap();

    assert_eq!(
        to_json(&rows),
        json!([
            {"ubc_name": "WOOD_1", "ubc_seats": 120},
            {"ubc_name": "DMP_201", "ubc_seats": 40}
        ])
    );
}

// =============================================================================
// Transformation Tests
// =============================================================================

/// MAX per group of rooms sharing a shortname.
#[test]
fn test_group_max_seats() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "rooms",
        DatasetKind::Rooms,
        &[
            room("DMP", "101", 50, "Classroom-Fixed Tablets"),
            room("DMP", "110", 80, "Classroom-Fixed Tablets"),
        ],
    );

    let rows = engine
        .perform_query(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["rooms_shortname", "maxSeats"]},
            "TRANSFORMATIONS": {
                "GROUP": ["rooms_shortname"],
                "APPLY": [{"maxSeats": {"MAX": "rooms_seats"}}]
            }
        }))
        .unwrap();

    assert_eq!(
        to_json(&rows),
        json!([{"rooms_shortname": "DMP", "maxSeats": 80}])
    );
}

/// AVG over 0, 1, 2 is exactly 1.
#[test]
fn test_average_audit() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "courses",
        DatasetKind::Courses,
        &[
            section("cpsc", "310", 80.0, 0, "2015"),
            section("cpsc", "310", 81.0, 1, "2016"),
            section("cpsc", "310", 82.0, 2, "2017"),
        ],
    );

    let rows = engine
        .perform_query(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_id", "overallAvgAudit"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_id"],
                "APPLY": [{"overallAvgAudit": {"AVG": "courses_audit"}}]
            }
        }))
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("overallAvgAudit").and_then(|v| v.as_f64()), Some(1.0));
}

/// Projected columns are exactly the GROUP and APPLY names requested.
#[test]
fn test_transformed_columns_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "courses",
        DatasetKind::Courses,
        &[
            section("cpsc", "310", 80.0, 0, "2015"),
            section("cpsc", "310", 90.0, 0, "2016"),
            section("math", "100", 60.0, 0, "2015"),
        ],
    );

    let rows = engine
        .perform_query(&json!({
            "WHERE": {},
            "OPTIONS": {
                "COLUMNS": ["courses_dept", "courses_id", "total", "sections", "lowest"],
                "ORDER": {"dir": "UP", "keys": ["courses_dept"]}
            },
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept", "courses_id"],
                "APPLY": [
                    {"total": {"SUM": "courses_avg"}},
                    {"sections": {"COUNT": "courses_year"}},
                    {"lowest": {"MIN": "courses_avg"}}
                ]
            }
        }))
        .unwrap();

    assert_eq!(
        to_json(&rows),
        json!([
            {"courses_dept": "cpsc", "courses_id": "310", "total": 170, "sections": 2, "lowest": 80},
            {"courses_dept": "math", "courses_id": "100", "total": 60, "sections": 1, "lowest": 60}
        ])
    );
    for row in &rows {
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(
            columns,
            vec!["courses_dept", "courses_id", "total", "sections", "lowest"]
        );
    }
}

// =============================================================================
// Match Cap Tests
// =============================================================================

fn numbered_sections(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| section("cpsc", "100", i as f64, 0, "2015"))
        .collect()
}

/// Exactly the cap succeeds, one more fails, and grouping does not help.
#[test]
fn test_match_cap_boundary() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "big",
        DatasetKind::Courses,
        &numbered_sections(MAX_MATCHED_RECORDS + 1),
    );

    let at_cap = engine
        .perform_query(&json!({
            "WHERE": {"GT": {"big_avg": 0}},
            "OPTIONS": {"COLUMNS": ["big_avg"]}
        }))
        .unwrap();
    assert_eq!(at_cap.len(), MAX_MATCHED_RECORDS);

    let over_cap = engine
        .perform_query(&json!({
            "WHERE": {"GT": {"big_avg": -1}},
            "OPTIONS": {"COLUMNS": ["big_avg"]}
        }))
        .unwrap_err();
    assert_eq!(over_cap.code(), ApiErrorCode::CampusResultTooLarge);

    let grouped = engine
        .perform_query(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["big_dept", "n"]},
            "TRANSFORMATIONS": {
                "GROUP": ["big_dept"],
                "APPLY": [{"n": {"COUNT": "big_uuid"}}]
            }
        }))
        .unwrap_err();
    assert_eq!(grouped.code(), ApiErrorCode::CampusResultTooLarge);

    let snapshot = engine.metrics().snapshot();
    assert_eq!(snapshot.queries_executed, 1);
    assert_eq!(snapshot.queries_too_large, 2);
}

// =============================================================================
// Robustness Tests
// =============================================================================

/// Same query over unchanged data yields identical rows in identical order.
#[test]
fn test_repeated_query_is_identical() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "courses",
        DatasetKind::Courses,
        &[
            section("math", "200", 75.0, 0, "2011"),
            section("cpsc", "210", 75.0, 0, "2012"),
            section("biol", "112", 75.0, 0, "2013"),
        ],
    );
    let query = json!({
        "WHERE": {"EQ": {"courses_avg": 75}},
        "OPTIONS": {"COLUMNS": ["courses_dept", "courses_avg"], "ORDER": "courses_avg"}
    });

    let first = to_json(&engine.perform_query(&query).unwrap());
    for _ in 0..10 {
        assert_eq!(to_json(&engine.perform_query(&query).unwrap()), first);
    }
}

/// Malformed files and records in a dataset directory are skipped.
#[test]
fn test_malformed_records_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_with(
        &temp_dir,
        "courses",
        DatasetKind::Courses,
        &[section("cpsc", "310", 88.0, 0, "2015")],
    );

    let dataset_dir = temp_dir.path().join("courses").join("courses");
    fs::write(dataset_dir.join("broken.json"), "{ not json").unwrap();
    fs::write(
        dataset_dir.join("partial.json"),
        json!([{"Subject": "math"}, section("math", "100", 65.0, 0, "2015")]).to_string(),
    )
    .unwrap();

    let rows = engine
        .perform_query(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept"], "ORDER": "courses_dept"}
        }))
        .unwrap();

    assert_eq!(
        to_json(&rows),
        json!([{"courses_dept": "cpsc"}, {"courses_dept": "math"}])
    );
    assert_eq!(engine.metrics().snapshot().records_skipped, 2);
}

/// An "overall" section reports year 1900.
#[test]
fn test_overall_section_year() {
    let temp_dir = TempDir::new().unwrap();
    let mut overall = section("cpsc", "310", 85.0, 0, "2015");
    overall["Section"] = json!("overall");
    let engine = engine_with(&temp_dir, "courses", DatasetKind::Courses, &[overall]);

    let rows = engine
        .perform_query(&json!({
            "WHERE": {"LT": {"courses_year": 2000}},
            "OPTIONS": {"COLUMNS": ["courses_year"]}
        }))
        .unwrap();

    assert_eq!(to_json(&rows), json!([{"courses_year": 1900}]));
}
