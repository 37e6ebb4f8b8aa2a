//! Normalizer - untrusted candidate objects to CanonicalTask
//!
//! Every function here is total: any JSON value, including non-objects and
//! objects with wrong-typed fields, yields a valid task. Fields are looked up
//! in camelCase (the shape the generator is asked for) and snake_case.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{CanonicalTask, MAX_ESTIMATED_HOURS, MIN_ESTIMATED_HOURS, Priority, TaskCategory};

pub const DEFAULT_DESCRIPTION: &str = "No description provided";
pub const DEFAULT_ESTIMATED_HOURS: f64 = 4.0;
pub const DEFAULT_DURATION_DAYS: i64 = 7;

/// Normalize a batch, preserving order
pub fn normalize_tasks(raw: &[Value], now: DateTime<Utc>) -> Vec<CanonicalTask> {
    debug!(count = raw.len(), "normalize_tasks: called");
    raw.iter()
        .enumerate()
        .map(|(index, value)| normalize_task(value, index, now))
        .collect()
}

/// Normalize one candidate; `index` is its 0-based position in the batch
pub fn normalize_task(raw: &Value, index: usize, now: DateTime<Utc>) -> CanonicalTask {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let title = text(obj, &["title"])
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Task {}", index + 1));

    let description = text(obj, &["description"])
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let mut start_date = date(obj, &["startDate", "start_date"]).unwrap_or(now);
    let mut end_date = date(obj, &["endDate", "end_date"]).unwrap_or_else(|| now + Duration::days(DEFAULT_DURATION_DAYS));
    if end_date < start_date {
        debug!(%title, %start_date, %end_date, "normalize_task: end before start, swapping");
        std::mem::swap(&mut start_date, &mut end_date);
    }

    let priority = text(obj, &["priority"])
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();

    let category = text(obj, &["category"])
        .and_then(|c| c.parse::<TaskCategory>().ok())
        .unwrap_or_default();

    let estimated_hours = number(obj, &["estimatedHours", "estimated_hours"])
        .unwrap_or(DEFAULT_ESTIMATED_HOURS)
        .clamp(MIN_ESTIMATED_HOURS, MAX_ESTIMATED_HOURS);

    CanonicalTask {
        title,
        description,
        start_date,
        end_date,
        priority,
        category,
        estimated_hours,
        dependencies: strings(obj, &["dependencies"]),
        tags: strings(obj, &["tags"]),
    }
}

/// First key present in the object
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn text<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    field(obj, keys).and_then(Value::as_str)
}

/// Finite number, also accepted as a numeric string like `"8"`
fn number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let n = match field(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC)
fn date(obj: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    parse_date(text(obj, keys)?)
}

pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// String entries of an array field; anything else in the array is dropped
fn strings(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match field(obj, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_object_gets_defaults() {
        let task = normalize_task(&json!({}), 2, now());
        assert_eq!(task.title, "Task 3");
        assert_eq!(task.description, DEFAULT_DESCRIPTION);
        assert_eq!(task.start_date, now());
        assert_eq!(task.end_date, now() + Duration::days(7));
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, TaskCategory::Other);
        assert_eq!(task.estimated_hours, 4.0);
        assert!(task.dependencies.is_empty());
        assert!(task.tags.is_empty());
    }

    #[test]
    fn test_full_object_passes_through() {
        let raw = json!({
            "title": "Design schema",
            "description": "Tables and indexes",
            "startDate": "2026-03-02T09:00:00Z",
            "endDate": "2026-03-04",
            "priority": "urgent",
            "category": "design",
            "estimatedHours": 12,
            "dependencies": ["Gather requirements"],
            "tags": ["db"]
        });
        let task = normalize_task(&raw, 0, now());
        assert_eq!(task.title, "Design schema");
        assert_eq!(task.description, "Tables and indexes");
        assert_eq!(task.start_date, Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
        assert_eq!(task.end_date, Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap());
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.category, TaskCategory::Design);
        assert_eq!(task.estimated_hours, 12.0);
        assert_eq!(task.dependencies, vec!["Gather requirements"]);
        assert_eq!(task.tags, vec!["db"]);
    }

    #[test]
    fn test_invalid_enums_coerce() {
        let raw = json!({"priority": "critical", "category": "research"});
        let task = normalize_task(&raw, 0, now());
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, TaskCategory::Other);
    }

    #[test]
    fn test_hours_clamped() {
        assert_eq!(normalize_task(&json!({"estimatedHours": 100}), 0, now()).estimated_hours, 40.0);
        assert_eq!(normalize_task(&json!({"estimatedHours": 0}), 0, now()).estimated_hours, 1.0);
        assert_eq!(normalize_task(&json!({"estimatedHours": -3.5}), 0, now()).estimated_hours, 1.0);
        assert_eq!(normalize_task(&json!({"estimatedHours": "16"}), 0, now()).estimated_hours, 16.0);
        assert_eq!(normalize_task(&json!({"estimatedHours": "lots"}), 0, now()).estimated_hours, 4.0);
        assert_eq!(normalize_task(&json!({"estimated_hours": 6}), 0, now()).estimated_hours, 6.0);
    }

    #[test]
    fn test_wrong_typed_fields_treated_as_missing() {
        let raw = json!({
            "title": 42,
            "description": ["nope"],
            "startDate": 1700000000,
            "dependencies": "Research",
            "tags": {"a": 1}
        });
        let task = normalize_task(&raw, 4, now());
        assert_eq!(task.title, "Task 5");
        assert_eq!(task.description, DEFAULT_DESCRIPTION);
        assert_eq!(task.start_date, now());
        assert!(task.dependencies.is_empty());
        assert!(task.tags.is_empty());
    }

    #[test]
    fn test_blank_title_synthesized() {
        assert_eq!(normalize_task(&json!({"title": "   "}), 0, now()).title, "Task 1");
    }

    #[test]
    fn test_non_string_array_entries_dropped() {
        let raw = json!({"dependencies": ["A", 1, null, "B"], "tags": [true, "x"]});
        let task = normalize_task(&raw, 0, now());
        assert_eq!(task.dependencies, vec!["A", "B"]);
        assert_eq!(task.tags, vec!["x"]);
    }

    #[test]
    fn test_unparseable_date_uses_default() {
        let task = normalize_task(&json!({"startDate": "next tuesday"}), 0, now());
        assert_eq!(task.start_date, now());
    }

    #[test]
    fn test_end_before_start_swapped() {
        let raw = json!({"startDate": "2026-03-10", "endDate": "2026-03-05"});
        let task = normalize_task(&raw, 0, now());
        assert_eq!(task.start_date, Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap());
        assert_eq!(task.end_date, Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_non_object_entries() {
        let tasks = normalize_tasks(&[json!(null), json!("text"), json!([1, 2])], now());
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Task 1", "Task 2", "Task 3"]);
    }

    #[test]
    fn test_order_preserved() {
        let raw = vec![json!({"title": "C"}), json!({"title": "A"}), json!({"title": "B"})];
        let titles: Vec<_> = normalize_tasks(&raw, now()).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            (-1.0e6f64..1.0e6).prop_map(|n| json!(n)),
            ".{0,12}".prop_map(Value::String),
            prop_oneof![
                Just("low"),
                Just("urgent"),
                Just("design"),
                Just("2026-01-01"),
                Just("2026-01-01T00:00:00Z")
            ]
            .prop_map(|s| Value::String(s.to_string())),
        ];
        leaf.prop_recursive(3, 24, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(
                    (
                        prop_oneof![
                            Just("title".to_string()),
                            Just("description".to_string()),
                            Just("startDate".to_string()),
                            Just("endDate".to_string()),
                            Just("priority".to_string()),
                            Just("category".to_string()),
                            Just("estimatedHours".to_string()),
                            Just("dependencies".to_string()),
                            Just("tags".to_string()),
                            "[a-z]{1,6}",
                        ],
                        inner
                    ),
                    0..9
                )
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_normalize_is_total(raw in arb_json(), index in 0usize..100) {
            let task = normalize_task(&raw, index, now());
            prop_assert!(!task.title.trim().is_empty());
            prop_assert!(!task.description.is_empty());
            prop_assert!(Priority::ALL.contains(&task.priority));
            prop_assert!(task.estimated_hours >= MIN_ESTIMATED_HOURS);
            prop_assert!(task.estimated_hours <= MAX_ESTIMATED_HOURS);
            prop_assert!(task.start_date <= task.end_date);
        }

        #[test]
        fn prop_batch_length_preserved(raw in prop::collection::vec(arb_json(), 0..10)) {
            prop_assert_eq!(normalize_tasks(&raw, now()).len(), raw.len());
        }
    }
}
