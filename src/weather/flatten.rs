//! Flattens one timeline JSON document into a frame of per-day rows.

use crate::weather::error::WeatherError;
use polars::prelude::*;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Column name stamped with the originating query key's location string.
const LOC_COLUMN: &str = "loc";

/// Fields dropped from the top-level document before the remaining metadata
/// is repeated across the key's day rows.
const DROPPED_FIELDS: [&str; 2] = ["days", "stations"];

/// Builds one row per `days` entry: location metadata first, then the day's
/// own fields, then the `loc` stamp. Nested objects become dotted column
/// names; arrays are kept as compact JSON strings. An empty `days` array
/// yields an empty frame.
pub(crate) fn timeline_frame(loc: &str, payload: &Value) -> Result<DataFrame, WeatherError> {
    let root = payload
        .as_object()
        .ok_or_else(|| WeatherError::NotAnObject(loc.to_string()))?;
    let days = root
        .get("days")
        .and_then(Value::as_array)
        .ok_or_else(|| WeatherError::MissingDays(loc.to_string()))?;
    if days.is_empty() {
        return Ok(DataFrame::empty());
    }

    let mut meta = BTreeMap::new();
    for (field, value) in root {
        if !DROPPED_FIELDS.contains(&field.as_str()) {
            flatten_value(field, value, &mut meta);
        }
    }
    meta.remove(LOC_COLUMN);

    let mut day_rows = Vec::with_capacity(days.len());
    for (index, day) in days.iter().enumerate() {
        if !day.is_object() {
            return Err(WeatherError::MalformedDay {
                loc: loc.to_string(),
                index,
            });
        }
        let mut row = BTreeMap::new();
        flatten_value("", day, &mut row);
        row.remove(LOC_COLUMN);
        day_rows.push(row);
    }

    // Metadata columns first, then day columns, as the rows are assembled
    // side by side. A day field that shadows a metadata field wins per row.
    let mut names: Vec<&str> = meta.keys().map(String::as_str).collect();
    let mut day_names: BTreeSet<&str> = BTreeSet::new();
    for row in &day_rows {
        for name in row.keys() {
            if !meta.contains_key(name) {
                day_names.insert(name);
            }
        }
    }
    names.extend(day_names.iter().copied());

    let mut columns = Vec::with_capacity(names.len() + 1);
    for name in names {
        let cells: Vec<Option<&Value>> = day_rows
            .iter()
            .map(|row| row.get(name).or_else(|| meta.get(name)))
            .collect();
        columns.push(json_column(name, &cells));
    }
    columns.push(Column::new(
        LOC_COLUMN.into(),
        vec![loc; day_rows.len()],
    ));

    DataFrame::new(columns).map_err(|source| WeatherError::Frame {
        loc: loc.to_string(),
        source,
    })
}

/// Recursively flattens nested objects into dotted keys; leaves everything
/// else (scalars, arrays) at the current key.
fn flatten_value(prefix: &str, value: &Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (field, nested) in map {
                let key = if prefix.is_empty() {
                    field.clone()
                } else {
                    format!("{prefix}.{field}")
                };
                flatten_value(&key, nested, out);
            }
        }
        _ => {
            out.insert(prefix.to_string(), value.clone());
        }
    }
}

/// Builds a typed column from JSON cells: all-integer cells become Int64,
/// numeric cells with any float become Float64, all-boolean cells Boolean,
/// anything else a string column (arrays as compact JSON).
fn json_column(name: &str, cells: &[Option<&Value>]) -> Column {
    let mut seen = false;
    let (mut all_int, mut all_float, mut all_bool) = (true, true, true);
    for value in cells.iter().flatten() {
        match value {
            Value::Null => continue,
            Value::Number(n) => {
                all_bool = false;
                if n.as_i64().is_none() {
                    all_int = false;
                }
            }
            Value::Bool(_) => {
                all_int = false;
                all_float = false;
            }
            _ => {
                all_int = false;
                all_float = false;
                all_bool = false;
            }
        }
        seen = true;
    }

    if seen && all_int {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|cell| cell.and_then(Value::as_i64))
            .collect();
        Column::new(name.into(), values)
    } else if seen && all_float {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| cell.and_then(Value::as_f64))
            .collect();
        Column::new(name.into(), values)
    } else if seen && all_bool {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|cell| cell.and_then(Value::as_bool))
            .collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|cell| match cell {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .collect();
        Column::new(name.into(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_row_per_day_with_metadata_and_loc_stamp() {
        let payload = json!({
            "days": [{"datetime": "2020-06-01", "temp": 75}],
            "stations": {"KORD": {"distance": 12000.0}},
            "tzoffset": -5
        });
        let df = timeline_frame("Chicago,IL", &payload).unwrap();

        assert_eq!(df.shape(), (1, 4));
        assert_eq!(df.get_column_names(), ["tzoffset", "datetime", "temp", "loc"]);
        assert_eq!(df.column("tzoffset").unwrap().i64().unwrap().get(0), Some(-5));
        assert_eq!(
            df.column("datetime").unwrap().str().unwrap().get(0),
            Some("2020-06-01")
        );
        assert_eq!(df.column("temp").unwrap().i64().unwrap().get(0), Some(75));
        assert_eq!(
            df.column("loc").unwrap().str().unwrap().get(0),
            Some("Chicago,IL")
        );
    }

    #[test]
    fn metadata_repeats_across_day_rows() {
        let payload = json!({
            "resolvedAddress": "Chicago, IL, United States",
            "days": [
                {"datetime": "2020-06-01", "temp": 75},
                {"datetime": "2020-06-02", "temp": 80}
            ],
            "stations": {}
        });
        let df = timeline_frame("Chicago,IL", &payload).unwrap();

        assert_eq!(df.height(), 2);
        let address = df.column("resolvedAddress").unwrap();
        let address = address.str().unwrap();
        assert_eq!(address.get(0), address.get(1));
        let loc = df.column("loc").unwrap();
        let loc = loc.str().unwrap();
        assert_eq!(loc.get(1), Some("Chicago,IL"));
    }

    #[test]
    fn nested_metadata_flattens_to_dotted_columns() {
        let payload = json!({
            "currentConditions": {"temp": 71.5, "wind": {"speed": 9.2}},
            "days": [{"datetime": "2020-06-01"}],
            "stations": {}
        });
        let df = timeline_frame("Chicago,IL", &payload).unwrap();

        assert_eq!(
            df.column("currentConditions.wind.speed")
                .unwrap()
                .f64()
                .unwrap()
                .get(0),
            Some(9.2)
        );
    }

    #[test]
    fn arrays_are_kept_as_json_strings() {
        let payload = json!({
            "days": [{"datetime": "2020-06-01", "preciptype": ["rain", "snow"]}],
            "stations": {}
        });
        let df = timeline_frame("Chicago,IL", &payload).unwrap();

        assert_eq!(
            df.column("preciptype").unwrap().str().unwrap().get(0),
            Some(r#"["rain","snow"]"#)
        );
    }

    #[test]
    fn mixed_int_and_float_cells_become_floats() {
        let payload = json!({
            "days": [
                {"datetime": "2020-06-01", "temp": 75},
                {"datetime": "2020-06-02", "temp": 75.5}
            ],
            "stations": {}
        });
        let df = timeline_frame("Chicago,IL", &payload).unwrap();

        let temps = df.column("temp").unwrap();
        let temps = temps.f64().unwrap();
        assert_eq!(temps.get(0), Some(75.0));
        assert_eq!(temps.get(1), Some(75.5));
    }

    #[test]
    fn fields_missing_from_some_days_become_nulls() {
        let payload = json!({
            "days": [
                {"datetime": "2020-06-01", "snow": 1},
                {"datetime": "2020-06-02"}
            ],
            "stations": {}
        });
        let df = timeline_frame("Chicago,IL", &payload).unwrap();

        let snow = df.column("snow").unwrap();
        let snow = snow.i64().unwrap();
        assert_eq!(snow.get(0), Some(1));
        assert_eq!(snow.get(1), None);
    }

    #[test]
    fn empty_days_yield_an_empty_frame() {
        let payload = json!({"days": [], "stations": {}, "tzoffset": -5});
        let df = timeline_frame("Chicago,IL", &payload).unwrap();
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = timeline_frame("Chicago,IL", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, WeatherError::NotAnObject(_)));
    }

    #[test]
    fn rejects_payload_without_days() {
        let err = timeline_frame("Chicago,IL", &json!({"tzoffset": -5})).unwrap_err();
        assert!(matches!(err, WeatherError::MissingDays(_)));
    }

    #[test]
    fn rejects_non_object_day_entries() {
        let payload = json!({"days": [{"datetime": "2020-06-01"}, 42]});
        let err = timeline_frame("Chicago,IL", &payload).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedDay { index: 1, .. }));
    }
}
