//! CSV ingestion for delivery exports.
//!
//! Column names vary between exports, so each field is looked up through a list
//! of aliases, compared case-insensitively. Only the duration column is
//! required. Cells are coerced leniently: anything that does not parse becomes
//! a missing value rather than an error, and rows without a usable duration are
//! skipped and counted.

use chrono::{NaiveDate, NaiveTime, Timelike};
use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::dataset::{Dataset, Record, TimeOfDay, TrafficDensity};
use crate::error::DatasetError;
use crate::geo::GeoPoint;

const DURATION: &[&str] = &["Time_taken (min)", "Time_taken_min", "Time_taken", "Time_taken_minutes", "duration_min"];
const PERSONNEL: &[&str] = &["Delivery_person_ID", "Delivery ID", "ID", "personnel_id"];
const AGE: &[&str] = &["Delivery_person_Age", "Age"];
const RATING: &[&str] = &["Delivery_person_Ratings", "Delivery_person_Rating", "Rating"];
const ORDER_DATE: &[&str] = &["Order_Date", "Date"];
const ORDER_TIME: &[&str] = &["Time_Orderd", "Time_Ordered", "Order_Time"];
const CITY: &[&str] = &["City", "Area"];
const VEHICLE: &[&str] = &["Type_of_vehicle", "vehicle_type"];
const CONDITION: &[&str] = &["Vehicle_condition"];
const TRAFFIC: &[&str] = &["Road_traffic_density", "Traffic"];
const WEATHER: &[&str] = &["Weather_conditions", "Weather"];
const FESTIVAL: &[&str] = &["Festival"];
const ORDER_TYPE: &[&str] = &["Type_of_order", "Order_Type"];
const MULTIPLE: &[&str] = &["multiple_deliveries"];
const RESTAURANT_LAT: &[&str] = &["Restaurant_latitude"];
const RESTAURANT_LON: &[&str] = &["Restaurant_longitude"];
const DESTINATION_LAT: &[&str] = &["Delivery_location_latitude"];
const DESTINATION_LON: &[&str] = &["Delivery_location_longitude"];

/// Row counts from one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
  pub rows_read: usize,
  pub rows_loaded: usize,
  pub rows_skipped: usize,
}

/// Load a dataset from a CSV file on disk.
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<(Dataset, LoadReport), DatasetError> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|source| DatasetError::Io { path: path.to_path_buf(), source })?;
  let loaded = load_reader(file)?;
  info!(path = %path.display(), dataset = %loaded.0, skipped = loaded.1.rows_skipped, "loaded dataset");
  Ok(loaded)
}

/// Load a dataset from any CSV source with a header row.
pub fn load_reader<R: Read>(reader: R) -> Result<(Dataset, LoadReport), DatasetError> {
  let mut csv = ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(reader);
  let columns = Columns::resolve(csv.headers()?)?;
  debug!(?columns, "resolved dataset columns");

  let mut report = LoadReport::default();
  let mut records = Vec::new();
  for row in csv.records() {
    let row = row?;
    report.rows_read += 1;
    match columns.record(&row) {
      Some(record) => records.push(record),
      None => {
        report.rows_skipped += 1;
        debug!(row = report.rows_read, "no usable duration, skipping row");
      }
    }
  }
  report.rows_loaded = records.len();

  if report.rows_skipped > 0 {
    warn!(skipped = report.rows_skipped, read = report.rows_read, "skipped rows without a usable duration");
  }

  Ok((Dataset::new(records), report))
}

/// Header positions of every recognized column.
#[derive(Debug)]
struct Columns {
  duration: usize,
  personnel: Option<usize>,
  age: Option<usize>,
  rating: Option<usize>,
  order_date: Option<usize>,
  order_time: Option<usize>,
  city: Option<usize>,
  vehicle: Option<usize>,
  condition: Option<usize>,
  traffic: Option<usize>,
  weather: Option<usize>,
  festival: Option<usize>,
  order_type: Option<usize>,
  multiple: Option<usize>,
  restaurant: (Option<usize>, Option<usize>),
  destination: (Option<usize>, Option<usize>),
}

fn find_column(headers: &StringRecord, candidates: &[&str]) -> Option<usize> {
  candidates
    .iter()
    .find_map(|candidate| headers.iter().position(|header| header.trim().eq_ignore_ascii_case(candidate)))
}

impl Columns {
  fn resolve(headers: &StringRecord) -> Result<Self, DatasetError> {
    let find = |candidates: &[&str]| find_column(headers, candidates);
    let duration = find(DURATION).ok_or_else(|| DatasetError::missing_column("duration", DURATION))?;

    Ok(Self {
      duration,
      personnel: find(PERSONNEL),
      age: find(AGE),
      rating: find(RATING),
      order_date: find(ORDER_DATE),
      order_time: find(ORDER_TIME),
      city: find(CITY),
      vehicle: find(VEHICLE),
      condition: find(CONDITION),
      traffic: find(TRAFFIC),
      weather: find(WEATHER),
      festival: find(FESTIVAL),
      order_type: find(ORDER_TYPE),
      multiple: find(MULTIPLE),
      restaurant: (find(RESTAURANT_LAT), find(RESTAURANT_LON)),
      destination: (find(DESTINATION_LAT), find(DESTINATION_LON)),
    })
  }

  /// `None` when the row has no usable duration.
  fn record(&self, row: &StringRecord) -> Option<Record> {
    let get = |index: Option<usize>| cell(row, index);

    let duration_min = get(Some(self.duration)).and_then(parse_duration)?;

    Some(Record {
      personnel_id: get(self.personnel).map(str::to_string),
      age: get(self.age).and_then(parse_count),
      rating: get(self.rating).and_then(parse_rating),
      order_date: get(self.order_date).and_then(parse_date),
      time_of_day: get(self.order_time).and_then(parse_time_of_day),
      duration_min,
      city: get(self.city).map(str::to_string),
      vehicle_type: get(self.vehicle).map(str::to_string),
      vehicle_condition: get(self.condition).and_then(parse_count).and_then(|c| u8::try_from(c).ok()),
      traffic: get(self.traffic).and_then(TrafficDensity::parse),
      weather: get(self.weather).map(parse_weather),
      festival: get(self.festival).and_then(parse_flag),
      order_type: get(self.order_type).map(str::to_string),
      multiple_deliveries: get(self.multiple).and_then(parse_count),
      restaurant: point(get(self.restaurant.0), get(self.restaurant.1)),
      destination: point(get(self.destination.0), get(self.destination.1)),
    })
  }
}

/// Trimmed cell text, `None` for absent columns and missing-value markers.
fn cell(row: &StringRecord, index: Option<usize>) -> Option<&str> {
  let value = row.get(index?)?.trim();
  let missing = value.is_empty()
    || ["nan", "null", "none", "na", "n/a"].iter().any(|marker| value.eq_ignore_ascii_case(marker));
  (!missing).then_some(value)
}

fn first_number(value: &str) -> Option<f64> {
  static NUMBER: OnceLock<Regex> = OnceLock::new();
  let pattern = NUMBER.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern is valid"));
  pattern.find(value)?.as_str().parse().ok()
}

/// First number in the cell, so `(min) 24` reads as 24. Negative durations are rejected.
fn parse_duration(value: &str) -> Option<f64> {
  first_number(value).filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
}

/// Non-negative whole number; `2.0` is accepted, `2.5` and `-1` are not.
fn parse_count(value: &str) -> Option<u32> {
  let number: f64 = value.parse().ok()?;
  if number.is_finite() && number >= 0.0 && number.fract() == 0.0 && number <= f64::from(u32::MAX) {
    Some(number as u32)
  } else {
    None
  }
}

fn parse_rating(value: &str) -> Option<f64> {
  value.parse::<f64>().ok().filter(|rating| (0.0..=5.0).contains(rating))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
  ["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y"].iter().find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_time_of_day(value: &str) -> Option<TimeOfDay> {
  let time = ["%H:%M:%S", "%H:%M"].iter().find_map(|format| NaiveTime::parse_from_str(value, format).ok())?;
  Some(TimeOfDay::from_hour(time.hour()))
}

/// `conditions Sunny` becomes `Sunny`.
fn parse_weather(value: &str) -> String {
  let lowered = value.to_ascii_lowercase();
  match lowered.strip_prefix("conditions") {
    Some(rest) if !rest.trim().is_empty() => value[value.len() - rest.len()..].trim().to_string(),
    _ => value.to_string(),
  }
}

fn parse_flag(value: &str) -> Option<bool> {
  match value.to_ascii_lowercase().as_str() {
    "yes" | "y" | "true" | "1" => Some(true),
    "no" | "n" | "false" | "0" => Some(false),
    _ => None,
  }
}

fn point(lat: Option<&str>, lon: Option<&str>) -> Option<GeoPoint> {
  Some(GeoPoint::new(lat?.parse().ok()?, lon?.parse().ok()?))
}
