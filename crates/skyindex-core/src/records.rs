//! Bulk row boundary
//!
//! Rows are flat `field name → string` maps, independent of the file dialect
//! that produced them. Conversion failures surface as validation errors so a
//! bulk import can skip the row and carry on.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{coords, CatalogEntry, CelestialObjectRecord};
use crate::error::{Result, SkyError};
use crate::recommend::NamedRating;

/// One source or sink row
pub type Row = HashMap<String, String>;

/// Separator for the `aliases` field
pub const ALIAS_SEPARATOR: char = ';';

/// Entry-level fields
pub const ENTRY_FIELDS: &[&str] = &["name", "aliases", "click_count"];

/// Record fields, in export order
pub const RECORD_FIELDS: &[&str] = &[
    "id",
    "identifier",
    "m_identifier",
    "extension_name",
    "component",
    "class_name",
    "amateur_rank",
    "chinese_name",
    "type",
    "duplicate_type",
    "morphology",
    "constellation_zh",
    "constellation_en",
    "ra_j2000",
    "ra_d_j2000",
    "dec_j2000",
    "dec_d_j2000",
    "visual_magnitude",
    "photographic_magnitude",
    "b_minus_v",
    "surface_brightness",
    "major_axis",
    "minor_axis",
    "position_angle",
    "detailed_description",
    "brief_description",
];

/// Catalog entry parsed from a row
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRow {
    pub name: String,
    pub aliases: Vec<String>,
    pub click_count: u64,
    pub record: Option<CelestialObjectRecord>,
}

/// Rating parsed from a row
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRow {
    pub user: String,
    pub item: String,
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Item feature parsed from a row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub item: String,
    pub feature: String,
    pub weight: f64,
}

/// Why one row was skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    /// Zero-based position in the input
    pub row: usize,
    pub reason: String,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub processed: usize,
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    /// Count a skipped row and log why
    pub fn record_failure(&mut self, row: usize, error: &SkyError) {
        tracing::warn!(row, error = %error, "skipping invalid row");
        self.skipped += 1;
        self.failures.push(RowFailure {
            row,
            reason: error.to_string(),
        });
    }
}

/// Trimmed, non-empty field value
fn field<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn required<'a>(row: &'a Row, key: &str) -> Result<&'a str> {
    field(row, key).ok_or_else(|| SkyError::missing_field(key))
}

fn text(row: &Row, key: &str) -> String {
    field(row, key).unwrap_or_default().to_string()
}

fn parse_or<T: std::str::FromStr>(row: &Row, key: &str, default: T) -> Result<T> {
    match field(row, key) {
        Some(raw) => raw.parse().map_err(|_| SkyError::invalid_value(key, raw)),
        None => Ok(default),
    }
}

fn has_record_fields(row: &Row) -> bool {
    RECORD_FIELDS.iter().any(|key| field(row, key).is_some())
}

/// Catalog entry, plus its record when the row carries record fields
pub fn entry_from_row(row: &Row) -> Result<EntryRow> {
    let name = required(row, "name")?.to_string();
    let aliases = field(row, "aliases")
        .map(|raw| {
            raw.split(ALIAS_SEPARATOR)
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let click_count = parse_or(row, "click_count", 0u64)?;

    let record = if has_record_fields(row) {
        Some(record_from_row(row)?)
    } else {
        None
    };

    Ok(EntryRow {
        name,
        aliases,
        click_count,
        record,
    })
}

/// Catalog record; decimal coordinates fall back to the sexagesimal fields
pub fn record_from_row(row: &Row) -> Result<CelestialObjectRecord> {
    let ra_deg = match field(row, "ra_d_j2000") {
        Some(_) => parse_or(row, "ra_d_j2000", 0.0)?,
        None => field(row, "ra_j2000").map(coords::parse_ra).transpose()?.unwrap_or(0.0),
    };
    let dec_deg = match field(row, "dec_d_j2000") {
        Some(_) => parse_or(row, "dec_d_j2000", 0.0)?,
        None => field(row, "dec_j2000").map(coords::parse_dec).transpose()?.unwrap_or(0.0),
    };

    let record = CelestialObjectRecord {
        id: text(row, "id"),
        identifier: field(row, "identifier")
            .or_else(|| field(row, "name"))
            .unwrap_or_default()
            .to_string(),
        m_identifier: text(row, "m_identifier"),
        extension_name: text(row, "extension_name"),
        component: text(row, "component"),
        class_name: text(row, "class_name"),
        amateur_rank: text(row, "amateur_rank"),
        chinese_name: text(row, "chinese_name"),
        object_type: text(row, "type"),
        duplicate_type: text(row, "duplicate_type"),
        morphology: text(row, "morphology"),
        constellation_zh: text(row, "constellation_zh"),
        constellation_en: text(row, "constellation_en"),
        ra_j2000: field(row, "ra_j2000").map_or_else(|| coords::format_ra(ra_deg), str::to_string),
        ra_deg,
        dec_j2000: field(row, "dec_j2000")
            .map_or_else(|| coords::format_dec(dec_deg), str::to_string),
        dec_deg,
        visual_magnitude: parse_or(row, "visual_magnitude", 0.0)?,
        photographic_magnitude: parse_or(row, "photographic_magnitude", 0.0)?,
        b_minus_v: parse_or(row, "b_minus_v", 0.0)?,
        surface_brightness: parse_or(row, "surface_brightness", 0.0)?,
        major_axis: parse_or(row, "major_axis", 0.0)?,
        minor_axis: parse_or(row, "minor_axis", 0.0)?,
        position_angle: parse_or(row, "position_angle", 0)?,
        detailed_description: text(row, "detailed_description"),
        brief_description: text(row, "brief_description"),
    };
    Ok(record)
}

/// Rating with an optional RFC 3339 timestamp
pub fn rating_from_row(row: &Row) -> Result<RatingRow> {
    let user = required(row, "user")?.to_string();
    let item = required(row, "item")?.to_string();
    let raw = required(row, "rating")?;
    let value = raw
        .parse()
        .map_err(|_| SkyError::invalid_value("rating", raw))?;
    let timestamp = field(row, "timestamp")
        .map(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| SkyError::invalid_value("timestamp", ts))
        })
        .transpose()?;

    Ok(RatingRow {
        user,
        item,
        value,
        timestamp,
    })
}

pub fn feature_from_row(row: &Row) -> Result<FeatureRow> {
    let item = required(row, "item")?.to_string();
    let feature = required(row, "feature")?.to_string();
    let raw = required(row, "weight")?;
    let weight = raw
        .parse()
        .map_err(|_| SkyError::invalid_value("weight", raw))?;
    Ok(FeatureRow {
        item,
        feature,
        weight,
    })
}

fn record_field(record: &CelestialObjectRecord, key: &str) -> Option<String> {
    let value = match key {
        "id" => record.id.clone(),
        "identifier" => record.identifier.clone(),
        "m_identifier" => record.m_identifier.clone(),
        "extension_name" => record.extension_name.clone(),
        "component" => record.component.clone(),
        "class_name" => record.class_name.clone(),
        "amateur_rank" => record.amateur_rank.clone(),
        "chinese_name" => record.chinese_name.clone(),
        "type" => record.object_type.clone(),
        "duplicate_type" => record.duplicate_type.clone(),
        "morphology" => record.morphology.clone(),
        "constellation_zh" => record.constellation_zh.clone(),
        "constellation_en" => record.constellation_en.clone(),
        "ra_j2000" => record.ra_j2000.clone(),
        "ra_d_j2000" => record.ra_deg.to_string(),
        "dec_j2000" => record.dec_j2000.clone(),
        "dec_d_j2000" => record.dec_deg.to_string(),
        "visual_magnitude" => record.visual_magnitude.to_string(),
        "photographic_magnitude" => record.photographic_magnitude.to_string(),
        "b_minus_v" => record.b_minus_v.to_string(),
        "surface_brightness" => record.surface_brightness.to_string(),
        "major_axis" => record.major_axis.to_string(),
        "minor_axis" => record.minor_axis.to_string(),
        "position_angle" => record.position_angle.to_string(),
        "detailed_description" => record.detailed_description.clone(),
        "brief_description" => record.brief_description.clone(),
        _ => return None,
    };
    Some(value)
}

/// Export row for an entry.
///
/// `fields` selects columns; empty means every entry and record field.
/// Unknown field names are ignored; record fields are omitted when the entry
/// has no record.
pub fn entry_to_row(entry: &CatalogEntry, fields: &[&str]) -> Row {
    let all: Vec<&str> = ENTRY_FIELDS.iter().chain(RECORD_FIELDS).copied().collect();
    let selected = if fields.is_empty() { &all[..] } else { fields };

    let mut row = Row::new();
    for key in selected {
        let value = match *key {
            "name" => Some(entry.name.clone()),
            "aliases" => Some(entry.aliases.join(&ALIAS_SEPARATOR.to_string())),
            "click_count" => Some(entry.click_count.to_string()),
            other => entry.record.as_ref().and_then(|r| record_field(r, other)),
        };
        if let Some(value) = value {
            row.insert(key.to_string(), value);
        }
    }
    row
}

pub fn rating_to_row(rating: &NamedRating) -> Row {
    Row::from([
        ("user".to_string(), rating.user.clone()),
        ("item".to_string(), rating.item.clone()),
        ("rating".to_string(), rating.value.to_string()),
        ("timestamp".to_string(), rating.timestamp.to_rfc3339()),
    ])
}
