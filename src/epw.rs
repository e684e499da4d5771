//! Decoder for EnergyPlus Weather (EPW) files, bare or inside a zip archive.
//!
//! Only the location header and the calendar/dry-bulb columns are read; the
//! remaining radiation, wind, and sky fields are ignored.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use zip::ZipArchive;

use crate::error::DecodeError;
use crate::weather::{Observation, StationMetadata, StationSeries};

/// Header lines after the LOCATION line and before the hourly rows.
const EXTRA_HEADER_LINES: usize = 7;

const MONTH: usize = 1;
const DAY: usize = 2;
const HOUR: usize = 3;
const DRY_BULB: usize = 6;

/// Turns a station input into a validated hourly series.
pub trait StationDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<StationSeries, DecodeError>;
}

/// Reads `*.epw` files and `*.zip` archives holding one.
#[derive(Debug, Default, Clone, Copy)]
pub struct EpwDecoder;

impl StationDecoder for EpwDecoder {
    fn decode(&self, path: &Path) -> Result<StationSeries, DecodeError> {
        read_epw(path)
    }
}

/// Whether `path` looks like a station input this decoder understands.
pub fn is_station_input(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("epw" | "zip")
    )
}

/// Opens and decodes an EPW file, looking inside zip archives for
/// `<stem>.epw` first and any `.epw` entry otherwise.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the file cannot be read or violates the EPW
/// layout or the hourly series contract.
pub fn read_epw(path: &Path) -> Result<StationSeries, DecodeError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("zip") => {
            let mut archive = ZipArchive::new(File::open(path)?)?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let preferred = format!("{stem}.epw");

            let entry_name = if archive.index_for_name(&preferred).is_some() {
                preferred
            } else {
                archive
                    .file_names()
                    .find(|n| n.to_ascii_lowercase().ends_with(".epw"))
                    .map(str::to_owned)
                    .ok_or(zip::result::ZipError::FileNotFound)?
            };

            let entry = archive.by_name(&entry_name)?;
            parse_epw(BufReader::new(entry))
        }
        Some("epw") => parse_epw(BufReader::new(File::open(path)?)),
        _ => Err(DecodeError::UnsupportedInput {
            path: path.to_path_buf(),
        }),
    }
}

/// Decodes EPW text from any buffered reader.
///
/// # Errors
///
/// See [`read_epw`].
pub fn parse_epw<R: BufRead>(mut reader: R) -> Result<StationSeries, DecodeError> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let header = line.trim_start_matches('\u{feff}').trim_end_matches(['\r', '\n']);
    let metadata = parse_location(header)?;

    for _ in 0..EXTRA_HEADER_LINES {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(DecodeError::Header {
                reason: "file ends inside the header block".to_string(),
            });
        }
    }

    let observations = parse_rows(reader)?;
    StationSeries::new(metadata, observations)
}

fn parse_location(line: &str) -> Result<StationMetadata, DecodeError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() < 10 {
        return Err(DecodeError::Header {
            reason: format!("expected 10 LOCATION fields, got {}", fields.len()),
        });
    }
    if !fields[0].eq_ignore_ascii_case("LOCATION") {
        return Err(DecodeError::Header {
            reason: format!("first line starts with '{}', not LOCATION", fields[0]),
        });
    }

    let number = |index: usize, name: &str| -> Result<f64, DecodeError> {
        fields[index].parse::<f64>().map_err(|e| DecodeError::Header {
            reason: format!("{name} '{}': {e}", fields[index]),
        })
    };

    Ok(StationMetadata {
        city: fields[1].to_string(),
        state_or_province: fields[2].to_string(),
        country: fields[3].to_string(),
        wmo_code: fields[5].to_string(),
        latitude: number(6, "latitude")?,
        longitude: number(7, "longitude")?,
        timezone_offset_hours: number(8, "timezone")?,
        altitude: number(9, "elevation")?,
    })
}

fn column(record: &StringRecord, row: usize, index: usize) -> Result<&str, DecodeError> {
    record.get(index).map(str::trim).ok_or_else(|| DecodeError::Row {
        row,
        reason: format!("missing column {index}"),
    })
}

fn parse_column<T>(record: &StringRecord, row: usize, index: usize) -> Result<T, DecodeError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = column(record, row, index)?;
    raw.parse::<T>().map_err(|e| DecodeError::Row {
        row,
        reason: format!("column {index} '{raw}': {e}"),
    })
}

fn parse_rows<R: Read>(reader: R) -> Result<Vec<Observation>, DecodeError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::with_capacity(crate::weather::HOURS_PER_YEAR);

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let temp_air = parse_column(&record, row, DRY_BULB)?;

        rows.push(Observation {
            month: parse_column(&record, row, MONTH)?,
            day: parse_column(&record, row, DAY)?,
            hour: parse_column(&record, row, HOUR)?,
            temp_air,
        });
    }

    Ok(rows)
}
