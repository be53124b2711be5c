use slog::{debug, error, info, Logger};
use std::path::Path;
use time::{macros::format_description, Date};
use weather_core::Observation;

/// Raw value meaning "no measurement"
pub const MISSING_VALUE: i32 = -9999;

/// date, max temp, min temp, precipitation
const FIELD_COUNT: usize = 4;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected at most 4 tab separated fields, found {found}")]
    TooManyFields { line: usize, found: usize },
    #[error("line {line}: {column} value '{value}' is not an integer")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Cleaned rows of one station file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub station_id: String,
    pub rows: Vec<Observation>,
    /// Rows excluded because their date was missing or not a valid YYYYMMDD
    pub dropped_rows: usize,
}

impl ParsedFile {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Station id is the file name without its extension, e.g. USC00110072.txt
pub fn station_id_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_owned)
}

/// Strict YYYYMMDD, anything else (including the missing marker) is `None`
fn parse_date(value: &str) -> Option<Date> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Date::parse(value, format_description!("[year][month][day]")).ok()
}

fn parse_measurement(
    value: &str,
    line: usize,
    column: &'static str,
) -> Result<Option<i32>, ParseError> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<i32>() {
        Ok(MISSING_VALUE) => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(ParseError::InvalidValue {
            line,
            column,
            value: value.to_owned(),
        }),
    }
}

/// Parse the tab separated body of a station file
///
/// Rows are `date, max_temp, min_temp, precipitation` with no header. Padding
/// around fields and blank lines are ignored, short rows leave the trailing
/// measurements missing. Rows without a valid date are dropped and counted;
/// structural problems (extra fields, non-integer measurements) fail the file.
pub fn parse_contents(station_id: &str, contents: &str) -> Result<ParsedFile, ParseError> {
    let mut parsed = ParsedFile {
        station_id: station_id.to_owned(),
        ..Default::default()
    };

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() > FIELD_COUNT {
            return Err(ParseError::TooManyFields {
                line: line_number,
                found: fields.len(),
            });
        }
        let field = |i: usize| fields.get(i).copied().unwrap_or_default();

        let Some(date) = parse_date(field(0)) else {
            parsed.dropped_rows += 1;
            continue;
        };

        parsed.rows.push(Observation {
            station_id: station_id.to_owned(),
            date,
            max_temp: parse_measurement(field(1), line_number, "max_temp")?,
            min_temp: parse_measurement(field(2), line_number, "min_temp")?,
            precipitation: parse_measurement(field(3), line_number, "precipitation")?,
        });
    }

    Ok(parsed)
}

pub struct StationFileParser {
    logger: Logger,
}

impl StationFileParser {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Read and clean one station file
    ///
    /// Returns `None` when the file cannot be read or parsed; the reason is
    /// logged here and never surfaces to the caller.
    pub async fn parse_file(&self, path: &Path) -> Option<ParsedFile> {
        let file = path.display();
        let Some(station_id) = station_id_from_path(path) else {
            error!(self.logger, "Failed processing {} | Reason: no station id in file name", file);
            return None;
        };

        info!(self.logger, "Loading data from: {}", file);
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) => {
                error!(self.logger, "Failed processing {} | Reason: {}", file, e);
                return None;
            }
        };

        match parse_contents(&station_id, &contents) {
            Ok(parsed) => {
                if parsed.dropped_rows > 0 {
                    debug!(
                        self.logger,
                        "Dropped {} rows without a valid date from {}", parsed.dropped_rows, file
                    );
                }
                info!(
                    self.logger,
                    "Completed processing {} | Valid entries: {}",
                    file,
                    parsed.rows.len()
                );
                Some(parsed)
            }
            Err(e) => {
                error!(self.logger, "Failed processing {} | Reason: {}", file, e);
                None
            }
        }
    }
}
