use std::fs;
use std::path::Path;

use crate::ephemeris::error::EphemerisError;
use crate::ephemeris::json::parse_json;
use crate::ephemeris::oem::parse_oem;
use crate::ephemeris::tle::parse_tle;
use crate::ephemeris::types::{Ephemeris, Format};

/// Raw ephemeris input.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Overrides extension/content sniffing.
    pub format: Option<Format>,
    /// Selects one satellite out of a multi-set TLE file.
    pub norad_id: Option<u64>,
}

/// Loads and validates an ephemeris.
pub fn load(source: Source<'_>, options: &LoadOptions) -> Result<Ephemeris, EphemerisError> {
    let (content, hint) = match source {
        Source::Path(path) => {
            if !path.exists() {
                return Err(EphemerisError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )));
            }
            (fs::read_to_string(path)?, format_from_extension(path))
        }
        Source::Bytes(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| EphemerisError::Malformed(format!("not UTF-8: {}", e)))?;
            (text.to_string(), None)
        }
    };

    let format = options
        .format
        .or(hint)
        .or_else(|| Format::detect(&content))
        .ok_or_else(|| EphemerisError::UnknownFormat("cannot infer from content".into()))?;

    let ephemeris = match format {
        Format::Oem => parse_oem(&content)?,
        Format::Json => parse_json(&content)?,
        Format::Tle => Ephemeris::from_elements(parse_tle(&content, options.norad_id)?),
    };

    let summary = ephemeris.summary();
    log::info!(
        "Loaded {} ephemeris for {}: {} records ({} dropped), {} .. {}",
        summary.format,
        summary.object_name.as_deref().unwrap_or("unnamed object"),
        summary.records,
        summary.dropped_records,
        summary.start,
        summary.end
    );

    Ok(ephemeris)
}

fn format_from_extension(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "oem" => Some(Format::Oem),
        "json" => Some(Format::Json),
        "tle" => Some(Format::Tle),
        _ => None,
    }
}
