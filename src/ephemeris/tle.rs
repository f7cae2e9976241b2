use std::fmt;

use sgp4::{Constants, Elements};

use crate::ephemeris::error::EphemerisError;
use crate::time::Epoch;

/// An SGP4 element set with its precomputed propagation constants.
pub struct ElementSet {
    pub elements: Elements,
    pub constants: Constants,
}

impl ElementSet {
    pub fn from_lines(
        name: Option<String>,
        line1: &str,
        line2: &str,
    ) -> Result<Self, EphemerisError> {
        let elements = Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| EphemerisError::Malformed(format!("invalid TLE: {}", e)))?;
        let constants = Constants::from_elements(&elements)
            .map_err(|e| EphemerisError::Malformed(format!("invalid elements: {}", e)))?;
        Ok(Self {
            elements,
            constants,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.elements.object_name.as_deref()
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    pub fn epoch(&self) -> Epoch {
        Epoch::from_datetime(self.elements.datetime.and_utc())
    }
}

impl fmt::Debug for ElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementSet")
            .field("name", &self.name())
            .field("norad_id", &self.norad_id())
            .field("epoch", &self.epoch())
            .finish()
    }
}

/// Parses TLE text (2- or 3-line sets, possibly several) and picks one set:
/// the one matching `norad_id`, or the first when no id is given.
pub fn parse_tle(content: &str, norad_id: Option<u64>) -> Result<ElementSet, EphemerisError> {
    let sets = split_tle_sets(content);
    if sets.is_empty() {
        return Err(EphemerisError::Empty);
    }

    let mut first_error = None;
    let mut parsed = 0usize;
    for (index, (name, line1, line2)) in sets.into_iter().enumerate() {
        let set = match ElementSet::from_lines(name, &line1, &line2) {
            Ok(set) => set,
            Err(e) => {
                log::warn!("Dropping TLE set {}: {}", index + 1, e);
                first_error.get_or_insert(e);
                continue;
            }
        };
        parsed += 1;

        match norad_id {
            Some(id) if set.norad_id() != id => continue,
            _ => return Ok(set),
        }
    }

    match (norad_id, first_error) {
        (Some(id), _) if parsed > 0 => Err(EphemerisError::Malformed(format!(
            "no TLE set for NORAD {}",
            id
        ))),
        (_, Some(e)) => Err(e),
        _ => Err(EphemerisError::Empty),
    }
}

/// Splits multi-satellite TLE content into `(name, line1, line2)` triples.
fn split_tle_sets(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].trim_start_matches("0 ").to_string();
            result.push((
                Some(name),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            log::debug!("Skipping stray TLE line: {}", lines[i]);
            i += 1;
        }
    }

    result
}
