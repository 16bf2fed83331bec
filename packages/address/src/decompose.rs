//! Street/city/state extraction from geocoder display names.
//!
//! Nominatim returns Brazilian addresses as a single comma-separated
//! string whose shape depends on the feature type:
//! - Street match: `"Rua 10, Setor Central, Goiânia, Microrregião de Goiânia, Goiás, Brasil"`
//! - Point of interest: `"Praça Cívica, Centro, Goiânia, Região Geográfica Imediata de Goiânia, ..., Goiás, Região Centro-Oeste, 74000-000, Brasil"`
//! - Bare place: `"Local desconhecido"`
//!
//! No fixed position is reliable, so decomposition anchors on the state
//! name (the one segment that can be recognized from a fixed table) and
//! searches backward from it for the city, skipping administrative
//! region labels and neighborhood-like segments.

use marketplace_address_models::ParsedAddress;

use crate::states;

/// Administrative/regional labels that never name a city.
pub const REGION_MARKERS: &[&str] = &[
    "região",
    "imediata",
    "intermediária",
    "metropolitana",
    "microrregião",
];

/// Neighborhood-like terms rejected during the backward city search.
pub const CITY_DENYLIST: &[&str] = &["setor"];

/// Extra terms rejected when decomposing a reverse-geocoded map click.
pub const MAP_CLICK_EXTRA_DENYLIST: &[&str] = &["quadra"];

/// Country suffix stripped before state matching.
const COUNTRY_SUFFIX: &str = "brasil";

/// A city candidate must be longer than this many characters.
const MIN_CITY_LEN_EXCLUSIVE: usize = 2;

/// Decomposes a raw address using the default denylist.
///
/// See [`decompose_with`].
#[must_use]
pub fn decompose(raw: &str) -> ParsedAddress {
    decompose_with(raw, &[])
}

/// Decomposes a raw, comma-separated geocoder address into street, city
/// and state.
///
/// `extra_denylist` adds terms (matched case-insensitively as substrings)
/// that disqualify a segment during the backward city search, on top of
/// [`CITY_DENYLIST`]. Pass [`MAP_CLICK_EXTRA_DENYLIST`] for results of a
/// map click.
///
/// Never fails: unresolved fields are returned as empty strings.
#[must_use]
pub fn decompose_with(raw: &str, extra_denylist: &[&str]) -> ParsedAddress {
    if raw.trim().is_empty() {
        return ParsedAddress::street_only(raw);
    }

    let segments: Vec<&str> = raw.split(',').map(str::trim).collect();

    let anchor = find_state_anchor(&segments);

    let mut city = anchor
        .filter(|(index, _)| *index > 0)
        .and_then(|(index, _)| find_city_before(&segments, index, extra_denylist))
        .map(str::to_string)
        .unwrap_or_default();

    let anchored_state = anchor.map_or("", |(_, code)| code);

    if city.is_empty() {
        city = fallback_city(&segments, anchored_state)
            .map(str::to_string)
            .unwrap_or_default();
    }

    let state = if anchored_state.is_empty() {
        segments
            .last()
            .and_then(|last| fallback_state(last))
            .unwrap_or_default()
    } else {
        anchored_state
    };

    if state.is_empty() {
        log::debug!("No state found in address {raw:?}");
    }

    let street = match segments.first() {
        Some(first) if !first.is_empty() => (*first).to_string(),
        _ if city.is_empty() && state.is_empty() => raw.trim().to_string(),
        _ => String::new(),
    };

    ParsedAddress {
        street,
        city,
        state: state.to_string(),
    }
}

/// Scans segments last to first and returns the index and code of the
/// first one containing a known state name.
fn find_state_anchor(segments: &[&str]) -> Option<(usize, &'static str)> {
    segments.iter().enumerate().rev().find_map(|(index, segment)| {
        states::find_state_in(&strip_country(segment)).map(|code| (index, code))
    })
}

/// Scans from `state_index - 1` down to 1 for the closest segment that
/// passes every city filter. Index 0 is the street and is never a city.
fn find_city_before<'a>(
    segments: &[&'a str],
    state_index: usize,
    extra_denylist: &[&str],
) -> Option<&'a str> {
    (1..state_index)
        .rev()
        .map(|index| segments[index])
        .find(|segment| is_city_candidate(segment, extra_denylist))
}

/// Looser city search used when the anchored search found nothing.
fn fallback_city<'a>(segments: &[&'a str], state: &str) -> Option<&'a str> {
    if segments.len() >= 3 {
        let second = segments[1];
        if is_long_enough(second) && !contains_region(second) && !is_numeric(second) {
            return Some(second);
        }
    }

    let last = segments.len().saturating_sub(1);
    segments.get(1..last)?.iter().copied().find(|segment| {
        is_long_enough(segment)
            && !is_numeric(segment)
            && !contains_region(segment)
            && (state.is_empty() || !segment.contains(state))
    })
}

/// Last resort for the state: the final segment, without its country
/// suffix, is looked up as an exact state name.
fn fallback_state(last: &str) -> Option<&'static str> {
    states::state_code(&strip_country(last))
}

fn is_city_candidate(segment: &str, extra_denylist: &[&str]) -> bool {
    let lower = segment.to_lowercase();

    !REGION_MARKERS.iter().any(|marker| lower.contains(marker))
        && is_long_enough(segment)
        && !is_numeric(segment)
        && !CITY_DENYLIST
            .iter()
            .chain(extra_denylist)
            .any(|term| lower.contains(&term.to_lowercase()))
}

/// Lowercases a segment and removes a trailing country name.
fn strip_country(segment: &str) -> String {
    let lower = segment.trim().to_lowercase();
    if let Some(rest) = lower.strip_suffix(COUNTRY_SUFFIX) {
        return rest
            .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
            .to_string();
    }
    lower
}

fn contains_region(segment: &str) -> bool {
    segment.to_lowercase().contains("região")
}

fn is_long_enough(segment: &str) -> bool {
    segment.trim().chars().count() > MIN_CITY_LEN_EXCLUSIVE
}

fn is_numeric(segment: &str) -> bool {
    let trimmed = segment.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}
