//! Brazilian state name lookup table.
//!
//! Maps lowercase state names, plus unaccented spellings that geocoders
//! and users commonly produce, to two-letter state codes for the 26
//! states and the Federal District.

use std::sync::LazyLock;

/// Lowercase state names and alternate spellings, mapped to their codes.
///
/// The unaccented form of "Pará" is intentionally absent: `"para"` is a
/// substring of "paraná", "paraíba" and many street names.
pub const STATE_NAMES: &[(&str, &str)] = &[
    ("acre", "AC"),
    ("alagoas", "AL"),
    ("amapá", "AP"),
    ("amapa", "AP"),
    ("amazonas", "AM"),
    ("bahia", "BA"),
    ("ceará", "CE"),
    ("ceara", "CE"),
    ("distrito federal", "DF"),
    ("espírito santo", "ES"),
    ("espirito santo", "ES"),
    ("goiás", "GO"),
    ("goias", "GO"),
    ("maranhão", "MA"),
    ("maranhao", "MA"),
    ("mato grosso", "MT"),
    ("mato grosso do sul", "MS"),
    ("minas gerais", "MG"),
    ("pará", "PA"),
    ("paraíba", "PB"),
    ("paraiba", "PB"),
    ("paraná", "PR"),
    ("parana", "PR"),
    ("pernambuco", "PE"),
    ("piauí", "PI"),
    ("piaui", "PI"),
    ("rio de janeiro", "RJ"),
    ("rio grande do norte", "RN"),
    ("rio grande do sul", "RS"),
    ("rondônia", "RO"),
    ("rondonia", "RO"),
    ("roraima", "RR"),
    ("santa catarina", "SC"),
    ("são paulo", "SP"),
    ("sao paulo", "SP"),
    ("sergipe", "SE"),
    ("tocantins", "TO"),
];

/// [`STATE_NAMES`] ordered longest key first, so a substring search
/// prefers "mato grosso do sul" over "mato grosso".
static BY_LENGTH_DESC: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    let mut names = STATE_NAMES.to_vec();
    names.sort_by(|(a, _), (b, _)| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    names
});

/// Returns the state code whose name appears anywhere in `segment`.
///
/// `segment` is lowercased before matching. When several names match, the
/// longest one wins. Names are matched as NFC-composed text, the form
/// Nominatim returns; decomposed accents (`"Goia\u{301}s"`) do not match.
#[must_use]
pub fn find_state_in(segment: &str) -> Option<&'static str> {
    let lower = segment.to_lowercase();
    if lower.trim().is_empty() {
        return None;
    }

    BY_LENGTH_DESC
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, code)| *code)
}

/// Returns the state code for an exact (case-insensitive) state name.
#[must_use]
pub fn state_code(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_lowercase();
    STATE_NAMES
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, code)| *code)
}

/// Returns the canonical (accented, title-cased) name for a state code.
///
/// Returns `None` for unrecognized codes.
#[must_use]
pub fn state_name(code: &str) -> Option<&'static str> {
    let name = match code.trim().to_uppercase().as_str() {
        "AC" => "Acre",
        "AL" => "Alagoas",
        "AP" => "Amapá",
        "AM" => "Amazonas",
        "BA" => "Bahia",
        "CE" => "Ceará",
        "DF" => "Distrito Federal",
        "ES" => "Espírito Santo",
        "GO" => "Goiás",
        "MA" => "Maranhão",
        "MT" => "Mato Grosso",
        "MS" => "Mato Grosso do Sul",
        "MG" => "Minas Gerais",
        "PA" => "Pará",
        "PB" => "Paraíba",
        "PR" => "Paraná",
        "PE" => "Pernambuco",
        "PI" => "Piauí",
        "RJ" => "Rio de Janeiro",
        "RN" => "Rio Grande do Norte",
        "RS" => "Rio Grande do Sul",
        "RO" => "Rondônia",
        "RR" => "Roraima",
        "SC" => "Santa Catarina",
        "SP" => "São Paulo",
        "SE" => "Sergipe",
        "TO" => "Tocantins",
        _ => return None,
    };
    Some(name)
}
