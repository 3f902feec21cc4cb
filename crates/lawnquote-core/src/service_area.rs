//! South Island locality filter applied to address suggestions.

/// Lower-case locality and region names the business will travel to.
pub const SERVICE_AREA_LOCALITIES: &[&str] = &[
    // Otago
    "dunedin",
    "mosgiel",
    "oamaru",
    "alexandra",
    "cromwell",
    "queenstown",
    "wanaka",
    "balclutha",
    "milton",
    "palmerston",
    "port chalmers",
    "otago",
    // Canterbury
    "christchurch",
    "timaru",
    "ashburton",
    "rangiora",
    "kaiapoi",
    "rolleston",
    "lincoln",
    "geraldine",
    "temuka",
    "canterbury",
    // Southland
    "invercargill",
    "gore",
    "winton",
    "te anau",
    "riverton",
    "southland",
    // West Coast
    "greymouth",
    "hokitika",
    "westport",
    "reefton",
    "west coast",
    // Nelson, Tasman, Marlborough
    "nelson",
    "richmond",
    "blenheim",
    "picton",
    "motueka",
    "takaka",
    "marlborough",
    "tasman",
];

/// True when the text mentions any service-area locality (substring match).
#[must_use]
pub fn is_in_service_area(text: &str) -> bool {
    let lower = text.to_lowercase();
    SERVICE_AREA_LOCALITIES
        .iter()
        .any(|locality| lower.contains(locality))
}

/// Appends `region_hint` to queries that name no known locality so providers
/// rank local results first.
#[must_use]
pub fn with_region_hint(query: &str, region_hint: &str) -> String {
    let query = query.trim();
    if region_hint.trim().is_empty() || is_in_service_area(query) {
        query.to_string()
    } else {
        format!("{query} {}", region_hint.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_localities_case_insensitively() {
        assert!(is_in_service_area("12 Main Street, Mornington, DUNEDIN 9011"));
        assert!(is_in_service_area("1 Beach Road, Te Anau"));
        assert!(!is_in_service_area("1 Queen Street, Auckland Central, Auckland"));
    }

    #[test]
    fn region_hint_only_added_when_missing() {
        assert_eq!(with_region_hint("12 Main St", "Dunedin"), "12 Main St Dunedin");
        assert_eq!(
            with_region_hint("12 Main St Mosgiel", "Dunedin"),
            "12 Main St Mosgiel"
        );
        assert_eq!(with_region_hint(" 12 Main St ", ""), "12 Main St");
    }
}
