use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Id of the one non-add-on service every visit includes.
pub const BASE_SERVICE_ID: &str = "mowing";

/// Suburbs shown as quick picks when the address box is empty.
pub const POPULAR_SUBURBS: &[&str] = &[
    "St Clair",
    "South Dunedin",
    "Mornington",
    "Andersons Bay",
    "Roslyn",
    "Green Island",
    "Mosgiel",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Flat per-visit price in whole dollars.
    pub base_price: f64,
    #[serde(default)]
    pub price_label: Option<String>,
    pub is_addon: bool,
    /// Priced by a size selection (dog cleanup).
    #[serde(default)]
    pub requires_size: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Central,
    North,
    South,
    Hill,
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Central => write!(f, "central"),
            Zone::North => write!(f, "north"),
            Zone::South => write!(f, "south"),
            Zone::Hill => write!(f, "hill"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suburb {
    pub name: String,
    pub postcode: String,
    pub zone: Zone,
    pub travel_multiplier: f64,
}

/// Services and suburbs the pricing engine reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub services: Vec<Service>,
    pub suburbs: Vec<Suburb>,
}

impl Catalog {
    /// The catalog the business launched with.
    #[must_use]
    pub fn builtin() -> Self {
        let service = |id: &str, name: &str, description: &str, price: f64, label: Option<&str>| {
            Service {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                base_price: price,
                price_label: label.map(str::to_string),
                is_addon: id != BASE_SERVICE_ID,
                requires_size: id == "dogcleanup",
            }
        };

        let services = vec![
            service("mowing", "Lawn Mowing", "Full lawn cut with clippings collected", 40.0, None),
            service("edging", "Edging", "Clean edges along paths and gardens", 15.0, Some("+$15")),
            service(
                "hedges",
                "Hedge Trimming",
                "Keep your hedges neat and tidy",
                25.0,
                Some("From $25"),
            ),
            service(
                "weedspray",
                "Weed Spray",
                "Target weeds in lawn and paths",
                20.0,
                Some("+$20"),
            ),
            service(
                "dogcleanup",
                "Dog Cleanup",
                "Pre-mow cleanup of dog waste",
                10.0,
                Some("From $10"),
            ),
            service("leaves", "Leaf Cleanup", "Seasonal leaf removal", 20.0, Some("+$20")),
        ];

        let suburbs = BUILTIN_SUBURBS
            .iter()
            .map(|&(name, postcode, zone, travel_multiplier)| Suburb {
                name: name.to_string(),
                postcode: postcode.to_string(),
                zone,
                travel_multiplier,
            })
            .collect();

        Self { services, suburbs }
    }

    /// Parse and validate a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text does not parse or fails validation.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        validate_catalog(&catalog)?;
        Ok(catalog)
    }

    #[must_use]
    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Case-insensitive exact lookup.
    #[must_use]
    pub fn suburb(&self, name: &str) -> Option<&Suburb> {
        let name = name.trim();
        self.suburbs
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Base price of the included service; falls back to 40 if a catalog
    /// somehow lacks it.
    #[must_use]
    pub fn base_price(&self) -> f64 {
        self.service(BASE_SERVICE_ID).map_or(40.0, |s| s.base_price)
    }

    #[must_use]
    pub fn suburbs_in_zone(&self, zone: Zone) -> Vec<&Suburb> {
        self.suburbs.iter().filter(|s| s.zone == zone).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Load and validate a catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    Catalog::from_yaml_str(&content)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    if catalog.services.is_empty() {
        return Err(ConfigError::Validation(
            "catalog must define at least one service".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for service in &catalog.services {
        if service.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "service id must be non-empty".to_string(),
            ));
        }
        if !seen_ids.insert(service.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate service id: '{}'",
                service.id
            )));
        }
        if !(service.base_price.is_finite() && service.base_price > 0.0) {
            return Err(ConfigError::Validation(format!(
                "service '{}' has invalid base price {}; must be positive",
                service.id, service.base_price
            )));
        }
    }

    let base: Vec<&Service> = catalog.services.iter().filter(|s| !s.is_addon).collect();
    match base.as_slice() {
        [only] if only.id == BASE_SERVICE_ID => {}
        [only] => {
            return Err(ConfigError::Validation(format!(
                "base service must be '{BASE_SERVICE_ID}', found '{}'",
                only.id
            )));
        }
        _ => {
            return Err(ConfigError::Validation(format!(
                "catalog must define exactly one non-add-on service, found {}",
                base.len()
            )));
        }
    }

    let mut seen_suburbs = HashSet::new();
    for suburb in &catalog.suburbs {
        if suburb.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "suburb name must be non-empty".to_string(),
            ));
        }
        if !seen_suburbs.insert(suburb.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate suburb: '{}'",
                suburb.name
            )));
        }
        if !(1.0..=2.0).contains(&suburb.travel_multiplier) {
            return Err(ConfigError::Validation(format!(
                "suburb '{}' has invalid travel multiplier {}; must be within 1.0..=2.0",
                suburb.name, suburb.travel_multiplier
            )));
        }
    }

    Ok(())
}

const BUILTIN_SUBURBS: &[(&str, &str, Zone, f64)] = &[
    // Central
    ("Dunedin Central", "9016", Zone::Central, 1.0),
    ("South Dunedin", "9012", Zone::Central, 1.0),
    ("St Kilda", "9012", Zone::Central, 1.0),
    ("St Clair", "9012", Zone::Central, 1.0),
    ("Caversham", "9012", Zone::Central, 1.0),
    ("Forbury", "9012", Zone::Central, 1.0),
    // North
    ("North Dunedin", "9016", Zone::North, 1.0),
    ("Opoho", "9010", Zone::North, 1.05),
    ("Dalmore", "9010", Zone::North, 1.05),
    ("Normanby", "9010", Zone::North, 1.0),
    ("Pine Hill", "9010", Zone::North, 1.1),
    ("Ravensbourne", "9022", Zone::North, 1.15),
    ("Roseneath", "9010", Zone::North, 1.05),
    ("Sawyers Bay", "9023", Zone::North, 1.2),
    ("Port Chalmers", "9023", Zone::North, 1.25),
    // South
    ("Corstorphine", "9013", Zone::South, 1.05),
    ("Kenmure", "9011", Zone::South, 1.0),
    ("Mornington", "9011", Zone::South, 1.0),
    ("Kew", "9011", Zone::South, 1.0),
    ("Musselburgh", "9013", Zone::South, 1.0),
    ("Andersons Bay", "9013", Zone::South, 1.0),
    ("Waverley", "9013", Zone::South, 1.0),
    ("Shiel Hill", "9013", Zone::South, 1.05),
    ("Green Island", "9018", Zone::South, 1.1),
    ("Abbotsford", "9018", Zone::South, 1.1),
    ("Concord", "9018", Zone::South, 1.1),
    ("Fairfield", "9018", Zone::South, 1.1),
    ("Mosgiel", "9024", Zone::South, 1.2),
    // Hill suburbs
    ("Maori Hill", "9010", Zone::Hill, 1.1),
    ("Roslyn", "9010", Zone::Hill, 1.05),
    ("Belleknowes", "9010", Zone::Hill, 1.1),
    ("Wakari", "9010", Zone::Hill, 1.1),
    ("Halfway Bush", "9010", Zone::Hill, 1.15),
    ("Helensburgh", "9010", Zone::Hill, 1.1),
    ("Brockville", "9010", Zone::Hill, 1.15),
];
