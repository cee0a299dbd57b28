//! Vehicle catalog offered on the vehicle step.
//!
//! The standard fleet is compiled in; operators can swap it for their own by
//! importing a CSV export (see [`VehicleCatalog::from_reader`]).

mod parser;

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckBodyType {
    Tray,
    Pantech,
    Tautliner,
    Flatbed,
}

impl TruckBodyType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Tray, Self::Pantech, Self::Tautliner, Self::Flatbed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tray => "Tray",
            Self::Pantech => "Pantech",
            Self::Tautliner => "Tautliner",
            Self::Flatbed => "Flatbed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::ordered()
            .into_iter()
            .find(|body| body.label().eq_ignore_ascii_case(wanted))
    }
}

/// Capacity and options for one bookable vehicle class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub key: String,
    pub name: String,
    /// Tonnes.
    pub max_weight: f64,
    pub max_pallets: u32,
    pub body_types: Vec<TruckBodyType>,
    pub refrigeration: bool,
    pub hiab: bool,
}

impl VehicleSpec {
    pub fn offers_body(&self, body: TruckBodyType) -> bool {
        self.body_types.contains(&body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleCatalog {
    vehicles: Vec<VehicleSpec>,
}

impl VehicleCatalog {
    pub fn standard() -> Self {
        Self {
            vehicles: standard_vehicles(),
        }
    }

    pub fn new(vehicles: Vec<VehicleSpec>) -> Self {
        Self { vehicles }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FleetImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FleetImportError> {
        let vehicles = parser::parse_vehicles(reader)?;
        if vehicles.is_empty() {
            return Err(FleetImportError::Empty);
        }
        Ok(Self { vehicles })
    }

    pub fn vehicles(&self) -> &[VehicleSpec] {
        &self.vehicles
    }

    pub fn find(&self, key: &str) -> Option<&VehicleSpec> {
        self.vehicles.iter().find(|vehicle| vehicle.key == key)
    }
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug)]
pub enum FleetImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, reason: String },
    Empty,
}

impl std::fmt::Display for FleetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FleetImportError::Io(err) => write!(f, "failed to read fleet export: {}", err),
            FleetImportError::Csv(err) => write!(f, "invalid fleet CSV data: {}", err),
            FleetImportError::InvalidRow { line, reason } => {
                write!(f, "fleet CSV line {}: {}", line, reason)
            }
            FleetImportError::Empty => write!(f, "fleet CSV contains no vehicles"),
        }
    }
}

impl std::error::Error for FleetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FleetImportError::Io(err) => Some(err),
            FleetImportError::Csv(err) => Some(err),
            FleetImportError::InvalidRow { .. } | FleetImportError::Empty => None,
        }
    }
}

impl From<std::io::Error> for FleetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for FleetImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

fn vehicle(
    key: &str,
    name: &str,
    max_weight: f64,
    max_pallets: u32,
    body_types: &[TruckBodyType],
    refrigeration: bool,
    hiab: bool,
) -> VehicleSpec {
    VehicleSpec {
        key: key.to_string(),
        name: name.to_string(),
        max_weight,
        max_pallets,
        body_types: body_types.to_vec(),
        refrigeration,
        hiab,
    }
}

fn standard_vehicles() -> Vec<VehicleSpec> {
    use TruckBodyType::*;

    vec![
        vehicle("ute", "1T Ute", 1.0, 1, &[Tray], false, false),
        vehicle("van", "2T Van", 2.0, 2, &[Pantech], true, false),
        vehicle("pantech_4t", "4T Pantech", 4.0, 8, &[Pantech, Tray], true, false),
        vehicle("tautliner_8t", "8T Tautliner", 8.0, 12, &[Tautliner, Pantech], true, true),
        vehicle("rigid_12t", "12T Rigid", 12.0, 14, &[Tautliner, Tray, Flatbed], true, true),
        vehicle("semi_22t", "Semi Trailer", 22.0, 22, &[Tautliner, Flatbed], true, true),
    ]
}
