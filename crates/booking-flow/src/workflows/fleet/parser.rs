use super::{FleetImportError, TruckBodyType, VehicleSpec};
use serde::Deserialize;
use std::io::Read;

pub(crate) fn parse_vehicles<R: Read>(reader: R) -> Result<Vec<VehicleSpec>, FleetImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut vehicles = Vec::new();

    for (offset, record) in csv_reader.deserialize::<FleetRow>().enumerate() {
        // header occupies line 1
        let line = offset + 2;
        let row = record?;
        vehicles.push(row.into_spec(line)?);
    }

    Ok(vehicles)
}

#[derive(Debug, Deserialize)]
struct FleetRow {
    key: String,
    name: String,
    max_weight_tonnes: f64,
    max_pallets: u32,
    body_types: String,
    #[serde(default)]
    refrigeration: String,
    #[serde(default)]
    hiab: String,
}

impl FleetRow {
    fn into_spec(self, line: usize) -> Result<VehicleSpec, FleetImportError> {
        if self.key.is_empty() {
            return Err(invalid(line, "vehicle key is empty"));
        }
        if !self.max_weight_tonnes.is_finite() || self.max_weight_tonnes <= 0.0 {
            return Err(invalid(
                line,
                format!("max weight {} must be positive", self.max_weight_tonnes),
            ));
        }

        let mut body_types = Vec::new();
        for raw in self.body_types.split(';').filter(|raw| !raw.trim().is_empty()) {
            let body = TruckBodyType::parse(raw)
                .ok_or_else(|| invalid(line, format!("unknown body type '{}'", raw.trim())))?;
            if !body_types.contains(&body) {
                body_types.push(body);
            }
        }
        if body_types.is_empty() {
            return Err(invalid(line, "at least one body type is required"));
        }

        Ok(VehicleSpec {
            key: self.key,
            name: self.name,
            max_weight: self.max_weight_tonnes,
            max_pallets: self.max_pallets,
            body_types,
            refrigeration: parse_flag(&self.refrigeration),
            hiab: parse_flag(&self.hiab),
        })
    }
}

fn invalid(line: usize, reason: impl Into<String>) -> FleetImportError {
    FleetImportError::InvalidRow {
        line,
        reason: reason.into(),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}
