//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::HashMap;

use gridguard_thermal::{ConductorSpec, Direction};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{RatingError, Result};

pub const FEET_PER_MILE: f64 = 5280.0;
/// Reference temperatures of the two resistance columns in the conductor library.
pub const LIBRARY_T_LO_C: f64 = 25.0;
pub const LIBRARY_T_HI_C: f64 = 50.0;

/// One row of the conductor library, in manufacturer units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConductorProperties {
    pub name: String,
    pub resistance_25c_ohm_per_mile: f64,
    pub resistance_50c_ohm_per_mile: f64,
    pub radius_in: f64,
}

impl ConductorProperties {
    pub fn diameter_in(&self) -> f64 {
        self.radius_in * 2.0
    }

    /// Build the solver input for a line operated up to `max_temp_c`.
    pub fn to_spec(
        &self,
        max_temp_c: f64,
        surface: &ConductorDefaults,
    ) -> gridguard_thermal::Result<ConductorSpec> {
        ConductorSpec::builder()
            .diameter_in(self.diameter_in())
            .emissivity(surface.emissivity)
            .absorptivity(surface.absorptivity)
            .low_reference(
                LIBRARY_T_LO_C,
                self.resistance_25c_ohm_per_mile / FEET_PER_MILE,
            )
            .high_reference(
                LIBRARY_T_HI_C,
                self.resistance_50c_ohm_per_mile / FEET_PER_MILE,
            )
            .max_temp_c(max_temp_c)
            .direction(surface.direction)
            .build()
    }
}

/// Surface coefficients and orientation applied to every conductor in the library.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConductorDefaults {
    pub emissivity: f64,
    pub absorptivity: f64,
    pub direction: Direction,
}

impl Default for ConductorDefaults {
    fn default() -> Self {
        Self {
            emissivity: gridguard_thermal::params::DEFAULT_EMISSIVITY,
            absorptivity: gridguard_thermal::params::DEFAULT_ABSORPTIVITY,
            direction: Direction::EastWest,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusRecord {
    pub name: String,
    pub nominal_voltage_kv: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineRecord {
    pub id: String,
    pub branch_name: String,
    pub bus0: String,
    pub bus1: String,
    pub voltage_kv: f64,
    pub conductor: String,
    pub max_temp_c: f64,
    pub flow_mva: f64,
}

impl LineRecord {
    pub fn with_flow(&self, flow_mva: f64) -> Self {
        Self {
            flow_mva,
            ..self.clone()
        }
    }
}

/// Conductor properties keyed by type name, in load order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConductorLibrary {
    entries: IndexMap<String, ConductorProperties>,
}

impl ConductorLibrary {
    pub fn new(conductors: impl IntoIterator<Item = ConductorProperties>) -> Result<Self> {
        let mut entries = IndexMap::new();
        for conductor in conductors {
            if entries.contains_key(&conductor.name) {
                return Err(RatingError::DuplicateConductor(conductor.name));
            }
            entries.insert(conductor.name.clone(), conductor);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&ConductorProperties> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConductorProperties> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Transmission lines in network order with a unique-identifier index.
#[derive(Debug, Clone, Default)]
pub struct LineLibrary {
    records: Vec<LineRecord>,
    index: HashMap<String, usize>,
}

impl LineLibrary {
    pub fn new(records: Vec<LineRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if index.insert(record.id.clone(), position).is_some() {
                return Err(RatingError::DuplicateLine(record.id.clone()));
            }
        }
        Ok(Self { records, index })
    }

    pub fn get(&self, id: &str) -> Option<&LineRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[LineRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy with refreshed flows; lines absent from `flows` keep their current value.
    pub fn with_flows(&self, flows: &HashMap<String, f64>) -> Self {
        let records = self
            .records
            .iter()
            .map(|record| match flows.get(&record.id) {
                Some(&flow) => record.with_flow(flow),
                None => record.clone(),
            })
            .collect();
        Self {
            records,
            index: self.index.clone(),
        }
    }
}

/// Static reference data for one grid, shared read-only between evaluations.
#[derive(Debug, Clone, Default)]
pub struct GridData {
    pub lines: LineLibrary,
    pub conductors: ConductorLibrary,
}

impl GridData {
    pub fn new(lines: LineLibrary, conductors: ConductorLibrary) -> Self {
        Self { lines, conductors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, flow: f64) -> LineRecord {
        LineRecord {
            id: id.into(),
            branch_name: format!("{id} branch"),
            bus0: "B1".into(),
            bus1: "B2".into(),
            voltage_kv: 138.0,
            conductor: "Oriole".into(),
            max_temp_c: 75.0,
            flow_mva: flow,
        }
    }

    #[test]
    fn duplicate_line_ids_are_rejected() {
        let err = LineLibrary::new(vec![line("L0", 1.0), line("L0", 2.0)]).unwrap_err();
        assert!(matches!(err, RatingError::DuplicateLine(id) if id == "L0"));
    }

    #[test]
    fn lookup_by_id_preserves_order() {
        let library = LineLibrary::new(vec![line("L1", 1.0), line("L0", 2.0)]).unwrap();
        assert_eq!(library.records()[0].id, "L1");
        assert_eq!(library.get("L0").unwrap().flow_mva, 2.0);
        assert!(library.get("L9").is_none());
    }

    #[test]
    fn refreshed_flows_leave_structure_untouched() {
        let library = LineLibrary::new(vec![line("L0", 1.0), line("L1", 2.0)]).unwrap();
        let flows = HashMap::from([("L1".to_string(), 50.0)]);
        let refreshed = library.with_flows(&flows);
        assert_eq!(refreshed.get("L0").unwrap().flow_mva, 1.0);
        assert_eq!(refreshed.get("L1").unwrap().flow_mva, 50.0);
        assert_eq!(library.get("L1").unwrap().flow_mva, 2.0);
    }

    #[test]
    fn conductor_spec_uses_library_units() {
        let props = ConductorProperties {
            name: "336.4 ACSR 30/7 ORIOLE".into(),
            resistance_25c_ohm_per_mile: 0.2708,
            resistance_50c_ohm_per_mile: 0.2974,
            radius_in: 0.37035,
        };
        let spec = props.to_spec(75.0, &ConductorDefaults::default()).unwrap();
        assert_eq!(spec.diameter_in(), 0.7407);
        assert_eq!(spec.r_lo_ohm_per_ft(), 0.2708 / 5280.0);
        assert_eq!(spec.r_hi_ohm_per_ft(), 0.2974 / 5280.0);
        assert_eq!(spec.t_lo_c(), 25.0);
        assert_eq!(spec.t_hi_c(), 50.0);
        assert_eq!(spec.emissivity(), 0.8);
    }

    #[test]
    fn duplicate_conductor_names_are_rejected() {
        let props = ConductorProperties {
            name: "Drake".into(),
            resistance_25c_ohm_per_mile: 0.1166,
            resistance_50c_ohm_per_mile: 0.1278,
            radius_in: 0.554,
        };
        assert!(ConductorLibrary::new(vec![props.clone(), props]).is_err());
    }
}
