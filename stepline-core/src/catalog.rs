//! Step catalogs: the ordered, immutable story a timeline plays through

use crate::{Error, Result, Step};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fault a renderer can depict for a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaultMode {
    /// Identifier stored as the timeline's failure mode
    pub id: String,
    /// Display label
    pub label: String,
}

impl FaultMode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Ordered sequence of steps plus the fault modes it supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    steps: Vec<Step>,
    fault_modes: Vec<FaultMode>,
}

impl Catalog {
    /// Creates a validated catalog
    ///
    /// Every step needs a positive duration and an id that no other step uses.
    /// Fault mode ids must be unique as well. An empty step list is allowed.
    pub fn new(steps: Vec<Step>, fault_modes: Vec<FaultMode>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(steps.len());
        for step in &steps {
            if step.duration_ms == 0 {
                return Err(Error::ZeroDuration(step.id.clone()));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(Error::DuplicateStepId(step.id.clone()));
            }
        }

        let mut seen = HashSet::with_capacity(fault_modes.len());
        for mode in &fault_modes {
            if !seen.insert(mode.id.as_str()) {
                return Err(Error::DuplicateFaultMode(mode.id.clone()));
            }
        }

        Ok(Self { steps, fault_modes })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn fault_modes(&self) -> &[FaultMode] {
        &self.fault_modes
    }

    /// Number of steps, fixed for the lifetime of the catalog
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Gets a step by ID
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Gets a fault mode by ID
    pub fn fault_mode(&self, id: &str) -> Option<&FaultMode> {
        self.fault_modes.iter().find(|m| m.id == id)
    }

    /// Sum of all planned step durations at speed 1
    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct CatalogFile<S> {
    steps: S,
    #[serde(default)]
    fault_modes: Vec<FaultMode>,
}

#[cfg(feature = "serde")]
impl Catalog {
    /// Reads and validates a catalog from JSON
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let file: CatalogFile<Vec<Step>> = serde_json::from_reader(reader)?;
        Self::new(file.steps, file.fault_modes)
    }

    /// Writes the catalog as pretty-printed JSON
    pub fn to_json_writer<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let file = CatalogFile {
            steps: &self.steps,
            fault_modes: self.fault_modes.clone(),
        };
        serde_json::to_writer_pretty(writer, &file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_duration() {
        let steps = vec![Step::new("a", "A", 1000), Step::new("b", "B", 0)];
        match Catalog::new(steps, vec![]) {
            Err(Error::ZeroDuration(id)) => assert_eq!(id, "b"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let steps = vec![Step::new("a", "A", 1000), Step::new("a", "Again", 500)];
        assert!(matches!(
            Catalog::new(steps, vec![]),
            Err(Error::DuplicateStepId(id)) if id == "a"
        ));

        let modes = vec![FaultMode::new("x", "X"), FaultMode::new("x", "X2")];
        assert!(matches!(
            Catalog::new(vec![], modes),
            Err(Error::DuplicateFaultMode(id)) if id == "x"
        ));
    }

    #[test]
    fn test_lookup_and_totals() {
        let catalog = Catalog::new(
            vec![Step::new("a", "A", 1000), Step::new("b", "B", 2500)],
            vec![FaultMode::new("timeout", "Timeout")],
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.total_duration_ms(), 3500);
        assert_eq!(catalog.step("b").map(|s| s.duration_ms), Some(2500));
        assert!(catalog.step("c").is_none());
        assert_eq!(
            catalog.fault_mode("timeout").map(|m| m.label.as_str()),
            Some("Timeout")
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_is_validated() {
        let json = r#"{"steps":[{"id":"a","label":"A","duration_ms":0}]}"#;
        assert!(matches!(
            Catalog::from_json_reader(json.as_bytes()),
            Err(Error::ZeroDuration(_))
        ));

        let json = r#"{
            "steps": [
                {"id": "a", "label": "A", "duration_ms": 800},
                {"id": "b", "label": "B", "description": "second", "duration_ms": 1200}
            ],
            "fault_modes": [{"id": "slow", "label": "Slow"}]
        }"#;
        let catalog = Catalog::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.steps()[1].description.as_deref(), Some("second"));
        assert_eq!(catalog.fault_modes().len(), 1);

        let mut buffer = Vec::new();
        catalog.to_json_writer(&mut buffer).unwrap();
        assert_eq!(Catalog::from_json_reader(buffer.as_slice()).unwrap(), catalog);
    }
}
