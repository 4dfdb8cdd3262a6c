//! Simulated actuator bus.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::HashMap;

// Internal
use super::{ActIfError, ActuatorInterface};
use comms_if::eqpt::act::{ActDems, ActId, ActSense, ACT_IDS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ideal simulated actuators.
///
/// Written demands are reached instantly, reads report the last demanded
/// positions. All actuators start at zero, the home configuration.
pub struct SimActuators {
    enabled: bool,
    pos_rad: HashMap<ActId, f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimActuators {
    pub fn new() -> Self {
        Self {
            enabled: false,
            pos_rad: ACT_IDS.iter().map(|id| (*id, 0.0)).collect(),
        }
    }
}

impl Default for SimActuators {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorInterface for SimActuators {
    fn enable_all(&mut self) -> Result<(), ActIfError> {
        self.enabled = true;
        Ok(())
    }

    fn read_all(&mut self) -> Result<ActSense, ActIfError> {
        if !self.enabled {
            return Err(ActIfError::NotEnabled);
        }

        Ok(ActSense {
            pos_rad: self.pos_rad.clone(),
        })
    }

    fn write_all(&mut self, dems: &ActDems) -> Result<(), ActIfError> {
        if !self.enabled {
            return Err(ActIfError::NotEnabled);
        }

        for (id, pos_rad) in dems.pos_rad.iter() {
            self.pos_rad.insert(*id, *pos_rad);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_requires_enable() {
        let mut sim = SimActuators::new();

        assert!(matches!(sim.read_all(), Err(ActIfError::NotEnabled)));
        assert!(matches!(
            sim.write_all(&ActDems::empty()),
            Err(ActIfError::NotEnabled)
        ));

        sim.enable_all().unwrap();
        assert!(sim.read_all().is_ok());
    }

    #[test]
    fn test_reads_echo_demands() {
        let mut sim = SimActuators::new();
        sim.enable_all().unwrap();

        // Starts at home
        let sense = sim.read_all().unwrap();
        for id in ACT_IDS.iter() {
            assert_eq!(sense.pos_rad[id], 0.0);
        }

        let mut dems = ActDems::empty();
        dems.pos_rad.insert(ActId::Joint1, 0.3);
        dems.pos_rad.insert(ActId::Joint2, -0.1);
        dems.pos_rad.insert(ActId::Joint3, 0.05);
        sim.write_all(&dems).unwrap();

        let sense = sim.read_all().unwrap();
        assert_eq!(sense.pos_rad[&ActId::Joint1], 0.3);
        assert_eq!(sense.pos_rad[&ActId::Joint2], -0.1);
        assert_eq!(sense.pos_rad[&ActId::Joint3], 0.05);
    }
}
