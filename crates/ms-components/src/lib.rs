//! ms-components: contributor library for mission segments.
//!
//! Each component implements [`ms_mission::Contributor`] and owns the
//! `energy.<tag>` subtree of the segment conditions. Components run in the
//! order they are added to a segment, so producers come before consumers:
//!
//! 1. [`StandardAtmosphere`] writes the freestream state
//! 2. [`ElectricRotor`]s balance motor and rotor torque
//! 3. [`ElectricBus`] sums the rotor power draw
//! 4. [`FuelCellStack`] supplies the bus and burns hydrogen
//! 5. [`CoolingLoop`] rejects the waste heat
//!
//! [`ParasiteDrag`] reads the freestream too and, with the rotor thrust,
//! feeds the force balance of accelerating segments.
//!
//! # Example
//!
//! ```no_run
//! use ms_components::{ConstantMassFlow, StandardAtmosphere};
//! use ms_core::units::{kg, kgps, m, mps, s};
//! use ms_mission::{Extent, Profile, Segment};
//!
//! let profile = Profile::new(Extent::Duration(s(600.0)), mps(60.0))
//!     .with_altitude(m(1_000.0))
//!     .with_initial_mass(kg(3_000.0));
//!
//! let mut segment = Segment::new("cruise", profile)
//!     .with_contributor(StandardAtmosphere::new("atmosphere"))
//!     .with_contributor(ConstantMassFlow::new("burn", kgps(0.01)).unwrap());
//!
//! let outcome = segment.evaluate(None).unwrap();
//! println!("{outcome:?}");
//! ```

pub mod atmosphere;
pub mod bus;
pub mod common;
pub mod cooling;
pub mod drag;
pub mod electric_rotor;
pub mod error;
pub mod fuel_cell;
pub mod mass_flow;

// Re-exports
pub use atmosphere::{AtmosphereState, StandardAtmosphere};
pub use bus::ElectricBus;
pub use cooling::CoolingLoop;
pub use drag::ParasiteDrag;
pub use electric_rotor::{ElectricRotor, Motor, Rotor, torque_balance_residual};
pub use error::{ComponentError, ComponentResult};
pub use fuel_cell::{CellParameters, FuelCellStack};
pub use mass_flow::ConstantMassFlow;
