//! Host runtime: the polling actor that runs holiday check cycles and
//! publishes notifications and catalog snapshots to the presentation layer.

pub mod poller;

pub use poller::{
    CycleReport, CycleSnapshot, NO_HOLIDAYS_MESSAGE, Poller, PollerConfig, PollerHandle, Trigger,
    fetch_catalog,
};
