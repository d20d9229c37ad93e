pub mod accessors;
pub mod config;
pub mod stadium;

pub mod models {
    pub mod general;
    pub mod odds;
    pub mod racer;
    pub mod race;
    pub mod prediction;
    pub mod ranking;
    pub mod stats;
}

pub mod store {
    pub mod memory;
    pub mod postgres;

    mod race_store;
    pub use race_store::{insert_in_batches, BatchLoad, RaceStore};
}

pub mod helpers {
    pub mod logging;
    pub mod math;
    pub mod validation;

    pub mod fairings {
        pub mod cors;
    }
}
