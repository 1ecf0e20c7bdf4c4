pub mod builder;
pub mod engine;
pub mod ledger;
pub mod metrics;
pub mod review;
pub mod state;
