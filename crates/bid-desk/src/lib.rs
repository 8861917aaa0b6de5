//! Decision engine for importing auction vehicles from the Gulf region into
//! the German resale market: landed cost, maximum bid, mechanic consensus,
//! the traffic-light verdict, and normalization of AI damage reports.

pub mod config;
pub mod damage;
pub mod desk;
pub mod error;
pub mod telemetry;
pub mod valuation;
