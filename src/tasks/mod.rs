//! Background Tasks Module
//!
//! Contains background tasks owned by a cache instance.
//!
//! # Tasks
//! - TTL Sweep: Reclaims expired entries once per sweep interval

mod sweep;

pub(crate) use sweep::spawn_sweep_task;
