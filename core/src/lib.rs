//! # pingmap core
//!
//! The concurrent sweep engine.
//!
//! * **[`probe`]**: one reachability check against one address.
//! * **[`pool`]**: bounded set of workers draining the address queue.
//! * **[`coordinator`]**: owns the status table and the scan lifecycle.
//! * **[`sink`]**: observer interface for whoever renders or stores results.
//!
//! The coordinator only talks to the [`probe::ProbeClient`] and
//! [`sink::ResultSink`] traits, so the same engine drives the terminal
//! front end and the simulated probes used in tests.

pub mod coordinator;
pub mod pool;
pub mod probe;
pub mod sink;
