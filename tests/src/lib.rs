//! End-to-end sweeps through the public coordinator API.

#[cfg(test)]
mod sweep;
