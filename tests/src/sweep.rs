mod cancellation;
mod lifecycle;
mod loopback;
mod snapshots;
mod support;
