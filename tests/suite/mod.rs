mod concurrency;
mod config;
mod lifecycle;
mod reconciliation;
