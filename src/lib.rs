//! KalaConnect client: artisan storytelling, photo studio, pricing, and trend
//! tools backed by a remote AI API that degrades to simulated results.

pub mod app;
pub mod config;
pub mod datauri;
pub mod degrade;
pub mod device;
pub mod features;
pub mod locale;
pub mod mock;
pub mod prefs;
pub mod remote;
pub mod session;
pub mod status;
pub mod storage;

#[cfg(test)]
pub mod test_helpers;
