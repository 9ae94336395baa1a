//! SmartBin edge controller library.
//!
//! Exposes the pure-logic modules for integration testing.  Peripheral
//! adapters that need a real device (`rppal`, `serialport`, `opencv`,
//! `ort`) sit behind cargo features, so the domain core builds and tests
//! on any host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod sensors;
pub mod vision;
