// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod loader;
pub mod validation;

pub use core::{AppConfig, ScannerConfig, TakeoverConfig};
pub use loader::{apply_overrides, ConfigFormat, ConfigLoader};
pub use validation::ConfigValidator;
