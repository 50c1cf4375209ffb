// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uanode-config
//!
//! Model description and host configuration loading for uanode.
//!
//! ## Features
//!
//! - **Model Descriptions**: Type schemas, child slots and encoded defaults
//!   in YAML, TOML or JSON
//! - **Model Merging**: Several descriptions, each with its own namespace
//!   table, merged into one [`NodeTypeRegistry`](uanode_core::NodeTypeRegistry)
//! - **Environment Overrides**: `${VAR:default}` placeholders and `UANODE_*`
//!   variables
//! - **Logging**: `tracing-subscriber` setup from the host configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use uanode_config::{logging, ConfigLoader, ModelLoader};
//! use uanode_core::AddressSpace;
//!
//! let config = ConfigLoader::new().load("uanode.yaml")?;
//! logging::init_logging(&config.logging)?;
//!
//! let registry = ModelLoader::from_config(&config)?;
//! let space = AddressSpace::new(Arc::new(registry));
//! # Ok::<(), uanode_config::ConfigError>(())
//! ```
//!
//! ## Model Description Layout
//!
//! ```yaml
//! model:
//!   name: Robotics
//!   version: "1.01"
//! namespaces:
//!   - http://opcfoundation.org/UA/DI/
//!   - http://opcfoundation.org/UA/Robotics/
//! types:
//!   - id: "ns=2;i=1018"
//!     symbolic_name: LoadType
//!     super_type: BaseObjectType
//!     children:
//!       - browse_name: "2:Mass"
//!         type: AnalogUnitType
//!         defaults: "eyJ2YWx1ZSI6..."
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod logging;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    load_config, load_config_str, load_registry, ConfigFormat, ConfigLoader, ConfigLoaderBuilder,
    ModelLoader,
};
pub use schema::{
    ChildDescription, LogFormat, LogLevel, LoggingConfig, ModelDescription, ModelInfo,
    ModelSourceConfig, NodeModelConfig, TypeDescription,
};
