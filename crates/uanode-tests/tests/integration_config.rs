// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Integration tests for uanode-config:
//!
//! - Model descriptions from files, merged into a registry
//! - Namespace remapping across descriptions
//! - Strict payload checks
//! - Host configuration and environment overrides
//!
//! ## Test Categories
//!
//! - `test_model_*`: description loading and merging
//! - `test_host_*`: host configuration

use std::fs;
use std::path::Path;
use std::sync::Arc;

use uanode_config::{ConfigError, ConfigFormat, ConfigLoader, LogFormat, LogLevel, ModelLoader};
use uanode_core::{AddressSpace, DefaultsError, ModelError, NodeId, QualifiedName, SchemaError};
use uanode_tests::prelude::*;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn write_cell_model(dir: &Path) {
    let base = serde_json::to_string_pretty(&CellModel::base_description()).unwrap();
    write(dir, "base.json", &base);
    write(dir, "cells.json", &CellModel::cell_description().to_json());
}

// =============================================================================
// Model Descriptions
// =============================================================================

#[test]
fn test_model_files_build_same_tree_as_schemas() {
    init_test_logging();
    let dir = temp_test_dir("uanode-model");
    write_cell_model(dir.path());

    let registry = ModelLoader::new()
        .load_file(dir.path().join("base.json"))
        .unwrap()
        .load_file(dir.path().join("cells.json"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(registry.len(), 8);
    assert_eq!(registry.namespace_index(CELL_NAMESPACE_URI), Some(1));

    let mut loaded = AddressSpace::new(Arc::new(registry));
    let mut direct = CellModel::space();

    let a = loaded.instantiate(&CELL_TYPE, "1:Cell1").unwrap();
    loaded.find_child(a, "Heater", true, None).unwrap();
    let b = direct.instantiate(&CELL_TYPE, "1:Cell1").unwrap();
    direct.find_child(b, "Heater", true, None).unwrap();

    assert_eq!(loaded.snapshot(a).unwrap(), direct.snapshot(b).unwrap());
}

#[test]
fn test_model_json_description_parses() {
    let json = CellModel::cell_description().to_json();
    let description = CellModel::cell_description().build();

    let loader = ConfigLoader::new();
    let from_json = loader.load_model_from_str(&json, ConfigFormat::Json).unwrap();
    assert_eq!(from_json, description);
    assert_eq!(from_json.get_type("HeaterType").unwrap().children.len(), 1);
}

#[test]
fn test_model_namespaces_are_remapped() {
    let extension = DescriptionBuilder::new("Extensions")
        .namespace("urn:uanode:test:extensions")
        .namespace(CELL_NAMESPACE_URI)
        .object_type("ns=1;i=10", "MixingCellType", Some("ns=2;i=1"))
        .child("1:Agitator", "FolderType", false, None)
        .build();

    let registry = ModelLoader::new()
        .add_description(CellModel::base_description())
        .unwrap()
        .add_description(CellModel::cell_description().build())
        .unwrap()
        .add_description(extension)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(
        registry.namespaces(),
        &[
            "http://opcfoundation.org/UA/".to_string(),
            CELL_NAMESPACE_URI.to_string(),
            "urn:uanode:test:extensions".to_string(),
        ]
    );

    let mixing = registry.get_by_name("MixingCellType").unwrap();
    assert_eq!(mixing.type_id, NodeId::numeric(2, 10));
    assert_eq!(mixing.super_type, Some(CELL_TYPE));
    assert!(registry.is_subtype_of(&mixing.type_id, &CELL_TYPE));

    let slot = registry
        .find_slot(&mixing.type_id, &QualifiedName::from("Agitator"))
        .unwrap()
        .unwrap();
    assert_eq!(slot.browse_name, QualifiedName::new(2, "Agitator"));

    let mut space = AddressSpace::new(Arc::new(registry));
    let cell = space.instantiate("MixingCellType", "2:Mixer").unwrap();
    space.assert_children(cell, &["Temperature", "Sensors", "Agitator"]);
}

#[test]
fn test_model_repeated_type_is_merged() {
    let registry = ModelLoader::new()
        .add_description(CellModel::base_description())
        .unwrap()
        .add_description(CellModel::base_description())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(registry.len(), 5);
}

#[test]
fn test_model_conflicting_type_names() {
    let conflicting = DescriptionBuilder::new("Other")
        .object_type("i=58", "RootObjectType", None)
        .build();

    let err = ModelLoader::new()
        .add_description(CellModel::base_description())
        .unwrap()
        .add_description(conflicting)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::MergeError { .. }));
}

#[test]
fn test_model_unknown_child_type() {
    let broken = DescriptionBuilder::new("Broken")
        .namespace(CELL_NAMESPACE_URI)
        .object_type("ns=1;i=1", "CellType", Some("BaseObjectType"))
        .child("1:Pump", "PumpType", false, None)
        .build();

    let err = ModelLoader::new()
        .add_description(CellModel::base_description())
        .unwrap()
        .add_description(broken)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(
        err.as_model_error(),
        Some(ModelError::Schema(SchemaError::UnknownType { .. }))
    ));
}

#[test]
fn test_model_strict_rejects_bad_payload() {
    let broken = CellModel::cell_description()
        .child_with_payload("1:Broken", "PropertyType", "not base64!")
        .build();

    let err = ModelLoader::new()
        .add_description(CellModel::base_description())
        .unwrap()
        .add_description(broken.clone())
        .unwrap()
        .build()
        .unwrap_err();
    match err {
        ConfigError::Validation { field, .. } => {
            assert_eq!(field, "Cells.types[2].children[1].defaults");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Without strict checks the payload only fails once it is decoded.
    let registry = ModelLoader::new()
        .strict(false)
        .add_description(CellModel::base_description())
        .unwrap()
        .add_description(broken)
        .unwrap()
        .build()
        .unwrap();
    let mut space = AddressSpace::new(Arc::new(registry));
    assert!(space.instantiate(&HEATER_TYPE, "1:Heater").is_ok());
    let err = space.instantiate(&BOOSTED_HEATER_TYPE, "1:Heater").unwrap_err();
    assert!(matches!(err, ModelError::Defaults(_)));
}

#[test]
fn test_model_unsupported_payload_version() {
    let description = CellModel::cell_description().defaults_version(2).build();

    let err = ModelLoader::new()
        .add_description(CellModel::base_description())
        .unwrap()
        .add_description(description)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Model(ModelError::Defaults(DefaultsError::UnsupportedVersion {
            version: 2,
            supported: 1,
        }))
    ));
}

// =============================================================================
// Host Configuration
// =============================================================================

#[test]
fn test_host_config_resolves_model_files() {
    let dir = temp_test_dir("uanode-host");
    write_cell_model(dir.path());
    write(
        dir.path(),
        "uanode.yaml",
        &CellModel::host_config_yaml(&["base.json", "cells.json"]),
    );

    let config = ConfigLoader::new()
        .with_env_prefix("UANODE_IT_HOST")
        .load(dir.path().join("uanode.yaml"))
        .unwrap();
    assert_eq!(config.model.files[0], dir.path().join("base.json"));
    assert!(config.model.strict);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Compact);

    let registry = ModelLoader::from_config(&config).unwrap();
    assert!(registry.contains(&BOOSTED_HEATER_TYPE));
}

#[test]
fn test_host_config_env_overrides() {
    let dir = temp_test_dir("uanode-env");
    write_cell_model(dir.path());
    write(dir.path(), "uanode.yaml", &CellModel::host_config_yaml(&["base.json"]));

    std::env::set_var("UANODE_IT_ENV_MODEL_FILES", "base.json, cells.json");
    std::env::set_var("UANODE_IT_ENV_LOG_LEVEL", "warning");
    std::env::set_var("UANODE_IT_ENV_MODEL_STRICT", "false");

    let config = ConfigLoader::new()
        .with_env_prefix("UANODE_IT_ENV")
        .load(dir.path().join("uanode.yaml"))
        .unwrap();

    std::env::remove_var("UANODE_IT_ENV_MODEL_FILES");
    std::env::remove_var("UANODE_IT_ENV_LOG_LEVEL");
    std::env::remove_var("UANODE_IT_ENV_MODEL_STRICT");

    assert_eq!(config.model.files.len(), 2);
    assert_eq!(config.model.files[1], dir.path().join("cells.json"));
    assert!(!config.model.strict);
    assert_eq!(config.logging.level, LogLevel::Warn);
}

#[test]
fn test_host_config_without_models() {
    let config = ConfigLoader::new()
        .with_env_prefix("UANODE_IT_EMPTY")
        .load_from_str("logging:\n  level: info\n", ConfigFormat::Yaml)
        .unwrap();

    let err = ModelLoader::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { .. }));
}

#[test]
fn test_host_config_missing_model_file() {
    let dir = temp_test_dir("uanode-missing");
    write(dir.path(), "uanode.toml", "[model]\nfiles = [\"absent.yaml\"]\n");

    let config = ConfigLoader::new()
        .with_env_prefix("UANODE_IT_MISSING")
        .load(dir.path().join("uanode.toml"))
        .unwrap();
    let err = ModelLoader::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}
