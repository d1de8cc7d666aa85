// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn bind_addr_defaults_when_unset() {
    std::env::remove_var("HATCH_BIND_ADDR");
    assert_eq!(bind_addr().unwrap(), "0.0.0.0:8000".parse().unwrap());
}

#[test]
#[serial]
fn bind_addr_honors_override() {
    std::env::set_var("HATCH_BIND_ADDR", "127.0.0.1:9999");
    assert_eq!(bind_addr().unwrap(), "127.0.0.1:9999".parse().unwrap());
    std::env::remove_var("HATCH_BIND_ADDR");
}

#[test]
#[serial]
fn bind_addr_rejects_garbage() {
    std::env::set_var("HATCH_BIND_ADDR", "not-an-address");
    assert!(matches!(bind_addr(), Err(EnvError::Invalid("HATCH_BIND_ADDR", _))));
    std::env::remove_var("HATCH_BIND_ADDR");
}

#[test]
#[serial]
fn redis_url_requires_the_variable() {
    std::env::remove_var("REDIS_URL");
    assert!(matches!(redis_url(), Err(EnvError::Missing("REDIS_URL"))));
}

#[test]
#[serial]
fn base_domain_defaults_to_repl_local() {
    std::env::remove_var("HATCH_BASE_DOMAIN");
    assert_eq!(base_domain(), "repl.local");
}

#[test]
#[serial]
fn s3_config_defaults_region_and_endpoint() {
    std::env::set_var("HATCH_S3_BUCKET", "hatch-workspaces");
    std::env::remove_var("HATCH_S3_REGION");
    std::env::remove_var("HATCH_S3_ENDPOINT");

    let config = s3_config().unwrap();
    assert_eq!(config.bucket, "hatch-workspaces");
    assert_eq!(config.region, "us-east-1");
    assert!(config.endpoint.is_none());

    std::env::remove_var("HATCH_S3_BUCKET");
}
