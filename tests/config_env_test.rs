//! Environment layer of Settings loading.
//!
//! Kept in its own test binary: it mutates the process environment, and the
//! file-based config tests must not observe that.

use std::env;
use std::fs;

use tempfile::TempDir;

use querytree::config::{Seed, Settings};

const SEED_VAR: &str = "QUERYTREE_SEED";

#[test]
fn given_seed_env_var_when_load_then_overrides_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("querytree.toml");
    fs::write(&path, "seed = \"sample\"\n").unwrap();
    let previous = env::var(SEED_VAR).ok();

    // Act
    env::set_var(SEED_VAR, "blank");
    let overridden = Settings::load(Some(&path));
    env::set_var(SEED_VAR, "bogus");
    let rejected = Settings::load(Some(&path));
    match previous {
        Some(value) => env::set_var(SEED_VAR, value),
        None => env::remove_var(SEED_VAR),
    }

    // Assert
    assert_eq!(overridden.unwrap().seed, Seed::Blank);
    assert!(rejected.is_err());
}
