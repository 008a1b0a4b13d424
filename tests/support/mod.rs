use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get a Command for skyindex
pub fn skyindex() -> Command {
    cargo_bin_cmd!("skyindex")
}

/// Small Messier catalog with records
pub const CATALOG: &str = r#"[
  {"name": "M31", "aliases": "NGC224;Andromeda Galaxy", "type": "Galaxy", "morphology": "Sb",
   "ra_d_j2000": "10.6847", "dec_d_j2000": "41.2687", "visual_magnitude": "3.4",
   "constellation_en": "Andromeda", "click_count": "12"},
  {"name": "M33", "aliases": "NGC598;Triangulum Galaxy", "type": "Galaxy", "morphology": "Sc",
   "ra_d_j2000": "23.4621", "dec_d_j2000": "30.6602", "visual_magnitude": "5.7",
   "constellation_en": "Triangulum"},
  {"name": "M42", "aliases": "NGC1976;Orion Nebula", "type": "Nebula",
   "ra_j2000": "05h35m17.3s", "dec_j2000": "-05°23'28\"", "visual_magnitude": "4.0",
   "constellation_en": "Orion", "click_count": 30},
  {"name": "M45", "aliases": "Pleiades", "type": "Open Cluster",
   "ra_d_j2000": "56.75", "dec_d_j2000": "24.1167", "visual_magnitude": "1.6"}
]"#;

pub const RATINGS: &str = r#"[
  {"user": "alice", "item": "M31", "rating": 5},
  {"user": "alice", "item": "M42", "rating": 2},
  {"user": "bob", "item": "M31", "rating": 4},
  {"user": "bob", "item": "M33", "rating": 5},
  {"user": "carol", "item": "M45", "rating": "4.5"}
]"#;

/// Temp directory holding catalog.json and ratings.json
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("catalog.json"), CATALOG).unwrap();
        fs::write(dir.path().join("ratings.json"), RATINGS).unwrap();
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    #[allow(dead_code)]
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Command preloaded with the fixture catalog and ratings
    pub fn cmd(&self) -> Command {
        let mut cmd = skyindex();
        cmd.current_dir(self.dir.path())
            .env_remove("SKYINDEX_CONFIG")
            .env_remove("SKYINDEX_CATALOG")
            .arg("--catalog")
            .arg(self.path("catalog.json"))
            .arg("--ratings")
            .arg(self.path("ratings.json"));
        cmd
    }
}

/// Run a command and parse its stdout as JSON
#[allow(dead_code)]
pub fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
