use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use filetime::{set_file_mtime, FileTime};
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

struct Setup {
    root: TempDir,
}

impl Setup {
    /// Library under `media/`, device under `device/MUSIC`, config at `walksync.yaml`.
    fn new() -> Self {
        let setup = Setup {
            root: TempDir::new().expect("root"),
        };
        fs::create_dir_all(setup.device()).expect("device dir");
        setup
    }

    fn media(&self) -> PathBuf {
        self.root.path().join("media")
    }

    fn device(&self) -> PathBuf {
        self.root.path().join("device").join("MUSIC")
    }

    fn config(&self) -> PathBuf {
        self.root.path().join("walksync.yaml")
    }

    fn track(&self, rel: &str) -> PathBuf {
        let path = self.media().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, rel).expect("write track");
        set_file_mtime(&path, FileTime::from_unix_time(1_000_000, 0)).expect("mtime");
        path
    }

    fn write_library(&self, tracks: &[&Path]) {
        let mut yaml = String::from("playlists:\n  - name: Running\n    tracks:\n");
        for track in tracks {
            yaml.push_str(&format!("      - path: \"{}\"\n", track.display()));
        }
        fs::write(self.root.path().join("library.yaml"), yaml).expect("library");
    }

    fn write_config(&self, extra: &str) {
        let yaml = format!(
            "library: library.yaml\nlibrary_root: media\nplaylists: [Running]\n\
             device_dir: device/MUSIC\n{extra}"
        );
        fs::write(self.config(), yaml).expect("config");
    }
}

fn walksync(setup: &Setup, args: &[&str]) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("walksync"));
    cmd.env("HOME", setup.root.path()).env("NO_COLOR", "1");
    cmd.args(args).arg("--config").arg(setup.config());
    cmd
}

#[test]
fn sync_copies_tracks_and_second_run_has_nothing_to_update() {
    let setup = Setup::new();
    let a = setup.track("Abba/Gold/01 Dancing Queen.mp3");
    let b = setup.track("Queen/Innuendo/02 Headlong.mp3");
    setup.write_library(&[&a, &b]);
    setup.write_config("");

    walksync(&setup, &["sync"])
        .assert()
        .success()
        .stdout(contains("Abba/Gold/01 Dancing Queen.mp3"))
        .stdout(contains("2 copied"));
    assert!(setup.device().join("Abba/Gold/01 Dancing Queen.mp3").exists());
    assert!(setup.device().join("Queen/Innuendo/02 Headlong.mp3").exists());

    walksync(&setup, &["sync"])
        .assert()
        .success()
        .stdout(contains("nothing to update"))
        .stdout(contains("nothing to remove"));
}

#[test]
fn dry_run_writes_nothing() {
    let setup = Setup::new();
    let a = setup.track("Abba/01.mp3");
    setup.write_library(&[&a]);
    setup.write_config("playlist:\n  prefix: \"MUSIC/\"\n");

    walksync(&setup, &["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("Abba/01.mp3"));

    assert!(!setup.device().join("Abba/01.mp3").exists());
    assert!(!setup.device().join("Running.m3u").exists());
}

#[test]
fn unmatched_files_kept_unless_removal_requested() {
    let setup = Setup::new();
    let a = setup.track("Abba/01.mp3");
    setup.write_library(&[&a]);
    setup.write_config("");
    let stray = setup.device().join("Old/gone.mp3");
    fs::create_dir_all(stray.parent().expect("parent")).expect("mkdir");
    fs::write(&stray, "old").expect("stray");

    walksync(&setup, &["sync"])
        .assert()
        .success()
        .stdout(contains("1 unmatched file(s) kept"));
    assert!(stray.exists());

    walksync(&setup, &["sync", "--remove-unmatched"])
        .assert()
        .success()
        .stdout(contains("Old/gone.mp3"));
    assert!(!stray.exists());
}

#[test]
fn status_json_reports_pending_work() {
    let setup = Setup::new();
    let a = setup.track("Abba/01.mp3");
    setup.write_library(&[&a]);
    setup.write_config("");
    fs::write(setup.device().join("stray.mp3"), "x").expect("stray");

    let output = walksync(&setup, &["status", "--json"]).output().expect("run");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["music"]["to_update"], serde_json::json!(["Abba/01.mp3"]));
    assert_eq!(json["music"]["to_remove"], serde_json::json!(["stray.mp3"]));
    assert!(json.get("lyrics").is_none());

    // status never touches the device
    assert!(!setup.device().join("Abba/01.mp3").exists());
}

#[test]
fn playlist_diff_then_write() {
    let setup = Setup::new();
    let a = setup.track("Abba/01.mp3");
    let b = setup.track("Air/02.mp3");
    setup.write_library(&[&a, &b]);
    setup.write_config("playlist:\n  prefix: \"MUSIC/\"\n");

    walksync(&setup, &["playlist", "--diff"])
        .assert()
        .success()
        .stdout(contains("+MUSIC/Abba/01.mp3"))
        .stdout(contains("+MUSIC/Air/02.mp3"));
    assert!(!setup.device().join("Running.m3u").exists());

    walksync(&setup, &["playlist"]).assert().success();
    assert_eq!(
        fs::read_to_string(setup.device().join("Running.m3u")).expect("m3u"),
        "MUSIC/Abba/01.mp3\nMUSIC/Air/02.mp3\n"
    );

    walksync(&setup, &["playlist", "--diff"])
        .assert()
        .success()
        .stdout(contains("No playlist differences."));
}

#[test]
fn missing_config_fails_with_path() {
    let setup = Setup::new();
    walksync(&setup, &["status"])
        .assert()
        .failure()
        .stderr(contains("walksync.yaml").and(contains("config not found")));
}
