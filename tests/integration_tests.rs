//! Integration tests for the craftdex CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd against
//! a small saves tree in a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PARTS: &str = r#"
resources:
  LiquidFuel: { unit_cost: 1.0, density: 0.005 }
parts:
  - name: engine
    cost: 100
    mass: 1.5
  - name: fuelTank
    cost: 50
    mass: 0.5
"#;

const TAGS: &str = r#"
tags:
  heavy: [career_VAB_Lifter]
  crewed: [career_VAB_Lifter, career_SPH_Plane]
"#;

const LIFTER: &str = "ship = Lifter Heavy
description = Big one
type = VAB
PART
{
	part = engine_v2
	istg = 1
}
PART
{
	part = fuelTank_4294
	istg = 0
	RESOURCE
	{
		name = LiquidFuel
		amount = 10
		maxAmount = 10
	}
}
PART
{
	part = mysteryPart
}
";

/// Saves tree plus catalog, tags and a private cache location
struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let f = Fixture { tmp };
        f.craft("career/Ships/VAB/Lifter.craft", LIFTER);
        f.craft(
            "career/Ships/SPH/Plane.craft",
            "ship = Plane\ntype = SPH\nPART\n{\npart = engine\nistg = 0\n}\n",
        );
        f.craft(
            "career/Subassemblies/Stage.craft",
            "ship = Stage\nPART\n{\npart = engine_1\n}\nPART\n{\npart = engine_2\n}\n",
        );
        f.craft(
            "sandbox/Ships/VAB/Probe.craft",
            "ship = Probe\ntype = VAB\nPART\n{\npart = probeCore\n}\n",
        );
        fs::write(f.path("parts.yaml"), PARTS).unwrap();
        fs::write(f.path("tags.yaml"), TAGS).unwrap();
        f
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    fn craft(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path("saves").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn cache_file(&self) -> PathBuf {
        self.path("cache/craft_data.cache")
    }

    /// A craftdex command isolated from any user config
    fn cmd(&self) -> Command {
        self.cmd_with_saves(&self.path("saves"))
    }

    fn cmd_with_saves(&self, saves: &Path) -> Command {
        let mut cmd = Command::cargo_bin("craftdex").unwrap();
        cmd.current_dir(self.tmp.path())
            .env("HOME", self.tmp.path())
            .env("XDG_CONFIG_HOME", self.path("config"))
            .env("XDG_CACHE_HOME", self.path("xdg-cache"))
            .env_remove("RUST_LOG")
            .env_remove("CRAFTDEX_SAVES")
            .env_remove("CRAFTDEX_CACHE")
            .env_remove("CRAFTDEX_PARTS")
            .env_remove("CRAFTDEX_TAGS")
            .arg("--saves")
            .arg(saves)
            .arg("--cache")
            .arg(self.cache_file())
            .arg("--parts")
            .arg(self.path("parts.yaml"))
            .arg("--tags")
            .arg(self.path("tags.yaml"));
        cmd
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "craftdex {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    /// File stems printed by `list -f path`
    fn names(&self, args: &[&str]) -> Vec<String> {
        let mut full = vec!["list", "-f", "path"];
        full.extend_from_slice(args);
        self.stdout(&full)
            .lines()
            .map(|l| {
                Path::new(l)
                    .file_stem()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&self.stdout(args)).unwrap()
    }
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_help_displays() {
    Command::cargo_bin("craftdex")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("cache"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("craftdex")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("craftdex"));
}

#[test]
fn test_completions_fish_lists_sort_values() {
    Command::cargo_bin("craftdex")
        .unwrap()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("part-count"))
        .stdout(predicate::str::contains("subassembly"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_table() {
    let f = Fixture::new();
    f.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lifter"))
        .stdout(predicate::str::contains("Probe"))
        .stdout(predicate::str::contains("4 craft(s) found"));
}

#[test]
fn test_list_count() {
    let f = Fixture::new();
    assert_eq!(f.stdout(&["list", "--count"]).trim(), "4");
    assert_eq!(f.stdout(&["list", "--count", "--group", "sandbox"]).trim(), "1");
}

#[test]
fn test_list_sort_by_name_and_reverse() {
    let f = Fixture::new();
    assert_eq!(f.names(&["--sort", "name"]), ["Lifter", "Plane", "Probe", "Stage"]);
    assert_eq!(
        f.names(&["--sort", "name", "--reverse"]),
        ["Stage", "Probe", "Plane", "Lifter"]
    );
}

#[test]
fn test_list_sort_by_part_count_descends() {
    let f = Fixture::new();
    assert_eq!(
        f.names(&["--sort", "part-count"]),
        ["Lifter", "Stage", "Plane", "Probe"]
    );
}

#[test]
fn test_list_filters() {
    let f = Fixture::new();
    assert_eq!(f.names(&["--type", "sph"]), ["Plane"]);
    assert_eq!(f.names(&["--type", "subassemblies"]), ["Stage"]);
    assert_eq!(f.names(&["--search", "LIFT"]), ["Lifter"]);
    assert_eq!(f.names(&["--group", "sandbox"]), ["Probe"]);
    assert_eq!(
        f.names(&["--group", "career", "--type", "vab,sph", "--sort", "name"]),
        ["Lifter", "Plane"]
    );
    assert!(f.names(&["--search", "nothing-like-this"]).is_empty());
}

#[test]
fn test_list_tags() {
    let f = Fixture::new();
    assert_eq!(f.names(&["--tag", "heavy,crewed"]), ["Lifter"]);
    assert_eq!(
        f.names(&["--tag", "heavy,crewed", "--any-tag", "--sort", "name"]),
        ["Lifter", "Plane"]
    );
}

#[test]
fn test_list_limit() {
    let f = Fixture::new();
    assert_eq!(f.names(&["--sort", "name", "-n", "2"]), ["Lifter", "Plane"]);
}

#[test]
fn test_list_json_derived_fields() {
    let f = Fixture::new();
    let value = f.json(&["list", "-f", "json", "--search", "lifter"]);
    let craft = &value[0];
    assert_eq!(craft["name"], "Lifter");
    assert_eq!(craft["alt_name"], "Lifter Heavy");
    assert_eq!(craft["construction_type"], "VAB");
    assert_eq!(craft["group"], "career");
    assert_eq!(craft["part_count"], 3);
    assert_eq!(craft["stage_count"], 2);
    assert_eq!(craft["missing_parts"], true);
    assert_eq!(craft["locked_parts"], false);

    let cost = craft["cost"]["total"].as_f64().unwrap();
    assert!((cost - 150.0).abs() < 1e-9);
    let fuel = craft["cost"]["fuel"].as_f64().unwrap();
    assert!((fuel - 10.0).abs() < 1e-9);
    let mass = craft["mass"]["total"].as_f64().unwrap();
    assert!((mass - 2.05).abs() < 1e-9);

    let tags: Vec<&str> = craft["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    assert_eq!(tags, ["crewed", "heavy"]);
}

#[test]
fn test_list_csv_and_markdown() {
    let f = Fixture::new();
    f.cmd()
        .args(["list", "-f", "csv", "--search", "plane"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("name,type,group,parts"))
        .stdout(predicate::str::contains("Plane,SPH,career,1,1,100.00,1.50,no,no"));

    f.cmd()
        .args(["list", "-f", "md", "--search", "plane"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| NAME"))
        .stdout(predicate::str::contains("| Plane"));
}

#[test]
fn test_list_skips_malformed_craft() {
    let f = Fixture::new();
    f.craft("career/Ships/VAB/Broken.craft", "PART\n{\npart = engine\n");
    f.cmd()
        .args(["list", "--count"])
        .assert()
        .success()
        .stdout("4\n")
        .stderr(predicate::str::contains("could not be loaded"));
}

#[test]
fn test_list_includes_latin1_craft() {
    let f = Fixture::new();
    let path = f.path("saves/career/Ships/VAB/Latin.craft");
    fs::write(&path, b"ship = Caf\xe9\ndescription = cr\xe8me br\xfbl\xe9e\ntype = VAB\n").unwrap();
    f.cmd()
        .args(["list", "--count"])
        .assert()
        .success()
        .stdout("5\n")
        .stderr(predicate::str::contains("could not be loaded").not());
}

#[test]
fn test_list_missing_saves_dir_fails() {
    let f = Fixture::new();
    f.cmd_with_saves(&f.path("no-such-dir"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to scan"));
}

// ============================================================================
// show
// ============================================================================

#[test]
fn test_show_by_name() {
    let f = Fixture::new();
    f.cmd()
        .args(["show", "lifter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lifter Heavy"))
        .stdout(predicate::str::contains("Parts: 3"))
        .stdout(predicate::str::contains("Stages: 2"))
        .stdout(predicate::str::contains("missing from the part catalog"))
        .stdout(predicate::str::contains("Tags: crewed, heavy"));
}

#[test]
fn test_show_json() {
    let f = Fixture::new();
    let value = f.json(&["show", "Plane", "-f", "json"]);
    assert_eq!(value["name"], "Plane");
    assert_eq!(value["construction_type"], "SPH");
}

#[test]
fn test_show_unknown_fails() {
    let f = Fixture::new();
    f.cmd()
        .args(["show", "Zeppelin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No craft found matching 'Zeppelin'"));
}

#[test]
fn test_show_respects_group() {
    let f = Fixture::new();
    f.cmd()
        .args(["show", "Probe", "--group", "career"])
        .assert()
        .failure();
}

// ============================================================================
// cache
// ============================================================================

#[test]
fn test_cache_written_through_and_reused() {
    let f = Fixture::new();
    let first = f.json(&["cache", "sync", "-f", "json"]);
    assert_eq!(first["derived"], 4);
    assert_eq!(first["cache_hits"], 0);
    assert!(f.cache_file().exists());

    let second = f.json(&["cache", "sync", "-f", "json"]);
    assert_eq!(second["derived"], 0);
    assert_eq!(second["cache_hits"], 4);

    let status = f.json(&["cache", "status", "-f", "json"]);
    assert_eq!(status["entries"], 4);
}

#[test]
fn test_cache_changed_file_rederived() {
    let f = Fixture::new();
    f.stdout(&["cache", "sync"]);
    f.craft(
        "sandbox/Ships/VAB/Probe.craft",
        "ship = Probe\ntype = VAB\nPART\n{\npart = probeCore\n}\nPART\n{\npart = engine\n}\n",
    );

    let stats = f.json(&["cache", "sync", "-f", "json"]);
    assert_eq!(stats["derived"], 1);
    assert_eq!(stats["cache_hits"], 3);

    let value = f.json(&["show", "Probe", "-f", "json"]);
    assert_eq!(value["part_count"], 2);
}

#[test]
fn test_cache_file_is_yaml() {
    let f = Fixture::new();
    f.stdout(&["cache", "sync"]);
    let content = fs::read_to_string(f.cache_file()).unwrap();
    assert!(content.starts_with("craft_data:"));
    assert!(content.contains("checksum:"));
    assert!(content.contains("Lifter.craft"));
}

#[test]
fn test_corrupt_cache_is_fatal_until_cleared() {
    let f = Fixture::new();
    fs::create_dir_all(f.cache_file().parent().unwrap()).unwrap();
    fs::write(f.cache_file(), "craft_data: [unterminated").unwrap();

    f.cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is corrupt"));

    f.cmd()
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache cleared"));
    assert!(!f.cache_file().exists());

    assert_eq!(f.stdout(&["list", "--count"]).trim(), "4");
}

#[test]
fn test_cache_prune() {
    let f = Fixture::new();
    f.stdout(&["cache", "sync"]);
    fs::remove_file(f.path("saves/sandbox/Ships/VAB/Probe.craft")).unwrap();

    f.cmd()
        .args(["cache", "prune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pruned 1 stale entries"));

    let status = f.json(&["cache", "status", "-f", "json"]);
    assert_eq!(status["entries"], 3);

    f.cmd()
        .args(["cache", "prune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no stale entries"));
}

#[test]
fn test_cache_status_without_store() {
    let f = Fixture::new();
    f.cmd()
        .args(["cache", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entries:   0"));
}
