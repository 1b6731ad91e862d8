use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

const KNOWN: &str = "ODPUMUHYVHMSYKLVJQHGPHEGIJKPFCFPQIFAUNOKFJFCSJGQUCFFKLYESOQL";

#[test]
fn renders_a_seed_into_three_pngs() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("attractor")
        .unwrap()
        .args(&["--seed", KNOWN, "-i", "20000", "-s", "64x36", "-o"])
        .arg(dir.path())
        .assert()
        .success();

    for plane in &["xy", "xz", "yz"] {
        let path = dir.path().join(format!("D3-{}-20K-{}.png", KNOWN, plane));
        assert!(path.exists(), "missing {}", path.display());
    }
}

#[test]
fn rejects_letters_outside_the_seed_alphabet() {
    Command::cargo_bin("attractor")
        .unwrap()
        .args(&["--seed", "ZZZ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A-Y"));
}

#[test]
fn rejects_a_seed_of_the_wrong_length() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("attractor")
        .unwrap()
        .args(&["--seed", "ABCDEF", "-i", "2000", "-s", "64x36", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure: invalid seed"));
}

#[test]
fn rejects_a_malformed_size() {
    Command::cargo_bin("attractor")
        .unwrap()
        .args(&["--seed", KNOWN, "-s", "wide"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
}

#[test]
fn renders_a_basin_for_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let seed = "KMMMNMMMMMMN";
    Command::cargo_bin("basin")
        .unwrap()
        .args(&["--seed", seed, "-i", "20", "-s", "32x18", "-o"])
        .arg(dir.path())
        .assert()
        .success();

    assert!(dir.path().join(format!("D2-{}-basin.png", seed)).exists());
}
