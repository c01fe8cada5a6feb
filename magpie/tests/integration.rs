//! Integration tests for the mag CLI.

use clap::Parser;
use magpie::cli::{Cli, run_cli};
use magpie_data::snapshot;
use magpie_data::store::Storer;
use magpie_data::vocab::VOCAB_FILE;
use ndarray::array;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mag-cli-{name}"));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).ok();
    }
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

#[test]
fn show_lists_a_written_bundle() {
    let dir = scratch_dir("show");

    let mut storer = Storer::create(&dir, "eval", 42).expect("failed to create bundle");
    storer
        .write("ids", &[array![[1i64, 2, 3]].into_dyn(), array![[4i64]].into_dyn()], 0)
        .expect("failed to write dataset");
    storer
        .write_single("loss", &array![0.25f32, 0.5].into_dyn(), 0)
        .expect("failed to write dataset");
    storer.close().expect("failed to close bundle");

    let bundle_path = dir.join("eval_42.mag");
    assert!(bundle_path.exists());

    let cli = Cli::parse_from(["mag", "show", bundle_path.to_str().unwrap()]);
    run_cli(cli).expect("show failed on a fresh bundle");

    let cli = Cli::parse_from([
        "mag",
        "show",
        bundle_path.to_str().unwrap(),
        "--data",
        "ids",
    ]);
    run_cli(cli).expect("show --data failed on a fresh bundle");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn show_rejects_a_non_bundle_file() {
    let dir = scratch_dir("show-bad");

    let path = dir.join("not-a-bundle.mag");
    std::fs::write(&path, b"plain text").unwrap();

    let cli = Cli::parse_from(["mag", "show", path.to_str().unwrap()]);
    assert!(run_cli(cli).is_err());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn decode_renders_ids_through_the_vocabulary() {
    let dir = scratch_dir("decode");

    let words: Vec<String> = ["\\frac", "{", "}"].into_iter().map(str::to_string).collect();
    snapshot::dump(&words, &dir.join(VOCAB_FILE)).expect("failed to write vocabulary");

    // Ids cover a real word, the injected blank (3), and the -1 catch-all.
    let cli = Cli::parse_from([
        "mag",
        "decode",
        "0",
        "3",
        "-1",
        "--data-dir",
        dir.to_str().unwrap(),
        "--blank-id",
        "3",
    ]);
    run_cli(cli).expect("decode failed");

    std::fs::remove_dir_all(&dir).ok();
}
