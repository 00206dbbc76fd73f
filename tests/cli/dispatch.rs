// End-to-end tests of the `lz4` binary: file naming, overwrite policy,
// stdin/stdout piping, raw block mode, dictionaries and bad input.
//
// Cargo sets `CARGO_BIN_EXE_lz4` to the compiled binary under test.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use lz4_codec::decompress_frame_to_vec;
use tempfile::TempDir;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn lz4_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lz4"))
}

fn sample() -> Vec<u8> {
    b"command line round trip through frame and block formats\n".repeat(2000)
}

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, sample()).unwrap();
    (dir, input)
}

fn lz4(args: &[&str], cwd: &Path) -> Output {
    Command::new(lz4_bin())
        .args(args)
        .current_dir(cwd)
        .env_remove("LZ4_CLEVEL")
        .stdin(Stdio::null())
        .output()
        .unwrap()
}

fn lz4_piped(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(lz4_bin())
        .args(args)
        .env_remove("LZ4_CLEVEL")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    let data = input.to_vec();
    let writer = std::thread::spawn(move || {
        stdin.write_all(&data).unwrap();
    });
    let out = child.wait_with_output().unwrap();
    writer.join().unwrap();
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// File mode
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn compress_then_decompress_by_extension() {
    let (dir, input) = setup();
    let out = lz4(&["input.txt"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let compressed = fs::read(dir.path().join("input.txt.lz4")).unwrap();
    assert_eq!(&compressed[..4], &[0x04, 0x22, 0x4D, 0x18]);
    assert_eq!(decompress_frame_to_vec(&compressed).unwrap(), sample());

    fs::remove_file(&input).unwrap();
    let out = lz4(&["input.txt.lz4"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(&input).unwrap(), sample());
}

#[test]
fn existing_output_needs_force() {
    let (dir, _input) = setup();
    fs::write(dir.path().join("input.txt.lz4"), b"occupied").unwrap();

    let out = lz4(&["input.txt"], dir.path());
    assert!(!out.status.success());
    assert_eq!(fs::read(dir.path().join("input.txt.lz4")).unwrap(), b"occupied");

    let out = lz4(&["-f", "input.txt"], dir.path());
    assert!(out.status.success());
    let compressed = fs::read(dir.path().join("input.txt.lz4")).unwrap();
    assert_eq!(decompress_frame_to_vec(&compressed).unwrap(), sample());
}

#[test]
fn frame_options_reach_the_header() {
    let (dir, _input) = setup();
    let out = lz4(
        &[
            "-l", "9", "-B", "6", "--independent", "--block-checksum", "--content-checksum",
            "--content-size", "input.txt", "packed.lz4",
        ],
        dir.path(),
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let compressed = fs::read(dir.path().join("packed.lz4")).unwrap();
    // FLG: version 01, independent, block checksum, content size, content checksum.
    assert_eq!(compressed[4], 0x40 | 0x20 | 0x10 | 0x08 | 0x04);
    assert_eq!(compressed[5], 6 << 4);
    assert_eq!(
        u64::from_le_bytes(compressed[6..14].try_into().unwrap()),
        sample().len() as u64
    );
    assert_eq!(decompress_frame_to_vec(&compressed).unwrap(), sample());
}

#[test]
fn unusable_inputs_fail() {
    let (dir, _input) = setup();
    let out = lz4(&["-d", "input.txt"], dir.path());
    assert!(!out.status.success());

    let out = lz4(&["missing.lz4"], dir.path());
    assert!(!out.status.success());
}

#[test]
fn corrupt_input_fails_cleanly() {
    let (dir, _input) = setup();
    fs::write(dir.path().join("bad.lz4"), b"this is not an lz4 frame").unwrap();
    let out = lz4(&["bad.lz4", "restored"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    assert!(!out.stderr.is_empty());
}

#[test]
fn invalid_arguments_are_rejected() {
    let (dir, _input) = setup();
    let cases: [&[&str]; 3] = [&["-B", "3", "input.txt"], &["-l", "fast", "input.txt"], &["--bogus"]];
    for args in cases {
        let out = lz4(args, dir.path());
        assert!(!out.status.success(), "{args:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipes, block mode, dictionaries
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn stdin_to_stdout_round_trip() {
    let data = sample();
    let packed = lz4_piped(&["-c"], &data);
    assert!(packed.status.success(), "{}", String::from_utf8_lossy(&packed.stderr));
    assert_eq!(decompress_frame_to_vec(&packed.stdout).unwrap(), data);

    let unpacked = lz4_piped(&["-d", "-c"], &packed.stdout);
    assert!(unpacked.status.success());
    assert_eq!(unpacked.stdout, data);
}

#[test]
fn raw_block_mode() {
    let (dir, _input) = setup();
    let out = lz4(&["--block", "-l", "-5", "input.txt", "input.blk"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let block = fs::read(dir.path().join("input.blk")).unwrap();
    assert_ne!(&block[..4], &[0x04, 0x22, 0x4D, 0x18]);

    let out = lz4(&["-d", "--block", "input.blk", "restored.txt"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(dir.path().join("restored.txt")).unwrap(), sample());
}

#[test]
fn dictionary_file_round_trip() {
    let (dir, _input) = setup();
    fs::write(
        dir.path().join("dict"),
        b"command line round trip through frame and block formats\n",
    )
    .unwrap();
    let out = lz4(&["-D", "dict", "input.txt", "with-dict.lz4"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = lz4(&["-D", "dict", "-d", "with-dict.lz4", "back.txt"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(dir.path().join("back.txt")).unwrap(), sample());

    let out = lz4(&["-d", "with-dict.lz4", "no-dict.txt"], dir.path());
    assert!(!out.status.success());
}

#[test]
fn invalid_env_level_is_ignored() {
    let (dir, _input) = setup();
    let out = Command::new(lz4_bin())
        .args(["input.txt"])
        .current_dir(dir.path())
        .env("LZ4_CLEVEL", "not-a-number")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("LZ4_CLEVEL"));
}

#[test]
fn version_is_the_crate_version() {
    let (dir, _input) = setup();
    let out = lz4(&["--version"], dir.path());
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains(lz4_codec::VERSION));

    let out = lz4(&["-v", "input.txt"], dir.path());
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains(&format!(" v{} ", lz4_codec::VERSION)), "{stderr}");
}
