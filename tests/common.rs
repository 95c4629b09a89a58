// tests/common.rs

use assert_cmd::Command;
use std::io::{Cursor, Write};

/// The binary, isolated from the developer's environment.
#[allow(dead_code)] // This is used by many integration tests, but not all.
pub fn gitpull_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gitpull"));
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("GITPULL_API_URL")
        .env_remove("GITPULL_WEB_URL")
        .env("RUST_LOG", "gitpull=warn");
    cmd
}

/// Builds a zip archive shaped like GitHub's: every entry under one top-level folder.
#[allow(dead_code)]
pub fn archive(root: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    zip.add_directory(format!("{}/", root), options).unwrap();
    for (name, content) in files {
        zip.start_file(format!("{}/{}", root, name), options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
