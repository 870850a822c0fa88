use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::{prelude::*, str::contains};
use tempfile::TempDir;

fn mdpress(workdir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdpress"));
    cmd.current_dir(workdir)
        .env_remove("MDPRESS_CONFIG_FILE")
        .env("RUST_LOG", "warn");
    cmd
}

/// A config file that disables every wkhtmltopdf lookup.
fn config_without_tool(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("no-tool.toml");
    fs::write(&path, "[pdf]\nsearch_paths = []\nsearch_path_env = false\n").expect("write config");
    path
}

#[test]
fn convert_writes_html_next_to_input() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("notes.md");
    fs::write(&input, "# Hello\n\nWorld\n").expect("write input");

    mdpress(dir.path())
        .arg("convert")
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Successfully converted"))
        .stdout(contains("notes.html"));

    let html = fs::read_to_string(dir.path().join("notes.html")).expect("output written");
    assert!(html.contains("Hello</h1>"));
    assert!(html.contains("<p>World</p>"));
}

#[test]
fn convert_honours_explicit_output_and_theme() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("notes.md");
    let output = dir.path().join("site/out/page.html");
    fs::write(&input, "# Dark\n").expect("write input");

    mdpress(dir.path())
        .args(["convert", "-t", "dark"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let html = fs::read_to_string(&output).expect("output written");
    assert!(html.contains(r#"<body class="bg-dark text-light">"#));
}

#[test]
fn preview_prints_instead_of_writing() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("notes.md");
    fs::write(&input, "# Peek\n").expect("write input");

    mdpress(dir.path())
        .args(["convert", "--preview"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("=== HTML Preview ==="))
        .stdout(contains("Peek</h1>"))
        .stdout(contains("=== End Preview ==="));

    assert!(!dir.path().join("notes.html").exists());
}

#[test]
fn preview_rejects_blank_markup() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("blank.md");
    fs::write(&input, "   \n\n").expect("write input");

    mdpress(dir.path())
        .args(["convert", "--preview"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(contains("=== HTML Preview ===").not())
        .stderr(contains("must not be empty"));
}

#[test]
fn pdf_without_tool_prints_install_instructions() {
    let dir = TempDir::new().expect("temp dir");
    let config = config_without_tool(dir.path());

    mdpress(dir.path())
        .env("MDPRESS_CONFIG_FILE", &config)
        .args(["convert", "-f", "pdf", "missing.md"])
        .assert()
        .failure()
        .stderr(contains("wkhtmltopdf is required for PDF generation."))
        .stderr(contains("brew install wkhtmltopdf"));
}

#[test]
fn unknown_format_fails() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("notes.md");
    fs::write(&input, "# x\n").expect("write input");

    mdpress(dir.path())
        .args(["convert", "-f", "docx"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("docx"));
}

#[test]
fn missing_input_fails_with_path() {
    let dir = TempDir::new().expect("temp dir");

    mdpress(dir.path())
        .args(["convert", "absent.md"])
        .assert()
        .failure()
        .stderr(contains("absent.md"));
}

#[test]
fn batch_converts_each_file_independently() {
    let dir = TempDir::new().expect("temp dir");
    let docs = dir.path().join("docs");
    fs::create_dir_all(docs.join("nested")).expect("dirs");
    fs::write(docs.join("a.md"), "# A\n").expect("write");
    fs::write(docs.join("b.md"), [0x23, 0x20, 0xff, 0xfe]).expect("write");
    fs::write(docs.join("nested/c.md"), "# C\n").expect("write");
    let out = dir.path().join("out");

    mdpress(dir.path())
        .arg("batch")
        .arg(&docs)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stdout(contains("FAILED"))
        .stdout(contains("Converted 2 of 3 files"));

    assert!(out.join("a.html").is_file());
    assert!(out.join("nested/c.html").is_file());
    assert!(!out.join("b.html").exists());
}

#[test]
fn batch_mirrors_directory_layout_for_same_named_files() {
    let dir = TempDir::new().expect("temp dir");
    let docs = dir.path().join("docs");
    fs::create_dir_all(docs.join("a")).expect("dirs");
    fs::create_dir_all(docs.join("b")).expect("dirs");
    fs::write(docs.join("a/intro.md"), "# Alpha\n").expect("write");
    fs::write(docs.join("b/intro.md"), "# Beta\n").expect("write");

    mdpress(dir.path())
        .args(["batch", "docs"])
        .assert()
        .success()
        .stdout(contains("Converted 2 of 2 files"));

    let alpha = fs::read_to_string(dir.path().join("output/a/intro.html")).expect("alpha");
    let beta = fs::read_to_string(dir.path().join("output/b/intro.html")).expect("beta");
    assert!(alpha.contains("Alpha</h1>"));
    assert!(beta.contains("Beta</h1>"));
}

#[test]
fn batch_reports_explicit_files_competing_for_one_output() {
    let dir = TempDir::new().expect("temp dir");
    fs::create_dir_all(dir.path().join("a")).expect("dirs");
    fs::create_dir_all(dir.path().join("b")).expect("dirs");
    fs::write(dir.path().join("a/intro.md"), "# Alpha\n").expect("write");
    fs::write(dir.path().join("b/intro.md"), "# Beta\n").expect("write");

    mdpress(dir.path())
        .args(["batch", "a/intro.md", "b/intro.md"])
        .assert()
        .failure()
        .stdout(contains("OK a/intro.md"))
        .stdout(contains("FAILED b/intro.md"))
        .stdout(contains("already written by"))
        .stdout(contains("Converted 1 of 2 files"));

    let html = fs::read_to_string(dir.path().join("output/intro.html")).expect("output");
    assert!(html.contains("Alpha</h1>"));
}

#[test]
fn batch_succeeds_when_every_file_converts() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("one.md"), "# One\n").expect("write");
    fs::write(dir.path().join("two.md"), "# Two\n").expect("write");

    mdpress(dir.path())
        .args(["batch", "one.md", "two.md"])
        .assert()
        .success()
        .stdout(contains("Converted 2 of 2 files"));

    assert!(dir.path().join("output/one.html").is_file());
    assert!(dir.path().join("output/two.html").is_file());
}

#[cfg(unix)]
#[test]
fn pdf_conversion_uses_configured_binary() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().expect("temp dir");
    let script = dir.path().join("fake-wkhtmltopdf");
    fs::write(&script, "#!/bin/sh\nprintf '%%PDF-1.4 fake'\n").expect("write script");
    let mut perms = fs::metadata(&script).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).expect("set perms");

    let input = dir.path().join("print.md");
    fs::write(&input, "# Print\n").expect("write input");

    mdpress(dir.path())
        .args(["convert", "-f", "pdf", "--pdf-binary"])
        .arg(&script)
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("print.pdf"));

    let pdf = fs::read(dir.path().join("print.pdf")).expect("pdf written");
    assert_eq!(pdf, b"%PDF-1.4 fake");
}
