use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn paraseek_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("paraseek");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("alpha.md"),
        "# Alpha Document\n\nThis is the alpha document about Rust programming.\n\nIt covers cargo and crates.",
    )
    .unwrap();
    fs::write(
        files_dir.join("beta.md"),
        "# Beta Document\n\nThis document discusses Python and machine learning.\n\nDeep learning frameworks like PyTorch are covered.",
    )
    .unwrap();
    fs::write(
        files_dir.join("gamma.txt"),
        "Gamma plain text file.\n\nContains notes about deployment and infrastructure.\n\nKubernetes and Docker are mentioned here.",
    )
    .unwrap();
    fs::write(files_dir.join("ignored.png"), "not text").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/paraseek.sqlite"

[ingest]
include_globs = ["**/*.md", "**/*.txt"]
exclude_globs = []
follow_symlinks = false
"#,
        root.display()
    );

    let config_path = config_dir.join("paraseek.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_paraseek(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = paraseek_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run paraseek binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Init and load the `files/` directory.
fn loaded_env() -> (TempDir, PathBuf) {
    let (tmp, config_path) = setup_test_env();
    run_paraseek(&config_path, &["init"]);
    let files = tmp.path().join("files");
    let (stdout, stderr, success) = run_paraseek(&config_path, &["add", files.to_str().unwrap()]);
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    (tmp, config_path)
}

fn file_content(config_path: &Path, name: &str) -> String {
    let (stdout, stderr, success) = run_paraseek(config_path, &["export", "file", name]);
    assert!(success, "export file failed: {}", stderr);
    stdout
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_paraseek(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/paraseek.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_paraseek(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_paraseek(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_add_directory_applies_globs() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, success) = run_paraseek(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("alpha.md"));
    assert!(stdout.contains("beta.md"));
    assert!(stdout.contains("gamma.txt"));
    assert!(!stdout.contains("ignored.png"));
}

#[test]
fn test_re_add_skips_unchanged() {
    let (tmp, config_path) = loaded_env();
    let files = tmp.path().join("files");

    let (stdout, _, success) = run_paraseek(&config_path, &["add", files.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("Added 0 file(s), 3 unchanged"), "got: {}", stdout);

    fs::write(files.join("gamma.txt"), "Gamma, rewritten.").unwrap();
    let (stdout, _, _) = run_paraseek(&config_path, &["add", files.to_str().unwrap()]);
    assert!(stdout.contains("Added 1 file(s), 2 unchanged"), "got: {}", stdout);
}

#[test]
fn test_search_ranked_output() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, stderr, success) = run_paraseek(&config_path, &["search", "rust"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("1. [1] alpha.md / p18"), "got: {}", stdout);
    assert!(stdout.contains("This is the alpha document about Rust programming."));
    assert!(!stdout.contains("beta.md"));
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, success) = run_paraseek(&config_path, &["search", "nonexistentterm"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_json() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, stderr, success) =
        run_paraseek(&config_path, &["search", "document", "--json", "--stats"]);
    assert!(success, "search failed: {}", stderr);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let results = parsed["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r["relevance"] == 1));
    assert_eq!(parsed["stats"]["occurrences"], 4);
    assert_eq!(parsed["stats"]["files"].as_array().unwrap().len(), 2);
}

#[test]
fn test_search_phrase_and_whole_word() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, _) = run_paraseek(&config_path, &["search", "\"machine learning\"", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["results"].as_array().unwrap().len(), 1);

    let (stdout, _, _) = run_paraseek(&config_path, &["search", "learn", "--whole-word"]);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_highlight_escapes() {
    let (tmp, config_path) = loaded_env();
    let markup = tmp.path().join("markup.txt");
    fs::write(&markup, "Use <b>Rust</b> & friends").unwrap();
    run_paraseek(&config_path, &["add", markup.to_str().unwrap()]);

    let (stdout, _, success) = run_paraseek(&config_path, &["search", "friends", "--highlight"]);
    assert!(success);
    assert!(stdout.contains(
        "Use &lt;b&gt;Rust&lt;/b&gt; &amp; <span class=\"highlight\">friends</span>"
    ));
}

#[test]
fn test_search_ignore_accents() {
    let (tmp, config_path) = loaded_env();
    let menu = tmp.path().join("menu.txt");
    fs::write(&menu, "Un café noir, s'il vous plaît.").unwrap();
    run_paraseek(&config_path, &["add", menu.to_str().unwrap()]);

    let (stdout, _, _) = run_paraseek(&config_path, &["search", "cafe"]);
    assert!(stdout.contains("No results."));

    let (stdout, _, success) =
        run_paraseek(&config_path, &["search", "cafe", "--ignore-accents", "--highlight"]);
    assert!(success);
    assert!(stdout.contains("<span class=\"highlight\">café</span>"), "got: {}", stdout);
}

#[test]
fn test_search_flag_overrides_config_default() {
    let (_tmp, config_path) = loaded_env();
    let mut config = fs::read_to_string(&config_path).unwrap();
    config.push_str("\n[search]\ncase_sensitive = true\n");
    fs::write(&config_path, config).unwrap();

    let (stdout, _, success) = run_paraseek(&config_path, &["search", "rust"]);
    assert!(success);
    assert!(stdout.contains("No results."), "got: {}", stdout);

    let (stdout, stderr, success) =
        run_paraseek(&config_path, &["search", "rust", "--no-case-sensitive"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("alpha.md"), "got: {}", stdout);
}

#[test]
fn test_search_invalid_regex_fails() {
    let (_tmp, config_path) = loaded_env();

    let (_, stderr, success) = run_paraseek(&config_path, &["search", "(unclosed", "--regex"]);
    assert!(!success);
    assert!(stderr.contains("Invalid search expression"), "got: {}", stderr);
}

#[test]
fn test_edit_paragraph_by_text() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, stderr, success) = run_paraseek(
        &config_path,
        &[
            "edit",
            "gamma.txt",
            "--paragraph",
            "Kubernetes and Docker are mentioned here.",
            "--with",
            "Nomad is mentioned here.",
        ],
    );
    assert!(success, "edit failed: stdout={}, stderr={}", stdout, stderr);

    assert_eq!(
        file_content(&config_path, "gamma.txt"),
        "Gamma plain text file.\n\nContains notes about deployment and infrastructure.\n\nNomad is mentioned here."
    );
    let (stdout, _, _) = run_paraseek(&config_path, &["search", "kubernetes"]);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_delete_paragraph_by_id() {
    let (_tmp, config_path) = loaded_env();

    let (_, stderr, success) = run_paraseek(&config_path, &["delete", "gamma.txt", "--id", "p0"]);
    assert!(success, "delete failed: {}", stderr);

    assert_eq!(
        file_content(&config_path, "gamma.txt"),
        "Contains notes about deployment and infrastructure.\n\nKubernetes and Docker are mentioned here."
    );
}

#[test]
fn test_stale_paragraph_reference_fails() {
    let (_tmp, config_path) = loaded_env();

    let (_, stderr, success) = run_paraseek(
        &config_path,
        &["edit", "gamma.txt", "--paragraph", "Not in the file.", "--with", "x"],
    );
    assert!(!success);
    assert!(stderr.contains("paragraph not found"), "got: {}", stderr);

    let (_, stderr, success) = run_paraseek(&config_path, &["delete", "missing.txt", "--id", "p0"]);
    assert!(!success);
    assert!(stderr.contains("file not found"), "got: {}", stderr);
}

#[test]
fn test_insert_paragraph() {
    let (_tmp, config_path) = loaded_env();

    let (_, stderr, success) =
        run_paraseek(&config_path, &["insert", "alpha.md", "--at", "-1", "Intro."]);
    assert!(success, "insert failed: {}", stderr);
    assert!(file_content(&config_path, "alpha.md").starts_with("Intro.\n\n# Alpha Document"));

    let (_, _, success) = run_paraseek(&config_path, &["insert", "alpha.md", "--at", "end", "Outro."]);
    assert!(success);
    assert!(file_content(&config_path, "alpha.md").ends_with("crates.\n\nOutro."));
}

#[test]
fn test_get_shows_paragraph_ids() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, success) = run_paraseek(&config_path, &["get", "alpha.md"]);
    assert!(success);
    assert!(stdout.contains("--- Paragraphs (3) ---"));
    assert!(stdout.contains("[p0] (1 lines)"));
    assert!(stdout.contains("[p18]"));

    let (_, stderr, success) = run_paraseek(&config_path, &["get", "missing.md"]);
    assert!(!success);
    assert!(stderr.contains("file not found"));
}

#[test]
fn test_context_of_split_class() {
    let (tmp, config_path) = loaded_env();
    let code = tmp.path().join("shapes.js");
    fs::write(&code, "class A {\n  m() {\n    x();\n\n    y();\n  }\n}\n").unwrap();
    run_paraseek(&config_path, &["add", code.to_str().unwrap()]);

    let (stdout, stderr, success) =
        run_paraseek(&config_path, &["context", "shapes.js", "--id", "p0"]);
    assert!(success, "context failed: {}", stderr);
    assert!(stdout.contains("part of a class"), "got: {}", stdout);
    assert!(stdout.contains("    y();"));
}

#[test]
fn test_export_results_to_file() {
    let (tmp, config_path) = loaded_env();
    let out = tmp.path().join("report.txt");

    let (_, stderr, success) = run_paraseek(
        &config_path,
        &["export", "results", "docker", "--output", out.to_str().unwrap()],
    );
    assert!(success, "export failed: {}", stderr);

    let report = fs::read_to_string(&out).unwrap();
    assert!(report.starts_with("Search results for: \"docker\""));
    assert!(report.contains("Total results: 1"));
    assert!(report.contains("File: gamma.txt"));

    let (stdout, _, _) = run_paraseek(
        &config_path,
        &["export", "results", "docker", "--format", "snippets"],
    );
    assert!(stdout.starts_with("// Result #1 from file: gamma.txt\n"));
}

#[test]
fn test_remove_and_clear() {
    let (_tmp, config_path) = loaded_env();

    let (_, _, success) = run_paraseek(&config_path, &["remove", "beta.md"]);
    assert!(success);
    let (stdout, _, _) = run_paraseek(&config_path, &["list"]);
    assert!(!stdout.contains("beta.md"));

    let (stdout, _, success) = run_paraseek(&config_path, &["clear"]);
    assert!(success);
    assert!(stdout.contains("Removed 2 file(s)."));
    let (stdout, _, _) = run_paraseek(&config_path, &["list"]);
    assert!(stdout.contains("No files."));
}

#[test]
fn test_stats() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, success) = run_paraseek(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Files:       3"));
    assert!(stdout.contains("Paragraphs:  9"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_paraseek(&tmp.path().join("nope.toml"), &["list"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_invalid_log_level_fails() {
    let (_tmp, config_path) = setup_test_env();
    let output = Command::new(paraseek_binary())
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config_path)
        .args(["--log-level", "paraseek=loud", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid log level"));
}
