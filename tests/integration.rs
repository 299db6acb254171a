use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn postdeck_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("postdeck");
    path
}

const POSTS: &[&str] = &[
    r#"{"title":"Debugging SQL with GPT","author_name":"Ada Lovelace","created_at":"2024-03-05T10:00:00Z","document":"First I asked:\nOutput was wrong\nThen fixed it","raw":{"content":"<post><image src='step1.png'/><image src='step2.png'/><link href='https://example.com/q'>query</link><file url='schema.sql'/></post>"},"cluster_metadata":{"model_ids":["gpt_4"],"topic_category_ids":["databases"],"post_type_category_ids":["homework_1"]}}"#,
    r#"{"title":"Essay structure","author_name":"Grace Hopper","created_at":1709632800,"document":"Intro paragraph.\n\nSecond paragraph.\nWith a break.","cluster_metadata":{"model_ids":["claude"],"topic_category_ids":["writing"]}}"#,
    r#"{"author_name":"Anonymous","created_at":"not a date","raw":{"document":"Fallback body","content":"<broken><image src='x.png'>"},"cluster_metadata":{"model_ids":["gpt_4","claude"]}}"#,
    r#"{"title":"Empty post"}"#,
];

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("posts.jsonl"), POSTS.join("\n") + "\n").unwrap();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[corpus]
source = "{}/data/posts.jsonl"

[server]
bind = "127.0.0.1:7340"

[display]
date_format = "%Y-%m-%d"
"#,
        root.display()
    );
    let config_path = config_dir.join("postdeck.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_postdeck(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = postdeck_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run postdeck binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run_json(config_path: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, success) = run_postdeck(config_path, args);
    assert!(success, "postdeck {:?} failed: {}", args, stderr);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, stdout))
}

fn indices(listing: &serde_json::Value) -> Vec<u64> {
    listing
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["index"].as_u64().unwrap())
        .collect()
}

#[test]
fn test_list_all() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_postdeck(&config, &["list"]);
    assert!(success, "list failed: {}", stderr);
    assert!(stdout.contains("Debugging SQL with GPT (Ada Lovelace)"));
    assert!(stdout.contains("(untitled) (Anonymous)"));
    assert!(stdout.contains("2024-03-05"));
    assert!(stdout.contains("Unknown date"));
    assert!(stdout.contains("4 of 4 posts"));
}

#[test]
fn test_list_json_unfiltered_keeps_order() {
    let (_tmp, config) = setup_test_env();
    let listing = run_json(&config, &["list", "--json"]);
    assert_eq!(indices(&listing), vec![0, 1, 2, 3]);
}

#[test]
fn test_list_title_filter() {
    let (_tmp, config) = setup_test_env();
    let listing = run_json(&config, &["list", "--title", "  ESSAY ", "--json"]);
    assert_eq!(indices(&listing), vec![1]);
}

#[test]
fn test_list_author_filter() {
    let (_tmp, config) = setup_test_env();
    let listing = run_json(&config, &["list", "--author", "hopper", "--json"]);
    assert_eq!(indices(&listing), vec![1]);
}

#[test]
fn test_list_facet_or_within_and_across() {
    let (_tmp, config) = setup_test_env();
    let either = run_json(&config, &["list", "--model", "gpt_4", "--model", "claude", "--json"]);
    assert_eq!(indices(&either), vec![0, 1, 2]);

    let both = run_json(
        &config,
        &["list", "--model", "claude", "--topic", "writing", "--json"],
    );
    assert_eq!(indices(&both), vec![1]);

    let assignment = run_json(&config, &["list", "--assignment", "homework_1", "--json"]);
    assert_eq!(indices(&assignment), vec![0]);
}

#[test]
fn test_list_no_matches() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, success) = run_postdeck(&config, &["list", "--title", "zzz"]);
    assert!(success);
    assert!(stdout.contains("No matching posts."));
}

#[test]
fn test_tags() {
    let (_tmp, config) = setup_test_env();
    let tags = run_json(&config, &["tags", "--json"]);
    let ids: Vec<&str> = tags["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["claude", "gpt_4"]);
    assert_eq!(tags["assignments"][0]["label"], "homework 1");

    let (stdout, _, _) = run_postdeck(&config, &["tags"]);
    assert!(stdout.contains("homework 1  [homework_1]"));
}

#[test]
fn test_show_interleaves_images() {
    let (_tmp, config) = setup_test_env();
    let view = run_json(&config, &["show", "0", "--json"]);
    let kinds: Vec<&str> = view["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec!["paragraph", "image", "paragraph", "paragraph", "image", "link", "file"]
    );
    assert_eq!(view["blocks"][1]["src"], "step1.png");
    assert_eq!(view["blocks"][4]["src"], "step2.png");
    assert_eq!(view["blocks"][5]["text"], "query");
}

#[test]
fn test_show_paragraph_mode() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_postdeck(&config, &["show", "1"]);
    assert!(success, "show failed: {}", stderr);
    assert!(stdout.contains("title:       Essay structure"));
    assert!(stdout.contains("Second paragraph.\nWith a break."));
}

#[test]
fn test_show_broken_markup_renders_body() {
    let (_tmp, config) = setup_test_env();
    let view = run_json(&config, &["show", "2", "--json"]);
    let blocks = view["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["lines"][0], "Fallback body");
    assert_eq!(view["date"], "Unknown date");
}

#[test]
fn test_show_empty_post() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, success) = run_postdeck(&config, &["show", "3"]);
    assert!(success);
    assert!(stdout.contains("No content available."));
}

#[test]
fn test_show_out_of_range() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_postdeck(&config, &["show", "99"]);
    assert!(!success);
    assert!(stderr.contains("post not found"));
}

#[test]
fn test_invalid_corpus_is_load_error() {
    let (tmp, config) = setup_test_env();
    fs::write(
        tmp.path().join("data/posts.jsonl"),
        "{\"title\":\"ok\"}\n{\"title\": oops}\n",
    )
    .unwrap();
    let (stdout, stderr, success) = run_postdeck(&config, &["list"]);
    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Failed to load corpus"));
    assert!(stderr.contains("line 2"));
}

#[test]
fn test_corpus_flag_without_config() {
    let (tmp, _) = setup_test_env();
    let single = tmp.path().join("single.json");
    fs::write(&single, r#"[{"title":"One"},{"title":"Two"}]"#).unwrap();

    let missing = tmp.path().join("nope.toml");
    let (stdout, stderr, success) = run_postdeck(
        &missing,
        &["--corpus", single.to_str().unwrap(), "list", "--json"],
    );
    assert!(success, "list failed: {}", stderr);
    let listing: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(listing.as_array().unwrap().len(), 2);
}

#[test]
fn test_missing_config_without_corpus_errors() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_postdeck(&tmp.path().join("nope.toml"), &["list"]);
    assert!(!success);
    assert!(stderr.contains("Config file not found"));
}
