use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn docent_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_docent"))
}

/// One-page PDF whose only text is `phrase`. Offsets in the xref table are
/// computed while writing so pdf-extract can parse it.
fn single_page_pdf(phrase: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", phrase);
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let mut offsets = Vec::new();
    offsets.push(out.len());
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    offsets.push(out.len());
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    offsets.push(out.len());
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    offsets.push(out.len());
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
            stream.len(),
            stream
        )
        .as_bytes(),
    );
    offsets.push(out.len());
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let files_dir = root.join("files");
    fs::create_dir_all(files_dir.join("nested")).unwrap();
    fs::write(
        files_dir.join("a.txt"),
        "Cats are mammals.\n\nDogs are loyal.",
    )
    .unwrap();
    fs::write(
        files_dir.join("nested/deploy.md"),
        "# Deployment\n\nWe deploy with Kubernetes.\n\nRollbacks use Helm.",
    )
    .unwrap();
    fs::write(files_dir.join("photo.png"), [0x89u8, 0x50, 0x4e, 0x47]).unwrap();
    fs::write(
        files_dir.join("report.pdf"),
        single_page_pdf("Quarterly revenue grew steadily"),
    )
    .unwrap();
    fs::write(files_dir.join("broken.pdf"), b"%PDF-1.4 truncated").unwrap();

    let config_content = r#"[retrieval]
top_k = 5
min_keyword_len = 2

[synthesizer]
provider = "disabled"

[sources]
include_globs = ["**/*.md", "**/*.txt", "**/*.png"]
"#;
    let config_path = root.join("docent.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_docent(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = docent_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docent binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn file_arg(config_path: &Path, rel: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .join("files")
        .join(rel)
        .to_string_lossy()
        .to_string()
}

#[test]
fn test_search_ranks_dogs_fragment_first() {
    let (_tmp, config_path) = setup_test_env();
    let a = file_arg(&config_path, "a.txt");

    let (stdout, stderr, success) =
        run_docent(&config_path, &["search", "What are dogs?", "--file", &a]);
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);

    let dogs = stdout.find("Dogs are loyal.").expect("dogs fragment listed");
    let cats = stdout.find("Cats are mammals.").expect("cats fragment listed");
    assert!(dogs < cats);
    assert!(stdout.starts_with("1. [2] a.txt"));
}

#[test]
fn test_search_limit() {
    let (_tmp, config_path) = setup_test_env();
    let a = file_arg(&config_path, "a.txt");

    let (stdout, _, success) = run_docent(
        &config_path,
        &["search", "What are dogs?", "--file", &a, "--limit", "1"],
    );
    assert!(success);
    assert!(stdout.contains("Dogs are loyal."));
    assert!(!stdout.contains("Cats are mammals."));
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();
    let a = file_arg(&config_path, "a.txt");

    let (stdout, _, success) = run_docent(&config_path, &["search", "zebra", "--file", &a]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_dir_reports_unsupported_files() {
    let (_tmp, config_path) = setup_test_env();
    let dir = config_path.parent().unwrap().join("files");

    let (stdout, stderr, success) = run_docent(
        &config_path,
        &["search", "kubernetes", "--dir", dir.to_str().unwrap()],
    );
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("nested/deploy.md"));
    assert!(stdout.contains("We deploy with Kubernetes."));
    assert!(stderr.contains("failed photo.png: Unsupported file type: unknown"));
}

#[test]
fn test_duplicate_file_is_skipped() {
    let (_tmp, config_path) = setup_test_env();
    let a = file_arg(&config_path, "a.txt");

    let (stdout, stderr, success) = run_docent(
        &config_path,
        &["search", "dogs", "--file", &a, "--file", &a],
    );
    assert!(success);
    assert!(stderr.contains("skipped a.txt: already added"));
    // Only one copy of the fragment is indexed.
    assert_eq!(stdout.matches("Dogs are loyal.").count(), 1);
}

#[test]
fn test_chunk_prints_fragments() {
    let (_tmp, config_path) = setup_test_env();
    let a = file_arg(&config_path, "a.txt");

    let (stdout, stderr, success) = run_docent(&config_path, &["chunk", &a]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("a.txt: 2 fragments"));
    assert!(stdout.contains("--- [1] ---\nDogs are loyal."));
}

#[test]
fn test_ask_without_documents_needs_no_model() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_docent(&config_path, &["ask", "What are dogs?"]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("Please upload a document before asking questions."));
}

#[test]
fn test_ask_irrelevant_question_needs_no_model() {
    let (_tmp, config_path) = setup_test_env();
    let a = file_arg(&config_path, "a.txt");

    let (stdout, _, success) = run_docent(&config_path, &["ask", "zebra", "--file", &a]);
    assert!(success);
    assert!(stdout.contains("I couldn't find any relevant information"));
}

#[test]
fn test_ask_with_disabled_model_fails() {
    let (_tmp, config_path) = setup_test_env();
    let a = file_arg(&config_path, "a.txt");

    let (_, stderr, success) = run_docent(&config_path, &["ask", "dogs", "--file", &a]);
    assert!(!success);
    assert!(stderr.contains("Failed to get response from AI: answer synthesis is disabled"));
}

#[test]
fn test_invalid_config_fails() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("bad.toml");
    fs::write(&bad, "[retrieval]\ntop_k = 0\n").unwrap();

    let (_, stderr, success) = run_docent(&bad, &["ask", "anything"]);
    assert!(!success);
    assert!(stderr.contains("top_k"));
}

#[test]
fn test_search_retrieves_pdf_fragment() {
    let (_tmp, config_path) = setup_test_env();
    let pdf = file_arg(&config_path, "report.pdf");
    let a = file_arg(&config_path, "a.txt");

    let (stdout, stderr, success) = run_docent(
        &config_path,
        &["search", "How did revenue change?", "--file", &a, "--file", &pdf],
    );
    assert!(success, "stderr={}", stderr);
    assert!(stdout.starts_with("1. [1] report.pdf"), "stdout={}", stdout);
    assert!(stdout.contains("Quarterly revenue grew steadily"));
    assert!(!stdout.contains("Dogs are loyal."));
}

#[test]
fn test_chunk_pdf() {
    let (_tmp, config_path) = setup_test_env();
    let pdf = file_arg(&config_path, "report.pdf");

    let (stdout, stderr, success) = run_docent(&config_path, &["chunk", &pdf]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("report.pdf: 1 fragments"));
    assert!(stdout.contains("Quarterly revenue grew steadily"));
}

#[test]
fn test_chunk_malformed_pdf_reports_error() {
    let (_tmp, config_path) = setup_test_env();
    let broken = file_arg(&config_path, "broken.pdf");

    let (_, stderr, success) = run_docent(&config_path, &["chunk", &broken]);
    assert!(!success);
    assert!(stderr.contains("Error:"), "stderr={}", stderr);
}

#[test]
fn test_search_rejects_zero_limit() {
    let (_tmp, config_path) = setup_test_env();
    let a = file_arg(&config_path, "a.txt");

    let (stdout, stderr, success) = run_docent(
        &config_path,
        &["search", "dogs", "--file", &a, "--limit", "0"],
    );
    assert!(!success);
    assert!(stderr.contains("--limit must be >= 1"));
    assert!(!stdout.contains("No results."));
}
