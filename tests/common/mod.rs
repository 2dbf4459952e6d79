#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

/// A small export with one exchange, a noisy footer and three buttons.
pub const EXPORT: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Gemini</title><script src="app.js"></script></head>
<body class="theme-host"><app-root><side-nav>Recent chats</side-nav><main>
<user-query><div class="user-query-bubble-with-background"><div class="query-text">How do I print?</div><button><mat-icon>expand_more</mat-icon></button></div></user-query>
<model-response><div class="markdown"><p>Like this:</p>
<code-block><pre><code>println!("hi");</code></pre><button><mat-icon>content_copy</mat-icon></button></code-block>
</div><message-actions><button><mat-icon>thumb_up</mat-icon></button></message-actions>
<button><mat-icon>share</mat-icon></button></model-response>
</main></app-root></body></html>"#;

/// Run the binary in `cwd` and return (exit code, stdout, stderr).
pub fn run_cli(cwd: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_simplify-transcript"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn binary");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// A temp dir holding `transcript2.html` with the given contents.
/// The `TempDir` must be kept alive for the duration of the test.
pub fn workspace(export: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("transcript2.html"), export).unwrap();
    dir
}
