use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

fn cxls_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cxls"))
}

fn replay(dir: &Path, trace: &str, extra: &[&str]) -> Output {
    let trace_path = dir.join("trace.jsonl");
    std::fs::write(&trace_path, trace).unwrap();
    std::fs::write(
        dir.join("cxls.toml"),
        format!("log_dir = {:?}\n", dir.display().to_string()),
    )
    .unwrap();

    Command::new(cxls_binary())
        .arg("replay")
        .arg(&trace_path)
        .arg("--project")
        .arg(dir)
        .args(extra)
        .output()
        .unwrap()
}

fn forwarded(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
#[cfg(not(windows))]
fn replay_forwards_open_save_close() {
    let dir = tempfile::tempdir().unwrap();
    let output = replay(
        dir.path(),
        r#"{"event":"open","uri":"file:///w/a.cpp","language":"cpp"}
{"event":"will-save","uri":"file:///w/a.cpp"}
{"event":"close","uri":"file:///w/a.cpp"}
"#,
        &["--workspace", "/w"],
    );

    assert!(
        output.status.success(),
        "Expected exit 0, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );

    let methods: Vec<_> = forwarded(&output)
        .iter()
        .map(|message| message["method"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        methods,
        vec![
            "textDocument/didOpen",
            "cpptools/didChangeVisibleTextEditors",
            "textDocument/willSaveWaitUntil",
            "textDocument/didClose",
        ]
    );
}

#[test]
#[cfg(not(windows))]
fn replay_reclassifies_upper_case_c() {
    let dir = tempfile::tempdir().unwrap();
    let output = replay(
        dir.path(),
        r#"{"event":"open","uri":"file:///w/x.C","language":"c"}"#,
        &["--workspace", "/w"],
    );
    assert!(output.status.success());

    let messages = forwarded(&output);
    assert_eq!(messages[0]["method"], "workspace/didChangeConfiguration");
    assert_eq!(
        messages[0]["params"]["settings"]["files.associations"]["x.C@/w/x.C"],
        "cpp"
    );
    assert_eq!(messages[1]["method"], "textDocument/didOpen");
    assert_eq!(messages[1]["params"]["textDocument"]["languageId"], "cpp");
    assert_eq!(messages[1]["session"], "/w");
}

#[test]
fn replay_malformed_trace_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = replay(dir.path(), "{\"event\":\"rename\"}\n", &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 1"));
}
