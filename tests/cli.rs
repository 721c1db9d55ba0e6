#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TITLE: &str = "Title Under Test";

const VTT: &str = "WEBVTT
Kind: captions
Language: en

00:00:00.000 --> 00:00:02.000 align:start position:0%
welcome<00:00:00.500><c> to</c><00:00:01.000><c> the</c><00:00:01.500><c> channel</c>

00:00:02.000 --> 00:00:02.010 align:start position:0%
welcome to the channel

00:00:02.010 --> 00:00:05.000 align:start position:0%
welcome to the channel
today we look at how subtitles become summaries";

const MANUAL_EN: &str = r#"{"id": "abc", "title": "Title Under Test", "subtitles": {"en": [{"ext": "vtt"}]}, "automatic_captions": {"en": [{"ext": "vtt"}]}}"#;

const FRENCH_ONLY: &str = r#"{"id": "abc", "title": "Title Under Test", "subtitles": {}, "automatic_captions": {"fr": [{"ext": "vtt"}]}}"#;

const AGENT: &str = r#"#!/bin/sh
input=$(cat)
case "$input" in
  *"Title Under Test"*"today we look at how subtitles become summaries"*) echo "The summary." ;;
  *) echo "prompt is missing the title or transcript" >&2; exit 3 ;;
esac
"#;

fn ytdlp_script(info_json: &str) -> String {
    format!(
        r#"#!/bin/sh
for arg in "$@"; do
  if [ "$arg" = "--dump-single-json" ]; then
    cat <<'EOF'
{info_json}
EOF
    exit 0
  fi
done
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
[ -n "$out" ] || exit 1
dir=$(dirname "$out")
cat > "$dir/subs.en.vtt" <<'EOF'
{VTT}
EOF
"#
    )
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

struct Sandbox {
    dir: TempDir,
    ytdlp: PathBuf,
    agent: PathBuf,
}

impl Sandbox {
    fn new(info_json: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ytdlp = write_script(dir.path(), "yt-dlp", &ytdlp_script(info_json));
        let agent = write_script(dir.path(), "agent", AGENT);
        Self { dir, ytdlp, agent }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("yts").unwrap();
        cmd.env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("YTS_YT_DLP", &self.ytdlp)
            .env("YTS_AGENT", &self.agent);
        cmd
    }
}

#[test]
fn test_success_prints_only_summary() {
    let sandbox = Sandbox::new(MANUAL_EN);
    let output = sandbox.cmd().arg("https://www.youtube.com/watch?v=abc").output().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "The summary.\n");

    let stderr = String::from_utf8(output.stderr).unwrap();
    let title_marker = format!("Title: {TITLE}");
    let markers: [&str; 5] = [
        "Fetching video info...",
        &title_marker,
        "Downloading subtitles...",
        "Cleaning transcript...",
        "Summarizing with agent (claude-haiku-4-5-20251001)...",
    ];
    let mut from = 0;
    for marker in markers {
        let pos = stderr[from..]
            .find(marker)
            .unwrap_or_else(|| panic!("missing {marker:?} in {stderr}"));
        from += pos + marker.len();
    }
}

#[test]
fn test_model_flag_is_reported() {
    let sandbox = Sandbox::new(MANUAL_EN);
    sandbox
        .cmd()
        .args(["https://youtu.be/abc", "--model", "claude-sonnet-4-6"])
        .assert()
        .success()
        .stderr(predicate::str::contains("(claude-sonnet-4-6)..."));
}

#[test]
fn test_config_file_model_is_used() {
    let sandbox = Sandbox::new(MANUAL_EN);
    let config_dir = sandbox.dir.path().join("config").join("yts");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "default_model = \"claude-opus-4-1\"\n").unwrap();

    sandbox
        .cmd()
        .arg("https://youtu.be/abc")
        .assert()
        .success()
        .stderr(predicate::str::contains("Summarizing with agent (claude-opus-4-1)..."));
}

#[test]
fn test_no_english_subtitles_fails_with_empty_stdout() {
    let sandbox = Sandbox::new(FRENCH_ONLY);
    sandbox
        .cmd()
        .arg("https://youtu.be/abc")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("no en subtitles found for this video"))
        .stderr(predicate::str::contains("Summarizing").not());
}

#[test]
fn test_metadata_failure() {
    let sandbox = Sandbox::new(MANUAL_EN);
    let broken = write_script(
        sandbox.dir.path(),
        "broken-yt-dlp",
        "#!/bin/sh\necho 'ERROR: [youtube] abc: Video unavailable' >&2\nexit 1\n",
    );
    sandbox
        .cmd()
        .env("YTS_YT_DLP", &broken)
        .arg("https://youtu.be/abc")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("error fetching video info"))
        .stderr(predicate::str::contains("Video unavailable"));
}

#[test]
fn test_missing_agent() {
    let sandbox = Sandbox::new(MANUAL_EN);
    sandbox
        .cmd()
        .env("YTS_AGENT", sandbox.dir.path().join("no-such-agent"))
        .arg("https://youtu.be/abc")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("error calling summarizer"));
}

#[test]
fn test_failing_agent() {
    let sandbox = Sandbox::new(MANUAL_EN);
    let failing = write_script(sandbox.dir.path(), "failing-agent", "#!/bin/sh\necho 'rate limited' >&2\nexit 2\n");
    sandbox
        .cmd()
        .env("YTS_AGENT", &failing)
        .arg("https://youtu.be/abc")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("rate limited"));
}

#[test]
fn test_url_required() {
    let sandbox = Sandbox::new(MANUAL_EN);
    sandbox.cmd().assert().failure().stdout("");
}

#[test]
fn test_help_lists_required_tools() {
    let sandbox = Sandbox::new(MANUAL_EN);
    sandbox
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("REQUIRED TOOLS"))
        .stdout(predicate::str::contains("--model"));
}
