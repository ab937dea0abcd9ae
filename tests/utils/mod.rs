// Test utilities: a scripted stand-in for the dtruss helper
//
// The fake helper records its argv, then copies a prepared list of lines into
// the file named by -W, one line at a time with a short pause, the way the
// real helper appends records while the target runs.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use dtruss_stream::TraceConfig;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const FAKE_HELPER: &str = r#"#!/bin/bash
here="$(dirname "$0")"
printf '%s\n' "$@" > "$here/argv.tmp" && mv "$here/argv.tmp" "$here/argv.txt"
out=""
while getopts "W:fK:t:" opt; do
    case "$opt" in
        W) out="$OPTARG" ;;
    esac
done
exec 3>>"$out"
if [ -f "$here/raw" ]; then
    cat "$here/lines.txt" >&3
    exit 0
fi
while IFS= read -r line || [ -n "$line" ]; do
    printf '%s\n' "$line" >&3
    sleep 0.01
done < "$here/lines.txt"
"#;

pub const OPEN_LINE: &str =
    r#"{"syscall":"open","args":["/tmp/a"],"retval":3,"errno":0,"pid":100,"timestamp":1.0}"#;

/// Build a helper-format JSON line
pub fn record_line(name: &str, args: &[&str], retval: i64, errno: i64, pid: i64, ts: f64) -> String {
    serde_json::json!({
        "syscall": name,
        "args": args,
        "retval": retval,
        "errno": errno,
        "pid": pid,
        "timestamp": ts,
    })
    .to_string()
}

pub struct FakeHelper {
    dir: TempDir,
}

impl FakeHelper {
    /// Helper that writes `lines` verbatim (include the sentinel to finish)
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dtruss.sh"), FAKE_HELPER).unwrap();

        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        fs::write(dir.path().join("lines.txt"), content).unwrap();
        fs::create_dir(dir.path().join("out")).unwrap();

        Self { dir }
    }

    /// Helper that writes `content` in one go, with no newline added
    pub fn with_raw_output(content: &str) -> Self {
        let helper = Self::new::<&str>(&[]);
        fs::write(helper.dir.path().join("lines.txt"), content).unwrap();
        fs::write(helper.dir.path().join("raw"), "").unwrap();
        helper
    }

    pub fn script(&self) -> PathBuf {
        self.dir.path().join("dtruss.sh")
    }

    /// Directory the session's output file is created in
    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn config(&self) -> TraceConfig {
        TraceConfig {
            helper: self.script(),
            poll_interval_ms: 5,
            temp_dir: Some(self.out_dir()),
            ..TraceConfig::default()
        }
    }

    /// Arguments the helper was started with (waits up to 5 seconds)
    pub fn recorded_argv(&self) -> Result<Vec<String>> {
        let path = self.dir.path().join("argv.txt");
        for _ in 0..500 {
            if let Ok(content) = fs::read_to_string(&path) {
                return Ok(content.lines().map(str::to_string).collect());
            }
            thread::sleep(Duration::from_millis(10));
        }
        Err(anyhow!("fake helper never recorded its arguments"))
    }
}
