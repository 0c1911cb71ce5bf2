//! Extractor backed by the external yt-dlp binary

use super::profile::ExtractorProfile;
use super::traits::{Discovery, Extractor, FetchProgress, FetchRequest, ItemDescriptor};
use crate::error::ExtractorError;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::LazyLock;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// yt-dlp driven through `tokio::process`
///
/// Discovery runs `--dump-single-json`; transfers run with `--newline` and
/// progress is parsed from stdout line by line. When the progress sink asks
/// to stop, the child process is killed.
///
/// # Examples
///
/// ```no_run
/// use profile_dl::extractor::{Extractor, ExtractorProfile, YtDlpExtractor};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = YtDlpExtractor::from_path().expect("yt-dlp not found in PATH");
/// let discovery = extractor
///     .discover("https://www.tiktok.com/@someone", &ExtractorProfile::minimal(), None)
///     .await?;
/// println!("{} items", discovery.into_items().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl YtDlpExtractor {
    /// Create an extractor with an explicit binary path
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            program: binary_path.into(),
            leading_args: Vec::new(),
        }
    }

    /// Run yt-dlp through a launcher, e.g. `python3 -m yt_dlp`
    pub fn with_launcher(program: impl Into<PathBuf>, leading_args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Program that is executed
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, profile: &ExtractorProfile, proxy: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(profile_args(profile, proxy))
            .arg("--no-warnings")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn discover(
        &self,
        url: &str,
        profile: &ExtractorProfile,
        proxy: Option<&str>,
    ) -> Result<Discovery, ExtractorError> {
        let output = self
            .command(profile, proxy)
            .arg("--dump-single-json")
            .arg("--")
            .arg(url)
            .output()
            .await
            .map_err(|e| ExtractorError::Spawn(e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() && stdout.trim().is_empty() {
            return Err(ExtractorError::Failed(failure_message(&stderr, output.status)));
        }

        match parse_discovery(&stdout)? {
            Some(discovery) => Ok(discovery),
            None => Err(ExtractorError::Failed(failure_message(&stderr, output.status))),
        }
    }

    async fn fetch(&self, request: FetchRequest<'_>) -> Result<(), ExtractorError> {
        let mut child = self
            .command(request.profile, request.proxy)
            .arg("--newline")
            .arg("-o")
            .arg(request.output.pattern())
            .arg("--")
            .arg(request.item_url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExtractorError::Spawn(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExtractorError::Spawn("yt-dlp stdout was not captured".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExtractorError::Spawn("yt-dlp stderr was not captured".into()))?;

        // Drain stderr concurrently so a chatty child never blocks on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        let mut current: Option<String> = None;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| ExtractorError::InvalidOutput(e.to_string()))?
        {
            let filename = match ProgressLine::parse(&line) {
                Some(ProgressLine::Destination(f))
                | Some(ProgressLine::AlreadyDownloaded(f))
                | Some(ProgressLine::Merging(f)) => {
                    current = Some(f.clone());
                    f
                }
                Some(ProgressLine::Percent) => match &current {
                    Some(f) => f.clone(),
                    None => continue,
                },
                None => continue,
            };

            if (request.progress)(FetchProgress::Downloading { filename }).is_break() {
                tracing::debug!(url = request.item_url, "Progress checkpoint requested abort");
                let _ = child.kill().await;
                stderr_task.abort();
                return Err(ExtractorError::Aborted);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ExtractorError::Spawn(e.to_string()))?;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(ExtractorError::Failed(failure_message(&stderr, status)));
        }

        let filename = current.unwrap_or_else(|| request.item_url.to_string());
        // The file is complete; a late stop request is honored at the next checkpoint
        let _ = (request.progress)(FetchProgress::Finished { filename });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Command-line flags for a profile (and optional proxy)
pub fn profile_args(profile: &ExtractorProfile, proxy: Option<&str>) -> Vec<String> {
    let mut args = vec!["-f".to_string(), profile.format.clone()];

    if let Some(container) = &profile.merge_output_format {
        args.push("--merge-output-format".into());
        args.push(container.clone());
    }
    if let Some(retries) = profile.retries {
        args.push("--retries".into());
        args.push(retries.to_string());
    }
    if let Some(retries) = profile.fragment_retries {
        args.push("--fragment-retries".into());
        args.push(retries.to_string());
    }
    args.push(if profile.no_playlist {
        "--no-playlist".into()
    } else {
        "--yes-playlist".into()
    });
    if profile.ignore_errors {
        args.push("--ignore-errors".into());
    }
    if let Some(n) = profile.concurrent_fragments {
        args.push("-N".into());
        args.push(n.to_string());
    }
    if let Some(sleep) = &profile.sleep {
        args.push("--sleep-interval".into());
        args.push(sleep.interval_secs.to_string());
        args.push("--max-sleep-interval".into());
        args.push(sleep.max_interval_secs.to_string());
        args.push("--sleep-requests".into());
        args.push(sleep.requests_secs.to_string());
    }
    for (name, value) in &profile.headers {
        args.push("--add-header".into());
        args.push(format!("{}:{}", name, value));
    }
    if let Some(extractor_args) = &profile.extractor_args {
        args.push("--extractor-args".into());
        args.push(extractor_args.clone());
    }
    if !profile.check_certificates {
        args.push("--no-check-certificates".into());
    }
    if let Some(proxy) = proxy {
        args.push("--proxy".into());
        args.push(proxy.to_string());
    }

    args
}

/// Parse `--dump-single-json` output; `None` when yt-dlp printed nothing useful
fn parse_discovery(stdout: &str) -> Result<Option<Discovery>, ExtractorError> {
    let text = stdout.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| ExtractorError::InvalidOutput(format!("metadata is not JSON: {}", e)))?;

    match &value {
        Value::Null => Ok(None),
        Value::Object(map) if map.get("entries").is_some_and(Value::is_array) => {
            let mut items = Vec::new();
            collect_entries(&value, &mut items);
            Ok(Some(Discovery::Collection(items)))
        }
        Value::Object(_) => Ok(Some(Discovery::Single(descriptor_from(&value)))),
        other => Err(ExtractorError::InvalidOutput(format!(
            "expected a metadata object, got {}",
            other
        ))),
    }
}

/// Flatten nested playlists (channel tabs) into their leaf entries, skipping
/// unavailable (null) entries
fn collect_entries(value: &Value, out: &mut Vec<ItemDescriptor>) {
    let Some(entries) = value.get("entries").and_then(Value::as_array) else {
        return;
    };
    for entry in entries {
        if entry.is_null() {
            continue;
        }
        if entry.get("entries").is_some_and(Value::is_array) {
            collect_entries(entry, out);
        } else {
            out.push(descriptor_from(entry));
        }
    }
}

fn descriptor_from(value: &Value) -> ItemDescriptor {
    let field = |key: &str| match value.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    ItemDescriptor {
        webpage_url: field("webpage_url"),
        url: field("url"),
        id: field("id"),
        uploader: field("uploader"),
        upload_date: field("upload_date"),
        ext: field("ext"),
        title: field("title"),
    }
}

/// Human-readable failure from yt-dlp's stderr
fn failure_message(stderr: &str, status: ExitStatus) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();
    if !errors.is_empty() {
        return errors.join("; ");
    }

    match stderr.lines().map(str::trim).rfind(|l| !l.is_empty()) {
        Some(last) => last.to_string(),
        None => format!("yt-dlp exited with {}", status),
    }
}

/// A stdout line yt-dlp prints during a transfer with `--newline`
#[derive(Debug, PartialEq, Eq)]
enum ProgressLine {
    Destination(String),
    AlreadyDownloaded(String),
    Merging(String),
    Percent,
}

struct ProgressPatterns {
    destination: Regex,
    already_downloaded: Regex,
    merging: Regex,
    percent: Regex,
}

static PATTERNS: LazyLock<ProgressPatterns> = LazyLock::new(|| {
    // Literal patterns, covered by the tests below
    #[allow(clippy::expect_used)]
    let compile = |p: &str| Regex::new(p).expect("valid progress pattern");
    ProgressPatterns {
        destination: compile(r"^\[download\] Destination: (.+)$"),
        already_downloaded: compile(r"^\[download\] (.+) has already been downloaded"),
        merging: compile(r#"^\[Merger\] Merging formats into "(.+)"$"#),
        percent: compile(r"^\[download\]\s+\d+(?:\.\d+)?%"),
    }
});

impl ProgressLine {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        let patterns = &*PATTERNS;
        let capture = |re: &Regex| re.captures(line).map(|c| c[1].to_string());

        if let Some(f) = capture(&patterns.destination) {
            Some(ProgressLine::Destination(f))
        } else if let Some(f) = capture(&patterns.already_downloaded) {
            Some(ProgressLine::AlreadyDownloaded(f))
        } else if let Some(f) = capture(&patterns.merging) {
            Some(ProgressLine::Merging(f))
        } else if patterns.percent.is_match(line) {
            Some(ProgressLine::Percent)
        } else {
            None
        }
    }
}
