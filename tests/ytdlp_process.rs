//! Full job runs through the process-driving extractor, with a shell script
//! standing in for the yt-dlp binary

#![cfg(unix)]

mod common;

use common::{assert_job_outcome, test_config};
use profile_dl::{JobManager, JobStatus, JobStore, NewJob, YtDlpExtractor};
use std::sync::Arc;
use tempfile::TempDir;

const FAKE_YTDLP: &str = r#"
last=""
mode=download
for arg in "$@"; do
  last="$arg"
  if [ "$arg" = "--dump-single-json" ]; then mode=discover; fi
done

if [ "$mode" = discover ]; then
  case "$last" in
    *private*)
      echo "ERROR: [tiktok] private: This account is private" >&2
      exit 1
      ;;
  esac
  cat <<'JSON'
{"id":"chan","_type":"playlist","entries":[
  {"id":"a1","webpage_url":"https://example.com/v/a1","uploader":"chan","upload_date":"20240101","ext":"mp4"},
  {"id":"b2","webpage_url":"https://example.com/v/b2","uploader":"chan","upload_date":"20240102","ext":"mp4"},
  {"id":"c3","webpage_url":"https://example.com/v/c3","uploader":"chan","upload_date":"20240103","ext":"mp4"}
]}
JSON
  exit 0
fi

case "$last" in
  *b2*)
    echo "ERROR: [generic] b2: Video unavailable" >&2
    exit 1
    ;;
esac
echo "[download] Destination: $last.mp4"
echo "[download]  42.0% of 1.00MiB at 2.00MiB/s ETA 00:01"
echo "[download] 100% of 1.00MiB in 00:00:01"
exit 0
"#;

fn script_manager() -> (JobManager, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let script = temp_dir.path().join("yt-dlp.sh");
    std::fs::write(&script, FAKE_YTDLP).unwrap();

    let extractor = YtDlpExtractor::with_launcher("sh", vec![script.into_os_string()]);
    let manager = JobManager::with_components(
        test_config(&temp_dir),
        Arc::new(JobStore::new()),
        Arc::new(extractor),
    );
    (manager, temp_dir)
}

#[tokio::test]
async fn test_script_backed_job_completes() {
    let (manager, _temp_dir) = script_manager();

    let job = manager
        .create(NewJob {
            profile_url: "https://www.tiktok.com/@chan".into(),
            max_videos: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    manager.run(job.id()).await;

    // b2 fails permanently, a1 succeeds; c3 is beyond the cap
    assert_job_outcome(&job.snapshot(), JobStatus::Completed, 2, 1, 1);
}

#[tokio::test]
async fn test_script_backed_discovery_failure_fails_job() {
    let (manager, _temp_dir) = script_manager();

    let job = manager
        .create(NewJob {
            profile_url: "https://www.tiktok.com/@private".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    manager.run(job.id()).await;

    let snapshot = job.snapshot();
    assert_eq!(snapshot.status, JobStatus::Failed);
    assert!(snapshot.message.starts_with("Could not access the content"));
    assert_eq!(snapshot.total, None);
}
