//! Tests for the single-worker render executor

use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tablepix::{FontCatalog, RenderBackend, RenderConfig, RenderExecutor};

#[derive(Clone, Default)]
struct Recorder {
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    order: Arc<Mutex<Vec<String>>>,
    delay_ms: u64,
}

impl RenderBackend for Recorder {
    fn render_job(&mut self, html: &str) -> Option<Vec<u8>> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(self.delay_ms));
        self.order.lock().unwrap().push(html.to_string());
        self.active.fetch_sub(1, Ordering::SeqCst);
        Some(html.as_bytes().to_vec())
    }
}

#[tokio::test]
async fn test_jobs_run_in_submission_order_one_at_a_time() {
    let recorder = Recorder {
        delay_ms: 2,
        ..Default::default()
    };
    let exec = RenderExecutor::with_backend(recorder.clone()).unwrap();

    let inputs: Vec<String> = (0..20).map(|i| format!("job-{}", i)).collect();
    let futures: Vec<_> = inputs.iter().map(|html| exec.submit(html.clone())).collect();
    let results = join_all(futures.into_iter().rev()).await;

    // Each caller gets its own job's result regardless of await order
    for (result, html) in results.into_iter().rev().zip(&inputs) {
        assert_eq!(result, Some(html.as_bytes().to_vec()));
    }
    assert_eq!(*recorder.order.lock().unwrap(), inputs);
    assert_eq!(recorder.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_worker() {
    let recorder = Recorder {
        delay_ms: 1,
        ..Default::default()
    };
    let exec = RenderExecutor::with_backend(recorder.clone()).unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let exec = exec.clone();
        handles.push(tokio::spawn(async move { exec.submit(format!("t{}", i)).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }
    assert_eq!(recorder.order.lock().unwrap().len(), 8);
    assert_eq!(recorder.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_abandoned_job_still_completes() {
    let recorder = Recorder {
        delay_ms: 100,
        ..Default::default()
    };
    let exec = RenderExecutor::with_backend(recorder.clone()).unwrap();

    let slow = exec.submit("slow");
    let timed_out = tokio::time::timeout(Duration::from_millis(5), slow).await;
    assert!(timed_out.is_err());

    let next = exec.submit("next").await;
    assert_eq!(next, Some(b"next".to_vec()));
    assert_eq!(*recorder.order.lock().unwrap(), vec!["slow", "next"]);
}

#[tokio::test]
async fn test_shutdown_drains_queued_jobs() {
    let recorder = Recorder {
        delay_ms: 5,
        ..Default::default()
    };
    let exec = RenderExecutor::with_backend(recorder.clone()).unwrap();
    let pending: Vec<_> = (0..3).map(|i| exec.submit(format!("q{}", i))).collect();
    exec.clone().shutdown().await.unwrap();
    assert_eq!(recorder.order.lock().unwrap().len(), 3);
    for result in join_all(pending).await {
        assert!(result.is_some());
    }
    assert_eq!(exec.submit("after").await, None);
}

#[tokio::test]
async fn test_table_pipeline_through_executor() {
    let exec = RenderExecutor::new(Arc::new(FontCatalog::empty()), RenderConfig::default()).unwrap();
    let png = exec
        .submit("<table><tr><td>hello</td><td>world</td></tr></table>")
        .await
        .expect("image");
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(exec.submit("<p>no table</p>").await, None);
}
