//! Single-worker bridge between async callers and the synchronous renderer.

use crate::rendering::TablePipeline;
use crate::{Error, FontCatalog, RenderConfig, Result};
use log::{debug, warn};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

/// Something the worker can run jobs against.
///
/// Implementations own all mutable rendering state; the executor guarantees
/// `render_job` is never called concurrently.
pub trait RenderBackend: Send + 'static {
    /// Render one HTML fragment. `None` means no image.
    fn render_job(&mut self, html: &str) -> Option<Vec<u8>>;
}

impl RenderBackend for TablePipeline {
    fn render_job(&mut self, html: &str) -> Option<Vec<u8>> {
        self.render_png(html)
    }
}

enum Command {
    Render(String, oneshot::Sender<Option<Vec<u8>>>),
    Shutdown(oneshot::Sender<()>),
}

/// An async-friendly renderer backed by one dedicated worker thread.
///
/// Jobs run one at a time in submission order. A job that has been queued
/// always runs to completion; dropping the future returned by
/// [`submit`](Self::submit) only discards its result.
#[derive(Clone)]
pub struct RenderExecutor {
    cmd_tx: Sender<Command>,
}

impl RenderExecutor {
    /// Spawn a worker running the table pipeline with the given catalog and config.
    pub fn new(catalog: Arc<FontCatalog>, config: RenderConfig) -> Result<Self> {
        Self::with_backend(TablePipeline::new(catalog, config))
    }

    /// Spawn a worker that scans the system fonts before taking its first job.
    ///
    /// Returns without waiting for the scan; jobs submitted in the meantime
    /// stay queued until the catalog is ready.
    pub fn with_system_fonts(config: RenderConfig) -> Result<Self> {
        Self::with_backend_factory(move || TablePipeline::new(Arc::new(FontCatalog::system()), config))
    }

    /// Spawn a worker that owns `backend`.
    pub fn with_backend<B: RenderBackend>(backend: B) -> Result<Self> {
        Self::with_backend_factory(move || backend)
    }

    /// Spawn a worker that builds its backend on the worker thread.
    pub fn with_backend_factory<B, F>(factory: F) -> Result<Self>
    where
        B: RenderBackend,
        F: FnOnce() -> B + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        thread::Builder::new()
            .name("tablepix-render".into())
            .spawn(move || {
                let backend = match panic::catch_unwind(AssertUnwindSafe(factory)) {
                    Ok(backend) => backend,
                    Err(_) => {
                        // Dropping the receiver fails every queued and later job
                        warn!("Render backend failed to initialize");
                        return;
                    }
                };
                worker_loop(backend, cmd_rx)
            })
            .map_err(|e| Error::InitializationError(format!("Failed to spawn render worker: {}", e)))?;
        Ok(Self { cmd_tx })
    }

    /// Queue `html` for rendering and return a future for its result.
    ///
    /// The job is queued before this returns, so jobs run in call order even
    /// if the futures are polled out of order.
    pub fn submit(&self, html: impl Into<String>) -> impl Future<Output = Option<Vec<u8>>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let queued = self.cmd_tx.send(Command::Render(html.into(), tx)).is_ok();
        async move {
            if !queued {
                warn!("Render worker has stopped; dropping job");
                return None;
            }
            match rx.await {
                Ok(png) => png,
                Err(e) => {
                    warn!("Render job canceled: {}", e);
                    None
                }
            }
        }
    }

    /// Stop the worker after every job queued before this call has finished.
    pub async fn shutdown(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown(tx))
            .map_err(|_| Error::WorkerUnavailable("worker already stopped".into()))?;
        rx.await
            .map_err(|e| Error::WorkerUnavailable(format!("Shutdown canceled: {}", e)))
    }
}

fn worker_loop<B: RenderBackend>(mut backend: B, cmd_rx: Receiver<Command>) {
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            Command::Render(html, resp) => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| backend.render_job(&html)))
                    .unwrap_or_else(|_| {
                        debug!("Drawing table panicked [input: {} bytes]", html.len());
                        None
                    });
                // The caller may have stopped waiting; the result is discarded then.
                let _ = resp.send(result);
            }
            Command::Shutdown(resp) => {
                let _ = resp.send(());
                break;
            }
        }
    }
    debug!("Render worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl RenderBackend for Echo {
        fn render_job(&mut self, html: &str) -> Option<Vec<u8>> {
            if html.is_empty() {
                None
            } else {
                Some(html.as_bytes().to_vec())
            }
        }
    }

    struct Panicky;

    impl RenderBackend for Panicky {
        fn render_job(&mut self, html: &str) -> Option<Vec<u8>> {
            if html == "boom" {
                panic!("backend exploded");
            }
            Some(vec![1])
        }
    }

    #[tokio::test]
    async fn submit_resolves_own_result() {
        let exec = RenderExecutor::with_backend(Echo).unwrap();
        let a = exec.submit("a");
        let b = exec.submit("");
        assert_eq!(b.await, None);
        assert_eq!(a.await, Some(b"a".to_vec()));
    }

    #[tokio::test]
    async fn panics_are_contained() {
        let exec = RenderExecutor::with_backend(Panicky).unwrap();
        assert_eq!(exec.submit("boom").await, None);
        assert_eq!(exec.submit("fine").await, Some(vec![1]));
    }

    #[tokio::test]
    async fn backend_is_built_on_the_worker() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let caller = thread::current().id();
        let exec = RenderExecutor::with_backend_factory(move || {
            assert_ne!(thread::current().id(), caller);
            // Hold construction until the test has queued a job
            release_rx.recv().unwrap();
            Echo
        })
        .unwrap();

        let pending = exec.submit("queued");
        release_tx.send(()).unwrap();
        assert_eq!(pending.await, Some(b"queued".to_vec()));
    }

    #[tokio::test]
    async fn failed_backend_init_yields_none() {
        let exec = RenderExecutor::with_backend_factory(|| -> Echo { panic!("no fonts") }).unwrap();
        assert_eq!(exec.submit("a").await, None);
        assert!(exec.shutdown().await.is_err());
    }

    #[tokio::test]
    async fn submit_after_shutdown_yields_none() {
        let exec = RenderExecutor::with_backend(Echo).unwrap();
        let handle = exec.clone();
        exec.shutdown().await.unwrap();
        assert_eq!(handle.submit("late").await, None);
        assert!(handle.shutdown().await.is_err());
    }
}
