//! Worker loop behavior with fake generators.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tessera_events::EventBus;
use tessera_genai::{GenError, ImageSynthesizer, TextGenerator};
use tessera_pipeline::Cascade;
use tessera_store::{ProcessPatch, StateStore};
use tessera_worker::{channel, IconQueue, IconWorker, StartGate};
use tokio_util::sync::CancellationToken;

const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x64,
    0x60, 0xf8, 0x5f, 0x0f, 0x00, 0x02, 0x87, 0x01, 0x80, 0xeb, 0x47, 0xba, 0x92, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[derive(Default)]
struct CountingText {
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for CountingText {
    async fn complete(&self, _prompt: &str) -> Result<String, GenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("a short description".to_string())
    }
}

#[derive(Default)]
struct OrderedImage {
    generated: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ImageSynthesizer for OrderedImage {
    async fn generate(&self, _prompt: &str, output: &Path) -> Result<(), GenError> {
        self.generated.lock().unwrap().push(output.to_path_buf());
        std::fs::write(output, PNG_1X1).unwrap();
        Ok(())
    }

    async fn remove_background(&self, input: &Path, output: &Path) -> Result<(), GenError> {
        std::fs::copy(input, output).unwrap();
        Ok(())
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<StateStore>,
    text: Arc<CountingText>,
    image: Arc<OrderedImage>,
    cascade: Arc<Cascade>,
    queue: Arc<IconQueue>,
    gate: Arc<StartGate>,
    handle: tokio::task::JoinHandle<()>,
    cancel: CancellationToken,
}

async fn spawn_worker() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StateStore::open(dir.path()).await.unwrap());
    let text = Arc::new(CountingText::default());
    let image = Arc::new(OrderedImage::default());
    let cascade = Arc::new(Cascade::new(
        store.clone(),
        Arc::new(EventBus::default()),
        text.clone(),
        image.clone(),
    ));

    let (queue, rx) = channel();
    let gate = Arc::new(StartGate::default());
    let cancel = CancellationToken::new();
    let worker = IconWorker::new(queue.clone(), rx, cascade.clone(), gate.clone());
    let handle = tokio::spawn(worker.run(cancel.clone()));

    Harness {
        _dir: dir,
        store,
        text,
        image,
        cascade,
        queue,
        gate,
        handle,
        cancel,
    }
}

async fn track(h: &Harness, name: &str) {
    h.store
        .upsert_process(
            name,
            ProcessPatch {
                is_html: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

async fn drain(h: &Harness) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !h.queue.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("queue did not drain");
}

#[tokio::test]
async fn duplicate_requests_collapse_into_one_run() {
    let h = spawn_worker().await;
    track(&h, "demo-app").await;

    // Requests pile up before the gate opens; duplicates are rejected
    // at enqueue time.
    assert!(h.queue.enqueue("demo-app"));
    assert!(!h.queue.enqueue("demo-app"));
    assert!(!h.queue.enqueue("demo-app"));

    // Nothing runs until the gate opens.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.text.calls.load(Ordering::SeqCst), 0);

    h.gate.open();
    drain(&h).await;

    // Exactly one cascade: two text calls, one rendered raster.
    assert_eq!(h.text.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.image.generated.lock().unwrap().len(), 1);
    assert!(h.cascade.has_icon("demo-app"));
}

#[tokio::test]
async fn requests_are_processed_in_order() {
    let h = spawn_worker().await;
    track(&h, "alpha").await;
    track(&h, "beta").await;

    h.queue.enqueue("alpha");
    h.queue.enqueue("beta");
    h.gate.open();
    drain(&h).await;

    let generated = h.image.generated.lock().unwrap();
    assert_eq!(generated.len(), 2);
    assert!(generated[0].to_string_lossy().contains("alpha"));
    assert!(generated[1].to_string_lossy().contains("beta"));
}

#[tokio::test]
async fn failed_item_does_not_wedge_the_queue() {
    let h = spawn_worker().await;
    track(&h, "demo-app").await;
    h.gate.open();

    // "ghost" is not tracked; the cascade errors and the worker moves on.
    h.queue.enqueue("ghost");
    h.queue.enqueue("demo-app");
    drain(&h).await;

    assert!(h.cascade.has_icon("demo-app"));
    // The failed name was released and can be requested again.
    assert!(h.queue.enqueue("ghost"));
}

#[tokio::test]
async fn completed_item_can_be_requeued() {
    let h = spawn_worker().await;
    track(&h, "demo-app").await;
    h.gate.open();

    h.queue.enqueue("demo-app");
    drain(&h).await;
    let first_calls = h.text.calls.load(Ordering::SeqCst);

    // Second request is accepted but finds a fresh chain.
    assert!(h.queue.enqueue("demo-app"));
    drain(&h).await;
    assert_eq!(h.text.calls.load(Ordering::SeqCst), first_calls);
}

#[tokio::test]
async fn cancellation_stops_the_worker() {
    let h = spawn_worker().await;

    h.cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), h.handle)
        .await
        .expect("worker did not stop")
        .unwrap();
}
