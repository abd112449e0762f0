//! Cascade engine behavior against a real (temp) artifact store and
//! call-recording fake generators.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tessera_core::IconStatus;
use tessera_events::EventBus;
use tessera_genai::{GenError, ImageSynthesizer, TextGenerator};
use tessera_pipeline::{Cascade, PipelineError, Stage};
use tessera_store::{ProcessPatch, StateStore};

/// 1x1 transparent PNG; small but decodes as a real image.
const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x64,
    0x60, 0xf8, 0x5f, 0x0f, 0x00, 0x02, 0x87, 0x01, 0x80, 0xeb, 0x47, 0xba, 0x92, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[derive(Default)]
struct RecordingText {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl TextGenerator for RecordingText {
    async fn complete(&self, prompt: &str) -> Result<String, GenError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        if prompt.contains("app icon") {
            Ok("A chunky 3D isometric vintage radio".to_string())
        } else {
            Ok("A tiny summary of the app.".to_string())
        }
    }
}

impl RecordingText {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[derive(Default)]
struct RecordingImage {
    generate_calls: Mutex<Vec<PathBuf>>,
    remove_calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    fail_generate: bool,
    /// When set, `remove_background` asserts this canonical path does
    /// not exist yet; readiness must flip only on the final rename.
    expect_absent_during_remove: Mutex<Option<PathBuf>>,
}

#[async_trait]
impl ImageSynthesizer for RecordingImage {
    async fn generate(&self, _prompt: &str, output: &Path) -> Result<(), GenError> {
        self.generate_calls.lock().unwrap().push(output.to_path_buf());
        if self.fail_generate {
            // Leave a partial file behind, like a tool dying mid-write.
            std::fs::write(output, b"partial").unwrap();
            return Err(GenError::Failed {
                status: 1,
                stderr: "render backend unavailable".to_string(),
            });
        }
        std::fs::write(output, PNG_1X1).unwrap();
        Ok(())
    }

    async fn remove_background(&self, input: &Path, output: &Path) -> Result<(), GenError> {
        self.remove_calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));
        if let Some(canonical) = self.expect_absent_during_remove.lock().unwrap().as_ref() {
            assert!(
                !canonical.exists(),
                "final icon must not exist before the publish rename"
            );
            assert_ne!(output, canonical, "tool must write to a temp path");
        }
        std::fs::copy(input, output).unwrap();
        Ok(())
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<StateStore>,
    events: Arc<EventBus>,
    text: Arc<RecordingText>,
    image: Arc<RecordingImage>,
    cascade: Cascade,
}

async fn harness_with_image(image: RecordingImage) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StateStore::open(dir.path()).await.unwrap());
    let events = Arc::new(EventBus::default());
    let text = Arc::new(RecordingText::default());
    let image = Arc::new(image);
    let cascade = Cascade::new(
        store.clone(),
        events.clone(),
        text.clone(),
        image.clone(),
    );
    Harness {
        _dir: dir,
        store,
        events,
        text,
        image,
        cascade,
    }
}

async fn harness() -> Harness {
    harness_with_image(RecordingImage::default()).await
}

async fn track_process(h: &Harness, name: &str) {
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

#[tokio::test]
async fn fresh_run_generates_all_four_stages_in_order() {
    let h = harness().await;
    track_process(&h, "demo-app").await;

    assert!(!h.cascade.has_icon("demo-app"));
    assert!(h.cascade.needs_generation("demo-app"));

    let outcome = h.cascade.run("demo-app").await.unwrap();
    assert_eq!(
        outcome.ran,
        vec![Stage::Summary, Stage::Prompt, Stage::Raster, Stage::Final]
    );

    // One text call per text stage, one image call per image stage.
    let text_calls = h.text.calls();
    assert_eq!(text_calls.len(), 2);
    assert!(text_calls[0].contains("Process name: demo-app"));
    assert!(text_calls[1].contains("app icon"));
    assert_eq!(h.image.generate_calls.lock().unwrap().len(), 1);
    assert_eq!(h.image.remove_calls.lock().unwrap().len(), 1);

    // Artifacts exist under the naming convention.
    let data = h.store.data_dir();
    let summary = std::fs::read_to_string(data.join("demo-app_summary.txt")).unwrap();
    assert_eq!(summary, "A tiny summary of the app.");
    let prompt = std::fs::read_to_string(data.join("demo-app_icon_prompt.txt")).unwrap();
    assert!(prompt.starts_with("A chunky 3D isometric vintage radio"));
    assert!(prompt.contains("MANDATORY REQUIREMENTS"));
    assert!(h.store.icons_dir().join("demo-app.jpg").exists());
    assert!(h.store.icons_dir().join("demo-app.png").exists());

    assert!(h.cascade.has_icon("demo-app"));
    assert!(!h.cascade.needs_generation("demo-app"));

    // Store mirrors the summary and the readiness flag.
    let record = h.store.get_process("demo-app").await.unwrap();
    assert_eq!(record.description.as_deref(), Some("A tiny summary of the app."));
    assert_eq!(record.icon_status, IconStatus::Ready);
    assert!(record.icon_path.is_some());

    // summary.generated + icon.ready both bumped the change version.
    assert!(h.events.change_version() >= 2);
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let h = harness().await;
    track_process(&h, "demo-app").await;

    h.cascade.run("demo-app").await.unwrap();
    h.text.reset();
    h.image.generate_calls.lock().unwrap().clear();
    h.image.remove_calls.lock().unwrap().clear();

    let outcome = h.cascade.run("demo-app").await.unwrap();

    assert!(!outcome.generated_any());
    assert!(h.text.calls().is_empty());
    assert!(h.image.generate_calls.lock().unwrap().is_empty());
    assert!(h.image.remove_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_prompt_cascades_downstream_only() {
    let h = harness().await;
    track_process(&h, "demo-app").await;
    h.cascade.run("demo-app").await.unwrap();

    let summary_path = h.store.data_dir().join("demo-app_summary.txt");
    let summary_before = std::fs::read_to_string(&summary_path).unwrap();
    std::fs::remove_file(h.store.data_dir().join("demo-app_icon_prompt.txt")).unwrap();
    h.text.reset();
    h.image.generate_calls.lock().unwrap().clear();
    h.image.remove_calls.lock().unwrap().clear();

    let outcome = h.cascade.run("demo-app").await.unwrap();

    assert_eq!(outcome.ran, vec![Stage::Prompt, Stage::Raster, Stage::Final]);
    assert!(!outcome.ran_stage(Stage::Summary));

    // The summary generator was not consulted again.
    let text_calls = h.text.calls();
    assert_eq!(text_calls.len(), 1);
    assert!(text_calls[0].contains("app icon"));
    assert_eq!(std::fs::read_to_string(&summary_path).unwrap(), summary_before);

    assert_eq!(h.image.generate_calls.lock().unwrap().len(), 1);
    assert_eq!(h.image.remove_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn raster_failure_leaves_upstream_intact() {
    let h = harness_with_image(RecordingImage {
        fail_generate: true,
        ..Default::default()
    })
    .await;
    track_process(&h, "demo-app").await;

    let err = h.cascade.run("demo-app").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Generator {
            stage: Stage::Raster,
            ..
        }
    ));
    assert_eq!(err.stage(), Some(Stage::Raster));

    // Stages 1-2 published, nothing downstream.
    assert!(h.store.data_dir().join("demo-app_summary.txt").exists());
    assert!(h.store.data_dir().join("demo-app_icon_prompt.txt").exists());
    assert!(!h.store.icons_dir().join("demo-app.jpg").exists());
    assert!(!h.store.icons_dir().join("demo-app.png").exists());
    assert!(!h.cascade.has_icon("demo-app"));

    let record = h.store.get_process("demo-app").await.unwrap();
    assert_eq!(record.icon_status, IconStatus::Failed);

    // The half-written temp file was cleaned up with the failure.
    assert_eq!(std::fs::read_dir(h.store.icons_dir()).unwrap().count(), 0);

    // No permanent failure marker: a later run still regenerates.
    assert!(h.cascade.needs_generation("demo-app"));
}

#[tokio::test]
async fn touched_summary_cascades_downstream_only() {
    let h = harness().await;
    track_process(&h, "demo-app").await;
    h.cascade.run("demo-app").await.unwrap();

    h.text.reset();
    h.image.generate_calls.lock().unwrap().clear();
    h.image.remove_calls.lock().unwrap().clear();

    // Re-stamp the summary strictly newer than everything downstream.
    let summary_path = h.store.data_dir().join("demo-app_summary.txt");
    std::fs::File::options()
        .write(true)
        .open(&summary_path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();

    let outcome = h.cascade.run("demo-app").await.unwrap();

    assert_eq!(outcome.ran, vec![Stage::Prompt, Stage::Raster, Stage::Final]);
    assert!(!outcome.ran_stage(Stage::Summary));

    // The summary generator was not consulted; only the icon
    // description was regenerated, then the image stages reran.
    let text_calls = h.text.calls();
    assert_eq!(text_calls.len(), 1);
    assert!(text_calls[0].contains("app icon"));
    assert_eq!(h.image.generate_calls.lock().unwrap().len(), 1);
    assert_eq!(h.image.remove_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn readiness_flips_only_on_final_rename() {
    let h = harness().await;
    track_process(&h, "demo-app").await;

    let canonical = h.store.icons_dir().join("demo-app.png");
    *h.image.expect_absent_during_remove.lock().unwrap() = Some(canonical.clone());

    h.cascade.run("demo-app").await.unwrap();

    assert!(canonical.exists());
    assert!(h.cascade.has_icon("demo-app"));

    // No temp files left behind in either artifact directory.
    for dir in [h.store.data_dir(), h.store.icons_dir()] {
        for entry in std::fs::read_dir(dir).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(
                !name.to_string_lossy().contains(".tmp."),
                "leftover temp file: {name:?}"
            );
        }
    }
}

#[tokio::test]
async fn generator_writes_to_temp_never_canonical() {
    let h = harness().await;
    track_process(&h, "demo-app").await;
    h.cascade.run("demo-app").await.unwrap();

    let canonical_raster = h.store.icons_dir().join("demo-app.jpg");
    for path in h.image.generate_calls.lock().unwrap().iter() {
        assert_ne!(path, &canonical_raster);
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
    }
}

#[tokio::test]
async fn undecodable_raster_is_rejected() {
    #[derive(Default)]
    struct GarbageImage;

    #[async_trait]
    impl ImageSynthesizer for GarbageImage {
        async fn generate(&self, _prompt: &str, output: &Path) -> Result<(), GenError> {
            std::fs::write(output, b"not an image").unwrap();
            Ok(())
        }

        async fn remove_background(&self, _: &Path, _: &Path) -> Result<(), GenError> {
            panic!("must not reach background removal");
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StateStore::open(dir.path()).await.unwrap());
    store
        .upsert_process("demo-app", ProcessPatch::default())
        .await
        .unwrap();
    let cascade = Cascade::new(
        store.clone(),
        Arc::new(EventBus::default()),
        Arc::new(RecordingText::default()),
        Arc::new(GarbageImage),
    );

    let err = cascade.run("demo-app").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Generator {
            stage: Stage::Raster,
            source: GenError::UnusableOutput(_),
        }
    ));
    assert!(!store.icons_dir().join("demo-app.jpg").exists());
}

#[tokio::test]
async fn untracked_name_is_not_found() {
    let h = harness().await;
    let err = h.cascade.run("ghost").await.unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[tokio::test]
async fn website_cascade_uses_url_prompt() {
    let h = harness().await;
    h.store
        .add_website("docs", "https://docs.example.com")
        .await
        .unwrap();

    let outcome = h.cascade.run("docs").await.unwrap();
    assert_eq!(outcome.ran.len(), 4);

    let text_calls = h.text.calls();
    assert!(text_calls[0].contains("https://docs.example.com"));

    let record = h.store.get_website("docs").await.unwrap();
    assert_eq!(record.description.as_deref(), Some("A tiny summary of the app."));
    assert_eq!(record.icon_status, IconStatus::Ready);
    assert!(h.cascade.has_icon("docs"));
}
