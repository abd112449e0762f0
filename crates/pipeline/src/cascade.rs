//! The cascade engine.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tessera_core::naming::sanitize_name;
use tessera_core::{IconStatus, ItemKind, TrackableItem};
use tessera_events::{DashboardEvent, EventBus};
use tessera_genai::prompts;
use tessera_genai::{GenError, ImageSynthesizer, TextGenerator};
use tessera_store::{ProcessPatch, StateStore, WebsitePatch};

use crate::chain::{self, ChainStatus, IconPaths};
use crate::context;
use crate::error::{PipelineError, Stage};
use crate::publish;

/// Timeout for the homepage fetch used as summary context.
const HOMEPAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Which stages a cascade invocation actually regenerated.
#[derive(Debug, Default, Clone)]
pub struct CascadeOutcome {
    pub ran: Vec<Stage>,
}

impl CascadeOutcome {
    pub fn generated_any(&self) -> bool {
        !self.ran.is_empty()
    }

    pub fn ran_stage(&self, stage: Stage) -> bool {
        self.ran.contains(&stage)
    }
}

/// Drives one item through the summary → prompt → raster → final chain.
///
/// Pure decision logic over probed artifact state plus the generator
/// calls; serialization of invocations is the worker queue's job, not
/// this type's.
pub struct Cascade {
    store: Arc<StateStore>,
    events: Arc<EventBus>,
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageSynthesizer>,
    http: reqwest::Client,
}

impl Cascade {
    pub fn new(
        store: Arc<StateStore>,
        events: Arc<EventBus>,
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageSynthesizer>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HOMEPAGE_FETCH_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            store,
            events,
            text,
            image,
            http,
        }
    }

    /// Whether the canonical final icon exists for `name`.
    ///
    /// This probe, not any cached status flag, is the single source of
    /// truth for icon readiness.
    pub fn has_icon(&self, name: &str) -> bool {
        match self.paths_for(name) {
            Ok(paths) => paths.final_png().exists(),
            Err(_) => false,
        }
    }

    /// Whether a cascade run would regenerate anything for `name`.
    pub fn needs_generation(&self, name: &str) -> bool {
        match self.paths_for(name) {
            Ok(paths) => ChainStatus::probe(&paths).needs_generation(),
            Err(_) => false,
        }
    }

    fn paths_for(&self, name: &str) -> Result<IconPaths, PipelineError> {
        let key = sanitize_name(name)?;
        Ok(IconPaths::new(
            self.store.data_dir(),
            self.store.icons_dir(),
            &key,
        ))
    }

    /// Run the cascade for one item.
    ///
    /// Stages run in order; a stage runs when its artifact is missing,
    /// older than its upstream artifact, or any earlier stage ran in
    /// this invocation. The first failure aborts the rest and leaves all
    /// previously published artifacts in place.
    pub async fn run(&self, name: &str) -> Result<CascadeOutcome, PipelineError> {
        let item = self
            .store
            .resolve_item(name)
            .await
            .ok_or_else(|| PipelineError::NotFound(format!("item '{name}' is not tracked")))?;

        let paths = self.paths_for(&item.name)?;
        let mut outcome = CascadeOutcome::default();
        let mut force = false;

        // Stage 1: summary.
        if !paths.summary().exists() {
            tracing::info!(name = %item.name, "generating summary");
            let prompt = self.summary_prompt_for(&item).await?;
            let summary = self
                .text
                .complete(&prompt)
                .await
                .map_err(|source| PipelineError::Generator {
                    stage: Stage::Summary,
                    source,
                })?;
            publish::write_text(paths.summary(), &summary)
                .await
                .map_err(|source| PipelineError::Publish {
                    stage: Stage::Summary,
                    source,
                })?;
            self.set_description(&item, &summary).await?;
            self.events
                .publish(DashboardEvent::new("summary.generated").with_item(&item.name));
            force = true;
            outcome.ran.push(Stage::Summary);
        } else if item.description.is_none() {
            // Summary exists from an earlier run; backfill the item
            // description from it.
            if let Ok(summary) = tokio::fs::read_to_string(paths.summary()).await {
                self.set_description(&item, summary.trim()).await?;
            }
        }

        // Stage 2: icon prompt.
        if force || chain::is_stale(paths.icon_prompt(), paths.summary()) {
            tracing::info!(name = %item.name, "generating icon prompt");
            let summary = tokio::fs::read_to_string(paths.summary())
                .await
                .map_err(|source| PipelineError::Read {
                    stage: Stage::Prompt,
                    source,
                })?;
            let description = self
                .text
                .complete(&prompts::icon_description_prompt(&item.name, summary.trim()))
                .await
                .map_err(|source| PipelineError::Generator {
                    stage: Stage::Prompt,
                    source,
                })?;
            let full_prompt = prompts::finalize_icon_prompt(&description);
            publish::write_text(paths.icon_prompt(), &full_prompt)
                .await
                .map_err(|source| PipelineError::Publish {
                    stage: Stage::Prompt,
                    source,
                })?;
            force = true;
            outcome.ran.push(Stage::Prompt);
        }

        // Stage 3: raster.
        if force || chain::is_stale(paths.raster(), paths.icon_prompt()) {
            tracing::info!(name = %item.name, "generating raster icon");
            let icon_prompt = tokio::fs::read_to_string(paths.icon_prompt())
                .await
                .map_err(|source| PipelineError::Read {
                    stage: Stage::Raster,
                    source,
                })?;
            self.set_icon_status(&item, IconStatus::Generating).await?;

            // The generator requires a .jpg extension and refuses to
            // overwrite; give it a unique temp path, then rename.
            let tmp = publish::unique_tmp_path(paths.raster(), "jpg");
            if let Err(source) = self.image.generate(&icon_prompt, &tmp).await {
                // The tool may have written a partial file before failing.
                publish::discard(&tmp).await;
                self.set_icon_status(&item, IconStatus::Failed).await?;
                return Err(PipelineError::Generator {
                    stage: Stage::Raster,
                    source,
                });
            }
            if let Err(err) = validate_raster(&tmp).await {
                publish::discard(&tmp).await;
                self.set_icon_status(&item, IconStatus::Failed).await?;
                return Err(err);
            }
            if let Err(source) = publish::publish_file(&tmp, paths.raster()).await {
                publish::discard(&tmp).await;
                self.set_icon_status(&item, IconStatus::Failed).await?;
                return Err(PipelineError::Publish {
                    stage: Stage::Raster,
                    source,
                });
            }
            force = true;
            outcome.ran.push(Stage::Raster);
        }

        // Stage 4: final icon.
        if force || chain::is_stale(paths.final_png(), paths.raster()) {
            tracing::info!(name = %item.name, "removing background");
            let tmp = publish::unique_tmp_path(paths.final_png(), "png");
            if let Err(source) = self.image.remove_background(paths.raster(), &tmp).await {
                publish::discard(&tmp).await;
                self.set_icon_status(&item, IconStatus::Failed).await?;
                return Err(PipelineError::Generator {
                    stage: Stage::Final,
                    source,
                });
            }
            if let Err(source) = publish::publish_file(&tmp, paths.final_png()).await {
                publish::discard(&tmp).await;
                self.set_icon_status(&item, IconStatus::Failed).await?;
                return Err(PipelineError::Publish {
                    stage: Stage::Final,
                    source,
                });
            }
            self.mark_ready(&item, paths.final_png()).await?;
            outcome.ran.push(Stage::Final);
        } else {
            // Chain was already complete; make sure the status flag
            // agrees with the artifact on disk.
            self.mark_ready(&item, paths.final_png()).await?;
        }

        Ok(outcome)
    }

    /// Build the summary prompt, gathering whatever context exists.
    async fn summary_prompt_for(&self, item: &TrackableItem) -> Result<String, PipelineError> {
        match item.kind {
            ItemKind::Process => {
                let homepage = match item.port {
                    Some(port) => tessera_scanner::fetch_homepage(&self.http, port).await,
                    None => None,
                };
                let readme = match &item.workdir {
                    Some(workdir) => context::find_readme(workdir).await,
                    None => None,
                };
                let context =
                    prompts::process_context(&item.name, homepage.as_deref(), readme.as_deref());
                Ok(prompts::summary_prompt(&context))
            }
            ItemKind::Website => {
                let url = item.url.as_deref().ok_or_else(|| {
                    PipelineError::NotFound(format!("website '{}' has no URL", item.name))
                })?;
                Ok(prompts::website_summary_prompt(&item.name, url))
            }
        }
    }

    async fn set_description(
        &self,
        item: &TrackableItem,
        description: &str,
    ) -> Result<(), PipelineError> {
        match item.kind {
            ItemKind::Process => {
                self.store
                    .upsert_process(
                        &item.name,
                        ProcessPatch {
                            description: Some(description.to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            ItemKind::Website => {
                self.store
                    .update_website(
                        &item.name,
                        WebsitePatch {
                            description: Some(description.to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn set_icon_status(
        &self,
        item: &TrackableItem,
        status: IconStatus,
    ) -> Result<(), PipelineError> {
        match item.kind {
            ItemKind::Process => {
                self.store
                    .upsert_process(
                        &item.name,
                        ProcessPatch {
                            icon_status: Some(status),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            ItemKind::Website => {
                self.store
                    .update_website(
                        &item.name,
                        WebsitePatch {
                            icon_status: Some(status),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Record the published icon and notify pollers.
    async fn mark_ready(
        &self,
        item: &TrackableItem,
        final_path: &Path,
    ) -> Result<(), PipelineError> {
        let already_ready = match item.kind {
            ItemKind::Process => self
                .store
                .get_process(&item.name)
                .await
                .map(|p| p.icon_status == IconStatus::Ready),
            ItemKind::Website => self
                .store
                .get_website(&item.name)
                .await
                .map(|w| w.icon_status == IconStatus::Ready),
        }
        .unwrap_or(false);

        if already_ready {
            return Ok(());
        }

        match item.kind {
            ItemKind::Process => {
                self.store
                    .upsert_process(
                        &item.name,
                        ProcessPatch {
                            icon_status: Some(IconStatus::Ready),
                            icon_path: Some(final_path.to_path_buf()),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            ItemKind::Website => {
                self.store
                    .update_website(
                        &item.name,
                        WebsitePatch {
                            icon_status: Some(IconStatus::Ready),
                            icon_path: Some(final_path.to_path_buf()),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }

        self.events.publish(
            DashboardEvent::new("icon.ready")
                .with_item(&item.name)
                .with_payload(serde_json::json!({
                    "path": final_path.display().to_string(),
                })),
        );
        Ok(())
    }
}

/// Confirm the generated raster actually decodes as an image.
///
/// Header-only check; a tool that exits zero but writes garbage is
/// reported as a generator failure, not published.
async fn validate_raster(path: &Path) -> Result<(), PipelineError> {
    let path = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || {
        image::ImageReader::open(&path)
            .map_err(|e| e.to_string())?
            .with_guessed_format()
            .map_err(|e| e.to_string())?
            .into_dimensions()
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| PipelineError::Generator {
        stage: Stage::Raster,
        source: GenError::UnusableOutput(format!("raster validation task failed: {e}")),
    })?;

    match result {
        Ok(_dimensions) => Ok(()),
        Err(msg) => Err(PipelineError::Generator {
            stage: Stage::Raster,
            source: GenError::UnusableOutput(format!("raster does not decode: {msg}")),
        }),
    }
}
