use std::path::PathBuf;
use std::sync::Arc;

use folio_domain::{
    classify, gallery_file_name, group_by_project, inject_navigation, neighbors,
    render_project_gallery, ClassificationResult, DomainError, MediaKind, MetadataRecord,
    SiteProfile, SourceAttributes, SourceFile,
};
use tracing::{debug, error, info, warn};

use crate::{
    ApplicationError, BuildGalleriesCommand, ClassifyNameCommand, Clock, DerivativeGenerator,
    FileScanSummary, FileScanner, GalleryReport, InjectNavigationCommand, IntakeHandler,
    IntakeItem, KeywordTableChoice, MediaProbe, MetadataStore, NavigationReport, PageStore, ProcessOutcome,
    ProcessSourceCommand, ScanFolderCommand, SourceArchive,
};

pub struct ApplicationService {
    profile: SiteProfile,
    scanner: Box<dyn FileScanner>,
    derivatives: Box<dyn DerivativeGenerator>,
    probe: Box<dyn MediaProbe>,
    metadata: Box<dyn MetadataStore>,
    archive: Box<dyn SourceArchive>,
    pages: Box<dyn PageStore>,
    clock: Box<dyn Clock>,
}

impl ApplicationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profile: SiteProfile,
        scanner: Box<dyn FileScanner>,
        derivatives: Box<dyn DerivativeGenerator>,
        probe: Box<dyn MediaProbe>,
        metadata: Box<dyn MetadataStore>,
        archive: Box<dyn SourceArchive>,
        pages: Box<dyn PageStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            profile,
            scanner,
            derivatives,
            probe,
            metadata,
            archive,
            pages,
            clock,
        }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    pub fn classify_name(&self, command: ClassifyNameCommand) -> ClassificationResult {
        let table = match command.table {
            KeywordTableChoice::Intake => &self.profile.intake,
            KeywordTableChoice::Gallery => &self.profile.gallery,
        };
        classify(table, &command.name)
    }

    pub fn scan_folder(
        &self,
        command: ScanFolderCommand,
    ) -> Result<FileScanSummary, ApplicationError> {
        self.scanner.scan(&command.folder)
    }

    /// Classifies one source, generates its derivatives and sidecar, then
    /// moves it out of the inbox. Unsupported files are left where they are.
    pub fn process_source(
        &self,
        command: ProcessSourceCommand,
    ) -> Result<ProcessOutcome, ApplicationError> {
        if command.processed_root.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "processed root must not be empty".to_string(),
            ));
        }

        let scanned = self.scanner.describe(&command.path)?;
        let discovered_at = command
            .discovered_at
            .unwrap_or_else(|| self.clock.now_timestamp_string());
        let source = SourceFile::new(scanned.path, scanned.file_size, discovered_at);
        let is_video = match source.kind() {
            MediaKind::Image => false,
            MediaKind::Video => true,
            MediaKind::Unsupported => {
                warn!(file = %source.file_name(), "unsupported file type, leaving in place");
                return Ok(ProcessOutcome::Unsupported {
                    source: source.path,
                });
            }
        };
        if source.base_name.is_empty() {
            return Err(ApplicationError::InvalidInput(format!(
                "source has no base name: {}",
                source.path.display()
            )));
        }

        let classification = classify(&self.profile.intake, &source.base_name);
        let output_dir = command
            .processed_root
            .join(&classification.project)
            .join(&source.base_name);
        debug!(
            file = %source.file_name(),
            project = %classification.project,
            tags = ?classification.tags,
            size = source.file_size,
            discovered_at = %source.discovered_at,
            "processing source"
        );
        self.derivatives.clear_outputs(&output_dir)?;

        let (derivatives, source_attributes) = if !is_video {
            let generated = self.derivatives.generate_image_derivatives(
                &source.path,
                &output_dir,
                &source.base_name,
            )?;
            let attributes = SourceAttributes::Image {
                width: generated.width,
                height: generated.height,
                format: generated.format,
            };
            (generated.produced, attributes)
        } else {
            let produced = self.derivatives.generate_video_derivatives(
                &source.path,
                &output_dir,
                &source.base_name,
            )?;
            let attributes = match self.probe.probe(&source.path) {
                Ok(metadata) => SourceAttributes::Video { metadata },
                Err(probe_error) => {
                    warn!(
                        file = %source.file_name(),
                        error = %probe_error,
                        "probe failed, storing placeholder metadata"
                    );
                    SourceAttributes::probe_failed(probe_error.to_string())
                }
            };
            (produced, attributes)
        };

        let record = MetadataRecord {
            original_filename: source.file_name(),
            project: classification.project.clone(),
            tags: classification.tags,
            discovered_at: source.discovered_at.clone(),
            processed_at: self.clock.now_timestamp_string(),
            source: source_attributes,
            derivatives: derivatives.clone(),
        };
        self.metadata
            .write_metadata(&output_dir, &source.base_name, &record)?;

        let archived = self.archive.archive(&source.path, &command.processed_root)?;
        info!(
            file = %record.original_filename,
            project = %record.project,
            derivatives = derivatives.len(),
            archived = %archived.display(),
            "processed source"
        );

        Ok(ProcessOutcome::Processed {
            source: source.path,
            project: classification.project,
            output_dir,
            derivatives,
        })
    }

    /// Like [`Self::process_source`], but a failure is logged and reported as
    /// an outcome so the caller can move on to the next item.
    pub fn handle_source(&self, command: ProcessSourceCommand) -> ProcessOutcome {
        let source = command.path.clone();
        match self.process_source(command) {
            Ok(outcome) => outcome,
            Err(failure) => {
                error!(
                    file = %source.display(),
                    error = %failure,
                    "processing failed, source left in place"
                );
                ProcessOutcome::Failed {
                    source,
                    error: failure.to_string(),
                }
            }
        }
    }

    pub fn build_galleries(
        &self,
        command: BuildGalleriesCommand,
    ) -> Result<GalleryReport, ApplicationError> {
        let scan = self.scanner.scan(&command.input_dir)?;
        let images: Vec<String> = scan
            .files
            .iter()
            .filter(|file| file.kind == MediaKind::Image)
            .map(|file| file.file_name())
            .collect();

        let mut report = GalleryReport {
            scanned_images: images.len(),
            pages: Vec::new(),
        };

        for project in group_by_project(&self.profile.gallery, &images) {
            let Some(html) = render_project_gallery(&project, &command.image_base_url) else {
                continue;
            };
            let page_path = command.output_dir.join(gallery_file_name(&project.tag));
            self.pages.write_page(&page_path, &html)?;
            info!(
                project = %project.tag,
                images = project.images.len(),
                page = %page_path.display(),
                "wrote gallery page"
            );
            report.pages.push(page_path);
        }

        Ok(report)
    }

    pub fn inject_navigation(
        &self,
        command: InjectNavigationCommand,
    ) -> Result<NavigationReport, ApplicationError> {
        let order = &self.profile.navigation.order;
        let mut report = NavigationReport::default();

        for slug in order {
            let page_path = command.pages_dir.join(format!("{slug}.html"));
            let Some(html) = self.pages.read_page(&page_path)? else {
                warn!(page = %page_path.display(), "case study page missing");
                report.missing.push(slug.clone());
                continue;
            };
            let Some(links) = neighbors(order, slug) else {
                continue;
            };

            match inject_navigation(&html, &links) {
                Ok(updated) if updated == html => report.unchanged += 1,
                Ok(updated) => {
                    self.pages.write_page(&page_path, &updated)?;
                    report.updated += 1;
                }
                Err(DomainError::NoInsertionPoint) => {
                    warn!(page = %page_path.display(), "no insertion point for navigation");
                    report.skipped.push(slug.clone());
                }
                Err(other) => return Err(other.into()),
            }
        }

        Ok(report)
    }
}

/// Binds the service to a processed root so the intake worker can drive it.
pub struct IntakeJob {
    service: Arc<ApplicationService>,
    processed_root: PathBuf,
}

impl IntakeJob {
    pub fn new(service: Arc<ApplicationService>, processed_root: PathBuf) -> Self {
        Self {
            service,
            processed_root,
        }
    }
}

impl IntakeHandler for IntakeJob {
    fn handle(&self, item: &IntakeItem) -> ProcessOutcome {
        self.service.handle_source(ProcessSourceCommand {
            path: item.path.clone(),
            processed_root: self.processed_root.clone(),
            discovered_at: Some(item.discovered_at.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use folio_domain::detect_media_kind;

    use std::path::Path;

    use super::*;
    use crate::{ImageDerivatives, ScannedFile};

    struct FakeScanner {
        files: Vec<PathBuf>,
    }

    impl FileScanner for FakeScanner {
        fn scan(&self, _folder: &Path) -> Result<FileScanSummary, ApplicationError> {
            let files: Vec<ScannedFile> = self
                .files
                .iter()
                .map(|path| ScannedFile {
                    path: path.clone(),
                    file_size: 100,
                    kind: detect_media_kind(path),
                })
                .collect();
            Ok(FileScanSummary {
                scanned_files: files.len(),
                supported_files: files
                    .iter()
                    .filter(|file| file.kind != MediaKind::Unsupported)
                    .count(),
                files,
            })
        }

        fn describe(&self, path: &Path) -> Result<ScannedFile, ApplicationError> {
            if path.to_string_lossy().contains("missing") {
                return Err(ApplicationError::NotFound(path.display().to_string()));
            }
            Ok(ScannedFile {
                path: path.to_path_buf(),
                file_size: 100,
                kind: detect_media_kind(path),
            })
        }
    }

    #[derive(Default)]
    struct FakeDerivatives {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl DerivativeGenerator for FakeDerivatives {
        fn clear_outputs(&self, output_dir: &Path) -> Result<(), ApplicationError> {
            self.calls
                .lock()
                .expect("lock")
                .push(format!("clear {}", output_dir.display()));
            Ok(())
        }

        fn generate_image_derivatives(
            &self,
            source: &Path,
            output_dir: &Path,
            base_name: &str,
        ) -> Result<ImageDerivatives, ApplicationError> {
            self.calls
                .lock()
                .expect("lock")
                .push(format!("image {}", output_dir.display()));
            if source.to_string_lossy().contains("broken") {
                return Err(ApplicationError::Decode("corrupt image".to_string()));
            }
            Ok(ImageDerivatives {
                produced: vec![
                    format!("{base_name}-full.jpg"),
                    format!("{base_name}-thumbnail.jpg"),
                ],
                width: 640,
                height: 480,
                format: "png".to_string(),
            })
        }

        fn generate_video_derivatives(
            &self,
            _source: &Path,
            output_dir: &Path,
            base_name: &str,
        ) -> Result<Vec<String>, ApplicationError> {
            self.calls
                .lock()
                .expect("lock")
                .push(format!("video {}", output_dir.display()));
            Ok(vec![
                format!("{base_name}-thumbnail.jpg"),
                format!("{base_name}-optimized.mp4"),
            ])
        }
    }

    struct FakeProbe {
        fail: bool,
    }

    impl MediaProbe for FakeProbe {
        fn probe(&self, _source: &Path) -> Result<serde_json::Value, ApplicationError> {
            if self.fail {
                return Err(ApplicationError::ExternalTool("ffprobe exited 1".to_string()));
            }
            Ok(serde_json::json!({ "format": { "duration": "3.0" } }))
        }
    }

    #[derive(Default)]
    struct FakeMetadata {
        records: Arc<Mutex<Vec<(PathBuf, MetadataRecord)>>>,
    }

    impl MetadataStore for FakeMetadata {
        fn write_metadata(
            &self,
            output_dir: &Path,
            base_name: &str,
            record: &MetadataRecord,
        ) -> Result<PathBuf, ApplicationError> {
            if output_dir.to_string_lossy().contains("readonly") {
                return Err(ApplicationError::Io("permission denied".to_string()));
            }
            let path = output_dir.join(format!("{base_name}-metadata.json"));
            self.records
                .lock()
                .expect("lock")
                .push((path.clone(), record.clone()));
            Ok(path)
        }
    }

    #[derive(Default)]
    struct FakeArchive {
        moved: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl SourceArchive for FakeArchive {
        fn archive(
            &self,
            source: &Path,
            processed_root: &Path,
        ) -> Result<PathBuf, ApplicationError> {
            self.moved.lock().expect("lock").push(source.to_path_buf());
            Ok(processed_root.join(source.file_name().unwrap_or_default()))
        }
    }

    #[derive(Default)]
    struct FakePages {
        pages: Arc<Mutex<HashMap<PathBuf, String>>>,
    }

    impl PageStore for FakePages {
        fn read_page(&self, path: &Path) -> Result<Option<String>, ApplicationError> {
            Ok(self.pages.lock().expect("lock").get(path).cloned())
        }

        fn write_page(&self, path: &Path, contents: &str) -> Result<(), ApplicationError> {
            self.pages
                .lock()
                .expect("lock")
                .insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }
    }

    struct FakeClock;

    impl Clock for FakeClock {
        fn now_timestamp_string(&self) -> String {
            "2026-10-17T12:00:00Z".to_string()
        }
    }

    struct Harness {
        service: ApplicationService,
        records: Arc<Mutex<Vec<(PathBuf, MetadataRecord)>>>,
        moved: Arc<Mutex<Vec<PathBuf>>>,
        pages: Arc<Mutex<HashMap<PathBuf, String>>>,
        generator_calls: Arc<Mutex<Vec<String>>>,
    }

    fn harness(files: Vec<PathBuf>, probe_fails: bool) -> Harness {
        let metadata = FakeMetadata::default();
        let archive = FakeArchive::default();
        let pages = FakePages::default();
        let records = Arc::clone(&metadata.records);
        let moved = Arc::clone(&archive.moved);
        let page_map = Arc::clone(&pages.pages);
        let derivatives = FakeDerivatives::default();
        let generator_calls = Arc::clone(&derivatives.calls);
        let service = ApplicationService::new(
            SiteProfile::builtin().expect("profile"),
            Box::new(FakeScanner { files }),
            Box::new(derivatives),
            Box::new(FakeProbe { fail: probe_fails }),
            Box::new(metadata),
            Box::new(archive),
            Box::new(pages),
            Box::new(FakeClock),
        );
        Harness {
            service,
            records,
            moved,
            pages: page_map,
            generator_calls,
        }
    }

    fn command(path: &str) -> ProcessSourceCommand {
        ProcessSourceCommand {
            path: PathBuf::from(path),
            processed_root: PathBuf::from("/processed"),
            discovered_at: None,
        }
    }

    #[test]
    fn image_is_classified_generated_recorded_and_archived() {
        let h = harness(vec![], false);
        let outcome = h
            .service
            .process_source(command("/inbox/tmobile-landing-v2.png"))
            .expect("process");

        assert_eq!(
            outcome,
            ProcessOutcome::Processed {
                source: PathBuf::from("/inbox/tmobile-landing-v2.png"),
                project: "tmobile".to_string(),
                output_dir: PathBuf::from("/processed/tmobile/tmobile-landing-v2"),
                derivatives: vec![
                    "tmobile-landing-v2-full.jpg".to_string(),
                    "tmobile-landing-v2-thumbnail.jpg".to_string(),
                ],
            }
        );

        let records = h.records.lock().expect("lock");
        assert_eq!(records.len(), 1);
        let (path, record) = &records[0];
        assert_eq!(
            path,
            &PathBuf::from(
                "/processed/tmobile/tmobile-landing-v2/tmobile-landing-v2-metadata.json"
            )
        );
        assert_eq!(record.original_filename, "tmobile-landing-v2.png");
        assert_eq!(record.tags, vec!["Mobile".to_string(), "Web".to_string()]);
        assert_eq!(
            record.source,
            SourceAttributes::Image {
                width: 640,
                height: 480,
                format: "png".to_string()
            }
        );
        assert_eq!(
            h.moved.lock().expect("lock").as_slice(),
            &[PathBuf::from("/inbox/tmobile-landing-v2.png")]
        );
    }

    #[test]
    fn unmatched_name_lands_in_general_project() {
        let h = harness(vec![], false);
        let outcome = h
            .service
            .process_source(command("/inbox/random-photo.png"))
            .expect("process");
        assert!(matches!(
            outcome,
            ProcessOutcome::Processed { ref project, .. } if project == "general"
        ));
        let records = h.records.lock().expect("lock");
        assert_eq!(records[0].1.tags, vec!["Screenshots".to_string()]);
    }

    #[test]
    fn unsupported_file_is_left_untouched() {
        let h = harness(vec![], false);
        let outcome = h
            .service
            .process_source(command("/inbox/notes.txt"))
            .expect("process");
        assert_eq!(
            outcome,
            ProcessOutcome::Unsupported {
                source: PathBuf::from("/inbox/notes.txt")
            }
        );
        assert!(h.records.lock().expect("lock").is_empty());
        assert!(h.moved.lock().expect("lock").is_empty());
    }

    #[test]
    fn video_probe_failure_degrades_to_placeholder() {
        let h = harness(vec![], true);
        let outcome = h
            .service
            .process_source(command("/inbox/bmgf-anim.mov"))
            .expect("process");
        assert!(matches!(outcome, ProcessOutcome::Processed { .. }));

        let records = h.records.lock().expect("lock");
        let value = serde_json::to_value(&records[0].1.source).expect("json");
        assert_eq!(
            value["metadata"]["error"],
            "external tool failed: ffprobe exited 1"
        );
        assert_eq!(records[0].1.tags, vec!["Motion".to_string()]);
    }

    #[test]
    fn video_probe_output_is_stored_verbatim() {
        let h = harness(vec![], false);
        h.service
            .process_source(command("/inbox/xbox-trailer.mp4"))
            .expect("process");
        let records = h.records.lock().expect("lock");
        assert_eq!(
            records[0].1.source,
            SourceAttributes::Video {
                metadata: serde_json::json!({ "format": { "duration": "3.0" } })
            }
        );
        assert_eq!(records[0].1.project, "microsoft");
    }

    #[test]
    fn failure_is_reported_and_source_stays_in_place() {
        let h = harness(vec![], false);
        let outcome = h
            .service
            .handle_source(command("/inbox/broken-tmobile.png"));
        assert!(matches!(outcome, ProcessOutcome::Failed { .. }));
        assert!(h.moved.lock().expect("lock").is_empty());
        assert!(h.records.lock().expect("lock").is_empty());
    }

    #[test]
    fn metadata_write_failure_is_a_processing_failure() {
        let h = harness(vec![], false);
        let outcome = h.service.handle_source(ProcessSourceCommand {
            path: PathBuf::from("/inbox/hero.png"),
            processed_root: PathBuf::from("/readonly"),
            discovered_at: None,
        });
        assert!(matches!(
            outcome,
            ProcessOutcome::Failed { ref error, .. } if error.contains("permission denied")
        ));
        assert!(h.moved.lock().expect("lock").is_empty());
    }

    #[test]
    fn galleries_are_written_per_non_empty_project() {
        let h = harness(
            vec![
                PathBuf::from("/gallery/tmobile-b.png"),
                PathBuf::from("/gallery/readme.md"),
                PathBuf::from("/gallery/clip-tmobile.mp4"),
                PathBuf::from("/gallery/tmobile-a.png"),
                PathBuf::from("/gallery/misc.jpg"),
            ],
            false,
        );
        let report = h
            .service
            .build_galleries(BuildGalleriesCommand {
                input_dir: PathBuf::from("/gallery"),
                output_dir: PathBuf::from("/site/case-studies"),
                image_base_url: "/images".to_string(),
            })
            .expect("galleries");

        assert_eq!(report.scanned_images, 3);
        assert_eq!(
            report.pages,
            vec![
                PathBuf::from("/site/case-studies/tmobile-gallery.html"),
                PathBuf::from("/site/case-studies/other-gallery.html"),
            ]
        );
        let pages = h.pages.lock().expect("lock");
        let tmobile = &pages[&PathBuf::from("/site/case-studies/tmobile-gallery.html")];
        assert!(tmobile.find("tmobile-b.png") < tmobile.find("tmobile-a.png"));
        assert!(!tmobile.contains("clip-tmobile.mp4"));
    }

    #[test]
    fn navigation_updates_present_pages_and_reports_missing() {
        let h = harness(vec![], false);
        let order = h.service.profile().navigation.order.clone();
        {
            let mut pages = h.pages.lock().expect("lock");
            pages.insert(
                PathBuf::from("/site").join(format!("{}.html", order[0])),
                "<html><body><h1>first</h1></body></html>".to_string(),
            );
            pages.insert(
                PathBuf::from("/site").join(format!("{}.html", order[1])),
                "<p>no body tag</p>".to_string(),
            );
        }

        let report = h
            .service
            .inject_navigation(InjectNavigationCommand {
                pages_dir: PathBuf::from("/site"),
            })
            .expect("nav");
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, vec![order[1].clone()]);
        assert_eq!(report.missing.len(), order.len() - 2);

        let again = h
            .service
            .inject_navigation(InjectNavigationCommand {
                pages_dir: PathBuf::from("/site"),
            })
            .expect("nav");
        assert_eq!(again.updated, 0);
        assert_eq!(again.unchanged, 1);
    }

    #[test]
    fn classify_name_uses_requested_table() {
        let h = harness(vec![], false);
        let intake = h.service.classify_name(ClassifyNameCommand {
            name: "random-photo".to_string(),
            table: KeywordTableChoice::Intake,
        });
        let gallery = h.service.classify_name(ClassifyNameCommand {
            name: "random-photo".to_string(),
            table: KeywordTableChoice::Gallery,
        });
        assert_eq!(intake.project, "general");
        assert_eq!(gallery.project, "other");
    }

    #[test]
    fn intake_job_never_returns_errors() {
        let h = harness(vec![], false);
        let job = IntakeJob::new(Arc::new(h.service), PathBuf::from("/processed"));
        assert!(matches!(
            job.handle(&IntakeItem::new("/inbox/missing.png", "2026-10-17T11:00:00Z")),
            ProcessOutcome::Failed { .. }
        ));
    }

    #[test]
    fn previous_outputs_are_cleared_before_generation() {
        let h = harness(vec![], false);
        h.service
            .process_source(command("/inbox/hero.png"))
            .expect("image pass");
        h.service
            .process_source(command("/inbox/hero.mp4"))
            .expect("video pass");

        assert_eq!(
            *h.generator_calls.lock().expect("lock"),
            vec![
                "clear /processed/general/hero".to_string(),
                "image /processed/general/hero".to_string(),
                "clear /processed/general/hero".to_string(),
                "video /processed/general/hero".to_string(),
            ]
        );
    }

    #[test]
    fn discovery_time_from_the_queue_is_recorded() {
        let h = harness(vec![], false);
        let job = IntakeJob::new(Arc::new(h.service), PathBuf::from("/processed"));
        let outcome = job.handle(&IntakeItem::new("/inbox/hero.png", "2026-10-17T11:00:00Z"));
        assert!(matches!(outcome, ProcessOutcome::Processed { .. }));

        let records = h.records.lock().expect("lock");
        assert_eq!(records[0].1.discovered_at, "2026-10-17T11:00:00Z");
        assert_eq!(records[0].1.processed_at, "2026-10-17T12:00:00Z");
    }

    #[test]
    fn discovery_time_defaults_to_processing_start() {
        let h = harness(vec![], false);
        h.service
            .process_source(command("/inbox/hero.png"))
            .expect("process");
        let records = h.records.lock().expect("lock");
        assert_eq!(records[0].1.discovered_at, "2026-10-17T12:00:00Z");
    }
}
