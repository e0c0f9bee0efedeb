mod client;
mod config;
mod logging;
mod upload;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::thread;

use clap::{Parser, Subcommand};
use client::UploadClient;
use config::AppConfig;
use folio_adapters::{
    present_classification, present_gallery_report, present_navigation_report, present_outcome,
    BackgroundIntakeWorker, FfprobeMediaProbe, FsPageStore, FsSourceArchive, JsonMetadataStore,
    MediaDerivativeGenerator, PollingDirectoryWatcher, SystemClock, VideoTools,
    WalkdirFileScanner,
};
use folio_application::{
    ApplicationService, BuildGalleriesCommand, ClassifyNameCommand, InjectNavigationCommand,
    IntakeJob, KeywordTableChoice, ProcessOutcome, ScanFolderCommand,
};
use folio_domain::SiteProfile;
use tracing::{error, info};
use upload::UploadState;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Portfolio asset intake pipeline")]
struct Cli {
    /// Inbox directory watched for new sources.
    #[arg(long, global = true)]
    inbox: Option<PathBuf>,

    /// Root that receives derivatives and archived sources.
    #[arg(long, global = true)]
    processed: Option<PathBuf>,

    /// Alternative site.toml with keyword tables and navigation order.
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Watch the inbox and process sources as they settle, until Ctrl+C.
    Watch,
    /// Process every file currently in a folder (the inbox by default).
    Process { folder: Option<PathBuf> },
    /// Print the project and tags a file name classifies to.
    Classify {
        /// Use the gallery keyword table instead of the intake table.
        #[arg(long)]
        gallery: bool,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Write one gallery page per project.
    Gallery {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Inject previous/next links into the case study pages.
    Nav {
        #[arg(long)]
        pages: Option<PathBuf>,
    },
    /// Run the upload HTTP server.
    Serve {
        #[arg(long)]
        addr: Option<SocketAddr>,
        #[arg(long)]
        uploads: Option<PathBuf>,
    },
    /// Upload files to a running server.
    Push {
        #[arg(long)]
        project: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(inbox) = &self.inbox {
            config.inbox_dir = inbox.clone();
        }
        if let Some(processed) = &self.processed {
            config.processed_dir = processed.clone();
        }
        if let Some(profile) = &self.profile {
            config.profile_path = Some(profile.clone());
        }

        match &self.command {
            Command::Gallery {
                input,
                output,
                base_url,
            } => {
                if let Some(input) = input {
                    config.gallery_input_dir = input.clone();
                }
                if let Some(output) = output {
                    config.gallery_output_dir = output.clone();
                }
                if let Some(base_url) = base_url {
                    config.image_base_url = base_url.clone();
                }
            }
            Command::Nav { pages: Some(pages) } => config.case_studies_dir = pages.clone(),
            Command::Serve { addr, uploads } => {
                if let Some(addr) = addr {
                    config.http_addr = *addr;
                }
                if let Some(uploads) = uploads {
                    config.uploads_dir = uploads.clone();
                }
            }
            Command::Push { url: Some(url), .. } => config.upload_url = url.clone(),
            Command::Process {
                folder: Some(folder),
            } => config.inbox_dir = folder.clone(),
            _ => {}
        }
    }
}

fn main() -> ExitCode {
    logging::init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut config = AppConfig::from_env();
    cli.apply_overrides(&mut config);

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_application_service(config: &AppConfig, profile: SiteProfile) -> ApplicationService {
    let video = VideoTools {
        ffmpeg: config.ffmpeg.clone(),
        ffprobe: config.ffprobe.clone(),
        timeout: config.tool_timeout,
    };
    ApplicationService::new(
        profile,
        Box::new(WalkdirFileScanner),
        Box::new(MediaDerivativeGenerator::new(video.clone())),
        Box::new(FfprobeMediaProbe::new(video)),
        Box::new(JsonMetadataStore),
        Box::new(FsSourceArchive),
        Box::new(FsPageStore),
        Box::new(SystemClock),
    )
}

fn run_command(command: Command, config: &AppConfig) -> Result<(), CommandError> {
    let profile = config
        .load_profile()
        .map_err(|error| CommandError::Usage(error.to_string()))?;

    match command {
        Command::Watch => watch(config, profile),
        Command::Process { .. } => process_folder(config, profile),
        Command::Classify { gallery, names } => {
            let service = build_application_service(config, profile);
            let table = if gallery {
                KeywordTableChoice::Gallery
            } else {
                KeywordTableChoice::Intake
            };
            for name in names {
                let result = service.classify_name(ClassifyNameCommand {
                    name: name.clone(),
                    table,
                });
                println!("{}", present_classification(&name, &result));
            }
            Ok(())
        }
        Command::Gallery { .. } => {
            let service = build_application_service(config, profile);
            let report = service
                .build_galleries(BuildGalleriesCommand {
                    input_dir: config.gallery_input_dir.clone(),
                    output_dir: config.gallery_output_dir.clone(),
                    image_base_url: config.image_base_url.clone(),
                })
                .map_err(|error| CommandError::Runtime(format!("gallery failed: {error}")))?;
            println!("{}", present_gallery_report(&report));
            Ok(())
        }
        Command::Nav { .. } => {
            let service = build_application_service(config, profile);
            let report = service
                .inject_navigation(InjectNavigationCommand {
                    pages_dir: config.case_studies_dir.clone(),
                })
                .map_err(|error| CommandError::Runtime(format!("navigation failed: {error}")))?;
            println!("{}", present_navigation_report(&report));
            Ok(())
        }
        Command::Serve { .. } => {
            let state = UploadState {
                uploads_root: Arc::new(config.uploads_dir.clone()),
                policy: Arc::new(profile.upload),
            };
            runtime()?
                .block_on(upload::serve(state, config.http_addr))
                .map_err(|error| CommandError::Runtime(format!("upload server failed: {error}")))
        }
        Command::Push { project, files, .. } => {
            let client = UploadClient::new(config.upload_url.clone());
            info!(server = client.base_url(), project = %project, files = files.len(), "pushing files");
            let response = runtime()?
                .block_on(client.push(&project, &files))
                .map_err(|error| CommandError::Runtime(error.to_string()))?;
            println!("{}", response.message);
            Ok(())
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, CommandError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| CommandError::Runtime(format!("cannot start async runtime: {error}")))
}

fn prepare_roots(config: &AppConfig) -> Result<(), CommandError> {
    for dir in [&config.inbox_dir, &config.processed_dir] {
        std::fs::create_dir_all(dir).map_err(|error| {
            CommandError::Runtime(format!("cannot create {}: {error}", dir.display()))
        })?;
    }
    config
        .ensure_disjoint_roots()
        .map_err(|error| CommandError::Usage(error.to_string()))
}

fn start_worker(
    service: Arc<ApplicationService>,
    config: &AppConfig,
) -> (BackgroundIntakeWorker, mpsc::Receiver<ProcessOutcome>) {
    let job = IntakeJob::new(service, config.processed_dir.clone());
    let (outcome_tx, outcome_rx) = mpsc::channel();
    (
        BackgroundIntakeWorker::with_observer(Arc::new(job), Box::new(SystemClock), outcome_tx),
        outcome_rx,
    )
}

fn watch(config: &AppConfig, profile: SiteProfile) -> Result<(), CommandError> {
    prepare_roots(config)?;
    let runtime = runtime()?;
    let service = Arc::new(build_application_service(config, profile));
    let (worker, outcomes) = start_worker(service, config);
    let printer = thread::spawn(move || {
        for outcome in outcomes {
            println!("{}", present_outcome(&outcome));
        }
    });

    let worker = Arc::new(worker);
    let submitter = Arc::clone(&worker);
    let watcher = PollingDirectoryWatcher::new(config.inbox_dir.clone(), config.poll_interval);
    info!(
        inbox = %config.inbox_dir.display(),
        processed = %config.processed_dir.display(),
        "watching inbox"
    );
    let handle = watcher.spawn(move |event| {
        info!(kind = ?event.kind, file = %event.path.display(), "inbox event");
        if let Err(error) = submitter.submit(event.path) {
            error!(%error, "failed to queue source");
        }
    });

    runtime
        .block_on(tokio::signal::ctrl_c())
        .map_err(|error| CommandError::Runtime(format!("cannot listen for Ctrl+C: {error}")))?;
    info!("received Ctrl+C, finishing the in-flight item");

    handle.stop();
    let worker = Arc::try_unwrap(worker)
        .map_err(|_| CommandError::Runtime("intake worker is still shared".to_string()))?;
    worker
        .shutdown()
        .map_err(|error| CommandError::Runtime(error.to_string()))?;
    let _ = printer.join();
    Ok(())
}

fn process_folder(config: &AppConfig, profile: SiteProfile) -> Result<(), CommandError> {
    prepare_roots(config)?;
    let service = Arc::new(build_application_service(config, profile));
    let (worker, outcomes) = start_worker(Arc::clone(&service), config);

    let scan = service
        .scan_folder(ScanFolderCommand {
            folder: config.inbox_dir.clone(),
        })
        .map_err(|error| CommandError::Runtime(format!("scan failed: {error}")))?;
    info!(
        scanned = scan.scanned_files,
        supported = scan.supported_files,
        "offering folder contents to the intake queue"
    );

    for file in scan.files {
        worker
            .submit(file.path)
            .map_err(|error| CommandError::Runtime(error.to_string()))?;
    }
    worker
        .wait_until_idle()
        .map_err(|error| CommandError::Runtime(error.to_string()))?;
    worker
        .shutdown()
        .map_err(|error| CommandError::Runtime(error.to_string()))?;

    let mut summary = Summary::default();
    for outcome in outcomes {
        println!("{}", present_outcome(&outcome));
        summary.record(&outcome);
    }
    println!(
        "processed={} unsupported={} failed={}",
        summary.processed, summary.unsupported, summary.failed
    );

    if summary.failed > 0 {
        return Err(CommandError::Runtime(format!(
            "{} source(s) failed to process",
            summary.failed
        )));
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    processed: usize,
    unsupported: usize,
    failed: usize,
}

impl Summary {
    fn record(&mut self, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Processed { .. } => self.processed += 1,
            ProcessOutcome::Unsupported { .. } => self.unsupported += 1,
            ProcessOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("folio").chain(args.iter().copied()))
    }

    fn temp_config(dir: &TempDir) -> AppConfig {
        AppConfig {
            inbox_dir: dir.path().join("inbox"),
            processed_dir: dir.path().join("processed"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_classify_command() {
        let cli = parse(&["classify", "--gallery", "xbox-dashboard.png"]).expect("classify");
        assert!(matches!(
            cli.command,
            Command::Classify { gallery: true, ref names } if names == &vec!["xbox-dashboard.png".to_string()]
        ));
    }

    #[test]
    fn parse_rejects_missing_arguments() {
        assert!(parse(&["classify"]).is_err());
        assert!(parse(&["push", "a.png"]).is_err());
        assert!(parse(&["launch"]).is_err());
    }

    #[test]
    fn flags_override_configuration() {
        let cli = parse(&[
            "--processed",
            "/srv/out",
            "serve",
            "--addr",
            "0.0.0.0:9000",
            "--uploads",
            "/srv/uploads",
        ])
        .expect("serve");
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.processed_dir, PathBuf::from("/srv/out"));
        assert_eq!(config.http_addr, SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert_eq!(config.uploads_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.inbox_dir, PathBuf::from("inbox"));
    }

    #[test]
    fn process_folder_argument_replaces_inbox() {
        let cli = parse(&["process", "/tmp/drop"]).expect("process");
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.inbox_dir, PathBuf::from("/tmp/drop"));
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut summary = Summary::default();
        summary.record(&ProcessOutcome::Unsupported {
            source: PathBuf::from("notes.txt"),
        });
        summary.record(&ProcessOutcome::Failed {
            source: PathBuf::from("broken.png"),
            error: "decode failed".to_string(),
        });
        assert_eq!(
            summary,
            Summary {
                processed: 0,
                unsupported: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn process_command_generates_outputs_and_archives_sources() {
        let dir = TempDir::new().expect("tempdir");
        let config = temp_config(&dir);
        std::fs::create_dir_all(&config.inbox_dir).expect("inbox");
        image::RgbImage::from_pixel(64, 48, image::Rgb([200, 10, 120]))
            .save(config.inbox_dir.join("tmobile-hero.png"))
            .expect("fixture");
        std::fs::write(config.inbox_dir.join("notes.txt"), b"keep me").expect("notes");

        run_command(Command::Process { folder: None }, &config).expect("process");

        let output_dir = config.processed_dir.join("tmobile").join("tmobile-hero");
        for name in [
            "tmobile-hero-full.jpg",
            "tmobile-hero-large.jpg",
            "tmobile-hero-medium.jpg",
            "tmobile-hero-thumbnail.jpg",
            "tmobile-hero-preview.jpg",
            "tmobile-hero-metadata.json",
        ] {
            assert!(output_dir.join(name).exists(), "missing {name}");
        }
        assert!(config.processed_dir.join("tmobile-hero.png").exists());
        assert!(!config.inbox_dir.join("tmobile-hero.png").exists());
        assert!(config.inbox_dir.join("notes.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn reprocessing_a_base_name_replaces_the_previous_outputs() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("tempdir");
        let tools = dir.path().join("tools");
        std::fs::create_dir_all(&tools).expect("tools");
        let script = |name: &str, body: &str| {
            let path = tools.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("script");
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("chmod");
            path
        };
        let config = AppConfig {
            ffmpeg: script("ffmpeg", r#"for last; do :; done; touch "$last""#),
            ffprobe: script("ffprobe", r#"echo '{"format":{"format_name":"mov"},"streams":[]}'"#),
            ..temp_config(&dir)
        };
        std::fs::create_dir_all(&config.inbox_dir).expect("inbox");

        image::RgbImage::from_pixel(64, 48, image::Rgb([200, 10, 120]))
            .save(config.inbox_dir.join("tmobile-hero.png"))
            .expect("fixture");
        run_command(Command::Process { folder: None }, &config).expect("image pass");

        std::fs::write(config.inbox_dir.join("tmobile-hero.mp4"), b"not really mp4").expect("clip");
        run_command(Command::Process { folder: None }, &config).expect("video pass");

        let output_dir = config.processed_dir.join("tmobile").join("tmobile-hero");
        let mut names: Vec<String> = std::fs::read_dir(&output_dir)
            .expect("output dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "tmobile-hero-metadata.json".to_string(),
                "tmobile-hero-optimized.mp4".to_string(),
                "tmobile-hero-thumbnail.jpg".to_string(),
            ]
        );

        let sidecar: serde_json::Value = serde_json::from_slice(
            &std::fs::read(output_dir.join("tmobile-hero-metadata.json")).expect("sidecar"),
        )
        .expect("json");
        assert!(sidecar["discovered_at"].is_string());
    }

    #[test]
    fn overlapping_roots_are_a_usage_error() {
        let dir = TempDir::new().expect("tempdir");
        let config = AppConfig {
            inbox_dir: dir.path().to_path_buf(),
            processed_dir: dir.path().join("processed"),
            ..AppConfig::default()
        };
        assert!(matches!(
            run_command(Command::Process { folder: None }, &config),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn unreadable_profile_is_a_usage_error() {
        let dir = TempDir::new().expect("tempdir");
        let config = AppConfig {
            profile_path: Some(dir.path().join("missing.toml")),
            ..temp_config(&dir)
        };
        let result = run_command(
            Command::Classify {
                gallery: false,
                names: vec!["hero.png".to_string()],
            },
            &config,
        );
        assert!(matches!(result, Err(CommandError::Usage(_))));
    }
}
