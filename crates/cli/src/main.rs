use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tagfill_core::metadata::MediaInfoCli;
use tagfill_core::scan::{scan, ScanConfig};
use tagfill_core::RenameConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Renames scene anime video files, adding metadata to the filename that the
/// releaser left out.
#[derive(Debug, Parser)]
#[command(name = "tagfill", version)]
struct Args {
    /// Directory to search for video files recursively.
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Single file to rename; its folder is scanned for it alone.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML config file. Defaults to <config dir>/tagfill/config.toml if present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minutes a file must rest before it is renamed.
    #[arg(long, value_name = "MINUTES")]
    required_wait: Option<f64>,

    /// Minutes after which a file is no longer renamed.
    #[arg(long, value_name = "MINUTES")]
    max_wait: Option<f64>,

    /// Do not move lone downloads into their own folder.
    #[arg(long)]
    no_move: bool,

    /// Accepted extension, with the dot (repeatable).
    #[arg(long = "ext", value_name = ".EXT")]
    extensions: Vec<String>,

    /// Folder name to skip (repeatable).
    #[arg(long = "ignore", value_name = "NAME")]
    ignored: Vec<String>,

    /// Report what would be renamed without touching anything.
    #[arg(long)]
    dry_run: bool,

    /// mediainfo executable.
    #[arg(long, value_name = "BIN")]
    mediainfo: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(err) = real_main(Args::parse()) {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}

fn real_main(args: Args) -> tagfill_core::Result<()> {
    if args.path.is_none() && args.file.is_none() {
        println!("No file or download directory specified. Exiting.");
        return Ok(());
    }

    let mut cfg = resolve_paths(scan_config(&args)?)?;
    cfg.rename = rename_config(&args)?;
    cfg.dry_run = args.dry_run;

    let provider = MediaInfoCli::new(
        &cfg.rename.mediainfo_path,
        Duration::from_secs(cfg.rename.mediainfo_timeout_secs),
    );
    let res = scan(&cfg, &provider)?;

    println!(
        "files_seen: {}, renamed: {}, moved: {}, unchanged: {}, skipped: {}, no_metadata: {}, failed: {}",
        res.stats.files_seen,
        res.stats.renamed,
        res.stats.moved,
        res.stats.unchanged,
        res.stats.skipped,
        res.stats.no_metadata,
        res.stats.failed
    );
    Ok(())
}

/// `--path` sets the scan root; `--file` alone scans the file's folder.
fn scan_config(args: &Args) -> tagfill_core::Result<ScanConfig> {
    match (&args.path, &args.file) {
        (Some(path), file) => Ok(ScanConfig {
            single_file: file.clone(),
            ..ScanConfig::for_folder(path)
        }),
        (None, Some(file)) => Ok(ScanConfig::for_file(file)),
        (None, None) => Err(tagfill_core::Error::InvalidArgument(
            "missing --path <dir> or --file <file>".to_string(),
        )),
    }
}

/// Makes the root absolute so the complete marker is visible in relative
/// invocations such as `-f Show.mkv`. A selected file that lives directly in
/// the root is re-anchored under the resolved root.
fn resolve_paths(mut cfg: ScanConfig) -> tagfill_core::Result<ScanConfig> {
    let root = fs::canonicalize(&cfg.root).map_err(|err| {
        tagfill_core::Error::InvalidArgument(format!(
            "cannot resolve {}: {err}",
            cfg.root.display()
        ))
    })?;
    if let Some(file) = cfg.single_file.take() {
        let in_root = file
            .parent()
            .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir })
            .and_then(|dir| fs::canonicalize(dir).ok())
            .is_some_and(|dir| dir == root);
        cfg.single_file = match file.file_name() {
            Some(name) if in_root => Some(root.join(name)),
            _ => Some(file),
        };
    }
    cfg.root = root;
    Ok(cfg)
}

fn rename_config(args: &Args) -> tagfill_core::Result<RenameConfig> {
    let base = match config_path(args) {
        Some(path) => {
            info!("Loading config from {}", path.display());
            RenameConfig::load(&path)?
        }
        None => RenameConfig::default(),
    };
    apply_overrides(args, base)
}

fn apply_overrides(args: &Args, mut rename: RenameConfig) -> tagfill_core::Result<RenameConfig> {
    if let Some(minutes) = args.required_wait {
        rename.required_wait_time = minutes;
    }
    if let Some(minutes) = args.max_wait {
        rename.max_wait_time = minutes;
    }
    if args.no_move {
        rename.move_to_folder = false;
    }
    if !args.extensions.is_empty() {
        rename.allowed_extensions = args.extensions.clone();
    }
    rename.ignored_folder_names.extend(args.ignored.iter().cloned());
    if let Some(bin) = &args.mediainfo {
        rename.mediainfo_path = bin.clone();
    }

    if rename.required_wait_time > rename.max_wait_time {
        return Err(tagfill_core::Error::InvalidArgument(format!(
            "required wait ({} min) exceeds max wait ({} min)",
            rename.required_wait_time, rename.max_wait_time
        )));
    }
    Ok(rename)
}

fn config_path(args: &Args) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }
    dirs::config_dir()
        .map(|dir| dir.join("tagfill").join("config.toml"))
        .filter(|path| path.is_file())
}
