//! ossdisk CLI - Command line access to configured storage disks.
//!
//! Every subcommand maps onto one filesystem adapter operation on the
//! selected disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ossdisk_common::{Visibility, WriteOptions};
use ossdisk_storage::{create_default_registry, DiskManager, FilesystemAdapter, FilesystemsConfig};

#[derive(Parser)]
#[command(name = "ossdisk")]
#[command(about = "ossdisk - Object storage disks from the command line")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Disk configuration file.
    #[arg(short, long, env = "OSSDISK_CONFIG", default_value = "ossdisk.json")]
    config: PathBuf,

    /// Disk to operate on (default: the configured default disk).
    #[arg(short, long)]
    disk: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file.
    Put {
        /// Local file to upload.
        source: PathBuf,

        /// Destination path on the disk.
        dest: String,

        /// Content type (default: guessed from the destination extension).
        #[arg(short, long)]
        mimetype: Option<String>,

        /// Make the object publicly readable.
        #[arg(long)]
        public: bool,
    },

    /// Download a file to a local path.
    Get {
        /// Source path on the disk.
        source: String,

        /// Local destination file.
        dest: PathBuf,
    },

    /// Print a file to stdout.
    Cat {
        path: String,
    },

    /// List a directory.
    Ls {
        /// Directory prefix (default: bucket root).
        #[arg(default_value = "")]
        dir: String,

        /// Descend into subdirectories.
        #[arg(short, long)]
        recursive: bool,
    },

    /// Delete a file.
    Rm {
        path: String,
    },

    /// Delete a directory and everything below it.
    Rmdir {
        dir: String,
    },

    /// Create a directory.
    Mkdir {
        dir: String,
    },

    /// Copy a file within the disk.
    Cp {
        from: String,
        to: String,
    },

    /// Move a file within the disk.
    Mv {
        from: String,
        to: String,
    },

    /// Show file metadata.
    Stat {
        path: String,
    },

    /// Check whether a file exists.
    Exists {
        path: String,
    },

    /// Read or change file visibility.
    Acl {
        #[command(subcommand)]
        command: AclCommands,
    },

    /// Print the public URL of a path.
    Url {
        path: String,
    },

    /// List configured disks.
    Disks,
}

#[derive(Subcommand)]
enum AclCommands {
    /// Show the visibility of a file.
    Get { path: String },

    /// Set the visibility of a file.
    Set {
        path: String,

        /// "public" or "private".
        visibility: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = FilesystemsConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    let registry = create_default_registry().context("Failed to register drivers")?;
    let manager =
        DiskManager::new(&config, &registry).context("Failed to initialise disks")?;

    let disk = || select_disk(&manager, cli.disk.as_deref());

    match cli.command {
        Commands::Put {
            source,
            dest,
            mimetype,
            public,
        } => cmd_put(disk()?, &source, &dest, mimetype, public).await,

        Commands::Get { source, dest } => cmd_get(disk()?, &source, &dest).await,

        Commands::Cat { path } => cmd_cat(disk()?, &path).await,

        Commands::Ls { dir, recursive } => cmd_ls(disk()?, &dir, recursive).await,

        Commands::Rm { path } => cmd_rm(disk()?, &path).await,

        Commands::Rmdir { dir } => cmd_rmdir(disk()?, &dir).await,

        Commands::Mkdir { dir } => cmd_mkdir(disk()?, &dir).await,

        Commands::Cp { from, to } => cmd_cp(disk()?, &from, &to).await,

        Commands::Mv { from, to } => cmd_mv(disk()?, &from, &to).await,

        Commands::Stat { path } => cmd_stat(disk()?, &path).await,

        Commands::Exists { path } => cmd_exists(disk()?, &path).await,

        Commands::Acl { command } => match command {
            AclCommands::Get { path } => cmd_acl_get(disk()?, &path).await,
            AclCommands::Set { path, visibility } => {
                cmd_acl_set(disk()?, &path, &visibility).await
            }
        },

        Commands::Url { path } => {
            println!("{}", disk()?.get_url(&path));
            Ok(())
        }

        Commands::Disks => cmd_disks(&manager, &config),
    }
}

/// Pick the named disk, or the default one.
fn select_disk(manager: &DiskManager, name: Option<&str>) -> Result<Arc<dyn FilesystemAdapter>> {
    let disk = match name {
        Some(name) => manager.disk(name),
        None => manager.default_disk(),
    };
    disk.context("Failed to select disk")
}

/// List configured disks.
fn cmd_disks(manager: &DiskManager, config: &FilesystemsConfig) -> Result<()> {
    for name in manager.disks() {
        let driver = config
            .disks
            .get(&name)
            .map(|disk| disk.driver.as_str())
            .unwrap_or("?");
        let marker = if name == manager.default_name() {
            " (default)"
        } else {
            ""
        };
        println!("{}\t{}{}", name, driver, marker);
    }
    Ok(())
}

/// Upload a local file.
async fn cmd_put(
    disk: Arc<dyn FilesystemAdapter>,
    source: &Path,
    dest: &str,
    mimetype: Option<String>,
    public: bool,
) -> Result<()> {
    info!("Uploading {} to {}", source.display(), dest);

    let content = tokio::fs::read(source)
        .await
        .context("Failed to read source file")?;

    let options = WriteOptions {
        mimetype,
        visibility: public.then_some(Visibility::Public),
    };

    let record = disk
        .write(dest, content, &options)
        .await
        .context("Failed to upload file")?;

    println!("Uploaded {} ({} bytes)", record.path, record.size);
    Ok(())
}

/// Download a file.
async fn cmd_get(disk: Arc<dyn FilesystemAdapter>, source: &str, dest: &Path) -> Result<()> {
    info!("Downloading {} to {}", source, dest.display());

    let mut response = disk
        .read_stream(source)
        .await
        .context("Failed to open remote file")?;

    let mut file = tokio::fs::File::create(dest)
        .await
        .context("Failed to create destination file")?;

    let mut written = 0usize;
    while let Some(chunk) = response.stream.next().await {
        let chunk = chunk.context("Failed to read remote file")?;
        file.write_all(&chunk)
            .await
            .context("Failed to write destination file")?;
        written += chunk.len();
    }
    file.flush().await?;

    println!("Downloaded {} ({} bytes)", response.path, written);
    Ok(())
}

/// Print a file.
async fn cmd_cat(disk: Arc<dyn FilesystemAdapter>, path: &str) -> Result<()> {
    let response = disk.read(path).await.context("Failed to read file")?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&response.contents).await?;
    stdout.flush().await?;
    Ok(())
}

/// List directory contents.
async fn cmd_ls(disk: Arc<dyn FilesystemAdapter>, dir: &str, recursive: bool) -> Result<()> {
    let contents = disk.list_contents(dir, recursive).await;

    if contents.is_empty() {
        println!("Directory is empty.");
        return Ok(());
    }

    for record in contents {
        let modified = chrono::DateTime::from_timestamp(record.timestamp, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        if record.kind.is_dir() {
            println!("  [DIR]  {}  {}", modified, record.path);
        } else {
            println!("  [FILE] {}  {} ({} bytes)", modified, record.path, record.size);
        }
    }

    Ok(())
}

/// Delete a file.
async fn cmd_rm(disk: Arc<dyn FilesystemAdapter>, path: &str) -> Result<()> {
    info!("Deleting {}", path);

    if !disk.delete(path).await.context("Failed to delete file")? {
        anyhow::bail!("{} still exists after delete", path);
    }

    println!("Deleted {}", path);
    Ok(())
}

/// Delete a directory.
async fn cmd_rmdir(disk: Arc<dyn FilesystemAdapter>, dir: &str) -> Result<()> {
    info!("Deleting directory {}", dir);

    disk.delete_dir(dir).await;
    println!("Deleted directory {}", dir);
    Ok(())
}

/// Create a directory.
async fn cmd_mkdir(disk: Arc<dyn FilesystemAdapter>, dir: &str) -> Result<()> {
    let record = disk
        .create_dir(dir, &WriteOptions::default())
        .await
        .context("Failed to create directory")?;

    println!("Directory created: {}", record.path);
    Ok(())
}

/// Copy a file.
async fn cmd_cp(disk: Arc<dyn FilesystemAdapter>, from: &str, to: &str) -> Result<()> {
    if !disk.copy(from, to).await {
        anyhow::bail!("Failed to copy {} to {}", from, to);
    }

    println!("Copied {} to {}", from, to);
    Ok(())
}

/// Move a file.
async fn cmd_mv(disk: Arc<dyn FilesystemAdapter>, from: &str, to: &str) -> Result<()> {
    let moved = disk
        .rename(from, to)
        .await
        .context("Failed to remove source after copy")?;
    if !moved {
        anyhow::bail!("Failed to move {} to {}", from, to);
    }

    println!("Moved {} to {}", from, to);
    Ok(())
}

/// Show file metadata.
async fn cmd_stat(disk: Arc<dyn FilesystemAdapter>, path: &str) -> Result<()> {
    let meta = disk
        .get_metadata(path)
        .await
        .context("Failed to read metadata")?;
    let visibility = disk.get_visibility(path).await;

    println!("Path:          {}", path);
    println!("Size:          {} bytes", meta.content_length);
    println!("Content-Type:  {}", meta.content_type);
    println!("Last-Modified: {}", meta.last_modified.to_rfc3339());
    if let Some(etag) = &meta.etag {
        println!("ETag:          {}", etag);
    }
    println!("Visibility:    {}", visibility);
    println!("URL:           {}", disk.get_url(path));

    Ok(())
}

/// Check whether a file exists.
async fn cmd_exists(disk: Arc<dyn FilesystemAdapter>, path: &str) -> Result<()> {
    let exists = disk.has(path).await.context("Failed to check file")?;
    println!("{}", exists);

    if !exists {
        std::process::exit(1);
    }
    Ok(())
}

/// Show visibility.
async fn cmd_acl_get(disk: Arc<dyn FilesystemAdapter>, path: &str) -> Result<()> {
    println!("{}", disk.get_visibility(path).await);
    Ok(())
}

/// Change visibility.
async fn cmd_acl_set(disk: Arc<dyn FilesystemAdapter>, path: &str, visibility: &str) -> Result<()> {
    let visibility: Visibility = visibility.parse().context("Invalid visibility")?;

    if !disk.set_visibility(path, visibility).await {
        anyhow::bail!("Failed to set visibility of {}", path);
    }

    println!("{} is now {}", path, visibility);
    Ok(())
}
