//! adffs CLI - run filesystem commands against an Amiga volume pack.
//!
//! Usage:
//!   adffs <pack.zip> [options] <command>
//!
//! Examples:
//!   adffs ffdisk0049.zip ls /Plot              # List a directory
//!   adffs ffdisk0049.zip cat /Plot/plot.c      # Print a file
//!   adffs ffdisk0049.zip --save out.zip mkdir /Build
//!   adffs ffdisk0049.zip --read-only stat /README.list49

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adffs_core::{
    dir_ops, file_ops, load_volume_from_path, readlink, rename, resolve, save_volume_pack,
    set_permissions, stat, AdfMount, DentryKind, Volume,
};

/// Amiga volume adapter CLI
#[derive(Parser, Debug)]
#[command(name = "adffs")]
#[command(about = "Browse and edit Amiga volume packs")]
struct Args {
    /// Volume pack (ZIP) to mount
    pack: PathBuf,

    /// Mount read-only, regardless of the pack's manifest
    #[arg(short, long)]
    read_only: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the (possibly mutated) volume back out to this pack
    #[arg(long, value_name = "OUT.zip")]
    save: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show volume name, filesystem kind and block usage
    Info,
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print a file's contents
    Cat { path: String },
    /// Show an entry's metadata
    Stat { path: String },
    /// Print a link's target
    Readlink { path: String },
    /// Create a directory
    Mkdir { path: String },
    /// Create an empty file
    Touch { path: String },
    /// Copy a local file into the volume
    Write { path: String, local: PathBuf },
    /// Resize a file
    Truncate { path: String, size: u32 },
    /// Set an entry's permission bits (octal)
    Chmod { mode: String, path: String },
    /// Remove a file or an empty directory
    Rm { path: String },
    /// Move or rename an entry
    Mv { src: String, dst: String },
}

fn kind_char(kind: DentryKind) -> char {
    match kind {
        DentryKind::File => '-',
        DentryKind::Dir => 'd',
        DentryKind::LinkFile | DentryKind::LinkDir | DentryKind::SoftLink => 'l',
        DentryKind::Unknown => '?',
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut vol = load_volume_from_path(&args.pack)?;
    if args.read_only {
        vol.set_read_only(true);
    }
    tracing::debug!(pack = %args.pack.display(), "volume pack mounted");
    let mut mount = AdfMount::new(vol);

    match &args.command {
        Command::Info => {
            let info = mount.volume().info();
            println!("name:       {}", info.name);
            println!("filesystem: {}", info.filesystem);
            println!("read-only:  {}", info.read_only);
            println!("block size: {}", info.block_size);
            println!(
                "blocks:     {} total, {} free",
                info.total_blocks, info.free_blocks
            );
        }
        Command::Ls { path } => {
            for dentry in dir_ops::list(&mut mount, path)? {
                println!(
                    "{} {:>8}  {}",
                    kind_char(dentry.kind),
                    dentry.raw.size,
                    dentry.raw.name
                );
            }
        }
        Command::Cat { path } => {
            let data = file_ops::read_all(&mut mount, path)?;
            std::io::stdout().write_all(&data)?;
        }
        Command::Stat { path } => {
            let md = stat(&mut mount, path)?;
            println!("mode:   {:o}", md.mode);
            println!("size:   {}", md.size);
            println!("blocks: {}", md.blocks);
            println!("nlink:  {}", md.nlink);
            println!("mtime:  {}", md.mtime);
        }
        Command::Readlink { path } => {
            println!("{}", readlink(&mut mount, path)?);
        }
        Command::Mkdir { path } => {
            dir_ops::create_dir(&mut mount, path, 0o755)?;
        }
        Command::Touch { path } => {
            dir_ops::create_file(&mut mount, path, 0o644)?;
        }
        Command::Write { path, local } => {
            let data = std::fs::read(local)?;
            if resolve(&mut mount, path)?.is_none() {
                dir_ops::create_file(&mut mount, path, 0o644)?;
            }
            file_ops::truncate(&mut mount, path, 0)?;
            let n = file_ops::write(&mut mount, path, 0, &data)?;
            eprintln!("wrote {} bytes to {}", n, path);
        }
        Command::Truncate { path, size } => {
            file_ops::truncate(&mut mount, path, *size)?;
        }
        Command::Chmod { mode, path } => {
            let mode = u32::from_str_radix(mode, 8)?;
            set_permissions(&mut mount, path, mode)?;
        }
        Command::Rm { path } => {
            dir_ops::remove(&mut mount, path)?;
        }
        Command::Mv { src, dst } => {
            rename(&mut mount, src, dst)?;
        }
    }

    if let Some(out) = &args.save {
        let file = std::fs::File::create(out)?;
        save_volume_pack(&mut mount, file)?;
        eprintln!("saved volume to {}", out.display());
    }

    Ok(())
}
