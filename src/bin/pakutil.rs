//! pakutil: create, inspect and convert PAK archives.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use pakserve::pak::{normalize_name, PakReader, PakWriter};

#[derive(Parser)]
#[command(name = "pakutil")]
#[command(about = "Create, inspect and convert PAK archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the entries of a PAK file
    List { pak: PathBuf },
    /// Pack every regular file under a directory into a new PAK
    Create { pak: PathBuf, dir: PathBuf },
    /// Unpack a PAK into a directory
    Extract { pak: PathBuf, dir: PathBuf },
    /// Convert a PAK into a deflate-compressed PKZ
    ToZip { pak: PathBuf, pkz: PathBuf },
    /// Convert a PKZ (or any ZIP) into a PAK
    FromZip { pkz: PathBuf, pak: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::List { pak } => list(&pak),
        Commands::Create { pak, dir } => create(&pak, &dir),
        Commands::Extract { pak, dir } => extract(&pak, &dir),
        Commands::ToZip { pak, pkz } => to_zip(&pak, &pkz),
        Commands::FromZip { pkz, pak } => from_zip(&pkz, &pak),
    }
}

fn list(pak: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = PakReader::open(pak)?;
    let mut stdout = io::stdout().lock();
    let mut total: u64 = 0;
    for file in reader.files() {
        writeln!(stdout, "{:>10}  {}", file.file_len, file.raw_name)?;
        total += u64::from(file.file_len);
    }
    writeln!(stdout, "{:>10}  {} files", total, reader.files().len())?;
    Ok(())
}

fn create(pak: &Path, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = PakWriter::create(pak)?;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir)?;
        let name = normalize_name(&relative.to_string_lossy());
        writer.start_file(&name)?;
        let mut input = BufReader::new(File::open(entry.path())?);
        io::copy(&mut input, &mut writer)?;
        tracing::debug!(name = %name, "Added");
    }

    let count = writer.len();
    writer.finish()?.flush()?;
    println!("{}: {} files", pak.display(), count);
    Ok(())
}

fn extract(pak: &Path, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = PakReader::open(pak)?;
    for file in reader.files() {
        if file.name.is_empty() {
            tracing::warn!(raw_name = %file.raw_name, "Skipping entry with empty name");
            continue;
        }
        let target = dir.join(&file.name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut input = reader.open_file(file)?;
        let mut output = BufWriter::new(File::create(&target)?);
        io::copy(&mut input, &mut output)?;
        output.flush()?;
    }
    println!("{}: {} files", dir.display(), reader.files().len());
    Ok(())
}

fn to_zip(pak: &Path, pkz: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = PakReader::open(pak)?;
    let mut zip = ZipWriter::new(BufWriter::new(File::create(pkz)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in reader.files() {
        if file.name.is_empty() {
            tracing::warn!(raw_name = %file.raw_name, "Skipping entry with empty name");
            continue;
        }
        zip.start_file(file.name.as_str(), options)?;
        let mut input = reader.open_file(file)?;
        io::copy(&mut input, &mut zip)?;
    }

    zip.finish()?.flush()?;
    println!("{}: {} files", pkz.display(), reader.files().len());
    Ok(())
}

fn from_zip(pkz: &Path, pak: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(pkz)?))?;
    let mut writer = PakWriter::create(pak)?;

    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        if member.is_dir() {
            continue;
        }
        writer.start_file(member.name())?;
        io::copy(&mut member, &mut writer)?;
    }

    let count = writer.len();
    writer.finish()?.flush()?;
    println!("{}: {} files", pak.display(), count);
    Ok(())
}
