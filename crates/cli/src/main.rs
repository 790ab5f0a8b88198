use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use zenpic_core::config::config_from_env_values;
use zenpic_core::{CoreError, Entry, Library, LibraryService, UploadError, UploadPayload, UploadedFile};

#[derive(Parser)]
#[command(name = "zenpic")]
#[command(about = "Zenpic media library CLI")]
struct Cli {
    /// Use the music library instead of photos
    #[arg(long, global = true)]
    music: bool,
    /// Storage root to use instead of STORAGE_PATH / MUSIC_STORAGE_PATH
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List collections
    Collections,
    /// List the entries of a collection
    Entries {
        /// Collection name
        collection: String,
    },
    /// List the collection mapped to a weather condition
    Weather {
        /// One of sun, cloud, rain, snow
        condition: String,
    },
    /// Copy a file out of a collection, optionally resized
    Fetch {
        /// Collection name
        collection: String,
        /// File name
        file: String,
        /// Bounding width in pixels
        #[arg(long)]
        width: Option<String>,
        /// Bounding height in pixels
        #[arg(long)]
        height: Option<String>,
        /// Destination path
        #[arg(long)]
        out: PathBuf,
    },
    /// Upload local files into a collection
    Upload {
        /// Collection name (created if missing)
        collection: String,
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn print_entries(entries: &[Entry]) {
    if entries.is_empty() {
        println!("No entries found.");
    }
    for entry in entries {
        println!("{}\t{}", entry.kind, entry.name);
    }
}

fn service(music: bool, root: Option<PathBuf>) -> Result<LibraryService, Box<dyn std::error::Error>> {
    let library = if music { Library::Music } else { Library::Photos };
    let cwd = std::env::current_dir()?;

    if let Some(root) = root {
        let root = if root.is_absolute() { root } else { cwd.join(root) };
        return Ok(LibraryService::new(&root));
    }

    let cfg = config_from_env_values(
        std::env::var("STORAGE_PATH").ok(),
        std::env::var("MUSIC_STORAGE_PATH").ok(),
        &cwd,
    )?;
    Ok(LibraryService::for_library(&cfg, library))
}

fn read_upload(path: &Path) -> Result<UploadedFile, Box<dyn std::error::Error>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("not a file name: {}", path.display()))?;
    let bytes = std::fs::read(path)?;
    Ok(UploadedFile::new(name, "", bytes))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let service = service(cli.music, cli.root)?;

    match cli.command {
        Some(Commands::Collections) => match service.list_collections() {
            Ok(entries) => print_entries(&entries),
            Err(e) => eprintln!("Error listing collections: {}", e),
        },
        Some(Commands::Entries { collection }) => match service.list_entries(&collection) {
            Ok(entries) => print_entries(&entries),
            Err(e) => eprintln!("Error listing {}: {}", collection, e),
        },
        Some(Commands::Weather { condition }) => {
            match service.list_by_condition(Some(&condition)) {
                Ok(listing) => {
                    println!("Collection: {}", listing.collection);
                    print_entries(&listing.entries);
                }
                Err(e) => eprintln!("Error listing weather collection: {}", e),
            }
        }
        Some(Commands::Fetch {
            collection,
            file,
            width,
            height,
            out,
        }) => match service.fetch(&collection, &file, width.as_deref(), height.as_deref()) {
            Ok(fetched) => {
                std::fs::write(&out, &fetched.bytes)?;
                println!(
                    "Wrote {} bytes ({}) to {}",
                    fetched.bytes.len(),
                    fetched.media_type,
                    out.display()
                );
            }
            Err(e) => eprintln!("Error fetching {}/{}: {}", collection, file, e),
        },
        Some(Commands::Upload { collection, files }) => {
            let uploads = files
                .iter()
                .map(|path| read_upload(path))
                .collect::<Result<Vec<_>, _>>()?;
            match service.upload(&collection, UploadPayload::from_files(uploads)) {
                Ok(stored) => {
                    for summary in stored {
                        println!("Stored {} ({}, {} bytes)", summary.name, summary.mimetype, summary.size);
                    }
                }
                Err(CoreError::Upload(UploadError::Partial { stored, failed })) => {
                    for summary in stored {
                        println!("Stored {} ({}, {} bytes)", summary.name, summary.mimetype, summary.size);
                    }
                    for failure in failed {
                        eprintln!("Failed {}: {}", failure.name, failure.reason);
                    }
                }
                Err(e) => eprintln!("Error uploading to {}: {}", collection, e),
            }
        }
        None => {
            println!("Use 'zenpic --help' for commands");
        }
    }

    Ok(())
}
