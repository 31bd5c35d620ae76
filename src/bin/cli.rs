use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use doc_registry::config::RegistryConfig;
use doc_registry::logging::init_tracing;
use doc_registry::models::{DocumentInput, DocumentRecord, DocumentSource};
use doc_registry::render::{human_size, ListView, EMPTY_HINT, EMPTY_TITLE};
use doc_registry::storage::JsonFileStore;
use doc_registry::{DocumentRegistry, RegistryError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "doc-registry")]
#[command(about = "A CLI tool for managing published documents", long_about = None)]
struct Cli {
    #[arg(short, long, global = true, help = "Store file (overrides DOC_REGISTRY_STORE)")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Add a new document")]
    Add {
        #[arg(short, long, help = "Document title")]
        title: String,

        #[arg(short = 'T', long = "type", help = "policy, form, report, newsletter or other")]
        doc_type: String,

        #[arg(short, long, help = "Link to the document (e.g. a Google Drive share link)")]
        link: Option<String>,

        #[arg(short, long, help = "Local file whose name and size are recorded")]
        file: Option<PathBuf>,

        #[arg(short, long, help = "Optional description")]
        description: Option<String>,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "List all documents")]
    List,

    #[command(about = "Show one document")]
    Show {
        #[arg(help = "Document ID")]
        id: i64,
    },

    #[command(about = "Edit a document; omitted fields keep their current value")]
    Edit {
        #[arg(help = "Document ID")]
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short = 'T', long = "type")]
        doc_type: Option<String>,

        #[arg(short, long, conflicts_with = "file")]
        link: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Delete a document")]
    Delete {
        #[arg(help = "Document ID")]
        id: i64,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Export all documents to a JSON backup")]
    Export {
        #[arg(short, long, help = "Output path (defaults to the configured export name)")]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = RegistryConfig::from_env()?;
    init_tracing(config.log_level_or("warn"));
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    let store = JsonFileStore::new(&config.store_path);
    let mut registry = DocumentRegistry::new(store, config.registry_options());

    match cli.command {
        Commands::Add {
            title,
            doc_type,
            link,
            file,
            description,
            yes,
        } => {
            let mut input = DocumentInput {
                title,
                doc_type,
                link,
                description,
                ..Default::default()
            };
            if let Some(path) = file {
                attach_file(&mut input, &path)?;
            }
            add_document(&mut registry, input, yes)
        }
        Commands::List => list_documents(&registry),
        Commands::Show { id } => show_document(&registry, id),
        Commands::Edit {
            id,
            title,
            doc_type,
            link,
            file,
            description,
            yes,
        } => {
            let existing = registry
                .get_document(id)?
                .ok_or(RegistryError::NotFound(id))?;

            let mut input = DocumentInput::from_record(&existing);
            if let Some(title) = title {
                input.title = title;
            }
            if let Some(doc_type) = doc_type {
                input.doc_type = doc_type;
            }
            if let Some(description) = description {
                input.description = Some(description);
            }
            if let Some(link) = link {
                input.link = Some(link);
                input.file_name = None;
                input.file_size = None;
            }
            if let Some(path) = file {
                input.link = None;
                attach_file(&mut input, &path)?;
            }
            edit_document(&mut registry, id, input, yes)
        }
        Commands::Delete { id, yes } => delete_document(&mut registry, id, yes),
        Commands::Export { out } => export_documents(&registry, out),
    }
}

/// Records only the file's name and size; the contents stay where they are.
fn attach_file(input: &mut DocumentInput, path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata for {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?;

    input.file_name = Some(file_name.to_string());
    input.file_size = Some(metadata.len());
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("❓ {} (yes/no): ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn confirm_link(
    registry: &DocumentRegistry<JsonFileStore>,
    input: &DocumentInput,
    yes: bool,
) -> Result<bool> {
    match registry.link_warning(input) {
        Some(warning) if !yes => {
            println!("⚠️  {}", warning);
            confirm("Continue anyway?")
        }
        _ => Ok(true),
    }
}

fn add_document(
    registry: &mut DocumentRegistry<JsonFileStore>,
    input: DocumentInput,
    yes: bool,
) -> Result<()> {
    if !confirm_link(registry, &input, yes)? {
        println!("❌ Document not added");
        return Ok(());
    }

    let record = registry.create_document(&input)?;

    println!("✅ Document added successfully!");
    print_record(&record);
    println!("\n💡 It will now appear wherever the document list is published");
    Ok(())
}

fn list_documents(registry: &DocumentRegistry<JsonFileStore>) -> Result<()> {
    let documents = registry.list_documents()?;
    let view = ListView::build(&documents);

    let Some(table) = view.to_table() else {
        println!("📭 {}", EMPTY_TITLE);
        println!("💡 {}", EMPTY_HINT);
        return Ok(());
    };

    println!("\n📚 Documents ({})\n", view.len());
    table.printstd();
    println!();
    Ok(())
}

fn show_document(registry: &DocumentRegistry<JsonFileStore>, id: i64) -> Result<()> {
    let record = registry
        .get_document(id)?
        .ok_or(RegistryError::NotFound(id))?;
    print_record(&record);
    Ok(())
}

fn edit_document(
    registry: &mut DocumentRegistry<JsonFileStore>,
    id: i64,
    input: DocumentInput,
    yes: bool,
) -> Result<()> {
    if !confirm_link(registry, &input, yes)? {
        println!("❌ Document not changed");
        return Ok(());
    }

    let record = registry.update_document(id, &input)?;

    println!("✅ Document updated!");
    if record.id != id {
        println!("   (re-created with a new ID, previously {})", id);
    }
    print_record(&record);
    Ok(())
}

fn delete_document(
    registry: &mut DocumentRegistry<JsonFileStore>,
    id: i64,
    yes: bool,
) -> Result<()> {
    if !yes && !confirm("Are you sure you want to delete this document?")? {
        println!("❌ Delete cancelled");
        return Ok(());
    }

    if registry.delete_document(id)? {
        println!("✅ Document {} deleted", id);
    } else {
        println!("📭 No document with ID {}; nothing to delete", id);
    }
    Ok(())
}

fn export_documents(registry: &DocumentRegistry<JsonFileStore>, out: Option<PathBuf>) -> Result<()> {
    let artifact = registry.export_all()?;
    let path = out.unwrap_or_else(|| PathBuf::from(&artifact.file_name));

    fs::write(&path, &artifact.content)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    println!("✅ Documents exported successfully!");
    println!("📄 File: {}", path.display());
    Ok(())
}

fn print_record(record: &DocumentRecord) {
    println!("   🆔 ID: {}", record.id);
    println!("   📄 Title: {}", record.title);
    println!("   🏷️  Type: {}", record.doc_type);
    match &record.source {
        DocumentSource::Link { link } => println!("   🔗 Link: {}", link),
        DocumentSource::File {
            file_name,
            file_size,
        } => println!("   📎 File: {} ({})", file_name, human_size(*file_size)),
    }
    println!("   📝 Description: {}", record.description);
    println!("   📅 Date: {}", record.date);
}
