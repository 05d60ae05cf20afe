//! Kinship CLI — similarity queries over an object relation graph.
//!
//! Usage:
//!   kinship query <batch.json> [--db path] [--weights table.yaml]
//!   kinship score --type Assessment --id 1 [--among Assessment,Request]
//!   kinship import <fixture.json> [--db path]

use clap::{Parser, Subcommand};
use kinship::{
    parse_batch, GraphFixture, KinshipApi, ObjectKey, OpenStore, ScoreError, SqliteStore,
    WeightTable,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "kinship",
    version,
    about = "Similarity scoring over an object relation graph"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query batch from a JSON file (stdin when no file is given)
    Query {
        /// Path to the JSON batch
        file: Option<PathBuf>,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// YAML weight table overriding the built-in one
        #[arg(long)]
        weights: Option<PathBuf>,
    },
    /// Score objects similar to one subject
    Score {
        /// Subject object type
        #[arg(long = "type")]
        object_type: String,
        /// Subject object id
        #[arg(long, allow_negative_numbers = true)]
        id: i64,
        /// Candidate types to score (defaults to the subject's type)
        #[arg(long, value_delimiter = ',')]
        among: Vec<String>,
        /// Qualifying threshold (defaults to the subject type's own)
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i64>,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// YAML weight table overriding the built-in one
        #[arg(long)]
        weights: Option<PathBuf>,
    },
    /// Load objects, relationships, and snapshots from a JSON file
    Import {
        /// Path to the JSON fixture
        file: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

/// Get the default database path (~/.local/share/kinship/kinship.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let kinship_dir = data_dir.join("kinship");
    std::fs::create_dir_all(&kinship_dir).ok();
    kinship_dir.join("kinship.db")
}

fn open_store(db: Option<PathBuf>) -> Result<Arc<SqliteStore>, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store =
        SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    Ok(Arc::new(store))
}

fn load_weights(path: Option<&PathBuf>) -> Result<Arc<WeightTable>, String> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .map_err(|e| format!("Failed to read '{}': {}", p.display(), e))?;
            let table = WeightTable::from_yaml_str(&text)
                .map_err(|e| format!("Failed to parse weight table: {}", e))?;
            Ok(Arc::new(table))
        }
        None => Ok(Arc::new(WeightTable::builtin())),
    }
}

fn open_api(db: Option<PathBuf>, weights: Option<&PathBuf>) -> Result<KinshipApi, String> {
    let store = open_store(db)?;
    let weights = load_weights(weights)?;
    Ok(KinshipApi::new(store, weights))
}

fn read_batch(file: Option<&PathBuf>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e)),
        None => std::io::read_to_string(std::io::stdin())
            .map_err(|e| format!("cannot read stdin: {}", e)),
    }
}

fn cmd_query(api: &KinshipApi, file: Option<&PathBuf>) -> i32 {
    let text = match read_batch(file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let batch = match parse_batch(&text) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("Error: invalid query: {}", e);
            return 2;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return 1;
        }
    };
    match runtime.block_on(api.query(batch)) {
        Ok(results) => match serde_json::to_string_pretty(&results) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_client_error() {
                2
            } else {
                1
            }
        }
    }
}

fn cmd_score(
    api: &KinshipApi,
    object_type: &str,
    id: i64,
    among: &[String],
    threshold: Option<i64>,
) -> i32 {
    let subject = ObjectKey::new(object_type, id);
    // Negative thresholds clamp to zero
    let threshold = threshold.map(|t| t.max(0) as u64);
    let candidate_types: Vec<String> = if among.is_empty() {
        vec![object_type.to_string()]
    } else {
        among.to_vec()
    };

    match api.similar(&subject, &candidate_types, threshold) {
        Ok(candidates) => {
            if candidates.is_empty() {
                println!("No similar objects found.");
                return 0;
            }
            println!("{:<16}  {:>8}  {:>8}", "TYPE", "ID", "WEIGHT");
            println!("{}", "-".repeat(36));
            for candidate in &candidates {
                println!(
                    "{:<16}  {:>8}  {:>8}",
                    candidate.object_type, candidate.id, candidate.weight
                );
            }
            0
        }
        Err(ScoreError::SubjectNotFound(key)) => {
            eprintln!("Error: no such object: {}", key);
            2
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_import(store: &SqliteStore, file: &PathBuf) -> i32 {
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", file.display(), e);
            return 1;
        }
    };
    let fixture = match GraphFixture::from_json_str(&text) {
        Ok(fixture) => fixture,
        Err(e) => {
            eprintln!("Error: invalid fixture: {}", e);
            return 2;
        }
    };
    match fixture.apply(store) {
        Ok((objects, relationships, snapshots)) => {
            println!(
                "Imported {} objects, {} relationships, {} snapshots",
                objects, relationships, snapshots
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Query { file, db, weights } => {
            let api = match open_api(db, weights.as_ref()) {
                Ok(api) => api,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            std::process::exit(cmd_query(&api, file.as_ref()));
        }
        Commands::Score {
            object_type,
            id,
            among,
            threshold,
            db,
            weights,
        } => {
            let api = match open_api(db, weights.as_ref()) {
                Ok(api) => api,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            std::process::exit(cmd_score(&api, &object_type, id, &among, threshold));
        }
        Commands::Import { file, db } => {
            let store = match open_store(db) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            std::process::exit(cmd_import(&store, &file));
        }
    }
}
