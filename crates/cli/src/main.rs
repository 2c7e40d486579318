use clap::{Parser, Subcommand};
use medrec_core::config::database_path_from_env_value;
use medrec_core::{
    CoreConfig, MedicationError, MedicationGateway, MedicationId, SqliteMedicationStore,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "medrec")]
#[command(about = "Medication records catalog CLI")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "MEDREC_DB_PATH")]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all medications in catalog order
    List,
    /// Show one medication
    Show {
        /// Medication id
        id: MedicationId,
    },
    /// Add a medication
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        dose: String,
        /// Administration route (e.g. oral)
        #[arg(long)]
        route: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,
        /// End date (YYYY-MM-DD); omit if ongoing
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        facility: String,
    },
    /// Import medications from a JSON file holding an array of payloads
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

type Gateway = MedicationGateway<SqliteMedicationStore>;

/// Outcome of one payload in an import.
#[derive(Debug)]
enum ImportOutcome {
    Created(i64),
    Rejected(MedicationError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        println!("Use 'medrec --help' for commands");
        return Ok(ExitCode::SUCCESS);
    };

    let cfg = CoreConfig::new(database_path_from_env_value(cli.db))?;
    let gateway = MedicationGateway::new(SqliteMedicationStore::new(Arc::new(cfg)));

    match command {
        Commands::List => {
            let medications = gateway.list_medications()?;
            if medications.is_empty() {
                eprintln!("No medications found.");
            }
            println!("{}", serde_json::to_string_pretty(&medications)?);
        }
        Commands::Show { id } => match gateway.get_medication(id) {
            Ok(medication) => println!("{}", serde_json::to_string_pretty(&medication)?),
            Err(MedicationError::NotFound(id)) => {
                eprintln!("No medication with id {}", id);
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Add {
            name,
            dose,
            route,
            start_date,
            end_date,
            facility,
        } => {
            let payload = json!({
                "name": name,
                "dose": dose,
                "route": route,
                "start_date": start_date,
                "end_date": end_date,
                "facility": facility,
            });
            match gateway.ingest(&payload) {
                Ok(medication) => println!("{}", serde_json::to_string_pretty(&medication)?),
                Err(MedicationError::Validation(errors)) => {
                    eprintln!("{}", serde_json::to_string_pretty(&errors)?);
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Import { file } => {
            let contents = std::fs::read_to_string(&file)?;
            let data: Value = serde_json::from_str(&contents)?;
            let outcomes = import_payloads(&gateway, &data)?;

            let mut rejected = 0usize;
            for (index, outcome) in outcomes.iter().enumerate() {
                match outcome {
                    ImportOutcome::Created(id) => println!("[{}] created medication {}", index, id),
                    ImportOutcome::Rejected(MedicationError::Validation(errors)) => {
                        rejected += 1;
                        eprintln!("[{}] rejected: {}", index, serde_json::to_string(errors)?);
                    }
                    ImportOutcome::Rejected(e) => {
                        rejected += 1;
                        eprintln!("[{}] failed: {}", index, e);
                    }
                }
            }

            println!(
                "Imported {} of {} medications",
                outcomes.len() - rejected,
                outcomes.len()
            );
            if rejected > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Ingests every payload of a JSON array independently.
///
/// A rejected payload does not stop the ones after it.
fn import_payloads(gateway: &Gateway, data: &Value) -> Result<Vec<ImportOutcome>, MedicationError> {
    let Some(items) = data.as_array() else {
        return Err(MedicationError::InvalidInput(
            "import file must contain a JSON array of medications".into(),
        ));
    };

    Ok(items
        .iter()
        .map(|item| match gateway.ingest(item) {
            Ok(medication) => ImportOutcome::Created(medication.id),
            Err(e) => ImportOutcome::Rejected(e),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_gateway(temp_dir: &TempDir) -> Gateway {
        let cfg = CoreConfig::new(temp_dir.path().join("meds.sqlite3")).unwrap();
        MedicationGateway::new(SqliteMedicationStore::new(Arc::new(cfg)))
    }

    #[test]
    fn test_cli_parses_add_with_optional_end_date() {
        let cli = Cli::try_parse_from([
            "medrec",
            "--db",
            "meds.sqlite3",
            "add",
            "--name",
            "Lisinopril",
            "--dose",
            "10mg",
            "--route",
            "oral",
            "--start-date",
            "2024-01-01",
            "--facility",
            "Clinic A",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.db.as_deref(), Some("meds.sqlite3"));
        match cli.command {
            Some(Commands::Add { end_date, name, .. }) => {
                assert_eq!(name, "Lisinopril");
                assert_eq!(end_date, None);
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_cli_rejects_non_integer_show_id() {
        assert!(Cli::try_parse_from(["medrec", "show", "abc"]).is_err());
    }

    #[test]
    fn test_import_reports_each_payload_independently() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = test_gateway(&temp_dir);

        let data = json!([
            {
                "name": "Lisinopril", "dose": "10mg", "route": "oral",
                "start_date": "2024-01-01", "end_date": "2024-06-01", "facility": "Clinic A"
            },
            {
                "name": "Lisinopril", "dose": "10mg", "route": "oral",
                "start_date": "2024-01-01", "end_date": "2023-12-31", "facility": "Clinic A"
            },
            {
                "name": "Metformin", "dose": "500mg", "route": "oral",
                "start_date": "2023-05-01", "facility": "Clinic B"
            }
        ]);

        let outcomes = import_payloads(&gateway, &data).expect("import should run");
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], ImportOutcome::Created(_)));
        assert!(matches!(
            &outcomes[1],
            ImportOutcome::Rejected(MedicationError::Validation(e)) if e.contains_field("end_date")
        ));
        assert!(matches!(outcomes[2], ImportOutcome::Created(_)));

        let names: Vec<String> = gateway
            .list_medications()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Metformin", "Lisinopril"]);
    }

    #[test]
    fn test_import_requires_an_array() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = test_gateway(&temp_dir);

        let err = import_payloads(&gateway, &json!({"name": "Lisinopril"}))
            .expect_err("object should be rejected");
        assert!(matches!(err, MedicationError::InvalidInput(_)));
    }
}
