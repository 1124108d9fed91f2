use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use eyre::Result;
use uuid::Uuid;

use careplan_cli::config;
use careplan_core::models::plan::PlanField;
use careplan_generate::client::GeminiClient;
use careplan_session::session::Session;
use careplan_storage::client::LocalStore;

mod commands;

#[derive(Parser)]
#[command(name = "careplan", about = "Draft facility care plans (施設サービス計画書 第2表) from assessments")]
struct Cli {
    /// Data directory (overrides the config file)
    #[arg(long, global = true, env = "CAREPLAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Settings and credentials
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Patient registry
    Patient {
        #[command(subcommand)]
        command: PatientCommands,
    },
    /// List assessment categories and their items
    Categories,
    /// Generate a plan row for one category and add it to the patient's plan
    Generate {
        /// Patient ID
        #[arg(long)]
        patient: Uuid,
        /// Category ID (see `careplan categories`)
        #[arg(long, default_value = "meal")]
        category: String,
        /// Checked item, by text or 1-based number (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
        /// Free-text detail for the category
        #[arg(long, default_value = "")]
        detail: String,
        /// How to merge into existing rows (asks when omitted)
        #[arg(long, value_enum)]
        merge: Option<MergeArg>,
    },
    /// Generate rows for every checked category in one joint analysis
    Integrate {
        /// Patient ID
        #[arg(long)]
        patient: Uuid,
        /// Assessment JSON file keyed by category ID
        file: PathBuf,
        /// Answer yes to confirmations
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// View and edit a patient's care plan
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Store the Gemini API key
    SetApiKey {
        /// API key
        key: String,
    },
    /// Show settings (API key redacted)
    Show,
}

#[derive(Subcommand)]
pub enum PatientCommands {
    /// Register a patient
    Add {
        /// Full name
        #[arg(long)]
        name: String,
        /// Age in years
        #[arg(long)]
        age: Option<u32>,
        /// Care level, e.g. 要介護2
        #[arg(long)]
        care_level: Option<String>,
    },
    /// List registered patients
    List,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Print the saved plan
    Show {
        #[arg(long)]
        patient: Uuid,
    },
    /// Replace one field of a row
    Edit {
        #[arg(long)]
        patient: Uuid,
        /// Row number (1-based)
        no: usize,
        /// needs | longTermGoal | shortTermGoal | serviceContent
        field: PlanField,
        /// New text
        value: String,
    },
    /// Ask the model to rewrite one field
    Refine {
        #[arg(long)]
        patient: Uuid,
        /// Row number (1-based)
        no: usize,
        /// needs | longTermGoal | shortTermGoal | serviceContent
        field: PlanField,
        /// How to rewrite (default: より良い表現に修正して)
        #[arg(long, default_value = "")]
        instruction: String,
        /// Apply the proposal without asking
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Delete a row
    Delete {
        #[arg(long)]
        patient: Uuid,
        /// Row number (1-based)
        no: usize,
        /// Delete without asking
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Write the plan as CSV
    Export {
        #[arg(long)]
        patient: Uuid,
        /// Output directory (defaults to the current directory)
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print the plan as plain text for pasting
    Copy {
        #[arg(long)]
        patient: Uuid,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MergeArg {
    Append,
    Replace,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = config::config_path()?;
    let config = config::load_or_init(&config_path)?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());

    let store = LocalStore::open(&data_dir)?;
    let generator = GeminiClient::new(config.api_base_url.clone(), config.model.clone());
    let mut session = Session::new(store, generator);

    match cli.command {
        Commands::Settings { command } => match command {
            SettingsCommands::SetApiKey { key } => commands::set_api_key(&session, &key),
            SettingsCommands::Show => commands::show_settings(&session, &config, &config_path),
        },
        Commands::Patient { command } => match command {
            PatientCommands::Add {
                name,
                age,
                care_level,
            } => commands::add_patient(&session, &name, age, care_level.as_deref()),
            PatientCommands::List => commands::list_patients(&session),
        },
        Commands::Categories => commands::list_categories(),
        Commands::Generate {
            patient,
            category,
            items,
            detail,
            merge,
        } => commands::generate(&mut session, patient, &category, &items, &detail, merge),
        Commands::Integrate { patient, file, yes } => {
            commands::integrate(&mut session, patient, &file, yes)
        }
        Commands::Plan { command } => match command {
            PlanCommands::Show { patient } => commands::show_plan(&mut session, patient),
            PlanCommands::Edit {
                patient,
                no,
                field,
                value,
            } => commands::edit_field(&mut session, patient, no, field, &value),
            PlanCommands::Refine {
                patient,
                no,
                field,
                instruction,
                yes,
            } => commands::refine_field(&mut session, patient, no, field, &instruction, yes),
            PlanCommands::Delete { patient, no, yes } => {
                commands::delete_item(&mut session, patient, no, yes)
            }
            PlanCommands::Export { patient, out_dir } => {
                commands::export_csv(&mut session, patient, &out_dir)
            }
            PlanCommands::Copy { patient } => commands::copy_text(&mut session, patient),
        },
    }
}
