//! Forms CLI
//!
//! Builds a form from a preset or a schema file, applies edits, prints the
//! validation state and submits it to the log sink.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use reactive_forms::{
    Form, FormCatalog, FormPath, FormSchema, FormsConfig, LogSink, Submission, SubmitPolicy,
    ValueMode,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forms")]
#[command(about = "Build, edit, validate and submit declarative forms")]
struct Cli {
    /// Config file (defaults to forms.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available forms
    List,

    /// Print a form schema as JSON
    Show {
        /// Form name
        name: String,
    },

    /// Fuzzy search forms by name or title
    Search {
        query: String,
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Build a form, apply edits and submit it.
    ///
    /// Edits run in this order: all --add, then all --set, then all --remove.
    Check {
        /// Form name from the catalog
        #[arg(required_unless_present = "schema")]
        name: Option<String>,

        /// Load the form schema from a JSON file instead
        #[arg(long, conflicts_with = "name")]
        schema: Option<PathBuf>,

        /// Append an element to a collection (repeatable)
        #[arg(long = "add", value_name = "PATH")]
        add: Vec<String>,

        /// Set a field from input text (repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE")]
        set: Vec<String>,

        /// Remove a collection element (repeatable)
        #[arg(long = "remove", value_name = "PATH:INDEX")]
        remove: Vec<String>,

        /// Override the submit policy
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Submit raw values, including disabled fields
        #[arg(long)]
        raw: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    WhenValid,
    Always,
}

impl From<PolicyArg> for SubmitPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::WhenValid => SubmitPolicy::WhenValid,
            PolicyArg::Always => SubmitPolicy::Always,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match FormsConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    match run(cli.command, &config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when a submission was withheld
fn run(command: Commands, config: &FormsConfig) -> anyhow::Result<bool> {
    let catalog = FormCatalog::from_config(&config.catalog)?;

    match command {
        Commands::List => {
            for schema in catalog.iter() {
                match &schema.title {
                    Some(title) => println!("{:<20} {}", schema.name, title),
                    None => println!("{}", schema.name),
                }
            }
            Ok(true)
        }

        Commands::Show { name } => {
            let schema = catalog.require(&name)?;
            println!("{}", serde_json::to_string_pretty(schema)?);
            Ok(true)
        }

        Commands::Search { query, limit } => {
            let results = catalog.search(&query, limit);
            if results.is_empty() {
                println!("No forms match '{}'", query);
            }
            for result in results {
                println!(
                    "{:<20} {:<24} (score {})",
                    result.name,
                    result.title.unwrap_or_default(),
                    result.score
                );
            }
            Ok(true)
        }

        Commands::Check {
            name,
            schema,
            add,
            set,
            remove,
            policy,
            raw,
            json,
        } => {
            let mut form = match (name, schema) {
                (_, Some(path)) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    let schema: FormSchema = serde_json::from_str(&content)
                        .with_context(|| format!("parsing {}", path.display()))?;
                    Form::build(&schema)?
                }
                (Some(name), None) => catalog.build(&name)?,
                (None, None) => return Err(anyhow!("either a form name or --schema is required")),
            };

            let mut options = config.submit.apply(form.submit_options());
            if let Some(policy) = policy {
                options.policy = policy.into();
            }
            if raw {
                options.value_mode = ValueMode::Raw;
            }
            form.set_submit_options(options);

            apply_edits(&mut form, &add, &set, &remove)?;

            let mut sink = LogSink;
            let outcome = form.submit(&mut sink);

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(form.name(), &outcome)?;
            }
            Ok(outcome.is_submitted())
        }
    }
}

fn apply_edits(form: &mut Form, add: &[String], set: &[String], remove: &[String]) -> anyhow::Result<()> {
    for path in add {
        let index = form.add_to_collection(&FormPath::parse(path)?)?;
        println!("➕ {}.{}", path, index);
    }

    for assignment in set {
        let (path, value) = parse_assignment(assignment)?;
        form.set_input(&path, value)?;
    }

    for target in remove {
        let (path, index) = parse_removal(target)?;
        if form.remove_from_collection(&path, index)? {
            println!("➖ {}.{}", path, index);
        } else {
            println!("⚠️  {}.{} does not exist, nothing removed", path, index);
        }
    }

    Ok(())
}

/// `PATH=VALUE`, split at the first `=` so values may contain one
fn parse_assignment(arg: &str) -> anyhow::Result<(FormPath, &str)> {
    let (path, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PATH=VALUE, got '{}'", arg))?;
    Ok((FormPath::parse(path)?, value))
}

/// `PATH:INDEX`
fn parse_removal(arg: &str) -> anyhow::Result<(FormPath, usize)> {
    let (path, index) = arg
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("expected PATH:INDEX, got '{}'", arg))?;
    let index: usize = index
        .parse()
        .with_context(|| format!("invalid index in '{}'", arg))?;
    Ok((FormPath::parse(path)?, index))
}

fn print_outcome(name: &str, outcome: &Submission) -> anyhow::Result<()> {
    println!();
    for failure in outcome.failures() {
        let path = if failure.path.is_root() {
            "(form)".to_string()
        } else {
            failure.path.to_string()
        };
        println!("  ❌ {} [{}]: {}", path, failure.failure.reason(), failure.failure);
    }

    match outcome {
        Submission::Submitted { valid, snapshot, .. } => {
            if *valid {
                println!("✅ {} submitted", name);
            } else {
                println!("⚠️  {} submitted while invalid", name);
            }
            println!("{}", serde_json::to_string_pretty(snapshot)?);
        }
        Submission::Withheld { failures } => {
            println!("❌ {} withheld: {} failure(s)", name, failures.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, set: &[&str], policy: Option<PolicyArg>) -> Commands {
        Commands::Check {
            name: Some(name.to_string()),
            schema: None,
            add: Vec::new(),
            set: set.iter().map(|s| s.to_string()).collect(),
            remove: Vec::new(),
            policy,
            raw: false,
            json: true,
        }
    }

    #[test]
    fn test_parse_assignment() {
        let (path, value) = parse_assignment("address.city=London").unwrap();
        assert_eq!(path.to_string(), "address.city");
        assert_eq!(value, "London");

        let (_, value) = parse_assignment("passwordGroup.password=a=b").unwrap();
        assert_eq!(value, "a=b");

        let (_, value) = parse_assignment("name=").unwrap();
        assert_eq!(value, "");

        assert!(parse_assignment("name").is_err());
        assert!(parse_assignment("address..city=London").is_err());
    }

    #[test]
    fn test_parse_removal() {
        let (path, index) = parse_removal("experience.0.responsibilities:2").unwrap();
        assert_eq!(path.to_string(), "experience.0.responsibilities");
        assert_eq!(index, 2);

        assert!(parse_removal("phoneNumbers").is_err());
        assert!(parse_removal("phoneNumbers:x").is_err());
        assert!(parse_removal("phoneNumbers:-1").is_err());
    }

    #[test]
    fn test_check_withheld_reports_false() {
        let config = FormsConfig::default();
        let submitted = run(check("user-phones", &[], None), &config).unwrap();
        assert!(!submitted);
    }

    #[test]
    fn test_check_valid_form_submits() {
        let config = FormsConfig::default();
        let edits = [
            "name=Ada Lovelace",
            "email=ada@example.com",
            "address.street=St James's Square",
            "address.city=London",
            "phoneNumbers.0=0123456789",
        ];
        assert!(run(check("user-phones", &edits, None), &config).unwrap());
    }

    #[test]
    fn test_check_always_policy_submits_invalid_form() {
        let config = FormsConfig::default();
        let submitted = run(check("user-phones", &[], Some(PolicyArg::Always)), &config).unwrap();
        assert!(submitted);
    }

    #[test]
    fn test_check_errors() {
        let config = FormsConfig::default();
        assert!(run(check("no-such-form", &[], None), &config).is_err());
        assert!(run(check("user-phones", &["missing=1"], None), &config).is_err());
        assert!(run(check("user-phones", &["name"], None), &config).is_err());
    }
}
