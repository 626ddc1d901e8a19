use crate::{Transaction, TransactionId, TransactionValidator, UtxoPool, ValidationPolicy};
use clap::{Arg, ArgMatches, Command};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

pub struct HandleCliOptions {
    pool: PathBuf,
    batch: PathBuf,
    policy: ValidationPolicy,
    report: bool,
}

impl HandleCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let pool = matches.value_of("pool").ok_or("Missing --pool")?;
        let batch = matches.value_of("batch").ok_or("Missing --batch")?;
        Ok(Self {
            pool: PathBuf::from(pool),
            batch: PathBuf::from(batch),
            policy: ValidationPolicy {
                allow_zero_value_outputs: !matches.is_present("reject-zero-outputs"),
            },
            report: matches.is_present("report"),
        })
    }
}

pub fn handle_command() -> Command<'static> {
    Command::new("handle")
        .version("0.1")
        .about("Validates a batch of transactions against a pool of unspent outputs and prints the accepted transactions and the resulting pool.")
        .arg(
            Arg::new("pool")
                .long("pool")
                .value_name("POOL.json")
                .help("JSON file with the unspent outputs to start from.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("BATCH.json")
                .help("JSON file with the candidate transactions, in the order to apply them.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("reject-zero-outputs")
                .long("reject-zero-outputs")
                .help("Treat outputs with a zero amount as invalid.")
                .required(false),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("Also print why each rejected transaction was rejected.")
                .required(false),
        )
}

#[derive(Debug, Serialize)]
struct RejectionReport {
    position: usize,
    transaction_id: Option<TransactionId>,
    reason: String,
}

#[derive(Debug, Serialize)]
struct HandleOutput {
    accepted: Vec<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<Vec<RejectionReport>>,
    pool: UtxoPool,
}

pub fn run_handle_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = HandleCliOptions::parse(matches)?;
    let output = handle_files(&options)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn handle_files(options: &HandleCliOptions) -> Result<HandleOutput, Box<dyn Error>> {
    let pool: UtxoPool = read_json(&options.pool)?;
    let batch: Vec<Transaction> = read_json(&options.batch)?;
    tracing::info!(
        "Loaded {} unspent outputs and {} candidate transactions",
        pool.len(),
        batch.len()
    );

    let mut validator = TransactionValidator::with_policy(&pool, options.policy);
    let outcome = validator.handle_transactions_with_report(&batch);

    let rejected = if options.report {
        Some(
            outcome
                .rejected
                .iter()
                .map(|rejected| RejectionReport {
                    position: rejected.position,
                    transaction_id: rejected.transaction_id,
                    reason: rejected.reason.to_string(),
                })
                .collect(),
        )
    } else {
        None
    };
    Ok(HandleOutput {
        accepted: outcome.accepted,
        rejected,
        pool: validator.into_pool(),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{genesis, pool_of, signing_key, spend};

    #[test]
    fn parses_options() {
        let matches = handle_command().get_matches_from(vec![
            "handle",
            "--pool",
            "pool.json",
            "--batch",
            "batch.json",
            "--reject-zero-outputs",
        ]);
        let options = HandleCliOptions::parse(&matches).unwrap();
        assert_eq!(options.pool, PathBuf::from("pool.json"));
        assert_eq!(options.batch, PathBuf::from("batch.json"));
        assert_eq!(options.policy, ValidationPolicy::strict());
        assert!(!options.report);
    }

    #[test]
    fn default_policy_allows_zero_outputs() {
        let matches = handle_command().get_matches_from(vec![
            "handle", "--pool", "p", "--batch", "b", "--report",
        ]);
        let options = HandleCliOptions::parse(&matches).unwrap();
        assert_eq!(options.policy, ValidationPolicy::default());
        assert!(options.report);
    }

    #[test]
    fn pool_and_batch_are_required() {
        assert!(handle_command()
            .try_get_matches_from(vec!["handle", "--pool", "p"])
            .is_err());
    }

    #[test]
    fn runs_a_batch_from_files() {
        let (scrooge, goofy) = (signing_key(1), signing_key(2));
        let first = genesis(100, &scrooge);
        let send = spend(&[(&first, 0, &scrooge)], &[(100, &goofy)]);
        let overspend = spend(&[(&first, 0, &scrooge)], &[(101, &goofy)]);

        let dir = std::env::temp_dir().join(format!("scroogecoin-handle-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let pool_path = dir.join("pool.json");
        let batch_path = dir.join("batch.json");
        fs::write(
            &pool_path,
            serde_json::to_string(&pool_of(&[&first])).unwrap(),
        )
        .unwrap();
        fs::write(
            &batch_path,
            serde_json::to_string(&vec![overspend, send.clone()]).unwrap(),
        )
        .unwrap();

        let matches = handle_command().get_matches_from(vec![
            "handle",
            "--pool",
            pool_path.to_str().unwrap(),
            "--batch",
            batch_path.to_str().unwrap(),
            "--report",
        ]);
        let options = HandleCliOptions::parse(&matches).unwrap();
        let output = handle_files(&options);
        fs::remove_dir_all(&dir).unwrap();
        let output = output.unwrap();

        assert_eq!(output.accepted, vec![send.clone()]);
        assert_eq!(output.pool, pool_of(&[&send]));
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["accepted"][0]["id"], serde_json::to_value(send.id()).unwrap());
        assert_eq!(json["rejected"][0]["position"], 0);
        assert!(json["rejected"][0]["reason"]
            .as_str()
            .unwrap()
            .starts_with("Outputs total"));
        assert_eq!(json["pool"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn rejections_are_left_out_without_report() {
        let output = HandleOutput {
            accepted: Vec::new(),
            rejected: None,
            pool: UtxoPool::new(),
        };
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("rejected").is_none());
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = read_json::<UtxoPool>(Path::new("/nonexistent/pool.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read /nonexistent/pool.json"));
    }
}
