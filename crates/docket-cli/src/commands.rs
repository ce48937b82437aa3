use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use serde::Serialize;

use docket_gate::{confirm_password, AccessGate, AdminCredentials, Role};
use docket_server::{DocketServer, ServerConfig};
use docket_store::Database;
use docket_types::{coerce_json, CreateManyResponse, CreateResponse, Fields};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        command => {
            let gate = AccessGate::new(Database::open(config.store_config())?);
            run_store_command(&gate, command, cli.format)
        }
    }
}

fn run_store_command(
    gate: &AccessGate,
    command: Command,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        Command::Create(args) => cmd_create(gate, args, format),
        Command::Read(args) => cmd_read(gate, args, format),
        Command::Update(args) => cmd_update(gate, args, format),
        Command::Delete(args) => cmd_delete(gate, args, format),
        Command::List => cmd_list(gate, format),
        Command::CreateCollection(args) => {
            gate.create_collection(&args.name)?;
            println!("{} Created collection {}", "✓".green().bold(), args.name.yellow());
            Ok(())
        }
        Command::DeleteCollection(args) => {
            gate.delete_collection(&credentials(args.admin), &args.name)?;
            println!("{} Deleted collection {}", "✓".green().bold(), args.name.yellow());
            Ok(())
        }
        Command::Bootstrap(args) => cmd_bootstrap(gate, args),
        Command::CreateUser(args) => cmd_create_user(gate, args),
        Command::Login(args) => cmd_login(gate, args),
        Command::Serve(_) => bail!("serve needs the HTTP runtime"),
    }
}

/// Defaults, then the `--config` file, then `--data-dir`.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

/// Documents read from a create file.
#[derive(Debug, PartialEq)]
pub enum Payload {
    /// A single JSON object.
    One(Fields),
    /// A JSON array of objects, created in one write.
    Many(Vec<Fields>),
}

/// Outcome of a file-based create: `{"ID": n}` or `{"IDs": [..]}`.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Created {
    One(CreateResponse),
    Many(CreateManyResponse),
}

/// Parse a create file: an object is one document, an array is a batch.
///
/// Top-level string values are coerced like any other inbound literal;
/// numbers keep their type and nested JSON is stored verbatim.
pub fn load_payload(path: &Path) -> anyhow::Result<Payload> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    match json {
        serde_json::Value::Object(map) => Ok(Payload::One(to_fields(map))),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(map) => Ok(to_fields(map)),
                _ => Err(anyhow!("invalid input: every array element must be a JSON object")),
            })
            .collect::<anyhow::Result<Vec<_>>>()
            .map(Payload::Many),
        _ => bail!("invalid input: expected a JSON object or an array of objects"),
    }
}

fn to_fields(map: serde_json::Map<String, serde_json::Value>) -> Fields {
    map.into_iter().map(|(k, v)| (k, coerce_json(v))).collect()
}

/// Store a parsed payload, using `createMany` for every array.
pub fn create_payload(
    gate: &AccessGate,
    collection: &str,
    payload: Payload,
) -> anyhow::Result<Created> {
    Ok(match payload {
        Payload::One(fields) => Created::One(gate.create(collection, fields)?),
        Payload::Many(batch) => Created::Many(gate.create_many(collection, batch)?),
    })
}

fn credentials(args: AdminArgs) -> AdminCredentials {
    AdminCredentials::new(args.username, args.password)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_create(gate: &AccessGate, args: CreateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let created = create_payload(gate, &args.collection, load_payload(&args.file)?)?;
    if let OutputFormat::Json = format {
        return print_json(&created);
    }
    match created {
        Created::One(response) => println!(
            "{} Created document {} in {}",
            "✓".green().bold(),
            response.id,
            args.collection.yellow()
        ),
        Created::Many(response) => {
            println!(
                "{} Created {} documents in {}",
                "✓".green().bold(),
                response.ids.len().to_string().bold(),
                args.collection.yellow()
            );
            for id in &response.ids {
                println!("  {}", id.to_string().cyan());
            }
        }
    }
    Ok(())
}

fn cmd_read(gate: &AccessGate, args: ReadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let p = &args.predicate;
    let response = gate.read(&p.collection, &p.key, &p.value, args.all)?;
    if let OutputFormat::Json = format {
        return print_json(&response);
    }
    if response.response.is_empty() {
        println!("No documents where {} == {}.", p.key.bold(), p.value);
        return Ok(());
    }
    for doc in response.response.into_documents() {
        println!("{} {}", "ID".dimmed(), doc.id.to_string().yellow().bold());
        println!("{}", serde_json::to_string_pretty(&doc.content)?);
    }
    Ok(())
}

fn cmd_update(gate: &AccessGate, args: UpdateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let p = &args.predicate;
    let response =
        gate.update(&p.collection, &p.key, &p.value, &args.update_key, &args.update_value)?;
    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            println!(
                "{} Updated {} document(s): {}",
                "✓".green().bold(),
                response.updated_doc_ids.len().to_string().bold(),
                join_ids(response.updated_doc_ids.iter())
            );
            Ok(())
        }
    }
}

fn cmd_delete(gate: &AccessGate, args: DeleteArgs, format: OutputFormat) -> anyhow::Result<()> {
    let p = &args.predicate;
    let response = gate.delete(&p.collection, &p.key, &p.value)?;
    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            println!(
                "{} Deleted {} document(s): {}",
                "✓".green().bold(),
                response.deleted_doc_ids.len().to_string().bold(),
                join_ids(response.deleted_doc_ids.iter())
            );
            Ok(())
        }
    }
}

fn join_ids<T: ToString>(ids: impl Iterator<Item = T>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

fn cmd_list(gate: &AccessGate, format: OutputFormat) -> anyhow::Result<()> {
    let response = gate.list_collections()?;
    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            if response.collections.is_empty() {
                println!("No collections.");
            }
            for name in &response.collections {
                println!("  {}", name);
            }
            Ok(())
        }
    }
}

fn cmd_bootstrap(gate: &AccessGate, args: BootstrapArgs) -> anyhow::Result<()> {
    confirm_password(&args.password, &args.confirm)?;
    let response = gate.bootstrap_admin(&args.username, &args.password)?;
    println!(
        "{} Admin {} created (ID {})",
        "✓".green().bold(),
        args.username.yellow(),
        response.id
    );
    Ok(())
}

fn cmd_create_user(gate: &AccessGate, args: CreateUserArgs) -> anyhow::Result<()> {
    let role: Role = args.role.parse()?;
    confirm_password(&args.new_password, &args.confirm)?;
    let response = gate.create_user(
        &credentials(args.admin),
        &args.new_username,
        &args.new_password,
        role,
    )?;
    println!(
        "{} User {} created with role {} (ID {})",
        "✓".green().bold(),
        args.new_username.yellow(),
        role.to_string().cyan(),
        response.id
    );
    Ok(())
}

fn cmd_login(gate: &AccessGate, args: AdminArgs) -> anyhow::Result<()> {
    if !gate.users().admin_exists()? {
        bail!("no admin exists yet; run `docket bootstrap` first");
    }
    let username = args.username.clone();
    if gate.authenticate_admin(&credentials(args))? {
        println!("{} Authenticated {} as admin", "✓".green().bold(), username.yellow());
        Ok(())
    } else {
        bail!("authentication failed for '{username}'")
    }
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let server = DocketServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use docket_types::{DocId, Value};
    use serde_json::json;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("docket").chain(args.iter().copied())).unwrap()
    }

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    // -----------------------------------------------------------------------
    // Payload files
    // -----------------------------------------------------------------------

    #[test]
    fn object_payload_coerces_top_level_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            write(&dir, "doc.json", r#"{"age": "30", "name": "alice", "tags": ["1"], "n": 5}"#);
        let Payload::One(fields) = load_payload(&path).unwrap() else {
            panic!("expected a single document");
        };
        assert_eq!(fields["age"], Value::Integer(30));
        assert_eq!(fields["name"], Value::Text("alice".into()));
        assert_eq!(fields["n"], Value::Integer(5));
        assert_eq!(fields["tags"], Value::Raw(json!(["1"])));
    }

    #[test]
    fn array_payload_is_a_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "docs.json", r#"[{"a": 1}, {"a": 2}, {"a": 3}]"#);
        assert!(matches!(load_payload(&path).unwrap(), Payload::Many(batch) if batch.len() == 3));

        let path = write(&dir, "one.json", r#"[{"a": 1}]"#);
        assert!(matches!(load_payload(&path).unwrap(), Payload::Many(batch) if batch.len() == 1));
    }

    #[test]
    fn payload_rejects_scalars_and_mixed_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.json", "42");
        assert!(load_payload(&path).unwrap_err().to_string().contains("invalid input"));
        let path = write(&dir, "mixed.json", r#"[{"a": 1}, 7]"#);
        assert!(load_payload(&path).unwrap_err().to_string().contains("invalid input"));
        let path = write(&dir, "broken.json", "{not json");
        assert!(load_payload(&path).is_err());
    }

    #[test]
    fn single_element_array_reports_ids() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(docket_store::StoreConfig::new(dir.path())).unwrap();
        let gate = AccessGate::new(db);
        gate.create_collection("people").unwrap();

        let path = write(&dir, "one.json", r#"[{"name": "alice"}]"#);
        let created = create_payload(&gate, "people", load_payload(&path).unwrap()).unwrap();
        assert_eq!(serde_json::to_value(&created).unwrap(), json!({"IDs": [1]}));

        let path = write(&dir, "obj.json", r#"{"name": "bob"}"#);
        let created = create_payload(&gate, "people", load_payload(&path).unwrap()).unwrap();
        assert_eq!(created, Created::One(CreateResponse { id: DocId::new(2) }));
        assert_eq!(serde_json::to_value(&created).unwrap(), json!({"ID": 2}));
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    #[test]
    fn data_dir_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let toml = "data_dir = \"from-file\"\nbind_addr = \"127.0.0.1:9100\"\n";
        let path = write(&dir, "docket.toml", toml);
        let path_str = path.to_str().unwrap();

        let config = resolve_config(&cli(&["list", "--config", path_str])).unwrap();
        assert_eq!(config.data_dir, Path::new("from-file"));
        assert_eq!(config.bind_addr.port(), 9100);

        let config =
            resolve_config(&cli(&["list", "--config", path_str, "--data-dir", "cli"])).unwrap();
        assert_eq!(config.data_dir, Path::new("cli"));
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    #[test]
    fn file_created_documents_are_found_by_cli_literals() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let data = data.to_str().unwrap();
        let file = write(&dir, "alice.json", r#"{"name": "alice", "age": "30"}"#);

        run_command(cli(&["create-collection", "people", "--data-dir", data])).unwrap();
        let file = file.to_str().unwrap();
        run_command(cli(&["create", "-c", "people", "-f", file, "--data-dir", data])).unwrap();

        let gate = AccessGate::new(Database::open(docket_store::StoreConfig::new(data)).unwrap());
        let read = gate.read("people", "age", "30", false).unwrap();
        assert!(!read.response.is_empty());
    }

    #[test]
    fn commands_run_against_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let data = data.to_str().unwrap();
        let file = write(
            &dir,
            "people.json",
            r#"[{"name": "alice", "age": 30}, {"name": "bob", "age": 25}]"#,
        );
        let file = file.to_str().unwrap();

        run_command(cli(&["create-collection", "people", "--data-dir", data])).unwrap();
        run_command(cli(&["create", "-c", "people", "-f", file, "--data-dir", data])).unwrap();
        run_command(cli(&[
            "update", "-c", "people", "-k", "name", "-v", "bob", "--update-key", "age",
            "--update-value", "26", "--data-dir", data,
        ]))
        .unwrap();

        let gate = AccessGate::new(Database::open(docket_store::StoreConfig::new(data)).unwrap());
        let read = gate.read("people", "age", "26", false).unwrap();
        assert!(!read.response.is_empty());

        let users = cli(&["read", "-c", "users", "-k", "a", "-v", "1", "--data-dir", data]);
        assert!(run_command(users).is_err());
        let ghost = cli(&["read", "-c", "ghost", "-k", "a", "-v", "1", "--data-dir", data]);
        assert!(run_command(ghost).is_err());
    }

    #[test]
    fn login_before_bootstrap_points_to_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().to_str().unwrap();
        let err = run_command(cli(&["login", "-u", "root", "-p", "pw", "--data-dir", data]))
            .unwrap_err();
        assert!(err.to_string().contains("docket bootstrap"));
    }

    #[test]
    fn admin_flow() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().to_str().unwrap();
        let run = |args: &[&str]| {
            let mut full = args.to_vec();
            full.extend(["--data-dir", data]);
            run_command(cli(&full))
        };

        assert!(run(&["bootstrap", "-u", "root", "-p", "pw", "--confirm", "nope"]).is_err());
        run(&["bootstrap", "-u", "root", "-p", "pw", "--confirm", "pw"]).unwrap();
        assert!(run(&["bootstrap", "-u", "other", "-p", "x", "--confirm", "x"]).is_err());

        run(&["login", "-u", "root", "-p", "pw"]).unwrap();
        assert!(run(&["login", "-u", "root", "-p", "wrong"]).is_err());

        run(&[
            "create-user", "-u", "root", "-p", "pw", "--new-username", "bob", "--new-password",
            "x", "--confirm", "x",
        ])
        .unwrap();
        assert!(run(&[
            "create-user", "-u", "root", "-p", "pw", "--new-username", "carol", "--new-password",
            "x", "--confirm", "x", "--role", "owner",
        ])
        .is_err());

        run(&["create-collection", "audit"]).unwrap();
        assert!(run(&["delete-collection", "audit", "-u", "bob", "-p", "x"]).is_err());
        run(&["delete-collection", "audit", "-u", "root", "-p", "pw"]).unwrap();
    }
}
