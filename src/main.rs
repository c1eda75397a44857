use anyhow::Context;
use clap::Parser;
use couchdb_adapter::config::cli::Command;
use couchdb_adapter::utils::{logger, validation::Validate};
use couchdb_adapter::{
    AdapterError, CliConfig, CouchDbAdapter, DbAdapter, Document, Filter, FindParams, Patch,
    SortField,
};
use serde_json::Value;

fn parse_json(what: &str, raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("invalid JSON for {}: {}", what, raw))
}

/// Renames the caller's id field to `_id` so filters address the stored key.
fn parse_filter(raw: &str, id_field: &str) -> anyhow::Result<Filter> {
    let mut value = parse_json("query", raw)?;
    if let Some(map) = value.as_object_mut() {
        if let Some(id) = map.remove(id_field) {
            map.insert("_id".to_string(), id);
        }
    }
    Ok(Filter::try_from(value)?)
}

fn parse_document(raw: &Value, id_field: &str, adapter: &impl DbAdapter) -> anyhow::Result<Document> {
    let doc = Document::try_from(raw.clone())?;
    Ok(adapter.before_save_transform_id(doc, id_field))
}

fn render(adapter: &impl DbAdapter, doc: Document, id_field: &str) -> Value {
    adapter.entity_to_object(adapter.after_retrieve_transform_id(doc, id_field))
}

async fn run(adapter: &CouchDbAdapter, command: Command, id_field: &str) -> anyhow::Result<Value> {
    let output = match command {
        Command::Insert { doc } => {
            let doc = parse_document(&parse_json("document", &doc)?, id_field, adapter)?;
            render(adapter, adapter.insert(doc).await?, id_field)
        }
        Command::InsertMany { docs } => {
            let raw = parse_json("documents", &docs)?;
            let items = raw.as_array().context("insert-many expects a JSON array")?;
            let docs = items
                .iter()
                .map(|item| parse_document(item, id_field, adapter))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let stored = adapter.insert_many(docs).await?;
            Value::Array(stored.into_iter().map(|d| render(adapter, d, id_field)).collect())
        }
        Command::Get { id } => render(adapter, adapter.find_by_id(&id).await?, id_field),
        Command::GetMany { ids } => {
            let docs = adapter.find_by_ids(&ids).await?;
            Value::Array(docs.into_iter().map(|d| render(adapter, d, id_field)).collect())
        }
        Command::Find {
            query,
            limit,
            offset,
            sort,
            fields,
        } => {
            let mut params = FindParams::new(parse_filter(&query, id_field)?);
            params.limit = limit;
            params.offset = offset;
            params.sort = sort.as_deref().map(SortField::parse_list).unwrap_or_default();
            if !fields.is_empty() {
                params.fields = Some(fields);
            }
            let docs = adapter.find(params).await?;
            Value::Array(docs.into_iter().map(|d| render(adapter, d, id_field)).collect())
        }
        Command::FindOne { query } => match adapter.find_one(parse_filter(&query, id_field)?).await? {
            Some(doc) => render(adapter, doc, id_field),
            None => Value::Null,
        },
        Command::Count { query } => {
            let count = adapter.count(parse_filter(&query, id_field)?.into()).await?;
            Value::from(count)
        }
        Command::Update { id, patch } => {
            let patch = Patch::try_from(parse_json("patch", &patch)?)?;
            render(adapter, adapter.update_by_id(&id, patch).await?, id_field)
        }
        Command::UpdateMany { query, patch } => {
            let patch = Patch::try_from(parse_json("patch", &patch)?)?;
            let count = adapter.update_many(parse_filter(&query, id_field)?, patch).await?;
            Value::from(count)
        }
        Command::Remove { id } => render(adapter, adapter.remove_by_id(&id).await?, id_field),
        Command::RemoveMany { query } => {
            Value::from(adapter.remove_many(parse_filter(&query, id_field)?).await?)
        }
        Command::Clear => Value::from(adapter.clear().await?),
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let config = cli.resolve()?;
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let mut adapter = CouchDbAdapter::new(
        Some(config.connection.uri()),
        config.connection.options.clone(),
    )?;
    adapter.init(&config.service)?;
    adapter.connect().await?;

    let result = run(&adapter, cli.command, config.service.id_field()).await;
    adapter.disconnect().await?;

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Command failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            let exit_code = match e.downcast_ref::<AdapterError>() {
                Some(AdapterError::NotFound { .. }) => 2,
                Some(AdapterError::Conflict { .. }) => 3,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}
