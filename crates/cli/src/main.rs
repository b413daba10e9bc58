// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `docctl`: the operator-facing CLI for the document execution core.
//! `run` submits a document to a `docd` inbox; `show` prints a persisted
//! `DocumentState` back out. Ambient surface only — the supervisor
//! (`docd`) and its worker (`doc-worker`) are the production binaries.

mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use doc_adapters::EnvParameterStore;
use doc_agent::AgentConfig;
use doc_core::{
    Clock, CommandId, DocumentInformation, DocumentState, DocumentType as CoreDocumentType, InstanceId, IoConfig,
    MessageId, ProcInfo, SchemaVersion, Status, SystemClock,
};
use doc_parser::{DocumentContent, DocumentParserInfo, ParameterValue};
use doc_storage::{DocumentStore, FileDocumentStore};
use indexmap::IndexMap;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "docctl", version = env!("BUILD_GIT_HASH"), about = "Operate the document execution core")]
struct Cli {
    /// Path to the docd.toml config this operation should read (orchestration
    /// root, inbox, IPC root). Missing file falls back to production defaults.
    #[arg(long, global = true, default_value = "docd.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentTypeArg {
    SendCommand,
    CancelCommand,
    Association,
    StartSession,
    SendCommandOffline,
    CancelCommandOffline,
}

impl From<DocumentTypeArg> for CoreDocumentType {
    fn from(value: DocumentTypeArg) -> Self {
        match value {
            DocumentTypeArg::SendCommand => CoreDocumentType::SendCommand,
            DocumentTypeArg::CancelCommand => CoreDocumentType::CancelCommand,
            DocumentTypeArg::Association => CoreDocumentType::Association,
            DocumentTypeArg::StartSession => CoreDocumentType::StartSession,
            DocumentTypeArg::SendCommandOffline => CoreDocumentType::SendCommandOffline,
            DocumentTypeArg::CancelCommandOffline => CoreDocumentType::CancelCommandOffline,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a document file and drop it into the configured inbox for `docd`.
    Run {
        /// Path to a document body (`.json`, `.yaml`, or `.yml`).
        document: PathBuf,
        #[arg(long, value_enum, default_value = "send-command")]
        document_type: DocumentTypeArg,
        #[arg(long)]
        instance_id: Option<String>,
        #[arg(long)]
        document_name: Option<String>,
        #[arg(long, default_value = "1")]
        document_version: String,
        /// A `KEY=VALUE` string parameter; may be repeated.
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// A `KEY=a,b,c` string-list parameter; may be repeated.
        #[arg(long = "param-list", value_name = "KEY=A,B,C")]
        param_lists: Vec<String>,
    },
    /// Print a persisted `DocumentState`.
    Show {
        instance_id: String,
        document_id: String,
        #[arg(long, value_enum, default_value = "summary")]
        format: OutputFormat,
    },
}

fn load_config(path: &Path) -> AgentConfig {
    AgentConfig::load(path).unwrap_or_default()
}

fn parse_supplied_parameters(
    params: &[String],
    param_lists: &[String],
) -> Result<IndexMap<String, ParameterValue>, CliError> {
    let mut supplied = IndexMap::new();
    for entry in params {
        let (key, value) = entry.split_once('=').ok_or_else(|| CliError::MalformedParam(entry.clone()))?;
        supplied.insert(key.to_string(), ParameterValue::String(value.to_string()));
    }
    for entry in param_lists {
        let (key, value) = entry.split_once('=').ok_or_else(|| CliError::MalformedParam(entry.clone()))?;
        let items = value.split(',').map(str::to_string).collect();
        supplied.insert(key.to_string(), ParameterValue::StringList(items));
    }
    Ok(supplied)
}

fn load_document_content(path: &Path) -> Result<DocumentContent, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadDocument { path: path.to_path_buf(), source })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(DocumentContent::from_json(&raw)?),
        Some("yaml") | Some("yml") => Ok(DocumentContent::from_yaml(&raw)?),
        other => Err(CliError::UnknownExtension(other.unwrap_or("").to_string())),
    }
}

async fn run_command(
    config: &AgentConfig,
    document: PathBuf,
    document_type: DocumentTypeArg,
    instance_id: Option<String>,
    document_name: Option<String>,
    document_version: String,
    params: Vec<String>,
    param_lists: Vec<String>,
) -> Result<DocumentState, CliError> {
    let content = load_document_content(&document)?;
    let supplied = parse_supplied_parameters(&params, &param_lists)?;

    let document_id = doc_core::DocumentId::new();
    let instance_id = instance_id.map(InstanceId::from_string).unwrap_or_else(InstanceId::new);
    let message_id = MessageId::new();

    let parser_info = DocumentParserInfo {
        orchestration_directory: format!("{}/{}", config.orchestration_root.display(), document_id),
        output_s3_bucket_name: String::new(),
        output_s3_key_prefix: format!("docs/{document_id}"),
        message_id,
        document_id,
        default_working_directory: config.orchestration_root.display().to_string(),
        cloud_watch_log_group: None,
        cloud_watch_stream_prefix: None,
    };

    let parameter_store = EnvParameterStore::default();
    let plugins = doc_parser::parse_document(&content, &parser_info, &supplied, &parameter_store).await?;

    let document_name = document_name.unwrap_or_else(|| {
        document.file_stem().and_then(|s| s.to_str()).unwrap_or("document").to_string()
    });

    let state = DocumentState {
        information: DocumentInformation {
            document_id,
            command_id: CommandId::new(),
            association_id: None,
            instance_id,
            message_id,
            run_id: doc_core::RunId::new(),
            created_date: SystemClock.epoch_ms(),
            document_name,
            document_version,
            document_status: Status::Pending,
            run_count: 0,
            proc_info: ProcInfo::default(),
        },
        document_type: document_type.into(),
        schema_version: SchemaVersion::parse(&content.schema_version)?,
        plugins,
        cancel_information: None,
        io_config: IoConfig {
            orchestration_directory: parser_info.orchestration_directory,
            output_s3_bucket_name: parser_info.output_s3_bucket_name,
            output_s3_key_prefix: parser_info.output_s3_key_prefix,
            cloud_watch_log_group: None,
            cloud_watch_stream_prefix: None,
        },
    };

    write_to_inbox(&config.inbox_root, &state).await?;
    Ok(state)
}

async fn write_to_inbox(inbox_root: &Path, state: &DocumentState) -> Result<(), CliError> {
    tokio::fs::create_dir_all(inbox_root)
        .await
        .map_err(|source| CliError::WriteInbox { path: inbox_root.to_path_buf(), source })?;

    let file_name = format!("{}-{}.json", state.information.created_date, state.information.document_id);
    let dest = inbox_root.join(&file_name);
    let body = serde_json::to_vec_pretty(state)?;
    tokio::fs::write(&dest, &body).await.map_err(|source| CliError::WriteInbox { path: dest, source })?;
    Ok(())
}

async fn show_command(config: &AgentConfig, instance_id: String, document_id: String, format: OutputFormat) -> Result<DocumentState, CliError> {
    let store = FileDocumentStore::new(config.orchestration_root.clone());
    let state = store
        .load(&InstanceId::from_string(instance_id), &doc_core::DocumentId::from_string(document_id))
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
        OutputFormat::Summary => {
            println!("document:  {}", state.information.document_id);
            println!("status:    {}", state.information.document_status);
            println!("run count: {}", state.information.run_count);
            for plugin in &state.plugins {
                println!("  - {}: {}", plugin.plugin_id(), plugin.status());
            }
        }
    }
    Ok(state)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli.config);

    let result = match cli.command {
        Command::Run { document, document_type, instance_id, document_name, document_version, params, param_lists } => {
            run_command(&config, document, document_type, instance_id, document_name, document_version, params, param_lists)
                .await
                .map(|state| println!("submitted document {} for instance {}", state.information.document_id, state.information.instance_id))
        }
        Command::Show { instance_id, document_id, format } => {
            show_command(&config, instance_id, document_id, format).await.map(|_| ())
        }
    };

    if let Err(e) = result {
        eprintln!("docctl: {e}");
        std::process::exit(1);
    }
}
