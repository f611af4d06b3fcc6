//! Command dispatch: each subcommand loads a report and prints through `output`

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::{Report, ScanOutcome};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_dir, global_config_path, local_config_path, Settings};
use crate::domain::{CodedConcept, Node, NodeId, Payload, SearchCriteria, ValueType};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::tree_traits::{node_line, TreeNodeConvert};
use crate::util::path::{normalize_path_separator, relative_to, PathExt};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    match command {
        Commands::Completion { shell } => return _completion(*shell),
        Commands::Config { command } => return _config(cli, command),
        _ => {}
    }

    let container = ServiceContainer::new(load_settings(cli)?);
    output::configure(container.settings.display.color);

    match command {
        Commands::Tree { file } => _tree(&container, cli.format, file),
        Commands::Search { file, term, tree } => {
            let selection = Selection::Text(term.clone());
            _list(&container, cli.format, file, &selection, *tree)
        }
        Commands::FindType { file, .. }
        | Commands::FindRel { file, .. }
        | Commands::Query { file, .. } => {
            let selection = Selection::from_command(command)
                .ok_or_else(|| CliError::Usage("not a listing command".into()))?;
            _list(&container, cli.format, file, &selection, false)
        }
        Commands::Show { file, id } => _show(&container, cli.format, file, id),
        Commands::Scan { dir } => _scan(&container, dir.as_deref()),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

/// Node selection made by the listing commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `search`: value contains text
    Text(String),
    /// `find-type`: value type equals
    Type(String),
    /// `find-rel`: relationship equals
    Relationship(String),
    /// `query`: combined criteria
    Criteria(SearchCriteria),
}

impl Selection {
    /// Selection for `search`, `find-type`, `find-rel` and `query`, `None` otherwise.
    pub fn from_command(command: &Commands) -> Option<Self> {
        match command {
            Commands::Search { term, .. } => Some(Selection::Text(term.clone())),
            Commands::FindType { value_type, .. } => Some(Selection::Type(value_type.clone())),
            Commands::FindRel { relationship, .. } => {
                Some(Selection::Relationship(relationship.clone()))
            }
            Commands::Query {
                text,
                value_type,
                relationship,
                ..
            } => {
                let mut criteria = SearchCriteria::new();
                if let Some(text) = text {
                    criteria = criteria.with_text(text.as_str());
                }
                if let Some(value_type) = value_type {
                    criteria = criteria.with_type(value_type.as_str());
                }
                if let Some(relationship) = relationship {
                    criteria = criteria.with_relationship(relationship.as_str());
                }
                Some(Selection::Criteria(criteria))
            }
            _ => None,
        }
    }

    /// Run the selection against a report, in document order.
    pub fn apply<'a>(&self, report: &'a Report) -> CliResult<Vec<&'a Node>> {
        let engine = report.search();
        let nodes = match self {
            Selection::Text(term) => engine.search_text(term)?,
            Selection::Type(value_type) => engine.search_by_type(value_type),
            Selection::Relationship(relationship) => engine.search_by_relationship(relationship),
            Selection::Criteria(criteria) => engine.advanced_search(criteria),
        };
        Ok(nodes)
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    let settings = Settings::load(Some(&dir))?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

/// Flat view of a node for list output, children reduced to a count.
#[derive(Serialize)]
struct NodeSummary<'a> {
    id: NodeId,
    value_type: &'a ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    concept_name: Option<&'a CodedConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relationship: Option<&'a str>,
    payload: &'a Payload,
    children: usize,
}

impl<'a> From<&'a Node> for NodeSummary<'a> {
    fn from(node: &'a Node) -> Self {
        Self {
            id: node.id,
            value_type: &node.value_type,
            concept_name: node.concept_name.as_ref(),
            value: node.value.as_deref(),
            relationship: node.relationship.as_deref(),
            payload: &node.payload,
            children: node.children.len(),
        }
    }
}

fn print_json(value: &impl Serialize) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Usage(format!("cannot serialize output: {e}")))?;
    output::info(&json);
    Ok(())
}

fn print_report_header(report: &Report) {
    output::header(&report.source.display());
    let patient = [
        report.info.patient_name.as_deref(),
        report.info.patient_id.as_deref(),
        report.info.modality.as_deref(),
    ]
    .into_iter()
    .flatten()
    .join(" | ");
    if !patient.is_empty() {
        output::detail(&patient);
    }
}

fn print_nodes(
    container: &ServiceContainer,
    format: OutputFormat,
    nodes: &[&Node],
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let summaries: Vec<NodeSummary> =
                nodes.iter().map(|n| NodeSummary::from(*n)).collect();
            print_json(&summaries)?;
        }
        OutputFormat::Text => {
            for node in nodes {
                output::info(&node_line(node, &container.settings.display));
            }
        }
    }
    output::status(nodes.len());
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, format: OutputFormat, file: &Path) -> CliResult<()> {
    let report = container.report_service().open(file)?;
    match format {
        OutputFormat::Json => print_json(&report.root),
        OutputFormat::Text => {
            print_report_header(&report);
            output::info(&report.root.to_tree_string(&container.settings.display));
            Ok(())
        }
    }
}

#[instrument(skip(container))]
fn _list(
    container: &ServiceContainer,
    format: OutputFormat,
    file: &Path,
    selection: &Selection,
    highlight_tree: bool,
) -> CliResult<()> {
    let report = container.report_service().open(file)?;
    let results = selection.apply(&report)?;

    if highlight_tree && format == OutputFormat::Text {
        let highlight: HashSet<NodeId> = results.iter().map(|n| n.id).collect();
        print_report_header(&report);
        output::info(
            &report
                .root
                .to_highlighted_tree(&container.settings.display, &highlight),
        );
        output::status(results.len());
        return Ok(());
    }
    print_nodes(container, format, &results)
}

#[instrument(skip(container))]
fn _show(container: &ServiceContainer, format: OutputFormat, file: &Path, id: &str) -> CliResult<()> {
    let id: NodeId = id
        .parse()
        .map_err(|_| CliError::InvalidArgs(format!("not a node id: {id}")))?;
    let report = container.report_service().open(file)?;
    let node = report.search().find_by_id(id)?;

    if format == OutputFormat::Json {
        return print_json(&NodeSummary::from(node));
    }

    output::header(&format!("Node {}", node.id));
    output::field("Type", &node.value_type);
    output::field("Value", node.value.as_deref().unwrap_or("-"));
    output::field("Relationship", node.relationship.as_deref().unwrap_or("-"));
    if let Some(concept) = &node.concept_name {
        output::field("Concept", concept);
    }
    match &node.payload {
        Payload::None => {}
        Payload::Code(code) => output::field("Code", code),
        Payload::Measurement { numeric, unit } => {
            output::field("Numeric", numeric);
            if let Some(unit) = unit {
                output::field("Unit", unit);
            }
        }
        Payload::Reference(reference) => {
            output::field("SOP Class", reference.class_uid.as_deref().unwrap_or("-"));
            output::field(
                "SOP Instance",
                reference.instance_uid.as_deref().unwrap_or("-"),
            );
        }
    }
    output::field("Children", &node.children.len());
    if !node.is_leaf() {
        output::field(
            "Child ids",
            &node.children.iter().map(|c| c.id).join(", "),
        );
    }
    Ok(())
}

#[instrument(skip(container))]
fn _scan(container: &ServiceContainer, dir: Option<&Path>) -> CliResult<()> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => match &container.settings.scan_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .map_err(|e| InfraError::io("determine current directory", e))?,
        },
    };

    let entries = container.report_service().scan(&dir)?;
    output::header(&format!("Scanning {}", dir.display()));
    let mut reports = 0;
    for entry in &entries {
        let name =
            normalize_path_separator(&relative_to(&dir, &entry.path).to_string_lossy_owned());
        match &entry.outcome {
            ScanOutcome::Report { nodes } => {
                reports += 1;
                output::detail(&format!("{} ({} nodes)", name, nodes));
            }
            ScanOutcome::NotStructuredReport => {
                output::failure(&format!("{}: not a structured report", name))
            }
            ScanOutcome::Failed(reason) => {
                output::failure(&format!("{}: {}", name, reason))
            }
        }
    }
    output::success(&format!(
        "{} of {} documents are structured reports",
        reports,
        entries.len()
    ));
    Ok(())
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let dir = config_dir(cli)?;
            match global_config_path() {
                Some(path) => output::field("Global", &path.display()),
                None => output::field("Global", "(no home directory)"),
            }
            output::field("Local", &local_config_path(&dir).display());
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                let dir = global_config_dir().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?;
                dir.join("srview.toml")
            } else {
                local_config_path(&config_dir(cli)?)
            };
            init_config(&path)
        }
    }
}

fn init_config(path: &Path) -> CliResult<()> {
    let fs = RealFileSystem;
    if fs.exists(path) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
    fs.write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::action("Created", &path.display());
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
