//! Command dispatch
//!
//! Mutations go through the transport facade so the CLI answers exactly like
//! the HTTP endpoints would; read commands use the query facade directly.

use std::io::Read;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::api::{CategoryResponse, OrderAction, UpdateOrderRequest};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{label, TreeNodeConvert};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{CategoryTree, ReorderItem, TermId};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Completion { shell } => cmd_completion(*shell),
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Tree { json } => cmd_tree(&container(cli)?, *json),
        Commands::Roots { json } => cmd_roots(&container(cli)?, *json),
        Commands::Childless { roots, json } => cmd_childless(&container(cli)?, *roots, *json),
        Commands::Snapshot => cmd_snapshot(&container(cli)?),
        Commands::Move {
            id,
            direction,
            json,
        } => apply(
            &container(cli)?,
            &UpdateOrderRequest::new(*id, (*direction).into()),
            *json,
        ),
        Commands::SetOrder { id, order, json } => apply(
            &container(cli)?,
            &UpdateOrderRequest::new(*id, OrderAction::SetOrder).with_new_order(*order),
            *json,
        ),
        Commands::SetParent { id, parent, json } => apply(
            &container(cli)?,
            &UpdateOrderRequest::new(*id, OrderAction::SetParent).with_new_parent(*parent),
            *json,
        ),
        Commands::Position { id, value, clear } => {
            cmd_position(&container(cli)?, *id, value.as_deref(), *clear)
        }
        Commands::Update { request } => {
            let response = container(cli)?.api().update_order_json(request);
            finish(response, true, "")
        }
        Commands::Bulk { file } => cmd_bulk(&container(cli)?, file),
    }
}

/// Settings with `--store` applied; its directory also selects the local config.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let store_dir = cli
        .store
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty());
    let mut settings = Settings::load(store_dir)?;
    if let Some(store) = &cli.store {
        settings.store_path = store.clone();
    }
    debug!("store: {}", settings.store_path.display());
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?))
}

/// Print a facade response; unsuccessful responses become errors.
fn finish(response: CategoryResponse, json: bool, done: &str) -> CliResult<()> {
    if json {
        output::info(&serde_json::to_string_pretty(&response)?);
    }
    if !response.success {
        return Err(CliError::Request {
            status: response.status,
            message: response.message.unwrap_or_default(),
        });
    }
    if !json {
        output::success(done);
        let tree = CategoryTree::from(response.categories.unwrap_or_default());
        output::info(&tree.to_tree_string());
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn apply(container: &ServiceContainer, request: &UpdateOrderRequest, json: bool) -> CliResult<()> {
    let response = container.api().update_order(request);
    let done = format!("{} {}", request.action, request.category_id);
    finish(response, json, &done)
}

fn cmd_tree(container: &ServiceContainer, json: bool) -> CliResult<()> {
    if json {
        return finish(container.api().get_categories(false), true, "");
    }
    let tree = container.query_service().get_tree()?;
    output::info(&tree.to_tree_string());
    Ok(())
}

fn cmd_roots(container: &ServiceContainer, json: bool) -> CliResult<()> {
    if json {
        return finish(container.api().get_categories(true), true, "");
    }
    let roots = container.query_service().get_root_categories()?;
    if roots.is_empty() {
        output::none("No categories");
    }
    for node in &roots {
        output::category(&label(node), node.is_childless);
    }
    Ok(())
}

fn cmd_childless(container: &ServiceContainer, roots_only: bool, json: bool) -> CliResult<()> {
    let queries = container.query_service();
    if roots_only {
        let nodes = queries.get_childless_roots()?;
        if json {
            output::info(&serde_json::to_string_pretty(&nodes)?);
        } else {
            nodes.iter().for_each(|n| output::info(&label(n)));
        }
        return Ok(());
    }

    let ids = queries.get_childless_ids()?;
    if json {
        output::info(&serde_json::to_string(&ids)?);
    } else {
        ids.iter().for_each(|id| output::info(id));
    }
    Ok(())
}

fn cmd_snapshot(container: &ServiceContainer) -> CliResult<()> {
    let snapshot = container.query_service().snapshot()?;
    output::info(&serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn cmd_position(
    container: &ServiceContainer,
    id: TermId,
    value: Option<&str>,
    clear: bool,
) -> CliResult<()> {
    if value.is_none() && !clear {
        match container.query_service().get_position(id)? {
            Some(position) => output::info(&position),
            None => output::none("(none)"),
        }
        return Ok(());
    }

    let request =
        UpdateOrderRequest::new(id, OrderAction::SetPosition).with_position(value.unwrap_or(""));
    let response = container.api().update_order(&request);
    let done = match value {
        Some(v) => format!("position of {} set to {}", id, v),
        None => format!("position of {} cleared", id),
    };
    finish(response, false, &done)
}

fn cmd_bulk(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let content = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| InfraError::io("reading stdin", e))?;
        buf
    } else {
        std::fs::read_to_string(file)
            .map_err(|e| InfraError::io(format!("reading {}", file.display()), e))?
    };

    let items: Vec<ReorderItem> = serde_json::from_str(&content)
        .map_err(|e| CliError::InvalidArgs(format!("bulk input is not a reorder list: {}", e)))?;
    let response = container.api().bulk_reorder(&items);
    finish(response, false, &format!("bulk reorder of {} items", items.len()))
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let settings = load_settings(cli)?;
            match global_config_path() {
                Some(path) => output::labelled("global", &path.display()),
                None => output::warning("no home directory; global config disabled"),
            }
            if let Some(dir) = settings.store_dir() {
                output::labelled("local", &local_config_path(dir).display());
            }
            output::labelled("store", &settings.store_path.display());
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::InvalidArgs("cannot determine global config directory".into())
                })?
            } else {
                let settings = load_settings(cli)?;
                let dir = settings.store_dir().ok_or_else(|| {
                    CliError::InvalidArgs("store path has no parent directory".into())
                })?;
                local_config_path(dir)
            };
            if path.exists() {
                return Err(CliError::InvalidArgs(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("creating {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("writing {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}
