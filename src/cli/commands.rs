//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::tree_view::TreeNodeConvert;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::RunStatistics;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Build {
            root,
            output,
            workers,
        }) => cmd_build(cli, root.as_deref(), output.as_deref(), *workers),
        Some(Commands::Rename { file }) => cmd_rename(cli, file.as_deref()),
        Some(Commands::Tree { root, clusters }) => cmd_tree(cli, root.as_deref(), *clusters),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see `clustermap --help`".into(),
        )),
    }
}

/// Root directory: explicit argument, then `-C`, then cwd.
fn resolve_root(cli: &Cli, root: Option<&Path>) -> CliResult<PathBuf> {
    match root.or(cli.project_dir.as_deref()) {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

fn load_settings(root: &Path) -> CliResult<Settings> {
    Ok(Settings::load(Some(root))?)
}

#[instrument(skip(cli))]
fn cmd_build(
    cli: &Cli,
    root: Option<&Path>,
    output_file: Option<&Path>,
    workers: Option<usize>,
) -> CliResult<()> {
    let root = resolve_root(cli, root)?;
    let mut settings = load_settings(&root)?;
    if let Some(path) = output_file {
        settings.output_file = path.to_path_buf();
    }
    if let Some(n) = workers {
        settings.workers = n;
    }
    let base = settings.base_path(&root);
    let out = settings.output_path(&root);
    debug!("cmd_build: base={} out={}", base.display(), out.display());

    let container = ServiceContainer::new(settings);
    let assembler = container.assembler();
    let document = assembler.assemble(&base)?;
    assembler.save(&document, &out)?;

    print_statistics(&document.statistics);
    output::field("Total keywords", 18, &document.total_keywords());
    output::success(&format!("Output written to {}", out.display()));
    Ok(())
}

fn print_statistics(stats: &RunStatistics) {
    output::header("Processing Statistics");
    output::field("Total files", 18, &stats.total_files);
    output::field("Processed files", 18, &stats.processed_files);
    output::field("Error files", 18, &stats.error_files);
    output::field("Success rate", 18, &stats.success_rate);
    if stats.error_files > 0 {
        output::warning(&format!(
            "{} files yielded no keywords, run with -d for details",
            stats.error_files
        ));
    }
    output::header("Structure Variations");
    for variation in &stats.structure_variations {
        output::info(&format!("  {variation}"));
    }
}

#[instrument(skip(cli))]
fn cmd_rename(cli: &Cli, file: Option<&Path>) -> CliResult<()> {
    let root = resolve_root(cli, None)?;
    let settings = load_settings(&root)?;
    let path = match file {
        Some(f) => f.to_path_buf(),
        None => settings.output_path(&root),
    };

    let container = ServiceContainer::new(settings);
    if !container.fs.is_file(&path) {
        return Err(CliError::InvalidArgs(format!(
            "output file not found: {}",
            path.display()
        )));
    }
    let count = container.renamer().rename_file(&path)?;
    output::success(&format!("Renamed {} values in {}", count, path.display()));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, root: Option<&Path>, clusters: bool) -> CliResult<()> {
    let root = resolve_root(cli, root)?;
    let settings = load_settings(&root)?;
    let base = settings.base_path(&root);

    let container = ServiceContainer::new(settings);
    let document = container.assembler().assemble(&base)?;
    output::info(&document.to_tree_string(clusters));
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let root = resolve_root(cli, None)?;
            let settings = load_settings(&root)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::warning("no config directory for this platform"),
            }
            let root = resolve_root(cli, None)?;
            output::info(&format!("local:  {}", local_config_path(&root).display()));
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
