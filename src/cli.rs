//! Command line interface: check, dump and watch PPDE files.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::cache::{PpdExtRegistry, PpdExtWatcher};
use crate::ppde::{compile_file, Diagnostic, PpdExtRules};
use crate::printer::{
    default_dictionary, load_capabilities, load_dictionary, CapabilitySet, PrinterOptions,
};
use crate::settings::{resolve_settings, CompilerSettings};

#[derive(Parser, Debug)]
#[command(name = "ppdext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Compiler settings file (defaults to the per-user config, then built-ins)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile PPDE files or directories and report dropped lines
    Check {
        /// Files or directories (searched recursively for .ppde files)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Capability set (JSON) to resolve cost conditions against
        #[arg(short, long)]
        capabilities: Option<PathBuf>,
    },

    /// Compile one PPDE file and print the result as JSON
    Dump {
        file: PathBuf,

        /// Capability set (JSON) to resolve cost conditions against
        #[arg(short, long)]
        capabilities: Option<PathBuf>,

        /// Attribute dictionary (TOML) used by --merge
        #[arg(short, long)]
        dictionary: Option<PathBuf>,

        /// Print the printer options after injecting the rules
        #[arg(short, long)]
        merge: bool,
    },

    /// Load a directory of PPDE files and recompile them as they change
    Watch {
        dir: PathBuf,

        /// Capability set (JSON) to resolve cost conditions against
        #[arg(short, long)]
        capabilities: Option<PathBuf>,
    },
}

pub fn execute(cli: Cli) -> Result<()> {
    let settings = resolve_settings(cli.settings.as_deref())?;

    match cli.command {
        Command::Check {
            paths,
            capabilities,
        } => check(&paths, settings, capabilities_or_empty(capabilities.as_deref())?),
        Command::Dump {
            file,
            capabilities,
            dictionary,
            merge,
        } => {
            let caps = capabilities_or_empty(capabilities.as_deref())?;
            dump(&file, &settings, &caps, dictionary.as_deref(), merge)
        }
        Command::Watch { dir, capabilities } => {
            watch(&dir, settings, capabilities_or_empty(capabilities.as_deref())?)
        }
    }
}

fn capabilities_or_empty(path: Option<&Path>) -> Result<CapabilitySet> {
    match path {
        Some(path) => load_capabilities(path),
        None => Ok(CapabilitySet::new()),
    }
}

fn check(paths: &[PathBuf], settings: CompilerSettings, caps: CapabilitySet) -> Result<()> {
    let registry = PpdExtRegistry::new(settings, caps);
    for path in paths {
        if path.is_dir() {
            registry.load_dir(path)?;
        } else {
            registry.load_file(path)?;
        }
    }

    let diagnostics = registry.diagnostics();
    for diag in &diagnostics {
        println!("{diag}");
    }
    if !diagnostics.is_empty() {
        bail!(
            "{} line(s) dropped in {} file(s)",
            diagnostics.len(),
            registry.len()
        );
    }
    println!("{} file(s) ok", registry.len());
    Ok(())
}

#[derive(Serialize)]
struct MergedDump<'a> {
    options: &'a PrinterOptions,
    diagnostics: &'a [Diagnostic],
}

fn dump(
    file: &Path,
    settings: &CompilerSettings,
    caps: &CapabilitySet,
    dictionary: Option<&Path>,
    merge: bool,
) -> Result<()> {
    let rules: PpdExtRules = compile_file(file, settings, caps)?;

    let json = if merge {
        let dictionary = match dictionary {
            Some(path) => load_dictionary(path)?,
            None => default_dictionary(),
        };
        let mut options = PrinterOptions::new();
        let diagnostics = rules.inject_into(&mut options, &dictionary);
        serde_json::to_string_pretty(&MergedDump {
            options: &options,
            diagnostics: &diagnostics,
        })?
    } else {
        serde_json::to_string_pretty(&rules)?
    };

    println!("{json}");
    Ok(())
}

fn watch(dir: &Path, settings: CompilerSettings, caps: CapabilitySet) -> Result<()> {
    let registry = Arc::new(PpdExtRegistry::new(settings, caps));
    let watcher = PpdExtWatcher::new(registry);
    watcher.start_watching(dir)?;
    info!(
        "{} PPDE file(s) loaded, watching for changes (Ctrl-C to stop)",
        watcher.registry().len()
    );

    loop {
        std::thread::park();
    }
}
