use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use comfy_table::{Cell, Table};

use modelreg_build::{CheckOutcome, GenerationReport, WriteOutcome};

use crate::context::{ProjectContext, RegistryOverrides};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::{ADDED, REMOVED};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        heading: "Generate",
        lines: &[
            "modelreg generate                                  # Use .modelreg/config.toml",
            "modelreg generate --source src/db --out src/db/models.rs",
            "modelreg generate --namespace crate::entity --collection all_models",
        ],
    },
    ExampleGroup {
        heading: "Preview & CI",
        lines: &[
            "modelreg generate --dry-run      # Print the registry instead of writing it",
            "modelreg generate --check        # Fail if the registry on disk is stale",
        ],
    },
];

#[derive(Args)]
pub struct GenerateArgs {
    /// Directory holding the model declarations
    #[arg(long, env = "MODELREG_SOURCE_DIR")]
    pub source: Option<PathBuf>,

    /// File the registry is written to
    #[arg(long = "out", env = "MODELREG_OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,

    /// Path from the generated module to the scanned package
    #[arg(long)]
    pub namespace: Option<String>,

    /// Name of the generated collection function
    #[arg(long)]
    pub collection: Option<String>,

    /// Print the registry to stdout instead of writing it
    #[arg(long, conflicts_with = "check")]
    pub dry_run: bool,

    /// Exit with an error if the registry on disk is missing or stale
    #[arg(long)]
    pub check: bool,
}

impl GenerateArgs {
    fn overrides(&self) -> RegistryOverrides {
        RegistryOverrides {
            source_dir: self.source.clone(),
            output_file: self.output_file.clone(),
            namespace: self.namespace.clone(),
            collection: self.collection.clone(),
        }
    }
}

pub fn handle_generate(args: GenerateArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let generator = ctx.generator(&args.overrides())?;
    let source = ctx.display_path(generator.source_path());
    let target = ctx.display_path(generator.output_path());

    output.verbose(&format!("Scanning {source}"));

    if args.dry_run {
        let code = generator
            .render()
            .with_context(|| format!("Failed to render registry for {source}"))?;
        print!("{code}");
        return Ok(());
    }

    if args.check {
        let outcome = generator
            .check()
            .with_context(|| format!("Failed to check registry for {source}"))?;
        return report_check(&target, outcome, output);
    }

    let report = generator
        .run()
        .with_context(|| format!("Failed to generate registry from {source}"))?;

    output.heading("Model Registry");
    output.display(&report)?;
    match report.outcome {
        WriteOutcome::Written => output.success(&format!(
            "Generated {target} with {} model(s)",
            report.entries.len()
        )),
        WriteOutcome::Unchanged => output.info(&format!("{target} is already up to date")),
    }
    Ok(())
}

fn report_check(target: &str, outcome: CheckOutcome, output: &OutputManager) -> Result<()> {
    if output.is_json() {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match outcome {
        CheckOutcome::UpToDate => {
            output.success(&format!("{target} is up to date"));
            Ok(())
        }
        CheckOutcome::Missing => {
            output.error(&format!("{target} does not exist"));
            bail!("Registry missing; run 'modelreg generate'")
        }
        CheckOutcome::Stale { on_disk, expected } => {
            output.error(&format!("{target} is out of date"));
            for path in expected.iter().filter(|path| !on_disk.contains(path)) {
                output.indented(ADDED, path);
            }
            for path in on_disk.iter().filter(|path| !expected.contains(path)) {
                output.indented(REMOVED, path);
            }
            bail!("Registry is stale; run 'modelreg generate'")
        }
    }
}

impl TableDisplay for GenerationReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["#", "Model", "Module"]);

        for (index, entry) in self.entries.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(&entry.name),
                Cell::new(entry.module.as_deref().unwrap_or("(root)")),
            ]);
        }

        if self.entries.is_empty() {
            table.add_row(vec![Cell::new("-"), Cell::new("No record types found"), Cell::new("")]);
        }

        table
    }

    fn to_compact(&self) -> String {
        let outcome = match self.outcome {
            WriteOutcome::Written => "written",
            WriteOutcome::Unchanged => "unchanged",
        };
        format!(
            "{} {outcome} models={} declarations={} files={}",
            self.output_file.display(),
            self.entries.len(),
            self.declarations,
            self.files
        )
    }
}
