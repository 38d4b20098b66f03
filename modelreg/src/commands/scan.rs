use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color as TableColor, Table};
use serde::Serialize;

use modelreg_build::{DeclShape, RegistryPlan, TypeDeclaration};

use crate::context::{ProjectContext, RegistryOverrides};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    heading: "Inspect",
    lines: &[
        "modelreg scan                        # Classify declarations in the configured directory",
        "modelreg scan --source src/db        # Scan another directory",
        "modelreg --output json scan          # Machine-readable listing",
    ],
}];

#[derive(Args)]
pub struct ScanArgs {
    /// Directory holding the model declarations
    #[arg(long, env = "MODELREG_SOURCE_DIR")]
    pub source: Option<PathBuf>,
}

/// Everything `scan` reports about a directory
#[derive(Serialize)]
struct ScanListing {
    files: usize,
    declarations: Vec<TypeDeclaration>,
    duplicates: Vec<String>,
}

impl From<RegistryPlan> for ScanListing {
    fn from(plan: RegistryPlan) -> Self {
        Self {
            files: plan.files.len(),
            declarations: plan.declarations,
            duplicates: plan.duplicates,
        }
    }
}

pub fn handle_scan(args: ScanArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let overrides = RegistryOverrides {
        source_dir: args.source,
        ..Default::default()
    };
    let generator = ctx.generator(&overrides)?;
    let source = ctx.display_path(generator.source_path());

    let listing = ScanListing::from(
        generator
            .plan()
            .with_context(|| format!("Failed to scan {source}"))?,
    );

    output.heading(&format!("Declarations in {source}"));
    output.display(&listing)?;

    let selected = listing
        .declarations
        .iter()
        .filter(|decl| decl.shape == DeclShape::Record)
        .count();
    output.info(&format!(
        "{selected} of {} declaration(s) in {} file(s) would be registered",
        listing.declarations.len(),
        listing.files
    ));
    for path in &listing.duplicates {
        output.warning(&format!("`{path}` is declared more than once"));
    }
    Ok(())
}

impl TableDisplay for ScanListing {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Name", "Shape", "Registered", "Location"]);

        for decl in &self.declarations {
            let registered = decl.shape == DeclShape::Record;
            let mut flag = Cell::new(if registered { "yes" } else { "no" });
            if !output.options.no_color {
                flag = flag.fg(if registered { TableColor::Green } else { TableColor::DarkGrey });
            }
            table.add_row(vec![
                Cell::new(&decl.name),
                Cell::new(decl.shape),
                flag,
                Cell::new(&decl.position),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        let names: Vec<&str> = self
            .declarations
            .iter()
            .filter(|decl| decl.shape == DeclShape::Record)
            .map(|decl| decl.name.as_str())
            .collect();
        format!("models: {}", names.join(", "))
    }
}
