//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::style;
use pyforge_config::Config;
use pyforge_events::{FailureContext, RunSummary};
use pyforge_types::{builtin_preset_names, human_size};
use std::collections::BTreeMap;
use std::io;

/// Output renderer for final results
///
/// In JSON mode the run-level terminal event has already been streamed
/// as a JSON line, so the outcome renderers print nothing more.
#[derive(Clone)]
pub struct OutputRenderer {
    json_output: bool,
    colors: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, colors: bool) -> Self {
        Self {
            json_output,
            colors,
        }
    }

    /// Render the summary of a completed run.
    pub fn render_summary(&self, summary: &RunSummary) {
        if self.json_output {
            return;
        }

        println!();
        let headline = format!("Project created at {}", summary.project_path.display());
        if self.colors {
            println!("{}", style(headline).green().bold());
        } else {
            println!("{headline}");
        }

        if !summary.installed_packages.is_empty() {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("Package").add_attribute(Attribute::Bold),
                Cell::new("Version").add_attribute(Attribute::Bold),
            ]);
            for package in &summary.installed_packages {
                let version = package
                    .resolved_version
                    .clone()
                    .or_else(|| package.spec.constraint.as_ref().map(ToString::to_string))
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![Cell::new(&package.spec.name), Cell::new(version)]);
            }
            println!("{table}");
        }

        if let Some(size) = summary.project_size {
            println!("Project size: {}", human_size(size));
        }
        if summary.git_initialized {
            println!("Git repository initialized");
        }
        println!(
            "Finished in {:.1}s ({} steps)",
            summary.duration.as_secs_f64(),
            summary.completed_steps.len()
        );
    }

    /// Render the terminal failure of a run.
    pub fn render_failure(&self, failure: &FailureContext, cleanup_performed: bool) {
        if self.json_output {
            return;
        }

        eprintln!();
        let headline = format!("Project creation failed: {}", failure.message);
        if self.colors {
            eprintln!("{}", style(headline).red().bold());
        } else {
            eprintln!("{headline}");
        }
        if let Some(hint) = &failure.hint {
            eprintln!("  hint: {hint}");
        }
        if cleanup_performed {
            eprintln!("Partial project was removed.");
        }
    }

    /// Render a cancelled run.
    pub fn render_cancelled(&self, cleanup_performed: bool) {
        if self.json_output {
            return;
        }

        eprintln!();
        eprintln!("Project creation cancelled.");
        if cleanup_performed {
            eprintln!("Partial project was removed.");
        }
    }

    /// Render the preset catalog: built-ins plus user-defined presets
    /// from the configuration, user definitions shadowing built-ins.
    pub fn render_presets(&self, config: &Config) -> io::Result<()> {
        let mut names: Vec<String> = builtin_preset_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        for name in config.presets.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names.sort();

        if self.json_output {
            let mut catalog: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for name in &names {
                if let Some(packages) = config.resolve_preset(name) {
                    catalog.insert(name.clone(), packages);
                }
            }
            let json = serde_json::to_string_pretty(&catalog).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Preset").add_attribute(Attribute::Bold),
            Cell::new("Packages").add_attribute(Attribute::Bold),
        ]);
        for name in &names {
            if let Some(packages) = config.resolve_preset(name) {
                let label = if config.presets.contains_key(name) {
                    format!("{name} (user)")
                } else {
                    name.clone()
                };
                table.add_row(vec![Cell::new(label), Cell::new(packages.join(", "))]);
            }
        }
        println!("{table}");
        Ok(())
    }
}
