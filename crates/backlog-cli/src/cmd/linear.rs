use crate::output::print_json;
use anyhow::Context;
use backlog_core::{
    config::Config,
    migration::Migration,
    tracker::{PromptTracker, DEFAULT_WORKSPACE},
};
use clap::Subcommand;
use std::io::{BufRead, Write};
use std::path::Path;

#[derive(Subcommand)]
pub enum LinearSubcommand {
    /// Migrate epics and backlog features to Linear
    Migrate {
        /// Linear workspace name
        #[arg(long, default_value = DEFAULT_WORKSPACE)]
        workspace: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Check the last migration report against Linear
    Verify {
        /// Linear workspace name
        #[arg(long, default_value = DEFAULT_WORKSPACE)]
        workspace: String,
    },
}

pub fn run(root: &Path, subcmd: LinearSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        LinearSubcommand::Migrate { workspace, yes } => migrate(root, &workspace, yes, json),
        LinearSubcommand::Verify { workspace } => verify(root, &workspace, json),
    }
}

/// Prompts go to stdout, or to stderr when stdout carries JSON.
fn prompt_tracker(workspace: &str, json: bool) -> PromptTracker<Box<dyn Write>> {
    let out: Box<dyn Write> = if json {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };
    PromptTracker::new(out, workspace)
}

fn confirm() -> anyhow::Result<bool> {
    println!("🔄 Starting migration to Linear...");
    println!("\n⚠️  IMPORTANT: Make sure you have:");
    println!("1. Linear MCP installed and connected");
    println!("2. Linear workspace created");
    println!("3. Team access configured");
    print!("\nProceed with migration? (y/N): ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn migrate(root: &Path, workspace: &str, yes: bool, json: bool) -> anyhow::Result<()> {
    if !yes && !confirm()? {
        println!("Migration cancelled");
        return Ok(());
    }

    let layout = Config::load(root).context("failed to load config")?.layout(root);
    let mut migration = Migration::new(&layout);
    let mut tracker = prompt_tracker(workspace, json);

    if !json {
        println!("🚀 Starting Linear migration...");
        migration.echo_to(|line| println!("📝 {line}"));
    }
    let report = migration
        .run(&mut tracker)
        .context("migration failed")?;

    let Some(report) = report else {
        if json {
            return print_json(&serde_json::json!({ "migrated": false }));
        }
        println!("❌ No backlog data found. Run this from project root.");
        return Ok(());
    };

    if json {
        return print_json(&report);
    }

    println!("\n🎉 Migration Summary:");
    println!("✅ Epics migrated: {}", report.migrated_epics);
    println!("✅ Features migrated: {}", report.migrated_features);
    println!("📊 Report saved to: {}", migration.report_path().display());
    println!("📝 Log: {}", migration.log().path().display());
    println!("\n🔗 Next steps:");
    println!("1. Check Linear workspace to verify issues");
    println!("2. Run verification: backlog linear verify");
    println!("3. Update team workflow documentation");
    Ok(())
}

fn verify(root: &Path, workspace: &str, json: bool) -> anyhow::Result<()> {
    let layout = Config::load(root).context("failed to load config")?.layout(root);
    let mut migration = Migration::new(&layout);
    let mut tracker = prompt_tracker(workspace, json);
    if !json {
        migration.echo_to(|line| println!("📝 {line}"));
    }

    let verification = migration
        .verify(&mut tracker)
        .context("verification failed")?;

    if json {
        return print_json(&verification);
    }
    match verification {
        Some(_) => {
            println!("\n✅ Migration verification completed");
            println!("Check Linear workspace to confirm all issues were created correctly");
        }
        None => println!("❌ No migration report found"),
    }
    Ok(())
}
