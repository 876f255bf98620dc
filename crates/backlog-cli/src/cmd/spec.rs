use crate::output::print_json;
use anyhow::Context;
use backlog_core::{
    config::Config,
    speckit::{SpecKit, SpecOutcome, SpecifyCli},
    types::Priority,
};
use clap::Subcommand;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum SpecSubcommand {
    /// Run the spec tool on a description and track the result as a feature
    Create {
        /// Feature description handed to the spec tool
        description: String,
        /// critical, high, medium or low
        #[arg(long, default_value = "medium")]
        priority: String,
    },
}

pub fn run(root: &Path, subcmd: SpecSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SpecSubcommand::Create {
            description,
            priority,
        } => create(root, &description, &priority, json),
    }
}

fn create(root: &Path, description: &str, priority: &str, json: bool) -> anyhow::Result<()> {
    let priority = Priority::from_str(priority)
        .with_context(|| format!("unknown priority: {priority}"))?;
    let layout = Config::load(root).context("failed to load config")?.layout(root);

    let tool = match SpecifyCli::locate() {
        Ok(tool) => tool,
        Err(e) => {
            println!("❌ {e}");
            return Ok(());
        }
    };
    tracing::debug!(program = %tool.program().display(), "using spec tool");

    if !json {
        println!("🔍 Creating specification with GitHub Spec Kit...");
    }
    let kit = SpecKit::new(layout, tool);
    let outcome = kit
        .create_feature_from_spec(description, priority)
        .context("spec integration failed")?;

    if json {
        return print_json(&outcome);
    }

    match outcome {
        SpecOutcome::StepFailed { step, stderr } => {
            println!("❌ GitHub Spec Kit {step} failed: {}", stderr.trim_end());
        }
        SpecOutcome::NoSpecData => println!("⚠️  No specification data found"),
        SpecOutcome::Created {
            feature_id,
            enhanced_doc,
        } => {
            match enhanced_doc {
                Some(path) => println!(
                    "📄 Enhanced {} with GitHub Spec Kit output",
                    path.display()
                ),
                None => println!("⚠️  Feature document not found for {feature_id}"),
            }
            println!("✅ Feature {feature_id} created with GitHub Spec Kit integration");
        }
    }
    Ok(())
}
