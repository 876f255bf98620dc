use crate::output::print_json;
use anyhow::Context;
use backlog_core::{config::Config, manager::FeatureManager};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let layout = config.layout(root);
    let fm = FeatureManager::from_layout(&layout);
    let report = fm.init().context("failed to initialize backlog")?;

    if json {
        return print_json(&report);
    }

    if report.store_created {
        println!("📦 Created backlog: {}", layout.backlog_file().display());
    } else {
        println!("Backlog already exists: {}", layout.backlog_file().display());
    }
    if report.template_created {
        println!("📄 Created template: {}", layout.template_path.display());
    } else {
        println!("Template already exists: {}", layout.template_path.display());
    }
    Ok(())
}
