use crate::output::{print_json, rule};
use anyhow::Context;
use backlog_core::{
    feature::{Feature, NewFeature},
    manager::FeatureManager,
    types::{title_case, Level, Priority, Status},
};
use std::path::Path;
use std::str::FromStr;

pub struct CreateArgs {
    pub name: String,
    pub description: String,
    pub priority: String,
    pub epic: Option<String>,
    pub hours: u32,
    pub tags: Vec<String>,
    pub value: String,
    pub linear: Option<String>,
}

fn parse_status(s: &str) -> anyhow::Result<Status> {
    Status::from_str(s).with_context(|| format!("unknown status: {s}"))
}

pub fn create(root: &Path, args: CreateArgs, json: bool) -> anyhow::Result<()> {
    let priority = Priority::from_str(&args.priority)
        .with_context(|| format!("unknown priority: {}", args.priority))?;
    let business_value = Level::from_str(&args.value)
        .with_context(|| format!("unknown business value: {}", args.value))?;

    let new = NewFeature {
        name: args.name,
        description: args.description,
        priority,
        epic: args.epic,
        estimated_hours: f64::from(args.hours),
        tags: args.tags,
        business_value,
        linear_issue: args.linear,
    };

    let fm = FeatureManager::open(root).context("failed to open backlog")?;
    let created = fm.create_feature(new).context("failed to create feature")?;

    if json {
        return print_json(&created);
    }

    match &created.doc {
        Some(path) => println!("📄 Created documentation: {}", path.display()),
        None => println!(
            "⚠️  Template not found: {}",
            fm.renderer().template_path().display()
        ),
    }
    println!(
        "✅ Created feature: {} - {}",
        created.feature.id, created.feature.name
    );
    Ok(())
}

pub fn move_to(root: &Path, id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let new_status = parse_status(status)?;
    let fm = FeatureManager::open(root).context("failed to open backlog")?;
    let moved = fm
        .move_feature(id, new_status)
        .with_context(|| format!("failed to move {id}"))?;

    let Some(moved) = moved else {
        if json {
            return print_json(&serde_json::json!({ "id": id, "found": false }));
        }
        println!("❌ Feature {id} not found in backlog");
        return Ok(());
    };

    if json {
        return print_json(&moved);
    }
    if let Some(ref path) = moved.doc {
        println!("📄 Moved documentation: {}", path.display());
    }
    println!("✅ Moved {id} from {} to {new_status}", moved.old_status);
    Ok(())
}

pub fn list(root: &Path, status: Option<&str>, json: bool) -> anyhow::Result<()> {
    let filter = status.map(parse_status).transpose()?;
    let fm = FeatureManager::open(root).context("failed to open backlog")?;
    let features = fm.list_features(filter).context("failed to list features")?;

    if json {
        return print_json(&features);
    }

    if features.is_empty() {
        println!("No features found");
        return Ok(());
    }

    println!("\n📋 Features ({} total):", features.len());
    println!("{}", rule(80));
    for feature in &features {
        print_feature(feature);
        println!();
    }
    Ok(())
}

fn print_feature(feature: &Feature) {
    println!(
        "{} {} - {}",
        feature.status.emoji(),
        feature.id,
        feature.name
    );
    println!(
        "   {} {} | 📅 {} | ⏱️  {}h",
        feature.priority.emoji(),
        title_case(feature.priority.as_str()),
        feature.created_date,
        feature.estimated_hours
    );
    println!("   📖 {}", feature.description);
    if let Some(ref issue) = feature.linear_issue {
        println!("   🔗 Linear: {issue}");
    }
}

pub fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let fm = FeatureManager::open(root).context("failed to open backlog")?;
    let feature = fm.get_feature(id).context("failed to load backlog")?;

    let Some(feature) = feature else {
        if json {
            return print_json(&serde_json::json!({ "id": id, "found": false }));
        }
        println!("❌ Feature {id} not found");
        return Ok(());
    };

    if json {
        return print_json(&feature);
    }

    print_feature(&feature);
    println!("   Status:  {}", feature.status);
    println!("   Value:   {}", feature.business_value);
    if let Some(ref epic) = feature.epic {
        println!("   Epic:    {epic}");
    }
    if let Some(ref owner) = feature.owner {
        println!("   Owner:   {owner}");
    }
    if !feature.tags.is_empty() {
        println!("   Tags:    {}", feature.tags.join(", "));
    }
    if let Some(done) = feature.completed_date {
        println!("   Done:    {done}");
    }
    Ok(())
}

pub fn metrics(root: &Path, json: bool) -> anyhow::Result<()> {
    let fm = FeatureManager::open(root).context("failed to open backlog")?;
    let report = fm.show_metrics().context("failed to load metrics")?;

    if json {
        return print_json(&report);
    }

    let m = &report.metrics;
    println!("\n📊 Project Metrics:");
    println!("{}", rule(40));
    println!("Total Features: {}", m.total_features);
    println!("Backlog: {}", m.backlog_features);
    println!("Completed: {}", m.completed_features);
    println!("Estimated Hours: {}", m.total_estimated_hours);
    if let Some(rate) = report.completion_rate {
        println!("Completion Rate: {rate:.1}%");
    }
    Ok(())
}
