use anyhow::Result;
use docwatch_cli::config::default_config_path;
use docwatch_cli::WatchConfig;
use interaction_capture::CaptureTable;
use serde::Serialize;

use super::output::{render, OutputFormat};

#[derive(Debug, Serialize)]
struct BuildInfo {
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
    config_path: Option<String>,
    frameindex: String,
    dynamic_region: String,
    rules: usize,
    capture_categories: Vec<String>,
}

pub async fn cmd_info(config: &WatchConfig, format: OutputFormat) -> Result<()> {
    let info = BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("DOCWATCH_BUILD_DATE"),
        git_hash: env!("DOCWATCH_GIT_HASH"),
        config_path: default_config_path().map(|path| path.display().to_string()),
        frameindex: config.frameindex().to_string(),
        dynamic_region: config.dynamic_region.clone(),
        rules: config.rule_table()?.len(),
        capture_categories: CaptureTable::builtin()
            .specs()
            .iter()
            .map(|spec| format!("{} ({})", spec.category, spec.scope))
            .collect(),
    };

    if let Some(rendered) = render(&info, &format)? {
        println!("{rendered}");
        return Ok(());
    }

    println!("docwatch v{}", info.version);
    println!("  built:          {} ({})", info.build_date, info.git_hash);
    println!(
        "  config:         {}",
        info.config_path.as_deref().unwrap_or("(no config directory)")
    );
    println!("  frame index:    {}", info.frameindex);
    println!("  dynamic region: {}", info.dynamic_region);
    println!("  rules:          {}", info.rules);
    println!("  capture:        {}", info.capture_categories.join(", "));
    Ok(())
}
