//! `routes` command: list every asset route.

use crate::{config::ProviderConfig, provider::Provider, provider::RouteInfo};
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn list_routes(config: &ProviderConfig, provider: &Provider) -> Result<()> {
    if provider.routes.is_empty() {
        crate::log!("routes"; "no asset formulae found");
        return Ok(());
    }

    let width = provider.routes.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for route in &provider.routes {
        println!(
            "{}  {}  {}",
            format!("{:<width$}", route.name).bold(),
            route.pattern,
            relative_sources(config, route).dimmed(),
        );
    }
    Ok(())
}

/// Sources of `route` relative to the project root, comma separated.
fn relative_sources(config: &ProviderConfig, route: &RouteInfo) -> String {
    route
        .sources
        .iter()
        .map(|s| config.root_relative(s).display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_relative_sources() {
        let config = ProviderConfig {
            root: PathBuf::from("/site"),
            ..Default::default()
        };
        let route = RouteInfo {
            name: "_assetic_app".into(),
            pattern: "/css/app.css".into(),
            sources: vec![
                "/site/assets/css/a.css".into(),
                "/elsewhere/b.css".into(),
            ],
        };
        assert_eq!(
            relative_sources(&config, &route),
            "assets/css/a.css, /elsewhere/b.css"
        );
    }
}
