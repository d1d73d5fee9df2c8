//! CLI presentation: provider listing as text table or json.

use crate::config::PagecraftConfig;
use comfy_table::Table;
use serde_json::json;

fn sorted_providers(config: &PagecraftConfig) -> Vec<(&String, &crate::config::ProviderConfig)> {
    let mut providers: Vec<_> = config.providers.iter().collect();
    providers.sort_by(|a, b| a.0.cmp(b.0));
    providers
}

pub fn format_providers_text(config: &PagecraftConfig) -> String {
    if config.providers.is_empty() {
        return "No providers configured.\n\nAdd a [providers.<name>] section to config/config.toml.".to_string();
    }
    let active = config.generation.provider.as_deref();
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "Type", "Model", "Endpoint", "Active"]);
    for (name, provider) in sorted_providers(config) {
        table.add_row(vec![
            name.as_str(),
            provider.provider_type.as_str(),
            provider.model.as_str(),
            provider.endpoint.as_deref().unwrap_or("(default endpoint)"),
            if active == Some(name.as_str()) { "yes" } else { "" },
        ]);
    }
    format!("{}\n\nTotal: {} provider(s)", table, config.providers.len())
}

pub fn format_providers_json(config: &PagecraftConfig) -> String {
    let providers: Vec<_> = sorted_providers(config)
        .into_iter()
        .map(|(name, provider)| {
            json!({
                "name": name,
                "providerType": provider.provider_type.as_str(),
                "model": provider.model,
                "endpoint": provider.endpoint,
                "active": config.generation.provider.as_deref() == Some(name.as_str()),
            })
        })
        .collect();
    let out = json!({ "providers": providers, "total": config.providers.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}
