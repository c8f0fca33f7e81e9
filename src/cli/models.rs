//! Models command
//!
//! Lists the effective pricing table with each model's token encoding.

use crate::app::AppConfig;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let table = config.pricing_table()?;
    let counter = config.token_counter();

    println!("💲 Priced models (USD per 1M tokens)\n");
    println!(
        "{:<16} {:<10} {:>10} {:>10} {:>10}  {}",
        "MODEL", "PROVIDER", "QUERY", "RESPONSE", "RETRIEVAL", "ENCODING"
    );

    for pricing in table.iter() {
        let encoding = counter
            .encoding_for(&pricing.model)
            .map_or_else(|| "unsupported".to_string(), |e| e.to_string());
        println!(
            "{:<16} {:<10} {:>10} {:>10} {:>10}  {}",
            pricing.model,
            pricing.provider,
            pricing.query_cost_per_million,
            pricing.response_cost_per_million,
            pricing.retrieval_cost_per_million,
            encoding
        );
    }

    Ok(())
}
