use anyhow::Context;

use stockroom_infra::{StorageConfig, StorageContext, seed_defaults};
use stockroom_inventory::{NameColumn, WareRegistry};

fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = StorageConfig::from_env().context("reading storage configuration")?;
    let registry = WareRegistry::standard().context("building the ware registry")?;

    for kind in registry.kinds() {
        let shapes = registry.extra_shapes(kind)?;
        let shapes: Vec<Vec<&str>> = shapes
            .iter()
            .map(|shape| shape.params().iter().map(|p| p.name).collect())
            .collect();
        tracing::debug!(kind, ?shapes, "ware kind registered");
    }

    let mut ctx = StorageContext::from_config(registry, &config);
    tracing::info!(backend = ?ctx.backend(), seed = config.seed_defaults, "storage ready");

    if config.seed_defaults {
        seed_defaults(&mut ctx).context("seeding default wares")?;
    }

    for summary in ctx.summaries()? {
        tracing::info!(
            id = %summary.id,
            name = %summary.name,
            amount = summary.amount,
            kind = summary.kind,
            "ware"
        );
    }

    let searchable = ctx.searchable_names(NameColumn::Display);
    let report = serde_json::to_string(&ctx.search(&searchable)?)?;
    tracing::debug!(%report, "inventory attributes");

    Ok(())
}
