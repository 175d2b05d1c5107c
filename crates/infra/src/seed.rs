//! Default wares loaded into a fresh context.

use serde_json::{Value as JsonValue, json};

use stockroom_core::DomainResult;

use crate::context::StorageContext;
use crate::creator::CreateWare;

/// The stock every new installation starts with.
pub fn default_wares() -> Vec<CreateWare> {
    vec![
        CreateWare::new("Liquid", "Water", "ID-55t", 25),
        CreateWare::new("Electronic", "Toaster", "ID-123q", 2),
        CreateWare::new("Liquid", "Milk", "ID-55t2", 1),
        CreateWare::new("Combustible Liquid", "FOOF", "ID-5q1", 10)
            .with_shape(4, vec![json!(-163), json!(1), json!(-57), JsonValue::Null]),
        CreateWare::new("Electronic", "TV", "ID-tv4", 512).with_shape(
            1,
            vec![json!("This is an ordinary television. Please buy it.")],
        ),
        CreateWare::new("Combustible Liquid", "CiF3", "ld-5wQ", 1)
            .with_shape(1, vec![json!("One of the world most deadly chemicals.")]),
    ]
}

/// Create every default ware in `ctx`. Returns how many were added.
pub fn seed_defaults(ctx: &mut StorageContext) -> DomainResult<usize> {
    let wares = default_wares();
    for request in &wares {
        ctx.create(request)?;
    }
    tracing::info!(count = wares.len(), backend = ?ctx.backend(), "default wares seeded");
    Ok(wares.len())
}
