// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Serves lookups while the shared tier goes down and comes back.

use std::io;
use std::time::Duration;

use ballast::{MemoryTier, TieredCache};
use ballast_tier::testing::{MockSharedTier, SharedOp};
use tripwire::BreakerOptions;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let shared = MockSharedTier::new();
    let cache = TieredCache::builder(MemoryTier::with_capacity(1_000), shared.clone())
        .name("demo")
        .local_ttl(Duration::from_millis(200))
        .read_breaker(BreakerOptions {
            failure_threshold: 2,
            open_duration: Duration::from_millis(500),
        })
        .build()?;

    let load = |id: u32| async move { Ok::<_, io::Error>(Some(format!("profile-{id}"))) };

    println!("healthy: {:?}", cache.get_or_create("profile:1", || load(1)).await?);

    shared.fail_when(|op| matches!(op, SharedOp::Get(_)));
    for id in 2..5 {
        println!("degraded: {:?}", cache.get_or_create(&format!("profile:{id}"), || load(id)).await?);
    }
    println!("read breaker: {}", cache.read_breaker().state());

    shared.clear_failures();
    tokio::time::sleep(Duration::from_millis(600)).await;
    println!("recovered: {:?}", cache.get_or_create("profile:5", || load(5)).await?);
    println!("read breaker: {}", cache.read_breaker().state());

    Ok(())
}
