use pageload_core::{NavigationKind, PageLoadConfig};
use pageload_http::{InterceptorChain, TrackedClient};
use pageload_scheduler::TickScheduler;
use pageload_tracker::PageLoad;
use std::sync::Arc;
use tokio::time::{Duration, timeout};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let config = PageLoadConfig::fast();
    let (ticks, receiver) = TickScheduler::new();
    tokio::spawn(TickScheduler::run(receiver));

    let page = PageLoad::new(&config, Arc::new(ticks));
    let client = TrackedClient::from_config(&config, InterceptorChain::new().with(page.interceptor()))?;

    let routes: [&[&str]; 2] = [
        &["https://example.com", "https://example.org"],
        &["https://example.net", "https://example.com/missing"],
    ];

    for (i, urls) in routes.iter().enumerate() {
        page.navigate(NavigationKind::RouteChange);
        let mut events = page.subscribe();

        for result in client.get_all(urls).await {
            match result {
                Ok(response) => println!("route {}: {} -> {}", i, response.config.url, response.status),
                Err(rejection) => eprintln!("route {}: {}", i, rejection),
            }
        }

        let event = timeout(Duration::from_secs(5), page.wait_ready(&mut events)).await??;
        println!("route {}: {} ({:?})", i, event.name, page.progress().snapshot());
    }

    Ok(())
}
