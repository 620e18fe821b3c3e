//! # adaptx: Adaptive Query Optimizer Driver
//!
//! Batch driver wiring the optimizer end to end:
//!
//! ```text
//! dataset JSON ─> catalog ─> OptimizerContext (stats + initial models)
//! queries file ─> parser ─> plan search ─> chosen plan
//!                               │
//!                               v
//!                          toy executor ─> actual rows ─> feedback loop
//! ```
//!
//! Each statement is optimized, executed, and fed back before the next one
//! runs: the whole pipeline is single-threaded and synchronous by design.
//!
//! Paths default to `data/mock_data.json` and `data/testqueries.sql` and can
//! be overridden as the first and second CLI argument. Logging is controlled
//! by `RUST_LOG` (defaults to `adaptx=info`).

use adaptx_cli::{display, executor, loader, parser};
use adaptx_core::context::OptimizerContext;
use adaptx_core::cost::estimate_cost;
use adaptx_core::feedback::apply_feedback;
use adaptx_core::search::PlanSearch;
use adaptx_rules::default_rule_registry;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("adaptx=info".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let data_path = args
        .next()
        .unwrap_or_else(|| "data/mock_data.json".to_string());
    let queries_path = args
        .next()
        .unwrap_or_else(|| "data/testqueries.sql".to_string());

    let catalog = loader::load_catalog(&data_path)?;
    info!(data = %data_path, tables = catalog.tables().count(), "dataset loaded");
    let mut ctx = OptimizerContext::from_catalog(&catalog);
    let search = PlanSearch::new(Arc::new(default_rule_registry()));

    let raw = std::fs::read_to_string(&queries_path)?;
    let statements: Vec<&str> = raw
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    for (index, sql) in statements.iter().enumerate() {
        println!("\n=== Query #{}: {}", index + 1, sql);

        let plan = match parser::parse_query(sql) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(query = sql, error = %err, "statement skipped");
                println!("Parse error: {err}");
                continue;
            }
        };

        let best_plan = search.optimize(&ctx, &plan);
        let predicted_cost = estimate_cost(&ctx, &best_plan);
        println!("Chosen plan:");
        print!("{}", display::render(&best_plan));
        println!("Predicted cost: {:.4}", predicted_cost.total);

        let actual_rows = executor::execute(&catalog, &best_plan);
        println!("Actual row count: {actual_rows}");
        info!(
            query = sql,
            predicted_cost = predicted_cost.total,
            actual_rows,
            "query executed"
        );

        apply_feedback(&mut ctx, &best_plan, actual_rows);
    }

    Ok(())
}
