mod common;

use anyhow::Result;
use common::{build_context_in, build_test_context, jmx_line};
use decanter_alert::store::{AlertStore, InMemoryAlertStore};
use decanter_common::types::{Severity, REMOVED_PATTERN};
use decanter_server::pipeline::{parse_line, run_intake};
use tokio::io::BufReader;

#[tokio::test]
async fn intake_raises_and_clears_through_handlers() -> Result<()> {
    let ctx = build_test_context(r#""ThreadCount.error" = "range:[0,100)""#)?;
    let input = [jmx_line(150), jmx_line(120), jmx_line(50)].join("\n");

    let stats = run_intake(&ctx.pipeline.checker, BufReader::new(input.as_bytes())).await?;
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.events, 3);
    assert_eq!(stats.alerts, 2);

    let recorded = ctx.recorded.clone();
    let consumed = ctx.pipeline.shutdown().await?;
    assert_eq!(consumed, 2);

    let alerts = recorded.lock().unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].attribute, "jmx-ThreadCount");
    assert!(!alerts[0].back_to_normal);
    assert!(alerts[1].back_to_normal);
    Ok(())
}

#[tokio::test]
async fn intake_skips_foreign_topics_and_garbage() -> Result<()> {
    let ctx = build_test_context(r#""ThreadCount.error" = "range:[0,100)""#)?;
    let foreign = serde_json::json!({
        "topic": "decanter/alert/error",
        "properties": { "type": "jmx", "ThreadCount": 999 }
    })
    .to_string();
    let input = format!("{foreign}\nnot json\n\n{}", jmx_line(150));

    let stats = run_intake(&ctx.pipeline.checker, BufReader::new(input.as_bytes())).await?;
    assert_eq!(stats.lines, 4);
    assert_eq!(stats.events, 1);
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.alerts, 1);
    ctx.pipeline.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn snapshot_survives_restart_and_suppresses_duplicate_raise() -> Result<()> {
    let ctx = build_test_context(r#""ThreadCount.error" = "range:[0,100)""#)?;
    let snapshot = ctx.config.snapshot_path.clone();

    run_intake(&ctx.pipeline.checker, BufReader::new(jmx_line(150).as_bytes())).await?;
    let temp_dir = ctx.temp_dir;
    ctx.pipeline.shutdown().await?;

    let saved = InMemoryAlertStore::load(&snapshot)?;
    assert!(saved.known("jmx-ThreadCount", Severity::Error));

    let ctx = build_context_in(temp_dir, &snapshot, r#""ThreadCount.error" = "range:[0,100)""#)?;
    let stats = run_intake(&ctx.pipeline.checker, BufReader::new(jmx_line(150).as_bytes())).await?;
    assert_eq!(stats.alerts, 0);

    let stats = run_intake(&ctx.pipeline.checker, BufReader::new(jmx_line(10).as_bytes())).await?;
    assert_eq!(stats.alerts, 1);
    ctx.pipeline.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn reload_without_rule_clears_with_removed_pattern() -> Result<()> {
    let ctx = build_test_context(r#""ThreadCount.warn" = "range:[0,100]""#)?;
    run_intake(&ctx.pipeline.checker, BufReader::new(jmx_line(500).as_bytes())).await?;

    ctx.pipeline
        .checker
        .update_config(decanter_alert::config::CheckerConfig::default());
    run_intake(&ctx.pipeline.checker, BufReader::new(jmx_line(500).as_bytes())).await?;

    let recorded = ctx.recorded.clone();
    ctx.pipeline.shutdown().await?;

    let alerts = recorded.lock().unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[1].level, Severity::Warn);
    assert_eq!(alerts[1].pattern, REMOVED_PATTERN);
    assert!(alerts[1].back_to_normal);
    Ok(())
}

#[test]
fn parse_line_requires_collect_topic() -> Result<()> {
    assert!(parse_line("")?.is_none());
    assert!(parse_line(r#"{"topic":"other/thing","properties":{}}"#)?.is_none());
    let event = parse_line(&jmx_line(1))?.expect("collect event should parse");
    assert_eq!(event.event_type(), Some("jmx"));
    assert!(parse_line("{").is_err());
    Ok(())
}
