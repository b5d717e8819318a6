//! Demo binary: runs a small program on the tick thread, records a few
//! seconds of output, and prints what happened.

use anyhow::Context;
use dataflow_tile::config::EngineConfig;
use dataflow_tile::hub::{DemoHub, SensorKind};
use dataflow_tile::program::node::NodeKind;
use dataflow_tile::program::nodes::{
    DemoDevice, DemoOutputNode, GeneratorNode, MathNode, SensorNode,
};
use dataflow_tile::program::ops::{MathOperator, Waveform};
use dataflow_tile::program::runtime::{ProgramCommand, ProgramEvent, ProgramRuntime};
use dataflow_tile::program::Graph;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dataflow_tile=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // temperature + sine wobble -> light bulb threshold demo
    let mut graph = Graph::new();
    let sensor = graph.add_node(NodeKind::Sensor(SensorNode::new(SensorKind::Temperature)));
    let wave = graph.add_node(NodeKind::Generator(GeneratorNode::new(
        Waveform::Sine,
        2.0,
        5.0,
    )));
    let sum = graph.add_node(NodeKind::Math(MathNode::new(MathOperator::Add)));
    let bulb = graph.add_node(NodeKind::DemoOutput(DemoOutputNode::new(
        DemoDevice::LightBulb,
    )));
    graph.add_link(sensor, sum, 0)?;
    graph.add_link(wave, sum, 1)?;
    graph.add_link(sum, bulb, 0)?;

    let config = EngineConfig {
        data_rate_ms: 100,
        ..EngineConfig::default()
    };
    let handle = ProgramRuntime::spawn(graph, Box::new(DemoHub::new()), config);

    handle
        .send(ProgramCommand::StartRecording {
            name: "demo".into(),
            interval: Duration::from_millis(200),
            duration_limit: Some(Duration::from_secs(3)),
            channels: vec![sensor, sum],
        })
        .context("runtime thread is gone")?;

    let mut ticks = 0u32;
    loop {
        match handle.event_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(ProgramEvent::NodeValues(values)) => {
                ticks += 1;
                if ticks % 10 == 0 {
                    for value in &values {
                        tracing::info!(node = %value.id, display = %value.display, "tick");
                    }
                }
            }
            Ok(ProgramEvent::RecordingComplete(recording)) => {
                tracing::info!(
                    frames = recording.len(),
                    duration_ms = recording.duration().as_millis() as u64,
                    "recording finished"
                );
                break;
            }
            Ok(_) => {}
            Err(e) => anyhow::bail!("runtime went quiet: {e}"),
        }
    }

    handle.shutdown();
    Ok(())
}
