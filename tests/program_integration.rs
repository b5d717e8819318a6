//! Integration tests for graph construction and tick evaluation.

mod common;

use common::builders::ProgramBuilder;
use common::{assert_float_eq, ms};
use dataflow_tile::hub::{DemoHub, NullHub};
use dataflow_tile::program::node::NodeKind;
use dataflow_tile::program::nodes::{ControlNode, LiveDevice, LiveOutputNode, SensorNode};
use dataflow_tile::program::ops::{
    HoldOperator, LogicOperator, MathOperator, TransformOperator, Waveform,
};
use dataflow_tile::program::{Evaluator, Graph, NodeId};
use dataflow_tile::{ConnectionError, DataflowError, SensorKind};
use proptest::prelude::*;

fn run_ticks(graph: &mut Graph, ticks: &[u64]) {
    let mut evaluator = Evaluator::new();
    let mut hub = NullHub;
    for &t in ticks {
        evaluator.tick(graph, &mut hub, ms(t));
    }
}

#[test]
fn test_arithmetic_chain() {
    let mut builder = ProgramBuilder::new();
    let three = builder.number(3.0);
    let four = builder.number(4.0);
    let product = builder.math(MathOperator::Multiply);
    let rounded = builder.transform(TransformOperator::Round);
    builder.link(three, product, 0);
    builder.link(four, product, 1);
    builder.link(product, rounded, 0);

    let mut graph = builder.build();
    run_ticks(&mut graph, &[0]);
    assert_eq!(graph.node(product).unwrap().value, 12.0);
    assert_eq!(graph.node(rounded).unwrap().value, 12.0);
}

#[test]
fn test_divide_by_missing_input_is_nan_and_propagates() {
    let mut builder = ProgramBuilder::new();
    let ten = builder.number(10.0);
    let quotient = builder.math(MathOperator::Divide);
    let comparison = builder.logic(LogicOperator::GreaterThan);
    let two = builder.number(2.0);
    builder.link(ten, quotient, 0);
    // second divide input left unconnected
    builder.link(quotient, comparison, 0);
    builder.link(two, comparison, 1);

    let mut graph = builder.build();
    run_ticks(&mut graph, &[0]);
    assert!(graph.node(quotient).unwrap().value.is_nan());
    // NaN flows through logic rather than coercing to false
    assert!(graph.node(comparison).unwrap().value.is_nan());
}

#[test]
fn test_display_rounds_to_three_decimals_storage_exact() {
    let mut builder = ProgramBuilder::new();
    let n = builder.number(1.8309);
    let mut graph = builder.build();
    run_ticks(&mut graph, &[0]);

    let node = graph.node(n).unwrap();
    assert_eq!(node.display, "1.831");
    assert_eq!(node.value, 1.8309);
}

#[test]
fn test_generator_and_timer_waveforms() {
    let mut builder = ProgramBuilder::new();
    let sine = builder.generator(Waveform::Sine, 1.0, 4.0);
    let square = builder.generator(Waveform::Square, 2.0, 4.0);
    let timer = builder.timer(1.0, 1.0);
    let mut graph = builder.build();

    let mut evaluator = Evaluator::new();
    let mut hub = NullHub;
    // quarter period: sine at its peak, square in its high half
    evaluator.tick(&mut graph, &mut hub, ms(1000));
    assert_float_eq(graph.node(sine).unwrap().value, 1.0, 1e-9);
    assert_eq!(graph.node(square).unwrap().value, 2.0);
    assert_eq!(graph.node(timer).unwrap().value, 0.0); // 1000ms: off phase begins

    evaluator.tick(&mut graph, &mut hub, ms(3000));
    assert_float_eq(graph.node(sine).unwrap().value, -1.0, 1e-9);
    assert_eq!(graph.node(square).unwrap().value, 0.0);
    assert_eq!(graph.node(timer).unwrap().value, 0.0);

    evaluator.tick(&mut graph, &mut hub, ms(4500));
    assert_eq!(graph.node(timer).unwrap().value, 1.0);
}

#[test]
fn test_remove_node_cascades_exactly_incident_links() {
    let mut builder = ProgramBuilder::new();
    let a = builder.number(1.0);
    let b = builder.number(2.0);
    let sum = builder.math(MathOperator::Add);
    let double = builder.math(MathOperator::Multiply);
    let two = builder.number(2.0);
    builder.link(a, sum, 0);
    builder.link(b, sum, 1);
    builder.link(sum, double, 0);
    builder.link(two, double, 1);

    let mut graph = builder.build();
    assert_eq!(graph.link_count(), 4);
    graph.remove_node(sum).unwrap();
    // both links into sum and the one out of it are gone; two->double stays
    assert_eq!(graph.link_count(), 1);
    let survivor = graph.links().next().unwrap();
    assert_eq!(survivor.source, two);
    assert_eq!(survivor.dest, double);
}

#[test]
fn test_hold_gate_with_wait_timer() {
    let mut builder = ProgramBuilder::new();
    let signal = builder.number(8.0);
    let gate = builder.number(0.0);
    let mut control = ControlNode::new(HoldOperator::OutputZero);
    control.wait_duration = 1.0;
    let hold = builder.node(NodeKind::Control(control));
    builder.link(signal, hold, 0);
    builder.link(gate, hold, 1);

    let mut graph = builder.build();
    let mut evaluator = Evaluator::new();
    let mut hub = NullHub;

    evaluator.tick(&mut graph, &mut hub, ms(0));
    assert_eq!(graph.node(hold).unwrap().value, 8.0);

    // raise the gate: wait timer starts, output suppressed
    if let NodeKind::Number(n) = &mut graph.node_mut(gate).unwrap().kind {
        n.value = 1.0;
    }
    evaluator.tick(&mut graph, &mut hub, ms(1000));
    assert_eq!(graph.node(hold).unwrap().value, 0.0);

    // drop the gate before the timer ends: still suppressed
    if let NodeKind::Number(n) = &mut graph.node_mut(gate).unwrap().kind {
        n.value = 0.0;
    }
    evaluator.tick(&mut graph, &mut hub, ms(1500));
    assert_eq!(graph.node(hold).unwrap().value, 0.0);

    // timer expired and gate low: signal passes again
    evaluator.tick(&mut graph, &mut hub, ms(2500));
    assert_eq!(graph.node(hold).unwrap().value, 8.0);
}

#[test]
fn test_live_output_without_hub_is_degraded_not_failing() {
    let mut builder = ProgramBuilder::new();
    let half = builder.number(0.5);
    let gripper = builder.node(NodeKind::LiveOutput(LiveOutputNode::new(LiveDevice::Gripper)));
    builder.link(half, gripper, 0);

    let mut graph = builder.build();
    run_ticks(&mut graph, &[0, 1000, 2000]);

    let node = graph.node(gripper).unwrap();
    assert_eq!(node.value, 50.0);
    assert!(node.display.contains("(no hub)"));
}

#[test]
fn test_sensor_with_demo_hub_has_units() {
    let mut graph = Graph::new();
    let sensor = graph.add_node(NodeKind::Sensor(SensorNode::new(SensorKind::Temperature)));

    let mut evaluator = Evaluator::new();
    let mut hub = DemoHub::new();
    evaluator.tick(&mut graph, &mut hub, ms(0));

    let node = graph.node(sensor).unwrap();
    assert!(node.value.is_finite());
    assert!(node.display.ends_with("°C"));
}

#[test]
fn test_minigraph_capacity_evicts_oldest() {
    let mut builder = ProgramBuilder::new();
    let n = builder.number(1.0);
    let mut graph = builder.build();
    graph.node_mut(n).unwrap().set_minigraph(true, 16);

    let mut evaluator = Evaluator::new();
    let mut hub = NullHub;
    for tick in 0..20u64 {
        evaluator.tick(&mut graph, &mut hub, ms(tick * 1000));
    }

    let history = graph.node(n).unwrap().history.as_ref().unwrap();
    assert_eq!(history.len(), 16);
    // oldest four samples were evicted
    assert_eq!(history.iter().next().unwrap().timestamp, ms(4000));
}

proptest! {
    /// A destination port accepts exactly one link: the first attempt
    /// succeeds, any second attempt on the same port is rejected.
    #[test]
    fn prop_one_link_per_destination_port(port in 0usize..2, sources in 2usize..6) {
        let mut builder = ProgramBuilder::new();
        let mut ids = Vec::new();
        for i in 0..sources {
            ids.push(builder.number(i as f64));
        }
        let sum = builder.math(MathOperator::Add);
        let mut graph = builder.build();

        graph.add_link(ids[0], sum, port).unwrap();
        for &source in &ids[1..] {
            let err = graph.add_link(source, sum, port).unwrap_err();
            prop_assert!(
                matches!(
                    err,
                    DataflowError::InvalidConnection(ConnectionError::PortOccupied { .. })
                ),
                "expected PortOccupied, got {:?}",
                err
            );
        }
        prop_assert_eq!(graph.link_count(), 1);
    }

    /// Stale node ids never alias a later node.
    #[test]
    fn prop_removed_ids_stay_dead(remove_index in 0usize..4) {
        let mut builder = ProgramBuilder::new();
        let ids: Vec<NodeId> = (0..4).map(|i| builder.number(i as f64)).collect();
        let mut graph = builder.build();

        graph.remove_node(ids[remove_index]).unwrap();
        let fresh = graph.add_node(NodeKind::Number(
            dataflow_tile::program::nodes::NumberNode::new(9.0),
        ));
        prop_assert!(ids.iter().all(|&id| id != fresh));
        prop_assert!(graph.node(ids[remove_index]).is_none());
    }
}
