//! Program runtime — the dedicated tick thread and its command bridge.
//!
//! One runtime per tile. The thread owns the graph, evaluator, recorder
//! and hub outright; everything else talks to it over channels. Commands
//! drain between ticks, so a user edit never lands mid-evaluation.

use crate::config::EngineConfig;
use crate::error::DataflowError;
use crate::hub::{Hub, SensorKind};
use crate::program::evaluator::Evaluator;
use crate::program::graph::Graph;
use crate::program::id::{LinkId, NodeId};
use crate::program::node::NodeKind;
use crate::program::ops::{
    HoldOperator, LogicOperator, MathOperator, TransformOperator, Waveform,
};
use crate::recorder::{ProgramRecorder, Recording, RecordingState};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Longest stretch the tick thread blocks on the command channel while
/// waiting for the next tick. Bounds command latency and recorder sampling
/// jitter at slow data rates.
const IDLE_SLICE: Duration = Duration::from_millis(25);

/// One tweakable parameter of an existing node.
#[derive(Debug, Clone)]
pub enum NodeParam {
    Value(f64),
    ValueText(String),
    Waveform(Waveform),
    Amplitude(f64),
    Period(f64),
    TimeOn(f64),
    TimeOff(f64),
    MathOp(MathOperator),
    LogicOp(LogicOperator),
    TransformOp(TransformOperator),
    HoldOp(HoldOperator),
    WaitDuration(f64),
    Sensor(SensorKind),
}

#[derive(Debug)]
pub enum ProgramCommand {
    AddNode(NodeKind),
    RemoveNode(NodeId),
    AddLink {
        source: NodeId,
        dest: NodeId,
        dest_port: usize,
    },
    RemoveLink(LinkId),
    SetNodeParam {
        node: NodeId,
        param: NodeParam,
    },
    ToggleMinigraph(NodeId),
    SetDataRate(u64),
    StartRecording {
        name: String,
        interval: Duration,
        duration_limit: Option<Duration>,
        channels: Vec<NodeId>,
    },
    StopRecording,
    Play,
    Pause,
    ClearRecording {
        confirmed: bool,
    },
    Shutdown,
}

/// One entry per node in a [`ProgramEvent::NodeValues`] snapshot.
#[derive(Debug, Clone)]
pub struct NodeValue {
    pub id: NodeId,
    pub value: f64,
    pub display: String,
}

#[derive(Debug)]
pub enum ProgramEvent {
    /// Values and display strings after a tick.
    NodeValues(Vec<NodeValue>),
    NodeAdded(NodeId),
    LinkAdded(LinkId),
    GraphChanged,
    GraphError(String),
    /// Recorded values under the playback cursor.
    PlaybackFrame(crate::recorder::RecordedFrame),
    RecorderStatus {
        state: RecordingState,
        frame_count: usize,
    },
    RecordingComplete(Arc<Recording>),
    Shutdown,
}

/// Handle to a running program thread.
pub struct ProgramHandle {
    pub cmd_tx: Sender<ProgramCommand>,
    pub event_rx: Receiver<ProgramEvent>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ProgramHandle {
    pub fn send(&self, cmd: ProgramCommand) -> crate::error::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|e| DataflowError::Channel(e.to_string()))
    }

    /// Stop the tick loop and wait for the thread to exit.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(ProgramCommand::Shutdown);
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ProgramHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub struct ProgramRuntime {
    graph: Graph,
    evaluator: Evaluator,
    recorder: ProgramRecorder,
    hub: Box<dyn Hub>,
    config: EngineConfig,
    running: Arc<AtomicBool>,
    cmd_rx: Receiver<ProgramCommand>,
    event_tx: Sender<ProgramEvent>,
    started: Instant,
    last_tick: Option<Instant>,
    /// Set once a finished recording has been announced.
    recording_sent: bool,
}

impl ProgramRuntime {
    /// Spawn the tick thread for `graph` and return its handle.
    pub fn spawn(graph: Graph, hub: Box<dyn Hub>, config: EngineConfig) -> ProgramHandle {
        let (cmd_tx, cmd_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let running = Arc::new(AtomicBool::new(true));

        let mut runtime = ProgramRuntime {
            graph,
            evaluator: Evaluator::new(),
            recorder: ProgramRecorder::new(),
            hub,
            config,
            running: Arc::clone(&running),
            cmd_rx,
            event_tx,
            started: Instant::now(),
            last_tick: None,
            recording_sent: false,
        };

        let thread = std::thread::Builder::new()
            .name("program-tick".into())
            .spawn(move || runtime.run())
            .ok();

        ProgramHandle {
            cmd_tx,
            event_rx,
            running,
            thread,
        }
    }

    fn run(&mut self) {
        info!("program thread started");

        while self.running.load(Ordering::Relaxed) {
            self.process_commands();
            if !self.running.load(Ordering::Relaxed) {
                break;
            }
            self.tick();
            self.service_recorder();
            self.idle_until_next_tick();
        }

        self.hub.disconnect();
        let _ = self.event_tx.send(ProgramEvent::Shutdown);
        info!("program thread exiting");
    }

    fn process_commands(&mut self) {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            self.handle_command(cmd);
        }
    }

    fn handle_command(&mut self, cmd: ProgramCommand) {
        match cmd {
            ProgramCommand::AddNode(kind) => {
                let id = self.graph.add_node(kind);
                self.evaluator.invalidate();
                let _ = self.event_tx.send(ProgramEvent::NodeAdded(id));
                let _ = self.event_tx.send(ProgramEvent::GraphChanged);
            }
            ProgramCommand::RemoveNode(id) => match self.graph.remove_node(id) {
                Ok(()) => {
                    self.evaluator.invalidate();
                    let _ = self.event_tx.send(ProgramEvent::GraphChanged);
                }
                Err(e) => self.report(e),
            },
            ProgramCommand::AddLink {
                source,
                dest,
                dest_port,
            } => match self.graph.add_link(source, dest, dest_port) {
                Ok(id) => {
                    self.evaluator.invalidate();
                    let _ = self.event_tx.send(ProgramEvent::LinkAdded(id));
                    let _ = self.event_tx.send(ProgramEvent::GraphChanged);
                }
                Err(e) => self.report(e),
            },
            ProgramCommand::RemoveLink(id) => match self.graph.remove_link(id) {
                Ok(()) => {
                    self.evaluator.invalidate();
                    let _ = self.event_tx.send(ProgramEvent::GraphChanged);
                }
                Err(e) => self.report(e),
            },
            ProgramCommand::SetNodeParam { node, param } => {
                self.apply_param(node, param);
            }
            ProgramCommand::ToggleMinigraph(id) => {
                let capacity = self.config.history_capacity;
                match self.graph.node_mut(id) {
                    Some(node) => {
                        let enabled = !node.minigraph_enabled();
                        node.set_minigraph(enabled, capacity);
                    }
                    None => self.report(DataflowError::UnknownNode(id)),
                }
            }
            ProgramCommand::SetDataRate(ms) => {
                if !EngineConfig::is_supported_rate(ms) {
                    warn!(ms, "unsupported data rate, applying anyway");
                }
                self.config.data_rate_ms = ms;
            }
            ProgramCommand::StartRecording {
                name,
                interval,
                duration_limit,
                channels,
            } => {
                if let Err(e) = self.recorder.start(name, interval, duration_limit, channels) {
                    self.report(e);
                }
                self.recording_sent = false;
                self.send_recorder_status();
            }
            ProgramCommand::StopRecording => {
                if let Err(e) = self.recorder.stop() {
                    self.report(e);
                }
                self.send_recorder_status();
            }
            ProgramCommand::Play => {
                if let Err(e) = self.recorder.play() {
                    self.report(e);
                }
                self.send_recorder_status();
            }
            ProgramCommand::Pause => {
                if let Err(e) = self.recorder.pause() {
                    self.report(e);
                }
                self.send_recorder_status();
            }
            ProgramCommand::ClearRecording { confirmed } => {
                if let Err(e) = self.recorder.clear(confirmed) {
                    self.report(e);
                }
                self.recording_sent = false;
                self.send_recorder_status();
            }
            ProgramCommand::Shutdown => {
                self.running.store(false, Ordering::Relaxed);
            }
        }
    }

    fn tick(&mut self) {
        let now = self.started.elapsed();
        self.last_tick = Some(Instant::now());

        self.evaluator.tick(&mut self.graph, self.hub.as_mut(), now);

        let values: HashMap<NodeId, f64> = self
            .graph
            .nodes()
            .map(|node| (node.id, node.value))
            .collect();
        self.recorder.sample(now, &values);

        let snapshot: Vec<NodeValue> = self
            .graph
            .nodes()
            .map(|node| NodeValue {
                id: node.id,
                value: node.value,
                display: node.display.clone(),
            })
            .collect();
        let _ = self.event_tx.send(ProgramEvent::NodeValues(snapshot));
    }

    fn apply_param(&mut self, id: NodeId, param: NodeParam) {
        let node = match self.graph.node_mut(id) {
            Some(node) => node,
            None => {
                self.report(DataflowError::UnknownNode(id));
                return;
            }
        };
        match (&mut node.kind, param) {
            (NodeKind::Number(n), NodeParam::Value(v)) => n.value = v,
            (NodeKind::Number(n), NodeParam::ValueText(text)) => n.set_from_str(&text),
            (NodeKind::Generator(n), NodeParam::Waveform(w)) => n.waveform = w,
            (NodeKind::Generator(n), NodeParam::Amplitude(a)) => n.amplitude = a,
            (NodeKind::Generator(n), NodeParam::Period(p)) => n.period = p,
            (NodeKind::Timer(n), NodeParam::TimeOn(t)) => n.time_on = t,
            (NodeKind::Timer(n), NodeParam::TimeOff(t)) => n.time_off = t,
            (NodeKind::Math(n), NodeParam::MathOp(op)) => n.op = op,
            (NodeKind::Logic(n), NodeParam::LogicOp(op)) => n.op = op,
            (NodeKind::Transform(n), NodeParam::TransformOp(op)) => n.op = op,
            (NodeKind::Control(n), NodeParam::HoldOp(op)) => n.op = op,
            (NodeKind::Control(n), NodeParam::WaitDuration(secs)) => n.wait_duration = secs,
            (NodeKind::Sensor(n), NodeParam::Sensor(sensor)) => n.sensor = sensor,
            (kind, param) => {
                let _ = self.event_tx.send(ProgramEvent::GraphError(format!(
                    "parameter {param:?} does not apply to a {} node",
                    kind.kind_name()
                )));
            }
        }
    }

    fn report(&self, err: DataflowError) {
        warn!(error = %err, "command rejected");
        let _ = self
            .event_tx
            .send(ProgramEvent::GraphError(err.to_string()));
    }

    fn poll_playback(&mut self) {
        if self.recorder.state() != RecordingState::Playing {
            return;
        }
        match self.recorder.playback_frame() {
            Some(frame) => {
                let _ = self.event_tx.send(ProgramEvent::PlaybackFrame(frame));
            }
            // cursor ran off the end, recorder dropped back to Stopped
            None => self.send_recorder_status(),
        }
    }

    fn send_recorder_status(&self) {
        let frame_count = self.recorder.frame_count();
        let _ = self.event_tx.send(ProgramEvent::RecorderStatus {
            state: self.recorder.state(),
            frame_count,
        });
    }

    /// Announce a finished recording once, e.g. after a duration-limit
    /// auto-stop the UI never asked for.
    fn check_recording_complete(&mut self) {
        if self.recording_sent || self.recorder.state() != RecordingState::Stopped {
            return;
        }
        if let Some(recording) = self.recorder.recording() {
            // announced even when no frame ever landed, so a waiting
            // consumer is not left hanging on a zero-frame recording
            self.recording_sent = true;
            let _ = self
                .event_tx
                .send(ProgramEvent::RecordingComplete(recording));
            self.send_recorder_status();
        }
    }

    /// Run the recorder on its own cadence, outside the tick.
    fn service_recorder(&mut self) {
        if self.recorder.state() == RecordingState::Recording {
            let now = self.started.elapsed();
            let values: HashMap<NodeId, f64> = self
                .graph
                .nodes()
                .map(|node| (node.id, node.value))
                .collect();
            self.recorder.sample(now, &values);
        }
        self.poll_playback();
        self.check_recording_complete();
    }

    /// Wait out the remainder of the tick period without going dark: block
    /// on the command channel in short slices so edits land immediately and
    /// the recorder keeps sampling at its own interval, even when the data
    /// rate is slow.
    fn idle_until_next_tick(&mut self) {
        let last = match self.last_tick {
            Some(last) => last,
            None => return,
        };
        while self.running.load(Ordering::Relaxed) {
            let deadline = last + self.config.tick_period();
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if remaining <= Duration::from_millis(2) {
                // Spin the final stretch for a precise tick edge.
                while Instant::now() < deadline {
                    std::hint::spin_loop();
                }
                break;
            }
            let slice = remaining
                .saturating_sub(Duration::from_millis(1))
                .min(IDLE_SLICE);
            match self.cmd_rx.recv_timeout(slice) {
                Ok(cmd) => self.handle_command(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.running.store(false, Ordering::Relaxed);
                    return;
                }
            }
            self.service_recorder();
        }
    }
}
