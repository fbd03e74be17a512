use crate::link::ActuatorLink;
use crate::sink::ReportSink;
use anyhow::Result;
use log::{info, trace};
use pathsense_depth::config::PacketFormat;
use pathsense_depth::{
    AnalysisConfig, DepthFrame, DepthGrid, FrameAnalysisResult, GridSummarizer, HazardPipeline,
    IntervalGate,
};
use pathsense_haptic::{CommandThrottle, DirectionCommand, HapticEncoder, HapticIntensities};

/// Everything produced for one admitted frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub analysis: FrameAnalysisResult,
    pub grid: DepthGrid,
    pub haptics: HapticIntensities,
    /// Present only when the command throttle let a direction packet out.
    /// While no safe path is latched this is a hold.
    pub command: Option<DirectionCommand>,
}

/// One walking session: configuration, every stage's state and the outbound
/// seams. Dropping it discards all state.
pub struct Session {
    config: AnalysisConfig,
    summarizer: GridSummarizer,
    pipeline: HazardPipeline,
    encoder: HapticEncoder,
    throttle: CommandThrottle,
    analysis_gate: IntervalGate,
    log_gate: IntervalGate,
    sink: Box<dyn ReportSink + Send>,
    link: Box<dyn ActuatorLink + Send>,
}

impl Session {
    pub fn new(
        config: AnalysisConfig,
        sink: Box<dyn ReportSink + Send>,
        link: Box<dyn ActuatorLink + Send>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            summarizer: GridSummarizer::from_config(&config.grid),
            pipeline: HazardPipeline::new(&config),
            encoder: HapticEncoder::new(&config.haptic, &config.distance),
            throttle: CommandThrottle::new(config.timing.command_interval),
            analysis_gate: IntervalGate::new(config.timing.analysis_interval),
            log_gate: IntervalGate::new(config.timing.log_interval),
            config,
            sink,
            link,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &HazardPipeline {
        &self.pipeline
    }

    /// Handles one sensor tick. Ticks arriving within the analysis interval
    /// of the last admitted one are dropped and return `None`.
    pub fn on_tick(&mut self, frame: &DepthFrame) -> Option<FrameReport> {
        let timestamp = frame.timestamp();
        if !self.analysis_gate.admit(timestamp) {
            trace!("Skipping tick at t={timestamp:.3}");
            return None;
        }

        let grid = self.summarizer.summarize(frame);
        let analysis = self.pipeline.process(frame);
        let haptics = self.encoder.encode(&analysis);

        let command = match self.config.haptic.packet {
            PacketFormat::Direction => {
                // A stale turn must not outlive the path it pointed at.
                let command = if analysis.flags.no_safe_path {
                    DirectionCommand::hold()
                } else {
                    DirectionCommand::from_steering(
                        analysis.steering_angle,
                        self.config.haptic.steering_deadband_deg,
                    )
                };
                let admitted = self.throttle.offer(timestamp, command);
                if let Some(command) = admitted {
                    self.link.send(command.to_bytes());
                }
                admitted
            }
            PacketFormat::Intensities => {
                if let Some(haptics) = self.throttle.offer(timestamp, haptics) {
                    self.link.send(haptics.to_bytes());
                }
                None
            }
        };

        if self.log_gate.admit(timestamp) {
            let edges = grid.edges(&self.config.grid).len();
            info!(
                "{analysis} haptics [{haptics}] edges={edges}\n{}",
                grid.render()
            );
        }

        let report = FrameReport {
            analysis,
            grid,
            haptics,
            command,
        };
        self.sink.deliver(report.clone());
        Some(report)
    }
}
