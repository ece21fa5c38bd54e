use crate::analysis_client::interface::{AnalysisError, AnalysisSource};
use crate::capture_session::lifecycle::SessionInfo;
use crate::command::{Command, CommandError, View};
use crate::config::Config;
use crate::device_camera::interface::CaptureError;
use crate::result_aggregator::{ApplyOutcome, EmotionHistogram, ResultAggregator};
use crate::streaming_channel::interface::{ChannelError, ChannelEvent};
use crate::streaming_channel::message::{EncodedImage, ResultMessage};
use crate::ui_projector::{project, DisplayState};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Idle,
    /// Acquisition in flight. A stop that arrives meanwhile is remembered and
    /// issued once the start has completed.
    Starting { stop_requested: bool },
    Active(SessionInfo),
    /// Teardown in flight. A start that arrives meanwhile is issued once the
    /// stop has completed.
    Stopping { restart_requested: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelStatus {
    Connecting,
    Connected,
    Disconnected { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Empty,
    Analyzing(AnalysisSource),
    Done(DisplayState),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub view: View,
    pub session: SessionStatus,
    pub channel: ChannelStatus,
    pub aggregator: ResultAggregator,
    pub latest_result: Option<ResultMessage>,
    /// Annotated image from the legacy endpoint; shown until the next result.
    pub snapshot_image: Option<EncodedImage>,
    pub stale_results: u64,
    pub upload: UploadState,
    pub notice: Option<String>,
    pub quitting: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            view: View::LiveCamera,
            session: SessionStatus::Idle,
            channel: ChannelStatus::Connecting,
            aggregator: ResultAggregator::new(),
            latest_result: None,
            snapshot_image: None,
            stale_results: 0,
            upload: UploadState::Empty,
            notice: None,
            quitting: false,
        }
    }
}

#[derive(Debug)]
pub enum Event {
    Command(Command),
    CommandRejected(CommandError),
    InputClosed,
    Channel(ChannelEvent),
    ChannelConnectDone(Result<(), ChannelError>),
    SessionStartDone(Result<SessionInfo, CaptureError>),
    SessionStopDone(bool),
    StaticAnalysisDone(Result<ResultMessage, AnalysisError>),
    SnapDone(Result<EncodedImage, Box<dyn std::error::Error + Send + Sync>>),
}

impl Event {
    /// Debug output without the base64 payloads.
    pub fn to_display_string(&self) -> String {
        match self {
            Event::Channel(ChannelEvent::Result(result)) => format!(
                "Channel(Result {{ message: {:?}, seq: {:?}, categories: {} }})",
                result.message,
                result.seq,
                result.category_values.len()
            ),
            Event::StaticAnalysisDone(Ok(result)) => {
                format!("StaticAnalysisDone(Ok({:?}))", result.message)
            }
            Event::SnapDone(Ok(_)) => "SnapDone(Ok(..))".to_string(),
            event => format!("{:?}", event),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SubscribeToCommands,
    SubscribeToChannelEvents,
    ConnectChannel,
    StartSession,
    StopSession,
    AnalyzeStatic(AnalysisSource),
    Snap,
    Shutdown,
}

pub fn init(config: &Config) -> (Model, Vec<Effect>) {
    let mut model = Model::default();
    let mut effects = vec![
        Effect::SubscribeToChannelEvents,
        Effect::ConnectChannel,
        Effect::SubscribeToCommands,
    ];

    if config.autostart {
        model.session = SessionStatus::Starting {
            stop_requested: false,
        };
        effects.push(Effect::StartSession);
    }

    (model, effects)
}

pub fn transition(_config: &Config, mut model: Model, event: Event) -> (Model, Vec<Effect>) {
    match event {
        Event::Command(command) => {
            model.notice = None;
            on_command(model, command)
        }
        Event::CommandRejected(error) => {
            model.notice = Some(error.to_string());
            (model, vec![])
        }
        Event::InputClosed => {
            model.quitting = true;
            (model, vec![Effect::Shutdown])
        }

        // Channel
        // Status follows the subscriber stream alone.
        Event::Channel(ChannelEvent::Connected) => {
            model.channel = ChannelStatus::Connected;
            (model, vec![])
        }
        Event::ChannelConnectDone(Ok(())) => (model, vec![]),
        Event::Channel(ChannelEvent::Disconnected { reason }) => {
            model.channel = ChannelStatus::Disconnected { reason };
            (model, vec![])
        }
        Event::ChannelConnectDone(Err(error)) => {
            model.channel = ChannelStatus::Disconnected {
                reason: error.to_string(),
            };
            (model, vec![])
        }
        Event::Channel(ChannelEvent::Result(result)) => {
            match model.aggregator.apply(&result) {
                ApplyOutcome::Applied { .. } => {
                    model.latest_result = Some(result);
                    model.snapshot_image = None;
                }
                ApplyOutcome::Stale { .. } => model.stale_results += 1,
            }
            (model, vec![])
        }

        // Session
        Event::SessionStartDone(Ok(info)) => match model.session {
            SessionStatus::Starting {
                stop_requested: true,
            } => {
                model.session = SessionStatus::Stopping {
                    restart_requested: false,
                };
                (model, vec![Effect::StopSession])
            }
            SessionStatus::Starting {
                stop_requested: false,
            } => {
                model.session = SessionStatus::Active(info);
                (model, vec![])
            }
            _ => (model, vec![]),
        },
        Event::SessionStartDone(Err(error)) => {
            if matches!(model.session, SessionStatus::Starting { .. }) {
                model.session = SessionStatus::Idle;
            }
            model.notice = Some(format!("Could not start the camera: {}", error));
            (model, vec![])
        }
        Event::SessionStopDone(_) => match model.session {
            SessionStatus::Stopping {
                restart_requested: true,
            } => {
                model.session = SessionStatus::Starting {
                    stop_requested: false,
                };
                (model, vec![Effect::StartSession])
            }
            SessionStatus::Stopping { .. } => {
                model.session = SessionStatus::Idle;
                (model, vec![])
            }
            _ => (model, vec![]),
        },

        // One-shot calls
        Event::StaticAnalysisDone(Ok(result)) => {
            let mut histogram = EmotionHistogram::default();
            histogram.replace_from(&result.category_values);
            model.upload = UploadState::Done(project(Some(&result), &histogram));
            (model, vec![])
        }
        Event::StaticAnalysisDone(Err(error)) => {
            model.upload = UploadState::Failed(error.to_string());
            (model, vec![])
        }
        Event::SnapDone(Ok(image)) => {
            model.snapshot_image = Some(image);
            (model, vec![])
        }
        Event::SnapDone(Err(error)) => {
            model.notice = Some(format!("Snapshot failed: {}", error));
            (model, vec![])
        }
    }
}

fn on_command(mut model: Model, command: Command) -> (Model, Vec<Effect>) {
    match command {
        Command::Start if model.view != View::LiveCamera => {
            model.notice = Some("Switch to the live view to start the camera".to_string());
            (model, vec![])
        }
        Command::Start => request_start(model),
        Command::Stop => request_stop(model),
        Command::SwitchView(view) => {
            model.view = view;
            request_stop(model)
        }
        Command::Analyze(source) => {
            model.view = View::StaticUpload;
            model.upload = UploadState::Analyzing(source.clone());
            let (model, mut effects) = request_stop(model);
            effects.push(Effect::AnalyzeStatic(source));
            (model, effects)
        }
        Command::Snap => {
            if matches!(model.session, SessionStatus::Active(_)) {
                (model, vec![Effect::Snap])
            } else {
                model.notice = Some("Start the camera before taking a snapshot".to_string());
                (model, vec![])
            }
        }
        Command::Reconnect => {
            model.channel = ChannelStatus::Connecting;
            (model, vec![Effect::ConnectChannel])
        }
        Command::Quit => {
            model.quitting = true;
            (model, vec![Effect::Shutdown])
        }
    }
}

fn request_start(mut model: Model) -> (Model, Vec<Effect>) {
    match model.session {
        SessionStatus::Idle => {
            model.session = SessionStatus::Starting {
                stop_requested: false,
            };
            (model, vec![Effect::StartSession])
        }
        SessionStatus::Starting { .. } => {
            model.session = SessionStatus::Starting {
                stop_requested: false,
            };
            (model, vec![])
        }
        SessionStatus::Stopping { .. } => {
            model.session = SessionStatus::Stopping {
                restart_requested: true,
            };
            (model, vec![])
        }
        SessionStatus::Active(_) => (model, vec![]),
    }
}

fn request_stop(mut model: Model) -> (Model, Vec<Effect>) {
    match model.session {
        SessionStatus::Idle => (model, vec![]),
        SessionStatus::Starting { .. } => {
            model.session = SessionStatus::Starting {
                stop_requested: true,
            };
            (model, vec![])
        }
        SessionStatus::Active(_) => {
            model.session = SessionStatus::Stopping {
                restart_requested: false,
            };
            (model, vec![Effect::StopSession])
        }
        SessionStatus::Stopping { .. } => {
            model.session = SessionStatus::Stopping {
                restart_requested: false,
            };
            (model, vec![])
        }
    }
}
