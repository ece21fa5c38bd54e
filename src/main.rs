use analysis_client::{
    impl_fake::AnalysisClientFake,
    impl_http::{AnalysisClientHttp, HttpAnalysisConfig},
    interface::AnalysisClient,
};
use clap::Parser;
use cli::{AnalysisBackend, Args, CameraBackend, ChannelBackend, DisplayBackend};
use device_camera::{
    impl_fake::DeviceCameraFake, impl_still_images::DeviceCameraStillImages,
    interface::DeviceCamera,
};
use device_display::{
    impl_console::DeviceDisplayConsole, impl_gui::DeviceDisplayGui, interface::DeviceDisplay,
};
use emotion_client::main::EmotionClient;
use library::logger::{impl_console::LoggerConsole, interface::Logger};
use std::io::BufReader;
use std::sync::{Arc, Mutex};
use streaming_channel::{
    impl_fake::StreamingChannelFake,
    impl_websocket::{StreamingChannelWebSocket, WebSocketChannelConfig},
    interface::StreamingChannel,
};

mod analysis_client;
mod capture_session;
mod cli;
mod command;
mod config;
mod device_camera;
mod device_display;
mod emotion_client;
mod frame_scheduler;
mod library;
mod result_aggregator;
mod streaming_channel;
mod ui_projector;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let config = args.to_config();

    let logger: Arc<dyn Logger + Send + Sync> =
        Arc::new(LoggerConsole::new(config.logger_timezone));

    let device_camera: Arc<dyn DeviceCamera + Send + Sync> = match &args.camera {
        CameraBackend::Fake => Arc::new(DeviceCameraFake::new(logger.clone())),
        CameraBackend::Stills(dir) => {
            Arc::new(DeviceCameraStillImages::new(dir.clone(), logger.clone()))
        }
    };

    let streaming_channel: Arc<dyn StreamingChannel + Send + Sync> = match args.channel {
        ChannelBackend::Fake => Arc::new(StreamingChannelFake::new(logger.clone(), true)),
        ChannelBackend::Websocket => Arc::new(StreamingChannelWebSocket::new(
            WebSocketChannelConfig {
                url: config.stream_url.clone(),
                tag_frames: config.tag_frames,
                queue_capacity: config.queue_capacity,
            },
            logger.clone(),
        )),
    };

    let analysis_client: Arc<dyn AnalysisClient + Send + Sync> = match args.analysis {
        AnalysisBackend::Fake => Arc::new(AnalysisClientFake::new(logger.clone())),
        AnalysisBackend::Http => Arc::new(AnalysisClientHttp::new(
            HttpAnalysisConfig {
                analyze_url: config.analyze_url.clone(),
                predict_url: config.predict_url.clone(),
                timeout: config.request_timeout,
            },
            logger.clone(),
        )),
    };

    let device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>> = match args.display {
        DisplayBackend::Console => Arc::new(Mutex::new(DeviceDisplayConsole::new())),
        DisplayBackend::Gui => Arc::new(Mutex::new(DeviceDisplayGui::new())),
    };

    let _ = logger.info(&format!("Starting with {:?}", config));

    let client = EmotionClient::new(
        config,
        logger,
        device_camera,
        streaming_channel,
        analysis_client,
        device_display,
        Box::new(BufReader::new(std::io::stdin())),
    );

    client.run()
}
