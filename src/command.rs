use crate::analysis_client::interface::AnalysisSource;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    LiveCamera,
    StaticUpload,
}

/// One line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    SwitchView(View),
    Analyze(AnalysisSource),
    Snap,
    Reconnect,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "snap" => Ok(Command::Snap),
            "reconnect" => Ok(Command::Reconnect),
            "quit" | "exit" => Ok(Command::Quit),
            "view" => match rest.to_ascii_lowercase().as_str() {
                "live" => Ok(Command::SwitchView(View::LiveCamera)),
                "upload" => Ok(Command::SwitchView(View::StaticUpload)),
                _ => Err(CommandError::Usage("view live|upload")),
            },
            "analyze" if rest.is_empty() => Err(CommandError::Usage("analyze <path|url>")),
            "analyze" => Ok(Command::Analyze(AnalysisSource::parse(rest))),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
