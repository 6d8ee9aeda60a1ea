pub mod config;
pub mod episode;
pub mod error;
pub mod knowledge;
pub mod port;
pub mod protocol;
pub mod sim;
pub mod threat;
pub mod transcript;
pub mod types;

pub use config::SessionConfig;
pub use episode::{Episode, run_episode};
pub use error::{AgentError, ConfigError, PortError};
pub use knowledge::{GridSize, Knowledge};
pub use port::{EnvironmentPort, StdioPort};
pub use sim::{Scenario, SimWorld};
pub use threat::is_dangerous;
pub use transcript::{RecordingPort, load_transcript};
pub use types::*;
