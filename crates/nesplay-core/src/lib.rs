pub mod agent;
pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod game_state;
pub mod history;
pub mod macro_table;
pub mod primitive;
pub mod response_parser;
pub mod stats;

pub use agent::{Agent, CycleOutcome};
pub use channel::{ActionChannel, ChannelError, FileActionChannel};
pub use dispatcher::{ActionDispatcher, DispatchResult};
pub use error::CycleError;
pub use frame::FrameSource;
pub use game_state::{GameState, GameStateError, StatsFile};
pub use history::{ActionHistory, HistoryEntry};
pub use macro_table::{ActionName, MacroTable, MacroTableError};
pub use primitive::{InputVocabulary, PrimitiveError, PrimitiveInput};
pub use response_parser::{FormatMatch, ParseFailure, ResponseFormat, ResponseParser};
pub use stats::SessionStats;
