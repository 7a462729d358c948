use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up or driving the watch face.
#[derive(Debug, Error)]
pub enum FaceError {
    #[error("failed to read font file {path}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a usable TrueType/OpenType font")]
    FontParse { path: PathBuf },

    #[error("cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },

    #[error("invalid timezone offset '{0}', expected +HH:MM or -HH:MM")]
    Timezone(String),

    #[error("unknown host command: {0}")]
    UnknownCommand(String),

    #[error("bad argument for '{command}': {detail}")]
    BadArgument { command: String, detail: String },
}
