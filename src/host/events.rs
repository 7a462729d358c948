/// Control commands (one per line on stdin) routed into host events.
use chrono::FixedOffset;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::FaceError;
use crate::host::HostEvent;

/// Parse one control line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<HostEvent>, FaceError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    let event = match command.as_str() {
        "ambient" => HostEvent::Ambient(parse_switch(&command, arg)?),
        "visible" | "visibility" => HostEvent::Visibility(parse_switch(&command, arg)?),
        "show" => HostEvent::Visibility(true),
        "hide" => HostEvent::Visibility(false),
        "tz" | "timezone" => {
            let arg = required(&command, arg)?;
            HostEvent::TimezoneChanged(parse_offset(arg)?)
        }
        "unread" => {
            let arg = required(&command, arg)?;
            let count = arg.parse().map_err(|_| FaceError::BadArgument {
                command: command.clone(),
                detail: format!("'{arg}' is not a count"),
            })?;
            HostEvent::UnreadCount(count)
        }
        "tick" => HostEvent::TimeTick,
        "redraw" => HostEvent::Redraw,
        "quit" | "exit" => HostEvent::Quit,
        _ => return Err(FaceError::UnknownCommand(line.to_string())),
    };
    Ok(Some(event))
}

/// Parse a `+HH:MM` / `-HH:MM` (or `Z`) UTC offset.
pub fn parse_offset(s: &str) -> Result<FixedOffset, FaceError> {
    let bad = || FaceError::Timezone(s.to_string());

    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(bad);
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(bad()),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().map_err(|_| bad())?;
    let minutes: i32 = minutes.parse().map_err(|_| bad())?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(bad());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(bad)
}

fn parse_switch(command: &str, arg: Option<&str>) -> Result<bool, FaceError> {
    match arg.map(str::to_lowercase).as_deref() {
        Some("on" | "true" | "1") => Ok(true),
        Some("off" | "false" | "0") => Ok(false),
        other => Err(FaceError::BadArgument {
            command: command.to_string(),
            detail: format!("expected on/off, got {:?}", other.unwrap_or("")),
        }),
    }
}

fn required<'a>(command: &str, arg: Option<&'a str>) -> Result<&'a str, FaceError> {
    arg.ok_or_else(|| FaceError::BadArgument {
        command: command.to_string(),
        detail: "missing argument".to_string(),
    })
}

/// Forward stdin control lines to the runtime until EOF or the loop stops.
pub async fn read_stdin(tx: mpsc::Sender<HostEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(Some(event)) => {
                    debug!("Control: {:?}", event);
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            },
            Ok(None) => {
                info!("Control input closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read control input: {}", e);
                break;
            }
        }
    }
}
