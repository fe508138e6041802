//! Remote control via Unix socket
//!
//! Accepts line commands over a Unix socket to drive the viewer:
//! parameter changes, pattern selection, save/load and quit.

use crate::geometry::Point;
use crate::params::ParamUpdate;
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

const SOCKET_PATH: &str = "/tmp/kaleidoscope.sock";

/// Commands that can be sent over the socket
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set(ParamUpdate),
    Pattern(usize),
    ToggleSpin,
    ToggleFps,
    Save,
    Load,
    Quit,
}

/// Parse a parameter change: JSON (`{"power": 3}`) or `key value` text
/// (`power 3`, `angle -45`, `rotation 10`, `center 320 240`).
pub fn parse_update(line: &str) -> Option<ParamUpdate> {
    let line = line.trim();
    if line.starts_with('{') {
        return serde_json::from_str::<ParamUpdate>(line)
            .ok()
            .filter(|u| !u.is_empty());
    }

    let mut parts = line.split_whitespace();
    let key = parts.next()?.to_lowercase();
    let mut number = || parts.next().and_then(|v| v.parse::<f32>().ok());
    let mut update = ParamUpdate::default();
    match key.as_str() {
        "power" | "p" => update.power = Some(number()?),
        "angle" | "a" => update.angle = Some(number()?),
        "rotation" | "rot" | "r" => update.polar_rotation = Some(number()?),
        "center" | "c" => {
            let x = number()?;
            let y = number()?;
            update.polar_center = Some(Point::new(x, y));
        },
        _ => return None,
    }
    Some(update)
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    _listener_thread: thread::JoinHandle<()>,
}

impl Controller {
    /// Create a new controller listening on the Unix socket
    pub fn new() -> Result<Self, String> {
        // Remove existing socket if present
        let _ = std::fs::remove_file(SOCKET_PATH);

        let listener = UnixListener::bind(SOCKET_PATH)
            .map_err(|e| format!("Failed to bind socket: {}", e))?;

        // Set non-blocking so we can check for new connections
        listener
            .set_nonblocking(true)
            .map_err(|e| format!("Failed to set non-blocking: {}", e))?;

        let (sender, receiver) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::listener_loop(listener, sender);
        });

        tracing::info!(path = SOCKET_PATH, "control socket listening");

        Ok(Self {
            receiver,
            _listener_thread: handle,
        })
    }

    fn listener_loop(listener: UnixListener, sender: Sender<Command>) {
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, sender);
                    });
                },
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No connection ready, sleep briefly
                    thread::sleep(std::time::Duration::from_millis(50));
                },
                Err(e) => {
                    tracing::warn!(error = %e, "control socket closed");
                    break;
                },
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: Sender<Command>) {
        // The accepted stream inherits non-blocking mode on some platforms
        let _ = stream.set_nonblocking(false);
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(Result::ok) {
            match Self::parse_command(&line) {
                Some(cmd) => {
                    if sender.send(cmd).is_err() {
                        break;
                    }
                },
                None => tracing::warn!(line = %line.trim(), "unknown control command"),
            }
        }
    }

    fn parse_command(line: &str) -> Option<Command> {
        let line = line.trim().to_lowercase();
        match line.as_str() {
            "spin" => Some(Command::ToggleSpin),
            "f" | "fps" => Some(Command::ToggleFps),
            "s" | "save" => Some(Command::Save),
            "l" | "load" => Some(Command::Load),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => {
                // "pattern N", a bare number, or a parameter change
                if let Some(rest) = line.strip_prefix("pattern ") {
                    rest.trim().parse().ok().map(Command::Pattern)
                } else if let Ok(n) = line.parse() {
                    Some(Command::Pattern(n))
                } else {
                    parse_update(&line).map(Command::Set)
                }
            },
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        while let Ok(cmd) = self.receiver.try_recv() {
            commands.push(cmd);
        }
        commands
    }

    /// Get the socket path
    pub fn socket_path() -> &'static str {
        SOCKET_PATH
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // Clean up the socket file
        let _ = std::fs::remove_file(SOCKET_PATH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Controller::parse_command("quit"), Some(Command::Quit));
        assert_eq!(Controller::parse_command(" SAVE \n"), Some(Command::Save));
        assert_eq!(Controller::parse_command("spin"), Some(Command::ToggleSpin));
        assert_eq!(Controller::parse_command("pattern 3"), Some(Command::Pattern(3)));
        assert_eq!(Controller::parse_command("2"), Some(Command::Pattern(2)));
        assert_eq!(Controller::parse_command("dance"), None);
    }

    #[test]
    fn test_parse_parameter_commands() {
        assert_eq!(
            Controller::parse_command("power 3"),
            Some(Command::Set(ParamUpdate {
                power: Some(3.0),
                ..ParamUpdate::default()
            }))
        );
        assert_eq!(
            Controller::parse_command("Angle -45.5"),
            Some(Command::Set(ParamUpdate {
                angle: Some(-45.5),
                ..ParamUpdate::default()
            }))
        );
        assert_eq!(
            Controller::parse_command("center 10 20"),
            Some(Command::Set(ParamUpdate {
                polar_center: Some(Point::new(10.0, 20.0)),
                ..ParamUpdate::default()
            }))
        );
        assert_eq!(Controller::parse_command("power"), None);
        assert_eq!(Controller::parse_command("center 10"), None);
    }

    #[test]
    fn test_parse_update_json() {
        let update = parse_update(r#"{"power": 4, "polar_rotation": 12.5}"#).unwrap();
        assert_eq!(update.power, Some(4.0));
        assert_eq!(update.polar_rotation, Some(12.5));
        assert_eq!(update.angle, None);
        assert_eq!(parse_update("{}"), None);
        assert_eq!(parse_update("{not json"), None);
    }
}
