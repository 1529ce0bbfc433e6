//! Raw Linux input-event readers.

use std::path::{Path, PathBuf};

use facebox::EV_KEY;
use log::{debug, error, info};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::DaemonError;

/// Size of `struct input_event` on this target: 24 bytes on 64-bit, 16 on
/// 32-bit ARM.
pub const INPUT_EVENT_SIZE: usize = std::mem::size_of::<libc::input_event>();

/// Which device an event came from. The power key lives on its own device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Power,
    Volume,
}

/// An `EV_KEY` event. `value` is 1 for press, 0 for release, 2 for
/// autorepeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub source: InputSource,
    pub code: u16,
    pub value: i32,
}

/// Decode one raw `struct input_event`, returning it only if it is a key
/// event. The timestamp prefix varies in size between targets, so the
/// fields are read from the end of the record.
pub fn parse_key_event(source: InputSource, buf: &[u8]) -> Option<KeyEvent> {
    let n = buf.len();
    if n < 8 {
        return None;
    }
    let event_type = u16::from_ne_bytes([buf[n - 8], buf[n - 7]]);
    if event_type != EV_KEY {
        return None;
    }
    let code = u16::from_ne_bytes([buf[n - 6], buf[n - 5]]);
    let value = i32::from_ne_bytes([buf[n - 4], buf[n - 3], buf[n - 2], buf[n - 1]]);
    Some(KeyEvent {
        source,
        code,
        value,
    })
}

pub struct InputDevice {
    path: PathBuf,
    source: InputSource,
    file: File,
}

impl InputDevice {
    pub async fn open(path: &Path, source: InputSource) -> Result<Self, DaemonError> {
        let file = File::open(path)
            .await
            .map_err(|e| DaemonError::InputDeviceOpenError(path.to_owned(), e))?;
        info!("opened input device {}", path.display());
        Ok(Self {
            path: path.to_owned(),
            source,
            file,
        })
    }

    /// Read until the next key event, skipping sync and other event types.
    pub async fn next_key_event(&mut self) -> std::io::Result<KeyEvent> {
        let mut buf = [0u8; INPUT_EVENT_SIZE];
        loop {
            self.file.read_exact(&mut buf).await?;
            if let Some(event) = parse_key_event(self.source, &buf) {
                debug!(
                    "{}: code {} value {}",
                    self.path.display(),
                    event.code,
                    event.value
                );
                return Ok(event);
            }
        }
    }
}

/// Forward key events from `device` into `tx` until shutdown. A read error
/// ends this source only; the other device keeps working.
pub fn spawn_reader(
    task_tracker: &TaskTracker,
    mut device: InputDevice,
    tx: Sender<KeyEvent>,
    shutdown_token: CancellationToken,
) {
    task_tracker.spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => break,
                result = device.next_key_event() => match result {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("reading {} failed, ignoring it from now on: {e}", device.path.display());
                        break;
                    }
                },
            }
        }
    });
}
