//! Owns the renderer process that is currently drawing on the display.
//!
//! Only one renderer may map the framebuffer at a time. Every new animation
//! first terminates and reaps the previous one, so callers never need to
//! coordinate access to the display themselves.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::{debug, info, warn};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::process::Child;

use crate::config::ExternalCommand;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("failed to start renderer for {}: {1}", .0.display())]
    Spawn(PathBuf, std::io::Error),
}

struct Animation {
    child: Child,
    path: PathBuf,
}

pub struct AnimationSupervisor {
    renderer: ExternalCommand,
    current: Option<Animation>,
}

impl AnimationSupervisor {
    pub fn new(renderer: ExternalCommand) -> Self {
        Self {
            renderer,
            current: None,
        }
    }

    /// Replace whatever is on screen with the animation in `path`.
    ///
    /// With `loop_once` this waits for the renderer to finish the sequence
    /// and leaves nothing running. A wait abandoned part way still leaves the
    /// renderer tracked, so `stop` can terminate it. Otherwise the renderer
    /// keeps looping in the background until the next `play` or `stop`.
    pub async fn play(
        &mut self,
        path: &Path,
        loop_once: bool,
        frame_delay: Duration,
    ) -> Result<(), SupervisorError> {
        self.stop().await;

        let spawn_error = |e| SupervisorError::Spawn(path.to_owned(), e);
        let mut cmd = self.renderer.to_command().map_err(spawn_error)?;
        cmd.arg("-d").arg(frame_delay.as_millis().to_string());
        if loop_once {
            cmd.arg("-l");
        }
        cmd.arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(spawn_error)?;
        info!(
            "started animation {} (pid {})",
            path.display(),
            child.id().unwrap_or_default()
        );
        let animation = self.current.insert(Animation {
            child,
            path: path.to_owned(),
        });

        if loop_once {
            // if this future is dropped mid-wait the child stays in `current`
            // for the next stop()
            match animation.child.wait().await {
                Ok(status) => info!("animation {} finished: {status}", path.display()),
                Err(e) => warn!("failed to wait for animation {}: {e}", path.display()),
            }
            self.current = None;
        }
        Ok(())
    }

    /// Terminate the running animation, if any, and wait for it to exit.
    pub async fn stop(&mut self) {
        if let Some(animation) = self.current.take() {
            terminate(animation).await;
        }
    }

    /// Whether an animation is on screen. A renderer that has already exited
    /// on its own is reaped here and no longer counts.
    pub fn is_running(&mut self) -> bool {
        let Some(animation) = self.current.as_mut() else {
            return false;
        };
        match animation.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                warn!(
                    "animation {} exited on its own: {status}",
                    animation.path.display()
                );
                self.current = None;
                false
            }
            Err(e) => {
                warn!("failed to poll animation {}: {e}", animation.path.display());
                true
            }
        }
    }
}

async fn terminate(mut animation: Animation) {
    if let Some(pid) = animation.child.id() {
        debug!("sending SIGTERM to animation pid {pid}");
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            // already gone; wait() below still reaps it
            debug!("SIGTERM to pid {pid} failed: {e}");
        }
    }
    match animation.child.wait().await {
        Ok(status) => info!("stopped animation {}: {status}", animation.path.display()),
        Err(e) => warn!(
            "failed to reap animation {}: {e}",
            animation.path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;

    /// A renderer that runs `script` under /bin/sh with the renderer
    /// arguments as `$1`.. (`-d`, delay, optional `-l`, path).
    fn sh_renderer(script: &str) -> ExternalCommand {
        ExternalCommand(vec![
            "/bin/sh".to_string(),
            "-c".to_string(),
            script.to_string(),
            "renderer".to_string(),
        ])
    }

    fn current_pid(supervisor: &AnimationSupervisor) -> Pid {
        let child = &supervisor.current.as_ref().unwrap().child;
        Pid::from_raw(child.id().unwrap() as i32)
    }

    fn is_alive(pid: Pid) -> bool {
        !matches!(kill(pid, None), Err(Errno::ESRCH))
    }

    #[tokio::test]
    async fn test_play_replaces_previous_animation() {
        let mut supervisor = AnimationSupervisor::new(sh_renderer("exec sleep 30"));
        let delay = Duration::from_millis(100);

        supervisor.play(Path::new("happy"), false, delay).await.unwrap();
        assert!(supervisor.is_running());
        let first = current_pid(&supervisor);

        supervisor.play(Path::new("sad"), false, delay).await.unwrap();
        let second = current_pid(&supervisor);
        assert_ne!(first, second);
        assert!(!is_alive(first));
        assert!(is_alive(second));

        supervisor.stop().await;
        assert!(!supervisor.is_running());
        assert!(!is_alive(second));
    }

    #[tokio::test]
    async fn test_renderer_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("args");
        let script = format!("echo \"$@\" >> {}", log.display());
        let mut supervisor = AnimationSupervisor::new(sh_renderer(&script));

        supervisor
            .play(Path::new("booting"), true, Duration::from_millis(20))
            .await
            .unwrap();
        supervisor
            .play(Path::new("emotions/blink"), false, Duration::from_millis(100))
            .await
            .unwrap();
        // the looping renderer runs detached, give it time to log
        for _ in 0..50 {
            if std::fs::read_to_string(&log).unwrap().lines().count() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        supervisor.stop().await;

        let args = std::fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = args.lines().collect();
        assert_eq!(lines[0], "-d 20 -l booting");
        assert_eq!(lines[1], "-d 100 emotions/blink");
    }

    #[tokio::test]
    async fn test_loop_once_blocks_until_exit() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("done");
        let script = format!("sleep 0.2; touch {}", marker.display());
        let mut supervisor = AnimationSupervisor::new(sh_renderer(&script));

        supervisor
            .play(Path::new("booting"), true, Duration::from_millis(20))
            .await
            .unwrap();
        assert!(marker.exists());
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn test_abandoned_loop_once_can_be_stopped() {
        let mut supervisor = AnimationSupervisor::new(sh_renderer("exec sleep 30"));
        let wait = supervisor.play(Path::new("booting"), true, Duration::from_millis(20));
        assert!(
            tokio::time::timeout(Duration::from_millis(200), wait)
                .await
                .is_err()
        );

        assert!(supervisor.is_running());
        let pid = current_pid(&supervisor);
        supervisor.stop().await;
        assert!(!supervisor.is_running());
        assert!(!is_alive(pid));
    }

    #[tokio::test]
    async fn test_spawn_failure_leaves_no_handle() {
        let mut supervisor = AnimationSupervisor::new(ExternalCommand::program(
            "/nonexistent/facebox-player",
        ));
        let result = supervisor
            .play(Path::new("charging"), false, Duration::from_millis(100))
            .await;
        assert!(matches!(result, Err(SupervisorError::Spawn(_, _))));
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn test_crashed_renderer_is_reaped() {
        let mut supervisor = AnimationSupervisor::new(sh_renderer("exit 1"));
        supervisor
            .play(Path::new("charging"), false, Duration::from_millis(100))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!supervisor.is_running());
        // and stopping afterwards is harmless
        supervisor.stop().await;
    }

    #[tokio::test]
    async fn test_stop_without_animation() {
        let mut supervisor = AnimationSupervisor::new(sh_renderer("exec sleep 30"));
        supervisor.stop().await;
        assert!(!supervisor.is_running());
    }
}
