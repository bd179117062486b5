//! Audio playback through a platform player command
//!
//! Playback shells out to whichever known player is installed, chosen from
//! an ordered per-platform candidate table (first available wins). A
//! missing player or a failed playback is logged by the caller and never
//! ends the session.

use std::path::Path;
use std::process::Command;

use crate::error::PlaybackError;

/// Ordered playback candidates for an OS family, first available wins
///
/// Linux prefers ALSA's `aplay`, then SoX's `play`, then PulseAudio's
/// `paplay`. macOS ships `afplay`. Windows goes through PowerShell's
/// `Media.SoundPlayer`.
fn candidate_players(os: &str) -> Option<&'static [&'static str]> {
    match os {
        "linux" | "freebsd" | "openbsd" | "netbsd" => Some(&["aplay", "play", "paplay"]),
        "macos" => Some(&["afplay"]),
        "windows" => Some(&["powershell"]),
        _ => None,
    }
}

/// Pick the first candidate the availability predicate accepts
fn select_player<'a>(
    candidates: &'a [&'a str],
    is_available: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    candidates.iter().copied().find(|p| is_available(p))
}

/// Build the blocking invocation for a given player and clip
fn player_command(program: &str, clip: &Path) -> Command {
    let mut command = Command::new(program);
    if program == "powershell" {
        // SoundPlayer blocks until the clip finishes; the clip path is a
        // program-controlled scratch path, not user text
        command.arg("-NoProfile").arg("-Command").arg(format!(
            "(New-Object Media.SoundPlayer '{}').PlaySync();",
            clip.display()
        ));
    } else {
        command.arg(clip);
    }
    command
}

/// Plays WAV clips through the platform's default output
pub struct SystemPlayer {
    os: &'static str,
}

impl SystemPlayer {
    /// Create a player for the current platform
    #[must_use]
    pub const fn new() -> Self {
        Self {
            os: std::env::consts::OS,
        }
    }

    /// Play a clip to completion
    ///
    /// # Errors
    ///
    /// Returns error if the platform has no known player, no candidate is
    /// installed, the clip is missing, or the player exits non-zero
    pub fn play(&self, clip: &Path) -> Result<(), PlaybackError> {
        if !clip.exists() {
            return Err(PlaybackError::MissingClip {
                path: clip.to_path_buf(),
            });
        }

        let candidates = candidate_players(self.os)
            .ok_or(PlaybackError::UnsupportedPlatform(self.os))?;

        let program = select_player(candidates, |p| which::which(p).is_ok()).ok_or_else(|| {
            PlaybackError::NoPlayerAvailable {
                tried: candidates.join(", "),
            }
        })?;

        tracing::debug!(player = program, clip = %clip.display(), "playing");

        let output = player_command(program, clip).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(player = program, status = %output.status, stderr = %stderr, "playback failed");
            return Err(PlaybackError::CommandFailed {
                program: program.to_string(),
                status: output.status,
                stderr,
            });
        }

        Ok(())
    }
}

impl Default for SystemPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_candidate_order() {
        assert_eq!(
            candidate_players("linux"),
            Some(&["aplay", "play", "paplay"][..])
        );
        assert_eq!(candidate_players("macos"), Some(&["afplay"][..]));
        assert_eq!(candidate_players("redox"), None);
    }

    #[test]
    fn test_select_first_available() {
        let candidates = ["aplay", "play", "paplay"];

        // aplay absent, play present: fallback picks play
        let selected = select_player(&candidates, |p| p != "aplay");
        assert_eq!(selected, Some("play"));

        let none = select_player(&candidates, |_| false);
        assert_eq!(none, None);
    }

    #[test]
    fn test_select_respects_order() {
        let candidates = ["aplay", "play"];
        let selected = select_player(&candidates, |_| true);
        assert_eq!(selected, Some("aplay"));
    }

    #[test]
    fn test_player_command_passes_clip_as_argument() {
        let command = player_command("aplay", Path::new("/tmp/out.wav"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec![std::ffi::OsStr::new("/tmp/out.wav")]);
    }

    #[test]
    fn test_missing_clip_is_reported() {
        let player = SystemPlayer::new();
        let err = player.play(Path::new("/no/such/clip.wav")).unwrap_err();
        assert!(matches!(err, PlaybackError::MissingClip { .. }));
    }
}
