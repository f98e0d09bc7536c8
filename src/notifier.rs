use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use tokio::task::JoinHandle;

use crate::domain::{Capabilities, Notification, PageNumber};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];
const SOUND_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg"];

pub fn media_files(dir: &Path, extensions: &[&str]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

/// Resolves which optional features can work on this machine. Each missing
/// one is reported once here and never looked up again.
pub fn detect_capabilities(macros_dir: &Path, sound_player: &str) -> Capabilities {
    let sound = match find_in_path(sound_player) {
        None => {
            log::warn!("Sound player {} not found, sound disabled", sound_player);
            false
        }
        Some(_) => match media_files(macros_dir, SOUND_EXTENSIONS) {
            Ok(sounds) if !sounds.is_empty() => true,
            Ok(_) => {
                log::warn!(
                    "No sound files in {}, sound disabled",
                    macros_dir.display()
                );
                false
            }
            Err(e) => {
                log::warn!("Unable to read {}: {}, sound disabled", macros_dir.display(), e);
                false
            }
        },
    };
    Capabilities { sound }
}

pub struct Notifier {
    macros_dir: PathBuf,
    sound_player: String,
    capabilities: Capabilities,
    playback: Option<JoinHandle<()>>,
}

impl Notifier {
    pub fn new(
        macros_dir: PathBuf,
        sound_player: String,
        capabilities: Capabilities,
    ) -> anyhow::Result<Self> {
        let images = media_files(&macros_dir, IMAGE_EXTENSIONS).map_err(|e| {
            anyhow::anyhow!("Unable to read macros directory {}: {}", macros_dir.display(), e)
        })?;
        if images.is_empty() {
            anyhow::bail!("No images found in {}", macros_dir.display());
        }
        Ok(Self {
            macros_dir,
            sound_player,
            capabilities,
            playback: None,
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn macros_dir(&self) -> &Path {
        &self.macros_dir
    }

    pub fn show(
        &mut self,
        page: Option<PageNumber>,
        play_sound: bool,
    ) -> anyhow::Result<Notification> {
        let image = self.pick(IMAGE_EXTENSIONS)?.ok_or_else(|| {
            anyhow::anyhow!("No images left in {}", self.macros_dir.display())
        })?;

        let sound = if play_sound && self.capabilities.sound {
            match self.pick(SOUND_EXTENSIONS)? {
                Some(sound) => {
                    self.play(&sound);
                    Some(sound)
                }
                None => None,
            }
        } else {
            None
        };

        log::info!("Showing {}", image.display());
        Ok(Notification {
            image: file_name(&image),
            sound: sound.as_deref().map(file_name),
            page,
        })
    }

    pub fn stop_playback(&mut self) {
        if let Some(handle) = self.playback.take() {
            handle.abort();
        }
    }

    fn pick(&self, extensions: &[&str]) -> anyhow::Result<Option<PathBuf>> {
        let files = media_files(&self.macros_dir, extensions)?;
        Ok(files.choose(&mut rand::thread_rng()).cloned())
    }

    fn play(&mut self, sound: &Path) {
        self.stop_playback();

        let child = tokio::process::Command::new(&self.sound_player)
            .arg(sound)
            .kill_on_drop(true)
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                log::error!("Failed to start {}: {}", self.sound_player, e);
                return;
            }
        };

        let sound = sound.display().to_string();
        self.playback = Some(tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => log::debug!("Finished playing {}", sound),
                Ok(status) => log::error!("Playback of {} failed with {}", sound, status),
                Err(e) => log::error!("Playback of {} failed: {}", sound, e),
            }
        }));
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
