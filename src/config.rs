use std::path::PathBuf;
use std::time::Duration;

use envconfig::Envconfig;

const STATE_FILE_NAME: &str = ".mspaupdate";

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(
        from = "MSPANOTIFY_FEED_URL",
        default = "http://www.mspaintadventures.com/rss/rss.xml"
    )]
    pub feed_url: String,
    #[envconfig(
        from = "MSPANOTIFY_COMIC_URL",
        default = "http://www.mspaintadventures.com/"
    )]
    pub comic_url: String,
    #[envconfig(from = "MSPANOTIFY_STORY_ID", default = "6")]
    pub story_id: u32,
    #[envconfig(from = "MSPANOTIFY_STATE_FILE")]
    pub state_file_path: Option<PathBuf>,
    #[envconfig(from = "MSPANOTIFY_CHECK_INTERVAL_SECS", default = "600")]
    pub check_interval_secs: u64,
    #[envconfig(from = "MSPANOTIFY_FETCH_TIMEOUT_SECS", default = "30")]
    pub fetch_timeout_secs: u64,
    #[envconfig(from = "MSPANOTIFY_SOUND", default = "true")]
    pub sound: bool,
    #[envconfig(from = "MSPANOTIFY_SOUND_PLAYER", default = "paplay")]
    pub sound_player: String,
    #[envconfig(from = "MSPANOTIFY_MACROS_DIR", default = "macros")]
    pub macros_dir: PathBuf,
    #[envconfig(from = "MSPANOTIFY_LISTEN_ADDR", default = "127.0.0.1:8080")]
    pub listen_addr: String,
}

impl Config {
    pub fn state_file_path(&self) -> anyhow::Result<PathBuf> {
        match &self.state_file_path {
            Some(path) => Ok(path.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(STATE_FILE_NAME))
                .ok_or_else(|| anyhow::anyhow!("Unable to resolve the home directory")),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_original_applet() {
        let config = Config::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(config.story_id, 6);
        assert_eq!(config.check_interval_secs, 600);
        assert!(config.sound);
        assert!(config.state_file_path.is_none());
    }

    #[test]
    fn state_file_override_wins() {
        let mut env = HashMap::new();
        env.insert(
            "MSPANOTIFY_STATE_FILE".to_string(),
            "/tmp/mspa-state".to_string(),
        );
        let config = Config::init_from_hashmap(&env).unwrap();
        assert_eq!(
            config.state_file_path().unwrap(),
            PathBuf::from("/tmp/mspa-state")
        );
    }
}
