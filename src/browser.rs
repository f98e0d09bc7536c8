use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::domain::PageNumber;

pub fn comic_page_url(comic_url: &str, story_id: u32, page: PageNumber) -> String {
    format!("{}?s={}&p={}", comic_url, story_id, page)
}

pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    let command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    };

    #[cfg(target_os = "macos")]
    let command = {
        let mut command = Command::new("open");
        command.arg(url);
        command
    };

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let command = {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    };

    launch(command)?;
    Ok(())
}

// Waits on the opener in the background so it is reaped rather than left a zombie.
fn launch(mut command: Command) -> std::io::Result<JoinHandle<()>> {
    let mut child = command.spawn()?;
    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => log::debug!("Browser opener finished"),
            Ok(status) => log::warn!("Browser opener exited with {}", status),
            Err(e) => log::error!("Failed to wait for browser opener: {}", e),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_keeps_padding() {
        assert_eq!(
            comic_page_url("http://www.mspaintadventures.com/", 6, PageNumber::DEFAULT),
            "http://www.mspaintadventures.com/?s=6&p=001901"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launched_opener_is_waited_on() {
        let mut command = Command::new("sh");
        command.args(["-c", "exit 0"]);
        let waiter = launch(command).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(5), waiter)
            .await
            .expect("opener was never waited on")
            .unwrap();
    }

    #[tokio::test]
    async fn missing_opener_is_an_error() {
        assert!(launch(Command::new("definitely-not-a-browser-opener")).is_err());
    }
}
