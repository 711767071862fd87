// site/src/services/media.rs

//! Public URLs for images kept in blob storage.

use crate::config::AppConfig;

/// Built once at start-up and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct MediaClient {
  base_url: Option<String>,
  container: String,
}

impl MediaClient {
  pub fn new(base_url: Option<String>, container: String) -> Self {
    Self {
      base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
      container: container.trim_matches('/').to_string(),
    }
  }

  pub fn from_config(config: &AppConfig) -> Self {
    Self::new(config.media_base_url.clone(), config.media_container.clone())
  }

  /// `{base}/{container}/{blob}`, or a site-relative `/media/...` path when no
  /// storage host is configured. Empty blob names have no URL.
  pub fn url_for(&self, blob_name: &str) -> Option<String> {
    let blob = blob_name.trim().trim_start_matches('/');
    if blob.is_empty() {
      return None;
    }
    let base = self.base_url.as_deref().unwrap_or("/media");
    Some(format!("{}/{}/{}", base, self.container, blob))
  }

  pub fn url_for_opt(&self, blob_name: Option<&str>) -> Option<String> {
    blob_name.and_then(|name| self.url_for(name))
  }

  /// Like [`MediaClient::url_for`], but site-relative paths are prefixed with
  /// `origin` so third parties can fetch them.
  pub fn absolute_url_for(&self, blob_name: &str, origin: &str) -> Option<String> {
    let url = self.url_for(blob_name)?;
    if url.starts_with("http://") || url.starts_with("https://") {
      Some(url)
    } else {
      Some(format!("{}{}", origin.trim_end_matches('/'), url))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builds_storage_urls() {
    let media = MediaClient::new(
      Some("https://kihoko.blob.core.windows.net/".to_string()),
      "portfolio-images".to_string(),
    );
    assert_eq!(
      media.url_for("projects/koi/01.jpg").as_deref(),
      Some("https://kihoko.blob.core.windows.net/portfolio-images/projects/koi/01.jpg")
    );
    assert_eq!(
      media.url_for("/flash/02.png").as_deref(),
      Some("https://kihoko.blob.core.windows.net/portfolio-images/flash/02.png")
    );
  }

  #[test]
  fn falls_back_to_local_media_path() {
    let media = MediaClient::new(None, "portfolio-images".to_string());
    assert_eq!(media.url_for("a.jpg").as_deref(), Some("/media/portfolio-images/a.jpg"));
    assert_eq!(media.url_for("  "), None);
    assert_eq!(media.url_for_opt(None), None);
  }

  #[test]
  fn absolute_urls_for_third_parties() {
    let local = MediaClient::new(None, "portfolio-images".to_string());
    assert_eq!(
      local.absolute_url_for("merch/tote.jpg", "https://kihoko.com/").as_deref(),
      Some("https://kihoko.com/media/portfolio-images/merch/tote.jpg")
    );
    let hosted = MediaClient::new(Some("https://cdn.kihoko.com".to_string()), "merch".to_string());
    assert_eq!(
      hosted.absolute_url_for("tote.jpg", "https://kihoko.com").as_deref(),
      Some("https://cdn.kihoko.com/merch/tote.jpg")
    );
  }
}
