//! Caption length report
//!
//! Counts each channel's effective caption against the configured soft
//! limit. The report is advisory: nothing here blocks a commit.
//!
//! # Example
//!
//! ```no_run
//! use libpostdeck::composer::Composer;
//! use libpostdeck::service::validation::CaptionReport;
//!
//! # fn example() -> libpostdeck::Result<()> {
//! let mut composer = Composer::with_defaults();
//! composer.set_master_caption("Hello");
//! composer.add_channel("x", None)?;
//!
//! let report = CaptionReport::for_composer(&composer);
//! for channel in &report.channels {
//!     println!("{}: {}/{}", channel.platform_id, channel.char_count, report.soft_limit);
//! }
//! # Ok(())
//! # }
//! ```

use serde::Serialize;

use crate::composer::Composer;

/// Caption counts for every selected channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionReport {
    pub soft_limit: usize,
    pub channels: Vec<ChannelCaptionCount>,
}

/// One channel's caption measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelCaptionCount {
    pub platform_id: String,
    /// Characters, not bytes
    pub char_count: usize,
    pub over_limit: bool,
    /// Non-blocking hints shown next to the counter
    pub warnings: Vec<String>,
}

impl CaptionReport {
    pub fn for_composer(composer: &Composer) -> Self {
        let captions = composer.captions();
        let soft_limit = captions.soft_limit();

        let channels = composer
            .channels()
            .ids()
            .map(|id| {
                let char_count = captions.char_count(id);
                let over_limit = captions.is_over_soft_limit(id);
                let mut warnings = Vec::new();

                if over_limit {
                    warnings.push(format!(
                        "Caption is {} characters over the {} character guideline",
                        char_count - soft_limit,
                        soft_limit
                    ));
                }
                if captions.effective_caption(id).trim().is_empty()
                    && composer.effective_media(id).is_empty()
                {
                    warnings.push("Nothing to post on this channel yet".to_string());
                }

                ChannelCaptionCount {
                    platform_id: id.to_string(),
                    char_count,
                    over_limit,
                    warnings,
                }
            })
            .collect();

        Self {
            soft_limit,
            channels,
        }
    }

    pub fn any_over_limit(&self) -> bool {
        self.channels.iter().any(|c| c.over_limit)
    }

    pub fn channel(&self, platform_id: &str) -> Option<&ChannelCaptionCount> {
        self.channels.iter().find(|c| c.platform_id == platform_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlatformCatalog;
    use crate::config::ComposerSettings;

    fn composer_with_limit(limit: usize) -> Composer {
        let settings = ComposerSettings {
            caption_soft_limit: limit,
            ..ComposerSettings::default()
        };
        Composer::new(PlatformCatalog::builtin(), settings)
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let mut composer = composer_with_limit(280);
        composer.set_master_caption("héllo wörld");
        composer.add_channel("x", None).unwrap();

        let report = CaptionReport::for_composer(&composer);
        assert_eq!(report.channel("x").unwrap().char_count, 11);
    }

    #[test]
    fn test_over_limit_is_reported_per_channel() {
        let mut composer = composer_with_limit(10);
        composer.set_master_caption("short");
        composer.add_channel("instagram", None).unwrap();
        composer.add_channel("x", None).unwrap();
        composer
            .edit_channel_caption("x", "this one is far too long")
            .unwrap();

        let report = CaptionReport::for_composer(&composer);
        assert!(report.any_over_limit());
        assert!(!report.channel("instagram").unwrap().over_limit);

        let x = report.channel("x").unwrap();
        assert!(x.over_limit);
        assert_eq!(x.warnings.len(), 1);
        assert!(x.warnings[0].contains("14 characters over"));
    }

    #[test]
    fn test_empty_channel_is_flagged() {
        let mut composer = composer_with_limit(280);
        composer.set_master_caption("Hello");
        composer.add_channel("instagram", None).unwrap();
        composer.edit_channel_caption("instagram", "mine").unwrap();
        composer.add_channel("facebook", None).unwrap();

        let report = CaptionReport::for_composer(&composer);
        assert!(report.channel("instagram").unwrap().warnings.is_empty());
        assert_eq!(
            report.channel("facebook").unwrap().warnings,
            vec!["Nothing to post on this channel yet".to_string()]
        );
    }

    #[test]
    fn test_report_follows_selection_order() {
        let mut composer = composer_with_limit(280);
        composer.add_channel("youtube", None).unwrap();
        composer.add_channel("instagram", None).unwrap();

        let report = CaptionReport::for_composer(&composer);
        let ids: Vec<_> = report.channels.iter().map(|c| c.platform_id.as_str()).collect();
        assert_eq!(ids, vec!["youtube", "instagram"]);
    }
}
