// Copyright 2025 Qcolorize (https://github.com/qcolorize)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Colorizer facade
//!
//! `ColorizerAgent` gates access to a classification capability behind an
//! explicit lifecycle: a configuration document must load before anything
//! else, and markup initialization must additionally find the phrase
//! index on disk. Callers hand in Unicode text and get Unicode text back;
//! the legacy byte encoding never crosses this boundary.

use qcolorize_core::{
    encoding, ClassificationCapability, ColorizeError, ColorizeResult, MarkupPolicy, PhraseMatch,
};
use std::path::Path;
use tracing::{info, warn};

/// Lifecycle state of a facade.
///
/// `ready` implies `configured`; neither flag is ever reset. Note that
/// reloading the configuration intentionally leaves `ready` set even
/// though the new configuration may point at a different index — run
/// [`ColorizerAgent::reinit_markup`] after a reload that changes the
/// index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorizerState {
    configured: bool,
    ready: bool,
}

impl ColorizerState {
    /// Whether a configuration document has been loaded.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Whether markup initialization has completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Stateful facade over a classification capability.
///
/// Each facade owns its capability handle; nothing is shared through
/// globals. To share one heavyweight capability between facades, wrap it
/// in `Arc<parking_lot::Mutex<_>>` (which implements the capability
/// contract) and clone the handle — serializing concurrent calls through
/// that lock is then the caller's explicit arrangement.
pub struct ColorizerAgent<C> {
    capability: C,
    policy: MarkupPolicy,
    state: ColorizerState,
}

impl<C: ClassificationCapability> ColorizerAgent<C> {
    /// Facade with the default strict policy.
    pub fn new(capability: C) -> Self {
        Self::with_policy(capability, MarkupPolicy::default())
    }

    /// Facade with an explicit markup policy. The policy is fixed for the
    /// lifetime of the facade.
    pub fn with_policy(capability: C, policy: MarkupPolicy) -> Self {
        Self {
            capability,
            policy,
            state: ColorizerState::default(),
        }
    }

    /// The markup policy this facade was constructed with.
    pub fn policy(&self) -> MarkupPolicy {
        self.policy
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ColorizerState {
        self.state
    }

    /// Load the configuration document at `path`.
    ///
    /// Fails with [`ColorizeError::MissingFile`] if `path` does not exist
    /// and propagates the capability's own validation failure unchanged;
    /// in both cases the lifecycle state is left untouched.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> ColorizeResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ColorizeError::missing_file(path));
        }
        self.capability.load_config(path)?;
        self.state.configured = true;
        info!(path = %path.display(), "configuration loaded");
        Ok(())
    }

    /// Initialize markup: resolve the index file, require it to exist,
    /// and run the capability's heavyweight initialization.
    pub fn init_markup(&mut self) -> ColorizeResult<()> {
        if !self.state.configured {
            return Err(ColorizeError::NotConfigured);
        }
        let index = self.capability.index_file_name();
        if !Path::new(&index).exists() {
            return Err(ColorizeError::missing_file(&index));
        }
        self.capability.init_markup()?;
        self.state.ready = true;
        info!(index = %index, "markup initialized");
        Ok(())
    }

    /// Alias of [`init_markup`](Self::init_markup) for re-initialization
    /// after the index was rebuilt or the configuration reloaded.
    pub fn reinit_markup(&mut self) -> ColorizeResult<()> {
        self.init_markup()
    }

    /// Mark up `text` according to the facade's policy.
    pub fn markup(&self, text: &str) -> ColorizeResult<String> {
        if !self.state.configured {
            return Err(ColorizeError::NotConfigured);
        }
        let index = self.capability.index_file_name();
        if !Path::new(&index).exists() {
            return Err(ColorizeError::missing_file(&index));
        }

        match self.policy {
            MarkupPolicy::Strict | MarkupPolicy::Degrading => {
                let legacy = encoding::encode(text);
                match self.capability.markup(&legacy) {
                    Ok(out) => Ok(encoding::decode(&out)),
                    Err(err)
                        if self.policy == MarkupPolicy::Degrading && err.is_content_error() =>
                    {
                        warn!(error = %err, "markup degraded, returning input unchanged");
                        Ok(text.to_owned())
                    }
                    Err(err) => Err(err),
                }
            }
            MarkupPolicy::Passthrough => {
                let out = self.capability.markup(text.as_bytes())?;
                String::from_utf8(out).map_err(|_| {
                    ColorizeError::UnsupportedText(
                        "capability returned text that is not valid UTF-8".into(),
                    )
                })
            }
        }
    }

    /// Classify a phrase. Requires a loaded configuration but not an
    /// initialized markup: the capability may load its index lazily.
    pub fn classify_phrase(&self, phrase: &str) -> ColorizeResult<Vec<PhraseMatch>> {
        if !self.state.configured {
            return Err(ColorizeError::NotConfigured);
        }
        self.capability.classify_phrase(phrase)
    }

    /// Canonical form of a word. Always delegates.
    pub fn first_form(&self, word: &str) -> ColorizeResult<String> {
        self.capability.first_form(word)
    }

    /// Path of the phrase index the current configuration refers to.
    /// Always delegates.
    pub fn index_file_name(&self) -> String {
        self.capability.index_file_name()
    }

    /// Build the phrase index from configured sources and write it to
    /// disk.
    pub fn index_to_file(&self) -> ColorizeResult<()> {
        if !self.state.configured {
            return Err(ColorizeError::NotConfigured);
        }
        self.capability.index_to_file()
    }

    /// Engine/index format version. Always delegates.
    pub fn version(&self) -> u32 {
        self.capability.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scriptable capability double.
    #[derive(Default)]
    struct FakeCapability {
        index_path: Option<PathBuf>,
        fail_markup: bool,
        fail_config: bool,
        markup_calls: Arc<AtomicUsize>,
    }

    impl FakeCapability {
        fn with_index(path: PathBuf) -> Self {
            Self {
                index_path: Some(path),
                ..Default::default()
            }
        }
    }

    impl ClassificationCapability for FakeCapability {
        fn version(&self) -> u32 {
            10
        }

        fn index_file_name(&self) -> String {
            self.index_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "phrases.idx".into())
        }

        fn load_config(&mut self, _path: &Path) -> ColorizeResult<()> {
            if self.fail_config {
                return Err(ColorizeError::InvalidConfig("broken document".into()));
            }
            Ok(())
        }

        fn init_markup(&mut self) -> ColorizeResult<()> {
            Ok(())
        }

        fn markup(&self, input: &[u8]) -> ColorizeResult<Vec<u8>> {
            self.markup_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_markup {
                return Err(ColorizeError::UnsupportedText("charset mismatch".into()));
            }
            Ok(input.to_vec())
        }

        fn classify_phrase(&self, _phrase: &str) -> ColorizeResult<Vec<PhraseMatch>> {
            Ok(vec![PhraseMatch {
                class_name: "test".into(),
                rank: 1,
            }])
        }

        fn first_form(&self, word: &str) -> ColorizeResult<String> {
            Ok(word.to_lowercase())
        }

        fn index_to_file(&self) -> ColorizeResult<()> {
            Ok(())
        }
    }

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.xml");
        let index = dir.path().join("phrases.idx");
        std::fs::write(&config, "<Config></Config>").unwrap();
        std::fs::write(&index, "{}").unwrap();
        (dir, config, index)
    }

    #[test]
    fn test_operations_fail_before_load_config() {
        let (_dir, _config, index) = fixture();
        let mut agent = ColorizerAgent::new(FakeCapability::with_index(index));

        assert!(matches!(
            agent.markup("text").unwrap_err(),
            ColorizeError::NotConfigured
        ));
        assert!(matches!(
            agent.classify_phrase("text").unwrap_err(),
            ColorizeError::NotConfigured
        ));
        assert!(matches!(
            agent.init_markup().unwrap_err(),
            ColorizeError::NotConfigured
        ));
        assert!(matches!(
            agent.index_to_file().unwrap_err(),
            ColorizeError::NotConfigured
        ));
    }

    #[test]
    fn test_load_config_missing_path() {
        let mut agent = ColorizerAgent::new(FakeCapability::default());
        let err = agent.load_config("/nonexistent/path.xml").unwrap_err();
        assert!(matches!(err, ColorizeError::MissingFile { .. }));
        assert!(!agent.state().is_configured());
    }

    #[test]
    fn test_failed_capability_load_leaves_state() {
        let (_dir, config, index) = fixture();
        let mut capability = FakeCapability::with_index(index);
        capability.fail_config = true;
        let mut agent = ColorizerAgent::new(capability);

        let err = agent.load_config(&config).unwrap_err();
        assert!(matches!(err, ColorizeError::InvalidConfig(_)));
        assert!(!agent.state().is_configured());
    }

    #[test]
    fn test_classify_allowed_before_init_markup() {
        let (_dir, config, index) = fixture();
        let mut agent = ColorizerAgent::new(FakeCapability::with_index(index));
        agent.load_config(&config).unwrap();

        assert!(!agent.state().is_ready());
        assert_eq!(agent.classify_phrase("word").unwrap().len(), 1);
    }

    #[test]
    fn test_init_markup_requires_index_file() {
        let (dir, config, index) = fixture();
        let mut agent = ColorizerAgent::new(FakeCapability::with_index(index.clone()));
        agent.load_config(&config).unwrap();

        std::fs::remove_file(&index).unwrap();
        let err = agent.init_markup().unwrap_err();
        assert!(matches!(err, ColorizeError::MissingFile { .. }));
        assert!(!agent.state().is_ready());
        drop(dir);
    }

    #[test]
    fn test_lifecycle_reaches_ready() {
        let (_dir, config, index) = fixture();
        let mut agent = ColorizerAgent::new(FakeCapability::with_index(index));
        agent.load_config(&config).unwrap();
        agent.init_markup().unwrap();

        assert!(agent.state().is_configured());
        assert!(agent.state().is_ready());
        agent.reinit_markup().unwrap();
    }

    #[test]
    fn test_strict_policy_propagates_content_error() {
        let (_dir, config, index) = fixture();
        let mut capability = FakeCapability::with_index(index);
        capability.fail_markup = true;
        let mut agent = ColorizerAgent::with_policy(capability, MarkupPolicy::Strict);
        agent.load_config(&config).unwrap();

        let err = agent.markup("текст").unwrap_err();
        assert!(matches!(err, ColorizeError::UnsupportedText(_)));
    }

    #[test]
    fn test_degrading_policy_returns_input_unchanged() {
        let (_dir, config, index) = fixture();
        let mut capability = FakeCapability::with_index(index);
        capability.fail_markup = true;
        let calls = Arc::clone(&capability.markup_calls);
        let mut agent = ColorizerAgent::with_policy(capability, MarkupPolicy::Degrading);
        agent.load_config(&config).unwrap();

        let out = agent.markup("нетронутый текст").unwrap();
        assert_eq!(out, "нетронутый текст");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_degrading_policy_still_surfaces_missing_index() {
        let (dir, config, index) = fixture();
        let mut agent = ColorizerAgent::with_policy(
            FakeCapability::with_index(index.clone()),
            MarkupPolicy::Degrading,
        );
        agent.load_config(&config).unwrap();

        std::fs::remove_file(&index).unwrap();
        let err = agent.markup("текст").unwrap_err();
        assert!(matches!(err, ColorizeError::MissingFile { .. }));
        drop(dir);
    }

    #[test]
    fn test_markup_round_trips_through_legacy_bridge() {
        let (_dir, config, index) = fixture();
        let mut agent = ColorizerAgent::new(FakeCapability::with_index(index));
        agent.load_config(&config).unwrap();

        // echo capability: output equals input, so the bridge must round-trip
        let text = "Слабительное 阿司匹林";
        assert_eq!(agent.markup(text).unwrap(), text);
    }

    #[test]
    fn test_stateless_delegates_need_no_config() {
        let agent = ColorizerAgent::new(FakeCapability::default());
        assert_eq!(agent.version(), 10);
        assert_eq!(agent.index_file_name(), "phrases.idx");
        assert_eq!(agent.first_form("Слово").unwrap(), "слово");
    }

    #[test]
    fn test_shared_capability_between_facades() {
        let (_dir, config, index) = fixture();
        let shared = Arc::new(Mutex::new(FakeCapability::with_index(index)));

        let mut first = ColorizerAgent::new(Arc::clone(&shared));
        let mut second = ColorizerAgent::new(shared);
        first.load_config(&config).unwrap();
        second.load_config(&config).unwrap();

        assert_eq!(first.markup("текст").unwrap(), "текст");
        assert_eq!(second.markup("текст").unwrap(), "текст");
    }
}
