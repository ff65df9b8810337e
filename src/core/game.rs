/// The game driver: library discovery → story selection → word collection → output.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::cache::{read_cache, regenerate_cache, RegenerateError};
use crate::core::config::{ConfigError, GameConfig};
use crate::core::library::{count_stories, find_library_files, read_library, LibraryError};
use crate::core::parser::parse_library;
use crate::core::render::{write_story, RenderError};
use crate::core::select::{locate, pick_random, total_stories};
use crate::core::words::{collect_words, PromptError, WordSource};
use crate::schema::story::{Story, StoryLocation};

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(
        "could not open cache file {path}. A new cache file has been generated; \
         run the game again to use it"
    )]
    CacheRegenerated { path: PathBuf },
    #[error("could not open or regenerate the cache file: {0}")]
    CacheUnavailable(#[from] RegenerateError),
    #[error("the story libraries contain no stories")]
    NoStories,
    #[error("story {index} does not exist; there are {total} stories")]
    StoryIndexOutOfRange { index: u32, total: u64 },
    #[error(
        "story {story_index} is missing from {path}; the cache file may be stale, \
         delete it and run again"
    )]
    StoryMissing { path: PathBuf, story_index: usize },
    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// A story picked for play, along with where it came from.
#[derive(Debug, Clone)]
pub struct SelectedStory {
    pub global_index: u32,
    pub location: StoryLocation,
    pub path: PathBuf,
    pub story: Story,
}

/// One line of the story catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub global_index: u32,
    pub path: PathBuf,
    pub title: String,
}

/// The game. Built via `MadLibs::builder()`.
pub struct MadLibs {
    config: GameConfig,
    cache_path: PathBuf,
    rng: StdRng,
}

/// Builder for constructing a `MadLibs` game.
#[derive(Default)]
pub struct MadLibsBuilder {
    config: Option<GameConfig>,
    config_file: Option<PathBuf>,
    library_dir: Option<PathBuf>,
    extension: Option<String>,
    cache_path: Option<PathBuf>,
    seed: Option<u64>,
}

impl MadLibs {
    pub fn builder() -> MadLibsBuilder {
        MadLibsBuilder::default()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// All story libraries, sorted by file name.
    pub fn library_files(&self) -> Result<Vec<PathBuf>, GameError> {
        Ok(find_library_files(
            &self.config.library_dir,
            &self.config.extension,
        )?)
    }

    /// Per-library story counts from the cache.
    ///
    /// A missing or unreadable cache is regenerated, but this run still
    /// fails with `CacheRegenerated` so the player restarts with a known
    /// good cache.
    pub fn story_counts(&self, files: &[PathBuf]) -> Result<Vec<u32>, GameError> {
        match read_cache(&self.cache_path, files.len()) {
            Ok(counts) => Ok(counts),
            Err(e) => {
                warn!("{}", e);
                regenerate_cache(&self.cache_path, files)?;
                Err(GameError::CacheRegenerated {
                    path: self.cache_path.clone(),
                })
            }
        }
    }

    /// Choose a story by global index, or at random when `index` is `None`,
    /// and parse it from its library.
    pub fn select(&mut self, index: Option<u32>) -> Result<SelectedStory, GameError> {
        let files = self.library_files()?;
        let counts = self.story_counts(&files)?;

        let total = total_stories(&counts);
        if total == 0 {
            return Err(GameError::NoStories);
        }
        let global_index = match index {
            Some(index) => index,
            None => pick_random(&counts, &mut self.rng).ok_or(GameError::NoStories)?,
        };
        let location = locate(&counts, global_index).ok_or(GameError::StoryIndexOutOfRange {
            index: global_index,
            total,
        })?;

        let path = files[location.file_index].clone();
        let text = read_library(&path)?;
        let mut stories = parse_library(&text);
        if location.story_index >= stories.len() {
            return Err(GameError::StoryMissing {
                path,
                story_index: location.story_index,
            });
        }
        let story = stories.swap_remove(location.story_index);
        debug!(
            global_index,
            file = %path.display(),
            story_index = location.story_index,
            title = %story.title,
            "selected story"
        );

        Ok(SelectedStory {
            global_index,
            location,
            path,
            story,
        })
    }

    /// Ask for every word the story needs, then write the finished story.
    /// Returns the words, parallel to the story's placeholders.
    pub fn play<S, W>(
        &self,
        selected: &SelectedStory,
        source: &mut S,
        out: &mut W,
    ) -> Result<Vec<String>, GameError>
    where
        S: WordSource + ?Sized,
        W: Write + ?Sized,
    {
        let words = collect_words(&selected.story, source)?;
        write_story(out, &selected.story, &words)?;
        Ok(words)
    }

    /// Every story title across all libraries, numbered by global index.
    ///
    /// Parses each library rather than trusting the cache. Only stories
    /// closed by an end tag are numbered, the same ones the cache counts, so
    /// every number listed here plays the listed story.
    pub fn catalog(&self) -> Result<Vec<CatalogEntry>, GameError> {
        let mut entries = Vec::new();
        let mut global_index = 0u32;
        for path in self.library_files()? {
            let text = read_library(&path)?;
            let tagged = count_stories(&text) as usize;
            for story in parse_library(&text).into_iter().take(tagged) {
                entries.push(CatalogEntry {
                    global_index,
                    path: path.clone(),
                    title: story.title,
                });
                global_index += 1;
            }
        }
        Ok(entries)
    }
}

impl MadLibsBuilder {
    /// Use this configuration as the base for any other settings.
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the base configuration from a RON file at build time.
    /// Ignored when `config` is also given.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn library_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(path.into());
        self
    }

    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }

    /// Cache file location, used as given rather than relative to the
    /// library directory.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Fix the random story choice. Without a seed it comes from OS entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<MadLibs, GameError> {
        let mut config = match (self.config, self.config_file) {
            (Some(config), _) => config,
            (None, Some(path)) => GameConfig::load_from_ron(&path)?,
            (None, None) => GameConfig::default(),
        };
        if let Some(dir) = self.library_dir {
            config.library_dir = dir;
        }
        if let Some(extension) = self.extension {
            config.extension = extension;
        }

        let cache_path = self.cache_path.unwrap_or_else(|| config.cache_path());
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(MadLibs {
            config,
            cache_path,
            rng,
        })
    }
}
