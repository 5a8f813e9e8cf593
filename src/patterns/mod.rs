//! Pattern configuration - how inline tags are recognized in document text.
//!
//! `PatternSettings` is the serializable, user-editable form. `PatternConfig`
//! is the compiled form handed to the scanner, front-matter extractor and
//! query evaluator. Compiling never fails: an invalid tag or exclude pattern
//! is reported with a warning and replaced by the built-in default.

pub mod dates;
pub mod error;
pub mod tags;

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use dates::{DateResolver, DateRule, DateTagSettings, DateUnit};
pub use error::{PatternError, PatternKind};
pub use tags::TagPattern;

/// Built-in tag pattern: a `#` preceded by start of line or whitespace,
/// followed by tag characters, not ending in `.` or `:`.
pub const DEFAULT_TAG_PATTERN: &str =
    r##"(?:^|\s)(#[^\s#,;!?"'()\[\]{}<>]*[^\s#,;!?"'()\[\]{}<>.:])"##;

/// Built-in exclude pattern: purely numeric tags such as issue references.
pub const DEFAULT_EXCLUDE_PATTERN: &str = r"^#\d+$";

/// Sentinel lines delimiting an embedded query block
pub const QUERY_BLOCK_START: &str = "<!-- tagscope:query -->";
pub const QUERY_BLOCK_END: &str = "<!-- tagscope:query-end -->";

/// Sentinel lines delimiting a rendered results block
pub const RESULTS_BLOCK_START: &str = "<!-- tagscope:results -->";
pub const RESULTS_BLOCK_END: &str = "<!-- tagscope:results-end -->";

static DEFAULT_TAG: LazyLock<TagPattern> = LazyLock::new(|| {
    TagPattern::regex(DEFAULT_TAG_PATTERN, PatternKind::Tag)
        .expect("built-in tag pattern compiles")
});

static DEFAULT_EXCLUDE: LazyLock<TagPattern> = LazyLock::new(|| {
    TagPattern::regex(DEFAULT_EXCLUDE_PATTERN, PatternKind::Exclude)
        .expect("built-in exclude pattern compiles")
});

/// User-facing pattern settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    /// Regex locating tags; group 1 (if present) is the tag text
    pub tag_pattern: String,
    /// Regex over a found tag; matching tags are dropped. Empty disables it.
    pub exclude_pattern: String,
    /// Separates a tag key from its value (`status=done`)
    pub value_delimiter: String,
    /// Replaces spaces in front-matter keys and values
    pub space_replacement: String,
    /// Expand `a/b/c` into `a`, `a/b`, `a/b/c`
    pub nesting: bool,
    /// Propagate tags over indented blocks and heading sections
    pub inheritance: bool,
    /// Skip fenced code blocks
    pub ignore_code_blocks: bool,
    /// Do not derive tags from front matter
    pub ignore_front_matter: bool,
    pub dates: DateTagSettings,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            tag_pattern: DEFAULT_TAG_PATTERN.to_string(),
            exclude_pattern: DEFAULT_EXCLUDE_PATTERN.to_string(),
            value_delimiter: "=".to_string(),
            space_replacement: "-".to_string(),
            nesting: true,
            inheritance: true,
            ignore_code_blocks: true,
            ignore_front_matter: false,
            dates: DateTagSettings::default(),
        }
    }
}

/// Compiled pattern configuration
#[derive(Debug, Clone)]
pub struct PatternConfig {
    tag: TagPattern,
    exclude: Option<TagPattern>,
    value_delimiter: String,
    space_replacement: String,
    nesting: bool,
    inheritance: bool,
    ignore_code_blocks: bool,
    ignore_front_matter: bool,
    dates: DateResolver,
}

impl PatternConfig {
    /// Compile settings, falling back to the built-in patterns on error
    #[must_use]
    pub fn new(settings: &PatternSettings) -> Self {
        let tag = TagPattern::regex(&settings.tag_pattern, PatternKind::Tag).unwrap_or_else(|e| {
            warn!(error = %e, "invalid tag pattern, using built-in default");
            DEFAULT_TAG.clone()
        });

        let exclude = if settings.exclude_pattern.is_empty() {
            None
        } else {
            Some(
                TagPattern::regex(&settings.exclude_pattern, PatternKind::Exclude).unwrap_or_else(
                    |e| {
                        warn!(error = %e, "invalid exclude pattern, using built-in default");
                        DEFAULT_EXCLUDE.clone()
                    },
                ),
            )
        };

        Self {
            tag,
            exclude,
            value_delimiter: settings.value_delimiter.clone(),
            space_replacement: settings.space_replacement.clone(),
            nesting: settings.nesting,
            inheritance: settings.inheritance,
            ignore_code_blocks: settings.ignore_code_blocks,
            ignore_front_matter: settings.ignore_front_matter,
            dates: DateResolver::new(&settings.dates),
        }
    }

    /// Tag texts found on `line`, with excluded matches removed
    pub fn find_tags<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tag.find_iter(line).filter(move |tag| !self.is_excluded(tag))
    }

    #[must_use]
    pub fn is_excluded(&self, tag: &str) -> bool {
        self.exclude.as_ref().is_some_and(|p| p.is_match(tag))
    }

    #[must_use]
    pub fn tag_pattern(&self) -> &TagPattern {
        &self.tag
    }

    #[must_use]
    pub fn value_delimiter(&self) -> &str {
        &self.value_delimiter
    }

    #[must_use]
    pub fn space_replacement(&self) -> &str {
        &self.space_replacement
    }

    #[must_use]
    pub const fn nesting(&self) -> bool {
        self.nesting
    }

    #[must_use]
    pub const fn inheritance(&self) -> bool {
        self.inheritance
    }

    #[must_use]
    pub const fn ignore_code_blocks(&self) -> bool {
        self.ignore_code_blocks
    }

    #[must_use]
    pub const fn ignore_front_matter(&self) -> bool {
        self.ignore_front_matter
    }

    #[must_use]
    pub const fn dates(&self) -> &DateResolver {
        &self.dates
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self::new(&PatternSettings::default())
    }
}
