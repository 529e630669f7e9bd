use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use jiff::tz::{Offset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::binders::TimeLayout;
use crate::errors::{ConfigLoadError, InvalidTimeZone};

/// The configuration of a [`QueryBinder`](crate::QueryBinder).
///
/// Build it once, at start-up, and hand it over to [`QueryBinder::new`]: the engine
/// doesn't change afterwards.
///
/// # Example
///
/// ```rust
/// use qbind::{BindConfig, QueryBinder};
///
/// let mut config = BindConfig::default().with_time_zone("UTC");
/// config.add_time_layout("%d/%m/%Y");
/// let engine = QueryBinder::new(config).unwrap();
/// ```
///
/// [`QueryBinder::new`]: crate::QueryBinder::new
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// The layouts tried, in order, by the timestamp binder.
    ///
    /// Layouts use `strftime` directives (see [`jiff::fmt::strtime`]). `rfc3339`
    /// stands for RFC 3339 timestamps. Empty layouts are skipped, and so are layouts
    /// using `%Z`: time zone abbreviations are ambiguous and can't be parsed. Use `%z`
    /// or `%Q` instead.
    pub time_layouts: Vec<String>,
    /// The IANA time zone used for layouts that carry no time zone information.
    ///
    /// Fixed offsets (`+01:00`) and `UTC` are accepted too.
    /// `None`, `local` and `system` all stand for the time zone of the host.
    pub time_zone: Option<String>,
    /// Sequence keys with an index at or beyond this bound are rejected.
    pub max_sequence_len: usize,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            time_layouts: DEFAULT_TIME_LAYOUTS.iter().map(|l| (*l).to_owned()).collect(),
            time_zone: None,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }
}

const DEFAULT_TIME_LAYOUTS: [&str; 4] = [
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "rfc3339",
];

const DEFAULT_MAX_SEQUENCE_LEN: usize = 10_000;

static ENV_PREFIX: &str = "QBIND_";
static CONFIG_FILE: &str = "qbind.yml";

impl BindConfig {
    /// Interpret layouts without time zone information in `time_zone`.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    /// Try `layout` after the layouts that are already configured.
    pub fn add_time_layout(&mut self, layout: impl Into<String>) -> &mut Self {
        self.time_layouts.push(layout.into());
        self
    }

    /// Load the configuration by merging together three sources:
    ///
    /// 1. Environment variables (`QBIND_*`, with `__` as the nesting separator)
    /// 2. The configuration file, `{configuration_dir}/qbind.yml`, if it exists
    /// 3. The defaults
    ///
    /// The list above is ordered by precedence.
    pub fn load(configuration_dir: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let configuration_dir = configuration_dir.as_ref();
        let span = tracing::info_span!(
            "Loading binder configuration",
            configuration.directory = %configuration_dir.display(),
        );
        let _guard = span.enter();

        let figment = Figment::new()
            .merge(Serialized::defaults(BindConfig::default()))
            .merge(Yaml::file(configuration_dir.join(CONFIG_FILE)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment
            .extract()
            .context("Failed to load hierarchical configuration")
            .map_err(ConfigLoadError)
    }

    pub(crate) fn compile_layouts(&self) -> Vec<TimeLayout> {
        self.time_layouts
            .iter()
            .filter_map(|layout| TimeLayout::compile(layout))
            .collect()
    }

    pub(crate) fn resolve_time_zone(&self) -> Result<TimeZone, InvalidTimeZone> {
        let Some(name) = self.time_zone.as_deref() else {
            return Ok(TimeZone::system());
        };
        if name.eq_ignore_ascii_case("local") || name.eq_ignore_ascii_case("system") {
            return Ok(TimeZone::system());
        }
        if name.eq_ignore_ascii_case("utc") {
            return Ok(TimeZone::UTC);
        }
        if name.starts_with(['+', '-']) {
            return parse_fixed_offset(name)
                .map(TimeZone::fixed)
                .ok_or_else(|| InvalidTimeZone {
                    name: name.to_owned(),
                    source: None,
                });
        }
        TimeZone::get(name).map_err(|e| InvalidTimeZone {
            name: name.to_owned(),
            source: Some(e),
        })
    }
}

/// Parse `+HH:MM`, `-HH:MM` or `+HH`.
fn parse_fixed_offset(raw: &str) -> Option<Offset> {
    let (sign, rest) = match raw.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    if !is_digits(hours) || !is_digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Offset::from_seconds(sign * (hours * 3600 + minutes * 60)).ok()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_digit())
}
