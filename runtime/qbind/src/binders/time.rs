use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::fmt::strtime;
use jiff::tz::TimeZone;

use crate::descriptor::TypeDescriptor;
use crate::driver::BindContext;
use crate::errors::FailureKind;
use crate::registry::Binder;
use crate::value::Value;

/// Binds [`jiff::Timestamp`].
///
/// The first value of the key is matched against the configured layouts, in order
/// (see [`BindConfig::time_layouts`]). Layouts with a time zone directive yield an
/// absolute instant; the others are interpreted in the configured time zone, which
/// defaults to the system's. If no layout matches, the value is read as a number of
/// seconds since the Unix epoch. If that fails too, the zero timestamp is produced.
///
/// [`BindConfig::time_layouts`]: crate::BindConfig::time_layouts
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampBinder;

impl Binder for TimestampBinder {
    fn bind(&self, cx: &mut BindContext<'_>, key: &str, ty: &TypeDescriptor) -> Value {
        let Some(raw) = cx.params().first(key) else {
            return Value::Zero;
        };
        if raw.is_empty() {
            return Value::Zero;
        }
        let engine = cx.engine();
        let parsed = engine
            .time_layouts()
            .iter()
            .find_map(|layout| layout.parse(raw, engine.time_zone()))
            .or_else(|| from_epoch_seconds(raw));
        match parsed {
            Some(timestamp) => Value::Timestamp(timestamp),
            None => {
                cx.fail(key, FailureKind::malformed(raw, ty));
                Value::Zero
            }
        }
    }
}

fn from_epoch_seconds(raw: &str) -> Option<Timestamp> {
    let seconds: i64 = raw.parse().ok()?;
    Timestamp::from_second(seconds).ok()
}

/// A compiled entry of the timestamp layout list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimeLayout {
    /// RFC 3339, e.g. `2006-01-02T15:04:05Z`.
    Rfc3339,
    /// A `strftime`-style layout carrying its own offset or time zone.
    Absolute(String),
    /// A `strftime`-style layout without time zone information.
    Civil(String),
}

const RFC3339: &str = "rfc3339";

/// Directives that pin a parsed value to an absolute instant.
const ZONE_DIRECTIVES: [&str; 6] = ["%z", "%:z", "%::z", "%:::z", "%Q", "%s"];

/// Time zone abbreviations can be formatted, but never parsed.
const ABBREVIATION_DIRECTIVE: &str = "%Z";

impl TimeLayout {
    /// Compile a layout. Empty layouts, and layouts that could never match, are ignored.
    pub(crate) fn compile(layout: &str) -> Option<Self> {
        if layout.is_empty() {
            return None;
        }
        if layout.contains(ABBREVIATION_DIRECTIVE) {
            tracing::warn!(
                layout,
                "Time zone abbreviations (`%Z`) can't be parsed. The layout will be ignored"
            );
            return None;
        }
        if layout.eq_ignore_ascii_case(RFC3339) {
            return Some(TimeLayout::Rfc3339);
        }
        if ZONE_DIRECTIVES.iter().any(|d| layout.contains(d)) {
            Some(TimeLayout::Absolute(layout.to_owned()))
        } else {
            Some(TimeLayout::Civil(layout.to_owned()))
        }
    }

    pub(crate) fn parse(&self, raw: &str, time_zone: &TimeZone) -> Option<Timestamp> {
        match self {
            TimeLayout::Rfc3339 => raw.parse().ok(),
            TimeLayout::Absolute(layout) => strtime::parse(layout, raw).ok()?.to_timestamp().ok(),
            TimeLayout::Civil(layout) => {
                let parsed = strtime::parse(layout, raw).ok()?;
                let date = parsed.to_date().ok()?;
                let datetime = DateTime::new(
                    date.year(),
                    date.month(),
                    date.day(),
                    parsed.hour().unwrap_or(0),
                    parsed.minute().unwrap_or(0),
                    parsed.second().unwrap_or(0),
                    parsed.subsec_nanosecond().unwrap_or(0),
                )
                .ok()?;
                Some(datetime.to_zoned(time_zone.clone()).ok()?.timestamp())
            }
        }
    }
}
