//! Timestamp headers from user-configured date patterns.
//!
//! Patterns use the letters players already know from the settings panel
//! (`[HH:mm:ss]`, `h:mm a`, `'at' HH:mm`). They are translated to chrono
//! format strings; a pattern with an unsupported letter is invalid and the
//! caller omits the timestamp.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

/// Translate a date pattern to a chrono `strftime` string.
pub fn translate_pattern(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' {
            // '' is a literal quote, otherwise quote until the closing '
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if ch.is_ascii_alphabetic() {
            let run = chars[i..].iter().take_while(|&&c| c == ch).count();
            out.push_str(field_spec(ch, run)?);
            i += run;
            continue;
        }

        push_literal(&mut out, ch);
        i += 1;
    }

    Some(out)
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

fn field_spec(letter: char, run: usize) -> Option<&'static str> {
    let spec = match (letter, run) {
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('a', _) => "%p",
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        _ => return None,
    };
    Some(spec)
}

/// Format `timestamp_ms` with `pattern` in the given time zone.
pub fn format_timestamp_in<Tz>(pattern: &str, timestamp_ms: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let format = translate_pattern(pattern)?;
    let utc = DateTime::from_timestamp_millis(timestamp_ms)?;
    Some(utc.with_timezone(tz).format(&format).to_string())
}

/// Format `timestamp_ms` with `pattern` in local time.
pub fn format_timestamp(pattern: &str, timestamp_ms: i64) -> Option<String> {
    format_timestamp_in(pattern, timestamp_ms, &Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // 2024-03-05 14:07:09 UTC, a Tuesday
    const TS: i64 = 1_709_647_629_000;

    #[test]
    fn default_patterns() {
        assert_eq!(format_timestamp_in("[HH:mm]", TS, &Utc).as_deref(), Some("[14:07]"));
        assert_eq!(format_timestamp_in("[HH:mm:ss]", TS, &Utc).as_deref(), Some("[14:07:09]"));
    }

    #[test]
    fn twelve_hour_and_dates() {
        assert_eq!(format_timestamp_in("h:mm a", TS, &Utc).as_deref(), Some("2:07 PM"));
        assert_eq!(format_timestamp_in("yyyy-MM-dd", TS, &Utc).as_deref(), Some("2024-03-05"));
        assert_eq!(format_timestamp_in("EEE d/M/yy", TS, &Utc).as_deref(), Some("Tue 5/3/24"));
    }

    #[test]
    fn quoted_literals_and_percent() {
        assert_eq!(format_timestamp_in("'at' HH'h'", TS, &Utc).as_deref(), Some("at 14h"));
        assert_eq!(format_timestamp_in("HH''mm", TS, &Utc).as_deref(), Some("14'07"));
        assert_eq!(format_timestamp_in("100% HH", TS, &Utc).as_deref(), Some("100% 14"));
    }

    #[test]
    fn unsupported_letters_are_invalid() {
        assert_eq!(format_timestamp_in("[HH:mm] zzz", TS, &Utc), None);
        assert_eq!(format_timestamp_in("Q", TS, &Utc), None);
    }
}
