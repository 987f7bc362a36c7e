//! Decoding of the scheduling endpoint's reply.
//!
//! The endpoint answers with a DWR script: JavaScript whose string literals
//! embed an escaped JSON document. Nothing about it is versioned, so the
//! reply is unescaped and scanned for three `"<field>":"<value>"` markers
//! instead of being parsed structurally.

use regex::Regex;
use std::sync::LazyLock;

static START_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)startTime":"(.*?)""#).unwrap());
static END_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)endTime":"(.*?)""#).unwrap());
static ROOM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?s)room":"(.*?)""#).unwrap());

/// Raw field values found in one reply. `None` means the marker was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFields {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub room: Option<String>,
}

/// Unescape a raw reply and pull out the schedule fields.
pub fn decode(raw: &str) -> ScheduleFields {
    let text = unescape(raw);
    ScheduleFields {
        start_time: scan(&START_TIME_RE, &text),
        end_time: scan(&END_TIME_RE, &text),
        room: scan(&ROOM_RE, &text),
    }
}

fn scan(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Decode `\uXXXX` escapes (surrogate pairs included) and the common
/// single-character escapes, then drop every other backslash.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        match rest.chars().next() {
            Some('u') => {
                if let Some((ch, consumed)) = unicode_escape(&rest[1..]) {
                    out.push(ch);
                    rest = &rest[1 + consumed..];
                }
            }
            Some('n') => {
                out.push('\n');
                rest = &rest[1..];
            }
            Some('r') => {
                out.push('\r');
                rest = &rest[1..];
            }
            Some('t') => {
                out.push('\t');
                rest = &rest[1..];
            }
            Some('\\') => rest = &rest[1..],
            _ => {}
        }
    }

    out.push_str(rest);
    out
}

/// Decode the hex digits following `\u`. Returns the char and how many bytes
/// of `s` it consumed.
fn unicode_escape(s: &str) -> Option<(char, usize)> {
    let unit = hex4(s)?;

    if (0xD800..0xDC00).contains(&unit) {
        let low = s
            .get(4..)
            .and_then(|tail| tail.strip_prefix("\\u"))
            .and_then(hex4)
            .filter(|low| (0xDC00..0xE000).contains(low));
        return Some(match low {
            Some(low) => {
                let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                (char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER), 10)
            }
            None => (char::REPLACEMENT_CHARACTER, 4),
        });
    }

    Some((char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER), 4))
}

fn hex4(s: &str) -> Option<u32> {
    let digits = s.get(..4)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
