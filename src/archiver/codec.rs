use crate::archiver::clock::parse_created_at;
use crate::weibo::Mblog;
use chrono::{DateTime, FixedOffset};

const FIELD_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 4;

/// Replace every line-feed with the two characters `\n`.
///
/// The result is both the stored text field and the dedup key.
pub fn normalize_text(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// `created_at` and `mblog_id` are written verbatim, so neither may carry a
/// line break or the field separator.
pub fn fits_one_line(mblog: &Mblog) -> bool {
    [mblog.created_at.as_str(), mblog.mblog_id.as_str()]
        .iter()
        .all(|field| !field.contains(['\n', '\r', FIELD_SEPARATOR]))
}

pub fn encode_line(mblog: &Mblog) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}{}",
        mblog.created_at,
        mblog.id,
        mblog.mblog_id,
        normalize_text(mblog.the_text()),
        sep = FIELD_SEPARATOR
    )
}

/// Decode one archive line. The text field is last so it may contain pipes.
/// Lines with fewer than four fields are rejected; an unparsable id reads as 0.
pub fn decode_line(line: &str) -> Option<Mblog> {
    let fields: Vec<&str> = line.splitn(FIELD_COUNT, FIELD_SEPARATOR).collect();
    let [created_at, id, mblog_id, text] = fields.as_slice() else {
        return None;
    };
    Some(Mblog {
        created_at: (*created_at).to_string(),
        id: id.parse::<i64>().unwrap_or(0),
        mblog_id: (*mblog_id).to_string(),
        text_raw: (*text).to_string(),
        ..Mblog::default()
    })
}

pub fn decode_month(raw: &str) -> Vec<Mblog> {
    raw.split('\n')
        .filter(|line| !line.is_empty())
        .filter_map(decode_line)
        .collect()
}

pub fn encode_month(mblogs: &[Mblog]) -> String {
    mblogs
        .iter()
        .map(encode_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn precedes(
    a: (&Option<DateTime<FixedOffset>>, &Mblog),
    b: (&Option<DateTime<FixedOffset>>, &Mblog),
) -> bool {
    match (a.0, b.0) {
        (Some(at), Some(bt)) => at < bt,
        _ => a.1.id < b.1.id,
    }
}

/// Order records by `created_at`, falling back to `id` whenever either side
/// fails to parse. Stable; the fallback makes the relation non-transitive in
/// mixed sets, so this is an insertion sort rather than `sort_by`.
pub fn sort_records(mblogs: Vec<Mblog>) -> Vec<Mblog> {
    let mut keyed: Vec<(Option<DateTime<FixedOffset>>, Mblog)> = mblogs
        .into_iter()
        .map(|m| (parse_created_at(&m.created_at), m))
        .collect();

    for i in 1..keyed.len() {
        let mut j = i;
        while j > 0 && precedes((&keyed[j].0, &keyed[j].1), (&keyed[j - 1].0, &keyed[j - 1].1)) {
            keyed.swap(j, j - 1);
            j -= 1;
        }
    }

    keyed.into_iter().map(|(_, m)| m).collect()
}

#[cfg(test)]
mod tests {
    use super::{
        decode_line, decode_month, encode_line, encode_month, fits_one_line, normalize_text,
        sort_records,
    };
    use crate::weibo::Mblog;

    fn mblog(created_at: &str, id: i64, mblog_id: &str, text: &str) -> Mblog {
        Mblog {
            created_at: created_at.to_string(),
            id,
            mblog_id: mblog_id.to_string(),
            text_raw: text.to_string(),
            ..Mblog::default()
        }
    }

    #[test]
    fn encodes_fields_in_fixed_order() {
        let line = encode_line(&mblog("Mon Jan 02 15:04:05 +0800 2023", 10, "A", "hello"));
        assert_eq!(line, "Mon Jan 02 15:04:05 +0800 2023|10|A|hello");

        let negative = encode_line(&mblog("x", -42, "B", "t"));
        assert_eq!(negative, "x|-42|B|t");
    }

    #[test]
    fn newlines_are_flattened_and_survive_reload() {
        let fresh = mblog("Mon Jan 02 15:04:05 +0800 2023", 1, "A", "line1\nline2");
        let line = encode_line(&fresh);
        assert!(line.ends_with("line1\\nline2"));
        assert!(!line.contains('\n'));

        let reloaded = decode_line(&line).expect("decode");
        assert_eq!(reloaded.text_raw, "line1\\nline2");
        assert_eq!(
            normalize_text(reloaded.the_text()),
            normalize_text(fresh.the_text())
        );
    }

    #[test]
    fn encoding_uses_long_text_when_present() {
        let mut fresh = mblog("t", 1, "A", "short");
        fresh.long_text = Some("short\nand long".to_string());
        assert_eq!(encode_line(&fresh), "t|1|A|short\\nand long");
    }

    #[test]
    fn raw_fields_with_breaks_or_pipes_do_not_fit() {
        assert!(fits_one_line(&mblog("Mon Jan 02 15:04:05 +0800 2023", 1, "A", "a\nb")));
        assert!(!fits_one_line(&mblog("Mon Jan 02 15:04:05 +0800 2023\n", 1, "A", "t")));
        assert!(!fits_one_line(&mblog("t", 1, "A\r", "t")));
        assert!(!fits_one_line(&mblog("t", 1, "A|B", "t")));
    }

    #[test]
    fn pipes_in_text_stay_in_last_field() {
        let reloaded = decode_line("t|7|C||a|b|").expect("decode");
        assert_eq!(reloaded.id, 7);
        assert_eq!(reloaded.mblog_id, "C");
        assert_eq!(reloaded.text_raw, "|a|b|");
    }

    #[test]
    fn malformed_lines_are_dropped() {
        assert!(decode_line("only|three|fields").is_none());
        let raw = "a|1|X|one\n\nbroken\nb|notanumber|Y|two\n";
        let records = decode_month(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text_raw, "one");
        assert_eq!(records[1].id, 0);
    }

    #[test]
    fn month_encoding_has_no_trailing_newline() {
        let body = encode_month(&[mblog("a", 1, "X", "one"), mblog("b", 2, "Y", "two")]);
        assert_eq!(body, "a|1|X|one\nb|2|Y|two");
    }

    #[test]
    fn sort_orders_by_time_then_id() {
        let sorted = sort_records(vec![
            mblog("Wed Jan 04 10:00:00 +0800 2023", 1, "c", "c"),
            mblog("Mon Jan 02 10:00:00 +0800 2023", 3, "a", "a"),
            mblog("Tue Jan 03 10:00:00 +0800 2023", 2, "b", "b"),
        ]);
        let ids: Vec<i64> = sorted.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn sort_compares_instants_across_offsets() {
        let sorted = sort_records(vec![
            mblog("Mon Jan 02 10:00:00 +0800 2023", 1, "a", "a"),
            mblog("Mon Jan 02 01:00:00 +0000 2023", 2, "b", "b"),
        ]);
        assert_eq!(sorted[0].id, 2);
    }

    #[test]
    fn unparsable_timestamps_fall_back_to_id() {
        let sorted = sort_records(vec![
            mblog("garbage", 9, "x", "x"),
            mblog("also garbage", 4, "y", "y"),
            mblog("more garbage", 6, "z", "z"),
        ]);
        let ids: Vec<i64> = sorted.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn mixed_parsed_and_unparsable_timestamps_sort_deterministically() {
        let sorted = sort_records(vec![
            mblog("Thu Jan 05 10:00:00 +0800 2023", 9, "late", "late"),
            mblog("garbage", 3, "broken", "broken"),
            mblog("Mon Jan 02 10:00:00 +0800 2023", 7, "early", "early"),
        ]);
        let ids: Vec<&str> = sorted.iter().map(|m| m.mblog_id.as_str()).collect();
        assert_eq!(ids, vec!["broken", "early", "late"]);

        let again = sort_records(sorted.clone());
        assert_eq!(again, sorted);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let sorted = sort_records(vec![
            mblog("Mon Jan 02 10:00:00 +0800 2023", 5, "first", "first"),
            mblog("Mon Jan 02 10:00:00 +0800 2023", 1, "second", "second"),
        ]);
        assert_eq!(sorted[0].mblog_id, "first");
        assert_eq!(sorted[1].mblog_id, "second");
    }
}
