use tracing::warn;

use crate::hash_table::{Aggregate, Table};

/// Formatted summary line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub bytes: Vec<u8>,
    /// Stations dropped from the tail because the output limit was reached.
    pub omitted: usize,
}

impl Summary {
    pub fn is_truncated(&self) -> bool {
        self.omitted > 0
    }
}

/// Table entries in byte-lexicographic key order.
pub fn sorted(table: &Table) -> Vec<(&[u8], &Aggregate)> {
    let mut entries = table.entries();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Appends `tenths / 10` with exactly one fractional digit.
#[inline]
pub fn push_tenths(out: &mut Vec<u8>, tenths: i64) {
    if tenths < 0 {
        out.push(b'-');
    }
    let abs = tenths.unsigned_abs();

    let mut digits = [0u8; 20];
    let mut i = digits.len();
    let mut whole = abs / 10;
    loop {
        i -= 1;
        digits[i] = b'0' + (whole % 10) as u8;
        whole /= 10;
        if whole == 0 {
            break;
        }
    }

    out.extend_from_slice(&digits[i..]);
    out.push(b'.');
    out.push(b'0' + (abs % 10) as u8);
}

fn push_entry(out: &mut Vec<u8>, name: &[u8], stats: &Aggregate) {
    out.extend_from_slice(name);
    out.push(b'=');
    push_tenths(out, stats.min as i64);
    out.push(b'/');
    push_tenths(out, stats.mean_tenths());
    out.push(b'/');
    push_tenths(out, stats.max as i64);
}

/// Renders `{name=min/mean/max, ...}\n` in key order.
///
/// Output never exceeds `limit` bytes (or 3, the size of `{}\n`). Entries
/// that do not fit are dropped whole from the end and counted in
/// [`Summary::omitted`].
pub fn render(table: &Table, limit: usize) -> Summary {
    let entries = sorted(table);
    let limit = limit.max(3);

    let mut out = Vec::with_capacity(limit.min(entries.len() * 64 + 3));
    let mut entry = Vec::with_capacity(160);
    let mut omitted = 0;

    out.push(b'{');
    for (i, (name, stats)) in entries.iter().enumerate() {
        entry.clear();
        if i != 0 {
            entry.extend_from_slice(b", ");
        }
        push_entry(&mut entry, name, stats);

        if out.len() + entry.len() + 2 > limit {
            omitted = entries.len() - i;
            break;
        }
        out.extend_from_slice(&entry);
    }
    out.extend_from_slice(b"}\n");

    if omitted > 0 {
        warn!(omitted, limit, "output truncated");
    }

    Summary {
        bytes: out,
        omitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(records: &[(&str, i32)]) -> Table {
        let mut tbl = Table::new(1 << 8, 1 << 16).unwrap();
        for &(name, tenths) in records {
            tbl.update(name.as_bytes(), Table::hash(name.as_bytes()), tenths)
                .unwrap();
        }
        tbl
    }

    fn tenths(value: i64) -> String {
        let mut out = Vec::new();
        push_tenths(&mut out, value);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_push_tenths() {
        assert_eq!(tenths(0), "0.0");
        assert_eq!(tenths(123), "12.3");
        assert_eq!(tenths(-123), "-12.3");
        assert_eq!(tenths(-1), "-0.1");
        assert_eq!(tenths(999), "99.9");
        assert_eq!(tenths(-999), "-99.9");
        assert_eq!(tenths(10), "1.0");
        assert_eq!(tenths(i64::MIN), "-922337203685477580.8");
    }

    #[test]
    fn test_render() {
        let tbl = table(&[("Hamburg", 120), ("Bulawayo", 89), ("Hamburg", 100)]);
        let summary = render(&tbl, 1 << 10);

        assert_eq!(
            summary.bytes,
            b"{Bulawayo=8.9/8.9/8.9, Hamburg=10.0/11.0/12.0}\n".to_vec()
        );
        assert!(!summary.is_truncated());
    }

    #[test]
    fn test_render_empty() {
        let summary = render(&table(&[]), 1 << 10);
        assert_eq!(summary.bytes, b"{}\n".to_vec());
    }

    #[test]
    fn test_sorted_by_bytes() {
        let tbl = table(&[("b", 0), ("Ä", 0), ("a", 0), ("B", 0), ("ab", 0), ("Z", 0)]);
        let names: Vec<&[u8]> = sorted(&tbl).into_iter().map(|(name, _)| name).collect();

        assert_eq!(
            names,
            vec![
                "B".as_bytes(),
                "Z".as_bytes(),
                "a".as_bytes(),
                "ab".as_bytes(),
                "b".as_bytes(),
                "Ä".as_bytes(),
            ]
        );
    }

    #[test]
    fn test_mean_rounds() {
        // 1.1 + 1.2 = 2.3 / 2 = 1.15 -> 1.2, and its negation -> -1.2
        let tbl = table(&[("p", 11), ("p", 12), ("n", -11), ("n", -12), ("z", -1), ("z", 1)]);
        let summary = render(&tbl, 1 << 10);

        assert_eq!(
            summary.bytes,
            b"{n=-1.2/-1.2/-1.1, p=1.1/1.2/1.2, z=-0.1/0.0/0.1}\n".to_vec()
        );
    }

    #[test]
    fn test_truncation() {
        let tbl = table(&[("Hamburg", 120), ("Bulawayo", 89), ("Xi'an", -34)]);
        let full = render(&tbl, 1 << 10);

        // Room for the first entry only.
        let limit = "{Bulawayo=8.9/8.9/8.9}\n".len() + 5;
        let summary = render(&tbl, limit);

        assert_eq!(summary.bytes, b"{Bulawayo=8.9/8.9/8.9}\n".to_vec());
        assert_eq!(summary.omitted, 2);
        assert!(summary.bytes.len() <= limit);

        let exact = render(&tbl, full.bytes.len());
        assert_eq!(exact, full);

        let tiny = render(&tbl, 0);
        assert_eq!(tiny.bytes, b"{}\n".to_vec());
        assert_eq!(tiny.omitted, 3);
    }
}
