//! Domain name label decoding (RFC 1035 sections 3.1 and 4.1.4).

// A length byte with both high bits set starts a two byte compression
// pointer; the low 14 bits are an absolute offset into the message.
const POINTER_BITS: u8 = 0xC0;
const POINTER_OFFSET_MASK: u16 = 0x3FFF;

/// Upper bound on compression pointers followed while resolving one name.
/// Legitimate messages chain a handful at most.
pub(crate) const MAX_POINTER_HOPS: usize = 128;

/// Longest domain name on the wire, length octets and root label included
/// (RFC 1035 section 2.3.4).
pub(crate) const MAX_NAME_LEN: usize = 255;

/// Reads a sequence of length-prefixed labels starting at `off`.
///
/// Returns the offset just past the sequence in the original stream (after the
/// root label, or after the first compression pointer) together with the
/// labels collected.
///
/// `bound`, when set, caps reading at that offset so that record data cannot
/// run into its sibling records; hitting it stops resolution with whatever was
/// collected so far. When `follow_pointers` is false a byte with the pointer
/// prefix is read as an ordinary length (TXT strings may legitimately start
/// with one).
///
/// With `follow_pointers` set the sequence is a domain name: a pointer must
/// target an offset strictly before the segment being read, so every chain
/// walks backwards and cannot cycle, and no more than [`MAX_NAME_LEN`] wire
/// bytes of labels are collected.
///
/// Malformed input never fails here: a label running past the message, a
/// pointer outside it or pointing forward, a chain longer than
/// [`MAX_POINTER_HOPS`] or an over-long name ends resolution with the labels
/// gathered until then. Callers detect truncation through their next fixed
/// size read.
pub(crate) fn resolve_labels(
    msg: &[u8],
    off: usize,
    bound: Option<usize>,
    follow_pointers: bool,
) -> (usize, Vec<String>) {
    let mut labels = vec![];
    let mut cur = off;
    // pointers must land before this offset
    let mut segment_start = off;
    // where the caller resumes once the first pointer has been taken
    let mut resume: Option<usize> = None;
    let mut hops = 0;
    // wire length of the collected labels plus the root label
    let mut name_len = 1;
    let mut full = false;

    loop {
        if let Some(bound) = bound
            && cur >= bound
        {
            return (resume.unwrap_or(bound), labels);
        }
        if cur >= msg.len() {
            return (resume.unwrap_or(msg.len()), labels);
        }

        let c = msg[cur];
        if follow_pointers && c & POINTER_BITS == POINTER_BITS {
            if cur + 1 >= msg.len() {
                return (resume.unwrap_or(msg.len()), labels);
            }
            let ptr = (u16::from_be_bytes([c, msg[cur + 1]]) & POINTER_OFFSET_MASK) as usize;
            let next = resume.unwrap_or(cur + 2);
            if full {
                return (next, labels);
            }
            resume = Some(next);
            hops += 1;
            if ptr >= segment_start || hops > MAX_POINTER_HOPS {
                log::trace!("rejecting compression pointer to {ptr} at offset {cur}");
                return (next, labels);
            }
            segment_start = ptr;
            cur = ptr;
            continue;
        }

        let len = c as usize;
        cur += 1;
        if len == 0 {
            return (resume.unwrap_or(cur), labels);
        }

        let end = cur + len;
        if end > msg.len() || bound.is_some_and(|bound| end > bound) {
            let stop = bound.map_or(msg.len(), |bound| bound.min(msg.len()));
            return (resume.unwrap_or(stop), labels);
        }
        if follow_pointers && !full {
            if name_len + 1 + len > MAX_NAME_LEN {
                log::trace!("name at offset {off} exceeds {MAX_NAME_LEN} bytes");
                full = true;
                if let Some(next) = resume {
                    return (next, labels);
                }
            } else {
                name_len += 1 + len;
            }
        }
        // past the limit the name is still walked to find where it ends
        if !full {
            labels.push(String::from_utf8_lossy(&msg[cur..end]).into_owned());
        }
        cur = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // encode writes labels the way a sender does without compression.
    fn encode(labels: &[&str]) -> Vec<u8> {
        let mut out = vec![];
        for label in labels {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        out.push(0);
        out
    }

    #[test]
    fn test_resolve_plain_name() {
        let msg = encode(&["printer", "_ipp", "_tcp", "local"]);
        let (off, labels) = resolve_labels(&msg, 0, None, true);
        assert_eq!(off, msg.len());
        assert_eq!(labels, vec!["printer", "_ipp", "_tcp", "local"]);
    }

    #[test]
    fn test_resolve_reencodes_to_original() {
        let names: [&[&str]; 3] = [
            &["a"],
            &["host", "local"],
            &["x-1", "_sub", "_http", "_tcp", "local"],
        ];
        for name in names {
            let msg = encode(name);
            let (off, labels) = resolve_labels(&msg, 0, None, true);
            let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
            assert_eq!(encode(&refs), msg);
            assert_eq!(off, msg.len());
        }
    }

    #[test]
    fn test_resolve_root_only() {
        let (off, labels) = resolve_labels(&[0], 0, None, true);
        assert_eq!(off, 1);
        assert!(labels.is_empty());
    }

    #[test]
    fn test_resolve_pointer_equivalence() {
        // "_http._tcp.local" at 0, then "web" + pointer to 0
        let mut msg = encode(&["_http", "_tcp", "local"]);
        let second = msg.len();
        msg.extend_from_slice(&[3, b'w', b'e', b'b', 0xC0, 0x00]);

        let (off, labels) = resolve_labels(&msg, second, None, true);
        assert_eq!(off, msg.len());
        assert_eq!(labels.join("."), "web._http._tcp.local");

        let plain = encode(&["web", "_http", "_tcp", "local"]);
        let (_, plain_labels) = resolve_labels(&plain, 0, None, true);
        assert_eq!(labels, plain_labels);
    }

    #[test]
    fn test_resolve_pointer_chain() {
        // local at 0, _tcp + ptr(0) at 7, _ipp + ptr(7) at 14
        let mut msg = encode(&["local"]);
        msg.extend_from_slice(&[4, b'_', b't', b'c', b'p', 0xC0, 0x00]);
        msg.extend_from_slice(&[4, b'_', b'i', b'p', b'p', 0xC0, 0x07]);

        let (off, labels) = resolve_labels(&msg, 14, None, true);
        assert_eq!(off, 21);
        assert_eq!(labels, vec!["_ipp", "_tcp", "local"]);
    }

    #[test]
    fn test_resolve_self_pointer_terminates() {
        let msg = [0xC0, 0x00];
        let (off, labels) = resolve_labels(&msg, 0, None, true);
        assert_eq!(off, 2);
        assert!(labels.is_empty());
    }

    #[test]
    fn test_resolve_pointer_cycle_terminates() {
        // a + ptr(4) at 0, b + ptr(0) at 4
        let msg = [1, b'a', 0xC0, 0x04, 1, b'b', 0xC0, 0x00];
        let (off, labels) = resolve_labels(&msg, 0, None, true);
        assert_eq!(off, 4);
        assert_eq!(labels, vec!["a"]);

        // entering the cycle from its second half takes one backward hop
        let (off, labels) = resolve_labels(&msg, 4, None, true);
        assert_eq!(off, 8);
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[test]
    fn test_resolve_pointer_into_own_segment() {
        // x + y + ptr(2) at 0: the target is behind the pointer but inside
        // the segment already being read
        let msg = [1, b'x', 1, b'y', 0xC0, 0x02];
        let (off, labels) = resolve_labels(&msg, 0, None, true);
        assert_eq!(off, 6);
        assert_eq!(labels, vec!["x", "y"]);

        // reached through an earlier pointer the same bytes resolve once
        let mut msg = msg.to_vec();
        msg.extend_from_slice(&[1, b'z', 0xC0, 0x00]);
        let (off, labels) = resolve_labels(&msg, 6, None, true);
        assert_eq!(off, msg.len());
        assert_eq!(labels, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_resolve_name_length_capped() {
        // 200 one byte labels, then a pointer back to the start
        let mut msg = vec![];
        for _ in 0..200 {
            msg.extend_from_slice(&[1, b'a']);
        }
        msg.extend_from_slice(&[0xC0, 0x00, 0xC0, 0x00]);

        // 127 labels fill 254 bytes, the root label makes 255
        let (off, labels) = resolve_labels(&msg, 0, None, true);
        assert_eq!(labels.len(), 127);
        assert_eq!(off, 402);

        let (off, labels) = resolve_labels(&msg, 402, None, true);
        assert_eq!(labels.len(), 127);
        assert_eq!(off, 404);
    }

    #[test]
    fn test_resolve_txt_not_length_capped() {
        let mut msg = vec![];
        for _ in 0..3 {
            msg.push(200);
            msg.extend(std::iter::repeat_n(b't', 200));
        }
        let (off, labels) = resolve_labels(&msg, 0, Some(msg.len()), false);
        assert_eq!(off, msg.len());
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn test_resolve_pointer_out_of_range() {
        let msg = [3, b'f', b'o', b'o', 0xFF, 0xFF];
        let (off, labels) = resolve_labels(&msg, 0, None, true);
        assert_eq!(off, 6);
        assert_eq!(labels, vec!["foo"]);
    }

    #[test]
    fn test_resolve_truncated_label() {
        let msg = [3, b'f', b'o', b'o', 10, b'b', b'a'];
        let (off, labels) = resolve_labels(&msg, 0, None, true);
        assert_eq!(off, msg.len());
        assert_eq!(labels, vec!["foo"]);
    }

    #[test]
    fn test_resolve_truncated_pointer() {
        let msg = [3, b'f', b'o', b'o', 0xC0];
        let (off, labels) = resolve_labels(&msg, 0, None, true);
        assert_eq!(off, msg.len());
        assert_eq!(labels, vec!["foo"]);
    }

    #[test]
    fn test_resolve_stops_at_bound() {
        // no root label: only the bound ends the sequence
        let msg = [3, b'a', b'=', b'1', 3, b'b', b'=', b'2', 9, 9, 9];
        let (off, labels) = resolve_labels(&msg, 0, Some(8), false);
        assert_eq!(off, 8);
        assert_eq!(labels, vec!["a=1", "b=2"]);

        let (_, labels) = resolve_labels(&msg, 0, Some(4), false);
        assert_eq!(labels, vec!["a=1"]);

        // a string straddling the bound is not taken
        let (_, labels) = resolve_labels(&msg, 0, Some(6), false);
        assert_eq!(labels, vec!["a=1"]);
    }

    #[test]
    fn test_resolve_pointer_prefix_literal_without_following() {
        // 0xC1 is a 193 byte string when pointers are not followed
        let mut msg = vec![0xC1];
        msg.extend(std::iter::repeat_n(b'x', 193));
        let (off, labels) = resolve_labels(&msg, 0, Some(msg.len()), false);
        assert_eq!(off, msg.len());
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].len(), 193);
    }
}
