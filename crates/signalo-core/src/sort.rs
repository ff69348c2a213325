//! Numeric-aware display ordering for stops and routes.
//!
//! Lists shown to the user are sorted with a comparison that treats digit
//! runs as numbers, so "Stop 2" sorts before "Stop 10" and route "3" before
//! route "12". Non-digit segments compare case-insensitively.

use std::cmp::Ordering;

use crate::route::RouteLine;
use crate::stop::Stop;

/// Compares two display strings segment by segment, treating consecutive
/// digits as one number.
pub fn natural_compare(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) => {
                if lc.is_ascii_digit() && rc.is_ascii_digit() {
                    let ln = take_number(&mut left);
                    let rn = take_number(&mut right);
                    match ln.cmp(&rn) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }

                let lc_lower = lc.to_lowercase().next().unwrap_or(lc);
                let rc_lower = rc.to_lowercase().next().unwrap_or(rc);
                match lc_lower.cmp(&rc_lower) {
                    Ordering::Equal => {
                        left.next();
                        right.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

/// Consumes a run of ASCII digits, ignoring leading zeros for comparison.
fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut value: u64 = 0;
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        // Saturate rather than wrap on absurdly long digit runs.
        value = value
            .saturating_mul(10)
            .saturating_add((c as u8 - b'0') as u64);
        chars.next();
    }
    value
}

/// Sorts stops by display name in place.
pub fn sort_stops(stops: &mut [Stop]) {
    stops.sort_by(|a, b| natural_compare(&a.name, &b.name));
}

/// Sorts routes by code in place.
pub fn sort_routes(routes: &mut [RouteLine]) {
    routes.sort_by(|a, b| natural_compare(&a.code, &b.code));
}
