//! Rupiah formatting for receipts, exports and reports.

/// Groups the digits of `amount` with `.` as thousands separator (`12500` -> `12.500`).
pub fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `Rp 12.500`
pub fn format_rupiah(amount: i64) -> String {
    format!("Rp {}", group_thousands(amount))
}

/// `price * quantity`, saturating instead of overflowing.
pub fn line_amount(price: i64, quantity: i32) -> i64 {
    price.saturating_mul(i64::from(quantity))
}

/// Saturating sum of amounts.
pub fn sum_amounts<I>(amounts: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    amounts.into_iter().fold(0, i64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1.000");
        assert_eq!(group_thousands(12500), "12.500");
        assert_eq!(group_thousands(1234567), "1.234.567");
        assert_eq!(group_thousands(-45000), "-45.000");
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(25000), "Rp 25.000");
    }

    #[test]
    fn test_amounts_saturate() {
        assert_eq!(line_amount(25_000, 3), 75_000);
        assert_eq!(line_amount(i64::MAX / 2, 3), i64::MAX);
        assert_eq!(sum_amounts([10, 20, 30]), 60);
        assert_eq!(sum_amounts([i64::MAX, 1]), i64::MAX);
    }
}
