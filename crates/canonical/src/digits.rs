/// Keeps only the ASCII digits of `text`, preserving their order.
///
/// Document numbers are printed with thousands separators and stray spaces
/// (`1.041.970.336`, `52 345 678`); every consumer compares the bare digit
/// run.
///
/// ```rust
/// use canonical::digits_only;
///
/// assert_eq!(digits_only("1.041.970.336"), "1041970336");
/// assert_eq!(digits_only("No. 52 345 678"), "52345678");
/// assert_eq!(digits_only("none"), "");
/// ```
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}
