// crates/cli/src/utils.rs

const SIZE_SUFFIXES: [(char, u32); 5] = [('k', 10), ('m', 20), ('g', 30), ('t', 40), ('p', 50)];

/// Parse a size argument with optional power-of-1024 suffix.
pub(crate) fn parse_size<T>(s: &str) -> std::result::Result<T, String>
where
    T: TryFrom<u64>,
{
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size".to_string());
    }
    let val = match s.chars().last() {
        Some(last) if last.is_ascii_alphabetic() => {
            let num = s[..s.len() - 1]
                .parse::<u64>()
                .map_err(|e| e.to_string())?;
            let shift = SIZE_SUFFIXES
                .iter()
                .find(|(c, _)| last.eq_ignore_ascii_case(c))
                .map(|(_, shift)| *shift)
                .ok_or_else(|| format!("invalid size suffix: {last}"))?;
            num.checked_mul(1u64 << shift)
                .ok_or_else(|| "size overflow".to_string())?
        }
        _ => s.parse::<u64>().map_err(|e| e.to_string())?,
    };
    T::try_from(val).map_err(|_| "size overflow".to_string())
}
