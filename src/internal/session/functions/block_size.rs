//! 分块大小解析，单位按 1024 进位，不区分大小写：
//! `5` / `5b` = 5，`4k` = 4096，`5Mb` = 5 * 1024 * 1024，`2gB`，`1T`。

use crate::internal::session::structs::SessionError;

pub fn parse_block_size(value: &str) -> Result<u64, SessionError> {
    let invalid = || SessionError::InvalidConfig(format!("无效的分块大小: {value:?}"));

    let trimmed = value.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(digits_end);
    if digits.is_empty() {
        return Err(invalid());
    }
    let size: u64 = digits.parse().map_err(|_| invalid())?;

    let shift = match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" => 10,
        "m" | "mb" => 20,
        "g" | "gb" => 30,
        "t" | "tb" => 40,
        _ => return Err(invalid()),
    };

    let bytes = size.checked_mul(1u64 << shift).ok_or_else(invalid)?;
    if bytes == 0 {
        return Err(SessionError::InvalidConfig("分块大小必须大于 0".to_string()));
    }
    Ok(bytes)
}
