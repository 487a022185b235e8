//! Enlaces de chat pre-rellenados (`https://wa.me/...`)
//!
//! Solo se construye la URL; ningún mensaje sale del servidor.

use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::normalize_phone;

const CHAT_BASE_URL: &str = "https://wa.me";

pub fn build_chat_link(phone: &str, message: &str) -> AppResult<String> {
    let digits = normalize_phone(phone);
    if digits.len() < 7 {
        return Err(validation_error("phone", "Phone number is not valid for a chat link"));
    }

    Ok(format!(
        "{}/{}?text={}",
        CHAT_BASE_URL,
        digits,
        urlencoding::encode(message)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_strips_phone_formatting() {
        let link = build_chat_link("+44 7700 900123", "hi").unwrap();
        assert_eq!(link, "https://wa.me/447700900123?text=hi");
    }

    #[test]
    fn test_message_is_url_encoded() {
        let link = build_chat_link("447700900123", "Running late: ETA 15 min & counting").unwrap();
        assert_eq!(
            link,
            "https://wa.me/447700900123?text=Running%20late%3A%20ETA%2015%20min%20%26%20counting"
        );
    }

    #[test]
    fn test_short_number_rejected() {
        assert!(build_chat_link("12", "hi").is_err());
        assert!(build_chat_link("", "hi").is_err());
    }
}
