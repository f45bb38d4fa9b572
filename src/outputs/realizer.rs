use std::collections::BTreeSet;

use crate::turn::types::{Size, Temperature};

/// Appends the subject/object particle that fits the last syllable of `word`.
/// Words not ending in a Hangul syllable take the vowel form.
pub fn with_particle(word: &str, consonant: &str, vowel: &str) -> String {
    let particle = match word.chars().last() {
        Some(last) => {
            let code = last as u32;
            if (0xAC00..=0xD7A3).contains(&code) && (code - 0xAC00) % 28 != 0 {
                consonant
            } else {
                vowel
            }
        }
        None => vowel,
    };
    format!("{word}{particle}")
}

pub fn added(name: &str) -> String {
    format!("{} 담겼습니다.", with_particle(name, "이", "가"))
}

pub fn removed(name: &str) -> String {
    format!("{} 장바구니에서 빠졌어요.", with_particle(name, "이", "가"))
}

/// "카페 라떼를 차갑게, 큰 사이즈로 준비할게요." or `None` when there is nothing to summarize.
pub fn option_summary(
    name: &str,
    temperature: Option<&Temperature>,
    size: Option<&Size>,
    bean: Option<&str>,
    add_ons: &BTreeSet<String>,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(temperature) = temperature {
        parts.push(temperature.label().to_string());
    }
    if let Some(size) = size {
        parts.push(size.label().to_string());
    }
    match bean {
        Some("regular") | None => {}
        Some("decaf") => parts.push("디카페인".to_string()),
        Some(other) => parts.push(other.to_string()),
    }
    if !add_ons.is_empty() {
        let labels: Vec<&str> = add_ons.iter().map(|a| add_on_label(a)).collect();
        parts.push(format!("추가: {}", labels.join(", ")));
    }

    if parts.is_empty() {
        return None;
    }
    Some(format!(
        "{} {}로 준비할게요.",
        with_particle(name, "을", "를"),
        parts.join(", ")
    ))
}

fn add_on_label(id: &str) -> &str {
    match id {
        "syrup" => "시럽",
        "whipping" => "휘핑",
        "shot" => "샷",
        other => other,
    }
}
