//! Text measurement and wrapping for titles and labels.

/// Heuristic: estimate pixel width of text (Plotters has no cheap text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    // 0.6 em per character, rounded up
    let chars = text.chars().count() as u32;
    (chars * font_px * 3).div_ceil(5)
}

/// Greedy word wrap to `max_px`. Words longer than a line are kept whole on their own line.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.is_empty() {
            cur.push_str(word);
            continue;
        }
        let candidate = format!("{cur} {word}");
        if estimate_text_width_px(&candidate, font_px) <= max_px {
            cur = candidate;
        } else {
            lines.push(std::mem::replace(&mut cur, word.to_string()));
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Cut `text` so it fits in `max_px`, ending with an ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) + font_px > max_px {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_estimate_rounds_up_only_partial_pixels() {
        assert_eq!(estimate_text_width_px("alpha beta", 10), 60);
        assert_eq!(estimate_text_width_px("ab", 12), 15);
        assert_eq!(estimate_text_width_px("", 12), 0);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        // 10 px font -> 6 px per char, 60 px fits 10 chars
        let lines = wrap_text_to_width("alpha beta gamma delta", 10, 60);
        assert_eq!(lines, vec!["alpha beta", "gamma", "delta"]);
    }

    #[test]
    fn long_word_is_not_split() {
        let lines = wrap_text_to_width("supercalifragilistic", 10, 30);
        assert_eq!(lines, vec!["supercalifragilistic"]);
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("short", 10, 100), "short");
        let t = truncate_to_width("a rather long legend label", 10, 60);
        assert!(t.ends_with('…'));
        assert!(t.chars().count() < "a rather long legend label".len());
    }
}
