/// URL-friendly slug: lowercase, whitespace runs become `-`, anything other
/// than ASCII word characters or `-` is dropped, dashes are collapsed and
/// trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_dash = false;

    for ch in text.trim().to_lowercase().chars() {
        let mapped = if ch.is_whitespace() || ch == '-' {
            '-'
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            ch
        } else {
            continue;
        };

        if mapped == '-' {
            if !prev_dash {
                slug.push('-');
            }
            prev_dash = true;
        } else {
            slug.push(mapped);
            prev_dash = false;
        }
    }

    slug.trim_matches('-').to_string()
}

/// First of `base`, `base-1`, `base-2`, ... that `taken` rejects
pub fn unique_slug<F>(base: &str, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut candidate = base.to_string();
    let mut counter = 1;
    while taken(&candidate) {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    candidate
}

const WORDS_PER_MINUTE: usize = 200;

/// Minutes to read at 200 words per minute, rounded up, at least 1 for any
/// non-empty text.
pub fn reading_time(text: Option<&str>) -> u32 {
    match text {
        None | Some("") => 0,
        Some(text) => {
            let words = text.split_whitespace().count();
            words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_normalises_titles() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("  --Rust & Axum--  "), "rust-axum");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
        assert_eq!(slugify("Café Menu"), "caf-menu");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn unique_slug_appends_counter() {
        let taken = ["intro", "intro-1"];
        assert_eq!(unique_slug("intro", |s| taken.contains(&s)), "intro-2");
        assert_eq!(unique_slug("fresh", |s| taken.contains(&s)), "fresh");
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time(None), 0);
        assert_eq!(reading_time(Some("")), 0);
        assert_eq!(reading_time(Some("one two three")), 1);
        assert_eq!(reading_time(Some(&"word ".repeat(200))), 1);
        assert_eq!(reading_time(Some(&"word ".repeat(201))), 2);
    }
}
