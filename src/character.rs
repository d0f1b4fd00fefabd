/// Module `character` - text utilities for generated character sheets.
///
/// The generator returns a free-form sheet of `Label: value` lines. No
/// schema is enforced upstream, so everything here is a tolerant line
/// scan that degrades to fixed defaults instead of failing. These
/// functions are total over any string input.
use rand::Rng;

pub const DEFAULT_RACE: &str = "Human";
pub const DEFAULT_CLASS: &str = "Fighter";

/// Generic portrait prompt used when the first image attempt fails.
pub const FALLBACK_IMAGE_PROMPT: &str =
    "Fantasy portrait of a unique tavern NPC, cinematic lighting, richly detailed, fantasy art style";

/// Trivia and lore pool for follow-up comments.
const TRIVIA_AND_LORE: &[&str] = &[
    "Did you know? Most taverns in Faerun are built over ley lines, enhancing magical effects!",
    "Lore Drop: The infamous bard Elowen once silenced a tavern brawl with a single lute chord.",
    "Trivia: The term 'Dungeon Master' was first coined in 1975.",
    "Lore Fact: Elves consider tavern gossip an art form worthy of poetry.",
    "Gnome Fun Fact: Waterdeep gnomes ferment ale with magical mushrooms!",
];

/// Scan a sheet for the `Race & Class` line and split the value into
/// its two parts. Falls back to ("Human", "Fighter") when the line is
/// missing, has no colon, or the value holds fewer than two words.
pub fn extract_race_and_class(text: &str) -> (String, String) {
    for line in text.lines() {
        let line = line.trim();
        if line.to_lowercase().starts_with("race & class") {
            if let Some((_, value)) = line.split_once(':') {
                if let Some((race, class)) = value.trim().split_once(' ') {
                    let race = race.trim();
                    let class = class.trim();
                    if !race.is_empty() && !class.is_empty() {
                        return (race.to_string(), class.to_string());
                    }
                }
            }
        }
    }
    (DEFAULT_RACE.to_string(), DEFAULT_CLASS.to_string())
}

/// Pull a single labeled field out of a sheet by case-insensitive
/// prefix match. Returns None when no line carries the label.
pub fn extract_field(text: &str, label: &str) -> Option<String> {
    let needle = label.to_lowercase();
    for line in text.lines() {
        let line = line.trim();
        if line.to_lowercase().starts_with(&needle) {
            if let Some((_, value)) = line.split_once(':') {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Portrait prompt for the extracted race and class.
pub fn build_image_prompt(race: &str, class: &str) -> String {
    format!(
        "A fantasy portrait of a {} {} sitting in a lively medieval tavern. \
         Painted in a semi-realistic digital art style. Include visible gear related to their class.",
        race, class
    )
}

/// Caption for the social post: the sheet verbatim plus the configured
/// hashtag suffix.
pub fn build_caption(text: &str, hashtags: &str) -> String {
    let text = text.trim();
    let hashtags = hashtags.trim();
    if hashtags.is_empty() {
        text.to_string()
    } else {
        format!("{}\n\n{}", text, hashtags)
    }
}

/// Random trivia line for the follow-up comment, with the subscription
/// link appended when configured.
pub fn trivia_comment(subscribe_link: Option<&str>) -> String {
    let idx = rand::thread_rng().gen_range(0..TRIVIA_AND_LORE.len());
    match subscribe_link {
        Some(link) => format!("{}\n\nMore NPCs: {}", TRIVIA_AND_LORE[idx], link),
        None => TRIVIA_AND_LORE[idx].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_race_and_class() {
        let sheet = "Name: Dorn\nRace & Class: Half-Elf Ranger\nPersonality: quiet";
        assert_eq!(
            extract_race_and_class(sheet),
            ("Half-Elf".to_string(), "Ranger".to_string())
        );
    }

    #[test]
    fn extraction_is_case_insensitive() {
        let sheet = "RACE & CLASS: Dwarf Cleric";
        assert_eq!(
            extract_race_and_class(sheet),
            ("Dwarf".to_string(), "Cleric".to_string())
        );
    }

    #[test]
    fn missing_line_falls_back_to_defaults() {
        assert_eq!(
            extract_race_and_class("no relevant lines here"),
            ("Human".to_string(), "Fighter".to_string())
        );
    }

    #[test]
    fn empty_input_falls_back_to_defaults() {
        assert_eq!(
            extract_race_and_class(""),
            ("Human".to_string(), "Fighter".to_string())
        );
    }

    #[test]
    fn line_without_colon_falls_back() {
        assert_eq!(
            extract_race_and_class("Race & Class Half-Elf Ranger"),
            ("Human".to_string(), "Fighter".to_string())
        );
    }

    #[test]
    fn single_word_value_falls_back() {
        assert_eq!(
            extract_race_and_class("Race & Class: Warforged"),
            ("Human".to_string(), "Fighter".to_string())
        );
    }

    #[test]
    fn extract_field_finds_backstory() {
        let sheet = "Name: Dorn\nBackstory: Raised by wolves near Neverwinter.";
        assert_eq!(
            extract_field(sheet, "backstory").as_deref(),
            Some("Raised by wolves near Neverwinter.")
        );
    }

    #[test]
    fn extract_field_missing_label() {
        assert_eq!(extract_field("Name: Dorn", "backstory"), None);
        assert_eq!(extract_field("", "backstory"), None);
    }

    #[test]
    fn extract_field_empty_value() {
        assert_eq!(extract_field("Backstory:   ", "backstory"), None);
    }

    #[test]
    fn caption_contains_text_and_hashtags() {
        let caption = build_caption("Name: Dorn\n", "#DnD #TTRPG");
        assert_eq!(caption, "Name: Dorn\n\n#DnD #TTRPG");
    }

    #[test]
    fn caption_without_hashtags() {
        assert_eq!(build_caption("Name: Dorn", ""), "Name: Dorn");
    }

    #[test]
    fn trivia_comment_appends_link() {
        let comment = trivia_comment(Some("https://example.com/subscribe"));
        assert!(comment.contains("More NPCs: https://example.com/subscribe"));
    }
}
