//! The fixed card catalogue and the reaction palette.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayDefinition {
    pub day: u32,
    pub title: &'static str,
    pub task: &'static str,
    pub emoji: &'static str,
    pub duration_min: u32,
}

impl DayDefinition {
    /// Upper bound shown next to the nominal duration.
    pub fn duration_max(&self) -> u32 {
        self.duration_min + 5
    }

    pub fn duration_label(&self) -> String {
        format!("{}–{} min", self.duration_min, self.duration_max())
    }
}

/// Tags a user may pick as a reaction to a card.
pub const REACTION_PALETTE: [&str; 10] = [
    "🔥", "💋", "✨", "🖤", "⚡", "🕯️", "🌙", "🎭", "🍓", "🔓",
];

pub fn is_palette_tag(tag: &str) -> bool {
    REACTION_PALETTE.iter().any(|candidate| *candidate == tag)
}

pub static CATALOGUE: [DayDefinition; 14] = [
    DayDefinition {
        day: 1,
        title: "Eye Contact",
        task: "Sit facing each other and hold eye contact without talking. \
               When the timer ends, say one thing you noticed.",
        emoji: "🔥",
        duration_min: 5,
    },
    DayDefinition {
        day: 2,
        title: "Slow Hands",
        task: "Trade a shoulder and neck massage. Take turns and ask for \
               more or less pressure out loud.",
        emoji: "💋",
        duration_min: 10,
    },
    DayDefinition {
        day: 3,
        title: "Whispers",
        task: "Whisper three things you appreciate about each other that \
               you have never said before.",
        emoji: "🖤",
        duration_min: 8,
    },
    DayDefinition {
        day: 4,
        title: "Lead and Follow",
        task: "One of you plans the evening down to the details while the \
               other simply follows. Swap roles halfway through.",
        emoji: "👑",
        duration_min: 15,
    },
    DayDefinition {
        day: 5,
        title: "Tasting Menu",
        task: "Prepare a small plate of fruit and chocolate and feed each \
               other blindfolded. Guess every bite.",
        emoji: "🍓",
        duration_min: 15,
    },
    DayDefinition {
        day: 6,
        title: "Unhurried",
        task: "Put the phones in another room and spend the time close \
               together without changing pace or topic.",
        emoji: "💋",
        duration_min: 15,
    },
    DayDefinition {
        day: 7,
        title: "Warm Touch",
        task: "Give each other a relaxing massage with oil or lotion, \
               lingering wherever it feels best.",
        emoji: "🕯️",
        duration_min: 20,
    },
    DayDefinition {
        day: 8,
        title: "Anticipation",
        task: "Plan a surprise for later in the day and drop small hints \
               until it happens.",
        emoji: "⚡",
        duration_min: 15,
    },
    DayDefinition {
        day: 9,
        title: "Quiet Breathing",
        task: "Lie side by side and match your breathing. Stay silent until \
               you are breathing in the same rhythm.",
        emoji: "🌙",
        duration_min: 10,
    },
    DayDefinition {
        day: 10,
        title: "In the Dark",
        task: "One of you is blindfolded and guided through a short walk \
               around the home by voice alone. Then switch.",
        emoji: "🎭",
        duration_min: 15,
    },
    DayDefinition {
        day: 11,
        title: "Love Notes",
        task: "Send each other up to three short messages during the day. \
               In the evening, act on one of them.",
        emoji: "📩",
        duration_min: 5,
    },
    DayDefinition {
        day: 12,
        title: "Secret Trait",
        task: "Each of you secretly picks one trait to play today, such as \
               confidence or patience. Guess the other's at night.",
        emoji: "🦂",
        duration_min: 12,
    },
    DayDefinition {
        day: 13,
        title: "Full Disclosure",
        task: "Share one wish you have kept to yourself, in a single \
               sentence. The other makes it happen, slowly and deliberately.",
        emoji: "🔓",
        duration_min: 20,
    },
    DayDefinition {
        day: 14,
        title: "The Ritual",
        task: "Combine your favourite moments from the last two weeks into \
               one evening. Everything is allowed.",
        emoji: "✨",
        duration_min: 30,
    },
];

/// Looks up a card by its 1-based ordinal.
pub fn definition(day: u32) -> Option<&'static DayDefinition> {
    let index = usize::try_from(day).ok()?.checked_sub(1)?;
    CATALOGUE.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_ordinals_are_sequential() {
        for (index, def) in CATALOGUE.iter().enumerate() {
            assert_eq!(def.day as usize, index + 1);
        }
    }

    #[test]
    fn definition_is_one_based() {
        assert!(definition(0).is_none());
        assert_eq!(definition(1).map(|d| d.title), Some("Eye Contact"));
        assert_eq!(definition(14).map(|d| d.emoji), Some("✨"));
        assert!(definition(15).is_none());
    }

    #[test]
    fn duration_label_spans_five_minutes() {
        assert_eq!(CATALOGUE[0].duration_label(), "5–10 min");
    }

    #[test]
    fn palette_membership() {
        assert!(is_palette_tag("🔥"));
        assert!(!is_palette_tag("👑"));
        assert!(!is_palette_tag(""));
    }
}
